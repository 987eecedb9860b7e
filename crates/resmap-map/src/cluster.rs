//! Point clustering in Web-Mercator pixel space
//!
//! Clusters are formed greedily per integer zoom level: each unassigned point
//! seeds a cluster and absorbs every unassigned point within `radius` pixels.
//! Above `max_zoom` every point is rendered individually.

use std::f64::consts::PI;
use std::sync::OnceLock;

use resmap_domain::FeatureCollection;
use resmap_types::GeoPoint;

/// Pixel size of one tile at zoom 0
pub const TILE_SIZE: f64 = 512.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClusterOptions {
    /// Clustering radius in screen pixels
    pub radius: f64,
    /// Highest zoom level at which points are still clustered
    pub max_zoom: u8,
}

impl Default for ClusterOptions {
    fn default() -> Self {
        Self {
            radius: 50.0,
            max_zoom: 14,
        }
    }
}

/// World pixel coordinates of a position at `zoom`
pub fn project(point: GeoPoint, zoom: f64) -> (f64, f64) {
    let scale = TILE_SIZE * 2f64.powf(zoom);
    let x = (point.longitude + 180.0) / 360.0 * scale;
    let sin = point.latitude.to_radians().sin().clamp(-0.9999, 0.9999);
    let y = (0.5 - 0.25 * ((1.0 + sin) / (1.0 - sin)).ln() / PI) * scale;
    (x, y)
}

/// Inverse of [`project`]
pub fn unproject(x: f64, y: f64, zoom: f64) -> GeoPoint {
    let scale = TILE_SIZE * 2f64.powf(zoom);
    let longitude = x / scale * 360.0 - 180.0;
    let y2 = 180.0 - y / scale * 360.0;
    let latitude = 360.0 / PI * (y2 * PI / 180.0).exp().atan() - 90.0;
    GeoPoint::new(latitude, longitude)
}

#[derive(Debug, Clone, PartialEq)]
pub struct Cluster {
    pub id: u64,
    pub zoom: u8,
    pub position: GeoPoint,
    /// Indices into the source feature list
    pub members: Vec<usize>,
}

impl Cluster {
    pub fn point_count(&self) -> usize {
        self.members.len()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ClusterNode {
    Cluster(Cluster),
    /// Index into the source feature list
    Point(usize),
}

fn encode_id(seed: usize, zoom: u8) -> u64 {
    ((seed as u64) << 5) | (u64::from(zoom) + 1)
}

fn decode_id(id: u64) -> Option<(usize, u8)> {
    let zoom = (id & 0x1f).checked_sub(1)?;
    Some(((id >> 5) as usize, zoom as u8))
}

/// Clustering index over the positions of a feature collection.
///
/// Each zoom level is clustered on first use and kept until the index is
/// rebuilt from new data.
#[derive(Debug, Clone)]
pub struct ClusterIndex {
    options: ClusterOptions,
    positions: Vec<GeoPoint>,
    /// One slot per zoom in `0..=max_zoom`, plus one for the unclustered level
    levels: Vec<OnceLock<Vec<ClusterNode>>>,
}

impl ClusterIndex {
    pub fn new(data: &FeatureCollection, options: ClusterOptions) -> Self {
        let positions = data
            .features
            .iter()
            .map(|f| GeoPoint::new(f.latitude(), f.longitude()))
            .collect();
        let levels = (0..usize::from(options.max_zoom) + 2).map(|_| OnceLock::new()).collect();
        Self {
            options,
            positions,
            levels,
        }
    }

    pub fn options(&self) -> ClusterOptions {
        self.options
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    fn group(&self, indices: &[usize], zoom: u8) -> Vec<Vec<usize>> {
        let projected: Vec<(f64, f64)> = indices
            .iter()
            .map(|&i| project(self.positions[i], f64::from(zoom)))
            .collect();
        let radius_sq = self.options.radius * self.options.radius;

        let mut assigned = vec![false; indices.len()];
        let mut groups = Vec::new();
        for a in 0..indices.len() {
            if assigned[a] {
                continue;
            }
            assigned[a] = true;
            let mut group = vec![indices[a]];
            for b in (a + 1)..indices.len() {
                if assigned[b] {
                    continue;
                }
                let dx = projected[a].0 - projected[b].0;
                let dy = projected[a].1 - projected[b].1;
                if dx * dx + dy * dy <= radius_sq {
                    assigned[b] = true;
                    group.push(indices[b]);
                }
            }
            groups.push(group);
        }
        groups
    }

    fn centroid(&self, members: &[usize], zoom: u8) -> GeoPoint {
        let z = f64::from(zoom);
        let (sx, sy) = members.iter().fold((0.0, 0.0), |(sx, sy), &i| {
            let (x, y) = project(self.positions[i], z);
            (sx + x, sy + y)
        });
        let n = members.len() as f64;
        unproject(sx / n, sy / n, z)
    }

    /// Clusters and single points visible at `zoom`
    pub fn clusters(&self, zoom: f64) -> &[ClusterNode] {
        let z = zoom.floor().max(0.0);
        if z > f64::from(self.options.max_zoom) {
            let unclustered = &self.levels[usize::from(self.options.max_zoom) + 1];
            return unclustered.get_or_init(|| (0..self.positions.len()).map(ClusterNode::Point).collect());
        }
        self.level(z as u8)
    }

    fn level(&self, zoom: u8) -> &[ClusterNode] {
        self.levels[usize::from(zoom)].get_or_init(|| self.build_level(zoom))
    }

    fn build_level(&self, z: u8) -> Vec<ClusterNode> {
        let all: Vec<usize> = (0..self.positions.len()).collect();
        self.group(&all, z)
            .into_iter()
            .map(|members| {
                if members.len() == 1 {
                    ClusterNode::Point(members[0])
                } else {
                    ClusterNode::Cluster(Cluster {
                        id: encode_id(members[0], z),
                        zoom: z,
                        position: self.centroid(&members, z),
                        members,
                    })
                }
            })
            .collect()
    }

    /// Members of a cluster produced by [`clusters`](Self::clusters)
    pub fn cluster_members(&self, cluster_id: u64) -> Option<Vec<usize>> {
        let (seed, zoom) = decode_id(cluster_id)?;
        if seed >= self.positions.len() || zoom > self.options.max_zoom {
            return None;
        }
        self.level(zoom).iter().find_map(|node| match node {
            ClusterNode::Cluster(c) if c.id == cluster_id => Some(c.members.clone()),
            _ => None,
        })
    }

    /// Lowest zoom at which the cluster breaks apart
    pub fn expansion_zoom(&self, cluster_id: u64) -> Option<f64> {
        let (_, zoom) = decode_id(cluster_id)?;
        let members = self.cluster_members(cluster_id)?;
        for z in (zoom + 1)..=self.options.max_zoom {
            if self.group(&members, z).len() > 1 {
                return Some(f64::from(z));
            }
        }
        Some(f64::from(self.options.max_zoom) + 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use resmap_domain::to_feature_collection;
    use resmap_types::{Resource, ResourceType};

    fn index(points: &[(f64, f64)]) -> ClusterIndex {
        let resources: Vec<Resource> = points
            .iter()
            .enumerate()
            .map(|(i, &(lat, lon))| {
                Resource::new("r", ResourceType::Ems, GeoPoint::new(lat, lon)).with_id(format!("r{i}"))
            })
            .collect();
        ClusterIndex::new(&to_feature_collection(&resources), ClusterOptions::default())
    }

    #[test]
    fn test_projection_round_trip() {
        let p = GeoPoint::new(10.720321, 122.562019);
        let (x, y) = project(p, 11.0);
        let back = unproject(x, y, 11.0);
        assert!((back.latitude - p.latitude).abs() < 1e-9);
        assert!((back.longitude - p.longitude).abs() < 1e-9);
    }

    #[test]
    fn test_nearby_points_cluster_at_low_zoom() {
        let idx = index(&[(10.72, 122.56), (10.721, 122.561), (10.0, 120.0)]);
        let nodes = idx.clusters(8.0);
        let clusters: Vec<_> = nodes
            .iter()
            .filter_map(|n| match n {
                ClusterNode::Cluster(c) => Some(c),
                ClusterNode::Point(_) => None,
            })
            .collect();
        assert_eq!(clusters.len(), 1);
        assert_eq!(clusters[0].point_count(), 2);
        assert!(nodes.contains(&ClusterNode::Point(2)));
    }

    #[test]
    fn test_no_clusters_above_max_zoom() {
        let idx = index(&[(10.72, 122.56), (10.72, 122.56)]);
        let nodes = idx.clusters(15.0);
        assert_eq!(nodes, vec![ClusterNode::Point(0), ClusterNode::Point(1)]);
    }

    #[test]
    fn test_expansion_zoom_splits_cluster() {
        let idx = index(&[(10.72, 122.56), (10.73, 122.57)]);
        let cluster = idx
            .clusters(5.0)
            .into_iter()
            .find_map(|n| match n {
                ClusterNode::Cluster(c) => Some(c),
                ClusterNode::Point(_) => None,
            })
            .expect("points should cluster at zoom 5");
        assert_ne!(cluster.id, 0);

        let zoom = idx.expansion_zoom(cluster.id).unwrap();
        assert!(zoom > 5.0);
        let at_zoom = idx.clusters(zoom);
        assert!(at_zoom.iter().all(|n| matches!(n, ClusterNode::Point(_))));
    }

    #[test]
    fn test_identical_points_expand_past_max_zoom() {
        let idx = index(&[(10.72, 122.56), (10.72, 122.56)]);
        let id = match &idx.clusters(3.0)[0] {
            ClusterNode::Cluster(c) => c.id,
            ClusterNode::Point(_) => panic!("expected cluster"),
        };
        assert_eq!(idx.expansion_zoom(id), Some(15.0));
    }

    #[test]
    fn test_levels_are_computed_once() {
        let idx = index(&[(10.72, 122.56), (10.721, 122.561), (10.0, 120.0)]);
        let first = idx.clusters(8.2);
        let second = idx.clusters(8.9);
        assert!(std::ptr::eq(first, second));
        assert_eq!(first, idx.build_level(8).as_slice());

        // a clone carries the computed levels with it
        let copy = idx.clone();
        assert_eq!(copy.clusters(8.0), first);
        assert!(std::ptr::eq(idx.clusters(20.0), idx.clusters(16.0)));
    }

    #[test]
    fn test_unknown_cluster() {
        let idx = index(&[(10.72, 122.56)]);
        assert!(idx.expansion_zoom(0).is_none());
        assert!(idx.expansion_zoom(encode_id(40, 3)).is_none());
        assert!(idx.expansion_zoom(encode_id(0, 3)).is_none());
    }
}
