//! Keeps a map widget's clustered source in step with the filtered resource list.
//!
//! The widget is only usable after its style has loaded. Until then every
//! pushed collection is held back; once icons are registered and the source
//! and layers exist, the most recent collection is applied. Later style
//! reloads reuse what is already registered.

use futures::future::join_all;
use resmap_domain::FeatureCollection;
use resmap_types::{GeoPoint, MapError, Resource, ResourceType};
use serde_json::json;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::cluster::ClusterOptions;
use crate::icons::IconLoader;
use crate::widget::{CameraTarget, LayerFilter, LayerKind, LayerSpec, MapWidget};

pub const SOURCE_ID: &str = "resources";
pub const CLUSTER_LAYER_ID: &str = "clusters";
pub const CLUSTER_COUNT_LAYER_ID: &str = "cluster-count";
pub const POINT_LAYER_ID: &str = "unclustered-point";

/// Minimum zoom after selecting a single marker
pub const POINT_FOCUS_ZOOM: f64 = 13.0;
pub const FLY_DURATION_MS: u64 = 500;
pub const ICON_SIZE: f64 = 0.2;

/// Cluster bubble color and radius steps: `(min point count, hex color, radius px)`
pub const CLUSTER_STEPS: [(usize, &str, f64); 3] = [
    (0, "#60a5fa", 20.0),
    (10, "#3b82f6", 30.0),
    (30, "#1d4ed8", 40.0),
];

/// Bubble color and radius for a cluster of `point_count` markers
pub fn cluster_style(point_count: usize) -> (&'static str, f64) {
    CLUSTER_STEPS
        .iter()
        .rev()
        .find(|(min, _, _)| point_count >= *min)
        .map(|&(_, color, radius)| (color, radius))
        .unwrap_or((CLUSTER_STEPS[0].1, CLUSTER_STEPS[0].2))
}

/// The three layers drawn over the resource source
pub fn resource_layers() -> Vec<LayerSpec> {
    let [(_, c0, r0), (t1, c1, r1), (t2, c2, r2)] = CLUSTER_STEPS;
    vec![
        LayerSpec {
            id: CLUSTER_LAYER_ID.to_string(),
            source: SOURCE_ID.to_string(),
            kind: LayerKind::Circle,
            filter: LayerFilter::Clusters,
            layout: serde_json::Value::Null,
            paint: json!({
                "circle-color": ["step", ["get", "point_count"], c0, t1, c1, t2, c2],
                "circle-radius": ["step", ["get", "point_count"], r0, t1, r1, t2, r2],
            }),
        },
        LayerSpec {
            id: CLUSTER_COUNT_LAYER_ID.to_string(),
            source: SOURCE_ID.to_string(),
            kind: LayerKind::Symbol,
            filter: LayerFilter::Clusters,
            layout: json!({
                "text-field": "{point_count_abbreviated}",
                "text-size": 12,
            }),
            paint: serde_json::Value::Null,
        },
        LayerSpec {
            id: POINT_LAYER_ID.to_string(),
            source: SOURCE_ID.to_string(),
            kind: LayerKind::Symbol,
            filter: LayerFilter::Unclustered,
            layout: json!({
                "icon-image": ["concat", "icon-", ["get", "type"]],
                "icon-size": ICON_SIZE,
                "icon-allow-overlap": true,
            }),
            paint: serde_json::Value::Null,
        },
    ]
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncState {
    Uninitialized,
    LoadingIcons,
    Ready,
}

/// Outcome of icon registration during style load
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IconLoadReport {
    pub loaded: Vec<ResourceType>,
    /// Already registered on the widget
    pub skipped: Vec<ResourceType>,
    pub failed: Vec<(ResourceType, String)>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PushOutcome {
    Applied,
    /// Held until the widget is ready
    Deferred,
}

/// Feature hit by a click on the map
#[derive(Debug, Clone, PartialEq)]
pub enum ClickedFeature {
    Cluster { cluster_id: u64, position: GeoPoint },
    Point(Resource),
}

#[derive(Debug, Clone, PartialEq)]
pub enum ClickOutcome {
    /// Camera flew into a cluster
    Zoomed(CameraTarget),
    /// Camera flew to a marker, whose resource is now selected
    Selected { resource: Resource, target: CameraTarget },
}

pub struct MapSync {
    state: watch::Sender<SyncState>,
    latest: Option<FeatureCollection>,
    options: ClusterOptions,
}

impl Default for MapSync {
    fn default() -> Self {
        Self::new(ClusterOptions::default())
    }
}

impl MapSync {
    pub fn new(options: ClusterOptions) -> Self {
        let (state, _) = watch::channel(SyncState::Uninitialized);
        Self {
            state,
            latest: None,
            options,
        }
    }

    pub fn state(&self) -> SyncState {
        *self.state.borrow()
    }

    /// Observe state transitions
    pub fn subscribe(&self) -> watch::Receiver<SyncState> {
        self.state.subscribe()
    }

    /// Most recent collection pushed, applied or not
    pub fn latest(&self) -> Option<&FeatureCollection> {
        self.latest.as_ref()
    }

    fn set_state(&self, state: SyncState) {
        let previous = self.state.send_replace(state);
        if previous != state {
            debug!(?previous, ?state, "map sync state changed");
        }
    }

    /// Register icons, source and layers, then apply pending data.
    ///
    /// Icons load concurrently; a failed icon is logged and skipped so its
    /// markers render without an image. Dropping the returned future before
    /// completion leaves the widget untouched by icons still in flight, and a
    /// later call starts over.
    ///
    /// Runs in full on every style load, including reloads after ready: the
    /// widget may have dropped its source and layers, so anything missing is
    /// created again and the latest collection is reapplied.
    pub async fn on_style_loaded<W, L>(&mut self, widget: &mut W, loader: &L) -> IconLoadReport
    where
        W: MapWidget,
        L: IconLoader,
    {
        let mut report = IconLoadReport::default();
        if self.state() == SyncState::Ready {
            debug!("style reloaded, registering map resources again");
        }
        self.set_state(SyncState::LoadingIcons);

        let mut pending = Vec::new();
        for t in ResourceType::ALL {
            if widget.has_image(&t.icon_id()) {
                report.skipped.push(t);
            } else {
                pending.push(t);
            }
        }

        let results = join_all(pending.into_iter().map(|t| async move {
            let path = t.icon_path();
            (t, loader.load_icon(&path).await)
        }))
        .await;

        for (t, result) in results {
            match result {
                Ok(icon) => {
                    widget.add_image(&t.icon_id(), icon);
                    report.loaded.push(t);
                }
                Err(e) => {
                    warn!(resource_type = %t, error = %e, "marker icon unavailable");
                    report.failed.push((t, e.to_string()));
                }
            }
        }

        if !widget.has_source(SOURCE_ID) {
            widget.add_clustered_source(SOURCE_ID, FeatureCollection::default(), self.options);
        }
        for layer in resource_layers() {
            if !widget.has_layer(&layer.id) {
                widget.add_layer(layer);
            }
        }

        self.set_state(SyncState::Ready);

        if let Some(data) = self.latest.clone() {
            if let Err(e) = widget.set_source_data(SOURCE_ID, data) {
                warn!(error = %e, "failed to apply pending resources");
            }
        }

        info!(
            loaded = report.loaded.len(),
            failed = report.failed.len(),
            "map ready"
        );
        report
    }

    /// Record `data` as the latest collection and apply it if the widget is ready
    pub fn push<W: MapWidget>(&mut self, widget: &mut W, data: FeatureCollection) -> Result<PushOutcome, MapError> {
        let ready = self.state() == SyncState::Ready;
        if ready {
            widget.set_source_data(SOURCE_ID, data.clone())?;
        }
        debug!(features = data.len(), applied = ready, "resources pushed to map");
        self.latest = Some(data);
        Ok(if ready {
            PushOutcome::Applied
        } else {
            PushOutcome::Deferred
        })
    }

    /// Fly into a cluster or focus a single marker
    pub fn handle_click<W: MapWidget>(&self, widget: &mut W, feature: ClickedFeature) -> Result<ClickOutcome, MapError> {
        match feature {
            ClickedFeature::Cluster { cluster_id, position } => {
                let zoom = widget.cluster_expansion_zoom(SOURCE_ID, cluster_id)?;
                let target = CameraTarget {
                    center: position,
                    zoom,
                    duration_ms: FLY_DURATION_MS,
                };
                widget.fly_to(target);
                Ok(ClickOutcome::Zoomed(target))
            }
            ClickedFeature::Point(resource) => {
                let center = resource
                    .location()
                    .filter(GeoPoint::is_valid)
                    .ok_or_else(|| MapError::Unmappable(resource.id.clone()))?;
                let target = CameraTarget {
                    center,
                    zoom: widget.zoom().max(POINT_FOCUS_ZOOM),
                    duration_ms: FLY_DURATION_MS,
                };
                widget.fly_to(target);
                Ok(ClickOutcome::Selected { resource, target })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cluster_style_steps() {
        assert_eq!(cluster_style(2), ("#60a5fa", 20.0));
        assert_eq!(cluster_style(9), ("#60a5fa", 20.0));
        assert_eq!(cluster_style(10), ("#3b82f6", 30.0));
        assert_eq!(cluster_style(29), ("#3b82f6", 30.0));
        assert_eq!(cluster_style(30), ("#1d4ed8", 40.0));
        assert_eq!(cluster_style(500), ("#1d4ed8", 40.0));
    }

    #[test]
    fn test_layer_definitions() {
        let layers = resource_layers();
        let ids: Vec<&str> = layers.iter().map(|l| l.id.as_str()).collect();
        assert_eq!(ids, [CLUSTER_LAYER_ID, CLUSTER_COUNT_LAYER_ID, POINT_LAYER_ID]);
        assert!(layers.iter().all(|l| l.source == SOURCE_ID));

        let points = layers[2].to_style_json();
        assert_eq!(points["type"], "symbol");
        assert_eq!(points["layout"]["icon-size"], 0.2);
        assert_eq!(points["filter"], json!(["!", ["has", "point_count"]]));

        let clusters = layers[0].to_style_json();
        assert_eq!(clusters["type"], "circle");
        assert!(clusters.get("layout").is_none());
    }
}
