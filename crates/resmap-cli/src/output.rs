//! Output formatting module

use resmap_app::dashboard::DashboardReport;
use resmap_map::{Camera, IconLoadReport, RenderedFeature};
use resmap_types::{OutputFormat, Resource, ResourceStatus, ResourceType, Result};
use serde::Serialize;

fn truncate(s: &str, width: usize) -> String {
    if s.chars().count() > width {
        let head: String = s.chars().take(width.saturating_sub(3)).collect();
        format!("{head}...")
    } else {
        s.to_string()
    }
}

fn coordinate(value: Option<f64>) -> String {
    value.map_or_else(|| "-".to_string(), |v| format!("{v:.5}"))
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub fn output_resources(output_format: OutputFormat, resources: &[Resource], total: usize) -> Result<()> {
    if output_format == OutputFormat::Json {
        return print_json(resources);
    }

    println!("Resources");
    println!("=========");
    println!("Showing {} of {}", resources.len(), total);
    println!();

    if resources.is_empty() {
        println!("No resources found.");
        return Ok(());
    }

    println!(
        "{:<12} {:<30} {:<22} {:>4} {:<12} {:<14} {:>10} {:>11}",
        "ID", "Title", "Type", "Qty", "Status", "Municipality", "Lat", "Lon"
    );
    println!("{}", "-".repeat(122));

    for r in resources {
        println!(
            "{:<12} {:<30} {:<22} {:>4} {:<12} {:<14} {:>10} {:>11}",
            truncate(&r.id, 12),
            truncate(&r.title, 30),
            r.resource_type.label(),
            r.quantity,
            r.status.label(),
            truncate(&r.municipality, 14),
            coordinate(r.latitude),
            coordinate(r.longitude)
        );
    }

    Ok(())
}

pub fn output_dashboard(output_format: OutputFormat, report: &DashboardReport) -> Result<()> {
    if output_format == OutputFormat::Json {
        #[derive(Serialize)]
        struct View<'a> {
            stats: &'a resmap_domain::service::DashboardStats,
            types: &'a [resmap_domain::service::TypeCount],
            municipalities: &'a [resmap_domain::service::MunicipalityStats],
            recent: &'a [Resource],
        }
        return print_json(&View {
            stats: &report.stats,
            types: &report.types,
            municipalities: &report.municipalities,
            recent: &report.recent,
        });
    }

    let stats = &report.stats;
    println!("\nDashboard");
    println!("=========");
    println!("Total resources:   {}", stats.total_resources);
    println!("Total quantity:    {}", stats.total_quantity);
    println!("Readiness:         {}%", stats.readiness_percentage());
    println!("Municipalities:    {}", stats.municipality_count);
    println!("Avg/municipality:  {}", stats.average_per_municipality);
    if let Some((name, count)) = &stats.top_municipality {
        println!("Top municipality:  {} ({})", display_name(name), count);
    }
    if let Some(t) = &stats.most_common_type {
        println!("Most common type:  {} ({})", t.resource_type.label(), t.count);
    }
    if let Some(updated) = stats.last_updated {
        println!("Last updated:      {}", updated.format("%Y-%m-%d %H:%M"));
    }

    println!("\n--- Status ---");
    for status in ResourceStatus::ALL {
        let s = stats.status(status);
        println!("{:<12} {:>5} {:>4}%", status.label(), s.count, s.percentage);
    }

    println!("\n--- Types ---");
    if report.types.is_empty() {
        println!("(none)");
    }
    for t in &report.types {
        println!("{:<24} {:>5} {:>4}%", t.resource_type.label(), t.count, t.percentage);
    }

    println!("\n--- Municipalities ---");
    if !report.municipalities.is_empty() {
        println!(
            "{:<16} {:>6} {:>6} {:>9} {:>12} {:>5}",
            "Name", "Total", "Ready", "Deployed", "Maintenance", "%"
        );
    }
    for m in &report.municipalities {
        println!(
            "{:<16} {:>6} {:>6} {:>9} {:>12} {:>4}%",
            truncate(display_name(&m.name), 16),
            m.count,
            m.ready,
            m.deployed,
            m.maintenance,
            m.percentage
        );
    }

    println!("\n--- Recent Activity ---");
    for r in &report.recent {
        let created = r
            .created_at
            .map(|t| t.format("%m/%d %H:%M").to_string())
            .unwrap_or_else(|| "-".to_string());
        println!("{:<12} {:<30} {}", created, truncate(&r.title, 30), r.status.label());
    }

    Ok(())
}

fn display_name(name: &str) -> &str {
    if name.is_empty() {
        "(none)"
    } else {
        name
    }
}

pub fn output_types(output_format: OutputFormat) -> Result<()> {
    if output_format == OutputFormat::Json {
        #[derive(Serialize)]
        struct TypeInfo {
            id: ResourceType,
            label: &'static str,
            icon: String,
        }
        let types: Vec<TypeInfo> = ResourceType::ALL
            .into_iter()
            .map(|t| TypeInfo {
                id: t,
                label: t.label(),
                icon: t.icon_path(),
            })
            .collect();
        return print_json(&types);
    }

    println!("{:<12} {:<24} {}", "ID", "Label", "Icon");
    println!("{}", "-".repeat(56));
    for t in ResourceType::ALL {
        println!("{:<12} {:<24} {}", t.as_str(), t.label(), t.icon_path());
    }
    Ok(())
}

pub fn output_map(
    output_format: OutputFormat,
    camera: Camera,
    icons: &IconLoadReport,
    rendered: &[RenderedFeature],
) -> Result<()> {
    if output_format == OutputFormat::Json {
        #[derive(Serialize)]
        #[serde(tag = "kind", rename_all = "lowercase")]
        enum Item<'a> {
            Cluster {
                id: u64,
                point_count: usize,
                latitude: f64,
                longitude: f64,
            },
            Point {
                id: &'a str,
                #[serde(rename = "type")]
                resource_type: ResourceType,
                latitude: f64,
                longitude: f64,
            },
        }
        #[derive(Serialize)]
        struct View<'a> {
            camera: Camera,
            icons_failed: Vec<ResourceType>,
            features: Vec<Item<'a>>,
        }
        let features = rendered
            .iter()
            .map(|f| match f {
                RenderedFeature::Cluster {
                    cluster_id,
                    point_count,
                    position,
                } => Item::Cluster {
                    id: *cluster_id,
                    point_count: *point_count,
                    latitude: position.latitude,
                    longitude: position.longitude,
                },
                RenderedFeature::Point(feature) => Item::Point {
                    id: &feature.properties.id,
                    resource_type: feature.properties.resource_type,
                    latitude: feature.latitude(),
                    longitude: feature.longitude(),
                },
            })
            .collect();
        return print_json(&View {
            camera,
            icons_failed: icons.failed.iter().map(|(t, _)| *t).collect(),
            features,
        });
    }

    println!("\nMap");
    println!("===");
    println!(
        "Center:   {:.5}, {:.5}",
        camera.center.latitude, camera.center.longitude
    );
    println!("Zoom:     {:.1}", camera.zoom);
    println!(
        "Icons:    {} loaded, {} skipped, {} failed",
        icons.loaded.len(),
        icons.skipped.len(),
        icons.failed.len()
    );
    for (t, reason) in &icons.failed {
        println!("  ✗ {:<12} {}", t.as_str(), reason);
    }

    println!();
    let clusters = rendered
        .iter()
        .filter(|f| matches!(f, RenderedFeature::Cluster { .. }))
        .count();
    println!(
        "Rendered: {} clusters, {} markers",
        clusters,
        rendered.len() - clusters
    );
    for f in rendered {
        match f {
            RenderedFeature::Cluster {
                cluster_id,
                point_count,
                position,
            } => println!(
                "  cluster #{:<8} {:>4} pts  {:.5}, {:.5}",
                cluster_id, point_count, position.latitude, position.longitude
            ),
            RenderedFeature::Point(feature) => println!(
                "  marker  {:<12} {:<22} {:.5}, {:.5}",
                truncate(&feature.properties.id, 12),
                feature.properties.resource_type.label(),
                feature.latitude(),
                feature.longitude()
            ),
        }
    }

    Ok(())
}
