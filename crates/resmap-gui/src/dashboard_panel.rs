//! Dashboard cards and breakdowns

use eframe::egui::{self, Color32, RichText};
use resmap_app::dashboard::DashboardReport;
use resmap_types::ResourceStatus;

pub fn status_color(status: ResourceStatus) -> Color32 {
    let [r, g, b] = status.color();
    Color32::from_rgb(r, g, b)
}

fn card(ui: &mut egui::Ui, title: &str, value: String, detail: Option<String>) {
    egui::Frame::group(ui.style())
        .inner_margin(egui::Margin::same(8))
        .show(ui, |ui| {
            ui.set_min_width(130.0);
            ui.vertical(|ui| {
                ui.label(RichText::new(title).small().weak());
                ui.label(RichText::new(value).size(22.0).strong());
                if let Some(detail) = detail {
                    ui.label(RichText::new(detail).small());
                }
            });
        });
}

/// Headline cards shown above the map
pub fn show_cards(ui: &mut egui::Ui, report: &DashboardReport, demo: bool) {
    let stats = &report.stats;
    ui.horizontal_wrapped(|ui| {
        card(
            ui,
            "Total Resources",
            stats.total_resources.to_string(),
            Some(format!("{} units", stats.total_quantity)),
        );
        card(
            ui,
            "Readiness",
            format!("{}%", stats.readiness_percentage()),
            Some(format!("{} ready", stats.status(ResourceStatus::Ready).count)),
        );
        card(
            ui,
            "Municipalities",
            stats.municipality_count.to_string(),
            Some(format!("avg {} each", stats.average_per_municipality)),
        );
        card(
            ui,
            "Top Municipality",
            stats
                .top_municipality
                .as_ref()
                .map(|(name, _)| if name.is_empty() { "(none)".to_string() } else { name.clone() })
                .unwrap_or_else(|| "-".to_string()),
            stats.top_municipality.as_ref().map(|(_, n)| format!("{n} resources")),
        );
        card(
            ui,
            "Most Common",
            stats
                .most_common_type
                .map(|t| t.resource_type.label().to_string())
                .unwrap_or_else(|| "-".to_string()),
            stats.most_common_type.map(|t| format!("{} resources", t.count)),
        );

        if demo {
            ui.label(RichText::new("Demo data (not saved)").color(Color32::from_rgb(0xea, 0xb3, 0x08)));
        }
    });
}

/// Status bars, type distribution, municipalities and recent activity
pub fn show_breakdowns(ui: &mut egui::Ui, report: &DashboardReport) {
    let stats = &report.stats;

    ui.heading("Status");
    for status in ResourceStatus::ALL {
        let s = stats.status(status);
        ui.horizontal(|ui| {
            ui.colored_label(status_color(status), "●");
            ui.label(format!("{:<12}", status.label()));
            ui.add(
                egui::ProgressBar::new(s.percentage as f32 / 100.0)
                    .desired_width(120.0)
                    .text(format!("{} ({}%)", s.count, s.percentage)),
            );
        });
    }

    ui.separator();
    ui.heading("Types");
    if report.types.is_empty() {
        ui.label(RichText::new("No resources").weak());
    }
    for t in &report.types {
        ui.horizontal(|ui| {
            ui.label(t.resource_type.label());
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                ui.label(format!("{} ({}%)", t.count, t.percentage));
            });
        });
    }

    ui.separator();
    ui.heading("Municipalities");
    for m in &report.municipalities {
        let name = if m.name.is_empty() { "(none)" } else { m.name.as_str() };
        ui.collapsing(format!("{name}  {}  ({}%)", m.count, m.percentage), |ui| {
            ui.colored_label(status_color(ResourceStatus::Ready), format!("Ready: {}", m.ready));
            ui.colored_label(status_color(ResourceStatus::Deployed), format!("Deployed: {}", m.deployed));
            ui.colored_label(
                status_color(ResourceStatus::Maintenance),
                format!("Maintenance: {}", m.maintenance),
            );
        });
    }

    ui.separator();
    ui.heading("Recent Activity");
    for r in &report.recent {
        ui.horizontal(|ui| {
            ui.colored_label(status_color(r.status), "●");
            ui.label(&r.title);
            if let Some(created) = r.created_at {
                ui.label(RichText::new(created.format("%m/%d %H:%M").to_string()).small().weak());
            }
        });
    }
}
