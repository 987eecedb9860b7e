//! Main application structure

use eframe::egui::{self, Color32, RichText};
use egui_extras::{Column, TableBuilder};
use resmap_app::config::Config;
use resmap_app::dashboard::{build_report, DashboardReport};
use resmap_app::export::export_to_excel;
use resmap_app::repository::{open_resource_store, open_resource_store_at};
use resmap_app::resources::{add_resource, load_or_demo, FixedLocation, NewResource};
use resmap_domain::ResourceFilter;
use resmap_store::{MemoryResourceStore, ResourceStore};
use resmap_types::{Resource, ResourceType};
use tracing::{error, info, warn};

use crate::dashboard_panel::{show_breakdowns, show_cards, status_color};
use crate::form_panel::FormPanel;
use crate::map_view::MapView;

/// Main application state
pub struct ResmapApp {
    config: Config,
    store: Box<dyn ResourceStore>,
    /// Full collection, stored or demo
    resources: Vec<Resource>,
    demo: bool,
    filter: ResourceFilter,
    report: DashboardReport,
    map: MapView,
    form: FormPanel,
    show_form: bool,
    selected: Option<Resource>,
    status_message: Option<(String, bool)>,
}

impl ResmapApp {
    pub fn new(cc: &eframe::CreationContext<'_>) -> Self {
        egui_extras::install_image_loaders(&cc.egui_ctx);

        let mut style = (*cc.egui_ctx.style()).clone();
        style.interaction.tooltip_delay = 0.5;
        style.animation_time = 0.1;
        cc.egui_ctx.set_style(style);

        let config = Config::load().unwrap_or_else(|e| {
            warn!(error = %e, "using default configuration");
            Config::default()
        });
        let store = Self::open_store(&config);

        let loaded = load_or_demo(store.as_ref(), &config);
        let filter = ResourceFilter::all();
        let report = build_report(&loaded.resources, &filter, config.top_types);
        let map = MapView::open(&config, report.features());
        if map.failed_icons() > 0 {
            warn!(failed = map.failed_icons(), assets = %config.assets_dir().display(), "some marker icons are missing");
        }

        Self {
            config,
            store,
            resources: loaded.resources,
            demo: loaded.demo,
            filter,
            report,
            map,
            form: FormPanel::new(),
            show_form: false,
            selected: None,
            status_message: None,
        }
    }

    /// Configured store, then a temp directory, then memory
    fn open_store(config: &Config) -> Box<dyn ResourceStore> {
        match open_resource_store(config) {
            Ok(store) => return Box::new(store),
            Err(e) => warn!(error = %e, "failed to open configured store"),
        }
        match open_resource_store_at(std::env::temp_dir().join("resmap")) {
            Ok(store) => Box::new(store),
            Err(e) => {
                error!(error = %e, "failed to open fallback store, changes will not persist");
                Box::new(MemoryResourceStore::new())
            }
        }
    }

    /// Recompute aggregates and push visible records to the map
    fn refresh(&mut self) {
        self.report = build_report(&self.resources, &self.filter, self.config.top_types);
        self.map.update(self.report.features());
        if let Some(selected) = &self.selected {
            if !self.report.visible.iter().any(|r| r.id == selected.id) {
                self.selected = None;
            }
        }
    }

    fn reload(&mut self) {
        let loaded = load_or_demo(self.store.as_ref(), &self.config);
        self.resources = loaded.resources;
        self.demo = loaded.demo;
        self.refresh();
    }

    fn save_form(&mut self, form: NewResource) {
        match add_resource(self.store.as_ref(), form) {
            Ok(resource) => {
                info!(id = %resource.id, "resource saved from form");
                self.status_message = Some((format!("Added {}", resource.title), false));
                self.form.reset();
                self.show_form = false;
                self.reload();
            }
            Err(e) => self.form.set_error(e.to_string()),
        }
    }

    fn export(&mut self) {
        let file = rfd::FileDialog::new()
            .add_filter("Excel", &["xlsx"])
            .set_file_name("resources.xlsx")
            .set_title("Export resources")
            .save_file();

        if let Some(path) = file {
            self.status_message = Some(match export_to_excel(&self.report, &path) {
                Ok(()) => (format!("Exported to {}", path.display()), false),
                Err(e) => (format!("Export failed: {e}"), true),
            });
        }
    }

    fn render_filters(&mut self, ui: &mut egui::Ui) {
        ui.heading("Filters");
        let search = ui.add(
            egui::TextEdit::singleline(self.filter.query_mut()).hint_text("Search title, municipality, description"),
        );
        let mut changed = search.changed();

        ui.horizontal(|ui| {
            if ui.small_button("All").clicked() {
                let query = self.filter.query().to_string();
                self.filter = ResourceFilter::all().with_query(query);
                changed = true;
            }
            if ui.small_button("None").clicked() {
                let query = self.filter.query().to_string();
                self.filter = ResourceFilter::none().with_query(query);
                changed = true;
            }
        });

        ui.separator();
        egui::ScrollArea::vertical().id_salt("type_filters").max_height(320.0).show(ui, |ui| {
            for t in ResourceType::ALL {
                let mut active = self.filter.is_active(t);
                if ui.checkbox(&mut active, t.label()).changed() {
                    self.filter.toggle(t);
                    changed = true;
                }
            }
        });

        if changed {
            self.refresh();
        }

        ui.separator();
        if ui.button("➕ Add resource").clicked() {
            self.show_form = true;
        }
        if ui.button("📊 Export to Excel").clicked() {
            self.export();
        }
        if ui.button("⟳ Reload").clicked() {
            self.reload();
        }
    }

    fn render_table(&mut self, ui: &mut egui::Ui) {
        let mut clicked = None;
        let selected_id = self.selected.as_ref().map(|r| r.id.clone());
        let rows = &self.report.visible;

        TableBuilder::new(ui)
            .striped(true)
            .resizable(true)
            .sense(egui::Sense::click())
            .column(Column::initial(200.0).at_least(80.0))
            .column(Column::initial(160.0))
            .column(Column::auto())
            .column(Column::initial(90.0))
            .column(Column::remainder())
            .header(20.0, |mut header| {
                for title in ["Title", "Type", "Qty", "Status", "Municipality"] {
                    header.col(|ui| {
                        ui.strong(title);
                    });
                }
            })
            .body(|body| {
                body.rows(20.0, rows.len(), |mut row| {
                    let r = &rows[row.index()];
                    row.set_selected(selected_id.as_deref() == Some(r.id.as_str()));
                    row.col(|ui| {
                        ui.label(&r.title);
                    });
                    row.col(|ui| {
                        ui.label(r.resource_type.label());
                    });
                    row.col(|ui| {
                        ui.label(r.quantity.to_string());
                    });
                    row.col(|ui| {
                        ui.colored_label(status_color(r.status), r.status.label());
                    });
                    row.col(|ui| {
                        ui.label(&r.municipality);
                    });
                    if row.response().clicked() {
                        clicked = Some(r.clone());
                    }
                });
            });

        if clicked.is_some() {
            self.selected = clicked;
        }
    }

    fn render_details(&mut self, ui: &mut egui::Ui) {
        let Some(r) = &self.selected else {
            ui.label(RichText::new("Select a marker or row").weak());
            return;
        };

        ui.heading(&r.title);
        ui.colored_label(status_color(r.status), r.status.label());
        egui::Grid::new("resource_details").num_columns(2).show(ui, |ui| {
            ui.label("Type");
            ui.label(r.resource_type.label());
            ui.end_row();
            ui.label("Quantity");
            ui.label(r.quantity.to_string());
            ui.end_row();
            ui.label("Municipality");
            ui.label(if r.municipality.is_empty() { "-" } else { r.municipality.as_str() });
            ui.end_row();
            ui.label("Location");
            ui.label(match r.location() {
                Some(location) => format!("{:.6}, {:.6}", location.latitude, location.longitude),
                None => "-".to_string(),
            });
            ui.end_row();
            if let Some(created) = r.created_at {
                ui.label("Created");
                ui.label(created.format("%Y-%m-%d %H:%M").to_string());
                ui.end_row();
            }
            ui.label("ID");
            ui.label(RichText::new(&r.id).small().monospace());
            ui.end_row();
        });
        if !r.description.is_empty() {
            ui.separator();
            ui.label(&r.description);
        }
        ui.separator();
        if ui.button("Close").clicked() {
            self.selected = None;
        }
    }
}

impl eframe::App for ResmapApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        egui::TopBottomPanel::top("dashboard").show(ctx, |ui| {
            ui.add_space(4.0);
            show_cards(ui, &self.report, self.demo);
            if let Some((message, is_error)) = &self.status_message {
                let color = if *is_error { Color32::RED } else { Color32::DARK_GREEN };
                ui.colored_label(color, message);
            }
            ui.add_space(4.0);
        });

        egui::SidePanel::left("filters").default_width(220.0).show(ctx, |ui| {
            self.render_filters(ui);
        });

        egui::SidePanel::right("details").default_width(260.0).show(ctx, |ui| {
            egui::ScrollArea::vertical().show(ui, |ui| {
                self.render_details(ui);
                ui.separator();
                show_breakdowns(ui, &self.report);
            });
        });

        egui::TopBottomPanel::bottom("table")
            .resizable(true)
            .default_height(220.0)
            .show(ctx, |ui| {
                self.render_table(ui);
            });

        egui::CentralPanel::default().show(ctx, |ui| {
            if let Some(resource) = self.map.ui(ui) {
                self.selected = Some(resource);
            }
        });

        if self.show_form {
            let mut open = true;
            let mut submitted = None;
            let location = FixedLocation(self.config.home);
            egui::Window::new("Add Resource")
                .open(&mut open)
                .resizable(false)
                .collapsible(false)
                .show(ctx, |ui| {
                    submitted = self.form.ui(ui, &location);
                });
            if let Some(form) = submitted {
                self.save_form(form);
            } else if !open {
                self.show_form = false;
            }
        }
    }
}
