//! New resource entry form

use eframe::egui::{self, Color32};
use resmap_app::resources::{locate, LocationProvider, NewResource};
use resmap_domain::constants::MUNICIPALITIES;
use resmap_types::{GeoPoint, ResourceStatus, ResourceType};

/// Form state, including raw coordinate text so partial input survives redraws
pub struct FormPanel {
    form: NewResource,
    latitude: String,
    longitude: String,
    quantity: String,
    error: Option<String>,
}

impl FormPanel {
    pub fn new() -> Self {
        let form = NewResource::default();
        Self {
            latitude: form.location.latitude.to_string(),
            longitude: form.location.longitude.to_string(),
            quantity: form.quantity.to_string(),
            form,
            error: None,
        }
    }

    pub fn set_error(&mut self, error: impl Into<String>) {
        self.error = Some(error.into());
    }

    /// Clear the form back to its defaults
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    fn parsed_form(&self) -> Result<NewResource, String> {
        let latitude: f64 = self
            .latitude
            .trim()
            .parse()
            .map_err(|_| "Latitude must be a number".to_string())?;
        let longitude: f64 = self
            .longitude
            .trim()
            .parse()
            .map_err(|_| "Longitude must be a number".to_string())?;
        let quantity: u32 = self
            .quantity
            .trim()
            .parse()
            .map_err(|_| "Quantity must be a whole number".to_string())?;

        let mut form = self.form.clone();
        form.location = GeoPoint::new(latitude, longitude);
        form.quantity = quantity.max(1);
        form.validate().map_err(|e| e.to_string())?;
        Ok(form)
    }

    /// Render the form. Returns a validated form when submitted.
    pub fn ui(&mut self, ui: &mut egui::Ui, location: &dyn LocationProvider) -> Option<NewResource> {
        let mut submitted = None;

        egui::Grid::new("new_resource_form")
            .num_columns(2)
            .spacing([8.0, 6.0])
            .show(ui, |ui| {
                ui.label("Title *");
                ui.text_edit_singleline(&mut self.form.title);
                ui.end_row();

                ui.label("Type");
                egui::ComboBox::from_id_salt("form_type")
                    .selected_text(self.form.resource_type.label())
                    .show_ui(ui, |ui| {
                        for t in ResourceType::ALL {
                            ui.selectable_value(&mut self.form.resource_type, t, t.label());
                        }
                    });
                ui.end_row();

                ui.label("Quantity");
                ui.text_edit_singleline(&mut self.quantity);
                ui.end_row();

                ui.label("Status");
                egui::ComboBox::from_id_salt("form_status")
                    .selected_text(self.form.status.label())
                    .show_ui(ui, |ui| {
                        for s in ResourceStatus::ALL {
                            ui.selectable_value(&mut self.form.status, s, s.label());
                        }
                    });
                ui.end_row();

                ui.label("Municipality");
                egui::ComboBox::from_id_salt("form_municipality")
                    .selected_text(self.form.municipality.as_str())
                    .show_ui(ui, |ui| {
                        for m in MUNICIPALITIES {
                            ui.selectable_value(&mut self.form.municipality, m.to_string(), m);
                        }
                    });
                ui.end_row();

                ui.label("Latitude *");
                ui.text_edit_singleline(&mut self.latitude);
                ui.end_row();

                ui.label("Longitude *");
                ui.text_edit_singleline(&mut self.longitude);
                ui.end_row();

                ui.label("Description");
                ui.text_edit_multiline(&mut self.form.description);
                ui.end_row();
            });

        ui.horizontal(|ui| {
            if ui.button("📍 Use my location").clicked() {
                match locate(location, &mut self.form) {
                    Ok(position) => {
                        self.latitude = position.latitude.to_string();
                        self.longitude = position.longitude.to_string();
                        self.error = None;
                    }
                    Err(e) => self.error = Some(e.to_string()),
                }
            }

            if ui.button("Save").clicked() {
                match self.parsed_form() {
                    Ok(form) => {
                        self.error = None;
                        submitted = Some(form);
                    }
                    Err(e) => self.error = Some(e),
                }
            }
        });

        if let Some(error) = &self.error {
            ui.colored_label(Color32::RED, error);
        }

        submitted
    }
}
