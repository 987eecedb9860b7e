//! Map canvas drawn from the headless widget

use std::collections::HashMap;

use eframe::egui::{self, Color32, ColorImage, FontId, Pos2, Rect, Sense, Stroke, TextureHandle, Vec2};
use resmap_app::config::Config;
use resmap_app::map::{open_map, MapSession};
use resmap_domain::FeatureCollection;
use resmap_map::sync::{cluster_style, ICON_SIZE};
use resmap_map::{ClickOutcome, MarkerIcon, RenderedFeature, SOURCE_ID};
use resmap_types::Resource;
use tracing::{error, warn};

use crate::dashboard_panel::status_color;

/// Smallest on-screen marker edge, in points
const MIN_MARKER_SIZE: f32 = 18.0;

pub struct MapView {
    session: Option<MapSession>,
    error: Option<String>,
    textures: HashMap<String, TextureHandle>,
}

impl MapView {
    /// Load icons and build the clustered source. Blocks until the map is ready.
    pub fn open(config: &Config, data: FeatureCollection) -> Self {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build();
        let result = match runtime {
            Ok(rt) => rt.block_on(open_map(config, data)),
            Err(e) => Err(e.into()),
        };

        match result {
            Ok(session) => Self {
                session: Some(session),
                error: None,
                textures: HashMap::new(),
            },
            Err(e) => {
                error!(error = %e, "failed to open map");
                Self {
                    session: None,
                    error: Some(e.to_string()),
                    textures: HashMap::new(),
                }
            }
        }
    }

    pub fn update(&mut self, data: FeatureCollection) {
        if let Some(session) = &mut self.session {
            if let Err(e) = session.update(data) {
                warn!(error = %e, "failed to update map data");
            }
        }
    }

    /// Number of marker icons that failed to load
    pub fn failed_icons(&self) -> usize {
        self.session.as_ref().map_or(0, |s| s.icons.failed.len())
    }

    fn texture(&mut self, ctx: &egui::Context, id: &str, icon: &MarkerIcon) -> TextureHandle {
        self.textures
            .entry(id.to_string())
            .or_insert_with(|| {
                let image = ColorImage::from_rgba_unmultiplied(
                    [icon.width as usize, icon.height as usize],
                    &icon.rgba,
                );
                ctx.load_texture(id, image, egui::TextureOptions::LINEAR)
            })
            .clone()
    }

    /// Draw the map. Returns the resource whose marker was clicked.
    pub fn ui(&mut self, ui: &mut egui::Ui) -> Option<Resource> {
        let Some(session) = self.session.as_ref() else {
            ui.colored_label(
                Color32::RED,
                format!("Map unavailable: {}", self.error.as_deref().unwrap_or("unknown error")),
            );
            return None;
        };
        let style_url = session.widget.style_url().to_string();
        let zoom = session.widget.camera().zoom;

        ui.horizontal(|ui| {
            ui.label(format!("Zoom {zoom:.1}"));
            if ui.small_button("+").clicked() {
                self.zoom_by(1.0);
            }
            if ui.small_button("−").clicked() {
                self.zoom_by(-1.0);
            }
            ui.label(egui::RichText::new(style_url).small().weak());
        });

        let (response, painter) = ui.allocate_painter(ui.available_size(), Sense::click_and_drag());
        let rect = response.rect;
        painter.rect_filled(rect, 4.0, Color32::from_rgb(0xe8, 0xee, 0xf1));
        draw_grid(&painter, rect);

        if response.dragged() {
            let delta = response.drag_delta();
            if let Some(session) = &mut self.session {
                session.widget.pan_by(f64::from(delta.x), f64::from(delta.y));
            }
        }
        if response.hovered() {
            let scroll = ui.input(|i| i.smooth_scroll_delta.y);
            if scroll != 0.0 {
                self.zoom_by(f64::from(scroll) / 200.0);
            }
        }

        let mut selected = None;
        if response.clicked() {
            if let Some(pointer) = response.interact_pointer_pos() {
                selected = self.click(rect, pointer);
            }
        }

        self.paint(ui.ctx(), &painter, rect);
        selected
    }

    fn zoom_by(&mut self, delta: f64) {
        if let Some(session) = &mut self.session {
            session.widget.zoom_by(delta);
        }
    }

    fn click(&mut self, rect: Rect, pointer: Pos2) -> Option<Resource> {
        let session = self.session.as_mut()?;
        let size = (f64::from(rect.width()), f64::from(rect.height()));
        let local = pointer - rect.min;
        let feature = session
            .widget
            .hit_test(SOURCE_ID, (f64::from(local.x), f64::from(local.y)), size)?;

        match session.sync.handle_click(&mut session.widget, feature) {
            Ok(ClickOutcome::Selected { resource, .. }) => Some(resource),
            Ok(ClickOutcome::Zoomed(_)) => None,
            Err(e) => {
                warn!(error = %e, "map click ignored");
                None
            }
        }
    }

    fn paint(&mut self, ctx: &egui::Context, painter: &egui::Painter, rect: Rect) {
        let Some(session) = self.session.as_ref() else {
            return;
        };
        let size = (f64::from(rect.width()), f64::from(rect.height()));
        let rendered = session.widget.rendered_features(SOURCE_ID);
        let icons: Vec<(String, Option<MarkerIcon>)> = rendered
            .iter()
            .filter_map(|f| match f {
                RenderedFeature::Point(feature) => {
                    let id = feature.properties.resource_type.icon_id();
                    let icon = session.widget.image(&id).cloned();
                    Some((id, icon))
                }
                RenderedFeature::Cluster { .. } => None,
            })
            .collect();
        let positions: Vec<Pos2> = rendered
            .iter()
            .map(|f| {
                let (x, y) = session.widget.to_screen(f.position(), size);
                rect.min + Vec2::new(x as f32, y as f32)
            })
            .collect();

        let mut icons = icons.into_iter();
        for (feature, pos) in rendered.iter().zip(positions) {
            match feature {
                RenderedFeature::Cluster { point_count, .. } => {
                    if !rect.expand(40.0).contains(pos) {
                        continue;
                    }
                    let (hex, radius) = cluster_style(*point_count);
                    let color = Color32::from_hex(hex).unwrap_or(Color32::LIGHT_BLUE);
                    painter.circle(pos, radius as f32, color, Stroke::new(1.5, Color32::WHITE));
                    painter.text(
                        pos,
                        egui::Align2::CENTER_CENTER,
                        abbreviate(*point_count),
                        FontId::proportional(13.0),
                        Color32::WHITE,
                    );
                }
                RenderedFeature::Point(f) => {
                    let Some((id, icon)) = icons.next() else {
                        continue;
                    };
                    if !rect.expand(20.0).contains(pos) {
                        continue;
                    }
                    match icon {
                        Some(icon) => {
                            let texture = self.texture(ctx, &id, &icon);
                            let scale = ICON_SIZE as f32;
                            let edge = (icon.width.max(icon.height) as f32 * scale).max(MIN_MARKER_SIZE);
                            let aspect = icon.width as f32 / icon.height.max(1) as f32;
                            let marker = Vec2::new(edge * aspect.min(1.0), edge / aspect.max(1.0));
                            painter.image(
                                texture.id(),
                                Rect::from_center_size(pos, marker),
                                Rect::from_min_max(Pos2::ZERO, Pos2::new(1.0, 1.0)),
                                Color32::WHITE,
                            );
                        }
                        // marker without an image still renders
                        None => {
                            painter.circle(
                                pos,
                                7.0,
                                status_color(f.properties.status),
                                Stroke::new(1.5, Color32::WHITE),
                            );
                        }
                    }
                }
            }
        }
    }
}

fn draw_grid(painter: &egui::Painter, rect: Rect) {
    let stroke = Stroke::new(0.5, Color32::from_rgb(0xd0, 0xd8, 0xdc));
    let step = 64.0;
    let mut x = rect.left();
    while x < rect.right() {
        painter.line_segment([Pos2::new(x, rect.top()), Pos2::new(x, rect.bottom())], stroke);
        x += step;
    }
    let mut y = rect.top();
    while y < rect.bottom() {
        painter.line_segment([Pos2::new(rect.left(), y), Pos2::new(rect.right(), y)], stroke);
        y += step;
    }
}

/// `point_count_abbreviated` formatting: 1234 -> "1.2k"
fn abbreviate(count: usize) -> String {
    if count >= 10_000 {
        format!("{}k", count / 1000)
    } else if count >= 1000 {
        format!("{:.1}k", count as f64 / 1000.0)
    } else {
        count.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_abbreviate() {
        assert_eq!(abbreviate(7), "7");
        assert_eq!(abbreviate(999), "999");
        assert_eq!(abbreviate(1234), "1.2k");
        assert_eq!(abbreviate(25_000), "25k");
    }
}
