use egui::Color32;
use egui::Context;
use egui::Image;
use egui::RichText;
use egui::Sense;

use crate::icons;

#[derive(Debug, Clone, PartialEq)]
pub struct LightboxAsset {
    pub url: String,
    pub caption: String,
}

/// Full-window viewer for a single media asset.
#[derive(Debug, Default)]
pub struct Lightbox {
    current: Option<LightboxAsset>,
}

impl Lightbox {
    /// Show `url`. An empty URL leaves the lightbox untouched.
    pub fn open(&mut self, url: &str, title: &str) {
        if url.is_empty() {
            return;
        }
        self.current = Some(LightboxAsset { url: url.to_string(), caption: title.to_string() });
    }

    pub fn close(&mut self) {
        self.current = None;
    }

    pub fn is_open(&self) -> bool {
        self.current.is_some()
    }

    pub fn current(&self) -> Option<&LightboxAsset> {
        self.current.as_ref()
    }

    pub fn draw(&mut self, ctx: &Context) {
        let Some(asset) = self.current.as_ref() else {
            return;
        };

        let mut close = ctx.input(|i| i.key_pressed(egui::Key::Escape));
        let screen = ctx.screen_rect();

        egui::Area::new(egui::Id::new("media_lightbox")).order(egui::Order::Foreground).fixed_pos(screen.min).show(ctx, |ui| {
            let backdrop = ui.allocate_rect(screen, Sense::click());
            ui.painter().rect_filled(screen, 0.0, Color32::from_black_alpha(220));
            if backdrop.clicked() {
                close = true;
            }

            let content = screen.shrink(48.0);
            ui.scope_builder(egui::UiBuilder::new().max_rect(content), |ui| {
                ui.vertical_centered(|ui| {
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Min), |ui| {
                        if ui.button(RichText::new(icons::X).size(20.0)).clicked() {
                            close = true;
                        }
                    });
                    let max_size = ui.available_size() - egui::vec2(0.0, 32.0);
                    ui.add(Image::new(asset.url.as_str()).max_size(max_size).maintain_aspect_ratio(true).sense(Sense::click()));
                    if !asset.caption.is_empty() {
                        ui.label(RichText::new(&asset.caption).color(Color32::WHITE));
                    }
                });
            });
        });

        if close {
            self.close();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_then_close_clears_asset() {
        let mut lightbox = Lightbox::default();
        lightbox.open("https://api/uploads/a.png", "Coucher de soleil");
        assert_eq!(lightbox.current().map(|a| a.url.as_str()), Some("https://api/uploads/a.png"));

        lightbox.close();
        assert!(lightbox.current().is_none());
        lightbox.close();
        assert!(!lightbox.is_open());
    }

    #[test]
    fn empty_url_is_ignored() {
        let mut lightbox = Lightbox::default();
        lightbox.open("", "nothing");
        assert!(!lightbox.is_open());
    }
}
