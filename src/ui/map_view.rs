use egui::Align2;
use egui::Color32;
use egui::FontId;
use egui::Image;
use egui::OpenUrl;
use egui::Pos2;
use egui::Rect;
use egui::RichText;
use egui::Sense;
use egui::Shape;
use egui::Stroke;
use egui::Ui;
use egui::Vec2;

use crate::context::AppContext;
use crate::context::MapPopup;
use crate::context::PopupTarget;
use crate::geo::LatLng;
use crate::icons;
use crate::map::projection::TILE_SIZE;
use crate::map::projection::WorldPoint;
use crate::map::projection::segment_distance;
use crate::map::projection::visible_tiles;
use crate::media::MediaAsset;

const TRACK_COLOR: Color32 = Color32::from_rgba_premultiplied(0, 38, 191, 191);
const LIVE_FILL: Color32 = Color32::from_rgba_premultiplied(0, 38, 191, 191);
const MEDIA_FILL: Color32 = Color32::from_rgb(0xff, 0x66, 0x00);
const MAP_BACKGROUND: Color32 = Color32::from_rgb(0xdd, 0xe3, 0xe8);

const MARKER_RADIUS: f32 = 6.0;
/// Clicks closer than this to a marker or a track segment hit it.
const HIT_TOLERANCE: f64 = 8.0;
/// Scroll distance that amounts to one zoom level.
const SCROLL_PER_ZOOM: f32 = 60.0;

const THUMBNAIL_SIZE: Vec2 = Vec2::new(220.0, 160.0);

/// Something the user did on the map that the app must react to.
#[derive(Debug, Clone, PartialEq)]
pub enum MapAction {
    TrackClicked { track: usize, at: LatLng },
    MediaClicked(usize),
    LiveClicked,
    BackgroundClicked,
}

/// Per-widget input state that outlives a frame.
#[derive(Default)]
pub struct MapView {
    scroll_accum: f32,
}

impl MapView {
    pub fn show(&mut self, ui: &mut Ui, app: &mut AppContext) -> Option<MapAction> {
        let (response, painter) = ui.allocate_painter(ui.available_size(), Sense::click_and_drag());
        let rect = response.rect;
        app.set_map_size(rect.width() as f64, rect.height() as f64);

        if response.dragged() {
            let delta = response.drag_delta();
            app.viewport.pan_by(delta.x as f64, delta.y as f64);
        }

        if response.hovered() {
            self.scroll_accum += ui.input(|i| i.smooth_scroll_delta.y);
            let steps = (self.scroll_accum / SCROLL_PER_ZOOM).trunc();
            if steps != 0.0 {
                self.scroll_accum -= steps * SCROLL_PER_ZOOM;
                let anchor = response.hover_pos().map(|p| p - rect.center()).unwrap_or_default();
                app.viewport.zoom_around(steps as i32, (anchor.x as f64, anchor.y as f64));
            }
        }

        painter.rect_filled(rect, 0.0, MAP_BACKGROUND);
        let mut map_ui = ui.new_child(egui::UiBuilder::new().max_rect(rect));
        map_ui.set_clip_rect(rect);
        draw_tiles(&map_ui, rect, app);

        let center = rect.center();
        let to_screen = |point: LatLng| {
            let (x, y) = app.viewport.latlng_to_offset(point);
            center + Vec2::new(x as f32, y as f32)
        };

        if app.layers.tracks {
            for segment in app.tracks.iter().flat_map(|track| track.segments()) {
                let points: Vec<Pos2> = segment.iter().map(|p| to_screen(*p)).collect();
                painter.add(Shape::line(points, Stroke::new(3.0, TRACK_COLOR)));
            }

            if app.live.path().len() > 1 {
                let points: Vec<Pos2> = app.live.path().iter().map(|p| to_screen(*p)).collect();
                painter.add(Shape::line(points, Stroke::new(4.0, TRACK_COLOR)));
            }
            if let Some(position) = app.live.marker() {
                let pos = to_screen(position);
                painter.circle_filled(pos, MARKER_RADIUS, LIVE_FILL);
                painter.circle_stroke(pos, MARKER_RADIUS, Stroke::new(1.5, Color32::BLACK));
            }
        }

        if app.layers.media {
            for marker in app.media.markers() {
                let pos = to_screen(marker.position);
                painter.circle_filled(pos, MARKER_RADIUS, MEDIA_FILL);
                painter.circle_stroke(pos, MARKER_RADIUS, Stroke::new(1.5, Color32::WHITE));
            }
        }

        let source = app.layers.base.source();
        painter.text(rect.max - egui::vec2(5.0, 5.0), Align2::RIGHT_BOTTOM, source.attribution, FontId::proportional(10.0), Color32::from_black_alpha(170));

        if !response.clicked() {
            return None;
        }
        let click = response.interact_pointer_pos()?;
        let click_world = WorldPoint::new(click.x as f64, click.y as f64);
        let to_world = |point: LatLng| {
            let pos = to_screen(point);
            WorldPoint::new(pos.x as f64, pos.y as f64)
        };

        if app.layers.media {
            let hit = app.media.markers().iter().rposition(|m| to_world(m.position).distance(click_world) <= HIT_TOLERANCE);
            if let Some(index) = hit {
                return Some(MapAction::MediaClicked(index));
            }
        }

        if app.layers.tracks {
            if app.live.marker().is_some_and(|p| to_world(p).distance(click_world) <= HIT_TOLERANCE) {
                return Some(MapAction::LiveClicked);
            }

            for (index, track) in app.tracks.iter().enumerate().rev() {
                let hit = track
                    .segments()
                    .iter()
                    .flat_map(|segment| segment.windows(2))
                    .any(|pair| segment_distance(click_world, to_world(pair[0]), to_world(pair[1])) <= HIT_TOLERANCE);
                if hit {
                    let offset = click - center;
                    let at = app.viewport.offset_to_latlng((offset.x as f64, offset.y as f64));
                    return Some(MapAction::TrackClicked { track: index, at });
                }
            }
        }

        Some(MapAction::BackgroundClicked)
    }
}

fn draw_tiles(ui: &Ui, rect: Rect, app: &AppContext) {
    let source = app.layers.base.source();
    let zoom = app.viewport.zoom();
    if zoom > source.max_zoom {
        return;
    }

    let retina = ui.ctx().pixels_per_point() > 1.0;
    let tint = Color32::from_white_alpha((source.opacity * 255.0) as u8);
    let tile_size = Vec2::splat(TILE_SIZE as f32);
    for tile in visible_tiles(app.viewport.center(), zoom, rect.width() as f64, rect.height() as f64) {
        let min = rect.min + Vec2::new(tile.offset_x as f32, tile.offset_y as f32);
        Image::new(source.tile_url(tile.id, retina)).tint(tint).show_loading_spinner(false).paint_at(ui, Rect::from_min_size(min, tile_size));
    }
}

/// Draw the open popup, if any. Returns false once the user closed it.
pub fn show_popup(ui: &mut Ui, map_rect: Rect, app: &mut AppContext) -> bool {
    let Some(MapPopup { at, target }) = app.popup else {
        return true;
    };

    let (x, y) = app.viewport.latlng_to_offset(at);
    let anchor = map_rect.center() + Vec2::new(x as f32, y as f32);
    if !map_rect.contains(anchor) {
        return true;
    }

    let mut keep_open = true;
    egui::Area::new(egui::Id::new("map_popup")).order(egui::Order::Foreground).pivot(Align2::CENTER_BOTTOM).fixed_pos(anchor - Vec2::new(0.0, 10.0)).show(
        ui.ctx(),
        |ui| {
            egui::Frame::popup(ui.style()).show(ui, |ui| {
                ui.set_max_width(THUMBNAIL_SIZE.x + 20.0);
                ui.horizontal(|ui| {
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Min), |ui| {
                        if ui.small_button(icons::X).clicked() {
                            keep_open = false;
                        }
                    });
                });

                match target {
                    PopupTarget::Track(index) => {
                        if let Some(track) = app.tracks.get(index) {
                            let lines = track.summary_lines(&app.time_zone);
                            if let Some((name, rest)) = lines.split_first() {
                                ui.label(RichText::new(name).strong());
                                for (i, line) in rest.iter().enumerate() {
                                    if i == rest.len() - 1 {
                                        ui.label(RichText::new(line).small());
                                    } else {
                                        ui.label(line);
                                    }
                                }
                            }
                        }
                    }
                    PopupTarget::Media(index) => {
                        if let Some(marker) = app.media.markers().get(index) {
                            ui.label(RichText::new(&marker.title).strong());
                            if let Some(description) = marker.description.as_ref() {
                                ui.label(RichText::new(description).italics());
                            }
                            match marker.asset.as_ref() {
                                Some(MediaAsset::Video { url }) => {
                                    if ui.button(format!("{} Lire la vidéo", icons::PLAY)).clicked() {
                                        ui.ctx().open_url(OpenUrl::new_tab(url));
                                    }
                                }
                                Some(MediaAsset::Image { url, title }) => {
                                    let thumbnail = Image::new(url.as_str()).max_size(THUMBNAIL_SIZE).maintain_aspect_ratio(true).sense(Sense::click());
                                    let response = ui.add(thumbnail).on_hover_cursor(egui::CursorIcon::PointingHand);
                                    if response.clicked() {
                                        app.lightbox.open(url, title);
                                    }
                                }
                                None => {}
                            }
                        }
                    }
                    PopupTarget::Live => {
                        ui.label(RichText::new("Position actuelle").strong());
                        if let Some(fix) = app.live.last_fix() {
                            ui.label(format!("Dernier point : {}", fix.to_zoned(app.time_zone.clone()).strftime("%d.%m.%Y %H:%M")));
                        }
                    }
                }
            });
        },
    );

    keep_open
}
