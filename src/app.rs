use std::path::Path;
use std::sync::Arc;
use std::sync::mpsc::Receiver;
use std::time::Instant;

use egui::Context;
use egui::Ui;
use tokio::runtime::Runtime;
use tracing::debug;

use crate::api::ApiClient;
use crate::context::AppContext;
use crate::context::MapPopup;
use crate::context::PopupTarget;
use crate::events;
use crate::events::EventSender;
use crate::events::ViewerEvent;
use crate::icon_str;
use crate::icons;
use crate::live::LivePoller;
use crate::settings::CONFIG_FILE_NAME;
use crate::settings::ViewerConfig;
use crate::task;
use crate::ui::layer_control::show_layer_control;
use crate::ui::map_view::MapAction;
use crate::ui::map_view::MapView;
use crate::ui::map_view::show_popup;
use crate::ui::media_form::FormAction;
use crate::ui::media_form::show_media_form;

pub struct TraceViewerApp {
    context: AppContext,
    map_view: MapView,
    api: ApiClient,
    events: EventSender,
    event_receiver: Receiver<ViewerEvent>,
    // Stopped on drop, before the runtime below goes away
    live_poller: Option<LivePoller>,
    runtime: Arc<Runtime>,
}

impl TraceViewerApp {
    /// Called once before the first frame.
    pub fn new(cc: &eframe::CreationContext<'_>) -> Self {
        let mut fonts = egui::FontDefinitions::default();
        egui_phosphor::add_to_fonts(&mut fonts, egui_phosphor::Variant::Regular);
        cc.egui_ctx.set_fonts(fonts);
        egui_extras::install_image_loaders(&cc.egui_ctx);
        cc.egui_ctx.set_theme(egui::Theme::Light);

        let config = ViewerConfig::load_or_default(Path::new(CONFIG_FILE_NAME));
        let runtime = Arc::new(Runtime::new().expect("failed to create tokio runtime"));
        Self::with_config(config, runtime, Some(cc.egui_ctx.clone()))
    }

    fn with_config(config: ViewerConfig, runtime: Arc<Runtime>, egui_ctx: Option<Context>) -> Self {
        let api = ApiClient::new(config.api_base.clone());
        let (events, event_receiver) = events::channel(egui_ctx);
        let context = AppContext::new(config);

        let mut app = Self { context, map_view: MapView::default(), api, events, event_receiver, live_poller: None, runtime };
        app.begin_startup_tasks();
        app
    }

    fn begin_startup_tasks(&mut self) {
        let handle = self.runtime.handle();
        debug!("starting background tasks against {}", self.api.base());
        task::start_track_loading(handle, &self.api, &self.context.config.tracks, &self.events);
        task::start_media_listing(handle, &self.api, &self.events);
        self.live_poller = Some(task::start_live_polling(handle, &self.api, &self.context.config, &self.events));
    }

    fn drain_events(&mut self) {
        let now = Instant::now();
        while let Ok(event) = self.event_receiver.try_recv() {
            self.context.handle_event(event, now);
        }
    }

    fn handle_map_action(&mut self, action: MapAction) {
        match action {
            MapAction::TrackClicked { track, at } => {
                self.context.popup = Some(MapPopup { at, target: PopupTarget::Track(track) });
                if let Some(track) = self.context.tracks.get(track) {
                    self.events.send(ViewerEvent::LocationSelected { track: track.name().to_string(), at });
                }
            }
            MapAction::MediaClicked(index) => {
                if let Some(marker) = self.context.media.markers().get(index) {
                    self.context.popup = Some(MapPopup { at: marker.position, target: PopupTarget::Media(index) });
                }
            }
            MapAction::LiveClicked => {
                if let Some(at) = self.context.live.marker() {
                    self.context.popup = Some(MapPopup { at, target: PopupTarget::Live });
                }
            }
            MapAction::BackgroundClicked => self.context.popup = None,
        }
    }

    fn handle_form_action(&mut self, action: FormAction) {
        match action {
            FormAction::Submit => match self.context.submit_form() {
                Ok(request) => task::start_upload(self.runtime.handle(), &self.api, request, &self.events),
                Err(e) => debug!("media form not submitted: {}", e),
            },
            FormAction::Cancel => self.context.form.cancel(),
        }
    }

    fn build_top_panel(&mut self, ui: &mut Ui) {
        egui::MenuBar::new().ui(ui, |ui| {
            if ui.button(icon_str!(icons::ARROWS_IN, "Recentrer")).clicked() {
                self.context.reset_view();
            }
            ui.separator();
            let viewport = &mut self.context.viewport;
            let zoom = viewport.zoom();
            if ui.add_enabled(zoom > viewport.min_zoom(), egui::Button::new(icons::MINUS)).clicked() {
                viewport.set_zoom(zoom as i32 - 1);
            }
            ui.label(format!("Zoom {zoom}"));
            if ui.add_enabled(zoom < viewport.max_zoom(), egui::Button::new(icons::PLUS)).clicked() {
                viewport.set_zoom(zoom as i32 + 1);
            }
            ui.separator();
            ui.menu_button(icon_str!(icons::STACK, "Couches"), |ui| {
                show_layer_control(ui, &mut self.context.layers);
            });
        });
    }

    fn build_bottom_panel(&self, ui: &mut Ui) {
        ui.horizontal(|ui| {
            ui.label(format!("{} {} traces", icons::PATH, self.context.tracks.len()));
            ui.separator();
            ui.label(format!("{} {} médias", icons::IMAGE, self.context.media.len()));
            ui.separator();
            match self.context.live.marker() {
                Some(position) => {
                    let mut text = format!("{} {:.4}, {:.4}", icons::BROADCAST, position.lat, position.lng);
                    if let Some(fix) = self.context.live.last_fix() {
                        text.push_str(&format!(" ({})", fix.to_zoned(self.context.time_zone.clone()).strftime("%d.%m.%Y %H:%M")));
                    }
                    ui.label(text);
                }
                None => {
                    ui.weak(format!("{} pas de position live", icons::BROADCAST));
                }
            }
        });
    }

    fn update_impl(&mut self, ctx: &Context) {
        self.drain_events();

        egui::TopBottomPanel::top("top_panel").show(ctx, |ui| {
            self.build_top_panel(ui);
        });

        egui::TopBottomPanel::bottom("status_panel").show(ctx, |ui| {
            self.build_bottom_panel(ui);
        });

        let mut map_action = None;
        let mut map_rect = egui::Rect::NOTHING;
        egui::CentralPanel::default().frame(egui::Frame::NONE).show(ctx, |ui| {
            map_rect = ui.available_rect_before_wrap();
            map_action = self.map_view.show(ui, &mut self.context);
            if !show_popup(ui, map_rect, &mut self.context) {
                self.context.popup = None;
            }
        });
        if let Some(action) = map_action {
            self.handle_map_action(action);
        }

        if let Some(action) = show_media_form(ctx, &mut self.context.form) {
            self.handle_form_action(action);
        }

        self.context.lightbox.draw(ctx);

        if let Some(remaining) = self.context.form.tick(Instant::now()) {
            ctx.request_repaint_after(remaining);
        }
    }
}

impl eframe::App for TraceViewerApp {
    /// Called each time the UI needs repainting, which may be many times per second.
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.update_impl(ctx);
    }
}
