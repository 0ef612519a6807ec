#![warn(clippy::all, rust_2018_idioms)]
#![allow(clippy::blocks_in_conditions)]
pub mod api;
mod app;
pub mod context;
pub mod error;
pub mod events;
pub mod geo;
pub mod lightbox;
pub mod live;
pub mod map;
pub mod media;
pub mod media_form;
pub mod settings;
pub mod task;
pub mod track;
mod ui;
pub use app::TraceViewerApp;
pub const APP_NAME: &str = "Trace Viewer";
pub(crate) use egui_phosphor::regular as icons;

/// Concatenate an icon const with a string literal at compile time (zero allocation).
/// Usage: `icon_str!(icons::ARROWS_IN, "Recentrer")` => `&'static str`
macro_rules! icon_str {
    ($icon:expr, $text:expr) => {
        const_format::concatcp!($icon, " ", $text)
    };
}
pub(crate) use icon_str;
