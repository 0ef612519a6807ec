#![warn(clippy::all, rust_2018_idioms)]
#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")] // hide console window on Windows in release

fn main() -> eframe::Result<()> {
    #[cfg(feature = "logging")]
    let _guard = {
        // Janky hack to address https://github.com/tokio-rs/tracing/issues/1817
        struct NewType(Pretty);

        impl<'writer> FormatFields<'writer> for NewType {
            fn format_fields<R: RecordFields>(&self, writer: Writer<'writer>, fields: R) -> core::fmt::Result {
                self.0.format_fields(writer, fields)
            }
        }

        use tracing_appender::rolling::Rotation;
        use tracing_subscriber::EnvFilter;
        use tracing_subscriber::Layer;
        use tracing_subscriber::filter::LevelFilter;
        use tracing_subscriber::fmt;
        use tracing_subscriber::fmt::time::LocalTime;
        use tracing_subscriber::prelude::*;
        use tracing_subscriber::{
            field::RecordFields,
            fmt::{
                FormatFields,
                format::{Pretty, Writer},
            },
        };

        let default_level = if cfg!(debug_assertions) { LevelFilter::DEBUG } else { LevelFilter::INFO };

        let file_appender = tracing_appender::rolling::Builder::new()
            .rotation(Rotation::HOURLY)
            .max_log_files(1)
            .filename_prefix("trace_viewer.log")
            .build(".")
            .expect("failed to build file appender");
        let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
        let subscriber = tracing_subscriber::registry()
            .with(
                fmt::Layer::new()
                    .pretty()
                    .fmt_fields(NewType(Pretty::default()))
                    .with_ansi(true)
                    .with_filter(EnvFilter::builder().with_default_directive(default_level.into()).from_env_lossy()),
            )
            .with(fmt::Layer::new().with_writer(non_blocking).with_timer(LocalTime::rfc_3339()).with_ansi(false).with_filter(default_level));
        tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");
        guard
    };

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1200.0, 800.0])
            .with_min_inner_size([480.0, 360.0])
            .with_title(format!("{} v{}", trace_viewer::APP_NAME, env!("CARGO_PKG_VERSION"))),
        ..Default::default()
    };

    eframe::run_native(trace_viewer::APP_NAME, native_options, Box::new(|cc| Ok(Box::new(trace_viewer::TraceViewerApp::new(cc)))))
}
