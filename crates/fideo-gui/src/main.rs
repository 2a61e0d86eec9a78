//! Fideo - a noodle editor for real-time audio graphs.
//!
//! Wires the platform-neutral editor (`fideo-canvas`) to an eframe window:
//! pointer sampling, primitive painting, popups, and file dialogs.

use std::path::PathBuf;

use clap::Parser;
use eframe::egui;

mod app;
mod surface;

use app::FideoApp;

/// Fideo audio graph editor.
#[derive(Parser, Debug)]
#[command(name = "fideo")]
#[command(about = "Visual node-graph editor for real-time audio")]
#[command(version)]
struct Args {
    /// Graph document to open at startup
    document: Option<PathBuf>,

    /// Show the debug overlay (mouse, canvas, hover introspection)
    #[arg(long)]
    debug: bool,

    /// Render entity numbers next to node names
    #[arg(long)]
    show_ids: bool,

    /// Show per-node timing strips
    #[arg(long)]
    profile: bool,
}

fn main() -> eframe::Result<()> {
    use tracing_subscriber::EnvFilter;

    // Initialize tracing subscriber; bridge legacy log:: calls from eframe/egui
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();
    tracing_log::LogTracer::init().ok();

    let args = Args::parse();
    tracing::info!("Starting fideo");
    if let Some(ref document) = args.document {
        tracing::info!(path = %document.display(), "opening document");
    }

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 800.0])
            .with_min_inner_size([800.0, 500.0])
            .with_title("fideo"),
        ..Default::default()
    };

    eframe::run_native(
        "fideo",
        options,
        Box::new(move |cc| {
            Ok(Box::new(FideoApp::new(
                cc,
                args.document.clone(),
                args.debug,
                args.show_ids,
                args.profile,
            )))
        }),
    )
}
