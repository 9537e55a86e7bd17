//! Vitrine - desktop 3D model viewer
//!
//! Opens OBJ, STL and glTF models, previews them in an orbit viewport with an
//! egui inspector, and exports the model, single parts or its textures.

mod actions;
mod app;
mod file_loader;
mod file_picker;
mod ui;

use anyhow::Result;
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

fn main() -> Result<()> {
    // Initialize logging; RUST_LOG overrides the default filter
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,wgpu=warn,naga=warn"));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(true)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("Vitrine v{}", env!("CARGO_PKG_VERSION"));

    app::run()
}
