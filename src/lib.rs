//! Shelf application library
//!
//! Wires the book catalog module into the kernel registry and runs it behind
//! the HTTP server.

use anyhow::Context;
use shelf_kernel::{settings::Settings, InitCtx, ModuleRegistry};

pub mod modules;

/// Build a registry holding every application module
pub fn build_registry(settings: &Settings) -> ModuleRegistry {
    let mut registry = ModuleRegistry::new();
    modules::register_all(&mut registry, settings);
    registry
}

/// Initialize and start all modules, serve HTTP until shutdown, then stop them
pub async fn run(settings: Settings) -> anyhow::Result<()> {
    let registry = build_registry(&settings);
    let ctx = InitCtx {
        settings: &settings,
    };

    registry
        .init_all(&ctx)
        .await
        .context("module initialization failed")?;
    registry
        .start_all(&ctx)
        .await
        .context("module startup failed")?;

    let served = shelf_http::start_server(&registry, &settings).await;

    registry
        .stop_all()
        .await
        .context("module shutdown failed")?;

    served
}
