use std::sync::Arc;

use bundle_static::cli::Cli;
use bundle_static::config::{AppState, Config};
use bundle_static::{logger, server, ServerError};
use clap::Parser;
use tracing::info;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let cfg = Config::load_from(&cli.config)?;
    logger::init(&cfg.logging)?;

    // Fails fast on a root prefix or unknown encoding
    let state = AppState::new(cfg.clone())?;

    if cli.check {
        print_check(&cfg, &state)?;
        return Ok(());
    }

    // Create Tokio runtime, sized by the workers option
    let mut runtime_builder = tokio::runtime::Builder::new_multi_thread();
    runtime_builder.enable_all();
    if let Some(workers) = cfg.server.workers {
        runtime_builder.worker_threads(workers);
    }
    let runtime = runtime_builder.build()?;

    runtime.block_on(async_main(cfg, state))?;
    Ok(())
}

async fn async_main(cfg: Config, state: AppState) -> Result<(), ServerError> {
    let addr = cfg.socket_addr()?;
    let listener = server::create_reusable_listener(addr)?;
    logger::log_server_start(&addr, &cfg, &state.assets);

    server::serve(listener, Arc::new(state), server::signal::shutdown_signal()).await;
    info!("Server stopped");
    Ok(())
}

fn print_check(cfg: &Config, state: &AppState) -> Result<(), ServerError> {
    let resolver = state.assets.resolver();
    let cache = state.assets.responder().policy();

    println!("configuration OK");
    println!("  listen:   {}", cfg.socket_addr()?);
    println!("  packages: {:?}", resolver.prefixes().iter().collect::<Vec<_>>());
    println!("  encoding: {}", resolver.charset().label());
    println!(
        "  caching:  {}",
        if cache.cache_disabled { "disabled" } else { "enabled" }
    );
    println!("  expires:  {}s", cache.expires_delta_secs);
    Ok(())
}
