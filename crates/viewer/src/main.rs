mod demo_world;
mod handler;

use std::path::PathBuf;

use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;
use worldview::{run_app, LoopConfig, ViewOptions, WorldView, OPTIONS_ENV_VAR};

use demo_world::{DemoConfig, DemoWorld};
use handler::LoggingInputHandler;

fn main() {
    init_tracing();
    info!("=== World Viewer Startup ===");

    let options = load_options();
    let world = DemoWorld::new(&DemoConfig::default());
    let mut view = WorldView::create(world, options);
    view.set_user_input_handler(Box::new(LoggingInputHandler::default()));

    let config = LoopConfig {
        window_title: "World Viewer".to_string(),
        ..LoopConfig::default()
    };
    if let Err(err) = run_app(config, view) {
        error!(error = %err, "startup_failed");
        std::process::exit(1);
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_names(true)
        .compact()
        .init();
}

/// Options file named by the environment, or every visual flag on when unset or unreadable.
fn load_options() -> ViewOptions {
    let Some(path) = std::env::var_os(OPTIONS_ENV_VAR).map(PathBuf::from) else {
        return ViewOptions::showcase();
    };
    match ViewOptions::load(&path) {
        Ok(options) => {
            info!(path = %path.display(), "options_loaded");
            options
        }
        Err(err) => {
            warn!(error = %err, "options_load_failed");
            ViewOptions::showcase()
        }
    }
}
