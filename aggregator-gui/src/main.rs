mod app;

use std::sync::Arc;

use aggregator_core::{app_config_dir, ApiClient, AppConfig, Route, SessionStore, SESSION_FILE_NAME};
use eframe::{egui, NativeOptions};
use tokio::runtime::Runtime;
use tracing_subscriber::EnvFilter;

use crate::app::{apply_theme, AggregatorApp, AppInit};

fn main() -> eframe::Result<()> {
    init_tracing();

    let runtime = Arc::new(Runtime::new().expect("failed to initialise Tokio runtime"));
    let config = AppConfig::load();
    let session = load_session(&runtime);
    let api = ApiClient::new(&config.api, session).expect("invalid API base url in configuration");
    tracing::info!(base_url = %api.base_url(), "using aggregator backend");

    let initial_route = initial_route();
    let size = [config.ui.window_width, config.ui.window_height];
    let init = AppInit {
        runtime,
        api,
        config,
        initial_route,
    };

    eframe::run_native(
        "Blog Aggregator",
        NativeOptions {
            viewport: egui::ViewportBuilder::default()
                .with_inner_size(size)
                .with_min_inner_size([600.0, 500.0]),
            ..Default::default()
        },
        Box::new(move |cc| {
            apply_theme(&cc.egui_ctx, &init.config);
            Box::new(AggregatorApp::new(init))
        }),
    )
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

fn load_session(runtime: &Runtime) -> SessionStore {
    match app_config_dir() {
        Ok(dir) => runtime.block_on(SessionStore::load_from(dir.join(SESSION_FILE_NAME))),
        Err(err) => {
            tracing::warn!(error = %err, "no config directory; session will not survive a restart");
            SessionStore::in_memory()
        }
    }
}

// `blog-aggregator /feeds` opens straight on a view.
fn initial_route() -> Route {
    std::env::args()
        .nth(1)
        .and_then(|arg| Route::from_path(&arg))
        .unwrap_or_default()
}
