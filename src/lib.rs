//! Text-to-3D front end for the OpenRouter object generation API.
//!
//! The library holds the view state, credential handling and provider calls;
//! the `desktop` feature adds the Tauri shell that renders them.

pub mod api;
pub mod auth;
#[cfg(feature = "desktop")]
pub mod commands;
pub mod config;
pub mod download;
pub mod error;
pub mod generation;
pub mod key_store;
pub mod local_server;
pub mod notice;
pub mod quality;
pub mod session;
pub mod state;
pub mod utils;

pub use api::ApiClient;
pub use auth::LoginToggle;
pub use config::{AuthFailureMode, Config};
pub use error::{Error, Result};
pub use key_store::{FileStore, KeyValueStore, MemoryStore, CREDENTIAL_KEY};
pub use notice::{CollectingNotifier, LogNotifier, Notice, Notifier};
pub use quality::Quality;
pub use session::Session;
pub use state::{StateSnapshot, ViewState, PLACEHOLDER_MODEL};

/// Starts the desktop app: local server, credential restore, then the window.
#[cfg(feature = "desktop")]
pub fn run() -> anyhow::Result<()> {
    use anyhow::Context;
    use std::sync::Arc;
    use tauri::Manager;

    use commands::{EventNotifier, Shell};

    utils::init_logging();
    let config = Config::load().context("failed to load config")?;
    log::info!("using api {} and auth {}", config.api_base, config.auth_base);

    tauri::async_runtime::set(tokio::runtime::Handle::current());

    tauri::Builder::default()
        .plugin(tauri_plugin_opener::init())
        .setup(move |app| {
            let notifier = Arc::new(EventNotifier::new(app.handle().clone()));
            let session = Session::from_config(&config, notifier)?;
            let port = config.server_port;

            // Spawn the local HTTP server; it also receives the login callback
            tokio::spawn(local_server::start_server(
                session.clone(),
                config.dist_dir.clone(),
                port,
            ));

            let page = url::Url::parse(&local_server::callback_page(port))?;
            let startup = session.clone();
            tokio::spawn(async move {
                if !auth::initialize(&startup, &page).await {
                    log::info!("no stored credential; waiting for login");
                }
            });

            app.manage(Shell { session, port });
            Ok(())
        })
        .invoke_handler(tauri::generate_handler![
            commands::get_state,
            commands::quality_options,
            commands::set_prompt,
            commands::set_quality,
            commands::generate_model,
            commands::download_model,
            commands::toggle_login
        ])
        .run(tauri::generate_context!())
        .context("error while running Tauri application")
}
