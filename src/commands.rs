//! Tauri commands invoked by the page in `dist/`.

use rfd::FileDialog;
use tauri::{AppHandle, Emitter, State};
use tauri_plugin_opener::OpenerExt;
use url::Url;

use crate::auth::{self, LoginToggle};
use crate::download;
use crate::generation;
use crate::local_server::callback_page;
use crate::notice::{Notice, Notifier};
use crate::quality::{self, QualityOption};
use crate::session::Session;
use crate::state::StateSnapshot;

/// Forwards notices and state changes to the webview as events.
pub struct EventNotifier {
    app: AppHandle,
}

impl EventNotifier {
    pub fn new(app: AppHandle) -> Self {
        Self { app }
    }
}

impl Notifier for EventNotifier {
    fn notify(&self, notice: Notice) {
        self.app.emit("notice", notice).unwrap_or_else(|e| {
            log::error!("Emit error: {}", e);
        });
    }

    fn state_changed(&self, snapshot: &StateSnapshot) {
        self.app.emit("state", snapshot).unwrap_or_else(|e| {
            log::error!("Emit error: {}", e);
        });
    }
}

/// Managed state shared by every command.
pub struct Shell {
    pub session: Session,
    pub port: u16,
}

#[tauri::command]
pub fn get_state(shell: State<'_, Shell>) -> StateSnapshot {
    shell.session.snapshot()
}

#[tauri::command]
pub fn quality_options() -> Vec<QualityOption> {
    quality::options()
}

#[tauri::command]
pub fn set_prompt(prompt: String, shell: State<'_, Shell>) -> StateSnapshot {
    shell.session.set_prompt(prompt)
}

#[tauri::command]
pub fn set_quality(quality: u32, shell: State<'_, Shell>) -> Result<StateSnapshot, String> {
    shell.session.set_quality(quality).map_err(|e| e.to_string())
}

#[tauri::command]
pub async fn generate_model(shell: State<'_, Shell>) -> Result<StateSnapshot, String> {
    generation::generate(&shell.session)
        .await
        .map_err(|e| e.to_string())?;
    Ok(shell.session.snapshot())
}

/// Asks where to save the displayed model, then writes it there. `None` when
/// the dialog is cancelled.
#[tauri::command]
pub async fn download_model(shell: State<'_, Shell>) -> Result<Option<String>, String> {
    let (_, file_name) = download::current_download(&shell.session).map_err(|e| e.to_string())?;

    let target = FileDialog::new()
        .set_directory(".")
        .set_file_name(&file_name)
        .add_filter("PLY files", &["ply"])
        .save_file();
    let Some(path) = target else {
        return Ok(None);
    };

    download::download_current(&shell.session, &path)
        .await
        .map_err(|e| e.to_string())?;
    Ok(Some(path.display().to_string()))
}

/// Logs out, or opens the provider login page in the system browser.
#[tauri::command]
pub fn toggle_login(app: AppHandle, shell: State<'_, Shell>) -> Result<StateSnapshot, String> {
    let page = Url::parse(&callback_page(shell.port)).map_err(|e| e.to_string())?;
    match auth::toggle_login(&shell.session, &page).map_err(|e| e.to_string())? {
        LoginToggle::LoggedOut => {}
        LoginToggle::Navigate(url) => {
            app.opener()
                .open_url(url.as_str(), None::<&str>)
                .map_err(|e| e.to_string())?;
        }
    }
    Ok(shell.session.snapshot())
}
