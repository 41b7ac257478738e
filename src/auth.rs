use url::Url;

use crate::config::AuthFailureMode;
use crate::error::Result;
use crate::key_store::CREDENTIAL_KEY;
use crate::session::Session;
use crate::state::SharedState;
use crate::utils::redact;

/// Outcome of the login/logout control.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginToggle {
    /// Credential was held and has been cleared.
    LoggedOut,
    /// No credential; send the user to this provider login page.
    Navigate(Url),
}

/// The page's origin followed by its path, without query or fragment.
pub fn callback_url(page: &Url) -> String {
    format!("{}{}", page.origin().ascii_serialization(), page.path())
}

pub fn code_from_url(page: &Url) -> Option<String> {
    page.query_pairs()
        .find(|(key, _)| key == "code")
        .map(|(_, value)| value.into_owned())
        .filter(|code| !code.is_empty())
}

/// Restores the stored credential, or exchanges a `code` found on `page`.
/// Returns whether a credential is held afterwards.
pub async fn initialize(session: &Session, page: &Url) -> bool {
    match session.store.get(CREDENTIAL_KEY) {
        Ok(Some(key)) if !key.is_empty() => {
            log::info!("restored stored credential {}", redact(&key));
            session.state.lock().credential = Some(key);
            session.publish();
            return true;
        }
        Ok(_) => {}
        Err(e) => log::warn!("could not read stored credential: {}", e),
    }
    accept_callback(session, page).await
}

/// Releases the pending-exchange marker when the exchange ends or is dropped.
struct ExchangeClaim<'a> {
    state: &'a SharedState,
}

impl Drop for ExchangeClaim<'_> {
    fn drop(&mut self) {
        self.state.lock().is_exchanging = false;
    }
}

/// Exchanges the authorization code carried by `page`, if any. Does nothing
/// while a credential is already held or another exchange is running.
pub async fn accept_callback(session: &Session, page: &Url) -> bool {
    let Some(code) = code_from_url(page) else {
        return session.state.lock().is_logged_in();
    };
    {
        let mut state = session.state.lock();
        if state.is_logged_in() {
            return true;
        }
        if state.is_exchanging {
            log::info!("ignoring login code; an exchange is already running");
            return false;
        }
        state.is_exchanging = true;
    }
    let _claim = ExchangeClaim {
        state: &session.state,
    };

    let key = match session.api.exchange_code(&code).await {
        Ok(key) => key,
        Err(e) => {
            log::error!("{}", e);
            if session.auth_failure_mode == AuthFailureMode::Visible {
                session.report(&e);
            }
            return false;
        }
    };

    if let Err(e) = session.store.set(CREDENTIAL_KEY, &key) {
        log::error!("could not persist credential: {}", e);
    }
    log::info!("obtained credential {}", redact(&key));
    session.state.lock().credential = Some(key);
    session.publish();
    true
}

/// Login/logout control.
pub fn toggle_login(session: &Session, page: &Url) -> Result<LoginToggle> {
    if session.state.lock().is_logged_in() {
        session.state.lock().credential = None;
        session.publish();
        if let Err(e) = session.store.remove(CREDENTIAL_KEY) {
            log::error!("could not remove stored credential: {}", e);
            return Err(e);
        }
        log::info!("cleared credential");
        return Ok(LoginToggle::LoggedOut);
    }
    let url = session.api.login_url(&callback_url(page))?;
    log::info!("redirecting to {}", url);
    Ok(LoginToggle::Navigate(url))
}
