use crate::error::{Error, Result};
use crate::session::Session;
use crate::state::SharedState;
use crate::utils::display_uri;

/// Clears the in-progress flag however the request ends, including when
/// the future is dropped mid-flight.
struct InFlight<'a> {
    state: &'a SharedState,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.state.lock().is_generating = false;
    }
}

/// Sends the current prompt and quality to the provider and adopts the
/// returned locator as the displayed model.
///
/// Only one request runs at a time. Without a credential, or while another
/// request is in flight, nothing is sent.
pub async fn generate(session: &Session) -> Result<String> {
    let claimed = {
        let mut state = session.state.lock();
        match state.credential.clone().filter(|c| !c.is_empty()) {
            None => Err(Error::MissingCredential),
            Some(_) if state.is_generating => Err(Error::GenerationInProgress),
            Some(credential) => {
                state.is_generating = true;
                Ok((state.prompt.clone(), state.quality, credential))
            }
        }
    };
    let (prompt, quality, credential) = match claimed {
        Ok(request) => request,
        Err(e) => {
            log::warn!("generation not started: {}", e);
            session.report(&e);
            return Err(e);
        }
    };

    let guard = InFlight {
        state: &session.state,
    };
    session.publish();

    let result = session.api.generate(&prompt, quality, &credential).await;
    if let Ok(uri) = &result {
        session.state.lock().object_link = uri.clone();
    }
    drop(guard);
    session.publish();

    match result {
        Ok(uri) => {
            log::info!("generated model at {}", display_uri(&uri));
            Ok(uri)
        }
        Err(e) => {
            log::error!("{}", e);
            session.report(&e);
            Err(e)
        }
    }
}
