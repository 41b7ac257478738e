use std::sync::Arc;
use url::Url;

use crate::api::ApiClient;
use crate::config::{AuthFailureMode, Config};
use crate::error::{Error, Result};
use crate::key_store::{FileStore, KeyValueStore};
use crate::local_server::callback_page;
use crate::notice::{Notice, Notifier};
use crate::quality::Quality;
use crate::state::{self, SharedState, StateSnapshot};

/// Everything a user action needs: view state, credential storage, the
/// provider client and the notice sink.
#[derive(Clone)]
pub struct Session {
    pub state: SharedState,
    pub store: Arc<dyn KeyValueStore>,
    pub api: ApiClient,
    pub notifier: Arc<dyn Notifier>,
    pub auth_failure_mode: AuthFailureMode,
    /// Page relative model locators resolve against, as the viewport does.
    pub page: Option<Url>,
}

impl Session {
    pub fn new(
        config: &Config,
        store: Arc<dyn KeyValueStore>,
        api: ApiClient,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            state: state::shared(),
            store,
            api,
            notifier,
            auth_failure_mode: config.auth_failure_mode,
            page: Url::parse(&callback_page(config.server_port)).ok(),
        }
    }

    pub fn with_page(mut self, page: Url) -> Self {
        self.page = Some(page);
        self
    }

    /// Session backed by the credential file named in `config`.
    pub fn from_config(config: &Config, notifier: Arc<dyn Notifier>) -> Result<Self> {
        let store = Arc::new(FileStore::new(config.store_path()?));
        Ok(Self::new(config, store, ApiClient::new(config), notifier))
    }

    pub fn snapshot(&self) -> StateSnapshot {
        self.state.lock().snapshot()
    }

    pub fn set_prompt(&self, prompt: String) -> StateSnapshot {
        let snapshot = {
            let mut state = self.state.lock();
            state.prompt = prompt;
            state.snapshot()
        };
        self.notifier.state_changed(&snapshot);
        snapshot
    }

    pub fn set_quality(&self, steps: u32) -> Result<StateSnapshot> {
        let quality = Quality::try_from(steps)?;
        let snapshot = {
            let mut state = self.state.lock();
            state.quality = quality;
            state.snapshot()
        };
        self.notifier.state_changed(&snapshot);
        Ok(snapshot)
    }

    pub(crate) fn publish(&self) {
        let snapshot = self.snapshot();
        self.notifier.state_changed(&snapshot);
    }

    pub(crate) fn report(&self, err: &Error) {
        self.notifier.notify(Notice::new(err.notice()));
    }
}
