//! User-visible toast messages.

use parking_lot::Mutex;
use serde::Serialize;

use crate::state::StateSnapshot;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub title: String,
}

impl Notice {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
        }
    }
}

/// Sink for notices. The desktop shell forwards them to the page as events.
pub trait Notifier: Send + Sync {
    fn notify(&self, notice: Notice);

    fn state_changed(&self, _snapshot: &StateSnapshot) {}
}

/// Writes notices to the log only.
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, notice: Notice) {
        log::info!("notice: {}", notice.title);
    }
}

/// Keeps every notice in order; handy for headless runs and tests.
#[derive(Default)]
pub struct CollectingNotifier {
    notices: Mutex<Vec<Notice>>,
}

impl CollectingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn titles(&self) -> Vec<String> {
        self.notices.lock().iter().map(|n| n.title.clone()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.notices.lock().is_empty()
    }
}

impl Notifier for CollectingNotifier {
    fn notify(&self, notice: Notice) {
        self.notices.lock().push(notice);
    }
}
