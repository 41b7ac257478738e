use parking_lot::Mutex;
use serde::Serialize;
use std::sync::Arc;

use crate::quality::Quality;

/// Bundled sample mesh shown before anything has been generated.
pub const PLACEHOLDER_MODEL: &str = "A chair shaped like an avocado.ply";

#[derive(Debug, Clone, PartialEq)]
pub struct ViewState {
    pub prompt: String,
    pub quality: Quality,
    pub object_link: String,
    pub is_generating: bool,
    /// A login code is being traded for a credential.
    pub is_exchanging: bool,
    pub credential: Option<String>,
}

impl Default for ViewState {
    fn default() -> Self {
        Self::new()
    }
}

impl ViewState {
    pub fn new() -> Self {
        Self {
            prompt: String::new(),
            quality: Quality::default(),
            object_link: PLACEHOLDER_MODEL.to_string(),
            is_generating: false,
            is_exchanging: false,
            credential: None,
        }
    }

    pub fn is_logged_in(&self) -> bool {
        self.credential.as_deref().is_some_and(|c| !c.is_empty())
    }

    pub fn has_generated(&self) -> bool {
        self.object_link != PLACEHOLDER_MODEL
    }

    pub fn snapshot(&self) -> StateSnapshot {
        StateSnapshot {
            prompt: self.prompt.clone(),
            quality: self.quality.steps(),
            object_link: self.object_link.clone(),
            is_generating: self.is_generating,
            logged_in: self.is_logged_in(),
        }
    }
}

/// What the page renders. Never carries the credential itself.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StateSnapshot {
    pub prompt: String,
    pub quality: u32,
    pub object_link: String,
    pub is_generating: bool,
    pub logged_in: bool,
}

pub type SharedState = Arc<Mutex<ViewState>>;

pub fn shared() -> SharedState {
    Arc::new(Mutex::new(ViewState::new()))
}
