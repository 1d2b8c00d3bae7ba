use serde::{Deserialize, Serialize};

use crate::capabilities::{KvReadResult, KvWriteResult};
use crate::reads::ReadSlot;

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub enum Event {
    // Screen & app lifecycle
    ScreenAppeared,
    ScreenDisappeared,
    AppForegrounded,
    AppBackgrounded,
    /// Another component wrote the service status while the app was running.
    StatusChangedExternally,

    // User actions
    ToggleRequested,
    AlertDismissed,

    // Capability responses (boxed to keep enum size small)
    #[serde(skip)]
    PreferenceRead(Box<SlotAnswer>),
    #[serde(skip)]
    StatusWritten {
        active: bool,
        result: Box<KvWriteResult>,
    },
}

/// One key's answer within a batched read.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SlotAnswer {
    pub slot: ReadSlot,
    pub result: KvReadResult,
}

impl Event {
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::ScreenAppeared => "screen_appeared",
            Self::ScreenDisappeared => "screen_disappeared",
            Self::AppForegrounded => "app_foregrounded",
            Self::AppBackgrounded => "app_backgrounded",
            Self::StatusChangedExternally => "status_changed_externally",
            Self::ToggleRequested => "toggle_requested",
            Self::AlertDismissed => "alert_dismissed",
            Self::PreferenceRead(_) => "preference_read",
            Self::StatusWritten { .. } => "status_written",
        }
    }

    #[must_use]
    pub const fn is_user_initiated(&self) -> bool {
        matches!(self, Self::ToggleRequested | Self::AlertDismissed)
    }
}
