use serde::{Deserialize, Serialize};

use crate::config::{ValidationError, ValidationFailure};
use crate::toggle::{StateChange, ToggleState};

/// Everything the shell needs to draw the start/stop control. Colors, icons
/// and the ripple's look are the shell's business; this only says which.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct IndicatorView {
    pub running: bool,
    pub ripple_active: bool,
    /// The most recent state change. The shell plays the start/stop
    /// animation when `revision` differs from the one it last saw.
    pub change: Option<StateChange>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct AlertView {
    pub failure: ValidationFailure,
    pub code: String,
    pub message: String,
}

impl From<&ValidationError> for AlertView {
    fn from(e: &ValidationError) -> Self {
        Self {
            failure: e.failure(),
            code: e.code().to_string(),
            message: e.user_facing_message(),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ViewModel {
    pub toggle_state: ToggleState,
    pub indicator: IndicatorView,
    pub tracking_number: Option<String>,
    pub alert: Option<AlertView>,
}
