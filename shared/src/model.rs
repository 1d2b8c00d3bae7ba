use serde::{Deserialize, Serialize};

use crate::capabilities::{decode_value, PreferenceKey};
use crate::config::ValidationError;
use crate::reads::{BatchResult, PendingReads};
use crate::toggle::{SessionToggle, ToggleState};

/// Keys read, in order, on every reconcile.
pub const STATUS_KEYS: [PreferenceKey; 2] = [PreferenceKey::ServiceStatus, PreferenceKey::DeviceId];

/// Whether the screen is currently in a position to observe the status.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct ScreenPresence {
    pub visible: bool,
    pub foreground: bool,
}

impl Default for ScreenPresence {
    fn default() -> Self {
        Self {
            visible: false,
            foreground: true,
        }
    }
}

impl ScreenPresence {
    #[must_use]
    pub const fn is_observing(self) -> bool {
        self.visible && self.foreground
    }
}

/// What a reconcile read back from the preference store.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct StatusSnapshot {
    pub active: bool,
    pub device_id: Option<String>,
}

impl StatusSnapshot {
    #[must_use]
    pub fn from_values(values: &[Option<Vec<u8>>]) -> Self {
        let raw = |index: usize| values.get(index).and_then(Option::as_deref);

        Self {
            active: raw(0)
                .and_then(|bytes| decode_value::<bool>(bytes).ok())
                .unwrap_or(false),
            device_id: raw(1).and_then(|bytes| decode_value::<String>(bytes).ok()),
        }
    }

    /// `None` when the read failed; the caller keeps its current state.
    #[must_use]
    pub fn from_result(result: BatchResult) -> Option<Self> {
        match result {
            Ok(values) => Some(Self::from_values(&values)),
            Err(e) => {
                tracing::warn!(error = %e, "status read failed");
                None
            }
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct Model {
    pub toggle: SessionToggle,
    pub screen: ScreenPresence,
    pub device_id: Option<String>,
    /// Last validation failure, shown until dismissed or superseded.
    pub alert: Option<ValidationError>,
    pub reads: PendingReads,
}

impl Model {
    #[must_use]
    pub const fn toggle_state(&self) -> ToggleState {
        self.toggle.state()
    }

    pub fn set_alert(&mut self, error: ValidationError) {
        self.alert = Some(error);
    }

    pub fn clear_alert(&mut self) {
        self.alert = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn json(value: serde_json::Value) -> Option<Vec<u8>> {
        Some(serde_json::to_vec(&value).unwrap())
    }

    #[test]
    fn test_absent_status_is_inactive() {
        assert_eq!(StatusSnapshot::from_values(&[]), StatusSnapshot::default());
        assert!(!StatusSnapshot::from_values(&[None, None]).active);
    }

    #[test]
    fn test_undecodable_status_is_inactive() {
        let snapshot = StatusSnapshot::from_values(&[Some(b"garbage".to_vec()), None]);
        assert!(!snapshot.active);
    }

    #[test]
    fn test_snapshot_reads_device_id() {
        let snapshot = StatusSnapshot::from_values(&[
            json(serde_json::json!(true)),
            json(serde_json::json!("123456")),
        ]);
        assert!(snapshot.active);
        assert_eq!(snapshot.device_id.as_deref(), Some("123456"));
    }

    #[test]
    fn test_failed_read_yields_none() {
        let result: BatchResult = Err(crate::capabilities::KvError::Storage {
            message: "locked".into(),
        });
        assert!(StatusSnapshot::from_result(result).is_none());
    }

    #[test]
    fn test_presence_observing() {
        let mut presence = ScreenPresence::default();
        assert!(!presence.is_observing());
        presence.visible = true;
        assert!(presence.is_observing());
        presence.foreground = false;
        assert!(!presence.is_observing());
    }
}
