use crux_kv::{error::KeyValueError, KeyValue};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use thiserror::Error;

use crate::event::Event;
use crate::MAX_VALUE_SIZE;

pub type KvCapability = KeyValue<Event>;

/// Preference keys shared with the native settings screen and the
/// background tracking service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PreferenceKey {
    DeviceId,
    ServerUrl,
    Frequency,
    ServiceStatus,
}

impl PreferenceKey {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::DeviceId => "device_id_preference",
            Self::ServerUrl => "url_preference",
            Self::Frequency => "frequency_preference",
            Self::ServiceStatus => "service_status_preference",
        }
    }
}

#[derive(Debug, Clone, Error, Serialize, Deserialize, PartialEq, Eq)]
pub enum KvError {
    #[error("value too large: {size} bytes exceeds maximum of {max} bytes")]
    ValueTooLarge { size: usize, max: usize },

    #[error("storage error: {message}")]
    Storage { message: String },

    #[error("serialization error: {message}")]
    Serialization { message: String },
}

impl From<KeyValueError> for KvError {
    fn from(e: KeyValueError) -> Self {
        Self::Storage {
            message: format!("{e:?}"),
        }
    }
}

/// Result of reading one key. `Ok(None)` means the key was never written.
pub type KvReadResult = Result<Option<Vec<u8>>, KvError>;

pub type KvWriteResult = Result<(), KvError>;

pub fn encode_value<T: Serialize>(value: &T) -> Result<Vec<u8>, KvError> {
    let bytes = serde_json::to_vec(value).map_err(|e| KvError::Serialization {
        message: e.to_string(),
    })?;

    if bytes.len() > MAX_VALUE_SIZE {
        return Err(KvError::ValueTooLarge {
            size: bytes.len(),
            max: MAX_VALUE_SIZE,
        });
    }

    Ok(bytes)
}

pub fn decode_value<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, KvError> {
    serde_json::from_slice(bytes).map_err(|e| KvError::Serialization {
        message: e.to_string(),
    })
}
