//! Tracking configuration as read from the shell's preference store, and the
//! validation that gates starting a session.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

use crate::capabilities::{decode_value, PreferenceKey};
use crate::reads::BatchResult;

/// Keys read, in order, when a start is attempted.
pub const CONFIGURATION_KEYS: [PreferenceKey; 3] = [
    PreferenceKey::ServerUrl,
    PreferenceKey::Frequency,
    PreferenceKey::DeviceId,
];

const ALLOWED_SCHEMES: [&str; 2] = ["http", "https"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UrlRejection {
    Missing,
    Unparsable,
    UnsupportedScheme,
    MissingHost,
}

impl UrlRejection {
    #[must_use]
    pub const fn describe(self) -> &'static str {
        match self {
            Self::Missing => "no server url configured",
            Self::Unparsable => "server url is not an absolute url",
            Self::UnsupportedScheme => "server url scheme must be http or https",
            Self::MissingHost => "server url has no host",
        }
    }
}

/// The kind of a validation failure, as handed to the presentation layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ValidationFailure {
    InvalidServerUrl,
    InvalidFrequency,
}

#[derive(Debug, Clone, Error, Serialize, Deserialize, PartialEq, Eq)]
pub enum ValidationError {
    #[error("invalid server url: {}", .reason.describe())]
    InvalidServerUrl { reason: UrlRejection },

    #[error("invalid frequency: {frequency} (must be greater than zero)")]
    InvalidFrequency { frequency: i64 },
}

impl ValidationError {
    #[must_use]
    pub const fn failure(&self) -> ValidationFailure {
        match self {
            Self::InvalidServerUrl { .. } => ValidationFailure::InvalidServerUrl,
            Self::InvalidFrequency { .. } => ValidationFailure::InvalidFrequency,
        }
    }

    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::InvalidServerUrl { .. } => "INVALID_SERVER_URL",
            Self::InvalidFrequency { .. } => "INVALID_FREQUENCY",
        }
    }

    #[must_use]
    pub fn user_facing_message(&self) -> String {
        match self {
            Self::InvalidServerUrl { .. } => {
                "The server address is not valid. Enter an http or https address in settings."
                    .into()
            }
            Self::InvalidFrequency { .. } => {
                "The reporting frequency must be greater than zero.".into()
            }
        }
    }
}

/// Session parameters produced by a successful validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionParams {
    pub server_url: String,
    pub frequency_secs: u64,
    pub device_id: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackingConfiguration {
    pub server_url: Option<String>,
    pub frequency: i64,
    pub device_id: Option<String>,
}

/// Settings screens often persist numbers as text.
#[derive(Deserialize)]
#[serde(untagged)]
enum StoredFrequency {
    Number(i64),
    Text(String),
}

impl StoredFrequency {
    fn into_value(self) -> Option<i64> {
        match self {
            Self::Number(n) => Some(n),
            Self::Text(s) => s.trim().parse().ok(),
        }
    }
}

impl TrackingConfiguration {
    #[must_use]
    pub fn new(server_url: impl Into<String>, frequency: i64) -> Self {
        Self {
            server_url: Some(server_url.into()),
            frequency,
            device_id: None,
        }
    }

    #[must_use]
    pub fn with_device_id(mut self, device_id: impl Into<String>) -> Self {
        self.device_id = Some(device_id.into());
        self
    }

    /// Builds a configuration from the values of [`CONFIGURATION_KEYS`].
    /// Missing or undecodable entries fall back to values that fail validation.
    #[must_use]
    pub fn from_values(values: &[Option<Vec<u8>>]) -> Self {
        let raw = |index: usize| values.get(index).and_then(Option::as_deref);

        let server_url = raw(0).and_then(|bytes| decode_value::<String>(bytes).ok());
        let frequency = raw(1)
            .and_then(|bytes| decode_value::<StoredFrequency>(bytes).ok())
            .and_then(StoredFrequency::into_value)
            .unwrap_or(0);
        let device_id = raw(2).and_then(|bytes| decode_value::<String>(bytes).ok());

        Self {
            server_url,
            frequency,
            device_id,
        }
    }

    /// A failed read is treated as an empty configuration.
    #[must_use]
    pub fn from_result(result: BatchResult) -> Self {
        match result {
            Ok(values) => Self::from_values(&values),
            Err(e) => {
                tracing::warn!(error = %e, "configuration read failed");
                Self::default()
            }
        }
    }

    /// Checks the server url first, then the frequency.
    pub fn validate(&self) -> Result<SessionParams, ValidationError> {
        let server_url = validate_server_url(self.server_url.as_deref())?;

        let frequency_secs = u64::try_from(self.frequency)
            .ok()
            .filter(|f| *f > 0)
            .ok_or(ValidationError::InvalidFrequency {
                frequency: self.frequency,
            })?;

        Ok(SessionParams {
            server_url,
            frequency_secs,
            device_id: self.device_id.clone(),
        })
    }
}

pub fn validate_server_url(raw: Option<&str>) -> Result<String, ValidationError> {
    let reject = |reason| ValidationError::InvalidServerUrl { reason };

    let raw = raw
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or(reject(UrlRejection::Missing))?;

    let parsed = Url::parse(raw).map_err(|e| match e {
        url::ParseError::EmptyHost => reject(UrlRejection::MissingHost),
        _ => reject(UrlRejection::Unparsable),
    })?;

    if !ALLOWED_SCHEMES.contains(&parsed.scheme()) {
        return Err(reject(UrlRejection::UnsupportedScheme));
    }

    if !parsed.host_str().is_some_and(|host| !host.is_empty()) {
        return Err(reject(UrlRejection::MissingHost));
    }

    Ok(raw.to_string())
}
