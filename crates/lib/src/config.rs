//! Runtime configuration for a [`Larder`](crate::Larder).
//!
//! Durations are (de)serialized as whole milliseconds. Missing fields take
//! their defaults, so an empty JSON object is a valid configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::migration::MigrationMode;
use crate::retry::RetryPolicy;

/// Default time budget for a single list operation, retries included.
pub const DEFAULT_DEADLINE: Duration = Duration::from_secs(10);

/// Configuration shared by every list handle obtained from one `Larder`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LarderConfig {
    pub retry: RetryPolicy,
    /// Per-operation deadline; `None` waits indefinitely
    #[serde(with = "option_millis", rename = "deadline_ms")]
    pub deadline: Option<Duration>,
    pub migration_mode: MigrationMode,
}

impl Default for LarderConfig {
    fn default() -> Self {
        Self {
            retry: RetryPolicy::default(),
            deadline: Some(DEFAULT_DEADLINE),
            migration_mode: MigrationMode::default(),
        }
    }
}

impl LarderConfig {
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_deadline(mut self, deadline: Option<Duration>) -> Self {
        self.deadline = deadline;
        self
    }

    pub fn with_migration_mode(mut self, mode: MigrationMode) -> Self {
        self.migration_mode = mode;
        self
    }
}

/// `Duration` as integer milliseconds.
pub(crate) mod millis {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}

mod option_millis {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(
        value: &Option<Duration>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match value {
            Some(duration) => serializer.serialize_some(&(duration.as_millis() as u64)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<Duration>, D::Error> {
        Option::<u64>::deserialize(deserializer).map(|ms| ms.map(Duration::from_millis))
    }
}
