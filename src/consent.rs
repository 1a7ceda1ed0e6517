use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;

use crate::{cache::Cache, store::KeyValueStore};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsentRecord {
    pub accepted: bool,
    pub decided_at: DateTime<Utc>,
}

/// Decides whether the cookie consent prompt has to be shown.
pub struct ConsentGate<'a, S> {
    cache: &'a Cache<S>,
    key: String,
}

impl<'a, S: KeyValueStore> ConsentGate<'a, S> {
    pub fn new(cache: &'a Cache<S>, key: impl Into<String>) -> Self {
        Self {
            cache,
            key: key.into(),
        }
    }

    pub fn decision(&self) -> Option<ConsentRecord> {
        self.cache.load(&self.key)
    }

    /// True when nothing usable is on record. A declined [`ConsentRecord`]
    /// asks again; any other stored value counts as a decision when it is
    /// truthy (not `null`, `false`, `0` or `""`), as flags written by older
    /// versions of the site are.
    pub fn needs_consent(&self) -> bool {
        let Some(stored) = self.cache.load::<Value>(&self.key) else {
            return true;
        };

        match serde_json::from_value::<ConsentRecord>(stored.clone()) {
            Ok(record) => !record.accepted,
            Err(_) => !truthy(&stored),
        }
    }

    pub fn record(&self, accepted: bool) -> ConsentRecord {
        let record = ConsentRecord {
            accepted,
            decided_at: Utc::now(),
        };
        self.cache.save(&self.key, &record);
        info!(key = %self.key, accepted, "consent recorded");
        record
    }
}

fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}
