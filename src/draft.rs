use std::collections::BTreeMap;

use tracing::debug;

use crate::{cache::Cache, store::KeyValueStore};

pub type Fields = BTreeMap<String, String>;

/// Keeps an unfinished form across page loads.
///
/// The whole field map is saved on every input, put back into the form on
/// load, and dropped once the form is submitted.
pub struct FormDraft<'a, S> {
    cache: &'a Cache<S>,
    key: String,
}

impl<'a, S: KeyValueStore> FormDraft<'a, S> {
    pub fn new(cache: &'a Cache<S>, key: impl Into<String>) -> Self {
        Self {
            cache,
            key: key.into(),
        }
    }

    pub fn record(&self, fields: &Fields) {
        self.cache.save(&self.key, fields);
    }

    pub fn saved(&self) -> Option<Fields> {
        self.cache.load(&self.key)
    }

    /// Fills fields the form already has from the saved draft and returns how
    /// many were filled. Saved fields the form lacks are skipped.
    pub fn restore_into(&self, form: &mut Fields) -> usize {
        let Some(saved) = self.saved() else {
            return 0;
        };

        let mut restored = 0;
        for (name, value) in saved {
            if let Some(field) = form.get_mut(&name) {
                *field = value;
                restored += 1;
            }
        }
        debug!(key = %self.key, restored, "restored form draft");
        restored
    }

    pub fn clear(&self) {
        self.cache.remove(&self.key);
    }
}
