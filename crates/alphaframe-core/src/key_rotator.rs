//! Per-request API key selection.

use std::fmt::{Debug, Formatter};
use std::sync::Arc;

use tracing::debug;

use crate::AlphaError;

/// Immutable credential set; every call to [`KeyRotator::next`] picks one
/// key uniformly at random so consecutive requests spread across keys.
#[derive(Clone)]
pub struct KeyRotator {
    keys: Arc<[String]>,
}

impl KeyRotator {
    /// Blank entries are dropped. An empty set is accepted here and reported
    /// on first use.
    pub fn new<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let keys = keys
            .into_iter()
            .map(|key| {
                let key: String = key.into();
                key.trim().to_owned()
            })
            .filter(|key| !key.is_empty())
            .collect::<Vec<_>>();
        Self { keys: keys.into() }
    }

    pub fn next(&self) -> Result<&str, AlphaError> {
        if self.keys.is_empty() {
            return Err(AlphaError::configuration(
                "no API keys configured; set api_keys in the config file or ALPHAFRAME_API_KEYS",
            ));
        }

        let key = &self.keys[fastrand::usize(..self.keys.len())];
        debug!(key = %mask_key(key), "selected api key");
        Ok(key)
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

impl Debug for KeyRotator {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyRotator")
            .field("keys", &self.keys.len())
            .finish()
    }
}

const MASK_TAIL: usize = 4;
const MIN_LEN_FOR_TAIL: usize = 8;

/// Keeps the last four characters of keys with at least eight, e.g.
/// `****WXYZ`; shorter keys are fully masked.
pub fn mask_key(key: &str) -> String {
    let len = key.chars().count();
    if len < MIN_LEN_FOR_TAIL {
        return String::from("****");
    }
    let tail: String = key.chars().skip(len - MASK_TAIL).collect();
    format!("****{tail}")
}
