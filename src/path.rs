//! Storage path allocation for submitted credentials.

use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

const LOGIN_PREFIX: &str = "logins";

/// Storage key for one submission under the KV mount, e.g. `logins/1724400000123`.
///
/// The path is opaque to callers; it is safe to log and to surface in
/// receipts, unlike the credential values stored beneath it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SecretPath(String);

impl SecretPath {
    pub fn new(token: impl AsRef<str>) -> Self {
        Self(format!("{LOGIN_PREFIX}/{token}", token = token.as_ref()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SecretPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Source of candidate storage paths.
///
/// Allocation cannot fail and has no side effect beyond reading a clock.
/// Uniqueness is only probabilistic: the store's `cas: 0` precondition is
/// what detects collisions, never this trait.
pub trait PathAllocator: Send + Sync {
    fn next(&self) -> SecretPath;
}

impl<T: PathAllocator + ?Sized> PathAllocator for Box<T> {
    fn next(&self) -> SecretPath {
        (**self).next()
    }
}

/// Allocates paths from the system clock at millisecond granularity.
///
/// Two submissions landing on the same tick produce the same path; the
/// store rejects the second write and the pipeline retries on a fresh tick.
#[derive(Debug, Clone, Copy, Default)]
pub struct TimestampAllocator;

impl PathAllocator for TimestampAllocator {
    fn next(&self) -> SecretPath {
        let millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|elapsed| elapsed.as_millis())
            .unwrap_or_default();
        SecretPath::new(millis.to_string())
    }
}
