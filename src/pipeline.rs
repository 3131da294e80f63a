//! Submission pipeline: validation, path allocation, write, outcome mapping.

use std::time::Duration;

use thiserror::Error;
use tracing::{debug, info};

use crate::path::{PathAllocator, SecretPath};
use crate::sensitive::Sensitive;
use crate::vault::{SecretWriter, WriteOutcome};

// Fixed pause between conflict retries so back-to-back attempts land on a
// fresh clock tick instead of re-colliding inside the same millisecond.
const CONFLICT_BACKOFF: Duration = Duration::from_millis(2);

/// A validated username/password pair, held only for the duration of one
/// submission and dropped once the write completes or fails.
#[derive(Clone)]
pub struct Credentials {
    pub username: String,
    pub password: Sensitive<String>,
}

impl Credentials {
    /// Validate raw form input. Both fields must be non-empty after
    /// trimming; the username is stored trimmed, the password verbatim.
    pub fn parse(raw_username: &str, raw_password: &str) -> Result<Self, SubmissionError> {
        let username = raw_username.trim();
        if username.is_empty() || raw_password.trim().is_empty() {
            return Err(SubmissionError::InvalidInput);
        }
        Ok(Self {
            username: username.to_string(),
            password: Sensitive(raw_password.to_string()),
        })
    }
}

/// Proof of a completed write. Carries the storage path only; the credential
/// values never travel back up the stack.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredReceipt {
    pub path: SecretPath,
}

#[derive(Debug, Error)]
pub enum SubmissionError {
    #[error("username and password are required")]
    InvalidInput,
    #[error("storage path contention persisted across {attempts} attempts")]
    StoreConflictExhausted { attempts: u32 },
    #[error("secret store unavailable: {detail}")]
    StoreUnavailable { detail: String },
}

/// Orchestrates one submission end to end.
///
/// Conflicts are retried sequentially on freshly allocated paths up to the
/// configured attempt budget; rejections and transport failures are
/// surfaced after a single attempt, since those are not expected to be
/// transient collisions.
pub struct SubmissionPipeline<A, W>
where
    A: PathAllocator,
    W: SecretWriter,
{
    allocator: A,
    writer: W,
    max_attempts: u32,
}

impl<A, W> SubmissionPipeline<A, W>
where
    A: PathAllocator,
    W: SecretWriter,
{
    pub fn new(allocator: A, writer: W, max_attempts: u32) -> Self {
        Self {
            allocator,
            writer,
            max_attempts: max_attempts.max(1),
        }
    }

    pub async fn submit(
        &self,
        raw_username: &str,
        raw_password: &str,
    ) -> Result<StoredReceipt, SubmissionError> {
        let credentials = Credentials::parse(raw_username, raw_password)?;

        let mut attempts = 0u32;
        loop {
            attempts += 1;
            let path = self.allocator.next();
            match self.writer.create(path, &credentials).await {
                WriteOutcome::Stored { path } => {
                    info!(%path, attempts, "credentials stored");
                    return Ok(StoredReceipt { path });
                }
                WriteOutcome::Conflict { path } if attempts < self.max_attempts => {
                    debug!(%path, attempt = attempts, "path already holds a version, retrying");
                    tokio::time::sleep(CONFLICT_BACKOFF).await;
                }
                WriteOutcome::Conflict { path } => {
                    info!(%path, attempts, "retry budget exhausted on path conflicts");
                    return Err(SubmissionError::StoreConflictExhausted { attempts });
                }
                WriteOutcome::RejectedByStore { status, detail } => {
                    return Err(SubmissionError::StoreUnavailable {
                        detail: format!("store rejected write: {status} {detail}"),
                    });
                }
                WriteOutcome::TransportFailure { detail } => {
                    return Err(SubmissionError::StoreUnavailable { detail });
                }
            }
        }
    }
}
