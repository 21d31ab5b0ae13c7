//! Process-wide gate that serializes every mutating domain operation.
//!
//! Each service mutation is a read-check-then-write sequence against the
//! shared store. Running them one at a time through a single [`Lock`] keeps
//! two creates with the same id, or a delete racing an update, from
//! interleaving. Reads do not go through the gate.
//!
//! Waiters are admitted strictly in arrival order (`tokio::sync::Mutex` is
//! fair). The gate is coarse: one instance guards all entities. A keyed map
//! of gates per image id is the next step if throughput ever matters.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;

use crate::error::CoreError;

/// Cloneable handle to one mutual-exclusion gate.
///
/// Clones share the same gate.
#[derive(Debug, Clone, Default)]
pub struct Lock {
    gate: Arc<Mutex<()>>,
    /// Upper bound on how long a caller waits for its turn.
    timeout: Option<Duration>,
}

impl Lock {
    /// A gate that waits for its turn indefinitely.
    pub fn new() -> Self {
        Self::default()
    }

    /// A gate that gives up with [`CoreError::LockTimeout`] when the turn
    /// does not come within `timeout`.
    pub fn with_timeout(timeout: Duration) -> Self {
        Self::from_timeout(Some(timeout))
    }

    pub fn from_timeout(timeout: Option<Duration>) -> Self {
        Self {
            gate: Arc::new(Mutex::new(())),
            timeout,
        }
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Run `op` once every previously submitted operation has finished.
    ///
    /// The operation's own result is returned unchanged. The only error the
    /// gate adds is [`CoreError::LockTimeout`], and only when a timeout is
    /// configured. The timeout covers the wait, not the operation itself.
    pub async fn auto<T, F, Fut>(&self, op: F) -> Result<T, CoreError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, CoreError>>,
    {
        let _guard = match self.timeout {
            None => self.gate.lock().await,
            Some(limit) => match tokio::time::timeout(limit, self.gate.lock()).await {
                Ok(guard) => guard,
                Err(_) => {
                    let waited_ms = limit.as_millis() as u64;
                    tracing::warn!(waited_ms, "Mutation lock wait timed out");
                    return Err(CoreError::LockTimeout { waited_ms });
                }
            },
        };
        op().await
    }
}
