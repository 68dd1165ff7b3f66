//! Running one logical operation as a retried store transaction.
//!
//! Every engine operation is written as a closure over a fresh
//! [`Transaction`]. [`run`] drives it: open a transaction, run the closure,
//! commit, and on failure decide whether the whole attempt can be repeated.
//!
//! - Conflicts are retried after a short random pause, up to
//!   [`RetryPolicy::max_conflict_retries`] times.
//! - Store outages are retried with exponential backoff, up to
//!   [`RetryPolicy::max_unavailable_retries`] times.
//! - Everything else is returned as-is.
//!
//! A failed attempt has committed nothing, so repeating it from scratch is
//! always safe.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::{
    Result,
    backend::DocumentStore,
    config::millis,
    transaction::{Transaction, TransactionError},
};

/// How many times, and how patiently, a failed attempt is repeated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryPolicy {
    pub max_conflict_retries: u32,
    pub max_unavailable_retries: u32,
    /// Starting delay for outage backoff, also the upper bound of conflict jitter
    #[serde(with = "millis", rename = "base_delay_ms")]
    pub base_delay: Duration,
    /// Cap on a single backoff delay
    #[serde(with = "millis", rename = "max_delay_ms")]
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_conflict_retries: 5,
            max_unavailable_retries: 3,
            base_delay: Duration::from_millis(50),
            max_delay: Duration::from_secs(2),
        }
    }
}

impl RetryPolicy {
    /// A policy that surfaces the first failure.
    pub fn no_retries() -> Self {
        Self {
            max_conflict_retries: 0,
            max_unavailable_retries: 0,
            ..Self::default()
        }
    }

    /// Delay before outage retry number `attempt` (0-based).
    pub fn backoff(&self, attempt: u32) -> Duration {
        self.base_delay
            .saturating_mul(2u32.pow(attempt.min(6)))
            .min(self.max_delay)
    }

    /// Random pause before a conflict retry, in `[0, base_delay]`.
    pub fn jitter(&self) -> Duration {
        let ceiling = self.base_delay.as_millis() as u64;
        Duration::from_millis(rand::thread_rng().gen_range(0..=ceiling))
    }
}

/// Run `op` in a fresh transaction per attempt and commit it.
///
/// `operation` names the operation in logs and in the deadline error. If
/// `deadline` elapses the attempt in flight is abandoned before it commits,
/// or after it has fully committed, and
/// [`TransactionError::DeadlineExceeded`] is returned.
pub async fn run<T, F, Fut>(
    store: &Arc<dyn DocumentStore>,
    policy: &RetryPolicy,
    deadline: Option<Duration>,
    operation: &'static str,
    op: F,
) -> Result<T>
where
    F: FnMut(Transaction) -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let attempts = attempt_until_done(store, policy, operation, op);
    match deadline {
        Some(limit) => tokio::time::timeout(limit, attempts)
            .await
            .map_err(|_| TransactionError::DeadlineExceeded { operation, limit })?,
        None => attempts.await,
    }
}

async fn attempt_until_done<T, F, Fut>(
    store: &Arc<dyn DocumentStore>,
    policy: &RetryPolicy,
    operation: &'static str,
    mut op: F,
) -> Result<T>
where
    F: FnMut(Transaction) -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let mut conflicts = 0;
    let mut outages = 0;

    loop {
        let tx = Transaction::new(Arc::clone(store));
        let outcome = match op(tx.clone()).await {
            Ok(value) => tx.commit().await.map(|receipt| {
                debug!(operation, sequence = receipt.sequence, writes = receipt.writes, "committed");
                value
            }),
            Err(err) => Err(err),
        };

        let err = match outcome {
            Ok(value) => return Ok(value),
            Err(err) => err,
        };

        if err.is_conflict() && conflicts < policy.max_conflict_retries {
            conflicts += 1;
            let delay = policy.jitter();
            warn!(operation, attempt = conflicts, ?delay, error = %err, "Write conflict, retrying");
            tokio::time::sleep(delay).await;
        } else if err.is_store_unavailable() && outages < policy.max_unavailable_retries {
            let delay = policy.backoff(outages);
            outages += 1;
            warn!(operation, attempt = outages, ?delay, error = %err, "Store unavailable, backing off");
            tokio::time::sleep(delay).await;
        } else {
            return Err(err);
        }
    }
}
