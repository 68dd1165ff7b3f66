//! Fault injection for exercising retry and concurrency paths in tests.

use std::collections::{BTreeSet, VecDeque};
use std::sync::Arc;

use tokio::sync::Barrier;

use super::InMemory;
use crate::{
    Result,
    backend::{DocKey, Write, errors::BackendError},
};

/// A failure the store reports instead of committing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InjectedFault {
    /// Report a transport outage.
    Unavailable,
    /// Report a write conflict.
    Conflict,
}

impl InjectedFault {
    fn into_error(self) -> BackendError {
        match self {
            InjectedFault::Unavailable => BackendError::Unavailable {
                reason: "injected outage".to_string(),
            },
            InjectedFault::Conflict => BackendError::Conflict {
                collection: "*".to_string(),
                reason: "injected conflict".to_string(),
            },
        }
    }
}

#[derive(Debug, Default)]
pub(crate) struct FaultPlan {
    pending: VecDeque<InjectedFault>,
    /// Barrier the next `remaining` commits wait on before validating.
    gate: Option<(Arc<Barrier>, usize)>,
    /// Documents whose writes always fail until cleared.
    poisoned: BTreeSet<(String, DocKey)>,
}

impl FaultPlan {
    fn take_gate(&mut self) -> Option<Arc<Barrier>> {
        let (barrier, remaining) = self.gate.as_mut()?;
        let barrier = barrier.clone();
        *remaining -= 1;
        if *remaining == 0 {
            self.gate = None;
        }
        Some(barrier)
    }
}

/// Waits on the commit gate, if armed, then reports the next queued fault.
///
/// A commit touching a poisoned document fails with `Unavailable` without
/// consuming a queued fault.
pub(crate) async fn before_commit(backend: &InMemory, writes: &[Write]) -> Result<()> {
    let (gate, fault) = {
        let mut plan = backend.faults.lock().unwrap();
        let poisoned = writes.iter().find(|write| {
            plan.poisoned
                .contains(&(write.collection().to_string(), write.key().clone()))
        });
        if let Some(write) = poisoned {
            return Err(BackendError::Unavailable {
                reason: format!("injected failure writing {}/{}", write.collection(), write.key()),
            }
            .into());
        }
        (plan.take_gate(), plan.pending.pop_front())
    };
    if let Some(gate) = gate {
        gate.wait().await;
    }
    match fault {
        Some(fault) => Err(fault.into_error().into()),
        None => Ok(()),
    }
}

impl InMemory {
    /// Fail the next `count` commits with `fault`, applying nothing.
    pub fn fail_next_commits(&self, count: usize, fault: InjectedFault) {
        let mut plan = self.faults.lock().unwrap();
        plan.pending.extend(std::iter::repeat_n(fault, count));
    }

    /// Fail every commit that writes `collection/key` until
    /// [`clear_faults`](Self::clear_faults) is called.
    pub fn fail_writes_to(&self, collection: &str, key: impl Into<DocKey>) {
        let mut plan = self.faults.lock().unwrap();
        plan.poisoned.insert((collection.to_string(), key.into()));
    }

    /// Drop every queued fault, poisoned key and commit gate.
    pub fn clear_faults(&self) {
        *self.faults.lock().unwrap() = FaultPlan::default();
    }

    /// Make the next `count` commits wait until all of them have arrived.
    ///
    /// Used to force concurrent operations to finish their reads before any
    /// of them commits.
    pub fn hold_commits(&self, count: usize) {
        if count == 0 {
            return;
        }
        let mut plan = self.faults.lock().unwrap();
        plan.gate = Some((Arc::new(Barrier::new(count)), count));
    }
}
