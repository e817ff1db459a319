use std::{cell::RefCell, rc::Rc};

use tracing::{debug, info};

use crate::{
    chain::Outcome,
    work_state::{Activity, WorkState},
};

/// Trait for state change observation
pub trait StateObserver {
    /// Called when the workday moves from one state to the next
    fn on_state_change(&self, from: WorkState, to: WorkState, hour: i32);

    /// Called once when a terminal activity has been emitted
    fn on_activity(&self, _state: WorkState, _activity: Activity, _hour: i32) {}
}

/// Trait for observing requests travelling down a chain
pub trait DispatchObserver {
    /// Called with the outcome of every dispatched request
    fn on_dispatch(&self, outcome: &Outcome);
}

/// Logs all transitions that occur in the workday
#[derive(Debug, Clone, Copy, Default)]
pub struct TransitionLogger;

impl StateObserver for TransitionLogger {
    fn on_state_change(&self, from: WorkState, to: WorkState, hour: i32) {
        debug!(?from, ?to, hour, "work state transition");
    }

    fn on_activity(&self, state: WorkState, activity: Activity, hour: i32) {
        info!(?state, activity = activity.label(), hour, "workday settled");
    }
}

/// Logs every dispatch outcome, matched or not
#[derive(Debug, Clone, Copy, Default)]
pub struct DispatchLogger;

impl DispatchObserver for DispatchLogger {
    fn on_dispatch(&self, outcome: &Outcome) {
        match outcome {
            Outcome::Handled(dispatch) => {
                info!(
                    handler = %dispatch.handler,
                    value = dispatch.value,
                    hops = dispatch.hops,
                    "request handled"
                );
            }
            Outcome::Unhandled(value) => debug!(value, "request fell off the chain"),
        }
    }
}

/// Collects outcomes in memory so callers can inspect them afterwards
#[derive(Debug, Clone, Default)]
pub struct OutcomeRecorder {
    /// Shared log of every outcome seen so far
    log: Rc<RefCell<Vec<Outcome>>>,
}

impl OutcomeRecorder {
    /// Create an empty recorder
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the outcomes recorded so far
    #[must_use]
    pub fn outcomes(&self) -> Vec<Outcome> {
        self.log.borrow().clone()
    }
}

impl DispatchObserver for OutcomeRecorder {
    fn on_dispatch(&self, outcome: &Outcome) {
        self.log.borrow_mut().push(outcome.clone());
    }
}
