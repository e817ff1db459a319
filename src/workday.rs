use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    observers::StateObserver,
    persistence::DayReport,
    work_state::{Activity, Step, WorkFacts, WorkState},
};

/// Longest cascade the transition table can produce from `Forenoon`
pub const MAX_TRANSITIONS: usize = 5;

/// Errors raised while running a workday
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WorkError {
    /// The cascade did not settle within `MAX_TRANSITIONS` steps
    #[error("state cascade exceeded {limit} transitions, last state {last:?}")]
    CascadeLimit { limit: usize, last: WorkState },
}

/// Represents a state transition inside one run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct StateTransition {
    /// The state before the transition
    pub from: WorkState,
    /// The state after the transition
    pub to: WorkState,
    /// The hour the transition was evaluated at
    pub hour: i32,
}

/// One simulated day: fixed facts plus the state currently in charge
pub struct WorkDay {
    /// Hour and completion flag, stable for the whole cascade
    facts: WorkFacts,
    /// The active state
    current: WorkState,
    /// Transitions taken so far
    history: Vec<StateTransition>,
    /// Activity emitted by the last run
    last_activity: Option<Activity>,
    /// Registered state change observers
    observers: Vec<Box<dyn StateObserver>>,
}

impl fmt::Debug for WorkDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WorkDay")
            .field("facts", &self.facts)
            .field("current", &self.current)
            .field("history", &self.history)
            .field("last_activity", &self.last_activity)
            .field("observers_count", &self.observers.len())
            .finish()
    }
}

impl WorkDay {
    /// Create a day at `hour`, starting in the forenoon state
    #[must_use]
    pub fn new(hour: i32, finished: bool) -> Self {
        Self::with_facts(WorkFacts::new(hour, finished))
    }

    /// Create a day from a prepared set of facts
    #[must_use]
    pub fn with_facts(facts: WorkFacts) -> Self {
        Self {
            facts,
            current: WorkState::default(),
            history: Vec::new(),
            last_activity: None,
            observers: Vec::new(),
        }
    }

    /// Register an observer to be notified of state changes
    pub fn register_observer(&mut self, observer: Box<dyn StateObserver>) {
        self.observers.push(observer);
    }

    /// Get the current state of the day
    #[must_use]
    pub fn current_state(&self) -> WorkState {
        self.current
    }

    /// The facts this day is evaluated against
    #[must_use]
    pub fn facts(&self) -> WorkFacts {
        self.facts
    }

    /// Get the complete transition history
    #[must_use]
    pub fn get_history(&self) -> &[StateTransition] {
        &self.history
    }

    /// Move to `next`, recording and announcing the transition
    fn set_state(&mut self, next: WorkState) {
        let transition = StateTransition { from: self.current, to: next, hour: self.facts.hour };
        self.current = next;
        self.history.push(transition);

        for observer in &self.observers {
            observer.on_state_change(transition.from, transition.to, transition.hour);
        }
    }

    /// Let the current state act, cascading through transitions until one emits
    ///
    /// # Errors
    ///
    /// Returns `WorkError::CascadeLimit` if more than `MAX_TRANSITIONS`
    /// transitions are taken within this run.
    pub fn run(&mut self) -> Result<Activity, WorkError> {
        let facts = self.facts;
        let (state, activity) = cascade(self.current, &facts, |next| self.set_state(next))?;

        self.last_activity = Some(activity);
        for observer in &self.observers {
            observer.on_activity(state, activity, facts.hour);
        }
        Ok(activity)
    }

    /// Summary of the day so far, `None` until `run` has emitted
    #[must_use]
    pub fn report(&self) -> Option<DayReport> {
        let activity = self.last_activity?;
        let path = std::iter::once(WorkState::default())
            .chain(self.history.iter().map(|transition| transition.to))
            .collect();

        Some(DayReport {
            hour: self.facts.hour,
            finished: self.facts.finished,
            activity,
            path,
        })
    }
}

impl fmt::Display for WorkDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.last_activity {
            Some(activity) => write!(f, "Hour {}: {activity}", self.facts.hour),
            None => write!(f, "Hour {}: {}", self.facts.hour, self.current.get_description()),
        }
    }
}

/// Step from `state` until some state emits, calling `on_transition` with
/// each state entered on the way.
fn cascade<F>(
    mut state: WorkState,
    facts: &WorkFacts,
    mut on_transition: F,
) -> Result<(WorkState, Activity), WorkError>
where
    F: FnMut(WorkState),
{
    let mut taken = 0_usize;
    loop {
        match state.step(facts) {
            Step::Emit(activity) => return Ok((state, activity)),
            Step::Goto(next) => {
                if taken >= MAX_TRANSITIONS {
                    return Err(WorkError::CascadeLimit { limit: MAX_TRANSITIONS, last: state });
                }
                taken = taken.saturating_add(1);
                on_transition(next);
                state = next;
            }
        }
    }
}

/// Evaluate a fresh day and return what it settles on
///
/// # Errors
///
/// Returns `WorkError::CascadeLimit` under the same bound as `WorkDay::run`.
pub fn run(hour: i32, finished: bool) -> Result<Activity, WorkError> {
    cascade(WorkState::default(), &WorkFacts::new(hour, finished), |_| {})
        .map(|(_, activity)| activity)
}
