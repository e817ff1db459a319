//! Request dispatch along a responsibility chain, and a workday state machine.
//!
//! This crate provides an ordered, first-match-wins handler chain and a
//! small state machine that cascades through the phases of a workday
//! until one of them settles on an activity.

pub mod chain;
pub mod observers;
pub mod persistence;
pub mod visualization;
pub mod work_state;
pub mod workday;

pub use chain::{Chain, ChainBuilder, Dispatch, DispatchError, Handler, Outcome};
pub use persistence::{ChainConfig, DayReport, PersistenceError};
pub use visualization::StateVisualization;
pub use work_state::{Activity, WorkFacts, WorkState};
pub use workday::{WorkDay, WorkError, run};
