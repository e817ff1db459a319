//! Responsibility chain: an ordered list of range-owning handlers.
//!
//! A request is offered to each handler in the order the links were set.
//! The first handler whose range contains the request wins; a request that
//! no handler accepts falls off the end of the chain without error.

use std::{collections::HashSet, fmt, ops::Range};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::observers::DispatchObserver;

/// Errors raised while wiring a chain together
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DispatchError {
    /// A handler was given a range that contains no values, so it could never match
    #[error("handler {name} has an empty range [{low}, {high})")]
    EmptyRange { name: String, low: i64, high: i64 },
    /// Two handlers in the same chain share a name
    #[error("handler {0} appears more than once in the chain")]
    DuplicateHandler(String),
    /// The chain has no handlers at all.
    ///
    /// Such a chain would only ever report `Unhandled`; rejecting it catches
    /// layout files that were left empty by mistake.
    #[error("a chain needs at least one handler")]
    EmptyChain,
}

/// A single link in the chain, owning the half-open range `[low, high)`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub struct Handler {
    /// Identity reported when this handler accepts a request
    pub name: String,
    /// Requests inside this range are handled here
    pub range: Range<i64>,
}

impl Handler {
    /// Create a handler for the range `[low, high)`
    #[must_use]
    pub fn new(name: &str, low: i64, high: i64) -> Self {
        Self { name: name.to_string(), range: low..high }
    }

    /// Whether this handler takes the request instead of forwarding it
    #[must_use]
    pub fn accepts(&self, request: i64) -> bool {
        self.range.contains(&request)
    }
}

/// Record produced when a handler accepts a request
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Dispatch {
    /// Name of the accepting handler
    pub handler: String,
    /// The request value
    pub value: i64,
    /// Number of handlers the request was forwarded past
    pub hops: usize,
}

/// Result of offering a request to the chain
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub enum Outcome {
    /// Some handler accepted the request
    Handled(Dispatch),
    /// Every handler forwarded the request and the chain ran out
    Unhandled(i64),
}

impl Outcome {
    /// The dispatch record, if the request was handled
    #[must_use]
    pub fn dispatch(&self) -> Option<&Dispatch> {
        match self {
            Self::Handled(dispatch) => Some(dispatch),
            Self::Unhandled(_) => None,
        }
    }

    /// Name of the handler that took the request, if any
    #[must_use]
    pub fn handler(&self) -> Option<&str> {
        self.dispatch().map(|dispatch| dispatch.handler.as_str())
    }

    /// The request value regardless of outcome
    #[must_use]
    pub fn value(&self) -> i64 {
        match self {
            Self::Handled(dispatch) => dispatch.value,
            Self::Unhandled(value) => *value,
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Handled(Dispatch { handler, value, .. }) => {
                write!(f, "{handler} handled request {value}")
            }
            Self::Unhandled(value) => write!(f, "request {value} fell off the chain"),
        }
    }
}

/// Builds a chain one successor at a time
#[derive(Default)]
pub struct ChainBuilder {
    /// Handlers in link order
    handlers: Vec<Handler>,
    /// Observers handed over to the finished chain
    observers: Vec<Box<dyn DispatchObserver>>,
}

impl fmt::Debug for ChainBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChainBuilder")
            .field("handlers", &self.handlers)
            .field("observers_count", &self.observers.len())
            .finish()
    }
}

impl ChainBuilder {
    /// Start an empty chain
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Link `handler` as the successor of the current last handler
    #[must_use]
    pub fn successor(mut self, handler: Handler) -> Self {
        self.handlers.push(handler);
        self
    }

    /// Shorthand for linking a new handler over `[low, high)`
    #[must_use]
    pub fn handler(self, name: &str, low: i64, high: i64) -> Self {
        self.successor(Handler::new(name, low, high))
    }

    /// Register an observer to be notified of every outcome
    #[must_use]
    pub fn observer(mut self, observer: Box<dyn DispatchObserver>) -> Self {
        self.observers.push(observer);
        self
    }

    /// Freeze the links into a chain
    ///
    /// # Errors
    ///
    /// Returns a `DispatchError` if:
    /// - no handler was linked
    /// - a handler has an empty range
    /// - two handlers share a name
    pub fn build(self) -> Result<Chain, DispatchError> {
        if self.handlers.is_empty() {
            return Err(DispatchError::EmptyChain);
        }

        let mut seen = HashSet::new();
        for handler in &self.handlers {
            if handler.range.is_empty() {
                return Err(DispatchError::EmptyRange {
                    name: handler.name.clone(),
                    low: handler.range.start,
                    high: handler.range.end,
                });
            }
            if !seen.insert(handler.name.as_str()) {
                return Err(DispatchError::DuplicateHandler(handler.name.clone()));
            }
        }

        Ok(Chain { handlers: self.handlers, observers: self.observers })
    }
}

/// An immutable, ordered responsibility chain
pub struct Chain {
    /// Handlers in the order requests are offered to them
    handlers: Vec<Handler>,
    /// Registered dispatch observers
    observers: Vec<Box<dyn DispatchObserver>>,
}

impl fmt::Debug for Chain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Chain")
            .field("handlers", &self.handlers)
            .field("observers_count", &self.observers.len())
            .finish()
    }
}

impl Chain {
    /// The three-link chain covering `[0, 30)` in steps of ten
    #[must_use]
    pub fn standard() -> Self {
        Self {
            handlers: vec![
                Handler::new("handler1", 0, 10),
                Handler::new("handler2", 10, 20),
                Handler::new("handler3", 20, 30),
            ],
            observers: Vec::new(),
        }
    }

    /// Offer a request to each handler in link order until one accepts it
    pub fn handle(&self, request: i64) -> Outcome {
        let outcome = self
            .handlers
            .iter()
            .enumerate()
            .find(|(_, handler)| handler.accepts(request))
            .map_or(Outcome::Unhandled(request), |(hops, handler)| {
                Outcome::Handled(Dispatch { handler: handler.name.clone(), value: request, hops })
            });

        for observer in &self.observers {
            observer.on_dispatch(&outcome);
        }

        outcome
    }

    /// Dispatch a batch of requests, keeping their order
    pub fn handle_all<I>(&self, requests: I) -> Vec<Outcome>
    where
        I: IntoIterator<Item = i64>,
    {
        requests.into_iter().map(|request| self.handle(request)).collect()
    }

    /// Register an observer on an already built chain
    pub fn register_observer(&mut self, observer: Box<dyn DispatchObserver>) {
        self.observers.push(observer);
    }

    /// The handlers in link order
    #[must_use]
    pub fn handlers(&self) -> &[Handler] {
        &self.handlers
    }

    /// Number of links in the chain
    #[must_use]
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    /// A built chain always has at least one handler
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

#[cfg(test)]
mod tests;
