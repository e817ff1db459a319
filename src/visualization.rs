use std::{collections::BTreeMap, fmt::Write as _, fs::File, io::Write, path::Path};

use crate::{
    chain::{Chain, Outcome},
    work_state::{Step, WorkFacts, WorkState},
    workday::StateTransition,
};

/// Hours probed when deriving edge conditions from the transition table
const DAY_HOURS: std::ops::Range<i32> = 0..24;

/// Hours and completion flags under which one step is taken
#[derive(Debug, Clone, Copy)]
struct Condition {
    /// Lowest hour seen
    min_hour: i32,
    /// Highest hour seen
    max_hour: i32,
    /// Seen with `finished == false`
    unfinished: bool,
    /// Seen with `finished == true`
    finished: bool,
}

impl Condition {
    /// Start a condition from a single probe
    fn new(hour: i32, finished: bool) -> Self {
        Self { min_hour: hour, max_hour: hour, unfinished: !finished, finished }
    }

    /// Widen the condition to cover another probe
    fn widen(&mut self, hour: i32, finished: bool) {
        self.min_hour = self.min_hour.min(hour);
        self.max_hour = self.max_hour.max(hour);
        if finished {
            self.finished = true;
        } else {
            self.unfinished = true;
        }
    }

    /// Short label such as `unfinished, hour >= 21`
    fn label(&self) -> String {
        let mut parts = Vec::new();
        match (self.unfinished, self.finished) {
            (true, false) => parts.push("unfinished".to_string()),
            (false, true) => parts.push("finished".to_string()),
            _ => {}
        }
        if self.min_hour > DAY_HOURS.start {
            parts.push(format!("hour >= {}", self.min_hour));
        }
        if self.max_hour < DAY_HOURS.end.saturating_sub(1) {
            parts.push(format!("hour < {}", self.max_hour.saturating_add(1)));
        }
        if parts.is_empty() { "always".to_string() } else { parts.join(", ") }
    }
}

/// Escape a name for use inside a quoted DOT label
fn escape_label(name: &str) -> String {
    name.replace('\\', "\\\\").replace('"', "\\\"")
}

/// Visualization tools for chains and the workday state machine
#[derive(Debug)]
pub struct StateVisualization;

impl StateVisualization {
    /// Probe every state over a whole day and group the steps it takes
    fn probe(state: WorkState) -> Vec<(Step, Condition)> {
        let mut steps: Vec<(Step, Condition)> = Vec::new();
        for hour in DAY_HOURS {
            for finished in [false, true] {
                let step = state.step(&WorkFacts::new(hour, finished));
                if let Some((_, condition)) = steps.iter_mut().find(|(seen, _)| *seen == step) {
                    condition.widen(hour, finished);
                } else {
                    steps.push((step, Condition::new(hour, finished)));
                }
            }
        }
        steps
    }

    /// Generate a DOT graph of the workday state machine.
    ///
    /// Consecutive states in `highlight` are drawn as the path taken.
    #[must_use]
    pub fn state_machine_dot(highlight: &[WorkState]) -> String {
        let mut dot = String::from("digraph workday {\n");
        dot.push_str("  rankdir=LR;\n");
        dot.push_str("  node [shape=circle, style=filled, fillcolor=lightblue];\n");

        for state in WorkState::ALL {
            if highlight.last() == Some(&state) {
                let _ = writeln!(dot, "  {state} [fillcolor=palegreen, peripheries=2];");
            } else {
                let _ = writeln!(dot, "  {state};");
            }
        }

        let taken: Vec<(WorkState, WorkState)> = highlight
            .windows(2)
            .filter_map(|pair| pair.first().copied().zip(pair.get(1).copied()))
            .collect();

        for state in WorkState::ALL {
            for (step, condition) in Self::probe(state) {
                let label = condition.label();
                match step {
                    Step::Goto(next) => {
                        let style = if taken.contains(&(state, next)) {
                            "color=red, penwidth=2.0"
                        } else {
                            "color=black"
                        };
                        let _ = writeln!(dot, "  {state} -> {next} [label=\"{label}\", {style}];");
                    }
                    Step::Emit(activity) => {
                        let node = activity.tag();
                        let _ = writeln!(
                            dot,
                            "  {node} [shape=box, fillcolor=white, label=\"{}\"];",
                            activity.label()
                        );
                        let _ = writeln!(dot, "  {state} -> {node} [label=\"{label}\", style=dashed];");
                    }
                }
            }
        }

        dot.push_str("}\n");
        dot
    }

    /// Generate a DOT graph of a chain, links left to right
    #[must_use]
    pub fn chain_dot(chain: &Chain) -> String {
        let mut dot = String::from("digraph chain {\n");
        dot.push_str("  rankdir=LR;\n");
        dot.push_str("  node [shape=box, style=filled, fillcolor=lightblue];\n");

        for (idx, handler) in chain.handlers().iter().enumerate() {
            let _ = writeln!(
                dot,
                "  h{idx} [label=\"{}\\n[{}, {})\"];",
                escape_label(&handler.name),
                handler.range.start,
                handler.range.end
            );
        }
        dot.push_str("  unhandled [shape=plaintext, style=\"\", label=\"unhandled\"];\n");

        let last = chain.len().saturating_sub(1);
        for idx in 0..chain.len() {
            if idx == last {
                let _ = writeln!(dot, "  h{idx} -> unhandled [label=\"forward\", style=dashed];");
            } else {
                let _ = writeln!(dot, "  h{idx} -> h{} [label=\"forward\"];", idx.saturating_add(1));
            }
        }

        dot.push_str("}\n");
        dot
    }

    /// Save a DOT representation to a file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be created or written to
    pub fn save_dot_to_file(dot: &str, path: &Path) -> Result<(), std::io::Error> {
        let mut file = File::create(path)?;
        file.write_all(dot.as_bytes())?;
        Ok(())
    }

    /// Generate a markdown table of a workday's transitions
    #[must_use]
    pub fn history_table(transitions: &[StateTransition]) -> String {
        if transitions.is_empty() {
            return "No transitions recorded yet.".to_string();
        }

        let mut table = String::from("| # | From | To | Hour |\n");
        table.push_str("|---|------|----|------|\n");

        for (i, transition) in transitions.iter().enumerate() {
            let _ = writeln!(
                table,
                "| {} | {} | {} | {} |",
                i.saturating_add(1),
                transition.from,
                transition.to,
                transition.hour
            );
        }

        table
    }

    /// Generate a markdown table of dispatch outcomes
    #[must_use]
    pub fn dispatch_table(outcomes: &[Outcome]) -> String {
        if outcomes.is_empty() {
            return "No requests dispatched yet.".to_string();
        }

        let mut table = String::from("| Request | Handler | Hops |\n");
        table.push_str("|---------|---------|------|\n");

        for outcome in outcomes {
            match outcome {
                Outcome::Handled(dispatch) => {
                    let _ = writeln!(
                        table,
                        "| {} | {} | {} |",
                        dispatch.value, dispatch.handler, dispatch.hops
                    );
                }
                Outcome::Unhandled(value) => {
                    let _ = writeln!(table, "| {value} | (unhandled) | - |");
                }
            }
        }

        table
    }

    /// Count how many requests each handler took; unhandled requests are keyed by `None`
    #[must_use]
    pub fn dispatch_counts(outcomes: &[Outcome]) -> BTreeMap<Option<String>, usize> {
        let mut counts = BTreeMap::new();
        for outcome in outcomes {
            let entry = counts.entry(outcome.handler().map(str::to_string)).or_insert(0_usize);
            *entry = entry.saturating_add(1);
        }
        counts
    }
}
