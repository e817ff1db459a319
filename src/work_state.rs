use std::fmt;

use serde::{Deserialize, Serialize};

/// First hour that no longer counts as forenoon
pub const NOON_HOUR: i32 = 12;
/// First hour after the lunch break
pub const AFTERNOON_HOUR: i32 = 13;
/// First hour of the evening
pub const EVENING_HOUR: i32 = 17;
/// From this hour on, unfinished overtime gives way to sleep
pub const BEDTIME_HOUR: i32 = 21;

/// The phases a workday moves through
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub enum WorkState {
    /// Morning work
    #[default]
    Forenoon,
    /// Lunch break
    Noon,
    /// Afternoon work
    Afternoon,
    /// Work left after office hours
    Evening,
    /// Gave up for the night
    Sleeping,
    /// Work finished, off duty
    Rest,
}

/// External facts a workday is evaluated against
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub struct WorkFacts {
    /// Clock hour, meaningful in `0..=23`
    pub hour: i32,
    /// Whether today's work is done
    pub finished: bool,
}

impl WorkFacts {
    /// Bundle an hour and a completion flag
    #[must_use]
    pub fn new(hour: i32, finished: bool) -> Self {
        Self { hour, finished }
    }
}

/// Terminal output of a workday run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub enum Activity {
    /// Working through the morning
    Forenoon,
    /// Eating and resting at midday
    Lunch,
    /// Working through the afternoon
    Afternoon,
    /// Working late
    Overtime,
    /// Going to bed with work left over
    Sleep,
    /// Done for the day
    Off,
}

impl Activity {
    /// Every activity, in the order a day can reach them
    pub const ALL: [Self; 6] =
        [Self::Forenoon, Self::Lunch, Self::Afternoon, Self::Overtime, Self::Sleep, Self::Off];

    /// Human-readable label
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Forenoon => "forenoon work",
            Self::Lunch => "lunch/rest",
            Self::Afternoon => "afternoon work",
            Self::Overtime => "overtime",
            Self::Sleep => "sleep",
            Self::Off => "off work",
        }
    }

    /// Short machine-friendly tag
    #[must_use]
    pub fn tag(self) -> &'static str {
        match self {
            Self::Forenoon => "forenoon",
            Self::Lunch => "lunch",
            Self::Afternoon => "afternoon",
            Self::Overtime => "overtime",
            Self::Sleep => "sleep",
            Self::Off => "off",
        }
    }
}

impl fmt::Display for Activity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// What a state does with the facts it is given
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Produce output and stop
    Emit(Activity),
    /// Hand over to another state
    Goto(WorkState),
}

impl WorkState {
    /// All states, initial state first
    pub const ALL: [Self; 6] =
        [Self::Forenoon, Self::Noon, Self::Afternoon, Self::Evening, Self::Sleeping, Self::Rest];

    /// The complete transition table.
    ///
    /// Every arm either emits or moves strictly forward, so a run from
    /// `Forenoon` settles after at most five transitions.
    #[must_use]
    pub fn step(self, facts: &WorkFacts) -> Step {
        let WorkFacts { hour, finished } = *facts;
        match self {
            Self::Forenoon if hour < NOON_HOUR => Step::Emit(Activity::Forenoon),
            Self::Forenoon => Step::Goto(Self::Noon),
            Self::Noon if hour < AFTERNOON_HOUR => Step::Emit(Activity::Lunch),
            Self::Noon => Step::Goto(Self::Afternoon),
            Self::Afternoon if hour < EVENING_HOUR => Step::Emit(Activity::Afternoon),
            Self::Afternoon => Step::Goto(Self::Evening),
            Self::Evening if finished => Step::Goto(Self::Rest),
            Self::Evening if hour < BEDTIME_HOUR => Step::Emit(Activity::Overtime),
            Self::Evening => Step::Goto(Self::Sleeping),
            Self::Sleeping => Step::Emit(Activity::Sleep),
            Self::Rest => Step::Emit(Activity::Off),
        }
    }

    /// States that always emit, whatever the facts
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Sleeping | Self::Rest)
    }

    /// Get a human-readable description of the state
    #[must_use]
    pub fn get_description(self) -> &'static str {
        match self {
            Self::Forenoon => "Working through the morning, full of energy",
            Self::Noon => "Lunch and a short nap",
            Self::Afternoon => "Back at the desk for the afternoon",
            Self::Evening => "Still at work after hours",
            Self::Sleeping => "Showered and gone to bed",
            Self::Rest => "Clocked off for the day",
        }
    }
}

impl fmt::Display for WorkState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self:?}")
    }
}
