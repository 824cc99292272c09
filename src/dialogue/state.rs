//! Typing state machine — where a scenario's two-step append currently is.

use serde::Serialize;

/// Progress of the scripted append sequence.
///
/// Cycles Idle → AwaitingFirstAppend → AwaitingSecondTypingStart →
/// AwaitingSecondAppend → Idle. A restart jumps back to Idle from anywhere.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TypingPhase {
    #[default]
    Idle,
    AwaitingFirstAppend,
    AwaitingSecondTypingStart,
    AwaitingSecondAppend,
}

impl TypingPhase {
    /// Check if a timer-driven transition from `self` to `target` is valid.
    pub fn can_transition_to(&self, target: TypingPhase) -> bool {
        use TypingPhase::*;
        matches!(
            (self, target),
            (Idle, AwaitingFirstAppend)
                | (AwaitingFirstAppend, AwaitingSecondTypingStart)
                | (AwaitingSecondTypingStart, AwaitingSecondAppend)
                | (AwaitingSecondAppend, Idle)
        )
    }

    /// Whether the typing indicator is shown in this phase.
    pub fn is_typing(&self) -> bool {
        matches!(self, Self::AwaitingFirstAppend | Self::AwaitingSecondAppend)
    }

    /// Whether options can be picked.
    pub fn accepts_selection(&self) -> bool {
        matches!(self, Self::Idle)
    }

    /// The phase after the next timer fires.
    pub fn next(&self) -> TypingPhase {
        use TypingPhase::*;
        match self {
            Idle => AwaitingFirstAppend,
            AwaitingFirstAppend => AwaitingSecondTypingStart,
            AwaitingSecondTypingStart => AwaitingSecondAppend,
            AwaitingSecondAppend => Idle,
        }
    }
}

impl std::fmt::Display for TypingPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Idle => "idle",
            Self::AwaitingFirstAppend => "awaiting_first_append",
            Self::AwaitingSecondTypingStart => "awaiting_second_typing_start",
            Self::AwaitingSecondAppend => "awaiting_second_append",
        };
        write!(f, "{s}")
    }
}
