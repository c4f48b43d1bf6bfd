use std::fmt;

use serde::{Deserialize, Serialize};

/// Phase of one question's lifecycle.
///
/// `Idle → Retrieving → Generating → Done | Failed`. Failure may be entered
/// from any non-terminal phase; nothing moves backwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionPhase {
    Idle,
    Retrieving,
    Generating,
    Done,
    Failed,
}

impl QuestionPhase {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done | Self::Failed)
    }

    pub fn can_transition_to(&self, next: QuestionPhase) -> bool {
        matches!(
            (self, next),
            (Self::Idle, Self::Retrieving)
                | (Self::Retrieving, Self::Generating)
                | (Self::Generating, Self::Done)
                | (Self::Idle | Self::Retrieving | Self::Generating, Self::Failed)
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Retrieving => "retrieving",
            Self::Generating => "generating",
            Self::Done => "done",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for QuestionPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forward_only() {
        use QuestionPhase::*;
        assert!(Idle.can_transition_to(Retrieving));
        assert!(Retrieving.can_transition_to(Generating));
        assert!(Generating.can_transition_to(Done));
        assert!(Retrieving.can_transition_to(Failed));
        assert!(!Generating.can_transition_to(Retrieving));
        assert!(!Done.can_transition_to(Failed));
        assert!(!Idle.can_transition_to(Done));
        assert!(Failed.is_terminal());
    }
}
