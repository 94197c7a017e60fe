//! Board lifecycle and comparison categories.

use verdict_core::errors::BoardError;

/// Lifecycle of a validation board. Transitions only go forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum BoardState {
    Initialized,
    Parsed,
    Compared,
    Dumped,
}

impl BoardState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Initialized => "initialized",
            Self::Parsed => "parsed",
            Self::Compared => "compared",
            Self::Dumped => "dumped",
        }
    }

    /// Move to `to`, which must directly follow `self`. `Dumped` can be
    /// reached from any state and re-entered, dumps being repeatable.
    pub fn advance(&mut self, to: BoardState) -> Result<(), BoardError> {
        let allowed = match to {
            Self::Initialized => false,
            Self::Parsed => *self == Self::Initialized,
            Self::Compared => *self == Self::Parsed,
            Self::Dumped => true,
        };
        if !allowed {
            return Err(BoardError::InvalidTransition {
                from: self.as_str(),
                to: to.as_str(),
            });
        }
        *self = to;
        Ok(())
    }
}

/// Comparison categories a board reports on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    /// Against a reference run of the same configuration.
    Consistency,
    /// Against a previous version of the code.
    Continuity,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Consistency => "consistency",
            Self::Continuity => "continuity",
        }
    }
}
