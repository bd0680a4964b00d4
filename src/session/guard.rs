// src/session/guard.rs

use serde::Serialize;

/// Submission latch of a session.
///
/// Leaves `Open` on the first trigger and never returns to it. A failed
/// backend call drops back to `Failed`, which admits exactly one new
/// attempt; `InFlight`, `Confirmed` and `Closed` admit none.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmitLatch {
    #[default]
    Open,
    InFlight,
    Failed,
    Confirmed,
    /// Session abandoned; nothing will be submitted.
    Closed,
}

impl SubmitLatch {
    /// Takes the latch for one submission attempt.
    /// Returns `false` when an attempt is running or the session is done.
    pub fn try_acquire(&mut self) -> bool {
        match self {
            Self::Open | Self::Failed => {
                *self = Self::InFlight;
                true
            }
            Self::InFlight | Self::Confirmed | Self::Closed => false,
        }
    }

    pub fn confirm(&mut self) {
        if *self == Self::InFlight {
            *self = Self::Confirmed;
        }
    }

    /// Releases the in-flight state only; the session stays triggered.
    pub fn fail(&mut self) {
        if *self == Self::InFlight {
            *self = Self::Failed;
        }
    }

    /// Shuts the latch without submitting. No-op once an attempt is running
    /// or done.
    pub fn close(&mut self) -> bool {
        match self {
            Self::Open | Self::Failed => {
                *self = Self::Closed;
                true
            }
            _ => false,
        }
    }

    pub fn is_confirmed(&self) -> bool {
        *self == Self::Confirmed
    }
}
