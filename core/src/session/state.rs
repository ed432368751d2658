use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Local};

use crate::model::{EvaluationResult, Language, ProblemId};

#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display)]
#[strum(serialize_all = "kebab-case")]
pub enum SessionState {
    Idle = 0,
    InProgress = 1,
    Submitting = 2,
    Submitted = 3,
}

impl SessionState {
    const fn from_u8(v: u8) -> Self {
        use SessionState::*;
        match v {
            1 => InProgress,
            2 => Submitting,
            3 => Submitted,
            _ => Idle,
        }
    }

    /// `true` while a session is running or being graded.
    pub const fn is_active(&self) -> bool {
        matches!(self, Self::InProgress | Self::Submitting)
    }
}

/// [`SessionState`] that only moves through compare-and-swap.
#[derive(Debug)]
pub(crate) struct AtomicState(AtomicU8);

impl AtomicState {
    pub fn new(state: SessionState) -> Self {
        Self(AtomicU8::new(state as u8))
    }

    pub fn load(&self) -> SessionState {
        SessionState::from_u8(self.0.load(Ordering::Acquire))
    }

    /// Moves `from` to `to`, or returns the state actually found.
    pub fn transition(&self, from: SessionState, to: SessionState) -> Result<(), SessionState> {
        self.0
            .compare_exchange(from as u8, to as u8, Ordering::AcqRel, Ordering::Acquire)
            .map(drop)
            .map_err(SessionState::from_u8)
    }

    pub fn store(&self, state: SessionState) {
        self.0.store(state as u8, Ordering::Release);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum SubmitReason {
    /// The countdown reached zero.
    Timeout,
    /// Forced by the [`AutoSubmitGuard`](super::AutoSubmitGuard).
    Auto,
    Manual,
}

/// Point-in-time view of the running session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub problem_id: ProblemId,
    pub language: Language,
    pub source_text: String,
    pub remaining_seconds: u32,
    pub state: SessionState,
    pub last_saved_at: Option<DateTime<Local>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    pub attempt: u64,
    pub reason: SubmitReason,
    pub problem_id: ProblemId,
    pub language: Language,
    /// The source exactly as it was when submission was requested.
    pub source: Arc<str>,
    pub result: EvaluationResult,
    pub submitted_at: DateTime<Local>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// This request started the evaluation.
    Accepted { attempt: u64 },
    /// Another request got there first, or there is nothing to submit.
    Ignored(SessionState),
}

impl SubmitOutcome {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted { .. })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    Running { remaining: u32 },
    /// The countdown just hit zero and a timeout submission was requested.
    Expired(SubmitOutcome),
    /// The session is no longer in progress; the tick did nothing.
    Stopped(SessionState),
}
