//! Submission phase tracking.

use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;

/// Where a submission currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SubmitPhase {
    /// No submission in flight.
    Idle,
    /// Running full-form validation.
    Validating,
    /// Writing the record; inputs are non-interactive.
    Submitting,
    /// Persisting the photo.
    Uploading,
}

impl SubmitPhase {
    fn as_u8(self) -> u8 {
        match self {
            Self::Idle => 0,
            Self::Validating => 1,
            Self::Submitting => 2,
            Self::Uploading => 3,
        }
    }

    fn from_u8(value: u8) -> Self {
        match value {
            1 => Self::Validating,
            2 => Self::Submitting,
            3 => Self::Uploading,
            _ => Self::Idle,
        }
    }
}

impl std::fmt::Display for SubmitPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::Validating => write!(f, "validating"),
            Self::Submitting => write!(f, "submitting"),
            Self::Uploading => write!(f, "uploading"),
        }
    }
}

/// A handle to observe a form's submission phase.
///
/// This is a lightweight, cloneable handle that a UI can poll from other
/// tasks while a submission is in flight.
#[derive(Debug, Clone, Default)]
pub struct FormStatus {
    phase: Arc<AtomicU8>,
}

impl FormStatus {
    /// Create an idle status handle.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current phase.
    #[must_use]
    pub fn phase(&self) -> SubmitPhase {
        SubmitPhase::from_u8(self.phase.load(Ordering::SeqCst))
    }

    /// Whether a submission is in flight.
    #[must_use]
    pub fn is_busy(&self) -> bool {
        self.phase() != SubmitPhase::Idle
    }

    /// Whether inputs should accept edits.
    #[must_use]
    pub fn is_interactive(&self) -> bool {
        matches!(self.phase(), SubmitPhase::Idle | SubmitPhase::Validating)
    }

    /// Claim the form for a submission.
    ///
    /// Returns `None` if one is already in flight. The phase returns to
    /// idle when the guard is dropped.
    #[must_use]
    pub fn try_begin(&self) -> Option<PhaseGuard> {
        self.phase
            .compare_exchange(
                SubmitPhase::Idle.as_u8(),
                SubmitPhase::Validating.as_u8(),
                Ordering::SeqCst,
                Ordering::SeqCst,
            )
            .ok()
            .map(|_| PhaseGuard {
                status: self.clone(),
            })
    }
}

/// Holds a form in a non-idle phase until dropped.
#[derive(Debug)]
pub struct PhaseGuard {
    status: FormStatus,
}

impl PhaseGuard {
    /// Move to another in-flight phase.
    pub fn set(&self, phase: SubmitPhase) {
        self.status.phase.store(phase.as_u8(), Ordering::SeqCst);
    }
}

impl Drop for PhaseGuard {
    fn drop(&mut self) {
        self.status
            .phase
            .store(SubmitPhase::Idle.as_u8(), Ordering::SeqCst);
    }
}
