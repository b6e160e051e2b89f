//! # Transaction Lifecycle State Machine
//!
//! Tracks one contract invocation from construction to a terminal outcome.
//!
//! ## States
//!
//! ```text
//! Built ──▶ Simulated ──▶ Prepared ──▶ Signed ──▶ Submitted ──▶ Confirmed (terminal)
//!   │           │            │           │            │
//!   └───────────┴────────────┴───────────┴────────────┴──▶ Failed (terminal)
//!                                                     │
//!                                                     └──▶ TimedOut (terminal)
//! ```
//!
//! Read-only calls stop at `Simulated`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

// ─── Transaction State ───────────────────────────────────────────────

/// The lifecycle state of an invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransactionState {
    Built,
    Simulated,
    Prepared,
    Signed,
    Submitted,
    /// Ledger reported SUCCESS (terminal).
    Confirmed,
    /// Rejected at any stage (terminal).
    Failed,
    /// Polling budget exhausted without a final status (terminal).
    TimedOut,
}

impl TransactionState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Confirmed | Self::Failed | Self::TimedOut)
    }

    /// The single forward successor, if any.
    fn next(&self) -> Option<Self> {
        match self {
            Self::Built => Some(Self::Simulated),
            Self::Simulated => Some(Self::Prepared),
            Self::Prepared => Some(Self::Signed),
            Self::Signed => Some(Self::Submitted),
            _ => None,
        }
    }

    fn can_transition_to(&self, to: Self) -> bool {
        if self.is_terminal() {
            return false;
        }
        match to {
            Self::Failed => true,
            Self::Confirmed | Self::TimedOut => *self == Self::Submitted,
            other => self.next() == Some(other),
        }
    }
}

impl std::fmt::Display for TransactionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Built => "BUILT",
            Self::Simulated => "SIMULATED",
            Self::Prepared => "PREPARED",
            Self::Signed => "SIGNED",
            Self::Submitted => "SUBMITTED",
            Self::Confirmed => "CONFIRMED",
            Self::Failed => "FAILED",
            Self::TimedOut => "TIMED_OUT",
        };
        f.write_str(s)
    }
}

// ─── Errors ──────────────────────────────────────────────────────────

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StateError {
    #[error("invalid transaction transition: {from} -> {to}")]
    InvalidTransition { from: String, to: String },

    #[error("transaction is in terminal state {state}")]
    TerminalState { state: String },
}

// ─── Transition Record ───────────────────────────────────────────────

/// Record of one state transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionRecord {
    pub from_state: TransactionState,
    pub to_state: TransactionState,
    pub timestamp: DateTime<Utc>,
    pub reason: String,
}

// ─── Lifecycle ───────────────────────────────────────────────────────

/// Current state plus the ordered transition log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionLifecycle {
    pub state: TransactionState,
    pub transitions: Vec<TransitionRecord>,
}

impl Default for TransactionLifecycle {
    fn default() -> Self {
        Self::new()
    }
}

impl TransactionLifecycle {
    pub fn new() -> Self {
        Self {
            state: TransactionState::Built,
            transitions: Vec::new(),
        }
    }

    /// Move to `to`, recording `reason`.
    pub fn advance(&mut self, to: TransactionState, reason: &str) -> Result<(), StateError> {
        if self.state.is_terminal() {
            return Err(StateError::TerminalState {
                state: self.state.to_string(),
            });
        }
        if !self.state.can_transition_to(to) {
            return Err(StateError::InvalidTransition {
                from: self.state.to_string(),
                to: to.to_string(),
            });
        }
        self.transitions.push(TransitionRecord {
            from_state: self.state,
            to_state: to,
            timestamp: Utc::now(),
            reason: reason.to_string(),
        });
        self.state = to;
        Ok(())
    }

    /// Mark the invocation failed unless it already reached a terminal state.
    pub fn fail(&mut self, reason: &str) {
        if !self.state.is_terminal() {
            let _ = self.advance(TransactionState::Failed, reason);
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.state.is_terminal()
    }
}

// ─── Tests ───────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn submitted() -> TransactionLifecycle {
        let mut lc = TransactionLifecycle::new();
        lc.advance(TransactionState::Simulated, "simulated").unwrap();
        lc.advance(TransactionState::Prepared, "prepared").unwrap();
        lc.advance(TransactionState::Signed, "signed").unwrap();
        lc.advance(TransactionState::Submitted, "submitted").unwrap();
        lc
    }

    #[test]
    fn happy_path_to_confirmed() {
        let mut lc = submitted();
        lc.advance(TransactionState::Confirmed, "SUCCESS").unwrap();
        assert!(lc.is_terminal());
        assert_eq!(lc.transitions.len(), 5);
        assert_eq!(lc.transitions[0].from_state, TransactionState::Built);
    }

    #[test]
    fn submitted_can_time_out() {
        let mut lc = submitted();
        lc.advance(TransactionState::TimedOut, "30 polls").unwrap();
        assert_eq!(lc.state, TransactionState::TimedOut);
    }

    #[test]
    fn cannot_skip_simulation() {
        let mut lc = TransactionLifecycle::new();
        let err = lc.advance(TransactionState::Signed, "skip").unwrap_err();
        assert_eq!(
            err,
            StateError::InvalidTransition {
                from: "BUILT".into(),
                to: "SIGNED".into()
            }
        );
    }

    #[test]
    fn cannot_confirm_before_submission() {
        let mut lc = TransactionLifecycle::new();
        lc.advance(TransactionState::Simulated, "ok").unwrap();
        assert!(lc.advance(TransactionState::Confirmed, "early").is_err());
    }

    #[test]
    fn any_live_state_can_fail() {
        let mut lc = TransactionLifecycle::new();
        lc.advance(TransactionState::Simulated, "ok").unwrap();
        lc.fail("contract error");
        assert_eq!(lc.state, TransactionState::Failed);
    }

    #[test]
    fn terminal_states_are_final() {
        let mut lc = submitted();
        lc.advance(TransactionState::Confirmed, "SUCCESS").unwrap();
        assert!(matches!(
            lc.advance(TransactionState::Failed, "late"),
            Err(StateError::TerminalState { .. })
        ));
        lc.fail("ignored");
        assert_eq!(lc.state, TransactionState::Confirmed);
    }
}
