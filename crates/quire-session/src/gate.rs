// gate.rs — ConfirmationGate: may a destructive action go ahead?
//
// A pure function of two inputs. It holds no state and has no side effects;
// the controller gathers the user's answer (through a Confirmer) and asks
// the gate what to do with it.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateDecision {
    Proceed,
    Abort,
}

impl fmt::Display for GateDecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GateDecision::Proceed => write!(f, "proceed"),
            GateDecision::Abort => write!(f, "abort"),
        }
    }
}

pub struct ConfirmationGate;

impl ConfirmationGate {
    /// Decide whether an action may proceed.
    ///
    /// - `discards_unsaved`: the action would throw away unsaved edits
    ///   (true exactly when the session is dirty).
    /// - `confirmed`: the user agreed to discard them. Ignored when there is
    ///   nothing to discard.
    pub fn decide(discards_unsaved: bool, confirmed: bool) -> GateDecision {
        if !discards_unsaved || confirmed {
            GateDecision::Proceed
        } else {
            GateDecision::Abort
        }
    }
}
