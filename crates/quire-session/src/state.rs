// state.rs — SessionState: the observable lifecycle of a document session.
//
//   Empty ──open──▶ Loading ──ok──▶ Clean ◀──edit──▶ Dirty
//     ▲               │ fail/cancel                    │
//     │               ▼                                ▼
//     └──close──── (prior state)      Clean/Dirty ──save──▶ Saving ──▶ Clean | Dirty
//
// Save-as may also start from Empty (an untitled, blank buffer).
//
// The state is derived from the document plus the in-flight marker; it is
// never stored on its own, so it cannot drift from the data.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::document::DocumentSession;

/// Which request, if any, is outstanding for the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InFlight {
    Open,
    Save,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    /// No document loaded and nothing typed.
    Empty,
    /// An open is in flight.
    Loading,
    /// Buffer equals the last known on-disk content.
    Clean,
    /// Buffer differs from the last known on-disk content.
    Dirty,
    /// A save is in flight.
    Saving,
}

impl SessionState {
    /// Compute the state for a document with (or without) a request in flight.
    pub fn derive(document: &DocumentSession, in_flight: Option<InFlight>) -> Self {
        match in_flight {
            Some(InFlight::Open) => SessionState::Loading,
            Some(InFlight::Save) => SessionState::Saving,
            None if document.is_empty() => SessionState::Empty,
            None if document.is_dirty() => SessionState::Dirty,
            None => SessionState::Clean,
        }
    }

    /// Whether moving from this state to `next` is a legal lifecycle step.
    ///
    /// Staying put is always legal (edits while a request is in flight).
    pub fn can_transition_to(&self, next: SessionState) -> bool {
        use SessionState::*;

        if *self == next {
            return true;
        }
        matches!(
            (self, next),
            (Empty | Clean | Dirty, Loading)
                | (Loading, Empty | Clean | Dirty)
                | (Empty | Clean | Dirty, Saving)
                | (Saving, Empty | Clean | Dirty)
                // Edits.
                | (Clean, Dirty)
                | (Dirty, Clean)
                | (Empty, Dirty)
                | (Dirty, Empty)
                // Close.
                | (Clean, Empty)
        )
    }

    /// Whether an open or save is outstanding.
    pub fn is_busy(&self) -> bool {
        matches!(self, SessionState::Loading | SessionState::Saving)
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionState::Empty => write!(f, "empty"),
            SessionState::Loading => write!(f, "loading"),
            SessionState::Clean => write!(f, "clean"),
            SessionState::Dirty => write!(f, "dirty"),
            SessionState::Saving => write!(f, "saving"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derived_from_document_and_marker() {
        let mut doc = DocumentSession::new();
        assert_eq!(SessionState::derive(&doc, None), SessionState::Empty);
        assert_eq!(
            SessionState::derive(&doc, Some(InFlight::Open)),
            SessionState::Loading
        );

        doc.edit("typed".into());
        assert_eq!(SessionState::derive(&doc, None), SessionState::Dirty);
        assert_eq!(
            SessionState::derive(&doc, Some(InFlight::Save)),
            SessionState::Saving
        );
    }

    #[test]
    fn lifecycle_transitions() {
        use SessionState::*;
        assert!(Empty.can_transition_to(Loading));
        assert!(Dirty.can_transition_to(Loading));
        assert!(Loading.can_transition_to(Clean));
        assert!(Saving.can_transition_to(Dirty));
        assert!(Dirty.can_transition_to(Clean));
        assert!(Saving.can_transition_to(Saving));

        assert!(!Empty.can_transition_to(Clean));
        assert!(!Loading.can_transition_to(Saving));
        assert!(!Saving.can_transition_to(Loading));
    }

    #[test]
    fn busy_states() {
        assert!(SessionState::Loading.is_busy());
        assert!(SessionState::Saving.is_busy());
        assert!(!SessionState::Dirty.is_busy());
    }

    #[test]
    fn display_is_snake_case() {
        assert_eq!(SessionState::Loading.to_string(), "loading");
        assert_eq!(
            serde_json::to_string(&SessionState::Dirty).unwrap(),
            "\"dirty\""
        );
    }
}
