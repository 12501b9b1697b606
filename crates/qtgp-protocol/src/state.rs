//! The protocol state machine (DFA) governing connection phases.
//!
//! Exactly one [`ProtocolState`] value exists per connection at any
//! instant. The transition table below is the whole machine:
//!
//! ```text
//! Start → WaitingForJoin → Joining → InGame ⇄ Resyncing
//!                             │        │         │
//!                             └────────┴────┬────┘
//!                                           ▼
//!                                        Closed (terminal)
//! ```
//!
//! Transition logic is pure: no I/O beyond a trace record on success,
//! independently testable with nothing but `(from, to)` pairs.

use std::fmt;

use crate::StateError;

/// The phase a connection's protocol exchange is in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProtocolState {
    /// Fresh connection; nothing exchanged yet.
    Start,
    /// Ready to receive (or about to send) a join request.
    WaitingForJoin,
    /// Join request in flight; setup ack pending.
    Joining,
    /// Game running; moves and resyncs are legal.
    InGame,
    /// Resync exchange in flight; returns to `InGame`.
    Resyncing,
    /// Terminal. No outgoing transitions are defined.
    Closed,
}

impl fmt::Display for ProtocolState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ProtocolState::Start => "Start",
            ProtocolState::WaitingForJoin => "WaitingForJoin",
            ProtocolState::Joining => "Joining",
            ProtocolState::InGame => "InGame",
            ProtocolState::Resyncing => "Resyncing",
            ProtocolState::Closed => "Closed",
        };
        f.write_str(s)
    }
}

impl ProtocolState {
    /// The allowed next states from `self`, or `None` when no
    /// transitions are defined at all (`Closed` is terminal).
    fn allowed_next(self) -> Option<&'static [ProtocolState]> {
        use ProtocolState::*;
        match self {
            Start => Some(&[WaitingForJoin]),
            WaitingForJoin => Some(&[Joining]),
            Joining => Some(&[InGame, Closed]),
            InGame => Some(&[Resyncing, Closed]),
            Resyncing => Some(&[InGame, Closed]),
            Closed => None,
        }
    }

    /// Returns whether `next` is a legal transition target from `self`.
    pub fn can_transition_to(self, next: ProtocolState) -> bool {
        self.allowed_next()
            .map(|allowed| allowed.contains(&next))
            .unwrap_or(false)
    }

    /// Validates and applies a transition to `next`.
    ///
    /// On success `self` becomes `next` and a trace record is emitted.
    /// On failure `self` is left untouched — a rejected transition
    /// never partially applies.
    ///
    /// # Errors
    /// - [`StateError::UndefinedState`] if `self` has no table entry
    ///   (only `Closed`); this signals a programming-invariant
    ///   violation, not a peer misbehavior.
    /// - [`StateError::InvalidTransition`] if `next` is not in the
    ///   allowed set for `self`.
    pub fn transition_to(
        &mut self,
        next: ProtocolState,
    ) -> Result<(), StateError> {
        let allowed = self
            .allowed_next()
            .ok_or(StateError::UndefinedState { from: *self })?;

        if !allowed.contains(&next) {
            return Err(StateError::InvalidTransition {
                from: *self,
                to: next,
            });
        }

        tracing::debug!(from = %*self, to = %next, "state transition");
        *self = next;
        Ok(())
    }
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    //! Exhaustive coverage of the transition table: every defined pair
    //! succeeds, every undefined pair fails without mutating the state,
    //! and `Closed` rejects everything as an undefined-state defect.

    use super::*;
    use ProtocolState::*;

    const ALL: [ProtocolState; 6] =
        [Start, WaitingForJoin, Joining, InGame, Resyncing, Closed];

    /// The defined transition table, spelled out independently of the
    /// implementation so the test doesn't just mirror `allowed_next`.
    const DEFINED: [(ProtocolState, ProtocolState); 8] = [
        (Start, WaitingForJoin),
        (WaitingForJoin, Joining),
        (Joining, InGame),
        (Joining, Closed),
        (InGame, Resyncing),
        (InGame, Closed),
        (Resyncing, InGame),
        (Resyncing, Closed),
    ];

    #[test]
    fn test_transition_to_defined_pairs_succeed() {
        for (from, to) in DEFINED {
            let mut state = from;
            state
                .transition_to(to)
                .unwrap_or_else(|e| panic!("{from} -> {to} failed: {e}"));
            assert_eq!(state, to, "{from} -> {to} should land on {to}");
        }
    }

    #[test]
    fn test_transition_to_undefined_pairs_fail_and_leave_state() {
        for from in ALL {
            for to in ALL {
                if DEFINED.contains(&(from, to)) {
                    continue;
                }
                let mut state = from;
                let result = state.transition_to(to);

                assert!(result.is_err(), "{from} -> {to} should fail");
                assert_eq!(
                    state, from,
                    "failed {from} -> {to} must not mutate the state"
                );
            }
        }
    }

    #[test]
    fn test_transition_to_rejected_pair_is_invalid_transition() {
        let mut state = Start;
        let result = state.transition_to(InGame);

        assert_eq!(
            result,
            Err(StateError::InvalidTransition {
                from: Start,
                to: InGame
            })
        );
    }

    #[test]
    fn test_transition_to_from_closed_is_undefined_state() {
        // Closed is terminal: any attempt, even to itself, is an
        // undefined-state defect rather than a mere invalid transition.
        for to in ALL {
            let mut state = Closed;
            let result = state.transition_to(to);

            assert_eq!(
                result,
                Err(StateError::UndefinedState { from: Closed }),
                "Closed -> {to} should be UndefinedState"
            );
            assert_eq!(state, Closed);
        }
    }

    #[test]
    fn test_can_transition_to_matches_table() {
        assert!(Start.can_transition_to(WaitingForJoin));
        assert!(!Start.can_transition_to(InGame));
        assert!(InGame.can_transition_to(Resyncing));
        assert!(!Closed.can_transition_to(Start));
    }

    #[test]
    fn test_full_happy_path_walk() {
        // The lifecycle a well-behaved connection actually takes.
        let mut state = Start;
        state.transition_to(WaitingForJoin).unwrap();
        state.transition_to(Joining).unwrap();
        state.transition_to(InGame).unwrap();
        state.transition_to(Resyncing).unwrap();
        state.transition_to(InGame).unwrap();
        state.transition_to(Closed).unwrap();
        assert_eq!(state, Closed);
    }

    #[test]
    fn test_display_names() {
        assert_eq!(WaitingForJoin.to_string(), "WaitingForJoin");
        assert_eq!(Resyncing.to_string(), "Resyncing");
    }
}
