//! Tabla de transiciones de Trip
//!
//! ```text
//! draft ──► dispatched ──► completed
//!   │            │
//!   └────────────┴──────► cancelled
//! ```
//!
//! `completed` y `cancelled` son terminales y nada vuelve a `draft`.

use crate::models::trip::TripStatus;
use crate::utils::errors::RuleViolation;

/// Resuelve el estado destino pedido por el cliente contra el estado actual
pub fn next_status(from: TripStatus, requested: &str) -> Result<TripStatus, RuleViolation> {
    let invalid = || RuleViolation::InvalidTransition {
        from,
        to: requested.to_string(),
    };

    let to = TripStatus::parse(requested).ok_or_else(invalid)?;

    match (from, to) {
        (TripStatus::Draft, TripStatus::Dispatched)
        | (TripStatus::Dispatched, TripStatus::Completed)
        | (TripStatus::Draft, TripStatus::Cancelled)
        | (TripStatus::Dispatched, TripStatus::Cancelled) => Ok(to),
        _ => Err(invalid()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [TripStatus; 4] = [
        TripStatus::Draft,
        TripStatus::Dispatched,
        TripStatus::Completed,
        TripStatus::Cancelled,
    ];

    #[test]
    fn allowed_transitions() {
        assert_eq!(next_status(TripStatus::Draft, "dispatched"), Ok(TripStatus::Dispatched));
        assert_eq!(next_status(TripStatus::Dispatched, "completed"), Ok(TripStatus::Completed));
        assert_eq!(next_status(TripStatus::Draft, "cancelled"), Ok(TripStatus::Cancelled));
        assert_eq!(next_status(TripStatus::Dispatched, "cancelled"), Ok(TripStatus::Cancelled));
    }

    #[test]
    fn draft_cannot_jump_to_completed() {
        assert!(next_status(TripStatus::Draft, "completed").is_err());
    }

    #[test]
    fn second_dispatch_is_rejected() {
        let err = next_status(TripStatus::Dispatched, "dispatched").unwrap_err();
        assert_eq!(
            err,
            RuleViolation::InvalidTransition {
                from: TripStatus::Dispatched,
                to: "dispatched".to_string(),
            }
        );
    }

    #[test]
    fn nothing_returns_to_draft() {
        for from in ALL {
            assert!(next_status(from, "draft").is_err(), "{} -> draft", from);
        }
    }

    #[test]
    fn terminal_states_accept_nothing() {
        for from in [TripStatus::Completed, TripStatus::Cancelled] {
            for to in ALL {
                assert!(next_status(from, to.as_str()).is_err(), "{} -> {}", from, to);
            }
        }
    }

    #[test]
    fn unknown_targets_are_rejected() {
        for target in ["", "in_progress", "Dispatched", "done"] {
            assert!(matches!(
                next_status(TripStatus::Draft, target),
                Err(RuleViolation::InvalidTransition { .. })
            ));
        }
    }
}
