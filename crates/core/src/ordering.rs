//! Position management for user-ordered collections.
//!
//! Committees and secretariates are displayed in a caller-controlled order.
//! Each record holds a `position` that is unique within its collection;
//! gaps are allowed. Moving a record is a pairwise swap: whoever holds the
//! requested position takes the mover's old one. Nothing else is shifted.
//!
//! This module only plans moves. The database layer locks the affected rows,
//! asks [`plan_swap`] what to write, and applies the plan in one transaction.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::{DbId, Position};

/// Smallest position a record may hold.
pub const MIN_POSITION: Position = 1;

/// A record's identity and current position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Slot {
    pub id: DbId,
    pub position: Position,
}

/// One position assignment to persist.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PositionMove {
    pub id: DbId,
    pub from: Position,
    pub to: Position,
}

/// Result of planning a swap.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SwapPlan {
    /// The record already holds the requested position.
    Unchanged,
    /// Assignments to write. One entry when the requested position is a gap,
    /// two when another record is displaced.
    Moves(Vec<PositionMove>),
}

impl SwapPlan {
    pub fn moves(&self) -> &[PositionMove] {
        match self {
            Self::Unchanged => &[],
            Self::Moves(m) => m,
        }
    }
}

/// Reject positions below [`MIN_POSITION`].
pub fn validate_position(position: Position) -> Result<(), CoreError> {
    if position < MIN_POSITION {
        return Err(CoreError::Validation(format!(
            "Position must be at least {MIN_POSITION}, got {position}"
        )));
    }
    Ok(())
}

/// Plan moving `target` to `requested`.
///
/// `holder` is the record currently at `requested` in the same collection,
/// if any. A holder that is the target itself is ignored.
pub fn plan_swap(
    target: Slot,
    requested: Position,
    holder: Option<Slot>,
) -> Result<SwapPlan, CoreError> {
    validate_position(requested)?;

    if target.position == requested {
        return Ok(SwapPlan::Unchanged);
    }

    let mut moves = vec![PositionMove {
        id: target.id,
        from: target.position,
        to: requested,
    }];

    if let Some(other) = holder.filter(|h| h.id != target.id) {
        if other.position != requested {
            return Err(CoreError::Internal(format!(
                "Holder {} is at position {}, expected {requested}",
                other.id, other.position
            )));
        }
        moves.push(PositionMove {
            id: other.id,
            from: other.position,
            to: target.position,
        });
    }

    Ok(SwapPlan::Moves(moves))
}

/// Validate a bulk reorder request before touching the database.
///
/// The request must be non-empty, name each record once, assign each
/// position once, and use positions of at least [`MIN_POSITION`].
pub fn validate_reorder(entries: &[Slot]) -> Result<(), CoreError> {
    if entries.is_empty() {
        return Err(CoreError::Validation(
            "Reorder request must contain at least one entry".into(),
        ));
    }

    let mut ids = HashSet::with_capacity(entries.len());
    let mut positions = HashSet::with_capacity(entries.len());

    for entry in entries {
        validate_position(entry.position)?;
        if !ids.insert(entry.id) {
            return Err(CoreError::Validation(format!(
                "Record {} appears more than once",
                entry.id
            )));
        }
        if !positions.insert(entry.position) {
            return Err(CoreError::Validation(format!(
                "Position {} is assigned more than once",
                entry.position
            )));
        }
    }

    Ok(())
}

/// `true` when no two slots share a position.
pub fn positions_are_unique(slots: &[Slot]) -> bool {
    let mut seen = HashSet::with_capacity(slots.len());
    slots.iter().all(|s| seen.insert(s.position))
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    fn slot(id: DbId, position: Position) -> Slot {
        Slot { id, position }
    }

    /// Apply a swap to an in-memory collection the way the repository does.
    fn apply(slots: &mut [Slot], id: DbId, requested: Position) -> SwapPlan {
        let target = *slots.iter().find(|s| s.id == id).unwrap();
        let holder = slots.iter().copied().find(|s| s.position == requested);
        let plan = plan_swap(target, requested, holder).unwrap();
        for m in plan.moves() {
            let s = slots.iter_mut().find(|s| s.id == m.id).unwrap();
            assert_eq!(s.position, m.from);
            s.position = m.to;
        }
        plan
    }

    #[test]
    fn same_position_is_a_noop() {
        let plan = plan_swap(slot(1, 3), 3, Some(slot(1, 3))).unwrap();
        assert_eq!(plan, SwapPlan::Unchanged);
        assert!(plan.moves().is_empty());
    }

    #[test]
    fn swap_with_holder() {
        let mut slots = vec![slot(10, 1), slot(20, 2), slot(30, 3)];
        let plan = apply(&mut slots, 10, 2);

        assert_eq!(plan.moves().len(), 2);
        assert_eq!(slots, vec![slot(10, 2), slot(20, 1), slot(30, 3)]);
    }

    #[test]
    fn move_into_gap_touches_only_target() {
        let mut slots = vec![slot(1, 1), slot(2, 5)];
        let plan = apply(&mut slots, 1, 3);

        assert_eq!(
            plan.moves(),
            &[PositionMove {
                id: 1,
                from: 1,
                to: 3
            }]
        );
        assert_eq!(slots, vec![slot(1, 3), slot(2, 5)]);
    }

    #[test]
    fn swap_is_its_own_inverse() {
        for a in 1..=5 {
            for b in 1..=5 {
                let original: Vec<Slot> = (1..=5).map(|p| slot(p as DbId * 100, p)).collect();
                let mut slots = original.clone();
                let id = a as DbId * 100;

                apply(&mut slots, id, b);
                apply(&mut slots, id, a);

                assert_eq!(slots, original, "swap {a} -> {b} -> {a} must restore order");
            }
        }
    }

    #[test]
    fn random_swap_sequences_keep_positions_unique() {
        // Deterministic LCG so the sequence is reproducible.
        let mut state: u64 = 0x5eed;
        let mut next = |bound: u64| {
            state = state.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
            (state >> 33) % bound
        };

        let mut slots: Vec<Slot> = [1, 2, 4, 7, 8, 12]
            .iter()
            .enumerate()
            .map(|(i, &p)| slot(i as DbId + 1, p))
            .collect();

        for _ in 0..500 {
            let id = next(slots.len() as u64) as DbId + 1;
            let requested = next(14) as Position + 1;
            apply(&mut slots, id, requested);
            assert!(positions_are_unique(&slots), "duplicate after moving {id} to {requested}");
        }
    }

    #[test]
    fn rejects_position_below_minimum() {
        assert_matches!(plan_swap(slot(1, 2), 0, None), Err(CoreError::Validation(_)));
    }

    #[test]
    fn mismatched_holder_is_an_internal_error() {
        assert_matches!(
            plan_swap(slot(1, 1), 2, Some(slot(2, 9))),
            Err(CoreError::Internal(_))
        );
    }

    #[test]
    fn reorder_validation() {
        assert!(validate_reorder(&[slot(1, 2), slot(2, 1)]).is_ok());
        assert_matches!(validate_reorder(&[]), Err(CoreError::Validation(_)));
        assert_matches!(
            validate_reorder(&[slot(1, 1), slot(1, 2)]),
            Err(CoreError::Validation(msg)) if msg.contains("more than once")
        );
        assert_matches!(
            validate_reorder(&[slot(1, 1), slot(2, 1)]),
            Err(CoreError::Validation(msg)) if msg.contains("Position 1")
        );
        assert_matches!(
            validate_reorder(&[slot(1, -4)]),
            Err(CoreError::Validation(_))
        );
    }
}
