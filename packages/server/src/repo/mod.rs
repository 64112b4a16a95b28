//! Centralized data access. Handlers never filter by owner themselves:
//! the `find_*_for_owner` gates return the same `NotFound` whether a row
//! is missing or belongs to someone else, and the list helpers assume the
//! parent row already came through its gate.

pub mod cases;
pub mod logs;
pub mod photos;
pub mod showings;
