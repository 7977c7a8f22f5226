use thiserror::Error;

/// Faults raised by tree mutation.
///
/// The taxonomy is deliberately small: every other absence is soft
/// (missing options read as `None`, out-of-range `at` returns `None`).
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TreeError {
    /// Adding this child would make a node its own ancestor.
    #[error("node cannot be added to itself or to one of its descendants")]
    WouldCycle,
}
