use thiserror::Error;

use crate::store::StoreError;

/// Failures a caller can act on. Each variant is a terminal outcome of one
/// operation; nothing here leaves a row half-written.
#[derive(Debug, Error)]
pub enum TicketingError {
    /// The referenced event or ticket does not exist.
    #[error("{0}")]
    NotFound(&'static str),

    /// The event cannot sell right now: not published, or sold out.
    #[error("{0}")]
    Unavailable(&'static str),

    /// The buyer already holds a live ticket for this event.
    #[error("user already holds a live ticket for this event")]
    Duplicate,

    /// The entity exists but is in the wrong state for this transition.
    #[error("{0}")]
    InvalidState(&'static str),

    /// The admission window has not opened yet.
    #[error("{0}")]
    TooEarly(&'static str),

    /// The admission window has closed, or the event already started.
    #[error("{0}")]
    TooLate(&'static str),

    /// The caller is neither the owner nor an admin.
    #[error("{0}")]
    Forbidden(&'static str),

    /// The request payload breaks a creation invariant.
    #[error("{0}")]
    Validation(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}
