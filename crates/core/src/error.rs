//! Typed errors for fleet registry operations.

use crate::models::SEATS_PER_BUS;

/// Everything that can go wrong inside the registry.
///
/// Registry operations are total: each anticipated failure surfaces
/// as one of these variants and never as a panic. Presentation (and
/// any reprompting) belongs to the caller.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    /// The registry already holds the configured maximum of buses.
    #[error("cannot install more than {limit} buses")]
    CapacityExceeded {
        /// Configured fleet limit.
        limit: usize,
    },

    /// A required input was empty or otherwise unusable.
    #[error("{0}")]
    InvalidInput(String),

    /// A bus with this number is already installed.
    #[error("bus number '{0}' already exists")]
    DuplicateBus(String),

    /// No installed bus matches the given number.
    #[error("no bus found with number '{0}'")]
    BusNotFound(String),

    /// Seat number outside `1..=32`.
    #[error("seat number {0} is out of range (1-{SEATS_PER_BUS})")]
    InvalidSeat(usize),

    /// Reservation target is already taken.
    #[error("seat {seat} is already reserved for {occupant}")]
    SeatOccupied {
        /// Requested seat number.
        seat: usize,
        /// Current holder of the seat.
        occupant: String,
    },

    /// Cancellation target holds no reservation.
    #[error("seat {0} is already empty")]
    SeatAlreadyEmpty(usize),

    /// Move source holds no reservation.
    #[error("seat {0} is empty, nothing to move")]
    SourceSeatEmpty(usize),

    /// Move target is already taken.
    #[error("target seat {seat} is already reserved for {occupant}")]
    TargetSeatOccupied {
        /// Requested target seat number.
        seat: usize,
        /// Current holder of the target seat.
        occupant: String,
    },
}

/// Registry result alias.
pub type Result<T> = std::result::Result<T, RegistryError>;
