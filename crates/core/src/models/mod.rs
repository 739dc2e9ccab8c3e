//! Bus and seat domain models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Number of seat rows on every bus.
pub const SEAT_ROWS: usize = 8;
/// Number of seat columns on every bus.
pub const SEAT_COLS: usize = 4;
/// Total seats per bus (8 rows x 4 columns).
pub const SEATS_PER_BUS: usize = SEAT_ROWS * SEAT_COLS;

/// State of a single seat cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SeatState {
    /// Nobody holds the seat.
    Empty,
    /// The seat is reserved for the named passenger.
    Occupied(String),
}

impl SeatState {
    /// Returns `true` when nobody holds the seat.
    pub fn is_empty(&self) -> bool {
        matches!(self, SeatState::Empty)
    }

    /// Returns the occupant name, if any.
    pub fn occupant(&self) -> Option<&str> {
        match self {
            SeatState::Empty => None,
            SeatState::Occupied(name) => Some(name),
        }
    }
}

/// Maps a 1-based seat number to its `(row, col)` grid position.
///
/// Returns `None` for numbers outside `1..=SEATS_PER_BUS`. Seat
/// numbering is row-major: seats 1-4 fill the first row.
pub fn seat_position(seat_no: usize) -> Option<(usize, usize)> {
    if !(1..=SEATS_PER_BUS).contains(&seat_no) {
        return None;
    }
    let idx = seat_no - 1;
    Some((idx / SEAT_COLS, idx % SEAT_COLS))
}

/// Maps a `(row, col)` grid position back to its 1-based seat number.
pub fn seat_number(row: usize, col: usize) -> usize {
    row * SEAT_COLS + col + 1
}

/// Metadata captured when a bus is installed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BusInfo {
    /// Unique bus number (non-empty).
    pub number: String,
    /// Driver's name.
    pub driver: String,
    /// Arrival time, free-form (e.g. `10:00`).
    pub arrival: String,
    /// Departure time, free-form (e.g. `14:00`).
    pub departure: String,
    /// Route origin.
    pub origin: String,
    /// Route destination.
    pub destination: String,
}

/// A single scheduled bus with its 32-seat layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bus {
    /// Unique bus number within the registry.
    pub number: String,
    /// Driver's name.
    pub driver: String,
    /// Arrival time string.
    pub arrival: String,
    /// Departure time string.
    pub departure: String,
    /// Route origin.
    pub origin: String,
    /// Route destination.
    pub destination: String,
    /// Timestamp when the bus was installed.
    pub installed_at: DateTime<Utc>,
    seats: Vec<SeatState>,
}

impl Bus {
    /// Creates a bus from install metadata with every seat empty.
    pub fn new(info: BusInfo) -> Self {
        Self {
            number: info.number,
            driver: info.driver,
            arrival: info.arrival,
            departure: info.departure,
            origin: info.origin,
            destination: info.destination,
            installed_at: Utc::now(),
            seats: vec![SeatState::Empty; SEATS_PER_BUS],
        }
    }

    /// Returns the state of the given 1-based seat number, or `None`
    /// if the number is out of range.
    pub fn seat(&self, seat_no: usize) -> Option<&SeatState> {
        let (row, col) = seat_position(seat_no)?;
        self.seats.get(row * SEAT_COLS + col)
    }

    pub(crate) fn seat_mut(&mut self, seat_no: usize) -> Option<&mut SeatState> {
        let (row, col) = seat_position(seat_no)?;
        self.seats.get_mut(row * SEAT_COLS + col)
    }

    pub(crate) fn swap_seats(&mut self, from: usize, to: usize) {
        // Callers validate both numbers; out-of-range is a no-op.
        if let (Some((fr, fc)), Some((tr, tc))) = (seat_position(from), seat_position(to)) {
            self.seats.swap(fr * SEAT_COLS + fc, tr * SEAT_COLS + tc);
        }
    }

    /// Number of seats currently empty.
    pub fn free_seat_count(&self) -> usize {
        self.seats.iter().filter(|seat| seat.is_empty()).count()
    }

    /// Ascending seat numbers of all empty seats.
    pub fn free_seats(&self) -> impl Iterator<Item = usize> + '_ {
        self.seats
            .iter()
            .enumerate()
            .filter(|(_, seat)| seat.is_empty())
            .map(|(idx, _)| idx + 1)
    }

    /// Occupied seats as `(seat_number, occupant)` pairs in ascending
    /// seat order.
    pub fn occupied_seats(&self) -> impl Iterator<Item = (usize, &str)> + '_ {
        self.seats.iter().enumerate().filter_map(|(idx, seat)| {
            seat.occupant().map(|name| (idx + 1, name))
        })
    }

    /// User-facing route label.
    pub fn route_label(&self) -> String {
        format!("{} -> {}", self.origin, self.destination)
    }
}

/// One row of a passenger search result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PassengerMatch {
    /// Matched occupant name.
    pub passenger: String,
    /// Bus the passenger is booked on.
    pub bus_number: String,
    /// 1-based seat number.
    pub seat: usize,
    /// Route origin of that bus.
    pub origin: String,
    /// Route destination of that bus.
    pub destination: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_info(number: &str) -> BusInfo {
        BusInfo {
            number: number.to_string(),
            driver: "D".to_string(),
            arrival: "10:00".to_string(),
            departure: "14:00".to_string(),
            origin: "X".to_string(),
            destination: "Y".to_string(),
        }
    }

    #[test]
    fn seat_numbers_round_trip() {
        for seat_no in 1..=SEATS_PER_BUS {
            let (row, col) = seat_position(seat_no).expect("seat in range");
            assert!(row < SEAT_ROWS);
            assert!(col < SEAT_COLS);
            assert_eq!(seat_number(row, col), seat_no);
        }
    }

    #[test]
    fn seat_position_rejects_out_of_range() {
        assert_eq!(seat_position(0), None);
        assert_eq!(seat_position(SEATS_PER_BUS + 1), None);
        assert_eq!(seat_position(usize::MAX), None);
    }

    #[test]
    fn seat_position_is_row_major() {
        assert_eq!(seat_position(1), Some((0, 0)));
        assert_eq!(seat_position(4), Some((0, 3)));
        assert_eq!(seat_position(5), Some((1, 0)));
        assert_eq!(seat_position(32), Some((7, 3)));
    }

    #[test]
    fn new_bus_is_fully_empty() {
        let bus = Bus::new(sample_info("B1"));
        assert_eq!(bus.free_seat_count(), SEATS_PER_BUS);
        assert_eq!(bus.free_seats().count(), SEATS_PER_BUS);
        assert_eq!(bus.occupied_seats().count(), 0);
    }

    #[test]
    fn occupied_seats_report_in_seat_order() {
        let mut bus = Bus::new(sample_info("B1"));
        *bus.seat_mut(7).unwrap() = SeatState::Occupied("Carol".to_string());
        *bus.seat_mut(2).unwrap() = SeatState::Occupied("Anna".to_string());

        let occupied: Vec<_> = bus.occupied_seats().collect();
        assert_eq!(occupied, vec![(2, "Anna"), (7, "Carol")]);
        assert_eq!(bus.free_seat_count(), SEATS_PER_BUS - 2);
    }
}
