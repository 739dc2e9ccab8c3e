//! In-memory fleet registry and its reservation operations.

use tracing::{debug, info};

use crate::error::{RegistryError, Result};
use crate::models::{Bus, BusInfo, PassengerMatch, SeatState};

/// Default fleet limit when none is configured.
pub const DEFAULT_MAX_BUSES: usize = 10;

/// Owned collection of installed buses.
///
/// The registry is the single place where seat state mutates. It is
/// exclusively owned by its session: no interior locking, no
/// globals. Callers construct one (usually sized from
/// [`crate::AppConfig::max_buses`]) and route every operation
/// through it.
#[derive(Debug, Clone)]
pub struct FleetRegistry {
    buses: Vec<Bus>,
    capacity: usize,
}

impl Default for FleetRegistry {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_MAX_BUSES)
    }
}

impl FleetRegistry {
    /// Creates an empty registry with the default fleet limit.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty registry holding at most `capacity` buses.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buses: Vec::new(),
            capacity,
        }
    }

    /// Configured fleet limit.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of installed buses.
    pub fn len(&self) -> usize {
        self.buses.len()
    }

    /// Returns `true` when no bus is installed.
    pub fn is_empty(&self) -> bool {
        self.buses.is_empty()
    }

    /// Installs a new bus with every seat empty.
    pub fn install_bus(&mut self, info: BusInfo) -> Result<()> {
        if self.buses.len() >= self.capacity {
            return Err(RegistryError::CapacityExceeded {
                limit: self.capacity,
            });
        }
        if info.number.trim().is_empty() {
            return Err(RegistryError::InvalidInput(
                "bus number cannot be empty".to_string(),
            ));
        }
        if self.find_bus(&info.number).is_some() {
            return Err(RegistryError::DuplicateBus(info.number));
        }

        info!(bus = %info.number, "bus installed");
        self.buses.push(Bus::new(info));
        Ok(())
    }

    /// Reserves a seat for the named passenger.
    pub fn reserve_seat(
        &mut self,
        bus_number: &str,
        seat_no: usize,
        passenger: &str,
    ) -> Result<()> {
        let passenger = passenger.trim();
        let bus = find_bus_mut(&mut self.buses, bus_number)?;
        let seat = bus
            .seat_mut(seat_no)
            .ok_or(RegistryError::InvalidSeat(seat_no))?;
        if let Some(occupant) = seat.occupant() {
            return Err(RegistryError::SeatOccupied {
                seat: seat_no,
                occupant: occupant.to_string(),
            });
        }
        if passenger.is_empty() {
            return Err(RegistryError::InvalidInput(
                "passenger name cannot be empty".to_string(),
            ));
        }

        *seat = SeatState::Occupied(passenger.to_string());
        debug!(bus = %bus_number, seat = seat_no, "seat reserved");
        Ok(())
    }

    /// Cancels a reservation and returns the vacated occupant's name.
    ///
    /// Unconditional once invoked; any confirmation prompt belongs to
    /// the caller.
    pub fn cancel_seat(&mut self, bus_number: &str, seat_no: usize) -> Result<String> {
        let bus = find_bus_mut(&mut self.buses, bus_number)?;
        let seat = bus
            .seat_mut(seat_no)
            .ok_or(RegistryError::InvalidSeat(seat_no))?;
        match std::mem::replace(seat, SeatState::Empty) {
            SeatState::Occupied(name) => {
                debug!(bus = %bus_number, seat = seat_no, "reservation cancelled");
                Ok(name)
            }
            SeatState::Empty => Err(RegistryError::SeatAlreadyEmpty(seat_no)),
        }
    }

    /// Relocates an occupant from one seat to another on the same bus.
    ///
    /// Atomic over the two cells: both numbers and both states are
    /// validated before anything mutates.
    pub fn move_seat(&mut self, bus_number: &str, from_seat: usize, to_seat: usize) -> Result<()> {
        let bus = find_bus_mut(&mut self.buses, bus_number)?;
        let source = bus
            .seat(from_seat)
            .ok_or(RegistryError::InvalidSeat(from_seat))?;
        let target = bus.seat(to_seat).ok_or(RegistryError::InvalidSeat(to_seat))?;
        if source.is_empty() {
            return Err(RegistryError::SourceSeatEmpty(from_seat));
        }
        if let Some(occupant) = target.occupant() {
            return Err(RegistryError::TargetSeatOccupied {
                seat: to_seat,
                occupant: occupant.to_string(),
            });
        }

        bus.swap_seats(from_seat, to_seat);
        debug!(bus = %bus_number, from = from_seat, to = to_seat, "reservation moved");
        Ok(())
    }

    /// Case-insensitive substring search across every occupied seat.
    ///
    /// Results are lazy, ordered by bus insertion order then ascending
    /// seat number. An empty result is not an error; an empty pattern
    /// is.
    pub fn find_passengers<'a>(
        &'a self,
        pattern: &str,
    ) -> Result<impl Iterator<Item = PassengerMatch> + 'a> {
        let trimmed = pattern.trim();
        if trimmed.is_empty() {
            return Err(RegistryError::InvalidInput(
                "search pattern cannot be empty".to_string(),
            ));
        }

        let needle = trimmed.to_lowercase();
        Ok(self.buses.iter().flat_map(move |bus| {
            let needle = needle.clone();
            bus.occupied_seats()
                .filter(move |(_, name)| name.to_lowercase().contains(&needle))
                .map(move |(seat, name)| PassengerMatch {
                    passenger: name.to_string(),
                    bus_number: bus.number.clone(),
                    seat,
                    origin: bus.origin.clone(),
                    destination: bus.destination.clone(),
                })
        }))
    }

    /// Ascending seat numbers of all empty seats on the given bus.
    pub fn free_seats<'a>(&'a self, bus_number: &str) -> Result<impl Iterator<Item = usize> + 'a> {
        let bus = self
            .find_bus(bus_number)
            .ok_or_else(|| RegistryError::BusNotFound(bus_number.to_string()))?;
        Ok(bus.free_seats())
    }

    /// Buses whose route matches both filters, in insertion order.
    ///
    /// Matching is case-insensitive substring; an empty filter matches
    /// any value for that field.
    pub fn list_by_route<'a>(
        &'a self,
        origin_filter: &str,
        destination_filter: &str,
    ) -> impl Iterator<Item = &'a Bus> + 'a {
        let origin = origin_filter.trim().to_lowercase();
        let destination = destination_filter.trim().to_lowercase();
        self.buses.iter().filter(move |bus| {
            let origin_ok = origin.is_empty() || bus.origin.to_lowercase().contains(&origin);
            let destination_ok = destination.is_empty()
                || bus.destination.to_lowercase().contains(&destination);
            origin_ok && destination_ok
        })
    }

    /// Full record for one bus, seat grid included.
    pub fn get_bus_details(&self, bus_number: &str) -> Result<&Bus> {
        self.find_bus(bus_number)
            .ok_or_else(|| RegistryError::BusNotFound(bus_number.to_string()))
    }

    /// All installed buses in insertion order.
    pub fn list_all_buses(&self) -> &[Bus] {
        &self.buses
    }

    fn find_bus(&self, bus_number: &str) -> Option<&Bus> {
        self.buses.iter().find(|bus| bus.number == bus_number)
    }
}

fn find_bus_mut<'a>(buses: &'a mut [Bus], bus_number: &str) -> Result<&'a mut Bus> {
    buses
        .iter_mut()
        .find(|bus| bus.number == bus_number)
        .ok_or_else(|| RegistryError::BusNotFound(bus_number.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SEATS_PER_BUS;

    fn info(number: &str, origin: &str, destination: &str) -> BusInfo {
        BusInfo {
            number: number.to_string(),
            driver: "D".to_string(),
            arrival: "10:00".to_string(),
            departure: "14:00".to_string(),
            origin: origin.to_string(),
            destination: destination.to_string(),
        }
    }

    fn registry_with_bus(number: &str) -> FleetRegistry {
        let mut registry = FleetRegistry::new();
        registry.install_bus(info(number, "X", "Y")).unwrap();
        registry
    }

    #[test]
    fn install_rejects_eleventh_bus() {
        let mut registry = FleetRegistry::new();
        for i in 0..10 {
            registry.install_bus(info(&format!("B{i}"), "X", "Y")).unwrap();
        }
        assert_eq!(
            registry.install_bus(info("B10", "X", "Y")),
            Err(RegistryError::CapacityExceeded { limit: 10 })
        );
        assert_eq!(registry.len(), 10);
    }

    #[test]
    fn install_rejects_empty_and_duplicate_numbers() {
        let mut registry = registry_with_bus("B1");
        assert_eq!(
            registry.install_bus(info("", "X", "Y")),
            Err(RegistryError::InvalidInput(
                "bus number cannot be empty".to_string()
            ))
        );
        assert_eq!(
            registry.install_bus(info("B1", "A", "B")),
            Err(RegistryError::DuplicateBus("B1".to_string()))
        );
    }

    #[test]
    fn custom_capacity_is_honoured() {
        let mut registry = FleetRegistry::with_capacity(1);
        registry.install_bus(info("B1", "X", "Y")).unwrap();
        assert_eq!(
            registry.install_bus(info("B2", "X", "Y")),
            Err(RegistryError::CapacityExceeded { limit: 1 })
        );
    }

    #[test]
    fn seat_operations_reject_out_of_range_numbers() {
        let mut registry = registry_with_bus("B1");
        for seat_no in [0, SEATS_PER_BUS + 1] {
            assert_eq!(
                registry.reserve_seat("B1", seat_no, "Alice"),
                Err(RegistryError::InvalidSeat(seat_no))
            );
            assert_eq!(
                registry.cancel_seat("B1", seat_no),
                Err(RegistryError::InvalidSeat(seat_no))
            );
            assert_eq!(
                registry.move_seat("B1", seat_no, 1),
                Err(RegistryError::InvalidSeat(seat_no))
            );
            assert_eq!(
                registry.move_seat("B1", 1, seat_no),
                Err(RegistryError::InvalidSeat(seat_no))
            );
        }
    }

    #[test]
    fn operations_on_unknown_bus_fail() {
        let mut registry = FleetRegistry::new();
        let missing = RegistryError::BusNotFound("nope".to_string());
        assert_eq!(
            registry.reserve_seat("nope", 1, "Alice"),
            Err(missing.clone())
        );
        assert_eq!(registry.cancel_seat("nope", 1), Err(missing.clone()));
        assert_eq!(registry.move_seat("nope", 1, 2), Err(missing.clone()));
        assert_eq!(registry.get_bus_details("nope").err(), Some(missing.clone()));
        assert_eq!(registry.free_seats("nope").err(), Some(missing));
    }

    #[test]
    fn reserve_cancel_round_trip() {
        let mut registry = registry_with_bus("B1");
        registry.reserve_seat("B1", 5, "Alice").unwrap();
        assert_eq!(
            registry.reserve_seat("B1", 5, "Bob"),
            Err(RegistryError::SeatOccupied {
                seat: 5,
                occupant: "Alice".to_string()
            })
        );

        assert_eq!(registry.cancel_seat("B1", 5), Ok("Alice".to_string()));
        assert_eq!(
            registry.cancel_seat("B1", 5),
            Err(RegistryError::SeatAlreadyEmpty(5))
        );
        registry.reserve_seat("B1", 5, "Bob").unwrap();
    }

    #[test]
    fn reserve_rejects_empty_passenger_name() {
        let mut registry = registry_with_bus("B1");
        assert_eq!(
            registry.reserve_seat("B1", 1, "  "),
            Err(RegistryError::InvalidInput(
                "passenger name cannot be empty".to_string()
            ))
        );
        assert!(registry.get_bus_details("B1").unwrap().seat(1).unwrap().is_empty());
    }

    #[test]
    fn move_relocates_occupant_and_preserves_count() {
        let mut registry = registry_with_bus("B1");
        registry.reserve_seat("B1", 3, "Alice").unwrap();
        registry.reserve_seat("B1", 9, "Bob").unwrap();

        registry.move_seat("B1", 3, 4).unwrap();

        let bus = registry.get_bus_details("B1").unwrap();
        assert!(bus.seat(3).unwrap().is_empty());
        assert_eq!(bus.seat(4).unwrap().occupant(), Some("Alice"));
        assert_eq!(bus.free_seat_count(), SEATS_PER_BUS - 2);
    }

    #[test]
    fn move_validates_source_and_target() {
        let mut registry = registry_with_bus("B1");
        registry.reserve_seat("B1", 1, "Alice").unwrap();
        registry.reserve_seat("B1", 2, "Bob").unwrap();

        assert_eq!(
            registry.move_seat("B1", 10, 11),
            Err(RegistryError::SourceSeatEmpty(10))
        );
        assert_eq!(
            registry.move_seat("B1", 1, 2),
            Err(RegistryError::TargetSeatOccupied {
                seat: 2,
                occupant: "Bob".to_string()
            })
        );

        // Failed moves leave both cells untouched.
        let bus = registry.get_bus_details("B1").unwrap();
        assert_eq!(bus.seat(1).unwrap().occupant(), Some("Alice"));
        assert_eq!(bus.seat(2).unwrap().occupant(), Some("Bob"));
    }

    #[test]
    fn find_passengers_matches_case_insensitive_substrings() {
        let mut registry = FleetRegistry::new();
        registry.install_bus(info("B1", "X", "Y")).unwrap();
        registry.install_bus(info("B2", "A", "B")).unwrap();
        registry.reserve_seat("B1", 2, "Anna").unwrap();
        registry.reserve_seat("B2", 1, "Juan").unwrap();
        registry.reserve_seat("B1", 8, "Bob").unwrap();

        let matches: Vec<_> = registry.find_passengers("an").unwrap().collect();
        assert_eq!(matches.len(), 2);
        assert_eq!(matches[0].passenger, "Anna");
        assert_eq!(matches[0].bus_number, "B1");
        assert_eq!(matches[0].seat, 2);
        assert_eq!(matches[0].origin, "X");
        assert_eq!(matches[1].passenger, "Juan");
        assert_eq!(matches[1].bus_number, "B2");

        assert_eq!(registry.find_passengers("zz").unwrap().count(), 0);
        assert!(matches!(
            registry.find_passengers("  "),
            Err(RegistryError::InvalidInput(_))
        ));
    }

    #[test]
    fn find_passengers_orders_by_bus_then_seat() {
        let mut registry = FleetRegistry::new();
        registry.install_bus(info("B1", "X", "Y")).unwrap();
        registry.install_bus(info("B2", "X", "Y")).unwrap();
        registry.reserve_seat("B2", 1, "Ann").unwrap();
        registry.reserve_seat("B1", 20, "Anne").unwrap();
        registry.reserve_seat("B1", 3, "Anna").unwrap();

        let seats: Vec<_> = registry
            .find_passengers("ann")
            .unwrap()
            .map(|hit| (hit.bus_number, hit.seat))
            .collect();
        assert_eq!(
            seats,
            vec![
                ("B1".to_string(), 3),
                ("B1".to_string(), 20),
                ("B2".to_string(), 1)
            ]
        );
    }

    #[test]
    fn route_filters_are_substring_and_optional() {
        let mut registry = FleetRegistry::new();
        registry.install_bus(info("B1", "Stockholm", "Gothenburg")).unwrap();
        registry.install_bus(info("B2", "Malmo", "Stockholm")).unwrap();

        let hits: Vec<_> = registry.list_by_route("stock", "").map(|b| b.number.as_str()).collect();
        assert_eq!(hits, vec!["B1"]);

        let hits: Vec<_> = registry.list_by_route("", "STOCK").map(|b| b.number.as_str()).collect();
        assert_eq!(hits, vec!["B2"]);

        let hits: Vec<_> = registry.list_by_route("", "").map(|b| b.number.as_str()).collect();
        assert_eq!(hits, vec!["B1", "B2"]);

        assert_eq!(registry.list_by_route("nowhere", "").count(), 0);
    }

    #[test]
    fn empty_registry_lists_nothing_and_details_fail() {
        let registry = FleetRegistry::new();
        assert!(registry.list_all_buses().is_empty());
        assert_eq!(
            registry.get_bus_details("X"),
            Err(RegistryError::BusNotFound("X".to_string()))
        );
    }

    #[test]
    fn full_reservation_scenario() {
        let mut registry = FleetRegistry::new();
        registry.install_bus(info("B1", "X", "Y")).unwrap();

        registry.reserve_seat("B1", 1, "Alice").unwrap();
        assert_eq!(
            registry.reserve_seat("B1", 1, "Bob"),
            Err(RegistryError::SeatOccupied {
                seat: 1,
                occupant: "Alice".to_string()
            })
        );

        assert_eq!(registry.cancel_seat("B1", 1), Ok("Alice".to_string()));
        registry.reserve_seat("B1", 1, "Bob").unwrap();

        let free: Vec<_> = registry.free_seats("B1").unwrap().collect();
        assert_eq!(free.len(), 31);
        assert_eq!(free, (2..=SEATS_PER_BUS).collect::<Vec<_>>());
    }
}
