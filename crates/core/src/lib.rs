#![warn(clippy::all, missing_docs)]

//! Core domain logic for the BusTUI reservation tool.
//!
//! This crate hosts the bus/seat data model, the in-memory fleet
//! registry with its reservation operations, the typed error
//! taxonomy, and configuration handling used by the terminal UI
//! and any future frontends.

pub mod config;
pub mod error;
pub mod models;
pub mod registry;

pub use config::AppConfig;
pub use error::{RegistryError, Result};
pub use models::{Bus, BusInfo, PassengerMatch, SeatState, SEATS_PER_BUS, SEAT_COLS, SEAT_ROWS};
pub use registry::FleetRegistry;
