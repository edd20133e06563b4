//! Korekenke Database Layer
//!
//! Reservation query composition and the PostgreSQL repository that runs it.

pub mod db;

pub use db::pool::{connect, run_migrations};
pub use db::query::{compose_reservations_query, local_day_bounds, ComposedQuery, QueryParam};
pub use db::reservations::{NewReservation, ReservationRepository};
