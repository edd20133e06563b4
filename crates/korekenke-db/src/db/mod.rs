//! Database access
//!
//! `query` builds SQL without touching the database so it can be tested in
//! isolation; `reservations` executes it.
//
// Pool construction and migrations
pub mod pool;
//
// Query composition
pub mod query;
//
// Reservation repository
pub mod reservations;
