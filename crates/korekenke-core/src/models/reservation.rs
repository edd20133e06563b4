use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Reservation (reception) row as listed by the reservations screen
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct Reservation {
    pub id: Uuid,
    pub code: Option<String>,
    pub client_name: Option<String>,
    pub status: String,
    pub search_index: Vec<String>,
    pub is_deleted: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Filters applied to the reservations list. Rebuilt on every filter change.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReservationFilter {
    pub search_term: Option<String>,
    /// Calendar day (in the configured local timezone) the reservation was created on
    pub create_at_date: Option<NaiveDate>,
}

impl ReservationFilter {
    pub fn new(search_term: Option<String>, create_at_date: Option<NaiveDate>) -> Self {
        Self {
            search_term: search_term.filter(|s| !s.trim().is_empty()),
            create_at_date,
        }
    }
}
