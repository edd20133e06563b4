//! Reservation list query composition
//!
//! Builds the SQL for the reservations screen from a [`ReservationFilter`]:
//! active rows only, newest first, optional token search and creation-day
//! range, capped at [`MAX_RESERVATIONS`] rows. All values are bound as
//! parameters in the order they appear.

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;
use korekenke_core::constants::MAX_RESERVATIONS;
use korekenke_core::search::search_tokens;
use korekenke_core::ReservationFilter;

const RESERVATION_COLUMNS: &str =
    "id, code, client_name, status, search_index, is_deleted, created_at, updated_at";

/// A value bound to one `$n` placeholder of a [`ComposedQuery`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryParam {
    /// Normalised search tokens, matched with array overlap (any token).
    Tokens(Vec<String>),
    Timestamp(DateTime<Utc>),
    Limit(i64),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComposedQuery {
    pub sql: String,
    /// Parameters in placeholder order (`params[0]` binds `$1`).
    pub params: Vec<QueryParam>,
}

/// First instant of `date` in `tz`.
///
/// When local midnight falls into a DST gap the day starts at the first
/// local time that exists.
fn start_of_day(date: NaiveDate, tz: Tz) -> DateTime<Utc> {
    let midnight = date.and_time(NaiveTime::MIN);
    (0..24)
        .find_map(|hour| {
            tz.from_local_datetime(&(midnight + Duration::hours(hour)))
                .earliest()
        })
        .map(|local| local.with_timezone(&Utc))
        .unwrap_or_else(|| Utc.from_utc_datetime(&midnight))
}

/// Inclusive `[start, end]` bounds of the calendar day `date` in `tz`.
///
/// `end` is one millisecond before the next day starts.
pub fn local_day_bounds(date: NaiveDate, tz: Tz) -> (DateTime<Utc>, DateTime<Utc>) {
    let start = start_of_day(date, tz);
    let next_start = date
        .succ_opt()
        .map(|next| start_of_day(next, tz))
        .unwrap_or_else(|| start + Duration::days(1));
    (start, next_start - Duration::milliseconds(1))
}

/// Compose the reservations list query for `filter`.
///
/// A search term is split on whitespace and normalised; a term with no
/// usable tokens adds no predicate.
pub fn compose_reservations_query(filter: &ReservationFilter, tz: Tz) -> ComposedQuery {
    let mut query_parts = vec![
        format!("SELECT {}", RESERVATION_COLUMNS),
        "FROM reservations".to_string(),
        "WHERE is_deleted = false".to_string(),
    ];
    let mut params = Vec::new();
    let mut param_index = 1;

    if let Some(term) = filter.search_term.as_deref() {
        let tokens = search_tokens(term);
        if !tokens.is_empty() {
            query_parts.push(format!("AND search_index && ${}::text[]", param_index));
            param_index += 1;
            params.push(QueryParam::Tokens(tokens));
        }
    }

    if let Some(date) = filter.create_at_date {
        let (start, end) = local_day_bounds(date, tz);
        query_parts.push(format!(
            "AND created_at >= ${} AND created_at <= ${}",
            param_index,
            param_index + 1
        ));
        param_index += 2;
        params.push(QueryParam::Timestamp(start));
        params.push(QueryParam::Timestamp(end));
    }

    query_parts.push("ORDER BY created_at DESC".to_string());
    query_parts.push(format!("LIMIT ${}", param_index));
    params.push(QueryParam::Limit(MAX_RESERVATIONS));

    ComposedQuery {
        sql: query_parts.join(" "),
        params,
    }
}
