use chrono::Utc;
use chrono_tz::Tz;
use korekenke_core::search::build_search_index;
use korekenke_core::{AppError, Reservation, ReservationFilter};
use sqlx::{PgPool, Postgres};
use uuid::Uuid;

use super::query::{compose_reservations_query, QueryParam};

/// Fields supplied when a reservation is created; the search index is derived.
#[derive(Debug, Clone)]
pub struct NewReservation {
    pub code: Option<String>,
    pub client_name: Option<String>,
    pub status: String,
}

#[derive(Clone)]
pub struct ReservationRepository {
    pool: PgPool,
    /// Timezone that defines calendar days for date filters
    timezone: Tz,
}

impl ReservationRepository {
    pub fn new(pool: PgPool, timezone: Tz) -> Self {
        Self { pool, timezone }
    }

    /// Reservations matching `filter`, newest first, at most 3000.
    #[tracing::instrument(
        skip(self, filter),
        fields(
            db.table = "reservations",
            db.operation = "select",
            has_search = filter.search_term.is_some(),
            has_date = filter.create_at_date.is_some()
        )
    )]
    pub async fn list(&self, filter: &ReservationFilter) -> Result<Vec<Reservation>, AppError> {
        let composed = compose_reservations_query(filter, self.timezone);

        let mut query = sqlx::query_as::<Postgres, Reservation>(&composed.sql);
        for param in composed.params {
            query = match param {
                QueryParam::Tokens(tokens) => query.bind(tokens),
                QueryParam::Timestamp(ts) => query.bind(ts),
                QueryParam::Limit(limit) => query.bind(limit),
            };
        }

        let rows = query.fetch_all(&self.pool).await?;
        tracing::debug!(count = rows.len(), "Reservations fetched");
        Ok(rows)
    }

    #[tracing::instrument(skip(self, new), fields(db.table = "reservations", db.operation = "insert"))]
    pub async fn create(&self, new: NewReservation) -> Result<Reservation, AppError> {
        if new.status.trim().is_empty() {
            return Err(AppError::InvalidInput(
                "reservation status must not be empty".to_string(),
            ));
        }

        let search_index = build_search_index(
            new.code
                .as_deref()
                .into_iter()
                .chain(new.client_name.as_deref()),
        );
        let now = Utc::now();

        let row = sqlx::query_as::<Postgres, Reservation>(
            r#"
            INSERT INTO reservations
                (id, code, client_name, status, search_index, is_deleted, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, false, $6, $6)
            RETURNING id, code, client_name, status, search_index, is_deleted, created_at, updated_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(new.code)
        .bind(new.client_name)
        .bind(new.status)
        .bind(search_index)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }

    /// Flag a reservation as deleted. Returns `false` if it was missing or already deleted.
    #[tracing::instrument(skip(self), fields(db.table = "reservations", db.operation = "update"))]
    pub async fn soft_delete(&self, id: Uuid) -> Result<bool, AppError> {
        let rows_affected = sqlx::query(
            "UPDATE reservations SET is_deleted = true, updated_at = NOW() WHERE id = $1 AND is_deleted = false",
        )
        .bind(id)
        .execute(&self.pool)
        .await?
        .rows_affected();

        Ok(rows_affected > 0)
    }
}
