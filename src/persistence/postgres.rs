//! PostgreSQL implementation of the persistence layer.

use std::time::Duration;

use async_trait::async_trait;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use uuid::Uuid;

use super::models::{AppointmentRow, RoomRow};
use super::{AppointmentStore, RoomCatalog, StoreError};
use crate::config::GatewayConfig;
use crate::domain::{
    Appointment, AppointmentId, NewAppointment, NewRoom, Room, RoomFilter, RoomId, RoomPatch,
    StatusPatch, UserId,
};

const APPOINTMENT_COLUMNS: &str = "id, room_id, room_title, room_image, tenant_id, host_id, \
     booking_type, status, deposit_status, start_date, end_date, deposit_amount, tenant_info, \
     bill_image, note, created_at, updated_at";

const ROOM_COLUMNS: &str = "id, host_id, title, image, price, address, room_type, area, \
     max_people, amenities, description, available, created_at, updated_at";

fn backend(e: sqlx::Error) -> StoreError {
    StoreError::Backend(e.to_string())
}

/// Substring pattern for `ILIKE ... ESCAPE '\'`, with the term's own
/// wildcards matched literally.
fn like_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for c in term.chars() {
        if matches!(c, '\\' | '%' | '_') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

fn to_i64(value: u64, field: &str) -> Result<i64, StoreError> {
    i64::try_from(value).map_err(|_| StoreError::Backend(format!("{field} out of range: {value}")))
}

/// PostgreSQL-backed persistence layer using `sqlx::PgPool`.
#[derive(Debug, Clone)]
pub struct PostgresPersistence {
    pool: PgPool,
}

impl PostgresPersistence {
    /// Creates a new persistence layer with the given connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Opens a connection pool sized from `config` and runs migrations.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Backend`] if the database is unreachable or a
    /// migration fails.
    pub async fn connect(config: &GatewayConfig) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(config.database_max_connections)
            .min_connections(config.database_min_connections)
            .acquire_timeout(Duration::from_secs(config.database_connect_timeout_secs))
            .connect(&config.database_url)
            .await
            .map_err(backend)?;
        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))?;
        tracing::info!("database migrations applied");
        Ok(Self::new(pool))
    }

    async fn fetch_room(&self, id: RoomId) -> Result<Room, StoreError> {
        let row = sqlx::query_as::<_, RoomRow>(&format!(
            "SELECT {ROOM_COLUMNS} FROM rooms WHERE id = $1"
        ))
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(backend)?
        .ok_or_else(|| StoreError::NotFound {
            kind: "room",
            id: id.to_string(),
        })?;
        Room::try_from(row)
    }
}

#[async_trait]
impl AppointmentStore for PostgresPersistence {
    async fn insert(&self, new: NewAppointment) -> Result<Appointment, StoreError> {
        let tenant_info = serde_json::to_value(&new.tenant_info)
            .map_err(|e| StoreError::Backend(e.to_string()))?;
        let deposit_amount = new
            .deposit_amount
            .map(|v| to_i64(v, "deposit_amount"))
            .transpose()?;

        let row = sqlx::query_as::<_, AppointmentRow>(&format!(
            "INSERT INTO appointments (id, room_id, room_title, room_image, tenant_id, host_id, \
             booking_type, status, deposit_status, start_date, end_date, deposit_amount, tenant_info) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, 'pending', 'unpaid', $8, $9, $10, $11) \
             RETURNING {APPOINTMENT_COLUMNS}"
        ))
        .bind(Uuid::new_v4())
        .bind(new.room_id.as_uuid())
        .bind(&new.room_title)
        .bind(&new.room_image)
        .bind(new.tenant_id.as_str())
        .bind(new.host_id.as_str())
        .bind(new.booking_type.as_str())
        .bind(&new.start_date)
        .bind(&new.end_date)
        .bind(deposit_amount)
        .bind(&tenant_info)
        .fetch_one(&self.pool)
        .await
        .map_err(backend)?;

        Appointment::try_from(row)
    }

    async fn get(&self, id: AppointmentId) -> Result<Appointment, StoreError> {
        let row = sqlx::query_as::<_, AppointmentRow>(&format!(
            "SELECT {APPOINTMENT_COLUMNS} FROM appointments WHERE id = $1"
        ))
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(backend)?
        .ok_or_else(|| StoreError::NotFound {
            kind: "appointment",
            id: id.to_string(),
        })?;
        Appointment::try_from(row)
    }

    async fn update_status(
        &self,
        id: AppointmentId,
        patch: &StatusPatch,
    ) -> Result<Appointment, StoreError> {
        let updated = sqlx::query_as::<_, AppointmentRow>(&format!(
            "UPDATE appointments SET status = $3, \
             deposit_status = COALESCE($4, deposit_status), \
             bill_image = COALESCE($5, bill_image), \
             note = COALESCE($6, note), \
             updated_at = now() \
             WHERE id = $1 AND status = $2 \
             RETURNING {APPOINTMENT_COLUMNS}"
        ))
        .bind(id.as_uuid())
        .bind(patch.from.as_str())
        .bind(patch.to.as_str())
        .bind(patch.deposit_status.map(|d| d.as_str()))
        .bind(&patch.bill_image)
        .bind(&patch.note)
        .fetch_optional(&self.pool)
        .await
        .map_err(backend)?;

        if let Some(row) = updated {
            return Appointment::try_from(row);
        }

        // Guard failed: distinguish a missing row from a concurrent change.
        let current = sqlx::query_scalar::<_, String>("SELECT status FROM appointments WHERE id = $1")
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(backend)?;
        match current {
            None => Err(StoreError::NotFound {
                kind: "appointment",
                id: id.to_string(),
            }),
            Some(status) => Err(StoreError::StatusConflict {
                expected: patch.from,
                actual: status
                    .parse()
                    .map_err(|e: String| StoreError::Backend(e))?,
            }),
        }
    }

    async fn list_by_participant(&self, user: &UserId) -> Result<Vec<Appointment>, StoreError> {
        let rows = sqlx::query_as::<_, AppointmentRow>(&format!(
            "SELECT {APPOINTMENT_COLUMNS} FROM appointments \
             WHERE tenant_id = $1 OR host_id = $1 ORDER BY created_at DESC"
        ))
        .bind(user.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(backend)?;

        rows.into_iter().map(Appointment::try_from).collect()
    }
}

#[async_trait]
impl RoomCatalog for PostgresPersistence {
    async fn get(&self, id: RoomId) -> Result<Room, StoreError> {
        self.fetch_room(id).await
    }

    async fn list(&self, filter: &RoomFilter) -> Result<Vec<Room>, StoreError> {
        let search = filter
            .search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(like_pattern);
        let max_price = filter
            .max_price
            .map(|p| to_i64(p, "max_price"))
            .transpose()?;

        let rows = sqlx::query_as::<_, RoomRow>(&format!(
            "SELECT {ROOM_COLUMNS} FROM rooms \
             WHERE ($1::text IS NULL OR title ILIKE $1 ESCAPE '\\' \
                    OR address ILIKE $1 ESCAPE '\\') \
             AND ($2::text IS NULL OR room_type = $2) \
             AND ($3::bigint IS NULL OR price <= $3) \
             AND ($4::text IS NULL OR host_id = $4) \
             ORDER BY created_at DESC"
        ))
        .bind(search)
        .bind(filter.room_type.map(|t| t.as_str()))
        .bind(max_price)
        .bind(filter.host_id.as_ref().map(UserId::as_str))
        .fetch_all(&self.pool)
        .await
        .map_err(backend)?;

        rows.into_iter().map(Room::try_from).collect()
    }

    async fn insert(&self, host_id: &UserId, new: NewRoom) -> Result<Room, StoreError> {
        let amenities =
            serde_json::to_value(&new.amenities).map_err(|e| StoreError::Backend(e.to_string()))?;
        let max_people = new
            .max_people
            .map(|m| i32::try_from(m).map_err(|e| StoreError::Backend(e.to_string())))
            .transpose()?;

        let row = sqlx::query_as::<_, RoomRow>(&format!(
            "INSERT INTO rooms (id, host_id, title, image, price, address, room_type, area, \
             max_people, amenities, description, available) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, TRUE) \
             RETURNING {ROOM_COLUMNS}"
        ))
        .bind(Uuid::new_v4())
        .bind(host_id.as_str())
        .bind(&new.title)
        .bind(&new.image)
        .bind(to_i64(new.price, "price")?)
        .bind(&new.address)
        .bind(new.room_type.as_str())
        .bind(new.area)
        .bind(max_people)
        .bind(&amenities)
        .bind(&new.description)
        .fetch_one(&self.pool)
        .await
        .map_err(backend)?;

        Room::try_from(row)
    }

    async fn update(&self, id: RoomId, patch: RoomPatch) -> Result<Room, StoreError> {
        let mut tx = self.pool.begin().await.map_err(backend)?;

        let row = sqlx::query_as::<_, RoomRow>(&format!(
            "SELECT {ROOM_COLUMNS} FROM rooms WHERE id = $1 FOR UPDATE"
        ))
        .bind(id.as_uuid())
        .fetch_optional(&mut *tx)
        .await
        .map_err(backend)?
        .ok_or_else(|| StoreError::NotFound {
            kind: "room",
            id: id.to_string(),
        })?;
        let mut room = Room::try_from(row)?;
        patch.apply(&mut room, chrono::Utc::now());

        let amenities =
            serde_json::to_value(&room.amenities).map_err(|e| StoreError::Backend(e.to_string()))?;
        let max_people = room
            .max_people
            .map(|m| i32::try_from(m).map_err(|e| StoreError::Backend(e.to_string())))
            .transpose()?;

        sqlx::query(
            "UPDATE rooms SET title = $2, image = $3, price = $4, address = $5, room_type = $6, \
             area = $7, max_people = $8, amenities = $9, description = $10, available = $11, \
             updated_at = $12 WHERE id = $1",
        )
        .bind(id.as_uuid())
        .bind(&room.title)
        .bind(&room.image)
        .bind(to_i64(room.price, "price")?)
        .bind(&room.address)
        .bind(room.room_type.as_str())
        .bind(room.area)
        .bind(max_people)
        .bind(&amenities)
        .bind(&room.description)
        .bind(room.available)
        .bind(room.updated_at)
        .execute(&mut *tx)
        .await
        .map_err(backend)?;

        tx.commit().await.map_err(backend)?;
        Ok(room)
    }

    async fn delete(&self, id: RoomId) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM rooms WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(backend)?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound {
                kind: "room",
                id: id.to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn search_wildcards_match_literally() {
        assert_eq!(like_pattern("quan 7"), "%quan 7%");
        assert_eq!(like_pattern("100%"), "%100\\%%");
        assert_eq!(like_pattern("p_1"), "%p\\_1%");
        assert_eq!(like_pattern("a\\b"), "%a\\\\b%");
    }

    #[test]
    fn oversized_price_is_rejected() {
        assert!(to_i64(u64::MAX, "price").is_err());
        assert!(matches!(to_i64(3_500_000, "price"), Ok(3_500_000)));
    }
}
