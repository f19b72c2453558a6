use crate::db_types::{Conversation, Guest, GuestUpdate, Role, Wedding};
use crate::error::StoreError;

use async_trait::async_trait;
use serde::Serialize;
use sqlx::postgres::PgPoolOptions;
use sqlx::{PgPool, Pool, Postgres};
use std::collections::HashMap;
use uuid::Uuid;

/// A guest with some of its conversation history attached: the single latest
/// row for the list endpoint, the full chronological history for detail.
#[derive(Debug, Clone, Serialize)]
pub struct GuestWithConversations {
    #[serde(flatten)]
    pub guest: Guest,
    pub conversations: Vec<Conversation>,
}

/// Persistence seam for guests and their conversation log.  Implemented over
/// Postgres in production and over in-memory tables in tests.
#[async_trait]
pub trait GuestStore: Send + Sync {
    /// The first active wedding, if any is configured.
    async fn active_wedding(&self) -> Result<Option<Wedding>, StoreError>;

    /// Atomic resolve-or-create on (wedding, phone number).  Concurrent first
    /// contacts from the same number must yield one row.
    async fn find_or_create_guest(
        &self,
        wedding_id: i32,
        phone_number: &str,
    ) -> Result<Guest, StoreError>;

    /// The most recent `limit` rows for a guest, newest first.
    async fn recent_conversations(
        &self,
        guest_id: Uuid,
        limit: i64,
    ) -> Result<Vec<Conversation>, StoreError>;

    async fn append_conversation(
        &self,
        guest_id: Uuid,
        role: Role,
        content: &str,
    ) -> Result<Conversation, StoreError>;

    /// Partial update: only the fields `update` carries are written.
    async fn update_guest_fields(
        &self,
        guest_id: Uuid,
        update: &GuestUpdate,
    ) -> Result<(), StoreError>;

    async fn touch_last_message(&self, guest_id: Uuid) -> Result<(), StoreError>;

    /// All guests, each with at most its single latest conversation row.
    async fn list_guests(&self) -> Result<Vec<GuestWithConversations>, StoreError>;

    /// One guest with its full chronological history.
    async fn guest_detail(
        &self,
        guest_id: Uuid,
    ) -> Result<Option<GuestWithConversations>, StoreError>;
}

pub struct PgGuestStore {
    pool: Pool<Postgres>,
}

impl PgGuestStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Build the pool and run embedded migrations.
    pub async fn connect(database_url: &str) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .connect(database_url)
            .await?;
        sqlx::migrate!().run(&pool).await?;
        Ok(Self { pool })
    }
}

#[async_trait]
impl GuestStore for PgGuestStore {
    async fn active_wedding(&self) -> Result<Option<Wedding>, StoreError> {
        let wedding = sqlx::query_as::<_, Wedding>(
            "
            select *
            from weddings
            where is_active
            order by id
            limit 1
            ",
        )
        .fetch_optional(&self.pool)
        .await?;

        Ok(wedding)
    }

    async fn find_or_create_guest(
        &self,
        wedding_id: i32,
        phone_number: &str,
    ) -> Result<Guest, StoreError> {
        // Conditional upsert rather than find-then-create so two concurrent
        // first contacts cannot produce duplicate rows.
        sqlx::query(
            "
            insert into guests (id, wedding_id, phone_number)
            values ($1, $2, $3)
            on conflict (wedding_id, phone_number) do nothing
            ",
        )
        .bind(Uuid::new_v4())
        .bind(wedding_id)
        .bind(phone_number)
        .execute(&self.pool)
        .await?;

        let guest = sqlx::query_as::<_, Guest>(
            "
            select *
            from guests
            where wedding_id = $1
              and phone_number = $2
            ",
        )
        .bind(wedding_id)
        .bind(phone_number)
        .fetch_one(&self.pool)
        .await?;

        Ok(guest)
    }

    async fn recent_conversations(
        &self,
        guest_id: Uuid,
        limit: i64,
    ) -> Result<Vec<Conversation>, StoreError> {
        let rows = sqlx::query_as::<_, Conversation>(
            "
            select *
            from conversations
            where guest_id = $1
            order by created_at desc, id desc
            limit $2
            ",
        )
        .bind(guest_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    async fn append_conversation(
        &self,
        guest_id: Uuid,
        role: Role,
        content: &str,
    ) -> Result<Conversation, StoreError> {
        let row = sqlx::query_as::<_, Conversation>(
            "
            insert into conversations (guest_id, role, content)
            values ($1, $2, $3)
            returning *
            ",
        )
        .bind(guest_id)
        .bind(role)
        .bind(content)
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }

    async fn update_guest_fields(
        &self,
        guest_id: Uuid,
        update: &GuestUpdate,
    ) -> Result<(), StoreError> {
        if update.is_empty() {
            return Ok(());
        }
        sqlx::query(
            "
            update guests set
              name = coalesce($2, name),
              rsvp_status = coalesce($3, rsvp_status),
              guest_count = coalesce($4, guest_count),
              transport_mode = coalesce($5, transport_mode),
              arrival_date_time = coalesce($6, arrival_date_time),
              dietary_restrictions = coalesce($7, dietary_restrictions)
            where id = $1
            ",
        )
        .bind(guest_id)
        .bind(update.name.as_deref())
        .bind(update.rsvp_status)
        .bind(update.guest_count)
        .bind(update.transport_mode.as_deref())
        .bind(update.arrival_date_time.as_deref())
        .bind(update.dietary_restrictions.as_deref())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn touch_last_message(&self, guest_id: Uuid) -> Result<(), StoreError> {
        sqlx::query(
            "
            update guests
            set last_message_at = now()
            where id = $1
            ",
        )
        .bind(guest_id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn list_guests(&self) -> Result<Vec<GuestWithConversations>, StoreError> {
        let guests = sqlx::query_as::<_, Guest>(
            "
            select *
            from guests
            order by created_at
            ",
        )
        .fetch_all(&self.pool)
        .await?;

        let latest = sqlx::query_as::<_, Conversation>(
            "
            select distinct on (guest_id) *
            from conversations
            order by guest_id, created_at desc, id desc
            ",
        )
        .fetch_all(&self.pool)
        .await?;
        let mut latest_by_guest: HashMap<Uuid, Conversation> =
            latest.into_iter().map(|c| (c.guest_id, c)).collect();

        Ok(guests
            .into_iter()
            .map(|guest| {
                let conversations = latest_by_guest.remove(&guest.id).into_iter().collect();
                GuestWithConversations {
                    guest,
                    conversations,
                }
            })
            .collect())
    }

    async fn guest_detail(
        &self,
        guest_id: Uuid,
    ) -> Result<Option<GuestWithConversations>, StoreError> {
        let guest = sqlx::query_as::<_, Guest>(
            "
            select *
            from guests
            where id = $1
            ",
        )
        .bind(guest_id)
        .fetch_optional(&self.pool)
        .await?;
        let guest = match guest {
            Some(guest) => guest,
            None => return Ok(None),
        };

        let conversations = sqlx::query_as::<_, Conversation>(
            "
            select *
            from conversations
            where guest_id = $1
            order by created_at, id
            ",
        )
        .bind(guest_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(Some(GuestWithConversations {
            guest,
            conversations,
        }))
    }
}
