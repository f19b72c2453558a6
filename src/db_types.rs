use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::types::time::OffsetDateTime;
use tracing::warn;
use uuid::Uuid;

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Wedding {
    pub id: i32,
    pub name: String,
    pub is_active: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "rsvp_status", rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum RsvpStatus {
    Yes,
    No,
    Maybe,
}

impl RsvpStatus {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "YES" => Some(Self::Yes),
            "NO" => Some(Self::No),
            "MAYBE" => Some(Self::Maybe),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Yes => "YES",
            Self::No => "NO",
            Self::Maybe => "MAYBE",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "conversation_role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

/// One invited party, keyed by (wedding, phone number).  Created on first
/// contact; fields filled in piecemeal as the model extracts them.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Guest {
    pub id: Uuid,
    pub wedding_id: i32,
    pub phone_number: String,
    pub name: Option<String>,
    pub rsvp_status: Option<RsvpStatus>,
    pub guest_count: Option<i32>,
    pub transport_mode: Option<String>,
    pub arrival_date_time: Option<String>,
    pub dietary_restrictions: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339::option")]
    pub last_message_at: Option<OffsetDateTime>,
}

/// One stored message turn.  Append-only; (created_at, id) is the ordering.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Conversation {
    pub id: i64,
    pub guest_id: Uuid,
    pub role: Role,
    pub content: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

/// Partial update extracted from one `update_guest_info` call.  The model's
/// arguments are untrusted: fields that fail validation are logged and
/// dropped rather than failing the turn.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GuestUpdate {
    pub name: Option<String>,
    pub rsvp_status: Option<RsvpStatus>,
    pub guest_count: Option<i32>,
    pub transport_mode: Option<String>,
    pub arrival_date_time: Option<String>,
    pub dietary_restrictions: Option<String>,
}

impl GuestUpdate {
    pub fn from_args(args: &Value) -> Self {
        let mut update = GuestUpdate::default();
        let map = match args.as_object() {
            Some(map) => map,
            None => {
                warn!(args = %args, "extraction arguments are not a JSON object");
                return update;
            }
        };
        for (key, value) in map {
            match key.as_str() {
                "name" => update.name = string_field(key, value),
                "transportMode" => update.transport_mode = string_field(key, value),
                "arrivalDateTime" => update.arrival_date_time = string_field(key, value),
                "dietaryRestrictions" => update.dietary_restrictions = string_field(key, value),
                "rsvpStatus" => match value.as_str().and_then(RsvpStatus::parse) {
                    Some(status) => update.rsvp_status = Some(status),
                    None => warn!(value = %value, "ignoring invalid rsvpStatus from model"),
                },
                "guestCount" => {
                    match value
                        .as_i64()
                        .and_then(|n| i32::try_from(n).ok())
                        .filter(|n| *n >= 0)
                    {
                        Some(count) => update.guest_count = Some(count),
                        None => warn!(value = %value, "ignoring invalid guestCount from model"),
                    }
                }
                _ => warn!(field = %key, "ignoring unknown field from model"),
            }
        }
        update
    }

    /// Overlay `later` on top of `self`; fields `later` carries win.
    pub fn merge(&mut self, later: GuestUpdate) {
        if later.name.is_some() {
            self.name = later.name;
        }
        if later.rsvp_status.is_some() {
            self.rsvp_status = later.rsvp_status;
        }
        if later.guest_count.is_some() {
            self.guest_count = later.guest_count;
        }
        if later.transport_mode.is_some() {
            self.transport_mode = later.transport_mode;
        }
        if later.arrival_date_time.is_some() {
            self.arrival_date_time = later.arrival_date_time;
        }
        if later.dietary_restrictions.is_some() {
            self.dietary_restrictions = later.dietary_restrictions;
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == GuestUpdate::default()
    }
}

fn string_field(key: &str, value: &Value) -> Option<String> {
    match value.as_str() {
        Some(s) => Some(s.to_string()),
        None => {
            warn!(field = %key, value = %value, "ignoring non-string field from model");
            None
        }
    }
}
