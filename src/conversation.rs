use crate::consts::{
    FALLBACK_CONFIRMATION, HISTORY_WINDOW, NOT_CONFIGURED_REPLY, UPDATE_GUEST_INFO, WEDDING_CONTEXT,
};
use crate::db_types::{Conversation, Guest, GuestUpdate, Role};
use crate::error::AppError;
use crate::llm::{ChatOutcome, LlmClient};
use crate::openai_types::OpenAIMessage;
use crate::store::GuestStore;

use tracing::{debug, error, info, warn};

/// Strip the messaging channel prefix from a Twilio sender identifier to get
/// the bare phone number.
pub fn normalize_phone(from: &str) -> &str {
    from.strip_prefix("whatsapp:").unwrap_or(from)
}

/// Snapshot of the guest's currently known fields, appended to the fixed
/// system prompt so the model doesn't re-ask for what it already has.
fn guest_context(guest: &Guest) -> String {
    let name = guest.name.as_deref().unwrap_or("Not provided yet");
    let rsvp = guest
        .rsvp_status
        .map(|s| s.as_str())
        .unwrap_or("Not confirmed");
    let count = guest
        .guest_count
        .map(|c| c.to_string())
        .unwrap_or_else(|| "Not specified".to_string());
    format!(
        "\n\nCURRENT GUEST INFO:\nPhone: {}\nName: {}\nRSVP: {}\nGuest Count: {}\n",
        guest.phone_number, name, rsvp, count
    )
}

/// Stored rows come back newest-first; the model wants chronological order
/// with the new inbound message as the final entry.
fn chronological_history(mut recent: Vec<Conversation>, inbound: &str) -> Vec<OpenAIMessage> {
    recent.reverse();
    let mut history: Vec<OpenAIMessage> = recent
        .into_iter()
        .map(|row| OpenAIMessage {
            role: row.role.as_str().to_string(),
            content: row.content,
        })
        .collect();
    history.push(OpenAIMessage {
        role: "user".to_string(),
        content: inbound.to_string(),
    });
    history
}

/// Collapse the model's extraction calls into one partial update.  Calls are
/// applied in the order the model issued them, so the last call wins on any
/// field both carry.
fn collect_updates(outcome: &ChatOutcome) -> GuestUpdate {
    let mut update = GuestUpdate::default();
    for call in &outcome.tool_calls {
        if call.name != UPDATE_GUEST_INFO {
            warn!(name = %call.name, "model called an undeclared function");
            continue;
        }
        update.merge(GuestUpdate::from_args(&call.arguments));
    }
    update
}

/// One webhook turn: resolve the guest, run the model over the recent
/// history, apply any extracted fields, persist both sides of the exchange,
/// and produce the reply text.
pub async fn handle_message(
    store: &dyn GuestStore,
    llm: &dyn LlmClient,
    from: &str,
    body: &str,
) -> Result<String, AppError> {
    let phone_number = normalize_phone(from);
    info!(phone = %phone_number, body = %body, "received message");

    let wedding = store.active_wedding().await.map_err(|e| {
        error!(error=%e, "failed to resolve active wedding");
        AppError("db error")
    })?;
    let wedding = match wedding {
        Some(wedding) => wedding,
        // Configuration error, not a failure: reply and persist nothing.
        None => return Ok(NOT_CONFIGURED_REPLY.to_string()),
    };

    let guest = store
        .find_or_create_guest(wedding.id, phone_number)
        .await
        .map_err(|e| {
            error!(error=%e, "failed to resolve guest");
            AppError("db error")
        })?;

    let recent = store
        .recent_conversations(guest.id, HISTORY_WINDOW)
        .await
        .map_err(|e| {
            error!(error=%e, "failed to load conversation history");
            AppError("db error")
        })?;
    let history = chronological_history(recent, body);
    let system = format!("{WEDDING_CONTEXT}{}", guest_context(&guest));
    debug!(turns = history.len(), "sending conversation to openai");

    let outcome = llm.chat(system, history).await?;

    let update = collect_updates(&outcome);
    if !update.is_empty() {
        info!(update = ?update, "applying extracted guest info");
        store
            .update_guest_fields(guest.id, &update)
            .await
            .map_err(|e| {
                error!(error=%e, "failed to update guest fields");
                AppError("db error")
            })?;
    }

    store
        .append_conversation(guest.id, Role::User, body)
        .await
        .map_err(|e| {
            error!(error=%e, "failed to persist user turn");
            AppError("db error")
        })?;

    // A reply is always persisted, even when the model answered with a
    // function call and no text.
    let reply = outcome
        .text
        .as_deref()
        .filter(|text| !text.is_empty())
        .unwrap_or(FALLBACK_CONFIRMATION)
        .to_string();
    store
        .append_conversation(guest.id, Role::Assistant, &reply)
        .await
        .map_err(|e| {
            error!(error=%e, "failed to persist assistant turn");
            AppError("db error")
        })?;

    store.touch_last_message(guest.id).await.map_err(|e| {
        error!(error=%e, "failed to update last message time");
        AppError("db error")
    })?;

    Ok(reply)
}
