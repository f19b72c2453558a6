use crate::consts::UPDATE_GUEST_INFO;
use crate::error::AppError;
use crate::openai_types::{
    OpenAIBatchResponse, OpenAIFunctionDef, OpenAIMessage, OpenAIPayload, OpenAITool,
};

use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::{debug, error, warn};

const OPENAI_CHAT_URL: &str = "https://api.openai.com/v1/chat/completions";
const CHAT_MODEL: &str = "gpt-4o-mini";

/// One extraction call issued by the model, with its arguments decoded from
/// the wire but not yet validated.
#[derive(Debug, Clone)]
pub struct ExtractionCall {
    pub name: String,
    pub arguments: Value,
}

/// What the model produced for one turn: free text, extraction calls, or both.
#[derive(Debug, Clone, Default)]
pub struct ChatOutcome {
    pub text: Option<String>,
    pub tool_calls: Vec<ExtractionCall>,
}

/// Seam for the hosted completion API so the webhook turn can be exercised
/// with a scripted double.
#[async_trait]
pub trait LlmClient: Send + Sync {
    async fn chat(
        &self,
        system: String,
        history: Vec<OpenAIMessage>,
    ) -> Result<ChatOutcome, AppError>;
}

pub struct OpenAiClient {
    api_key: String,
    http_client: reqwest::Client,
}

impl OpenAiClient {
    pub fn new(api_key: String, http_client: reqwest::Client) -> Self {
        Self {
            api_key,
            http_client,
        }
    }
}

/// The single function declared to the model; its parameters mirror the
/// guest's mutable fields.
fn update_guest_info_tool() -> OpenAITool {
    OpenAITool {
        kind: "function".to_string(),
        function: OpenAIFunctionDef {
            name: UPDATE_GUEST_INFO.to_string(),
            description: "Update guest information in the database".to_string(),
            parameters: json!({
                "type": "object",
                "properties": {
                    "name": { "type": "string", "description": "Guest's full name" },
                    "rsvpStatus": { "type": "string", "enum": ["YES", "NO", "MAYBE"], "description": "RSVP status" },
                    "guestCount": { "type": "number", "description": "Total number of guests" },
                    "transportMode": { "type": "string", "description": "How they're arriving" },
                    "arrivalDateTime": { "type": "string", "description": "When they're arriving" },
                    "dietaryRestrictions": { "type": "string", "description": "Any dietary needs" }
                }
            }),
        },
    }
}

#[async_trait]
impl LlmClient for OpenAiClient {
    async fn chat(
        &self,
        system: String,
        history: Vec<OpenAIMessage>,
    ) -> Result<ChatOutcome, AppError> {
        let mut messages = vec![OpenAIMessage {
            role: "system".to_string(),
            content: system,
        }];
        messages.extend(history);
        let payload = OpenAIPayload {
            model: CHAT_MODEL.to_string(),
            messages,
            temperature: Some(0.7),
            max_tokens: Some(300),
            tools: vec![update_guest_info_tool()],
            tool_choice: Some("auto".to_string()),
        };

        let key = self.api_key.as_str();
        let resp = self
            .http_client
            .post(OPENAI_CHAT_URL)
            .header(reqwest::header::AUTHORIZATION, format!("Bearer {key}"))
            .json(&payload)
            .send()
            .await
            .map_err(|e| {
                error!(error=%e, "failed to send request to OpenAI");
                AppError("Failed to send request to OpenAI")
            })?;
        let resp = resp.json::<OpenAIBatchResponse>().await.map_err(|e| {
            error!(error=%e, "failed to deserialize openai chat response");
            AppError("deserialize")
        })?;
        let choice = resp.choices.into_iter().next().ok_or_else(|| {
            error!("openai response contained no choices");
            AppError("empty openai response")
        })?;
        debug!(message = ?choice.message, "got openai message");

        let mut tool_calls = Vec::with_capacity(choice.message.tool_calls.len());
        for call in choice.message.tool_calls {
            if call.kind != "function" {
                warn!(kind = %call.kind, "skipping non-function tool call");
                continue;
            }
            let arguments =
                serde_json::from_str::<Value>(&call.function.arguments).map_err(|e| {
                    error!(error=%e, name=%call.function.name, "failed to parse tool call arguments");
                    AppError("Error parsing tool call arguments")
                })?;
            tool_calls.push(ExtractionCall {
                name: call.function.name,
                arguments,
            });
        }

        Ok(ChatOutcome {
            text: choice.message.content,
            tool_calls,
        })
    }
}
