//! HTTP Handlers

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    Json,
};
use serde::{Deserialize, Serialize};

use bot_wizard::{
    deploy_bot, BotOptionVariant, BotRecord, ConfigPatch, ConfigurationDeriver, ConversationId,
    ConversationRecord, Step, StrategyKind, ValidationOutcome, VariantId,
    WizardError,
};
use chat_core::Message;
use rust_decimal::Decimal;

use crate::state::AppState;

type ApiError = (StatusCode, Json<ErrorResponse>);

const USER_HEADER: &str = "x-user-id";
const ANONYMOUS: &str = "anonymous";

// ============================================================================
// Request / Response Types
// ============================================================================

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub strategies: usize,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StrategyInfo {
    pub id: StrategyKind,
    pub display_name: String,
    pub description: String,
    pub min_capital: Decimal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatAction {
    Restart,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    #[serde(default)]
    pub conversation_id: Option<String>,
    #[serde(default)]
    pub message: String,
    /// Step the client believes it is on; the stored state wins
    #[serde(default)]
    pub current_step: Option<u8>,
    #[serde(default)]
    pub action: Option<ChatAction>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatResponse {
    pub conversation_id: ConversationId,
    pub message: Message,
    pub next_step: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub validation: Option<ValidationOutcome>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extracted_data: Option<ConfigPatch>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recommendations: Option<Vec<BotOptionVariant>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub highlighted_option: Option<VariantId>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBotRequest {
    pub conversation_id: String,
    pub option_id: String,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

fn api_error(status: StatusCode, code: &str, error: impl Into<String>) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            error: error.into(),
            code: code.into(),
        }),
    )
}

/// Map a wizard error onto a status code and a message safe to show
fn wizard_error(e: &WizardError) -> ApiError {
    let (status, code) = match e {
        WizardError::InvalidStep(_) => (StatusCode::BAD_REQUEST, "INVALID_STEP"),
        WizardError::UnknownOption(_) => (StatusCode::BAD_REQUEST, "UNKNOWN_OPTION"),
        WizardError::ConversationNotFound(_) => (StatusCode::NOT_FOUND, "CONVERSATION_NOT_FOUND"),
        WizardError::NotReadyToDeploy(_) => (StatusCode::CONFLICT, "NOT_READY"),
        WizardError::AlreadyCompleted(_) => (StatusCode::CONFLICT, "ALREADY_COMPLETED"),
        _ => (StatusCode::INTERNAL_SERVER_ERROR, "WIZARD_ERROR"),
    };
    if e.is_fatal() {
        tracing::error!(status = %status, "Fatal wizard error, not retrying: {}", e);
    } else if status.is_server_error() {
        tracing::error!("Wizard error: {}", e);
    } else {
        tracing::debug!("Rejected request: {}", e);
    }
    api_error(status, code, e.user_message())
}

fn user_id(headers: &HeaderMap) -> String {
    headers
        .get(USER_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .unwrap_or(ANONYMOUS)
        .to_string()
}

// ============================================================================
// Handlers
// ============================================================================

/// Health check endpoint
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        strategies: state.tables.strategies.iter().count(),
    })
}

/// Strategy catalog
pub async fn list_strategies(State(state): State<AppState>) -> Json<Vec<StrategyInfo>> {
    Json(
        state
            .tables
            .strategies
            .iter()
            .map(|d| StrategyInfo {
                id: d.kind(),
                display_name: d.display_name.clone(),
                description: d.description.clone(),
                min_capital: d.min_capital,
            })
            .collect(),
    )
}

/// One conversational turn
pub async fn chat_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, ApiError> {
    if let Some(step) = payload.current_step {
        Step::try_from(step).map_err(|e| wizard_error(&e))?;
    }
    let user_id = user_id(&headers);

    let id = payload
        .conversation_id
        .as_deref()
        .map_or_else(ConversationId::new, ConversationId::from_string);
    let _guard = state.lock_conversation(&id).await;

    let mut record = match (&payload.conversation_id, state.conversations.load(&id, &user_id)) {
        (_, Err(e)) => return Err(wizard_error(&e)),
        (_, Ok(Some(record))) => record,
        (None, Ok(None)) => {
            let mut record = ConversationRecord::with_id(id.clone(), user_id.clone());
            record.transcript.push(state.engine.start().to_message());
            record
        }
        (Some(_), Ok(None)) => {
            return Err(wizard_error(&WizardError::ConversationNotFound(id.to_string())));
        }
    };

    if record.completed {
        return Err(wizard_error(&WizardError::AlreadyCompleted(id.to_string())));
    }
    if let Some(step) = payload.current_step.filter(|s| *s != record.state.current_step) {
        tracing::warn!(
            conversation_id = %id,
            client_step = step,
            stored_step = record.state.current_step,
            "Client step out of sync; using stored state"
        );
    }

    let turn = if payload.action == Some(ChatAction::Restart) {
        state.engine.restart()
    } else {
        state
            .engine
            .advance(&record.state, &payload.message)
            .map_err(|e| wizard_error(&e))?
    };

    record.record_turn(&payload.message, &turn);
    state.conversations.save(&record).map_err(|e| wizard_error(&e))?;

    let highlighted_option = turn
        .recommendations
        .as_ref()
        .map(|_| ConfigurationDeriver::highlighted(&turn.state));

    Ok(Json(ChatResponse {
        conversation_id: id,
        message: turn.to_message(),
        next_step: turn.step.number(),
        extracted_data: (!turn.extracted.is_empty()).then(|| turn.extracted.clone()),
        validation: turn.validation,
        recommendations: turn.recommendations,
        highlighted_option,
    }))
}

/// Stored conversation for the calling user
pub async fn get_conversation(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<ConversationRecord>, ApiError> {
    let id = ConversationId::from_string(id);
    state
        .conversations
        .load(&id, &user_id(&headers))
        .map_err(|e| wizard_error(&e))?
        .map(Json)
        .ok_or_else(|| wizard_error(&WizardError::ConversationNotFound(id.to_string())))
}

/// Create a bot from one of the offered options
pub async fn create_bot(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<CreateBotRequest>,
) -> Result<(StatusCode, Json<BotRecord>), ApiError> {
    let option_id: VariantId = payload.option_id.parse().map_err(|e| wizard_error(&e))?;
    let id = ConversationId::from_string(payload.conversation_id);
    let _guard = state.lock_conversation(&id).await;

    let deriver = state.engine.deriver();
    let bot = deploy_bot(
        state.conversations.as_ref(),
        state.bots.as_ref(),
        deriver,
        &id,
        &user_id(&headers),
        option_id,
    )
    .map_err(|e| wizard_error(&e))?;

    Ok((StatusCode::CREATED, Json(bot)))
}

#[cfg(test)]
mod tests {
    use axum::{
        body::{to_bytes, Body},
        http::Request,
        Router,
    };
    use bot_wizard::WizardTables;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use crate::config::ServerConfig;

    use super::*;

    fn router() -> Router {
        crate::app(AppState::new(WizardTables::default()), &ServerConfig::default())
    }

    async fn send(
        app: &Router,
        method: &str,
        uri: &str,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let builder = Request::builder()
            .method(method)
            .uri(uri)
            .header(USER_HEADER, "alice");
        let request = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string())),
            None => builder.body(Body::empty()),
        }
        .unwrap();

        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    async fn chat(
        app: &Router,
        conversation_id: Option<&str>,
        message: &str,
    ) -> (StatusCode, Value) {
        let mut body = json!({ "message": message });
        if let Some(id) = conversation_id {
            body["conversationId"] = json!(id);
        }
        send(app, "POST", "/api/chat", Some(body)).await
    }

    #[test]
    fn test_fatal_errors_map_to_final_statuses() {
        let (status, Json(body)) = wizard_error(&WizardError::InvalidStep(0));
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body.code, "INVALID_STEP");

        let (status, Json(body)) =
            wizard_error(&WizardError::IncompleteConfiguration("capitalAllocated"));
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body.error, "An unexpected error occurred.");
    }

    #[tokio::test]
    async fn test_health() {
        let (status, body) = send(&router(), "GET", "/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["strategies"], 4);
    }

    #[tokio::test]
    async fn test_strategies_listed() {
        let (status, body) = send(&router(), "GET", "/api/strategies", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.as_array().map(Vec::len), Some(4));
    }

    #[tokio::test]
    async fn test_chat_creates_conversation_and_advances() {
        let app = router();
        let (status, body) = chat(&app, None, "Build wealth over time").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["nextStep"], 2);
        assert_eq!(body["message"]["role"], "assistant");

        let id = body["conversationId"].as_str().unwrap().to_string();
        let (status, body) = chat(&app, Some(&id), "$500 - $2,000").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["nextStep"], 3);

        let (status, stored) = send(&app, "GET", &format!("/api/conversations/{id}"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(stored["state"]["currentStep"], 3);
    }

    #[tokio::test]
    async fn test_full_flow_then_deploy() {
        let app = router();
        let (_, body) = chat(&app, None, "Build wealth over time").await;
        let id = body["conversationId"].as_str().unwrap().to_string();
        for reply in [
            "$500 - $2,000",
            "Very cautious - Protect my capital",
            "Yes, sounds good!",
        ] {
            let (status, _) = chat(&app, Some(&id), reply).await;
            assert_eq!(status, StatusCode::OK);
        }

        let (status, body) = chat(&app, Some(&id), "Deploy Bot!").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["recommendations"].as_array().map(Vec::len), Some(3));
        assert!(body["highlightedOption"].is_string());

        let request = json!({ "conversationId": id, "optionId": "balanced" });
        let (status, bot) = send(&app, "POST", "/api/bots", Some(request.clone())).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(bot["userId"], "alice");

        let (status, body) = send(&app, "POST", "/api/bots", Some(request)).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["code"], "ALREADY_COMPLETED");
    }

    #[tokio::test]
    async fn test_invalid_step_rejected() {
        let body = json!({ "message": "hi", "currentStep": 9 });
        let (status, body) = send(&router(), "POST", "/api/chat", Some(body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "INVALID_STEP");
    }

    #[tokio::test]
    async fn test_unknown_conversation_not_found() {
        let (status, body) = chat(&router(), Some("no-such-conversation"), "hello").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["code"], "CONVERSATION_NOT_FOUND");
    }

    #[tokio::test]
    async fn test_deploy_before_ready_conflicts() {
        let app = router();
        let (_, body) = chat(&app, None, "Build wealth over time").await;
        let id = body["conversationId"].as_str().unwrap();

        let request = json!({ "conversationId": id, "optionId": "balanced" });
        let (status, body) = send(&app, "POST", "/api/bots", Some(request)).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["code"], "NOT_READY");
    }

    #[tokio::test]
    async fn test_unknown_option_rejected() {
        let request = json!({ "conversationId": "x", "optionId": "yolo" });
        let (status, body) = send(&router(), "POST", "/api/bots", Some(request)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "UNKNOWN_OPTION");
    }

    #[tokio::test]
    async fn test_restart_action_resets_state() {
        let app = router();
        let (_, body) = chat(&app, None, "Build wealth over time").await;
        let id = body["conversationId"].as_str().unwrap().to_string();

        let body = json!({ "conversationId": id, "message": "", "action": "restart" });
        let (status, body) = send(&app, "POST", "/api/chat", Some(body)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["nextStep"], 1);
    }
}
