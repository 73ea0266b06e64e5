use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use super::sessions::{Session, SessionInfo, SessionRegistry};
use crate::bloom::{self, VerbCheck};
use crate::models::ScalarLevel;
use crate::service::{DisplayEntry, ServiceResult, SUGGESTION_COUNT};

// ============================================================
// Request / Response types
// ============================================================

/// Result of a mutating call, suitable for direct display.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Outcome {
    pub success: bool,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddEntryInput {
    /// Leave blank to take the next number when `auto_number` is set.
    #[serde(default)]
    pub serial: String,
    pub text: String,
    #[serde(default = "default_true")]
    pub auto_number: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateEntryInput {
    pub new_serial: Option<String>,
    pub new_text: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReorderInput {
    pub serials: Vec<String>,
    #[serde(default = "default_true")]
    pub auto_renumber: bool,
}

#[derive(Debug, Deserialize)]
pub struct RenumberQuery {
    pub auto_renumber: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct VerbsQuery {
    pub limit: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckInput {
    pub text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NextSerial {
    pub serial: String,
}

fn default_true() -> bool {
    true
}

// ============================================================
// Helpers
// ============================================================

type ApiError = (StatusCode, String);
type OutcomeResponse = Result<(StatusCode, Json<Outcome>), ApiError>;

/// Validation failures are expected and go back to the author with 422.
fn to_outcome(result: ServiceResult) -> (StatusCode, Json<Outcome>) {
    match result {
        Ok(message) => (
            StatusCode::OK,
            Json(Outcome {
                success: true,
                message,
            }),
        ),
        Err(e) => {
            tracing::warn!("Scalar operation refused: {}", e);
            (
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(Outcome {
                    success: false,
                    message: e.to_string(),
                }),
            )
        }
    }
}

fn in_session<R>(
    sessions: &SessionRegistry,
    id: Uuid,
    f: impl FnOnce(&mut Session) -> R,
) -> Result<R, ApiError> {
    sessions
        .with_session(id, f)
        .ok_or((StatusCode::NOT_FOUND, "Session not found".to_string()))
}

// ============================================================
// Health
// ============================================================

pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

// ============================================================
// Sessions
// ============================================================

pub async fn create_session(
    State(sessions): State<SessionRegistry>,
) -> (StatusCode, Json<SessionInfo>) {
    (StatusCode::CREATED, Json(sessions.create()))
}

pub async fn get_session(
    State(sessions): State<SessionRegistry>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionInfo>, ApiError> {
    in_session(&sessions, id, |session| Json(session.info()))
}

pub async fn delete_session(
    State(sessions): State<SessionRegistry>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    if sessions.remove(id) {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err((StatusCode::NOT_FOUND, "Session not found".to_string()))
    }
}

// ============================================================
// Entries
// ============================================================

pub async fn list_entries(
    State(sessions): State<SessionRegistry>,
    Path((id, level)): Path<(Uuid, ScalarLevel)>,
) -> Result<Json<Vec<DisplayEntry>>, ApiError> {
    in_session(&sessions, id, |session| {
        Json(session.service.get_entries_for_display(level))
    })
}

pub async fn add_entry(
    State(sessions): State<SessionRegistry>,
    Path((id, level)): Path<(Uuid, ScalarLevel)>,
    Json(input): Json<AddEntryInput>,
) -> OutcomeResponse {
    in_session(&sessions, id, |session| {
        to_outcome(
            session
                .service
                .add_entry(level, &input.serial, &input.text, input.auto_number),
        )
    })
}

pub async fn update_entry(
    State(sessions): State<SessionRegistry>,
    Path((id, level, serial)): Path<(Uuid, ScalarLevel, String)>,
    Json(input): Json<UpdateEntryInput>,
) -> OutcomeResponse {
    in_session(&sessions, id, |session| {
        to_outcome(session.service.update_entry(
            level,
            &serial,
            input.new_serial.as_deref(),
            input.new_text.as_deref(),
        ))
    })
}

pub async fn delete_entry(
    State(sessions): State<SessionRegistry>,
    Path((id, level, serial)): Path<(Uuid, ScalarLevel, String)>,
    Query(query): Query<RenumberQuery>,
) -> OutcomeResponse {
    let auto_renumber = query.auto_renumber.unwrap_or(true);
    in_session(&sessions, id, |session| {
        to_outcome(session.service.delete_entry(level, &serial, auto_renumber))
    })
}

pub async fn move_up(
    State(sessions): State<SessionRegistry>,
    Path((id, level, serial)): Path<(Uuid, ScalarLevel, String)>,
) -> OutcomeResponse {
    in_session(&sessions, id, |session| {
        to_outcome(session.service.move_up(level, &serial))
    })
}

pub async fn move_down(
    State(sessions): State<SessionRegistry>,
    Path((id, level, serial)): Path<(Uuid, ScalarLevel, String)>,
) -> OutcomeResponse {
    in_session(&sessions, id, |session| {
        to_outcome(session.service.move_down(level, &serial))
    })
}

pub async fn reorder_entries(
    State(sessions): State<SessionRegistry>,
    Path((id, level)): Path<(Uuid, ScalarLevel)>,
    Json(input): Json<ReorderInput>,
) -> OutcomeResponse {
    in_session(&sessions, id, |session| {
        to_outcome(
            session
                .service
                .reorder_entries(level, &input.serials, input.auto_renumber),
        )
    })
}

pub async fn next_serial(
    State(sessions): State<SessionRegistry>,
    Path((id, level)): Path<(Uuid, ScalarLevel)>,
) -> Result<Json<NextSerial>, ApiError> {
    in_session(&sessions, id, |session| {
        Json(NextSerial {
            serial: session.service.get_next_serial(level),
        })
    })
}

pub async fn clear_level(
    State(sessions): State<SessionRegistry>,
    Path((id, level)): Path<(Uuid, ScalarLevel)>,
) -> OutcomeResponse {
    in_session(&sessions, id, |session| {
        to_outcome(Ok(session.service.clear_level(level)))
    })
}

// ============================================================
// Validation & warnings
// ============================================================

pub async fn validate_clos(
    State(sessions): State<SessionRegistry>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<String>>, ApiError> {
    in_session(&sessions, id, |session| {
        Json(session.service.validate_all_clos())
    })
}

pub async fn list_warnings(
    State(sessions): State<SessionRegistry>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<String>>, ApiError> {
    in_session(&sessions, id, |session| {
        Json(session.service.warnings().to_vec())
    })
}

pub async fn clear_warnings(
    State(sessions): State<SessionRegistry>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    in_session(&sessions, id, |session| {
        session.service.clear_warnings();
        StatusCode::NO_CONTENT
    })
}

// ============================================================
// Import / Save / Load / Clear
// ============================================================

pub async fn import_workbook(
    State(sessions): State<SessionRegistry>,
    Path(id): Path<Uuid>,
    body: Bytes,
) -> OutcomeResponse {
    in_session(&sessions, id, |session| {
        if body.is_empty() {
            return (
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(Outcome {
                    success: false,
                    message: "No file uploaded".to_string(),
                }),
            );
        }
        to_outcome(session.service.import_and_install(&body))
    })
}

pub async fn save_scalar(
    State(sessions): State<SessionRegistry>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<Value>>, ApiError> {
    in_session(&sessions, id, |session| {
        session.last_saved_at = Some(Utc::now());
        Json(session.service.save())
    })
}

pub async fn load_scalar(
    State(sessions): State<SessionRegistry>,
    Path(id): Path<Uuid>,
    Json(data): Json<Vec<Value>>,
) -> OutcomeResponse {
    in_session(&sessions, id, |session| {
        session.service.load(&data);
        to_outcome(Ok(format!(
            "Loaded {} entries",
            session.service.collection().len()
        )))
    })
}

pub async fn clear_scalar(
    State(sessions): State<SessionRegistry>,
    Path(id): Path<Uuid>,
) -> OutcomeResponse {
    in_session(&sessions, id, |session| {
        session.service.clear();
        to_outcome(Ok("Cleared scalar".to_string()))
    })
}

// ============================================================
// Bloom's verbs
// ============================================================

pub async fn list_verbs(Query(query): Query<VerbsQuery>) -> Json<Vec<&'static str>> {
    Json(bloom::suggestions(query.limit.unwrap_or(SUGGESTION_COUNT)))
}

pub async fn check_text(Json(input): Json<CheckInput>) -> Json<VerbCheck> {
    Json(bloom::check_verb(&input.text))
}
