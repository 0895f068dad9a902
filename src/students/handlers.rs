use axum::{extract::State, routing::post, Json, Router};
use tracing::{info, instrument};

use super::{
    dto::{StudentRequest, SummaryResponse},
    services,
};
use crate::{
    auth::AuthUser,
    error::{ApiError, ApiResult},
    extract::AppJson,
    state::AppState,
};

pub fn summary_routes() -> Router<AppState> {
    Router::new().route("/students/summary", post(student_summary))
}

#[instrument(skip(state, student), fields(student = %student.name))]
pub async fn student_summary(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    AppJson(student): AppJson<StudentRequest>,
) -> ApiResult<Json<SummaryResponse>> {
    let summary = services::summarize(state.summarizer.as_ref(), &student)
        .await
        .map_err(|e| ApiError::Summarizer(format!("{e:#}")))?;
    info!(%user, "student summary generated");
    Ok(Json(SummaryResponse { summary }))
}
