use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{Html, IntoResponse},
    Form, Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::agents::{TaskOutput, TimedEvent};
use crate::api::errors::ApiError;
use crate::api::state::AppState;
use crate::api::views::{self, Notice, DOWNLOAD_FILE_NAME};
use crate::domain::StartupIdea;

/// Form body posted by the idea form
#[derive(Debug, Deserialize)]
pub struct RoadmapForm {
    #[serde(default)]
    pub idea: String,
}

/// Form body posted by the download button
#[derive(Debug, Deserialize)]
pub struct DownloadForm {
    #[serde(default)]
    pub content: String,
}

/// Request body for the JSON endpoint
#[derive(Debug, Deserialize)]
pub struct RoadmapRequest {
    #[serde(default)]
    pub idea: String,
}

/// Response from a finished crew run
#[derive(Debug, Serialize)]
pub struct RoadmapResponse {
    pub crew_id: Uuid,
    pub idea: String,
    pub raw: String,
    pub tasks: Vec<TaskOutput>,
    pub events: Vec<TimedEvent>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

/// Show the idea form
///
/// GET /
pub async fn index() -> Html<String> {
    Html(views::form_page("", None))
}

/// Run the crew for the submitted idea and render the blueprint
///
/// POST /roadmap
pub async fn generate_roadmap_page(
    State(state): State<AppState>,
    Form(form): Form<RoadmapForm>,
) -> (StatusCode, Html<String>) {
    let idea = match StartupIdea::new(&form.idea) {
        Ok(idea) => idea,
        Err(e) => {
            tracing::debug!(error = %e, "Rejected idea");
            let notice = Notice::Warning(e.to_string());
            return (
                StatusCode::OK,
                Html(views::form_page(&form.idea, Some(&notice))),
            );
        }
    };

    match state.run_blueprint(&idea).await {
        Ok(output) => (
            StatusCode::OK,
            Html(views::result_page(idea.as_str(), &output)),
        ),
        Err(e) => {
            tracing::error!(error = %e, "Crew run failed");
            let status = ApiError::from(e).status;
            let notice = Notice::Error(format!(
                "The crew could not finish the blueprint (HTTP {}). Please try again in a minute.",
                status.as_u16()
            ));
            (status, Html(views::form_page(idea.as_str(), Some(&notice))))
        }
    }
}

/// Return the blueprint as a markdown file
///
/// Browsers submit textarea line breaks as CRLF; they are turned back into LF.
///
/// POST /roadmap/download
pub async fn download_plan(Form(form): Form<DownloadForm>) -> impl IntoResponse {
    let disposition = format!("attachment; filename=\"{}\"", DOWNLOAD_FILE_NAME);
    (
        [
            (header::CONTENT_TYPE, "text/markdown; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        form.content.replace("\r\n", "\n"),
    )
}

/// Run the crew and return the full result as JSON
///
/// POST /api/roadmap
pub async fn create_roadmap(
    State(state): State<AppState>,
    Json(req): Json<RoadmapRequest>,
) -> Result<Json<RoadmapResponse>, ApiError> {
    let idea = StartupIdea::new(&req.idea)?;

    let output = state.run_blueprint(&idea).await.map_err(|e| {
        tracing::error!(error = %e, "Crew run failed");
        ApiError::from(e)
    })?;

    Ok(Json(RoadmapResponse {
        crew_id: output.crew_id,
        idea: idea.to_string(),
        raw: output.raw,
        tasks: output.tasks_output,
        events: output.events,
        started_at: output.started_at,
        finished_at: output.finished_at,
    }))
}
