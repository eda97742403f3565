//! Axum route handler for the Analysis API.

use axum::extract::{Multipart, State};
use axum::Json;
use bytes::Bytes;
use tracing::{info, info_span, warn, Instrument};
use uuid::Uuid;

use crate::analysis::models::AnalysisResult;
use crate::analysis::pipeline::analyze;
use crate::errors::AppError;
use crate::state::AppState;

const JOB_DESCRIPTION_FIELD: &str = "job_description";
const RESUME_FIELD: &str = "resume";

struct AnalyzeUpload {
    job_description: String,
    resume: Bytes,
}

/// POST /api/v1/analyze
///
/// Multipart form: `job_description` (text) and `resume` (PDF file).
/// Rejected with 429 while the configured number of analyses is already running.
pub async fn handle_analyze(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<AnalysisResult>, AppError> {
    // Held until the response is produced, success or failure.
    let _permit = state.in_flight.try_acquire().map_err(|_| AppError::Busy)?;

    let upload = read_upload(&mut multipart).await?;

    let analysis_id = Uuid::new_v4();
    let span = info_span!("analysis", %analysis_id);
    info!(
        parent: &span,
        resume_bytes = upload.resume.len(),
        jd_chars = upload.job_description.len(),
        "Starting resume analysis"
    );

    let result = analyze(
        upload.resume,
        &upload.job_description,
        state.gateway.as_ref(),
    )
    .instrument(span.clone())
    .await
    .map_err(|e| {
        warn!(parent: &span, "Analysis failed: {e}");
        AppError::from(e)
    })?;

    info!(
        parent: &span,
        match_score = result.match_score(),
        missing_keywords = result.missing_keywords().len(),
        summary_chars = result.profile_summary().len(),
        "Analysis complete"
    );

    Ok(Json(result))
}

async fn read_upload(multipart: &mut Multipart) -> Result<AnalyzeUpload, AppError> {
    let mut job_description = None;
    let mut resume = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Invalid multipart body: {e}")))?
    {
        let name = field.name().map(str::to_owned);
        match name.as_deref() {
            Some(JOB_DESCRIPTION_FIELD) => {
                let text = field.text().await.map_err(|e| {
                    AppError::Validation(format!("Could not read job description: {e}"))
                })?;
                job_description = Some(text);
            }
            Some(RESUME_FIELD) => {
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::Validation(format!("Could not read resume: {e}")))?;
                resume = Some(bytes);
            }
            _ => {}
        }
    }

    let job_description = job_description
        .filter(|jd| !jd.trim().is_empty())
        .ok_or_else(|| AppError::Validation("Please provide a job description".to_string()))?;
    let resume = resume
        .filter(|bytes| !bytes.is_empty())
        .ok_or_else(|| {
            AppError::Validation("Please upload a resume in PDF format".to_string())
        })?;

    Ok(AnalyzeUpload {
        job_description,
        resume,
    })
}
