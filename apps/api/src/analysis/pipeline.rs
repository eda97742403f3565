//! Analysis pipeline — one request, strictly in sequence:
//! extract PDF text → build prompt → call model → parse reply.
//!
//! Nothing here retries or substitutes defaults; the first failure is returned as-is.

use std::time::Instant;

use bytes::Bytes;
use thiserror::Error;
use tracing::{debug, info};

use crate::analysis::models::AnalysisResult;
use crate::analysis::prompt_builder::{self, PromptError};
use crate::analysis::response_parser::{self, ParseError};
use crate::document::{self, ExtractError, ResumeText};
use crate::llm_client::{GatewayError, ModelGateway};

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error(transparent)]
    Document(#[from] ExtractError),

    #[error(transparent)]
    Prompt(#[from] PromptError),

    #[error(transparent)]
    Gateway(#[from] GatewayError),

    #[error(transparent)]
    Reply(#[from] ParseError),

    #[error("Document extraction task failed: {0}")]
    ExtractionTask(#[from] tokio::task::JoinError),
}

/// Full pipeline over an uploaded PDF.
pub async fn analyze(
    document: Bytes,
    job_description: &str,
    gateway: &dyn ModelGateway,
) -> Result<AnalysisResult, AnalysisError> {
    // PDF parsing is CPU-bound; keep it off the async workers.
    let resume = tokio::task::spawn_blocking(move || document::extract(&document)).await??;
    run_analysis(&resume, job_description, gateway).await
}

/// Prompt → model → parse, for resume text that has already been extracted.
pub async fn run_analysis(
    resume: &ResumeText,
    job_description: &str,
    gateway: &dyn ModelGateway,
) -> Result<AnalysisResult, AnalysisError> {
    let prompt = prompt_builder::build(resume.as_str(), job_description)?;
    debug!(prompt_chars = prompt.as_str().len(), "Prompt prepared");

    let started = Instant::now();
    let reply = gateway.generate(&prompt).await?;
    info!(
        latency_ms = started.elapsed().as_millis() as u64,
        reply_chars = reply.len(),
        "Model replied"
    );

    Ok(response_parser::parse(&reply)?)
}
