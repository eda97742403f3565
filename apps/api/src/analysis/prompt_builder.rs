//! Prompt Builder — embeds resume and job description text into the ATS evaluation template.

use thiserror::Error;

use crate::analysis::prompts::{
    ATS_MATCH_PROMPT_TEMPLATE, JOB_DESCRIPTION_PLACEHOLDER, RESUME_PLACEHOLDER,
};

#[derive(Debug, Error)]
pub enum PromptError {
    #[error("{field} cannot be empty")]
    InvalidInput { field: &'static str },
}

/// The single instruction string sent to the model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt(String);

impl Prompt {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Builds the evaluation prompt. Both inputs are trimmed before embedding.
///
/// Deterministic: identical trimmed inputs always yield byte-identical prompts.
pub fn build(resume_text: &str, job_description: &str) -> Result<Prompt, PromptError> {
    let resume_text = resume_text.trim();
    let job_description = job_description.trim();

    if resume_text.is_empty() {
        return Err(PromptError::InvalidInput {
            field: "resume text",
        });
    }
    if job_description.is_empty() {
        return Err(PromptError::InvalidInput {
            field: "job description",
        });
    }

    Ok(Prompt(fill_template(
        ATS_MATCH_PROMPT_TEMPLATE,
        &[
            (RESUME_PLACEHOLDER, resume_text),
            (JOB_DESCRIPTION_PLACEHOLDER, job_description),
        ],
    )))
}

/// Single left-to-right pass, so placeholder-like text inside a substituted value stays verbatim.
fn fill_template(template: &str, substitutions: &[(&str, &str)]) -> String {
    let extra: usize = substitutions.iter().map(|(_, value)| value.len()).sum();
    let mut out = String::with_capacity(template.len() + extra);
    let mut rest = template;

    loop {
        let next = substitutions
            .iter()
            .filter_map(|(key, value)| rest.find(key).map(|pos| (pos, key.len(), *value)))
            .min_by_key(|(pos, _, _)| *pos);

        match next {
            Some((pos, key_len, value)) => {
                out.push_str(&rest[..pos]);
                out.push_str(value);
                rest = &rest[pos + key_len..];
            }
            None => {
                out.push_str(rest);
                return out;
            }
        }
    }
}
