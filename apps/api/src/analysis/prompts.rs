// Prompt constants for resume-vs-JD analysis.
// The JSON keys below must stay in sync with `models::{JD_MATCH, MISSING_KEYWORDS, PROFILE_SUMMARY}`.

/// ATS evaluation prompt. Replace `{resume_text}` and `{job_description}` before sending.
pub const ATS_MATCH_PROMPT_TEMPLATE: &str = r#"
Act as an expert ATS (Applicant Tracking System) specialist with deep expertise in:
- Technical fields
- Software engineering
- Data science
- Data analysis
- Big data engineering

Evaluate the following resume against the job description. Keep in mind that the job market
is highly competitive. Give detailed feedback on how the resume can be improved.

Resume:
{resume_text}

Job Description:
{job_description}

Respond with a JSON object in exactly this format and NOTHING else:
{
    "JD Match": "percentage between 0-100",
    "MissingKeywords": ["keyword1", "keyword2", ...],
    "Profile Summary": "detailed analysis of the match and specific improvement suggestions"
}
"#;

pub const RESUME_PLACEHOLDER: &str = "{resume_text}";
pub const JOB_DESCRIPTION_PLACEHOLDER: &str = "{job_description}";
