pub const MATCH_ANALYSIS_SYSTEM: &str = "You are an experienced technical recruiter. \
    You compare resumes against job descriptions and identify the keywords an \
    applicant tracking system would look for. Respond with valid JSON only.";

/// User prompt for keyword analysis. Both documents are inserted verbatim in one pass.
pub fn match_analysis_prompt(resume_text: &str, job_text: &str) -> String {
    format!(
        r#"Compare this resume with the job description.

RESUME:
{resume_text}

JOB DESCRIPTION:
{job_text}

Return a JSON object with exactly these fields:
{{
  "keywords": ["..."],
  "analysis": "..."
}}

Rules:
- "keywords": up to 20 single-word skills, tools, or domain terms from the JOB DESCRIPTION, most important first, lowercase.
- "analysis": at most 4 sentences covering skills to emphasize and specific improvements.
- Do NOT invent keywords that are not in the job description."#
    )
}
