// LLM prompt templates for the screening steps.
// Placeholders are replaced with `str::replace` before sending.

/// Résumé extraction prompt. Replace `{text}` before sending.
pub const RESUME_PARSE_PROMPT_TEMPLATE: &str = r#"You are a resume extraction engine. Extract the following fields from the resume text below and return a single JSON object.

Required JSON structure:
{
  "name": string,
  "email": string,
  "phone": string,
  "linkedin": string,
  "github": string,
  "portfolio url": string,
  "education": list of strings (institution names and degrees only),
  "experience": list of objects with keys "company", "title", "location", "description" and "years of experience",
  "skills": list of strings (every skill mentioned in the text),
  "projects": list of strings or short descriptions,
  "certifications": list of strings,
  "publications": list of strings,
  "awards": list of strings,
  "summary": 2-3 sentence string,
  "other": string or list (miscellaneous information)
}

Rules:
- If a field is not found, use the string "N/A" (never null, never empty).
- Use exactly the keys above. Do not add keys.

Resume text:
{text}
"#;

/// Job description extraction prompt. Replace `{text}` before sending.
pub const JD_PARSE_PROMPT_TEMPLATE: &str = r#"You are a job description parsing engine. Extract the following fields from the job description below and return a single JSON object.
If a field is not explicitly stated, make a best guess from context.

Required JSON structure:
{
  "title": job title,
  "company": company name,
  "location": job location,
  "type": full time, part time, contract, internship, etc.,
  "experience required": minimum years of experience, as a string,
  "qualifications": list of educational qualifications,
  "required skills": list of skills required for the job,
  "preferred skills": list of skills preferred for the job,
  "salary": salary range,
  "work type": remote, hybrid, on-site, etc.,
  "summary": 2-3 sentence summary of the job,
  "other": any other relevant information
}

Rules:
- If a field cannot be determined, use the string "N/A" (never null, never empty).
- Use exactly the keys above. Do not add keys.

Job description:
{text}
"#;

/// Match scoring prompt. Replace `{resume_json}` and `{jd_json}` before sending.
///
/// The weights are guidance for the model. Nothing checks that the returned score honours them.
pub const MATCH_PROMPT_TEMPLATE: &str = r#"You are a highly skilled technical recruiter. Compare the resume and the job description below, both given as structured JSON, and evaluate how well the candidate fits the job.

Scoring:
- "match_score": overall resume-to-job fit, an integer from 0 to 100, based on a weighted combination of:
    - Technical skill match (30%)
    - Soft skill match (15%)
    - Relevant experience (25%)
    - Education alignment (10%)
    - Domain or industry relevance (10%)
    - Project relevance or impact (10%)

Matching skills: skills found in both the resume and the job description.
Missing skills: skills required by the job but missing from the resume.

Suggestions:
- Specific improvements to the resume
- Additional skills the candidate should develop
- Ways to highlight relevant experience and align education with the requirements
- Follow ATS best practices

Return this structure:
{
  "match_score": integer,
  "matching_skills": ["skill1", "skill2"],
  "missing_skills": ["skill3", "skill4"],
  "suggestions": ["suggestion1", "suggestion2", "suggestion3"]
}

Resume JSON:
{resume_json}

Job Description JSON:
{jd_json}
"#;
