// All LLM prompt constants for the similarity module.
// Reuses cross-cutting fragments from llm_client::prompts.

/// System prompt for similarity calls; enforces JSON-only output.
pub const SIMILARITY_SYSTEM: &str =
    "You are a career mentorship matcher comparing a student profile with an \
    alumni profile. Ground every observation in the profile data you are given. \
    You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences. \
    Do NOT include explanations or apologies.";

/// Overview prompt template. Replace `{student_json}` and `{alumni_json}`
/// before sending.
pub const OVERVIEW_PROMPT_TEMPLATE: &str = r#"Compare the student and alumni profiles below and describe what they have in common.

Return a JSON object with this EXACT schema (no extra fields):
{
  "similarities": [
    "Both studied computer science",
    "Shared interest in distributed systems"
  ],
  "summary": "One short paragraph a student could read before reaching out."
}

Rules:
- List only similarities supported by the profiles; do not invent overlap.
- 3 to 6 entries in "similarities", each a single sentence.
- "summary" is one paragraph, written to the student, suggesting what to
  mention when contacting this alumni.

STUDENT PROFILE:
{student_json}

ALUMNI PROFILE:
{alumni_json}"#;

/// Score prompt template. Replace `{student_json}` and `{alumni_json}`
/// before sending.
pub const SCORE_PROMPT_TEMPLATE: &str = r#"Score how similar the student and alumni profiles below are, per dimension.

Return a JSON object with this EXACT schema (no extra fields):
{
  "scores": {
    "education": 0,
    "skills": 0,
    "interests": 0,
    "industry": 0,
    "location": 0,
    "careerPath": 0
  },
  "overall": 0
}

Rules:
- Every score is an integer from 0 (nothing in common) to 100 (near-identical).
- "education": school, field of study, graduation timing.
- "skills": overlap of the skills lists.
- "interests": overlap of the interests lists.
- "industry": student's interests and skills versus the alumni's industry.
- "location": geographic proximity of the stated locations.
- "careerPath": how plausibly the student's trajectory leads to the alumni's
  current position.
- "overall" weighs all six dimensions; it is not required to be their mean.
- Missing data scores low, never high.

STUDENT PROFILE:
{student_json}

ALUMNI PROFILE:
{alumni_json}"#;
