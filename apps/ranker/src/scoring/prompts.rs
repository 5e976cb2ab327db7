// Evaluation prompt sent to the model for every resume.
// The rubric and the JSON output contract are what the interpreter relies on.

/// Rubric criteria and their point weights. Weights sum to 100.
pub const RUBRIC: &[(&str, u32)] = &[
    ("Core skills/tools/tech stack match", 50),
    ("Relevant experience level, scope, and years", 30),
    ("Domain/industry alignment and impact", 10),
    ("Education/certifications fit", 10),
];

const PREAMBLE: &str = "You are an expert technical recruiter evaluating resumes against the job description.

First read the job description and identify the must-have skills, tools, seniority, and domain context. \
Then assess how well the resume proves each item with concrete evidence (projects, accomplishments, impact).";

const OUTPUT_CONTRACT: &str = r#"Return only JSON in this exact format:
{
  "score": <number between 0-100>,
  "reasoning": "Concise justification citing the strongest matches and the top gaps."
}"#;

/// Renders the evaluation prompt. Both inputs are embedded verbatim.
pub fn compose(job_description: &str, document_text: &str) -> String {
    let rubric = RUBRIC
        .iter()
        .map(|(criterion, points)| format!("- {criterion}: {points}"))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "{PREAMBLE}\n\n\
         Scoring rubric (0-100, be strict):\n{rubric}\n\n\
         Job Description:\n{job_description}\n\n\
         Resume:\n{document_text}\n\n\
         {OUTPUT_CONTRACT}"
    )
}
