// Skill pipeline prompt templates.

pub const SKILL_EXTRACTION_SYSTEM: &str = "\
You are a careful resume analyst. \
You only report skills that the candidate explicitly lists. \
You never infer skills from job titles, duties or employers.";

pub const SKILL_EXTRACTION_PROMPT: &str = r#"Extract the skills listed in the resume below.

RULES:
1. Only report skills that appear under a skills heading such as "Skills", "Technical Skills", "Key Skills", "Core Competencies" or "Tools & Technologies".
2. Do NOT infer skills from job descriptions, responsibilities or project write-ups.
3. Report each skill once, as it is written, without commentary.
4. Reply with a single list of quoted strings, for example: ["python", "sql", "stakeholder engagement"]
5. If the resume has no skills section, reply exactly: No skills can be extracted.

{masked_note}

RESUME:
{resume_text}"#;

/// Phrases meaning the model found nothing. Matched case-insensitively.
pub const NO_SKILLS_PHRASES: &[&str] = &[
    "no skills can be extracted",
    "no skills could be extracted",
    "no skills were found",
    "no skills found",
    "unable to extract any skills",
    "no skills section",
];

pub const CATEGORIZATION_PROMPT: &str = r#"Categorize each of the following skills into exactly one of these four categories:
1. Technical Skills
2. Soft Skills
3. Business Skills
4. Other Skills

Reply with a dictionary whose keys are the four category names and whose values are lists of quoted skill names, for example:
{"Technical Skills": ["python"], "Soft Skills": ["teamwork"], "Business Skills": [], "Other Skills": []}

Use every skill exactly once and keep the skill names unchanged.

SKILLS:
{skills}"#;
