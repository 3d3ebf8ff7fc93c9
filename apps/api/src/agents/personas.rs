// Agent personas and the tools each one may call.

use serde_json::json;

use super::runtime::ToolSpec;

/// Name of the local function tool that returns the user's profile.
pub const PROFILE_TOOL: &str = "get_user_profile";

/// File-search results returned to the recommendation persona per call.
const FILE_SEARCH_RESULTS: u32 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PersonaId {
    CareerGuide,
    CareerRecommendations,
    JobSearch,
}

pub struct Persona {
    pub name: &'static str,
    /// Shown to the triage persona when it decides on a handoff.
    pub handoff_description: &'static str,
    pub instructions: &'static str,
}

const CAREER_GUIDE: Persona = Persona {
    name: "Career Guide",
    handoff_description: "General career guidance and routing.",
    instructions: "\
You are a career guidance assistant that helps users explore career paths in the Australian Skills Classification (ASC) system based on their skills and interests.

You can hand the conversation to these specialists:

1. ASC Career Recommendations, when:
   - the user wants career recommendations based on their skills
   - the question concerns the Australian Skills Classification system
   - the user wants to know which careers match their competencies
   - the question is about career paths, requirements or qualifications

2. Job Search Assistant, when:
   - the user wants actual job listings
   - the question is about current job market conditions
   - the user wants to know which companies are hiring
   - the question is about job application advice

Answer general questions directly without a handoff.

Before making recommendations, call get_user_profile to check the user's skills and competencies. If the profile is empty, ask the user about their skills or suggest uploading a resume first.

Keep a conversational and helpful tone.",
};

const CAREER_RECOMMENDATIONS: Persona = Persona {
    name: "ASC Career Recommendations",
    handoff_description: "Career recommendations grounded in the ASC occupation knowledge base.",
    instructions: "\
You are a specialist in the Australian Skills Classification (ASC) system. You give accurate career recommendations based on the user's skills and competencies.

When responding:
- Always include ANZSCO codes with career titles.
- Explain how the user's skills match specific career requirements.
- Reference core competency ratings when available.
- Use specific information from the ASC knowledge base.
- Suggest skills to develop for career advancement.

Call get_user_profile for the user's skills and ratings, and search the knowledge base for occupation details, required skills, competency levels and specialist tasks.

Be precise, informative and helpful.",
};

const JOB_SEARCH: Persona = Persona {
    name: "Job Search Assistant",
    handoff_description: "Live job listings and job market information from the web.",
    instructions: "\
You are a specialist in finding current job opportunities that match the user's skills and interests.

When responding:
- Search for current job listings relevant to the user's skills.
- Give specific job titles, companies and key requirements.
- Focus on jobs that match the user's skill profile.
- Offer practical advice about application strategies.
- Be honest about current job market conditions.

Call get_user_profile for the user's skills, and use web search for listings and market information.

Be practical, specific and helpful.",
};

impl PersonaId {
    pub const SPECIALISTS: [PersonaId; 2] = [PersonaId::CareerRecommendations, PersonaId::JobSearch];

    pub fn persona(self) -> &'static Persona {
        match self {
            PersonaId::CareerGuide => &CAREER_GUIDE,
            PersonaId::CareerRecommendations => &CAREER_RECOMMENDATIONS,
            PersonaId::JobSearch => &JOB_SEARCH,
        }
    }

    /// Function-tool name the triage persona calls to hand off,
    /// e.g. `transfer_to_job_search_assistant`.
    pub fn handoff_tool(self) -> String {
        let slug = self
            .persona()
            .name
            .to_lowercase()
            .split(|c: char| !c.is_ascii_alphanumeric())
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join("_");
        format!("transfer_to_{slug}")
    }

    pub fn from_handoff_tool(name: &str) -> Option<PersonaId> {
        Self::SPECIALISTS
            .into_iter()
            .find(|id| id.handoff_tool() == name)
    }
}

/// The three personas plus the retrieval index they share.
#[derive(Debug, Clone, Default)]
pub struct AgentTeam {
    /// `None` when provisioning failed; file search is then omitted.
    pub knowledge_index_id: Option<String>,
}

impl AgentTeam {
    pub fn new(knowledge_index_id: Option<String>) -> Self {
        Self { knowledge_index_id }
    }

    pub fn tools_for(&self, id: PersonaId) -> Vec<ToolSpec> {
        let mut tools = vec![profile_tool()];
        match id {
            PersonaId::CareerGuide => {
                tools.extend(PersonaId::SPECIALISTS.into_iter().map(handoff_tool));
            }
            PersonaId::CareerRecommendations => {
                if let Some(index_id) = &self.knowledge_index_id {
                    tools.push(ToolSpec::FileSearch {
                        vector_store_ids: vec![index_id.clone()],
                        max_num_results: FILE_SEARCH_RESULTS,
                    });
                }
            }
            PersonaId::JobSearch => tools.push(ToolSpec::WebSearchPreview),
        }
        tools
    }
}

fn no_arguments() -> serde_json::Value {
    json!({
        "type": "object",
        "properties": {},
        "additionalProperties": false
    })
}

fn profile_tool() -> ToolSpec {
    ToolSpec::Function {
        name: PROFILE_TOOL.to_string(),
        description: "Get the user's skills (from chat and resume) and core competency ratings."
            .to_string(),
        parameters: no_arguments(),
    }
}

fn handoff_tool(target: PersonaId) -> ToolSpec {
    let persona = target.persona();
    ToolSpec::Function {
        name: target.handoff_tool(),
        description: format!(
            "Hand off to the {} agent. {}",
            persona.name, persona.handoff_description
        ),
        parameters: no_arguments(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tool_names(tools: &[ToolSpec]) -> Vec<String> {
        tools
            .iter()
            .map(|t| match t {
                ToolSpec::Function { name, .. } => name.clone(),
                ToolSpec::FileSearch { .. } => "file_search".to_string(),
                ToolSpec::WebSearchPreview => "web_search_preview".to_string(),
            })
            .collect()
    }

    #[test]
    fn test_handoff_tool_names() {
        assert_eq!(
            PersonaId::CareerRecommendations.handoff_tool(),
            "transfer_to_asc_career_recommendations"
        );
        assert_eq!(
            PersonaId::from_handoff_tool("transfer_to_job_search_assistant"),
            Some(PersonaId::JobSearch)
        );
        assert_eq!(PersonaId::from_handoff_tool("transfer_to_career_guide"), None);
    }

    #[test]
    fn test_triage_gets_profile_and_handoffs() {
        let tools = AgentTeam::default().tools_for(PersonaId::CareerGuide);
        assert_eq!(
            tool_names(&tools),
            vec![
                "get_user_profile",
                "transfer_to_asc_career_recommendations",
                "transfer_to_job_search_assistant"
            ]
        );
    }

    #[test]
    fn test_file_search_only_with_an_index() {
        let without = AgentTeam::default().tools_for(PersonaId::CareerRecommendations);
        assert_eq!(tool_names(&without), vec!["get_user_profile"]);

        let with = AgentTeam::new(Some("vs_1".to_string())).tools_for(PersonaId::CareerRecommendations);
        assert_eq!(tool_names(&with), vec!["get_user_profile", "file_search"]);
    }

    #[test]
    fn test_job_search_gets_web_search() {
        let tools = AgentTeam::default().tools_for(PersonaId::JobSearch);
        assert_eq!(tool_names(&tools), vec!["get_user_profile", "web_search_preview"]);
    }
}
