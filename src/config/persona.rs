use serde::{ Deserialize, Serialize };

pub const DEFAULT_PERSONA: &str = "assistant";

/// A named response profile. `latency_factor` scales the thinking delay.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct Persona {
    pub id: String,
    pub name: String,
    pub role: String,
    pub latency_factor: f64,
    pub creativity_factor: f64,
    #[serde(default)]
    pub capabilities: Vec<String>,
    /// Closing sentence appended to every response from this persona.
    #[serde(default)]
    pub closing: Option<String>,
}

fn persona(
    id: &str,
    name: &str,
    role: &str,
    latency_factor: f64,
    creativity_factor: f64,
    capabilities: &[&str],
    closing: Option<&str>
) -> Persona {
    Persona {
        id: id.to_string(),
        name: name.to_string(),
        role: role.to_string(),
        latency_factor,
        creativity_factor,
        capabilities: capabilities
            .iter()
            .map(|c| c.to_string())
            .collect(),
        closing: closing.map(|c| c.to_string()),
    }
}

pub fn default_personas() -> Vec<Persona> {
    vec![
        persona(
            DEFAULT_PERSONA,
            "NeuraX Assistant",
            "General Assistant",
            0.3,
            0.7,
            &["General Q&A", "Business Information", "Product Info"],
            None
        ),
        persona(
            "technical",
            "TechMind",
            "Technical Specialist",
            0.2,
            0.5,
            &["AI Architecture", "Code Explanation", "Technical Documentation"],
            Some(
                " From a technical standpoint, I'd be happy to explain the underlying architecture in more detail if you're interested."
            )
        ),
        persona(
            "research",
            "DataVoyager",
            "Research Analyst",
            0.4,
            0.6,
            &["Deep Analysis", "Data Interpretation", "Research Insights"],
            Some(
                " Our research indicates that organizations implementing these solutions see a 27% average increase in decision quality."
            )
        ),
        persona(
            "creative",
            "CreativeNeuron",
            "Creative Designer",
            0.5,
            0.9,
            &["Idea Generation", "Artistic Concepts", "Creative Solutions"],
            Some(
                " This opens up creative possibilities that might not be immediately obvious but can lead to breakthrough innovations."
            )
        ),
        persona(
            "philosophical",
            "EthosAI",
            "Philosophical Guide",
            0.6,
            0.8,
            &["Ethical Reasoning", "Philosophical Discourse", "Value Alignment"],
            Some(
                " This raises fascinating questions about the nature of intelligence and human-AI collaboration that we're actively exploring."
            )
        ),
        persona(
            "multimodal",
            "SynthAI",
            "Multimodal Specialist",
            0.35,
            0.75,
            &["Cross-Modal Understanding", "Multimedia Analysis", "Sensory Integration"],
            Some(
                " By integrating multiple information streams, we create a more comprehensive understanding than any single modality could provide."
            )
        )
    ]
}

/// Resolves a user-typed persona reference against ids and display names.
/// Exact matches win; otherwise the closest Jaro-Winkler score at or above
/// 0.85 is accepted.
pub fn find_persona<'a>(personas: &'a [Persona], query: &str) -> Option<&'a Persona> {
    let norm_query = query.trim().to_lowercase().replace(&['_', '-', ' '][..], "");
    if norm_query.is_empty() {
        return None;
    }
    let normalize = |s: &str| s.to_lowercase().replace(&['_', '-', ' '][..], "");

    if
        let Some(exact) = personas
            .iter()
            .find(|p| normalize(&p.id) == norm_query || normalize(&p.name) == norm_query)
    {
        return Some(exact);
    }

    let mut best: Option<&Persona> = None;
    let mut best_score = 0.0;
    for p in personas {
        let score = strsim
            ::jaro_winkler(&norm_query, &normalize(&p.id))
            .max(strsim::jaro_winkler(&norm_query, &normalize(&p.name)));
        if score > best_score {
            best_score = score;
            best = Some(p);
        }
    }
    if best_score >= 0.85 {
        return best;
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_latency_factors() {
        let personas = default_personas();
        let latency = |id: &str| {
            personas
                .iter()
                .find(|p| p.id == id)
                .map(|p| p.latency_factor)
        };
        assert_eq!(personas.len(), 6);
        assert_eq!(latency("assistant"), Some(0.3));
        assert_eq!(latency("technical"), Some(0.2));
        assert_eq!(latency("philosophical"), Some(0.6));
    }

    #[test]
    fn only_specialists_have_closings() {
        let personas = default_personas();
        assert!(personas[0].closing.is_none());
        assert!(personas[1..].iter().all(|p| p.closing.is_some()));
    }

    #[test]
    fn find_persona_by_id_name_and_typo() {
        let personas = default_personas();
        assert_eq!(find_persona(&personas, "research").unwrap().name, "DataVoyager");
        assert_eq!(find_persona(&personas, "Tech Mind").unwrap().id, "technical");
        assert_eq!(find_persona(&personas, "creatve").unwrap().id, "creative");
        assert!(find_persona(&personas, "zzzz").is_none());
        assert!(find_persona(&personas, "  ").is_none());
    }
}
