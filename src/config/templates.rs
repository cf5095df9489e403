use serde::{ Deserialize, Serialize };

pub const FALLBACK_INTENT: &str = "general";

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct TemplateBucket {
    pub intent: String,
    pub responses: Vec<String>,
}

/// Sentence appended when the first detected entity has type `kind` and,
/// if `contains` is set, its value contains that fragment. `{value}` is
/// replaced with the entity value.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct EntitySuffix {
    pub kind: String,
    #[serde(default)]
    pub contains: Option<String>,
    pub text: String,
}

impl EntitySuffix {
    pub fn applies_to(&self, kind: &str, value: &str) -> bool {
        self.kind == kind &&
            self.contains
                .as_deref()
                .map_or(true, |fragment| value.contains(fragment))
    }

    pub fn render(&self, value: &str) -> String {
        self.text.replace("{value}", value)
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct ResponseTemplates {
    pub welcome: String,
    pub buckets: Vec<TemplateBucket>,
    pub entity_suffixes: Vec<EntitySuffix>,
    pub negative_suffix: String,
    pub mixed_suffix: String,
    /// `{memory}` is replaced with the start of the recalled exchange.
    pub memory_recall: String,
    pub fillers: Vec<String>,
    pub cross_lingual: String,
    pub adaptation: String,
}

impl ResponseTemplates {
    /// Candidates for `intent`, falling back to the general bucket.
    pub fn bucket(&self, intent: &str) -> &[String] {
        let find = |name: &str| {
            self.buckets
                .iter()
                .find(|b| b.intent == name && !b.responses.is_empty())
                .map(|b| b.responses.as_slice())
        };
        find(intent)
            .or_else(|| find(FALLBACK_INTENT))
            .unwrap_or(&[])
    }

    pub fn entity_suffix(&self, kind: &str, value: &str) -> Option<String> {
        self.entity_suffixes
            .iter()
            .find(|s| s.applies_to(kind, value))
            .map(|s| s.render(value))
    }
}

fn bucket(intent: &str, responses: &[&str]) -> TemplateBucket {
    TemplateBucket {
        intent: intent.to_string(),
        responses: responses
            .iter()
            .map(|r| r.to_string())
            .collect(),
    }
}

impl Default for ResponseTemplates {
    fn default() -> Self {
        Self {
            welcome: "Hi there! I'm NeuraX AI Assistant. How can I help you today?".to_string(),
            buckets: vec![
                bucket("greeting", &[
                    "Hi there! Great to meet you. How can I assist you today with NeuraX AI solutions?",
                    "Hello! I'm here to help with all your AI needs. What can I do for you?",
                    "Hey! Thanks for reaching out. What aspects of AI are you interested in exploring?",
                ]),
                bucket("technical", &[
                    "From a technical perspective, our Neural Intelligence Engine uses advanced deep learning techniques that can process and understand complex data patterns. Would you like me to elaborate on any specific aspect?",
                    "Our architecture combines transformer models with proprietary neural network designs, allowing for contextual understanding across diverse data types. I'd be happy to dive deeper into any area you're curious about.",
                    "The technical foundation of our solution incorporates multi-modal learning systems with adaptive feedback loops. Is there a particular technical challenge you're looking to solve?",
                ]),
                bucket("business", &[
                    "From a business standpoint, our AI solutions typically deliver 30-40% efficiency improvements within the first quarter of implementation. I can share more specific ROI details based on your industry.",
                    "Our business approach focuses on measurable outcomes and tailored implementation strategies. Would you like to know how we've helped similar companies in your sector?",
                    "We've developed flexible pricing models designed to scale with your business needs. What specific business outcomes are you hoping to achieve with AI?",
                ]),
                bucket("creative", &[
                    "Our creative AI capabilities extend to design assistance, content generation, and innovative problem-solving approaches. I'd love to hear more about your creative projects.",
                    "The creative applications of our technology include pattern recognition for design inspiration and contextual understanding for content creation. How might this enhance your creative workflow?",
                    "We've developed AI that acts as a creative partner rather than just a tool, offering suggestions that spark new ideas while preserving your unique vision. What type of creative work are you involved in?",
                ]),
                bucket("philosophical", &[
                    "That's a profound question. At NeuraX, we believe AI ethics should be built into the foundation of every system, not added as an afterthought. Our approach prioritizes transparency and human values alignment.",
                    "The philosophical dimensions of AI are fascinating to explore. We've developed frameworks that help navigate the complex interplay between technological capability and ethical responsibility.",
                    "I appreciate your interest in the deeper implications of AI. Our work is guided by principles that recognize both the transformative potential of AI and the importance of developing it responsibly.",
                ]),
                bucket("educational", &[
                    "In educational contexts, our AI adapts to individual learning styles through continuous interaction analysis. This creates personalized learning experiences that evolve with the learner.",
                    "We've developed specialized educational modules that can identify knowledge gaps and create tailored curricula. The system learns from each interaction to better support learning objectives.",
                    "Our approach to educational AI focuses on augmentation rather than replacement - enhancing human teaching capabilities while providing insights that help educators better understand student needs.",
                ]),
                bucket("inquiry", &[
                    "That's a great question. Based on your interest, I think you'll find that our approach to AI is focused on explainability and practical outcomes rather than black-box solutions.",
                    "I'm glad you asked about that. The answer depends somewhat on your specific context, but I can share how we typically address this challenge.",
                    "That's something we've thought deeply about. The short answer is that it depends on several factors specific to your situation, but I can explain our general approach.",
                ]),
                bucket(FALLBACK_INTENT, &[
                    "NeuraX AI specializes in culturally intelligent, explainable AI solutions for education and healthcare sectors. Our technology bridges the gap between AI capabilities and human understanding.",
                    "We offer Neural Intelligence Engine, AI Personalization Framework, DevAI Platform, and Custom AI Solutions tailored to your specific business needs.",
                    "AI can help your business automate routine tasks, derive insights from data, personalize customer experiences, and make data-driven decisions faster and more accurately.",
                ])
            ],
            entity_suffixes: vec![
                EntitySuffix {
                    kind: "product".to_string(),
                    contains: Some("neural intelligence".to_string()),
                    text: " Our Neural Intelligence Engine specifically uses advanced deep learning techniques to understand context, sentiment, and cultural nuances in data.".to_string(),
                },
                EntitySuffix {
                    kind: "industry".to_string(),
                    contains: None,
                    text: " We have significant experience in the {value} sector, where our AI solutions have helped organizations improve efficiency and outcomes.".to_string(),
                },
                EntitySuffix {
                    kind: "technology".to_string(),
                    contains: Some("transformer".to_string()),
                    text: " Our models utilize the latest advancements in transformer architecture with significant enhancements to attention mechanisms that allow for better contextual understanding.".to_string(),
                },
                EntitySuffix {
                    kind: "concept".to_string(),
                    contains: Some("ethics".to_string()),
                    text: " We've developed a comprehensive ethics framework that guides all our AI development, ensuring alignment with human values and responsible innovation.".to_string(),
                }
            ],
            negative_suffix: " I understand this might be frustrating. How can I better address your concerns?".to_string(),
            mixed_suffix: " I notice you have mixed feelings about this. Perhaps I can clarify some aspects that seem concerning while building on the positive elements.".to_string(),
            memory_recall: " As we discussed earlier regarding {memory}..., this relates to your current question because both involve aspects of intelligent systems.".to_string(),
            fillers: [
                ", if that makes sense",
                " - in my experience",
                ", I believe",
                " (and this is important)",
                ", interestingly enough",
                ", based on recent research",
                ", which is quite fascinating",
                " - you might find this surprising",
            ]
                .iter()
                .map(|f| f.to_string())
                .collect(),
            cross_lingual: " I noticed you might be using terms from another language. I'm designed to understand concepts across multiple languages.".to_string(),
            adaptation: " I've noticed patterns in our conversation that suggest this topic is important to you, so I'm tailoring my responses accordingly.".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_intent_uses_general_bucket() {
        let templates = ResponseTemplates::default();
        assert_eq!(templates.bucket("procedural"), templates.bucket(FALLBACK_INTENT));
        assert_eq!(templates.bucket("greeting").len(), 3);
    }

    #[test]
    fn industry_suffix_interpolates_value() {
        let templates = ResponseTemplates::default();
        let suffix = templates.entity_suffix("industry", "healthcare").unwrap();
        assert!(suffix.contains("the healthcare sector"));
    }

    #[test]
    fn conditional_suffix_requires_fragment() {
        let templates = ResponseTemplates::default();
        assert!(templates.entity_suffix("technology", "nlp").is_none());
        assert!(templates.entity_suffix("technology", "transformers").is_some());
        assert!(templates.entity_suffix("metric", "accuracy").is_none());
    }
}
