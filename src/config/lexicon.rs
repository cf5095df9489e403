use serde::{ Deserialize, Serialize };

/// One labelled row of a keyword table.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct Category {
    pub name: String,
    pub patterns: Vec<String>,
}

impl Category {
    fn new(name: &str, patterns: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            patterns: patterns
                .iter()
                .map(|p| p.to_lowercase())
                .collect(),
        }
    }

    /// Patterns of this category that occur in `lowered`.
    pub fn matches<'a>(&'a self, lowered: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.patterns
            .iter()
            .map(|p| p.as_str())
            .filter(move |p| !p.is_empty() && lowered.contains(*p))
    }
}

/// Ordered keyword table. Enumeration order decides ties, so this is a list
/// rather than a map.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Default)]
#[serde(transparent)]
pub struct KeywordTable(pub Vec<Category>);

impl KeywordTable {
    pub fn categories(&self) -> &[Category] {
        &self.0
    }

    pub fn get(&self, name: &str) -> Option<&Category> {
        self.0.iter().find(|c| c.name == name)
    }

    fn lowercase(&mut self) {
        for category in &mut self.0 {
            for pattern in &mut category.patterns {
                *pattern = pattern.to_lowercase();
            }
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct SentimentLexicon {
    pub positive: Vec<String>,
    pub negative: Vec<String>,
    #[serde(default)]
    pub mixed: Vec<String>,
    #[serde(default)]
    pub neutral: Vec<String>,
}

impl SentimentLexicon {
    pub fn positive_hits(&self, lowered: &str) -> usize {
        count_hits(&self.positive, lowered)
    }

    pub fn negative_hits(&self, lowered: &str) -> usize {
        count_hits(&self.negative, lowered)
    }
}

fn count_hits(terms: &[String], lowered: &str) -> usize {
    terms
        .iter()
        .filter(|t| !t.is_empty() && lowered.contains(t.as_str()))
        .count()
}

fn owned(terms: &[&str]) -> Vec<String> {
    terms
        .iter()
        .map(|t| t.to_string())
        .collect()
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct Lexicon {
    pub intents: KeywordTable,
    pub entities: KeywordTable,
    pub sentiment: SentimentLexicon,
}

impl Lexicon {
    /// Patterns from a config file may carry capitals; matching is done on
    /// lower-cased input only.
    pub fn normalize(&mut self) {
        self.intents.lowercase();
        self.entities.lowercase();
        for list in [
            &mut self.sentiment.positive,
            &mut self.sentiment.negative,
            &mut self.sentiment.mixed,
            &mut self.sentiment.neutral,
        ] {
            for term in list.iter_mut() {
                *term = term.to_lowercase();
            }
        }
    }
}

impl Default for Lexicon {
    fn default() -> Self {
        Self {
            intents: KeywordTable(
                vec![
                    Category::new("greeting", &[
                        "hello",
                        "hi",
                        "hey",
                        "greetings",
                        "good morning",
                        "good afternoon",
                    ]),
                    Category::new("inquiry", &["what is", "how do", "can you", "tell me", "explain"]),
                    Category::new("technical", &[
                        "neural",
                        "engine",
                        "algorithm",
                        "model",
                        "architecture",
                        "code",
                    ]),
                    Category::new("business", &[
                        "pricing",
                        "cost",
                        "roi",
                        "benefits",
                        "implementation",
                        "strategy",
                    ]),
                    Category::new("creative", &["design", "create", "generate", "imagine", "visualize"]),
                    Category::new("philosophical", &[
                        "meaning",
                        "purpose",
                        "ethics",
                        "philosophy",
                        "consciousness",
                        "sentient",
                    ]),
                    Category::new("educational", &[
                        "learn",
                        "teach",
                        "education",
                        "training",
                        "course",
                        "curriculum",
                    ]),
                    Category::new("emotional", &[
                        "feel",
                        "emotion",
                        "sentiment",
                        "mood",
                        "empathy",
                        "understand",
                    ]),
                    Category::new("analytical", &[
                        "analyze",
                        "evaluate",
                        "assess",
                        "compare",
                        "research",
                        "investigate",
                    ]),
                    Category::new("procedural", &[
                        "steps",
                        "process",
                        "procedure",
                        "method",
                        "approach",
                        "workflow",
                    ])
                ]
            ),
            entities: KeywordTable(
                vec![
                    Category::new("product", &[
                        "neural intelligence",
                        "ai personalization",
                        "devai platform",
                    ]),
                    Category::new("industry", &[
                        "healthcare",
                        "education",
                        "finance",
                        "retail",
                        "manufacturing",
                    ]),
                    Category::new("technology", &[
                        "machine learning",
                        "deep learning",
                        "nlp",
                        "computer vision",
                        "neural networks",
                        "transformers",
                        "attention mechanisms",
                        "multimodal learning",
                    ]),
                    Category::new("concept", &[
                        "ethics",
                        "bias",
                        "fairness",
                        "transparency",
                        "explainability",
                        "privacy",
                        "security",
                    ]),
                    Category::new("research", &[
                        "paper",
                        "study",
                        "experiment",
                        "finding",
                        "discovery",
                        "innovation",
                    ]),
                    Category::new("location", &[
                        "global",
                        "regional",
                        "local",
                        "remote",
                        "distributed",
                        "centralized",
                    ]),
                    Category::new("timeframe", &[
                        "short-term",
                        "mid-term",
                        "long-term",
                        "immediate",
                        "future",
                        "current",
                    ]),
                    Category::new("metric", &[
                        "accuracy",
                        "precision",
                        "recall",
                        "f1-score",
                        "performance",
                        "efficiency",
                    ])
                ]
            ),
            sentiment: SentimentLexicon {
                positive: owned(
                    &[
                        "good",
                        "great",
                        "excellent",
                        "amazing",
                        "love",
                        "like",
                        "helpful",
                        "impressive",
                        "innovative",
                    ]
                ),
                negative: owned(
                    &[
                        "bad",
                        "poor",
                        "terrible",
                        "hate",
                        "dislike",
                        "useless",
                        "confusing",
                        "complicated",
                        "difficult",
                    ]
                ),
                mixed: owned(
                    &[
                        "mixed",
                        "partial",
                        "somewhat",
                        "mostly",
                        "slightly",
                        "relatively",
                        "comparatively",
                    ]
                ),
                neutral: owned(
                    &["okay", "fine", "alright", "neutral", "balanced", "fair", "reasonable"]
                ),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_tables_keep_declaration_order() {
        let lexicon = Lexicon::default();
        let names: Vec<&str> = lexicon.intents
            .categories()
            .iter()
            .map(|c| c.name.as_str())
            .collect();
        assert_eq!(names.first(), Some(&"greeting"));
        assert_eq!(names.last(), Some(&"procedural"));
        assert_eq!(names.len(), 10);
    }

    #[test]
    fn category_matches_substrings() {
        let lexicon = Lexicon::default();
        let technical = lexicon.intents.get("technical").unwrap();
        let hits: Vec<&str> = technical.matches("the neural engine code").collect();
        assert_eq!(hits, vec!["neural", "engine", "code"]);
    }

    #[test]
    fn normalize_lowercases_file_patterns() {
        let mut lexicon = Lexicon::default();
        lexicon.intents.0.push(Category {
            name: "custom".to_string(),
            patterns: vec!["RUST".to_string()],
        });
        lexicon.sentiment.positive.push("Superb".to_string());
        lexicon.normalize();
        assert_eq!(lexicon.intents.get("custom").unwrap().patterns, vec!["rust"]);
        assert_eq!(lexicon.sentiment.positive_hits("superb"), 1);
    }
}
