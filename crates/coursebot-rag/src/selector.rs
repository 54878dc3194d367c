//! Selector implementations

use async_trait::async_trait;
use regex::Regex;
use std::collections::HashSet;
use std::sync::{Arc, OnceLock};
use tracing::debug;

use coursebot_core::{EngineDescription, GenerationConfig, LLMProvider, Result, Selection, Selector};

use crate::text::{keyword_score, overlap_score, term_set};

/// Asks an LLM to pick one numbered choice.
///
/// The reply is expected to start with the 1-based choice number followed by
/// a short reason. A reply with no number, or with 0, is treated as no choice.
pub struct LlmSingleSelector {
    llm: Arc<dyn LLMProvider>,
}

impl LlmSingleSelector {
    pub fn new(llm: Arc<dyn LLMProvider>) -> Self {
        Self { llm }
    }
}

#[async_trait]
impl Selector for LlmSingleSelector {
    async fn select(&self, question: &str, choices: &[EngineDescription]) -> Result<Option<Selection>> {
        let prompt = build_prompt(question, choices);
        let config = GenerationConfig {
            model_id: self.llm.model_id().to_string(),
            max_tokens: 100,
            ..Default::default()
        };
        let reply = self.llm.generate_with_config(&prompt, &config).await?;
        debug!(reply = %reply.text, "Selector reply");
        Ok(parse_selection(&reply.text))
    }
}

fn build_prompt(question: &str, choices: &[EngineDescription]) -> String {
    let mut listing = String::new();
    for (i, choice) in choices.iter().enumerate() {
        listing.push_str(&format!("({}) {}\n\n", i + 1, choice.description));
    }

    format!(
        "Some choices are given below. It is provided in a numbered list (1 to {}), \
        where each item in the list corresponds to a summary.\n\
        ---------------------\n\
        {}\
        ---------------------\n\
        Using only the choices above and not prior knowledge, return the choice that is \
        most relevant to the question: '{}'\n\
        Reply with the choice number first, followed by a one-sentence reason.\n",
        choices.len(),
        listing,
        question
    )
}

fn parse_selection(reply: &str) -> Option<Selection> {
    static NUMBER: OnceLock<Regex> = OnceLock::new();
    let number = NUMBER.get_or_init(|| Regex::new(r"\d+").expect("number pattern is valid"));

    let found = number.find(reply)?;
    let choice: usize = found.as_str().parse().ok()?;
    if choice == 0 {
        return None;
    }

    let reason = reply[found.end()..]
        .trim_start_matches(|c: char| c == ')' || c == '.' || c == ':' || c == '-' || c.is_whitespace())
        .trim()
        .to_string();

    Some(Selection {
        index: choice - 1,
        reason,
    })
}

/// Picks the choice whose description and indexed keywords share the most
/// terms with the question.
///
/// A choice scores the fraction of question terms found in its name and
/// description, plus half the fraction found in its keywords. Ties go to the
/// earlier choice. No overlap at all means no choice.
#[derive(Debug, Clone, Default)]
pub struct KeywordSelector;

const KEYWORD_WEIGHT: f32 = 0.5;

impl KeywordSelector {
    pub fn new() -> Self {
        Self
    }

    fn score(terms: &HashSet<String>, choice: &EngineDescription) -> (f32, f32) {
        let described = keyword_score(terms, &format!("{} {}", choice.name, choice.description));
        let keywords: HashSet<String> = choice.keywords.iter().map(|k| k.to_lowercase()).collect();
        (described, overlap_score(terms, &keywords))
    }
}

#[async_trait]
impl Selector for KeywordSelector {
    async fn select(&self, question: &str, choices: &[EngineDescription]) -> Result<Option<Selection>> {
        let terms = term_set(question);

        let mut best: Option<(usize, f32)> = None;
        for (i, choice) in choices.iter().enumerate() {
            let (described, indexed) = Self::score(&terms, choice);
            let score = described + KEYWORD_WEIGHT * indexed;
            debug!(choice = %choice.name, described, indexed, score, "Keyword selector score");
            if score > 0.0 && best.is_none_or(|(_, top)| score > top) {
                best = Some((i, score));
            }
        }

        Ok(best.map(|(index, _)| {
            let (described, indexed) = Self::score(&terms, &choices[index]);
            Selection {
                index,
                reason: format!(
                    "{:.0}% of the question's terms appear in the {} description and {:.0}% in its content",
                    described * 100.0,
                    choices[index].name,
                    indexed * 100.0
                ),
            }
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_selection() {
        let selection = parse_selection("2) The question is about lecture content.").unwrap();
        assert_eq!(selection.index, 1);
        assert_eq!(selection.reason, "The question is about lecture content.");

        let selection = parse_selection("Choice 1: grading lives in the syllabus").unwrap();
        assert_eq!(selection.index, 0);
        assert_eq!(selection.reason, "grading lives in the syllabus");

        assert!(parse_selection("none of them").is_none());
        assert!(parse_selection("0").is_none());
    }

    #[test]
    fn test_prompt_numbers_choices_from_one() {
        let prompt = build_prompt(
            "When is the midterm?",
            &[
                EngineDescription::new("syllabus", "Course syllabus"),
                EngineDescription::new("lectures", "Lecture slides"),
            ],
        );
        assert!(prompt.contains("(1 to 2)"));
        assert!(prompt.contains("(1) Course syllabus\n\n(2) Lecture slides\n\n"));
        assert!(prompt.contains("'When is the midterm?'"));
    }

    #[tokio::test]
    async fn test_keyword_selector_uses_indexed_keywords() {
        let choices = [
            EngineDescription::new("syllabus", "Course syllabus: grading, policies")
                .with_keywords(["grading", "midterm", "exam"]),
            EngineDescription::new("lectures", "Lecture slides: topics, concepts")
                .with_keywords(["ecosystem", "ecology", "energy"]),
        ];
        let selector = KeywordSelector::new();

        let selection = selector.select("What is ecosystem ecology?", &choices).await.unwrap().unwrap();
        assert_eq!(selection.index, 1);
        assert_eq!(
            selection.reason,
            "0% of the question's terms appear in the lectures description and 100% in its content"
        );

        // A description match outweighs a keyword-only match
        let selection = selector.select("grading energy", &choices).await.unwrap().unwrap();
        assert_eq!(selection.index, 0);
    }
}
