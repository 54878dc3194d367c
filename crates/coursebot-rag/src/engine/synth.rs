//! Answer synthesis from retrieved snippets

use std::sync::Arc;

use coursebot_core::{GenerationConfig, LLMProvider, Result, SourceSnippet};

const NO_CONTEXT_ANSWER: &str = "No relevant course material was found for this question.";

/// Turns a question plus snippets into answer text.
///
/// With an LLM the snippets are passed as numbered context. Without one the
/// answer is the text of the most relevant snippet.
#[derive(Clone, Default)]
pub struct AnswerSynthesizer {
    llm: Option<Arc<dyn LLMProvider>>,
}

impl AnswerSynthesizer {
    pub fn new(llm: Option<Arc<dyn LLMProvider>>) -> Self {
        Self { llm }
    }

    pub fn extractive() -> Self {
        Self { llm: None }
    }

    pub async fn synthesize(&self, question: &str, snippets: &[SourceSnippet]) -> Result<String> {
        let Some(top) = snippets.first() else {
            return Ok(NO_CONTEXT_ANSWER.to_string());
        };

        let Some(llm) = &self.llm else {
            return Ok(top.text.clone());
        };

        let prompt = build_prompt(question, snippets);
        let config = GenerationConfig {
            model_id: llm.model_id().to_string(),
            ..Default::default()
        };
        let result = llm.generate_with_config(&prompt, &config).await?;
        Ok(result.text.trim().to_string())
    }
}

pub(crate) fn build_context(snippets: &[SourceSnippet]) -> String {
    let mut context = String::new();
    for (i, snippet) in snippets.iter().enumerate() {
        context.push_str(&format!(
            "{}. [{} p.{}] {}\n\n",
            i + 1,
            snippet.metadata.file_name,
            snippet.metadata.page_label,
            snippet.text
        ));
    }
    context
}

fn build_prompt(question: &str, snippets: &[SourceSnippet]) -> String {
    format!(
        "Context information from the course materials is below.\n\
        ---------------------\n\
        {}\
        ---------------------\n\
        Given the context information and not prior knowledge, answer the question.\n\
        Question: {}\n\
        Answer:",
        build_context(snippets),
        question
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use coursebot_core::DocumentMetadata;
    use insta::assert_snapshot;

    fn snippet(text: &str, file: &str, page: u32) -> SourceSnippet {
        SourceSnippet {
            text: text.to_string(),
            score: 1.0,
            metadata: DocumentMetadata::new(file, page, "docs"),
        }
    }

    #[test]
    fn test_prompt_lists_numbered_context() {
        let prompt = build_prompt(
            "What is the IPAT equation?",
            &[snippet("I = P x A x T", "lecture2.pdf", 4), snippet("Impact of population", "lecture2.pdf", 5)],
        );

        assert_snapshot!(prompt, @r###"
        Context information from the course materials is below.
        ---------------------
        1. [lecture2.pdf p.4] I = P x A x T

        2. [lecture2.pdf p.5] Impact of population

        ---------------------
        Given the context information and not prior knowledge, answer the question.
        Question: What is the IPAT equation?
        Answer:
        "###);
    }

    #[tokio::test]
    async fn test_extractive_answer_uses_top_snippet() {
        let synthesizer = AnswerSynthesizer::extractive();
        let answer = synthesizer
            .synthesize("q", &[snippet("first", "a.pdf", 1), snippet("second", "a.pdf", 2)])
            .await
            .unwrap();
        assert_eq!(answer, "first");

        let empty = synthesizer.synthesize("q", &[]).await.unwrap();
        assert_eq!(empty, NO_CONTEXT_ANSWER);
    }
}
