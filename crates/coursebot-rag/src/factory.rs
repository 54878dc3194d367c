//! Builds the query engines of a course

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use tracing::info;

use coursebot_core::{AppConfig, EngineDescription, Error, IndexKind, LLMProvider, QueryEngine, Result, Selector};

use crate::engine::{AnswerSynthesizer, HydeTransform, ListQueryEngine, RouterQueryEngine, VectorQueryEngine};
use crate::registry::IndexRegistry;
use crate::text::tokenize;

pub const SYLLABUS_DESCRIPTION: &str = "Queries information from the course syllabus including: \
    course information, learning objectives, required materials, assignments, grading, policies, \
    dates, schedule, etc.";

pub const LECTURES_DESCRIPTION: &str = "Queries information from the course lecture slides including: \
    subject knowledge, topics, concepts, definitions, examples, etc.";

/// The engines a course offers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EngineName {
    /// Keyword-reranked list index over the syllabus
    Syllabus,
    /// Vector index over the lecture slides
    Lectures,
    /// Chooses between syllabus and lectures per question
    Router,
}

impl EngineName {
    pub const ALL: [EngineName; 3] = [EngineName::Syllabus, EngineName::Lectures, EngineName::Router];

    pub fn as_str(&self) -> &'static str {
        match self {
            EngineName::Syllabus => "syllabus",
            EngineName::Lectures => "lectures",
            EngineName::Router => "router",
        }
    }

    /// The collection and index kind backing this engine, if it has one
    pub fn collection(&self) -> Option<(&'static str, IndexKind)> {
        match self {
            EngineName::Syllabus => Some(("syllabus", IndexKind::List)),
            EngineName::Lectures => Some(("lectures", IndexKind::Vector)),
            EngineName::Router => None,
        }
    }
}

impl fmt::Display for EngineName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EngineName {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "syllabus" => Ok(EngineName::Syllabus),
            "lectures" => Ok(EngineName::Lectures),
            "router" => Ok(EngineName::Router),
            _ => Err(Error::InvalidInput(format!("Invalid query engine name '{}'", s))),
        }
    }
}

/// Retrieval sizes for the built engines
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineSettings {
    pub similarity_top_k: usize,
    pub rerank_top_n: usize,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            similarity_top_k: 2,
            rerank_top_n: 2,
        }
    }
}

impl From<&AppConfig> for EngineSettings {
    fn from(config: &AppConfig) -> Self {
        Self {
            similarity_top_k: config.similarity_top_k,
            rerank_top_n: config.rerank_top_n,
        }
    }
}

/// Wires indices, selector and LLM into ready-to-query engines
pub struct QueryEngineFactory {
    registry: Arc<IndexRegistry>,
    selector: Arc<dyn Selector>,
    llm: Option<Arc<dyn LLMProvider>>,
    settings: EngineSettings,
}

impl QueryEngineFactory {
    pub fn new(registry: Arc<IndexRegistry>, selector: Arc<dyn Selector>) -> Self {
        Self {
            registry,
            selector,
            llm: None,
            settings: EngineSettings::default(),
        }
    }

    /// Use `llm` for answer synthesis and HyDE
    pub fn with_llm(mut self, llm: Arc<dyn LLMProvider>) -> Self {
        self.llm = Some(llm);
        self
    }

    pub fn with_settings(mut self, settings: EngineSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn registry(&self) -> &Arc<IndexRegistry> {
        &self.registry
    }

    pub fn create_query_engine(&self, name: EngineName) -> Result<Arc<dyn QueryEngine>> {
        let synthesizer = AnswerSynthesizer::new(self.llm.clone());

        let engine: Arc<dyn QueryEngine> = match name {
            EngineName::Syllabus => {
                let index = self.registry.get_or_build_index("syllabus", IndexKind::List)?;
                Arc::new(
                    ListQueryEngine::new(name.as_str(), index, synthesizer)
                        .with_top_n(self.settings.rerank_top_n),
                )
            }
            EngineName::Lectures => {
                let index = self.registry.get_or_build_index("lectures", IndexKind::Vector)?;
                let mut engine = VectorQueryEngine::new(
                    name.as_str(),
                    index,
                    self.registry.embedder(),
                    synthesizer,
                )?
                .with_top_k(self.settings.similarity_top_k);
                if let Some(llm) = &self.llm {
                    engine = engine.with_transform(HydeTransform::new(llm.clone()));
                }
                Arc::new(engine)
            }
            EngineName::Router => {
                let router = RouterQueryEngine::new(self.selector.clone())
                    .with_described_engine(
                        self.describe(EngineName::Syllabus, SYLLABUS_DESCRIPTION)?,
                        self.create_query_engine(EngineName::Syllabus)?,
                    )
                    .with_described_engine(
                        self.describe(EngineName::Lectures, LECTURES_DESCRIPTION)?,
                        self.create_query_engine(EngineName::Lectures)?,
                    );
                Arc::new(router)
            }
        };

        info!(engine = %name, llm = self.llm.is_some(), "Created query engine");
        Ok(engine)
    }

    /// Router choice for `name`, keyed by the vocabulary of its index
    fn describe(&self, name: EngineName, description: &str) -> Result<EngineDescription> {
        let mut keywords = BTreeSet::new();
        if let Some((collection, kind)) = name.collection() {
            let index = self.registry.get_or_build_index(collection, kind)?;
            for document in index.documents() {
                keywords.extend(tokenize(&document.text));
            }
        }
        Ok(EngineDescription::new(name.as_str(), description).with_keywords(keywords))
    }
}
