//! Router query engine

use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, info};

use coursebot_core::{EngineDescription, Error, QueryEngine, Result, RetrievalResult, Selector};

struct RoutedEngine {
    description: EngineDescription,
    engine: Arc<dyn QueryEngine>,
}

/// Delegates each question to exactly one registered engine.
///
/// The injected [`Selector`] sees only the registered descriptions
/// and makes the choice; the router validates it, forwards the question
/// verbatim and returns the chosen engine's result unchanged. A failing
/// engine is not retried and no other engine is tried in its place.
pub struct RouterQueryEngine {
    selector: Arc<dyn Selector>,
    engines: Vec<RoutedEngine>,
}

impl RouterQueryEngine {
    pub fn new(selector: Arc<dyn Selector>) -> Self {
        Self {
            selector,
            engines: Vec::new(),
        }
    }

    /// Register `engine` under `name`; `description` is only used for selection
    pub fn register(
        &mut self,
        name: impl Into<String>,
        description: impl Into<String>,
        engine: Arc<dyn QueryEngine>,
    ) {
        self.register_described(EngineDescription::new(name, description), engine);
    }

    /// Register `engine` with a full description, keywords included
    pub fn register_described(&mut self, description: EngineDescription, engine: Arc<dyn QueryEngine>) {
        self.engines.push(RoutedEngine { description, engine });
    }

    pub fn with_engine(
        mut self,
        name: impl Into<String>,
        description: impl Into<String>,
        engine: Arc<dyn QueryEngine>,
    ) -> Self {
        self.register(name, description, engine);
        self
    }

    pub fn with_described_engine(mut self, description: EngineDescription, engine: Arc<dyn QueryEngine>) -> Self {
        self.register_described(description, engine);
        self
    }

    pub fn descriptions(&self) -> Vec<EngineDescription> {
        self.engines.iter().map(|e| e.description.clone()).collect()
    }
}

#[async_trait]
impl QueryEngine for RouterQueryEngine {
    async fn query(&self, question: &str) -> Result<RetrievalResult> {
        if self.engines.is_empty() {
            return Err(Error::SelectionAmbiguous("no engines registered".to_string()));
        }

        let choices = self.descriptions();
        debug!(choices = choices.len(), "Selecting engine");

        let selection = self
            .selector
            .select(question, &choices)
            .await?
            .ok_or_else(|| Error::SelectionAmbiguous("selector made no choice".to_string()))?;

        let routed = self.engines.get(selection.index).ok_or_else(|| {
            Error::SelectionAmbiguous(format!(
                "selector chose index {} but only {} engines are registered",
                selection.index,
                self.engines.len()
            ))
        })?;

        info!(
            engine = %routed.description.name,
            reason = %selection.reason,
            "Routing question"
        );

        routed.engine.query(question).await
    }

    fn name(&self) -> &str {
        "router"
    }
}
