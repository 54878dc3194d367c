//! Query engine trait

use async_trait::async_trait;

use crate::{Result, RetrievalResult};

/// Answers a question from whatever index or engines it is bound to
#[async_trait]
pub trait QueryEngine: Send + Sync {
    async fn query(&self, question: &str) -> Result<RetrievalResult>;

    /// Short name used in logs and results
    fn name(&self) -> &str;
}
