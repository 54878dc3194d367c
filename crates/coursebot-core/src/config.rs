//! Application configuration loaded from the environment

use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;

use crate::{Error, Result};

/// Where course material lives and how much to retrieve
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub courses_dir: PathBuf,
    pub course: String,
    pub similarity_top_k: usize,
    pub rerank_top_n: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            courses_dir: PathBuf::from("courses"),
            course: "ENST100".to_string(),
            similarity_top_k: 2,
            rerank_top_n: 2,
        }
    }
}

impl AppConfig {
    /// Create configuration from environment variables, falling back to defaults
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        let defaults = Self::default();

        let courses_dir = env::var("COURSEBOT_COURSES_DIR")
            .map(PathBuf::from)
            .unwrap_or(defaults.courses_dir);

        let course = env::var("COURSEBOT_COURSE").unwrap_or(defaults.course);

        let similarity_top_k = parse_count("COURSEBOT_SIMILARITY_TOP_K", env::var("COURSEBOT_SIMILARITY_TOP_K").ok())?
            .unwrap_or(defaults.similarity_top_k);

        let rerank_top_n = parse_count("COURSEBOT_RERANK_TOP_N", env::var("COURSEBOT_RERANK_TOP_N").ok())?
            .unwrap_or(defaults.rerank_top_n);

        Ok(Self {
            courses_dir,
            course,
            similarity_top_k,
            rerank_top_n,
        })
    }

    /// Root directory of the selected course
    pub fn course_dir(&self) -> PathBuf {
        self.courses_dir.join(&self.course)
    }

    /// Directory holding the persisted indices of the selected course
    pub fn indices_dir(&self) -> PathBuf {
        self.course_dir().join("indices")
    }
}

fn parse_count(key: &str, value: Option<String>) -> Result<Option<usize>> {
    match value {
        None => Ok(None),
        Some(raw) => match raw.trim().parse::<usize>() {
            Ok(0) | Err(_) => Err(Error::Configuration(format!(
                "{} must be a positive integer, got '{}'",
                key, raw
            ))),
            Ok(n) => Ok(Some(n)),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_count() {
        assert_eq!(parse_count("K", None).unwrap(), None);
        assert_eq!(parse_count("K", Some("3".to_string())).unwrap(), Some(3));
        assert!(matches!(parse_count("K", Some("0".to_string())), Err(Error::Configuration(_))));
        assert!(matches!(parse_count("K", Some("two".to_string())), Err(Error::Configuration(_))));
    }

    #[test]
    fn test_course_paths() {
        let config = AppConfig {
            courses_dir: PathBuf::from("/data/courses"),
            course: "ENST100".to_string(),
            ..Default::default()
        };
        assert_eq!(config.course_dir(), PathBuf::from("/data/courses/ENST100"));
        assert_eq!(config.indices_dir(), PathBuf::from("/data/courses/ENST100/indices"));
    }
}
