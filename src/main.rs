use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::warn;
use tracing_subscriber::EnvFilter;

// Import from our modular crates
use coursebot_cli::{display_banner, handle_input_with_history, print_help, print_result};
use coursebot_core::{AppConfig, LLMProvider, QueryEngine, RetrievalResult, Selector};
use coursebot_openai::OpenAiClient;
use coursebot_pdf::{html_report, write_text_pdf, CitationRenderer, CitationView, PdfDirectoryReader};
use coursebot_rag::{
    EngineName, EngineSettings, HashEmbedder, IndexRegistry, KeywordSelector, LlmSingleSelector,
    QueryEngineFactory,
};

#[derive(Parser)]
#[command(name = "coursebot")]
#[command(about = "Ask questions about course materials and get answers cited to the source page", long_about = None)]
struct Cli {
    /// Course to load (defaults to COURSEBOT_COURSE)
    #[arg(long, global = true)]
    course: Option<String>,

    /// Directory holding all courses (defaults to COURSEBOT_COURSES_DIR)
    #[arg(long, global = true)]
    courses_dir: Option<PathBuf>,

    /// Skip the LLM: keyword routing and extractive answers
    #[arg(long, global = true)]
    offline: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Ask one question, or start an interactive session without one
    Ask {
        question: Option<String>,

        /// Engine to query: router, syllabus or lectures
        #[arg(short, long, default_value = "router")]
        engine: String,

        /// Write an HTML report with page previews to this file
        #[arg(long)]
        html: Option<PathBuf>,
    },
    /// Build and persist the indices of the course
    Index,
    /// Delete persisted indices so they are rebuilt on next use
    Invalidate {
        /// Collections to invalidate; all of them when omitted
        collections: Vec<String>,
    },
    /// Write a small sample course to try things out
    Demo {
        /// Overwrite existing sample files
        #[arg(long)]
        force: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut config = AppConfig::from_env()?;
    if let Some(course) = cli.course {
        config.course = course;
    }
    if let Some(dir) = cli.courses_dir {
        config.courses_dir = dir;
    }

    match cli.command {
        Some(Commands::Demo { force }) => seed_demo(&config.course_dir(), force),
        Some(Commands::Invalidate { collections }) => invalidate(&config, collections),
        Some(Commands::Index) => build_indices(&config, cli.offline).await,
        Some(Commands::Ask { question, engine, html }) => {
            let name: EngineName = engine.parse()?;
            let factory = build_factory(&config, cli.offline).await?;
            let engine = factory.create_query_engine(name)?;
            match question {
                Some(question) => ask_once(engine.as_ref(), &question, html.as_deref()).await,
                None => interactive(engine.as_ref(), &config.course, name).await,
            }
        }
        None => {
            let factory = build_factory(&config, cli.offline).await?;
            let engine = factory.create_query_engine(EngineName::Router)?;
            interactive(engine.as_ref(), &config.course, EngineName::Router).await
        }
    }
}

fn registry(config: &AppConfig) -> Arc<IndexRegistry> {
    Arc::new(IndexRegistry::new(
        config.course_dir(),
        Arc::new(PdfDirectoryReader::new()),
        Arc::new(HashEmbedder::new()),
    ))
}

/// Connect to the LLM unless running offline; fall back to offline on failure
async fn connect_llm(offline: bool) -> Option<Arc<dyn LLMProvider>> {
    if offline {
        return None;
    }

    let mut client = match OpenAiClient::from_env() {
        Ok(client) => client,
        Err(e) => {
            println!("{} {}. Continuing offline.", "⚠️".yellow(), e);
            return None;
        }
    };

    match client.connect().await {
        Ok(()) => {
            println!("{} Connected to {}", "✅".green(), client.model_id());
            Some(Arc::new(client))
        }
        Err(e) => {
            println!("{} LLM connection failed: {}. Continuing offline.", "⚠️".yellow(), e);
            None
        }
    }
}

async fn build_factory(config: &AppConfig, offline: bool) -> Result<QueryEngineFactory> {
    let llm = connect_llm(offline).await;

    let selector: Arc<dyn Selector> = match &llm {
        Some(llm) => Arc::new(LlmSingleSelector::new(llm.clone())),
        None => Arc::new(KeywordSelector::new()),
    };

    let mut factory = QueryEngineFactory::new(registry(config), selector)
        .with_settings(EngineSettings::from(config));
    if let Some(llm) = llm {
        factory = factory.with_llm(llm);
    }
    Ok(factory)
}

async fn ask_once(engine: &dyn QueryEngine, question: &str, html: Option<&Path>) -> Result<()> {
    let (result, views) = answer(engine, question).await?;
    print_result(&result, &views);

    if let Some(path) = html {
        write_report(path, question, &result, &views)?;
    }
    Ok(())
}

async fn answer(engine: &dyn QueryEngine, question: &str) -> Result<(RetrievalResult, Vec<CitationView>)> {
    let result = engine.query(question).await?;
    let views = CitationRenderer::new().render_all(&result);
    Ok((result, views))
}

fn write_report(path: &Path, question: &str, result: &RetrievalResult, views: &[CitationView]) -> Result<()> {
    fs::write(path, html_report(question, result, views))
        .with_context(|| format!("Failed to write report to {}", path.display()))?;
    println!("{} Report written to {}", "📝".cyan(), path.display());
    Ok(())
}

async fn interactive(engine: &dyn QueryEngine, course: &str, name: EngineName) -> Result<()> {
    display_banner(course, name.as_str());

    let mut history = Vec::new();
    let mut last: Option<(String, RetrievalResult, Vec<CitationView>)> = None;

    loop {
        let input = handle_input_with_history(&mut history).await?;

        if input.is_empty() {
            continue;
        }

        let input_lower = input.to_lowercase();

        // Handle special commands
        if input_lower == "exit" || input_lower == "quit" {
            println!("{}", "👋 Goodbye!".green());
            break;
        }

        if input_lower == "help" {
            print_help();
            continue;
        }

        if let Some(file) = input.strip_prefix("save ") {
            match &last {
                Some((question, result, views)) => {
                    if let Err(e) = write_report(Path::new(file.trim()), question, result, views) {
                        println!("{} {}", "❌".red(), e);
                    }
                }
                None => println!("{} Nothing to save yet", "⚠️".yellow()),
            }
            continue;
        }

        println!("{} Searching course materials...", "🔎".blue());

        match answer(engine, &input).await {
            Ok((result, views)) => {
                print_result(&result, &views);
                last = Some((input, result, views));
            }
            Err(e) => {
                println!("{} Query failed: {}", "❌".red(), e);
            }
        }
    }

    Ok(())
}

async fn build_indices(config: &AppConfig, offline: bool) -> Result<()> {
    let factory = build_factory(config, offline).await?;
    let registry = factory.registry();
    let mut failed = Vec::new();

    for name in EngineName::ALL {
        if let Some((collection, kind)) = name.collection() {
            match registry.get_or_build_index(collection, kind) {
                Ok(index) => println!(
                    "{} {} ({} index, {} documents)",
                    "✅".green(),
                    collection,
                    kind,
                    index.len()
                ),
                Err(e) => {
                    warn!(collection, error = %e, "Index build failed");
                    println!("{} {}: {}", "❌".red(), collection, e);
                    failed.push(collection);
                }
            }
        }
    }

    if failed.is_empty() {
        Ok(())
    } else {
        anyhow::bail!("Failed to build indices for: {}", failed.join(", "))
    }
}

fn invalidate(config: &AppConfig, collections: Vec<String>) -> Result<()> {
    let registry = registry(config);
    let collections = if collections.is_empty() {
        EngineName::ALL
            .iter()
            .filter_map(|name| name.collection())
            .map(|(collection, _)| collection.to_string())
            .collect()
    } else {
        collections
    };

    for collection in collections {
        if registry.invalidate(&collection)? {
            println!("{} Removed index for {}", "🗑️".yellow(), collection);
        } else {
            println!("{} No index for {}", "•".dimmed(), collection);
        }
    }
    Ok(())
}

const DEMO_SYLLABUS: [&str; 3] = [
    "ENST 100: Introduction to Environmental Science\n\
     Course information and learning objectives.\n\
     Required materials: lecture slides and the course textbook.",
    "Grading\n\
     Exams 40%, projects 30%, participation 30%.\n\
     Policies: late assignments lose 10% per day.\n\
     Academic integrity policies apply to all work.",
    "Schedule and dates\n\
     Week 5: midterm exam. Week 10: project due.\n\
     Week 15: final exam.",
];

const DEMO_LECTURE_ECOSYSTEMS: [&str; 2] = [
    "Lecture 1: Ecosystems\n\
     An ecosystem is a community of organisms and their physical environment.\n\
     Ecosystem ecology studies energy flow and nutrient cycling.",
    "Energy flow\n\
     Producers capture solar energy. Consumers obtain energy by eating.\n\
     About 10% of energy passes from one trophic level to the next.",
];

const DEMO_LECTURE_IMPACT: [&str; 2] = [
    "Lecture 2: Human impact\n\
     The I=PAT equation describes environmental impact.\n\
     Impact = Population x Affluence x Technology.",
    "Sustainability\n\
     Sustainable development meets present needs without\n\
     compromising the ability of future generations to meet theirs.",
];

fn seed_demo(course_dir: &Path, force: bool) -> Result<()> {
    let files: [(&str, &str, &[&str]); 3] = [
        ("syllabus", "syllabus.pdf", &DEMO_SYLLABUS),
        ("lectures", "lecture01_ecosystems.pdf", &DEMO_LECTURE_ECOSYSTEMS),
        ("lectures", "lecture02_human_impact.pdf", &DEMO_LECTURE_IMPACT),
    ];

    for (collection, file_name, pages) in files {
        let dir = course_dir.join(collection);
        fs::create_dir_all(&dir)?;
        let path = dir.join(file_name);

        if path.exists() && !force {
            println!("{} {} exists, skipping (use --force to overwrite)", "•".dimmed(), path.display());
            continue;
        }

        write_text_pdf(&path, pages)?;
        println!("{} Wrote {}", "📄".green(), path.display());
    }

    println!(
        "{} Sample course ready. Try: coursebot --course {} ask \"What are the grading policies?\"",
        "🎉".green(),
        course_dir
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_default()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_cli_parses_ask() {
        let cli = Cli::try_parse_from([
            "coursebot",
            "--course",
            "ENST100",
            "ask",
            "What are the grading policies?",
            "--engine",
            "syllabus",
        ])
        .unwrap();

        assert_eq!(cli.course.as_deref(), Some("ENST100"));
        match cli.command {
            Some(Commands::Ask { question, engine, html }) => {
                assert_eq!(question.as_deref(), Some("What are the grading policies?"));
                assert_eq!(engine, "syllabus");
                assert!(html.is_none());
            }
            _ => panic!("expected ask"),
        }
    }

    #[tokio::test]
    async fn test_index_reports_failed_collections() {
        let dir = tempdir().unwrap();
        let config = AppConfig {
            courses_dir: dir.path().to_path_buf(),
            ..Default::default()
        };
        let syllabus = config.course_dir().join("syllabus");
        fs::create_dir_all(&syllabus).unwrap();
        write_text_pdf(&syllabus.join("syllabus.pdf"), &DEMO_SYLLABUS).unwrap();

        let err = build_indices(&config, true).await.unwrap_err();
        assert_eq!(err.to_string(), "Failed to build indices for: lectures");
        assert!(config.indices_dir().join("syllabus").join("index.json").is_file());
    }

    #[tokio::test]
    async fn test_demo_course_answers_offline() {
        let dir = tempdir().unwrap();
        let config = AppConfig {
            courses_dir: dir.path().to_path_buf(),
            ..Default::default()
        };
        seed_demo(&config.course_dir(), false).unwrap();

        let factory = build_factory(&config, true).await.unwrap();
        let engine = factory.create_query_engine(EngineName::Router).unwrap();
        let (result, views) = answer(engine.as_ref(), "What are the grading policies?").await.unwrap();

        assert_eq!(result.engine, "syllabus");
        assert_eq!(views[0].metadata.file_name, "syllabus.pdf");
        assert_eq!(views[0].metadata.page_label, 2);
        assert!(views[0].has_preview());

        let report = dir.path().join("report.html");
        write_report(&report, "What are the grading policies?", &result, &views).unwrap();
        assert!(fs::read_to_string(&report).unwrap().contains("data:application/pdf;base64,"));
    }
}
