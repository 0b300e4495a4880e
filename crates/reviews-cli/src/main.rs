use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use insights::{analyze, filter_by_rating, AnalyzeOptions, ISSUE_STARS};
use review_core::{normalize_batch, AppInfo};
use review_source::{fetch_app_or_placeholder, fetch_reviews, FetchQuery, HttpReviewSource, Locale, MemorySource, ReviewSource, SortMode};
use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;
use std::time::Duration;
use text_features::{extract_phrases, PhraseOptions, Tokenizer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// reviews – app-store review analytics.
/// Commands:
///   - analyze --input dump.json      (or a JSON dump on STDIN)
///   - fetch --app-id com.example     (live fetch from a scraper endpoint, then analyze)
///   - phrases (debug): top phrases for a star range
#[derive(Parser, Debug)]
#[command(name = "reviews", version, about = "Phrase, theme and period analytics for app reviews")]
struct Cli {
    /// Write the JSON result here instead of STDOUT
    #[arg(long, global = true)]
    out: Option<PathBuf>,

    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Analyze a saved batch (`[{...}]` or `{"app": {...}, "reviews": [...]}`)
    Analyze {
        /// Dump file; read from STDIN when missing
        #[arg(long)]
        input: Option<PathBuf>,
        #[arg(long, default_value = "com.example.app")]
        app_id: String,
        #[command(flatten)]
        analysis: AnalysisArgs,
    },

    /// Fetch reviews for an app and analyze them
    Fetch {
        #[arg(long)]
        app_id: String,
        /// Scraper endpoint serving /apps/{id} and /apps/{id}/reviews
        #[arg(long, env = "REVIEWS_ENDPOINT", default_value = "http://127.0.0.1:3000")]
        endpoint: String,
        #[arg(long, default_value_t = 200)]
        count: usize,
        /// relevance|newest|rating or 1|2|3
        #[arg(long, default_value = "newest")]
        sort: SortMode,
        #[arg(long, default_value = "en")]
        lang: String,
        #[arg(long, default_value = "in")]
        country: String,
        #[command(flatten)]
        analysis: AnalysisArgs,
    },

    /// (Debug) Top phrases for reviews with the given stars
    Phrases {
        #[arg(long)]
        input: Option<PathBuf>,
        #[arg(long, value_delimiter = ',', default_value = "1,2")]
        stars: Vec<u8>,
        #[arg(long, default_value_t = 10)]
        top_n: usize,
        #[arg(long, default_value_t = 1)]
        min_support: usize,
    },
}

#[derive(clap::Args, Debug)]
struct AnalysisArgs {
    #[arg(long, default_value_t = 10)]
    top_n: usize,
    /// Drop phrases seen fewer times than this
    #[arg(long, default_value_t = 1)]
    min_support: usize,
    /// 0 = all, 1-5 = only that star rating
    #[arg(long, default_value_t = 0)]
    rating: u8,
}

impl AnalysisArgs {
    fn options(&self) -> AnalyzeOptions {
        AnalyzeOptions { top_n: self.top_n, min_phrase_support: self.min_support, ..AnalyzeOptions::default() }
    }
}

fn write_output(out: Option<&PathBuf>, value: &serde_json::Value) -> Result<()> {
    let pretty = serde_json::to_string_pretty(value)?;
    match out {
        Some(p) => {
            if let Some(dir) = p.parent().filter(|d| !d.as_os_str().is_empty()) {
                fs::create_dir_all(dir).with_context(|| format!("failed creating {}", dir.display()))?;
            }
            fs::write(p, pretty).with_context(|| format!("failed writing {}", p.display()))?;
            eprintln!("✓ wrote {}", p.display());
        }
        None => println!("{}", pretty),
    }
    Ok(())
}

fn read_stdin_string() -> Result<String> {
    let mut buf = String::new();
    io::stdin().read_to_string(&mut buf).context("failed reading STDIN")?;
    Ok(buf)
}

fn load_dump(input: Option<&PathBuf>) -> Result<MemorySource> {
    let source = match input {
        Some(p) => MemorySource::from_json_file(p)
            .with_context(|| format!("failed reading review dump: {}", p.display()))?,
        None => MemorySource::from_json_str(&read_stdin_string()?).context("STDIN is not a review dump")?,
    };
    Ok(source)
}

async fn fetch_and_analyze<S: ReviewSource>(
    source: &S,
    app_id: &str,
    query: FetchQuery,
    analysis: &AnalysisArgs,
) -> Result<serde_json::Value> {
    let info: AppInfo = fetch_app_or_placeholder(source, app_id, &query.locale).await;
    let raw = fetch_reviews(source, &query)
        .await
        .with_context(|| format!("failed fetching reviews for {}", app_id))?;
    let reviews = filter_by_rating(normalize_batch(raw), analysis.rating);
    if reviews.is_empty() {
        anyhow::bail!("No reviews found for {}", app_id);
    }
    let result = analyze(app_id, &info, reviews, &analysis.options());
    Ok(serde_json::to_value(result)?)
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")))
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let cli = Cli::parse();

    match cli.cmd {
        Commands::Analyze { input, app_id, analysis } => {
            let source = load_dump(input.as_ref())?;
            let query = FetchQuery::new(app_id.clone(), source.len());
            let value = fetch_and_analyze(&source, &app_id, query, &analysis).await?;
            write_output(cli.out.as_ref(), &value)?;
        }

        Commands::Fetch { app_id, endpoint, count, sort, lang, country, analysis } => {
            tracing::debug!("fetching {} reviews for {} from {}", count, app_id, endpoint);
            let source = HttpReviewSource::new(&endpoint, Duration::from_secs(30))?;
            let mut query = FetchQuery::new(app_id.clone(), count);
            query.sort = sort;
            query.locale = Locale { lang, country };
            let value = fetch_and_analyze(&source, &app_id, query, &analysis).await?;
            write_output(cli.out.as_ref(), &value)?;
        }

        // ----- DEBUG ROUTES -----
        Commands::Phrases { input, stars, top_n, min_support } => {
            let source = load_dump(input.as_ref())?;
            let raw = fetch_reviews(&source, &FetchQuery::new("dump", source.len())).await?;
            let reviews = normalize_batch(raw);
            let stars = if stars.is_empty() { ISSUE_STARS.to_vec() } else { stars };
            let opts = PhraseOptions { top_n, min_support, ..PhraseOptions::default() };
            let phrases = extract_phrases(&reviews, &stars, &Tokenizer::new(), &opts);
            write_output(cli.out.as_ref(), &serde_json::json!({ "stars": stars, "phrases": phrases }))?;
        }
    }

    Ok(())
}
