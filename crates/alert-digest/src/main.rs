use alert_digest::config::{Config, FeedsConfig, GmailAuth, GmailConfig};
use alert_digest::filter::{filter_acquisitions, DateRange};
use alert_digest::pipeline;
use alert_digest::report::render_json;
use alert_digest::sources::{self, FeedSource};
use alert_digest::summarizer::{self, OpenAiSummarizer, Summarizer};
use alert_types::{Notice, NoticeLevel};
use anyhow::{bail, Context, Result};
use chrono::{Duration, Local, NaiveDate};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

const DEFAULT_WINDOW_DAYS: i64 = 7;

#[derive(Parser)]
#[command(name = "alert-digest")]
#[command(about = "Fetch Google Alerts from Gmail or RSS feeds, filter them and summarize them")]
#[command(
    long_about = "Fetches Google Alert emails through the Gmail API, or Google Alert RSS/Atom feeds,\n\
    keeps the ones about acquisitions and mergers, groups them by industry and optionally\n\
    asks a language model for a short summary."
)]
struct Cli {
    /// Path to the TOML configuration file
    #[arg(
        short,
        long,
        default_value = "alert-digest.toml",
        env = "ALERT_DIGEST_CONFIG",
        global = true
    )]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch Google Alert emails from Gmail
    ///
    /// Authenticates with OAuth (opens a browser on first use) or a service
    /// account key, then lists the messages matching the search query.
    Gmail {
        /// Gmail search query; defaults to the configured one
        #[arg(short, long)]
        query: Option<String>,

        /// Credential kind; defaults to the configured one
        #[arg(long, value_enum)]
        auth: Option<AuthArg>,

        /// OAuth client secret or service account key JSON
        #[arg(long, value_name = "PATH")]
        credentials: Option<PathBuf>,

        /// Only keep alerts mentioning an acquisition or merger
        #[arg(long)]
        acquisitions_only: bool,

        /// Summarize the fetched alerts with the language model
        #[arg(short, long)]
        summarize: bool,
    },

    /// Fetch RSS/Atom feeds and render the categorized report
    Feeds {
        /// Feed URL; repeat for several. Replaces the configured list.
        #[arg(short, long = "url", value_name = "URL")]
        urls: Vec<String>,

        /// First day to include (YYYY-MM-DD); defaults to a week before --end
        #[arg(long)]
        start: Option<NaiveDate>,

        /// Last day to include (YYYY-MM-DD); defaults to today
        #[arg(long)]
        end: Option<NaiveDate>,

        /// Summarize the filtered alerts with the language model
        #[arg(short, long)]
        summarize: bool,

        #[arg(long, value_enum, default_value_t = OutputFormat::Markdown)]
        format: OutputFormat,

        /// Write the report to a file instead of stdout
        #[arg(short, long, value_name = "PATH")]
        output: Option<PathBuf>,
    },

    /// Print an example configuration file
    ExampleConfig,
}

#[derive(Clone, Copy, ValueEnum)]
enum AuthArg {
    Oauth,
    ServiceAccount,
}

impl From<AuthArg> for GmailAuth {
    fn from(arg: AuthArg) -> Self {
        match arg {
            AuthArg::Oauth => GmailAuth::OAuth,
            AuthArg::ServiceAccount => GmailAuth::ServiceAccount,
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Markdown,
    Json,
}

fn render_notices(notices: &[Notice]) {
    for notice in notices {
        match notice.level {
            NoticeLevel::Success => eprintln!("✓ {}", notice.message),
            NoticeLevel::Error => eprintln!("✗ {}", notice.message),
        }
    }
}

fn resolve_range(start: Option<NaiveDate>, end: Option<NaiveDate>) -> Result<DateRange> {
    let end = end.unwrap_or_else(|| Local::now().date_naive());
    let start = start.unwrap_or(end - Duration::days(DEFAULT_WINDOW_DAYS));
    if start > end {
        bail!("Start date {} is after end date {}", start, end);
    }
    Ok(DateRange::new(start, end))
}

async fn handle_gmail(
    config: &Config,
    query: Option<String>,
    auth: Option<AuthArg>,
    credentials: Option<PathBuf>,
    acquisitions_only: bool,
    summarize: bool,
) -> Result<()> {
    let mut gmail: GmailConfig = match (config.gmail.clone(), credentials.as_ref()) {
        (Some(gmail), _) => gmail,
        (None, Some(path)) => GmailConfig {
            auth: GmailAuth::OAuth,
            credentials_path: path.display().to_string(),
            token_cache_path: "gmail_token_cache.json".to_string(),
            subject: None,
            query: alert_digest::config::default_query(),
        },
        (None, None) => bail!("No [gmail] section in the config file and no --credentials given"),
    };
    if let Some(path) = credentials {
        gmail.credentials_path = path.display().to_string();
    }
    if let Some(auth) = auth {
        gmail.auth = auth.into();
    }
    if let Some(query) = query {
        gmail.query = query;
    }

    let authenticated = sources::authenticate(&gmail).await;
    render_notices(&authenticated.notices);
    let Some(client) = authenticated.value else {
        return Ok(());
    };

    let source = sources::GmailSource::new(client, gmail.query.clone());
    let fetched = pipeline::fetch(&source).await;
    render_notices(&fetched.notices);

    let alerts = if acquisitions_only {
        filter_acquisitions(&fetched.value)
    } else {
        fetched.value
    };

    if alerts.is_empty() {
        println!("No alerts found.");
        return Ok(());
    }

    println!("Fetched Alerts:");
    for alert in &alerts {
        println!("- {}", alert.summary);
    }

    if summarize {
        let summary = pipeline::summarize_with_config(&config.summarizer, &alerts).await;
        render_notices(&summary.notices);
        if !summary.value.is_empty() {
            println!("\n{}", summary.value);
        }
    }

    Ok(())
}

async fn handle_feeds(
    config: &Config,
    urls: Vec<String>,
    range: DateRange,
    summarize: bool,
    format: OutputFormat,
    output: Option<PathBuf>,
) -> Result<()> {
    let feeds = FeedsConfig {
        urls: if urls.is_empty() {
            config.feeds.urls.clone()
        } else {
            urls
        },
        ..config.feeds.clone()
    };
    if feeds.urls.is_empty() {
        bail!("No feed URLs given; pass --url or list them under [feeds] in the config file");
    }

    let source = FeedSource::from_config(&feeds)?;

    let summarizer: Option<OpenAiSummarizer> = if summarize {
        let setup = summarizer::client_from_config(&config.summarizer);
        render_notices(&setup.notices);
        setup.value
    } else {
        None
    };

    let today = Local::now().date_naive();
    let run = pipeline::run_feeds(
        &source,
        range,
        today,
        summarizer.as_ref().map(|s| s as &dyn Summarizer),
    )
    .await;
    render_notices(&run.notices);

    let (digest, summary) = run.value;
    let rendered = match format {
        OutputFormat::Markdown if summary.is_empty() => digest.report,
        OutputFormat::Markdown => format!("{}\n{}\n", digest.report, summary),
        OutputFormat::Json => render_json(&digest.buckets, today, &summary)?,
    };

    match output {
        Some(path) => {
            std::fs::write(&path, &rendered)
                .with_context(|| format!("Failed to write report to {}", path.display()))?;
            eprintln!("✓ Report written to {}", path.display());
        }
        None => print!("{}", rendered),
    }

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    rustls::crypto::ring::default_provider()
        .install_default()
        .map_err(|_| anyhow::anyhow!("Failed to install crypto provider"))?;
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    match cli.command {
        Commands::ExampleConfig => {
            print!("{}", Config::example_toml()?);
        }
        Commands::Gmail {
            query,
            auth,
            credentials,
            acquisitions_only,
            summarize,
        } => {
            let config = Config::load_or_default(&cli.config)?;
            handle_gmail(&config, query, auth, credentials, acquisitions_only, summarize).await?;
        }
        Commands::Feeds {
            urls,
            start,
            end,
            summarize,
            format,
            output,
        } => {
            let range = resolve_range(start, end)?;
            let config = Config::load_or_default(&cli.config)?;
            handle_feeds(&config, urls, range, summarize, format, output).await?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses_feeds_command() {
        let cli = Cli::try_parse_from([
            "alert-digest",
            "feeds",
            "--url",
            "https://a.test/rss",
            "--url",
            "https://b.test/rss",
            "--start",
            "2024-03-01",
            "--end",
            "2024-03-31",
            "--format",
            "json",
        ])
        .unwrap();

        match cli.command {
            Commands::Feeds {
                urls,
                start,
                end,
                format,
                summarize,
                ..
            } => {
                assert_eq!(urls, vec!["https://a.test/rss", "https://b.test/rss"]);
                assert_eq!(start, NaiveDate::from_ymd_opt(2024, 3, 1));
                assert_eq!(end, NaiveDate::from_ymd_opt(2024, 3, 31));
                assert!(format == OutputFormat::Json);
                assert!(!summarize);
            }
            _ => panic!("expected feeds command"),
        }
    }

    #[test]
    fn test_default_range_is_one_week() {
        let end = NaiveDate::from_ymd_opt(2024, 3, 31).unwrap();
        let range = resolve_range(None, Some(end)).unwrap();
        assert_eq!(range.start, NaiveDate::from_ymd_opt(2024, 3, 24).unwrap());
        assert_eq!(range.end, end);
    }

    #[test]
    fn test_inverted_range_rejected() {
        let start = NaiveDate::from_ymd_opt(2024, 4, 1);
        let end = NaiveDate::from_ymd_opt(2024, 3, 1);
        assert!(resolve_range(start, end).is_err());
    }
}
