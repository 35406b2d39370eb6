use std::io::{self, BufRead, BufWriter, Write};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use tracing::info;

use hotwords::aggregate::cooccurrence::CooccurrenceJob;
use hotwords::aggregate::frequency::FrequencyJob;
use hotwords::aggregate::time_bucket::TimeBucketJob;
use hotwords::config::Config;
use hotwords::fetch::snapshot::fetch_and_save;
use hotwords::fetch::weibo::WeiboHotSearch;
use hotwords::mapreduce::runner::LocalRunner;
use hotwords::mapreduce::stream::{map_stream, reduce_stream};
use hotwords::mapreduce::Job;
use hotwords::output::terminal;
use hotwords::pipeline::stages::{run_all, segment_lines, RunContext};
use hotwords::pipeline::title::TitlePipeline;
use hotwords::records::write_lines;
use hotwords::report::DashboardSnapshot;
use hotwords::text::lexicon::Lexicon;
use hotwords::text::phrase::ScoreWeights;
use hotwords::text::tagger::Tagger;

/// Hotwords: keyword analytics for the Weibo hot-search list.
///
/// Fetches the live list, segments titles into keywords, and aggregates
/// weighted frequency, co-occurrence and hourly distribution.
#[derive(Parser)]
#[command(name = "hotwords", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch the live hot-search list into the data directory
    Fetch,

    /// Segment `rank,title` lines from stdin into `rank,tokens` on stdout
    Segment,

    /// Run a job's mapper over stdin (Hadoop streaming compatible)
    Map {
        #[arg(value_enum)]
        job: JobKind,
    },

    /// Run a job's reducer over key-sorted stdin (Hadoop streaming compatible)
    Reduce {
        #[arg(value_enum)]
        job: JobKind,
    },

    /// Run the whole pipeline locally over the data directory
    Run {
        /// Number of input shards (default: 4)
        #[arg(long, default_value = "4")]
        shards: usize,

        /// Number of shards mapped in parallel (default: 4)
        #[arg(long, default_value = "4")]
        concurrency: usize,
    },

    /// Show the report built from the latest artifacts
    Report {
        /// Print the dashboard snapshot as JSON instead
        #[arg(long)]
        json: bool,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum JobKind {
    Frequency,
    Cooccurrence,
    Time,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if missing)
    let _ = dotenvy::dotenv();

    // Set up structured logging. stderr only: the streaming commands own stdout.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("hotwords=info")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let config = Config::load()?;

    match cli.command {
        Commands::Fetch => {
            let paths = config.paths();
            let source = WeiboHotSearch::new(&config.hot_api_url)?;
            println!("Fetching the Weibo hot-search list...");
            let files = fetch_and_save(&source, &paths, config.clock()?).await?;
            println!(
                "Saved {} titles -> {}",
                files.count.to_string().bold(),
                files.raw.display()
            );
            println!("  history: {}", files.history_text.display());
            println!("  json:    {}", files.history_json.display());
        }

        Commands::Segment => {
            let lexicon = Arc::new(config.lexicon()?);
            let pipeline = TitlePipeline::new(lexicon, build_tagger(&config)?, ScoreWeights::default())?;
            let lines: Vec<String> = io::stdin()
                .lock()
                .lines()
                .collect::<io::Result<_>>()
                .context("Failed to read stdin")?;

            let (records, stats) = segment_lines(&pipeline, &lines)?;
            let mut out = BufWriter::new(io::stdout().lock());
            for record in &records {
                writeln!(out, "{record}").context("Failed to write stdout")?;
            }
            out.flush().context("Failed to flush stdout")?;
            stats.log_summary("segment");
        }

        Commands::Map { job } => {
            let job = build_job(job, &config)?;
            let stats = map_stream(
                job.as_ref(),
                io::stdin().lock(),
                BufWriter::new(io::stdout().lock()),
            )?;
            stats.log_summary(job.name());
        }

        Commands::Reduce { job } => {
            let job = build_job(job, &config)?;
            let stats = reduce_stream(
                job.as_ref(),
                io::stdin().lock(),
                BufWriter::new(io::stdout().lock()),
            )?;
            stats.log_summary(job.name());
        }

        Commands::Run {
            shards,
            concurrency,
        } => {
            let paths = config.paths();
            config.require_data_dir()?;

            let lexicon = Arc::new(config.lexicon()?);
            let ctx = RunContext {
                pipeline: TitlePipeline::new(
                    Arc::clone(&lexicon),
                    build_tagger(&config)?,
                    ScoreWeights::default(),
                )?,
                lexicon,
                clock: config.clock()?,
                frequency: config.frequency_params(),
            };
            let runner = LocalRunner {
                shards,
                concurrency,
                progress: true,
            };

            info!(data_dir = %config.data_dir.display(), shards, concurrency, "Starting local run");
            let summary = run_all(&ctx, &runner, &paths).await?;

            println!("\n{}", "=== Run Summary ===".bold());
            terminal::display_stage_stats("segment", &summary.segment);
            terminal::display_stage_stats("frequency", &summary.frequency.stats);
            terminal::display_stage_stats("cooccurrence", &summary.cooccurrence.stats);
            match &summary.time {
                Some(time) => terminal::display_stage_stats("time", &time.stats),
                None => println!("  {:<14} {}", "time".bold(), "skipped (no history)".dimmed()),
            }
            println!();
            println!("  Keywords:     {}", summary.frequency.rows.len());
            println!("  Pairs:        {}", summary.cooccurrence.rows.len());
            println!(
                "\n{}",
                "Run `hotwords report` to see the results.".dimmed()
            );
        }

        Commands::Report { json } => {
            let paths = config.paths();
            config.require_data_dir()?;
            let snapshot = DashboardSnapshot::load(&paths)?;
            if json {
                let body = serde_json::to_string_pretty(&snapshot)
                    .context("Failed to serialize dashboard snapshot")?;
                println!("{body}");
                write_lines(&paths.dashboard, &[body])?;
            } else {
                terminal::display_snapshot(&snapshot);
            }
        }
    }

    Ok(())
}

/// The part-of-speech tagger for this build.
fn build_tagger(config: &Config) -> Result<Arc<dyn Tagger>> {
    #[cfg(feature = "jieba")]
    {
        let tagger = hotwords::text::tagger::JiebaTagger::new(config.user_dict.as_deref())?;
        Ok(Arc::new(tagger))
    }
    #[cfg(not(feature = "jieba"))]
    {
        if config.user_dict.is_some() {
            tracing::warn!("HOTWORDS_USER_DICT is set but this build has no jieba support; ignoring");
        }
        Ok(Arc::new(hotwords::text::tagger::WhitespaceTagger))
    }
}

fn build_job(kind: JobKind, config: &Config) -> Result<Box<dyn Job>> {
    Ok(match kind {
        JobKind::Frequency => {
            let lexicon: Arc<Lexicon> = Arc::new(config.lexicon()?);
            Box::new(FrequencyJob::new(lexicon, config.frequency_params()))
        }
        JobKind::Cooccurrence => Box::new(CooccurrenceJob),
        JobKind::Time => Box::new(TimeBucketJob::new(config.clock()?)),
    })
}
