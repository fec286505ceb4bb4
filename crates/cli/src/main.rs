#![deny(warnings)]

use anyhow::Context;
use clap::{ArgGroup, Parser, Subcommand};
use mood_doorbell_core::capture::{FileCapture, PayloadKind};
use mood_doorbell_core::classify::RemoteClassifier;
use mood_doorbell_core::config::{
    resolve_api_key, resolve_string_with_default, AppConfig, ClassifierConfig, ClassifierEndpoint,
    Env, FailurePolicy, HistoryCapacity, RequestTimeout, StdEnv, DEFAULT_CLASSIFIER_URL,
    DEFAULT_HISTORY_CAPACITY, DEFAULT_RETRY_ATTEMPTS, DEFAULT_RING_COOLDOWN_SECS,
    DEFAULT_TIMEOUT_MS, ENV_CLASSIFIER_TOKEN, ENV_CLASSIFIER_URL,
};
use mood_doorbell_core::doorbell::{Doorbell, DoorbellConfig, DoorbellEvent};
use mood_doorbell_core::mood::{resolve, ExpressionScores, MoodResult};
use mood_doorbell_core::presentation::{format_confidence, headline, reaction_for, REACTIONS};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "mood-doorbell")]
#[command(about = "Ring the doorbell, detect a mood, get a terrible song")]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Base URL of the mood-detection service
    #[arg(long, global = true, env = ENV_CLASSIFIER_URL)]
    classifier_url: Option<String>,

    /// Bearer token for the mood-detection service, also read from MOOD_CLASSIFIER_TOKEN
    #[arg(long, global = true)]
    classifier_token: Option<String>,

    #[arg(long, global = true, default_value_t = DEFAULT_TIMEOUT_MS)]
    timeout_ms: u64,

    #[arg(long, global = true, default_value_t = DEFAULT_RETRY_ATTEMPTS)]
    retries: u32,

    #[arg(long, global = true, default_value_t = DEFAULT_HISTORY_CAPACITY)]
    history_capacity: usize,

    #[arg(long, global = true, default_value_t = DEFAULT_RING_COOLDOWN_SECS)]
    ring_cooldown_secs: u64,

    #[arg(long, global = true)]
    mute: bool,

    /// Report classifier failures instead of falling back to "no mood"
    #[arg(long, global = true)]
    surface_classifier_errors: bool,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    #[arg(long, global = true, default_value = "info")]
    log_level: String,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Ring once with a photo
    Image { path: PathBuf },
    /// Ring once with a voice clip
    Voice { path: PathBuf },
    /// Resolve expression scores given as a JSON object, without a classifier
    #[command(group(
        ArgGroup::new("input")
            .required(true)
            .multiple(false)
            .args(["scores", "file"])
    ))]
    Resolve {
        #[arg(long)]
        scores: Option<String>,
        #[arg(long)]
        file: Option<PathBuf>,
    },
    /// Ring once per capture path read from stdin, then print the history
    Session,
    /// List the reaction for every mood
    Reactions,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_tracing(&args.log_level)?;

    let json = args.json;
    let env = StdEnv;

    match args.command {
        Command::Image { ref path } => {
            let capture = open_capture(path, PayloadKind::Image)?;
            let bell = build_doorbell(&build_config(&args, &env)?)?;
            let event = bell.ring(&capture).await?;
            print_event(&event, json)?;
        }
        Command::Voice { ref path } => {
            let capture = open_capture(path, PayloadKind::Audio)?;
            let bell = build_doorbell(&build_config(&args, &env)?)?;
            let event = bell.ring(&capture).await?;
            print_event(&event, json)?;
        }
        Command::Resolve {
            ref scores,
            ref file,
        } => {
            let raw = match (scores, file) {
                (Some(inline), _) => inline.clone(),
                (None, Some(path)) => tokio::fs::read_to_string(path)
                    .await
                    .with_context(|| format!("reading scores from {}", path.display()))?,
                (None, None) => anyhow::bail!("one of --scores or --file must be provided"),
            };
            let scores: ExpressionScores =
                serde_json::from_str(&raw).context("scores must be a JSON object of numbers")?;
            print_result(&resolve(&scores), json)?;
        }
        Command::Session => {
            let bell = build_doorbell(&build_config(&args, &env)?)?;
            run_session(&bell, json).await?;
        }
        Command::Reactions => {
            if json {
                println!("{}", serde_json::to_string_pretty(&REACTIONS)?);
            } else {
                for r in REACTIONS.iter() {
                    println!(
                        "{} {:<8} {} [{}] {} -> {}",
                        r.emoji, r.label, r.sound_name, r.sound_asset, r.gradient.from, r.gradient.to
                    );
                }
            }
        }
    }

    Ok(())
}

fn open_capture(path: &Path, expected: PayloadKind) -> anyhow::Result<FileCapture> {
    let capture = FileCapture::open(path)?;
    if capture.kind() != expected {
        anyhow::bail!(
            "{} looks like {:?} data, expected {:?}",
            path.display(),
            capture.kind(),
            expected
        );
    }
    Ok(capture)
}

fn build_doorbell(cfg: &AppConfig) -> anyhow::Result<Doorbell<RemoteClassifier>> {
    tracing::info!(
        classifier = %cfg.classifier.endpoint.url(),
        timeout_ms = cfg.classifier.timeout.millis,
        retries = cfg.classifier.retry_attempts,
        "config loaded"
    );
    let classifier = RemoteClassifier::new(&cfg.classifier)?;
    Ok(Doorbell::new(classifier, DoorbellConfig::from_app(cfg)))
}

async fn run_session(bell: &Doorbell<RemoteClassifier>, json: bool) -> anyhow::Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    while let Some(line) = lines.next_line().await? {
        let path = line.trim();
        if path.is_empty() {
            continue;
        }

        let capture = match FileCapture::open(path) {
            Ok(capture) => capture,
            Err(e) => {
                tracing::warn!(path, error = %e, "skipping capture");
                continue;
            }
        };
        match bell.ring(&capture).await {
            Ok(event) => print_event(&event, json)?,
            Err(e) => tracing::warn!(path, error = %e, "ring failed"),
        }
    }

    let history = bell.history().await;
    let stats = bell.stats().await;
    if json {
        let summary = serde_json::json!({ "history": history, "stats": stats });
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    println!("history:");
    if history.is_empty() {
        println!("  no mood history yet");
    }
    for entry in &history {
        let ago = entry.observed_at.elapsed().unwrap_or_default().as_secs();
        println!("  {} {:<8} {ago}s ago", reaction_for(entry.label).emoji, entry.label);
    }
    println!("stats:");
    for share in &stats.shares {
        println!(
            "  {} {:<8} {:>3} ({})",
            reaction_for(share.label).emoji,
            share.label,
            share.count,
            format_confidence(share.share)
        );
    }
    Ok(())
}

fn print_event(event: &DoorbellEvent, json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(event)?);
        return Ok(());
    }

    println!(
        "{} {} ({})",
        event.reaction.emoji, event.headline, event.confidence_text
    );
    println!("  {}", event.reaction.caption);
    match event.sound {
        Some(asset) => println!("  playing {} [{asset}]", event.reaction.sound_name),
        None => println!("  (muted)"),
    }
    if let Some(insult) = event.insult {
        println!("  {insult}");
    }
    println!("  rings: {}", event.ring_count);
    Ok(())
}

fn print_result(result: &MoodResult, json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(result)?);
        return Ok(());
    }

    let reaction = reaction_for(result.label);
    println!(
        "{} {} ({})",
        reaction.emoji,
        headline(result.label),
        format_confidence(result.confidence)
    );
    if !result.signal_present {
        println!("  no expression signal");
    }
    Ok(())
}

fn init_tracing(level: &str) -> anyhow::Result<()> {
    let filter = EnvFilter::builder()
        .with_default_directive(
            level
                .parse()
                .with_context(|| format!("invalid --log-level: {level}"))?,
        )
        .from_env_lossy();

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
    Ok(())
}

fn build_config(args: &Args, env: &impl Env) -> anyhow::Result<AppConfig> {
    let url = resolve_string_with_default(
        args.classifier_url.clone(),
        ENV_CLASSIFIER_URL,
        env,
        DEFAULT_CLASSIFIER_URL,
    );

    let classifier = ClassifierConfig {
        endpoint: ClassifierEndpoint::new(&url)?,
        api_key: resolve_api_key(args.classifier_token.clone(), ENV_CLASSIFIER_TOKEN, env)?,
        timeout: RequestTimeout::new(args.timeout_ms)?,
        retry_attempts: args.retries,
    };

    let failure_policy = if args.surface_classifier_errors {
        FailurePolicy::Surface
    } else {
        FailurePolicy::NoSignal
    };

    Ok(AppConfig {
        classifier,
        history_capacity: HistoryCapacity::new(args.history_capacity)?,
        ring_cooldown: Duration::from_secs(args.ring_cooldown_secs),
        failure_policy,
        muted: args.mute,
    })
}
