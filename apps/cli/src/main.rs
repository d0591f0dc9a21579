use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use clap::{Parser, Subcommand, ValueEnum};
use console::{Color, style};
use tokio::fs;
use tracing::warn;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use notepilot_core::{
    Category, Config, ExportArtifact, ExportFormat, HighlightPayload, Outcome, Session,
    format_timestamp, get_config_path, load_config, tree,
};

use crate::script::parse_script;

mod script;

/// CLI wrapper for ExportFormat (needed for clap ValueEnum)
#[derive(Clone, Copy, ValueEnum)]
enum CliExportFormat {
    Md,
    Docx,
}

impl From<CliExportFormat> for ExportFormat {
    fn from(cli: CliExportFormat) -> Self {
        match cli {
            CliExportFormat::Md => ExportFormat::Markdown,
            CliExportFormat::Docx => ExportFormat::Document,
        }
    }
}

#[derive(Parser)]
#[command(name = "notepilot")]
#[command(about = "Build hierarchical outlines from video highlights and export them as notes")]
struct Cli {
    /// Configuration file. Defaults to <config dir>/notepilot/config.json
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log debug diagnostics to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Show the configuration summary and its videos
    Info,

    /// List the highlights available at a playback position
    Highlights {
        /// Video id. Defaults to the first video of the configuration.
        #[arg(long)]
        video: Option<String>,

        /// Playback position in seconds
        #[arg(short, long, default_value_t = 0.0)]
        at: f64,
    },

    /// Replay a JSON-lines event script and print the resulting outline
    Run {
        /// Script with one session event per line
        script: PathBuf,

        /// Export the final outline in this format
        #[arg(short, long)]
        export: Option<CliExportFormat>,

        /// Directory for exported files
        #[arg(short, long, default_value = ".")]
        out: PathBuf,
    },
}

fn init_tracing(verbose: bool) {
    let default = if verbose {
        "notepilot=debug,notepilot_core=debug"
    } else {
        "warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn category_color(category: Option<&Category>) -> Color {
    match category {
        Some(Category::Insight) => Color::Cyan,
        Some(Category::Question) => Color::Yellow,
        Some(Category::Action) => Color::Green,
        _ => Color::Blue,
    }
}

fn print_header(subtitle: &str) {
    println!(
        "\n{}  {}\n",
        style("notepilot").cyan().bold(),
        style(subtitle).dim()
    );
}

fn print_highlight(highlight: &HighlightPayload) {
    let time = highlight
        .time
        .map(format_timestamp)
        .unwrap_or_else(|| "-:--".to_string());
    let category = highlight
        .category
        .as_ref()
        .map_or("unknown", Category::as_str);

    println!(
        "  {}  {}  {}  {}",
        style(time).dim(),
        style(&highlight.id).dim(),
        style(highlight.display_label().unwrap_or(highlight.id.as_str())).bold(),
        style(format!("[{}]", category)).fg(category_color(highlight.category.as_ref()))
    );
    if let Some(note) = &highlight.note {
        println!("        {}", style(note).dim().italic());
    }
}

/// Explicit paths must load; the default path is optional.
async fn resolve_config(path: Option<&Path>) -> Result<Option<Config>> {
    if let Some(path) = path {
        return Ok(Some(load_config(path).await?));
    }

    let default = get_config_path();
    if default.exists() {
        Ok(Some(load_config(&default).await?))
    } else {
        Ok(None)
    }
}

async fn require_config(path: Option<&Path>) -> Result<Config> {
    resolve_config(path).await?.ok_or_else(|| {
        anyhow!(
            "no configuration found, pass --config or create {}",
            get_config_path().display()
        )
    })
}

async fn save_artifact(artifact: &ExportArtifact, out: &Path) -> Result<()> {
    let path = artifact.write_to(out).await?;
    println!(
        "{} {} {}",
        style("Saved:").dim(),
        style(path.display()).cyan(),
        style(format!("({})", artifact.content_type)).dim()
    );
    Ok(())
}

async fn info(config_path: Option<&Path>) -> Result<()> {
    let config = require_config(config_path).await?;

    print_header("Configuration");
    println!("{}", config.summary());
    println!("{} {}\n", style("Outline title:").dim(), config.outline_title());

    for video in &config.videos {
        println!(
            "{} {}  {}  {}",
            style("•").cyan(),
            style(&video.id).bold(),
            video.title,
            style(format!("{} highlights", video.highlights.len())).dim()
        );
    }
    Ok(())
}

async fn highlights(config_path: Option<&Path>, video: Option<&str>, at: f64) -> Result<()> {
    if !at.is_finite() || at < 0.0 {
        return Err(anyhow!("--at must be a non-negative number of seconds"));
    }

    let config = require_config(config_path).await?;
    let video = match video {
        Some(id) => config
            .find_video(id)
            .ok_or_else(|| anyhow!("unknown video: {id}"))?,
        None => config
            .first_video()
            .ok_or_else(|| anyhow!("configuration has no videos"))?,
    };

    print_header("Highlights");
    println!(
        "{} {}  {} {}\n",
        style("Video:").dim(),
        style(&video.title).bold(),
        style("at").dim(),
        style(format_timestamp(at)).cyan()
    );

    let available = video.available_highlights(at);
    if available.is_empty() {
        println!(
            "{}",
            style("Highlights will appear as the video progresses.").dim()
        );
    }
    for highlight in available {
        print_highlight(highlight);
    }
    Ok(())
}

async fn run(
    config_path: Option<&Path>,
    script_path: &Path,
    export: Option<ExportFormat>,
    out: &Path,
) -> Result<()> {
    let mut session = resolve_config(config_path)
        .await?
        .map(Session::with_config)
        .unwrap_or_default();

    let text = fs::read_to_string(script_path)
        .await
        .with_context(|| format!("failed to read script {}", script_path.display()))?;
    let script = parse_script(&text);

    print_header("Outline");

    let total = script.events.len();
    let mut rejected = 0;
    for event in script.events {
        match session.dispatch(event) {
            Outcome::Exported(artifact) => {
                if let Err(e) = save_artifact(&artifact, out).await {
                    warn!(filename = %artifact.filename, error = %e, "export event failed");
                    rejected += 1;
                }
            }
            Outcome::Rejected(_) => rejected += 1,
            Outcome::Applied | Outcome::Unchanged => {}
        }
    }

    println!(
        "{} Replayed {} events {}",
        style("✓").green().bold(),
        total,
        style(format!(
            "({} rejected, {} malformed lines skipped)",
            rejected, script.skipped
        ))
        .dim()
    );
    if let Some(video) = session.selected_video() {
        println!("{} {}", style("Video:").dim(), video.title);
    }
    println!(
        "{} {}",
        style("Nodes:").dim(),
        tree::node_count(session.outline())
    );
    println!("{}", style("─".repeat(60)).dim());
    println!("{}", session.preview());
    println!("{}", style("─".repeat(60)).dim());

    if let Some(format) = export {
        match session.export(format) {
            Some(artifact) => save_artifact(&artifact, out).await?,
            None => println!("{}", style("Outline is empty, nothing exported").dim()),
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config_path = cli.config.as_deref();
    let result = match cli.command {
        Command::Info => info(config_path).await,
        Command::Highlights { video, at } => highlights(config_path, video.as_deref(), at).await,
        Command::Run {
            script,
            export,
            out,
        } => run(config_path, &script, export.map(Into::into), &out).await,
    };

    if let Err(e) = result {
        eprintln!("{} {:#}", style("Error:").red().bold(), e);
        std::process::exit(1);
    }
}
