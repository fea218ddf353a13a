use anyhow::{Context, Result};
use clap::{CommandFactory, Parser, Subcommand};
use colored::Colorize;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::info;
use tracing_subscriber::EnvFilter;

use voxlen::report::{self, Summary};
use voxlen::store::{MediaLayout, ScriptStore, StoredScript};
use voxlen::timeline::{chapter_timestamps, format_timestamp, DurationSource, Timeline};
use voxlen::{Analyzer, ClipAnalysis, ClipStatus, Config};

#[derive(Parser)]
#[command(name = "voxlen", version, about = "Measure narrated MP3 clips and build scene timelines")]
struct Cli {
    /// Config file (defaults to ./voxlen.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// More log output (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the playable duration of each clip
    Measure {
        #[arg(required = true)]
        files: Vec<PathBuf>,
        /// Print results as JSON
        #[arg(long)]
        json: bool,
    },
    /// Measure every .mp3 under a directory
    Scan {
        dir: PathBuf,
        /// Write a report (.json, otherwise CSV)
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Only look at the top level of the directory
        #[arg(long)]
        no_recursive: bool,
    },
    /// Show the scene timeline of a stored script
    Timeline {
        script_id: String,
        #[arg(long)]
        fps: Option<u32>,
        /// Title card length in seconds
        #[arg(long)]
        title_secs: Option<f64>,
        /// Print the timeline as JSON
        #[arg(long)]
        json: bool,
    },
    /// Write measured clip durations back into a stored script
    Sync { script_id: String },
    /// Generate shell completions
    Completions { shell: clap_complete::Shell },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {:#}", "error:".red().bold(), e);
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(format!("voxlen={}", level)));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: Cli) -> Result<()> {
    let config = Config::resolve(cli.config.as_deref()).context("Failed to load config")?;

    match cli.command {
        Command::Measure { files, json } => {
            let results = Analyzer::new().analyze_all(&files);
            if json {
                println!("{}", serde_json::to_string_pretty(&results)?);
            } else {
                for r in &results {
                    print_clip(r);
                }
            }
        }
        Command::Scan {
            dir,
            output,
            no_recursive,
        } => {
            let analyzer = Analyzer::new().with_recursive(!no_recursive);
            let paths = analyzer
                .collect(&dir)
                .with_context(|| format!("Failed to list clips in {}", dir.display()))?;
            info!(dir = %dir.display(), clips = paths.len(), "scanning");

            let results = analyzer.analyze_all(&paths);
            for r in &results {
                print_clip(r);
            }
            print_summary(&Summary::from_results(&results));

            if let Some(output) = output {
                report::generate(&output, &results)
                    .with_context(|| format!("Failed to write report {}", output.display()))?;
                println!("Report written to {}", output.display());
            }
        }
        Command::Timeline {
            script_id,
            fps,
            title_secs,
            json,
        } => {
            let fps = fps.unwrap_or(config.fps);
            let title_secs = title_secs.unwrap_or(config.title_secs);
            let script = load_script(&config, &script_id)?;
            let clips = MediaLayout::new(&config.media_dir).measure_scenes(&script, &Analyzer::new());
            let timeline = Timeline::build(&script.scenes_with_clips(&clips), title_secs);

            if json {
                println!("{}", serde_json::to_string_pretty(&timeline)?);
            } else {
                print_timeline(&script, &timeline, fps);
            }
        }
        Command::Sync { script_id } => {
            let mut script = load_script(&config, &script_id)?;
            let clips = MediaLayout::new(&config.media_dir).measure_scenes(&script, &Analyzer::new());
            let found = clips.iter().flatten().count();
            script.apply_audio(&clips);

            ScriptStore::new(&config.store_dir)
                .put(&script)
                .with_context(|| format!("Failed to save script {}", script_id))?;
            info!(id = %script_id, clips = found, "synced durations");
            println!(
                "Synced {} of {} scene clips, total {:.2}s",
                found,
                script.script.scenes.len(),
                script.script.total_duration
            );
        }
        Command::Completions { shell } => {
            clap_complete::generate(shell, &mut Cli::command(), "voxlen", &mut std::io::stdout());
        }
    }

    Ok(())
}

fn load_script(config: &Config, id: &str) -> Result<StoredScript> {
    ScriptStore::new(&config.store_dir)
        .get(id)
        .with_context(|| format!("Failed to load script {}", id))
}

fn status_label(status: ClipStatus) -> colored::ColoredString {
    let label = status.to_string();
    let label = format!("{label:<9}");
    match status {
        ClipStatus::Measured => label.green(),
        ClipStatus::NoFrames => label.yellow(),
        ClipStatus::Error => label.red(),
    }
}

fn print_clip(r: &ClipAnalysis) {
    match &r.error {
        Some(err) => println!("{}        -  {}  {}", status_label(r.status), r.file_path, err.dimmed()),
        None => println!(
            "{} {:>7.2}s  {:>6} frames  {}",
            status_label(r.status),
            r.duration_secs,
            r.frame_count,
            r.file_path
        ),
    }
}

fn print_summary(summary: &Summary) {
    println!();
    println!(
        "{} clips: {} measured, {} without frames, {} unreadable, {:.2}s total",
        summary.total.to_string().bold(),
        summary.measured.to_string().green(),
        summary.no_frames.to_string().yellow(),
        summary.error.to_string().red(),
        summary.total_duration_secs
    );
}

fn print_timeline(script: &StoredScript, timeline: &Timeline, fps: u32) {
    println!("{}", script.script.title.bold());
    println!("  {:>7}  title card ({:.2}s)", format_timestamp(0.0), timeline.title_secs);

    for entry in &timeline.entries {
        let source = match entry.source {
            DurationSource::Audio => "audio".green(),
            DurationSource::Hint => "hint".yellow(),
        };
        let text = script
            .script
            .scenes
            .get(entry.index)
            .map(|s| preview(&s.text))
            .unwrap_or_default();
        println!(
            "  {:>7}  scene {:02} {:>6.2}s {:<5}  {}",
            format_timestamp(entry.start),
            entry.index + 1,
            entry.duration,
            source,
            text.dimmed()
        );
    }

    println!();
    println!(
        "Total {:.2}s ({} frames at {}fps)",
        timeline.total_secs,
        timeline.frames(fps),
        fps
    );

    let chapters = chapter_timestamps(&timeline.durations());
    if !chapters.is_empty() {
        println!();
        println!("{}", chapters);
    }
}

fn preview(text: &str) -> String {
    const MAX: usize = 48;
    if text.chars().count() > MAX {
        format!("{}...", text.chars().take(MAX).collect::<String>())
    } else {
        text.to_string()
    }
}
