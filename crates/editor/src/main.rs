use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use chrono::Utc;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use sq_common::EditorConfig;
use sq_editor::EditorSession;
use sq_project::{parse, save_project, validate_compatibility, ProjectFile};

#[derive(Parser)]
#[command(name = "sequencer", version, about = "Inspect project files and recovery data")]
struct Cli {
    /// Editor config file (JSON). Defaults apply when absent.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Override the recovery storage directory.
    #[arg(long, global = true)]
    recovery_dir: Option<PathBuf>,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Check a project file against this build's schema and version
    Validate { file: PathBuf },

    /// Summarize a project file
    Info { file: PathBuf },

    /// Report whether the previous session ended without a clean shutdown
    CrashCheck,

    /// Inspect or manage recovery snapshots
    Recovery {
        #[command(subcommand)]
        cmd: RecoveryCommand,
    },
}

#[derive(Subcommand)]
enum RecoveryCommand {
    /// List snapshots, newest first
    List,

    /// Show one snapshot's contents
    Show { id: String },

    /// Write a snapshot out as a project file
    Restore {
        id: String,
        #[arg(long)]
        out: PathBuf,
    },

    /// Delete every snapshot
    Clear,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref(), cli.recovery_dir)?;

    match cli.cmd {
        Command::Validate { file } => {
            let project = read_project(&file)?;
            let report = validate_compatibility(&project, &config.app_version);
            for warning in &report.warnings {
                println!("warning: {warning}");
            }
            for error in &report.errors {
                println!("error: {error}");
            }
            if !report.compatible {
                bail!("{} is not compatible with this version", file.display());
            }
            println!("OK");
        }
        Command::Info { file } => {
            let project = read_project(&file)?;
            print_info(&project);
        }
        Command::CrashCheck => {
            let session = EditorSession::with_file_store(config);
            match session.check_crash()? {
                Some(prompt) => {
                    println!("Previous session did not shut down cleanly.");
                    println!(
                        "Latest snapshot {}: {} ({})",
                        prompt.snapshot_id, prompt.description, prompt.age
                    );
                }
                None => println!("No crashed session."),
            }
        }
        Command::Recovery { cmd } => run_recovery(cmd, config)?,
    }

    Ok(())
}

fn run_recovery(cmd: RecoveryCommand, config: EditorConfig) -> anyhow::Result<()> {
    let app_version = config.app_version.clone();
    let mut session = EditorSession::with_file_store(config);
    let recovery = session.recovery_mut();

    match cmd {
        RecoveryCommand::List => {
            let snapshots = recovery.get_recovery_snapshots()?;
            if snapshots.is_empty() {
                println!("No recovery snapshots.");
            }
            let now = Utc::now();
            for snap in snapshots {
                println!("{}  {:<16}  {}", snap.id, snap.age(now), snap.describe());
            }
        }
        RecoveryCommand::Show { id } => {
            let Some(snap) = recovery.get_snapshot(&id)? else {
                bail!("no recovery snapshot with id {id}");
            };
            println!("{}", snap.describe());
            println!("Captured: {} ({})", snap.created_at, snap.age(Utc::now()));
            for shot in snap.state.timeline().shots() {
                println!(
                    "- {} [{} +{}] {:?}",
                    shot.name, shot.start_time, shot.duration, shot.generation_status
                );
            }
        }
        RecoveryCommand::Restore { id, out } => {
            let Some(snap) = recovery.get_snapshot(&id)? else {
                bail!("no recovery snapshot with id {id}");
            };
            let file = ProjectFile::from_snapshot(&snap.state, &app_version);
            save_project(&file, &out)
                .with_context(|| format!("writing {}", out.display()))?;
            println!("Restored {} to {}", snap.describe(), out.display());
        }
        RecoveryCommand::Clear => {
            recovery.clear_snapshots()?;
            println!("Cleared recovery snapshots.");
        }
    }
    Ok(())
}

fn load_config(path: Option<&Path>, recovery_dir: Option<PathBuf>) -> anyhow::Result<EditorConfig> {
    let mut config = match path {
        Some(path) => EditorConfig::load_or_default(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => EditorConfig::default(),
    };
    if let Some(dir) = recovery_dir {
        config.recovery.storage_dir = dir;
    }
    Ok(config)
}

fn read_project(path: &Path) -> anyhow::Result<ProjectFile> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    let project = parse(&raw).with_context(|| format!("parsing {}", path.display()))?;
    Ok(project)
}

fn print_info(project: &ProjectFile) {
    println!("Name:      {}", project.name().unwrap_or("(unnamed)"));
    println!("Version:   {}", project.version);
    println!("Schema:    {}", project.schema_version);
    if let Some(created) = project.created {
        println!("Created:   {created}");
    }
    if let Some(modified) = project.modified {
        println!("Modified:  {modified}");
    }
    if let Some(meta) = &project.project {
        println!(
            "Format:    {}x{} @ {} fps",
            meta.width, meta.height, meta.frame_rate
        );
    }
    if let Some(timeline) = &project.timeline {
        println!("Shots:     {}", timeline.shots().len());
        println!("Tracks:    {}", timeline.tracks().len());
        println!("Markers:   {}", timeline.markers().len());
        println!("Regions:   {}", timeline.regions().len());
        println!("Duration:  {} frames", timeline.duration());
    }
    if let Some(assets) = &project.assets {
        println!("Assets:    {}", assets.len());
    }
    let missing = project.missing_sections();
    if !missing.is_empty() {
        println!("Missing:   {}", missing.join(", "));
    }
}
