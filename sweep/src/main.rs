use anyhow::{Context, Result};
use clap::Parser;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use sweep_core::{Deleter, Error};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod output;

use output::{DeleteOutput, OutputWriter};

/// Sweep - delete directory trees reliably
#[derive(Parser)]
#[command(name = "sweep")]
#[command(about = "Delete directory trees, retrying transient failures", long_about = None)]
#[command(version)]
struct Cli {
    /// Paths to delete
    #[arg(required = true)]
    paths: Vec<PathBuf>,

    /// Descend into symlinked directories instead of deleting the link entry
    #[arg(long)]
    follow_symlinks: bool,

    /// Emit results as JSON
    #[arg(long)]
    json: bool,
}

fn main() -> ExitCode {
    // Initialize tracing; RUST_LOG=debug shows per-node retry events.
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();
    let writer = OutputWriter::new(cli.json);
    let deleter = Deleter::new();

    let mut all_ok = true;
    for path in &cli.paths {
        match delete_one(&deleter, path, cli.follow_symlinks, &writer) {
            Ok(deleted) => all_ok &= deleted,
            Err(err) => {
                writer.write_error(&err);
                all_ok = false;
            }
        }
    }

    if all_ok {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

/// Delete a single tree and report the outcome.
///
/// Returns `Ok(false)` when the tree could not be fully deleted and the
/// report was already written.
fn delete_one(
    deleter: &Deleter,
    path: &Path,
    follow_symlinks: bool,
    writer: &OutputWriter,
) -> Result<bool> {
    match deleter.delete_tree(path, follow_symlinks) {
        Ok(existed) => {
            writer.write(
                &DeleteOutput {
                    success: true,
                    path: path.display().to_string(),
                    existed,
                    report: None,
                },
                || {
                    if existed {
                        format!("Deleted {}\n", path.display())
                    } else {
                        format!("Nothing to delete at {}\n", path.display())
                    }
                },
            )?;
            Ok(true)
        }
        Err(Error::TreeDeleteFailed { report }) => {
            writer.write(
                &DeleteOutput {
                    success: false,
                    path: path.display().to_string(),
                    existed: true,
                    report: Some((*report).clone()),
                },
                || format!("{report}\n"),
            )?;
            Ok(false)
        }
        Err(err) => {
            Err(err).with_context(|| format!("Failed to delete {}", path.display()))
        }
    }
}
