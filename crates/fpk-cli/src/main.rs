//! fpk — operator CLI for the targeting patch reconciler.
//!
//! Thin wrapper over fpk-reconcile and fpk-client: load snapshot JSON files,
//! plan or submit the resulting instruction list. All reconciliation
//! semantics live in the library crates.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::fs;

use fpk_client::{CancelToken, ClientConfig, FlagPatchClient, PatchSubmission, PatchSubmitError};
use fpk_reconcile::{build_instructions, diff, validate_snapshot};
use fpk_schemas::TargetingSnapshot;

#[derive(Parser)]
#[command(name = "fpk")]
#[command(about = "Feature-flag targeting patch planner/submitter", long_about = None)]
struct Cli {
    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Diff two snapshots and print the instruction list as JSON.
    Plan {
        /// Snapshot captured at form load.
        #[arg(long)]
        initial: String,

        /// Snapshot captured at submit.
        #[arg(long)]
        submitted: String,

        /// Pretty-print the JSON output.
        #[arg(long, default_value_t = false)]
        pretty: bool,
    },

    /// Check a snapshot against the targeting invariants.
    Validate {
        #[arg(long)]
        snapshot: String,
    },

    /// Plan and submit the patch for a flag. Endpoint config from FPK_* env vars.
    /// Guardrail: refuses to send anything unless --yes is provided.
    Submit {
        /// Flag identifier.
        #[arg(long)]
        flag: String,

        #[arg(long)]
        initial: String,

        #[arg(long)]
        submitted: String,

        /// Acknowledge that the planned instructions should be applied.
        #[arg(long, default_value_t = false)]
        yes: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env.local if present (dev convenience). Production injects env
    // vars directly.
    let _ = dotenvy::from_filename(".env.local");

    init_tracing();

    let cli = Cli::parse();
    match cli.cmd {
        Commands::Plan {
            initial,
            submitted,
            pretty,
        } => run_plan(&initial, &submitted, pretty),
        Commands::Validate { snapshot } => run_validate(&snapshot),
        Commands::Submit {
            flag,
            initial,
            submitted,
            yes,
        } => run_submit(&flag, &initial, &submitted, yes).await,
    }
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn load_snapshot(path: &str) -> Result<TargetingSnapshot> {
    let s = fs::read_to_string(path).with_context(|| format!("read snapshot: {path}"))?;
    let snap: TargetingSnapshot =
        serde_json::from_str(&s).with_context(|| format!("parse snapshot json: {path}"))?;
    tracing::debug!(path, items = snap.items.len(), "loaded snapshot");
    Ok(snap)
}

fn run_plan(initial_path: &str, submitted_path: &str, pretty: bool) -> Result<()> {
    let initial = load_snapshot(initial_path)?;
    let submitted = load_snapshot(submitted_path)?;

    let report = validate_snapshot(&submitted);
    if !report.is_clean() {
        for issue in &report.issues {
            eprintln!("invalid: {issue}");
        }
        bail!("submitted snapshot fails validation; nothing planned");
    }

    let instructions = build_instructions(&diff(&initial, &submitted));
    let out = if pretty {
        serde_json::to_string_pretty(&instructions)?
    } else {
        serde_json::to_string(&instructions)?
    };
    println!("{out}");
    Ok(())
}

fn run_validate(snapshot_path: &str) -> Result<()> {
    let snapshot = load_snapshot(snapshot_path)?;
    let report = validate_snapshot(&snapshot);
    println!("{}", serde_json::to_string_pretty(&report)?);
    if !report.is_clean() {
        bail!("snapshot fails validation ({} issue(s))", report.issues.len());
    }
    Ok(())
}

async fn run_submit(flag: &str, initial_path: &str, submitted_path: &str, yes: bool) -> Result<()> {
    let initial = load_snapshot(initial_path)?;
    let submitted = load_snapshot(submitted_path)?;

    let mut submission = match PatchSubmission::prepare(&initial, &submitted) {
        Err(report) => {
            for issue in &report.issues {
                eprintln!("invalid: {issue}");
            }
            bail!("submitted snapshot fails validation; nothing submitted");
        }
        Ok(None) => {
            println!("no changes; nothing to submit");
            return Ok(());
        }
        Ok(Some(s)) => s,
    };

    if !yes {
        eprintln!(
            "would apply {} instruction(s) to {flag}:",
            submission.instruction_count()
        );
        eprintln!("{}", serde_json::to_string_pretty(submission.instructions())?);
        bail!("refusing to submit without --yes");
    }

    let client = FlagPatchClient::new(ClientConfig::from_env()?);
    match submission
        .submit(&client, flag, &CancelToken::never())
        .await
    {
        Ok(receipt) => {
            println!(
                "applied {} instruction(s) to {flag} at {}",
                receipt.instruction_count, receipt.submitted_at
            );
            Ok(())
        }
        Err(PatchSubmitError::Governance(g)) => {
            // Governance veto gets its own surface, not a generic error line.
            eprintln!("governance veto: {}", g.message);
            eprintln!("{}", serde_json::to_string_pretty(&g.metadata)?);
            bail!("patch vetoed by governance");
        }
        Err(e) => Err(e).context("patch submission failed"),
    }
}
