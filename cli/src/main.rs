mod compositor;
mod config;
mod launcher;
mod orchestrate;
mod paths;
mod waiter;

use clap::Parser;
use std::path::PathBuf;

use crate::orchestrate::RuleOutcome;

/// Declarative session startup for Hyprland: launch applications, wait for
/// their windows to appear, and place them on workspaces and monitors.
#[derive(Parser, Debug)]
#[command(name = "hyprstart", version)]
struct Args {
    /// Path to the startup config file (default: ~/.config/hyprstart/config.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Print the startup plan without launching or moving anything
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    // ── Configuration ─────────────────────────────────────────────────────────
    let config_path = args.config.unwrap_or_else(paths::default_config_path);

    if !config_path.exists() {
        eprintln!("[config] No such config file: {}", config_path.display());
        std::process::exit(2);
    }

    let config = match config::load(&config_path) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("[config] Error: {e:#}");
            std::process::exit(1);
        }
    };

    println!(
        "hyprstart v{} ({} app rule(s) from {})",
        env!("CARGO_PKG_VERSION"),
        config.apps.len(),
        config_path.display()
    );
    if args.dry_run {
        println!("dry run: nothing will be launched or moved");
    }

    // ── Startup run ───────────────────────────────────────────────────────────
    let outcomes = orchestrate::run(
        &config,
        &compositor::HyprctlCompositor,
        &launcher::ShellLauncher,
        args.dry_run,
    )
    .await;

    print_summary(&outcomes);
}

/// Closing line for the run. Timeouts and per-rule failures are already
/// reported as warnings and never produce a non-zero exit; the session
/// should come up as far as it can.
fn print_summary(outcomes: &[RuleOutcome]) {
    let count = |wanted: RuleOutcome| outcomes.iter().filter(|o| **o == wanted).count();

    let planned = count(RuleOutcome::Planned);
    if planned > 0 {
        println!("planned {planned} launch(es), dry run complete");
        return;
    }

    println!(
        "done: {} placed, {} timed out, {} failed",
        count(RuleOutcome::Placed),
        count(RuleOutcome::TimedOut),
        count(RuleOutcome::Failed)
    );
}
