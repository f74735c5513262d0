use tokio::time::Duration;

use crate::compositor::Compositor;
use crate::config::{AppRule, Config, GeneralConfig};
use crate::launcher::Launcher;
use crate::waiter;

/// Terminal outcome of one app rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleOutcome {
    /// Window found and moved to its target workspace.
    Placed,
    /// No matching window appeared within the rule's wait budget.
    TimedOut,
    /// Launching or placing the window failed; the rule was abandoned.
    Failed,
    /// Dry run: the rule was printed but nothing was launched or moved.
    Planned,
}

/// Runs one startup session: prewarms workspaces, then processes each app
/// rule in declared order with a launch → wait → place cycle.
///
/// Rules are strictly sequential: a placement command issued while another
/// window is still being created can race the compositor's bookkeeping, so
/// each rule's cycle resolves before the next launch. A failing rule never
/// aborts the run; its outcome is recorded and the remaining rules proceed.
pub async fn run(
    config: &Config,
    compositor: &dyn Compositor,
    launcher: &dyn Launcher,
    dry_run: bool,
) -> Vec<RuleOutcome> {
    prewarm(&config.general.prewarm_workspaces, compositor).await;

    let mut outcomes = Vec::with_capacity(config.apps.len());
    for rule in &config.apps {
        outcomes.push(run_rule(rule, &config.general, compositor, launcher, dry_run).await);
    }
    outcomes
}

/// Switches through the configured workspaces in one batched request so the
/// compositor has created them all before the first launch. Runs in dry-run
/// mode too; prewarming has no effect on window state.
async fn prewarm(workspaces: &[i32], compositor: &dyn Compositor) {
    if workspaces.is_empty() {
        return;
    }

    println!("[orchestrate] prewarming workspaces: {workspaces:?}");
    let commands: Vec<String> = workspaces.iter().map(|ws| format!("workspace {ws}")).collect();
    if let Err(e) = compositor.dispatch_batch(&commands).await {
        eprintln!("[orchestrate] workspace prewarm failed: {e:#}");
    }
}

async fn run_rule(
    rule: &AppRule,
    general: &GeneralConfig,
    compositor: &dyn Compositor,
    launcher: &dyn Launcher,
    dry_run: bool,
) -> RuleOutcome {
    match &rule.monitor {
        Some(monitor) => println!(
            "[orchestrate] launching: {} -> workspace {} @ {}",
            rule.name, rule.workspace, monitor
        ),
        None => println!(
            "[orchestrate] launching: {} -> workspace {}",
            rule.name, rule.workspace
        ),
    }

    if dry_run {
        return RuleOutcome::Planned;
    }

    if let Err(e) = launcher.spawn(&rule.cmd) {
        eprintln!("[orchestrate] failed to launch '{}': {e:#}", rule.name);
        return RuleOutcome::Failed;
    }

    let timeout = Duration::from_secs(rule.effective_timeout_secs(general));
    let poll_interval = Duration::from_millis(general.poll_interval_ms);

    let address =
        match waiter::wait_for_window(compositor, &rule.class_regex, timeout, poll_interval).await {
            Ok(Some(address)) => address,
            Ok(None) => {
                eprintln!(
                    "[orchestrate] timed out waiting for window of '{}' (class_regex={})",
                    rule.name, rule.class_regex
                );
                return RuleOutcome::TimedOut;
            }
            Err(e) => {
                eprintln!("[orchestrate] wait for '{}' failed: {e:#}", rule.name);
                return RuleOutcome::Failed;
            }
        };

    println!(
        "[orchestrate] found window {} for {}, moving to workspace {}",
        address, rule.name, rule.workspace
    );
    let move_cmd = format!("movetoworkspace {} address:{}", rule.workspace, address);
    if let Err(e) = compositor.dispatch(&move_cmd).await {
        eprintln!(
            "[orchestrate] failed to move '{}' to workspace {}: {e:#}",
            rule.name, rule.workspace
        );
        return RuleOutcome::Failed;
    }

    if let Some(monitor) = &rule.monitor {
        move_to_monitor(&address, monitor, &rule.name, compositor).await;
    }

    RuleOutcome::Placed
}

/// Focuses the window, then moves it to `monitor`. The workspace placement
/// already succeeded at this point, so a failure here only warns.
async fn move_to_monitor(address: &str, monitor: &str, name: &str, compositor: &dyn Compositor) {
    for command in [
        format!("focuswindow address:{address}"),
        format!("movetomonitor {monitor} address:{address}"),
    ] {
        if let Err(e) = compositor.dispatch(&command).await {
            eprintln!("[orchestrate] monitor placement for '{name}' failed ({command}): {e:#}");
            return;
        }
    }
}
