use anyhow::{Context, Result};
use regex::Regex;
use tokio::time::{sleep, Duration, Instant};

use crate::compositor::Compositor;

/// Polls the compositor's client list until a window whose class matches
/// `class_regex` appears, or `timeout` elapses.
///
/// The pattern is searched anywhere in the class string, never anchored to
/// the whole of it; anchor explicitly (`^...$`) for an exact match. Returns
/// the first matching window's address in snapshot order, or `None` once the
/// deadline passes (an expected outcome, not an error). A zero timeout still
/// fetches one snapshot before giving up, without sleeping.
pub async fn wait_for_window(
    compositor: &dyn Compositor,
    class_regex: &str,
    timeout: Duration,
    poll_interval: Duration,
) -> Result<Option<String>> {
    let pattern =
        Regex::new(class_regex).with_context(|| format!("Invalid class_regex: {class_regex}"))?;
    let deadline = Instant::now() + timeout;

    loop {
        let windows = compositor.clients().await?;
        if let Some(window) = windows.iter().find(|w| pattern.is_match(w.class())) {
            return Ok(Some(window.address.clone()));
        }
        if Instant::now() >= deadline {
            return Ok(None);
        }
        sleep(poll_interval).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compositor::Window;
    use anyhow::bail;
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    const POLL: Duration = Duration::from_millis(50);
    const TIMEOUT: Duration = Duration::from_secs(1);

    /// Serves a fixed sequence of snapshots, then empty lists forever.
    struct ScriptedCompositor {
        snapshots: Mutex<VecDeque<Vec<Window>>>,
        fetches: AtomicUsize,
    }

    impl ScriptedCompositor {
        fn new(snapshots: Vec<Vec<Window>>) -> Self {
            Self {
                snapshots: Mutex::new(snapshots.into()),
                fetches: AtomicUsize::new(0),
            }
        }

        fn always_empty() -> Self {
            Self::new(Vec::new())
        }

        fn fetches(&self) -> usize {
            self.fetches.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl Compositor for ScriptedCompositor {
        async fn clients(&self) -> Result<Vec<Window>> {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            Ok(self.snapshots.lock().unwrap().pop_front().unwrap_or_default())
        }

        async fn dispatch(&self, _command: &str) -> Result<()> {
            Ok(())
        }

        async fn dispatch_batch(&self, _commands: &[String]) -> Result<()> {
            Ok(())
        }
    }

    struct FailingCompositor;

    #[async_trait]
    impl Compositor for FailingCompositor {
        async fn clients(&self) -> Result<Vec<Window>> {
            bail!("compositor unreachable")
        }

        async fn dispatch(&self, _command: &str) -> Result<()> {
            Ok(())
        }

        async fn dispatch_batch(&self, _commands: &[String]) -> Result<()> {
            Ok(())
        }
    }

    // ── deadline handling ─────────────────────────────────────────────────────

    #[tokio::test(start_paused = true)]
    async fn zero_timeout_fetches_once_without_sleeping() {
        let fake = ScriptedCompositor::always_empty();
        let start = Instant::now();

        let result = wait_for_window(&fake, "xterm", Duration::ZERO, POLL).await.unwrap();

        assert_eq!(result, None);
        assert_eq!(fake.fetches(), 1);
        assert_eq!(start.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn times_out_when_window_never_appears() {
        let fake = ScriptedCompositor::always_empty();
        let start = Instant::now();

        let result = wait_for_window(&fake, "xterm", TIMEOUT, POLL).await.unwrap();

        assert_eq!(result, None);
        // One fetch at t=0, then one per 50ms sleep until the 1s deadline.
        assert_eq!(fake.fetches(), 21);
        assert_eq!(start.elapsed(), TIMEOUT);
    }

    #[tokio::test(start_paused = true)]
    async fn timing_out_twice_behaves_identically() {
        for _ in 0..2 {
            let fake = ScriptedCompositor::always_empty();
            let start = Instant::now();
            let result = wait_for_window(&fake, "xterm", TIMEOUT, POLL).await.unwrap();
            assert_eq!(result, None);
            assert_eq!(start.elapsed(), TIMEOUT);
        }
    }

    // ── matching ──────────────────────────────────────────────────────────────

    #[tokio::test(start_paused = true)]
    async fn returns_match_on_first_poll_without_waiting() {
        let fake = ScriptedCompositor::new(vec![vec![Window::new("0x1", "xterm")]]);
        let start = Instant::now();

        let result = wait_for_window(&fake, "xterm", TIMEOUT, POLL).await.unwrap();

        assert_eq!(result.as_deref(), Some("0x1"));
        assert_eq!(fake.fetches(), 1);
        assert_eq!(start.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn window_appearing_on_fourth_poll_takes_four_fetches() {
        let fake = ScriptedCompositor::new(vec![
            Vec::new(),
            Vec::new(),
            Vec::new(),
            vec![Window::new("0x1", "xterm")],
        ]);

        let result = wait_for_window(&fake, "^xterm$", TIMEOUT, POLL).await.unwrap();

        assert_eq!(result.as_deref(), Some("0x1"));
        assert_eq!(fake.fetches(), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn returns_first_matching_window_in_snapshot_order() {
        let fake = ScriptedCompositor::new(vec![vec![
            Window::new("0x1", "foot"),
            Window::new("0x2", "xterm"),
            Window::new("0x3", "xterm"),
        ]]);

        let result = wait_for_window(&fake, "xterm", TIMEOUT, POLL).await.unwrap();

        assert_eq!(result.as_deref(), Some("0x2"));
    }

    #[tokio::test(start_paused = true)]
    async fn pattern_is_searched_not_anchored() {
        let fake = ScriptedCompositor::new(vec![vec![Window::new("0x1", "org.mozilla.firefox")]]);

        let result = wait_for_window(&fake, "firefox", TIMEOUT, POLL).await.unwrap();

        assert_eq!(result.as_deref(), Some("0x1"));
    }

    #[tokio::test(start_paused = true)]
    async fn explicit_anchors_give_exact_match() {
        let fake = ScriptedCompositor::new(vec![vec![
            Window::new("0x1", "xterm-256color"),
            Window::new("0x2", "xterm"),
        ]]);

        let result = wait_for_window(&fake, "^xterm$", TIMEOUT, POLL).await.unwrap();

        assert_eq!(result.as_deref(), Some("0x2"));
    }

    #[tokio::test(start_paused = true)]
    async fn empty_class_never_matches_a_nonempty_pattern() {
        let fake = ScriptedCompositor::new(vec![vec![Window::new("0x1", "")]]);

        let result = wait_for_window(&fake, "xterm", Duration::ZERO, POLL).await.unwrap();

        assert_eq!(result, None);
    }

    #[tokio::test(start_paused = true)]
    async fn empty_pattern_matches_any_window() {
        let fake = ScriptedCompositor::new(vec![vec![Window::new("0x1", "anything")]]);

        let result = wait_for_window(&fake, "", TIMEOUT, POLL).await.unwrap();

        assert_eq!(result.as_deref(), Some("0x1"));
    }

    // ── error propagation ─────────────────────────────────────────────────────

    #[tokio::test(start_paused = true)]
    async fn invalid_pattern_fails_before_any_fetch() {
        let fake = ScriptedCompositor::always_empty();

        let result = wait_for_window(&fake, "(", TIMEOUT, POLL).await;

        assert!(result.is_err());
        assert_eq!(fake.fetches(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn snapshot_failure_propagates() {
        let result = wait_for_window(&FailingCompositor, "xterm", TIMEOUT, POLL).await;
        assert!(result.is_err());
    }
}
