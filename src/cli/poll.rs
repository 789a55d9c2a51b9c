//! `loop` mode: timer-driven rebuilds without watcher or server.

use std::time::Duration;

use crate::build::{BuildContext, rebuild};
use crate::config::SiteConfig;
use crate::core::{BuildMode, is_shutdown};
use crate::log;
use crate::logger::{status_error, status_success};

/// Granularity at which the wait between rebuilds checks for shutdown.
const SHUTDOWN_POLL: Duration = Duration::from_millis(100);

/// Rebuild every `loop.interval_secs` until Ctrl+C.
///
/// Failed rebuilds are reported and the loop keeps going.
pub fn run_loop(config: &SiteConfig) {
    let interval = config.poll.interval();
    log!("loop"; "rebuilding every {}s", interval.as_secs());

    while !is_shutdown() {
        rebuild_once(config);
        sleep_unless_shutdown(interval);
    }
}

/// One rebuild, reported to the watch status line. Returns success.
fn rebuild_once(config: &SiteConfig) -> bool {
    match rebuild(&BuildContext::new(config, BuildMode::POLLING)) {
        Ok(report) => {
            status_success(&format!("rebuilt {}", report.summary()));
            true
        }
        Err(e) => {
            status_error("rebuild failed", &format!("{e:#}"));
            false
        }
    }
}

fn sleep_unless_shutdown(total: Duration) {
    let mut remaining = total;
    while !remaining.is_zero() && !is_shutdown() {
        let step = remaining.min(SHUTDOWN_POLL);
        std::thread::sleep(step);
        remaining -= step;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_config_at;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_rebuild_once_picks_up_edits() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("src/pages")).unwrap();
        fs::create_dir_all(root.join("src/templates")).unwrap();
        fs::write(root.join("src/templates/main.html"), "<!-- #CONTENT -->").unwrap();
        fs::write(root.join("src/pages/index.html"), "first").unwrap();

        let config = test_config_at(root);
        assert!(rebuild_once(&config));
        fs::write(root.join("src/pages/index.html"), "second").unwrap();
        assert!(rebuild_once(&config));

        let html = fs::read_to_string(root.join("docs/index.html")).unwrap();
        assert!(html.contains("second"));
    }

    #[test]
    fn test_rebuild_once_survives_failure() {
        let dir = TempDir::new().unwrap();
        let config = test_config_at(dir.path());
        assert!(!rebuild_once(&config));
    }

    #[test]
    fn test_sleep_zero_returns() {
        sleep_unless_shutdown(Duration::ZERO);
    }
}
