//! Launch the system browser.

use std::process::{Command, Stdio};

/// Launcher program for this platform, if any.
const fn launcher() -> Option<&'static str> {
    if cfg!(target_os = "macos") {
        Some("open")
    } else if cfg!(target_os = "windows") {
        Some("explorer.exe")
    } else if cfg!(any(target_os = "linux", target_os = "freebsd", target_os = "openbsd")) {
        Some("xdg-open")
    } else {
        None
    }
}

/// Open `url` in the default browser, or print it when that is not possible.
pub fn open(url: &str) {
    let Some(program) = launcher() else {
        crate::log!("serve"; "open {} in your browser", url);
        return;
    };

    let spawned = Command::new(program)
        .arg(url)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn();

    if let Err(e) = spawned {
        crate::debug!("serve"; "{} failed: {}", program, e);
        crate::log!("serve"; "open {} in your browser", url);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[cfg(target_os = "linux")]
    fn test_linux_launcher() {
        assert_eq!(launcher(), Some("xdg-open"));
    }
}
