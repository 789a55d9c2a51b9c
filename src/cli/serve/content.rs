//! Live reload script injection.

use crate::embed::serve::{HOTRELOAD_JS, HotreloadVars};
use crate::utils::mime::is_html;

/// Inject the reload client when the body is HTML and the push channel is up.
pub fn maybe_inject_hotreload(body: Vec<u8>, content_type: &str, ws_port: Option<u16>) -> Vec<u8> {
    match (is_html(content_type), ws_port) {
        (true, Some(port)) => inject_hotreload_script(&body, port),
        _ => body,
    }
}

/// Insert the script before the last `</body>`, or append it.
fn inject_hotreload_script(content: &[u8], ws_port: u16) -> Vec<u8> {
    const PATTERN: &[u8] = b"</body>";

    let script = HOTRELOAD_JS.inline_script(&HotreloadVars { ws_port });
    let script = script.as_bytes();
    let pos = content
        .windows(PATTERN.len())
        .rposition(|w| w.eq_ignore_ascii_case(PATTERN))
        .unwrap_or(content.len());

    let mut result = Vec::with_capacity(content.len() + script.len());
    result.extend_from_slice(&content[..pos]);
    result.extend_from_slice(script);
    result.extend_from_slice(&content[pos..]);
    result
}
