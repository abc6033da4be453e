//! Pre-filled links to the third-party web messaging interface.

use std::io;
use std::process::{Command, Stdio};

use url::Url;

/// `{base}/{number}?text={url-encoded text}`.
#[must_use]
pub fn web_link(base: &Url, number: &str, text: &str) -> String {
    format!(
        "{}/{number}?text={}",
        base.as_str().trim_end_matches('/'),
        urlencoding::encode(text)
    )
}

/// Hand `url` to the platform's default URL opener without waiting for it.
///
/// # Errors
///
/// Returns an error if the opener cannot be started.
pub fn open_in_browser(url: &str) -> io::Result<()> {
    let mut command = opener_command(url);
    command
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .map(|_| ())
}

#[cfg(target_os = "macos")]
fn opener_command(url: &str) -> Command {
    let mut command = Command::new("open");
    command.arg(url);
    command
}

#[cfg(target_os = "windows")]
fn opener_command(url: &str) -> Command {
    let mut command = Command::new("cmd");
    command.args(["/C", "start", "", url]);
    command
}

#[cfg(not(any(target_os = "macos", target_os = "windows")))]
fn opener_command(url: &str) -> Command {
    let mut command = Command::new("xdg-open");
    command.arg(url);
    command
}
