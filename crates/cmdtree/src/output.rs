//! Destinations for rendered help and diagnostic text.

use std::io::Write;

/// A sink for rendered text.
///
/// Every help or diagnostic render results in exactly one `write` call.
pub trait Output {
    fn write(&mut self, text: &str);
}

/// Writes to stdout, terminating the text with a newline.
///
/// Write errors (a closed pipe, for instance) are logged and otherwise dropped.
#[derive(Debug, Clone, Copy, Default)]
pub struct Console;

impl Output for Console {
    fn write(&mut self, text: &str) {
        let mut stdout = std::io::stdout().lock();
        let written = if text.ends_with('\n') {
            stdout.write_all(text.as_bytes())
        } else {
            writeln!(stdout, "{text}")
        };
        if let Err(err) = written.and_then(|()| stdout.flush()) {
            tracing::trace!(%err, "failed to write to stdout");
        }
    }
}

impl Output for String {
    fn write(&mut self, text: &str) {
        self.push_str(text);
    }
}

impl Output for Vec<String> {
    fn write(&mut self, text: &str) {
        self.push(text.to_string());
    }
}
