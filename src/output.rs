use std::io::Write;

/// Abstraction over user-facing output.
///
/// Command modules use this trait instead of `println!`/`eprintln!` so that
/// tests can capture what a command reports.
pub trait UserOutput: Send + Sync {
    /// Informational status message (e.g., "Stopping ingestion service...")
    fn status(&self, message: &str);

    /// Success message (e.g., "Link added (id 7)")
    fn success(&self, message: &str);

    /// Warning message (e.g., "Ingestion service not answering")
    fn warning(&self, message: &str);

    /// Inline progress (no trailing newline). Call `finish_progress` after.
    fn progress(&self, message: &str);

    /// Finish an inline progress line with a result.
    fn finish_progress(&self, result: &str);

    /// A blank line separator.
    fn blank(&self);
}

/// Standard CLI output. Writes to stdout/stderr.
pub struct CliOutput;

impl UserOutput for CliOutput {
    fn status(&self, message: &str) {
        println!("{}", message);
    }

    fn success(&self, message: &str) {
        println!("{}", message);
    }

    fn warning(&self, message: &str) {
        eprintln!("{}", message);
    }

    fn progress(&self, message: &str) {
        print!("{}", message);
        std::io::stdout().flush().ok();
    }

    fn finish_progress(&self, result: &str) {
        println!("{}", result);
    }

    fn blank(&self) {
        println!();
    }
}

/// Records every line, for tests.
#[cfg(test)]
#[derive(Default)]
pub struct RecordingOutput {
    lines: std::sync::Mutex<Vec<String>>,
    pending: std::sync::Mutex<String>,
}

#[cfg(test)]
impl RecordingOutput {
    pub fn text(&self) -> String {
        self.lines.lock().unwrap().join("\n")
    }

    fn push(&self, line: String) {
        self.lines.lock().unwrap().push(line);
    }
}

#[cfg(test)]
impl UserOutput for RecordingOutput {
    fn status(&self, message: &str) {
        self.push(message.to_string());
    }

    fn success(&self, message: &str) {
        self.push(message.to_string());
    }

    fn warning(&self, message: &str) {
        self.push(message.to_string());
    }

    fn progress(&self, message: &str) {
        self.pending.lock().unwrap().push_str(message);
    }

    fn finish_progress(&self, result: &str) {
        let prefix = std::mem::take(&mut *self.pending.lock().unwrap());
        self.push(format!("{}{}", prefix, result));
    }

    fn blank(&self) {
        self.push(String::new());
    }
}
