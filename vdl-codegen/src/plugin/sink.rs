//! Destinations for plugin diagnostics.

use std::io::Write;
use std::sync::Mutex;

/// Receives each stderr line of a plugin as it is produced.
pub trait DiagnosticSink: Send + Sync {
    /// Handle one line, without its terminator.
    fn line(&self, target: &str, line: &str);
}

/// Forwards lines to the user's stderr, prefixed with the target name.
#[derive(Debug, Clone, Copy, Default)]
pub struct StderrSink;

impl DiagnosticSink for StderrSink {
    fn line(&self, target: &str, line: &str) {
        let mut stderr = std::io::stderr().lock();
        // Nowhere to report a failing stderr.
        let _ = writeln!(stderr, "[{target}] {line}");
    }
}

/// Keeps every line in memory.
#[derive(Debug, Default)]
pub struct CollectingSink {
    lines: Mutex<Vec<(String, String)>>,
}

impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Collected `(target, line)` pairs in arrival order.
    pub fn lines(&self) -> Vec<(String, String)> {
        match self.lines.lock() {
            Ok(lines) => lines.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

impl DiagnosticSink for CollectingSink {
    fn line(&self, target: &str, line: &str) {
        let entry = (target.to_string(), line.to_string());
        match self.lines.lock() {
            Ok(mut lines) => lines.push(entry),
            Err(poisoned) => poisoned.into_inner().push(entry),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collecting_sink_keeps_order() {
        let sink = CollectingSink::new();
        sink.line("ts", "first");
        sink.line("go", "second");
        assert_eq!(
            sink.lines(),
            vec![
                ("ts".to_string(), "first".to_string()),
                ("go".to_string(), "second".to_string())
            ]
        );
    }
}
