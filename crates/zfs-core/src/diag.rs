//! Where echoed errors go.
//!
//! The handle hands every echo line to a [`DiagnosticSink`]. The default
//! writes to stderr; tests swap in a [`CaptureSink`] and inspect the lines.

use std::sync::{Arc, Mutex};

pub trait DiagnosticSink: Send + Sync {
    /// Emit one complete line, without trailing newline.
    fn emit(&self, line: &str);
}

/// Plain stderr, one line per echo, regardless of `ZFS_LOG_LEVEL`.
#[derive(Debug, Default, Clone, Copy)]
pub struct StderrSink;

impl DiagnosticSink for StderrSink {
    fn emit(&self, line: &str) {
        crate::kprint::write_line(line);
    }
}

/// Collects lines in memory. Clones share the same buffer.
#[derive(Debug, Default, Clone)]
pub struct CaptureSink {
    lines: Arc<Mutex<Vec<String>>>,
}

impl CaptureSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> Vec<String> {
        match self.lines.lock() {
            Ok(g) => g.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn clear(&self) {
        match self.lines.lock() {
            Ok(mut g) => g.clear(),
            Err(poisoned) => poisoned.into_inner().clear(),
        }
    }
}

impl DiagnosticSink for CaptureSink {
    fn emit(&self, line: &str) {
        match self.lines.lock() {
            Ok(mut g) => g.push(line.to_string()),
            Err(poisoned) => poisoned.into_inner().push(line.to_string()),
        }
    }
}
