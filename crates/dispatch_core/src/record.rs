use std::path::PathBuf;

use crate::{CommandLine, JobOutcome};

/// Rule line framing the status block of a log record.
pub const SEPARATOR: &str = "========================================";

const STATUS_PREFIX: &str = "STATUS: ";

/// Everything a job's log file holds, rendered in one piece.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogRecord {
    pub started_at: String,
    pub output: String,
    pub file: PathBuf,
    pub command: CommandLine,
    pub outcome: JobOutcome,
    pub finished_at: String,
}

impl LogRecord {
    pub fn render(&self) -> String {
        let mut text = String::with_capacity(self.output.len() + 512);
        text.push_str("Started at: ");
        text.push_str(&self.started_at);
        text.push('\n');
        text.push_str(&self.output);
        if !self.output.is_empty() && !self.output.ends_with('\n') {
            text.push('\n');
        }
        text.push_str(&format!("File: {}\n", self.file.display()));
        text.push_str(&format!("Command: {}\n", self.command));
        text.push_str(SEPARATOR);
        text.push('\n');
        text.push_str(&format!("{STATUS_PREFIX}{}\n", self.outcome));
        text.push_str(&format!("Finished at: {}\n", self.finished_at));
        text.push_str(SEPARATOR);
        text.push('\n');
        text
    }
}

/// Number of `STATUS:` lines in a rendered record.
///
/// Solver output is copied verbatim, so only lines directly preceded by the
/// separator count.
pub fn count_status_lines(content: &str) -> usize {
    let lines: Vec<&str> = content.lines().collect();
    lines
        .windows(2)
        .filter(|pair| pair[0] == SEPARATOR && pair[1].starts_with(STATUS_PREFIX))
        .count()
}

/// Whether a log file's content carries a terminal status, i.e. the job that
/// wrote it ran to an outcome.
pub fn has_terminal_status(content: &str) -> bool {
    count_status_lines(content) > 0
}
