use std::path::PathBuf;
use std::time::Duration;

use dispatch_core::{
    count_status_lines, has_terminal_status, CommandLine, JobOutcome, LogRecord, SEPARATOR,
};
use pretty_assertions::assert_eq;

fn record(outcome: JobOutcome, output: &str) -> LogRecord {
    LogRecord {
        started_at: "Mon Mar 03 10:00:00 2025".into(),
        output: output.into(),
        file: PathBuf::from("/bench/6s0.aig"),
        command: CommandLine::new("rIC3").args(["-e", "ic3", "/bench/6s0.aig"]),
        outcome,
        finished_at: "Mon Mar 03 10:00:05 2025".into(),
    }
}

#[test]
fn completed_record_layout() {
    let text = record(JobOutcome::Completed { exit_code: Some(10) }, "result: unsafe\n").render();
    let expected = format!(
        "Started at: Mon Mar 03 10:00:00 2025\n\
         result: unsafe\n\
         File: /bench/6s0.aig\n\
         Command: rIC3 -e ic3 /bench/6s0.aig\n\
         {SEPARATOR}\n\
         STATUS: COMPLETED\n\
         Finished at: Mon Mar 03 10:00:05 2025\n\
         {SEPARATOR}\n"
    );
    assert_eq!(text, expected);
}

#[test]
fn timeout_status_names_the_deadline() {
    let text = record(
        JobOutcome::TimedOut {
            deadline: Duration::from_secs(3600),
        },
        "partial",
    )
    .render();
    assert!(text.contains("partial\nFile: "));
    assert!(text.contains("\nSTATUS: TIMEOUT (exceeded 3600 seconds)\n"));
}

#[test]
fn submission_failure_carries_reason() {
    let text = record(
        JobOutcome::SubmissionFailed {
            reason: "bsub: not found".into(),
        },
        "",
    )
    .render();
    assert!(text.starts_with("Started at: Mon Mar 03 10:00:00 2025\nFile: "));
    assert!(text.contains("STATUS: SUBMISSION FAILED (bsub: not found)"));
}

#[test]
fn status_lines_in_solver_output_are_not_counted() {
    let text = record(
        JobOutcome::Completed { exit_code: None },
        "STATUS: pretend\nmore output\n",
    )
    .render();
    assert_eq!(count_status_lines(&text), 1);
    assert!(has_terminal_status(&text));
}

#[test]
fn truncated_record_has_no_terminal_status() {
    let text = "Started at: Mon Mar 03 10:00:00 2025\nsolver output\n";
    assert!(!has_terminal_status(text));
    assert_eq!(count_status_lines(""), 0);
}
