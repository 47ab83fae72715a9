//! Console rendering of build events

use colored::Colorize;
use tieforge_build::{BuildReporter, BuildStatus, OutputLine, Severity};

/// Reporter that renders build events to the terminal
///
/// Output lines go to stdout so they can be piped; status transitions and
/// configuration problems go to stderr.
pub struct ConsoleReporter;

impl BuildReporter for ConsoleReporter {
    fn report_status(&self, status: BuildStatus) {
        match status {
            BuildStatus::Running => eprintln!("{}", "build started".dimmed()),
            BuildStatus::Succeeded => eprintln!("{}", "build succeeded".green().bold()),
            BuildStatus::Failed => eprintln!("{}", "build failed".red().bold()),
            BuildStatus::Idle => {}
        }
    }

    fn stream_output_line(&self, line: &OutputLine) {
        let rendered = match line.severity {
            Severity::Error => line.rendered.red().to_string(),
            Severity::Warning => line.rendered.yellow().to_string(),
            Severity::Success => line.rendered.green().to_string(),
            Severity::Info => line.rendered.clone(),
        };
        println!("{rendered}");
    }

    fn notify_configuration_missing(&self) {
        eprintln!(
            "{}",
            "no build tool configured: record one in .tiecode.json or place \
             tmake in the project root"
                .red()
        );
    }
}
