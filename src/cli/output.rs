//! Colored output helpers for the deepr CLI
//!
//! Status lines go to stderr so stdout carries only the report and can be
//! piped or redirected.

use crate::progress::{ProgressEvent, ProgressSink};
use crate::types::PipelineState;
use owo_colors::OwoColorize;

/// Output style configuration
#[derive(Debug, Clone, Copy)]
pub struct Output {
    /// Whether to use colored output
    pub colored: bool,
}

impl Default for Output {
    fn default() -> Self {
        Self::new()
    }
}

impl Output {
    /// Create a new output helper with colors enabled
    pub fn new() -> Self {
        Self { colored: true }
    }

    /// Create a new output helper with colors disabled
    pub fn no_color() -> Self {
        Self { colored: false }
    }

    pub fn banner(&self) {
        if self.colored {
            eprintln!(
                "\n  {} {}\n  {}\n",
                "deepr".bright_cyan().bold(),
                format!("v{}", env!("CARGO_PKG_VERSION")).dimmed(),
                "Deep research, then elaboration".bright_white()
            );
        } else {
            eprintln!(
                "\n  deepr v{}\n  Deep research, then elaboration\n",
                env!("CARGO_PKG_VERSION")
            );
        }
    }

    /// Print a success message with a checkmark
    pub fn success(&self, message: &str) {
        if self.colored {
            eprintln!("  {} {}", "✓".green().bold(), message.green());
        } else {
            eprintln!("  [OK] {}", message);
        }
    }

    pub fn info(&self, message: &str) {
        if self.colored {
            eprintln!("  {} {}", "•".blue(), message);
        } else {
            eprintln!("  [INFO] {}", message);
        }
    }

    pub fn warning(&self, message: &str) {
        if self.colored {
            eprintln!("  {} {}", "⚠".yellow().bold(), message.yellow());
        } else {
            eprintln!("  [WARN] {}", message);
        }
    }

    pub fn error(&self, message: &str) {
        if self.colored {
            eprintln!("  {} {}", "✗".red().bold(), message.red());
        } else {
            eprintln!("  [ERROR] {}", message);
        }
    }

    /// Print a step message (for multi-step operations)
    pub fn step(&self, step_num: u32, total: u32, message: &str) {
        if self.colored {
            eprintln!(
                "  {} {}",
                format!("[{}/{}]", step_num, total).dimmed(),
                message.bright_white()
            );
        } else {
            eprintln!("  [{}/{}] {}", step_num, total, message);
        }
    }

    /// Print a file creation message
    pub fn created(&self, file_type: &str, path: &str) {
        if self.colored {
            eprintln!(
                "  {} {} {}",
                "✓".green().bold(),
                file_type.dimmed(),
                path.bright_white()
            );
        } else {
            eprintln!("  [CREATED] {} {}", file_type, path);
        }
    }

    pub fn skipped(&self, path: &str, reason: &str) {
        if self.colored {
            eprintln!(
                "  {} {} {}",
                "○".yellow(),
                path.dimmed(),
                format!("({})", reason).yellow()
            );
        } else {
            eprintln!("  [SKIPPED] {} ({})", path, reason);
        }
    }

    /// Print a header for a section
    pub fn header(&self, title: &str) {
        if self.colored {
            eprintln!("\n  {}", title.bright_white().bold().underline());
        } else {
            eprintln!("\n  === {} ===", title);
        }
    }

    /// Print a key-value pair
    pub fn kv(&self, key: &str, value: &str) {
        if self.colored {
            eprintln!("    {}: {}", key.dimmed(), value.bright_white());
        } else {
            eprintln!("    {}: {}", key, value);
        }
    }

    pub fn hint(&self, message: &str) {
        if self.colored {
            eprintln!("\n  {} {}", "tip:".dimmed(), message.dimmed().italic());
        } else {
            eprintln!("\n  [TIP] {}", message);
        }
    }

    /// Print a command suggestion
    pub fn command(&self, cmd: &str) {
        if self.colored {
            eprintln!("     {}", format!("$ {}", cmd).bright_cyan());
        } else {
            eprintln!("     $ {}", cmd);
        }
    }

    /// Print a titled report body to stderr, framed so it stands apart from
    /// progress lines
    pub fn report_preview(&self, title: &str, body: &str) {
        self.header(title);
        for line in body.lines() {
            if self.colored {
                eprintln!("  {} {}", "│".dimmed(), line);
            } else {
                eprintln!("  | {}", line);
            }
        }
        eprintln!();
    }

    /// Write the final report to stdout
    pub fn report(&self, body: &str) {
        println!("{}", body);
    }
}

/// Progress sink that renders pipeline events as console status lines
#[derive(Debug, Clone, Copy)]
pub struct ConsoleSink {
    output: Output,
    show_initial: bool,
}

impl ConsoleSink {
    pub fn new(output: Output) -> Self {
        Self {
            output,
            show_initial: false,
        }
    }

    /// Also print the initial report before elaboration starts
    pub fn with_initial_report(mut self, show: bool) -> Self {
        self.show_initial = show;
        self
    }
}

impl ProgressSink for ConsoleSink {
    fn notify(&self, event: ProgressEvent) {
        match event {
            ProgressEvent::StateChanged { to, .. } => match to {
                PipelineState::Researching => {
                    self.output
                        .step(1, 2, "Running deep research (this can take a few minutes)...")
                }
                PipelineState::Elaborating => {
                    self.output.step(2, 2, "Enhancing the report with elaboration...")
                }
                PipelineState::Done => self.output.success("Research complete"),
                PipelineState::Failed => self.output.error("Research run failed"),
                PipelineState::Idle => {}
            },
            ProgressEvent::ResearchInFlight { query } => {
                self.output.info(&format!("Researching: {}", query));
            }
            ProgressEvent::ToolFailure { message } => {
                self.output
                    .warning(&format!("Deep research failed: {}", message));
            }
            ProgressEvent::InitialReport(report) => {
                if self.show_initial {
                    self.output.report_preview("Initial Research Report", &report);
                } else {
                    self.output.success("Initial report ready");
                }
            }
            ProgressEvent::FinalReport(_) => {
                self.output.success("Enhanced report ready");
            }
            ProgressEvent::Error { stage, message } => {
                self.output.error(&format!("{} error: {}", stage, message));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Stage;

    #[test]
    fn test_output_new() {
        let output = Output::new();
        assert!(output.colored);
    }

    #[test]
    fn test_output_no_color() {
        let output = Output::no_color();
        assert!(!output.colored);
    }

    #[test]
    fn test_output_methods_no_panic() {
        for output in [Output::no_color(), Output::new()] {
            output.banner();
            output.success("test success");
            output.info("test info");
            output.warning("test warning");
            output.error("test error");
            output.step(1, 2, "step message");
            output.created("file", "deepr.toml");
            output.skipped("deepr.toml", "exists");
            output.header("Test Header");
            output.kv("key", "value");
            output.hint("hint message");
            output.command("deepr research \"topic\"");
            output.report_preview("Preview", "line one\nline two");
        }
    }

    #[test]
    fn test_console_sink_handles_every_event() {
        let sink = ConsoleSink::new(Output::no_color()).with_initial_report(true);
        assert!(sink.show_initial);

        sink.notify(ProgressEvent::StateChanged {
            from: PipelineState::Idle,
            to: PipelineState::Researching,
        });
        sink.notify(ProgressEvent::ResearchInFlight {
            query: "fusion".to_string(),
        });
        sink.notify(ProgressEvent::ToolFailure {
            message: "timeout".to_string(),
        });
        sink.notify(ProgressEvent::InitialReport("# Report".to_string()));
        sink.notify(ProgressEvent::FinalReport("# Final".to_string()));
        sink.notify(ProgressEvent::Error {
            stage: Stage::Elaboration,
            message: "boom".to_string(),
        });
    }
}
