//! Interactive fact-check session runner.
//!
//! Prompts for a subject and optional context, hands them to an
//! [`AnalysisAgent`], prints the result and optionally exports the session.
//! Failures are reported to the user and returned as a [`RunOutcome`];
//! nothing here retries.

use std::io::{self, Write};
use std::path::PathBuf;

use thiserror::Error;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio_util::sync::CancellationToken;

use crate::ai::{AgentError, AnalysisAgent};
use crate::config::{ExportMode, OutputConfig};
use crate::display;
use crate::session::SessionError;

const SUBJECT_PROMPT: &str = "Enter the subject to fact-check:";
const CONTEXT_PROMPT: &str = "Additional context (optional, press Enter to skip):";
const EXPORT_PROMPT: &str = "Export session to JSON? [y/N]:";

/// Errors that end a run early.
#[derive(Error, Debug)]
pub enum RunnerError {
    #[error("Subject cannot be empty")]
    EmptySubject,
    #[error("Interrupted by user")]
    Interrupted,
    #[error("Fact-check failed: {0}")]
    Agent(#[from] AgentError),
    #[error("Failed to export session: {0}")]
    Export(#[from] SessionError),
    #[error("Terminal I/O failed: {0}")]
    Io(#[from] io::Error),
}

/// How a run ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// Analysis printed; `export_path` is set when a file was written.
    Completed { export_path: Option<PathBuf> },
    EmptySubject,
    Interrupted,
    AgentFailed,
    ExportFailed,
    InputFailed,
}

impl RunOutcome {
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Completed { .. })
    }
}

/// Runner settings.
#[derive(Debug, Clone)]
pub struct RunnerOptions {
    pub output_dir: PathBuf,
    pub export: ExportMode,
}

impl Default for RunnerOptions {
    fn default() -> Self {
        Self::from(&OutputConfig::default())
    }
}

impl From<&OutputConfig> for RunnerOptions {
    fn from(config: &OutputConfig) -> Self {
        Self {
            output_dir: config.dir.clone(),
            export: config.export,
        }
    }
}

/// Drives one fact-check session over the given input and output streams.
pub struct SessionRunner<A, R, W> {
    agent: A,
    input: R,
    output: W,
    options: RunnerOptions,
}

impl<A, R, W> SessionRunner<A, R, W>
where
    A: AnalysisAgent,
    R: AsyncBufRead + Unpin,
    W: Write,
{
    pub fn new(agent: A, input: R, output: W, options: RunnerOptions) -> Self {
        Self {
            agent,
            input,
            output,
            options,
        }
    }

    /// Consume the runner, returning its output stream.
    pub fn into_output(self) -> W {
        self.output
    }

    /// Run one session, reporting any failure to the output stream.
    ///
    /// Cancelling `cancel` abandons a pending prompt or the analysis; no
    /// export is written after cancellation.
    pub async fn run(&mut self, cancel: &CancellationToken) -> RunOutcome {
        match self.try_run(cancel).await {
            Ok(export_path) => RunOutcome::Completed { export_path },
            Err(e) => {
                let _ = self.report(&e);
                match e {
                    RunnerError::EmptySubject => RunOutcome::EmptySubject,
                    RunnerError::Interrupted => RunOutcome::Interrupted,
                    RunnerError::Agent(_) => RunOutcome::AgentFailed,
                    RunnerError::Export(_) => RunOutcome::ExportFailed,
                    RunnerError::Io(_) => RunOutcome::InputFailed,
                }
            }
        }
    }

    async fn try_run(&mut self, cancel: &CancellationToken) -> Result<Option<PathBuf>, RunnerError> {
        let subject = self.prompt(SUBJECT_PROMPT, cancel).await?;
        if subject.is_empty() {
            return Err(RunnerError::EmptySubject);
        }

        let context = self.prompt(CONTEXT_PROMPT, cancel).await?;
        let context = (!context.is_empty()).then_some(context);

        tracing::info!(subject = %subject, has_context = context.is_some(), "Starting analysis");

        let session = tokio::select! {
            biased;
            () = cancel.cancelled() => return Err(RunnerError::Interrupted),
            result = self.agent.start_analysis(&subject, context.as_deref()) => result?,
        };

        display::write_result(&mut self.output, &session.final_output)?;

        if !self.should_export(cancel).await? {
            return Ok(None);
        }
        if cancel.is_cancelled() {
            return Err(RunnerError::Interrupted);
        }

        let path = self.options.output_dir.join(session.export_filename());
        session.export_session(&path)?;
        tracing::info!(path = %path.display(), "Session exported");
        display::write_export(&mut self.output, &path)?;

        Ok(Some(path))
    }

    async fn should_export(&mut self, cancel: &CancellationToken) -> Result<bool, RunnerError> {
        match self.options.export {
            ExportMode::Always => Ok(true),
            ExportMode::Never => Ok(false),
            ExportMode::Ask => {
                let answer = self.prompt(EXPORT_PROMPT, cancel).await?.to_lowercase();
                Ok(matches!(answer.as_str(), "y" | "yes"))
            }
        }
    }

    /// Ask a question and read one trimmed line. End of input reads as empty.
    async fn prompt(
        &mut self,
        question: &str,
        cancel: &CancellationToken,
    ) -> Result<String, RunnerError> {
        display::write_prompt(&mut self.output, question)?;
        let mut line = String::new();
        let read = tokio::select! {
            biased;
            () = cancel.cancelled() => {
                writeln!(self.output)?;
                return Err(RunnerError::Interrupted);
            }
            read = self.input.read_line(&mut line) => read?,
        };
        if read == 0 {
            writeln!(self.output)?;
        }
        Ok(line.trim().to_string())
    }

    fn report(&mut self, error: &RunnerError) -> io::Result<()> {
        match error {
            RunnerError::EmptySubject => {
                tracing::warn!("Empty subject, aborting");
                display::write_error(&mut self.output, "Subject cannot be empty", None)
            }
            RunnerError::Interrupted => {
                tracing::warn!("Session interrupted");
                display::write_warning(&mut self.output, "Session interrupted by user")
            }
            RunnerError::Agent(e) => {
                tracing::error!(error = %e, "Analysis failed");
                display::write_error(
                    &mut self.output,
                    "Fact-check failed",
                    Some(&e.to_string()),
                )
            }
            RunnerError::Export(e) => {
                tracing::error!(error = %e, "Export failed");
                display::write_error(
                    &mut self.output,
                    "Failed to export session",
                    Some(&e.to_string()),
                )
            }
            RunnerError::Io(e) => {
                tracing::error!(error = %e, "Terminal I/O failed");
                display::write_error(&mut self.output, "Terminal I/O failed", Some(&e.to_string()))
            }
        }
    }
}
