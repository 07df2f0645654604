//! Core logging types: step entries, status, and the [`Log`] trait.

/// Outcome of one reported step, kept for the run summary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepEntry {
    /// Human-readable step description.
    pub name: String,
    /// Final status of the step.
    pub status: StepStatus,
    /// Optional detail, such as the failure trace.
    pub message: Option<String>,
}

/// Status of a completed step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepStatus {
    /// The step succeeded.
    Ok,
    /// The step failed.
    Failed,
}

impl StepStatus {
    /// `Ok` when `success`, otherwise `Failed`.
    #[must_use]
    pub const fn from_success(success: bool) -> Self {
        if success { Self::Ok } else { Self::Failed }
    }
}

/// Abstraction over logging backends, so reporting code can be exercised
/// without a global subscriber.
pub trait Log: Send + Sync + std::fmt::Debug {
    /// Log a stage header (major section).
    fn stage(&self, msg: &str);
    /// Log an informational message.
    fn info(&self, msg: &str);
    /// Log a debug message (may be suppressed on console).
    fn debug(&self, msg: &str);
    /// Log a warning message.
    fn warn(&self, msg: &str);
    /// Log an error message.
    fn error(&self, msg: &str);
    /// Record a step result for the summary.
    fn record_step(&self, name: &str, status: StepStatus, message: Option<&str>);
    /// Report every recorded step.
    fn print_summary(&self);
}
