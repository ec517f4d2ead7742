// Interface to the external diagnostic tool

mod process;

pub use process::{ProcessExecutor, ProcessExecutorFactory, smartctl_exit_status_messages};

use crate::error::ExecutorError;

/// Which external tool an executor runs
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ExecutorKind {
    Smartctl,
}

/// Captured result of one run
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ExecutorOutput {
    pub stdout: String,
    pub stderr: String,
    /// None if the process was killed by a signal
    pub exit_status: Option<i32>,
}

/// Runs a diagnostic tool and keeps the output of the last run.
pub trait CommandExecutor {
    /// Runs the tool with `args`. Fatal exit statuses are reported as errors,
    /// but the output stays available through `stdout_str()`.
    fn execute(&mut self, args: &[String]) -> Result<ExecutorOutput, ExecutorError>;

    /// Progress text for whoever displays it. Has no effect on execution.
    fn set_running_msg(&mut self, msg: &str);

    /// Standard output of the last run
    fn stdout_str(&self) -> &str;
}

/// Creates a fresh executor per use.
pub trait ExecutorFactory {
    fn create_executor(&self, kind: ExecutorKind) -> Box<dyn CommandExecutor>;
}
