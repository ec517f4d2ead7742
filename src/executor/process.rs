use super::{CommandExecutor, ExecutorFactory, ExecutorKind, ExecutorOutput};
use crate::error::ExecutorError;
use std::io;
use std::process::Command;
use tracing::{debug, warn};

/// smartctl exit status bits, see smartctl(8)
const SMARTCTL_EXIT_BITS: [&str; 8] = [
    "Command line did not parse.",
    "Device open failed, device did not return an IDENTIFY DEVICE structure, or device is in a low-power mode.",
    "Some SMART or other ATA command to the disk failed, or there was a checksum error in a SMART data structure.",
    "SMART status check returned \"DISK FAILING\".",
    "We found prefail Attributes <= threshold.",
    "SMART status check returned \"DISK OK\" but we found that some (usage or prefail) Attributes have been <= threshold at some time in the past.",
    "The device error log contains records of errors.",
    "The device self-test log contains records of errors.",
];

/// Bits 0 and 1 mean smartctl could not do anything useful.
const SMARTCTL_FATAL_MASK: i32 = 0b11;

/// Describes each bit set in a smartctl exit status.
pub fn smartctl_exit_status_messages(status: i32) -> Vec<&'static str> {
    SMARTCTL_EXIT_BITS
        .iter()
        .enumerate()
        .filter(|(bit, _)| status & (1 << bit) != 0)
        .map(|(_, msg)| *msg)
        .collect()
}

/// Runs an external binary with `std::process::Command`.
#[derive(Debug)]
pub struct ProcessExecutor {
    kind: ExecutorKind,
    binary: String,
    running_msg: String,
    stdout: String,
}

impl ProcessExecutor {
    pub fn new(kind: ExecutorKind, binary: impl Into<String>) -> Self {
        Self {
            kind,
            binary: binary.into(),
            running_msg: String::new(),
            stdout: String::new(),
        }
    }

    pub fn running_msg(&self) -> &str {
        &self.running_msg
    }

    fn check_status(&self, status: Option<i32>) -> Result<(), ExecutorError> {
        let Some(status) = status else {
            return Err(ExecutorError::Failed {
                binary: self.binary.clone(),
                status: -1,
                reason: "terminated by a signal".to_string(),
            });
        };

        match self.kind {
            ExecutorKind::Smartctl => {
                if status & SMARTCTL_FATAL_MASK != 0 {
                    return Err(ExecutorError::Failed {
                        binary: self.binary.clone(),
                        status,
                        reason: smartctl_exit_status_messages(status & SMARTCTL_FATAL_MASK).join(" "),
                    });
                }
                for msg in smartctl_exit_status_messages(status) {
                    debug!("{} exit status {}: {}", self.binary, status, msg);
                }
            }
        }
        Ok(())
    }
}

impl CommandExecutor for ProcessExecutor {
    fn execute(&mut self, args: &[String]) -> Result<ExecutorOutput, ExecutorError> {
        debug!("Executing: {} {}", self.binary, args.join(" "));
        self.stdout.clear();

        let output = Command::new(&self.binary)
            .args(args)
            .output()
            .map_err(|e| match e.kind() {
                io::ErrorKind::NotFound => ExecutorError::NotFound {
                    binary: self.binary.clone(),
                },
                _ => ExecutorError::Io {
                    binary: self.binary.clone(),
                    source: e,
                },
            })?;

        // windows line endings would confuse the parsers
        self.stdout = String::from_utf8_lossy(&output.stdout).replace("\r\n", "\n");
        let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
        if !stderr.trim().is_empty() {
            warn!("{} printed to stderr: {}", self.binary, stderr.trim());
        }

        let exit_status = output.status.code();
        self.check_status(exit_status)?;

        Ok(ExecutorOutput {
            stdout: self.stdout.clone(),
            stderr,
            exit_status,
        })
    }

    fn set_running_msg(&mut self, msg: &str) {
        debug!("{}", msg);
        self.running_msg = msg.to_string();
    }

    fn stdout_str(&self) -> &str {
        &self.stdout
    }
}

/// Creates process executors for the configured binaries.
#[derive(Clone, Debug)]
pub struct ProcessExecutorFactory {
    smartctl_binary: String,
}

impl ProcessExecutorFactory {
    pub fn new(smartctl_binary: impl Into<String>) -> Self {
        Self {
            smartctl_binary: smartctl_binary.into(),
        }
    }
}

impl ExecutorFactory for ProcessExecutorFactory {
    fn create_executor(&self, kind: ExecutorKind) -> Box<dyn CommandExecutor> {
        let binary = match kind {
            ExecutorKind::Smartctl => self.smartctl_binary.clone(),
        };
        Box::new(ProcessExecutor::new(kind, binary))
    }
}
