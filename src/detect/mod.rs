// Device detection: platform discovery, blacklist filtering and basic data fetch

mod linux;
mod other;
mod windows;

pub use linux::ProcPartitionsDiscovery;
pub use other::DevDirDiscovery;
pub use windows::ScanOpenDiscovery;

use crate::error::{DetectError, FetchError};
use crate::executor::{ExecutorFactory, ExecutorKind};
use crate::storage::StorageDevice;
use regex::Regex;
use tracing::{debug, info, warn};

/// What a discovery strategy found.
/// A strategy may find some devices and still report the last error it hit.
#[derive(Debug, Default)]
pub struct Discovery {
    /// Devices in discovery order
    pub devices: Vec<StorageDevice>,
    /// Human-readable message of the last failure, if any
    pub last_error: Option<String>,
}

/// One way of enumerating candidate devices. Exactly one is used per platform.
pub trait DiscoveryStrategy {
    fn name(&self) -> &'static str;

    fn discover(&self, ex_factory: &dyn ExecutorFactory) -> Discovery;
}

/// The discovery strategy for the platform we were built for.
pub fn platform_strategy() -> Box<dyn DiscoveryStrategy> {
    #[cfg(target_os = "linux")]
    {
        Box::new(ProcPartitionsDiscovery::default())
    }
    #[cfg(windows)]
    {
        Box::new(ScanOpenDiscovery)
    }
    #[cfg(not(any(target_os = "linux", windows)))]
    {
        Box::new(DevDirDiscovery::default())
    }
}

/// Detects drives and fetches their basic data.
///
/// Fetch failures are collected per device in two parallel lists (errors
/// and the smartctl output that produced them), indexed identically.
pub struct StorageDetector {
    strategy: Box<dyn DiscoveryStrategy>,
    blacklist_patterns: Vec<Regex>,
    fetch_data_errors: Vec<FetchError>,
    fetch_data_error_outputs: Vec<String>,
}

impl StorageDetector {
    pub fn new(strategy: Box<dyn DiscoveryStrategy>) -> Self {
        Self {
            strategy,
            blacklist_patterns: Vec::new(),
            fetch_data_errors: Vec::new(),
            fetch_data_error_outputs: Vec::new(),
        }
    }

    /// Detector using `platform_strategy()`
    pub fn for_platform() -> Self {
        Self::new(platform_strategy())
    }

    /// Devices whose path matches any of these are ignored.
    pub fn set_blacklist_patterns(&mut self, patterns: Vec<Regex>) {
        self.blacklist_patterns = patterns;
    }

    fn is_blacklisted(&self, drive: &StorageDevice) -> bool {
        self.blacklist_patterns
            .iter()
            .any(|re| re.is_match(drive.device()))
    }

    /// Finds the drives present in the system, minus blacklisted ones, sorted.
    pub fn detect(&self, ex_factory: &dyn ExecutorFactory) -> Result<Vec<StorageDevice>, DetectError> {
        info!("Starting drive detection using {}", self.strategy.name());

        let Discovery { devices, last_error } = self.strategy.discover(ex_factory);

        if devices.is_empty() {
            warn!("Cannot detect drives: none of the drive detection methods returned any drives");
            return Err(DetectError::NoDevices {
                message: last_error.unwrap_or_else(|| {
                    "None of the drive detection methods returned any drives.".to_string()
                }),
            });
        }
        if let Some(err) = last_error {
            warn!("Drive detection finished with an error: {}", err);
        }

        let mut drives: Vec<StorageDevice> = devices
            .into_iter()
            .filter(|drive| {
                info!("Found device: {}", drive.device_with_type());
                let blacklisted = self.is_blacklisted(drive);
                if blacklisted {
                    info!("Device {} is blacklisted, ignoring", drive.device_with_type());
                }
                !blacklisted
            })
            .collect();

        // discovery order depends on the platform, sort for stable presentation
        drives.sort_by(StorageDevice::cmp_identity);

        info!("Drive detection finished, {} drives", drives.len());
        Ok(drives)
    }

    /// Fetches basic data for each drive that doesn't have it yet.
    ///
    /// Failures are recorded in `fetch_data_errors()` / `fetch_data_error_outputs()`
    /// and don't stop the loop. With `return_first_error`, the first failure is
    /// returned right away instead; the lists then only hold what was recorded
    /// before it and should not be relied upon.
    pub fn fetch_basic_data(
        &mut self,
        drives: &mut [StorageDevice],
        ex_factory: &dyn ExecutorFactory,
        return_first_error: bool,
    ) -> Result<(), FetchError> {
        self.fetch_data_errors.clear();
        self.fetch_data_error_outputs.clear();

        let mut smartctl_ex = ex_factory.create_executor(ExecutorKind::Smartctl);

        for drive in drives.iter_mut() {
            debug!("Retrieving basic information about {}", drive.device_with_type());
            smartctl_ex.set_running_msg(&format!("Running smartctl on {}...", drive.device_with_type()));

            // already fetched during detection
            if !drive.info_output().is_empty() {
                continue;
            }

            if let Err(err) = drive.fetch_basic_data_and_parse(smartctl_ex.as_mut()) {
                if return_first_error {
                    return Err(err);
                }
                // usually scsi devices and the like, just skip them
                debug!("Skipping {}: {}", drive.device_with_type(), err);
                self.fetch_data_errors.push(err);
                self.fetch_data_error_outputs
                    .push(drive.failed_output().to_string());
            }

            debug!(
                "Device information for {}: model {:?}, detected type {}, SMART status {}",
                drive.device_with_type(),
                drive.model_name(),
                drive.detected_type().storable_name(),
                drive.smart_status().displayable_name()
            );
        }

        Ok(())
    }

    /// `detect()` followed by `fetch_basic_data()` without short-circuiting.
    /// Fetch errors stay available through `fetch_data_errors()`.
    pub fn detect_and_fetch_basic_data(
        &mut self,
        ex_factory: &dyn ExecutorFactory,
    ) -> Result<Vec<StorageDevice>, DetectError> {
        let mut drives = self.detect(ex_factory)?;
        // without return_first_error, failures only land in the accumulated lists
        match self.fetch_basic_data(&mut drives, ex_factory, false) {
            Ok(()) => {}
            Err(err) => warn!("Unexpected fetch error: {}", err),
        }
        Ok(drives)
    }

    pub fn fetch_data_errors(&self) -> &[FetchError] {
        &self.fetch_data_errors
    }

    /// smartctl output for each entry of `fetch_data_errors()`
    pub fn fetch_data_error_outputs(&self) -> &[String] {
        &self.fetch_data_error_outputs
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use crate::error::ExecutorError;
    use crate::executor::{CommandExecutor, ExecutorFactory, ExecutorKind, ExecutorOutput};
    use std::cell::RefCell;
    use std::collections::{HashMap, HashSet};
    use std::rc::Rc;

    /// Executor factory answering from canned outputs, recording every device queried
    #[derive(Default)]
    pub struct FakeFactory {
        pub calls: Rc<RefCell<Vec<String>>>,
        pub failing: HashSet<String>,
        /// Output for a given argument list joined by spaces; overrides the default
        pub canned: HashMap<String, String>,
    }

    pub fn ata_output(model: &str) -> String {
        format!(
            "smartctl 7.3 2022-02-28 r5338 [x86_64-linux-6.1.0] (local build)

=== START OF INFORMATION SECTION ===
Device Model:     {model}
Rotation Rate:    7200 rpm
SMART support is: Available - device has SMART capability.
SMART support is: Enabled

=== START OF READ SMART DATA SECTION ===
SMART overall-health self-assessment test result: PASSED
"
        )
    }

    struct FakeExecutor {
        calls: Rc<RefCell<Vec<String>>>,
        failing: HashSet<String>,
        canned: HashMap<String, String>,
        stdout: String,
    }

    impl CommandExecutor for FakeExecutor {
        fn execute(&mut self, args: &[String]) -> Result<ExecutorOutput, ExecutorError> {
            let device = args.last().cloned().unwrap_or_default();
            self.calls.borrow_mut().push(device.clone());

            if let Some(out) = self.canned.get(&args.join(" ")) {
                self.stdout = out.clone();
            } else if self.failing.contains(&device) {
                self.stdout = format!("Smartctl open device: {} failed: No such device\n", device);
                return Err(ExecutorError::Failed {
                    binary: "smartctl".into(),
                    status: 2,
                    reason: "device open failed".into(),
                });
            } else {
                self.stdout = ata_output(&format!("Model of {}", device));
            }
            Ok(ExecutorOutput {
                stdout: self.stdout.clone(),
                stderr: String::new(),
                exit_status: Some(0),
            })
        }

        fn set_running_msg(&mut self, _msg: &str) {}

        fn stdout_str(&self) -> &str {
            &self.stdout
        }
    }

    impl ExecutorFactory for FakeFactory {
        fn create_executor(&self, _kind: ExecutorKind) -> Box<dyn CommandExecutor> {
            Box::new(FakeExecutor {
                calls: Rc::clone(&self.calls),
                failing: self.failing.clone(),
                canned: self.canned.clone(),
                stdout: String::new(),
            })
        }
    }
}
