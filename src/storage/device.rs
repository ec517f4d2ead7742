// A storage device and the basic data smartctl reports about it

use super::info_parser::parse_basic_output;
use crate::error::{ExecutorError, FetchError};
use crate::executor::{CommandExecutor, ExecutorOutput};
use crate::models::{Property, PropertyValue};
use regex::Regex;
use std::cmp::Ordering;
use std::fmt;
use std::sync::LazyLock;
use tracing::debug;

static OPEN_FAILED_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?mi)^Smartctl open device: .+ failed: (.+)$").expect("valid open failure regex")
});

// smartctl asks for a controller-specific -d option for drives behind RAID controllers
static RAID_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)please try adding '-d (?:megaraid|cciss|areca|3ware|aacraid)")
        .expect("valid raid regex")
});

static NVME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?mi)^(?:NVMe Version|PCI Vendor/Subsystem ID):").expect("valid nvme regex")
});

static CDDVD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?mi)^Device type:\s+CD/DVD").expect("valid cd/dvd regex"));

static ATA_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?mi)^(?:ATA Version is|SATA Version is|Device Model):").expect("valid ata regex")
});

static SCSI_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?mi)^(?:Vendor|Product|Compliance|Transport protocol|SMART Health Status):")
        .expect("valid scsi regex")
});

/// Device kind as figured out from smartctl output
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum DetectedType {
    #[default]
    Unknown,
    /// ATA, rotational or not
    AtaAny,
    AtaHdd,
    AtaSsd,
    Nvme,
    /// SCSI or USB device without ATA passthrough
    BasicScsi,
    CdDvd,
    /// Behind a RAID controller we can't see through
    UnsupportedRaid,
}

impl DetectedType {
    /// Name used in logs and configuration
    pub fn storable_name(self) -> &'static str {
        match self {
            DetectedType::Unknown => "unknown",
            DetectedType::AtaAny => "ata_any",
            DetectedType::AtaHdd => "ata_hdd",
            DetectedType::AtaSsd => "ata_ssd",
            DetectedType::Nvme => "nvme",
            DetectedType::BasicScsi => "basic_scsi",
            DetectedType::CdDvd => "cddvd",
            DetectedType::UnsupportedRaid => "unsupported_raid",
        }
    }
}

/// Whether SMART can be used on the device
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum SmartStatus {
    Enabled,
    Disabled,
    #[default]
    Unsupported,
}

impl SmartStatus {
    pub fn displayable_name(self) -> &'static str {
        match self {
            SmartStatus::Enabled => "Enabled",
            SmartStatus::Disabled => "Disabled",
            SmartStatus::Unsupported => "Unsupported",
        }
    }
}

/// A device smartctl can be pointed at, plus everything fetched about it.
#[derive(Clone, Debug, Default)]
pub struct StorageDevice {
    /// Device path, e.g. /dev/sda or pd0
    device: String,
    /// smartctl -d argument, e.g. "sat" or "3ware,2". Empty for auto-detection.
    type_arg: String,
    /// Raw output of the last successful basic data fetch
    info_output: String,
    /// Raw output of the last failed basic data fetch
    failed_output: String,
    /// Properties parsed from `info_output`, in output order
    properties: Vec<Property>,
    detected_type: DetectedType,
    smart_status: SmartStatus,
    model_name: String,
}

impl StorageDevice {
    pub fn new(device: impl Into<String>) -> Self {
        Self {
            device: device.into(),
            ..Default::default()
        }
    }

    /// Device with an explicit smartctl `-d` type
    pub fn with_type(device: impl Into<String>, type_arg: impl Into<String>) -> Self {
        Self {
            device: device.into(),
            type_arg: type_arg.into(),
            ..Default::default()
        }
    }

    pub fn device(&self) -> &str {
        &self.device
    }

    pub fn type_arg(&self) -> &str {
        &self.type_arg
    }

    /// "/dev/sda", or "/dev/sda (type: sat)" when a type is set
    pub fn device_with_type(&self) -> String {
        if self.type_arg.is_empty() {
            self.device.clone()
        } else {
            format!("{} (type: {})", self.device, self.type_arg)
        }
    }

    pub fn info_output(&self) -> &str {
        &self.info_output
    }

    /// smartctl output of the last failed fetch, empty after a successful one
    pub fn failed_output(&self) -> &str {
        &self.failed_output
    }

    /// Stores output obtained elsewhere, e.g. by a port scan during detection.
    /// The device is then not queried again by the basic fetch.
    pub fn set_info_output(&mut self, output: impl Into<String>) {
        self.info_output = output.into();
    }

    pub fn properties(&self) -> &[Property] {
        &self.properties
    }

    /// First property with the given generic name
    pub fn property(&self, generic_name: &str) -> Option<&Property> {
        self.properties.iter().find(|p| p.generic_name == generic_name)
    }

    pub fn detected_type(&self) -> DetectedType {
        self.detected_type
    }

    pub fn smart_status(&self) -> SmartStatus {
        self.smart_status
    }

    pub fn model_name(&self) -> &str {
        &self.model_name
    }

    /// smartctl arguments for the basic data query
    pub fn basic_data_args(&self) -> Vec<String> {
        let mut args = vec!["--info".to_string(), "--health".to_string()];
        if !self.type_arg.is_empty() {
            args.push("-d".to_string());
            args.push(self.type_arg.clone());
        }
        args.push(self.device.clone());
        args
    }

    /// Runs smartctl for basic info and parses it into this device.
    /// Only a successful parse sets `info_output`; on failure the raw output
    /// is kept in `failed_output` for diagnostics and the device stays unfetched.
    pub fn fetch_basic_data_and_parse(
        &mut self,
        executor: &mut dyn CommandExecutor,
    ) -> Result<(), FetchError> {
        self.properties.clear();
        self.info_output.clear();
        self.failed_output.clear();
        self.model_name.clear();
        self.smart_status = SmartStatus::default();

        let result = executor.execute(&self.basic_data_args());
        let output = executor.stdout_str().to_string();
        self.detected_type = detect_type(&output);

        match self.parse_fetched(&output, result) {
            Ok(()) => {
                self.info_output = output;
                Ok(())
            }
            Err(err) => {
                self.properties.clear();
                self.failed_output = output;
                Err(err)
            }
        }
    }

    fn parse_fetched(
        &mut self,
        output: &str,
        result: Result<ExecutorOutput, ExecutorError>,
    ) -> Result<(), FetchError> {
        if let Some(cap) = OPEN_FAILED_RE.captures(output) {
            return Err(FetchError::OpenFailed {
                device: self.device_with_type(),
                reason: cap[1].trim().to_string(),
            });
        }

        result.map_err(|source| FetchError::Execution {
            device: self.device_with_type(),
            source,
        })?;

        if output.trim().is_empty() {
            return Err(FetchError::EmptyOutput {
                device: self.device_with_type(),
            });
        }

        self.properties = parse_basic_output(output).map_err(|reason| FetchError::Parse {
            device: self.device_with_type(),
            reason,
        })?;

        self.refine_detected_type();
        self.model_name = match self.property("model_name").map(|p| &p.value) {
            Some(PropertyValue::String(s)) => s.trim().to_string(),
            _ => String::new(),
        };
        self.smart_status = self.compute_smart_status();

        debug!(
            "Parsed {} properties for {}",
            self.properties.len(),
            self.device_with_type()
        );
        Ok(())
    }

    /// ATA drives get split into HDD/SSD by their rotation rate.
    fn refine_detected_type(&mut self) {
        if self.detected_type != DetectedType::AtaAny {
            return;
        }
        if let Some(PropertyValue::String(rate)) = self.property("rotation_rate").map(|p| &p.value) {
            let rate = rate.to_ascii_lowercase();
            if rate.contains("solid state") {
                self.detected_type = DetectedType::AtaSsd;
            } else if rate.contains("rpm") {
                self.detected_type = DetectedType::AtaHdd;
            }
        }
    }

    fn compute_smart_status(&self) -> SmartStatus {
        let flag = |name: &str| match self.property(name).map(|p| &p.value) {
            Some(PropertyValue::Bool(b)) => Some(*b),
            _ => None,
        };

        match (flag("_text_only/smart_supported"), flag("_text_only/smart_enabled")) {
            (Some(false), _) => SmartStatus::Unsupported,
            (_, Some(true)) => SmartStatus::Enabled,
            (_, Some(false)) => SmartStatus::Disabled,
            // NVMe drives always have their health log available
            _ if self.detected_type == DetectedType::Nvme => SmartStatus::Enabled,
            _ => SmartStatus::Unsupported,
        }
    }

    /// Deterministic order: natural order of device names, then type arguments.
    pub fn cmp_identity(&self, other: &Self) -> Ordering {
        natural_cmp(&self.device, &other.device).then_with(|| natural_cmp(&self.type_arg, &other.type_arg))
    }
}

impl fmt::Display for StorageDevice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.device_with_type())
    }
}

fn detect_type(output: &str) -> DetectedType {
    if RAID_RE.is_match(output) {
        DetectedType::UnsupportedRaid
    } else if NVME_RE.is_match(output) {
        DetectedType::Nvme
    } else if CDDVD_RE.is_match(output) {
        DetectedType::CdDvd
    } else if ATA_RE.is_match(output) {
        DetectedType::AtaAny
    } else if SCSI_RE.is_match(output) {
        DetectedType::BasicScsi
    } else {
        DetectedType::Unknown
    }
}

/// Compares strings with digit runs taken as numbers, so "sda2" < "sda10".
fn natural_cmp(a: &str, b: &str) -> Ordering {
    let mut a = a.chars().peekable();
    let mut b = b.chars().peekable();

    loop {
        match (a.peek().copied(), b.peek().copied()) {
            (None, None) => return Ordering::Equal,
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(x), Some(y)) if x.is_ascii_digit() && y.is_ascii_digit() => {
                let na = take_digits(&mut a);
                let nb = take_digits(&mut b);
                let (ta, tb) = (na.trim_start_matches('0'), nb.trim_start_matches('0'));
                let ord = ta
                    .len()
                    .cmp(&tb.len())
                    .then_with(|| ta.cmp(tb))
                    .then_with(|| na.len().cmp(&nb.len()));
                if ord != Ordering::Equal {
                    return ord;
                }
            }
            (Some(x), Some(y)) => {
                if x != y {
                    return x.cmp(&y);
                }
                a.next();
                b.next();
            }
        }
    }
}

fn take_digits(it: &mut std::iter::Peekable<std::str::Chars<'_>>) -> String {
    let mut out = String::new();
    while let Some(c) = it.next_if(char::is_ascii_digit) {
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ExecutorError;
    use crate::executor::ExecutorOutput;

    /// Replays a canned smartctl run
    struct CannedExecutor {
        stdout: String,
        fail_status: Option<i32>,
        last_args: Vec<String>,
    }

    impl CannedExecutor {
        fn new(stdout: &str) -> Self {
            Self {
                stdout: stdout.to_string(),
                fail_status: None,
                last_args: Vec::new(),
            }
        }
    }

    impl CommandExecutor for CannedExecutor {
        fn execute(&mut self, args: &[String]) -> Result<ExecutorOutput, ExecutorError> {
            self.last_args = args.to_vec();
            if let Some(status) = self.fail_status {
                return Err(ExecutorError::Failed {
                    binary: "smartctl".into(),
                    status,
                    reason: "canned failure".into(),
                });
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

    const SSD_OUTPUT: &str = "smartctl 7.3 2022-02-28 r5338 [x86_64-linux-6.1.0] (local build)

=== START OF INFORMATION SECTION ===
Device Model:     Samsung SSD 860 EVO 500GB
Rotation Rate:    Solid State Device
SMART support is: Available - device has SMART capability.
SMART support is: Enabled

=== START OF READ SMART DATA SECTION ===
SMART overall-health self-assessment test result: PASSED
";

    const NVME_OUTPUT: &str = "smartctl 7.3 2022-02-28 r5338 [x86_64-linux-6.1.0] (local build)

=== START OF INFORMATION SECTION ===
Model Number:                       WDC WDS500G2B0C-00PXH0
Serial Number:                      2045A0800123
Firmware Version:                   211070WD
PCI Vendor/Subsystem ID:            0x15b7
NVMe Version:                       1.4
Total NVM Capacity:                 500,107,862,016 [500 GB]

=== START OF SMART DATA SECTION ===
SMART overall-health self-assessment test result: PASSED
";

    #[test]
    fn fetches_and_parses_ata_ssd() {
        let mut dev = StorageDevice::new("/dev/sda");
        let mut ex = CannedExecutor::new(SSD_OUTPUT);
        dev.fetch_basic_data_and_parse(&mut ex).unwrap();

        assert_eq!(ex.last_args, vec!["--info", "--health", "/dev/sda"]);
        assert_eq!(dev.model_name(), "Samsung SSD 860 EVO 500GB");
        assert_eq!(dev.detected_type(), DetectedType::AtaSsd);
        assert_eq!(dev.smart_status(), SmartStatus::Enabled);
        assert_eq!(dev.info_output(), SSD_OUTPUT);
        assert!(dev.property("overall_health").is_some());
    }

    #[test]
    fn fetches_nvme() {
        let mut dev = StorageDevice::new("/dev/nvme0n1");
        let mut ex = CannedExecutor::new(NVME_OUTPUT);
        dev.fetch_basic_data_and_parse(&mut ex).unwrap();

        assert_eq!(dev.detected_type(), DetectedType::Nvme);
        assert_eq!(dev.smart_status(), SmartStatus::Enabled);
        assert_eq!(dev.model_name(), "WDC WDS500G2B0C-00PXH0");
    }

    #[test]
    fn passes_type_argument() {
        let dev = StorageDevice::with_type("/dev/sdb", "sat");
        assert_eq!(dev.basic_data_args(), vec!["--info", "--health", "-d", "sat", "/dev/sdb"]);
        assert_eq!(dev.device_with_type(), "/dev/sdb (type: sat)");
        assert_eq!(StorageDevice::new("/dev/sdb").device_with_type(), "/dev/sdb");
    }

    #[test]
    fn reports_open_failure_with_reason() {
        let output = "smartctl 7.3 2022-02-28 r5338 [x86_64-linux-6.1.0] (local build)

Smartctl open device: /dev/sdx failed: No such device
";
        let mut dev = StorageDevice::new("/dev/sdx");
        let mut ex = CannedExecutor::new(output);
        ex.fail_status = Some(2);

        let err = dev.fetch_basic_data_and_parse(&mut ex).unwrap_err();
        match err {
            FetchError::OpenFailed { device, reason } => {
                assert_eq!(device, "/dev/sdx");
                assert_eq!(reason, "No such device");
            }
            other => panic!("unexpected error {:?}", other),
        }
        // kept for diagnostics, but the device counts as unfetched
        assert_eq!(dev.failed_output(), output);
        assert!(dev.info_output().is_empty());
    }

    #[test]
    fn reports_executor_and_parse_failures() {
        let mut dev = StorageDevice::new("/dev/sda");
        let mut ex = CannedExecutor::new("");
        ex.fail_status = Some(1);
        assert!(matches!(
            dev.fetch_basic_data_and_parse(&mut ex),
            Err(FetchError::Execution { .. })
        ));

        let mut ex = CannedExecutor::new("");
        assert!(matches!(
            dev.fetch_basic_data_and_parse(&mut ex),
            Err(FetchError::EmptyOutput { .. })
        ));

        let mut ex = CannedExecutor::new("garbage output");
        assert!(matches!(
            dev.fetch_basic_data_and_parse(&mut ex),
            Err(FetchError::Parse { .. })
        ));
    }

    #[test]
    fn failed_refetch_resets_previous_data() {
        let mut dev = StorageDevice::new("/dev/sda");
        let mut ex = CannedExecutor::new(SSD_OUTPUT);
        dev.fetch_basic_data_and_parse(&mut ex).unwrap();
        assert_eq!(dev.smart_status(), SmartStatus::Enabled);

        let mut ex = CannedExecutor::new("garbage output");
        assert!(dev.fetch_basic_data_and_parse(&mut ex).is_err());
        assert!(dev.properties().is_empty());
        assert_eq!(dev.model_name(), "");
        assert_eq!(dev.smart_status(), SmartStatus::Unsupported);
        assert!(dev.info_output().is_empty());
        assert_eq!(dev.failed_output(), "garbage output");

        // and a later success clears the failure
        let mut ex = CannedExecutor::new(SSD_OUTPUT);
        dev.fetch_basic_data_and_parse(&mut ex).unwrap();
        assert!(dev.failed_output().is_empty());
        assert_eq!(dev.info_output(), SSD_OUTPUT);
    }

    #[test]
    fn detects_types_from_output() {
        assert_eq!(detect_type("Device type:          CD/DVD"), DetectedType::CdDvd);
        assert_eq!(
            detect_type("Vendor:               SEAGATE\nProduct:              ST600MM0006"),
            DetectedType::BasicScsi
        );
        assert_eq!(
            detect_type("/dev/sda: DELL or MegaRaid controller, please try adding '-d megaraid,N'"),
            DetectedType::UnsupportedRaid
        );
        assert_eq!(detect_type(""), DetectedType::Unknown);
        assert_eq!(DetectedType::AtaHdd.storable_name(), "ata_hdd");
    }

    #[test]
    fn natural_order() {
        assert_eq!(natural_cmp("/dev/sda2", "/dev/sda10"), Ordering::Less);
        assert_eq!(natural_cmp("/dev/sda", "/dev/sdb"), Ordering::Less);
        assert_eq!(natural_cmp("/dev/sda", "/dev/sda"), Ordering::Equal);
        assert_eq!(natural_cmp("/dev/sda", "/dev/sda1"), Ordering::Less);
        assert_eq!(natural_cmp("pd01", "pd1"), Ordering::Greater);

        let mut devs = vec![
            StorageDevice::with_type("/dev/twa0", "3ware,10"),
            StorageDevice::with_type("/dev/twa0", "3ware,2"),
            StorageDevice::new("/dev/nvme0n1"),
        ];
        devs.sort_by(StorageDevice::cmp_identity);
        let names: Vec<_> = devs.iter().map(|d| d.device_with_type()).collect();
        assert_eq!(
            names,
            vec!["/dev/nvme0n1", "/dev/twa0 (type: 3ware,2)", "/dev/twa0 (type: 3ware,10)"]
        );
    }
}
