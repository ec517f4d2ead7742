use super::{Discovery, DiscoveryStrategy};
use crate::executor::{ExecutorFactory, ExecutorKind};
use crate::storage::StorageDevice;
use regex::Regex;
use std::sync::LazyLock;
use tracing::{debug, warn};

/// "/dev/sda -d ata # /dev/sda, ATA device"
static SCAN_LINE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\S+)(?:\s+-d\s+(\S+))?\s*(?:#.*)?$").expect("valid scan line regex")
});

/// Asks smartctl itself for the device list (`smartctl --scan-open`).
#[derive(Debug, Clone, Copy, Default)]
pub struct ScanOpenDiscovery;

impl ScanOpenDiscovery {
    /// Devices from `--scan-open` output. Lines starting with '#' are
    /// devices smartctl could not open.
    pub fn parse_scan_output(output: &str) -> Vec<StorageDevice> {
        output
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .filter_map(|line| {
                let cap = SCAN_LINE_RE.captures(line)?;
                Some(match cap.get(2) {
                    Some(type_arg) => StorageDevice::with_type(&cap[1], type_arg.as_str()),
                    None => StorageDevice::new(&cap[1]),
                })
            })
            .collect()
    }
}

impl DiscoveryStrategy for ScanOpenDiscovery {
    fn name(&self) -> &'static str {
        "smartctl --scan-open"
    }

    fn discover(&self, ex_factory: &dyn ExecutorFactory) -> Discovery {
        let mut smartctl_ex = ex_factory.create_executor(ExecutorKind::Smartctl);
        smartctl_ex.set_running_msg("Scanning for drives...");

        let last_error = match smartctl_ex.execute(&["--scan-open".to_string()]) {
            Ok(_) => None,
            Err(e) => {
                warn!("smartctl --scan-open failed: {}", e);
                Some(format!("Error while scanning for drives: {}", e))
            }
        };

        let devices = Self::parse_scan_output(smartctl_ex.stdout_str());
        for drive in &devices {
            debug!("smartctl reported {}", drive.device_with_type());
        }

        let last_error = last_error.or_else(|| {
            devices
                .is_empty()
                .then(|| "smartctl --scan-open returned no drives.".to_string())
        });

        Discovery { devices, last_error }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detect::test_support::FakeFactory;

    const SCAN: &str = "/dev/sda -d ata # /dev/sda, ATA device
/dev/sdb -d sat # /dev/sdb [SAT], ATA device
# /dev/sdc -d usbcypress # /dev/sdc [USB Cypress], failed: Unsupported
/dev/nvme0 -d nvme # /dev/nvme0, NVMe device
/dev/csmi0,1 -d ata # /dev/csmi0,1, ATA device

/dev/sdd
";

    #[test]
    fn parses_scan_lines() {
        let drives = ScanOpenDiscovery::parse_scan_output(SCAN);
        let found: Vec<(&str, &str)> = drives.iter().map(|d| (d.device(), d.type_arg())).collect();
        assert_eq!(
            found,
            vec![
                ("/dev/sda", "ata"),
                ("/dev/sdb", "sat"),
                ("/dev/nvme0", "nvme"),
                ("/dev/csmi0,1", "ata"),
                ("/dev/sdd", ""),
            ]
        );
    }

    #[test]
    fn discovers_through_executor() {
        let factory = FakeFactory {
            canned: [("--scan-open".to_string(), SCAN.to_string())].into(),
            ..Default::default()
        };
        let disc = ScanOpenDiscovery.discover(&factory);
        assert!(disc.last_error.is_none());
        assert_eq!(disc.devices.len(), 5);
        assert_eq!(*factory.calls.borrow(), vec!["--scan-open"]);
    }

    #[test]
    fn empty_scan_is_reported() {
        let factory = FakeFactory {
            canned: [("--scan-open".to_string(), String::new())].into(),
            ..Default::default()
        };
        let disc = ScanOpenDiscovery.discover(&factory);
        assert!(disc.devices.is_empty());
        assert_eq!(disc.last_error.as_deref(), Some("smartctl --scan-open returned no drives."));
    }
}
