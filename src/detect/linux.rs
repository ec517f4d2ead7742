use super::{Discovery, DiscoveryStrategy};
use crate::executor::ExecutorFactory;
use crate::storage::StorageDevice;
use regex::Regex;
use std::fs;
use std::path::PathBuf;
use std::sync::LazyLock;
use tracing::{debug, warn};

/// Partitions: "sda1", "nvme0n1p2", "cciss!c0d0p1", plus mmc boot areas
static PARTITION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?:(?:[shv]d|xvd)[a-z]+[0-9]+|(?:nvme[0-9]+n[0-9]+|mmcblk[0-9]+|md[0-9]+|loop[0-9]+)p[0-9]+|mmcblk[0-9]+(?:boot[0-9]+|rpmb)|(?:[a-z]+!)?c[0-9]+d[0-9]+p[0-9]+)$",
    )
    .expect("valid partition regex")
});

/// Reads whole-disk block devices from /proc/partitions.
#[derive(Debug, Clone)]
pub struct ProcPartitionsDiscovery {
    partitions_file: PathBuf,
    dev_dir: PathBuf,
}

impl Default for ProcPartitionsDiscovery {
    fn default() -> Self {
        Self::new("/proc/partitions", "/dev")
    }
}

impl ProcPartitionsDiscovery {
    pub fn new(partitions_file: impl Into<PathBuf>, dev_dir: impl Into<PathBuf>) -> Self {
        Self {
            partitions_file: partitions_file.into(),
            dev_dir: dev_dir.into(),
        }
    }

    /// Whole-disk names from /proc/partitions contents, in file order
    pub fn parse_partitions(contents: &str) -> Vec<String> {
        contents
            .lines()
            .filter_map(|line| {
                let cols: Vec<&str> = line.split_whitespace().collect();
                // major minor #blocks name
                if cols.len() != 4 || cols[0].parse::<u32>().is_err() {
                    return None;
                }
                let name = cols[3];
                if PARTITION_RE.is_match(name) {
                    None
                } else {
                    // "cciss!c0d0" is /dev/cciss/c0d0
                    Some(name.replace('!', "/"))
                }
            })
            .collect()
    }
}

impl DiscoveryStrategy for ProcPartitionsDiscovery {
    fn name(&self) -> &'static str {
        "/proc/partitions"
    }

    fn discover(&self, _ex_factory: &dyn ExecutorFactory) -> Discovery {
        let contents = match fs::read_to_string(&self.partitions_file) {
            Ok(contents) => contents,
            Err(e) => {
                warn!("Cannot read {}: {}", self.partitions_file.display(), e);
                return Discovery {
                    devices: Vec::new(),
                    last_error: Some(format!(
                        "Cannot open {}: {}",
                        self.partitions_file.display(),
                        e
                    )),
                };
            }
        };

        let devices: Vec<StorageDevice> = Self::parse_partitions(&contents)
            .into_iter()
            .map(|name| {
                let path = self.dev_dir.join(&name);
                debug!("Found {} in {}", path.display(), self.partitions_file.display());
                StorageDevice::new(path.to_string_lossy().into_owned())
            })
            .collect();

        let last_error = devices.is_empty().then(|| {
            format!(
                "{} does not list any drives.",
                self.partitions_file.display()
            )
        });

        Discovery { devices, last_error }
    }
}
