use super::{Discovery, DiscoveryStrategy};
use crate::executor::ExecutorFactory;
use crate::storage::StorageDevice;
use regex::Regex;
use std::fs;
use std::path::PathBuf;
use std::sync::LazyLock;
use tracing::{debug, warn};

/// Whole-disk device node names on BSDs, Solaris and macOS
static DISK_NAME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:ada?|da|wd|sd|cd|acd|twa|twe|aacd|mfid|nvd|nda|nvme|disk|rdisk)[0-9]+$")
        .expect("valid disk name regex")
});

/// Scans a device directory for whole-disk nodes.
#[derive(Debug, Clone)]
pub struct DevDirDiscovery {
    dev_dir: PathBuf,
}

impl Default for DevDirDiscovery {
    fn default() -> Self {
        Self::new("/dev")
    }
}

impl DevDirDiscovery {
    pub fn new(dev_dir: impl Into<PathBuf>) -> Self {
        Self {
            dev_dir: dev_dir.into(),
        }
    }

    pub fn is_disk_name(name: &str) -> bool {
        DISK_NAME_RE.is_match(name)
    }
}

impl DiscoveryStrategy for DevDirDiscovery {
    fn name(&self) -> &'static str {
        "device directory scan"
    }

    fn discover(&self, _ex_factory: &dyn ExecutorFactory) -> Discovery {
        let entries = match fs::read_dir(&self.dev_dir) {
            Ok(entries) => entries,
            Err(e) => {
                warn!("Cannot read {}: {}", self.dev_dir.display(), e);
                return Discovery {
                    devices: Vec::new(),
                    last_error: Some(format!("Cannot list {}: {}", self.dev_dir.display(), e)),
                };
            }
        };

        let devices: Vec<StorageDevice> = entries
            .flatten()
            .filter_map(|entry| {
                let name = entry.file_name().to_string_lossy().into_owned();
                Self::is_disk_name(&name).then(|| {
                    let path = self.dev_dir.join(&name);
                    debug!("Found {}", path.display());
                    StorageDevice::new(path.to_string_lossy().into_owned())
                })
            })
            .collect();

        let last_error = devices
            .is_empty()
            .then(|| format!("No drives found in {}.", self.dev_dir.display()));

        Discovery { devices, last_error }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detect::test_support::FakeFactory;
    use std::fs::File;

    #[test]
    fn recognizes_disk_names() {
        for name in ["ada0", "ad4", "da1", "wd0", "nvme0", "nvd0", "disk2", "twa0"] {
            assert!(DevDirDiscovery::is_disk_name(name), "{name}");
        }
        for name in ["ada0p1", "da1s1", "disk2s1", "tty0", "null", "wd"] {
            assert!(!DevDirDiscovery::is_disk_name(name), "{name}");
        }
    }

    #[test]
    fn scans_directory() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["ada0", "ada0p1", "da0", "tty0", "null"] {
            File::create(dir.path().join(name)).unwrap();
        }

        let disc = DevDirDiscovery::new(dir.path()).discover(&FakeFactory::default());
        assert!(disc.last_error.is_none());
        let mut names: Vec<String> = disc
            .devices
            .iter()
            .map(|d| d.device().rsplit('/').next().unwrap_or_default().to_string())
            .collect();
        names.sort();
        assert_eq!(names, vec!["ada0", "da0"]);
    }

    #[test]
    fn directory_without_disks_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        File::create(dir.path().join("tty0")).unwrap();

        let disc = DevDirDiscovery::new(dir.path()).discover(&FakeFactory::default());
        assert!(disc.devices.is_empty());
        assert_eq!(
            disc.last_error,
            Some(format!("No drives found in {}.", dir.path().display()))
        );
    }

    #[test]
    fn missing_directory_is_reported() {
        let disc = DevDirDiscovery::new("/nonexistent/dev").discover(&FakeFactory::default());
        assert!(disc.devices.is_empty());
        assert!(disc.last_error.unwrap().starts_with("Cannot list /nonexistent/dev"));
    }
}
