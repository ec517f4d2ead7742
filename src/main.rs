// Command line entry point: detect drives and print their basic SMART data

use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use storage_health::config::{Config, compile_patterns};
use storage_health::detect::StorageDetector;
use storage_health::executor::{ExecutorFactory, ExecutorKind, ProcessExecutorFactory};
use storage_health::storage::StorageDevice;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "storage-health", version, about = "Detect drives and show their SMART health")]
struct Cli {
    /// Config file (default: <config dir>/storage-health/config.toml)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// smartctl binary to run
    #[arg(long, value_name = "PATH")]
    smartctl: Option<String>,

    /// Ignore detected devices matching this regex (repeatable)
    #[arg(long = "blacklist", value_name = "REGEX")]
    blacklist: Vec<String>,

    /// Add a device manually (repeatable); these are never blacklisted
    #[arg(long = "device", value_name = "DEV")]
    devices: Vec<String>,

    /// smartctl -d type for the --device at the same position
    #[arg(long = "type", value_name = "TYPE")]
    types: Vec<String>,

    /// Print full property dumps
    #[arg(long)]
    dump: bool,

    /// Print per-device fetch errors with smartctl output
    #[arg(long)]
    show_errors: bool,

    /// Debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // RUST_LOG wins over -v
    let default_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    match run(cli) {
        Ok(code) => code,
        Err(e) => {
            error!("{}", e);
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<ExitCode, Box<dyn std::error::Error>> {
    warn_if_not_root();

    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(binary) = cli.smartctl {
        config.smartctl.binary = binary;
    }
    let mut blacklist = config.blacklist_regexes()?;
    blacklist.extend(compile_patterns(&cli.blacklist)?);

    info!("Using smartctl binary {:?}", config.smartctl.binary);
    let ex_factory = ProcessExecutorFactory::new(config.smartctl.binary.clone());

    let mut detector = StorageDetector::for_platform();
    detector.set_blacklist_patterns(blacklist);

    let mut drives = match detector.detect_and_fetch_basic_data(&ex_factory) {
        Ok(drives) => drives,
        Err(e) if cli.devices.is_empty() => {
            eprintln!("Cannot detect drives: {}", e);
            return Ok(ExitCode::FAILURE);
        }
        Err(e) => {
            warn!("Cannot detect drives: {}", e);
            Vec::new()
        }
    };

    if !cli.devices.is_empty() {
        add_manual_devices(&mut drives, &cli.devices, &cli.types, &ex_factory);
    }

    if drives.is_empty() {
        println!("No drives found.");
    }
    for drive in &drives {
        print_drive(drive, cli.dump);
    }

    if cli.show_errors {
        for (err, output) in detector
            .fetch_data_errors()
            .iter()
            .zip(detector.fetch_data_error_outputs())
        {
            println!("\nError: {}", err);
            if !output.trim().is_empty() {
                println!("{}", output.trim_end());
            }
        }
    }

    Ok(ExitCode::SUCCESS)
}

/// Manual devices are fetched the same way as detected ones, skipping
/// those detection already found.
fn add_manual_devices(
    drives: &mut Vec<StorageDevice>,
    devices: &[String],
    types: &[String],
    ex_factory: &dyn ExecutorFactory,
) {
    let mut smartctl_ex = ex_factory.create_executor(ExecutorKind::Smartctl);

    for (i, dev) in devices.iter().enumerate() {
        let mut drive = match types.get(i) {
            Some(type_arg) => StorageDevice::with_type(dev.as_str(), type_arg.as_str()),
            None => StorageDevice::new(dev.as_str()),
        };
        if drives.iter().any(|d| d.cmp_identity(&drive).is_eq()) {
            info!("{} was already detected", drive.device_with_type());
            continue;
        }

        smartctl_ex.set_running_msg(&format!("Running smartctl on {}...", drive.device_with_type()));
        if let Err(e) = drive.fetch_basic_data_and_parse(smartctl_ex.as_mut()) {
            warn!("{}", e);
            eprintln!("Error: {}", e);
        }
        drives.push(drive);
    }
}

fn print_drive(drive: &StorageDevice, dump: bool) {
    let model = if drive.model_name().is_empty() {
        "[unknown model]"
    } else {
        drive.model_name()
    };
    println!(
        "{}: {} ({}, SMART {})",
        drive.device_with_type(),
        model,
        drive.detected_type().storable_name(),
        drive.smart_status().displayable_name()
    );

    for p in drive.properties() {
        if dump {
            println!("{}", p.dump(2));
        } else if p.show_in_ui {
            println!("  {}: {}", p.displayable_name, p.format_value(false));
        }
    }
}

#[cfg(unix)]
fn warn_if_not_root() {
    if !nix::unistd::Uid::effective().is_root() {
        warn!("Not running as root, smartctl may not be able to open some drives");
    }
}

#[cfg(not(unix))]
fn warn_if_not_root() {}
