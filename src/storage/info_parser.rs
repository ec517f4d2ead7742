// Parser for the basic `smartctl --info --health` output

use crate::models::{Property, PropertyValue, Section, SubSection, WarningLevel};
use regex::Regex;
use std::sync::LazyLock;
use tracing::{debug, warn};

static VERSION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^smartctl\s+([0-9][^ \t\n]*)[ \t]*(.*)$").expect("valid version regex")
});

static SECTION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^=== START OF (.+) SECTION ===[ \t]*$").expect("valid section regex")
});

static INFO_LINE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(.+?):[ \t]*(.*)$").expect("valid info line regex"));

static HEALTH_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^(SMART overall-health self-assessment test result|SMART Health Status):[ \t]*(.+)$")
        .expect("valid health regex")
});

// Lines in the info section that are not name/value pairs we care about
static INFO_NOISE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)mandatory SMART command failed|^Unexpected SCT status|^Write SCT \(Get\)|^Read SCT Status failed|^Read SMART Data failed|^Read SMART Thresholds failed|^Unknown SCT Status format version|Enabled status cached by OS|^>> Terminate command early|^scsiModePageOffset: ",
    )
    .expect("valid noise regex")
});

/// Parses `smartctl --info --health` output into properties, in output order.
/// Returns the reason on failure.
pub fn parse_basic_output(output: &str) -> Result<Vec<Property>, String> {
    let s = output.replace("\r\n", "\n");
    let s = s.trim();
    if s.is_empty() {
        return Err("smartctl data is empty".to_string());
    }

    let mut props = Vec::new();

    let Some(version) = VERSION_RE.captures(s) else {
        return Err("cannot extract smartctl version information".to_string());
    };
    let mut p = Property::new(Section::Info, "Smartctl version");
    p.set_name("Smartctl version", "smartctl/version", "Smartctl Version");
    p.reported_value = version[1].to_string();
    p.value = PropertyValue::String(p.reported_value.clone());
    // the full version below is the one shown
    p.show_in_ui = false;
    props.push(p);

    let mut p = Property::new(Section::Info, "Smartctl version");
    p.set_name("Smartctl version", "smartctl/version/_merged_full", "Smartctl Version");
    p.reported_value = format!("{} {}", &version[1], &version[2]).trim().to_string();
    p.value = PropertyValue::String(p.reported_value.clone());
    props.push(p);

    let headers: Vec<_> = SECTION_RE.captures_iter(s).collect();
    let mut parsed_any = false;
    for (i, cap) in headers.iter().enumerate() {
        let (Some(whole), Some(name)) = (cap.get(0), cap.get(1)) else {
            continue;
        };
        let end = headers
            .get(i + 1)
            .and_then(|next| next.get(0))
            .map(|m| m.start())
            .unwrap_or(s.len());
        let body = s[whole.end()..end].trim();
        parsed_any |= parse_section(name.as_str(), body, &mut props);
    }

    if !parsed_any {
        return Err("no ATA sections could be parsed".to_string());
    }
    Ok(props)
}

fn parse_section(name: &str, body: &str, props: &mut Vec<Property>) -> bool {
    debug!("Parsing section: {:?}", name);
    match name {
        "INFORMATION" => parse_info_section(body, props),
        "SMART DATA" | "READ SMART DATA" => parse_data_section(body, props),
        // Results of actions, handled by whoever issued the command
        "ENABLE/DISABLE COMMANDS" | "OFFLINE IMMEDIATE AND SELF-TEST" => true,
        _ => {
            warn!("Unknown section encountered: {:?}", name);
            false
        }
    }
}

fn parse_info_section(body: &str, props: &mut Vec<Property>) -> bool {
    let mut warning_msg: Option<String> = None;

    for line in body.lines().map(str::trim) {
        // "==> WARNING: ..." blocks continue until an empty line
        if let Some(msg) = warning_msg.as_mut() {
            if !line.is_empty() {
                msg.push('\n');
                msg.push_str(line);
                continue;
            }
            props.push(info_warning(std::mem::take(msg)));
            warning_msg = None;
            continue;
        }

        if line.is_empty() || INFO_NOISE_RE.is_match(line) {
            continue;
        }

        if let Some(rest) = line.strip_prefix("==> WARNING: ") {
            warning_msg = Some(rest.trim().to_string());
            continue;
        }

        match INFO_LINE_RE.captures(line) {
            Some(cap) => {
                let mut p = Property::new(Section::Info, cap[1].trim());
                p.reported_value = cap[2].trim().to_string();
                classify_info_property(&mut p);
                props.push(p);
            }
            None => warn!("Unknown Info line encountered: {:?}", line),
        }
    }

    if let Some(msg) = warning_msg {
        props.push(info_warning(msg));
    }
    true
}

fn info_warning(msg: String) -> Property {
    let mut p = Property::new(Section::Info, "Warning");
    p.set_name("Warning", "_text_only/info_warning", "Warning");
    p.value = PropertyValue::String(msg.clone());
    p.reported_value = msg;
    p.warning_level = WarningLevel::Notice;
    p
}

/// Assigns the generic name and typed value of an info property.
fn classify_info_property(p: &mut Property) {
    let reported = p.reported_name.clone();
    let value = p.reported_value.clone();
    let string_value = PropertyValue::String(value.clone());

    let (generic, readable) = match reported.to_ascii_lowercase().as_str() {
        "model family" => ("model_family", "Model Family"),
        // "Device" and "Product" come from scsi/usb, "Model Number" from nvme
        "device model" | "device" | "product" | "model number" => ("model_name", "Device Model"),
        "vendor" => ("vendor", "Vendor"),
        "revision" => ("revision", "Revision"),
        "device type" => ("device_type/name", "Device Type"),
        "compliance" => ("scsi_version", "Compliance"),
        "serial number" => ("serial_number", "Serial Number"),
        "lu wwn device id" => ("wwn/_merged", "World Wide Name"),
        "add. product id" => ("ata_additional_product_id", "Additional Product ID"),
        "firmware version" => ("firmware_version", "Firmware Version"),
        "sector sizes" | "sector size" => {
            ("physical_block_size/_and/logical_block_size", reported.as_str())
        }
        "logical block size" => ("logical_block_size", "Logical Block Size"),
        "rotation rate" => ("rotation_rate", "Rotation Rate"),
        "form factor" => ("form_factor/name", "Form Factor"),
        "ata version is" => ("ata_version/string", "ATA Version"),
        "sata version is" => ("sata_version/string", "SATA Version"),
        "nvme version" => ("nvme_version/string", "NVMe Version"),
        "local time is" => ("local_time/asctime", "Scanned on"),
        "user capacity" | "total nvm capacity" => {
            p.set_name(&reported, "user_capacity/bytes", "Capacity");
            match parse_byte_size(&value) {
                Some((bytes, readable)) => {
                    p.value = PropertyValue::Integer(bytes);
                    p.readable_value = readable;
                }
                None => p.readable_value = "[unknown]".to_string(),
            }
            return;
        }
        "device is" => {
            p.set_name(&reported, "in_smartctl_database", "In Smartctl Database");
            p.value = PropertyValue::Bool(!value.to_ascii_lowercase().contains("not in "));
            return;
        }
        "smart support is" => {
            classify_smart_support(p);
            return;
        }
        _ => {
            // Not an error; newer smartctl versions add properties all the time.
            debug!("Unknown property {:?} (value = {:?})", reported, value);
            p.value = string_value;
            return;
        }
    };

    p.set_name(&reported, generic, readable);
    p.value = string_value;
}

/// "SMART support is" is printed twice: once for support, once for enabled state.
fn classify_smart_support(p: &mut Property) {
    let reported = p.reported_name.clone();
    let value = p.reported_value.to_ascii_lowercase();

    let (generic, readable, flag) = if value.contains("available - device has") {
        ("_text_only/smart_supported", "SMART Supported", true)
    } else if value.contains("enabled") {
        ("_text_only/smart_enabled", "SMART Enabled", true)
    } else if value.contains("disabled") {
        ("_text_only/smart_enabled", "SMART Enabled", false)
    } else if value.contains("unavailable") {
        ("_text_only/smart_supported", "SMART Supported", false)
    } else if value.contains("ambiguous") {
        // smartctl usually retries and prints one of the above after this
        ("_text_only/smart_supported", "SMART Supported", true)
    } else {
        p.value = PropertyValue::String(p.reported_value.clone());
        return;
    };

    p.set_name(&reported, generic, readable);
    p.value = PropertyValue::Bool(flag);
}

/// Parses "500,107,862,016 bytes [500 GB]" into the byte count and the bracketed text.
/// NVMe output omits the "bytes" word.
fn parse_byte_size(value: &str) -> Option<(i64, String)> {
    let (number, rest) = match value.find('[') {
        Some(pos) => value.split_at(pos),
        None => (value, ""),
    };
    let number = number.trim().trim_end_matches("bytes").trim();
    let digits: String = number.chars().filter(char::is_ascii_digit).collect();
    let bytes = digits.parse::<i64>().ok()?;

    let readable = rest
        .trim()
        .strip_prefix('[')
        .and_then(|r| r.strip_suffix(']'))
        .map(|r| r.trim().to_string())
        .unwrap_or_else(|| format!("{} bytes", number));
    Some((bytes, readable))
}

fn parse_data_section(body: &str, props: &mut Vec<Property>) -> bool {
    let Some(cap) = HEALTH_RE.captures(body) else {
        debug!("No health line in data section");
        return false;
    };

    let mut p = Property::new(Section::Data, &cap[1]);
    p.set_name(&cap[1], "overall_health", "Overall Health Self-Assessment Test");
    p.subsection = SubSection::Health;
    p.reported_value = cap[2].trim().to_string();
    p.value = PropertyValue::String(p.reported_value.clone());

    if !matches!(p.reported_value.as_str(), "PASSED" | "OK") {
        p.warning_level = WarningLevel::Alert;
        p.warning_reason =
            "The drive is reporting that it will FAIL very soon. Please back up as soon as possible!"
                .to_string();
    }
    props.push(p);
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    const ATA_OUTPUT: &str = "smartctl 7.3 2022-02-28 r5338 [x86_64-linux-6.1.0] (local build)
Copyright (C) 2002-22, Bruce Allen, Christian Franke, www.smartmontools.org

=== START OF INFORMATION SECTION ===
Model Family:     Seagate Barracuda 7200.10
Device Model:     ST3500630AS
Serial Number:    9QG3CC60
Firmware Version: 3.AAE
User Capacity:    500,107,862,016 bytes [500 GB]
Sector Size:      512 bytes logical/physical
Rotation Rate:    7200 rpm
Device is:        In smartctl database 7.3/5319
ATA Version is:   ATA/ATAPI-7 (minor revision not indicated)
Local Time is:    Mon Oct 19 12:00:00 2026 UTC
SMART support is: Available - device has SMART capability.
SMART support is: Enabled

=== START OF READ SMART DATA SECTION ===
SMART overall-health self-assessment test result: PASSED
";

    fn find<'a>(props: &'a [Property], generic: &str) -> &'a Property {
        props
            .iter()
            .find(|p| p.generic_name == generic)
            .unwrap_or_else(|| panic!("no property {}", generic))
    }

    #[test]
    fn parses_ata_info_and_health() {
        let props = parse_basic_output(ATA_OUTPUT).unwrap();

        assert_eq!(find(&props, "smartctl/version").value, PropertyValue::String("7.3".into()));
        assert_eq!(find(&props, "model_name").value, PropertyValue::String("ST3500630AS".into()));
        assert_eq!(find(&props, "model_name").displayable_name, "Device Model");
        assert_eq!(find(&props, "model_family").section, Section::Info);

        let capacity = find(&props, "user_capacity/bytes");
        assert_eq!(capacity.value, PropertyValue::Integer(500107862016));
        assert_eq!(capacity.format_value(false), "500 GB");

        assert_eq!(find(&props, "in_smartctl_database").value, PropertyValue::Bool(true));
        assert_eq!(find(&props, "_text_only/smart_supported").value, PropertyValue::Bool(true));
        assert_eq!(find(&props, "_text_only/smart_enabled").value, PropertyValue::Bool(true));

        let health = find(&props, "overall_health");
        assert_eq!(health.section, Section::Data);
        assert_eq!(health.subsection, SubSection::Health);
        assert_eq!(health.warning_level, WarningLevel::None);
    }

    #[test]
    fn keeps_parse_order() {
        let props = parse_basic_output(ATA_OUTPUT).unwrap();
        let names: Vec<_> = props.iter().map(|p| p.generic_name.as_str()).collect();
        let family = names.iter().position(|n| *n == "model_family").unwrap();
        let model = names.iter().position(|n| *n == "model_name").unwrap();
        let health = names.iter().position(|n| *n == "overall_health").unwrap();
        assert!(family < model && model < health);
    }

    #[test]
    fn failing_health_raises_alert() {
        let output = ATA_OUTPUT.replace("test result: PASSED", "test result: FAILED!");
        let props = parse_basic_output(&output).unwrap();
        let health = find(&props, "overall_health");
        assert_eq!(health.warning_level, WarningLevel::Alert);
        assert!(!health.warning_reason.is_empty());
    }

    #[test]
    fn unknown_properties_are_strings() {
        let output = "smartctl 7.4 2023-08-01 r5530 [x86_64-linux-6.5.0] (local build)

=== START OF INFORMATION SECTION ===
Brand New Field:  something
";
        let props = parse_basic_output(output).unwrap();
        let p = find(&props, "Brand New Field");
        assert_eq!(p.value, PropertyValue::String("something".into()));
        assert_eq!(p.displayable_name, "Brand New Field");
    }

    #[test]
    fn collects_firmware_warnings() {
        let output = "smartctl 7.3 2022-02-28 r5338 [x86_64-linux-6.1.0] (local build)

=== START OF INFORMATION SECTION ===
Device Model:     ST3000DM001

==> WARNING: A firmware update for this drive may be available,
see the following Seagate web pages:
http://knowledge.seagate.com/articles/en_US/FAQ/207931en

SMART support is: Disabled
";
        let props = parse_basic_output(output).unwrap();
        let warning = find(&props, "_text_only/info_warning");
        let PropertyValue::String(text) = &warning.value else {
            panic!("warning is not a string");
        };
        assert!(text.starts_with("A firmware update"));
        assert_eq!(text.lines().count(), 3);
        assert_eq!(find(&props, "_text_only/smart_enabled").value, PropertyValue::Bool(false));
    }

    #[test]
    fn rejects_unusable_output() {
        assert!(parse_basic_output("").is_err());
        assert!(parse_basic_output("   \n").is_err());
        assert!(parse_basic_output("hello world").is_err());
        assert!(parse_basic_output("smartctl 7.3 2022-02-28 r5338\nno sections here").is_err());
    }

    #[test]
    fn byte_sizes() {
        assert_eq!(
            parse_byte_size("1,000,204,886,016 bytes [1.00 TB]"),
            Some((1000204886016, "1.00 TB".to_string()))
        );
        assert_eq!(parse_byte_size("512 bytes"), Some((512, "512 bytes".to_string())));
        assert_eq!(
            parse_byte_size("500,107,862,016 [500 GB]"),
            Some((500107862016, "500 GB".to_string()))
        );
        assert_eq!(parse_byte_size("unknown"), None);
    }
}
