//! Validators check a raw setting value without writing it anywhere.
use super::{error, mutators, Result};
use snafu::ensure;

/// VM drivers the cluster can be started with.
pub const SUPPORTED_DRIVERS: &[&str] = &[
    "virtualbox",
    "vmwarefusion",
    "kvm",
    "kvm2",
    "xhyve",
    "hyperv",
    "hyperkit",
    "none",
];

// Units accepted after the number in a disk size, with or without a trailing "b".
const DISK_SIZE_UNITS: &[char] = &['b', 'k', 'm', 'g', 't'];

/// Requires an integer greater than zero.
pub fn is_positive(name: &str, value: &str) -> Result<()> {
    let parsed = value.parse::<i64>().ok();
    ensure!(
        matches!(parsed, Some(i) if i > 0),
        error::ValidationSnafu {
            name,
            value,
            reason: "must be a positive integer",
        }
    );
    Ok(())
}

/// Requires one of the [`SUPPORTED_DRIVERS`].
pub fn is_valid_driver(name: &str, value: &str) -> Result<()> {
    ensure!(
        SUPPORTED_DRIVERS.contains(&value),
        error::ValidationSnafu {
            name,
            value,
            reason: format!("supported drivers are {}", SUPPORTED_DRIVERS.join(", ")),
        }
    );
    Ok(())
}

/// Requires a size such as `20000`, `20g` or `20000MB`.
pub fn is_valid_disk_size(name: &str, value: &str) -> Result<()> {
    ensure!(
        parse_disk_size(value).is_some(),
        error::ValidationSnafu {
            name,
            value,
            reason: "expected a number optionally followed by one of b, k, m, g, t",
        }
    );
    Ok(())
}

/// Requires an `http`, `https` or `file` URL.
pub fn is_url(name: &str, value: &str) -> Result<()> {
    let valid = ["http://", "https://", "file://"]
        .iter()
        .any(|scheme| matches!(value.strip_prefix(scheme), Some(rest) if !rest.is_empty()));
    ensure!(
        valid,
        error::ValidationSnafu {
            name,
            value,
            reason: "expected an http, https or file URL",
        }
    );
    Ok(())
}

/// Requires a boolean literal.
pub fn is_bool(name: &str, value: &str) -> Result<()> {
    ensure!(
        mutators::parse_bool(value).is_some(),
        error::ValidationSnafu {
            name,
            value,
            reason: "expected a boolean",
        }
    );
    Ok(())
}

/// Splits a disk size into its number and lowercase unit letter.
fn parse_disk_size(value: &str) -> Option<(u64, Option<char>)> {
    let lower = value.trim().to_ascii_lowercase();
    let digits_end = lower
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(lower.len());
    let (number, suffix) = lower.split_at(digits_end);
    let number: u64 = number.parse().ok()?;

    let mut suffix_chars = suffix.chars();
    let unit = match (suffix_chars.next(), suffix_chars.next(), suffix_chars.next()) {
        (None, _, _) => None,
        (Some(u), None, _) if DISK_SIZE_UNITS.contains(&u) => Some(u),
        (Some(u), Some('b'), None) if u != 'b' && DISK_SIZE_UNITS.contains(&u) => Some(u),
        _ => return None,
    };

    Some((number, unit))
}
