//! Typed mutators parse a raw string and write the result into a [`ConfigStore`].
//!
//! A mutator only touches the store once its input has parsed, so a failed call leaves the store
//! unchanged.
use super::{error, Result};
use crate::config::ConfigStore;
use snafu::{OptionExt, ResultExt};

/// Parses a boolean literal.
///
/// Accepts `1`, `t`, `T`, `TRUE`, `true`, `True`, `0`, `f`, `F`, `FALSE`, `false` and `False`.
pub fn parse_bool(value: &str) -> Option<bool> {
    match value {
        "1" | "t" | "T" | "TRUE" | "true" | "True" => Some(true),
        "0" | "f" | "F" | "FALSE" | "false" | "False" => Some(false),
        _ => None,
    }
}

/// Stores the raw value unchanged.
pub fn set_string(store: &mut ConfigStore, name: &str, value: &str) -> Result<()> {
    store.insert(name, value);
    Ok(())
}

/// Stores the value as a base-10 signed integer.
pub fn set_int(store: &mut ConfigStore, name: &str, value: &str) -> Result<()> {
    let parsed: i64 = value
        .parse()
        .context(error::ParseIntSnafu { name, value })?;
    store.insert(name, parsed);
    Ok(())
}

/// Stores the value as a boolean, see [`parse_bool`] for accepted literals.
pub fn set_bool(store: &mut ConfigStore, name: &str, value: &str) -> Result<()> {
    let parsed = parse_bool(value).context(error::ParseBoolSnafu { name, value })?;
    store.insert(name, parsed);
    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::config::ConfigValue;
    use crate::settings::SettingsError;

    #[test]
    fn test_set_string_keeps_raw_value() {
        let mut store = ConfigStore::new();
        set_string(&mut store, "kubernetes-version", " v1.10.0 ").unwrap();
        assert_eq!(
            store.get("kubernetes-version"),
            Some(&ConfigValue::from(" v1.10.0 "))
        );
    }

    #[test]
    fn test_set_int() {
        let mut store = ConfigStore::new();
        set_int(&mut store, "x", "42").unwrap();
        assert_eq!(store.get("x"), Some(&ConfigValue::Int(42)));

        set_int(&mut store, "x", "-7").unwrap();
        assert_eq!(store.get("x"), Some(&ConfigValue::Int(-7)));
    }

    #[test]
    fn test_set_int_failure_leaves_store() {
        let mut store = ConfigStore::new();
        store.insert("x", 42_i64);

        for value in ["4a", "", "4.2", "0x10"] {
            let err = set_int(&mut store, "x", value).unwrap_err();
            assert!(matches!(&err, SettingsError::ParseInt { value: v, .. } if v == value));
        }
        assert_eq!(store.get("x"), Some(&ConfigValue::Int(42)));
    }

    #[test]
    fn test_set_bool() {
        for (value, expected) in [
            ("true", true),
            ("1", true),
            ("T", true),
            ("True", true),
            ("FALSE", false),
            ("f", false),
            ("0", false),
        ] {
            let mut store = ConfigStore::new();
            set_bool(&mut store, "flag", value).unwrap();
            assert_eq!(store.get_bool("flag"), Some(expected), "parsing {}", value);
        }
    }

    #[test]
    fn test_set_bool_failure() {
        let mut store = ConfigStore::new();
        for value in ["maybe", "yes", "tRUE", " true"] {
            assert!(matches!(
                set_bool(&mut store, "flag", value),
                Err(SettingsError::ParseBool { .. })
            ));
        }
        assert!(store.is_empty());
    }
}
