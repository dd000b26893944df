//! Provides the [`SettingRegistry`], the list of recognized configuration settings, along with the
//! applier which validates a raw value and writes it into a [`ConfigStore`].
//!
//! Each [`Setting`] pairs a setter (one of the [typed mutators](self::mutators)) with zero or more
//! [validators](self::validators). Applying a value runs all of them and reports every failure at
//! once, rather than stopping at the first problem.
use crate::config::{ConfigStore, ConfigValue};
use snafu::{ensure, OptionExt};
use std::collections::HashSet;
use tracing::{debug, instrument};

mod builtin;
pub mod mutators;
pub mod validators;

pub use builtin::USE_VENDORED_DRIVER;
pub use error::SettingsError;

type Result<T> = std::result::Result<T, SettingsError>;

/// Writes a raw value into the store under the setting's name.
pub type SetFn = fn(&mut ConfigStore, &str, &str) -> Result<()>;

/// Checks a raw value for a named setting without touching the store.
pub type ValidateFn = fn(&str, &str) -> Result<()>;

/// A recognized configuration setting.
#[derive(Clone)]
pub struct Setting {
    name: &'static str,
    setter: SetFn,
    validators: Vec<ValidateFn>,
}

impl Setting {
    /// Creates a setting which is written with `setter` and has no validators.
    pub fn new(name: &'static str, setter: SetFn) -> Self {
        Self {
            name,
            setter,
            validators: Vec::new(),
        }
    }

    /// Sets the validators which run whenever a value is applied to this setting.
    pub fn with_validators(mut self, validators: Vec<ValidateFn>) -> Self {
        self.validators = validators;
        self
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn validators(&self) -> &[ValidateFn] {
        &self.validators
    }
}

impl std::fmt::Debug for Setting {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Setting")
            .field("name", &self.name)
            .field("validators", &self.validators.len())
            .finish()
    }
}

/// The set of settings an operator may change.
///
/// The registry is constructed once and passed by reference to whichever layer needs it.
#[derive(Debug, Clone)]
pub struct SettingRegistry {
    settings: Vec<Setting>,
}

impl SettingRegistry {
    /// Creates a registry from the given settings.
    ///
    /// Returns an error if two settings share a name.
    pub fn new(settings: Vec<Setting>) -> Result<Self> {
        let mut seen: HashSet<&str> = HashSet::new();

        debug!("Checking each setting for a unique name.");
        for setting in &settings {
            ensure!(
                seen.insert(setting.name),
                error::DuplicateSettingSnafu { name: setting.name }
            );
        }

        Ok(Self { settings })
    }

    /// Returns the registry of settings understood by the CLI.
    pub fn builtin() -> Self {
        Self {
            settings: builtin::settings(),
        }
    }

    /// Returns the setting registered under `name`.
    pub fn find(&self, name: &str) -> Result<&Setting> {
        self.settings
            .iter()
            .find(|setting| setting.name == name)
            .context(error::NotFoundSnafu { name })
    }

    /// Iterates over all settings in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &Setting> {
        self.settings.iter()
    }

    /// Validates `value` and writes it into `store` under `name`.
    ///
    /// Every validator and the setter are run, even after one of them has failed, and all
    /// failures are returned together as [`SettingsError::Aggregate`]. The store is only modified
    /// when no failure occurred.
    #[instrument(skip(self, store), err)]
    pub fn apply(&self, store: &mut ConfigStore, name: &str, value: &str) -> Result<()> {
        let setting = self.find(name)?;

        let mut failures: Vec<SettingsError> = setting
            .validators
            .iter()
            .filter_map(|validate| validate(name, value).err())
            .collect();

        let mut staged = store.clone();
        if let Err(e) = (setting.setter)(&mut staged, name, value) {
            failures.push(e);
        }

        ensure!(
            failures.is_empty(),
            error::AggregateSnafu { errors: failures }
        );

        debug!(name, value, "Applied setting");
        *store = staged;
        Ok(())
    }

    /// Returns the value stored for a registered setting.
    pub fn get<'a>(&self, store: &'a ConfigStore, name: &str) -> Result<Option<&'a ConfigValue>> {
        let setting = self.find(name)?;
        Ok(store.get(setting.name))
    }

    /// Removes the value stored for a registered setting.
    #[instrument(skip(self, store), err)]
    pub fn unset(&self, store: &mut ConfigStore, name: &str) -> Result<Option<ConfigValue>> {
        let setting = self.find(name)?;
        Ok(store.remove(setting.name))
    }
}

pub mod error {
    #![allow(missing_docs)]
    use snafu::Snafu;
    use std::num::ParseIntError;

    /// The error type returned when finding, validating or applying settings.
    #[derive(Debug, Snafu)]
    #[snafu(visibility(pub))]
    pub enum SettingsError {
        #[snafu(display("{}", display_all(errors)))]
        Aggregate { errors: Vec<SettingsError> },

        #[snafu(display("Setting '{}' is registered more than once", name))]
        DuplicateSetting { name: String },

        #[snafu(display("Property name {} not found", name))]
        NotFound { name: String },

        #[snafu(display("Failed to parse '{}' as a boolean for {}", value, name))]
        ParseBool { name: String, value: String },

        #[snafu(display("Failed to parse '{}' as an integer for {}: {}", value, name, source))]
        ParseInt {
            name: String,
            value: String,
            source: ParseIntError,
        },

        #[snafu(display("{} is not a valid value for {}: {}", value, name, reason))]
        Validation {
            name: String,
            value: String,
            reason: String,
        },
    }

    fn display_all(errors: &[SettingsError]) -> String {
        let messages: Vec<String> = errors.iter().map(ToString::to_string).collect();
        format!("[{}]", messages.join(", "))
    }
}
