/*!
This crate manages optional cluster add-ons and the typed configuration settings of a local,
single-node cluster.

It provides two engines:

* The [`SettingRegistry`], which validates raw `name=value` changes against each setting's rules
  and writes the typed result into a [`ConfigStore`].
* The [`AddonToggler`], which enables or disables an add-on: it collects any credentials the
  add-on needs, manages the matching secrets, and moves the add-on's payload on or off the VM.

The cluster itself is reached through collaborator traits ([`ClientFactory`], [`SecretManager`],
[`AddonTransport`]) implemented by the caller.

# Crate Features

* **cli** -
  When enabled (the default), the crate exposes the command line definition in [`cli`] and the
  [`Console`] which serves it.
*/
pub mod addons;
#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
#[cfg(feature = "cli")]
pub mod console;
pub mod machine;
pub mod secrets;
pub mod settings;

pub use addons::{
    AddonRegistry, AddonToggler, AddonTransport, FlagPolicy, ToggleError, ToggleOptions,
};
pub use config::{ConfigStore, ConfigValue};
#[cfg(feature = "cli")]
pub use console::Console;
pub use machine::{ClientFactory, ClientType, MachineClient};
pub use secrets::{Secret, SecretManager, SecretPolicy};
pub use settings::{Setting, SettingRegistry, SettingsError};
