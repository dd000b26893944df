//! Contains the definition of the command line interface.
//!
//! The default implementation of this interface is provided by [`Console`](crate::Console).
#![allow(missing_docs)]
use clap::{Parser, Subcommand};
use std::fmt::Display;

/// Manages cluster add-ons and persisted configuration.
#[derive(Parser, Debug)]
#[command(name = "addonctl")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Modify persisted configuration values
    #[command(subcommand)]
    Config(ConfigCommand),

    /// Enable, disable or list cluster add-ons
    #[command(subcommand)]
    Addons(AddonsCommand),
}

impl Display for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Config(_) => "config",
            Self::Addons(_) => "addons",
        })
    }
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Sets a configuration value
    Set {
        /// the setting to change
        name: String,
        /// the new value, validated against the setting's rules
        #[arg(allow_hyphen_values = true)]
        value: String,
    },

    /// Prints a configuration value
    Get {
        /// the setting to print
        name: String,
    },

    /// Removes a configuration value
    Unset {
        /// the setting to remove
        name: String,
    },

    /// Prints every configuration value as JSON
    View,
}

#[derive(Subcommand, Debug)]
pub enum AddonsCommand {
    /// Enables an add-on in the running cluster
    Enable {
        /// the add-on to enable
        name: String,
    },

    /// Disables an add-on in the running cluster
    Disable {
        /// the add-on to disable
        name: String,
    },

    /// Lists known add-ons and whether they are enabled
    List,
}
