//! Provides the [`Console`] struct, which serves the command line interface defined in
//! [`cli`](crate::cli) on top of a configuration store and an [`AddonToggler`].
use crate::addons::{AddonToggler, Prompter, ToggleAction};
use crate::cli::{self, AddonsCommand, ConfigCommand};
use crate::config::ConfigStore;
use crate::machine::ClientFactory;
use crate::settings::SettingRegistry;
use clap::Parser;
use snafu::{ensure, ResultExt};
use std::ffi::OsString;
use std::fmt::Write;
use std::process::ExitCode;
use tracing::{debug, error, info};

pub use error::ConsoleError;

type Result<T> = std::result::Result<T, ConsoleError>;

/// Runs one CLI command per invocation against the configuration store and the cluster.
///
/// The console does not load or save the store; callers persist [`Console::store`] after a
/// successful run.
pub struct Console<F: ClientFactory> {
    settings: SettingRegistry,
    store: ConfigStore,
    toggler: AddonToggler<F>,
    prompter: Box<dyn Prompter>,
}

impl<F: ClientFactory> Console<F> {
    pub fn new<P: Prompter + 'static>(
        settings: SettingRegistry,
        store: ConfigStore,
        toggler: AddonToggler<F>,
        prompter: P,
    ) -> Self {
        Self {
            settings,
            store,
            toggler,
            prompter: Box::new(prompter),
        }
    }

    pub fn store(&self) -> &ConfigStore {
        &self.store
    }

    pub fn into_store(self) -> ConfigStore {
        self.store
    }

    /// Runs the command given in `std::env::args_os()`.
    ///
    /// Output is printed to stdout and errors to stderr. Any error, including a fatal failure to
    /// reach the cluster, yields a failing exit code.
    pub fn run(&mut self) -> ExitCode {
        let args = cli::Cli::parse();
        debug!(?args, "CLI arguments");

        match self.execute(args.command) {
            Ok(output) => {
                if !output.is_empty() {
                    println!("{}", output);
                }
                ExitCode::SUCCESS
            }
            Err(e) => {
                if e.is_fatal() {
                    error!(error = %e, "Cannot reach the cluster");
                }
                eprintln!("{}", e);
                ExitCode::FAILURE
            }
        }
    }

    /// Runs the command given in `iter`, whose first item is the program name, and returns the
    /// output to the caller.
    pub fn try_run_with_args<I, T>(&mut self, iter: I) -> Result<String>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        let args = cli::Cli::try_parse_from(iter).context(error::ParseCLIArgsSnafu)?;
        self.execute(args.command)
    }

    fn execute(&mut self, command: cli::Command) -> Result<String> {
        info!(%command, "Running command");
        match command {
            cli::Command::Config(c) => self.config(c),
            cli::Command::Addons(a) => self.addons(a),
        }
    }

    fn config(&mut self, command: ConfigCommand) -> Result<String> {
        match command {
            ConfigCommand::Set { name, value } => {
                if self.toggler.registry().contains(&name) {
                    return self.toggle_addon(name, &value);
                }
                self.settings
                    .apply(&mut self.store, &name, &value)
                    .context(error::SettingsSnafu)?;
                Ok(String::new())
            }
            ConfigCommand::Get { name } => Ok(self
                .settings
                .get(&self.store, &name)
                .context(error::SettingsSnafu)?
                .map(ToString::to_string)
                .unwrap_or_default()),
            ConfigCommand::Unset { name } => {
                self.settings
                    .unset(&mut self.store, &name)
                    .context(error::SettingsSnafu)?;
                Ok(String::new())
            }
            ConfigCommand::View => {
                serde_json::to_string_pretty(&self.store).context(error::SerializeStoreSnafu)
            }
        }
    }

    fn addons(&mut self, command: AddonsCommand) -> Result<String> {
        match command {
            AddonsCommand::Enable { name } => self.toggle_addon(name, "true"),
            AddonsCommand::Disable { name } => self.toggle_addon(name, "false"),
            AddonsCommand::List => Ok(self.list_addons()),
        }
    }

    fn toggle_addon(&mut self, name: String, value: &str) -> Result<String> {
        ensure!(
            self.toggler.registry().contains(&name),
            error::UnknownAddonSnafu { name }
        );

        let options = self.toggler.options().with_store_flags(&self.store);
        self.toggler.set_options(options);

        let outcome = self
            .toggler
            .toggle(&name, value, &mut *self.prompter)
            .context(error::ToggleSnafu)?;
        self.record_addon_state(&name, outcome.action)?;

        let mut output = match outcome.action {
            ToggleAction::Enable => format!("{} was successfully enabled", name),
            ToggleAction::Disable => format!("{} was successfully disabled", name),
        };
        for failure in &outcome.secret_failures {
            let _ = write!(output, "\nWarning: {}", failure);
        }
        Ok(output)
    }

    // Add-ons without a matching setting are toggled but not recorded.
    fn record_addon_state(&mut self, name: &str, action: ToggleAction) -> Result<()> {
        if self.settings.find(name).is_err() {
            debug!(addon = name, "No setting for addon, state not recorded");
            return Ok(());
        }
        let value = if action.is_enable() { "true" } else { "false" };
        self.settings
            .apply(&mut self.store, name, value)
            .context(error::SettingsSnafu)
    }

    fn list_addons(&self) -> String {
        let mut output = String::new();
        for addon in self.toggler.registry().iter() {
            let status = match self.store.get_bool(&addon.name) {
                Some(true) => "enabled",
                _ => "disabled",
            };
            // Writing to a String cannot fail.
            let _ = writeln!(output, "- {}: {}", addon.name, status);
        }
        output.trim_end().to_string()
    }
}

pub mod error {
    #![allow(missing_docs)]
    use crate::addons::ToggleError;
    use crate::settings::SettingsError;
    use snafu::Snafu;

    /// The error type returned when running a CLI command.
    #[derive(Debug, Snafu)]
    #[snafu(visibility(pub))]
    pub enum ConsoleError {
        #[snafu(display("Failed to parse CLI arguments: {}", source))]
        ParseCLIArgs { source: clap::Error },

        #[snafu(display("Failed to render configuration as JSON: {}", source))]
        SerializeStore { source: serde_json::Error },

        #[snafu(display("{}", source))]
        Settings { source: SettingsError },

        #[snafu(display("{}", source))]
        Toggle { source: ToggleError },

        #[snafu(display("{} is not a valid addon", name))]
        UnknownAddon { name: String },
    }

    impl ConsoleError {
        /// Whether the command failed because the cluster could not be reached.
        pub fn is_fatal(&self) -> bool {
            matches!(self, Self::Toggle { source } if source.is_fatal())
        }
    }
}
