//! Provides the [`AddonToggler`], which enables or disables an add-on in the running cluster.
//!
//! A toggle walks through a fixed sequence of steps:
//! 1. Parse the enable/disable flag.
//! 2. On enable, run the add-on's credential handler (if any) and create the resulting secrets.
//!    On disable, delete the registry credential secrets.
//! 3. Acquire a machine API client and wait for the cluster to be running.
//! 4. Load the host and look up the add-on's descriptor.
//! 5. Transfer the add-on's payload to the VM, or delete it from the VM.
//!
//! The machine API client is released on every path out of steps 3 to 5. Failures in step 3 are
//! reported as fatal (see [`ToggleError::is_fatal`]) so that the caller can decide to exit.
//!
//! Failed secret operations in step 2 only end the toggle under [`SecretPolicy::FailFast`].
use super::prompt::Prompter;
use super::{Addon, AddonRegistry};
use crate::config::ConfigStore;
use crate::machine::{BoxError, ClientFactory, ClientHandle, ClientType, Driver, MachineClient};
use crate::secrets::registry_creds::{Registry, NAMESPACE};
use crate::secrets::{self, SecretError, SecretManager, SecretOperation, SecretPolicy};
use crate::settings::mutators::parse_bool;
use crate::settings::USE_VENDORED_DRIVER;
use snafu::{ensure, OptionExt, ResultExt};
use std::fmt::{Debug, Display};
use tracing::{debug, info, instrument, warn};

pub use error::ToggleError;

type Result<T> = std::result::Result<T, ToggleError>;

/// Moves add-on payloads on and off the VM.
pub trait AddonTransport: Debug {
    /// Copies every asset of `addon` to the VM reached through `driver`.
    fn transfer(&self, addon: &Addon, driver: &dyn Driver) -> std::result::Result<(), BoxError>;

    /// Removes every asset of `addon` from the VM reached through `driver`.
    fn delete(&self, addon: &Addon, driver: &dyn Driver) -> std::result::Result<(), BoxError>;
}

/// What to do when the enable/disable flag is not a boolean literal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FlagPolicy {
    /// Fail before anything is changed.
    #[default]
    Abort,
    /// Log a warning and disable the add-on.
    TreatAsDisable,
}

/// Options controlling an [`AddonToggler`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ToggleOptions {
    pub flag_policy: FlagPolicy,
    pub secret_policy: SecretPolicy,
    /// Selects the in-process machine API client, see [`ClientType::resolve`].
    pub use_vendored_driver: bool,
}

impl ToggleOptions {
    /// Takes the process-wide `use-vendored-driver` flag from the configuration store; an absent
    /// or non-boolean value leaves the flag off.
    pub fn with_store_flags(mut self, store: &ConfigStore) -> Self {
        self.use_vendored_driver = store.get_bool(USE_VENDORED_DRIVER).unwrap_or(false);
        self
    }
}

/// The direction of a toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleAction {
    Enable,
    Disable,
}

impl ToggleAction {
    pub fn is_enable(&self) -> bool {
        matches!(self, Self::Enable)
    }
}

/// The result of a toggle whose payload step succeeded.
#[derive(Debug)]
pub struct ToggleOutcome {
    pub action: ToggleAction,
    /// Secret operations which failed without stopping the toggle.
    pub secret_failures: Vec<SecretError>,
}

impl ToggleOutcome {
    /// Whether every secret operation succeeded as well.
    pub fn is_complete(&self) -> bool {
        self.secret_failures.is_empty()
    }
}

impl Display for ToggleAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Enable => "enable",
            Self::Disable => "disable",
        })
    }
}

/// Enables and disables add-ons in the running cluster.
pub struct AddonToggler<F: ClientFactory> {
    registry: AddonRegistry,
    clients: F,
    secrets: Box<dyn SecretManager>,
    transport: Box<dyn AddonTransport>,
    options: ToggleOptions,
}

impl<F: ClientFactory> AddonToggler<F> {
    /// Returns a builder used to construct an `AddonToggler`.
    pub fn builder() -> AddonTogglerBuilder<F> {
        AddonTogglerBuilder::new()
    }

    pub fn registry(&self) -> &AddonRegistry {
        &self.registry
    }

    pub fn options(&self) -> &ToggleOptions {
        &self.options
    }

    /// Replaces the options used for subsequent toggles.
    pub fn set_options(&mut self, options: ToggleOptions) {
        self.options = options;
    }

    /// Enables or disables the named add-on, depending on the boolean literal `value`.
    ///
    /// The add-on name is expected to have been checked against the registry by the caller;
    /// an unknown name still fails with [`ToggleError::AddonNotFound`] before any payload is
    /// touched.
    ///
    /// Under [`SecretPolicy::Aggregate`] secret failures do not stop the toggle. They are
    /// returned in the [`ToggleOutcome`], or alongside the error of a later step.
    #[instrument(skip(self, prompter), err)]
    pub fn toggle(
        &self,
        name: &str,
        value: &str,
        prompter: &mut dyn Prompter,
    ) -> Result<ToggleOutcome> {
        let action = self.parse_flag(name, value)?;
        info!(addon = name, %action, "Toggling addon");

        let secret_failures = match action {
            ToggleAction::Enable => self.create_secrets(name, prompter)?,
            ToggleAction::Disable => self.delete_secrets()?,
        };

        if let Err(source) = self.apply_payload(name, action) {
            if secret_failures.is_empty() {
                return Err(source);
            }
            return Err(ToggleError::SecretsAndPayload {
                source: Box::new(source),
                failures: secret_failures,
            });
        }

        Ok(ToggleOutcome {
            action,
            secret_failures,
        })
    }

    /// Reaches the cluster and moves the add-on's payload. The client is closed on return.
    fn apply_payload(&self, name: &str, action: ToggleAction) -> Result<()> {
        let client_type = ClientType::resolve(self.options.use_vendored_driver);
        debug!(%client_type, "Acquiring machine API client");
        let client = self
            .clients
            .new_client(client_type)
            .context(error::ClientAcquisitionSnafu { client_type })?;
        let client = ClientHandle::new(client);

        client
            .ensure_running()
            .context(error::ClusterNotRunningSnafu)?;

        let host = client.load_host().context(error::HostLoadSnafu)?;
        let addon = self
            .registry
            .get(name)
            .context(error::AddonNotFoundSnafu { addon: name })?;

        self.dispatch(action, addon, &*host.driver)?;

        info!(addon = name, %action, host = %host.name, "Toggled addon");
        Ok(())
    }

    fn parse_flag(&self, name: &str, value: &str) -> Result<ToggleAction> {
        match (parse_bool(value), self.options.flag_policy) {
            (Some(true), _) => Ok(ToggleAction::Enable),
            (Some(false), _) => Ok(ToggleAction::Disable),
            (None, FlagPolicy::TreatAsDisable) => {
                warn!(addon = name, value, "Unparsable enable/disable value, disabling addon");
                Ok(ToggleAction::Disable)
            }
            (None, FlagPolicy::Abort) => error::InvalidFlagSnafu {
                addon: name,
                value,
            }
            .fail(),
        }
    }

    fn create_secrets(&self, name: &str, prompter: &mut dyn Prompter) -> Result<Vec<SecretError>> {
        let handler = match self.registry.handler(name) {
            Some(handler) if handler.needs_credentials() => handler,
            _ => {
                debug!(addon = name, "Addon needs no credentials");
                return Ok(Vec::new());
            }
        };

        let collected = handler
            .collect(prompter)
            .context(error::CredentialsSnafu { addon: name })?;

        let failures = secrets::run_operations(
            &*self.secrets,
            collected.iter().map(SecretOperation::Create),
            self.options.secret_policy,
        );
        self.settle(failures)
    }

    fn delete_secrets(&self) -> Result<Vec<SecretError>> {
        let operations = Registry::ALL
            .into_iter()
            .map(|registry| SecretOperation::Delete {
                namespace: NAMESPACE,
                name: registry.secret_name(),
            });

        let failures =
            secrets::run_operations(&*self.secrets, operations, self.options.secret_policy);
        self.settle(failures)
    }

    // Only fail-fast stops the toggle; aggregated failures travel with the result.
    fn settle(&self, failures: Vec<SecretError>) -> Result<Vec<SecretError>> {
        ensure!(
            failures.is_empty() || self.options.secret_policy != SecretPolicy::FailFast,
            error::SecretOperationsSnafu { failures }
        );

        if !failures.is_empty() {
            warn!(
                count = failures.len(),
                "Secret operations failed, continuing with the addon payload"
            );
        }
        Ok(failures)
    }

    fn dispatch(&self, action: ToggleAction, addon: &Addon, driver: &dyn Driver) -> Result<()> {
        debug!(
            addon = %addon.name,
            driver = driver.driver_name(),
            %action,
            "Dispatching addon payload"
        );
        match action {
            ToggleAction::Enable => {
                self.transport
                    .transfer(addon, driver)
                    .context(error::TransferSnafu {
                        addon: &addon.name,
                        driver: driver.driver_name(),
                    })
            }
            ToggleAction::Disable => {
                self.transport
                    .delete(addon, driver)
                    .context(error::DeleteSnafu {
                        addon: &addon.name,
                        driver: driver.driver_name(),
                    })
            }
        }
    }
}

impl<F: ClientFactory> Debug for AddonToggler<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AddonToggler")
            .field("addons", &self.registry.iter().count())
            .field("secrets", &self.secrets)
            .field("transport", &self.transport)
            .field("options", &self.options)
            .finish()
    }
}

/// A builder which can construct an [`AddonToggler`].
///
/// The add-on registry defaults to [`AddonRegistry::builtin`]; every other collaborator is
/// required.
pub struct AddonTogglerBuilder<F: ClientFactory> {
    registry: Option<AddonRegistry>,
    clients: Option<F>,
    secrets: Option<Box<dyn SecretManager>>,
    transport: Option<Box<dyn AddonTransport>>,
    options: ToggleOptions,
}

impl<F: ClientFactory> Default for AddonTogglerBuilder<F> {
    fn default() -> Self {
        Self::new()
    }
}

impl<F: ClientFactory> AddonTogglerBuilder<F> {
    pub fn new() -> Self {
        Self {
            registry: None,
            clients: None,
            secrets: None,
            transport: None,
            options: ToggleOptions::default(),
        }
    }

    pub fn with_registry(mut self, registry: AddonRegistry) -> Self {
        self.registry = Some(registry);
        self
    }

    pub fn with_client_factory(mut self, clients: F) -> Self {
        self.clients = Some(clients);
        self
    }

    pub fn with_secret_manager<S: SecretManager + 'static>(mut self, secrets: S) -> Self {
        self.secrets = Some(Box::new(secrets));
        self
    }

    pub fn with_transport<T: AddonTransport + 'static>(mut self, transport: T) -> Self {
        self.transport = Some(Box::new(transport));
        self
    }

    pub fn with_options(mut self, options: ToggleOptions) -> Self {
        self.options = options;
        self
    }

    /// Constructs an [`AddonToggler`], failing if a required collaborator was not supplied.
    pub fn build(self) -> Result<AddonToggler<F>> {
        Ok(AddonToggler {
            registry: self.registry.unwrap_or_else(AddonRegistry::builtin),
            clients: self.clients.context(error::MissingCollaboratorSnafu {
                collaborator: "client factory",
            })?,
            secrets: self.secrets.context(error::MissingCollaboratorSnafu {
                collaborator: "secret manager",
            })?,
            transport: self.transport.context(error::MissingCollaboratorSnafu {
                collaborator: "addon transport",
            })?,
            options: self.options,
        })
    }
}

pub mod error {
    #![allow(missing_docs)]
    use crate::addons::prompt::PromptError;
    use crate::machine::{BoxError, ClientType};
    use crate::secrets::SecretError;
    use snafu::Snafu;

    /// The error type returned when toggling an add-on.
    #[derive(Debug, Snafu)]
    #[snafu(visibility(pub))]
    pub enum ToggleError {
        #[snafu(display("Addon '{}' not found", addon))]
        AddonNotFound { addon: String },

        #[snafu(display("Error getting {} machine API client: {}", client_type, source))]
        ClientAcquisition {
            client_type: ClientType,
            source: BoxError,
        },

        #[snafu(display("Cluster is not running: {}", source))]
        ClusterNotRunning { source: BoxError },

        #[snafu(display("Failed to collect credentials for addon {}: {}", addon, source))]
        Credentials { addon: String, source: PromptError },

        #[snafu(display("Error deleting addon {} from VM via {}: {}", addon, driver, source))]
        Delete {
            addon: String,
            driver: String,
            source: BoxError,
        },

        #[snafu(display("Failed to load cluster host: {}", source))]
        HostLoad { source: BoxError },

        #[snafu(display(
            "Error attempting to parse enable/disable value '{}' for addon {}",
            value,
            addon
        ))]
        InvalidFlag { addon: String, value: String },

        #[snafu(display("Cannot toggle addons without a {}", collaborator))]
        MissingCollaborator { collaborator: &'static str },

        #[snafu(display("{}", display_all(failures)))]
        SecretOperations { failures: Vec<SecretError> },

        #[snafu(display("{}; {}", source, display_all(failures)))]
        SecretsAndPayload {
            source: Box<ToggleError>,
            failures: Vec<SecretError>,
        },

        #[snafu(display("Error transferring addon {} to VM via {}: {}", addon, driver, source))]
        Transfer {
            addon: String,
            driver: String,
            source: BoxError,
        },
    }

    impl ToggleError {
        /// Whether the cluster could not be reached at all, in which case a CLI should stop
        /// rather than carry on with other work.
        pub fn is_fatal(&self) -> bool {
            match self {
                Self::ClientAcquisition { .. } | Self::ClusterNotRunning { .. } => true,
                Self::SecretsAndPayload { source, .. } => source.is_fatal(),
                _ => false,
            }
        }
    }

    fn display_all(failures: &[SecretError]) -> String {
        let messages: Vec<String> = failures.iter().map(ToString::to_string).collect();
        format!("Secret operations failed: [{}]", messages.join(", "))
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_store_flags() {
        let mut store = ConfigStore::new();
        let options = ToggleOptions::default().with_store_flags(&store);
        assert!(!options.use_vendored_driver);

        store.insert(USE_VENDORED_DRIVER, true);
        let options = ToggleOptions {
            secret_policy: SecretPolicy::Warn,
            ..Default::default()
        }
        .with_store_flags(&store);
        assert!(options.use_vendored_driver);
        assert_eq!(options.secret_policy, SecretPolicy::Warn);

        store.insert(USE_VENDORED_DRIVER, "sometimes");
        assert!(!options.with_store_flags(&store).use_vendored_driver);
    }

    #[test]
    fn test_fatal_errors() {
        let fatal = ToggleError::ClusterNotRunning {
            source: "stopped".into(),
        };
        assert!(fatal.is_fatal());

        let not_fatal = ToggleError::AddonNotFound {
            addon: "dashboard".to_string(),
        };
        assert!(!not_fatal.is_fatal());
        assert_eq!(not_fatal.to_string(), "Addon 'dashboard' not found");

        let wrapped = ToggleError::SecretsAndPayload {
            source: Box::new(fatal),
            failures: Vec::new(),
        };
        assert!(wrapped.is_fatal());
    }
}
