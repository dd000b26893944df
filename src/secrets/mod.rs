//! Provides the [`Secret`] resource handed to an external [`SecretManager`], along with the
//! [`SecretPolicy`] deciding what happens when the manager fails.
use crate::machine::BoxError;
use serde::Serialize;
use snafu::ResultExt;
use std::collections::BTreeMap;
use std::fmt::Debug;
use tracing::{debug, warn};

pub mod registry_creds;

pub use error::SecretError;

/// A namespaced bundle of credentials, labelled for lookup.
///
/// Values in `data` are raw; encoding them is the secret manager's concern.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct Secret {
    pub namespace: String,
    pub name: String,
    pub data: BTreeMap<String, String>,
    pub labels: BTreeMap<String, String>,
}

/// Stores secrets in the cluster.
pub trait SecretManager: Debug {
    /// Creates `secret`, replacing any secret of the same name in its namespace.
    fn create_secret(&self, secret: &Secret) -> Result<(), BoxError>;

    /// Deletes the named secret.
    fn delete_secret(&self, namespace: &str, name: &str) -> Result<(), BoxError>;
}

/// What to do when a secret cannot be created or deleted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SecretPolicy {
    /// Log a warning for each failure and carry on as if it had succeeded.
    Warn,
    /// Attempt every operation, then report all failures together.
    #[default]
    Aggregate,
    /// Stop at the first failure and report it.
    FailFast,
}

/// A single request to the secret manager.
#[derive(Debug, Clone, Copy)]
pub enum SecretOperation<'a> {
    Create(&'a Secret),
    Delete { namespace: &'a str, name: &'a str },
}

impl SecretOperation<'_> {
    fn run(&self, manager: &dyn SecretManager) -> Result<(), SecretError> {
        match *self {
            Self::Create(secret) => manager.create_secret(secret).context(error::CreateSnafu {
                namespace: &secret.namespace,
                name: &secret.name,
            }),
            Self::Delete { namespace, name } => manager
                .delete_secret(namespace, name)
                .context(error::DeleteSnafu { namespace, name }),
        }
    }
}

/// Runs each operation against the manager, handling failures according to `policy`.
///
/// Returns the failures which the policy says must be reported; under [`SecretPolicy::Warn`] the
/// result is always empty.
pub fn run_operations<'a, I>(
    manager: &dyn SecretManager,
    operations: I,
    policy: SecretPolicy,
) -> Vec<SecretError>
where
    I: IntoIterator<Item = SecretOperation<'a>>,
{
    let mut failures = Vec::new();

    for operation in operations {
        debug!(?operation, "Requesting secret operation");
        let Err(e) = operation.run(manager) else {
            continue;
        };

        match policy {
            SecretPolicy::Warn => warn!(error = %e, "Secret operation failed, continuing"),
            SecretPolicy::Aggregate => failures.push(e),
            SecretPolicy::FailFast => {
                failures.push(e);
                break;
            }
        }
    }

    failures
}

mod error {
    #![allow(missing_docs)]
    use crate::machine::BoxError;
    use snafu::Snafu;

    /// The error type recorded when the secret manager fails.
    #[derive(Debug, Snafu)]
    #[snafu(visibility(pub))]
    pub enum SecretError {
        #[snafu(display("Failed to create secret '{}/{}': {}", namespace, name, source))]
        Create {
            namespace: String,
            name: String,
            source: BoxError,
        },

        #[snafu(display("Failed to delete secret '{}/{}': {}", namespace, name, source))]
        Delete {
            namespace: String,
            name: String,
            source: BoxError,
        },
    }
}
