//! Interactively collects the container registry credentials used by the `registry-creds` add-on.
//!
//! Each registry is offered in turn. Registries the operator declines keep the placeholder
//! credentials from [`RegistryCredentials::default`].
use super::prompt::{PromptError, Prompter};
use crate::secrets::registry_creds::{
    DockerRegistryCredentials, EcrCredentials, GcrCredentials, RegistryCredentials,
};
use tracing::{debug, instrument, warn};

const POSITIVE: &[&str] = &["yes", "y"];
const NEGATIVE: &[&str] = &["no", "n"];

/// Asks the operator for the credentials of every supported registry.
#[instrument(skip(prompter), err)]
pub fn collect(prompter: &mut dyn Prompter) -> Result<RegistryCredentials, PromptError> {
    let mut credentials = RegistryCredentials::default();

    if prompter.confirm(
        "\nDo you want to enable AWS Elastic Container Registry?",
        POSITIVE,
        NEGATIVE,
    )? {
        credentials.ecr = EcrCredentials {
            access_key_id: prompter.ask("-- Enter AWS Access Key ID: ")?,
            secret_access_key: prompter.ask("-- Enter AWS Secret Access Key: ")?,
            region: prompter.ask("-- Enter AWS Region: ")?,
            account: prompter.ask("-- Enter 12 digit AWS Account ID: ")?,
        };
    }

    if prompter.confirm(
        "\nDo you want to enable Google Container Registry?",
        POSITIVE,
        NEGATIVE,
    )? {
        let path = prompter.ask(
            "-- Enter path to credentials \
             (e.g. /home/user/.config/gcloud/application_default_credentials.json): ",
        )?;

        match std::fs::read_to_string(&path) {
            Ok(application_default_credentials) => {
                debug!(path = %path, "Read application default credentials");
                credentials.gcr = GcrCredentials {
                    application_default_credentials,
                };
            }
            Err(e) => {
                warn!(
                    path = %path,
                    error = %e,
                    "Could not read application default credentials, using placeholder"
                );
            }
        }
    }

    if prompter.confirm("\nDo you want to enable Docker Registry?", POSITIVE, NEGATIVE)? {
        credentials.dpr = DockerRegistryCredentials {
            server: prompter.ask("-- Enter docker registry server url: ")?,
            user: prompter.ask("-- Enter docker registry username: ")?,
            password: prompter.ask("-- Enter docker registry password: ")?,
        };
    }

    Ok(credentials)
}
