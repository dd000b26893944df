//! The secrets consumed by the `registry-creds` add-on, one per supported container registry.
use super::Secret;
use std::collections::BTreeMap;

/// Namespace holding the registry credential secrets.
pub const NAMESPACE: &str = "kube-system";

/// Value used for every credential the operator did not provide.
pub const PLACEHOLDER: &str = "changeme";

/// Label key marking a resource as belonging to an add-on.
pub const ADDON_LABEL: &str = "kubernetes.io/minikube-addons";

const APP: &str = "registry-creds";

/// The container registries for which credentials may be configured.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Registry {
    /// AWS Elastic Container Registry.
    Ecr,
    /// Google Container Registry.
    Gcr,
    /// A private Docker registry.
    Dpr,
}

impl Registry {
    pub const ALL: [Registry; 3] = [Registry::Ecr, Registry::Gcr, Registry::Dpr];

    /// The value of the `cloud` label.
    pub fn cloud(&self) -> &'static str {
        match self {
            Self::Ecr => "ecr",
            Self::Gcr => "gcr",
            Self::Dpr => "dpr",
        }
    }

    /// The name of the secret holding this registry's credentials.
    pub fn secret_name(&self) -> &'static str {
        match self {
            Self::Ecr => "registry-creds-ecr",
            Self::Gcr => "registry-creds-gcr",
            Self::Dpr => "registry-creds-dpr",
        }
    }

    fn labels(&self) -> BTreeMap<String, String> {
        [("app", APP), ("cloud", self.cloud()), (ADDON_LABEL, APP)]
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }
}

/// AWS Elastic Container Registry credentials.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EcrCredentials {
    pub access_key_id: String,
    pub secret_access_key: String,
    pub region: String,
    pub account: String,
}

impl Default for EcrCredentials {
    fn default() -> Self {
        Self {
            access_key_id: PLACEHOLDER.to_string(),
            secret_access_key: PLACEHOLDER.to_string(),
            region: PLACEHOLDER.to_string(),
            account: PLACEHOLDER.to_string(),
        }
    }
}

/// Google Container Registry credentials.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GcrCredentials {
    /// Contents of an `application_default_credentials.json` document.
    pub application_default_credentials: String,
}

impl Default for GcrCredentials {
    fn default() -> Self {
        Self {
            application_default_credentials: PLACEHOLDER.to_string(),
        }
    }
}

/// Private Docker registry credentials.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DockerRegistryCredentials {
    pub server: String,
    pub user: String,
    pub password: String,
}

impl Default for DockerRegistryCredentials {
    fn default() -> Self {
        Self {
            server: PLACEHOLDER.to_string(),
            user: PLACEHOLDER.to_string(),
            password: PLACEHOLDER.to_string(),
        }
    }
}

/// Credentials for every supported registry. Defaults to placeholders throughout.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegistryCredentials {
    pub ecr: EcrCredentials,
    pub gcr: GcrCredentials,
    pub dpr: DockerRegistryCredentials,
}

impl RegistryCredentials {
    /// Returns the flat key/value payload for one registry's secret.
    pub fn data(&self, registry: Registry) -> BTreeMap<String, String> {
        let pairs: Vec<(&str, &str)> = match registry {
            Registry::Ecr => vec![
                ("AWS_ACCESS_KEY_ID", self.ecr.access_key_id.as_str()),
                ("AWS_SECRET_ACCESS_KEY", self.ecr.secret_access_key.as_str()),
                ("aws-account", self.ecr.account.as_str()),
                ("aws-region", self.ecr.region.as_str()),
            ],
            Registry::Gcr => vec![(
                "application_default_credentials.json",
                self.gcr.application_default_credentials.as_str(),
            )],
            Registry::Dpr => vec![
                ("DOCKER_PRIVATE_REGISTRY_SERVER", self.dpr.server.as_str()),
                ("DOCKER_PRIVATE_REGISTRY_USER", self.dpr.user.as_str()),
                ("DOCKER_PRIVATE_REGISTRY_PASSWORD", self.dpr.password.as_str()),
            ],
        };

        pairs
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    /// Builds the ECR, GCR and DPR secrets, in that order.
    pub fn into_secrets(self) -> Vec<Secret> {
        Registry::ALL
            .iter()
            .map(|registry| Secret {
                namespace: NAMESPACE.to_string(),
                name: registry.secret_name().to_string(),
                data: self.data(*registry),
                labels: registry.labels(),
            })
            .collect()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use maplit::btreemap;

    #[test]
    fn test_default_secrets() {
        let secrets = RegistryCredentials::default().into_secrets();

        let names: Vec<&str> = secrets.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(
            names,
            ["registry-creds-ecr", "registry-creds-gcr", "registry-creds-dpr"]
        );
        assert!(secrets
            .iter()
            .flat_map(|s| s.data.values())
            .all(|v| v == PLACEHOLDER));
    }

    #[test]
    fn test_labels() {
        let secrets = RegistryCredentials::default().into_secrets();
        assert_eq!(
            secrets[1].labels,
            btreemap! {
                "app".to_string() => "registry-creds".to_string(),
                "cloud".to_string() => "gcr".to_string(),
                "kubernetes.io/minikube-addons".to_string() => "registry-creds".to_string(),
            }
        );
        assert!(secrets.iter().all(|s| s.namespace == NAMESPACE));
    }

    #[test]
    fn test_ecr_data_keys() {
        let credentials = RegistryCredentials {
            ecr: EcrCredentials {
                access_key_id: "AKIA".to_string(),
                secret_access_key: "secret".to_string(),
                region: "us-west-2".to_string(),
                account: "123456789012".to_string(),
            },
            ..Default::default()
        };

        assert_eq!(
            credentials.data(Registry::Ecr),
            btreemap! {
                "AWS_ACCESS_KEY_ID".to_string() => "AKIA".to_string(),
                "AWS_SECRET_ACCESS_KEY".to_string() => "secret".to_string(),
                "aws-account".to_string() => "123456789012".to_string(),
                "aws-region".to_string() => "us-west-2".to_string(),
            }
        );
    }
}
