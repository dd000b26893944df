//! Provides the [`AddonRegistry`] of known add-ons and the [`AddonToggler`], which turns add-ons
//! on and off in a running cluster.
//!
//! Add-ons needing more than their payload copied to the VM implement [`AddonHandler`]. Today the
//! only such add-on is `registry-creds`, which asks the operator for container registry
//! credentials and stores them as secrets before its payload is transferred.
use crate::secrets::registry_creds::RegistryCredentials;
use crate::secrets::Secret;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::fmt::Debug;

mod builtin;
pub mod credentials;
pub mod prompt;
pub mod toggle;

pub use self::prompt::{LinePrompter, PromptError, Prompter};
pub use self::toggle::{
    AddonToggler, AddonTogglerBuilder, AddonTransport, FlagPolicy, ToggleAction, ToggleError,
    ToggleOptions, ToggleOutcome,
};

/// Name of the add-on which distributes container registry credentials.
pub const REGISTRY_CREDS: &str = "registry-creds";

/// Names of the add-ons in [`AddonRegistry::builtin`], in order.
pub const BUILTIN_ADDONS: &[&str] = &[
    "addon-manager",
    "dashboard",
    "default-storageclass",
    "heapster",
    "ingress",
    "kube-dns",
    REGISTRY_CREDS,
    "storage-provisioner",
];

/// A file belonging to an add-on's payload.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct AddonAsset {
    /// Where the file is read from.
    pub source: String,
    /// Directory on the VM receiving the file.
    pub target_dir: String,
    pub target_name: String,
    /// Octal file mode, e.g. `0640`.
    pub permissions: String,
}

impl AddonAsset {
    pub fn new(source: &str, target_dir: &str, target_name: &str, permissions: &str) -> Self {
        Self {
            source: source.to_string(),
            target_dir: target_dir.to_string(),
            target_name: target_name.to_string(),
            permissions: permissions.to_string(),
        }
    }

    /// Full path of the file on the VM.
    pub fn target_path(&self) -> String {
        format!("{}/{}", self.target_dir.trim_end_matches('/'), self.target_name)
    }
}

/// An optional cluster feature whose payload can be transferred to, or removed from, the VM.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct Addon {
    pub name: String,
    pub assets: Vec<AddonAsset>,
}

impl Addon {
    pub fn new(name: &str, assets: Vec<AddonAsset>) -> Self {
        Self {
            name: name.to_string(),
            assets,
        }
    }
}

/// Extra behavior run when an add-on is enabled.
pub trait AddonHandler: Debug {
    /// Whether the operator must be asked for credentials before enabling the add-on.
    fn needs_credentials(&self) -> bool {
        false
    }

    /// Asks the operator for credentials and returns the secrets to create from them.
    fn collect(&self, _prompter: &mut dyn Prompter) -> Result<Vec<Secret>, PromptError> {
        Ok(Vec::new())
    }
}

/// Collects container registry credentials for the `registry-creds` add-on.
#[derive(Debug, Default, Clone, Copy)]
pub struct RegistryCredsHandler;

impl AddonHandler for RegistryCredsHandler {
    fn needs_credentials(&self) -> bool {
        true
    }

    fn collect(&self, prompter: &mut dyn Prompter) -> Result<Vec<Secret>, PromptError> {
        credentials::collect(prompter).map(RegistryCredentials::into_secrets)
    }
}

/// The add-ons known to the CLI, keyed by name, and the handlers of those needing one.
#[derive(Debug, Default)]
pub struct AddonRegistry {
    addons: BTreeMap<String, Addon>,
    handlers: HashMap<String, Box<dyn AddonHandler>>,
}

impl AddonRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the registry of add-ons shipped with the cluster.
    pub fn builtin() -> Self {
        builtin::addons()
            .into_iter()
            .fold(Self::new(), Self::with_addon)
            .with_handler(REGISTRY_CREDS, RegistryCredsHandler)
    }

    /// Registers an add-on, replacing any add-on of the same name.
    pub fn with_addon(mut self, addon: Addon) -> Self {
        self.addons.insert(addon.name.clone(), addon);
        self
    }

    /// Registers the handler run when the named add-on is enabled.
    pub fn with_handler<H: AddonHandler + 'static>(mut self, name: &str, handler: H) -> Self {
        self.handlers.insert(name.to_string(), Box::new(handler));
        self
    }

    /// Returns the named add-on.
    pub fn get(&self, name: &str) -> Option<&Addon> {
        self.addons.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.addons.contains_key(name)
    }

    /// Returns the handler registered for the named add-on.
    pub fn handler(&self, name: &str) -> Option<&dyn AddonHandler> {
        self.handlers.get(name).map(|handler| &**handler)
    }

    /// Iterates over all add-ons, ordered by name.
    pub fn iter(&self) -> impl Iterator<Item = &Addon> {
        self.addons.values()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_builtin_registry() {
        let registry = AddonRegistry::builtin();
        for name in ["dashboard", "registry-creds", "storage-provisioner", "ingress"] {
            assert!(registry.contains(name), "{} missing", name);
            assert!(!registry.get(name).unwrap().assets.is_empty());
        }
        assert!(registry.get("nope").is_none());
    }

    #[test]
    fn test_builtin_names() {
        let registry = AddonRegistry::builtin();
        let names: Vec<&str> = registry.iter().map(|addon| addon.name.as_str()).collect();
        assert_eq!(names, BUILTIN_ADDONS);
    }

    #[test]
    fn test_only_registry_creds_needs_credentials() {
        let registry = AddonRegistry::builtin();
        let needing: Vec<&str> = registry
            .iter()
            .filter(|addon| {
                registry
                    .handler(&addon.name)
                    .map_or(false, |h| h.needs_credentials())
            })
            .map(|addon| addon.name.as_str())
            .collect();
        assert_eq!(needing, [REGISTRY_CREDS]);
    }

    #[test]
    fn test_target_path() {
        let asset = AddonAsset::new("a.yaml", "/etc/kubernetes/addons/", "a.yaml", "0640");
        assert_eq!(asset.target_path(), "/etc/kubernetes/addons/a.yaml");
    }
}
