//! Fakes for every collaborator of the add-on toggler. Each fake appends what it was asked to do
//! to a shared [`Log`], so tests can assert on the exact sequence of requests.
#![allow(dead_code)]
use addonctl::addons::{Addon, AddonTransport, PromptError, Prompter};
use addonctl::machine::{BoxError, ClientFactory, ClientType, Driver, Host, MachineClient};
use addonctl::{AddonToggler, Secret, SecretManager, ToggleOptions};
use std::cell::RefCell;
use std::rc::Rc;

#[ctor::ctor]
fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Confirm(String),
    Ask(String),
    CreateSecret(Secret),
    DeleteSecret { namespace: String, name: String },
    NewClient(ClientType),
    EnsureRunning,
    LoadHost,
    Close,
    Transfer(String),
    Delete(String),
}

#[derive(Debug, Default, Clone)]
pub struct Log(Rc<RefCell<Vec<Event>>>);

impl Log {
    pub fn push(&self, event: Event) {
        self.0.borrow_mut().push(event);
    }

    pub fn events(&self) -> Vec<Event> {
        self.0.borrow().clone()
    }

    pub fn count(&self, predicate: impl Fn(&Event) -> bool) -> usize {
        self.0.borrow().iter().filter(|e| predicate(e)).count()
    }

    pub fn created_secrets(&self) -> Vec<Secret> {
        self.0
            .borrow()
            .iter()
            .filter_map(|e| match e {
                Event::CreateSecret(s) => Some(s.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn deleted_secrets(&self) -> Vec<String> {
        self.0
            .borrow()
            .iter()
            .filter_map(|e| match e {
                Event::DeleteSecret { name, .. } => Some(name.clone()),
                _ => None,
            })
            .collect()
    }
}

/// Which collaborator calls should fail.
#[derive(Debug, Default, Clone, Copy)]
pub struct Faults {
    pub create_secret: bool,
    pub delete_secret: bool,
    pub acquire_client: bool,
    pub cluster_down: bool,
    pub load_host: bool,
    pub transport: bool,
}

#[derive(Debug)]
pub struct FakeSecretManager {
    log: Log,
    faults: Faults,
}

impl FakeSecretManager {
    pub fn new(log: &Log, faults: Faults) -> Self {
        Self {
            log: log.clone(),
            faults,
        }
    }
}

impl SecretManager for FakeSecretManager {
    fn create_secret(&self, secret: &Secret) -> Result<(), BoxError> {
        self.log.push(Event::CreateSecret(secret.clone()));
        if self.faults.create_secret {
            return Err(format!("cannot create {}", secret.name).into());
        }
        Ok(())
    }

    fn delete_secret(&self, namespace: &str, name: &str) -> Result<(), BoxError> {
        self.log.push(Event::DeleteSecret {
            namespace: namespace.to_string(),
            name: name.to_string(),
        });
        if self.faults.delete_secret {
            return Err(format!("cannot delete {}", name).into());
        }
        Ok(())
    }
}

#[derive(Debug)]
pub struct FakeDriver;

impl Driver for FakeDriver {
    fn driver_name(&self) -> &str {
        "fake"
    }
}

#[derive(Debug)]
pub struct FakeClient {
    log: Log,
    faults: Faults,
}

impl MachineClient for FakeClient {
    fn ensure_running(&self) -> Result<(), BoxError> {
        self.log.push(Event::EnsureRunning);
        if self.faults.cluster_down {
            return Err("host is stopped".into());
        }
        Ok(())
    }

    fn load_host(&self) -> Result<Host, BoxError> {
        self.log.push(Event::LoadHost);
        if self.faults.load_host {
            return Err("host config missing".into());
        }
        Ok(Host {
            name: "minikube".to_string(),
            driver: Box::new(FakeDriver),
        })
    }

    fn close(&mut self) -> Result<(), BoxError> {
        self.log.push(Event::Close);
        Ok(())
    }
}

#[derive(Debug)]
pub struct FakeClientFactory {
    log: Log,
    faults: Faults,
}

impl FakeClientFactory {
    pub fn new(log: &Log, faults: Faults) -> Self {
        Self {
            log: log.clone(),
            faults,
        }
    }
}

impl ClientFactory for FakeClientFactory {
    type Client = FakeClient;

    fn new_client(&self, client_type: ClientType) -> Result<FakeClient, BoxError> {
        self.log.push(Event::NewClient(client_type));
        if self.faults.acquire_client {
            return Err("machine API unreachable".into());
        }
        Ok(FakeClient {
            log: self.log.clone(),
            faults: self.faults,
        })
    }
}

#[derive(Debug)]
pub struct FakeTransport {
    log: Log,
    faults: Faults,
}

impl FakeTransport {
    pub fn new(log: &Log, faults: Faults) -> Self {
        Self {
            log: log.clone(),
            faults,
        }
    }
}

impl AddonTransport for FakeTransport {
    fn transfer(&self, addon: &Addon, driver: &dyn Driver) -> Result<(), BoxError> {
        assert_eq!(driver.driver_name(), "fake");
        self.log.push(Event::Transfer(addon.name.clone()));
        if self.faults.transport {
            return Err("scp failed".into());
        }
        Ok(())
    }

    fn delete(&self, addon: &Addon, driver: &dyn Driver) -> Result<(), BoxError> {
        assert_eq!(driver.driver_name(), "fake");
        self.log.push(Event::Delete(addon.name.clone()));
        if self.faults.transport {
            return Err("rm failed".into());
        }
        Ok(())
    }
}

/// Declines every confirmation, and records each question asked.
#[derive(Debug)]
pub struct DecliningPrompter {
    log: Log,
}

impl DecliningPrompter {
    pub fn new(log: &Log) -> Self {
        Self { log: log.clone() }
    }
}

impl Prompter for DecliningPrompter {
    fn confirm(
        &mut self,
        question: &str,
        _positive: &[&str],
        _negative: &[&str],
    ) -> Result<bool, PromptError> {
        self.log.push(Event::Confirm(question.trim().to_string()));
        Ok(false)
    }

    fn ask(&mut self, prompt: &str) -> Result<String, PromptError> {
        self.log.push(Event::Ask(prompt.to_string()));
        Ok(String::new())
    }
}

/// Builds a toggler over the builtin add-ons whose collaborators all write to `log`.
pub fn toggler(log: &Log, faults: Faults, options: ToggleOptions) -> AddonToggler<FakeClientFactory> {
    AddonToggler::builder()
        .with_client_factory(FakeClientFactory::new(log, faults))
        .with_secret_manager(FakeSecretManager::new(log, faults))
        .with_transport(FakeTransport::new(log, faults))
        .with_options(options)
        .build()
        .expect("Failed to build addon toggler")
}
