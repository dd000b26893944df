//! Provides the seams through which the add-on orchestrator reaches the cluster's machine API.
//!
//! Callers implement [`ClientFactory`] and [`MachineClient`] over a real machine API; this crate
//! only decides which [`ClientType`] to ask for and guarantees, through [`ClientHandle`], that
//! every acquired client is closed again.
use std::fmt::{Debug, Display};
use std::ops::{Deref, DerefMut};
use tracing::{debug, warn};

/// Errors returned by the machine API collaborators.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Selects between the two machine API client implementations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientType {
    /// Drivers run in-process.
    Local,
    /// Drivers run as plugin processes reached over RPC.
    Rpc,
}

impl ClientType {
    /// Returns `Local` when the vendored driver flag is set, otherwise `Rpc`.
    pub fn resolve(use_vendored_driver: bool) -> Self {
        if use_vendored_driver {
            Self::Local
        } else {
            Self::Rpc
        }
    }
}

impl Display for ClientType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Local => "local",
            Self::Rpc => "rpc",
        })
    }
}

/// The control interface of the running VM.
pub trait Driver: Debug {
    /// Returns the name of the driver backing the VM, e.g. `kvm2`.
    fn driver_name(&self) -> &str;
}

/// The machine hosting the cluster, along with the driver used to reach it.
#[derive(Debug)]
pub struct Host {
    pub name: String,
    pub driver: Box<dyn Driver>,
}

/// A connection to the cluster's machine API.
pub trait MachineClient: Debug {
    /// Blocks until the cluster is confirmed running, or fails.
    fn ensure_running(&self) -> Result<(), BoxError>;

    /// Loads the host running the cluster.
    fn load_host(&self) -> Result<Host, BoxError>;

    /// Releases the connection.
    fn close(&mut self) -> Result<(), BoxError>;
}

/// Creates machine API clients.
pub trait ClientFactory {
    /// The client type produced by this factory.
    type Client: MachineClient;

    /// Opens a new client of the requested type.
    fn new_client(&self, client_type: ClientType) -> Result<Self::Client, BoxError>;
}

/// Owns a [`MachineClient`] for the duration of one operation and closes it when dropped.
#[derive(Debug)]
pub struct ClientHandle<C: MachineClient> {
    client: C,
}

impl<C: MachineClient> ClientHandle<C> {
    pub fn new(client: C) -> Self {
        Self { client }
    }
}

impl<C: MachineClient> Deref for ClientHandle<C> {
    type Target = C;

    fn deref(&self) -> &Self::Target {
        &self.client
    }
}

impl<C: MachineClient> DerefMut for ClientHandle<C> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.client
    }
}

impl<C: MachineClient> Drop for ClientHandle<C> {
    fn drop(&mut self) {
        debug!("Closing machine API client");
        if let Err(e) = self.client.close() {
            warn!(error = %e, "Failed to close machine API client");
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    #[test]
    fn test_resolve_client_type() {
        assert_eq!(ClientType::resolve(true), ClientType::Local);
        assert_eq!(ClientType::resolve(false), ClientType::Rpc);
    }

    #[derive(Debug)]
    struct CountingClient(Rc<Cell<usize>>);

    impl MachineClient for CountingClient {
        fn ensure_running(&self) -> Result<(), BoxError> {
            Ok(())
        }

        fn load_host(&self) -> Result<Host, BoxError> {
            Err("no host".into())
        }

        fn close(&mut self) -> Result<(), BoxError> {
            self.0.set(self.0.get() + 1);
            Err("already closed".into())
        }
    }

    #[test]
    fn test_handle_closes_once_on_drop() {
        let closed = Rc::new(Cell::new(0));
        {
            let handle = ClientHandle::new(CountingClient(Rc::clone(&closed)));
            assert!(handle.ensure_running().is_ok());
            assert_eq!(closed.get(), 0);
        }
        assert_eq!(closed.get(), 1);
    }
}
