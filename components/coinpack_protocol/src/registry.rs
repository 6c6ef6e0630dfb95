//! A registry publishing network parameter sets by name.
//!
//! Parameter sets are registered during an explicit initialization phase and are shared
//! read-only afterwards. Registration is idempotent: registering a set that is identical to
//! the one already published under the same name returns the published instance.

use std::collections::HashMap;
use std::error;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

use tracing::{debug, trace};

use crate::consensus::{Network, NetworkParams, Parameters};

/// Errors that can occur while registering a parameter set.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RegistryError {
    /// A different parameter set is already registered under this name.
    ConflictingParams { name: String },
    /// The network magic is already owned by a parameter set registered under another name.
    DuplicateMagic { magic: u32, existing: String },
    /// The registry lock was poisoned by a panicking writer.
    Poisoned,
}

impl fmt::Display for RegistryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegistryError::ConflictingParams { name } => write!(
                f,
                "Network {} is already registered with different parameters",
                name
            ),
            RegistryError::DuplicateMagic { magic, existing } => write!(
                f,
                "Network magic {:#010x} is already registered for network {}",
                magic, existing
            ),
            RegistryError::Poisoned => write!(f, "Parameter registry lock is poisoned"),
        }
    }
}

impl error::Error for RegistryError {}

/// A thread-safe table of [`NetworkParams`] keyed by network name.
#[derive(Debug, Default)]
pub struct ParamsRegistry {
    entries: RwLock<HashMap<String, Arc<NetworkParams>>>,
}

impl ParamsRegistry {
    /// Constructs an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Constructs a registry holding the parameters of the built-in networks.
    pub fn with_builtin() -> Result<Self, RegistryError> {
        let registry = Self::new();
        for network in [Network::MainNetwork, Network::TestNetwork] {
            registry.register(NetworkParams::from(network))?;
        }
        Ok(registry)
    }

    /// Publishes `params` under its network name.
    ///
    /// The check against existing entries and the insertion happen under a single write
    /// lock, so concurrent registrations of the same set all observe one published instance.
    pub fn register(&self, params: NetworkParams) -> Result<Arc<NetworkParams>, RegistryError> {
        let mut entries = self.entries.write().map_err(|_| RegistryError::Poisoned)?;

        if let Some(existing) = entries.get(params.network_name()) {
            return if **existing == params {
                trace!(network = params.network_name(), "Parameters already registered");
                Ok(Arc::clone(existing))
            } else {
                Err(RegistryError::ConflictingParams {
                    name: params.network_name().to_owned(),
                })
            };
        }

        if let Some(existing) = entries
            .values()
            .find(|p| p.network_magic() == params.network_magic())
        {
            return Err(RegistryError::DuplicateMagic {
                magic: params.network_magic(),
                existing: existing.network_name().to_owned(),
            });
        }

        debug!(
            network = params.network_name(),
            magic = params.network_magic(),
            "Registering network parameters"
        );
        let params = Arc::new(params);
        entries.insert(params.network_name().to_owned(), Arc::clone(&params));
        Ok(params)
    }

    /// Returns the parameter set registered under `name`, if any.
    ///
    /// The same instance is returned for the same name for the lifetime of the registry.
    /// Lookups keep working after a registering thread has panicked: published sets are
    /// inserted whole, so the table never holds a partial entry.
    pub fn get(&self, name: &str) -> Option<Arc<NetworkParams>> {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        entries.get(name).cloned()
    }

    /// Returns `true` if a parameter set is registered under `name`.
    pub fn is_registered(&self, name: &str) -> bool {
        self.get(name).is_some()
    }
}
