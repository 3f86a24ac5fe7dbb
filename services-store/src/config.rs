//! Store configuration: where the sled database lives and which network's
//! expiration constants apply.

use services_chain::parameters::Network;
use std::path::PathBuf;

/// Configuration for [`crate::Stores`]: a cache directory plus a
/// per-network sub-path, so mainnet/testnet/regtest state never collide
/// on disk.
#[derive(Clone, Debug)]
pub struct Config {
    /// The root directory the sled database lives under. `None` opens an
    /// ephemeral in-memory database, used by tests.
    pub cache_dir: Option<PathBuf>,
}

impl Config {
    pub fn ephemeral() -> Self {
        Config { cache_dir: None }
    }

    pub fn persistent(cache_dir: PathBuf) -> Self {
        Config {
            cache_dir: Some(cache_dir),
        }
    }

    /// `$XDG_CACHE_HOME/syscoin-services` (or platform equivalent).
    pub fn default_persistent() -> Self {
        let cache_dir = dirs::cache_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("syscoin-services");
        Self::persistent(cache_dir)
    }

    pub fn sled_config(&self, network: Network) -> sled::Config {
        let mut config = sled::Config::default();
        match &self.cache_dir {
            Some(dir) => {
                let network_dir = match network {
                    Network::Mainnet => "mainnet",
                    Network::Testnet => "testnet",
                    Network::Regtest => "regtest",
                };
                config = config.path(dir.join("services").join(network_dir));
            }
            None => {
                config = config.temporary(true);
            }
        }
        config
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::ephemeral()
    }
}

