//! Network-dependent consensus parameters.
//!
//! A network-gated constant pattern: the only per-network values the
//! services core needs are the address version bytes (see
//! `transparent::address`) and the expiration depth used by C8:
//! 1440 blocks on regtest/testnet-style short chains, 525600 on mainnet.

use crate::height::Height;

#[cfg(any(test, feature = "proptest-impl"))]
use proptest_derive::Arbitrary;

/// Which instance of the chain a record or address belongs to.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[cfg_attr(any(test, feature = "proptest-impl"), derive(Arbitrary))]
pub enum Network {
    /// The production chain.
    Mainnet,
    /// The public test chain.
    Testnet,
    /// A local, single-node development chain.
    Regtest,
}

impl Default for Network {
    fn default() -> Self {
        Network::Mainnet
    }
}

impl Network {
    /// The base expiration depth for services records, before
    /// multiplying by an alias's renewal factor.
    pub fn expiration_depth(&self) -> Height {
        match self {
            Network::Mainnet => Height(525_600),
            Network::Testnet | Network::Regtest => Height(1_440),
        }
    }
}

