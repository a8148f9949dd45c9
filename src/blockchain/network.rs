//! Network name to endpoint resolution.
//!
//! Unknown names resolve to devnet with a warning instead of failing. A typo
//! therefore routes to the wrong network silently unless the log is read.

use std::fmt;
use url::Url;

/// Endpoints used to reach one network.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointSet {
    /// Full node JSON-RPC endpoint.
    pub rpc_url: Url,
    /// Faucet endpoint.
    pub auxiliary_url: Url,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Network {
    Devnet,
    Testnet,
    Mainnet,
}

impl Network {
    /// Network used for unrecognized names.
    pub const FALLBACK: Network = Network::Devnet;

    /// Match a network name exactly, falling back to [`Network::FALLBACK`].
    pub fn from_name(name: &str) -> Self {
        match name {
            "devnet" => Network::Devnet,
            "testnet" => Network::Testnet,
            "mainnet" => Network::Mainnet,
            _ => {
                tracing::warn!(
                    network = %name,
                    fallback = %Self::FALLBACK,
                    "Unrecognized network name, falling back to default endpoints"
                );
                Self::FALLBACK
            }
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Network::Devnet => "devnet",
            Network::Testnet => "testnet",
            Network::Mainnet => "mainnet",
        }
    }

    pub fn endpoints(&self) -> EndpointSet {
        let (rpc, faucet) = match self {
            Network::Devnet => (
                "https://explorer-rpc.devnet.sui.io/",
                "https://explorer-rpc.devnet.sui.io/gas",
            ),
            Network::Testnet => (
                "https://explorer-rpc.testnet.sui.io/",
                "https://explorer-rpc.testnet.sui.io/gas",
            ),
            Network::Mainnet => (
                "https://explorer-rpc.mainnet.sui.io/",
                "https://explorer-rpc.mainnet.sui.io/gas",
            ),
        };
        EndpointSet {
            rpc_url: builtin_url(rpc),
            auxiliary_url: builtin_url(faucet),
        }
    }
}

fn builtin_url(raw: &'static str) -> Url {
    match Url::parse(raw) {
        Ok(url) => url,
        Err(e) => unreachable!("built-in endpoint '{raw}' is invalid: {e}"),
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Endpoints for a network name.
pub fn resolve_endpoints(name: &str) -> EndpointSet {
    Network::from_name(name).endpoints()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_networks() {
        assert_eq!(
            resolve_endpoints("mainnet").rpc_url.as_str(),
            "https://explorer-rpc.mainnet.sui.io/"
        );
        assert_eq!(
            resolve_endpoints("testnet").auxiliary_url.as_str(),
            "https://explorer-rpc.testnet.sui.io/gas"
        );
    }

    #[test]
    fn test_names_match_exactly() {
        assert_eq!(Network::from_name("testnet"), Network::Testnet);
        assert_eq!(Network::from_name("TestNet"), Network::Devnet);
        assert_eq!(Network::from_name(" mainnet "), Network::Devnet);
        assert_eq!(resolve_endpoints("MAINNET"), Network::Devnet.endpoints());
    }

    #[test]
    fn test_unknown_network_falls_back_to_devnet() {
        assert_eq!(resolve_endpoints("unknown-net"), Network::Devnet.endpoints());
        assert_eq!(resolve_endpoints(""), Network::Devnet.endpoints());
    }
}
