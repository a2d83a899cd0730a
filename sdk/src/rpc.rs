//! RPC-backed fetch port and its environment configuration.

use std::future::Future;

use solana_client::nonblocking::rpc_client::RpcClient;
use solana_sdk::{commitment_config::CommitmentConfig, pubkey::Pubkey};
use tracing::warn;

use crate::error::{ConfigError, FetchError};
use crate::fetch::{AccountDataResult, AccountFetcher};

pub const DEFAULT_RPC_URL: &str = "http://localhost:8899";

// ── Config ──────────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RpcFetchConfig {
    pub rpc_url: String,
    pub commitment: CommitmentConfig,
}

impl Default for RpcFetchConfig {
    fn default() -> Self {
        Self {
            rpc_url: DEFAULT_RPC_URL.to_string(),
            commitment: CommitmentConfig::confirmed(),
        }
    }
}

impl RpcFetchConfig {
    /// `GATE_RPC_URL` and `GATE_COMMITMENT`, falling back to a local validator
    /// at `confirmed`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let rpc_url = lookup("GATE_RPC_URL").unwrap_or_else(|| DEFAULT_RPC_URL.to_string());
        if !(rpc_url.starts_with("http://") || rpc_url.starts_with("https://")) {
            return Err(ConfigError::InvalidValue {
                name: "GATE_RPC_URL",
                value: rpc_url,
            });
        }

        let commitment = match lookup("GATE_COMMITMENT") {
            Some(value) => parse_commitment(&value)?,
            None => CommitmentConfig::confirmed(),
        };

        Ok(Self {
            rpc_url,
            commitment,
        })
    }
}

fn parse_commitment(value: &str) -> Result<CommitmentConfig, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "processed" => Ok(CommitmentConfig::processed()),
        "confirmed" => Ok(CommitmentConfig::confirmed()),
        "finalized" => Ok(CommitmentConfig::finalized()),
        _ => Err(ConfigError::InvalidValue {
            name: "GATE_COMMITMENT",
            value: value.to_string(),
        }),
    }
}

// ── Fetcher ─────────────────────────────────────────────────────────────────

/// Reads accounts through a JSON-RPC node. A missing account is `Ok(None)`;
/// transport and node errors surface as `FetchError`.
pub struct RpcAccountFetcher {
    client: RpcClient,
    commitment: CommitmentConfig,
}

impl RpcAccountFetcher {
    pub fn new(client: RpcClient, commitment: CommitmentConfig) -> Self {
        Self { client, commitment }
    }

    pub fn from_config(config: &RpcFetchConfig) -> Self {
        Self::new(
            RpcClient::new_with_commitment(config.rpc_url.clone(), config.commitment),
            config.commitment,
        )
    }

    pub fn url(&self) -> String {
        self.client.url()
    }
}

impl AccountFetcher for RpcAccountFetcher {
    fn fetch(&self, address: Pubkey) -> impl Future<Output = AccountDataResult> + Send {
        async move {
            self.client
                .get_account_with_commitment(&address, self.commitment)
                .await
                .map(|response| response.value.map(|account| account.data))
                .map_err(|e| {
                    warn!(%address, error = %e, "rpc account fetch failed");
                    FetchError::new(format!("{}: {}", address, e))
                })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn test_config_defaults() {
        let config = RpcFetchConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, RpcFetchConfig::default());
        assert_eq!(config.rpc_url, "http://localhost:8899");
        assert_eq!(config.commitment, CommitmentConfig::confirmed());
    }

    #[test]
    fn test_config_overrides() {
        let config = RpcFetchConfig::from_lookup(lookup(&[
            ("GATE_RPC_URL", "https://api.devnet.solana.com"),
            ("GATE_COMMITMENT", "Finalized"),
        ]))
        .unwrap();
        assert_eq!(config.rpc_url, "https://api.devnet.solana.com");
        assert_eq!(config.commitment, CommitmentConfig::finalized());
    }

    #[test]
    fn test_config_rejects_bad_values() {
        assert_eq!(
            RpcFetchConfig::from_lookup(lookup(&[("GATE_COMMITMENT", "max")])),
            Err(ConfigError::InvalidValue {
                name: "GATE_COMMITMENT",
                value: "max".to_string(),
            })
        );
        assert!(matches!(
            RpcFetchConfig::from_lookup(lookup(&[("GATE_RPC_URL", "localhost:8899")])),
            Err(ConfigError::InvalidValue {
                name: "GATE_RPC_URL",
                ..
            })
        ));
    }

    #[tokio::test]
    async fn test_fetcher_from_config() {
        let fetcher = RpcAccountFetcher::from_config(&RpcFetchConfig::default());
        assert_eq!(fetcher.url(), DEFAULT_RPC_URL);
    }
}
