//! # zkid-cli — Command-Line Interface for the zkid Stack
//!
//! Provides the `zkid` binary: offline proof tooling plus thin front-ends
//! over the credential lifecycle.
//!
//! ## Subcommands
//!
//! - `zkid encode-proof` / `encode-signals` / `hash-proof`: offline encoding.
//! - `zkid verify` / `issue` / `verify-and-issue` / `revoke`: signed lifecycle calls.
//! - `zkid status` / `credential` / `health`: registry and endpoint queries.
//! - `zkid sanctions` / `explanation`: compliance oracle queries.
//! - `zkid set-vk` / `verification-key`: verifier administration.
//!
//! ```bash
//! zkid encode-proof proof.json
//! zkid verify-and-issue --caller G... --proof proof.json --signals public.json \
//!     --signer-cmd 'wallet-cli sign --stdin'
//! zkid status 0x9f1c...
//! ```
//!
//! ## Crate Policy
//!
//! - Argument parsing is separated from business logic.
//! - Handlers delegate to `zkid-credentials`; no contract knowledge lives here.
//! - Handlers return an exit code; errors are reported once, by `main`.

pub mod admin;
pub mod compliance;
pub mod encode;
pub mod lifecycle;
pub mod query;
pub mod signer;

use std::path::Path;

use anyhow::{bail, Context, Result};
use clap::ValueEnum;
use serde_json::Value;
use zkid_credentials::{Network, NetworkConfig};
use zkid_rpc::RpcConfig;

/// Exit code for a query whose answer is negative (revoked, sanctioned, not found).
pub const EXIT_NEGATIVE: u8 = 2;

/// Network selector for `--network`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum NetworkArg {
    Testnet,
    Mainnet,
}

impl From<NetworkArg> for Network {
    fn from(arg: NetworkArg) -> Self {
        match arg {
            NetworkArg::Testnet => Network::Testnet,
            NetworkArg::Mainnet => Network::Mainnet,
        }
    }
}

/// Resolve the network profile from `--config`, `--network` and the environment.
///
/// A YAML profile wins over `--network`; both are overlaid with `ZKID_*`
/// environment variables. No network has a built-in endpoint, so without a
/// profile `ZKID_RPC_URL` is required.
pub fn load_network_config(profile: Option<&Path>, network: Option<NetworkArg>) -> Result<NetworkConfig> {
    let cfg = match (profile, network) {
        (Some(path), _) => NetworkConfig::from_yaml_file(path)
            .with_context(|| format!("loading profile {}", path.display()))?
            .overlay_env()?,
        (None, Some(requested)) => {
            let rpc = RpcConfig::from_env().context("without a --config profile")?;
            NetworkConfig::bare(requested.into(), rpc).overlay_env()?
        }
        (None, None) => NetworkConfig::from_env().context("without a --config profile")?,
    };

    if let (Some(path), Some(requested)) = (profile, network) {
        let requested = Network::from(requested);
        if cfg.network != requested {
            bail!(
                "profile {} is for {}, but --network {} was given",
                path.display(),
                cfg.network,
                requested
            );
        }
    }
    tracing::debug!(network = %cfg.network, rpc = %cfg.rpc.url, "network profile resolved");
    Ok(cfg)
}

/// Read and parse a JSON file.
pub fn read_json(path: &Path) -> Result<Value> {
    let text = std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("parsing {} as JSON", path.display()))
}

/// Accept a bare signal array or an object carrying `publicSignals`.
pub fn signals_value(value: Value) -> Value {
    match value {
        Value::Object(mut map) if map.contains_key("publicSignals") => {
            map.remove("publicSignals").unwrap_or(Value::Null)
        }
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use serde_json::json;

    use super::*;

    #[test]
    fn read_json_reports_path_on_parse_failure() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"{not json").unwrap();
        let err = read_json(file.path()).unwrap_err();
        assert!(format!("{err:#}").contains(&file.path().display().to_string()));
    }

    #[test]
    fn signals_accept_wrapped_form() {
        assert_eq!(signals_value(json!({"publicSignals": ["1"]})), json!(["1"]));
        assert_eq!(signals_value(json!(["1", "2"])), json!(["1", "2"]));
    }

    #[test]
    fn profile_network_must_match_flag() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"network: testnet\nrpc_url: http://localhost:8000/rpc\n").unwrap();
        let err = load_network_config(Some(file.path()), Some(NetworkArg::Mainnet)).unwrap_err();
        assert!(err.to_string().contains("--network mainnet"));
    }

    #[test]
    fn profile_supplies_endpoint_and_contracts() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        let yaml = format!(
            "network: testnet\nrpc_url: http://localhost:8000/rpc\nregistry_id: {}\n",
            zkid_credentials::MOCK_REGISTRY_ID
        );
        file.write_all(yaml.as_bytes()).unwrap();
        let cfg = load_network_config(Some(file.path()), Some(NetworkArg::Testnet)).unwrap();
        assert_eq!(cfg.network, Network::Testnet);
        assert_eq!(cfg.rpc.url.as_str(), "http://localhost:8000/rpc");
        assert!(cfg.registry_id.is_some());
        assert!(cfg.verifier_id.is_none());
    }
}
