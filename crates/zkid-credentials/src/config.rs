//! Network profile.
//!
//! Everything a lifecycle manager needs to talk to one deployment: the
//! network passphrase, the RPC endpoint, the three contract ids, and the
//! pipeline timings. A profile is an explicit value; two managers in the same
//! process can target different networks.
//!
//! Sources, in increasing precedence:
//! 1. Network defaults: passphrase and pipeline timings ([`NetworkConfig::bare`]).
//! 2. A YAML profile ([`NetworkConfig::from_yaml_file`]).
//! 3. Environment variables ([`NetworkConfig::from_env`]).
//!
//! No endpoint or contract deployment is built in. Envelopes, contract values
//! and the account lookup use this stack's own ledger RPC dialect, so a
//! profile must name a ledger service that speaks it, together with the
//! contracts deployed behind it.

use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use serde::Deserialize;
use zkid_core::{AccountId, ContractId, FieldCodec, FieldPolicy};
use zkid_rpc::{RetryPolicy, RpcConfig};
use zkid_tx::{OrchestratorConfig, PollPolicy, DEFAULT_BASE_FEE, DEFAULT_TX_TIMEOUT_SECS};

use crate::error::{ConfigError, CredentialError};

pub const TESTNET_PASSPHRASE: &str = "Test SDF Network ; September 2015";
pub const MAINNET_PASSPHRASE: &str = "Public Global Stellar Network ; September 2015";

/// Contract ids [`NetworkConfig::local_mock`] fills in.
pub const MOCK_VERIFIER_ID: &str = "CVERIFIERAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA";
pub const MOCK_REGISTRY_ID: &str = "CREGISTRYAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA";
pub const MOCK_COMPLIANCE_ID: &str = "CCOMPLIANCEAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA";

/// Pause between a verify and the issue that depends on it.
pub const DEFAULT_SETTLE_DELAY: Duration = Duration::from_secs(2);

/// 365 days.
pub const DEFAULT_CREDENTIAL_TTL_SECS: u32 = 365 * 24 * 60 * 60;

// ─── Network ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Network {
    Testnet,
    Mainnet,
    /// A private or standalone network identified only by its passphrase.
    Custom(String),
}

impl Network {
    pub fn passphrase(&self) -> &str {
        match self {
            Self::Testnet => TESTNET_PASSPHRASE,
            Self::Mainnet => MAINNET_PASSPHRASE,
            Self::Custom(p) => p,
        }
    }

    fn from_passphrase(passphrase: &str) -> Self {
        match passphrase {
            TESTNET_PASSPHRASE => Self::Testnet,
            MAINNET_PASSPHRASE => Self::Mainnet,
            other => Self::Custom(other.to_string()),
        }
    }
}

impl FromStr for Network {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "testnet" => Ok(Self::Testnet),
            "mainnet" | "public" => Ok(Self::Mainnet),
            _ => Err(ConfigError::UnknownNetwork(s.to_string())),
        }
    }
}

impl std::fmt::Display for Network {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Testnet => f.write_str("testnet"),
            Self::Mainnet => f.write_str("mainnet"),
            Self::Custom(_) => f.write_str("custom"),
        }
    }
}

// ─── NetworkConfig ───────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct NetworkConfig {
    pub network: Network,
    pub rpc: RpcConfig,
    pub verifier_id: Option<ContractId>,
    pub registry_id: Option<ContractId>,
    pub compliance_id: Option<ContractId>,
    /// Account used to build read-only calls. Must exist on the ledger.
    pub simulation_source: Option<AccountId>,
    pub poll: PollPolicy,
    pub settle_delay: Duration,
    pub base_fee: u64,
    pub tx_timeout_secs: u64,
    pub field_policy: FieldPolicy,
    pub default_ttl_secs: u32,
}

impl NetworkConfig {
    /// Test network passphrase against `rpc`. No contracts are pre-configured.
    pub fn testnet(rpc: RpcConfig) -> Self {
        Self::bare(Network::Testnet, rpc)
    }

    /// Public network passphrase against `rpc`. No contracts are pre-configured.
    pub fn mainnet(rpc: RpcConfig) -> Self {
        Self::bare(Network::Mainnet, rpc)
    }

    /// A profile with no contract ids and default timings.
    pub fn bare(network: Network, rpc: RpcConfig) -> Self {
        Self {
            network,
            rpc,
            verifier_id: None,
            registry_id: None,
            compliance_id: None,
            simulation_source: None,
            poll: PollPolicy::default(),
            settle_delay: DEFAULT_SETTLE_DELAY,
            base_fee: DEFAULT_BASE_FEE,
            tx_timeout_secs: DEFAULT_TX_TIMEOUT_SECS,
            field_policy: FieldPolicy::default(),
            default_ttl_secs: DEFAULT_CREDENTIAL_TTL_SECS,
        }
    }

    /// Placeholder contract ids against a local mock endpoint, with
    /// millisecond poll timings and no settling delay.
    pub fn local_mock(uri: &str) -> Result<Self, ConfigError> {
        let mut cfg = Self::testnet(RpcConfig::local_mock(uri)?);
        cfg.verifier_id = Some(placeholder(MOCK_VERIFIER_ID)?);
        cfg.registry_id = Some(placeholder(MOCK_REGISTRY_ID)?);
        cfg.compliance_id = Some(placeholder(MOCK_COMPLIANCE_ID)?);
        cfg.poll = PollPolicy {
            interval: Duration::from_millis(10),
            max_attempts: 3,
        };
        cfg.settle_delay = Duration::ZERO;
        Ok(cfg)
    }

    /// Load from environment variables.
    ///
    /// Variables:
    /// - `ZKID_NETWORK` (`testnet` or `mainnet`, default: testnet)
    /// - `ZKID_RPC_URL` (required), `ZKID_RPC_TOKEN`, `ZKID_RPC_TIMEOUT_SECS`
    ///   (see [`RpcConfig::from_env`])
    /// - `ZKID_VERIFIER_CONTRACT_ID`, `ZKID_REGISTRY_CONTRACT_ID`, `ZKID_COMPLIANCE_CONTRACT_ID`
    /// - `ZKID_SIMULATION_SOURCE`
    pub fn from_env() -> Result<Self, ConfigError> {
        let network = match std::env::var("ZKID_NETWORK") {
            Ok(raw) if !raw.trim().is_empty() => raw.parse()?,
            _ => Network::Testnet,
        };
        Self::bare(network, RpcConfig::from_env()?).overlay_env()
    }

    /// Apply the environment on top of an existing profile.
    pub fn overlay_env(mut self) -> Result<Self, ConfigError> {
        if std::env::var("ZKID_RPC_URL").is_ok() || std::env::var("ZKID_RPC_TOKEN").is_ok() {
            self.rpc = RpcConfig::from_env()?;
        }
        if let Some(id) = env_parse("ZKID_VERIFIER_CONTRACT_ID", ContractId::parse)? {
            self.verifier_id = Some(id);
        }
        if let Some(id) = env_parse("ZKID_REGISTRY_CONTRACT_ID", ContractId::parse)? {
            self.registry_id = Some(id);
        }
        if let Some(id) = env_parse("ZKID_COMPLIANCE_CONTRACT_ID", ContractId::parse)? {
            self.compliance_id = Some(id);
        }
        if let Some(account) = env_parse("ZKID_SIMULATION_SOURCE", AccountId::parse)? {
            self.simulation_source = Some(account);
        }
        Ok(self)
    }

    /// Load a YAML profile. `rpc_url` is required; other unset keys keep the
    /// network defaults.
    pub fn from_yaml_file(path: &Path) -> Result<Self, ConfigError> {
        let display = path.display().to_string();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: display.clone(),
            source,
        })?;
        let profile: NetworkProfile =
            serde_yaml::from_str(&text).map_err(|source| ConfigError::Yaml {
                path: display,
                source,
            })?;
        profile.into_config()
    }

    pub fn orchestrator_config(&self) -> OrchestratorConfig {
        OrchestratorConfig {
            network_passphrase: self.network.passphrase().to_string(),
            base_fee: self.base_fee,
            tx_timeout_secs: self.tx_timeout_secs,
            poll: self.poll,
        }
    }

    pub fn codec(&self) -> FieldCodec {
        FieldCodec::new(self.field_policy)
    }

    pub fn verifier(&self) -> Result<&ContractId, CredentialError> {
        self.verifier_id
            .as_ref()
            .ok_or(CredentialError::MissingContract("verifier"))
    }

    pub fn registry(&self) -> Result<&ContractId, CredentialError> {
        self.registry_id
            .as_ref()
            .ok_or(CredentialError::MissingContract("registry"))
    }

    pub fn compliance(&self) -> Result<&ContractId, CredentialError> {
        self.compliance_id
            .as_ref()
            .ok_or(CredentialError::MissingContract("compliance"))
    }

    pub fn simulation_source(&self) -> Result<&AccountId, CredentialError> {
        self.simulation_source
            .as_ref()
            .ok_or(CredentialError::MissingSimulationSource)
    }
}

fn placeholder(id: &str) -> Result<ContractId, ConfigError> {
    ContractId::parse(id).map_err(|e| ConfigError::InvalidValue {
        var: "placeholder contract id".into(),
        reason: e.to_string(),
    })
}

fn env_parse<T, E: std::fmt::Display>(
    var: &str,
    parse: impl Fn(&str) -> Result<T, E>,
) -> Result<Option<T>, ConfigError> {
    match std::env::var(var) {
        Ok(raw) if !raw.trim().is_empty() => parse(&raw).map(Some).map_err(|e| {
            ConfigError::InvalidValue {
                var: var.to_string(),
                reason: e.to_string(),
            }
        }),
        _ => Ok(None),
    }
}

// ─── YAML profile ────────────────────────────────────────────────────

/// On-disk profile shape. Every key is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct NetworkProfile {
    network: Option<String>,
    network_passphrase: Option<String>,
    rpc_url: Option<String>,
    rpc_timeout_secs: Option<u64>,
    rpc_retry: Option<RetryPolicy>,
    verifier_id: Option<ContractId>,
    registry_id: Option<ContractId>,
    compliance_id: Option<ContractId>,
    simulation_source: Option<AccountId>,
    poll: Option<PollPolicy>,
    settle_delay_ms: Option<u64>,
    base_fee: Option<u64>,
    tx_timeout_secs: Option<u64>,
    field_policy: Option<FieldPolicy>,
    default_ttl_secs: Option<u32>,
}

impl NetworkProfile {
    fn into_config(self) -> Result<NetworkConfig, ConfigError> {
        let network = match (&self.network, &self.network_passphrase) {
            (_, Some(passphrase)) => Network::from_passphrase(passphrase),
            (Some(name), None) => name.parse()?,
            (None, None) => Network::Testnet,
        };

        let Some(url) = &self.rpc_url else {
            return Err(ConfigError::InvalidValue {
                var: "rpc_url".into(),
                reason: format!("required for {network}"),
            });
        };
        let mut cfg = NetworkConfig::bare(network, RpcConfig::new(url)?);

        if let Some(secs) = self.rpc_timeout_secs {
            cfg.rpc.timeout_secs = secs;
        }
        if let Some(retry) = self.rpc_retry {
            cfg.rpc.retry = retry;
        }
        if self.verifier_id.is_some() {
            cfg.verifier_id = self.verifier_id;
        }
        if self.registry_id.is_some() {
            cfg.registry_id = self.registry_id;
        }
        if self.compliance_id.is_some() {
            cfg.compliance_id = self.compliance_id;
        }
        if self.simulation_source.is_some() {
            cfg.simulation_source = self.simulation_source;
        }
        if let Some(poll) = self.poll {
            cfg.poll = poll;
        }
        if let Some(ms) = self.settle_delay_ms {
            cfg.settle_delay = Duration::from_millis(ms);
        }
        if let Some(fee) = self.base_fee {
            cfg.base_fee = fee;
        }
        if let Some(secs) = self.tx_timeout_secs {
            cfg.tx_timeout_secs = secs;
        }
        if let Some(policy) = self.field_policy {
            cfg.field_policy = policy;
        }
        if let Some(ttl) = self.default_ttl_secs {
            cfg.default_ttl_secs = ttl;
        }
        Ok(cfg)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use zkid_core::{OverflowPolicy, StringPolicy};

    use super::*;

    fn write_profile(yaml: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(yaml.as_bytes()).unwrap();
        file
    }

    #[test]
    fn testnet_ships_no_endpoint_or_contracts() {
        let rpc = RpcConfig::new("https://ledger.example.org/rpc").unwrap();
        let cfg = NetworkConfig::testnet(rpc);
        assert_eq!(cfg.network.passphrase(), TESTNET_PASSPHRASE);
        assert_eq!(cfg.rpc.url.as_str(), "https://ledger.example.org/rpc");
        assert!(matches!(
            cfg.verifier(),
            Err(CredentialError::MissingContract("verifier"))
        ));
        assert!(cfg.registry_id.is_none() && cfg.compliance_id.is_none());
        assert_eq!(cfg.settle_delay, Duration::from_secs(2));
        assert_eq!(cfg.default_ttl_secs, 31_536_000);
    }

    #[test]
    fn local_mock_fills_placeholder_contracts() {
        let cfg = NetworkConfig::local_mock("http://127.0.0.1:9").unwrap();
        assert_eq!(cfg.verifier().unwrap().as_str(), MOCK_VERIFIER_ID);
        assert_eq!(cfg.registry().unwrap().as_str(), MOCK_REGISTRY_ID);
        assert_eq!(cfg.compliance().unwrap().as_str(), MOCK_COMPLIANCE_ID);
    }

    #[test]
    fn profile_without_rpc_url_is_rejected() {
        let file = write_profile("network: testnet\n");
        let err = NetworkConfig::from_yaml_file(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { ref var, .. } if var == "rpc_url"));
    }

    #[test]
    fn mainnet_has_no_contracts() {
        let rpc = RpcConfig::new("https://rpc.example.org").unwrap();
        let cfg = NetworkConfig::mainnet(rpc);
        assert_eq!(cfg.network.passphrase(), MAINNET_PASSPHRASE);
        assert!(matches!(
            cfg.verifier(),
            Err(CredentialError::MissingContract("verifier"))
        ));
        assert!(matches!(
            cfg.simulation_source(),
            Err(CredentialError::MissingSimulationSource)
        ));
    }

    #[test]
    fn network_names_parse() {
        assert_eq!("Testnet".parse::<Network>().unwrap(), Network::Testnet);
        assert_eq!("mainnet".parse::<Network>().unwrap(), Network::Mainnet);
        assert!(matches!(
            "devnet".parse::<Network>(),
            Err(ConfigError::UnknownNetwork(_))
        ));
    }

    #[test]
    fn orchestrator_config_carries_passphrase_and_timings() {
        let cfg = NetworkConfig::local_mock("http://127.0.0.1:9").unwrap();
        let oc = cfg.orchestrator_config();
        assert_eq!(oc.network_passphrase, TESTNET_PASSPHRASE);
        assert_eq!(oc.poll.max_attempts, 3);
        assert_eq!(oc.tx_timeout_secs, 180);
    }

    #[test]
    fn yaml_profile_overrides_defaults() {
        let source = format!("G{}", "B".repeat(55));
        let file = write_profile(&format!(
            "network: testnet\n\
             rpc_url: http://localhost:8000/rpc\n\
             verifier_id: {MOCK_VERIFIER_ID}\n\
             simulation_source: {source}\n\
             settle_delay_ms: 500\n\
             rpc_retry:\n  max_retries: 1\n\
             poll:\n  interval: 250\n  max_attempts: 8\n\
             field_policy:\n  overflow: truncate_left\n  strings: hash_to_field\n"
        ));
        let cfg = NetworkConfig::from_yaml_file(file.path()).unwrap();
        assert_eq!(cfg.network, Network::Testnet);
        assert_eq!(cfg.simulation_source.as_ref().unwrap().as_str(), source);
        assert_eq!(cfg.settle_delay, Duration::from_millis(500));
        assert_eq!(cfg.poll.interval, Duration::from_millis(250));
        assert_eq!(cfg.poll.max_attempts, 8);
        assert_eq!(cfg.rpc.retry.max_retries, 1);
        assert_eq!(cfg.rpc.retry.base_delay, RetryPolicy::default().base_delay);
        assert_eq!(cfg.field_policy.overflow, OverflowPolicy::TruncateLeft);
        assert_eq!(cfg.field_policy.strings, StringPolicy::HashToField);
        assert_eq!(cfg.verifier().unwrap().as_str(), MOCK_VERIFIER_ID);
        assert!(cfg.registry_id.is_none());
    }

    #[test]
    fn custom_passphrase_requires_rpc_url() {
        let file = write_profile("network_passphrase: Standalone Network ; February 2017\n");
        let err = NetworkConfig::from_yaml_file(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));

        let file = write_profile(
            "network_passphrase: Standalone Network ; February 2017\n\
             rpc_url: http://localhost:8000/rpc\n",
        );
        let cfg = NetworkConfig::from_yaml_file(file.path()).unwrap();
        assert_eq!(
            cfg.network,
            Network::Custom("Standalone Network ; February 2017".into())
        );
        assert!(cfg.verifier_id.is_none());
    }

    #[test]
    fn yaml_profile_rejects_bad_contract_id() {
        let file = write_profile("rpc_url: http://localhost:8000/rpc\nverifier_id: not-a-contract\n");
        let err = NetworkConfig::from_yaml_file(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Yaml { .. }));
    }

    #[test]
    fn missing_profile_is_io_error() {
        let err = NetworkConfig::from_yaml_file(Path::new("/nonexistent/zkid.yaml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
