use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::time::Duration;

use crate::error::{Error, Result};
use crate::namespace::{Decoding, NamespacePolicy};

/// Environment variables that override secrets from config.toml.
pub const ENV_PRIVATE_KEY: &str = "BLOBCELL_PRIVATE_KEY";
pub const ENV_MNEMONIC: &str = "BLOBCELL_MNEMONIC";
pub const ENV_GRPC_AUTH_TOKEN: &str = "BLOBCELL_AUTH_TOKEN";
pub const ENV_RPC_AUTH_TOKEN: &str = "BLOBCELL_RPC_AUTH_TOKEN";
pub const ENV_REMOTE_API_KEY: &str = "BLOBCELL_REMOTE_API_KEY";

/// Configuration loaded from config.toml
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub celestia: CelestiaConfig,
    #[serde(default)]
    pub keys: KeysConfig,
    #[serde(default)]
    pub submission: SubmissionConfig,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CelestiaConfig {
    pub rpc_url: Option<String>,
    pub grpc_url: Option<String>,
    pub network: Option<String>,
    pub namespace: Option<String>,
    /// Sent as `x-token` metadata to the consensus gRPC endpoint.
    #[serde(alias = "auth_token")]
    pub grpc_auth_token: Option<String>,
    /// Bearer token for the bridge node JSON-RPC.
    pub rpc_auth_token: Option<String>,
    pub feegranter: Option<String>,
    pub gas_price: Option<f64>,
    pub gas_limit: Option<u64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct KeysConfig {
    pub private_key: Option<String>,
    pub mnemonic: Option<String>,
    pub remote: Option<RemoteSignerConfig>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RemoteSignerConfig {
    pub url: String,
    #[serde(default)]
    pub api_key: Option<String>,
    pub key_name: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SubmissionConfig {
    pub blob_count: u32,
    pub interval_secs: u64,
    pub timeout_secs: u64,
    pub namespace_policy: NamespacePolicy,
    pub namespace_decoding: Decoding,
}

impl Default for SubmissionConfig {
    fn default() -> Self {
        Self {
            blob_count: 3,
            interval_secs: 2,
            timeout_secs: 300,
            namespace_policy: NamespacePolicy::default(),
            namespace_decoding: Decoding::default(),
        }
    }
}

impl SubmissionConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Treats blank strings the same as absent keys. The value itself is not trimmed.
fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.trim().is_empty())
}

impl Config {
    /// Loads `path`, then applies secret overrides from the environment.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            Error::ConfigInvalid(format!("failed to read {}: {e}", path.display()))
        })?;
        let mut config = Self::from_toml(&content)?;
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::ConfigInvalid(e.to_string()))
    }

    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(v) = lookup(ENV_PRIVATE_KEY) {
            self.keys.private_key = Some(v);
        }
        if let Some(v) = lookup(ENV_MNEMONIC) {
            self.keys.mnemonic = Some(v);
        }
        if let Some(v) = lookup(ENV_GRPC_AUTH_TOKEN) {
            self.celestia.grpc_auth_token = Some(v);
        }
        if let Some(v) = lookup(ENV_RPC_AUTH_TOKEN) {
            self.celestia.rpc_auth_token = Some(v);
        }
        if let (Some(v), Some(remote)) = (lookup(ENV_REMOTE_API_KEY), self.keys.remote.as_mut()) {
            remote.api_key = Some(v);
        }
    }

    /// Fails on the first missing required setting.
    pub fn validate(&self) -> Result<()> {
        self.rpc_url()?;
        self.grpc_url()?;
        self.network()?;
        self.namespace()?;
        if self.submission.interval_secs > self.submission.timeout_secs {
            return Err(Error::ConfigInvalid(format!(
                "submission.interval_secs ({}) exceeds submission.timeout_secs ({})",
                self.submission.interval_secs, self.submission.timeout_secs
            )));
        }
        Ok(())
    }

    pub fn rpc_url(&self) -> Result<&str> {
        non_empty(&self.celestia.rpc_url).ok_or(Error::ConfigMissing("celestia.rpc_url"))
    }

    pub fn grpc_url(&self) -> Result<&str> {
        non_empty(&self.celestia.grpc_url).ok_or(Error::ConfigMissing("celestia.grpc_url"))
    }

    pub fn network(&self) -> Result<&str> {
        non_empty(&self.celestia.network).ok_or(Error::ConfigMissing("celestia.network"))
    }

    pub fn namespace(&self) -> Result<&str> {
        non_empty(&self.celestia.namespace).ok_or(Error::ConfigMissing("celestia.namespace"))
    }

    pub fn grpc_auth_token(&self) -> Option<&str> {
        non_empty(&self.celestia.grpc_auth_token)
    }

    pub fn rpc_auth_token(&self) -> Option<&str> {
        non_empty(&self.celestia.rpc_auth_token)
    }

    pub fn feegranter(&self) -> Option<&str> {
        non_empty(&self.celestia.feegranter)
    }

    pub fn private_key(&self) -> Option<&str> {
        non_empty(&self.keys.private_key)
    }

    pub fn mnemonic(&self) -> Option<&str> {
        non_empty(&self.keys.mnemonic)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    const FULL: &str = r#"
        [celestia]
        rpc_url = "wss://rpc.example:26658"
        grpc_url = "https://grpc.example:9090"
        network = "mocha"
        namespace = "blobcell"
        feegranter = "celestia1granter"

        [keys]
        mnemonic = "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon about"

        [submission]
        blob_count = 5
        namespace_policy = "long"
        namespace_decoding = "literal"
    "#;

    #[test]
    fn test_full_config_parses() {
        let config = Config::from_toml(FULL).unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(config.network().unwrap(), "mocha");
        assert_eq!(config.feegranter(), Some("celestia1granter"));
        assert_eq!(config.submission.blob_count, 5);
        assert_eq!(config.submission.namespace_policy, NamespacePolicy::Long);
        assert_eq!(config.submission.namespace_decoding, Decoding::Literal);
        // defaults survive a partial [submission] table
        assert_eq!(config.submission.interval(), Duration::from_secs(2));
        assert_eq!(config.submission.timeout(), Duration::from_secs(300));
    }

    #[test]
    fn test_missing_namespace_is_reported() {
        let config = Config::from_toml(
            r#"
            [celestia]
            rpc_url = "wss://rpc.example"
            grpc_url = "https://grpc.example"
            network = "mocha"
            namespace = "  "
            "#,
        )
        .unwrap();
        assert!(matches!(
            config.validate(),
            Err(Error::ConfigMissing("celestia.namespace"))
        ));
    }

    #[test]
    fn test_namespace_keeps_surrounding_whitespace() {
        let config = Config::from_toml(
            r#"
            [celestia]
            namespace = " ab "
            "#,
        )
        .unwrap();
        assert_eq!(config.namespace().unwrap(), " ab ");
    }

    #[test]
    fn test_legacy_auth_token_key_targets_grpc() {
        let config = Config::from_toml(
            r#"
            [celestia]
            auth_token = "core-token"
            rpc_auth_token = "bridge-token"
            "#,
        )
        .unwrap();
        assert_eq!(config.grpc_auth_token(), Some("core-token"));
        assert_eq!(config.rpc_auth_token(), Some("bridge-token"));
    }

    #[test]
    fn test_empty_file_misses_rpc_url_first() {
        let config = Config::from_toml("").unwrap();
        assert!(matches!(
            config.validate(),
            Err(Error::ConfigMissing("celestia.rpc_url"))
        ));
        assert_eq!(config.submission.blob_count, 3);
    }

    #[test]
    fn test_malformed_toml_is_invalid() {
        assert!(matches!(
            Config::from_toml("[celestia\nrpc_url = 1"),
            Err(Error::ConfigInvalid(_))
        ));
    }

    #[test]
    fn test_env_overrides_secrets() {
        let mut config = Config::from_toml(
            r#"
            [keys]
            private_key = "from-file"
            [keys.remote]
            url = "https://signer.example"
            key_name = "blobcell"
            "#,
        )
        .unwrap();
        let env: HashMap<&str, &str> = [
            (ENV_PRIVATE_KEY, "from-env"),
            (ENV_GRPC_AUTH_TOKEN, "token"),
            (ENV_REMOTE_API_KEY, "api-key"),
        ]
        .into_iter()
        .collect();
        config.apply_env(|key| env.get(key).map(|v| v.to_string()));

        assert_eq!(config.private_key(), Some("from-env"));
        assert_eq!(config.grpc_auth_token(), Some("token"));
        assert_eq!(config.rpc_auth_token(), None);
        assert_eq!(config.mnemonic(), None);
        assert_eq!(
            config.keys.remote.unwrap().api_key.as_deref(),
            Some("api-key")
        );
    }

    #[test]
    fn test_load_reads_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(FULL.as_bytes()).unwrap();
        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.namespace().unwrap(), "blobcell");
    }

    #[test]
    fn test_load_missing_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            Config::load(&dir.path().join("config.toml")),
            Err(Error::ConfigInvalid(_))
        ));
    }

    #[test]
    fn test_interval_longer_than_timeout_is_invalid() {
        let mut config = Config::from_toml(FULL).unwrap();
        config.submission.interval_secs = 600;
        assert!(matches!(config.validate(), Err(Error::ConfigInvalid(_))));
    }
}
