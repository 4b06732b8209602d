use anyhow::{anyhow, Context};
use async_trait::async_trait;
use celestia_client::tx::TxConfig;
use celestia_client::types::blob::Commitment as CelestiaCommitment;
use celestia_client::types::nmt::Namespace as CelestiaNamespace;
use celestia_client::types::{AppVersion, Blob};
use celestia_client::Client;
use tracing::{debug, info};

use super::BlobClient;
use crate::config::Config;
use crate::crypto::Credential;
use crate::error::{Error, Result};
use crate::namespace::Namespace;
use crate::types::{Commitment, SubmitOptions, SubmitReceipt};

const APP_VERSION: AppVersion = AppVersion::V3;

/// Metadata key consensus gRPC providers read the auth token from.
pub const GRPC_TOKEN_HEADER: &str = "x-token";

/// Credentials for the two endpoints the client talks to.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct EndpointAuth<'a> {
    /// Bearer token for the bridge node JSON-RPC (reads).
    pub rpc_token: Option<&'a str>,
    /// Metadata attached to every consensus gRPC call (submissions).
    pub grpc_metadata: Vec<(&'static str, &'a str)>,
}

pub fn endpoint_auth(config: &Config) -> EndpointAuth<'_> {
    EndpointAuth {
        rpc_token: config.rpc_auth_token(),
        grpc_metadata: config
            .grpc_auth_token()
            .map(|token| vec![(GRPC_TOKEN_HEADER, token)])
            .unwrap_or_default(),
    }
}

/// Blob client backed by a Celestia bridge node (reads) and consensus gRPC
/// endpoint (submissions), signing locally.
pub struct CelestiaClient {
    client: Client,
}

/// Converts to the network's version-zero namespace type.
pub fn to_celestia_namespace(namespace: &Namespace) -> Result<CelestiaNamespace> {
    namespace.validate_v0()?;
    CelestiaNamespace::new_v0(namespace.as_bytes())
        .map_err(|e| Error::NamespaceConstructionFailed(e.to_string()))
}

fn tx_config(options: &SubmitOptions) -> TxConfig {
    TxConfig {
        gas_limit: options.gas_limit,
        gas_price: options.gas_price,
        ..TxConfig::default()
    }
}

impl CelestiaClient {
    pub async fn connect(
        config: &Config,
        credential: &Credential,
        options: &SubmitOptions,
    ) -> Result<Self> {
        let rpc_url = config.rpc_url()?;
        let grpc_url = config.grpc_url()?;

        let key_hex = credential.secret_key_hex().ok_or_else(|| {
            Error::ClientConstructionFailed(anyhow!(
                "the Celestia client signs locally; configure keys.private_key or keys.mnemonic instead of keys.remote"
            ))
        })?;

        if let Some(granter) = &options.fee_granter {
            return Err(Error::ClientConstructionFailed(anyhow!(
                "fee granter {granter} is set but the Celestia client cannot attach fee grants"
            )));
        }

        let mut builder = Client::builder()
            .rpc_url(rpc_url)
            .grpc_url(grpc_url)
            .private_key_hex(&key_hex);
        let auth = endpoint_auth(config);
        for &(key, value) in &auth.grpc_metadata {
            builder = builder.grpc_metadata(key, value);
        }
        if let Some(token) = auth.rpc_token {
            builder = builder.rpc_auth_token(token);
        }

        let client = builder
            .build()
            .await
            .with_context(|| format!("connecting to {rpc_url} / {grpc_url}"))
            .map_err(Error::ClientConstructionFailed)?;

        info!(rpc_url, grpc_url, "🔗 Connected to Celestia");
        Ok(Self { client })
    }
}

#[async_trait]
impl BlobClient for CelestiaClient {
    async fn submit(
        &self,
        payload: &[u8],
        namespace: &Namespace,
        options: &SubmitOptions,
    ) -> anyhow::Result<SubmitReceipt> {
        let ns = to_celestia_namespace(namespace)?;
        let blob = Blob::new(ns, payload.to_vec(), None, APP_VERSION)?;
        let commitment = Commitment(blob.commitment.hash().to_vec());
        debug!(bytes = payload.len(), %commitment, "Submitting blob");

        let tx = self.client.blob().submit(&[blob], tx_config(options)).await?;

        Ok(SubmitReceipt {
            height: tx.height.value(),
            commitment,
        })
    }

    async fn retrieve(
        &self,
        height: u64,
        namespace: &Namespace,
        commitment: &Commitment,
    ) -> anyhow::Result<Vec<u8>> {
        let ns = to_celestia_namespace(namespace)?;
        let hash: [u8; 32] = commitment
            .0
            .as_slice()
            .try_into()
            .map_err(|_| anyhow!("commitment must be 32 bytes, got {}", commitment.0.len()))?;

        let blob = self
            .client
            .blob()
            .get(height, ns, CelestiaCommitment::new(hash))
            .await?;
        Ok(blob.data)
    }
}
