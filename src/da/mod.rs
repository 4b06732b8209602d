// Data Availability layer access
//
// The submit loop only talks to the network through `BlobClient`, so the
// Celestia client can be swapped for a scripted one in tests.

pub mod celestia;

use anyhow::anyhow;
use async_trait::async_trait;
use std::future::Future;
use tokio::time::{timeout_at, Instant};

use crate::error::{Error, Result};
use crate::namespace::Namespace;
use crate::types::{Commitment, SubmitOptions, SubmitReceipt};

#[async_trait]
pub trait BlobClient: Send + Sync {
    /// Submits one payload and waits for inclusion.
    async fn submit(
        &self,
        payload: &[u8],
        namespace: &Namespace,
        options: &SubmitOptions,
    ) -> anyhow::Result<SubmitReceipt>;

    /// Fetches a previously submitted payload.
    async fn retrieve(
        &self,
        height: u64,
        namespace: &Namespace,
        commitment: &Commitment,
    ) -> anyhow::Result<Vec<u8>>;
}

/// Runs client construction under the session deadline.
pub async fn connect_until<T, F>(deadline: Instant, connecting: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    timeout_at(deadline, connecting).await.unwrap_or_else(|_| {
        Err(Error::ClientConstructionFailed(anyhow!(
            "session deadline elapsed while connecting"
        )))
    })
}

/// Block explorer for a known network name.
pub fn explorer_url(network: &str) -> Option<&'static str> {
    match network.to_ascii_lowercase().as_str() {
        "mocha" | "mocha-4" => Some("https://mocha.celenium.io"),
        "arabica" | "arabica-11" => Some("https://arabica.celenium.io"),
        "celestia" | "mainnet" => Some("https://celenium.io"),
        _ => None,
    }
}
