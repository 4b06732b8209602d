use anyhow::{anyhow, Context, Result};
use bip32::{DerivationPath, XPrv};
use bip39::Mnemonic;
use k256::ecdsa::SigningKey;
use std::fmt;
use tracing::{info, warn};

use crate::config::{Config, RemoteSignerConfig};
use crate::error::Error;

/// Cosmos/Celestia account path: m/44'/118'/0'/0/0
///   - 44'  = BIP44 purpose
///   - 118' = ATOM coin type (Cosmos)
///   - 0'   = account
///   - 0    = change
///   - 0    = address index
pub const COSMOS_HD_PATH: &str = "m/44'/118'/0'/0/0";

/// A signing identity the submission client can use.
pub enum Credential {
    /// secp256k1 secret key held in memory.
    SecretKey(SigningKey),
    /// Signing delegated to a remote service. The API key is checked at
    /// resolution time but no client in this crate can sign through it yet.
    Remote(RemoteSigner),
}

#[derive(Clone)]
pub struct RemoteSigner {
    pub url: String,
    pub key_name: String,
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Credential::SecretKey(key) => f
                .debug_tuple("SecretKey")
                .field(&public_key_hex(key))
                .finish(),
            Credential::Remote(remote) => f
                .debug_struct("Remote")
                .field("url", &remote.url)
                .field("key_name", &remote.key_name)
                .finish_non_exhaustive(),
        }
    }
}

impl Credential {
    /// Hex of the 32-byte secret, as client builders expect it.
    pub fn secret_key_hex(&self) -> Option<String> {
        match self {
            Credential::SecretKey(key) => Some(hex::encode(key.to_bytes())),
            Credential::Remote(_) => None,
        }
    }
}

/// Compressed SEC1 public key, hex encoded.
pub fn public_key_hex(key: &SigningKey) -> String {
    hex::encode(key.verifying_key().to_encoded_point(true).as_bytes())
}

/// Picks the one credential source the config provides.
///
/// Precedence is secret key, then mnemonic, then remote signer.
pub fn resolve_credential(config: &Config) -> Result<Credential, Error> {
    let private_key = config.private_key();
    let mnemonic = config.mnemonic();
    let remote = config.keys.remote.as_ref();

    let credential = match (private_key, mnemonic, remote) {
        (Some(key_hex), _, _) => {
            if mnemonic.is_some() || remote.is_some() {
                warn!("keys.private_key is set, ignoring keys.mnemonic and keys.remote");
            }
            let key = signing_key_from_hex(key_hex).map_err(Error::CredentialSetupFailed)?;
            Credential::SecretKey(key)
        }
        (None, Some(phrase), _) => {
            if remote.is_some() {
                warn!("keys.mnemonic is set, ignoring keys.remote");
            }
            let key = mnemonic_to_signing_key(phrase).map_err(Error::CredentialSetupFailed)?;
            Credential::SecretKey(key)
        }
        (None, None, Some(remote)) => {
            Credential::Remote(remote_signer(remote).map_err(Error::CredentialSetupFailed)?)
        }
        (None, None, None) => {
            return Err(Error::ConfigMissing(
                "keys.private_key, keys.mnemonic or keys.remote",
            ))
        }
    };

    match &credential {
        Credential::SecretKey(key) => info!(pubkey = %public_key_hex(key), "🔑 Signing key loaded"),
        Credential::Remote(remote) => {
            info!(url = %remote.url, key_name = %remote.key_name, "🔑 Using remote signer")
        }
    }
    Ok(credential)
}

fn remote_signer(config: &RemoteSignerConfig) -> Result<RemoteSigner> {
    config
        .api_key
        .as_deref()
        .filter(|k| !k.trim().is_empty())
        .context("keys.remote.api_key is required for the remote signer")?;
    if config.key_name.trim().is_empty() {
        anyhow::bail!("keys.remote.key_name must not be empty");
    }
    Ok(RemoteSigner {
        url: config.url.clone(),
        key_name: config.key_name.clone(),
    })
}

/// Derives the account key from a mnemonic phrase
///
/// BIP39 for mnemonic → seed (empty passphrase), then BIP32 secp256k1
/// derivation along [`COSMOS_HD_PATH`].
pub fn mnemonic_to_signing_key(mnemonic_str: &str) -> Result<SigningKey> {
    let mnemonic = Mnemonic::parse(mnemonic_str.trim())
        .context("Failed to parse mnemonic. Ensure it's a valid BIP39 mnemonic phrase.")?;

    let seed = mnemonic.to_seed("");

    let path: DerivationPath = COSMOS_HD_PATH
        .parse()
        .map_err(|e| anyhow!("invalid derivation path {COSMOS_HD_PATH}: {e}"))?;
    let xprv = XPrv::derive_from_path(seed, &path)
        .map_err(|e| anyhow!("key derivation failed: {e}"))?;

    Ok(xprv.private_key().clone())
}

/// Parses a hex-encoded 32-byte secp256k1 secret key.
pub fn signing_key_from_hex(hex_str: &str) -> Result<SigningKey> {
    validate_private_key_hex(hex_str)?;
    let bytes = hex::decode(hex_str.trim().trim_start_matches("0x"))?;
    SigningKey::from_slice(&bytes).map_err(|_| anyhow!("private key is not a valid secp256k1 scalar"))
}

/// Validates that a hex string is a valid private key (32 bytes)
pub fn validate_private_key_hex(hex_str: &str) -> Result<()> {
    let bytes = hex::decode(hex_str.trim().trim_start_matches("0x")).context("Invalid hex string")?;

    if bytes.len() != 32 {
        anyhow::bail!(
            "Private key must be exactly 32 bytes (64 hex characters), got {} bytes",
            bytes.len()
        );
    }

    Ok(())
}
