//! Signing keys and base-58 addresses.

use std::path::Path;

use anyhow::{bail, Context, Result};
use ed25519_dalek::{Signer, SigningKey};
use rand::rngs::OsRng;

/// An ed25519 keypair with its base-58 address.
pub struct Wallet {
    signing: SigningKey,
    address: String,
}

impl Wallet {
    /// Load a keypair from the standard JSON array file: 64 bytes, secret
    /// key first, public key second.
    pub fn load(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path)
            .with_context(|| format!("keypair file {} not found", path.display()))?;
        let raw: Vec<u8> = serde_json::from_slice(&bytes)
            .with_context(|| format!("keypair file {} is not a JSON byte array", path.display()))?;
        if raw.len() != 64 {
            bail!(
                "keypair file {} holds {} bytes, expected 64",
                path.display(),
                raw.len()
            );
        }
        let mut secret = [0u8; 32];
        secret.copy_from_slice(&raw[..32]);
        Ok(Self::from_signing_key(SigningKey::from_bytes(&secret)))
    }

    pub fn from_signing_key(signing: SigningKey) -> Self {
        let address = bs58::encode(signing.verifying_key().to_bytes()).into_string();
        Self { signing, address }
    }

    /// Fresh random keypair, used for newly created ledger accounts.
    pub fn generate() -> Self {
        Self::from_signing_key(SigningKey::generate(&mut OsRng))
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    /// Detached signature over `message`, hex-encoded for the wire.
    pub fn sign(&self, message: &[u8]) -> String {
        hex::encode(self.signing.sign(message).to_bytes())
    }
}
