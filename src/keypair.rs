use rand_core::CryptoRngCore;
use time::OffsetDateTime;
use tracing::debug;

use crate::cert::chain::CertificateChain;
use crate::error::{Field, JksError};
use crate::key::PrivateKey;
use crate::keystore::{KeystoreEntry, PrivateKeyEntry};
use crate::protector::KeyProtector;

pub type Result<T> = std::result::Result<T, JksError>;

/// A certificate and private key as supplied by the caller, still PEM-encoded.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyPairInput {
    /// Private key in PEM format
    pub key: Vec<u8>,
    /// Server cert in X.509 PEM format
    pub cert: Vec<u8>,
    /// Intermediate certs in X.509 PEM format, leaf-to-root, root excluded
    pub ca_certs: Vec<Vec<u8>>,
}

impl KeyPairInput {
    /// Checks that no field is empty.
    pub fn validate(&self, alias: &str) -> Result<()> {
        let empty = |field| JksError::EmptyField {
            alias: alias.to_string(),
            field,
        };
        if self.cert.is_empty() {
            return Err(empty(Field::Certificate));
        }
        if self.key.is_empty() {
            return Err(empty(Field::PrivateKey));
        }
        if let Some(i) = self.ca_certs.iter().position(Vec::is_empty) {
            return Err(empty(Field::Intermediate(i)));
        }
        Ok(())
    }

    /// Decodes the key and the certificate chain.
    pub fn parse(&self, alias: &str) -> Result<ParsedKeyPair> {
        let key = PrivateKey::from_pem(&self.key)?;
        let chain = CertificateChain::assemble(&self.cert, &self.ca_certs)?;
        Ok(ParsedKeyPair {
            alias: alias.to_string(),
            key,
            chain,
        })
    }
}

/// A decoded key and chain, ready to become a keystore entry.
#[derive(Debug, Clone)]
pub struct ParsedKeyPair {
    pub alias: String,
    pub key: PrivateKey,
    pub chain: CertificateChain,
}

impl ParsedKeyPair {
    /// Protects the key under a fresh salt from `rng` and builds the
    /// private key entry. The plaintext PKCS#8 buffer is zeroized on return.
    pub fn into_entry<R: CryptoRngCore + ?Sized>(
        self,
        protector: &KeyProtector,
        rng: &mut R,
        created: OffsetDateTime,
    ) -> Result<KeystoreEntry> {
        let pkcs8 = self.key.to_pkcs8_der()?;
        let protected_key = protector.protect(rng, pkcs8.as_bytes())?;
        debug!(
            alias = %self.alias,
            algorithm = ?self.key.algorithm(),
            subject = %self.chain.leaf().inner.tbs_certificate.subject,
            chain_len = self.chain.len(),
            "protected private key"
        );
        Ok(KeystoreEntry::PrivateKey(PrivateKeyEntry {
            alias: self.alias,
            created,
            protected_key,
            chain: self.chain.into_vec(),
        }))
    }
}
