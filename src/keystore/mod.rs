//! The JKS keystore model and its binary serialization.
//!
//! Layout, all integers big-endian:
//!
//! ```text
//! magic (u32) | version (u32) | entry count (u32)
//! per entry:
//!   tag (u32) | alias (UTF) | created, ms since epoch (i64)
//!   private key:  key length (u32) | EncryptedPrivateKeyInfo DER
//!                 chain length (u32) | per cert: "X.509" (UTF) | length (u32) | DER
//!   trusted cert: "X.509" (UTF) | length (u32) | DER
//! SHA-1(password UTF-16BE | "Mighty Aphrodite" | everything above)
//! ```

pub mod writer;

use time::OffsetDateTime;

use crate::cert::Certificate;
use crate::error::JksError;
use crate::protector;
use writer::JksWriter;

pub type Result<T> = std::result::Result<T, JksError>;

/// Magic number for JKS files
pub const MAGIC: u32 = 0xFEED_FEED;

/// Version 2 of the JKS format
pub const VERSION_2: u32 = 2;

/// Tag for private key entries
pub const PRIVATE_KEY_TAG: u32 = 1;

/// Tag for trusted certificate entries
pub const TRUSTED_CERT_TAG: u32 = 2;

/// A private key with its certificate chain.
///
/// `protected_key` is the key protector record (`salt || ciphertext ||
/// check`); the plaintext key never lives in an entry.
#[derive(Debug, Clone)]
pub struct PrivateKeyEntry {
    pub alias: String,
    pub created: OffsetDateTime,
    pub protected_key: Vec<u8>,
    pub chain: Vec<Certificate>,
}

/// A certificate trusted on its own, with no private key.
#[derive(Debug, Clone)]
pub struct TrustedCertEntry {
    pub alias: String,
    pub created: OffsetDateTime,
    pub cert: Certificate,
}

#[derive(Debug, Clone)]
pub enum KeystoreEntry {
    PrivateKey(PrivateKeyEntry),
    TrustedCert(TrustedCertEntry),
}

impl KeystoreEntry {
    pub fn alias(&self) -> &str {
        match self {
            KeystoreEntry::PrivateKey(entry) => &entry.alias,
            KeystoreEntry::TrustedCert(entry) => &entry.alias,
        }
    }
}

/// An ordered set of keystore entries.
#[derive(Debug, Clone, Default)]
pub struct Keystore {
    entries: Vec<KeystoreEntry>,
}

impl Keystore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an entry; entries are written in push order.
    pub fn push(&mut self, entry: KeystoreEntry) {
        self.entries.push(entry);
    }

    pub fn entries(&self) -> &[KeystoreEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Serializes the keystore into a JKS image sealed with `password`.
    pub fn to_bytes(&self, password: &str) -> Result<Vec<u8>> {
        let count = u32::try_from(self.entries.len()).map_err(|_| {
            JksError::Serialization(format!("too many entries: {}", self.entries.len()))
        })?;

        let mut out = JksWriter::new(password);
        out.write_u32(MAGIC);
        out.write_u32(VERSION_2);
        out.write_u32(count);

        for entry in &self.entries {
            match entry {
                KeystoreEntry::PrivateKey(entry) => write_private_key_entry(&mut out, entry)?,
                KeystoreEntry::TrustedCert(entry) => write_trusted_cert_entry(&mut out, entry)?,
            }
            tracing::trace!(alias = entry.alias(), "wrote keystore entry");
        }

        Ok(out.finish())
    }
}

fn write_private_key_entry(out: &mut JksWriter, entry: &PrivateKeyEntry) -> Result<()> {
    if entry.alias.is_empty() {
        return Err(JksError::Serialization("private key entry has an empty alias".to_string()));
    }
    if entry.chain.is_empty() {
        return Err(JksError::Serialization(format!(
            "private key entry {:?} has an empty certificate chain",
            entry.alias
        )));
    }
    let chain_len = u32::try_from(entry.chain.len()).map_err(|_| {
        JksError::Serialization(format!(
            "certificate chain too long: {} entries",
            entry.chain.len()
        ))
    })?;

    out.write_u32(PRIVATE_KEY_TAG);
    out.write_utf(&entry.alias)?;
    out.write_i64(unix_millis(entry.created));
    out.write_byte_array(&protector::encapsulate(&entry.protected_key)?)?;
    out.write_u32(chain_len);
    for cert in &entry.chain {
        out.write_certificate(cert)?;
    }
    Ok(())
}

fn write_trusted_cert_entry(out: &mut JksWriter, entry: &TrustedCertEntry) -> Result<()> {
    if entry.alias.is_empty() {
        return Err(JksError::Serialization(
            "trusted certificate entry has an empty alias".to_string(),
        ));
    }
    out.write_u32(TRUSTED_CERT_TAG);
    out.write_utf(&entry.alias)?;
    out.write_i64(unix_millis(entry.created));
    out.write_certificate(&entry.cert)
}

fn unix_millis(at: OffsetDateTime) -> i64 {
    (at.unix_timestamp_nanos() / 1_000_000) as i64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protector::{KeyProtector, SALT_LEN};

    #[test]
    fn empty_keystore_layout() {
        let image = Keystore::new().to_bytes("changeit").unwrap();
        assert_eq!(image.len(), 12 + 20);
        assert_eq!(&image[0..4], &[0xFE, 0xED, 0xFE, 0xED]);
        assert_eq!(&image[4..8], &[0, 0, 0, 2]);
        assert_eq!(&image[8..12], &[0, 0, 0, 0]);
    }

    #[test]
    fn empty_chain_is_a_serialization_error() {
        let protected_key = KeyProtector::new("pw")
            .unwrap()
            .protect_with_salt(&[0; SALT_LEN], b"key")
            .unwrap();
        let mut keystore = Keystore::new();
        keystore.push(KeystoreEntry::PrivateKey(PrivateKeyEntry {
            alias: "server".to_string(),
            created: OffsetDateTime::UNIX_EPOCH,
            protected_key,
            chain: vec![],
        }));
        assert_eq!(keystore.len(), 1);
        assert_eq!(keystore.entries()[0].alias(), "server");
        assert!(matches!(keystore.to_bytes("pw"), Err(JksError::Serialization(_))));
    }

    #[test]
    fn millis_truncate_toward_epoch() {
        let at = OffsetDateTime::from_unix_timestamp_nanos(1_700_000_000_123_999_999).unwrap();
        assert_eq!(unix_millis(at), 1_700_000_000_123);
    }
}
