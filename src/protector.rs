//! JKS private key protection.
//!
//! JKS protects each private key with a proprietary password-based scheme:
//! a SHA-1 keystream seeded from a random salt is XORed over the PKCS#8
//! bytes, and a SHA-1 check over the password and plaintext is appended.
//! The protected record is `salt || ciphertext || check`, wrapped in an
//! `EncryptedPrivateKeyInfo` naming the Sun key protection OID.

use der::asn1::{Null, ObjectIdentifier, OctetStringRef};
use der::{Decode, Encode, Sequence};
use rand_core::CryptoRngCore;
use sha1::{Digest, Sha1};
use zeroize::Zeroizing;

use crate::error::JksError;

pub type Result<T> = std::result::Result<T, JksError>;

/// Length of the random salt that seeds the keystream.
pub const SALT_LEN: usize = 20;

/// Length of a SHA-1 digest.
pub const DIGEST_LEN: usize = 20;

/// Sun JKS key protection algorithm, 1.3.6.1.4.1.42.2.17.1.1.
pub const KEY_PROTECTOR_OID: ObjectIdentifier =
    ObjectIdentifier::new_unwrap("1.3.6.1.4.1.42.2.17.1.1");

#[derive(Clone, Debug, Eq, PartialEq, Sequence)]
struct AlgorithmIdentifier {
    algorithm: ObjectIdentifier,
    parameters: Null,
}

#[derive(Clone, Debug, Eq, PartialEq, Sequence)]
struct EncryptedKeyInfo<'a> {
    algorithm: AlgorithmIdentifier,
    encrypted_data: OctetStringRef<'a>,
}

/// Encode a password the way Java hands a `char[]` to the digest: UTF-16BE,
/// with surrogate pairs for characters outside the BMP.
pub fn password_bytes(password: &str) -> Zeroizing<Vec<u8>> {
    Zeroizing::new(password.encode_utf16().flat_map(u16::to_be_bytes).collect())
}

/// Encrypts and recovers private key bytes under one keystore password.
pub struct KeyProtector {
    password: Zeroizing<Vec<u8>>,
}

impl KeyProtector {
    /// Fails if `password` is empty.
    pub fn new(password: &str) -> Result<Self> {
        if password.is_empty() {
            return Err(JksError::KeyProtection("password must not be empty".to_string()));
        }
        Ok(Self {
            password: password_bytes(password),
        })
    }

    /// Protects `plaintext` under a salt drawn from `rng`.
    ///
    /// Returns the record `salt || ciphertext || check`.
    pub fn protect<R: CryptoRngCore + ?Sized>(
        &self,
        rng: &mut R,
        plaintext: &[u8],
    ) -> Result<Vec<u8>> {
        let mut salt = [0u8; SALT_LEN];
        rng.try_fill_bytes(&mut salt)
            .map_err(|e| JksError::KeyProtection(format!("failed to generate salt: {e}")))?;
        self.protect_with_salt(&salt, plaintext)
    }

    /// Protects `plaintext` under a caller-chosen salt.
    pub fn protect_with_salt(&self, salt: &[u8; SALT_LEN], plaintext: &[u8]) -> Result<Vec<u8>> {
        if plaintext.is_empty() {
            return Err(JksError::KeyProtection("private key bytes must not be empty".to_string()));
        }

        let mut record = Vec::with_capacity(SALT_LEN + plaintext.len() + DIGEST_LEN);
        record.extend_from_slice(salt);
        record.extend_from_slice(plaintext);
        self.apply_keystream(salt, &mut record[SALT_LEN..]);
        record.extend_from_slice(&self.check_digest(plaintext));
        Ok(record)
    }

    /// Inverse of [`KeyProtector::protect`]: recovers the plaintext from a
    /// record and verifies its check digest.
    pub fn recover(&self, record: &[u8]) -> Result<Zeroizing<Vec<u8>>> {
        if record.len() < SALT_LEN + DIGEST_LEN {
            return Err(JksError::KeyProtection(format!(
                "protected key record too short: {} bytes",
                record.len()
            )));
        }
        let (salt, rest) = record.split_at(SALT_LEN);
        let (ciphertext, check) = rest.split_at(rest.len() - DIGEST_LEN);

        let mut plaintext = Zeroizing::new(ciphertext.to_vec());
        self.apply_keystream(salt, &mut plaintext);

        if self.check_digest(&plaintext).as_slice() != check {
            return Err(JksError::WrongPasswordOrCorruptData);
        }
        Ok(plaintext)
    }

    /// XORs `data` with `SHA1(pw || salt)`, `SHA1(pw || d0)`, ... in place.
    fn apply_keystream(&self, salt: &[u8], data: &mut [u8]) {
        let mut block = Zeroizing::new(salt.to_vec());
        for chunk in data.chunks_mut(DIGEST_LEN) {
            let digest = Sha1::new()
                .chain_update(self.password.as_slice())
                .chain_update(block.as_slice())
                .finalize();
            for (byte, key) in chunk.iter_mut().zip(digest.iter()) {
                *byte ^= key;
            }
            block.clear();
            block.extend_from_slice(&digest);
        }
    }

    fn check_digest(&self, plaintext: &[u8]) -> [u8; DIGEST_LEN] {
        Sha1::new()
            .chain_update(self.password.as_slice())
            .chain_update(plaintext)
            .finalize()
            .into()
    }
}

/// Wraps a protected record in the DER `EncryptedPrivateKeyInfo` JKS stores.
pub fn encapsulate(record: &[u8]) -> Result<Vec<u8>> {
    let info = EncryptedKeyInfo {
        algorithm: AlgorithmIdentifier {
            algorithm: KEY_PROTECTOR_OID,
            parameters: Null,
        },
        encrypted_data: OctetStringRef::new(record)?,
    };
    Ok(info.to_der()?)
}

/// Unwraps a record produced by [`encapsulate`].
pub fn decapsulate(der: &[u8]) -> Result<Vec<u8>> {
    let info = EncryptedKeyInfo::from_der(der)?;
    if info.algorithm.algorithm != KEY_PROTECTOR_OID {
        return Err(JksError::KeyProtection(format!(
            "unexpected key protection algorithm {}",
            info.algorithm.algorithm
        )));
    }
    Ok(info.encrypted_data.as_bytes().to_vec())
}
