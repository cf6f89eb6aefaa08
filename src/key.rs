use const_oid::ObjectIdentifier;
use const_oid::db::{rfc5912, rfc8410};
use der::Decode;
use pkcs8::{DecodePrivateKey, EncodePrivateKey, PrivateKeyInfo, SecretDocument};
use rsa::RsaPrivateKey;
use rsa::pkcs1::DecodeRsaPrivateKey;

use crate::error::JksError;
use crate::pem_utils::{PemBlock, decode_block};

pub type Result<T> = std::result::Result<T, JksError>;

/// PEM label of a private key, resolved to the encodings this crate understands.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum KeyLabel {
    /// `PRIVATE KEY`: PKCS#8 `PrivateKeyInfo`.
    Pkcs8,
    /// `RSA PRIVATE KEY`: PKCS#1.
    Rsa,
    /// `EC PRIVATE KEY`: SEC1.
    Ec,
    Unsupported(String),
}

impl From<&str> for KeyLabel {
    fn from(label: &str) -> Self {
        match label {
            "PRIVATE KEY" => KeyLabel::Pkcs8,
            "RSA PRIVATE KEY" => KeyLabel::Rsa,
            "EC PRIVATE KEY" => KeyLabel::Ec,
            other => KeyLabel::Unsupported(other.to_string()),
        }
    }
}

/// Named curves accepted for EC keys.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EcCurve {
    P256,
    P384,
    P521,
}

impl EcCurve {
    pub fn from_oid(oid: ObjectIdentifier) -> Result<Self> {
        match oid {
            rfc5912::SECP_256_R_1 => Ok(EcCurve::P256),
            rfc5912::SECP_384_R_1 => Ok(EcCurve::P384),
            rfc5912::SECP_521_R_1 => Ok(EcCurve::P521),
            other => Err(JksError::UnsupportedKeyType(format!("EC curve {other}"))),
        }
    }

    /// Curve whose field size matches a big-endian private scalar of `len` bytes.
    fn from_scalar_len(len: usize) -> Option<Self> {
        match len {
            32 => Some(EcCurve::P256),
            48 => Some(EcCurve::P384),
            66 => Some(EcCurve::P521),
            _ => None,
        }
    }
}

/// Key algorithm, as resolved from a label or a PKCS#8 algorithm identifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeyAlgorithm {
    Rsa,
    Ec(EcCurve),
    Ed25519,
}

/// An EC private key on one of the supported curves.
#[derive(Clone, Debug)]
pub enum EcPrivateKey {
    P256(p256::SecretKey),
    P384(p384::SecretKey),
    P521(p521::SecretKey),
}

impl EcPrivateKey {
    /// Decodes a SEC1 `ECPrivateKey`, taking the curve from its parameters.
    ///
    /// The parameters are optional in SEC1. Without them the curve is
    /// inferred from the length of the private scalar.
    pub fn from_sec1_der(der: &[u8]) -> Result<Self> {
        let parsed = sec1::EcPrivateKey::try_from(der)
            .map_err(|e| JksError::KeyParse(format!("invalid SEC1 EC key: {e}")))?;
        let curve = match parsed.parameters.and_then(|params| params.named_curve()) {
            Some(oid) => EcCurve::from_oid(oid)?,
            None => EcCurve::from_scalar_len(parsed.private_key.len()).ok_or_else(|| {
                JksError::KeyParse(format!(
                    "EC key does not name its curve and its {}-byte scalar fits none",
                    parsed.private_key.len()
                ))
            })?,
        };

        let invalid = |e: p256::elliptic_curve::Error| {
            JksError::KeyParse(format!("invalid SEC1 EC key: {e}"))
        };
        match curve {
            EcCurve::P256 => p256::SecretKey::from_sec1_der(der)
                .map(EcPrivateKey::P256)
                .map_err(invalid),
            EcCurve::P384 => p384::SecretKey::from_sec1_der(der)
                .map(EcPrivateKey::P384)
                .map_err(invalid),
            EcCurve::P521 => p521::SecretKey::from_sec1_der(der)
                .map(EcPrivateKey::P521)
                .map_err(invalid),
        }
    }

    pub fn curve(&self) -> EcCurve {
        match self {
            EcPrivateKey::P256(_) => EcCurve::P256,
            EcPrivateKey::P384(_) => EcCurve::P384,
            EcPrivateKey::P521(_) => EcCurve::P521,
        }
    }

    fn to_pkcs8_der(&self) -> pkcs8::Result<SecretDocument> {
        match self {
            EcPrivateKey::P256(key) => key.to_pkcs8_der(),
            EcPrivateKey::P384(key) => key.to_pkcs8_der(),
            EcPrivateKey::P521(key) => key.to_pkcs8_der(),
        }
    }
}

/// A PKCS#8 key kept in its original encoding after validation.
#[derive(Clone)]
pub struct Pkcs8Key {
    pub algorithm: KeyAlgorithm,
    document: SecretDocument,
}

impl std::fmt::Debug for Pkcs8Key {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pkcs8Key")
            .field("algorithm", &self.algorithm)
            .finish_non_exhaustive()
    }
}

impl Pkcs8Key {
    /// Validates a PKCS#8 `PrivateKeyInfo` by fully decoding the key it wraps.
    pub fn from_der(der: &[u8]) -> Result<Self> {
        let info = PrivateKeyInfo::from_der(der)
            .map_err(|e| JksError::KeyParse(format!("invalid PKCS#8 key: {e}")))?;
        let algorithm = match info.algorithm.oid {
            rfc5912::RSA_ENCRYPTION => {
                RsaPrivateKey::from_pkcs8_der(der)?;
                KeyAlgorithm::Rsa
            }
            rfc5912::ID_EC_PUBLIC_KEY => {
                let curve_oid = info
                    .algorithm
                    .parameters_oid()
                    .map_err(|e| {
                        JksError::KeyParse(format!("EC key does not name its curve: {e}"))
                    })?;
                let curve = EcCurve::from_oid(curve_oid)?;
                match curve {
                    EcCurve::P256 => drop(p256::SecretKey::from_pkcs8_der(der)?),
                    EcCurve::P384 => drop(p384::SecretKey::from_pkcs8_der(der)?),
                    EcCurve::P521 => drop(p521::SecretKey::from_pkcs8_der(der)?),
                }
                KeyAlgorithm::Ec(curve)
            }
            rfc8410::ID_ED_25519 => {
                ed25519_dalek::SigningKey::from_pkcs8_der(der)?;
                KeyAlgorithm::Ed25519
            }
            other => {
                return Err(JksError::UnsupportedKeyType(format!("PRIVATE KEY algorithm {other}")));
            }
        };
        let document = SecretDocument::try_from(der)?;
        Ok(Pkcs8Key { algorithm, document })
    }
}

/// A decoded private key.
///
/// Every variant can be re-encoded as the PKCS#8 DER that a JKS private key
/// entry protects.
#[derive(Clone, Debug)]
pub enum PrivateKey {
    Rsa(Box<RsaPrivateKey>),
    Ec(EcPrivateKey),
    Pkcs8(Pkcs8Key),
}

impl PrivateKey {
    /// Decodes a PEM-armored private key.
    pub fn from_pem(data: &[u8]) -> Result<Self> {
        Self::from_pem_block(&decode_block(data)?)
    }

    /// Decodes the payload of an already unwrapped PEM block according to its label.
    pub fn from_pem_block(block: &PemBlock) -> Result<Self> {
        match KeyLabel::from(block.label.as_str()) {
            KeyLabel::Pkcs8 => Ok(PrivateKey::Pkcs8(Pkcs8Key::from_der(&block.contents)?)),
            KeyLabel::Rsa => {
                let key = RsaPrivateKey::from_pkcs1_der(&block.contents)
                    .map_err(|e| JksError::KeyParse(format!("invalid PKCS#1 RSA key: {e}")))?;
                Ok(PrivateKey::Rsa(Box::new(key)))
            }
            KeyLabel::Ec => Ok(PrivateKey::Ec(EcPrivateKey::from_sec1_der(&block.contents)?)),
            KeyLabel::Unsupported(label) => Err(JksError::UnsupportedKeyType(label)),
        }
    }

    pub fn algorithm(&self) -> KeyAlgorithm {
        match self {
            PrivateKey::Rsa(_) => KeyAlgorithm::Rsa,
            PrivateKey::Ec(key) => KeyAlgorithm::Ec(key.curve()),
            PrivateKey::Pkcs8(key) => key.algorithm,
        }
    }

    /// Returns the PKCS#8 `PrivateKeyInfo` encoding of the key.
    ///
    /// Keys that arrived as PKCS#8 are returned byte for byte.
    pub fn to_pkcs8_der(&self) -> Result<SecretDocument> {
        let encoded = match self {
            PrivateKey::Rsa(key) => key.to_pkcs8_der(),
            PrivateKey::Ec(key) => key.to_pkcs8_der(),
            PrivateKey::Pkcs8(key) => return Ok(key.document.clone()),
        };
        encoded.map_err(|e| JksError::Encoding(e.to_string()))
    }
}
