pub mod chain;

use der::Decode;

use crate::error::JksError;
use crate::pem_utils::decode_block;

pub type Result<T> = std::result::Result<T, JksError>;

/// The certificate type label JKS writes in front of every certificate.
pub const X509_CERT_TYPE: &str = "X.509";

/// Represents an X.509 certificate.
///
/// The DER bytes the certificate was decoded from are kept so they can be
/// embedded in a keystore exactly as supplied.
#[derive(Debug, Clone)]
pub struct Certificate {
    /// The parsed representation of the certificate.
    pub inner: x509_cert::Certificate,
    der: Vec<u8>,
}

impl Certificate {
    /// Decodes a DER-encoded X.509 certificate.
    ///
    /// # Arguments
    /// * `der` - The certificate bytes.
    /// * `index` - Position of the certificate in its chain, used in errors.
    pub fn from_der(der: &[u8], index: usize) -> Result<Self> {
        let inner =
            x509_cert::Certificate::from_der(der).map_err(|e| JksError::CertificateParse {
                index,
                reason: e.to_string(),
            })?;
        Ok(Self {
            inner,
            der: der.to_vec(),
        })
    }

    /// Decodes a PEM-armored X.509 certificate.
    ///
    /// The block label is not checked; a payload that is not a certificate fails
    /// to decode as DER.
    pub fn from_pem(data: &[u8], index: usize) -> Result<Self> {
        let block = decode_block(data).map_err(|e| match e {
            JksError::PemDecode(reason) => {
                JksError::PemDecode(format!("certificate {index}: {reason}"))
            }
            other => other,
        })?;
        Self::from_der(&block.contents, index)
    }

    /// Returns the DER encoding the certificate was decoded from.
    pub fn as_der(&self) -> &[u8] {
        &self.der
    }
}

impl PartialEq for Certificate {
    fn eq(&self, other: &Self) -> bool {
        self.der == other.der
    }
}

impl Eq for Certificate {}
