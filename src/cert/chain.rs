use super::{Certificate, Result};

/// An ordered certificate chain: the leaf first, then intermediates in the
/// order the caller supplied them.
///
/// Assembly only decodes; signatures, validity periods and issuer linkage are
/// not checked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CertificateChain {
    certs: Vec<Certificate>,
}

impl CertificateChain {
    /// Decodes a leaf certificate and its intermediates from PEM.
    ///
    /// Errors carry the 0-based position of the first certificate that fails
    /// to decode, counting the leaf as position 0.
    pub fn assemble<I, C>(leaf: &[u8], intermediates: I) -> Result<Self>
    where
        I: IntoIterator<Item = C>,
        C: AsRef<[u8]>,
    {
        let mut certs = vec![Certificate::from_pem(leaf, 0)?];
        for (i, pem) in intermediates.into_iter().enumerate() {
            certs.push(Certificate::from_pem(pem.as_ref(), i + 1)?);
        }
        Ok(Self { certs })
    }

    pub fn leaf(&self) -> &Certificate {
        &self.certs[0]
    }

    pub fn len(&self) -> usize {
        self.certs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.certs.is_empty()
    }

    pub fn into_vec(self) -> Vec<Certificate> {
        self.certs
    }
}
