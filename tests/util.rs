#![allow(dead_code)]

use jkskit::keystore::writer::SIGNATURE_WHITENER;
use jkskit::protector::{KeyProtector, decapsulate, password_bytes};
use openssl::asn1::Asn1Time;
use openssl::bn::{BigNum, MsbOption};
use openssl::ec::{EcGroup, EcKey};
use openssl::hash::MessageDigest;
use openssl::nid::Nid;
use openssl::pkey::{PKey, Private};
use openssl::rsa::Rsa;
use openssl::x509::extension::BasicConstraints;
use openssl::x509::{X509, X509Builder, X509NameBuilder};
use sha1::{Digest, Sha1};

/// A certificate together with the key it certifies.
pub struct CertWithKey {
    pub cert: X509,
    pub key: PKey<Private>,
}

impl CertWithKey {
    pub fn cert_pem(&self) -> Vec<u8> {
        self.cert.to_pem().unwrap()
    }

    pub fn cert_der(&self) -> Vec<u8> {
        self.cert.to_der().unwrap()
    }

    /// `RSA PRIVATE KEY` for RSA keys, `EC PRIVATE KEY` for EC keys.
    pub fn traditional_key_pem(&self) -> Vec<u8> {
        if let Ok(rsa) = self.key.rsa() {
            rsa.private_key_to_pem().unwrap()
        } else {
            self.key.ec_key().unwrap().private_key_to_pem().unwrap()
        }
    }

    /// `PRIVATE KEY`
    pub fn pkcs8_key_pem(&self) -> Vec<u8> {
        self.key.private_key_to_pem_pkcs8().unwrap()
    }
}

pub fn rsa_key() -> PKey<Private> {
    PKey::from_rsa(Rsa::generate(2048).unwrap()).unwrap()
}

pub fn ec_p256_key() -> PKey<Private> {
    let group = EcGroup::from_curve_name(Nid::X9_62_PRIME256V1).unwrap();
    PKey::from_ec_key(EcKey::generate(&group).unwrap()).unwrap()
}

/// Issues a certificate for `key` signed by `issuer`, or self-signed.
pub fn issue(
    common_name: &str,
    key: PKey<Private>,
    issuer: Option<&CertWithKey>,
    ca: bool,
) -> CertWithKey {
    let mut name = X509NameBuilder::new().unwrap();
    name.append_entry_by_nid(Nid::COMMONNAME, common_name).unwrap();
    let name = name.build();

    let mut serial = BigNum::new().unwrap();
    serial.rand(64, MsbOption::MAYBE_ZERO, false).unwrap();

    let mut builder = X509Builder::new().unwrap();
    builder.set_version(2).unwrap();
    builder.set_serial_number(&serial.to_asn1_integer().unwrap()).unwrap();
    builder.set_subject_name(&name).unwrap();
    match issuer {
        Some(issuer) => builder.set_issuer_name(issuer.cert.subject_name()).unwrap(),
        None => builder.set_issuer_name(&name).unwrap(),
    }
    builder.set_pubkey(&key).unwrap();
    builder.set_not_before(&Asn1Time::days_from_now(0).unwrap()).unwrap();
    builder.set_not_after(&Asn1Time::days_from_now(365).unwrap()).unwrap();
    if ca {
        builder
            .append_extension(BasicConstraints::new().critical().ca().build().unwrap())
            .unwrap();
    }
    let signer = issuer.map_or(&key, |issuer| &issuer.key);
    builder.sign(signer, MessageDigest::sha256()).unwrap();

    CertWithKey {
        cert: builder.build(),
        key,
    }
}

pub fn self_signed_rsa(common_name: &str) -> CertWithKey {
    issue(common_name, rsa_key(), None, false)
}

/// Root, intermediate and leaf; returns `(leaf, intermediate, root)`.
pub fn rsa_chain() -> (CertWithKey, CertWithKey, CertWithKey) {
    let root = issue("Test Root CA", rsa_key(), None, true);
    let intermediate = issue("Test Intermediate CA", rsa_key(), Some(&root), true);
    let leaf = issue("server.test.local", rsa_key(), Some(&intermediate), false);
    (leaf, intermediate, root)
}

#[derive(Debug)]
pub struct ParsedEntry {
    pub tag: u32,
    pub alias: String,
    pub created_ms: i64,
    /// EncryptedPrivateKeyInfo DER for private key entries.
    pub protected_key: Option<Vec<u8>>,
    /// `(type, DER)` per certificate.
    pub certs: Vec<(String, Vec<u8>)>,
}

impl ParsedEntry {
    /// Decapsulates and recovers the PKCS#8 key bytes.
    pub fn recover_key(&self, password: &str) -> Vec<u8> {
        let der = self.protected_key.as_ref().expect("not a private key entry");
        let record = decapsulate(der).unwrap();
        KeyProtector::new(password).unwrap().recover(&record).unwrap().to_vec()
    }

    pub fn cert_ders(&self) -> Vec<Vec<u8>> {
        self.certs.iter().map(|(_, der)| der.clone()).collect()
    }
}

#[derive(Debug)]
pub struct ParsedKeystore {
    pub magic: u32,
    pub version: u32,
    pub entries: Vec<ParsedEntry>,
}

#[derive(Debug, PartialEq, Eq)]
pub enum ReadError {
    Truncated,
    TrailingBytes,
    DigestMismatch,
}

struct Cursor<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn take(&mut self, n: usize) -> Result<&'a [u8], ReadError> {
        let end = self.pos.checked_add(n).ok_or(ReadError::Truncated)?;
        let out = self.data.get(self.pos..end).ok_or(ReadError::Truncated)?;
        self.pos = end;
        Ok(out)
    }

    fn u16(&mut self) -> Result<u16, ReadError> {
        Ok(u16::from_be_bytes(self.take(2)?.try_into().unwrap()))
    }

    fn u32(&mut self) -> Result<u32, ReadError> {
        Ok(u32::from_be_bytes(self.take(4)?.try_into().unwrap()))
    }

    fn i64(&mut self) -> Result<i64, ReadError> {
        Ok(i64::from_be_bytes(self.take(8)?.try_into().unwrap()))
    }

    /// Aliases in these tests avoid NUL and supplementary characters, where
    /// modified UTF-8 differs from UTF-8.
    fn utf(&mut self) -> Result<String, ReadError> {
        let len = self.u16()? as usize;
        Ok(String::from_utf8_lossy(self.take(len)?).into_owned())
    }

    fn byte_array(&mut self) -> Result<Vec<u8>, ReadError> {
        let len = self.u32()? as usize;
        Ok(self.take(len)?.to_vec())
    }

    fn certificate(&mut self) -> Result<(String, Vec<u8>), ReadError> {
        let kind = self.utf()?;
        Ok((kind, self.byte_array()?))
    }
}

/// Parses a JKS image, checking its integrity digest against `password`.
pub fn read_keystore(image: &[u8], password: &str) -> Result<ParsedKeystore, ReadError> {
    if image.len() < 20 {
        return Err(ReadError::Truncated);
    }
    let (body, digest) = image.split_at(image.len() - 20);

    let mut hasher = Sha1::new();
    hasher.update(password_bytes(password).as_slice());
    hasher.update(SIGNATURE_WHITENER);
    hasher.update(body);
    if hasher.finalize().as_slice() != digest {
        return Err(ReadError::DigestMismatch);
    }

    let mut cursor = Cursor { data: body, pos: 0 };
    let magic = cursor.u32()?;
    let version = cursor.u32()?;
    let count = cursor.u32()?;

    let mut entries = Vec::new();
    for _ in 0..count {
        let tag = cursor.u32()?;
        let alias = cursor.utf()?;
        let created_ms = cursor.i64()?;
        let entry = match tag {
            1 => {
                let protected_key = cursor.byte_array()?;
                let chain_len = cursor.u32()?;
                let certs = (0..chain_len)
                    .map(|_| cursor.certificate())
                    .collect::<Result<Vec<_>, _>>()?;
                ParsedEntry {
                    tag,
                    alias,
                    created_ms,
                    protected_key: Some(protected_key),
                    certs,
                }
            }
            _ => ParsedEntry {
                tag,
                alias,
                created_ms,
                protected_key: None,
                certs: vec![cursor.certificate()?],
            },
        };
        entries.push(entry);
    }

    if cursor.pos != body.len() {
        return Err(ReadError::TrailingBytes);
    }
    Ok(ParsedKeystore {
        magic,
        version,
        entries,
    })
}

/// A deterministic RNG that repeats one byte.
pub struct FixedRng(pub u8);

impl rand_core::RngCore for FixedRng {
    fn next_u32(&mut self) -> u32 {
        u32::from_ne_bytes([self.0; 4])
    }

    fn next_u64(&mut self) -> u64 {
        u64::from_ne_bytes([self.0; 8])
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        dest.fill(self.0);
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand_core::Error> {
        self.fill_bytes(dest);
        Ok(())
    }
}

impl rand_core::CryptoRng for FixedRng {}
