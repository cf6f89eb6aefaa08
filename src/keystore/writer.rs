use sha1::{Digest, Sha1};

use crate::cert::{Certificate, X509_CERT_TYPE};
use crate::error::JksError;
use crate::protector::password_bytes;

use super::Result;

/// Mixed into the integrity digest after the password.
pub const SIGNATURE_WHITENER: &[u8; 16] = b"Mighty Aphrodite";

/// Big-endian writer for the JKS layout that keeps a running integrity digest.
///
/// The digest is seeded with the password and whitener so that
/// [`JksWriter::finish`] only has to append it.
pub struct JksWriter {
    buf: Vec<u8>,
    hasher: Sha1,
}

impl JksWriter {
    pub fn new(password: &str) -> Self {
        let mut hasher = Sha1::new();
        hasher.update(password_bytes(password).as_slice());
        hasher.update(SIGNATURE_WHITENER);
        Self {
            buf: Vec::new(),
            hasher,
        }
    }

    pub fn write_bytes(&mut self, data: &[u8]) {
        self.buf.extend_from_slice(data);
        self.hasher.update(data);
    }

    pub fn write_u16(&mut self, value: u16) {
        self.write_bytes(&value.to_be_bytes());
    }

    pub fn write_u32(&mut self, value: u32) {
        self.write_bytes(&value.to_be_bytes());
    }

    pub fn write_i64(&mut self, value: i64) {
        self.write_bytes(&value.to_be_bytes());
    }

    /// Write a string the way `DataOutputStream.writeUTF` does: a u16 byte
    /// length followed by modified UTF-8.
    pub fn write_utf(&mut self, value: &str) -> Result<()> {
        let encoded = modified_utf8(value);
        let len = u16::try_from(encoded.len()).map_err(|_| {
            JksError::Serialization(format!(
                "string of {} encoded bytes exceeds {} bytes",
                encoded.len(),
                u16::MAX
            ))
        })?;
        self.write_u16(len);
        self.write_bytes(&encoded);
        Ok(())
    }

    /// Write a u32 length prefix followed by `data`.
    pub fn write_byte_array(&mut self, data: &[u8]) -> Result<()> {
        let len = u32::try_from(data.len()).map_err(|_| {
            JksError::Serialization(format!("{} bytes do not fit a u32 length prefix", data.len()))
        })?;
        self.write_u32(len);
        self.write_bytes(data);
        Ok(())
    }

    /// Write a certificate as its type label and DER bytes.
    pub fn write_certificate(&mut self, cert: &Certificate) -> Result<()> {
        self.write_utf(X509_CERT_TYPE)?;
        self.write_byte_array(cert.as_der())
    }

    /// Append the integrity digest and return the finished image.
    pub fn finish(mut self) -> Vec<u8> {
        let digest = self.hasher.finalize();
        self.buf.extend_from_slice(&digest);
        self.buf
    }
}

/// Java's modified UTF-8: NUL is two bytes, and characters outside the BMP
/// are written as a surrogate pair of three-byte sequences.
pub fn modified_utf8(value: &str) -> Vec<u8> {
    let mut out = Vec::with_capacity(value.len());
    for unit in value.encode_utf16() {
        match unit {
            0x0001..=0x007F => out.push(unit as u8),
            0x0000 | 0x0080..=0x07FF => {
                out.push(0xC0 | (unit >> 6) as u8);
                out.push(0x80 | (unit & 0x3F) as u8);
            }
            _ => {
                out.push(0xE0 | (unit >> 12) as u8);
                out.push(0x80 | ((unit >> 6) & 0x3F) as u8);
                out.push(0x80 | (unit & 0x3F) as u8);
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integers_are_big_endian() {
        let mut writer = JksWriter::new("pw");
        writer.write_u16(0x1234);
        writer.write_u32(0x12345678);
        writer.write_i64(-2);
        assert_eq!(
            writer.buf,
            vec![
                0x12, 0x34, 0x12, 0x34, 0x56, 0x78, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xfe
            ]
        );
    }

    #[test]
    fn utf_strings_are_length_prefixed() {
        let mut writer = JksWriter::new("pw");
        writer.write_utf("X.509").unwrap();
        assert_eq!(writer.buf, vec![0, 5, b'X', b'.', b'5', b'0', b'9']);
    }

    #[test]
    fn modified_utf8_special_cases() {
        assert_eq!(modified_utf8("cert"), b"cert".to_vec());
        assert_eq!(modified_utf8("\0"), vec![0xC0, 0x80]);
        assert_eq!(modified_utf8("\u{e9}"), vec![0xC3, 0xA9]);
        assert_eq!(modified_utf8("\u{20ac}"), vec![0xE2, 0x82, 0xAC]);
        assert_eq!(
            modified_utf8("\u{1F600}"),
            vec![0xED, 0xA0, 0xBD, 0xED, 0xB8, 0x80]
        );
    }

    #[test]
    fn oversized_string_is_rejected() {
        let mut writer = JksWriter::new("pw");
        let long = "a".repeat(u16::MAX as usize + 1);
        assert!(matches!(writer.write_utf(&long), Err(JksError::Serialization(_))));
        writer.write_utf(&long[1..]).unwrap();
    }

    #[test]
    fn digest_covers_password_whitener_and_body() {
        let mut writer = JksWriter::new("AB");
        writer.write_u32(0xFEEDFEED);
        let image = writer.finish();

        let expected = Sha1::new()
            .chain_update([0x00u8, 0x41, 0x00, 0x42])
            .chain_update(b"Mighty Aphrodite")
            .chain_update([0xFEu8, 0xED, 0xFE, 0xED])
            .finalize();
        assert_eq!(&image[..4], &[0xFE, 0xED, 0xFE, 0xED]);
        assert_eq!(&image[4..], expected.as_slice());
    }
}
