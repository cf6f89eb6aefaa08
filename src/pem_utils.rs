use crate::error::JksError;

/// One decoded PEM block: its label and binary payload.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PemBlock {
    pub label: String,
    pub contents: Vec<u8>,
}

/// Decode the first PEM block found in `data`.
///
/// Text after the first block is ignored. The payload is not interpreted.
pub fn decode_block(data: &[u8]) -> Result<PemBlock, JksError> {
    if data.iter().all(u8::is_ascii_whitespace) {
        return Err(JksError::PemDecode("no PEM data found".to_string()));
    }
    let pem = pem::parse(data)?;
    Ok(PemBlock {
        label: pem.tag().to_string(),
        contents: pem.into_contents(),
    })
}

/// Convert DER‑encoded data into a PEM‑encoded string with the provided label.
pub fn der_to_pem(der: &[u8], label: &str) -> String {
    let pem = pem::Pem::new(label, der);
    pem::encode_config(&pem, pem::EncodeConfig::new())
}
