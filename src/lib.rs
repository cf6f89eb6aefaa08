//! # JksKit - Java KeyStore files from PEM, in Pure Rust
//!
//! JksKit builds Java KeyStore (JKS) images from PEM-encoded private keys and
//! certificate chains, using only rustcrypto libraries. The output is
//! byte-compatible with the format `keytool` and the JDK read: private keys are
//! protected with the JKS key protection algorithm and the image is sealed
//! with the keystore's trailing SHA-1 integrity digest.
//!
//! ## Supported Key Types
//!
//! - **PKCS#8** (`PRIVATE KEY`): RSA, ECDSA (P-256, P-384, P-521) and Ed25519
//! - **PKCS#1** (`RSA PRIVATE KEY`)
//! - **SEC1** (`EC PRIVATE KEY`): P-256, P-384 and P-521
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use jkskit::builder::KeystoreBuilder;
//!
//! # fn main() -> Result<(), jkskit::error::JksError> {
//! let cert_pem = std::fs::read("server.crt").unwrap();
//! let key_pem = std::fs::read("server.key").unwrap();
//! let intermediate_pem = std::fs::read("intermediate.crt").unwrap();
//!
//! let mut builder = KeystoreBuilder::new();
//! builder.set_password("changeit");
//! builder.add_cert("server", cert_pem, key_pem, [intermediate_pem]);
//!
//! let jks = builder.build()?;
//! std::fs::write("keystore.jks", jks).unwrap();
//! # Ok(())
//! # }
//! ```
//!
//! ### Reproducible Output
//!
//! Salts normally come from the operating system. For reproducible images,
//! pin the creation time and supply your own RNG:
//!
//! ```rust,no_run
//! use jkskit::builder::{EntryOrder, KeystoreBuilder, KeystoreOptions};
//!
//! # fn main() -> Result<(), jkskit::error::JksError> {
//! # let (cert_pem, key_pem) = (Vec::<u8>::new(), Vec::<u8>::new());
//! let options = KeystoreOptions::builder()
//!     .entry_order(EntryOrder::Alphabetical)
//!     .created_at(time::OffsetDateTime::UNIX_EPOCH)
//!     .build();
//!
//! let mut builder = KeystoreBuilder::with_options(options);
//! builder.set_password("changeit");
//! builder.add_cert("server", cert_pem, key_pem, Vec::<Vec<u8>>::new());
//!
//! let jks = builder.build_with_rng(&mut rand_core::OsRng)?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Error Handling
//!
//! Errors that belong to one entry are wrapped with its alias; use
//! [`JksError::root`](error::JksError::root) to inspect the underlying kind:
//!
//! ```rust
//! use jkskit::{builder::KeystoreBuilder, error::JksError};
//!
//! let mut builder = KeystoreBuilder::new();
//! builder.set_password("changeit");
//! builder.add_cert("server", "not a certificate", "not a key", Vec::<Vec<u8>>::new());
//!
//! match builder.build() {
//!     Ok(_) => println!("Keystore built"),
//!     Err(e) => match e.root() {
//!         JksError::PemDecode(msg) => println!("Bad PEM: {}", msg),
//!         other => println!("Other error: {}", other),
//!     },
//! }
//! ```
//!
//! ## Module Organization
//!
//! - [`builder`]: The keystore builder and its options
//! - [`keypair`]: Key pair inputs and entry assembly
//! - [`key`]: Private key decoding and PKCS#8 conversion
//! - [`cert`]: Certificate decoding and chain assembly
//! - [`protector`]: The JKS key protection algorithm
//! - [`keystore`]: The keystore model and binary serialization
//! - [`pem_utils`]: PEM block decoding
//! - [`error`]: Error types

pub mod builder;
pub mod cert;
pub mod error;
pub mod key;
pub mod keypair;
pub mod keystore;
pub mod pem_utils;
pub mod protector;
