use std::collections::HashMap;
use std::fmt;

use bon::Builder;
use rand_core::CryptoRngCore;
use time::OffsetDateTime;
use tracing::debug;
use zeroize::Zeroizing;

use crate::error::JksError;
use crate::keypair::KeyPairInput;
use crate::keystore::Keystore;
use crate::protector::KeyProtector;

pub type Result<T> = std::result::Result<T, JksError>;

/// Order in which entries are written to the keystore.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum EntryOrder {
    /// The order in which aliases were first added.
    #[default]
    Insertion,
    /// Aliases sorted by their UTF-8 bytes.
    Alphabetical,
}

/// Settings for a [`KeystoreBuilder`].
///
/// # Fields
/// * `entry_order` - Order of entries in the output.
/// * `created_at` - Creation time stamped on every entry; the time of the
///   build when unset.
#[derive(Clone, Debug, Default, Builder)]
pub struct KeystoreOptions {
    #[builder(default)]
    pub entry_order: EntryOrder,
    pub created_at: Option<OffsetDateTime>,
}

/// Accumulates certificate/key pairs under aliases and builds a JKS image.
///
/// Adding a pair under an alias that is already present replaces the earlier
/// pair but keeps the alias in its original position.
#[derive(Default)]
pub struct KeystoreBuilder {
    password: Zeroizing<String>,
    entries: HashMap<String, KeyPairInput>,
    order: Vec<String>,
    options: KeystoreOptions,
}

impl fmt::Debug for KeystoreBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeystoreBuilder")
            .field("password", &"<redacted>")
            .field("aliases", &self.order)
            .field("options", &self.options)
            .finish()
    }
}

impl KeystoreBuilder {
    /// Creates an empty builder with default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty builder with the given options.
    pub fn with_options(options: KeystoreOptions) -> Self {
        Self {
            options,
            ..Self::default()
        }
    }

    /// Sets the keystore password.
    pub fn set_password(&mut self, password: impl Into<String>) {
        self.password = Zeroizing::new(password.into());
    }

    /// Adds a certificate and private key to the keystore.
    /// If an alias is reused, this overwrites the previous pair.
    ///
    /// # Arguments
    /// * `alias` - Alias for the cert/key pair.
    /// * `cert` - Certificate, in X.509 PEM format.
    /// * `key` - Private key, in PEM format.
    /// * `ca_certs` - Intermediate CA certificates in X.509 PEM format, leaf
    ///   to root; may be empty.
    pub fn add_cert<I, C>(
        &mut self,
        alias: impl Into<String>,
        cert: impl Into<Vec<u8>>,
        key: impl Into<Vec<u8>>,
        ca_certs: I,
    ) where
        I: IntoIterator<Item = C>,
        C: Into<Vec<u8>>,
    {
        let alias = alias.into();
        let input = KeyPairInput {
            key: key.into(),
            cert: cert.into(),
            ca_certs: ca_certs.into_iter().map(Into::into).collect(),
        };
        if self.entries.insert(alias.clone(), input).is_none() {
            self.order.push(alias);
        }
    }

    /// Number of distinct aliases added so far.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Aliases in the order entries will be written.
    pub fn aliases(&self) -> Vec<&str> {
        let mut aliases: Vec<&str> = self.order.iter().map(String::as_str).collect();
        if self.options.entry_order == EntryOrder::Alphabetical {
            aliases.sort_unstable();
        }
        aliases
    }

    /// Builds the keystore, drawing key protection salts from the OS RNG.
    pub fn build(&self) -> Result<Vec<u8>> {
        self.build_with_rng(&mut rand_core::OsRng)
    }

    /// Builds the keystore, drawing key protection salts from `rng`.
    ///
    /// Validates first, then parses and protects every pair in output order.
    /// The first error is returned, wrapped with its alias when it belongs to
    /// one entry. The builder itself is left untouched.
    pub fn build_with_rng<R: CryptoRngCore + ?Sized>(&self, rng: &mut R) -> Result<Vec<u8>> {
        self.validate()?;

        let protector = KeyProtector::new(&self.password)?;
        let created = self.options.created_at.unwrap_or_else(OffsetDateTime::now_utc);

        let mut keystore = Keystore::new();
        for alias in self.aliases() {
            let entry = self.entries[alias]
                .parse(alias)
                .and_then(|pair| pair.into_entry(&protector, &mut *rng, created))
                .map_err(|e| e.for_alias(alias))?;
            keystore.push(entry);
        }

        debug!(entries = keystore.len(), "serializing keystore");
        keystore.to_bytes(&self.password)
    }

    /// Fail-fast validation: password, then per alias its name and fields,
    /// then aliases that a JKS reader would fold together.
    ///
    /// The last check goes beyond the plain builder contract, which would
    /// accept `Server` and `server` as distinct aliases. Java's JKS provider
    /// lowercases aliases on load, so such a pair would silently collapse to
    /// one entry; it is rejected with [`JksError::AliasCollision`] instead.
    fn validate(&self) -> Result<()> {
        if self.password.is_empty() {
            return Err(JksError::NoPassword);
        }

        let aliases = self.aliases();
        for alias in &aliases {
            if alias.is_empty() {
                return Err(JksError::InvalidAlias);
            }
            self.entries[*alias].validate(alias)?;
        }

        let mut folded: HashMap<String, &str> = HashMap::with_capacity(aliases.len());
        for alias in aliases {
            if let Some(first) = folded.insert(alias.to_lowercase(), alias) {
                return Err(JksError::AliasCollision {
                    first: first.to_string(),
                    second: alias.to_string(),
                });
            }
        }
        Ok(())
    }
}
