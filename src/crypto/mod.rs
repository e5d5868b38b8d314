//! Pluggable crypto backends. The token and keyset layers never touch key
//! bytes for asymmetric keys; they hand a [`JwkItem`] to a provider and get
//! signatures or verdicts back. The active default is picked once per
//! process, by name, from the `JWT_CRYPTO` environment variable.

mod rustcrypto;
pub use rustcrypto::RustCryptoProvider;

use crate::algorithm::Algorithm;
use crate::error::Result;
use crate::jwks::JwkItem;
use serde_json::{Map, Value};
use std::any::Any;
use std::fmt;
use std::sync::OnceLock;
use tracing::debug;

pub trait CryptoProvider: Send + Sync {
    fn name(&self) -> &'static str;

    /// Whether the backend can import asymmetric JWKs at all. A minimal
    /// backend may only handle `oct` secrets, which never reach it.
    fn supports_jwk(&self) -> bool;

    /// Import an `EC` JWK into `item`. Failures are recorded on the item,
    /// never returned.
    fn process_ec(&self, jwk: &Map<String, Value>, item: &mut JwkItem);

    fn process_rsa(&self, jwk: &Map<String, Value>, item: &mut JwkItem);

    fn process_eddsa(&self, jwk: &Map<String, Value>, item: &mut JwkItem);

    fn sign(&self, alg: Algorithm, key: &JwkItem, message: &[u8]) -> Result<Vec<u8>>;

    fn verify(&self, alg: Algorithm, key: &JwkItem, message: &[u8], signature: &[u8])
        -> Result<()>;
}

/// Opaque per-key state owned by the backend that imported the key. Freed
/// with the descriptor.
pub struct KeyHandle(Box<dyn Any + Send + Sync>);

impl KeyHandle {
    pub(crate) fn new<T: Any + Send + Sync>(inner: T) -> Self {
        Self(Box::new(inner))
    }

    pub(crate) fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.0.downcast_ref()
    }
}

impl fmt::Debug for KeyHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("KeyHandle")
    }
}

static RUSTCRYPTO: RustCryptoProvider = RustCryptoProvider;

static PROVIDERS: &[&dyn CryptoProvider] = &[&RUSTCRYPTO];

pub fn provider(name: &str) -> Option<&'static dyn CryptoProvider> {
    PROVIDERS.iter().find(|p| p.name() == name).copied()
}

/// The process-wide default backend. Resolved on first use and fixed for
/// the life of the process.
pub fn default_provider() -> &'static dyn CryptoProvider {
    static DEFAULT: OnceLock<&'static dyn CryptoProvider> = OnceLock::new();

    *DEFAULT.get_or_init(|| match std::env::var("JWT_CRYPTO") {
        Ok(name) => provider(&name).unwrap_or_else(|| {
            debug!(%name, "JWT_CRYPTO names no registered provider, using default");
            PROVIDERS[0]
        }),
        Err(_) => PROVIDERS[0],
    })
}

#[cfg(test)]
mod tests {
    use super::{default_provider, provider};

    #[test]
    fn rustcrypto_is_registered() {
        let p = provider("rustcrypto").expect("provider");
        assert_eq!(p.name(), "rustcrypto");
        assert!(p.supports_jwk());
    }

    #[test]
    fn unknown_names_are_not_found() {
        assert!(provider("nonexistent").is_none());
    }

    #[test]
    fn default_is_stable() {
        assert_eq!(default_provider().name(), default_provider().name());
    }
}
