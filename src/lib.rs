//! Creation, signing and verification of JSON Web Tokens (RFC 7519), with
//! key material loaded from JSON Web Key Sets (RFC 7517).
//!
//! A token is built from grants and headers, bound to a key out of a
//! [`JwkSet`], and emitted as the familiar `header.claims.signature` compact
//! form. Verification takes a [`Validation`] policy naming the acceptable
//! algorithms and keys. Crypto is pluggable behind
//! [`crypto::CryptoProvider`]; the bundled backend is built on the
//! RustCrypto crates.
//!
//! ```
//! use jwtkit::{decode, Algorithm, Jwt, JwtConfig, JwkItem, Validation};
//!
//! let key = JwkItem::from_oct_secret(b"a very well kept secret");
//!
//! let mut jwt = Jwt::with_config(JwtConfig {
//!     alg: Algorithm::Hs256,
//!     key: Some(&key),
//! });
//! jwt.add_grant("iss", "example").unwrap();
//! let token = jwt.encode().unwrap();
//!
//! let verified = decode(&token, &Validation::with_key(&key, Algorithm::Hs256)).unwrap();
//! assert_eq!(verified.get_grant("iss").unwrap(), "example");
//! ```

mod algorithm;
pub mod base64url;
pub mod crypto;
mod decode;
mod document;
mod encode;
mod error;
mod jwks;
mod token;

pub use algorithm::Algorithm;
pub use decode::{decode, Validation};
pub use document::Document;
pub use error::{Error, ErrorKind, Result};
pub use jwks::{
    EcCurve, JwkItem, JwkSet, KeyMaterial, KeyOps, KeyProvider, KeyType, KeyUse, OkpCurve,
};
pub use token::{Jwt, JwtConfig};
