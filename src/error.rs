use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bad argument, such as an empty key name.
    Invalid,
    /// Refused to overwrite an existing entry.
    AlreadyExists,
    NotFound,
    WrongType,
    /// JSON could not be parsed.
    Parse,
    /// Input is not valid base64url.
    BadEncoding,
    /// Header `alg` names no known algorithm.
    UnknownAlg,
    /// Algorithm is known but rejected by the verification policy.
    AlgDisallowed,
    /// Key and token disagree on the algorithm.
    AlgMismatch,
    KeyMissing,
    /// Key is in an error state and must not be used.
    KeyInvalid,
    /// More than one key in the set would match.
    KeyAmbiguous,
    /// Token structure is broken (segments, JSON shape).
    Malformed,
    BadSignature,
    /// A registered claim failed validation (`exp`, `nbf`).
    InvalidClaims,
    /// The crypto backend failed.
    Crypto,
}

#[derive(Debug, Clone)]
pub struct Error {
    pub kind: ErrorKind,
    pub message: String,
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn invalid(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Invalid, message)
    }

    pub fn already_exists(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::AlreadyExists, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotFound, message)
    }

    pub fn wrong_type(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::WrongType, message)
    }

    pub fn parse(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Parse, message)
    }

    pub fn bad_encoding(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::BadEncoding, message)
    }

    pub fn unknown_alg(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::UnknownAlg, message)
    }

    pub fn alg_disallowed(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::AlgDisallowed, message)
    }

    pub fn alg_mismatch(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::AlgMismatch, message)
    }

    pub fn key_missing(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::KeyMissing, message)
    }

    pub fn key_invalid(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::KeyInvalid, message)
    }

    pub fn key_ambiguous(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::KeyAmbiguous, message)
    }

    pub fn malformed(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Malformed, message)
    }

    pub fn bad_signature(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::BadSignature, message)
    }

    pub fn invalid_claims(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidClaims, message)
    }

    pub fn crypto(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Crypto, message)
    }

    pub fn code(&self) -> &'static str {
        match self.kind {
            ErrorKind::Invalid => "INVALID",
            ErrorKind::AlreadyExists => "ALREADY_EXISTS",
            ErrorKind::NotFound => "NOT_FOUND",
            ErrorKind::WrongType => "WRONG_TYPE",
            ErrorKind::Parse => "PARSE_ERROR",
            ErrorKind::BadEncoding => "BAD_ENCODING",
            ErrorKind::UnknownAlg => "UNKNOWN_ALG",
            ErrorKind::AlgDisallowed => "ALG_DISALLOWED",
            ErrorKind::AlgMismatch => "ALG_MISMATCH",
            ErrorKind::KeyMissing => "KEY_MISSING",
            ErrorKind::KeyInvalid => "KEY_INVALID",
            ErrorKind::KeyAmbiguous => "KEY_AMBIGUOUS",
            ErrorKind::Malformed => "MALFORMED",
            ErrorKind::BadSignature => "BAD_SIGNATURE",
            ErrorKind::InvalidClaims => "INVALID_CLAIMS",
            ErrorKind::Crypto => "CRYPTO_FAILURE",
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for Error {}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::parse(err.to_string())
    }
}

impl From<base64::DecodeError> for Error {
    fn from(err: base64::DecodeError) -> Self {
        Error::bad_encoding(format!("invalid base64url: {err}"))
    }
}
