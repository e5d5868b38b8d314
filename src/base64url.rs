//! Unpadded URL-safe base64 as used throughout JOSE. Encoding never emits
//! padding; decoding tolerates trailing `=` but nothing else outside the
//! alphabet.

use crate::error::Result;
use base64::alphabet;
use base64::engine::{DecodePaddingMode, Engine as _, GeneralPurpose, GeneralPurposeConfig};

const URL_SAFE_LENIENT: GeneralPurpose = GeneralPurpose::new(
    &alphabet::URL_SAFE,
    GeneralPurposeConfig::new()
        .with_encode_padding(false)
        .with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

pub fn encode(data: &[u8]) -> String {
    URL_SAFE_LENIENT.encode(data)
}

pub fn decode(text: &str) -> Result<Vec<u8>> {
    Ok(URL_SAFE_LENIENT.decode(text)?)
}
