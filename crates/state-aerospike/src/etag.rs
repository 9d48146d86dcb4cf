//! ETag <-> record generation codec.
//!
//! The ETag handed to callers is the decimal form of the record's generation
//! counter. Callers persist and resubmit it verbatim, so the format is a
//! public contract.

use std::num::ParseIntError;

use thiserror::Error;

/// An ETag that is not the decimal form of a `u32` generation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("'{etag}' is not a decimal generation counter")]
pub struct MalformedEtag {
    etag: String,
    #[source]
    source: Option<ParseIntError>,
}

impl MalformedEtag {
    /// Returns the rejected ETag.
    #[must_use]
    pub fn etag(&self) -> &str {
        &self.etag
    }
}

/// Decodes an ETag into the generation it encodes.
///
/// # Errors
///
/// Returns [`MalformedEtag`] unless `etag` is a base-10 digit string
/// representable as a `u32`.
pub fn decode_etag(etag: &str) -> Result<u32, MalformedEtag> {
    // `u32::from_str` tolerates a leading '+'; ETags are bare digits.
    if etag.starts_with('+') {
        return Err(MalformedEtag { etag: etag.to_owned(), source: None });
    }
    etag.parse::<u32>()
        .map_err(|source| MalformedEtag { etag: etag.to_owned(), source: Some(source) })
}

/// Encodes a generation as an ETag.
#[must_use]
pub fn encode_etag(generation: u32) -> String {
    generation.to_string()
}
