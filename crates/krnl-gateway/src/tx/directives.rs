//! Directive extraction from transaction calldata.
//!
//! Directives are appended to ordinary calldata, each preceded by a 32-byte
//! ABI-style word holding `:` (0x3a) in its lowest byte. Extraction works on
//! the lowercase hex form of the calldata, so a boundary is recognised
//! wherever the 64-character pattern occurs, aligned or not.
//!
//! ```text
//! <selector + args> | 00..003a | "svcA" 00 00 | 00..003a | "svcB"
//!   discarded          sentinel   directive 0    sentinel   directive 1
//! ```

use crate::domain::error::DecodeError;
use std::borrow::Cow;

/// Boundary word in lowercase hex
pub const SENTINEL_HEX: &str = "000000000000000000000000000000000000000000000000000000000000003a";

/// Boundary word as bytes
pub const SENTINEL: [u8; 32] = {
    let mut word = [0u8; 32];
    word[31] = b':';
    word
};

/// One directive, trailing NUL bytes already removed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Directive {
    index: usize,
    payload: Vec<u8>,
}

impl Directive {
    pub fn new(index: usize, payload: impl Into<Vec<u8>>) -> Self {
        Self {
            index,
            payload: payload.into(),
        }
    }

    /// Zero-based position in the calldata
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    /// True for segments that were entirely NUL
    pub fn is_empty(&self) -> bool {
        self.payload.is_empty()
    }

    /// Directive text, `None` if the payload is not UTF-8
    pub fn as_str(&self) -> Option<&str> {
        std::str::from_utf8(&self.payload).ok()
    }

    /// Directive text for logs and error reports
    pub fn to_string_lossy(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.payload)
    }

    /// Leading whitespace-delimited token, read as the service name.
    ///
    /// The rest of the directive is an opaque argument string and is
    /// forwarded untouched together with the name.
    pub fn service(&self) -> Option<&str> {
        self.as_str()?.split_whitespace().next()
    }
}

/// Extract every directive from `calldata`, in payload order.
///
/// The piece before the first sentinel is ordinary calldata and is skipped.
/// Each following piece must be valid even-length hex; trailing NUL bytes
/// are stripped from the decoded bytes, leading ones are kept.
pub fn extract_directives(calldata: &[u8]) -> Result<Vec<Directive>, DecodeError> {
    let encoded = hex::encode(calldata);

    encoded
        .split(SENTINEL_HEX)
        .skip(1)
        .enumerate()
        .map(|(index, segment)| {
            let mut payload =
                hex::decode(segment).map_err(|e| DecodeError::InvalidDirective {
                    index,
                    reason: e.to_string(),
                })?;
            let len = payload
                .iter()
                .rposition(|b| *b != 0)
                .map_or(0, |last| last + 1);
            payload.truncate(len);
            Ok(Directive { index, payload })
        })
        .collect()
}

/// Append `directives` to `prefix` using the sentinel convention.
///
/// Inverse of [`extract_directives`] for directives without trailing NULs
/// and without an embedded sentinel.
pub fn embed_directives<D: AsRef<[u8]>>(prefix: &[u8], directives: &[D]) -> Vec<u8> {
    let extra: usize = directives
        .iter()
        .map(|d| SENTINEL.len() + d.as_ref().len())
        .sum();
    let mut calldata = Vec::with_capacity(prefix.len() + extra);
    calldata.extend_from_slice(prefix);
    for directive in directives {
        calldata.extend_from_slice(&SENTINEL);
        calldata.extend_from_slice(directive.as_ref());
    }
    calldata
}
