//! Transaction decoding and directive extraction.

pub mod decode;
pub mod directives;

pub use decode::{decode_hex_transaction, decode_raw_transaction, DecodedTransaction, TxType};
pub use directives::{embed_directives, extract_directives, Directive, SENTINEL, SENTINEL_HEX};
