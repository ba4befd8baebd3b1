//! Signed transaction decoding (EIP-2718 envelopes).
//!
//! Only the structure is checked: RLP shape, field count, field widths and
//! that the whole input is consumed. Signatures, balances and nonces are the
//! execution node's business.

use crate::domain::error::DecodeError;
use crate::domain::types::{strip_hex_prefix, to_hex_prefixed, Address, Hash, TransactionContext, U256};
use rlp::{DecoderError, Rlp};
use sha3::{Digest, Keccak256};
use tracing::debug;

/// Transaction envelope type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TxType {
    Legacy,
    AccessList, // EIP-2930
    DynamicFee, // EIP-1559
    Blob,       // EIP-4844
    SetCode,    // EIP-7702
}

impl TxType {
    /// EIP-2718 type byte (0 for legacy)
    pub fn as_u8(self) -> u8 {
        match self {
            TxType::Legacy => 0x00,
            TxType::AccessList => 0x01,
            TxType::DynamicFee => 0x02,
            TxType::Blob => 0x03,
            TxType::SetCode => 0x04,
        }
    }

    fn layout(self) -> &'static FieldLayout {
        match self {
            TxType::Legacy => &LEGACY,
            TxType::AccessList => &ACCESS_LIST,
            TxType::DynamicFee => &DYNAMIC_FEE,
            TxType::Blob => &BLOB,
            TxType::SetCode => &SET_CODE,
        }
    }
}

/// Field positions inside the RLP list of each envelope
struct FieldLayout {
    name: &'static str,
    fields: usize,
    chain_id: Option<usize>,
    nonce: usize,
    gas_limit: usize,
    to: usize,
    value: usize,
    data: usize,
    /// Contract creation not allowed
    to_required: bool,
}

// [nonce, gasPrice, gasLimit, to, value, data, v, r, s]
const LEGACY: FieldLayout = FieldLayout {
    name: "legacy",
    fields: 9,
    chain_id: None,
    nonce: 0,
    gas_limit: 2,
    to: 3,
    value: 4,
    data: 5,
    to_required: false,
};

// [chainId, nonce, gasPrice, gasLimit, to, value, data, accessList, yParity, r, s]
const ACCESS_LIST: FieldLayout = FieldLayout {
    name: "EIP-2930",
    fields: 11,
    chain_id: Some(0),
    nonce: 1,
    gas_limit: 3,
    to: 4,
    value: 5,
    data: 6,
    to_required: false,
};

// [chainId, nonce, maxPriorityFee, maxFee, gasLimit, to, value, data, accessList, yParity, r, s]
const DYNAMIC_FEE: FieldLayout = FieldLayout {
    name: "EIP-1559",
    fields: 12,
    chain_id: Some(0),
    nonce: 1,
    gas_limit: 4,
    to: 5,
    value: 6,
    data: 7,
    to_required: false,
};

// EIP-1559 fields + [maxFeePerBlobGas, blobVersionedHashes] before the signature
const BLOB: FieldLayout = FieldLayout {
    name: "EIP-4844",
    fields: 14,
    chain_id: Some(0),
    nonce: 1,
    gas_limit: 4,
    to: 5,
    value: 6,
    data: 7,
    to_required: true,
};

// EIP-1559 fields + [authorizationList] before the signature
const SET_CODE: FieldLayout = FieldLayout {
    name: "EIP-7702",
    fields: 13,
    chain_id: Some(0),
    nonce: 1,
    gas_limit: 4,
    to: 5,
    value: 6,
    data: 7,
    to_required: true,
};

/// A structurally valid signed transaction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedTransaction {
    pub tx_type: TxType,
    /// `None` for pre-EIP-155 legacy transactions
    pub chain_id: Option<u64>,
    pub nonce: u64,
    pub gas_limit: u64,
    pub to: Option<Address>,
    pub value: U256,
    pub calldata: Vec<u8>,
    /// keccak256 of the envelope
    pub hash: Hash,
    /// Envelope bytes exactly as received
    pub raw: Vec<u8>,
}

impl DecodedTransaction {
    /// 0x-prefixed transaction hash
    pub fn hash_hex(&self) -> String {
        to_hex_prefixed(self.hash.as_bytes())
    }

    /// Summary handed to directive services
    pub fn context(&self) -> TransactionContext {
        TransactionContext {
            hash: self.hash_hex(),
            tx_type: self.tx_type.as_u8(),
            chain_id: self.chain_id,
            nonce: self.nonce,
            to: self.to,
            value: self.value,
            input: to_hex_prefixed(&self.calldata),
        }
    }
}

/// Decode a hex string (optional `0x` prefix) into a transaction.
pub fn decode_hex_transaction(
    raw_hex: &str,
    max_size: usize,
) -> Result<DecodedTransaction, DecodeError> {
    let body = strip_hex_prefix(raw_hex);
    if body.is_empty() {
        return Err(DecodeError::Empty);
    }

    // Reject before allocating
    let size = body.len().div_ceil(2);
    if size > max_size {
        return Err(DecodeError::TooLarge {
            size,
            limit: max_size,
        });
    }

    let raw = hex::decode(body).map_err(|e| DecodeError::InvalidHex(e.to_string()))?;
    decode_raw_transaction(raw, max_size)
}

/// Decode envelope bytes into a transaction.
pub fn decode_raw_transaction(
    raw: Vec<u8>,
    max_size: usize,
) -> Result<DecodedTransaction, DecodeError> {
    if raw.is_empty() {
        return Err(DecodeError::Empty);
    }
    if raw.len() > max_size {
        return Err(DecodeError::TooLarge {
            size: raw.len(),
            limit: max_size,
        });
    }

    let (tx_type, payload) = detect_tx_type(&raw)?;
    let layout = tx_type.layout();
    let rlp = Rlp::new(payload);

    if !rlp.is_list() {
        return Err(DecodeError::Malformed(format!(
            "{} transaction must be an RLP list",
            layout.name
        )));
    }

    let info = rlp.payload_info().map_err(|e| rlp_error("envelope", e))?;
    if info.total() != payload.len() {
        return Err(DecodeError::Malformed(format!(
            "{} trailing bytes after transaction",
            payload.len().saturating_sub(info.total())
        )));
    }

    let item_count = rlp.item_count().map_err(|e| rlp_error("item count", e))?;
    if item_count != layout.fields {
        return Err(DecodeError::Malformed(format!(
            "{} transaction must have {} fields, got {}",
            layout.name, layout.fields, item_count
        )));
    }

    let chain_id = match layout.chain_id {
        Some(index) => Some(decode_u64(&rlp, index)?),
        None => legacy_chain_id(decode_u64(&rlp, 6)?),
    };

    let to = decode_optional_address(&rlp, layout.to)?;
    if layout.to_required && to.is_none() {
        return Err(DecodeError::Malformed(format!(
            "{} transaction cannot create a contract",
            layout.name
        )));
    }

    let hash = Hash::from_slice(&Keccak256::digest(&raw));

    let tx = DecodedTransaction {
        tx_type,
        chain_id,
        nonce: decode_u64(&rlp, layout.nonce)?,
        gas_limit: decode_u64(&rlp, layout.gas_limit)?,
        to,
        value: decode_u256(&rlp, layout.value)?,
        calldata: decode_bytes(&rlp, layout.data)?,
        hash,
        raw,
    };

    debug!(
        hash = %tx.hash_hex(),
        tx_type = ?tx.tx_type,
        nonce = tx.nonce,
        calldata_len = tx.calldata.len(),
        "Decoded raw transaction"
    );

    Ok(tx)
}

/// Detect transaction type from first byte
fn detect_tx_type(raw: &[u8]) -> Result<(TxType, &[u8]), DecodeError> {
    let first_byte = raw[0];

    // Legacy transactions start with an RLP list prefix (0xc0-0xff)
    if first_byte >= 0xc0 {
        return Ok((TxType::Legacy, raw));
    }

    let tx_type = match first_byte {
        0x01 => TxType::AccessList,
        0x02 => TxType::DynamicFee,
        0x03 => TxType::Blob,
        0x04 => TxType::SetCode,
        other if other <= 0x7f => return Err(DecodeError::UnsupportedType(other)),
        _ => {
            return Err(DecodeError::Malformed(
                "transaction is neither typed nor an RLP list".into(),
            ))
        }
    };

    Ok((tx_type, &raw[1..]))
}

/// EIP-155: v = chain_id * 2 + 35 + parity
fn legacy_chain_id(v: u64) -> Option<u64> {
    if v >= 35 {
        Some((v - 35) / 2)
    } else {
        None
    }
}

// Helper functions for RLP decoding

fn decode_u64(rlp: &Rlp, index: usize) -> Result<u64, DecodeError> {
    rlp.at(index)
        .and_then(|r| r.as_val())
        .map_err(|e| rlp_error(&format!("field {}", index), e))
}

fn decode_u256(rlp: &Rlp, index: usize) -> Result<U256, DecodeError> {
    let bytes = decode_bytes(rlp, index)?;
    if bytes.len() > 32 {
        return Err(DecodeError::Malformed(format!(
            "U256 field {} too large: {} bytes",
            index,
            bytes.len()
        )));
    }
    Ok(U256::from_big_endian(&bytes))
}

fn decode_bytes(rlp: &Rlp, index: usize) -> Result<Vec<u8>, DecodeError> {
    rlp.at(index)
        .and_then(|r| r.as_val::<Vec<u8>>())
        .map_err(|e| rlp_error(&format!("field {}", index), e))
}

fn decode_optional_address(rlp: &Rlp, index: usize) -> Result<Option<Address>, DecodeError> {
    let bytes = decode_bytes(rlp, index)?;
    if bytes.is_empty() {
        Ok(None)
    } else if bytes.len() == 20 {
        Ok(Some(Address::from_slice(&bytes)))
    } else {
        Err(DecodeError::Malformed(format!(
            "invalid address length at field {}: {} bytes",
            index,
            bytes.len()
        )))
    }
}

fn rlp_error(field: &str, e: DecoderError) -> DecodeError {
    DecodeError::Malformed(format!("RLP decode error for {}: {:?}", field, e))
}
