// src/types/transaction.rs
//! Transaction records and the ingested transaction set.
//!
//! Records are accepted in three JSON shapes: a bare array, an object with a
//! `transactions` array, or a JSON-RPC style object with a `result` array.
//! Fields the pipeline does not model are kept in [`Transaction::extra`] so
//! the canonical serialization reflects the whole uploaded record.

use std::fmt;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::error::IngestError;

/// File name reported for the built-in sample set.
pub const SAMPLE_FILE_NAME: &str = "sample_transactions.json";

/// File name reported when the caller does not supply one.
pub const DEFAULT_FILE_NAME: &str = "uploaded_data.json";

/// A numeric field carried either as a JSON number or as a string.
///
/// Wei amounts routinely exceed `f64` precision, so string values are kept
/// verbatim and only parsed on demand.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Quantity {
    Number(serde_json::Number),
    Text(String),
}

impl Quantity {
    /// Best-effort numeric reading. Accepts decimal and `0x` hex strings.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Quantity::Number(n) => n.as_f64(),
            Quantity::Text(s) => {
                let s = s.trim();
                match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
                    Some(hex) => u128::from_str_radix(hex, 16).ok().map(|v| v as f64),
                    None => s.parse::<f64>().ok().filter(|v| v.is_finite()),
                }
            }
        }
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Quantity::Number(n) => write!(f, "{n}"),
            Quantity::Text(s) => f.write_str(s),
        }
    }
}

impl From<&str> for Quantity {
    fn from(s: &str) -> Self {
        Quantity::Text(s.to_string())
    }
}

impl From<u64> for Quantity {
    fn from(v: u64) -> Self {
        Quantity::Number(v.into())
    }
}

/// A single transaction record. Identity is the `hash` field.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub hash: String,
    pub from: String,
    /// `Some(None)` for an explicit `null` (contract creation), `None` when
    /// the record has no `to` key at all.
    #[serde(default, deserialize_with = "present_field", skip_serializing_if = "Option::is_none")]
    pub to: Option<Option<String>>,
    pub value: Quantity,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gas: Option<Quantity>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gas_price: Option<Quantity>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub block_number: Option<Quantity>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<Quantity>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nonce: Option<Quantity>,
    /// Fields not modelled above, preserved for serialization.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Transaction {
    pub fn new(
        hash: impl Into<String>,
        from: impl Into<String>,
        to: impl Into<String>,
        value: impl Into<Quantity>,
    ) -> Self {
        Self {
            hash: hash.into(),
            from: from.into(),
            to: Some(Some(to.into())),
            value: value.into(),
            gas: None,
            gas_price: None,
            block_number: None,
            timestamp: None,
            input: None,
            nonce: None,
            extra: Map::new(),
        }
    }

    /// Recipient address, if the record names one.
    pub fn recipient(&self) -> Option<&str> {
        self.to.as_ref().and_then(|to| to.as_deref())
    }

    /// Bytes hashed into this transaction's leaf: `hash ‖ from ‖ to ‖ value`
    /// with no separator. A `to` without an address is rendered as `null`.
    pub fn leaf_preimage(&self) -> String {
        format!("{}{}{}{}", self.hash, self.from, self.recipient().unwrap_or(NULL_RECIPIENT), self.value)
    }

    /// Gas used by the transaction, read from `gas` or a `gasUsed` extra field.
    pub fn gas_used(&self) -> Option<f64> {
        self.gas
            .as_ref()
            .and_then(Quantity::as_f64)
            .or_else(|| self.extra.get("gasUsed").and_then(value_as_f64))
    }
}

impl PartialEq for Transaction {
    fn eq(&self, other: &Self) -> bool {
        self.hash == other.hash
    }
}

impl Eq for Transaction {}

impl Hash for Transaction {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.hash.hash(state);
    }
}

const NULL_RECIPIENT: &str = "null";

/// Marks a field as present even when its value is `null`.
fn present_field<'de, D>(deserializer: D) -> Result<Option<Option<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(Some)
}

fn value_as_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => Quantity::Text(s.clone()).as_f64(),
        _ => None,
    }
}

/// Canonical byte form of an ordered transaction sequence (compact JSON).
pub fn canonical_bytes(transactions: &[Transaction]) -> serde_json::Result<Vec<u8>> {
    serde_json::to_vec(transactions)
}

/// An ordered batch of transactions plus provenance metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionSet {
    pub transactions: Vec<Transaction>,
    /// `true` for user-supplied data, `false` for the illustrative sample.
    pub is_real_data: bool,
    /// Byte length of [`canonical_bytes`] over `transactions`.
    pub original_size: usize,
    pub file_name: String,
}

impl TransactionSet {
    pub fn new(
        transactions: Vec<Transaction>,
        is_real_data: bool,
        file_name: impl Into<String>,
    ) -> Result<Self, IngestError> {
        let original_size = canonical_bytes(&transactions)
            .map_err(|e| IngestError::UnsupportedFormat(format!("cannot serialize records: {e}")))?
            .len();
        Ok(Self { transactions, is_real_data, original_size, file_name: file_name.into() })
    }

    /// Parses an uploaded JSON document.
    pub fn from_json_slice(bytes: &[u8], file_name: Option<&str>) -> Result<Self, IngestError> {
        let value: Value = serde_json::from_slice(bytes)
            .map_err(|e| IngestError::UnsupportedFormat(format!("invalid JSON: {e}")))?;
        Self::from_json_value(value, file_name)
    }

    /// Accepts `[...]`, `{"transactions": [...]}` or `{"result": [...]}`.
    pub fn from_json_value(value: Value, file_name: Option<&str>) -> Result<Self, IngestError> {
        let records = match value {
            Value::Array(records) => records,
            Value::Object(mut object) => match (object.remove("transactions"), object.remove("result")) {
                (Some(Value::Array(records)), _) => records,
                (_, Some(Value::Array(records))) => records,
                _ => {
                    return Err(IngestError::UnsupportedFormat(
                        "expected a `transactions` or `result` array".to_string(),
                    ))
                }
            },
            other => {
                return Err(IngestError::UnsupportedFormat(format!(
                    "expected an array or object, found {}",
                    json_kind(&other)
                )))
            }
        };

        let transactions = records
            .into_iter()
            .enumerate()
            .map(|(index, record)| {
                serde_json::from_value::<Transaction>(record).map_err(|e| {
                    IngestError::UnsupportedFormat(format!("record {index} is not a transaction: {e}"))
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Self::new(transactions, true, file_name.unwrap_or(DEFAULT_FILE_NAME))
    }

    /// The illustrative data set shown before anything is uploaded.
    pub fn sample() -> Self {
        let mut first = Transaction::new("0x1234...5678", "0x1234...abcd", "0x5678...efgh", "1000000000000000000");
        first.gas = Some(21000u64.into());
        first.gas_price = Some("2000000000".into());
        first.block_number = Some(12345678u64.into());
        first.timestamp = Some(1678901234u64.into());
        first.input = Some("0x".to_string());
        first.nonce = Some(42u64.into());

        let mut second = Transaction::new("0x5678...90ab", "0x5678...efgh", "0x1234...abcd", "500000000000000000");
        second.gas = Some(25000u64.into());
        second.gas_price = Some("3000000000".into());
        second.block_number = Some(12345679u64.into());
        second.timestamp = Some(1678902234u64.into());
        second.input = Some("0x".to_string());
        second.nonce = Some(43u64.into());

        let transactions = vec![first, second];
        // Serializing plain strings and integers cannot fail.
        let original_size = canonical_bytes(&transactions).map(|b| b.len()).unwrap_or_default();
        Self { transactions, is_real_data: false, original_size, file_name: SAMPLE_FILE_NAME.to_string() }
    }

    pub fn len(&self) -> usize {
        self.transactions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }

    /// Sum of all `value` fields; unparseable values count as zero.
    pub fn total_value(&self) -> f64 {
        self.transactions.iter().filter_map(|tx| tx.value.as_f64()).sum()
    }

    /// Sum of gas used across the set.
    pub fn total_gas(&self) -> u64 {
        self.transactions.iter().filter_map(Transaction::gas_used).map(|g| g as u64).sum()
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn record(hash: &str) -> Value {
        json!({
            "hash": hash,
            "from": "0xfrom",
            "to": "0xto",
            "value": "1000",
            "gas": 21000,
            "gasPrice": "2000000000",
            "blockNumber": 1
        })
    }

    #[test]
    fn test_ingest_bare_array() {
        let set = TransactionSet::from_json_value(json!([record("0xa"), record("0xb")]), Some("txs.json")).unwrap();
        assert_eq!(set.len(), 2);
        assert!(set.is_real_data);
        assert_eq!(set.file_name, "txs.json");
        assert_eq!(set.transactions[0].hash, "0xa");
    }

    #[test]
    fn test_ingest_transactions_field() {
        let set = TransactionSet::from_json_value(json!({ "transactions": [record("0xa")] }), None).unwrap();
        assert_eq!(set.len(), 1);
        assert_eq!(set.file_name, DEFAULT_FILE_NAME);
    }

    #[test]
    fn test_ingest_rpc_result_field() {
        let bytes = serde_json::to_vec(&json!({ "jsonrpc": "2.0", "id": 1, "result": [record("0xc")] })).unwrap();
        let set = TransactionSet::from_json_slice(&bytes, None).unwrap();
        assert_eq!(set.transactions[0].hash, "0xc");
    }

    #[test]
    fn test_ingest_unsupported_shapes() {
        for value in [json!(42), json!("txs"), json!({ "data": [] }), json!({ "result": "0x1" })] {
            let err = TransactionSet::from_json_value(value, None).unwrap_err();
            assert!(matches!(err, IngestError::UnsupportedFormat(_)));
        }
        let err = TransactionSet::from_json_slice(b"{not json", None).unwrap_err();
        assert!(matches!(err, IngestError::UnsupportedFormat(_)));
    }

    #[test]
    fn test_ingest_rejects_records_without_hash() {
        let err = TransactionSet::from_json_value(json!([{ "from": "a", "to": "b", "value": 1 }]), None).unwrap_err();
        let IngestError::UnsupportedFormat(msg) = err;
        assert!(msg.contains("record 0"));
    }

    #[test]
    fn test_ingest_empty_array_is_accepted() {
        let set = TransactionSet::from_json_value(json!([]), None).unwrap();
        assert!(set.is_empty());
        assert_eq!(set.original_size, 2);
    }

    #[test]
    fn test_extra_fields_survive_serialization() {
        let mut rec = record("0xa");
        rec["status"] = json!("success");
        rec["gasUsed"] = json!(30000);
        let set = TransactionSet::from_json_value(json!([rec]), None).unwrap();
        let bytes = canonical_bytes(&set.transactions).unwrap();
        let text = String::from_utf8(bytes.clone()).unwrap();
        assert!(text.contains("\"status\":\"success\""));
        assert!(text.contains("\"gasPrice\":\"2000000000\""));
        assert_eq!(set.original_size, bytes.len());
    }

    #[test]
    fn test_leaf_preimage_concatenation() {
        let tx = Transaction::new("0xAAA", "alice", "bob", 5u64);
        assert_eq!(tx.leaf_preimage(), "0xAAAalicebob5");

        let mut creation = Transaction::new("0xBBB", "alice", "", "7");
        creation.to = Some(None);
        assert_eq!(creation.leaf_preimage(), "0xBBBalicenull7");
        creation.to = None;
        assert_eq!(creation.leaf_preimage(), "0xBBBalicenull7");
    }

    #[test]
    fn test_null_to_is_contract_creation() {
        let set = TransactionSet::from_json_value(
            json!([{ "hash": "0x1", "from": "0xa", "to": null, "value": "0x10" }]),
            None,
        )
        .unwrap();
        assert_eq!(set.transactions[0].to, Some(None));
        assert_eq!(set.transactions[0].recipient(), None);
        assert_eq!(set.transactions[0].value.as_f64(), Some(16.0));
    }

    #[test]
    fn test_null_to_leaf_matches_literal_rendering() {
        let set = TransactionSet::from_json_slice(br#"[{"hash":"0x1","from":"0xa","to":null,"value":"7"}]"#, None)
            .unwrap();
        assert_eq!(set.transactions[0].leaf_preimage(), "0x10xanull7");
    }

    #[test]
    fn test_to_key_presence_survives_serialization() {
        let set = TransactionSet::from_json_value(
            json!([
                { "hash": "0x1", "from": "0xa", "to": null, "value": "1" },
                { "hash": "0x2", "from": "0xb", "value": "2" }
            ]),
            None,
        )
        .unwrap();
        assert_eq!(set.transactions[1].to, None);

        let text = String::from_utf8(canonical_bytes(&set.transactions).unwrap()).unwrap();
        assert_eq!(text.matches("\"to\"").count(), 1);
        assert!(text.contains("\"to\":null"));
        assert_eq!(set.original_size, text.len());
    }

    #[test]
    fn test_identity_is_by_hash() {
        let a = Transaction::new("0x1", "a", "b", "1");
        let b = Transaction::new("0x1", "c", "d", "2");
        assert_eq!(a, b);
        assert_ne!(a, Transaction::new("0x2", "a", "b", "1"));
    }

    #[test]
    fn test_sample_set_totals() {
        let set = TransactionSet::sample();
        assert!(!set.is_real_data);
        assert_eq!(set.file_name, SAMPLE_FILE_NAME);
        assert_eq!(set.len(), 2);
        assert_eq!(set.total_gas(), 46000);
        assert_eq!(set.total_value(), 1.5e18);
        assert_eq!(set.original_size, canonical_bytes(&set.transactions).unwrap().len());
    }

    #[test]
    fn test_gas_used_fallback() {
        let set = TransactionSet::from_json_value(
            json!([{ "hash": "0x1", "from": "a", "to": "b", "value": 1, "gasUsed": "0x5208" }]),
            None,
        )
        .unwrap();
        assert_eq!(set.total_gas(), 21000);
    }
}
