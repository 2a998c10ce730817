//! JSON shapes printed by the node-control command.
//!
//! Fields below the response envelope are lenient: a missing list is empty
//! and a missing address is the empty string, which never matches a user.

use serde::{Deserialize, Deserializer};
use tracker_core::types::{Block, Output, TipHash, Transaction};
use tracker_core::{Result, TrackerError};

use crate::client::{OP_GET_BLOCK, OP_GET_SELECTED_TIP_HASH};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TipHashEnvelope {
    get_selected_tip_hash_response: TipHashResponse,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TipHashResponse {
    #[serde(default)]
    selected_tip_hash: String,
    #[serde(default)]
    error: Option<RpcError>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BlockEnvelope {
    get_block_response: BlockResponse,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BlockResponse {
    #[serde(default)]
    block: Option<RpcBlock>,
    #[serde(default)]
    error: Option<RpcError>,
}

#[derive(Debug, Deserialize)]
struct RpcError {
    #[serde(default)]
    message: String,
}

#[derive(Debug, Deserialize)]
struct RpcBlock {
    #[serde(default)]
    transactions: Vec<RpcTransaction>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RpcTransaction {
    #[serde(default)]
    subnetwork_id: Option<String>,
    #[serde(default)]
    outputs: Vec<RpcOutput>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RpcOutput {
    #[serde(default, deserialize_with = "deserialize_amount")]
    amount: u64,
    #[serde(default)]
    verbose_data: Option<RpcOutputVerboseData>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RpcOutputVerboseData {
    #[serde(default)]
    script_public_key_address: String,
}

/// uint64 may be printed as a number or, protobuf-JSON style, as a string
fn deserialize_amount<'de, D>(deserializer: D) -> std::result::Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawAmount {
        Number(u64),
        Text(String),
    }

    match RawAmount::deserialize(deserializer)? {
        RawAmount::Number(n) => Ok(n),
        RawAmount::Text(s) => s.trim().parse().map_err(serde::de::Error::custom),
    }
}

fn parse_error(operation: &'static str, reason: impl Into<String>) -> TrackerError {
    TrackerError::Parse {
        operation,
        reason: reason.into(),
    }
}

/// Parse `GetSelectedTipHash` output
pub fn parse_selected_tip_hash(stdout: &[u8]) -> Result<TipHash> {
    let envelope: TipHashEnvelope = serde_json::from_slice(stdout)
        .map_err(|e| parse_error(OP_GET_SELECTED_TIP_HASH, e.to_string()))?;
    let response = envelope.get_selected_tip_hash_response;

    let hash = response.selected_tip_hash.trim();
    if hash.is_empty() {
        let reason = match response.error {
            Some(err) if !err.message.is_empty() => format!("node error: {}", err.message),
            _ => "missing selectedTipHash".to_string(),
        };
        return Err(parse_error(OP_GET_SELECTED_TIP_HASH, reason));
    }

    Ok(TipHash::new(hash))
}

/// Parse `GetBlock` output for the block requested as `hash`
pub fn parse_block(hash: &TipHash, stdout: &[u8]) -> Result<Block> {
    let envelope: BlockEnvelope = serde_json::from_slice(stdout)
        .map_err(|e| parse_error(OP_GET_BLOCK, e.to_string()))?;
    let response = envelope.get_block_response;

    let block = match (response.block, response.error) {
        (Some(block), _) => block,
        (None, Some(err)) if !err.message.is_empty() => {
            return Err(parse_error(OP_GET_BLOCK, format!("node error: {}", err.message)))
        }
        (None, _) => return Err(parse_error(OP_GET_BLOCK, "missing block")),
    };

    let transactions = block
        .transactions
        .into_iter()
        .map(|tx| Transaction {
            subnetwork_id: tx.subnetwork_id,
            outputs: tx
                .outputs
                .into_iter()
                .map(|out| Output {
                    amount_raw: out.amount,
                    miner_address: out
                        .verbose_data
                        .map(|v| v.script_public_key_address)
                        .unwrap_or_default(),
                })
                .collect(),
        })
        .collect();

    Ok(Block {
        hash: hash.clone(),
        transactions,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_tip_hash() {
        let out = br#"{"getSelectedTipHashResponse":{"selectedTipHash":"abc123"}}"#;
        assert_eq!(parse_selected_tip_hash(out).unwrap(), TipHash::from("abc123"));
    }

    #[test]
    fn test_parse_tip_hash_rejects_bad_output() {
        assert!(matches!(
            parse_selected_tip_hash(b"rpc error: connection refused"),
            Err(TrackerError::Parse { .. })
        ));
        assert!(matches!(
            parse_selected_tip_hash(br#"{"somethingElse":{}}"#),
            Err(TrackerError::Parse { .. })
        ));

        let err = parse_selected_tip_hash(
            br#"{"getSelectedTipHashResponse":{"error":{"message":"not synced"}}}"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("not synced"));
    }

    #[test]
    fn test_parse_block() {
        let out = br#"{
            "getBlockResponse": {
                "block": {
                    "header": {"version": 1},
                    "transactions": [
                        {
                            "subnetworkId": "0100000000000000000000000000000000000000",
                            "outputs": [
                                {"amount": 500000000, "verboseData": {"scriptPublicKeyAddress": "sedra:addr1"}},
                                {"amount": "123456789", "verboseData": {"scriptPublicKeyAddress": "sedra:addr2"}}
                            ]
                        },
                        {"outputs": [{"amount": 7}]}
                    ]
                }
            }
        }"#;

        let block = parse_block(&TipHash::from("A"), out).unwrap();
        assert_eq!(block.hash, TipHash::from("A"));
        assert_eq!(block.transactions.len(), 2);
        assert!(block.transactions[0].is_coinbase());
        assert_eq!(
            block.transactions[0].outputs,
            vec![
                Output {
                    amount_raw: 500_000_000,
                    miner_address: "sedra:addr1".to_string()
                },
                Output {
                    amount_raw: 123_456_789,
                    miner_address: "sedra:addr2".to_string()
                },
            ]
        );
        assert_eq!(block.transactions[1].outputs[0].miner_address, "");
    }

    #[test]
    fn test_parse_block_without_transactions() {
        let out = br#"{"getBlockResponse":{"block":{}}}"#;
        let block = parse_block(&TipHash::from("A"), out).unwrap();
        assert!(block.transactions.is_empty());
    }

    #[test]
    fn test_parse_block_rejects_bad_output() {
        assert!(matches!(
            parse_block(&TipHash::from("A"), b"{truncated"),
            Err(TrackerError::Parse { .. })
        ));
        assert!(matches!(
            parse_block(&TipHash::from("A"), br#"{"getBlockResponse":{}}"#),
            Err(TrackerError::Parse { .. })
        ));
        assert!(matches!(
            parse_block(
                &TipHash::from("A"),
                br#"{"getBlockResponse":{"block":{"transactions":[{"outputs":[{"amount":"x"}]}]}}}"#
            ),
            Err(TrackerError::Parse { .. })
        ));
    }
}
