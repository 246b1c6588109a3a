// Copyright (C) 2026 Parity Technologies (UK) Ltd.
// SPDX-License-Identifier: GPL-3.0-or-later

use crate::consts::{DEFAULT_SS58_FORMAT, JSONRPC_VERSION};
use crate::types::BlockHash;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// Outgoing JSON-RPC 2.0 request.
#[derive(Debug, Clone, Serialize)]
pub struct RpcRequest<'a> {
    pub jsonrpc: &'static str,
    pub id: &'a str,
    pub method: &'a str,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub params: Vec<JsonValue>,
}

impl<'a> RpcRequest<'a> {
    pub fn new(id: &'a str, method: &'a str, params: Vec<JsonValue>) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION,
            id,
            method,
            params,
        }
    }
}

/// Any message arriving from the node: a response (`id` set) or a
/// subscription push (`method` and `params` set).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RpcMessage {
    #[serde(default)]
    pub id: Option<JsonValue>,
    #[serde(default)]
    pub method: Option<String>,
    #[serde(default)]
    pub params: Option<SubscriptionParams>,
    #[serde(default)]
    pub result: Option<JsonValue>,
    #[serde(default)]
    pub error: Option<RpcErrorObject>,
}

impl RpcMessage {
    /// Request id as a string, whether the node echoed it as a string or a number.
    pub fn id(&self) -> Option<String> {
        self.id.as_ref().and_then(id_string)
    }

    /// Subscription this push belongs to.
    pub fn subscription(&self) -> Option<String> {
        self.params.as_ref().and_then(|p| id_string(&p.subscription))
    }

    pub fn into_response(self) -> RpcResponse {
        RpcResponse {
            result: self.result,
            error: self.error,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SubscriptionParams {
    pub subscription: JsonValue,
    #[serde(default)]
    pub result: JsonValue,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RpcErrorObject {
    pub code: i64,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<JsonValue>,
}

/// Payload a one-shot request resolves with.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RpcResponse {
    pub result: Option<JsonValue>,
    pub error: Option<RpcErrorObject>,
}

/// Subscription and request ids may be strings or numbers on the wire.
pub(crate) fn id_string(id: &JsonValue) -> Option<String> {
    match id {
        JsonValue::String(s) => Some(s.clone()),
        JsonValue::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuntimeVersion {
    pub spec_name: String,
    pub impl_name: String,
    #[serde(default)]
    pub authoring_version: u32,
    pub spec_version: u32,
    #[serde(default)]
    pub impl_version: u32,
    pub transaction_version: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Health {
    pub peers: u64,
    pub is_syncing: bool,
    pub should_have_peers: bool,
}

/// Results of the `system_*` startup queries.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SystemInfo {
    pub name: String,
    pub version: String,
    pub chain: String,
    pub properties: serde_json::Map<String, JsonValue>,
    pub health: Health,
}

impl SystemInfo {
    /// SS58 address prefix declared by the chain.
    pub fn ss58_format(&self) -> u16 {
        self.properties
            .get("ss58Format")
            .and_then(JsonValue::as_u64)
            .and_then(|n| u16::try_from(n).ok())
            .unwrap_or(DEFAULT_SS58_FORMAT)
    }

    pub fn token_symbol(&self) -> Option<&str> {
        match self.properties.get("tokenSymbol")? {
            JsonValue::String(s) => Some(s),
            JsonValue::Array(symbols) => symbols.first()?.as_str(),
            _ => None,
        }
    }
}

/// Status pushed by `author_submitAndWatchExtrinsic`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TransactionStatus {
    Future,
    Ready,
    Broadcast(Vec<String>),
    InBlock(BlockHash),
    Retracted(BlockHash),
    FinalityTimeout(BlockHash),
    Finalized(BlockHash),
    Usurped(BlockHash),
    Dropped,
    Invalid,
}

impl TransactionStatus {
    /// No further status updates follow this one.
    pub fn is_final(&self) -> bool {
        matches!(
            self,
            TransactionStatus::Finalized(_)
                | TransactionStatus::FinalityTimeout(_)
                | TransactionStatus::Usurped(_)
                | TransactionStatus::Dropped
                | TransactionStatus::Invalid
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_serialization() {
        let request = RpcRequest::new("metadata", "state_getMetadata", vec![]);
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({"jsonrpc": "2.0", "id": "metadata", "method": "state_getMetadata"})
        );

        let request = RpcRequest::new("1f", "chain_getBlockHash", vec![json!(0)]);
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({"jsonrpc": "2.0", "id": "1f", "method": "chain_getBlockHash", "params": [0]})
        );
    }

    #[test]
    fn test_message_ids() {
        let response: RpcMessage =
            serde_json::from_value(json!({"jsonrpc": "2.0", "id": 7, "result": "0x00"})).unwrap();
        assert_eq!(response.id(), Some("7".to_string()));
        assert_eq!(response.subscription(), None);

        let push: RpcMessage = serde_json::from_value(json!({
            "jsonrpc": "2.0",
            "method": "author_extrinsicUpdate",
            "params": {"subscription": "abc", "result": "ready"}
        }))
        .unwrap();
        assert_eq!(push.id(), None);
        assert_eq!(push.subscription(), Some("abc".to_string()));
    }

    #[test]
    fn test_error_response() {
        let message: RpcMessage = serde_json::from_value(json!({
            "jsonrpc": "2.0",
            "id": "x",
            "error": {"code": 1010, "message": "Invalid Transaction"}
        }))
        .unwrap();
        let response = message.into_response();
        assert_eq!(response.result, None);
        assert_eq!(response.error.unwrap().code, 1010);
    }

    #[test]
    fn test_system_info_ss58_format() {
        let mut info = SystemInfo::default();
        assert_eq!(info.ss58_format(), 42);

        info.properties.insert("ss58Format".to_string(), json!(0));
        info.properties.insert("tokenSymbol".to_string(), json!(["DOT"]));
        assert_eq!(info.ss58_format(), 0);
        assert_eq!(info.token_symbol(), Some("DOT"));
    }

    #[test]
    fn test_runtime_version() {
        let version: RuntimeVersion = serde_json::from_value(json!({
            "specName": "westend",
            "implName": "parity-westend",
            "authoringVersion": 2,
            "specVersion": 1017001,
            "implVersion": 0,
            "apis": [],
            "transactionVersion": 27,
            "stateVersion": 1
        }))
        .unwrap();
        assert_eq!(version.impl_name, "parity-westend");
        assert_eq!(version.spec_version, 1017001);
        assert_eq!(version.transaction_version, 27);
    }

    #[test]
    fn test_transaction_status() {
        let hash = format!("0x{}", "ab".repeat(32));

        let ready: TransactionStatus = serde_json::from_value(json!("ready")).unwrap();
        assert_eq!(ready, TransactionStatus::Ready);
        assert!(!ready.is_final());

        let in_block: TransactionStatus =
            serde_json::from_value(json!({ "inBlock": hash })).unwrap();
        assert!(matches!(in_block, TransactionStatus::InBlock(_)));
        assert!(!in_block.is_final());

        let finalized: TransactionStatus =
            serde_json::from_value(json!({ "finalized": hash })).unwrap();
        assert!(finalized.is_final());

        let broadcast: TransactionStatus =
            serde_json::from_value(json!({ "broadcast": ["12D3KooW"] })).unwrap();
        assert_eq!(broadcast, TransactionStatus::Broadcast(vec!["12D3KooW".to_string()]));
    }
}
