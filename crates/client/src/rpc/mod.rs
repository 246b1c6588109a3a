// Copyright (C) 2026 Parity Technologies (UK) Ltd.
// SPDX-License-Identifier: GPL-3.0-or-later

//! JSON-RPC 2.0 over a persistent WebSocket.

mod session;
mod transport;
mod types;

pub use session::{
    LoadedMetadata, RpcSession, SessionError, SessionState, SubscriptionCallback,
    SubscriptionHandle,
};
pub use transport::{Loopback, Transport};
pub use types::{
    Health, RpcErrorObject, RpcMessage, RpcRequest, RpcResponse, RuntimeVersion,
    SubscriptionParams, SystemInfo, TransactionStatus,
};
