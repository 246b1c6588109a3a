// Copyright (C) 2026 Parity Technologies (UK) Ltd.
// SPDX-License-Identifier: GPL-3.0-or-later

//! One long-lived JSON-RPC session with a node.
//!
//! A single routing task owns the incoming side of the connection and
//! dispatches each message, in priority order, to:
//!
//! 1. the startup `system_*` queries (fixed ids),
//! 2. runtime version pushes, which trigger a metadata load,
//! 3. the metadata fetch (fixed id),
//! 4. pending one-shot requests (random ids),
//! 5. subscription callbacks.
//!
//! Callers suspend on channels woken by the routing task. Nothing here times
//! out, and a dropped connection leaves pending requests and subscriptions
//! unresolved; build a new session to recover.
//!
//! The routing task only holds a weak reference: dropping the last
//! [`RpcSession`] handle closes the connection, as does [`RpcSession::close`].

use super::transport::Transport;
use super::types::{RpcMessage, RpcRequest, RpcResponse, RuntimeVersion, SystemInfo};
use crate::cache::MetadataCache;
use crate::consts::{
    METADATA_REQUEST_ID, SYSTEM_QUERIES, VERSION_SUBSCRIPTION_ID,
    methods::{STATE_GET_METADATA, STATE_RUNTIME_VERSION, STATE_SUBSCRIBE_RUNTIME_VERSION},
};
use crate::extrinsic;
use crate::metadata::{Metadata, MetadataError, MetadataParser, metadata_bytes_from_hex};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use serde::de::DeserializeOwned;
use serde_json::Value as JsonValue;
use std::sync::{Arc, Mutex, Weak};
use std::time::Instant;
use thiserror::Error;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("WebSocket error: {0}")]
    WebSocket(Box<tokio_tungstenite::tungstenite::Error>),

    #[error("Connection closed")]
    Closed,

    #[error("RPC error {code}: {message}")]
    Rpc { code: i64, message: String },

    #[error("Unexpected response to {method}: {detail}")]
    UnexpectedResponse { method: String, detail: String },
}

impl From<tokio_tungstenite::tungstenite::Error> for SessionError {
    fn from(err: tokio_tungstenite::tungstenite::Error) -> Self {
        SessionError::WebSocket(Box::new(err))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Disconnected,
    Connecting,
    Connected,
    AwaitingMetadata,
    Ready { signing_capable: bool },
}

/// Parsed metadata of the current runtime.
#[derive(Debug)]
pub struct LoadedMetadata {
    pub metadata: Metadata,
    /// Every declared signed extension is one the extrinsic builder can fill in.
    pub signing_capable: bool,
}

pub type SubscriptionCallback = Arc<dyn Fn(JsonValue) + Send + Sync>;

enum Pending {
    Call(oneshot::Sender<RpcResponse>),
    /// The callback is registered by the router together with the response,
    /// so pushes that immediately follow it are not lost.
    Subscribe {
        tx: oneshot::Sender<RpcResponse>,
        callback: SubscriptionCallback,
    },
}

struct SessionInner {
    /// `None` until a transport is attached and after [`RpcSession::close`].
    outgoing: Mutex<Option<mpsc::UnboundedSender<String>>>,
    router: Mutex<Option<JoinHandle<()>>>,
    pending: DashMap<String, Pending>,
    subscriptions: DashMap<String, SubscriptionCallback>,
    system: DashMap<String, JsonValue>,
    system_updates: watch::Sender<usize>,
    runtime_version: watch::Sender<Option<Arc<RuntimeVersion>>>,
    metadata: watch::Sender<Option<Arc<LoadedMetadata>>>,
    state: watch::Sender<SessionState>,
    parser: Arc<dyn MetadataParser>,
    cache: MetadataCache,
}

/// Handle to a session; clones share the same connection.
#[derive(Clone)]
pub struct RpcSession {
    inner: Arc<SessionInner>,
}

impl RpcSession {
    /// Connect to `url` and start the session.
    pub async fn connect(
        url: &str,
        parser: Arc<dyn MetadataParser>,
        cache: MetadataCache,
    ) -> Result<Self, SessionError> {
        let session = Self::detached(parser, cache);
        session.open(url).await?;
        Ok(session)
    }

    /// Start a session over an established transport: subscribe to runtime
    /// version changes and spawn the routing task.
    pub fn new(transport: Transport, parser: Arc<dyn MetadataParser>, cache: MetadataCache) -> Self {
        let session = Self::detached(parser, cache);
        session.attach(transport);
        session
    }

    /// A session in the [`SessionState::Connecting`] state with no transport
    /// yet. Requests fail with [`SessionError::Closed`] until one is attached.
    pub fn detached(parser: Arc<dyn MetadataParser>, cache: MetadataCache) -> Self {
        let inner = Arc::new(SessionInner {
            outgoing: Mutex::new(None),
            router: Mutex::new(None),
            pending: DashMap::new(),
            subscriptions: DashMap::new(),
            system: DashMap::new(),
            system_updates: watch::Sender::new(0),
            runtime_version: watch::Sender::new(None),
            metadata: watch::Sender::new(None),
            state: watch::Sender::new(SessionState::Connecting),
            parser,
            cache,
        });

        Self { inner }
    }

    /// Open a WebSocket connection to `url` and attach it.
    pub async fn open(&self, url: &str) -> Result<(), SessionError> {
        self.inner.set_state(SessionState::Connecting);
        let transport = Transport::connect(url).await.inspect_err(|e| {
            tracing::warn!("Failed to connect to {}: {}", url, e);
            self.inner.set_state(SessionState::Disconnected);
        })?;
        tracing::info!("Connected to {}", url);
        self.attach(transport);
        Ok(())
    }

    /// Route `transport` through this session, replacing any previous one.
    pub fn attach(&self, transport: Transport) {
        let Transport {
            outgoing,
            mut incoming,
        } = transport;
        self.inner.replace_outgoing(Some(outgoing));

        match self
            .inner
            .send(VERSION_SUBSCRIPTION_ID, STATE_SUBSCRIBE_RUNTIME_VERSION, vec![])
        {
            Ok(()) => self.inner.set_state(SessionState::Connected),
            Err(_) => self.inner.set_state(SessionState::Disconnected),
        }

        let session = Arc::downgrade(&self.inner);
        let router = tokio::spawn(async move {
            while let Some(text) = incoming.recv().await {
                let Some(inner) = session.upgrade() else {
                    return;
                };
                inner.route(&text);
            }
            if let Some(inner) = session.upgrade() {
                tracing::warn!("Connection to node lost");
                inner.set_state(SessionState::Disconnected);
            }
        });

        if let Some(previous) = self.inner.replace_router(Some(router)) {
            previous.abort();
        }
    }

    /// Close the connection. Pending requests fail with
    /// [`SessionError::Closed`] and every subscription is dropped.
    pub fn close(&self) {
        self.inner.replace_outgoing(None);
        if let Some(router) = self.inner.replace_router(None) {
            router.abort();
        }
        self.inner.pending.clear();
        self.inner.subscriptions.clear();
        self.inner.set_state(SessionState::Disconnected);
        tracing::debug!("Session closed");
    }

    pub fn state(&self) -> SessionState {
        *self.inner.state.borrow()
    }

    /// Send a one-shot request and wait for its response.
    pub async fn request(
        &self,
        method: &str,
        params: Vec<JsonValue>,
    ) -> Result<RpcResponse, SessionError> {
        let (tx, rx) = oneshot::channel();
        let id = self.inner.register(Pending::Call(tx));
        self.inner.send_or_forget(&id, method, params)?;
        rx.await.map_err(|_| SessionError::Closed)
    }

    /// [`request`](Self::request), keeping only a successful result. A `null`
    /// result is returned as [`JsonValue::Null`].
    pub async fn request_result(
        &self,
        method: &str,
        params: Vec<JsonValue>,
    ) -> Result<JsonValue, SessionError> {
        into_result(self.request(method, params).await?)
    }

    /// [`request_result`](Self::request_result) deserialized into `T`.
    pub async fn request_as<T: DeserializeOwned>(
        &self,
        method: &str,
        params: Vec<JsonValue>,
    ) -> Result<T, SessionError> {
        let result = self.request_result(method, params).await?;
        serde_json::from_value(result).map_err(|e| SessionError::UnexpectedResponse {
            method: method.to_string(),
            detail: e.to_string(),
        })
    }

    /// Issue a subscribing request. `callback` receives the `result` of every
    /// push for the returned subscription until it is unsubscribed.
    pub async fn subscribe(
        &self,
        method: &str,
        params: Vec<JsonValue>,
        callback: SubscriptionCallback,
    ) -> Result<SubscriptionHandle, SessionError> {
        let (tx, rx) = oneshot::channel();
        let id = self.inner.register(Pending::Subscribe { tx, callback });
        self.inner.send_or_forget(&id, method, params)?;

        let result = into_result(rx.await.map_err(|_| SessionError::Closed)?)?;
        let subscription =
            super::types::id_string(&result).ok_or_else(|| SessionError::UnexpectedResponse {
                method: method.to_string(),
                detail: format!("subscription id {}", result),
            })?;

        Ok(SubscriptionHandle {
            id: subscription,
            session: Arc::downgrade(&self.inner),
        })
    }

    /// Refresh [`SystemInfo`] by issuing every `system_*` query and waiting
    /// until all of them have been answered.
    pub async fn update(&self) -> Result<SystemInfo, SessionError> {
        let start = Instant::now();
        self.inner.system_updates.send_replace(0);
        for (id, method) in SYSTEM_QUERIES {
            self.inner.send(id, method, vec![])?;
        }

        let mut updates = self.inner.system_updates.subscribe();
        updates
            .wait_for(|n| *n >= SYSTEM_QUERIES.len())
            .await
            .map_err(|_| SessionError::Closed)?;
        tracing::info!("Updating system info took {:?}", start.elapsed());

        Ok(self.system())
    }

    /// Last known system info; fields not yet answered keep their defaults.
    pub fn system(&self) -> SystemInfo {
        let fields: serde_json::Map<String, JsonValue> = self
            .inner
            .system
            .iter()
            .filter(|entry| !entry.value().is_null())
            .map(|entry| (entry.key().clone(), entry.value().clone()))
            .collect();

        serde_json::from_value(JsonValue::Object(fields)).unwrap_or_else(|e| {
            tracing::warn!("Unexpected system info: {}", e);
            SystemInfo::default()
        })
    }

    /// Runtime version, waiting for the first push if necessary.
    pub async fn runtime_version(&self) -> Result<Arc<RuntimeVersion>, SessionError> {
        wait_populated(&self.inner.runtime_version, "runtime version").await
    }

    /// Metadata of the current runtime, waiting for it to load if necessary.
    pub async fn metadata(&self) -> Result<Arc<LoadedMetadata>, SessionError> {
        wait_populated(&self.inner.metadata, "FRAME metadata").await
    }

    /// Metadata if already loaded.
    pub fn current_metadata(&self) -> Option<Arc<LoadedMetadata>> {
        self.inner.metadata.borrow().clone()
    }

    pub fn subscription_count(&self) -> usize {
        self.inner.subscriptions.len()
    }

    pub fn pending_count(&self) -> usize {
        self.inner.pending.len()
    }
}

impl std::fmt::Debug for RpcSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RpcSession")
            .field("state", &self.state())
            .field("pending", &self.pending_count())
            .field("subscriptions", &self.subscription_count())
            .finish()
    }
}

/// Removes its subscription from the session on [`unsubscribe`](Self::unsubscribe).
#[derive(Debug, Clone)]
pub struct SubscriptionHandle {
    id: String,
    session: Weak<SessionInner>,
}

impl SubscriptionHandle {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn unsubscribe(&self) {
        if let Some(inner) = self.session.upgrade() {
            inner.subscriptions.remove(&self.id);
        }
    }
}

fn into_result(response: RpcResponse) -> Result<JsonValue, SessionError> {
    if let Some(error) = response.error {
        return Err(SessionError::Rpc {
            code: error.code,
            message: error.message,
        });
    }
    Ok(response.result.unwrap_or(JsonValue::Null))
}

async fn wait_populated<T>(
    sender: &watch::Sender<Option<Arc<T>>>,
    what: &str,
) -> Result<Arc<T>, SessionError> {
    if let Some(value) = sender.borrow().clone() {
        return Ok(value);
    }

    let start = Instant::now();
    let mut rx = sender.subscribe();
    let value = rx
        .wait_for(Option::is_some)
        .await
        .map_err(|_| SessionError::Closed)?
        .clone()
        .ok_or(SessionError::Closed)?;
    tracing::info!("Fetching {} took {:?}", what, start.elapsed());
    Ok(value)
}

impl SessionInner {
    fn send(&self, id: &str, method: &str, params: Vec<JsonValue>) -> Result<(), SessionError> {
        let request = RpcRequest::new(id, method, params);
        let text = serde_json::to_string(&request).map_err(|e| SessionError::UnexpectedResponse {
            method: method.to_string(),
            detail: e.to_string(),
        })?;
        tracing::trace!("-> {}", text);
        let outgoing = self.outgoing.lock().map_err(|_| SessionError::Closed)?;
        match outgoing.as_ref() {
            Some(outgoing) => outgoing.send(text).map_err(|_| SessionError::Closed),
            None => Err(SessionError::Closed),
        }
    }

    fn replace_outgoing(
        &self,
        outgoing: Option<mpsc::UnboundedSender<String>>,
    ) -> Option<mpsc::UnboundedSender<String>> {
        match self.outgoing.lock() {
            Ok(mut current) => std::mem::replace(&mut *current, outgoing),
            Err(poisoned) => std::mem::replace(&mut *poisoned.into_inner(), outgoing),
        }
    }

    fn replace_router(&self, router: Option<JoinHandle<()>>) -> Option<JoinHandle<()>> {
        match self.router.lock() {
            Ok(mut current) => std::mem::replace(&mut *current, router),
            Err(poisoned) => std::mem::replace(&mut *poisoned.into_inner(), router),
        }
    }

    /// Send under a registered id, dropping the registration if sending fails.
    fn send_or_forget(
        &self,
        id: &str,
        method: &str,
        params: Vec<JsonValue>,
    ) -> Result<(), SessionError> {
        self.send(id, method, params).inspect_err(|_| {
            self.pending.remove(id);
        })
    }

    /// Track `pending` under a fresh random id.
    fn register(&self, pending: Pending) -> String {
        loop {
            let id = format!("{:016x}", rand::random::<u64>());
            if let Entry::Vacant(entry) = self.pending.entry(id.clone()) {
                entry.insert(pending);
                return id;
            }
        }
    }

    fn set_state(&self, state: SessionState) {
        tracing::debug!("Session state: {:?}", state);
        self.state.send_replace(state);
    }

    fn route(&self, text: &str) {
        tracing::trace!("<- {}", text);
        let message: RpcMessage = match serde_json::from_str(text) {
            Ok(message) => message,
            Err(e) => {
                tracing::warn!("Ignoring malformed message ({}): {}", e, text);
                return;
            }
        };
        let id = message.id();

        if let Some(id) = &id
            && SYSTEM_QUERIES.iter().any(|(key, _)| key == id)
        {
            let value = match (&message.result, &message.error) {
                (Some(result), _) => result.clone(),
                (None, Some(error)) => {
                    tracing::warn!("system query {} failed: {}", id, error.message);
                    JsonValue::Null
                }
                (None, None) => JsonValue::Null,
            };
            self.system.insert(id.clone(), value);
            self.system_updates.send_modify(|n| *n += 1);
            return;
        }

        if message.method.as_deref() == Some(STATE_RUNTIME_VERSION) {
            let result = message.params.map(|p| p.result).unwrap_or_default();
            match serde_json::from_value::<RuntimeVersion>(result) {
                Ok(version) => self.on_runtime_version(version),
                Err(e) => tracing::warn!("Invalid runtime version push: {}", e),
            }
            return;
        }

        if id.as_deref() == Some(VERSION_SUBSCRIPTION_ID) {
            return;
        }

        if id.as_deref() == Some(METADATA_REQUEST_ID) {
            self.on_metadata_response(message);
            return;
        }

        if let Some(id) = &id
            && let Some((_, pending)) = self.pending.remove(id)
        {
            let response = message.into_response();
            match pending {
                Pending::Call(tx) => {
                    let _ = tx.send(response);
                }
                Pending::Subscribe { tx, callback } => {
                    if let Some(subscription) =
                        response.result.as_ref().and_then(super::types::id_string)
                    {
                        self.subscriptions.insert(subscription, callback);
                    }
                    let _ = tx.send(response);
                }
            }
            return;
        }

        if let Some(subscription) = message.subscription() {
            let callback = self
                .subscriptions
                .get(&subscription)
                .map(|entry| entry.value().clone());
            if let Some(callback) = callback {
                let result = message.params.map(|p| p.result).unwrap_or_default();
                callback(result);
            } else {
                tracing::debug!("Push for unknown subscription {}", subscription);
            }
            return;
        }

        tracing::warn!("Unhandled message: {}", text);
    }

    fn on_runtime_version(&self, version: RuntimeVersion) {
        tracing::info!(
            "Runtime {} version {} (transaction version {})",
            version.impl_name,
            version.spec_version,
            version.transaction_version
        );

        let cached = self.cache.get(&version.impl_name, version.spec_version);
        let impl_name = version.impl_name.clone();
        self.runtime_version.send_replace(Some(Arc::new(version)));

        if let Some(metadata_hex) = cached {
            match self.load_metadata(&metadata_hex) {
                Ok(loaded) => {
                    tracing::debug!("Using cached metadata for {}", impl_name);
                    self.publish_metadata(loaded);
                    return;
                }
                Err(e) => tracing::warn!("Cached metadata is unusable: {}", e),
            }
        }

        self.set_state(SessionState::AwaitingMetadata);
        if let Err(e) = self.send(METADATA_REQUEST_ID, STATE_GET_METADATA, vec![]) {
            tracing::warn!("Failed to request metadata: {}", e);
        }
    }

    fn on_metadata_response(&self, message: RpcMessage) {
        let Some(JsonValue::String(metadata_hex)) = message.result else {
            tracing::warn!("Metadata request failed: {:?}", message.error);
            return;
        };

        let loaded = match self.load_metadata(&metadata_hex) {
            Ok(loaded) => loaded,
            Err(e) => {
                tracing::warn!("Failed to load metadata: {}", e);
                return;
            }
        };

        let version = self.runtime_version.borrow().clone();
        if let Some(version) = version
            && let Err(e) =
                self.cache
                    .replace(&version.impl_name, version.spec_version, &metadata_hex)
        {
            tracing::warn!("Failed to cache metadata: {}", e);
        }

        self.publish_metadata(loaded);
    }

    fn load_metadata(&self, metadata_hex: &str) -> Result<LoadedMetadata, MetadataError> {
        let bytes = metadata_bytes_from_hex(metadata_hex)?;
        let metadata = self.parser.parse(&bytes)?;
        let signing_capable = extrinsic::signing_capable(&metadata.signing.extensions);
        Ok(LoadedMetadata {
            metadata,
            signing_capable,
        })
    }

    fn publish_metadata(&self, loaded: LoadedMetadata) {
        let signing_capable = loaded.signing_capable;
        self.metadata.send_replace(Some(Arc::new(loaded)));
        self.set_state(SessionState::Ready { signing_capable });
    }
}
