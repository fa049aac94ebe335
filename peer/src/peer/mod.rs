// mod.rs
//
// Copyright 2021 Stéphane Cerveau <scerveau@igalia.com>
//
// This file is part of jsonrpc-peer
//
// SPDX-License-Identifier: GPL-3.0-only

//! The peer runtime: multi-channel dispatcher, method registry, in-flight
//! call table and request/response routing.
//!
//! A peer is both caller and callee. Each registered channel owns one
//! long-lived dispatch task; every inbound request runs its handler in a
//! fresh task so a slow handler never blocks the dispatcher, and every
//! outbound send is spawned so a slow remote cannot stall it either.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use futures_util::future::BoxFuture;
use serde_json::Value;
use tokio::sync::{oneshot, RwLock};
use tracing::{debug, error, warn};
use uuid::Uuid;

use crate::channel::{ChannelRx, ChannelTx};
use crate::protocol::{Param, Parameters, Request, Response, RpcError, JSONRPC_VERSION};

/// Error type handlers may fail with; the message becomes the
/// `ServerError` reply.
pub type HandlerError = Box<dyn std::error::Error + Send + Sync>;

type MethodHandler =
    Arc<dyn Fn(HashMap<String, Param>) -> BoxFuture<'static, Result<Value, HandlerError>> + Send + Sync>;

type DisconnectHook = Box<dyn Fn(Uuid) + Send + Sync>;

struct Method {
    /// Template slots in declaration order; positional binding matches by
    /// index, by-name binding by slot name. Never mutated by dispatch.
    params: Vec<Param>,
    handler: MethodHandler,
}

struct PendingCall {
    /// Taken on first delivery; later responses with the same id are dropped
    slot: Option<oneshot::Sender<Response>>,
    /// Channel the request went out on, so removal cancels exactly the
    /// calls in flight there
    channel: Uuid,
}

/// A JSON-RPC 2.0 peer multiplexing any number of framed byte channels.
///
/// Cloning is cheap and every clone operates on the same registry, channel
/// map and in-flight call table.
#[derive(Clone)]
pub struct RpcPeer {
    methods: Arc<RwLock<HashMap<String, Method>>>,
    channels: Arc<RwLock<HashMap<Uuid, ChannelTx>>>,
    pending: Arc<RwLock<HashMap<String, PendingCall>>>,
    disconnect_hook: Arc<RwLock<Option<DisconnectHook>>>,
}

impl RpcPeer {
    pub fn new() -> Self {
        Self {
            methods: Arc::new(RwLock::new(HashMap::new())),
            channels: Arc::new(RwLock::new(HashMap::new())),
            pending: Arc::new(RwLock::new(HashMap::new())),
            disconnect_hook: Arc::new(RwLock::new(None)),
        }
    }

    /// Register a method under `name`. Registering an existing name
    /// silently replaces it.
    pub async fn register_method<F, Fut>(&self, name: &str, params: Vec<Param>, handler: F)
    where
        F: Fn(HashMap<String, Param>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Value, HandlerError>> + Send + 'static,
    {
        let handler: MethodHandler = Arc::new(move |params| Box::pin(handler(params)));
        self.methods
            .write()
            .await
            .insert(name.to_string(), Method { params, handler });
    }

    /// Remove a method; no-op if absent.
    pub async fn deregister_method(&self, name: &str) {
        self.methods.write().await.remove(name);
    }

    /// Install a callback invoked with the channel id after its inbound
    /// stream ends.
    pub async fn on_disconnect<F>(&self, hook: F)
    where
        F: Fn(Uuid) + Send + Sync + 'static,
    {
        *self.disconnect_hook.write().await = Some(Box::new(hook));
    }

    /// Register a channel pair and spawn its dispatch task.
    pub async fn add_channels(&self, chan_in: ChannelRx, chan_out: ChannelTx) -> Uuid {
        let channel_id = Uuid::new_v4();
        self.channels.write().await.insert(channel_id, chan_out);

        let peer = self.clone();
        tokio::spawn(async move {
            peer.dispatch(channel_id, chan_in).await;
        });

        debug!("channel {} registered", channel_id);
        channel_id
    }

    /// Like [`add_channels`](Self::add_channels) but runs the dispatch loop
    /// on the calling task and removes the channel on return. Intended for
    /// hosts that want to block one handler for the lifetime of a
    /// connection.
    pub async fn use_channels(&self, chan_in: ChannelRx, chan_out: ChannelTx) {
        let channel_id = Uuid::new_v4();
        self.channels.write().await.insert(channel_id, chan_out);

        self.dispatch(channel_id, chan_in).await;
        self.remove_channels(Some(channel_id)).await;
    }

    /// Remove one channel, or every channel when `None`. Callers waiting on
    /// calls routed through a removed channel are woken with
    /// `ServerError("Channel Closed")`.
    pub async fn remove_channels(&self, channel_id: Option<Uuid>) {
        match channel_id {
            Some(id) => {
                if self.channels.write().await.remove(&id).is_some() {
                    debug!("channel {} removed", id);
                }
            }
            None => self.channels.write().await.clear(),
        }
        self.cancel_pending(channel_id).await;
    }

    /// Issue a Request and await its Response.
    ///
    /// With no `channel_id` an arbitrary registered channel is used; there
    /// is no affinity across calls. Returns `ServerError("Channel Closed")`
    /// when no channel is registered or the channel goes away before the
    /// response arrives.
    pub async fn call_method(
        &self,
        channel_id: Option<Uuid>,
        method: &str,
        params: Option<Parameters>,
    ) -> Result<Value, RpcError> {
        let request = Request::new_request(method, "", params);
        let data = request.to_vec().map_err(|_| RpcError::parse_error())?;
        let id = request.id().to_string();

        let channel_id = match self.pick_channel(channel_id).await {
            Some(channel_id) => channel_id,
            None => return Err(RpcError::server_error("Channel Closed")),
        };

        let (slot, delivery) = oneshot::channel();
        self.pending.write().await.insert(
            id.clone(),
            PendingCall {
                slot: Some(slot),
                channel: channel_id,
            },
        );

        // The channel may have been removed between selection and the
        // pending insert; removals after this point wake us through the slot
        if !self.channels.read().await.contains_key(&channel_id) {
            self.pending.write().await.remove(&id);
            return Err(RpcError::server_error("Channel Closed"));
        }

        self.spawn_send(channel_id, data);

        let outcome = delivery.await;
        self.pending.write().await.remove(&id);

        match outcome {
            Ok(response) => response.into_result(),
            Err(_) => Err(RpcError::server_error("Channel Closed")),
        }
    }

    pub async fn call_method_by_name(
        &self,
        channel_id: Option<Uuid>,
        method: &str,
        params: Vec<Param>,
    ) -> Result<Value, RpcError> {
        self.call_method(channel_id, method, Some(Parameters::by_name(params)))
            .await
    }

    pub async fn call_method_by_position(
        &self,
        channel_id: Option<Uuid>,
        method: &str,
        params: Vec<Param>,
    ) -> Result<Value, RpcError> {
        self.call_method(channel_id, method, Some(Parameters::by_position(params)))
            .await
    }

    pub async fn call_method_with_none(
        &self,
        channel_id: Option<Uuid>,
        method: &str,
    ) -> Result<Value, RpcError> {
        self.call_method(channel_id, method, None).await
    }

    /// Issue a Notification. Fire-and-forget: nothing is awaited and no
    /// reply will ever arrive.
    pub async fn notify_method(
        &self,
        channel_id: Option<Uuid>,
        method: &str,
        params: Option<Parameters>,
    ) {
        let notification = Request::new_notification(method, params);
        let data = match notification.to_vec() {
            Ok(data) => data,
            Err(e) => {
                error!("failed to encode notification {}: {}", method, e);
                return;
            }
        };

        if let Some(channel_id) = self.pick_channel(channel_id).await {
            self.spawn_send(channel_id, data);
        }
    }

    pub async fn notify_method_by_name(
        &self,
        channel_id: Option<Uuid>,
        method: &str,
        params: Vec<Param>,
    ) {
        self.notify_method(channel_id, method, Some(Parameters::by_name(params)))
            .await
    }

    pub async fn notify_method_by_position(
        &self,
        channel_id: Option<Uuid>,
        method: &str,
        params: Vec<Param>,
    ) {
        self.notify_method(channel_id, method, Some(Parameters::by_position(params)))
            .await
    }

    pub async fn notify_method_with_none(&self, channel_id: Option<Uuid>, method: &str) {
        self.notify_method(channel_id, method, None).await
    }

    /// Validate the requested channel, or pick any registered one.
    async fn pick_channel(&self, channel_id: Option<Uuid>) -> Option<Uuid> {
        let channels = self.channels.read().await;
        match channel_id {
            Some(id) if channels.contains_key(&id) => Some(id),
            Some(_) => None,
            None => channels.keys().next().copied(),
        }
    }

    /// Drop the delivery slots of calls in flight on `channel_id` (all
    /// calls when `None`); their callers observe a closed slot.
    async fn cancel_pending(&self, channel_id: Option<Uuid>) {
        let mut pending = self.pending.write().await;
        for call in pending.values_mut() {
            if channel_id.is_none_or(|id| call.channel == id) {
                call.slot.take();
            }
        }
    }

    /// Per-channel dispatch loop. Exits on the end-of-stream sentinel, when
    /// the inbound source closes, or when the channel is deregistered.
    async fn dispatch(&self, channel_id: Uuid, mut chan_in: ChannelRx) {
        while let Some(message) = chan_in.recv().await {
            if !self.channels.read().await.contains_key(&channel_id) {
                debug!("channel {} deregistered, dispatch ending", channel_id);
                return;
            }
            if message.is_empty() {
                break;
            }
            self.dispatch_message(channel_id, message).await;
        }

        // Inbound stream ended: forward the sentinel, deregister, then let
        // the host know
        debug!("inbound stream ended on channel {}", channel_id);
        if let Some(chan_out) = self.channels.read().await.get(&channel_id).cloned() {
            tokio::spawn(async move {
                let _ = chan_out.send(Vec::new()).await;
            });
        }
        self.remove_channels(Some(channel_id)).await;

        if let Some(hook) = self.disconnect_hook.read().await.as_ref() {
            hook(channel_id);
        }
    }

    /// Decode one inbound message: try Request first, then Response;
    /// anything else earns a ParseError reply with a null id.
    async fn dispatch_message(&self, channel_id: Uuid, message: Vec<u8>) {
        match Request::from_slice(&message) {
            Ok(request) => {
                let peer = self.clone();
                tokio::spawn(async move {
                    peer.handle_inbound_request(channel_id, request).await;
                });
            }
            Err(_) => match Response::from_slice(&message) {
                Ok(response) => self.handle_inbound_response(channel_id, response).await,
                Err(e) => {
                    warn!("undecodable message on channel {}: {}", channel_id, e);
                    self.spawn_reply(
                        channel_id,
                        Response::new_error(String::new(), RpcError::parse_error()),
                    );
                }
            },
        }
    }

    async fn handle_inbound_request(&self, channel_id: Uuid, request: Request) {
        let suppress_reply = request.is_notification();

        if request.rpc_version() != JSONRPC_VERSION {
            debug!(
                "bad jsonrpc version {:?} for method {}",
                request.rpc_version(),
                request.method()
            );
            if !suppress_reply {
                self.send_reply(
                    channel_id,
                    Response::new_error(request.id(), RpcError::invalid_request()),
                )
                .await;
            }
            return;
        }

        let result = self.handle_request(&request).await;
        if suppress_reply {
            if let Err(e) = result {
                debug!("notification {} failed: {}", request.method(), e);
            }
            return;
        }

        let response = match result {
            Ok(value) => Response::new_success(request.id(), value),
            Err(e) => Response::new_error(request.id(), e),
        };
        self.send_reply(channel_id, response).await;
    }

    /// Look up the method, bind the incoming parameters against the
    /// template and run the handler.
    async fn handle_request(&self, request: &Request) -> Result<Value, RpcError> {
        let (templates, handler) = {
            let methods = self.methods.read().await;
            let method = methods
                .get(request.method())
                .ok_or_else(RpcError::method_not_found)?;
            (method.params.clone(), method.handler.clone())
        };

        let mut bound = HashMap::new();
        match request.params() {
            Some(params) => {
                let required = templates.iter().filter(|p| p.is_required()).count();
                if params.len() < required {
                    return Err(RpcError::invalid_params());
                }
                for (index, template) in templates.iter().enumerate() {
                    let incoming = match params {
                        Parameters::ByName(_) => params.get(template.name()),
                        Parameters::ByPosition(_) => params.get(&index.to_string()),
                    };
                    let param = template
                        .clone_with(incoming.and_then(Param::get_data))
                        .map_err(|_| RpcError::invalid_params())?;
                    bound.insert(template.name().to_string(), param);
                }
            }
            None => {
                for template in &templates {
                    let param = template
                        .clone_with(None)
                        .map_err(|_| RpcError::invalid_params())?;
                    bound.insert(template.name().to_string(), param);
                }
            }
        }

        handler(bound)
            .await
            .map_err(|e| RpcError::server_error(e.to_string()))
    }

    /// Deliver a Response to the caller waiting on its id, if any.
    async fn handle_inbound_response(&self, channel_id: Uuid, response: Response) {
        if response.rpc_version() != JSONRPC_VERSION {
            self.spawn_reply(
                channel_id,
                Response::new_error(response.id(), RpcError::invalid_request()),
            );
            return;
        }

        let mut pending = self.pending.write().await;
        match pending.get_mut(response.id()) {
            Some(call) => match call.slot.take() {
                Some(slot) => {
                    let _ = slot.send(response);
                }
                None => debug!("duplicate response for id {}", response.id()),
            },
            None => debug!("dropping response with no pending call: {}", response.id()),
        }
    }

    async fn send_reply(&self, channel_id: Uuid, response: Response) {
        match response.to_vec() {
            Ok(data) => self.send_message(channel_id, data).await,
            Err(e) => error!("failed to encode response: {}", e),
        }
    }

    fn spawn_reply(&self, channel_id: Uuid, response: Response) {
        let peer = self.clone();
        tokio::spawn(async move {
            peer.send_reply(channel_id, response).await;
        });
    }

    fn spawn_send(&self, channel_id: Uuid, data: Vec<u8>) {
        let peer = self.clone();
        tokio::spawn(async move {
            peer.send_message(channel_id, data).await;
        });
    }

    async fn send_message(&self, channel_id: Uuid, message: Vec<u8>) {
        let chan_out = self.channels.read().await.get(&channel_id).cloned();
        match chan_out {
            Some(chan_out) => {
                if chan_out.send(message).await.is_err() {
                    warn!("channel {} closed while sending", channel_id);
                }
            }
            None => debug!("no channel {} for outbound message", channel_id),
        }
    }
}

impl Default for RpcPeer {
    fn default() -> Self {
        Self::new()
    }
}
