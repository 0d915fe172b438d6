// Copyright 2025, Offchain Labs, Inc.
// For licensing, see https://github.com/OffchainLabs/stylus-sdk-rs/blob/main/licenses/COPYRIGHT.md

//! The JSON-RPC connection shared by every account provider.
//!
//! Polling (receipt waits and block subscriptions) runs on background tasks tracked by
//! [`Pollers`]. They are cleared on teardown, and whenever the node resets or reverts,
//! since either invalidates whatever they were waiting on. The reset hook sits in the
//! client's transport stack, so it fires for requests sent through any provider built on
//! the connection.

use std::{
    borrow::Cow,
    future::Future,
    sync::{Arc, Mutex, MutexGuard, PoisonError, Weak},
    task::{Context, Poll},
    time::Duration,
};

use alloy::{
    primitives::{Address, TxHash},
    providers::{Provider, RootProvider},
    rpc::{
        client::ClientBuilder,
        json_rpc::{RequestPacket, ResponsePacket, ResponsePayload},
        types::TransactionReceipt,
    },
    transports::{http::reqwest::Url, TransportError, TransportFut},
};
use serde_json::Value;
use tokio::{
    sync::{mpsc, oneshot, OnceCell},
    task::AbortHandle,
};
use tower::{Layer, Service};

use crate::{
    error::{Error, Result},
    provider::JsonRpcSigner,
};

/// Control-plane methods after which outstanding polls are stale.
const INVALIDATING_METHODS: &[&str] = &["hardhat_reset", "anvil_reset", "evm_revert", "anvil_revert"];

#[derive(Clone, Debug)]
pub struct Connection {
    provider: RootProvider,
    pollers: Arc<Pollers>,
    polling_interval: Duration,
    chain_id: Arc<OnceCell<u64>>,
}

impl Connection {
    pub fn new(url: &str, polling_interval: Duration) -> Result<Self> {
        let parsed = url.parse::<Url>().map_err(|err| Error::InvalidUrl {
            url: url.into(),
            reason: err.to_string(),
        })?;
        let pollers = Arc::<Pollers>::default();
        let client = ClientBuilder::default()
            .layer(InvalidationLayer::new(&pollers))
            .http(parsed);
        Ok(Self {
            provider: RootProvider::new(client),
            pollers,
            polling_interval,
            chain_id: Arc::default(),
        })
    }

    /// Uses a known chain id instead of querying the node for it.
    pub fn with_chain_id(self, chain_id: Option<u64>) -> Self {
        let cell = match chain_id {
            Some(id) => OnceCell::new_with(Some(id)),
            None => OnceCell::new(),
        };
        Self {
            chain_id: Arc::new(cell),
            ..self
        }
    }

    pub fn root(&self) -> &RootProvider {
        &self.provider
    }

    pub fn pollers(&self) -> &Pollers {
        &self.pollers
    }

    pub async fn chain_id(&self) -> Result<u64> {
        let id = self
            .chain_id
            .get_or_try_init(|| async { self.provider.get_chain_id().await })
            .await?;
        Ok(*id)
    }

    /// A signer that has the node sign on behalf of `address`.
    pub fn signer(&self, address: Address) -> JsonRpcSigner {
        JsonRpcSigner::new(address, self.clone())
    }

    /// Sends a raw JSON-RPC request.
    pub async fn request(&self, method: &str, params: Vec<Value>) -> Result<Value> {
        let response = self
            .provider
            .raw_request::<_, Value>(Cow::Owned(method.to_owned()), params)
            .await?;
        Ok(response)
    }

    /// Polls for the receipt of `hash` until it is mined.
    pub async fn wait_for_transaction(&self, hash: TxHash) -> Result<TransactionReceipt> {
        let (tx, rx) = oneshot::channel();
        let provider = self.provider.clone();
        let interval = self.polling_interval;
        self.pollers.spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            loop {
                ticker.tick().await;
                match provider.get_transaction_receipt(hash).await {
                    Ok(None) => continue,
                    Ok(Some(receipt)) => {
                        let _ = tx.send(Ok(receipt));
                    }
                    Err(err) => {
                        let _ = tx.send(Err(err));
                    }
                }
                return;
            }
        });
        let receipt = rx.await.map_err(|_| Error::PollingCancelled(hash))??;
        Ok(receipt)
    }

    /// Subscribes to new block numbers.
    ///
    /// The block poller starts with the first listener and stops once every listener is gone.
    pub fn on_block(&self) -> mpsc::UnboundedReceiver<u64> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.pollers.listen(tx, || {
            let provider = self.provider.clone();
            let pollers = Arc::downgrade(&self.pollers);
            tokio::spawn(poll_blocks(provider, self.polling_interval, pollers)).abort_handle()
        });
        rx
    }

    /// Stops every poller and drops every listener.
    pub fn clear_timers(&self) {
        self.pollers.clear();
    }
}

/// Clears the pollers once the node acknowledges a reset or revert.
#[derive(Clone, Debug)]
struct InvalidationLayer {
    pollers: Weak<Pollers>,
}

impl InvalidationLayer {
    fn new(pollers: &Arc<Pollers>) -> Self {
        Self {
            pollers: Arc::downgrade(pollers),
        }
    }
}

impl<S> Layer<S> for InvalidationLayer {
    type Service = InvalidationService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        InvalidationService {
            inner,
            pollers: self.pollers.clone(),
        }
    }
}

#[derive(Clone, Debug)]
struct InvalidationService<S> {
    inner: S,
    pollers: Weak<Pollers>,
}

impl<S> Service<RequestPacket> for InvalidationService<S>
where
    S: Service<RequestPacket, Response = ResponsePacket, Error = TransportError, Future = TransportFut<'static>>,
{
    type Response = ResponsePacket;
    type Error = TransportError;
    type Future = TransportFut<'static>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, request: RequestPacket) -> Self::Future {
        let invalidating = invalidating_method(&request);
        let response = self.inner.call(request);
        let Some(method) = invalidating else {
            return response;
        };
        let pollers = self.pollers.clone();
        Box::pin(async move {
            let response = response.await?;
            if acknowledged(&response) {
                if let Some(pollers) = pollers.upgrade() {
                    log::debug!("{method} invalidated outstanding polls");
                    pollers.clear();
                }
            }
            Ok(response)
        })
    }
}

fn invalidating_method(request: &RequestPacket) -> Option<String> {
    let invalidating = |method: &str| INVALIDATING_METHODS.contains(&method);
    match request {
        RequestPacket::Single(request) => Some(request.method()).filter(|&m| invalidating(m)),
        RequestPacket::Batch(requests) => requests.iter().map(|r| r.method()).find(|&m| invalidating(m)),
    }
    .map(str::to_owned)
}

/// Whether any response succeeded. `evm_revert` answers `false` for an unknown snapshot.
fn acknowledged(response: &ResponsePacket) -> bool {
    let success = |payload: &ResponsePayload| match payload {
        ResponsePayload::Success(result) => result.get() != "false",
        ResponsePayload::Failure(_) => false,
    };
    match response {
        ResponsePacket::Single(response) => success(&response.payload),
        ResponsePacket::Batch(responses) => responses.iter().any(|r| success(&r.payload)),
    }
}

async fn poll_blocks(provider: RootProvider, interval: Duration, pollers: Weak<Pollers>) {
    let mut ticker = tokio::time::interval(interval);
    let mut last = None;
    loop {
        ticker.tick().await;
        let number = match provider.get_block_number().await {
            Ok(number) => number,
            Err(err) => {
                log::debug!("block poll failed: {err}");
                continue;
            }
        };
        let Some(pollers) = pollers.upgrade() else {
            return;
        };
        if last != Some(number) {
            last = Some(number);
            if pollers.emit(number) == 0 {
                return;
            }
        }
    }
}

/// Background polling tasks and the listeners they feed.
#[derive(Debug, Default)]
pub struct Pollers {
    state: Mutex<PollerState>,
}

#[derive(Debug, Default)]
struct PollerState {
    tasks: Vec<AbortHandle>,
    block_poller: Option<AbortHandle>,
    listeners: Vec<mpsc::UnboundedSender<u64>>,
}

impl Pollers {
    pub fn spawn<F>(&self, task: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let handle = tokio::spawn(task).abort_handle();
        let mut state = self.lock();
        state.tasks.retain(|task| !task.is_finished());
        state.tasks.push(handle);
    }

    /// Number of pollers that have not been cleared or finished.
    pub fn active(&self) -> usize {
        let state = self.lock();
        state
            .tasks
            .iter()
            .chain(&state.block_poller)
            .filter(|task| !task.is_finished())
            .count()
    }

    pub fn listeners(&self) -> usize {
        self.lock().listeners.len()
    }

    /// Aborts every poller and drops every listener. Safe to call repeatedly.
    pub fn clear(&self) {
        let mut guard = self.lock();
        let state = &mut *guard;
        for task in state.tasks.drain(..).chain(state.block_poller.take()) {
            task.abort();
        }
        state.listeners.clear();
    }

    /// Registers a listener, starting the block poller if it is not running.
    fn listen(&self, listener: mpsc::UnboundedSender<u64>, start: impl FnOnce() -> AbortHandle) {
        let mut state = self.lock();
        state.listeners.retain(|listener| !listener.is_closed());
        state.listeners.push(listener);
        if state.block_poller.as_ref().map_or(true, AbortHandle::is_finished) {
            state.block_poller = Some(start());
        }
    }

    /// Sends `number` to every open listener, returning how many remain.
    fn emit(&self, number: u64) -> usize {
        let mut state = self.lock();
        state.listeners.retain(|listener| listener.send(number).is_ok());
        state.listeners.len()
    }

    fn lock(&self) -> MutexGuard<'_, PollerState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
