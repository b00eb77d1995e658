//! Publisher and subscriber endpoints for a publish/subscribe transport.
//!
//! The transport itself (connecting, reconnecting, delivery threads) is provided by the
//! application through [Transport]. A [Connection] owns the transport and routes inbound
//! deliveries to registered [MessageHandler]s by topic. [Subscriber] decodes deliveries and
//! queues the decoded values so application code can poll for them from any thread.
use std::marker::PhantomData;
use std::sync::Arc;

use crossbeam::channel::{bounded, unbounded, Receiver, Sender, TrySendError};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};
use typed_builder::TypedBuilder;

use crate::codec::{self, Encoding, Message};
use crate::error::{Error, Result};

/// Publish/subscribe transport.
pub trait Transport: Send + Sync {
    /// Send `payload` on `topic`.
    ///
    /// # Errors
    /// [Error::Transport] if the transport could not accept the message.
    fn publish(&self, topic: &str, payload: &[u8]) -> Result<()>;

    /// Request deliveries for `topic`.
    ///
    /// # Errors
    /// [Error::Transport] if the subscription could not be made.
    fn subscribe(&self, topic: &str) -> Result<()>;
}

/// Receives connection and message callbacks for a single topic.
pub trait MessageHandler: Send + Sync {
    fn topic(&self) -> &str;

    /// Called each time the transport (re)connects. Subscribes to [MessageHandler::topic] by
    /// default.
    ///
    /// # Errors
    /// Any error from the transport.
    fn on_connect(&self, transport: &dyn Transport) -> Result<()> {
        transport.subscribe(self.topic())
    }

    /// Called with each payload delivered on [MessageHandler::topic].
    fn on_message(&self, topic: &str, payload: &[u8]);
}

/// Endpoint configuration.
#[derive(TypedBuilder, Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
pub struct BridgeOpts {
    #[builder(default)]
    pub encoding: Encoding,
    /// Topic to use instead of the standard topic for the message kind.
    #[builder(default, setter(strip_option, into))]
    pub topic: Option<String>,
    /// Maximum number of queued messages for a subscriber. Unbounded if `None`.
    #[builder(default, setter(strip_option))]
    pub capacity: Option<usize>,
}

impl BridgeOpts {
    fn topic_for<M: Message>(&self) -> String {
        self.topic
            .clone()
            .unwrap_or_else(|| M::KIND.topic().to_string())
    }
}

/// Encodes messages of kind `M` and publishes them.
#[derive(Debug, Clone)]
pub struct Publisher<M: Message> {
    topic: String,
    encoding: Encoding,
    kind: PhantomData<fn(&M)>,
}

impl<M: Message> Publisher<M> {
    #[must_use]
    pub fn new(opts: &BridgeOpts) -> Self {
        Publisher {
            topic: opts.topic_for::<M>(),
            encoding: opts.encoding,
            kind: PhantomData,
        }
    }

    #[must_use]
    pub fn topic(&self) -> &str {
        &self.topic
    }

    /// Encode `msg` and publish it on our topic.
    ///
    /// # Errors
    /// [Error::Encode] if `msg` cannot be encoded, or any error from the transport.
    pub fn publish(&self, transport: &dyn Transport, msg: &M) -> Result<()> {
        let payload = codec::encode(msg, self.encoding)?;
        trace!(topic = %self.topic, len = payload.len(), "publishing");
        transport.publish(&self.topic, payload.as_bytes())
    }
}

/// Decodes messages of kind `M` delivered on its topic and queues them in arrival order.
///
/// Messages that fail to decode are logged and dropped. When a capacity is configured and
/// the queue is full, the newest message is dropped.
#[derive(Debug)]
pub struct Subscriber<M: Message> {
    topic: String,
    encoding: Encoding,
    tx: Sender<M>,
    rx: Receiver<M>,
}

impl<M: Message + Send> Subscriber<M> {
    /// # Errors
    /// [Error::Config] if a capacity of 0 is configured.
    pub fn new(opts: &BridgeOpts) -> Result<Self> {
        let (tx, rx) = match opts.capacity {
            Some(0) => return Err(Error::Config("subscriber capacity must be > 0".into())),
            Some(cap) => bounded(cap),
            None => unbounded(),
        };
        Ok(Subscriber {
            topic: opts.topic_for::<M>(),
            encoding: opts.encoding,
            tx,
            rx,
        })
    }

    /// Oldest queued message, if any. Never blocks.
    #[must_use]
    pub fn get(&self) -> Option<M> {
        self.rx.try_recv().ok()
    }

    /// Newest queued message, if any, discarding all older queued messages.
    #[must_use]
    pub fn latest(&self) -> Option<M> {
        self.rx.try_iter().last()
    }

    /// All queued messages, oldest first.
    #[must_use]
    pub fn drain(&self) -> Vec<M> {
        self.rx.try_iter().collect()
    }

    /// Number of queued messages.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rx.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rx.is_empty()
    }
}

impl<M: Message + Send> MessageHandler for Subscriber<M> {
    fn topic(&self) -> &str {
        &self.topic
    }

    fn on_message(&self, topic: &str, payload: &[u8]) {
        if topic != self.topic {
            trace!(topic, expected = %self.topic, "ignoring message for other topic");
            return;
        }
        let Ok(text) = std::str::from_utf8(payload) else {
            warn!(topic, "dropping non-UTF-8 payload");
            return;
        };
        let Some(msg) = codec::decode::<M>(text, self.encoding).ok() else {
            debug!(topic, "dropping undecodable message");
            return;
        };
        match self.tx.try_send(msg) {
            Ok(()) => trace!(topic, queued = self.tx.len(), "queued message"),
            Err(TrySendError::Full(_)) => warn!(topic, "subscriber queue full, dropping message"),
            // we hold the receiver, so this cannot happen
            Err(TrySendError::Disconnected(_)) => {}
        }
    }
}

/// Owns a [Transport] and the handlers interested in its deliveries.
pub struct Connection<T: Transport> {
    transport: T,
    handlers: Vec<Arc<dyn MessageHandler>>,
}

impl<T: Transport> Connection<T> {
    pub fn new(transport: T) -> Self {
        Connection {
            transport,
            handlers: Vec::default(),
        }
    }

    /// Register a handler. It will receive `on_connect` on the next [Connection::connect].
    pub fn register(&mut self, handler: Arc<dyn MessageHandler>) {
        self.handlers.push(handler);
    }

    /// Notify every handler that the transport is connected. Call again after a reconnect.
    ///
    /// # Errors
    /// The first error returned by a handler.
    pub fn connect(&self) -> Result<()> {
        for handler in &self.handlers {
            debug!(topic = handler.topic(), "connecting handler");
            handler.on_connect(&self.transport)?;
        }
        Ok(())
    }

    /// Deliver `payload` to every handler registered for `topic`. Returns the number of
    /// handlers it was delivered to.
    pub fn dispatch(&self, topic: &str, payload: &[u8]) -> usize {
        let mut delivered = 0;
        for handler in self.handlers.iter().filter(|h| h.topic() == topic) {
            handler.on_message(topic, payload);
            delivered += 1;
        }
        if delivered == 0 {
            trace!(topic, "no handler for topic");
        }
        delivered
    }

    /// Publish `msg` through this connection's transport.
    ///
    /// # Errors
    /// See [Publisher::publish].
    pub fn publish<M: Message>(&self, publisher: &Publisher<M>, msg: &M) -> Result<()> {
        publisher.publish(&self.transport, msg)
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }
}
