//! Host-side listener for importer events.
//!
//! An [`EventChannel`] subscribes to a [`MessageBus`], admits only messages
//! addressed to its importer, and invokes each handler at most once per event
//! id. Dropping the channel deregisters it.

use std::cell::RefCell;
use std::collections::HashSet;
use std::fmt;
use std::marker::PhantomData;
use std::rc::Rc;

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, trace};

use crate::bus::{ListenerId, MessageBus};
use crate::message::{Envelope, EventKind};

type CompleteHandler<P> = Box<dyn FnMut(Option<P>)>;
type CloseHandler = Box<dyn FnMut()>;

/// Callbacks invoked for admitted events. Both are optional.
pub struct ChannelHandlers<P = Value> {
    on_complete: Option<CompleteHandler<P>>,
    on_close: Option<CloseHandler>,
}

impl<P> Default for ChannelHandlers<P> {
    fn default() -> Self {
        Self {
            on_complete: None,
            on_close: None,
        }
    }
}

impl<P> ChannelHandlers<P> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_complete(mut self, handler: impl FnMut(Option<P>) + 'static) -> Self {
        self.on_complete = Some(Box::new(handler));
        self
    }

    pub fn on_close(mut self, handler: impl FnMut() + 'static) -> Self {
        self.on_close = Some(Box::new(handler));
        self
    }
}

impl<P> fmt::Debug for ChannelHandlers<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChannelHandlers")
            .field("on_complete", &self.on_complete.is_some())
            .field("on_close", &self.on_close.is_some())
            .finish()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelState {
    Listening,
    Stopped,
}

struct Delivery<P> {
    importer_id: String,
    delivered: HashSet<String>,
    handlers: ChannelHandlers<P>,
}

impl<P: DeserializeOwned> Delivery<P> {
    fn receive(&mut self, message: &Value) {
        let Some(envelope) = Envelope::admit(message, &self.importer_id) else {
            trace!(
                event = "embed.message.ignored",
                importer_id = %self.importer_id,
                "message not addressed to this importer"
            );
            return;
        };

        if self.delivered.contains(&envelope.id) {
            trace!(
                event = "embed.message.duplicate",
                importer_id = %self.importer_id,
                id = %envelope.id,
                "event already delivered"
            );
            return;
        }

        let handled = match envelope.kind {
            EventKind::Complete => {
                let payload = match envelope.data.map(serde_json::from_value::<P>).transpose() {
                    Ok(payload) => payload,
                    Err(err) => {
                        debug!(
                            event = "embed.message.malformed",
                            importer_id = %self.importer_id,
                            id = %envelope.id,
                            error = %err,
                            "payload does not decode"
                        );
                        return;
                    }
                };
                match self.handlers.on_complete.as_mut() {
                    Some(handler) => {
                        handler(payload);
                        true
                    }
                    None => false,
                }
            }
            EventKind::Close => match self.handlers.on_close.as_mut() {
                Some(handler) => {
                    handler();
                    true
                }
                None => false,
            },
            EventKind::Other(ref kind) => {
                trace!(
                    event = "embed.message.unknown_kind",
                    importer_id = %self.importer_id,
                    kind = %kind,
                    "unknown event kind ignored"
                );
                false
            }
        };

        if handled {
            debug!(
                event = "embed.message.delivered",
                importer_id = %self.importer_id,
                id = %envelope.id,
                kind = %envelope.kind,
                "importer event delivered"
            );
            self.delivered.insert(envelope.id);
        }
    }
}

/// Subscription for one importer instance.
pub struct EventChannel<P = Value> {
    importer_id: String,
    bus: MessageBus,
    listener: Option<ListenerId>,
    delivery: Rc<RefCell<Delivery<P>>>,
    _payload: PhantomData<fn() -> P>,
}

impl<P: DeserializeOwned + 'static> EventChannel<P> {
    /// Register on `bus` and start admitting events for `importer_id`.
    pub fn start(
        bus: &MessageBus,
        importer_id: impl Into<String>,
        handlers: ChannelHandlers<P>,
    ) -> Self {
        let importer_id = importer_id.into();
        let delivery = Rc::new(RefCell::new(Delivery {
            importer_id: importer_id.clone(),
            delivered: HashSet::new(),
            handlers,
        }));

        let shared = Rc::clone(&delivery);
        let listener = bus.subscribe(move |message| {
            // A handler that re-enters its own channel is already borrowed.
            if let Ok(mut delivery) = shared.try_borrow_mut() {
                delivery.receive(message);
            }
        });
        debug!(
            event = "embed.channel.start",
            importer_id = %importer_id,
            listener,
            "event channel listening"
        );

        Self {
            importer_id,
            bus: bus.clone(),
            listener: Some(listener),
            delivery,
            _payload: PhantomData,
        }
    }
}

impl<P> EventChannel<P> {
    /// Deregister from the bus. Safe to call more than once.
    pub fn stop(&mut self) {
        if let Some(listener) = self.listener.take() {
            self.bus.unsubscribe(listener);
            debug!(
                event = "embed.channel.stop",
                importer_id = %self.importer_id,
                listener,
                "event channel stopped"
            );
        }
    }

    pub fn state(&self) -> ChannelState {
        if self.listener.is_some() {
            ChannelState::Listening
        } else {
            ChannelState::Stopped
        }
    }

    pub fn importer_id(&self) -> &str {
        &self.importer_id
    }

    pub fn delivered_count(&self) -> usize {
        self.delivery
            .try_borrow()
            .map(|delivery| delivery.delivered.len())
            .unwrap_or_default()
    }

    pub fn has_delivered(&self, id: &str) -> bool {
        self.delivery
            .try_borrow()
            .map(|delivery| delivery.delivered.contains(id))
            .unwrap_or(false)
    }
}

impl<P> Drop for EventChannel<P> {
    fn drop(&mut self) {
        self.stop();
    }
}

impl<P> fmt::Debug for EventChannel<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventChannel")
            .field("importer_id", &self.importer_id)
            .field("state", &self.state())
            .field("delivered", &self.delivered_count())
            .finish()
    }
}
