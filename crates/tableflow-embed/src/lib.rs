//! Cross-window messaging between an embedded importer and its host page.
//!
//! The importer posts [`ImporterMessage`]s onto a [`MessageBus`]; the host
//! observes them through an [`EventChannel`] bound to one importer id, which
//! delivers each event id at most once.

pub mod bus;
pub mod channel;
pub mod message;

pub use bus::{ListenerId, MessageBus};
pub use channel::{ChannelHandlers, ChannelState, EventChannel};
pub use message::{Envelope, EventKind, ImporterMessage, MESSAGE_SOURCE};
