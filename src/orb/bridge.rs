//! Keeps the orb's DOM in sync with the profile hub's chat state.
//!
//! The orb observes hub snapshots and never mutates them. Snapshots arrive
//! either from `HubStateChanged` bus events or, once at bind time, straight
//! from the injected hub (covers a hub that initialized before the orb).

use std::sync::mpsc::{Receiver, TryRecvError};
use std::sync::Arc;

use crate::dom::{Document, NodeId};
use crate::events::{BusEvent, EventBus, HubState, ProfileHub};

pub const MESSAGE_PING_CLASS: &str = "message-ping";

/// What applying a snapshot did, for the orb's secondary surfaces.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BridgeUpdate {
    pub chatbot_active: bool,
    pub typing: bool,
    /// Messages appended since the previous snapshot.
    pub new_messages: usize,
    /// A ping pulse was started.
    pub pinged: bool,
}

pub struct EventBridge {
    rx: Option<Receiver<BusEvent>>,
    hub: Option<Arc<dyn ProfileHub>>,
    last_message_count: Option<usize>,
    last_state: Option<HubState>,
}

impl EventBridge {
    pub fn new(hub: Option<Arc<dyn ProfileHub>>) -> Self {
        Self {
            rx: None,
            hub,
            last_message_count: None,
            last_state: None,
        }
    }

    /// Subscribe to the bus and pull the hub's current state if there is one.
    pub fn bind(&mut self, bus: &EventBus, doc: &mut Document, container: NodeId) -> Option<BridgeUpdate> {
        self.rx = Some(bus.subscribe());
        match self.hub.as_ref().map(|h| h.state()) {
            Some(state) => {
                log::debug!("profile hub present at bind; syncing");
                Some(self.apply(doc, container, &state))
            }
            None => {
                log::warn!("no profile hub injected; waiting for hub state events");
                None
            }
        }
    }

    pub fn is_bound(&self) -> bool {
        self.rx.is_some()
    }

    pub fn hub(&self) -> Option<&Arc<dyn ProfileHub>> {
        self.hub.as_ref()
    }

    pub fn last_state(&self) -> Option<&HubState> {
        self.last_state.as_ref()
    }

    /// Drain pending bus events and apply every hub snapshot in order.
    pub fn pump(&mut self, doc: &mut Document, container: NodeId) -> Vec<BridgeUpdate> {
        let mut states = Vec::new();
        let mut disconnected = false;
        if let Some(rx) = &self.rx {
            loop {
                match rx.try_recv() {
                    Ok(BusEvent::HubStateChanged { state, changes }) => {
                        log::debug!("hub state changed: {:?}", changes);
                        states.push(state);
                    }
                    Ok(BusEvent::OrbReady(_)) => {}
                    Err(TryRecvError::Empty) => break,
                    Err(TryRecvError::Disconnected) => {
                        disconnected = true;
                        break;
                    }
                }
            }
        }
        if disconnected {
            log::warn!("event bus closed; orb no longer follows hub state");
            self.rx = None;
        }
        states.iter().map(|s| self.apply(doc, container, s)).collect()
    }

    /// Reflect one snapshot onto the container.
    pub fn apply(&mut self, doc: &mut Document, container: NodeId, state: &HubState) -> BridgeUpdate {
        let chatbot_active = state.chatbot_active();
        let typing = state.chatbot.is_typing;
        doc.set_attr(
            container,
            "data-chatbot",
            if chatbot_active { "active" } else { "inactive" },
        );
        doc.set_attr(container, "data-typing", if typing { "true" } else { "false" });

        let count = state.chatbot.messages.len();
        let changed = match (&self.last_state, self.last_message_count) {
            (Some(prev), Some(prev_count)) => {
                prev_count != count || prev.chatbot.messages != state.chatbot.messages
            }
            _ => false,
        };
        let new_messages = match self.last_message_count {
            Some(prev) => count.saturating_sub(prev),
            None => 0,
        };
        if changed {
            doc.add_class(container, MESSAGE_PING_CLASS);
        }

        self.last_message_count = Some(count);
        self.last_state = Some(state.clone());
        BridgeUpdate {
            chatbot_active,
            typing,
            new_messages,
            pinged: changed,
        }
    }

    /// Ask the hub to toggle its chatbot. Returns false when there is no hub
    /// or it refused.
    pub fn request_chat_toggle(&self) -> bool {
        let Some(hub) = &self.hub else {
            log::warn!("chat toggle requested but no profile hub is available");
            return false;
        };
        match hub.toggle_chatbot() {
            Ok(()) => true,
            Err(e) => {
                log::warn!("profile hub refused chat toggle: {}", e);
                false
            }
        }
    }

    /// Stop listening. The receiver is dropped so the bus prunes it.
    pub fn unbind(&mut self) {
        self.rx = None;
    }
}

pub fn end_ping(doc: &mut Document, container: NodeId) {
    doc.remove_class(container, MESSAGE_PING_CLASS);
}
