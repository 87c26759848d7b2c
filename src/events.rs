//! Typed event bus between the orb and the profile hub.
//!
//! Page scripts used to talk through ad hoc `CustomEvent` names and
//! optional-chained `detail` objects. Here every payload is a variant of
//! [`BusEvent`], and the hub itself is an injected [`ProfileHub`] instead of
//! a global singleton.

use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};

use crate::error::{OrbError, Result};
use crate::orb::shell::OrbDomRefs;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum HubMode {
    #[default]
    Closed,
    Open,
    ChatbotActive,
    /// Any mode this build does not know; treated as chatbot inactive.
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CustomizationState {
    #[default]
    Inactive,
    Editing,
    Saving,
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HubUi {
    pub hub_state: HubMode,
    pub customization_state: CustomizationState,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ChatMessage {
    pub role: String,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ChatbotState {
    pub is_typing: bool,
    pub messages: Vec<ChatMessage>,
}

/// Read-only snapshot of the hub's state.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HubState {
    pub ui: HubUi,
    pub chatbot: ChatbotState,
}

impl HubState {
    /// Decode the `state` object of a `profilehub-state-changed` detail.
    pub fn from_json(src: &str) -> Result<Self> {
        Ok(serde_json::from_str(src)?)
    }

    pub fn chatbot_active(&self) -> bool {
        self.ui.hub_state == HubMode::ChatbotActive
    }
}

/// What changed in a hub transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum HubChange {
    HubState,
    Customization,
    Typing,
    Messages,
}

#[derive(Debug, Clone)]
pub enum BusEvent {
    /// `profilehub-state-changed`
    HubStateChanged {
        state: HubState,
        changes: Vec<HubChange>,
    },
    /// `floating-orb:ready`, carrying the nodes the orb created.
    OrbReady(OrbDomRefs),
}

/// Fan-out bus. Cloning shares the subscriber list.
#[derive(Clone, Default)]
pub struct EventBus {
    subscribers: Arc<Mutex<Vec<Sender<BusEvent>>>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self) -> Receiver<BusEvent> {
        let (tx, rx) = mpsc::channel();
        let mut subs = self.subscribers.lock().unwrap_or_else(|p| p.into_inner());
        subs.push(tx);
        rx
    }

    /// Deliver to every live subscriber; dropped receivers are pruned.
    /// Returns how many subscribers received the event.
    pub fn publish(&self, event: BusEvent) -> usize {
        let mut subs = self.subscribers.lock().unwrap_or_else(|p| p.into_inner());
        subs.retain(|tx| tx.send(event.clone()).is_ok());
        subs.len()
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.lock().unwrap_or_else(|p| p.into_inner()).len()
    }
}

/// The external profile hub. The orb only reads snapshots; the single write
/// path is `toggle_chatbot`, invoked from a nav item.
pub trait ProfileHub: Send + Sync {
    fn state(&self) -> HubState;

    fn toggle_chatbot(&self) -> Result<()> {
        Err(OrbError::Hub("toggle_chatbot is not supported".into()))
    }
}
