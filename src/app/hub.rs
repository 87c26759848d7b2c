//! In-process stand-in for the profile hub.
//!
//! Owns the hub state, publishes `HubStateChanged` on every transition and
//! fakes an assistant reply a moment after each user message.

use std::sync::Mutex;
use std::time::{Duration, Instant};

use inque_orb::events::{ChatMessage, HubChange, HubMode};
use inque_orb::{BusEvent, EventBus, HubState, ProfileHub, Result};

const REPLY_DELAY: Duration = Duration::from_millis(1200);

pub struct DemoHub {
    bus: EventBus,
    state: Mutex<HubState>,
    reply_at: Mutex<Option<Instant>>,
}

impl DemoHub {
    pub fn new(bus: EventBus) -> Self {
        Self {
            bus,
            state: Mutex::new(HubState::default()),
            reply_at: Mutex::new(None),
        }
    }

    fn transition(&self, changes: Vec<HubChange>, f: impl FnOnce(&mut HubState)) {
        let snapshot = {
            let mut state = self.state.lock().unwrap_or_else(|p| p.into_inner());
            f(&mut state);
            state.clone()
        };
        self.bus.publish(BusEvent::HubStateChanged {
            state: snapshot,
            changes,
        });
    }

    pub fn send_user_message(&self, text: &str) {
        let text = text.trim();
        if text.is_empty() {
            return;
        }
        self.transition(vec![HubChange::Messages, HubChange::Typing], |s| {
            s.chatbot.messages.push(ChatMessage {
                role: "user".into(),
                text: text.to_string(),
            });
            s.chatbot.is_typing = true;
        });
        *self.reply_at.lock().unwrap_or_else(|p| p.into_inner()) = Some(Instant::now() + REPLY_DELAY);
    }

    /// Deliver the pending reply once its delay has passed.
    pub fn update(&self) {
        let due = {
            let mut reply_at = self.reply_at.lock().unwrap_or_else(|p| p.into_inner());
            match *reply_at {
                Some(at) if Instant::now() >= at => {
                    *reply_at = None;
                    true
                }
                _ => false,
            }
        };
        if !due {
            return;
        }
        self.transition(vec![HubChange::Messages, HubChange::Typing], |s| {
            let count = s.chatbot.messages.len();
            s.chatbot.messages.push(ChatMessage {
                role: "assistant".into(),
                text: format!("Noted. That's message #{count} in this chat."),
            });
            s.chatbot.is_typing = false;
        });
    }

    /// Time until the fake reply lands, if one is pending.
    pub fn next_reply_in(&self) -> Option<Duration> {
        self.reply_at
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .map(|at| at.saturating_duration_since(Instant::now()))
    }
}

impl ProfileHub for DemoHub {
    fn state(&self) -> HubState {
        self.state.lock().unwrap_or_else(|p| p.into_inner()).clone()
    }

    fn toggle_chatbot(&self) -> Result<()> {
        self.transition(vec![HubChange::HubState], |s| {
            s.ui.hub_state = match s.ui.hub_state {
                HubMode::ChatbotActive => HubMode::Closed,
                _ => HubMode::ChatbotActive,
            };
        });
        Ok(())
    }
}
