//! Chat dock panel shown next to the chat nav item.

use crate::dom::{Document, NodeId};
use crate::events::{ChatMessage, HubState};
use crate::orb::layout::ItemPlacement;

/// Messages mirrored into the dock.
const VISIBLE_MESSAGES: usize = 5;
/// Gap between the chat item and the panel edge.
const ANCHOR_GAP: f64 = 24.0;

pub struct ChatDockPanel {
    pub panel: NodeId,
    pub log: NodeId,
    pub typing: NodeId,
    open: bool,
    lines: Vec<NodeId>,
    shown: Vec<ChatMessage>,
}

/// Class for a message line; unknown roles share one bucket.
fn role_class(role: &str) -> &'static str {
    match role.trim().to_ascii_lowercase().as_str() {
        "user" => "from-user",
        "assistant" | "bot" | "chatbot" => "from-assistant",
        "system" => "from-system",
        _ => "from-other",
    }
}

impl ChatDockPanel {
    pub fn build(doc: &mut Document, container: NodeId) -> Self {
        let panel = doc.create_element("aside");
        doc.add_class(panel, "orb-chat-dock");
        doc.set_attr(panel, "data-open", "false");
        doc.set_attr(panel, "aria-hidden", "true");

        let header = doc.create_element("header");
        doc.set_text(header, "Chat");
        let log = doc.create_element("ul");
        doc.add_class(log, "orb-chat-log");
        let typing = doc.create_element("div");
        doc.add_class(typing, "orb-chat-typing");

        doc.append_child(panel, header);
        doc.append_child(panel, log);
        doc.append_child(panel, typing);
        doc.append_child(container, panel);
        doc.set_attr(container, "data-chat-dock", "closed");

        Self {
            panel,
            log,
            typing,
            open: false,
            lines: Vec::new(),
            shown: Vec::new(),
        }
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn set_open(&mut self, doc: &mut Document, container: NodeId, open: bool) {
        self.open = open;
        doc.set_attr(self.panel, "data-open", if open { "true" } else { "false" });
        doc.set_attr(self.panel, "aria-hidden", if open { "false" } else { "true" });
        doc.set_attr(container, "data-chat-dock", if open { "open" } else { "closed" });
        log::debug!("chat dock {}", if open { "opened" } else { "closed" });
    }

    /// Flip open/closed and return the new state.
    pub fn toggle(&mut self, doc: &mut Document, container: NodeId) -> bool {
        let open = !self.open;
        self.set_open(doc, container, open);
        open
    }

    /// Mirror the tail of the hub's conversation. Line nodes are reused;
    /// nothing is rebuilt when the tail is unchanged.
    pub fn sync(&mut self, doc: &mut Document, state: &HubState) {
        doc.toggle_class(self.typing, "active", state.chatbot.is_typing);

        let messages = &state.chatbot.messages;
        let tail = &messages[messages.len().saturating_sub(VISIBLE_MESSAGES)..];
        if tail == self.shown.as_slice() {
            return;
        }

        while self.lines.len() > tail.len() {
            if let Some(li) = self.lines.pop() {
                doc.drop_subtree(li);
            }
        }
        while self.lines.len() < tail.len() {
            let li = doc.create_element("li");
            doc.append_child(self.log, li);
            self.lines.push(li);
        }
        for (li, m) in self.lines.iter().zip(tail) {
            let node = doc.node_mut(*li);
            node.classes.clear();
            node.classes.push(role_class(&m.role).to_string());
            node.text.clone_from(&m.text);
        }
        self.shown = tail.to_vec();
    }

    pub fn lines<'a>(&self, doc: &'a Document) -> Vec<&'a str> {
        self.lines.iter().map(|id| doc.text(*id)).collect()
    }

    /// Anchor the panel beside the chat item's projected position, on the
    /// side away from the orb.
    pub fn follow(&self, doc: &mut Document, anchor: &ItemPlacement) {
        let side = if anchor.x >= 0.0 { "right" } else { "left" };
        let x = anchor.x + ANCHOR_GAP * anchor.x.signum();
        doc.set_attr(self.panel, "data-side", side);
        doc.set_style(self.panel, "left", &format!("calc(50% + {:.1}px)", x));
        doc.set_style(self.panel, "top", &format!("calc(50% + {:.1}px)", anchor.y));
    }
}
