//! Toast stack attached to the orb.
//!
//! - At most `max_visible` toasts; pushing past that evicts the oldest
//! - Each toast auto-dismisses after `toast_ms` via its own timer
//! - The bell item toggles the stack; toasts raised while it is closed count
//!   as unread

use std::collections::VecDeque;

use crate::config::OrbConfig;
use crate::dom::{Document, NodeId};
use crate::scheduler::{Millis, TimerKind, Timers};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastKind {
    Info,
    Message,
}

#[derive(Debug, Clone)]
pub struct Toast {
    pub id: u64,
    pub kind: ToastKind,
    pub title: String,
    pub body: String,
    pub node: NodeId,
}

pub struct NotificationSystem {
    pub stack: NodeId,
    toasts: VecDeque<Toast>,
    next_id: u64,
    max_visible: usize,
    toast_ms: Millis,
    open: bool,
    unread: usize,
}

impl NotificationSystem {
    pub fn build(doc: &mut Document, container: NodeId, config: &OrbConfig) -> Self {
        let stack = doc.create_element("section");
        doc.add_class(stack, "orb-notifications");
        doc.set_attr(stack, "aria-live", "polite");
        doc.set_attr(stack, "data-open", "true");
        doc.set_attr(stack, "data-unread", "0");
        doc.append_child(container, stack);
        Self {
            stack,
            toasts: VecDeque::new(),
            next_id: 0,
            max_visible: config.max_toasts.max(1),
            toast_ms: config.toast_ms,
            open: true,
            unread: 0,
        }
    }

    pub fn toasts(&self) -> impl Iterator<Item = &Toast> {
        self.toasts.iter()
    }

    pub fn unread(&self) -> usize {
        self.unread
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn push(
        &mut self,
        doc: &mut Document,
        timers: &mut Timers,
        now: Millis,
        kind: ToastKind,
        title: &str,
        body: &str,
    ) -> u64 {
        self.next_id += 1;
        let id = self.next_id;

        let node = doc.create_element("div");
        doc.add_class(node, "orb-toast");
        doc.add_class(
            node,
            match kind {
                ToastKind::Info => "toast-info",
                ToastKind::Message => "toast-message",
            },
        );
        doc.set_attr(node, "data-toast-id", &id.to_string());
        doc.set_text(node, &format!("{title}: {body}"));
        doc.append_child(self.stack, node);

        self.toasts.push_back(Toast {
            id,
            kind,
            title: title.to_string(),
            body: body.to_string(),
            node,
        });
        timers.restart(TimerKind::Toast(id), now, self.toast_ms);

        while self.toasts.len() > self.max_visible {
            if let Some(old) = self.toasts.pop_front() {
                doc.drop_subtree(old.node);
                timers.clear(TimerKind::Toast(old.id));
            }
        }

        if !self.open {
            self.unread += 1;
            self.write_unread(doc);
        }
        id
    }

    /// Remove toast `id`. Returns false if it was already gone.
    pub fn dismiss(&mut self, doc: &mut Document, timers: &mut Timers, id: u64) -> bool {
        let Some(pos) = self.toasts.iter().position(|t| t.id == id) else {
            return false;
        };
        if let Some(toast) = self.toasts.remove(pos) {
            doc.drop_subtree(toast.node);
        }
        timers.clear(TimerKind::Toast(id));
        true
    }

    pub fn toggle(&mut self, doc: &mut Document) -> bool {
        self.open = !self.open;
        doc.set_attr(self.stack, "data-open", if self.open { "true" } else { "false" });
        if self.open {
            self.unread = 0;
            self.write_unread(doc);
        }
        self.open
    }

    fn write_unread(&self, doc: &mut Document) {
        doc.set_attr(self.stack, "data-unread", &self.unread.to_string());
    }
}
