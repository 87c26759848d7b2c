//! `OrbApp`: the egui host for the orb engine.
//!
//! Plays the role of the browser page: owns the parsed document, feeds
//! wheel/drag/click/resize input into the orb, ticks it once per frame and
//! repaints only while the orb (or the demo hub) has something scheduled.
//!
//! - `hub`   in-process profile hub
//! - `stage` painting and pointer input

pub mod hub;
pub mod stage;

use std::sync::Arc;
use std::time::{Duration, Instant};

use eframe::egui;

use inque_orb::dom::Document;
use inque_orb::{FloatingOrb, OrbAction};

use self::hub::DemoHub;
use crate::ui::truncate_str;

pub struct OrbApp {
    pub doc: Document,
    pub orb: FloatingOrb,
    pub hub: Arc<DemoHub>,
    pub app_start: Instant,
    pub stage_width: f32,
    pub last_action: Option<String>,
    pub chat_input: String,
}

impl OrbApp {
    pub fn new(doc: Document, orb: FloatingOrb, hub: Arc<DemoHub>) -> Self {
        Self {
            doc,
            orb,
            hub,
            app_start: Instant::now(),
            stage_width: 0.0,
            last_action: None,
            chat_input: String::new(),
        }
    }

    /// Milliseconds since start, the orb's clock.
    pub fn now_ms(&self) -> f64 {
        self.app_start.elapsed().as_secs_f64() * 1000.0
    }

    pub fn record_action(&mut self, action: OrbAction) {
        let text = match action {
            OrbAction::Navigate(url) => format!("navigate \u{2192} {url}"),
            OrbAction::ChatRequested => "chat toggle sent to hub".to_string(),
            OrbAction::ChatDock(open) => format!("chat dock {}", if open { "opened" } else { "closed" }),
            OrbAction::Notifications(open) => {
                format!("notifications {}", if open { "shown" } else { "hidden" })
            }
            OrbAction::Ignored => return,
        };
        log::info!("{}", text);
        self.last_action = Some(text);
    }

    fn draw_header(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            let title = if self.doc.title.is_empty() { "inque" } else { self.doc.title.as_str() };
            ui.heading(title);
            ui.separator();
            let rot = self.orb.rotation();
            ui.monospace(format!(
                "rot {:7.2}\u{00B0} \u{2192} {:7.2}\u{00B0} {:?}",
                rot.current(),
                rot.target(),
                rot.phase()
            ));
            if let Some(action) = &self.last_action {
                ui.separator();
                ui.label(truncate_str(action, 60));
            }
        });
    }

    fn draw_hub_panel(&mut self, ui: &mut egui::Ui) {
        ui.heading("Profile hub");
        let state = inque_orb::ProfileHub::state(self.hub.as_ref());
        ui.label(format!("mode: {:?}", state.ui.hub_state));
        ui.label(format!("typing: {}", state.chatbot.is_typing));
        ui.label(format!("messages: {}", state.chatbot.messages.len()));
        if ui.button("Toggle chatbot").clicked() {
            if let Err(e) = inque_orb::ProfileHub::toggle_chatbot(self.hub.as_ref()) {
                log::warn!("{}", e);
            }
        }
        ui.separator();
        ui.label("Send as user:");
        let response = ui.text_edit_singleline(&mut self.chat_input);
        let submit = response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));
        if submit || ui.button("Send").clicked() {
            self.hub.send_user_message(&self.chat_input);
            self.chat_input.clear();
        }
        ui.separator();
        if let Some(refs) = self.orb.refs() {
            for attr in ["data-chatbot", "data-typing", "data-chat-dock", "data-active-item"] {
                ui.monospace(format!(
                    "{attr} = {}",
                    self.doc.attr(refs.container, attr).unwrap_or("-")
                ));
            }
            ui.monospace(format!("sphere: {:?}", self.orb.enhancement_status()));
        }
    }

    fn schedule_repaint(&self, ctx: &egui::Context, now: f64) {
        if self.orb.has_pending_frames() {
            ctx.request_repaint();
            return;
        }
        let mut wait: Option<Duration> = self
            .orb
            .next_deadline()
            .map(|at| Duration::from_secs_f64(((at - now).max(0.0)) / 1000.0));
        if let Some(reply) = self.hub.next_reply_in() {
            wait = Some(wait.map_or(reply, |w| w.min(reply)));
        }
        if let Some(w) = wait {
            ctx.request_repaint_after(w);
        }
    }
}

impl eframe::App for OrbApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let now = self.now_ms();
        self.hub.update();
        self.orb.tick(&mut self.doc, now);

        egui::TopBottomPanel::top("orb_header").show(ctx, |ui| self.draw_header(ui));
        egui::SidePanel::right("hub_panel")
            .default_width(240.0)
            .show(ctx, |ui| self.draw_hub_panel(ui));
        egui::CentralPanel::default().show(ctx, |ui| self.draw_stage(ui, now));

        self.schedule_repaint(ctx, now);
    }
}

impl Drop for OrbApp {
    fn drop(&mut self) {
        self.orb.destroy(&mut self.doc);
    }
}
