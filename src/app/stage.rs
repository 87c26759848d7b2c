//! Stage painting and pointer input for `OrbApp`.
//!
//! Draw order mirrors the page's z-index: ring, items behind the orb, the
//! orb itself, then items in front. Everything is read back from the orb's
//! DOM classes/attributes so the painter shows exactly what a stylesheet
//! would see.

use egui::{Align2, Color32, FontId, Pos2, Stroke, Vec2};

use inque_orb::orb::layout::ItemPlacement;

use super::OrbApp;
use crate::ui::{accent, truncate_str};

const ORB_RADIUS: f32 = 42.0;
const ITEM_RADIUS: f32 = 18.0;
const STAGE_MAX_WIDTH: f32 = 640.0;

impl OrbApp {
    /// Central stage: orb, ring and overlays.
    pub fn draw_stage(&mut self, ui: &mut egui::Ui, now: f64) {
        let size = ui.available_size();
        let (response, painter) = ui.allocate_painter(size, egui::Sense::click_and_drag());
        let rect = response.rect;
        let center = rect.center();

        let width = rect.width().min(STAGE_MAX_WIDTH);
        if (width - self.stage_width).abs() > 0.5 {
            self.stage_width = width;
            self.orb.handle_resize(width as f64, now);
        }

        // ── input ──
        if response.hovered() {
            let scroll = ui.input(|i| i.raw_scroll_delta.y);
            if scroll != 0.0 {
                // Page deltaY grows when scrolling down; egui's y grows up.
                self.orb.handle_scroll(-scroll as f64, now);
            }
        }
        if response.dragged() {
            let dy = response.drag_delta().y;
            if dy != 0.0 {
                self.orb.handle_drag_delta(dy as f64, now);
            }
        }
        if response.drag_stopped() {
            self.orb.handle_touch_end(now);
        }
        if response.clicked() {
            if let Some(pos) = response.interact_pointer_pos() {
                self.click_at(pos, center);
            }
        }

        // ── paint ──
        let Some(refs) = self.orb.refs() else {
            painter.text(center, Align2::CENTER_CENTER, "orb destroyed", FontId::proportional(16.0), Color32::GRAY);
            return;
        };
        let dark = ui.visuals().dark_mode;
        let radius = self.orb.layout().radius() as f32;
        let tilt = self.orb.config().tilt as f32;

        let pulse = self.doc.has_class(refs.scroll_line, "snap-pulse");
        draw_ring(&painter, center, radius, tilt, pulse, dark);
        draw_scroll_line(&painter, center, radius, self.orb.rotation().current() as f32, pulse);

        let placements: Vec<ItemPlacement> = self.orb.placements().to_vec();
        let items = self.orb.items().to_vec();
        let paint_item = |front: bool| {
            for (item, p) in items.iter().zip(&placements) {
                if p.in_front != front {
                    continue;
                }
                let pos = center + Vec2::new(p.x as f32, p.y as f32);
                let active = self.doc.has_class(item.node, "active");
                let fill = if front { accent(dark) } else { accent(dark).gamma_multiply(0.45) };
                painter.circle_filled(pos, ITEM_RADIUS, fill);
                if active {
                    painter.circle_stroke(pos, ITEM_RADIUS + 3.0, Stroke::new(2.0, Color32::WHITE));
                }
                painter.text(pos, Align2::CENTER_CENTER, &item.icon, FontId::proportional(16.0), Color32::WHITE);
            }
        };

        paint_item(false);
        self.draw_orb(&painter, center);
        paint_item(true);

        if self.doc.has_class(refs.tooltip, "visible") {
            painter.text(
                center + Vec2::new(0.0, radius * tilt + ORB_RADIUS + 28.0),
                Align2::CENTER_TOP,
                self.doc.text(refs.tooltip),
                FontId::proportional(13.0),
                ui.visuals().weak_text_color(),
            );
        }

        self.draw_chat_dock(ui, center);
        self.draw_toasts(ui, rect);
    }

    fn draw_orb(&self, painter: &egui::Painter, center: Pos2) {
        let Some(refs) = self.orb.refs() else {
            return;
        };
        let chat_active = self.doc.attr(refs.container, "data-chatbot") == Some("active");
        let typing = self.doc.attr(refs.container, "data-typing") == Some("true");
        let ping = self.doc.has_class(refs.container, "message-ping");
        let sphere = self.doc.has_class(refs.container, "has-sphere");

        let base = if chat_active {
            Color32::from_rgb(120, 90, 230)
        } else {
            Color32::from_rgb(70, 110, 220)
        };
        painter.circle_filled(center, ORB_RADIUS, base);
        if sphere {
            // Fake specular highlight for the sphere enhancement.
            painter.circle_filled(
                center + Vec2::new(-ORB_RADIUS * 0.35, -ORB_RADIUS * 0.35),
                ORB_RADIUS * 0.3,
                Color32::from_white_alpha(70),
            );
        }
        if ping {
            painter.circle_stroke(center, ORB_RADIUS + 6.0, Stroke::new(3.0, Color32::from_rgb(255, 200, 80)));
        }
        if typing {
            for i in 0..3 {
                let x = (i as f32 - 1.0) * 10.0;
                painter.circle_filled(center + Vec2::new(x, 0.0), 3.0, Color32::WHITE);
            }
        }
    }

    fn draw_chat_dock(&self, ui: &mut egui::Ui, center: Pos2) {
        let Some(dock) = self.orb.chat_dock() else {
            return;
        };
        if !dock.is_open() {
            return;
        }
        let lines: Vec<String> = dock.lines(&self.doc).iter().map(|s| s.to_string()).collect();
        let typing = self.doc.has_class(dock.typing, "active");
        let side_left = self.doc.attr(dock.panel, "data-side") == Some("left");

        let anchor = self
            .orb
            .items()
            .iter()
            .position(|i| i.id == "chat")
            .and_then(|i| self.orb.placements().get(i).copied());
        let offset = anchor.map_or(Vec2::new(ORB_RADIUS * 2.0, 0.0), |p| Vec2::new(p.x as f32, p.y as f32));
        let pos = if side_left {
            center + offset - Vec2::new(220.0 + ITEM_RADIUS, 0.0)
        } else {
            center + offset + Vec2::new(ITEM_RADIUS + 8.0, 0.0)
        };

        egui::Area::new(egui::Id::new("orb_chat_dock"))
            .fixed_pos(pos)
            .show(ui.ctx(), |ui| {
                egui::Frame::popup(ui.style()).show(ui, |ui| {
                    ui.set_width(200.0);
                    ui.strong("Chat");
                    if lines.is_empty() {
                        ui.weak("No messages yet");
                    }
                    for line in &lines {
                        ui.label(truncate_str(line, 80));
                    }
                    if typing {
                        ui.weak("assistant is typing\u{2026}");
                    }
                });
            });
    }

    fn draw_toasts(&self, ui: &mut egui::Ui, rect: egui::Rect) {
        let Some(ns) = self.orb.notifications() else {
            return;
        };
        if !ns.is_open() {
            return;
        }
        let toasts: Vec<(String, String)> = ns.toasts().map(|t| (t.title.clone(), t.body.clone())).collect();
        if toasts.is_empty() {
            return;
        }
        egui::Area::new(egui::Id::new("orb_toasts"))
            .fixed_pos(rect.left_bottom() + Vec2::new(12.0, -12.0 - 48.0 * toasts.len() as f32))
            .show(ui.ctx(), |ui| {
                for (title, body) in &toasts {
                    egui::Frame::popup(ui.style()).show(ui, |ui| {
                        ui.set_width(240.0);
                        ui.strong(title);
                        ui.label(truncate_str(body, 60));
                    });
                }
            });
    }

    /// Hit-test a click: nav items first, then the orb itself, which
    /// activates whatever item sits at the front.
    fn click_at(&mut self, pos: Pos2, center: Pos2) {
        let hit = self
            .orb
            .placements()
            .iter()
            .enumerate()
            .filter(|(_, p)| (center + Vec2::new(p.x as f32, p.y as f32)).distance(pos) <= ITEM_RADIUS)
            // Front items win over the ones behind them.
            .max_by_key(|(_, p)| p.in_front)
            .map(|(i, _)| i);

        let index = match hit {
            Some(i) => Some(i),
            None if center.distance(pos) <= ORB_RADIUS => self.orb.active_index(),
            None => None,
        };
        if let Some(i) = index {
            let action = self.orb.activate(&mut self.doc, i);
            self.record_action(action);
        }
    }
}

fn draw_ring(painter: &egui::Painter, center: Pos2, radius: f32, tilt: f32, pulse: bool, dark: bool) {
    let points: Vec<Pos2> = (0..=72)
        .map(|i| {
            let a = i as f32 / 72.0 * std::f32::consts::TAU;
            center + Vec2::new(a.cos() * radius, a.sin() * radius * tilt)
        })
        .collect();
    let color = if dark { Color32::from_gray(90) } else { Color32::from_gray(170) };
    let width = if pulse { 2.5 } else { 1.0 };
    painter.add(egui::Shape::line(points, Stroke::new(width, color)));
}

fn draw_scroll_line(painter: &egui::Painter, center: Pos2, radius: f32, rotation_deg: f32, pulse: bool) {
    let a = rotation_deg.to_radians();
    let dir = Vec2::new(a.cos(), a.sin());
    let start = center + dir * (ORB_RADIUS + 4.0);
    let end = center + dir * (radius * 0.5).max(ORB_RADIUS + 16.0);
    let color = if pulse { Color32::from_rgb(255, 200, 80) } else { Color32::from_rgb(140, 170, 255) };
    painter.line_segment([start, end], Stroke::new(2.0, color));
}
