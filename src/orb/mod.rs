//! `FloatingOrb`: the orb engine facade.
//!
//! Owns every orb component and routes host input, timers and frames to
//! them. The host page is passed in as a `&mut Document` on each call that
//! touches the DOM; everything external (hub, bus, preference store, sphere
//! loader) arrives through [`OrbContext`].
//!
//! - `rotation`      scroll/drag → eased, lock-snapped rotation
//! - `layout`        rotation → item positions on the orbit
//! - `shell`         DOM skeleton, docking, tooltip
//! - `bridge`        hub state → container attributes
//! - `enhance`       optional sphere module
//! - `chat_dock`     local chat panel
//! - `notifications` toast stack

pub mod bridge;
pub mod chat_dock;
pub mod enhance;
pub mod layout;
pub mod notifications;
pub mod rotation;
pub mod shell;

use std::sync::Arc;
use std::time::Duration;

use url::Url;

use crate::config::{NavAction, OrbConfig};
use crate::dom::Document;
use crate::events::{BusEvent, EventBus, ProfileHub};
use crate::scheduler::{FrameLoop, FrameScheduler, Millis, TimerKind, Timers};
use crate::store::{MemoryStore, PreferenceStore};

use bridge::{BridgeUpdate, EventBridge};
use chat_dock::ChatDockPanel;
use enhance::{Enhancement, EnhancementStatus, SphereEnhancer};
use layout::{ItemPlacement, RadialLayoutEngine};
use notifications::{NotificationSystem, ToastKind};
use rotation::{InputOutcome, RotationController};
use shell::{NavItem, OrbDomRefs, OrbShell, OrbShellBuilder};

const SNAP_PULSE_CLASS: &str = "snap-pulse";

/// Everything the orb talks to but does not own.
pub struct OrbContext {
    pub bus: EventBus,
    pub hub: Option<Arc<dyn ProfileHub>>,
    pub store: Box<dyn PreferenceStore>,
    pub enhancer: Option<Arc<dyn SphereEnhancer>>,
}

impl OrbContext {
    pub fn new(bus: EventBus) -> Self {
        Self {
            bus,
            hub: None,
            store: Box::new(MemoryStore::new()),
            enhancer: None,
        }
    }

    pub fn with_hub(mut self, hub: Arc<dyn ProfileHub>) -> Self {
        self.hub = Some(hub);
        self
    }

    pub fn with_store(mut self, store: Box<dyn PreferenceStore>) -> Self {
        self.store = store;
        self
    }

    pub fn with_enhancer(mut self, enhancer: Arc<dyn SphereEnhancer>) -> Self {
        self.enhancer = Some(enhancer);
        self
    }
}

/// What the host should do after a nav item was activated.
#[derive(Debug, Clone, PartialEq)]
pub enum OrbAction {
    Navigate(Url),
    /// The hub accepted a chatbot toggle; its next state event follows.
    ChatRequested,
    /// The local chat dock was toggled to the given open state.
    ChatDock(bool),
    /// The notification stack was toggled to the given open state.
    Notifications(bool),
    Ignored,
}

pub struct FloatingOrb {
    config: OrbConfig,
    rotation: RotationController,
    layout: RadialLayoutEngine,
    shell: Option<OrbShell>,
    frames: FrameScheduler,
    timers: Timers,
    bridge: EventBridge,
    chat_dock: Option<ChatDockPanel>,
    notifications: Option<NotificationSystem>,
    enhancement: Enhancement,
    base_url: Option<Url>,
    container_width: f64,
    now: Millis,
}

impl FloatingOrb {
    /// Build, dock and wire the orb. Missing page elements, a missing hub or
    /// an unavailable sphere module all degrade with a warning.
    pub fn init(doc: &mut Document, config: OrbConfig, ctx: OrbContext, now: Millis) -> Self {
        if let Err(e) = config.validate() {
            log::warn!("orb config problem, continuing anyway: {}", e);
        }
        let base_url = match Url::parse(&config.base_url) {
            Ok(u) => Some(u),
            Err(e) => {
                log::warn!("base URL '{}' unusable: {}", config.base_url, e);
                None
            }
        };

        let OrbContext {
            bus,
            hub,
            mut store,
            enhancer,
        } = ctx;

        let built = OrbShellBuilder::new(&config).build(doc);
        let refs = built.refs;
        let mut timers = Timers::new();

        if shell::show_tooltip_once(doc, &refs, store.as_mut()) {
            timers.restart(TimerKind::TooltipHide, now, config.tooltip_ms);
        }

        let chat_dock = config
            .chat_dock
            .then(|| ChatDockPanel::build(doc, refs.container));
        let notifications = config
            .notifications
            .then(|| NotificationSystem::build(doc, refs.container, &config));

        let enhancer = enhancer.or_else(|| default_enhancer(&config));
        let enhancement = match enhancer {
            Some(e) => Enhancement::start(e),
            None => Enhancement::disabled(),
        };

        let mut orb = Self {
            rotation: RotationController::new(&config),
            layout: RadialLayoutEngine::new(&config),
            container_width: config.initial_width,
            shell: Some(built),
            frames: FrameScheduler::new(),
            timers,
            bridge: EventBridge::new(hub),
            chat_dock,
            notifications,
            enhancement,
            base_url,
            now,
            config,
        };

        if let Some(update) = orb.bridge.bind(&bus, doc, refs.container) {
            orb.on_hub_update(doc, update);
        }
        let listeners = bus.publish(BusEvent::OrbReady(refs));
        log::debug!("floating-orb:ready delivered to {} listener(s)", listeners);

        orb.write_rotation(doc);
        orb.mark_active(doc);
        orb.frames.request(FrameLoop::Layout);
        log::info!(
            "floating orb initialized with {} items",
            orb.config.items.len()
        );
        orb
    }

    // ─── Input ──────────────────────────────────────────────────────────────

    pub fn handle_scroll(&mut self, delta_y: f64, now: Millis) -> InputOutcome {
        if self.shell.is_none() {
            return InputOutcome::Ignored;
        }
        self.now = now;
        let outcome = self.rotation.handle_scroll(delta_y, now);
        if outcome == InputOutcome::Accepted {
            self.timers
                .restart(TimerKind::ScrollIdle, now, self.config.scroll_idle_ms);
            self.kick_loops();
        }
        outcome
    }

    /// Touch drag movement. Snapping waits for [`Self::handle_touch_end`].
    pub fn handle_drag_delta(&mut self, delta_y: f64, now: Millis) -> InputOutcome {
        if self.shell.is_none() {
            return InputOutcome::Ignored;
        }
        self.now = now;
        let outcome = self.rotation.handle_drag_delta(delta_y);
        self.timers.clear(TimerKind::ScrollIdle);
        self.timers.clear(TimerKind::TouchIdle);
        self.kick_loops();
        outcome
    }

    pub fn handle_touch_end(&mut self, now: Millis) {
        if self.shell.is_none() {
            return;
        }
        self.now = now;
        self.timers
            .restart(TimerKind::TouchIdle, now, self.config.touch_idle_ms);
    }

    /// The container was resized; re-measure and re-dock once it settles.
    pub fn handle_resize(&mut self, container_width: f64, now: Millis) {
        if self.shell.is_none() {
            return;
        }
        self.now = now;
        self.container_width = container_width;
        self.timers
            .restart(TimerKind::ResizeDebounce, now, self.config.resize_debounce_ms);
    }

    /// Run a nav item's action.
    pub fn activate(&mut self, doc: &mut Document, index: usize) -> OrbAction {
        let Some(shell) = &self.shell else {
            return OrbAction::Ignored;
        };
        let Some(item) = shell.items.get(index) else {
            log::warn!("no nav item at index {}", index);
            return OrbAction::Ignored;
        };
        let container = shell.refs.container;
        let title = item.title.clone();

        match item.action.clone() {
            NavAction::Navigate { href } => match self.resolve(&href) {
                Some(url) => {
                    log::info!("orb navigate ({}): {}", title, url);
                    OrbAction::Navigate(url)
                }
                None => OrbAction::Ignored,
            },
            NavAction::ToggleChat => {
                if self.bridge.request_chat_toggle() {
                    return OrbAction::ChatRequested;
                }
                match self.chat_dock.as_mut() {
                    Some(dock) => {
                        let open = dock.toggle(doc, container);
                        if let Some(state) = self.bridge.last_state() {
                            dock.sync(doc, state);
                        }
                        OrbAction::ChatDock(open)
                    }
                    None => {
                        log::warn!("chat toggle has no hub and no chat dock; ignoring");
                        OrbAction::Ignored
                    }
                }
            }
            NavAction::ToggleNotifications => match self.notifications.as_mut() {
                Some(ns) => OrbAction::Notifications(ns.toggle(doc)),
                None => {
                    log::warn!("notifications are disabled on this page");
                    OrbAction::Ignored
                }
            },
        }
    }

    pub fn activate_by_id(&mut self, doc: &mut Document, id: &str) -> OrbAction {
        let index = self
            .shell
            .as_ref()
            .and_then(|s| s.items.iter().position(|i| i.id == id));
        match index {
            Some(i) => self.activate(doc, i),
            None => {
                log::warn!("no nav item with id '{}'", id);
                OrbAction::Ignored
            }
        }
    }

    /// Raise a toast if this page has a notification stack.
    pub fn notify(&mut self, doc: &mut Document, kind: ToastKind, title: &str, body: &str) -> Option<u64> {
        match self.notifications.as_mut() {
            Some(ns) => Some(ns.push(doc, &mut self.timers, self.now, kind, title, body)),
            None => {
                log::debug!("notification dropped (disabled): {}", title);
                None
            }
        }
    }

    fn resolve(&self, href: &str) -> Option<Url> {
        let result = match &self.base_url {
            Some(base) => base.join(href),
            None => Url::parse(href),
        };
        match result {
            Ok(url) => Some(url),
            Err(e) => {
                log::warn!("cannot resolve nav href '{}': {}", href, e);
                None
            }
        }
    }

    // ─── Frame / timer pump ─────────────────────────────────────────────────

    /// Advance the orb to `now`: apply hub events, fire due timers, then run
    /// the frame loops that were requested before this call.
    pub fn tick(&mut self, doc: &mut Document, now: Millis) {
        let Some(refs) = self.refs() else {
            return;
        };
        self.now = now;

        self.enhancement.poll(doc, &refs);

        for update in self.bridge.pump(doc, refs.container) {
            self.on_hub_update(doc, update);
        }

        for kind in self.timers.due(now) {
            self.on_timer(doc, kind);
        }

        for which in self.frames.take_due() {
            match which {
                FrameLoop::Rotation => self.rotation_frame(doc),
                FrameLoop::Layout => self.layout_frame(doc),
            }
        }
    }

    fn kick_loops(&mut self) {
        self.frames.request(FrameLoop::Rotation);
        self.frames.request(FrameLoop::Layout);
    }

    fn rotation_frame(&mut self, doc: &mut Document) {
        let more = self.rotation.step();
        self.write_rotation(doc);
        if more {
            self.frames.request(FrameLoop::Rotation);
        }
    }

    fn layout_frame(&mut self, doc: &mut Document) {
        let Some(shell) = &self.shell else {
            return;
        };
        let nodes = shell.item_nodes();
        let chat_index = shell
            .items
            .iter()
            .position(|i| i.action == NavAction::ToggleChat);

        let moved = self.layout.frame(self.rotation.current(), doc, &nodes);

        if let (Some(dock), Some(i)) = (&self.chat_dock, chat_index) {
            if let Some(p) = self.layout.placements().get(i) {
                dock.follow(doc, p);
            }
        }
        if moved {
            self.frames.request(FrameLoop::Layout);
        }
    }

    fn write_rotation(&self, doc: &mut Document) {
        let Some(refs) = self.refs() else {
            return;
        };
        let current = self.rotation.current();
        doc.set_style(refs.scroll_line, "--orb-rotation", &format!("{:.3}deg", current));
        doc.set_style(refs.scroll_line, "transform", &format!("rotate({:.3}deg)", current));
    }

    fn on_timer(&mut self, doc: &mut Document, kind: TimerKind) {
        let Some(refs) = self.refs() else {
            return;
        };
        match kind {
            TimerKind::ScrollIdle | TimerKind::TouchIdle => {
                self.rotation.mark_pending_snap();
                if self.rotation.snap_to_nearest_lock_point().is_some() {
                    doc.add_class(refs.scroll_line, SNAP_PULSE_CLASS);
                    self.timers
                        .restart(TimerKind::SnapPulse, self.now, self.config.snap_pulse_ms);
                    self.mark_active(doc);
                }
                self.kick_loops();
            }
            TimerKind::SnapPulse => doc.remove_class(refs.scroll_line, SNAP_PULSE_CLASS),
            TimerKind::TooltipHide => shell::hide_tooltip(doc, &refs),
            TimerKind::MessagePing => bridge::end_ping(doc, refs.container),
            TimerKind::ResizeDebounce => self.on_resize_settled(doc),
            TimerKind::Toast(id) => {
                if let Some(ns) = self.notifications.as_mut() {
                    ns.dismiss(doc, &mut self.timers, id);
                }
            }
        }
    }

    fn on_resize_settled(&mut self, doc: &mut Document) {
        // Restart the layout loop from scratch with the new radius.
        if let Some(handle) = self.frames.handle_for(FrameLoop::Layout) {
            self.frames.cancel(handle);
        }
        self.layout.measure(self.container_width);
        if let Some(mounted) = self.shell.as_mut() {
            doc.set_style(
                mounted.refs.container,
                "width",
                &format!("{}px", self.container_width),
            );
            if let Some(dock) = shell::redock(doc, mounted) {
                log::debug!("orb re-docked after resize: {:?}", dock);
            }
        }
        self.frames.request(FrameLoop::Layout);
    }

    fn on_hub_update(&mut self, doc: &mut Document, update: BridgeUpdate) {
        if update.pinged {
            self.timers
                .restart(TimerKind::MessagePing, self.now, self.config.message_ping_ms);
        }
        if let (Some(dock), Some(state)) = (self.chat_dock.as_mut(), self.bridge.last_state()) {
            dock.sync(doc, state);
        }

        let dock_open = self.chat_dock.as_ref().is_some_and(|d| d.is_open());
        if update.new_messages > 0 && !update.chatbot_active && !dock_open {
            let preview = self
                .bridge
                .last_state()
                .and_then(|s| s.chatbot.messages.last())
                .map(|m| m.text.clone())
                .unwrap_or_default();
            self.notify(doc, ToastKind::Message, "New message", &preview);
        }
    }

    /// Tag the item sitting at the front lock position.
    fn mark_active(&self, doc: &mut Document) {
        let (Some(shell), Some(front)) = (&self.shell, self.active_index()) else {
            return;
        };
        for (i, item) in shell.items.iter().enumerate() {
            doc.toggle_class(item.node, "active", i == front);
        }
        doc.set_attr(shell.refs.container, "data-active-item", &shell.items[front].id);
    }

    // ─── Teardown ───────────────────────────────────────────────────────────

    /// Cancel both frame loops and all timers, stop listening to the bus and
    /// release the orb's nodes from the page. Safe to call twice.
    pub fn destroy(&mut self, doc: &mut Document) {
        let Some(shell) = self.shell.take() else {
            return;
        };
        for which in [FrameLoop::Rotation, FrameLoop::Layout] {
            if let Some(handle) = self.frames.handle_for(which) {
                self.frames.cancel(handle);
            }
        }
        self.timers.clear_all();
        self.bridge.unbind();
        self.chat_dock = None;
        self.notifications = None;
        doc.drop_subtree(shell.refs.container);
        log::info!("floating orb destroyed");
    }

    // ─── Accessors ──────────────────────────────────────────────────────────

    pub fn config(&self) -> &OrbConfig {
        &self.config
    }

    pub fn rotation(&self) -> &RotationController {
        &self.rotation
    }

    pub fn layout(&self) -> &RadialLayoutEngine {
        &self.layout
    }

    pub fn placements(&self) -> &[ItemPlacement] {
        self.layout.placements()
    }

    pub fn refs(&self) -> Option<OrbDomRefs> {
        self.shell.as_ref().map(|s| s.refs)
    }

    pub fn items(&self) -> &[NavItem] {
        self.shell.as_ref().map(|s| s.items.as_slice()).unwrap_or(&[])
    }

    pub fn is_mounted(&self) -> bool {
        self.shell.is_some()
    }

    pub fn chat_dock(&self) -> Option<&ChatDockPanel> {
        self.chat_dock.as_ref()
    }

    pub fn notifications(&self) -> Option<&NotificationSystem> {
        self.notifications.as_ref()
    }

    pub fn frames(&self) -> &FrameScheduler {
        &self.frames
    }

    pub fn timers(&self) -> &Timers {
        &self.timers
    }

    /// Index of the nav item at the front lock position.
    pub fn active_index(&self) -> Option<usize> {
        let n = self.items().len();
        let lock = self.rotation.lock_index()?;
        Some((n - lock) % n)
    }

    /// Nothing scheduled: the host may stop repainting.
    pub fn is_idle(&self) -> bool {
        self.frames.pending_count() == 0
            && self.timers.is_empty()
            && self.enhancement.status() != EnhancementStatus::Loading
    }

    pub fn has_pending_frames(&self) -> bool {
        self.frames.pending_count() > 0
    }

    pub fn next_deadline(&self) -> Option<Millis> {
        self.timers.next_deadline()
    }

    pub fn enhancement_status(&self) -> EnhancementStatus {
        self.enhancement.status()
    }

    /// Block up to `timeout` for the sphere load to settle.
    pub fn wait_for_enhancement(&mut self, doc: &mut Document, timeout: Duration) -> EnhancementStatus {
        match self.refs() {
            Some(refs) => self.enhancement.wait(doc, &refs, timeout),
            None => self.enhancement.status(),
        }
    }
}

#[cfg(feature = "cdn-sphere")]
fn default_enhancer(config: &OrbConfig) -> Option<Arc<dyn SphereEnhancer>> {
    config
        .sphere_url
        .as_ref()
        .map(|url| Arc::new(enhance::CdnSphereLoader::new(url.clone())) as Arc<dyn SphereEnhancer>)
}

#[cfg(not(feature = "cdn-sphere"))]
fn default_enhancer(config: &OrbConfig) -> Option<Arc<dyn SphereEnhancer>> {
    if config.sphere_url.is_some() {
        log::warn!("sphere_url set but built without the cdn-sphere feature");
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{ChatMessage, HubChange, HubState};

    fn orb_on_blank_page(config: OrbConfig) -> (Document, FloatingOrb, EventBus) {
        let mut doc = Document::new();
        let bus = EventBus::new();
        let orb = FloatingOrb::init(&mut doc, config, OrbContext::new(bus.clone()), 0.0);
        (doc, orb, bus)
    }

    fn run_until_idle(orb: &mut FloatingOrb, doc: &mut Document, mut now: Millis) -> Millis {
        for _ in 0..10_000 {
            if orb.frames().pending_count() == 0
                && !orb.timers().is_armed(TimerKind::ScrollIdle)
                && !orb.timers().is_armed(TimerKind::TouchIdle)
                && !orb.timers().is_armed(TimerKind::ResizeDebounce)
            {
                return now;
            }
            now += 16.0;
            orb.tick(doc, now);
        }
        panic!("orb never settled");
    }

    #[test]
    fn touch_release_snaps_after_100ms() {
        let (mut doc, mut orb, _bus) = orb_on_blank_page(OrbConfig::default().with_sensitivity(1.0));
        orb.handle_drag_delta(20.0, 0.0); // 40 degrees
        orb.tick(&mut doc, 16.0);
        orb.handle_touch_end(20.0);
        orb.tick(&mut doc, 110.0);
        assert!(!orb.rotation().is_locked());
        orb.tick(&mut doc, 120.0);
        assert!(orb.rotation().is_locked());
        assert_eq!(orb.rotation().target(), 60.0);
        let refs = orb.refs().unwrap();
        assert!(doc.has_class(refs.scroll_line, SNAP_PULSE_CLASS));
        orb.tick(&mut doc, 330.0);
        assert!(!doc.has_class(refs.scroll_line, SNAP_PULSE_CLASS));
    }

    #[test]
    fn active_item_follows_lock() {
        let (mut doc, mut orb, _bus) = orb_on_blank_page(OrbConfig::default().with_sensitivity(1.0));
        assert_eq!(orb.active_index(), Some(0));
        orb.handle_scroll(60.0, 0.0);
        run_until_idle(&mut orb, &mut doc, 0.0);
        // Ring turned +60: item 5 (offset 300) is now at the front.
        assert_eq!(orb.active_index(), Some(5));
        let container = orb.refs().unwrap().container;
        assert_eq!(doc.attr(container, "data-active-item"), Some("alerts"));
        assert!(doc.has_class(orb.items()[5].node, "active"));
        assert!(!doc.has_class(orb.items()[0].node, "active"));
    }

    #[test]
    fn layout_loop_parks_when_still() {
        let (mut doc, mut orb, _bus) = orb_on_blank_page(OrbConfig::default());
        orb.tick(&mut doc, 16.0);
        orb.tick(&mut doc, 32.0);
        assert!(!orb.frames().is_pending(FrameLoop::Layout));
        assert_eq!(orb.placements().len(), 6);
    }

    #[test]
    fn navigate_resolves_against_base() {
        let (mut doc, mut orb, _bus) = orb_on_blank_page(OrbConfig::default());
        match orb.activate_by_id(&mut doc, "studio") {
            OrbAction::Navigate(url) => assert_eq!(url.as_str(), "https://inque.app/studio"),
            other => panic!("expected navigate, got {other:?}"),
        }
        assert_eq!(orb.activate(&mut doc, 99), OrbAction::Ignored);
    }

    #[test]
    fn chat_toggle_falls_back_to_dock() {
        let (mut doc, mut orb, _bus) = orb_on_blank_page(OrbConfig::default());
        assert_eq!(orb.activate_by_id(&mut doc, "chat"), OrbAction::ChatDock(true));
        assert!(orb.chat_dock().unwrap().is_open());

        let (mut doc, mut orb, _bus) =
            orb_on_blank_page(OrbConfig::default().with_chat_dock(false));
        assert_eq!(orb.activate_by_id(&mut doc, "chat"), OrbAction::Ignored);
    }

    #[test]
    fn new_messages_raise_toast_when_chat_closed() {
        let (mut doc, mut orb, bus) = orb_on_blank_page(OrbConfig::default());
        let mut state = HubState::default();
        bus.publish(BusEvent::HubStateChanged {
            state: state.clone(),
            changes: Vec::new(),
        });
        orb.tick(&mut doc, 16.0);

        state.chatbot.messages.push(ChatMessage {
            role: "assistant".into(),
            text: "your widget is live".into(),
        });
        bus.publish(BusEvent::HubStateChanged {
            state,
            changes: vec![HubChange::Messages],
        });
        orb.tick(&mut doc, 32.0);

        let toasts: Vec<_> = orb.notifications().unwrap().toasts().collect();
        assert_eq!(toasts.len(), 1);
        assert_eq!(toasts[0].body, "your widget is live");
        assert!(doc.has_class(orb.refs().unwrap().container, bridge::MESSAGE_PING_CLASS));
        assert_eq!(orb.chat_dock().unwrap().lines(&doc), vec!["your widget is live"]);
    }

    #[test]
    fn resize_remeasures_after_debounce() {
        let (mut doc, mut orb, _bus) = orb_on_blank_page(OrbConfig::default());
        orb.handle_resize(460.0, 0.0);
        orb.tick(&mut doc, 100.0);
        assert!((orb.layout().radius() - 360.0 / 2.3).abs() < 1e-9);
        orb.tick(&mut doc, 250.0);
        assert!((orb.layout().radius() - 200.0).abs() < 1e-9);
        assert!(orb.frames().is_pending(FrameLoop::Layout));
    }

    #[test]
    fn destroy_cancels_everything() {
        let (mut doc, mut orb, bus) = orb_on_blank_page(OrbConfig::default());
        orb.handle_scroll(50.0, 0.0);
        assert!(orb.frames().pending_count() > 0);
        let container = orb.refs().unwrap().container;

        orb.destroy(&mut doc);
        assert!(!orb.is_mounted());
        assert_eq!(orb.frames().pending_count(), 0);
        assert!(orb.timers().is_empty());
        assert!(!doc.is_connected(container));
        assert_eq!(orb.handle_scroll(10.0, 100.0), InputOutcome::Ignored);

        bus.publish(BusEvent::HubStateChanged {
            state: HubState::default(),
            changes: Vec::new(),
        });
        assert_eq!(bus.subscriber_count(), 0);
        orb.tick(&mut doc, 200.0);
        orb.destroy(&mut doc);
    }

    #[test]
    fn hub_churn_keeps_document_flat() {
        let (mut doc, mut orb, bus) = orb_on_blank_page(OrbConfig::default());
        let mut state = HubState::default();
        for i in 0..5 {
            state.chatbot.messages.push(ChatMessage {
                role: "assistant".into(),
                text: format!("m{i}"),
            });
        }
        let mut now = 0.0;
        bus.publish(BusEvent::HubStateChanged {
            state: state.clone(),
            changes: vec![HubChange::Messages],
        });
        orb.tick(&mut doc, now);
        let before = doc.allocated_count();
        let connected = doc.connected_count();

        for i in 0..2000 {
            state.chatbot.is_typing = i % 2 == 0;
            bus.publish(BusEvent::HubStateChanged {
                state: state.clone(),
                changes: vec![HubChange::Typing],
            });
            now += 16.0;
            orb.tick(&mut doc, now);
        }
        assert_eq!(doc.allocated_count(), before);
        assert_eq!(doc.connected_count(), connected);

        let page_only = Document::new().allocated_count();
        orb.destroy(&mut doc);
        assert_eq!(doc.allocated_count(), page_only);
    }

    #[test]
    fn toasts_release_their_nodes() {
        let (mut doc, mut orb, _bus) = orb_on_blank_page(OrbConfig::default());
        let before = doc.allocated_count();
        for i in 0..50 {
            orb.notify(&mut doc, ToastKind::Info, "t", &i.to_string());
        }
        // Three stay visible; evicted ones give their slots back.
        assert_eq!(doc.allocated_count(), before + 3);
        orb.tick(&mut doc, 10_000.0);
        assert_eq!(doc.allocated_count(), before);
    }

    #[test]
    fn tooltip_hides_after_timeout() {
        let (mut doc, mut orb, _bus) = orb_on_blank_page(OrbConfig::default());
        let tooltip = orb.refs().unwrap().tooltip;
        assert!(doc.has_class(tooltip, "visible"));
        orb.tick(&mut doc, 3199.0);
        assert!(doc.has_class(tooltip, "visible"));
        orb.tick(&mut doc, 3200.0);
        assert!(!doc.has_class(tooltip, "visible"));
    }
}
