//! End-to-end behaviour of the floating orb against parsed pages.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use inque_orb::dom::parser::parse_html;
use inque_orb::dom::Document;
use inque_orb::events::{HubChange, HubMode};
use inque_orb::orb::enhance::{EnhancementStatus, SphereEnhancer, SphereModule};
use inque_orb::orb::rotation::{InputOutcome, RotationController};
use inque_orb::orb::shell::INLINE_CLASS;
use inque_orb::scheduler::{Millis, TimerKind};
use inque_orb::store::JsonFileStore;
use inque_orb::{
    BusEvent, EventBus, FloatingOrb, HubState, OrbAction, OrbConfig, OrbContext, OrbError, ProfileHub, Result,
};

const HOME_PAGE: &str = r#"<html><body>
  <header>
    <div id="title-container"><h1>inque</h1></div>
    <p id="home-subtitle">make widgets</p>
  </header>
</body></html>"#;

const BARE_PAGE: &str = "<html><body><main id=\"feed\"></main></body></html>";

fn init_on(html: &str, config: OrbConfig, ctx: OrbContext) -> (Document, FloatingOrb) {
    let mut doc = parse_html(html);
    let orb = FloatingOrb::init(&mut doc, config, ctx, 0.0);
    (doc, orb)
}

/// Tick at ~60fps until no frame loop or input timer is outstanding.
fn settle(orb: &mut FloatingOrb, doc: &mut Document, mut now: Millis) -> Millis {
    for _ in 0..10_000 {
        now += 16.0;
        orb.tick(doc, now);
        let input_pending = orb.timers().is_armed(TimerKind::ScrollIdle)
            || orb.timers().is_armed(TimerKind::TouchIdle);
        if !orb.has_pending_frames() && !input_pending {
            return now;
        }
    }
    panic!("orb did not settle");
}

struct StaticHub(HubState);

impl ProfileHub for StaticHub {
    fn state(&self) -> HubState {
        self.0.clone()
    }
}

/// Hub that flips chatbot mode and announces it on the bus.
struct TogglingHub {
    bus: EventBus,
    state: Mutex<HubState>,
}

impl ProfileHub for TogglingHub {
    fn state(&self) -> HubState {
        self.state.lock().unwrap().clone()
    }

    fn toggle_chatbot(&self) -> Result<()> {
        let snapshot = {
            let mut s = self.state.lock().unwrap();
            s.ui.hub_state = if s.chatbot_active() {
                HubMode::Closed
            } else {
                HubMode::ChatbotActive
            };
            s.clone()
        };
        self.bus.publish(BusEvent::HubStateChanged {
            state: snapshot,
            changes: vec![HubChange::HubState],
        });
        Ok(())
    }
}

struct FailingSphere;

impl SphereEnhancer for FailingSphere {
    fn load(&self) -> Result<SphereModule> {
        Err(OrbError::Enhancement("module host unreachable".into()))
    }
}

struct LocalSphere;

impl SphereEnhancer for LocalSphere {
    fn load(&self) -> Result<SphereModule> {
        Ok(SphereModule {
            source: "local://sphere.js".into(),
            bytes: 2048,
        })
    }
}

#[test]
fn wheel_burst_snaps_to_half_turn() {
    let config = OrbConfig::default().with_sensitivity(1.0);
    let (mut doc, mut orb) = init_on(HOME_PAGE, config, OrbContext::new(EventBus::new()));

    assert_eq!(orb.handle_scroll(100.0, 0.0), InputOutcome::Accepted);
    assert_eq!(orb.handle_scroll(85.0, 20.0), InputOutcome::Accepted);
    assert_eq!(orb.rotation().target(), 185.0);
    assert!(!orb.rotation().is_locked());

    settle(&mut orb, &mut doc, 20.0);

    assert!(orb.rotation().is_locked());
    assert_eq!(orb.rotation().target(), 180.0);
    assert!((orb.rotation().current() - 180.0).abs() <= 0.1);
    assert_eq!(orb.active_index(), Some(3));
}

#[test]
fn wheel_events_inside_throttle_window_are_dropped() {
    let (_doc, mut orb) = init_on(BARE_PAGE, OrbConfig::default(), OrbContext::new(EventBus::new()));
    assert_eq!(orb.handle_scroll(40.0, 0.0), InputOutcome::Accepted);
    assert_eq!(orb.handle_scroll(40.0, 10.0), InputOutcome::Throttled);
    assert_eq!(orb.rotation().target(), 20.0);
}

#[test]
fn docks_between_title_and_subtitle() {
    let (doc, orb) = init_on(HOME_PAGE, OrbConfig::default(), OrbContext::new(EventBus::new()));
    let container = orb.refs().unwrap().container;
    let title = doc.get_element_by_id("title-container").unwrap();
    let subtitle = doc.get_element_by_id("home-subtitle").unwrap();

    assert!(doc.has_class(container, INLINE_CLASS));
    assert_eq!(doc.parent(container), doc.parent(title));
    let siblings = doc.children(doc.parent(title).unwrap());
    let at = |n| siblings.iter().position(|&c| c == n).unwrap();
    assert_eq!(at(container) + 1, at(subtitle));
    assert!(at(title) < at(container));
}

#[test]
fn page_without_title_docks_to_body() {
    let (doc, orb) = init_on(BARE_PAGE, OrbConfig::default(), OrbContext::new(EventBus::new()));
    let container = orb.refs().unwrap().container;
    assert_eq!(doc.parent(container), Some(doc.body()));
    assert!(!doc.has_class(container, INLINE_CLASS));
    assert_eq!(orb.items().len(), 6);
}

#[test]
fn hub_event_marks_chatbot_and_typing() {
    let bus = EventBus::new();
    let (mut doc, mut orb) = init_on(HOME_PAGE, OrbConfig::default(), OrbContext::new(bus.clone()));

    let state = HubState::from_json(
        r#"{"ui":{"hubState":"chatbot-active"},"chatbot":{"isTyping":true,"messages":[]}}"#,
    )
    .unwrap();
    bus.publish(BusEvent::HubStateChanged {
        state,
        changes: vec![HubChange::HubState, HubChange::Typing],
    });
    orb.tick(&mut doc, 16.0);

    let container = orb.refs().unwrap().container;
    assert_eq!(doc.attr(container, "data-chatbot"), Some("active"));
    assert_eq!(doc.attr(container, "data-typing"), Some("true"));
}

#[test]
fn hub_present_at_bind_syncs_immediately() {
    let mut state = HubState::default();
    state.ui.hub_state = HubMode::ChatbotActive;
    let ctx = OrbContext::new(EventBus::new()).with_hub(Arc::new(StaticHub(state)));
    let (doc, orb) = init_on(HOME_PAGE, OrbConfig::default(), ctx);

    let container = orb.refs().unwrap().container;
    assert_eq!(doc.attr(container, "data-chatbot"), Some("active"));
    assert_eq!(doc.attr(container, "data-typing"), Some("false"));
}

#[test]
fn chat_item_goes_through_hub_when_present() {
    let bus = EventBus::new();
    let hub = Arc::new(TogglingHub {
        bus: bus.clone(),
        state: Mutex::new(HubState::default()),
    });
    let ctx = OrbContext::new(bus).with_hub(hub.clone());
    let (mut doc, mut orb) = init_on(HOME_PAGE, OrbConfig::default(), ctx);

    assert_eq!(orb.activate_by_id(&mut doc, "chat"), OrbAction::ChatRequested);
    assert!(!orb.chat_dock().unwrap().is_open());
    orb.tick(&mut doc, 16.0);
    let container = orb.refs().unwrap().container;
    assert_eq!(doc.attr(container, "data-chatbot"), Some("active"));
    assert!(hub.state().chatbot_active());
}

#[test]
fn ready_event_reaches_other_subscribers() {
    let bus = EventBus::new();
    let rx = bus.subscribe();
    let (_doc, orb) = init_on(BARE_PAGE, OrbConfig::default(), OrbContext::new(bus));
    match rx.try_recv() {
        Ok(BusEvent::OrbReady(refs)) => assert_eq!(Some(refs), orb.refs()),
        other => panic!("expected orb-ready, got {other:?}"),
    }
}

#[test]
fn failed_sphere_keeps_flat_orb_working() {
    let ctx = OrbContext::new(EventBus::new()).with_enhancer(Arc::new(FailingSphere));
    let (mut doc, mut orb) = init_on(HOME_PAGE, OrbConfig::default(), ctx);

    let status = orb.wait_for_enhancement(&mut doc, Duration::from_secs(5));
    assert_eq!(status, EnhancementStatus::Failed);

    let refs = orb.refs().unwrap();
    assert!(doc.is_connected(refs.orb));
    assert!(!doc.has_class(refs.container, "has-sphere"));
    assert_eq!(orb.handle_scroll(60.0, 100.0), InputOutcome::Accepted);
    settle(&mut orb, &mut doc, 100.0);
    assert!(orb.rotation().is_locked());
}

#[test]
fn loaded_sphere_adds_canvas() {
    let ctx = OrbContext::new(EventBus::new()).with_enhancer(Arc::new(LocalSphere));
    let (mut doc, mut orb) = init_on(HOME_PAGE, OrbConfig::default(), ctx);

    let status = orb.wait_for_enhancement(&mut doc, Duration::from_secs(5));
    assert_eq!(status, EnhancementStatus::Applied);
    let refs = orb.refs().unwrap();
    assert!(doc.has_class(refs.container, "has-sphere"));
    assert_eq!(doc.query_class("orb-sphere-canvas").and_then(|c| doc.parent(c)), Some(refs.orb));
}

#[test]
fn tooltip_only_shows_on_first_visit() {
    let dir = tempfile::tempdir().unwrap();
    let prefs = dir.path().join("prefs.json");

    let ctx = OrbContext::new(EventBus::new()).with_store(Box::new(JsonFileStore::open(&prefs).unwrap()));
    let (doc, orb) = init_on(HOME_PAGE, OrbConfig::default(), ctx);
    assert!(doc.has_class(orb.refs().unwrap().tooltip, "visible"));

    let ctx = OrbContext::new(EventBus::new()).with_store(Box::new(JsonFileStore::open(&prefs).unwrap()));
    let (doc, orb) = init_on(HOME_PAGE, OrbConfig::default(), ctx);
    assert!(!doc.has_class(orb.refs().unwrap().tooltip, "visible"));
}

#[test]
fn easing_converges_from_any_gap() {
    for gap in [1.0, 37.5, 180.0, -725.0, 3600.0] {
        let mut rot = RotationController::new(&OrbConfig::default().with_sensitivity(1.0));
        rot.handle_drag_delta(gap / 2.0);
        let mut frames = 0;
        while rot.step() {
            frames += 1;
            assert!(frames < 200, "no convergence for gap {gap}");
        }
        assert!((rot.current() - rot.target()).abs() <= 0.1);
    }
}

#[test]
fn snap_moves_at_most_half_a_slot_and_is_idempotent() {
    let config = OrbConfig::default().with_sensitivity(1.0);
    let mut wheel_at = 0.0;
    let mut rot = RotationController::new(&config);
    for step in 0..80 {
        let delta = (step as f64 * 13.7) % 47.0 - 23.0;
        rot.handle_scroll(delta, wheel_at);
        wheel_at += 20.0;

        let before = rot.target();
        rot.snap_to_nearest_lock_point();
        let after = rot.target();
        assert!((after - before).abs() <= 30.0 + 1e-9, "{before} -> {after}");

        rot.snap_to_nearest_lock_point();
        assert!((rot.target() - after).abs() < 1e-9);
    }
}

#[test]
fn destroy_detaches_and_stops_listening() {
    let bus = EventBus::new();
    let (mut doc, mut orb) = init_on(HOME_PAGE, OrbConfig::default(), OrbContext::new(bus.clone()));
    let container = orb.refs().unwrap().container;
    orb.handle_scroll(30.0, 0.0);

    orb.destroy(&mut doc);
    assert!(!doc.is_connected(container));
    assert!(orb.is_idle());
    bus.publish(BusEvent::HubStateChanged {
        state: HubState::default(),
        changes: Vec::new(),
    });
    assert_eq!(bus.subscriber_count(), 0);
}
