//! DOM skeleton for the orb and its docking into the host page.
//!
//! ```text
//! container.floating-orb-container
//! └── stage.orb-stage
//!     ├── scroll-line.orb-scroll-line
//!     ├── nav.orb-nav
//!     │   └── button.orb-nav-item × N
//!     └── orb.floating-orb
//! tooltip.orb-tooltip (inside container)
//! ```

use crate::config::{NavAction, NavItemConfig, OrbConfig};
use crate::dom::{Document, NodeId};
use crate::orb::layout::angle_offset;
use crate::store::{PreferenceStore, TOOLTIP_SEEN_KEY};

pub const INLINE_CLASS: &str = "inline-under-title";

/// Nodes owned by the orb. Created once, detached on destroy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrbDomRefs {
    pub container: NodeId,
    pub stage: NodeId,
    pub orb: NodeId,
    pub nav: NodeId,
    pub scroll_line: NodeId,
    pub tooltip: NodeId,
}

/// One navigation entry on the ring.
#[derive(Debug, Clone, PartialEq)]
pub struct NavItem {
    pub id: String,
    pub icon: String,
    pub title: String,
    pub action: NavAction,
    /// Degrees; `index * 360 / N`.
    pub angle_offset: f64,
    pub node: NodeId,
}

/// Where the container ended up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dock {
    /// Between the page title and subtitle.
    InlineUnderTitle { title: NodeId },
    /// Appended to `<body>`.
    Body,
}

#[derive(Debug, Clone)]
pub struct OrbShell {
    pub refs: OrbDomRefs,
    pub items: Vec<NavItem>,
    pub dock: Dock,
}

impl OrbShell {
    pub fn item_nodes(&self) -> Vec<NodeId> {
        self.items.iter().map(|i| i.node).collect()
    }
}

pub struct OrbShellBuilder<'a> {
    config: &'a OrbConfig,
}

impl<'a> OrbShellBuilder<'a> {
    pub fn new(config: &'a OrbConfig) -> Self {
        Self { config }
    }

    /// Build the skeleton, dock it and return the refs.
    pub fn build(&self, doc: &mut Document) -> OrbShell {
        let container = element(doc, "div", "floating-orb-container");
        doc.set_attr(container, "id", "floating-orb-container");
        doc.set_attr(container, "data-chatbot", "inactive");
        doc.set_attr(container, "data-typing", "false");
        doc.set_style(container, "width", &format!("{}px", self.config.initial_width));

        let stage = element(doc, "div", "orb-stage");
        let scroll_line = element(doc, "div", "orb-scroll-line");
        doc.set_style(scroll_line, "--orb-rotation", "0deg");
        let nav = element(doc, "nav", "orb-nav");
        doc.set_attr(nav, "aria-label", "Orb navigation");
        let orb = element(doc, "div", "floating-orb");
        doc.set_attr(orb, "role", "button");
        doc.set_attr(orb, "tabindex", "0");
        let tooltip = element(doc, "div", "orb-tooltip");
        doc.set_attr(tooltip, "role", "tooltip");
        doc.set_text(tooltip, &self.config.tooltip_text);

        doc.append_child(container, stage);
        doc.append_child(stage, scroll_line);
        doc.append_child(stage, nav);
        doc.append_child(stage, orb);
        doc.append_child(container, tooltip);

        let n = self.config.items.len();
        let items = self
            .config
            .items
            .iter()
            .enumerate()
            .map(|(i, cfg)| {
                let node = nav_button(doc, cfg);
                doc.append_child(nav, node);
                NavItem {
                    id: cfg.id.clone(),
                    icon: cfg.icon.clone(),
                    title: cfg.title.clone(),
                    action: cfg.action.clone(),
                    angle_offset: angle_offset(i, n),
                    node,
                }
            })
            .collect();

        let refs = OrbDomRefs {
            container,
            stage,
            orb,
            nav,
            scroll_line,
            tooltip,
        };
        let dock = dock(doc, container);
        OrbShell { refs, items, dock }
    }
}

fn element(doc: &mut Document, tag: &str, class: &str) -> NodeId {
    let id = doc.create_element(tag);
    doc.add_class(id, class);
    id
}

fn nav_button(doc: &mut Document, cfg: &NavItemConfig) -> NodeId {
    let node = element(doc, "button", "orb-nav-item");
    doc.set_attr(node, "data-nav-id", &cfg.id);
    doc.set_attr(node, "title", &cfg.title);
    doc.set_attr(node, "aria-label", &cfg.title);
    doc.set_text(node, &cfg.icon);
    node
}

/// Page title element, if the page has one.
fn find_title(doc: &Document) -> Option<NodeId> {
    doc.get_element_by_id("title-container")
        .or_else(|| doc.query_class("title-main-container"))
}

/// Place `container` under the page title, or at the end of `<body>`.
pub fn dock(doc: &mut Document, container: NodeId) -> Dock {
    match find_title(doc) {
        Some(title) => {
            let subtitle = doc
                .get_element_by_id("home-subtitle")
                .filter(|s| doc.parent(*s).is_some() && doc.parent(*s) == doc.parent(title));
            match (subtitle, doc.parent(title)) {
                (Some(sub), Some(parent)) => doc.insert_before(parent, container, sub),
                _ => {
                    doc.insert_after(title, container);
                }
            }
            doc.add_class(container, INLINE_CLASS);
            log::debug!("orb docked inline under title");
            Dock::InlineUnderTitle { title }
        }
        None => {
            log::warn!("no #title-container or .title-main-container; docking orb to <body>");
            let body = doc.body();
            doc.append_child(body, container);
            doc.remove_class(container, INLINE_CLASS);
            Dock::Body
        }
    }
}

/// Re-run docking if the page title appeared or disappeared since the
/// last dock. Returns the new dock when it changed.
pub fn redock(doc: &mut Document, shell: &mut OrbShell) -> Option<Dock> {
    let title = find_title(doc);
    let unchanged = match (shell.dock, title) {
        (Dock::Body, None) => true,
        (Dock::InlineUnderTitle { title: old }, Some(new)) => {
            old == new && doc.is_connected(shell.refs.container)
        }
        _ => false,
    };
    if unchanged {
        return None;
    }
    shell.dock = dock(doc, shell.refs.container);
    Some(shell.dock)
}

/// Show the one-time tooltip unless this profile has already seen it.
/// Returns whether it was shown.
pub fn show_tooltip_once(doc: &mut Document, refs: &OrbDomRefs, store: &mut dyn PreferenceStore) -> bool {
    if store.get(TOOLTIP_SEEN_KEY).as_deref() == Some("true") {
        return false;
    }
    doc.add_class(refs.tooltip, "visible");
    if let Err(e) = store.set(TOOLTIP_SEEN_KEY, "true") {
        log::warn!("could not persist tooltip flag: {}", e);
    }
    true
}

pub fn hide_tooltip(doc: &mut Document, refs: &OrbDomRefs) {
    doc.remove_class(refs.tooltip, "visible");
}
