//! Orb configuration.
//!
//! One engine serves every page variant; pages differ only in their nav item
//! set and in which secondary surfaces (chat dock, notifications) they enable.

use std::path::Path;

use serde::Deserialize;

use crate::error::{OrbError, Result};

/// What a nav item does when activated.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum NavAction {
    /// Go to `href`, resolved against [`OrbConfig::base_url`].
    Navigate { href: String },
    /// Toggle the chatbot (hub first, local chat dock as fallback).
    ToggleChat,
    /// Toggle the notification stack.
    ToggleNotifications,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NavItemConfig {
    pub id: String,
    pub icon: String,
    pub title: String,
    pub action: NavAction,
}

impl NavItemConfig {
    pub fn new(id: &str, icon: &str, title: &str, action: NavAction) -> Self {
        Self {
            id: id.to_string(),
            icon: icon.to_string(),
            title: title.to_string(),
            action,
        }
    }

    fn link(id: &str, icon: &str, title: &str, href: &str) -> Self {
        Self::new(id, icon, title, NavAction::Navigate { href: href.to_string() })
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OrbConfig {
    pub items: Vec<NavItemConfig>,
    pub base_url: String,
    pub chat_dock: bool,
    pub notifications: bool,
    /// Degrees of rotation per wheel delta unit.
    pub sensitivity: f64,
    /// Touch drag multiplier on top of `sensitivity`.
    pub touch_multiplier: f64,
    pub easing: f64,
    /// Rest threshold in degrees.
    pub epsilon: f64,
    pub wheel_throttle_ms: f64,
    pub scroll_idle_ms: f64,
    pub touch_idle_ms: f64,
    pub resize_debounce_ms: f64,
    pub snap_pulse_ms: f64,
    pub message_ping_ms: f64,
    pub tooltip_ms: f64,
    pub toast_ms: f64,
    pub max_toasts: usize,
    pub tilt: f64,
    /// Orbit radius is `container_width / radius_divisor`.
    pub radius_divisor: f64,
    pub initial_width: f64,
    pub tooltip_text: String,
    /// Where the optional sphere module is fetched from.
    pub sphere_url: Option<String>,
}

impl Default for OrbConfig {
    fn default() -> Self {
        Self {
            items: vec![
                NavItemConfig::link("home", "\u{2302}", "Home", "/"),
                NavItemConfig::link("profile", "\u{263A}", "Profile", "/profile"),
                NavItemConfig::link("studio", "\u{270E}", "Studio", "/studio"),
                NavItemConfig::new("chat", "\u{2709}", "Chat", NavAction::ToggleChat),
                NavItemConfig::link("canvas", "\u{25A6}", "Canvas", "/canvas"),
                NavItemConfig::new(
                    "alerts",
                    "\u{2691}",
                    "Notifications",
                    NavAction::ToggleNotifications,
                ),
            ],
            base_url: "https://inque.app/".to_string(),
            chat_dock: true,
            notifications: true,
            sensitivity: 0.5,
            touch_multiplier: 2.0,
            easing: 0.15,
            epsilon: 0.1,
            wheel_throttle_ms: 16.0,
            scroll_idle_ms: 150.0,
            touch_idle_ms: 100.0,
            resize_debounce_ms: 250.0,
            snap_pulse_ms: 200.0,
            message_ping_ms: 600.0,
            tooltip_ms: 3200.0,
            toast_ms: 4000.0,
            max_toasts: 3,
            tilt: 0.3,
            radius_divisor: 2.3,
            initial_width: 360.0,
            tooltip_text: "Scroll to spin \u{00B7} click an icon to go".to_string(),
            sphere_url: None,
        }
    }
}

impl OrbConfig {
    /// Parse a TOML document; missing keys keep their defaults.
    pub fn from_toml_str(src: &str) -> Result<Self> {
        let config: OrbConfig = toml::from_str(src)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let src = std::fs::read_to_string(path)?;
        Self::from_toml_str(&src)
    }

    pub fn with_items(mut self, items: Vec<NavItemConfig>) -> Self {
        self.items = items;
        self
    }

    pub fn with_chat_dock(mut self, enabled: bool) -> Self {
        self.chat_dock = enabled;
        self
    }

    pub fn with_notifications(mut self, enabled: bool) -> Self {
        self.notifications = enabled;
        self
    }

    pub fn with_sensitivity(mut self, sensitivity: f64) -> Self {
        self.sensitivity = sensitivity;
        self
    }

    pub fn with_sphere_url(mut self, url: impl Into<String>) -> Self {
        self.sphere_url = Some(url.into());
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.items.is_empty() {
            return Err(OrbError::Config("at least one nav item is required".into()));
        }
        if !(self.easing > 0.0 && self.easing <= 1.0) {
            return Err(OrbError::Config(format!(
                "easing must be in (0, 1], got {}",
                self.easing
            )));
        }
        if self.epsilon <= 0.0 {
            return Err(OrbError::Config("epsilon must be positive".into()));
        }
        if self.radius_divisor <= 0.0 {
            return Err(OrbError::Config("radius_divisor must be positive".into()));
        }
        let mut seen = std::collections::HashSet::new();
        for item in &self.items {
            if !seen.insert(item.id.as_str()) {
                return Err(OrbError::Config(format!("duplicate nav item id '{}'", item.id)));
            }
        }
        url::Url::parse(&self.base_url)?;
        Ok(())
    }

    /// Lock points, one per nav item, evenly spaced from 0°.
    pub fn lock_points(&self) -> Vec<f64> {
        let n = self.items.len();
        (0..n).map(|i| i as f64 * 360.0 / n as f64).collect()
    }
}
