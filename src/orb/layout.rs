/// Radial layout of nav items on the orbit ring.
///
/// Items sit on an ellipse around the orb: a circle of `radius` squashed
/// vertically by `tilt`, which reads as a ring seen from slightly above.
/// - Item `i` of `n` has base angle `360·i/n`
/// - The whole ring is offset by the current rotation
/// - Items on the right half (cos > 0) are drawn above the orb sphere

use crate::config::OrbConfig;
use crate::dom::{Document, NodeId};

/// Screen offset of one item relative to the orb center.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ItemPlacement {
    pub x: f64,
    pub y: f64,
    /// Item angle in degrees, normalized to [0, 360).
    pub angle: f64,
    pub in_front: bool,
}

/// Base angle of item `i` in degrees.
pub fn angle_offset(i: usize, n: usize) -> f64 {
    if n == 0 {
        return 0.0;
    }
    i as f64 * 360.0 / n as f64
}

/// Project item `i` of `n` for the given rotation.
pub fn project(i: usize, n: usize, rotation_deg: f64, radius: f64, tilt: f64) -> ItemPlacement {
    let angle = (angle_offset(i, n) + rotation_deg).rem_euclid(360.0);
    let rad = angle.to_radians();
    ItemPlacement {
        x: rad.cos() * radius,
        y: rad.sin() * radius * tilt,
        angle,
        // Decided on degrees, not on cos(), so 90°/270° are exactly "behind".
        in_front: angle < 90.0 || angle > 270.0,
    }
}

#[derive(Debug, Clone)]
pub struct RadialLayoutEngine {
    tilt: f64,
    radius_divisor: f64,
    radius: f64,
    placements: Vec<ItemPlacement>,
    last_rotation: Option<f64>,
}

impl RadialLayoutEngine {
    pub fn new(config: &OrbConfig) -> Self {
        let mut engine = Self {
            tilt: config.tilt,
            radius_divisor: config.radius_divisor,
            radius: 0.0,
            placements: Vec::with_capacity(config.items.len()),
            last_rotation: None,
        };
        engine.measure(config.initial_width);
        engine
    }

    /// Derive the orbit radius from the container's width.
    pub fn measure(&mut self, container_width: f64) {
        self.radius = container_width.max(0.0) / self.radius_divisor;
        // Force the next frame to rewrite every item.
        self.last_rotation = None;
    }

    pub fn radius(&self) -> f64 {
        self.radius
    }

    pub fn placements(&self) -> &[ItemPlacement] {
        &self.placements
    }

    /// Recompute all placements for `rotation` and write them to the item
    /// nodes. Returns whether the rotation moved since the previous frame,
    /// which is what keeps the layout loop alive.
    pub fn frame(&mut self, rotation: f64, doc: &mut Document, items: &[NodeId]) -> bool {
        let moved = match self.last_rotation {
            Some(prev) => (prev - rotation).abs() > 1e-6,
            None => true,
        };
        self.last_rotation = Some(rotation);

        let n = items.len();
        self.placements.clear();
        for (i, node) in items.iter().enumerate() {
            let p = project(i, n, rotation, self.radius, self.tilt);
            doc.set_style(
                *node,
                "transform",
                &format!("translate(-50%, -50%) translate({:.2}px, {:.2}px)", p.x, p.y),
            );
            doc.set_style(*node, "z-index", if p.in_front { "3" } else { "1" });
            doc.toggle_class(*node, "in-front", p.in_front);
            doc.set_attr(*node, "aria-hidden", if p.in_front { "false" } else { "true" });
            self.placements.push(p);
        }
        moved
    }
}
