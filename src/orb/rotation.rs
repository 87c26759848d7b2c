//! Scroll/drag driven ring rotation with lock-point snapping.
//!
//! Input only ever moves `target_rotation`; the per-frame easing step moves
//! `current_rotation` a fixed fraction of the remaining distance, so the gap
//! shrinks geometrically and the loop stops once it drops under `epsilon`.

use crate::config::OrbConfig;
use crate::scheduler::Millis;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RotationPhase {
    Idle,
    Animating,
    PendingSnap,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RotationState {
    /// Degrees, unbounded.
    pub current_rotation: f64,
    /// Degrees, unbounded.
    pub target_rotation: f64,
    pub lock_points: Vec<f64>,
    pub is_locked: bool,
    pub sensitivity: f64,
}

/// Result of feeding one input event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputOutcome {
    Accepted,
    /// Dropped by the wheel throttle.
    Throttled,
    /// The orb has been destroyed.
    Ignored,
}

#[derive(Debug, Clone)]
pub struct RotationController {
    state: RotationState,
    phase: RotationPhase,
    easing: f64,
    epsilon: f64,
    touch_multiplier: f64,
    wheel_throttle_ms: Millis,
    last_wheel_at: Option<Millis>,
}

/// Smallest signed angle taking `from` to `to`, in (-180, 180].
pub fn signed_delta(from: f64, to: f64) -> f64 {
    let d = (to - from).rem_euclid(360.0);
    if d > 180.0 {
        d - 360.0
    } else {
        d
    }
}

/// Circular distance between two angles, in [0, 180].
pub fn circular_distance(a: f64, b: f64) -> f64 {
    signed_delta(a, b).abs()
}

/// Index of the lock point closest to `rotation` on the circle.
pub fn nearest_lock_point(lock_points: &[f64], rotation: f64) -> Option<usize> {
    let normalized = rotation.rem_euclid(360.0);
    lock_points
        .iter()
        .enumerate()
        .map(|(i, p)| (i, circular_distance(normalized, *p)))
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(i, _)| i)
}

impl RotationController {
    pub fn new(config: &OrbConfig) -> Self {
        Self {
            state: RotationState {
                current_rotation: 0.0,
                target_rotation: 0.0,
                lock_points: config.lock_points(),
                is_locked: true,
                sensitivity: config.sensitivity,
            },
            phase: RotationPhase::Idle,
            easing: config.easing,
            epsilon: config.epsilon,
            touch_multiplier: config.touch_multiplier,
            wheel_throttle_ms: config.wheel_throttle_ms,
            last_wheel_at: None,
        }
    }

    pub fn state(&self) -> &RotationState {
        &self.state
    }

    pub fn phase(&self) -> RotationPhase {
        self.phase
    }

    pub fn current(&self) -> f64 {
        self.state.current_rotation
    }

    pub fn target(&self) -> f64 {
        self.state.target_rotation
    }

    pub fn is_locked(&self) -> bool {
        self.state.is_locked
    }

    /// Whether the easing loop still has distance to cover.
    pub fn needs_frame(&self) -> bool {
        (self.state.target_rotation - self.state.current_rotation).abs() > self.epsilon
    }

    /// Wheel input. At most one event per throttle window is applied.
    pub fn handle_scroll(&mut self, delta_y: f64, now: Millis) -> InputOutcome {
        if let Some(last) = self.last_wheel_at {
            if now - last < self.wheel_throttle_ms {
                return InputOutcome::Throttled;
            }
        }
        self.last_wheel_at = Some(now);
        self.apply_delta(delta_y * self.state.sensitivity);
        InputOutcome::Accepted
    }

    /// Touch drag movement; twice as sensitive as the wheel by default.
    pub fn handle_drag_delta(&mut self, delta_y: f64) -> InputOutcome {
        self.apply_delta(delta_y * self.state.sensitivity * self.touch_multiplier);
        InputOutcome::Accepted
    }

    fn apply_delta(&mut self, degrees: f64) {
        self.state.target_rotation += degrees;
        self.state.is_locked = false;
        self.phase = RotationPhase::Animating;
    }

    /// One easing frame. Returns whether another frame is needed.
    pub fn step(&mut self) -> bool {
        let gap = self.state.target_rotation - self.state.current_rotation;
        self.state.current_rotation += gap * self.easing;
        if self.needs_frame() {
            self.phase = RotationPhase::Animating;
            true
        } else {
            self.phase = RotationPhase::Idle;
            false
        }
    }

    /// Input went idle; snap happens right after.
    pub fn mark_pending_snap(&mut self) {
        self.phase = RotationPhase::PendingSnap;
    }

    /// Move `target_rotation` onto the nearest lock point.
    ///
    /// The chosen lock point is the one at the smallest circular distance
    /// from the normalized target; the new target is that lock point's
    /// equivalent nearest to the old target, so the ring never unwinds a
    /// full turn across the 0/360 seam. Returns the lock index.
    pub fn snap_to_nearest_lock_point(&mut self) -> Option<usize> {
        let target = self.state.target_rotation;
        let index = nearest_lock_point(&self.state.lock_points, target)?;
        let lock = self.state.lock_points[index];
        let snapped = target + signed_delta(target.rem_euclid(360.0), lock);

        log::debug!("snap {:.2}\u{00B0} -> {:.2}\u{00B0} (lock {})", target, snapped, index);
        self.state.target_rotation = snapped;
        self.state.is_locked = true;
        self.phase = if self.needs_frame() {
            RotationPhase::Animating
        } else {
            RotationPhase::Idle
        };
        Some(index)
    }

    /// Lock index the ring currently rests on (or is heading to).
    pub fn lock_index(&self) -> Option<usize> {
        nearest_lock_point(&self.state.lock_points, self.state.target_rotation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn controller() -> RotationController {
        RotationController::new(&OrbConfig::default().with_sensitivity(1.0))
    }

    fn settle(rc: &mut RotationController) -> usize {
        let mut frames = 0;
        while rc.step() {
            frames += 1;
            assert!(frames < 1000, "easing did not converge");
        }
        frames
    }

    #[test]
    fn scroll_moves_target_not_current() {
        let mut rc = controller();
        assert_eq!(rc.handle_scroll(40.0, 0.0), InputOutcome::Accepted);
        assert_eq!(rc.target(), 40.0);
        assert_eq!(rc.current(), 0.0);
        assert_eq!(rc.phase(), RotationPhase::Animating);
        assert!(!rc.is_locked());
    }

    #[test]
    fn wheel_is_throttled_to_one_event_per_16ms() {
        let mut rc = controller();
        rc.handle_scroll(10.0, 0.0);
        assert_eq!(rc.handle_scroll(10.0, 8.0), InputOutcome::Throttled);
        assert_eq!(rc.handle_scroll(10.0, 16.0), InputOutcome::Accepted);
        assert_eq!(rc.target(), 20.0);
    }

    #[test]
    fn drag_is_twice_as_sensitive() {
        let mut rc = controller();
        rc.handle_drag_delta(10.0);
        assert_eq!(rc.target(), 20.0);
    }

    #[test]
    fn easing_converges_geometrically() {
        let mut rc = controller();
        rc.handle_scroll(1000.0, 0.0);
        let frames = settle(&mut rc);
        // 1000 * 0.85^k < 0.1  =>  k >= 57
        assert!(frames <= 60, "took {frames} frames");
        assert!((rc.target() - rc.current()).abs() <= 0.1);
        assert_eq!(rc.phase(), RotationPhase::Idle);
    }

    #[test]
    fn snap_picks_nearest_lock_point() {
        let mut rc = controller();
        rc.handle_scroll(185.0, 0.0);
        assert_eq!(rc.snap_to_nearest_lock_point(), Some(3));
        assert_eq!(rc.target(), 180.0);
        assert!(rc.is_locked());
    }

    #[test]
    fn snap_wraps_across_zero() {
        let mut rc = controller();
        rc.handle_scroll(355.0, 0.0);
        assert_eq!(rc.snap_to_nearest_lock_point(), Some(0));
        assert_eq!(rc.target(), 360.0);

        let mut rc = controller();
        rc.handle_scroll(-10.0, 0.0);
        rc.snap_to_nearest_lock_point();
        assert_eq!(rc.target(), 0.0);
    }

    #[test]
    fn snap_stays_on_the_near_side_of_the_seam() {
        // A floor-based target (floor(t / 360) * 360 + lock) would land a
        // full turn away in both cases: -360 and 360.
        let mut rc = controller();
        rc.handle_scroll(-10.0, 0.0);
        assert_eq!(rc.snap_to_nearest_lock_point(), Some(0));
        assert_eq!(rc.target(), 0.0);

        let mut rc = controller();
        rc.handle_scroll(710.0, 0.0);
        assert_eq!(rc.snap_to_nearest_lock_point(), Some(0));
        assert_eq!(rc.target(), 720.0);

        // Away from the seam both formulas agree.
        let mut rc = controller();
        rc.handle_scroll(-200.0, 0.0);
        assert_eq!(rc.snap_to_nearest_lock_point(), Some(3));
        assert_eq!(rc.target(), -180.0);
    }

    #[test]
    fn snap_distance_is_at_most_half_spacing() {
        let mut rc = controller();
        let mut t = 0.0;
        for step in 0..200 {
            let delta = (step as f64 * 37.3) % 97.0 - 48.0;
            rc.handle_scroll(delta, t);
            t += 20.0;
            let before = rc.target().rem_euclid(360.0);
            let idx = rc.snap_to_nearest_lock_point().unwrap();
            let lock = rc.state().lock_points[idx];
            assert!(circular_distance(before, lock) <= 30.0 + 1e-9);
        }
    }

    #[test]
    fn snap_is_idempotent() {
        let mut rc = controller();
        rc.handle_scroll(97.0, 0.0);
        rc.snap_to_nearest_lock_point();
        let first = rc.target();
        rc.snap_to_nearest_lock_point();
        assert!((rc.target() - first).abs() < 0.1);
    }

    #[test]
    fn snap_without_lock_points_is_a_no_op() {
        let mut rc = RotationController::new(&OrbConfig::default().with_items(Vec::new()));
        rc.handle_drag_delta(12.0);
        assert_eq!(rc.snap_to_nearest_lock_point(), None);
        assert_eq!(rc.target(), 12.0);
    }

    #[test]
    fn signed_delta_range() {
        assert_eq!(signed_delta(350.0, 10.0), 20.0);
        assert_eq!(signed_delta(10.0, 350.0), -20.0);
        assert_eq!(signed_delta(0.0, 180.0), 180.0);
    }
}
