//! Frame and timer bookkeeping for the orb.
//!
//! The orb is driven by a host that calls `tick(now)` once per rendered
//! frame. `FrameScheduler` stands in for `requestAnimationFrame` (one pending
//! request per loop, cancellable by handle) and `Timers` stands in for
//! `setTimeout` debounces, where restarting a kind replaces its deadline.

/// Milliseconds on the host clock.
pub type Millis = f64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameHandle(u64);

/// The two independent animation loops.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FrameLoop {
    /// Eases `current_rotation` toward `target_rotation`.
    Rotation,
    /// Projects nav items onto the orbit.
    Layout,
}

#[derive(Debug, Default)]
pub struct FrameScheduler {
    next_id: u64,
    pending: Vec<(FrameHandle, FrameLoop)>,
}

impl FrameScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request the next frame for `which`. A loop has at most one pending
    /// request; asking again returns the existing handle.
    pub fn request(&mut self, which: FrameLoop) -> FrameHandle {
        if let Some((handle, _)) = self.pending.iter().find(|(_, l)| *l == which) {
            return *handle;
        }
        self.next_id += 1;
        let handle = FrameHandle(self.next_id);
        self.pending.push((handle, which));
        handle
    }

    /// Cancel a pending request. Returns whether anything was cancelled.
    pub fn cancel(&mut self, handle: FrameHandle) -> bool {
        let before = self.pending.len();
        self.pending.retain(|(h, _)| *h != handle);
        self.pending.len() != before
    }

    pub fn handle_for(&self, which: FrameLoop) -> Option<FrameHandle> {
        self.pending.iter().find(|(_, l)| *l == which).map(|(h, _)| *h)
    }

    pub fn is_pending(&self, which: FrameLoop) -> bool {
        self.handle_for(which).is_some()
    }

    /// Drain every request made before this call. Requests issued while the
    /// returned loops run land in the next frame.
    pub fn take_due(&mut self) -> Vec<FrameLoop> {
        let mut due: Vec<FrameLoop> = self.pending.drain(..).map(|(_, l)| l).collect();
        // Rotation first so layout reads this frame's value.
        due.sort_by_key(|l| match l {
            FrameLoop::Rotation => 0,
            FrameLoop::Layout => 1,
        });
        due
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimerKind {
    /// Wheel input went quiet.
    ScrollIdle,
    /// Touch drag released.
    TouchIdle,
    /// End of the snap feedback pulse.
    SnapPulse,
    /// One-time tooltip auto-hide.
    TooltipHide,
    /// End of the message-ping pulse.
    MessagePing,
    /// Window resize settled.
    ResizeDebounce,
    /// Auto-dismiss of one toast.
    Toast(u64),
}

#[derive(Debug, Default)]
pub struct Timers {
    entries: Vec<(TimerKind, Millis)>,
}

impl Timers {
    pub fn new() -> Self {
        Self::default()
    }

    /// (Re)arm `kind` to fire `delay` ms after `now`; last call wins.
    pub fn restart(&mut self, kind: TimerKind, now: Millis, delay: Millis) {
        self.clear(kind);
        self.entries.push((kind, now + delay));
    }

    pub fn clear(&mut self, kind: TimerKind) {
        self.entries.retain(|(k, _)| *k != kind);
    }

    pub fn clear_all(&mut self) {
        self.entries.clear();
    }

    pub fn is_armed(&self, kind: TimerKind) -> bool {
        self.entries.iter().any(|(k, _)| *k == kind)
    }

    /// Remove and return every timer whose deadline is `<= now`, earliest
    /// first.
    pub fn due(&mut self, now: Millis) -> Vec<TimerKind> {
        let mut fired: Vec<(TimerKind, Millis)> = Vec::new();
        self.entries.retain(|(k, at)| {
            if *at <= now {
                fired.push((*k, *at));
                false
            } else {
                true
            }
        });
        fired.sort_by(|a, b| a.1.total_cmp(&b.1));
        fired.into_iter().map(|(k, _)| k).collect()
    }

    pub fn next_deadline(&self) -> Option<Millis> {
        self.entries.iter().map(|(_, at)| *at).min_by(|a, b| a.total_cmp(b))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
