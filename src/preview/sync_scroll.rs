//! Bidirectional sync scrolling between the editor and preview lists
//!
//! Both panes are virtualized lists over the same blocks, so they are aligned
//! by block index: whichever block is at the top of the pane the user scrolls
//! is brought to the top of the other pane.
//!
//! # Feedback loops
//!
//! Scrolling the target pane programmatically makes it report a range change
//! of its own, which must not bounce back to the source. Two rules prevent
//! that:
//!
//! - only the *active* pane (the one under the pointer) can arm a sync;
//! - a pane that was just scrolled programmatically is *guarded* for a short
//!   window, during which its range changes are recorded but ignored.
//!
//! Range changes from the active pane are debounced, so a fling produces one
//! sync at the end instead of one per frame.
//!
//! All methods take `now` explicitly; the state machine never reads the clock.
//!
//! # Usage
//!
//! ```ignore
//! let mut sync = ScrollSynchronizer::new();
//! sync.pointer_enter(Pane::Editor);
//! sync.range_changed(Pane::Editor, first, last, Instant::now());
//! // every frame:
//! if let Some(cmd) = sync.poll(Instant::now()) {
//!     preview_list.scroll_to_index(cmd.index, cmd.align, cmd.behavior);
//! }
//! ```

use log::debug;
use std::time::{Duration, Instant};

/// Default quiet period before a user scroll is mirrored.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(50);

/// Default window during which a programmatically scrolled pane is ignored.
pub const DEFAULT_GUARD: Duration = Duration::from_millis(100);

/// Duration of a smooth programmatic scroll.
pub const SMOOTH_SCROLL_DURATION: Duration = Duration::from_millis(150);

// ─────────────────────────────────────────────────────────────────────────────
// Panes and commands
// ─────────────────────────────────────────────────────────────────────────────

/// One of the two synchronized lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Pane {
    /// Left pane: block editors
    Editor,
    /// Right pane: rendered blocks
    Preview,
}

impl Pane {
    /// The opposite pane.
    pub fn other(self) -> Self {
        match self {
            Pane::Editor => Pane::Preview,
            Pane::Preview => Pane::Editor,
        }
    }

    fn slot(self) -> usize {
        match self {
            Pane::Editor => 0,
            Pane::Preview => 1,
        }
    }
}

/// What a pane is currently doing, from the synchronizer's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PaneMode {
    #[default]
    Idle,
    /// The pointer is over this pane; its scrolls drive the other one
    UserScrolling,
    /// Recently scrolled by a sync; its own range changes are ignored
    ProgrammaticScrolling,
}

/// Where the target item should end up in the viewport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScrollAlign {
    #[default]
    Start,
    Center,
    End,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScrollBehavior {
    /// Jump immediately
    #[default]
    Auto,
    /// Animate with an ease-out curve
    Smooth,
}

/// A request to scroll `pane` so that block `index` is visible.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScrollCommand {
    pub pane: Pane,
    pub index: usize,
    pub align: ScrollAlign,
    pub behavior: ScrollBehavior,
}

// ─────────────────────────────────────────────────────────────────────────────
// Configuration
// ─────────────────────────────────────────────────────────────────────────────

/// Configuration for sync scrolling behavior.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncScrollConfig {
    pub debounce: Duration,
    pub guard: Duration,
    pub behavior: ScrollBehavior,
}

impl Default for SyncScrollConfig {
    fn default() -> Self {
        Self {
            debounce: DEFAULT_DEBOUNCE,
            guard: DEFAULT_GUARD,
            behavior: ScrollBehavior::Auto,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// ScrollSynchronizer
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default)]
struct PaneState {
    /// Last reported first visible index
    top_index: Option<usize>,
    /// Last reported last visible index
    bottom_index: Option<usize>,
    /// Range changes are ignored until this instant
    guard_until: Option<Instant>,
}

impl PaneState {
    fn is_guarded(&self, now: Instant) -> bool {
        self.guard_until.is_some_and(|until| now < until)
    }
}

/// State machine keeping the two panes aligned.
#[derive(Debug, Clone)]
pub struct ScrollSynchronizer {
    enabled: bool,
    config: SyncScrollConfig,
    active: Option<Pane>,
    panes: [PaneState; 2],
    /// Source pane and deadline of the armed debounce
    pending: Option<(Pane, Instant)>,
}

impl Default for ScrollSynchronizer {
    fn default() -> Self {
        Self::new()
    }
}

impl ScrollSynchronizer {
    pub fn new() -> Self {
        Self::with_config(SyncScrollConfig::default())
    }

    pub fn with_config(config: SyncScrollConfig) -> Self {
        Self {
            enabled: true,
            config,
            active: None,
            panes: [PaneState::default(); 2],
            pending: None,
        }
    }

    pub fn config(&self) -> &SyncScrollConfig {
        &self.config
    }

    /// Apply new timings. Takes effect for the next armed sync.
    pub fn set_config(&mut self, config: SyncScrollConfig) {
        self.config = config;
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Enable or disable syncing. Disabling drops any pending sync.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
        if !enabled {
            self.pending = None;
        }
    }

    /// Toggle sync scrolling on/off. Returns the new state.
    pub fn toggle(&mut self) -> bool {
        self.set_enabled(!self.enabled);
        self.enabled
    }

    /// The pane that currently drives syncing, if any.
    pub fn active_pane(&self) -> Option<Pane> {
        self.active
    }

    /// The pointer entered `pane`; it becomes the only active pane.
    pub fn pointer_enter(&mut self, pane: Pane) {
        if self.active != Some(pane) {
            debug!("Sync scroll: {:?} pane active", pane);
            self.active = Some(pane);
        }
    }

    /// Last reported visible range of `pane`.
    pub fn visible_range(&self, pane: Pane) -> Option<(usize, usize)> {
        let state = &self.panes[pane.slot()];
        state.top_index.zip(state.bottom_index)
    }

    /// A pane reported a new visible range.
    ///
    /// Only a change of the first visible index matters. A change in the
    /// active, unguarded pane (re)arms the debounce.
    pub fn range_changed(&mut self, pane: Pane, first: usize, last: usize, now: Instant) {
        let state = &mut self.panes[pane.slot()];
        state.bottom_index = Some(last);
        if state.top_index == Some(first) {
            return;
        }
        state.top_index = Some(first);

        if !self.enabled || self.active != Some(pane) || state.is_guarded(now) {
            return;
        }
        self.pending = Some((pane, now + self.config.debounce));
    }

    /// Advance timers. Returns the scroll to perform, if a debounce expired.
    pub fn poll(&mut self, now: Instant) -> Option<ScrollCommand> {
        for state in &mut self.panes {
            if state.guard_until.is_some_and(|until| now >= until) {
                state.guard_until = None;
            }
        }

        let (source, deadline) = self.pending?;
        if now < deadline {
            return None;
        }
        self.pending = None;

        let index = self.panes[source.slot()].top_index?;
        let target = source.other();
        self.panes[target.slot()].guard_until = Some(now + self.config.guard);

        debug!("Sync scroll: {:?} -> {:?} at block {}", source, target, index);
        Some(ScrollCommand {
            pane: target,
            index,
            align: ScrollAlign::Start,
            behavior: self.config.behavior,
        })
    }

    /// Earliest instant at which [`poll`](Self::poll) can change state.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.pending
            .map(|(_, deadline)| deadline)
            .into_iter()
            .chain(self.panes.iter().filter_map(|state| state.guard_until))
            .min()
    }

    /// Current mode of `pane`; a guard outranks being the active pane.
    pub fn mode(&self, pane: Pane, now: Instant) -> PaneMode {
        if self.panes[pane.slot()].is_guarded(now) {
            PaneMode::ProgrammaticScrolling
        } else if self.active == Some(pane) {
            PaneMode::UserScrolling
        } else {
            PaneMode::Idle
        }
    }

    /// Forget ranges, timers and guards (e.g. after loading a document).
    pub fn reset(&mut self) {
        self.panes = [PaneState::default(); 2];
        self.pending = None;
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Animation Support
// ─────────────────────────────────────────────────────────────────────────────

/// An ease-out scroll from one offset to another.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollAnimation {
    from: f32,
    to: f32,
    start: Instant,
    duration: Duration,
}

impl ScrollAnimation {
    pub fn new(from: f32, to: f32, start: Instant, duration: Duration) -> Self {
        Self {
            from,
            to,
            start,
            duration,
        }
    }

    pub fn target(&self) -> f32 {
        self.to
    }

    fn progress(&self, now: Instant) -> f32 {
        if self.duration.is_zero() {
            return 1.0;
        }
        let elapsed = now.saturating_duration_since(self.start).as_secs_f32();
        (elapsed / self.duration.as_secs_f32()).min(1.0)
    }

    /// Offset at `now`, using an ease-out quad curve.
    pub fn offset_at(&self, now: Instant) -> f32 {
        let progress = self.progress(now);
        if progress >= 1.0 {
            return self.to;
        }
        let eased = 1.0 - (1.0 - progress).powi(2);
        self.from + (self.to - self.from) * eased
    }

    pub fn is_finished(&self, now: Instant) -> bool {
        self.progress(now) >= 1.0
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn test_new_synchronizer() {
        let sync = ScrollSynchronizer::new();
        assert!(sync.is_enabled());
        assert_eq!(sync.active_pane(), None);
        assert_eq!(sync.next_deadline(), None);
        assert_eq!(sync.config().debounce, ms(50));
        assert_eq!(sync.config().guard, ms(100));
    }

    #[test]
    fn test_toggle_sync() {
        let mut sync = ScrollSynchronizer::new();
        assert!(!sync.toggle());
        assert!(!sync.is_enabled());
        assert!(sync.toggle());
        assert!(sync.is_enabled());
    }

    #[test]
    fn test_pane_other() {
        assert_eq!(Pane::Editor.other(), Pane::Preview);
        assert_eq!(Pane::Preview.other(), Pane::Editor);
    }

    #[test]
    fn test_editor_scroll_syncs_preview_once() {
        let t0 = Instant::now();
        let mut sync = ScrollSynchronizer::new();
        sync.pointer_enter(Pane::Editor);
        sync.range_changed(Pane::Editor, 3, 12, t0);
        sync.range_changed(Pane::Editor, 7, 16, t0 + ms(10));

        assert_eq!(sync.poll(t0 + ms(40)), None);
        assert_eq!(sync.next_deadline(), Some(t0 + ms(60)));

        let command = sync.poll(t0 + ms(60));
        assert_eq!(
            command,
            Some(ScrollCommand {
                pane: Pane::Preview,
                index: 7,
                align: ScrollAlign::Start,
                behavior: ScrollBehavior::Auto,
            })
        );
        assert_eq!(sync.mode(Pane::Preview, t0 + ms(61)), PaneMode::ProgrammaticScrolling);

        // the preview follows and reports its own change inside the guard
        sync.range_changed(Pane::Preview, 7, 15, t0 + ms(70));
        assert_eq!(sync.poll(t0 + ms(200)), None);
        assert_eq!(sync.poll(t0 + ms(400)), None);
        assert_eq!(sync.visible_range(Pane::Preview), Some((7, 15)));
    }

    #[test]
    fn test_inactive_pane_does_not_arm() {
        let t0 = Instant::now();
        let mut sync = ScrollSynchronizer::new();
        sync.pointer_enter(Pane::Editor);
        sync.range_changed(Pane::Preview, 4, 9, t0);
        assert_eq!(sync.next_deadline(), None);
        assert_eq!(sync.poll(t0 + ms(500)), None);
    }

    #[test]
    fn test_no_active_pane_does_not_arm() {
        let t0 = Instant::now();
        let mut sync = ScrollSynchronizer::new();
        sync.range_changed(Pane::Editor, 4, 9, t0);
        assert_eq!(sync.poll(t0 + ms(500)), None);
    }

    #[test]
    fn test_same_top_index_is_ignored() {
        let t0 = Instant::now();
        let mut sync = ScrollSynchronizer::new();
        sync.pointer_enter(Pane::Editor);
        sync.range_changed(Pane::Editor, 2, 8, t0);
        assert!(sync.poll(t0 + ms(50)).is_some());

        sync.range_changed(Pane::Editor, 2, 9, t0 + ms(300));
        assert_eq!(sync.next_deadline(), None);
        assert_eq!(sync.visible_range(Pane::Editor), Some((2, 9)));
    }

    #[test]
    fn test_guard_expires() {
        let t0 = Instant::now();
        let mut sync = ScrollSynchronizer::new();
        sync.pointer_enter(Pane::Editor);
        sync.range_changed(Pane::Editor, 5, 10, t0);
        assert!(sync.poll(t0 + ms(50)).is_some());
        assert_eq!(sync.next_deadline(), Some(t0 + ms(150)));

        assert_eq!(sync.poll(t0 + ms(150)), None);
        assert_eq!(sync.mode(Pane::Preview, t0 + ms(150)), PaneMode::Idle);
        assert_eq!(sync.next_deadline(), None);

        // after the guard the preview drives the editor
        sync.pointer_enter(Pane::Preview);
        sync.range_changed(Pane::Preview, 9, 14, t0 + ms(160));
        let command = sync.poll(t0 + ms(210)).map(|c| (c.pane, c.index));
        assert_eq!(command, Some((Pane::Editor, 9)));
    }

    #[test]
    fn test_guarded_pane_records_but_never_arms() {
        let t0 = Instant::now();
        let mut sync = ScrollSynchronizer::new();
        sync.pointer_enter(Pane::Editor);
        sync.range_changed(Pane::Editor, 1, 5, t0);
        sync.poll(t0 + ms(50));

        sync.pointer_enter(Pane::Preview);
        sync.range_changed(Pane::Preview, 3, 8, t0 + ms(60));
        assert_eq!(sync.visible_range(Pane::Preview), Some((3, 8)));
        assert_eq!(sync.poll(t0 + ms(300)), None);
    }

    #[test]
    fn test_disable_cancels_pending() {
        let t0 = Instant::now();
        let mut sync = ScrollSynchronizer::new();
        sync.pointer_enter(Pane::Editor);
        sync.range_changed(Pane::Editor, 4, 9, t0);
        sync.set_enabled(false);
        assert_eq!(sync.poll(t0 + ms(100)), None);

        sync.range_changed(Pane::Editor, 6, 11, t0 + ms(120));
        assert_eq!(sync.next_deadline(), None);
    }

    #[test]
    fn test_reset_forgets_ranges() {
        let t0 = Instant::now();
        let mut sync = ScrollSynchronizer::new();
        sync.pointer_enter(Pane::Editor);
        sync.range_changed(Pane::Editor, 4, 9, t0);
        sync.reset();
        assert_eq!(sync.poll(t0 + ms(100)), None);
        assert_eq!(sync.visible_range(Pane::Editor), None);
        assert_eq!(sync.active_pane(), Some(Pane::Editor));
    }

    #[test]
    fn test_custom_config() {
        let t0 = Instant::now();
        let mut sync = ScrollSynchronizer::with_config(SyncScrollConfig {
            debounce: ms(10),
            guard: ms(20),
            behavior: ScrollBehavior::Smooth,
        });
        sync.pointer_enter(Pane::Preview);
        sync.range_changed(Pane::Preview, 2, 3, t0);
        let command = sync.poll(t0 + ms(10));
        assert_eq!(command.map(|c| c.behavior), Some(ScrollBehavior::Smooth));
        assert_eq!(sync.mode(Pane::Editor, t0 + ms(29)), PaneMode::ProgrammaticScrolling);
        assert_eq!(sync.mode(Pane::Editor, t0 + ms(30)), PaneMode::Idle);
    }

    #[test]
    fn test_scroll_animation_ease_out() {
        let t0 = Instant::now();
        let anim = ScrollAnimation::new(0.0, 100.0, t0, ms(100));
        assert_eq!(anim.offset_at(t0), 0.0);
        let halfway = anim.offset_at(t0 + ms(50));
        assert!((halfway - 75.0).abs() < 0.5);
        assert_eq!(anim.offset_at(t0 + ms(100)), 100.0);
        assert!(anim.is_finished(t0 + ms(150)));
        assert!(!anim.is_finished(t0 + ms(10)));
    }

    #[test]
    fn test_scroll_animation_zero_duration() {
        let t0 = Instant::now();
        let anim = ScrollAnimation::new(10.0, 20.0, t0, Duration::ZERO);
        assert_eq!(anim.offset_at(t0), 20.0);
        assert!(anim.is_finished(t0));
    }
}
