//! Root Context - Per-root scheduling record.
//!
//! A root context is shared by every component bootstrapped into the same
//! root. It owns the scheduler, the pending-work flags, the completion
//! signal of the current flush and an optional animation-player handler.
//!
//! Completed flushes are counted in a reactive signal so effects can follow
//! a root's render cycle:
//!
//! ```ignore
//! let flushes = root.flush_signal();
//! let _stop = effect(move || println!("flush #{}", flushes.get()));
//! ```

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use spark_signals::{signal, Signal};
use tracing::trace;

use crate::scheduler::{schedule_tick, CleanPromise, Scheduler};
use crate::types::{ComponentInstance, RootContextFlags};

// =============================================================================
// Players
// =============================================================================

/// An animation queued on a root.
pub trait Player {
    fn play(&self);
}

/// Collects players between flushes and plays them when a flush runs.
pub trait PlayerHandler {
    fn flush_players(&self);
    fn queue_player(&self, player: Rc<dyn Player>);
}

// =============================================================================
// Root Context
// =============================================================================

pub struct RootContext {
    components: RefCell<Vec<ComponentInstance>>,
    scheduler: Scheduler,
    clean: RefCell<CleanPromise>,
    player_handler: Option<Rc<dyn PlayerHandler>>,
    flags: Cell<RootContextFlags>,
    flushes: Signal<u64>,
}

impl RootContext {
    /// Root components in bootstrap order.
    pub fn components(&self) -> Vec<ComponentInstance> {
        self.components.borrow().clone()
    }

    pub(crate) fn push_component(&self, component: ComponentInstance) {
        self.components.borrow_mut().push(component);
    }

    pub(crate) fn remove_component(&self, component: &ComponentInstance) {
        self.components
            .borrow_mut()
            .retain(|existing| !Rc::ptr_eq(existing, component));
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    /// Completion signal of the current flush (settled when idle).
    pub fn clean(&self) -> CleanPromise {
        self.clean.borrow().clone()
    }

    pub(crate) fn set_clean(&self, clean: CleanPromise) {
        *self.clean.borrow_mut() = clean;
    }

    pub fn player_handler(&self) -> Option<&Rc<dyn PlayerHandler>> {
        self.player_handler.as_ref()
    }

    /// Work requested for the pending flush.
    pub fn flags(&self) -> RootContextFlags {
        self.flags.get()
    }

    pub(crate) fn insert_flags(&self, flags: RootContextFlags) {
        self.flags.set(self.flags.get() | flags);
    }

    /// Clear `flag`, returning whether it was set.
    pub(crate) fn take_flag(&self, flag: RootContextFlags) -> bool {
        let flags = self.flags.get();
        self.flags.set(flags - flag);
        flags.contains(flag)
    }

    pub(crate) fn take_flags(&self) -> RootContextFlags {
        self.flags.replace(RootContextFlags::EMPTY)
    }

    /// Number of completed flushes.
    pub fn flush_count(&self) -> u64 {
        self.flushes.get()
    }

    /// Reactive counter of completed flushes.
    pub fn flush_signal(&self) -> Signal<u64> {
        self.flushes.clone()
    }

    pub(crate) fn record_flush(&self) {
        self.flushes.set(self.flushes.get() + 1);
    }
}

/// A fresh root context: no components, no pending work, settled.
pub fn create_root_context(
    scheduler: Option<Scheduler>,
    player_handler: Option<Rc<dyn PlayerHandler>>,
) -> Rc<RootContext> {
    Rc::new(RootContext {
        components: RefCell::new(Vec::new()),
        scheduler: scheduler.unwrap_or_default(),
        clean: RefCell::new(CleanPromise::settled()),
        player_handler,
        flags: Cell::new(RootContextFlags::EMPTY),
        flushes: signal(0),
    })
}

/// Queue `player` on the root's handler and schedule a player flush.
///
/// Returns false when the root has no player handler.
pub fn add_player(root_context: &Rc<RootContext>, player: Rc<dyn Player>) -> bool {
    let Some(handler) = root_context.player_handler() else {
        return false;
    };
    trace!("queueing player");
    handler.queue_player(player);
    schedule_tick(root_context, RootContextFlags::FLUSH_PLAYERS);
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::FutureExt;
    use spark_signals::effect;

    #[derive(Default)]
    struct QueueingHandler {
        queued: RefCell<Vec<Rc<dyn Player>>>,
    }

    impl PlayerHandler for QueueingHandler {
        fn flush_players(&self) {
            for player in self.queued.borrow_mut().drain(..) {
                player.play();
            }
        }

        fn queue_player(&self, player: Rc<dyn Player>) {
            self.queued.borrow_mut().push(player);
        }
    }

    struct CountingPlayer(Cell<usize>);

    impl Player for CountingPlayer {
        fn play(&self) {
            self.0.set(self.0.get() + 1);
        }
    }

    fn sync_scheduler() -> Scheduler {
        Scheduler::custom(|work| work())
    }

    #[test]
    fn test_create_root_context_is_settled() {
        let root = create_root_context(None, None);
        assert!(root.components().is_empty());
        assert!(root.scheduler().is_default());
        assert!(root.player_handler().is_none());
        assert_eq!(root.flags(), RootContextFlags::EMPTY);
        assert!(root.clean().is_clean());
        assert_eq!(root.clean().now_or_never(), Some(()));
    }

    #[test]
    fn test_take_flag() {
        let root = create_root_context(None, None);
        root.insert_flags(RootContextFlags::DETECT_CHANGES | RootContextFlags::FLUSH_PLAYERS);
        assert!(root.take_flag(RootContextFlags::DETECT_CHANGES));
        assert!(!root.take_flag(RootContextFlags::DETECT_CHANGES));
        assert_eq!(root.take_flags(), RootContextFlags::FLUSH_PLAYERS);
        assert_eq!(root.flags(), RootContextFlags::EMPTY);
    }

    #[test]
    fn test_remove_component_by_identity() {
        let root = create_root_context(None, None);
        let a: ComponentInstance = Rc::new(1u8);
        let b: ComponentInstance = Rc::new(1u8);
        root.push_component(a.clone());
        root.push_component(b.clone());
        root.remove_component(&a);
        let remaining = root.components();
        assert_eq!(remaining.len(), 1);
        assert!(Rc::ptr_eq(&remaining[0], &b));
    }

    #[test]
    fn test_add_player_without_handler() {
        let root = create_root_context(Some(sync_scheduler()), None);
        let player = Rc::new(CountingPlayer(Cell::new(0)));
        assert!(!add_player(&root, player.clone()));
        assert_eq!(player.0.get(), 0);
    }

    #[test]
    fn test_add_player_flushes_players() {
        let handler = Rc::new(QueueingHandler::default());
        let root = create_root_context(Some(sync_scheduler()), Some(handler));
        let player = Rc::new(CountingPlayer(Cell::new(0)));

        assert!(add_player(&root, player.clone()));
        assert_eq!(player.0.get(), 1);
        assert_eq!(root.flush_count(), 1);
        assert!(root.clean().is_clean());
    }

    #[test]
    fn test_flush_signal_is_reactive() {
        let handler = Rc::new(QueueingHandler::default());
        let root = create_root_context(Some(sync_scheduler()), Some(handler));
        let seen = Rc::new(Cell::new(0u64));

        let flushes = root.flush_signal();
        let seen_clone = seen.clone();
        let _stop = effect(move || seen_clone.set(flushes.get()));
        assert_eq!(seen.get(), 0);

        add_player(&root, Rc::new(CountingPlayer(Cell::new(0))));
        assert_eq!(seen.get(), 1);
    }
}
