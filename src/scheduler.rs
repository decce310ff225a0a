//! Scheduler - Coalesced change-detection flushes.
//!
//! Marking a component dirty never renders right away. It schedules one
//! flush per root; every mark that arrives before that flush runs is folded
//! into it. Each flush comes with a completion signal:
//!
//! ```text
//! settled ──schedule_tick──► pending ──work runs──► settled
//!    ▲                          │                     │
//!    │                          └── more marks: OR'd into the pending flags
//!    └────────── resolve() after the flush has fully completed
//! ```
//!
//! The default scheduler queues work on a thread-local animation-frame queue
//! that the host drains with [`flush_animation_frame`].

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;
use std::task::{Context, Poll};

use futures::channel::oneshot;
use futures::future::{self, LocalBoxFuture, Shared};
use futures::FutureExt;
use tracing::{debug, trace};

use crate::engine::tick_root_context;
use crate::root_context::RootContext;
use crate::types::RootContextFlags;

/// A unit of deferred work.
pub type Work = Box<dyn FnOnce()>;

// =============================================================================
// Scheduler
// =============================================================================

/// How a root defers its flushes.
#[derive(Clone, Default)]
pub enum Scheduler {
    /// Queue on the next animation frame (see [`request_animation_frame`]).
    #[default]
    Default,
    /// Hand work to a user function.
    Custom(Rc<dyn Fn(Work)>),
}

impl Scheduler {
    pub fn custom(schedule: impl Fn(Work) + 'static) -> Self {
        Self::Custom(Rc::new(schedule))
    }

    /// Hand `work` off. Panics raised by a custom scheduler propagate.
    pub fn schedule(&self, work: Work) {
        match self {
            Self::Default => request_animation_frame(work),
            Self::Custom(schedule) => schedule(work),
        }
    }

    pub fn is_default(&self) -> bool {
        matches!(self, Self::Default)
    }
}

impl PartialEq for Scheduler {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Default, Self::Default) => true,
            (Self::Custom(a), Self::Custom(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl fmt::Debug for Scheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Default => f.write_str("Scheduler::Default"),
            Self::Custom(_) => f.write_str("Scheduler::Custom(..)"),
        }
    }
}

// =============================================================================
// Animation Frame Queue
// =============================================================================

thread_local! {
    /// Work waiting for the next frame.
    static FRAME_QUEUE: RefCell<VecDeque<Work>> = RefCell::new(VecDeque::new());

    /// Epoch handed to the next pending completion signal (0 is the settled one).
    static NEXT_EPOCH: Cell<u64> = const { Cell::new(1) };

    /// The shared, already-settled completion signal.
    static CLEAN: CleanPromise = CleanPromise {
        epoch: 0,
        inner: future::ready(()).boxed_local().shared(),
    };
}

/// Queue `work` for the next frame.
pub fn request_animation_frame(work: Work) {
    FRAME_QUEUE.with(|queue| queue.borrow_mut().push_back(work));
}

/// Run every piece of work queued before this call.
///
/// Work queued while the frame runs waits for the next frame.
/// Returns the number of callbacks run.
pub fn flush_animation_frame() -> usize {
    let batch: Vec<Work> = FRAME_QUEUE.with(|queue| queue.borrow_mut().drain(..).collect());
    let count = batch.len();
    for work in batch {
        work();
    }
    count
}

pub fn pending_animation_frames() -> usize {
    FRAME_QUEUE.with(|queue| queue.borrow().len())
}

/// Drop all queued frame work (for testing).
pub fn reset_animation_frames() {
    FRAME_QUEUE.with(|queue| queue.borrow_mut().clear());
}

// =============================================================================
// Completion Signal
// =============================================================================

/// Resolves once a root has no flush pending.
///
/// Clones share the same underlying signal. A signal resolves only when its
/// flush completes; if the scheduled work is dropped without running, or
/// the flush unwinds, it never resolves.
#[derive(Clone)]
pub struct CleanPromise {
    epoch: u64,
    inner: Shared<LocalBoxFuture<'static, ()>>,
}

/// Resolves the pending [`CleanPromise`] of one flush.
pub struct CleanResolver {
    sender: oneshot::Sender<()>,
}

impl CleanResolver {
    pub fn resolve(self) {
        // Nobody may be listening; that is fine.
        let _ = self.sender.send(());
    }
}

impl CleanPromise {
    /// The settled signal every idle root shares.
    pub fn settled() -> Self {
        CLEAN.with(Clone::clone)
    }

    /// A fresh unresolved signal and its resolver.
    pub fn pending() -> (Self, CleanResolver) {
        let (sender, receiver) = oneshot::channel::<()>();
        let epoch = NEXT_EPOCH.with(|next| next.replace(next.get() + 1));
        let promise = Self {
            epoch,
            inner: receiver
                .then(|sent| async move {
                    if sent.is_err() {
                        future::pending::<()>().await;
                    }
                })
                .boxed_local()
                .shared(),
        };
        (promise, CleanResolver { sender })
    }

    /// Whether this is the shared settled signal (no flush pending).
    pub fn is_clean(&self) -> bool {
        self.epoch == 0
    }

    /// Whether awaiting this signal would complete right away.
    pub fn is_resolved(&self) -> bool {
        self.is_clean() || self.inner.clone().now_or_never().is_some()
    }

    /// Whether both handles observe the same flush.
    pub fn same_as(&self, other: &Self) -> bool {
        self.epoch == other.epoch
    }
}

impl Future for CleanPromise {
    type Output = ();

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
        Pin::new(&mut self.inner).poll(cx)
    }
}

impl fmt::Debug for CleanPromise {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CleanPromise")
            .field("epoch", &self.epoch)
            .field("resolved", &self.is_resolved())
            .finish()
    }
}

// =============================================================================
// Tick Scheduling
// =============================================================================

/// Request a flush of `root_context` for `flags`.
///
/// If the root is idle its clean signal is replaced by a pending one and a
/// single flush is handed to the scheduler. If a flush is already pending
/// the flags are folded into it.
pub fn schedule_tick(root_context: &Rc<RootContext>, flags: RootContextFlags) {
    root_context.insert_flags(flags);
    if !root_context.clean().is_clean() {
        trace!(?flags, "coalescing into pending flush");
        return;
    }

    let (pending, resolver) = CleanPromise::pending();
    root_context.set_clean(pending);
    debug!(?flags, "scheduling flush");

    let context = Rc::clone(root_context);
    root_context
        .scheduler()
        .schedule(Box::new(move || run_flush(&context, resolver)));
}

fn run_flush(root_context: &Rc<RootContext>, resolver: CleanResolver) {
    if root_context.take_flag(RootContextFlags::DETECT_CHANGES) {
        tick_root_context(root_context);
    }
    if root_context.take_flag(RootContextFlags::FLUSH_PLAYERS) {
        if let Some(handler) = root_context.player_handler() {
            handler.flush_players();
        }
    }

    root_context.set_clean(CleanPromise::settled());
    root_context.record_flush();
    resolver.resolve();
    debug!(flushes = root_context.flush_count(), "flush complete");

    // Marks raised while this flush ran get exactly one follow-up flush.
    let leftover = root_context.take_flags();
    if !leftover.is_empty() {
        schedule_tick(root_context, leftover);
    }
}
