use std::cell::RefCell;
use std::rc::Rc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};

use crate::time::TickSchedule;

/// Maximum number of invocations a single timer receives per `fire_due` call.
///
/// Deadlines missed beyond this (debugger stop, minimized window, long stall)
/// are dropped instead of replayed in a burst.
pub const MAX_CATCH_UP: u64 = 4;

/// Identifies a scheduled timer.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct TimerHandle(u64);

type Callback = Box<dyn FnMut()>;

struct Entry {
    id: u64,
    schedule: TickSchedule,
    /// `None` while the callback is executing.
    callback: Option<Callback>,
}

#[derive(Default)]
struct Timers {
    entries: Vec<Entry>,
    next_id: u64,
}

/// Shared handle to a queue of repeating timers.
///
/// Cloning is cheap and every clone refers to the same queue. Callbacks run on
/// the thread calling [`fire_due`](Self::fire_due) with no internal borrow held,
/// so they may schedule or cancel timers themselves.
#[derive(Clone, Default)]
pub struct TimerQueue {
    inner: Rc<RefCell<Timers>>,
}

impl TimerQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedules `callback` every `interval`, starting one interval from now.
    pub fn schedule<F>(&self, interval: Duration, callback: F) -> Result<TimerHandle>
    where
        F: FnMut() + 'static,
    {
        self.schedule_from(Instant::now(), interval, callback)
    }

    /// Schedules `callback` every `interval`, with the first deadline at `origin + interval`.
    pub fn schedule_from<F>(
        &self,
        origin: Instant,
        interval: Duration,
        callback: F,
    ) -> Result<TimerHandle>
    where
        F: FnMut() + 'static,
    {
        anyhow::ensure!(!interval.is_zero(), "timer interval must be greater than zero");
        let schedule = TickSchedule::new(origin, interval)
            .with_context(|| format!("timer interval {interval:?} is too long to schedule"))?;

        let mut timers = self.inner.borrow_mut();
        let id = timers.next_id;
        timers.next_id += 1;
        timers.entries.push(Entry {
            id,
            schedule,
            callback: Some(Box::new(callback)),
        });

        log::debug!("timer {id} scheduled every {interval:?}");
        Ok(TimerHandle(id))
    }

    /// Cancels a timer.
    ///
    /// Once this returns the callback is never invoked again, including when
    /// called from inside the callback itself. Unknown or already cancelled
    /// handles are ignored.
    pub fn cancel(&self, handle: TimerHandle) {
        let removed = {
            let mut timers = self.inner.borrow_mut();
            timers
                .entries
                .iter()
                .position(|e| e.id == handle.0)
                .map(|idx| timers.entries.remove(idx))
        };

        if removed.is_some() {
            log::debug!("timer {} cancelled", handle.0);
        }

        // Captured state is released outside the borrow.
        drop(removed);
    }

    pub fn is_scheduled(&self, handle: TimerHandle) -> bool {
        self.inner.borrow().entries.iter().any(|e| e.id == handle.0)
    }

    pub fn len(&self) -> usize {
        self.inner.borrow().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Earliest pending deadline across all timers.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.inner
            .borrow()
            .entries
            .iter()
            .map(|e| e.schedule.next_deadline())
            .min()
    }

    /// Invokes every callback whose deadline is at or before `now`.
    ///
    /// Each timer fires once per elapsed interval (bounded by [`MAX_CATCH_UP`]),
    /// interleaved across timers in deadline order. Returns the number of
    /// invocations.
    pub fn fire_due(&self, now: Instant) -> usize {
        {
            let mut timers = self.inner.borrow_mut();
            for entry in timers.entries.iter_mut() {
                let dropped = entry.schedule.clamp_backlog(now, MAX_CATCH_UP);
                if dropped > 0 {
                    log::debug!("timer {} dropped {dropped} missed ticks", entry.id);
                }
            }
        }

        let mut fired = 0;
        while let Some((id, mut callback)) = self.take_next_due(now) {
            callback();
            fired += 1;

            let leftover = {
                let mut timers = self.inner.borrow_mut();
                match timers.entries.iter_mut().find(|e| e.id == id) {
                    Some(entry) => {
                        entry.callback = Some(callback);
                        None
                    }
                    // Cancelled from inside the callback.
                    None => Some(callback),
                }
            };
            drop(leftover);
        }

        fired
    }

    fn take_next_due(&self, now: Instant) -> Option<(u64, Callback)> {
        let mut timers = self.inner.borrow_mut();
        let entry = timers
            .entries
            .iter_mut()
            .filter(|e| e.callback.is_some() && e.schedule.is_due(now))
            .min_by_key(|e| e.schedule.next_deadline())?;

        entry.schedule.advance();
        let callback = entry.callback.take()?;
        Some((entry.id, callback))
    }
}

impl std::fmt::Debug for TimerQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TimerQueue")
            .field("timers", &self.len())
            .field("next_deadline", &self.next_deadline())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    const MS: Duration = Duration::from_millis(1);

    fn counter() -> (Rc<Cell<u32>>, impl FnMut() + 'static) {
        let count = Rc::new(Cell::new(0));
        let c = count.clone();
        (count, move || c.set(c.get() + 1))
    }

    // ── schedule ──────────────────────────────────────────────────────────

    #[test]
    fn zero_interval_is_rejected() {
        let q = TimerQueue::new();
        assert!(q.schedule(Duration::ZERO, || {}).is_err());
        assert!(q.is_empty());
    }

    #[test]
    fn unrepresentable_interval_is_rejected() {
        let q = TimerQueue::new();
        assert!(q.schedule(Duration::MAX, || {}).is_err());
        assert!(q.is_empty());
    }

    #[test]
    fn fires_once_per_elapsed_interval() {
        let q = TimerQueue::new();
        let t0 = Instant::now();
        let (count, cb) = counter();
        q.schedule_from(t0, 10 * MS, cb).unwrap();

        assert_eq!(q.fire_due(t0 + 9 * MS), 0);
        assert_eq!(q.fire_due(t0 + 10 * MS), 1);
        assert_eq!(q.fire_due(t0 + 10 * MS), 0);
        assert_eq!(q.fire_due(t0 + 30 * MS), 2);
        assert_eq!(count.get(), 3);
        assert_eq!(q.next_deadline(), Some(t0 + 40 * MS));
    }

    #[test]
    fn interleaves_timers_in_deadline_order() {
        let q = TimerQueue::new();
        let t0 = Instant::now();
        let log = Rc::new(RefCell::new(Vec::new()));

        let l = log.clone();
        q.schedule_from(t0, 10 * MS, move || l.borrow_mut().push('a')).unwrap();
        let l = log.clone();
        q.schedule_from(t0, 15 * MS, move || l.borrow_mut().push('b')).unwrap();

        q.fire_due(t0 + 30 * MS);
        // a@10 b@15 a@20 a@30 b@30 (ties resolve in scheduling order)
        assert_eq!(*log.borrow(), vec!['a', 'b', 'a', 'a', 'b']);
    }

    #[test]
    fn catch_up_is_clamped_after_a_stall() {
        let q = TimerQueue::new();
        let t0 = Instant::now();
        let (count, cb) = counter();
        q.schedule_from(t0, 10 * MS, cb).unwrap();

        let fired = q.fire_due(t0 + 10_000 * MS);
        assert_eq!(fired as u64, MAX_CATCH_UP);
        assert_eq!(count.get() as u64, MAX_CATCH_UP);
        assert_eq!(q.next_deadline(), Some(t0 + 10_010 * MS));
    }

    // ── cancel ────────────────────────────────────────────────────────────

    #[test]
    fn cancel_stops_future_invocations() {
        let q = TimerQueue::new();
        let t0 = Instant::now();
        let (count, cb) = counter();
        let h = q.schedule_from(t0, 10 * MS, cb).unwrap();

        q.fire_due(t0 + 10 * MS);
        q.cancel(h);
        assert!(!q.is_scheduled(h));
        q.fire_due(t0 + 100 * MS);
        assert_eq!(count.get(), 1);
        assert_eq!(q.next_deadline(), None);
    }

    #[test]
    fn cancel_is_idempotent() {
        let q = TimerQueue::new();
        let (_count, cb) = counter();
        let h = q.schedule(10 * MS, cb).unwrap();
        let (_other, cb2) = counter();
        let keep = q.schedule(10 * MS, cb2).unwrap();

        q.cancel(h);
        q.cancel(h);
        assert_eq!(q.len(), 1);
        assert!(q.is_scheduled(keep));
    }

    #[test]
    fn cancel_from_own_callback_prevents_catch_up_ticks() {
        let q = TimerQueue::new();
        let t0 = Instant::now();
        let count = Rc::new(Cell::new(0));
        let handle: Rc<Cell<Option<TimerHandle>>> = Rc::new(Cell::new(None));

        let (c, qq, hh) = (count.clone(), q.clone(), handle.clone());
        let h = q
            .schedule_from(t0, 10 * MS, move || {
                c.set(c.get() + 1);
                if let Some(h) = hh.get() {
                    qq.cancel(h);
                }
            })
            .unwrap();
        handle.set(Some(h));

        // Three deadlines are due, but the first invocation cancels the timer.
        assert_eq!(q.fire_due(t0 + 30 * MS), 1);
        assert_eq!(count.get(), 1);
        assert!(q.is_empty());
    }

    #[test]
    fn callback_may_schedule_new_timers() {
        let q = TimerQueue::new();
        let t0 = Instant::now();
        let (count, cb) = counter();
        let spawned = Rc::new(RefCell::new(Some(cb)));

        let (qq, s) = (q.clone(), spawned.clone());
        q.schedule_from(t0, 10 * MS, move || {
            if let Some(cb) = s.borrow_mut().take() {
                qq.schedule_from(t0 + 10 * MS, 10 * MS, cb).unwrap();
            }
        })
        .unwrap();

        q.fire_due(t0 + 10 * MS);
        assert_eq!(q.len(), 2);
        q.fire_due(t0 + 20 * MS);
        assert_eq!(count.get(), 1);
    }
}
