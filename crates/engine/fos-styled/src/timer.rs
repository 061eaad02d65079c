//! Deferred Callbacks
//!
//! Single-shot, cancelable timers used to debounce stylesheet removal.
//! [`VirtualTimer`] runs on manually advanced time for deterministic tests;
//! [`SmolTimer`] schedules real timers on a smol local executor.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;
use std::time::Duration;

use smol::{LocalExecutor, Task};

/// Token identifying one armed callback
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerToken(pub u64);

/// Callback run when a timer fires
pub type Callback = Box<dyn FnOnce()>;

/// Single-shot deferred callback primitive
pub trait Timer {
    /// Run `callback` once after `delay`. The callback may run before
    /// `arm` returns; callers hold no borrows across the call.
    fn arm(&self, delay: Duration, callback: Callback) -> TimerToken;

    /// Cancel an armed callback. Cancelling a fired or unknown token is a
    /// no-op. Never runs callbacks.
    fn cancel(&self, token: TimerToken);
}

struct Pending {
    token: TimerToken,
    due: Duration,
    callback: Callback,
}

#[derive(Default)]
struct VirtualState {
    now: Duration,
    next_token: u64,
    pending: Vec<Pending>,
}

/// Timer driven by explicitly advanced virtual time
#[derive(Default)]
pub struct VirtualTimer {
    state: RefCell<VirtualState>,
}

impl VirtualTimer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current virtual time
    pub fn now(&self) -> Duration {
        self.state.borrow().now
    }

    /// Number of armed callbacks
    pub fn pending(&self) -> usize {
        self.state.borrow().pending.len()
    }

    /// Advance time, firing due callbacks in deadline order. Callbacks may
    /// arm or cancel timers.
    pub fn advance(&self, by: Duration) {
        let target = self.state.borrow().now + by;

        loop {
            let next = {
                let mut state = self.state.borrow_mut();
                let due = state
                    .pending
                    .iter()
                    .enumerate()
                    .filter(|(_, p)| p.due <= target)
                    .min_by_key(|(_, p)| (p.due, p.token))
                    .map(|(index, _)| index);
                due.map(|index| {
                    let pending = state.pending.remove(index);
                    state.now = pending.due;
                    pending
                })
            };

            match next {
                // Borrow released before the callback runs
                Some(pending) => (pending.callback)(),
                None => break,
            }
        }

        self.state.borrow_mut().now = target;
    }
}

impl std::fmt::Debug for VirtualTimer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.borrow();
        f.debug_struct("VirtualTimer")
            .field("now", &state.now)
            .field("pending", &state.pending.len())
            .finish()
    }
}

impl Timer for VirtualTimer {
    fn arm(&self, delay: Duration, callback: Callback) -> TimerToken {
        let mut state = self.state.borrow_mut();
        let token = TimerToken(state.next_token);
        state.next_token += 1;
        let due = state.now + delay;
        state.pending.push(Pending {
            token,
            due,
            callback,
        });
        token
    }

    fn cancel(&self, token: TimerToken) {
        self.state
            .borrow_mut()
            .pending
            .retain(|pending| pending.token != token);
    }
}

/// Timer backed by `smol::Timer` tasks on a local executor.
///
/// Callbacks run while the host drives the executor. Cancelling drops the
/// task, which stops it before the callback can run.
pub struct SmolTimer {
    executor: Rc<LocalExecutor<'static>>,
    tasks: RefCell<HashMap<TimerToken, Task<()>>>,
    next_token: Cell<u64>,
}

impl SmolTimer {
    pub fn new(executor: Rc<LocalExecutor<'static>>) -> Self {
        Self {
            executor,
            tasks: RefCell::new(HashMap::new()),
            next_token: Cell::new(0),
        }
    }

    pub fn executor(&self) -> &Rc<LocalExecutor<'static>> {
        &self.executor
    }
}

impl std::fmt::Debug for SmolTimer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SmolTimer")
            .field("tasks", &self.tasks.borrow().len())
            .finish()
    }
}

impl Timer for SmolTimer {
    fn arm(&self, delay: Duration, callback: Callback) -> TimerToken {
        let token = TimerToken(self.next_token.get());
        self.next_token.set(token.0 + 1);

        let task = self.executor.spawn(async move {
            smol::Timer::after(delay).await;
            callback();
        });

        let mut tasks = self.tasks.borrow_mut();
        tasks.retain(|_, task| !task.is_finished());
        tasks.insert(token, task);
        token
    }

    fn cancel(&self, token: TimerToken) {
        // Dropping the task cancels it
        self.tasks.borrow_mut().remove(&token);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_virtual_timer_fires_when_due() {
        let timer = VirtualTimer::new();
        let fired = Rc::new(Cell::new(0));

        let counter = Rc::clone(&fired);
        timer.arm(Duration::from_millis(10), Box::new(move || counter.set(counter.get() + 1)));

        timer.advance(Duration::from_millis(9));
        assert_eq!(fired.get(), 0);

        timer.advance(Duration::from_millis(1));
        assert_eq!(fired.get(), 1);
        assert_eq!(timer.pending(), 0);

        timer.advance(Duration::from_millis(100));
        assert_eq!(fired.get(), 1);
    }

    #[test]
    fn test_virtual_timer_cancel() {
        let timer = VirtualTimer::new();
        let fired = Rc::new(Cell::new(false));

        let flag = Rc::clone(&fired);
        let token = timer.arm(Duration::from_millis(5), Box::new(move || flag.set(true)));
        timer.cancel(token);
        timer.advance(Duration::from_millis(10));

        assert!(!fired.get());
        // Cancelling again is harmless
        timer.cancel(token);
    }

    #[test]
    fn test_virtual_timer_order() {
        let timer = VirtualTimer::new();
        let log = Rc::new(RefCell::new(Vec::new()));

        for (name, delay) in [("late", 20), ("early", 5), ("middle", 10)] {
            let log = Rc::clone(&log);
            timer.arm(Duration::from_millis(delay), Box::new(move || log.borrow_mut().push(name)));
        }
        timer.advance(Duration::from_millis(30));

        assert_eq!(*log.borrow(), vec!["early", "middle", "late"]);
        assert_eq!(timer.now(), Duration::from_millis(30));
    }

    #[test]
    fn test_virtual_timer_rearm_from_callback() {
        let timer = Rc::new(VirtualTimer::new());
        let fired = Rc::new(Cell::new(0));

        let inner_timer = Rc::clone(&timer);
        let counter = Rc::clone(&fired);
        timer.arm(
            Duration::from_millis(5),
            Box::new(move || {
                let counter = Rc::clone(&counter);
                inner_timer.arm(Duration::from_millis(5), Box::new(move || counter.set(counter.get() + 1)));
            }),
        );

        timer.advance(Duration::from_millis(10));
        assert_eq!(fired.get(), 1);
    }

    #[test]
    fn test_smol_timer_fires_and_cancels() {
        let executor = Rc::new(LocalExecutor::new());
        let timer = SmolTimer::new(Rc::clone(&executor));
        let fired = Rc::new(RefCell::new(Vec::new()));

        let log = Rc::clone(&fired);
        timer.arm(Duration::from_millis(1), Box::new(move || log.borrow_mut().push("kept")));
        let log = Rc::clone(&fired);
        let cancelled = timer.arm(Duration::from_millis(1), Box::new(move || log.borrow_mut().push("cancelled")));
        timer.cancel(cancelled);

        smol::block_on(executor.run(smol::Timer::after(Duration::from_millis(20))));

        assert_eq!(*fired.borrow(), vec!["kept"]);
    }
}
