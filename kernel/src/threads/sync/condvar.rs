use crate::get_list_element;
use crate::threads::interrupt;
use crate::utils::data_structures::linked_list::{order_by_key_desc, LinkedList, Node};

use super::lock::Lock;
use super::semaphore::Semaphore;

/// One entry in a [`CondVar`]'s waiter set.
///
/// Lives on the waiting thread's stack for the duration of a single
/// [`CondVar::wait`] call. `semaphore` has at most one potential waiter: the
/// thread that created this token.
struct WaiterToken {
    semaphore: Semaphore,
    link: Node<WaiterToken>,
}

impl WaiterToken {
    fn new() -> Self {
        Self {
            semaphore: Semaphore::new(0),
            link: Node::new(),
        }
    }
}

/// A condition variable allows one piece of code to signal a condition and
/// cooperating code to receive the signal and act upon it.
///
/// `CondVar` is Mesa-style, not Hoare-style: signaling and waking are not
/// atomic with the signaler's release of the lock, so a woken waiter must
/// re-check its predicate after reacquiring the lock, typically by calling
/// `wait` again in a loop.
///
/// A given `CondVar` is associated with only a single [`Lock`] over its
/// lifetime, but one lock may be associated with any number of condition
/// variables.
#[derive(Debug)]
pub struct CondVar {
    waiters: interrupt::Mutex<LinkedList<WaiterToken>>,
}

impl CondVar {
    /// Creates a new [`CondVar`] with no waiters.
    pub const fn new() -> Self {
        Self {
            waiters: interrupt::Mutex::new(LinkedList::new()),
        }
    }

    /// Atomically releases `lock` and waits for `self` to be signaled by
    /// some other piece of code. After `self` is signaled, `lock` is
    /// reacquired before returning.
    ///
    /// This function may sleep, so it must not be called within an interrupt
    /// handler. This function may be called with interrupts disabled, but
    /// interrupts will be turned back on if we need to sleep.
    ///
    /// # Panics
    /// Panics if the current thread does not hold `lock`, or if called from
    /// interrupt context.
    pub fn wait(&self, lock: &Lock) {
        assert!(!interrupt::is_external_handler_context());
        assert!(lock.held_by_current_thread());

        let mut token = WaiterToken::new();

        // Insertion order doesn't matter here: `signal` re-sorts by current
        // priority before it ever pops anything.
        self.waiters.lock().push_back(&mut token.link);

        lock.release();
        token.semaphore.down();
        lock.acquire();
    }

    /// If any threads are waiting on `self` (protected by `lock`), wakes the
    /// highest-priority one.
    ///
    /// An interrupt handler cannot acquire a lock, so it does not make sense
    /// to call this from interrupt context.
    ///
    /// # Panics
    /// Panics if the current thread does not hold `lock`.
    pub fn signal(&self, lock: &Lock) {
        assert!(lock.held_by_current_thread());

        let mut waiters = self.waiters.lock();
        if waiters.is_empty() {
            return;
        }

        // Donations may have changed priorities while threads waited;
        // ordering is decided now, at signal time, not at wait time.
        waiters.sort_by(order_by_key_desc(|node| {
            get_list_element!(node, WaiterToken, link)
                .semaphore
                .top_waiter_priority()
                .unwrap_or(0)
        }));

        let node = waiters.pop_front().expect("checked non-empty above");
        get_list_element!(node, WaiterToken, link).semaphore.up();
    }

    /// Wakes all threads, if any, waiting on `self` (protected by `lock`).
    ///
    /// Reads `self.waiters`' emptiness without disabling interrupts first;
    /// this is sound only because the precondition that `lock` is held
    /// already serializes every other caller that could mutate the waiter
    /// set.
    ///
    /// # Panics
    /// Panics if the current thread does not hold `lock`.
    pub fn broadcast(&self, lock: &Lock) {
        assert!(lock.held_by_current_thread());

        while !self.waiters.peek().is_empty() {
            self.signal(lock);
        }
    }
}

impl Default for CondVar {
    fn default() -> Self {
        Self::new()
    }
}

/// `self.waiters` is only ever touched with interrupts disabled.
unsafe impl Send for CondVar {}
