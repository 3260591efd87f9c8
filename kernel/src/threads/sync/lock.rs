use core::cell::UnsafeCell;
use core::ptr::NonNull;

use crate::get_list_element;
use crate::threads::{
    interrupt,
    thread::{self, current_thread, mlfqs_active, Thread},
};
use crate::without_interrupts;

use super::semaphore::Semaphore;

/// A lock can be held at most a single thread at any given time. Our locks are
/// not "recursive", that is, it is an error for the thread currently holding
/// a lock to try to acquire that lock.
///
/// A lock is a specialization of a sempahore with an initial value of 1. The
/// difference between a lock and such a semaphore is twofold. First, a
/// semaphore can have a value greater than 1, but a lock can only be owned by
/// a single thread at a time. Second, a semaphore does not have an owner,
/// meaning that one thread can "down" a semaphore and then another one "up" it,
/// but with a lock the same thread must both acquire and release it. When these
/// restrictions prove onernous, it's a good sign that a semaphore should be
/// used, instead of a lock.
///
/// Unless the MLFQS scheduler is active, contending for a held [`Lock`]
/// donates the contender's priority transitively to the chain of threads
/// standing between it and the lock becoming free (see [`Lock::acquire`]),
/// so that a low-priority holder can't stall a higher-priority waiter
/// indefinitely (priority inversion).
#[derive(Debug)]
pub struct Lock {
    /// Binary semaphore controlling access.
    semaphore: Semaphore,

    /// The thread currently holding this lock, or `None`. Guarded the same
    /// way every other piece of shared kernel state is: interrupts disabled
    /// for the duration of any inspection or mutation.
    holder: interrupt::Mutex<Option<NonNull<Thread>>>,
}

/// Bounds the transitive donation walk in [`Lock::acquire`]. The source this
/// was ported from walks until the chain runs out, which is safe there only
/// because the donation graph is acyclic by construction (§3); a fixed depth
/// cap is the traditional, cheaper alternative for the same guarantee.
const MAX_DONATION_DEPTH: usize = 8;

impl Lock {
    /// Creates a new, unheld [`Lock`].
    pub const fn new() -> Self {
        Self {
            semaphore: Semaphore::new(1),
            holder: interrupt::Mutex::new(None),
        }
    }

    /// Acquires the lock, sleeping until it becomes available if necessary.
    ///
    /// This function may sleep, so it must not be called within an interrupt
    /// handler. This function may be called with interrupts disabled, but
    /// interrupts will be turned back on if we need to sleep.
    ///
    /// # Panics
    /// Panics if the current thread already holds this lock.
    pub fn acquire(&self) {
        assert!(!interrupt::is_external_handler_context());
        assert!(!self.held_by_current_thread());

        if !mlfqs_active() {
            without_interrupts!({
                if let Some(holder) = *self.holder.peek() {
                    self.donate(holder);
                }
            });
        }

        self.semaphore.down();

        *self.holder.lock() = Some(NonNull::from(current_thread()));
        if !mlfqs_active() {
            current_thread().wait_on_lock = None;
        }
    }

    /// Registers the current thread as a donor of `holder` (the thread
    /// presently holding `self`), then walks `holder`'s own
    /// [`wait_on_lock`](Thread::wait_on_lock) chain, elevating every
    /// thread's effective priority to at least the current thread's. Must be
    /// called with interrupts disabled.
    ///
    /// The walk stops as soon as a node's priority already meets or exceeds
    /// the donated priority (monotonic cutoff: nothing further up the chain
    /// can need elevating either) or the chain runs out of locks to follow.
    fn donate(&self, holder: NonNull<Thread>) {
        let current = current_thread();

        // Safety: `holder` was read from `self.holder` with interrupts
        // disabled, and a lock's holder thread is alive for as long as it
        // holds the lock.
        let holder = unsafe { &mut *holder.as_ptr() };
        holder.donors.push_back(&mut current.donation_node);
        current.wait_on_lock = Some(NonNull::from(self));

        let donated_priority = current.priority;
        let mut node: *mut Thread = holder;

        for _ in 0..MAX_DONATION_DEPTH {
            let node_ref = unsafe { &mut *node };
            if node_ref.priority >= donated_priority {
                break;
            }
            node_ref.priority = donated_priority;

            let Some(next_lock) = node_ref.wait_on_lock else {
                break;
            };
            // Safety: locks are never deallocated (§3 lifecycle).
            let next_lock = unsafe { next_lock.as_ref() };
            let Some(next_holder) = *next_lock.holder.peek() else {
                break;
            };
            node = next_holder.as_ptr();
        }
    }

    /// Tries to acquires LOCK and returns true if successful or false
    /// on failure. The lock must not already be held by the current
    /// thread.
    ///
    /// This function will not sleep, so it may be called within an interrupt
    /// handler. Unlike [`acquire`](Self::acquire), it never donates priority.
    pub fn try_acquire(&self) -> bool {
        assert!(!self.held_by_current_thread());

        let acquired = self.semaphore.try_down();
        if acquired {
            *self.holder.lock() = Some(NonNull::from(current_thread()));
        }
        acquired
    }

    /// Releases the lock, which must be owned by the current thread.
    ///
    /// An interrupt handler cannot acquire a lock, so it does not make sense to
    /// try to release a lock within an interrupt handler.
    ///
    /// # Panics
    /// Panics if the current thread does not hold this lock.
    pub fn release(&self) {
        assert!(self.held_by_current_thread());

        if !mlfqs_active() {
            without_interrupts!({
                let current = current_thread();
                let this_lock = NonNull::from(self);

                current.donors.retain(|node| {
                    let donor = get_list_element!(node, Thread, donation_node);
                    donor.wait_on_lock != Some(this_lock)
                });
                current.recompute_priority();
            });
        }

        *self.holder.lock() = None;
        self.semaphore.up();
    }

    /// Returns true if the current thread holds LOCK, false
    /// otherwise. (Note that testing whether some other thread holds
    /// a lock would be racy.)
    pub fn held_by_current_thread(&self) -> bool {
        *self.holder.peek() == Some(NonNull::from(current_thread()))
    }
}

impl Default for Lock {
    fn default() -> Self {
        Self::new()
    }
}

/// Both halves of [`Lock`]'s internal state (the semaphore and the holder
/// pointer) are only ever touched with interrupts disabled, same as
/// [`Semaphore`].
unsafe impl Send for Lock {}

/// The data protected by a [`Mutex`], with some metadata.
struct MutexData<T> {
    value: T,
    holder: Option<*mut thread::Thread>,
}

/// A mutual exclusion primitive used for protecting shared data,
/// implemented using a [`Lock`].
#[derive(Debug)]
pub struct Mutex<T> {
    /// The data protected by the mutex.
    data: UnsafeCell<MutexData<T>>,

    /// The underlying lock.
    lock: Lock,
}

impl<T> Mutex<T> {
    /// Creates a new [`Mutex`].
    pub const fn new(value: T) -> Self {
        Self {
            data: UnsafeCell::new(MutexData {
                value,
                holder: None,
            }),
            lock: Lock::new(),
        }
    }

    /// Returns a guard which locks the mutex when accessed a mutable reference,
    /// and unlocks the mutex when the reference is dropped.
    pub fn lock(&self) -> MutexGuard<T> {
        MutexGuard::new(self)
    }
}

/// [`Mutex`] is [`Sync`] because the underlying mutable data is protected by a
/// [`Lock`].
unsafe impl<T> Sync for Mutex<T> {}

/// An RAII guard of a critical section protected by a [`Lock`].
pub struct MutexGuard<'a, T> {
    mutex: &'a Mutex<T>,
}

impl<'a, T> MutexGuard<'a, T> {
    /// Creates a new [`MutexGuard`].
    fn new(mutex: &'a Mutex<T>) -> Self {
        Self { mutex }
    }
}

impl<'a, T> core::ops::Deref for MutexGuard<'a, T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        let Mutex { data, .. } = self.mutex;

        // No need to acquire the lock here.
        let data = unsafe { &*data.get() };
        &data.value
    }
}

impl<'a, T> core::ops::DerefMut for MutexGuard<'a, T> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        let Mutex { lock, data } = self.mutex;

        // Start of a critical section.
        lock.acquire();

        let data = unsafe { &mut *data.get() };
        data.holder = Some(thread::current_thread());
        &mut data.value
    }
}

impl<'a, T> core::ops::Drop for MutexGuard<'a, T> {
    fn drop(&mut self) {
        let Mutex { lock, data } = self.mutex;

        let data = unsafe { &mut *data.get() };
        let holder = data.holder;
        data.holder = None;

        // End of a critical section.
        if holder == Some(thread::current_thread()) {
            lock.release();
        }
    }
}
