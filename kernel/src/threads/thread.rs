use core::ptr::NonNull;
use core::sync::atomic::{AtomicBool, Ordering};

use crate::get_list_element;
use crate::utils::data_structures::linked_list::{LinkedList, Node};

use super::sync::lock::Lock;

/// Thread identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(transparent)]
pub struct Id(u32);

impl Id {
    /// Returns a thread id to use for a new thread.
    fn new() -> Self {
        static mut NEXT_ID: u32 = 0;
        let id: u32;

        // TODO: protect this with a lock.
        unsafe {
            id = NEXT_ID;
            NEXT_ID += 1;
        }

        Self(id)
    }
}

/// States in a thread's life cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// Running thread.
    Running,

    /// Not running but ready to run.
    Ready,

    /// Waiting for an event to trigger.
    Blocked,

    /// About to be destroyed.
    Dying,
}

/// A kernel thread or a user process.
///
/// Each thread structure is stored in its own 4 KiB page. The thread structure
/// itself sits at the very bottom of the page (at offset 0). The reset of the page
/// is reserved for the thread's kernel stack, which grows downward from the top of
/// the page (at offset 4 KiB). Here's an illustration:
///
/// ```
///    4 kB +---------------------------------+
///         |          kernel stack           |
///         |                |                |
///         |                |                |
///         |                V                |
///         |         grows downward          |
///         |                                 |
///         |                                 |
///         |                                 |
///         |                                 |
///         |                                 |
///         |                                 |
///         |                                 |
///         |                                 |
///         +---------------------------------+
///         |              magic              |
///         |                :                |
///         |                :                |
///         |               name              |
///         |              status             |
///    0 kB +---------------------------------+
/// ```
///
/// The upshot of this is twofold:
///
/// 1. First, [`Thread`] must be not allowed to grow too big. If it does, then there will
/// not be enough room for the kernel stack. Our base [`Thread`] is only a few bytes in size.
/// It probably should stay well under 1 KiB.
///
/// 2. Second, kernel stacks must not be allowed to grow too large. If a stack overflows,
/// it will corrupt the thread state. Thus, kernel functions should not allocate large
/// structures or arrays as non-static local variables. Use dynamic allocation with `malloc()`
/// or `palloc_get_page()` instead.
///
/// The first symptom of either of these problems will probably be an assertion failure in
/// [`current_thread()`], which checks that the `magic` field of the running [`Thread`] is set to
/// `Thread::MAGIC`. Stack overflow will normally change this value, triggering the assertion.
#[derive(Debug)]
#[repr(C)]
pub struct Thread {
    /// Thread identifier.
    pub id: Id,

    /// Thread state.
    pub status: Status,

    /// Name (for debugging purposes).
    pub name: [u8; Self::NAME_LENGTH],

    /// Effective priority: `max(original_priority, priorities donated by
    /// `donors`)`. This is what the scheduler reads; it is kept up to date at
    /// every donation and rollback rather than recomputed lazily.
    pub priority: u32,

    /// Base priority, as last set by the thread itself (or at creation).
    /// Restored to `priority` once `donors` becomes empty.
    pub original_priority: u32,

    /// The lock this thread is currently blocked trying to acquire, or `None`
    /// if it isn't waiting on one. Set for the duration of a contended
    /// [`Lock::acquire`](super::sync::lock::Lock::acquire) call only; ignored
    /// entirely while the MLFQS scheduler is active.
    pub wait_on_lock: Option<NonNull<Lock>>,

    /// Threads that have donated their priority to this one, because each is
    /// blocked on some lock that this thread holds. An entry is a donor's
    /// `donation_node`; dereference it with
    /// `get_list_element!(node, Thread, donation_node)`.
    pub donors: LinkedList<Thread>,

    /// Linkage for membership in exactly one of: the scheduler's ready list,
    /// or a semaphore's waiter set. A thread is never in both at once, but
    /// this must stay independent of `donation_node` below: a thread can be
    /// parked on a semaphore *and* simultaneously be donating to whichever
    /// thread holds the lock it is waiting on.
    pub sync_node: Node<Thread>,

    /// Linkage for membership in some other thread's `donors` list.
    pub donation_node: Node<Thread>,

    /// Detects stack overflow.
    pub magic: u32,
}

impl Thread {
    /// Random value for [`Thread`]'s 'magic' member.
    ///
    /// Used to detect stack overflow.
    const MAGIC: u32 = 0xcd6a_bf4b;

    /// Maximum length of a thread name.
    const NAME_LENGTH: usize = 16;

    /// Lowest priority.
    const PRIORITY_MIN: u32 = 0;

    /// Default priority.
    const PRIORITY_DEFAULT: u32 = 31;

    /// Highest priority.
    const PRIORITY_MAX: u32 = 63;

    /// Does basic initialization as a blocked thread named `name`.
    fn init(&mut self, name: &str, priority: u32) {
        assert!(Self::PRIORITY_MIN <= priority && priority <= Self::PRIORITY_MAX);
        assert!(name.len() <= Self::NAME_LENGTH);

        self.status = Status::Blocked;
        self.name = [0; Self::NAME_LENGTH];
        self.name[..name.len()].copy_from_slice(name.as_bytes());
        self.priority = priority;
        self.original_priority = priority;
        self.wait_on_lock = None;
        self.donors = LinkedList::new();
        self.sync_node = Node::new();
        self.donation_node = Node::new();
        self.magic = Self::MAGIC;
    }

    /// Returns true if `thread` appears to be a valid thread.
    fn is_thread(&self) -> bool {
        self.magic == Self::MAGIC
    }

    /// Sets this thread's base priority, and, unless the MLFQS scheduler is
    /// active, immediately reconciles the effective `priority` against any
    /// donors still attached. A thread may raise or lower its own base
    /// priority at any time; lowering below a donated priority has no
    /// observable effect until the donors that elevated it release their
    /// locks.
    pub fn set_priority(&mut self, new_priority: u32) {
        assert!(Self::PRIORITY_MIN <= new_priority && new_priority <= Self::PRIORITY_MAX);

        self.original_priority = new_priority;

        if mlfqs_active() {
            self.priority = new_priority;
            return;
        }

        self.recompute_priority();
    }

    /// Recomputes `priority` as `max(original_priority, max over donors of
    /// donor.priority)`. Called after `original_priority` changes and after
    /// `donors` is mutated by [`Lock::release`](super::sync::lock::Lock::release).
    pub fn recompute_priority(&mut self) {
        let donor_max = self
            .donors
            .iter()
            .map(|node| get_list_element!(node, Thread, donation_node).priority)
            .max();

        self.priority = match donor_max {
            Some(donated) => core::cmp::max(self.original_priority, donated),
            None => self.original_priority,
        };
    }
}

/// Returns the running thread.
///
/// This is [`running_thread()`] plus a couple of sanity checks.
pub fn current_thread() -> &'static mut Thread {
    let thread = running_thread();

    assert!(thread.is_thread());
    assert!(thread.status == Status::Running);

    thread
}

/// Returns the current thread.
fn running_thread() -> &'static mut Thread {
    // Copy the CPU's stack pointer into `rsp`, and then round that down to the
    // start of the page. Because `Thread` is always at the beginning of a page
    // and the stack pointer is somewhere in the middle, this locates the current
    // `Thread`.
    let rsp: u64;
    unsafe {
        core::arch::asm!("mov {}, rsp", out(reg) rsp);
        let rsp = x86_64::VirtAddr::new(rsp);
        &mut *x86_64::structures::paging::Page::<x86_64::structures::paging::Size4KiB>::containing_address(
            rsp,
        )
        .start_address()
        .as_mut_ptr()
    }
}

/// Transforms the code that's currently running into a thread. This cannot work
/// in general and it is possible in this case only because the bootloader was
/// careful to put the bottom of the stack at a page boundary.
///
/// After calling this function, be sure to initialize the page allocator before
/// trying to create any threads.
///
/// It is not safe to call [`current_thread()`] until this function finishes.
pub fn setup_kernel_thread() {
    assert!(!x86_64::instructions::interrupts::are_enabled());

    let mut kernel_thread = running_thread();
    kernel_thread.init("main", Thread::PRIORITY_DEFAULT);
    kernel_thread.status = Status::Running;
    kernel_thread.id = Id::new();
}

/// Whether the multilevel-feedback-queue scheduler is active.
///
/// When set, [`Lock::acquire`](super::sync::lock::Lock::acquire) and
/// [`Lock::release`](super::sync::lock::Lock::release) skip priority
/// donation entirely; the MLFQS recomputes thread priorities on its own
/// schedule instead. `cheetos` has no command-line flag parser yet, so this
/// is exposed as a plain global, the same way `devices::timer` exposes its
/// tick counter.
static MLFQS_ACTIVE: AtomicBool = AtomicBool::new(false);

/// Returns whether the MLFQS scheduler is active.
pub fn mlfqs_active() -> bool {
    MLFQS_ACTIVE.load(Ordering::Relaxed)
}

/// Enables or disables the MLFQS scheduler.
///
/// # Safety
/// Must only be called during kernel bring-up, before any lock is
/// contended; flipping this while threads are donating priority would leave
/// the donation graph and the MLFQS's own bookkeeping in an inconsistent
/// state.
pub unsafe fn set_mlfqs_active(active: bool) {
    MLFQS_ACTIVE.store(active, Ordering::Relaxed);
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Builds a standalone, valid [`Thread`] for testing the donation
    /// bookkeeping (`recompute_priority`, `set_priority`) in isolation.
    /// `current_thread()` itself is not host-testable: it locates the
    /// running thread via the kernel stack's page address, which only
    /// makes sense inside the booted kernel.
    fn new_thread(priority: u32) -> std::boxed::Box<Thread> {
        let mut name = [0u8; Thread::NAME_LENGTH];
        name[0] = b't';

        std::boxed::Box::new(Thread {
            id: Id::new(),
            status: Status::Blocked,
            name,
            priority,
            original_priority: priority,
            wait_on_lock: None,
            donors: LinkedList::new(),
            sync_node: Node::new(),
            donation_node: Node::new(),
            magic: Thread::MAGIC,
        })
    }

    #[test]
    fn recompute_priority_with_no_donors_is_original_priority() {
        let mut t = new_thread(20);

        t.recompute_priority();

        assert_eq!(t.priority, 20);
    }

    #[test]
    fn recompute_priority_takes_max_of_original_and_donors() {
        let mut holder = new_thread(10);
        let mut low_donor = new_thread(20);
        let mut high_donor = new_thread(30);

        holder.donors.push_back(&mut low_donor.donation_node);
        holder.donors.push_back(&mut high_donor.donation_node);
        holder.recompute_priority();

        assert_eq!(holder.priority, 30);
    }

    #[test]
    fn set_priority_raises_base_immediately() {
        let mut t = new_thread(10);

        t.set_priority(25);

        assert_eq!(t.original_priority, 25);
        assert_eq!(t.priority, 25);
    }

    #[test]
    fn set_priority_below_donated_floor_has_no_immediate_effect() {
        let mut t = new_thread(10);
        let mut donor = new_thread(50);

        t.donors.push_back(&mut donor.donation_node);
        t.recompute_priority();
        assert_eq!(t.priority, 50);

        // Lowering the base priority while a donor outranks it must not
        // lower the effective priority: the donor is still owed it.
        t.set_priority(5);
        assert_eq!(t.original_priority, 5);
        assert_eq!(t.priority, 50);

        // Once the donor is gone (as `Lock::release` would do), the
        // lowered base priority takes effect.
        t.donors.retain(|_| false);
        t.recompute_priority();
        assert_eq!(t.priority, 5);
    }

    #[test]
    fn set_priority_under_mlfqs_bypasses_donor_floor() {
        // SAFETY: test-only; no lock is contended concurrently here.
        unsafe { set_mlfqs_active(true) };

        let mut t = new_thread(10);
        let mut donor = new_thread(50);
        t.donors.push_back(&mut donor.donation_node);
        t.recompute_priority();
        assert_eq!(t.priority, 50);

        t.set_priority(5);
        assert_eq!(t.priority, 5);

        unsafe { set_mlfqs_active(false) };
    }
}
