use crate::threads::Lock;

/// Serializes every access to the (not yet implemented) file system.
///
/// File system code is not safe for concurrent access by multiple threads:
/// in the system this was ported from, every system call that touches a
/// file acquires this lock first and releases it before returning. Carried
/// over ahead of the file system itself so that the call sites that will
/// need it already have something to acquire.
pub static FILESYS_LOCK: Lock = Lock::new();
