use parking_lot::RwLock;
use std::sync::Arc;

/// Shared handle; writers are exclusive per instance.
pub type ThreadSafe<T> = Arc<RwLock<T>>;

pub fn thread_safe<T>(t: T) -> ThreadSafe<T> {
    Arc::new(RwLock::new(t))
}
