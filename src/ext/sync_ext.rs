use std::process;
use std::sync::{Condvar, Mutex, MutexGuard, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Exit status used when a synchronization primitive fails.
const SYNC_FAULT_EXIT_CODE: i32 = 1;

/// Reports a failed synchronization primitive and terminates the process.
/// A poisoned lock means the protected state can no longer be trusted.
fn abort_on_sync_fault(action: &str) -> ! {
    eprintln!("Error: Unable to {action}");
    process::exit(SYNC_FAULT_EXIT_CODE)
}

pub trait MutexExt<T> {
    fn lock_or_abort(&self) -> MutexGuard<'_, T>;
}

impl<T> MutexExt<T> for Mutex<T> {
    fn lock_or_abort(&self) -> MutexGuard<'_, T> {
        self.lock().unwrap_or_else(|_| abort_on_sync_fault("lock"))
    }
}

pub trait CondvarExt {
    /// Blocks while `condition` holds, re-checking it on every wakeup.
    fn wait_while_or_abort<'a, T, F>(
        &self,
        guard: MutexGuard<'a, T>,
        condition: F,
    ) -> MutexGuard<'a, T>
    where
        F: FnMut(&mut T) -> bool;
}

impl CondvarExt for Condvar {
    fn wait_while_or_abort<'a, T, F>(
        &self,
        guard: MutexGuard<'a, T>,
        condition: F,
    ) -> MutexGuard<'a, T>
    where
        F: FnMut(&mut T) -> bool,
    {
        self.wait_while(guard, condition)
            .unwrap_or_else(|_| abort_on_sync_fault("wait"))
    }
}

pub trait RwLockExt<T> {
    fn read_or_abort(&self) -> RwLockReadGuard<'_, T>;
    fn write_or_abort(&self) -> RwLockWriteGuard<'_, T>;
}

impl<T> RwLockExt<T> for RwLock<T> {
    fn read_or_abort(&self) -> RwLockReadGuard<'_, T> {
        self.read()
            .unwrap_or_else(|_| abort_on_sync_fault("acquire the read lock"))
    }

    fn write_or_abort(&self) -> RwLockWriteGuard<'_, T> {
        self.write()
            .unwrap_or_else(|_| abort_on_sync_fault("acquire the write lock"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn lock_or_abort_returns_guard_on_healthy_mutex() {
        let mutex = Mutex::new(5);
        *mutex.lock_or_abort() += 1;
        assert_eq!(*mutex.lock_or_abort(), 6);
    }

    #[test]
    fn rwlock_allows_concurrent_readers() {
        let lock = RwLock::new(String::from("root"));
        let first = lock.read_or_abort();
        let second = lock.read_or_abort();
        assert_eq!(*first, *second);
    }

    #[test]
    fn wait_while_or_abort_wakes_after_condition_clears() {
        let pair = Arc::new((Mutex::new(false), Condvar::new()));
        let notifier = Arc::clone(&pair);

        let handle = thread::spawn(move || {
            thread::sleep(Duration::from_millis(20));
            let (flag, condvar) = &*notifier;
            *flag.lock_or_abort() = true;
            condvar.notify_one();
        });

        let (flag, condvar) = &*pair;
        let guard = condvar.wait_while_or_abort(flag.lock_or_abort(), |ready| !*ready);
        assert!(*guard);
        drop(guard);
        handle.join().expect("notifier thread panicked");
    }
}
