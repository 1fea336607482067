//! Test helpers for scoped environment mutation.

use std::sync::{Mutex, OnceLock};

/// Process-wide lock serializing env mutation across test threads.
pub(crate) fn env_lock() -> &'static Mutex<()> {
    static LOCK: OnceLock<Mutex<()>> = OnceLock::new();
    LOCK.get_or_init(|| Mutex::new(()))
}

#[allow(unused_unsafe)]
fn write_var(key: &str, value: Option<&str>) {
    // SAFETY: callers hold `env_lock` while mutating.
    unsafe {
        match value {
            Some(value) => std::env::set_var(key, value),
            None => std::env::remove_var(key),
        }
    }
}

/// Overrides one variable and restores its prior state on drop.
pub(crate) struct EnvGuard {
    key: &'static str,
    previous: Option<String>,
}

impl EnvGuard {
    pub(crate) fn set(key: &'static str, value: &str) -> Self {
        let previous = std::env::var(key).ok();
        write_var(key, Some(value));
        Self { key, previous }
    }

    pub(crate) fn remove(key: &'static str) -> Self {
        let previous = std::env::var(key).ok();
        write_var(key, None);
        Self { key, previous }
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        write_var(self.key, self.previous.as_deref());
    }
}

#[cfg(test)]
mod tests {
    use super::{env_lock, EnvGuard};

    #[test]
    fn guard_restores_previous_value() {
        let _lock = env_lock().lock().expect("env lock");
        let key = "INLINESYNC_TEST_ENV_GUARD_RESTORE";
        let _baseline = EnvGuard::set(key, "before");
        {
            let _override = EnvGuard::set(key, "after");
            assert_eq!(std::env::var(key).ok().as_deref(), Some("after"));
        }
        assert_eq!(std::env::var(key).ok().as_deref(), Some("before"));
    }
}
