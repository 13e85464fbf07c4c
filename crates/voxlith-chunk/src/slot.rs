use std::sync::Mutex;

/// Double-buffered hand-off of worker output to the owning thread.
///
/// A worker `publish`es into the pending slot under a short lock; the owner
/// calls `swap` once per frame to move it into the active slot. A second
/// publish before a swap replaces the first.
#[derive(Debug)]
pub struct PendingSlot<T> {
    pending: Mutex<Option<T>>,
    active: Mutex<Option<T>>,
}

impl<T> Default for PendingSlot<T> {
    fn default() -> Self {
        Self {
            pending: Mutex::new(None),
            active: Mutex::new(None),
        }
    }
}

impl<T> PendingSlot<T> {
    pub fn publish(&self, value: T) {
        let mut p = self.pending.lock().unwrap_or_else(|e| e.into_inner());
        *p = Some(value);
    }

    pub fn has_pending(&self) -> bool {
        self.pending.lock().unwrap_or_else(|e| e.into_inner()).is_some()
    }

    pub fn take_pending(&self) -> Option<T> {
        self.pending.lock().unwrap_or_else(|e| e.into_inner()).take()
    }

    /// Moves a pending value into the active slot; returns the replaced value.
    pub fn swap(&self) -> Option<Option<T>> {
        let next = self.take_pending()?;
        let mut a = self.active.lock().unwrap_or_else(|e| e.into_inner());
        Some(a.replace(next))
    }

    /// Installs a value directly as active.
    pub fn set_active(&self, value: T) -> Option<T> {
        self.active.lock().unwrap_or_else(|e| e.into_inner()).replace(value)
    }

    pub fn with_active<R>(&self, f: impl FnOnce(Option<&T>) -> R) -> R {
        let a = self.active.lock().unwrap_or_else(|e| e.into_inner());
        f(a.as_ref())
    }

    pub fn clear(&self) {
        self.pending.lock().unwrap_or_else(|e| e.into_inner()).take();
        self.active.lock().unwrap_or_else(|e| e.into_inner()).take();
    }
}
