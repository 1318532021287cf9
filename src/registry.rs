//! Reference-counted driver registration.
//!
//! An explicit provider the host consults at startup, instead of patching a
//! shared factory method. Registration is idempotent and counted so nested
//! register/unregister pairs are safe. The count is process-wide state; it
//! is expected to change only during single-threaded startup, but the mutex
//! makes it safe regardless.

use std::sync::{LazyLock, Mutex, MutexGuard};

use crate::config::D1ConnectionOptions;
use crate::driver::D1Driver;
use crate::error::D1MiddlewareError;

static REGISTRATIONS: LazyLock<Mutex<usize>> = LazyLock::new(|| Mutex::new(0));

fn registrations() -> MutexGuard<'static, usize> {
    match REGISTRATIONS.lock() {
        Ok(guard) => guard,
        // Clear the poison and continue with the recovered count
        Err(poisoned) => poisoned.into_inner(),
    }
}

/// Register the D1 driver; returns the new registration count.
pub fn register() -> usize {
    let mut count = registrations();
    *count += 1;
    *count
}

/// Undo one registration; saturates at zero. Returns the new count.
pub fn unregister() -> usize {
    let mut count = registrations();
    *count = count.saturating_sub(1);
    *count
}

#[must_use]
pub fn is_registered() -> bool {
    *registrations() > 0
}

/// Build a driver for D1-shaped options, provided at least one registration
/// is live.
///
/// # Errors
///
/// Returns `D1MiddlewareError::ValidationError` when the driver is not
/// registered or the options fail validation.
pub fn create_driver(options: D1ConnectionOptions) -> Result<D1Driver, D1MiddlewareError> {
    if !is_registered() {
        return Err(D1MiddlewareError::ValidationError(
            "the D1 driver is not registered; call registry::register() during startup".into(),
        ));
    }
    D1Driver::new(options)
}
