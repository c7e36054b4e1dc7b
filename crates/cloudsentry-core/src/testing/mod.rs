//! In-memory fakes of every collaborator trait.
//!
//! The fakes record each call so tests can assert on side effects, and expose
//! switches for injecting failures.

mod cloud;
mod remote;

pub use cloud::{FakeAlerting, FakeDirectory, FakeIdentity};
pub use remote::{FakeHost, FakeShell};

use std::sync::{Mutex, MutexGuard};

pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
