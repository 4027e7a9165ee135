//! A state holder that applies changes before they are persisted and rolls them back on failure.

use std::{
    future::Future,
    sync::{Mutex, MutexGuard, PoisonError},
};

struct CellState<S> {
    value: S,
    mounted: bool,
}

/// Local state that is updated optimistically.
///
/// Once [OptimisticCell::unmount] is called, results that arrive afterwards are
/// discarded instead of being applied to stale state.
///
/// Concurrent updates are not coalesced: if two updates race and both fail,
/// the snapshot of whichever settles last is the one that remains.
pub struct OptimisticCell<S> {
    inner: Mutex<CellState<S>>,
}

impl<S: Clone> OptimisticCell<S> {
    /// Create a mounted cell holding `value`.
    pub fn new(value: S) -> Self {
        Self {
            inner: Mutex::new(CellState {
                value,
                mounted: true,
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, CellState<S>> {
        // The state is always left consistent, so a poisoned lock is still usable.
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// A copy of the current value.
    pub fn get(&self) -> S {
        self.lock().value.clone()
    }

    /// Replace the value if the cell is still mounted.
    ///
    /// Returns whether the value was replaced.
    pub fn set(&self, value: S) -> bool {
        let mut state = self.lock();

        if state.mounted {
            state.value = value;
        }

        state.mounted
    }

    /// Whether results should still be applied to this cell.
    pub fn is_mounted(&self) -> bool {
        self.lock().mounted
    }

    /// Stop applying results to this cell.
    pub fn unmount(&self) {
        self.lock().mounted = false;
    }

    /// Apply `apply` to the value immediately, then wait for `persist`.
    ///
    /// If `persist` fails, the value is restored to what it was before `apply`
    /// and the error is returned. If the cell is unmounted, before or while
    /// `persist` is pending, the value is left alone and the result is returned
    /// unchanged.
    pub async fn with_optimistic_update<T, E, A, F>(&self, apply: A, persist: F) -> Result<T, E>
    where
        A: FnOnce(&mut S),
        F: Future<Output = Result<T, E>>,
    {
        let snapshot = {
            let mut state = self.lock();

            if state.mounted {
                let snapshot = state.value.clone();
                apply(&mut state.value);
                Some(snapshot)
            } else {
                None
            }
        };

        let result = persist.await;

        let mut state = self.lock();

        match snapshot {
            Some(snapshot) if state.mounted && result.is_err() => state.value = snapshot,
            _ => {}
        }

        result
    }
}
