use std::fmt;

use once_cell::unsync::OnceCell;

use crate::error::RuleResult;

/// A lazily computed value that is dropped when the inputs of its owner change.
///
/// A failed computation stores nothing, so the next read runs the computation again.
pub(crate) struct Memo<T>(OnceCell<T>);

impl<T> Memo<T> {
    pub(crate) fn new() -> Memo<T> {
        Memo(OnceCell::new())
    }

    pub(crate) fn get_or_try_init<F>(&self, f: F) -> RuleResult<&T>
    where
        F: FnOnce() -> RuleResult<T>,
    {
        self.0.get_or_try_init(f)
    }

    pub(crate) fn is_computed(&self) -> bool {
        self.0.get().is_some()
    }

    pub(crate) fn clear(&mut self) {
        self.0.take();
    }
}

impl<T> Default for Memo<T> {
    fn default() -> Memo<T> {
        Memo::new()
    }
}

impl<T: fmt::Debug> fmt::Debug for Memo<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0.get() {
            Some(v) => write!(f, "Memo({:?})", v),
            None => write!(f, "Memo(<empty>)"),
        }
    }
}
