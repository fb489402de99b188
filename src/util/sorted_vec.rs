use std::{
    cmp::Ordering,
    fmt::{Debug, Formatter, Result as FmtResult},
    ops::Deref,
};

/// A [`Vec`] whose elements are kept in ascending order based on the given
/// comparator. Equal elements are all retained.
#[derive(Clone)]
pub struct SortedVec<T> {
    inner: Vec<T>,
    cmp: fn(&T, &T) -> Ordering,
}

impl<T> SortedVec<T> {
    pub fn with_capacity(capacity: usize, cmp: fn(&T, &T) -> Ordering) -> Self {
        Self {
            inner: Vec::with_capacity(capacity),
            cmp,
        }
    }

    /// Insert a new value while keeping the order.
    pub fn insert(&mut self, value: T) {
        let idx = self
            .inner
            .partition_point(|elem| (self.cmp)(elem, &value) != Ordering::Greater);

        self.inner.insert(idx, value);
    }
}

impl SortedVec<f64> {
    pub fn new_f64() -> Self {
        Self::with_capacity(0, f64::total_cmp)
    }
}

impl<T> Deref for SortedVec<T> {
    type Target = [T];

    #[inline]
    fn deref(&self) -> &Self::Target {
        <Vec<T> as Deref>::deref(&self.inner)
    }
}

impl<T: Debug> Debug for SortedVec<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        <Vec<T> as Debug>::fmt(&self.inner, f)
    }
}
