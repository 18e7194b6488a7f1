use core::fmt::Debug;

use crate::chain_table;
use crate::chain_table::ChainTable;
use crate::equality::DefaultHashBuilder;
use crate::equality::KeyEquality;

/// A read-only hash set built once from a sequence of values.
///
/// `FrozenSet<T, S>` shares [`FrozenMap`]'s storage and rules: values are
/// hashed and compared with the equality rule `S`, the first of any equal
/// values is kept, and iteration follows first-occurrence order.
///
/// [`FrozenMap`]: crate::FrozenMap
#[derive(Clone)]
pub struct FrozenSet<T, S = DefaultHashBuilder> {
    table: ChainTable<T>,
    equality: S,
}

impl<T, S> PartialEq for FrozenSet<T, S>
where
    S: KeyEquality<T>,
{
    fn eq(&self, other: &Self) -> bool {
        if self.len() != other.len() {
            return false;
        }
        self.iter().all(|v| other.contains(v))
    }
}

impl<T, S> Eq for FrozenSet<T, S> where S: KeyEquality<T> {}

impl<T, S> Debug for FrozenSet<T, S>
where
    T: Debug,
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl<T, S> Default for FrozenSet<T, S>
where
    S: Default,
{
    fn default() -> Self {
        Self {
            table: ChainTable::default(),
            equality: S::default(),
        }
    }
}

impl<T, S> FrozenSet<T, S>
where
    S: KeyEquality<T>,
{
    /// Builds a set from `values` using `equality` to hash and compare them.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # #[cfg(feature = "std")]
    /// # {
    /// use std::hash::RandomState;
    ///
    /// use frozen_chain::FrozenSet;
    ///
    /// let set = FrozenSet::from_iter_with_equality([3, 1, 3, 2], RandomState::new());
    /// assert_eq!(set.len(), 3);
    /// assert_eq!(set.iter().collect::<Vec<_>>(), [&3, &1, &2]);
    /// # }
    /// ```
    pub fn from_iter_with_equality<I>(values: I, equality: S) -> Self
    where
        I: IntoIterator<Item = T>,
    {
        let table = ChainTable::<T>::build(
            values,
            |v| equality.hash_key(v),
            |a, b| equality.keys_equal(a, b),
        );
        Self { table, equality }
    }

    /// Returns `true` if the set contains a value equal to `value`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use frozen_chain::FrozenSet;
    ///
    /// let set: FrozenSet<i32> = [1, 2].into_iter().collect();
    /// assert!(set.contains(&1));
    /// assert!(!set.contains(&3));
    /// ```
    pub fn contains(&self, value: &T) -> bool {
        self.get_index_of(value).is_some()
    }

    /// Returns the stored value equal to `value`, if any.
    pub fn get(&self, value: &T) -> Option<&T> {
        let hash = self.equality.hash_key(value);
        self.table
            .find_value(hash, |v| self.equality.keys_equal(v, value))
    }

    /// Returns the entry index of `value`, in iteration order.
    pub fn get_index_of(&self, value: &T) -> Option<usize> {
        let hash = self.equality.hash_key(value);
        self.table.find(hash, |v| self.equality.keys_equal(v, value))
    }

    /// Returns `true` if `self` has no values in common with `other`.
    pub fn is_disjoint(&self, other: &FrozenSet<T, S>) -> bool {
        if self.len() <= other.len() {
            self.iter().all(|v| !other.contains(v))
        } else {
            other.iter().all(|v| !self.contains(v))
        }
    }

    /// Returns `true` if every value in `self` is also in `other`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use frozen_chain::FrozenSet;
    ///
    /// let small: FrozenSet<i32> = [1, 2].into_iter().collect();
    /// let large: FrozenSet<i32> = [1, 2, 3].into_iter().collect();
    /// assert!(small.is_subset(&large));
    /// assert!(!large.is_subset(&small));
    /// ```
    pub fn is_subset(&self, other: &FrozenSet<T, S>) -> bool {
        if self.len() > other.len() {
            return false;
        }
        self.iter().all(|v| other.contains(v))
    }

    /// Returns `true` if every value in `other` is also in `self`.
    pub fn is_superset(&self, other: &FrozenSet<T, S>) -> bool {
        other.is_subset(self)
    }

    /// Returns an iterator over the values in `self` that are also in
    /// `other`, in `self`'s iteration order.
    pub fn intersection<'a>(&'a self, other: &'a FrozenSet<T, S>) -> Intersection<'a, T, S> {
        Intersection {
            iter: self.iter(),
            other,
        }
    }

    /// Returns an iterator over the values in `self` that are not in `other`,
    /// in `self`'s iteration order.
    pub fn difference<'a>(&'a self, other: &'a FrozenSet<T, S>) -> Difference<'a, T, S> {
        Difference {
            iter: self.iter(),
            other,
        }
    }
}

impl<T, S> FrozenSet<T, S> {
    /// Returns the number of values in the set.
    pub fn len(&self) -> usize {
        self.table.len()
    }

    /// Returns `true` if the set contains no values.
    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Returns the number of buckets chosen at construction.
    pub fn capacity(&self) -> usize {
        self.table.capacity()
    }

    /// Returns the equality rule values are hashed and compared with.
    pub fn equality(&self) -> &S {
        &self.equality
    }

    /// Returns the value at entry `index`, in iteration order.
    pub fn get_index(&self, index: usize) -> Option<&T> {
        self.table.get(index)
    }

    /// Returns an iterator over the values in first-occurrence order.
    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            inner: self.table.iter(),
        }
    }
}

impl<T, S> FromIterator<T> for FrozenSet<T, S>
where
    S: KeyEquality<T> + Default,
{
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self::from_iter_with_equality(iter, S::default())
    }
}

impl<T, S> IntoIterator for FrozenSet<T, S> {
    type Item = T;
    type IntoIter = IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        IntoIter {
            inner: self.table.into_iter(),
        }
    }
}

impl<'a, T, S> IntoIterator for &'a FrozenSet<T, S> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// An iterator over the values of a `FrozenSet`.
pub struct Iter<'a, T> {
    inner: chain_table::Iter<'a, T>,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<T> DoubleEndedIterator for Iter<'_, T> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.next_back()
    }
}

impl<T> ExactSizeIterator for Iter<'_, T> {}

/// An owning iterator over the values of a `FrozenSet`.
pub struct IntoIter<T> {
    inner: chain_table::IntoIter<T>,
}

impl<T> Iterator for IntoIter<T> {
    type Item = T;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<T> ExactSizeIterator for IntoIter<T> {}

/// An iterator over the intersection of two `FrozenSet`s.
pub struct Intersection<'a, T, S> {
    iter: Iter<'a, T>,
    other: &'a FrozenSet<T, S>,
}

impl<'a, T, S> Iterator for Intersection<'a, T, S>
where
    S: KeyEquality<T>,
{
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        let other = self.other;
        self.iter.find(|v| other.contains(v))
    }
}

/// An iterator over the difference of two `FrozenSet`s.
pub struct Difference<'a, T, S> {
    iter: Iter<'a, T>,
    other: &'a FrozenSet<T, S>,
}

impl<'a, T, S> Iterator for Difference<'a, T, S>
where
    S: KeyEquality<T>,
{
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        let other = self.other;
        self.iter.find(|v| !other.contains(v))
    }
}
