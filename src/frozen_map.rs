use alloc::boxed::Box;
use core::fmt::Debug;
use core::ops::Index;

use crate::chain_table;
use crate::chain_table::ChainTable;
use crate::equality::DefaultHashBuilder;
use crate::equality::KeyEquality;
use crate::error::KeyNotFound;
use crate::ordering::KeyOrder;
use crate::ordering::NaturalOrder;

/// Marker for a [`FrozenMap`] without an ordered key projection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Unordered;

/// The ordered key projection of a [`SortedFrozenMap`].
///
/// Holds the live entry indices sorted by the ordering rule `C`, and the rule
/// itself. Computed once at construction.
#[derive(Clone, Default)]
pub struct Sorted<C = NaturalOrder> {
    order: Box<[usize]>,
    compare: C,
}

impl<C> Debug for Sorted<C> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Sorted")
            .field("order", &self.order)
            .finish_non_exhaustive()
    }
}

/// A frozen map that also keeps its keys in sorted order.
pub type SortedFrozenMap<K, V, S = DefaultHashBuilder, C = NaturalOrder> =
    FrozenMap<K, V, S, Sorted<C>>;

/// A read-only hash map built once from a sequence of key-value pairs.
///
/// `FrozenMap<K, V, S, O>` stores its pairs in a [`ChainTable`] and hashes and
/// compares keys with the equality rule `S`. Any [`BuildHasher`] is an
/// equality rule for `Hash + Eq` keys; see [`KeyEquality`] for custom rules.
///
/// When the input contains the same key more than once, the first pair wins
/// and later pairs are discarded. Iteration yields the surviving pairs in the
/// order their keys first appeared.
///
/// `O` selects the key projection: [`Unordered`] (the default) stores
/// nothing extra, while [`Sorted`] additionally stores the keys sorted by an
/// ordering rule; see [`SortedFrozenMap`].
///
/// The map has no mutating methods. It is `Send` and `Sync` whenever its
/// contents are, and can be read from many threads at once.
///
/// [`BuildHasher`]: core::hash::BuildHasher
///
/// # Examples
///
/// ```rust
/// use frozen_chain::FrozenMap;
///
/// let map: FrozenMap<&str, i32> = [("a", 1), ("b", 2), ("a", 99)].into_iter().collect();
///
/// assert_eq!(map.len(), 2);
/// assert_eq!(map.get(&"a"), Some(&1));
/// assert_eq!(map.get(&"b"), Some(&2));
/// assert_eq!(map.get(&"c"), None);
/// assert_eq!(map.iter().collect::<Vec<_>>(), [(&"a", &1), (&"b", &2)]);
/// ```
#[derive(Clone)]
pub struct FrozenMap<K, V, S = DefaultHashBuilder, O = Unordered> {
    table: ChainTable<(K, V)>,
    equality: S,
    projection: O,
}

impl<K, V, S, O> Debug for FrozenMap<K, V, S, O>
where
    K: Debug,
    V: Debug,
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<K, V, S, O> Default for FrozenMap<K, V, S, O>
where
    S: Default,
    O: Default,
{
    fn default() -> Self {
        Self {
            table: ChainTable::default(),
            equality: S::default(),
            projection: O::default(),
        }
    }
}

fn build_table<K, V, S>(pairs: impl IntoIterator<Item = (K, V)>, equality: &S) -> ChainTable<(K, V)>
where
    S: KeyEquality<K>,
{
    ChainTable::<(K, V)>::build(
        pairs,
        |(k, _)| equality.hash_key(k),
        |(a, _), (b, _)| equality.keys_equal(a, b),
    )
}

impl<K, V, S> FrozenMap<K, V, S>
where
    S: KeyEquality<K>,
{
    /// Builds a map from `pairs` using `equality` to hash and compare keys.
    ///
    /// Later pairs whose key equals an earlier key are discarded.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use std::hash::RandomState;
    ///
    /// use frozen_chain::FrozenMap;
    ///
    /// let map = FrozenMap::from_iter_with_equality([(1, "one"), (2, "two")], RandomState::new());
    /// assert_eq!(map[&1], "one");
    /// ```
    pub fn from_iter_with_equality<I>(pairs: I, equality: S) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
    {
        Self {
            table: build_table(pairs, &equality),
            equality,
            projection: Unordered,
        }
    }

    /// Derives the ordered key projection using `order`, keeping the already
    /// built table.
    pub fn into_sorted_with<C>(self, order: C) -> FrozenMap<K, V, S, Sorted<C>>
    where
        C: KeyOrder<K>,
    {
        let sorted = self.table.sorted_indices(|(a, _), (b, _)| order.compare(a, b));
        FrozenMap {
            table: self.table,
            equality: self.equality,
            projection: Sorted {
                order: sorted,
                compare: order,
            },
        }
    }

    /// Derives the ordered key projection using the closure `compare`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use frozen_chain::FrozenMap;
    ///
    /// let map: FrozenMap<u32, char> = [(2, 'b'), (3, 'c'), (1, 'a')].into_iter().collect();
    /// let sorted = map.into_sorted_by(|a: &u32, b: &u32| b.cmp(a));
    /// assert_eq!(sorted.ordered_keys().collect::<Vec<_>>(), [&3, &2, &1]);
    /// ```
    pub fn into_sorted_by<C>(self, compare: C) -> FrozenMap<K, V, S, Sorted<C>>
    where
        C: Fn(&K, &K) -> core::cmp::Ordering,
    {
        self.into_sorted_with(compare)
    }

    /// Derives the ordered key projection using `K`'s [`Ord`] implementation.
    pub fn into_sorted(self) -> SortedFrozenMap<K, V, S>
    where
        K: Ord,
    {
        self.into_sorted_with(NaturalOrder)
    }
}

impl<K, V, S, C> FrozenMap<K, V, S, Sorted<C>>
where
    S: KeyEquality<K>,
    C: KeyOrder<K>,
{
    /// Builds a sorted map from `pairs`, hashing with `equality` and ordering
    /// keys with `order`.
    ///
    /// Duplicates are discarded before sorting, so the ordered keys hold each
    /// surviving key once. Keys that `order` considers equal keep their input
    /// order.
    pub fn from_iter_with_order<I>(pairs: I, equality: S, order: C) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
    {
        FrozenMap::from_iter_with_equality(pairs, equality).into_sorted_with(order)
    }

    /// Returns the position `key` has, or would have, in the ordered keys.
    ///
    /// `Ok(i)` means the key at position `i` compares equal to `key` under the
    /// ordering rule. `Err(i)` is the position where `key` would be inserted
    /// to keep the order. This only consults the ordering rule, never the
    /// equality rule.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use frozen_chain::SortedFrozenMap;
    ///
    /// let map: SortedFrozenMap<u32, ()> = [(30, ()), (10, ()), (20, ())].into_iter().collect();
    /// assert_eq!(map.rank(&20), Ok(1));
    /// assert_eq!(map.rank(&25), Err(2));
    /// ```
    pub fn rank(&self, key: &K) -> Result<usize, usize> {
        self.projection.order.binary_search_by(|&index| {
            let (stored, _) = self.table.value_at(index);
            self.projection.compare.compare(stored, key)
        })
    }
}

impl<K, V, S, C> FrozenMap<K, V, S, Sorted<C>> {
    /// Returns the ordering rule the keys were sorted with.
    pub fn ordering(&self) -> &C {
        &self.projection.compare
    }

    /// Returns an iterator over the keys in sorted order.
    ///
    /// The order is fixed at construction and is independent of both bucket
    /// layout and iteration order.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use frozen_chain::SortedFrozenMap;
    ///
    /// let map: SortedFrozenMap<&str, i32> =
    ///     [("b", 2), ("a", 1), ("b", 99)].into_iter().collect();
    /// assert_eq!(map.ordered_keys().collect::<Vec<_>>(), [&"a", &"b"]);
    /// assert_eq!(map.keys().collect::<Vec<_>>(), [&"b", &"a"]);
    /// ```
    pub fn ordered_keys(&self) -> OrderedKeys<'_, K, V> {
        OrderedKeys {
            inner: self.ordered_iter(),
        }
    }

    /// Returns an iterator over the key-value pairs in sorted key order.
    pub fn ordered_iter(&self) -> OrderedIter<'_, K, V> {
        OrderedIter {
            table: &self.table,
            order: self.projection.order.iter(),
        }
    }

    /// Returns the pair with the smallest key under the ordering rule.
    pub fn first_key_value(&self) -> Option<(&K, &V)> {
        self.ordered_iter().next()
    }

    /// Returns the pair with the largest key under the ordering rule.
    pub fn last_key_value(&self) -> Option<(&K, &V)> {
        self.ordered_iter().next_back()
    }

    /// Discards the ordered projection.
    pub fn into_unordered(self) -> FrozenMap<K, V, S> {
        FrozenMap {
            table: self.table,
            equality: self.equality,
            projection: Unordered,
        }
    }
}

impl<K, V, S> FrozenMap<K, V, S, Sorted<NaturalOrder>>
where
    K: Ord,
    S: KeyEquality<K>,
{
    /// Builds a sorted map from `pairs`, ordering keys by their [`Ord`]
    /// implementation.
    pub fn from_iter_sorted<I>(pairs: I, equality: S) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
    {
        Self::from_iter_with_order(pairs, equality, NaturalOrder)
    }
}

impl<K, V, S, O> FrozenMap<K, V, S, O>
where
    S: KeyEquality<K>,
{
    /// Returns the entry index of `key`, or `None` if the key has no live
    /// entry.
    ///
    /// Entry indices run from 0 to `len() - 1` in iteration order.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use frozen_chain::FrozenMap;
    ///
    /// let map: FrozenMap<char, u8> = [('x', 1), ('y', 2)].into_iter().collect();
    /// assert_eq!(map.get_index_of(&'y'), Some(1));
    /// assert_eq!(map.get_index_of(&'z'), None);
    /// ```
    #[inline]
    pub fn get_index_of(&self, key: &K) -> Option<usize> {
        let hash = self.equality.hash_key(key);
        self.table
            .find(hash, |(k, _)| self.equality.keys_equal(k, key))
    }

    /// Returns a reference to the value corresponding to the key.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use frozen_chain::FrozenMap;
    ///
    /// let map: FrozenMap<i32, &str> = [(1, "a")].into_iter().collect();
    /// assert_eq!(map.get(&1), Some(&"a"));
    /// assert_eq!(map.get(&2), None);
    /// ```
    #[inline]
    pub fn get(&self, key: &K) -> Option<&V> {
        self.get_key_value(key).map(|(_, v)| v)
    }

    /// Returns the stored key and its value.
    ///
    /// The stored key is the first occurrence from the input, which may
    /// differ from `key` under a custom equality rule.
    #[inline]
    pub fn get_key_value(&self, key: &K) -> Option<(&K, &V)> {
        let hash = self.equality.hash_key(key);
        self.table
            .find_value(hash, |(k, _)| self.equality.keys_equal(k, key))
            .map(|(k, v)| (k, v))
    }

    /// Returns the value corresponding to the key, or [`KeyNotFound`].
    ///
    /// # Examples
    ///
    /// ```rust
    /// use frozen_chain::FrozenMap;
    /// use frozen_chain::KeyNotFound;
    ///
    /// let map: FrozenMap<i32, &str> = [(1, "a")].into_iter().collect();
    /// assert_eq!(map.try_get(&1), Ok(&"a"));
    /// assert_eq!(map.try_get(&2), Err(KeyNotFound));
    /// ```
    pub fn try_get(&self, key: &K) -> Result<&V, KeyNotFound> {
        self.get(key).ok_or(KeyNotFound)
    }

    /// Returns `true` if the map contains a value for the specified key.
    pub fn contains_key(&self, key: &K) -> bool {
        self.get_index_of(key).is_some()
    }

    /// Returns chain-length and memory statistics for the underlying table.
    #[cfg(feature = "stats")]
    pub fn stats(&self) -> chain_table::TableStats {
        self.table.stats()
    }

    /// Computes a histogram of chain lengths for the underlying table.
    #[cfg(feature = "stats")]
    pub fn chain_histogram(&self) -> alloc::vec::Vec<usize> {
        self.table.chain_histogram()
    }
}

impl<K, V, S, O> FrozenMap<K, V, S, O> {
    /// Returns the number of pairs in the map.
    pub fn len(&self) -> usize {
        self.table.len()
    }

    /// Returns `true` if the map contains no pairs.
    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Returns the number of buckets chosen at construction.
    pub fn capacity(&self) -> usize {
        self.table.capacity()
    }

    /// Returns the equality rule keys are hashed and compared with.
    pub fn equality(&self) -> &S {
        &self.equality
    }

    /// Returns the pair at entry `index`, where entries are numbered in
    /// iteration order.
    pub fn get_index(&self, index: usize) -> Option<(&K, &V)> {
        self.table.get(index).map(|(k, v)| (k, v))
    }

    /// Returns an iterator over the pairs, in the order their keys first
    /// appeared in the input.
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            inner: self.table.iter(),
        }
    }

    /// Returns an iterator over the keys, in iteration order.
    pub fn keys(&self) -> Keys<'_, K, V> {
        Keys { inner: self.iter() }
    }

    /// Returns an iterator over the values, in iteration order.
    pub fn values(&self) -> Values<'_, K, V> {
        Values { inner: self.iter() }
    }
}

impl<K, V, S, O> PartialEq for FrozenMap<K, V, S, O>
where
    V: PartialEq,
    S: KeyEquality<K>,
{
    fn eq(&self, other: &Self) -> bool {
        if self.len() != other.len() {
            return false;
        }
        self.iter().all(|(k, v)| other.get(k) == Some(v))
    }
}

impl<K, V, S, O> Eq for FrozenMap<K, V, S, O>
where
    V: Eq,
    S: KeyEquality<K>,
{
}

impl<K, V, S, O> Index<&K> for FrozenMap<K, V, S, O>
where
    S: KeyEquality<K>,
{
    type Output = V;

    /// Returns the value for `key`.
    ///
    /// # Panics
    ///
    /// Panics with the [`KeyNotFound`] message if the key is not present.
    fn index(&self, key: &K) -> &V {
        match self.try_get(key) {
            Ok(value) => value,
            Err(err) => panic!("{err}"),
        }
    }
}

impl<K, V, S> FromIterator<(K, V)> for FrozenMap<K, V, S>
where
    S: KeyEquality<K> + Default,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self::from_iter_with_equality(iter, S::default())
    }
}

impl<K, V, S> FromIterator<(K, V)> for SortedFrozenMap<K, V, S>
where
    K: Ord,
    S: KeyEquality<K> + Default,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self::from_iter_sorted(iter, S::default())
    }
}

impl<K, V, S, O> IntoIterator for FrozenMap<K, V, S, O> {
    type Item = (K, V);
    type IntoIter = IntoIter<K, V>;

    fn into_iter(self) -> Self::IntoIter {
        IntoIter {
            inner: self.table.into_iter(),
        }
    }
}

impl<'a, K, V, S, O> IntoIterator for &'a FrozenMap<K, V, S, O> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// An iterator over the key-value pairs of a `FrozenMap`, in iteration
/// order.
pub struct Iter<'a, K, V> {
    inner: chain_table::Iter<'a, (K, V)>,
}

impl<K, V> Clone for Iter<'_, K, V> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(k, v)| (k, v))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> DoubleEndedIterator for Iter<'_, K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.next_back().map(|(k, v)| (k, v))
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {}

impl<K, V> core::iter::FusedIterator for Iter<'_, K, V> {}

/// An iterator over the keys of a `FrozenMap`.
pub struct Keys<'a, K, V> {
    inner: Iter<'a, K, V>,
}

impl<'a, K, V> Iterator for Keys<'a, K, V> {
    type Item = &'a K;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(k, _)| k)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> DoubleEndedIterator for Keys<'_, K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.next_back().map(|(k, _)| k)
    }
}

impl<K, V> ExactSizeIterator for Keys<'_, K, V> {}

/// An iterator over the values of a `FrozenMap`.
pub struct Values<'a, K, V> {
    inner: Iter<'a, K, V>,
}

impl<'a, K, V> Iterator for Values<'a, K, V> {
    type Item = &'a V;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(_, v)| v)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> DoubleEndedIterator for Values<'_, K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.next_back().map(|(_, v)| v)
    }
}

impl<K, V> ExactSizeIterator for Values<'_, K, V> {}

/// An owning iterator over the key-value pairs of a `FrozenMap`, in iteration
/// order.
pub struct IntoIter<K, V> {
    inner: chain_table::IntoIter<(K, V)>,
}

impl<K, V> Iterator for IntoIter<K, V> {
    type Item = (K, V);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> ExactSizeIterator for IntoIter<K, V> {}

/// An iterator over the key-value pairs of a `SortedFrozenMap`, in sorted key
/// order.
pub struct OrderedIter<'a, K, V> {
    table: &'a ChainTable<(K, V)>,
    order: core::slice::Iter<'a, usize>,
}

impl<K, V> Clone for OrderedIter<'_, K, V> {
    fn clone(&self) -> Self {
        Self {
            table: self.table,
            order: self.order.clone(),
        }
    }
}

impl<'a, K, V> Iterator for OrderedIter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        let table = self.table;
        self.order.next().map(|&index| {
            let (k, v) = table.value_at(index);
            (k, v)
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.order.size_hint()
    }
}

impl<K, V> DoubleEndedIterator for OrderedIter<'_, K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        let table = self.table;
        self.order.next_back().map(|&index| {
            let (k, v) = table.value_at(index);
            (k, v)
        })
    }
}

impl<K, V> ExactSizeIterator for OrderedIter<'_, K, V> {}

/// An iterator over the keys of a `SortedFrozenMap`, in sorted order.
pub struct OrderedKeys<'a, K, V> {
    inner: OrderedIter<'a, K, V>,
}

impl<'a, K, V> Iterator for OrderedKeys<'a, K, V> {
    type Item = &'a K;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(k, _)| k)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> DoubleEndedIterator for OrderedKeys<'_, K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.next_back().map(|(k, _)| k)
    }
}

impl<K, V> ExactSizeIterator for OrderedKeys<'_, K, V> {}
