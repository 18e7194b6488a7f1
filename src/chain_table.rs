use alloc::boxed::Box;
use alloc::vec;
use alloc::vec::Vec;
use core::cmp::Ordering;
use core::fmt::Debug;
use core::iter::FusedIterator;

/// Sentinel marking an empty bucket or the end of a chain.
const EMPTY: usize = usize::MAX;

/// Hashes are reduced to a non-negative 31-bit code before use, so the
/// modulo against the bucket count is always well defined.
const HASH_MASK: u64 = 0x7FFF_FFFF;

/// Smallest capacity ever selected. Keeps tiny tables from degenerating into
/// a single chain.
pub const MIN_CAPACITY: usize = 3;

const SMALL_PRIMES: [usize; 24] = [
    3, 5, 7, 11, 13, 17, 19, 23, 29, 31, 37, 41, 43, 47, 53, 59, 61, 67, 71, 73, 79, 83, 89, 97,
];

#[inline(always)]
fn hash_code(hash: u64) -> u32 {
    (hash & HASH_MASK) as u32
}

fn is_prime(candidate: usize) -> bool {
    if candidate < 2 {
        return false;
    }
    if candidate % 2 == 0 {
        return candidate == 2;
    }

    let mut divisor = 3;
    while divisor <= candidate / divisor {
        if candidate % divisor == 0 {
            return false;
        }
        divisor += 2;
    }

    true
}

/// Returns the bucket count used for a table built from `requested` values.
///
/// The result is the smallest prime that is at least
/// `max(requested, MIN_CAPACITY)`, which keeps the average chain length at or
/// below one for duplicate-free input.
///
/// # Panics
///
/// Panics with `"capacity overflow"` if no such prime fits in a `usize`.
///
/// # Examples
///
/// ```rust
/// use frozen_chain::next_capacity;
///
/// assert_eq!(next_capacity(0), 3);
/// assert_eq!(next_capacity(8), 11);
/// assert_eq!(next_capacity(100), 101);
/// ```
pub fn next_capacity(requested: usize) -> usize {
    let requested = requested.max(MIN_CAPACITY);

    let small = SMALL_PRIMES.partition_point(|&p| p < requested);
    if let Some(&prime) = SMALL_PRIMES.get(small) {
        return prime;
    }

    let mut candidate = requested | 1;
    loop {
        if is_prime(candidate) {
            return candidate;
        }
        candidate = candidate.checked_add(2).expect("capacity overflow");
    }
}

#[derive(Clone)]
struct Slot<V> {
    hash_code: u32,
    next: usize,
    value: V,
}

/// Chain-length statistics for a built table.
///
/// Only available with the `stats` feature.
#[cfg(feature = "stats")]
#[derive(Debug, Clone, PartialEq)]
pub struct TableStats {
    /// Number of live entries
    pub len: usize,
    /// Number of buckets (and reserved entry slots)
    pub capacity: usize,
    /// Buckets holding at least one entry
    pub used_buckets: usize,
    /// Length of the longest chain
    pub longest_chain: usize,
    /// Mean chain length over used buckets
    pub average_chain_length: f64,
    /// Load factor (len / capacity)
    pub load_factor: f64,
    /// Approximate bytes allocated for buckets and entries
    pub total_bytes: usize,
}

#[cfg(feature = "stats")]
impl TableStats {
    /// Pretty-print the statistics.
    #[cfg(feature = "std")]
    pub fn print(&self) {
        println!("=== Frozen Table Statistics ===");
        println!(
            "Population: {}/{} ({:.2}% load factor)",
            self.len,
            self.capacity,
            self.load_factor * 100.0
        );
        println!(
            "Buckets: {} used, longest chain {}, average chain {:.3}",
            self.used_buckets, self.longest_chain, self.average_chain_length
        );
        println!("Total Allocated: {} bytes", self.total_bytes);
    }
}

/// A build-once hash table using separate chaining over a prime number of
/// buckets.
///
/// `ChainTable<V>` is the raw storage behind [`FrozenMap`] and [`FrozenSet`].
/// Like a raw hash table, it does not know how to hash or compare its values:
/// construction takes a hasher and an equality predicate, and lookups take a
/// hash plus a predicate.
///
/// Entries live in a dense array in the order they were first seen. Each
/// bucket stores the index of the most recent entry that hashed to it, and
/// each entry stores the index of the entry inserted into the same bucket
/// before it. There is no way to insert or remove after construction.
///
/// [`FrozenMap`]: crate::FrozenMap
/// [`FrozenSet`]: crate::FrozenSet
///
/// ## Example
///
/// ```rust
/// # use core::hash::Hash;
/// # use core::hash::Hasher;
/// #
/// # use frozen_chain::chain_table::ChainTable;
/// # use siphasher::sip::SipHasher;
/// #
/// # #[derive(Debug, PartialEq)]
/// # struct Person {
/// #     id: u64,
/// #     name: &'static str,
/// # }
/// #
/// # fn hash_id(id: u64) -> u64 {
/// #     let mut hasher = SipHasher::new();
/// #     id.hash(&mut hasher);
/// #     hasher.finish()
/// # }
///
/// let people = [
///     Person { id: 1, name: "Alice" },
///     Person { id: 2, name: "Bob" },
///     Person { id: 1, name: "Impostor" },
/// ];
///
/// let table = ChainTable::build(people, |p| hash_id(p.id), |a, b| a.id == b.id);
/// assert_eq!(table.len(), 2);
///
/// let index = table.find(hash_id(1), |p| p.id == 1).unwrap();
/// assert_eq!(table.get(index).map(|p| p.name), Some("Alice"));
/// ```
#[derive(Clone)]
pub struct ChainTable<V> {
    buckets: Box<[usize]>,
    entries: Vec<Slot<V>>,
}

impl<V> Debug for ChainTable<V> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        use alloc::format;
        use alloc::string::String;

        let chains = self
            .buckets
            .iter()
            .enumerate()
            .filter(|(_, head)| **head != EMPTY)
            .map(|(bucket, &head)| {
                let mut line = format!("{bucket:>4}:");
                let mut index = head;
                while index != EMPTY {
                    let slot = &self.entries[index];
                    line.push_str(&format!(" {index}#{:08x}", slot.hash_code));
                    index = slot.next;
                }
                line
            })
            .collect::<Vec<String>>();

        f.debug_struct("ChainTable")
            .field("len", &self.entries.len())
            .field("capacity", &self.buckets.len())
            .field("chains", &chains)
            .finish()
    }
}

impl<V> Default for ChainTable<V> {
    fn default() -> Self {
        Self::with_capacity(0)
    }
}

impl<V> ChainTable<V> {
    fn with_capacity(requested: usize) -> Self {
        let capacity = next_capacity(requested);
        Self {
            buckets: vec![EMPTY; capacity].into_boxed_slice(),
            entries: Vec::with_capacity(capacity),
        }
    }

    /// Builds a table from `values`, keeping the first of any values that
    /// `eq` considers equal.
    ///
    /// `hasher` must agree with `eq`: equal values must hash identically.
    /// Only the low 31 bits of each hash are used.
    ///
    /// The bucket count is [`next_capacity`] of the number of input values.
    /// When the iterator's size hint is not exact, the input is collected
    /// once to count it. Later duplicates are dropped in place.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use frozen_chain::chain_table::ChainTable;
    /// use frozen_chain::next_capacity;
    ///
    /// let table = ChainTable::build(
    ///     [("a", 1), ("b", 2), ("a", 99)],
    ///     |(k, _)| k.len() as u64,
    ///     |(a, _), (b, _)| a == b,
    /// );
    /// assert_eq!(table.len(), 2);
    /// assert_eq!(table.capacity(), next_capacity(3));
    /// assert_eq!(table.iter().collect::<Vec<_>>(), [&("a", 1), &("b", 2)]);
    /// ```
    pub fn build<I, H, E>(values: I, hasher: H, eq: E) -> Self
    where
        I: IntoIterator<Item = V>,
        H: Fn(&V) -> u64,
        E: Fn(&V, &V) -> bool,
    {
        let values = values.into_iter();
        match values.size_hint() {
            (lower, Some(upper)) if lower == upper => {
                Self::build_counted(values, lower, &hasher, &eq)
            }
            _ => {
                let values = values.collect::<Vec<V>>();
                let len = values.len();
                Self::build_counted(values.into_iter(), len, &hasher, &eq)
            }
        }
    }

    fn build_counted(
        values: impl Iterator<Item = V>,
        len: usize,
        hasher: &impl Fn(&V) -> u64,
        eq: &impl Fn(&V, &V) -> bool,
    ) -> Self {
        let mut table = Self::with_capacity(len);

        for value in values {
            let hash_code = hash_code(hasher(&value));
            let bucket = table.bucket_index(hash_code);

            if table
                .chain_position(bucket, hash_code, |stored| eq(stored, &value))
                .is_some()
            {
                continue;
            }

            let index = table.entries.len();
            table.entries.push(Slot {
                hash_code,
                next: table.buckets[bucket],
                value,
            });
            table.buckets[bucket] = index;
        }

        table
    }

    #[inline(always)]
    fn bucket_index(&self, hash_code: u32) -> usize {
        hash_code as usize % self.buckets.len()
    }

    #[inline]
    fn chain_position(
        &self,
        bucket: usize,
        hash_code: u32,
        eq: impl Fn(&V) -> bool,
    ) -> Option<usize> {
        let mut index = self.buckets[bucket];
        while index != EMPTY {
            let slot = &self.entries[index];
            if slot.hash_code == hash_code && eq(&slot.value) {
                return Some(index);
            }
            index = slot.next;
        }

        None
    }

    /// Finds the entry index of the value matching `hash` and `eq`.
    ///
    /// Returns `None` when no live entry matches. `eq` is only called for
    /// entries whose stored hash code matches `hash`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use frozen_chain::chain_table::ChainTable;
    ///
    /// let table = ChainTable::build([10u64, 20, 30], |&v| v, |a, b| a == b);
    /// assert_eq!(table.find(20, |&v| v == 20), Some(1));
    /// assert_eq!(table.find(40, |&v| v == 40), None);
    /// ```
    #[inline]
    pub fn find(&self, hash: u64, eq: impl Fn(&V) -> bool) -> Option<usize> {
        if self.entries.is_empty() {
            return None;
        }

        let hash_code = hash_code(hash);
        self.chain_position(self.bucket_index(hash_code), hash_code, eq)
    }

    /// Finds the value matching `hash` and `eq`.
    #[inline]
    pub fn find_value(&self, hash: u64, eq: impl Fn(&V) -> bool) -> Option<&V> {
        self.find(hash, eq).map(|index| &self.entries[index].value)
    }

    /// Returns the live value at entry `index`, or `None` if `index` is not
    /// below [`len`](Self::len).
    #[inline]
    pub fn get(&self, index: usize) -> Option<&V> {
        self.entries.get(index).map(|slot| &slot.value)
    }

    /// Returns the live value at entry `index`.
    ///
    /// Callers hold indices produced by this table, so an out-of-range index
    /// is a bug and panics.
    #[inline]
    pub(crate) fn value_at(&self, index: usize) -> &V {
        &self.entries[index].value
    }

    /// Returns the number of live entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the table has no live entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the number of buckets, which is also the number of entry slots
    /// reserved at construction.
    pub fn capacity(&self) -> usize {
        self.buckets.len()
    }

    /// Returns an iterator over the live values in the order they were first
    /// seen during construction.
    pub fn iter(&self) -> Iter<'_, V> {
        Iter {
            inner: self.entries.iter(),
        }
    }

    /// Returns the live entry indices stably sorted by `compare`.
    ///
    /// Values that compare equal keep their construction order. A panic in
    /// `compare` propagates unchanged.
    pub fn sorted_indices<F>(&self, mut compare: F) -> Box<[usize]>
    where
        F: FnMut(&V, &V) -> Ordering,
    {
        let mut order = (0..self.entries.len()).collect::<Vec<usize>>();
        order.sort_by(|&a, &b| compare(&self.entries[a].value, &self.entries[b].value));
        order.into_boxed_slice()
    }

    #[cfg(any(test, feature = "stats"))]
    fn chain_length(&self, bucket: usize) -> usize {
        let mut length = 0;
        let mut index = self.buckets[bucket];
        while index != EMPTY {
            length += 1;
            index = self.entries[index].next;
        }
        length
    }

    /// Computes a histogram of chain lengths.
    ///
    /// Element `n` of the result is the number of buckets whose chain holds
    /// exactly `n` entries, so element 0 counts empty buckets. The vector is
    /// as long as the longest chain plus one.
    #[cfg(feature = "stats")]
    pub fn chain_histogram(&self) -> Vec<usize> {
        let mut hist = vec![0usize; 1];
        for bucket in 0..self.buckets.len() {
            let length = self.chain_length(bucket);
            if length >= hist.len() {
                hist.resize(length + 1, 0);
            }
            hist[length] += 1;
        }
        hist
    }

    /// Returns chain-length and memory statistics for the table.
    #[cfg(feature = "stats")]
    pub fn stats(&self) -> TableStats {
        let hist = self.chain_histogram();
        let used_buckets = self.buckets.len() - hist[0];

        TableStats {
            len: self.entries.len(),
            capacity: self.buckets.len(),
            used_buckets,
            longest_chain: hist.len() - 1,
            average_chain_length: if used_buckets == 0 {
                0.0
            } else {
                self.entries.len() as f64 / used_buckets as f64
            },
            load_factor: self.entries.len() as f64 / self.buckets.len() as f64,
            total_bytes: self.buckets.len() * core::mem::size_of::<usize>()
                + self.entries.capacity() * core::mem::size_of::<Slot<V>>(),
        }
    }

    /// Pretty-prints the chain-length histogram horizontally using stdout.
    #[cfg(all(feature = "stats", feature = "std"))]
    pub fn print_chain_histogram(&self) {
        let hist = self.chain_histogram();
        let max = hist.iter().copied().max().unwrap_or(0);
        println!("chain histogram ({} entries):", self.entries.len());
        if max == 0 {
            println!("  empty");
            return;
        }

        let max_bar = 60usize;
        for (length, &count) in hist.iter().enumerate() {
            let width = (count * max_bar).div_ceil(max);
            println!("{:>3} | {} ({})", length, "█".repeat(width), count);
        }
    }
}

impl<V> IntoIterator for ChainTable<V> {
    type Item = V;
    type IntoIter = IntoIter<V>;

    fn into_iter(self) -> Self::IntoIter {
        IntoIter {
            inner: self.entries.into_iter(),
        }
    }
}

impl<'a, V> IntoIterator for &'a ChainTable<V> {
    type Item = &'a V;
    type IntoIter = Iter<'a, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// An iterator over the live values of a [`ChainTable`], in construction
/// order.
///
/// Each call to [`ChainTable::iter`] starts an independent cursor at the
/// first entry.
pub struct Iter<'a, V> {
    inner: core::slice::Iter<'a, Slot<V>>,
}

impl<V> Clone for Iter<'_, V> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<'a, V> Iterator for Iter<'a, V> {
    type Item = &'a V;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|slot| &slot.value)
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<V> DoubleEndedIterator for Iter<'_, V> {
    #[inline]
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.next_back().map(|slot| &slot.value)
    }
}

impl<V> ExactSizeIterator for Iter<'_, V> {}

impl<V> FusedIterator for Iter<'_, V> {}

/// An owning iterator over the live values of a [`ChainTable`], in
/// construction order.
pub struct IntoIter<V> {
    inner: vec::IntoIter<Slot<V>>,
}

impl<V> Iterator for IntoIter<V> {
    type Item = V;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|slot| slot.value)
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<V> DoubleEndedIterator for IntoIter<V> {
    #[inline]
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.next_back().map(|slot| slot.value)
    }
}

impl<V> ExactSizeIterator for IntoIter<V> {}

impl<V> FusedIterator for IntoIter<V> {}

#[cfg(test)]
mod tests {
    use alloc::string::String;
    use alloc::string::ToString;
    use alloc::vec;
    use core::hash::Hasher;

    use rand::TryRngCore;
    use rand::rngs::OsRng;
    use siphasher::sip::SipHasher;

    use super::*;

    struct HashState {
        k0: u64,
        k1: u64,
    }

    impl HashState {
        fn default() -> Self {
            let mut rng = OsRng;
            Self {
                k0: rng.try_next_u64().unwrap(),
                k1: rng.try_next_u64().unwrap(),
            }
        }

        fn build_hasher(&self) -> SipHasher {
            SipHasher::new_with_keys(self.k0, self.k1)
        }
    }

    #[derive(Debug, PartialEq, Eq, Clone)]
    struct Item {
        key: u64,
        value: i32,
    }

    fn hash_key(state: &HashState, key: u64) -> u64 {
        let mut h = state.build_hasher();
        h.write_u64(key);
        h.finish()
    }

    fn build_items(state: &HashState, items: Vec<Item>) -> ChainTable<Item> {
        ChainTable::build(items, |v| hash_key(state, v.key), |a, b| a.key == b.key)
    }

    /// Every live entry must be reachable exactly once from the bucket its
    /// hash code selects, and no chain may reach a non-live index.
    fn assert_chains_consistent<V>(table: &ChainTable<V>) {
        let mut seen = vec![0usize; table.entries.len()];
        for (bucket, &head) in table.buckets.iter().enumerate() {
            let mut index = head;
            while index != EMPTY {
                assert!(index < table.entries.len(), "chain reached index {index}");
                let slot = &table.entries[index];
                assert_eq!(table.bucket_index(slot.hash_code), bucket);
                seen[index] += 1;
                index = slot.next;
            }
        }
        assert!(seen.iter().all(|&count| count == 1), "{seen:?}");
    }

    #[test]
    fn capacity_small_values() {
        assert_eq!(next_capacity(0), 3);
        assert_eq!(next_capacity(1), 3);
        assert_eq!(next_capacity(2), 3);
        assert_eq!(next_capacity(3), 3);
        assert_eq!(next_capacity(4), 5);
        assert_eq!(next_capacity(8), 11);
        assert_eq!(next_capacity(97), 97);
        assert_eq!(next_capacity(98), 101);
        assert_eq!(next_capacity(1000), 1009);
        assert_eq!(next_capacity(1_000_000), 1_000_003);
    }

    #[test]
    fn capacity_is_smallest_prime() {
        for requested in 0..5000usize {
            let capacity = next_capacity(requested);
            assert!(capacity >= requested.max(MIN_CAPACITY));
            assert!(is_prime(capacity), "{capacity} is not prime");
            for smaller in requested.max(MIN_CAPACITY)..capacity {
                assert!(!is_prime(smaller), "{smaller} skipped for {requested}");
            }
        }
    }

    #[test]
    fn primality() {
        let primes = [2usize, 3, 5, 7, 101, 7919, 104_729];
        let composites = [0usize, 1, 4, 9, 91, 7917, 104_730, 999_999];
        assert!(primes.iter().all(|&p| is_prime(p)));
        assert!(composites.iter().all(|&c| !is_prime(c)));
    }

    #[test]
    fn build_and_find() {
        let state = HashState::default();
        let items = (0..64u64)
            .map(|k| Item {
                key: k,
                value: k as i32 * 2,
            })
            .collect::<Vec<_>>();
        let table = build_items(&state, items);

        assert_eq!(table.len(), 64);
        assert_eq!(table.capacity(), next_capacity(64));
        assert_chains_consistent(&table);

        for k in 0..64u64 {
            let index = table
                .find(hash_key(&state, k), |v| v.key == k)
                .unwrap_or_else(|| panic!("missing {k}: {table:#?}"));
            assert_eq!(index, k as usize);
            assert_eq!(table.get(index).map(|v| v.value), Some(k as i32 * 2));
        }

        let miss_hash = hash_key(&state, 999);
        assert!(table.find(miss_hash, |v| v.key == 999).is_none());
    }

    #[test]
    fn duplicates_keep_first() {
        let state = HashState::default();
        let items = vec![
            Item { key: 1, value: 10 },
            Item { key: 2, value: 20 },
            Item { key: 1, value: 99 },
            Item { key: 3, value: 30 },
            Item { key: 2, value: 98 },
        ];
        let table = build_items(&state, items);

        assert_eq!(table.len(), 3);
        assert_eq!(
            table.find_value(hash_key(&state, 1), |v| v.key == 1),
            Some(&Item { key: 1, value: 10 })
        );
        assert_eq!(
            table.find_value(hash_key(&state, 2), |v| v.key == 2),
            Some(&Item { key: 2, value: 20 })
        );
        assert_eq!(
            table.iter().map(|v| v.key).collect::<Vec<_>>(),
            vec![1, 2, 3]
        );
        assert_chains_consistent(&table);
    }

    #[test]
    fn empty_table() {
        let table: ChainTable<Item> = ChainTable::build(Vec::new(), |_| 0, |_, _| true);
        assert!(table.is_empty());
        assert_eq!(table.len(), 0);
        assert_eq!(table.capacity(), MIN_CAPACITY);
        assert_eq!(table.find(0, |_| true), None);
        assert_eq!(table.get(0), None);
        assert_eq!(table.iter().count(), 0);

        let default: ChainTable<Item> = ChainTable::default();
        assert!(default.is_empty());
        assert_eq!(default.capacity(), MIN_CAPACITY);
    }

    #[test]
    fn all_keys_collide() {
        let items = (0..200u64)
            .map(|k| Item {
                key: k,
                value: k as i32,
            })
            .collect::<Vec<_>>();
        let table = ChainTable::build(items, |_| 0, |a: &Item, b: &Item| a.key == b.key);

        assert_eq!(table.len(), 200);
        assert_eq!(table.chain_length(0), 200);
        assert_chains_consistent(&table);

        for k in 0..200u64 {
            assert_eq!(
                table.find(0, |v| v.key == k),
                Some(k as usize),
                "collided key {k}"
            );
        }
        assert_eq!(table.find(0, |v| v.key == 200), None);
    }

    #[test]
    fn only_upper_bits_differ() {
        // Hashes that differ only above bit 31 share a hash code.
        let table = ChainTable::build(
            [1u64, 1 << 40, 1 << 50],
            |&v| v | 7,
            |a: &u64, b: &u64| a == b,
        );
        assert_eq!(table.len(), 3);
        assert_chains_consistent(&table);
        assert_eq!(table.find(7 | (1 << 40), |&v| v == 1 << 40), Some(1));
        assert_eq!(table.find(7, |&v| v == 1 << 50), Some(2));
    }

    #[test]
    fn inexact_size_hint_is_counted() {
        let state = HashState::default();
        let items = (0..100u64)
            .filter(|k| k % 3 == 0)
            .map(|k| Item { key: k, value: 0 });
        let table = ChainTable::build(items, |v| hash_key(&state, v.key), |a, b| a.key == b.key);

        assert_eq!(table.len(), 34);
        assert_eq!(table.capacity(), next_capacity(34));
    }

    #[test]
    fn capacity_sized_from_input_count() {
        let table = ChainTable::build(
            vec![5u64, 5, 5, 5, 5, 5, 5, 5],
            |&v| v,
            |a: &u64, b: &u64| a == b,
        );
        assert_eq!(table.len(), 1);
        assert_eq!(table.capacity(), next_capacity(8));
    }

    #[test]
    fn iteration_order_and_independence() {
        let state = HashState::default();
        let keys = [42u64, 7, 19, 7, 3, 42, 100];
        let items = keys
            .iter()
            .enumerate()
            .map(|(i, &k)| Item {
                key: k,
                value: i as i32,
            })
            .collect::<Vec<_>>();
        let table = build_items(&state, items);

        let order = table.iter().map(|v| v.key).collect::<Vec<_>>();
        assert_eq!(order, vec![42, 7, 19, 3, 100]);

        let mut first = table.iter();
        let mut second = table.iter();
        assert_eq!(first.next().map(|v| v.key), Some(42));
        assert_eq!(first.next().map(|v| v.key), Some(7));
        assert_eq!(second.next().map(|v| v.key), Some(42));
        assert_eq!(first.len(), 3);
        assert_eq!(second.len(), 4);

        let reversed = table.iter().rev().map(|v| v.key).collect::<Vec<_>>();
        assert_eq!(reversed, vec![100, 3, 19, 7, 42]);

        let owned = table.into_iter().map(|v| v.value).collect::<Vec<_>>();
        assert_eq!(owned, vec![0, 1, 2, 4, 6]);
    }

    #[test]
    fn sorted_indices_are_stable() {
        let table = ChainTable::build(
            [
                ("pear".to_string(), 1),
                ("fig".to_string(), 2),
                ("apple".to_string(), 3),
                ("kiwi".to_string(), 4),
            ],
            |(k, _): &(String, i32)| k.len() as u64,
            |(a, _), (b, _)| a == b,
        );

        let by_name = table.sorted_indices(|(a, _), (b, _)| a.cmp(b));
        assert_eq!(&*by_name, &[2, 1, 3, 0]);

        // "pear" and "kiwi" share a length; construction order breaks the tie.
        let by_len = table.sorted_indices(|(a, _), (b, _)| a.len().cmp(&b.len()));
        assert_eq!(&*by_len, &[1, 0, 3, 2]);

        let empty: ChainTable<u8> = ChainTable::default();
        assert!(empty.sorted_indices(|a, b| a.cmp(b)).is_empty());
    }

    #[test]
    fn clone_is_independent_copy() {
        let state = HashState::default();
        let table = build_items(
            &state,
            (0..10u64).map(|k| Item { key: k, value: 1 }).collect(),
        );
        let cloned = table.clone();
        drop(table);

        assert_eq!(cloned.len(), 10);
        for k in 0..10u64 {
            assert!(cloned.find(hash_key(&state, k), |v| v.key == k).is_some());
        }
    }

    #[test]
    fn debug_lists_chains() {
        let table = ChainTable::build([1u64, 4], |&v| v, |a: &u64, b: &u64| a == b);
        let rendered = alloc::format!("{table:?}");
        assert!(rendered.contains("len: 2"), "{rendered}");
        assert!(rendered.contains("capacity: 3"), "{rendered}");
        // 1 and 4 share bucket 1; the later entry heads the chain.
        assert!(rendered.contains("1: 1#00000004 0#00000001"), "{rendered}");
    }

    #[cfg(feature = "stats")]
    #[test]
    fn stats_report_chains() {
        let table = ChainTable::build(0..10u64, |_| 3, |a: &u64, b: &u64| a == b);
        let stats = table.stats();
        assert_eq!(stats.len, 10);
        assert_eq!(stats.capacity, 11);
        assert_eq!(stats.used_buckets, 1);
        assert_eq!(stats.longest_chain, 10);
        assert_eq!(stats.average_chain_length, 10.0);

        let hist = table.chain_histogram();
        assert_eq!(hist.len(), 11);
        assert_eq!(hist[0], 10);
        assert_eq!(hist[10], 1);
    }

    #[cfg(feature = "stats")]
    #[test]
    fn stats_for_empty_table() {
        let table: ChainTable<u64> = ChainTable::default();
        let stats = table.stats();
        assert_eq!(stats.used_buckets, 0);
        assert_eq!(stats.longest_chain, 0);
        assert_eq!(stats.average_chain_length, 0.0);
        assert_eq!(table.chain_histogram(), vec![3]);
    }

    #[test]
    #[cfg_attr(miri, ignore)]
    #[cfg(all(feature = "stats", feature = "std"))]
    fn histogram_output() {
        let state = HashState::default();
        let table = build_items(
            &state,
            (0..10_000u64)
                .map(|k| Item {
                    key: k,
                    value: k as i32,
                })
                .collect(),
        );

        table.print_chain_histogram();
        table.stats().print();
    }
}
