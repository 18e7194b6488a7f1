use core::fmt::Debug;
use core::hash::BuildHasher;
use core::hash::Hash;

cfg_if::cfg_if! {
    if #[cfg(feature = "foldhash")] {
        /// The hasher builder used when no equality rule is supplied.
        pub type DefaultHashBuilder = foldhash::fast::RandomState;
    } else if #[cfg(feature = "std")] {
        /// The hasher builder used when no equality rule is supplied.
        pub type DefaultHashBuilder = std::hash::RandomState;
    } else {
        /// Placeholder for the default hasher builder when neither `std` nor
        /// `foldhash` is enabled. It cannot be constructed, so an equality
        /// rule must always be supplied explicitly.
        #[derive(Debug, Clone, Copy)]
        pub enum DefaultHashBuilder {}
    }
}

/// The rule a frozen table uses to hash and compare keys.
///
/// Implementations must be consistent: two keys for which
/// [`keys_equal`](KeyEquality::keys_equal) returns `true` must produce the
/// same [`hash_key`](KeyEquality::hash_key). The table only compares keys
/// whose stored 31-bit hash codes match, so an inconsistent rule makes equal
/// keys invisible to each other rather than causing memory unsafety.
///
/// Every [`BuildHasher`] is an equality rule for `Hash + Eq` keys, using
/// `==` for comparison. Use [`EqualityFn`] for ad-hoc rules such as
/// case-insensitive strings.
pub trait KeyEquality<K: ?Sized> {
    /// Hashes `key`. Only the low 31 bits are retained by the table.
    fn hash_key(&self, key: &K) -> u64;

    /// Returns `true` if `a` and `b` are the same key under this rule.
    fn keys_equal(&self, a: &K, b: &K) -> bool;
}

impl<K, S> KeyEquality<K> for S
where
    K: Hash + Eq + ?Sized,
    S: BuildHasher,
{
    #[inline]
    fn hash_key(&self, key: &K) -> u64 {
        self.hash_one(key)
    }

    #[inline]
    fn keys_equal(&self, a: &K, b: &K) -> bool {
        a == b
    }
}

/// An equality rule assembled from a hash closure and a comparison closure.
///
/// # Examples
///
/// ```rust
/// use frozen_chain::EqualityFn;
/// use frozen_chain::FrozenMap;
///
/// let case_insensitive = EqualityFn::new(
///     |k: &&str| {
///         k.bytes()
///             .fold(0u64, |h, b| h.wrapping_mul(31) ^ b.to_ascii_lowercase() as u64)
///     },
///     |a: &&str, b: &&str| a.eq_ignore_ascii_case(b),
/// );
///
/// let map = FrozenMap::from_iter_with_equality([("Key", 1), ("KEY", 2)], case_insensitive);
/// assert_eq!(map.len(), 1);
/// assert_eq!(map.get(&"key"), Some(&1));
/// ```
#[derive(Clone, Copy)]
pub struct EqualityFn<H, E> {
    hash: H,
    eq: E,
}

impl<H, E> EqualityFn<H, E> {
    /// Creates a rule from `hash` and `eq`. The two closures must agree: keys
    /// that compare equal must hash identically.
    pub fn new(hash: H, eq: E) -> Self {
        Self { hash, eq }
    }
}

impl<H, E> Debug for EqualityFn<H, E> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("EqualityFn").finish_non_exhaustive()
    }
}

impl<K, H, E> KeyEquality<K> for EqualityFn<H, E>
where
    K: ?Sized,
    H: Fn(&K) -> u64,
    E: Fn(&K, &K) -> bool,
{
    #[inline]
    fn hash_key(&self, key: &K) -> u64 {
        (self.hash)(key)
    }

    #[inline]
    fn keys_equal(&self, a: &K, b: &K) -> bool {
        (self.eq)(a, b)
    }
}

#[cfg(test)]
mod tests {
    use siphasher::sip::SipHasher;

    use super::*;

    #[derive(Clone, Default)]
    struct FixedSip;

    impl BuildHasher for FixedSip {
        type Hasher = SipHasher;

        fn build_hasher(&self) -> Self::Hasher {
            SipHasher::new_with_keys(1, 2)
        }
    }

    #[test]
    fn build_hasher_is_an_equality_rule() {
        let rule = FixedSip;
        assert_eq!(rule.hash_key(&42u64), rule.hash_one(42u64));
        assert!(KeyEquality::<u64>::keys_equal(&rule, &7, &7));
        assert!(!KeyEquality::<u64>::keys_equal(&rule, &7, &8));
    }

    #[test]
    fn unsized_keys_hash_like_their_owned_form() {
        let rule = FixedSip;
        let owned = alloc::string::String::from("frozen");
        assert_eq!(
            KeyEquality::<str>::hash_key(&rule, "frozen"),
            KeyEquality::<alloc::string::String>::hash_key(&rule, &owned)
        );
    }

    #[test]
    fn closure_rule_delegates() {
        let rule = EqualityFn::new(|k: &u32| (*k % 10) as u64, |a: &u32, b: &u32| a % 10 == b % 10);
        assert_eq!(rule.hash_key(&13u32), 3);
        assert!(rule.keys_equal(&13u32, &23));
        assert!(!rule.keys_equal(&13u32, &24));
    }
}
