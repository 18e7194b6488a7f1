use core::cmp::Ordering;

/// The rule a sorted frozen map uses to order its keys.
///
/// The rule is applied once, when the map is built, to derive the ordered key
/// sequence. It is kept alongside the map afterwards so that
/// [`rank`](crate::FrozenMap::rank) can search the ordered keys. Lookups by
/// key never consult it.
///
/// Any `Fn(&K, &K) -> Ordering` closure is an ordering rule.
pub trait KeyOrder<K: ?Sized> {
    /// Compares two keys.
    fn compare(&self, a: &K, b: &K) -> Ordering;
}

impl<K, F> KeyOrder<K> for F
where
    K: ?Sized,
    F: Fn(&K, &K) -> Ordering,
{
    #[inline]
    fn compare(&self, a: &K, b: &K) -> Ordering {
        self(a, b)
    }
}

/// Orders keys by their [`Ord`] implementation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct NaturalOrder;

impl<K> KeyOrder<K> for NaturalOrder
where
    K: Ord + ?Sized,
{
    #[inline]
    fn compare(&self, a: &K, b: &K) -> Ordering {
        a.cmp(b)
    }
}
