use core::fmt;

/// The error returned when a value is requested by key and the key has no
/// live entry.
///
/// This is only produced by value-by-key accessors such as
/// [`FrozenMap::try_get`]. Lookups that return an `Option` treat a missing
/// key as an ordinary outcome.
///
/// [`FrozenMap::try_get`]: crate::FrozenMap::try_get
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct KeyNotFound;

impl fmt::Display for KeyNotFound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("the given key was not present in the map")
    }
}

impl core::error::Error for KeyNotFound {}

#[cfg(test)]
mod tests {
    use alloc::string::ToString;

    use super::*;

    #[test]
    fn display_message() {
        assert_eq!(
            KeyNotFound.to_string(),
            "the given key was not present in the map"
        );
    }

    #[test]
    fn usable_as_dyn_error() {
        let err: &dyn core::error::Error = &KeyNotFound;
        assert!(err.source().is_none());
    }
}
