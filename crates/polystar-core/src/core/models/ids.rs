use std::fmt;
use std::num::NonZeroU32;

macro_rules! sequential_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(NonZeroU32);

        impl $name {
            /// Wraps a raw 1-based identifier. Returns `None` for zero.
            pub fn new(raw: u32) -> Option<Self> {
                NonZeroU32::new(raw).map(Self)
            }

            /// Builds the identifier for the element stored at `index` in a 0-based vector.
            pub(crate) fn from_index(index: usize) -> Self {
                let raw = u32::try_from(index + 1).unwrap_or(u32::MAX);
                Self(NonZeroU32::new(raw).unwrap_or(NonZeroU32::MAX))
            }

            pub fn get(self) -> u32 {
                self.0.get()
            }

            /// Position of the element in its 0-based backing vector.
            pub fn index(self) -> usize {
                (self.0.get() - 1) as usize
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

sequential_id!(
    /// Identifier of an atom (bead). Ids start at 1 and follow creation order.
    AtomId
);
sequential_id!(
    /// Identifier of a bond. Ids start at 1 and follow creation order.
    BondId
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_is_not_a_valid_id() {
        assert!(AtomId::new(0).is_none());
        assert!(BondId::new(0).is_none());
    }

    #[test]
    fn index_and_raw_value_are_offset_by_one() {
        let id = AtomId::from_index(0);
        assert_eq!(id.get(), 1);
        assert_eq!(id.index(), 0);

        let id = BondId::new(42).unwrap();
        assert_eq!(id.index(), 41);
        assert_eq!(BondId::from_index(41), id);
    }

    #[test]
    fn ids_order_by_raw_value() {
        let a = AtomId::new(3).unwrap();
        let b = AtomId::new(10).unwrap();
        assert!(a < b);
        assert_eq!(a.to_string(), "3");
    }
}
