use core::num::NonZero;

use super::handle::{Handle, RawHandle};

/// Number of nodes in the subtree rooted at a node, the node itself included.
///
/// A subtree is never empty, so the count is stored as a non-zero integer of the
/// same width as a [`Handle`]. Empty links count as zero and are handled by the
/// tree, not by this type.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[repr(transparent)]
pub(crate) struct Size(NonZero<RawHandle>);

impl Size {
    // The arena never holds more than `Handle::MAX` nodes.
    pub(crate) const MAX: usize = Handle::MAX;
    pub(crate) const ONE: Self = Self::from_usize(1);

    #[inline]
    pub(crate) const fn from_usize(size: usize) -> Self {
        assert!(size != 0 && size <= Self::MAX, "`Size::from_usize()` - `size` outside `1..=Size::MAX`!");
        #[allow(clippy::cast_possible_truncation)]
        Self(NonZero::new(size as RawHandle).unwrap())
    }

    /// The size of a node whose children hold `left` and `right` nodes.
    #[inline]
    pub(crate) const fn of_children(left: usize, right: usize) -> Self {
        Self::from_usize(1 + left + right)
    }

    #[inline]
    pub(crate) const fn to_usize(self) -> usize {
        self.0.get() as usize
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use static_assertions::assert_eq_size;

    assert_eq_size!(Size, Option<Size>);
    assert_eq_size!(Size, Handle);

    #[test]
    #[should_panic(expected = "`Size::from_usize()` - `size` outside `1..=Size::MAX`!")]
    fn zero_size_is_rejected() {
        let _ = Size::from_usize(0);
    }

    #[test]
    #[should_panic(expected = "`Size::from_usize()` - `size` outside `1..=Size::MAX`!")]
    fn size_past_max_is_rejected() {
        let _ = Size::from_usize(Size::MAX + 1);
    }

    #[test]
    fn leaf_has_size_one() {
        assert_eq!(Size::of_children(0, 0), Size::ONE);
        assert_eq!(Size::of_children(3, 4).to_usize(), 8);
    }

    proptest! {
        #[test]
        fn size_survives_storage(size in 1..=Size::MAX) {
            prop_assert_eq!(Size::from_usize(size).to_usize(), size);
        }
    }
}
