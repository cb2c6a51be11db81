//! Tag layout: one nibble per tree level, anchored by a leading 1 bit.
//!
//! A tag is the root marker followed by one 4-bit slot per ancestor edge:
//!
//! ```text
//! ┌──────┬──────────┬──────────┬─────┬──────────┐
//! │ Root │ Level 1  │ Level 2  │ ... │ Level d  │
//! │ 1    │ idx+1    │ idx+1    │     │ idx+1    │
//! │ 1bit │ 4 bits   │ 4 bits   │     │ 4 bits   │
//! └──────┴──────────┴──────────┴─────┴──────────┘
//! ```
//!
//! A slot value of 0 never occurs, so a tag at depth `d` always has bit
//! length `4d + 1` and the depth can be read straight from the tag.

use crate::Tag;

/// Width of the tag integer.
pub const TAG_BITS: u32 = Tag::BITS;

/// Bits consumed by each tree level.
pub const LEVEL_BITS: u32 = 4;

/// Mask selecting the lowest level slot.
pub const LEVEL_MASK: Tag = (1 << LEVEL_BITS) - 1;

/// Maximum number of direct children per class (slot values 1..=15).
pub const MAX_CHILDREN: usize = LEVEL_MASK as usize;

/// Maximum depth below the root that still fits in `TAG_BITS`.
pub const MAX_DEPTH: u8 = ((TAG_BITS - 1) / LEVEL_BITS) as u8;

/// The fixed tag of the hierarchy root.
pub const ROOT_TAG: Tag = 1;

const _: () = {
    assert!(
        1 + MAX_DEPTH as u32 * LEVEL_BITS <= TAG_BITS,
        "MAX_DEPTH levels must fit in TAG_BITS"
    );
};

/// Tag of the child at zero-based `index` under `parent`.
///
/// The caller is responsible for `index < MAX_CHILDREN` and for `parent`
/// not already sitting at `MAX_DEPTH`.
#[inline]
pub const fn child_tag(parent: Tag, index: usize) -> Tag {
    debug_assert!(index < MAX_CHILDREN, "sibling index must fit in one slot");
    (parent << LEVEL_BITS) + index as Tag + 1
}

/// Depth of a tag (0 for the root).
///
/// Returns 0 for the invalid tag 0.
#[inline]
pub const fn depth_of(tag: Tag) -> u8 {
    if tag == 0 {
        return 0;
    }
    ((TAG_BITS - 1 - tag.leading_zeros()) / LEVEL_BITS) as u8
}

/// Tag of the direct parent, or `None` for the root.
#[inline]
pub const fn parent_of(tag: Tag) -> Option<Tag> {
    if depth_of(tag) == 0 {
        return None;
    }
    Some(tag >> LEVEL_BITS)
}

/// Zero-based position of this tag among its siblings.
#[inline]
pub const fn sibling_index(tag: Tag) -> Option<u8> {
    if depth_of(tag) == 0 {
        return None;
    }
    Some(((tag - 1) & LEVEL_MASK) as u8)
}

/// O(1) subclass test: is `candidate` the same class as, or derived from, `ancestor`?
///
/// ```text
/// is_descendant_of(BALL, DYNAMICSHAPE) → true
/// is_descendant_of(LINE, DYNAMICSHAPE) → false
/// ```
#[inline]
pub const fn is_descendant_of(candidate: Tag, ancestor: Tag) -> bool {
    if candidate == 0 || ancestor == 0 {
        return false;
    }
    let dc = depth_of(candidate);
    let da = depth_of(ancestor);
    if dc < da {
        return false;
    }
    (candidate >> ((dc - da) as u32 * LEVEL_BITS)) == ancestor
}

/// Whether `tag` could have been produced by the assigner.
pub const fn is_valid_tag(tag: Tag) -> bool {
    if tag == 0 {
        return false;
    }
    let mut rest = tag;
    while rest > ROOT_TAG {
        if rest & LEVEL_MASK == 0 {
            return false;
        }
        rest >>= LEVEL_BITS;
    }
    rest == ROOT_TAG
}
