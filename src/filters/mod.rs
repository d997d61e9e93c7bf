//! Batch predicates over alert columns.
//!
//! Each predicate evaluates its conditions column by column and combines the
//! resulting masks, so output position `i` always corresponds to input row `i`.

pub mod kilonova;
pub mod supernova;
pub mod xmatch;

/// Element-wise AND of `mask` with `other`, in place.
pub(crate) fn and_assign(mask: &mut [bool], other: &[bool]) {
    for (lhs, rhs) in mask.iter_mut().zip(other) {
        *lhs &= *rhs;
    }
}

/// Element-wise OR of two aligned masks.
pub(crate) fn or(lhs: &[bool], rhs: &[bool]) -> Vec<bool> {
    lhs.iter().zip(rhs).map(|(a, b)| *a || *b).collect()
}
