//! Pass 3: Put entries in application order.
//!
//! An entry shifted by `offset` lands just before the native entries of
//! statement `index + offset`; unshifted entries keep declaration order.

use crate::pass2_unwind::Entry;

/// `(target, phase)`: shifted entries sort ahead of native ones at the same
/// target, which is the `index + offset - ε` rule without floats.
fn order_key(entry: &Entry) -> (i128, u8) {
    let index = entry.index as i128;
    if entry.offset == 0 {
        (index, 1)
    } else {
        (index + i128::from(entry.offset), 0)
    }
}

/// Stable sort into application order.
pub fn order(mut entries: Vec<Entry>) -> Vec<Entry> {
    entries.sort_by_key(order_key);
    entries
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pass2_unwind::FlatOp;

    fn entry(index: usize, offset: i64) -> Entry {
        Entry {
            op: FlatOp::Inert,
            index,
            offset,
        }
    }

    fn sequence(entries: Vec<Entry>) -> Vec<usize> {
        order(entries).into_iter().map(|e| e.index).collect()
    }

    #[test]
    fn unshifted_entries_keep_declaration_order() {
        assert_eq!(
            sequence(vec![entry(0, 0), entry(1, 0), entry(2, 0)]),
            vec![0, 1, 2]
        );
    }

    #[test]
    fn return_lands_just_before_its_target() {
        assert_eq!(
            sequence(vec![entry(0, 0), entry(1, 0), entry(2, 0), entry(3, -2)]),
            vec![0, 3, 1, 2]
        );
    }

    #[test]
    fn skip_lands_just_before_its_target() {
        assert_eq!(
            sequence(vec![entry(0, 2), entry(1, 0), entry(2, 0), entry(3, 0)]),
            vec![1, 0, 2, 3]
        );
    }

    #[test]
    fn shifts_to_the_same_target_keep_declaration_order() {
        assert_eq!(
            sequence(vec![entry(0, 0), entry(1, 0), entry(2, -1), entry(3, -2)]),
            vec![0, 2, 3, 1]
        );
    }

    #[test]
    fn extreme_offsets_do_not_overflow() {
        assert_eq!(
            sequence(vec![entry(0, 0), entry(1, i64::MIN), entry(2, i64::MAX)]),
            vec![1, 0, 2]
        );
    }
}
