use crate::hash;

const SEED_SIZE: usize = 32;
const ROUND_SIZE: usize = 1;
const POSITION_WINDOW_SIZE: usize = 4;
const PIVOT_VIEW_SIZE: usize = SEED_SIZE + ROUND_SIZE;
const TOTAL_SIZE: usize = SEED_SIZE + ROUND_SIZE + POSITION_WINDOW_SIZE;

/// Maps `index` to its position in a swap-or-not shuffle of `0..index_count`.
///
/// Returns `None` when `index_count == 0`, `index >= index_count`, or the list is larger
/// than `2**24`.
pub fn compute_shuffled_index(
    index: u64,
    index_count: u64,
    seed: &[u8; 32],
    shuffle_round_count: u8,
) -> Option<u64> {
    if index_count == 0 || index >= index_count || index_count > 1 << 24 {
        return None;
    }

    let mut buf = [0u8; TOTAL_SIZE];
    buf[..SEED_SIZE].copy_from_slice(seed);

    let mut index = index;
    for round in 0..shuffle_round_count {
        buf[SEED_SIZE] = round;

        let pivot_hash = hash(&buf[..PIVOT_VIEW_SIZE]);
        let mut pivot_bytes = [0u8; 8];
        pivot_bytes.copy_from_slice(&pivot_hash[..8]);
        let pivot = u64::from_le_bytes(pivot_bytes) % index_count;

        let flip = (pivot + index_count - index) % index_count;
        let position = index.max(flip);

        buf[PIVOT_VIEW_SIZE..].copy_from_slice(&((position / 256) as u32).to_le_bytes());
        let source = hash(&buf);
        let byte = source[((position % 256) / 8) as usize];
        let bit = (byte >> (position % 8)) & 1;

        if bit == 1 {
            index = flip;
        }
    }

    Some(index)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::collections::BTreeSet;

    #[rstest]
    #[case::empty(0, 0)]
    #[case::out_of_range(5, 5)]
    #[case::too_large(0, (1 << 24) + 1)]
    fn test_invalid_inputs(#[case] index: u64, #[case] count: u64) {
        assert_eq!(compute_shuffled_index(index, count, &[0; 32], 10), None);
    }

    #[test]
    fn test_no_rounds_is_identity() {
        for index in 0..10 {
            assert_eq!(compute_shuffled_index(index, 10, &[9; 32], 0), Some(index));
        }
    }

    #[rstest]
    #[case(1, 10)]
    #[case(7, 10)]
    #[case(100, 90)]
    #[case(257, 90)]
    fn test_is_a_permutation(#[case] count: u64, #[case] rounds: u8) {
        let seed = hash(&count.to_le_bytes());
        let shuffled: BTreeSet<u64> = (0..count)
            .map(|index| compute_shuffled_index(index, count, &seed, rounds).unwrap())
            .collect();
        assert_eq!(shuffled, (0..count).collect());
    }

    #[test]
    fn test_seed_changes_order() {
        let a: Vec<u64> = (0..64)
            .map(|index| compute_shuffled_index(index, 64, &[1; 32], 10).unwrap())
            .collect();
        let b: Vec<u64> = (0..64)
            .map(|index| compute_shuffled_index(index, 64, &[2; 32], 10).unwrap())
            .collect();
        assert_ne!(a, b);
    }
}
