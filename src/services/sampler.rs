use rand::seq::SliceRandom;
use rand::Rng;

/// 闪卡默认张数
pub const DEFAULT_CARD_LIMIT: usize = 20;

/// 把请求数量夹到 `[1, len]`；集合为空时为 0
pub fn capped_count(len: usize, requested: usize) -> usize {
    if len == 0 {
        return 0;
    }
    requested.clamp(1, len)
}

/// 整体洗牌后截取前 N 个，保证不重复
pub fn pick_random<T: Clone>(items: &[T], count: usize) -> Vec<T> {
    pick_random_with(items, count, &mut rand::thread_rng())
}

pub fn pick_random_with<T: Clone, R: Rng + ?Sized>(items: &[T], count: usize, rng: &mut R) -> Vec<T> {
    let take = capped_count(items.len(), count);
    if take == 0 {
        return Vec::new();
    }
    let mut copy = items.to_vec();
    copy.shuffle(rng);
    copy.truncate(take);
    copy
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashSet;

    #[test]
    fn empty_source_yields_nothing() {
        let empty: Vec<i32> = Vec::new();
        assert!(pick_random(&empty, 5).is_empty());
        assert_eq!(capped_count(0, 5), 0);
    }

    #[test]
    fn count_is_clamped() {
        assert_eq!(capped_count(10, 0), 1);
        assert_eq!(capped_count(10, 25), 10);
        assert_eq!(capped_count(10, 4), 4);
    }

    #[test]
    fn samples_are_distinct_members_of_the_source() {
        let source: Vec<i32> = (0..30).collect();
        let mut rng = StdRng::seed_from_u64(7);
        for count in 1..=35 {
            let picked = pick_random_with(&source, count, &mut rng);
            assert_eq!(picked.len(), count.min(source.len()));
            let unique: HashSet<_> = picked.iter().collect();
            assert_eq!(unique.len(), picked.len());
            assert!(picked.iter().all(|p| source.contains(p)));
        }
    }

    #[test]
    fn full_sample_is_a_permutation() {
        let source: Vec<i32> = (0..12).collect();
        let mut picked = pick_random(&source, source.len());
        picked.sort();
        assert_eq!(picked, source);
    }
}
