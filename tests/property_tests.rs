use proptest::prelude::*;
use trendvec::TrendVec;

/// Derive every span's (start, end, width, offset) from the public arrays,
/// the way the decoder would.
fn spans_of(tv: &TrendVec) -> Vec<(usize, usize, u32, i64)> {
    let mut spans = Vec::new();
    for (seg, &bm) in tv.bitmap().iter().enumerate() {
        let rank = tv.rank()[seg] as usize;
        let mut s = 0usize;
        let mut k = 0usize;
        for b in 0..64 {
            if bm & (1u64 << b) != 0 {
                let e = (b + 1) * 16;
                let config = tv.configs()[rank + k];
                spans.push((s, e, (config & 0xFF) as u32, config >> 8));
                s = e;
                k += 1;
            }
        }
    }
    spans
}

proptest! {
    #[test]
    fn test_roundtrip_arbitrary(nums in prop::collection::vec(any::<u32>(), 0..3000)) {
        let tv = TrendVec::new(&nums);
        prop_assert_eq!(tv.len(), nums.len());
        for (i, &want) in nums.iter().enumerate() {
            prop_assert_eq!(tv.get(i), want);
        }
    }

    #[test]
    fn test_roundtrip_sorted(mut nums in prop::collection::vec(0..1_000_000u32, 1..3000)) {
        nums.sort_unstable();
        let tv = TrendVec::new(&nums);
        for (i, &want) in nums.iter().enumerate() {
            prop_assert_eq!(tv.get(i), want);
        }
    }

    #[test]
    fn test_build_is_deterministic(nums in prop::collection::vec(any::<u32>(), 0..2000)) {
        let a = TrendVec::new(&nums);
        let b = TrendVec::new(&nums);
        prop_assert_eq!(a.rank(), b.rank());
        prop_assert_eq!(a.bitmap(), b.bitmap());
        prop_assert_eq!(a.configs(), b.configs());
        prop_assert_eq!(a.residuals(), b.residuals());
        // Coefficients compare bit-exactly: same input, same arithmetic.
        let pa: Vec<u64> = a.polynomials().iter().map(|f| f.to_bits()).collect();
        let pb: Vec<u64> = b.polynomials().iter().map(|f| f.to_bits()).collect();
        prop_assert_eq!(pa, pb);
    }

    #[test]
    fn test_rank_consistency(nums in prop::collection::vec(any::<u32>(), 0..5000)) {
        let tv = TrendVec::new(&nums);
        if !tv.rank().is_empty() {
            prop_assert_eq!(tv.rank()[0], 0);
        }
        for s in 1..tv.rank().len() {
            prop_assert_eq!(
                tv.rank()[s],
                tv.rank()[s - 1] + u64::from(tv.bitmap()[s - 1].count_ones())
            );
        }
        // Total spans match the flat arrays.
        let total: u64 = tv.bitmap().iter().map(|b| u64::from(b.count_ones())).sum();
        prop_assert_eq!(total as usize, tv.configs().len());
        prop_assert_eq!(total as usize * 3, tv.polynomials().len());
    }

    #[test]
    fn test_residual_alignment(nums in prop::collection::vec(any::<u32>(), 1..4000)) {
        let tv = TrendVec::new(&nums);
        for (s, _e, width, offset) in spans_of(&tv) {
            if width > 0 {
                let w = i64::from(width);
                prop_assert_eq!((offset + s as i64 * w).rem_euclid(w), 0);
            }
        }
    }

    #[test]
    fn test_widths_are_powers_of_two(nums in prop::collection::vec(any::<u32>(), 1..2000)) {
        let tv = TrendVec::new(&nums);
        for &c in tv.configs() {
            let w = (c & 0xFF) as u32;
            prop_assert!(matches!(w, 0 | 1 | 2 | 4 | 8 | 16 | 32), "width {}", w);
        }
    }

    #[test]
    fn test_slice_equals_gets(
        nums in prop::collection::vec(any::<u32>(), 1..3000),
        cut in any::<(u16, u16)>(),
    ) {
        let tv = TrendVec::new(&nums);
        let a = cut.0 as usize % nums.len();
        let b = cut.1 as usize % nums.len();
        let (start, end) = (a.min(b), a.max(b) + 1);

        let mut out = vec![0u32; end - start];
        tv.slice(start, end, &mut out);
        for (k, &got) in out.iter().enumerate() {
            prop_assert_eq!(got, nums[start + k]);
        }
    }
}

use trendvec::ByteRecords;

proptest! {
    #[test]
    fn test_byte_records_roundtrip(
        records in prop::collection::vec(prop::collection::vec(any::<u8>(), 0..40), 0..200),
    ) {
        let br = ByteRecords::new(&records).unwrap();
        prop_assert_eq!(br.len(), records.len());
        for (i, rec) in records.iter().enumerate() {
            prop_assert_eq!(br.get(i), &rec[..]);
        }
    }
}

mod scenarios {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn sorted_random(n: usize, range: u32, seed: u64) -> Vec<u32> {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut nums: Vec<u32> = (0..n).map(|_| rng.gen_range(0..range)).collect();
        nums.sort_unstable();
        nums
    }

    fn check_all(tv: &TrendVec, nums: &[u32]) {
        let mut out = vec![0u32; nums.len()];
        tv.slice(0, nums.len(), &mut out);
        assert_eq!(out, nums);
    }

    #[test]
    fn test_sorted_1k_small_range() {
        let nums = sorted_random(1000, 1000, 42);
        let tv = TrendVec::new(&nums);
        check_all(&tv, &nums);

        let st = tv.stat();
        assert_eq!(st["n"], 1000);
        assert_eq!(st["seg_cnt"], 1);
        // Dense sorted data compresses to a few bits per element.
        assert!(st["bits/elt"] <= 8, "bits/elt = {}", st["bits/elt"]);
        assert!(st["mem_total"] < 4000, "mem_total = {}", st["mem_total"]);
    }

    #[test]
    fn test_sorted_1m_dense() {
        let nums = sorted_random(1_000_000, 1_000_000, 7);
        let tv = TrendVec::new(&nums);
        check_all(&tv, &nums);

        let st = tv.stat();
        assert_eq!(st["n"], 1_000_000);
        assert_eq!(st["seg_cnt"], 977);
        assert!(st["bits/elt"] <= 8, "bits/elt = {}", st["bits/elt"]);
    }

    #[test]
    fn test_sorted_1m_sparse() {
        let nums = sorted_random(1_000_000, 1_000_000_000, 7);
        let tv = TrendVec::new(&nums);
        check_all(&tv, &nums);

        let st = tv.stat();
        // Sparse range: around 16 residual bits per element.
        assert!(st["bits/elt"] <= 18, "bits/elt = {}", st["bits/elt"]);
        assert!(st["bits/elt"] >= 8, "bits/elt = {}", st["bits/elt"]);
    }

    #[test]
    fn test_unsorted_random_still_roundtrips() {
        let mut rng = StdRng::seed_from_u64(99);
        let nums: Vec<u32> = (0..10_000).map(|_| rng.gen()).collect();
        let tv = TrendVec::new(&nums);
        check_all(&tv, &nums);
        // No trend: residuals stay at full width, nothing lost.
        assert_eq!(tv.stat()["elt_width"], 32);
    }
}
