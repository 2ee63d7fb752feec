#![no_main]
use libfuzzer_sys::fuzz_target;
use trendvec::TrendVec;

fuzz_target!(|nums: Vec<u32>| {
    let tv = TrendVec::new(&nums);
    assert_eq!(tv.len(), nums.len());

    for (i, &want) in nums.iter().enumerate() {
        assert_eq!(tv.get(i), want, "get({}) diverged", i);
    }

    if !nums.is_empty() {
        let mut out = vec![0u32; nums.len()];
        tv.slice(0, nums.len(), &mut out);
        assert_eq!(out, nums, "slice diverged from input");
    }
});
