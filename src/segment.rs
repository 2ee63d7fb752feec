//! Per-segment encoding: spans to (bitmap, polynomials, configs, words).
//!
//! One segment holds up to 1024 elements. Its encoded form is a 64-bit
//! span-layout bitmap (bit `i` set iff a span ends at element `(i+1)·16`),
//! three polynomial coefficients and one config word per span, and the
//! packed residual words. The config word carries the residual bit width in
//! its low 8 bits and a signed bit offset in the upper 56, pre-adjusted by
//! `s·width` so the decoder addresses residuals with the in-segment index
//! alone.

use crate::bits::write_field;
use crate::fit::eval2;
use crate::span::build_spans;
use crate::SPAN_UNIT;

/// Largest residual offset representable in the 56-bit signed config field.
const MAX_OFFSET_BITS: i64 = (1 << 55) - 1;
const MIN_OFFSET_BITS: i64 = -(1 << 55);

/// Encoded form of one segment, ready to be appended to the container.
pub(crate) struct SegRecord {
    pub bitmap: u64,
    pub polynomials: Vec<f64>,
    pub configs: Vec<i64>,
    pub words: Vec<u64>,
}

/// Encode one chunk of up to 1024 values whose residuals will start at
/// absolute bit offset `start_bit` in the container's residual stream.
pub(crate) fn encode_segment(nums: &[u32], start_bit: i64) -> SegRecord {
    let n = nums.len();

    let xs: Vec<f64> = (0..n).map(|i| i as f64).collect();
    let ys: Vec<f64> = nums.iter().map(|&v| f64::from(v)).collect();

    let spans = build_spans(&xs, &ys);

    let mut bitmap = 0u64;
    let mut polynomials = Vec::with_capacity(spans.len() * 3);
    let mut configs = Vec::with_capacity(spans.len());
    // Worst case one word per element (width 32, 1024 elements = 512 words);
    // n words is a safe over-allocation, trimmed below.
    let mut words = vec![0u64; n];

    let mut res_bit = 0i64;

    for sp in &spans {
        // Spans are identified by the 16-block their last element lands in.
        bitmap |= 1 << ((sp.e - 1) / SPAN_UNIT);

        let width = i64::from(sp.width);
        if width > 0 {
            // Align the cursor so no residual read straddles a word.
            res_bit += width - 1;
            res_bit -= res_bit % width;
        }

        polynomials.extend_from_slice(&sp.poly);

        // Pre-subtract s*width so the decoder computes
        //   position = offset + i*width
        // from the in-segment index directly. The subtraction can push the
        // offset negative; the field is signed.
        let offset = res_bit + start_bit - sp.s as i64 * width;
        assert!(
            (MIN_OFFSET_BITS..=MAX_OFFSET_BITS).contains(&offset),
            "residual offset {offset} exceeds the 56-bit signed config field"
        );
        configs.push((offset << 8) | width);

        for j in sp.s..sp.e {
            let v = eval2(&sp.poly, xs[j]);
            // Wrapping 32-bit difference: exact under the decoder's
            // wrapping sum, however loose the fit.
            let d = (i64::from(nums[j]).wrapping_sub(v as i64)) as u32;
            write_field(&mut words, res_bit as u64, u64::from(d), sp.width);
            res_bit += width;
        }
    }

    words.truncate(((res_bit + 63) >> 6) as usize);

    SegRecord {
        bitmap,
        polynomials,
        configs,
        words,
    }
}
