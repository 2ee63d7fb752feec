//! The compressed container: construction, random access, statistics.
//!
//! # Layout
//!
//! Five flat arrays hold the whole structure:
//! - `rank[s]`: spans in all segments before `s` (cumulative popcount).
//! - `bitmap[s]`: span-end bitmap of segment `s` at 16-element granularity.
//! - `polynomials`: three `f64` coefficients per span, in segment order.
//! - `configs`: per-span `i64`, low 8 bits residual width, upper 56 bits
//!   signed residual bit offset.
//! - `residuals`: packed residual bits, plus one zero guard word so a
//!   width-0 span may issue a harmless load at its (empty) offset.
//!
//! The arrays are plain data: a serializer that preserves element order and
//! bit patterns captures the complete state (see the accessor methods).
//!
//! # Read path
//!
//! `get(i)` is branch-light: segment index by shift, span index by masked
//! popcount plus rank, polynomial evaluation, one aligned bit-field load.
//! No decompression, no allocation, no synchronization — a fully built
//! container may be shared freely across threads.

use std::collections::HashMap;

use crate::bits::{read_field, MASKS};
use crate::segment::encode_segment;
use crate::{POLY_COEFS, SEG_MASK, SEG_SHIFT, SEG_SIZE, SPAN_UNIT};

/// An immutable, trend-compressed array of `u32`.
///
/// Construction is a single pass; afterwards the structure never changes.
/// Random data stays intact too — it simply compresses poorly.
///
/// ```
/// use trendvec::TrendVec;
///
/// let nums: Vec<u32> = (0..1000).map(|i| i * 3 + (i % 4)).collect();
/// let tv = TrendVec::new(&nums);
/// assert_eq!(tv.len(), 1000);
/// assert_eq!(tv.get(999), nums[999]);
/// ```
pub struct TrendVec {
    n: u32,
    rank: Vec<u64>,
    bitmap: Vec<u64>,
    polynomials: Vec<f64>,
    configs: Vec<i64>,
    residuals: Vec<u64>,
}

impl std::fmt::Debug for TrendVec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TrendVec")
            .field("n", &self.n)
            .field("segments", &self.bitmap.len())
            .field("spans", &self.configs.len())
            .finish()
    }
}

impl TrendVec {
    /// Compress `nums` into a new container.
    ///
    /// Costs a few hundred nanoseconds per element; all internal arrays are
    /// shrunk to exact length before returning.
    ///
    /// # Panics
    ///
    /// Panics if the residual stream outgrows the 56-bit signed offset
    /// field, which cannot happen for inputs addressable on current
    /// hardware.
    pub fn new(nums: &[u32]) -> Self {
        let mut tv = TrendVec {
            n: nums.len() as u32,
            rank: Vec::new(),
            bitmap: Vec::new(),
            polynomials: Vec::new(),
            configs: Vec::new(),
            residuals: Vec::new(),
        };

        for chunk in nums.chunks(SEG_SIZE) {
            tv.add_seg(chunk);
        }

        // Guard word: lets a width-0 span load 64 bits at the stream end.
        tv.residuals.push(0);

        tv.rank.shrink_to_fit();
        tv.bitmap.shrink_to_fit();
        tv.polynomials.shrink_to_fit();
        tv.configs.shrink_to_fit();
        tv.residuals.shrink_to_fit();

        tv
    }

    fn add_seg(&mut self, nums: &[u32]) {
        let rec = encode_segment(nums, (self.residuals.len() * 64) as i64);

        let r = match self.rank.last() {
            Some(&prev) => prev + u64::from(self.bitmap.last().unwrap().count_ones()),
            None => 0,
        };

        self.rank.push(r);
        self.bitmap.push(rec.bitmap);
        self.polynomials.extend_from_slice(&rec.polynomials);
        self.configs.extend_from_slice(&rec.configs);
        self.residuals.extend_from_slice(&rec.words);
    }

    /// Number of elements.
    pub fn len(&self) -> usize {
        self.n as usize
    }

    /// True if the container holds no elements.
    pub fn is_empty(&self) -> bool {
        self.n == 0
    }

    /// Return element `i`. O(1), roughly 10 ns.
    ///
    /// Indices at or past [`len`](Self::len) are the caller's mistake; they
    /// panic or return garbage, never unsafe memory access.
    #[inline]
    pub fn get(&self, i: usize) -> u32 {
        let seg = i >> SEG_SHIFT;
        let spans_bitmap = self.bitmap[seg];
        let rank = self.rank[seg];

        let j = i & SEG_MASK;
        let x = j as f64;

        let masked = spans_bitmap & MASKS[j / SPAN_UNIT];
        let span_idx = rank as usize + masked.count_ones() as usize;

        let k = span_idx * POLY_COEFS;
        let p = &self.polynomials[k..k + POLY_COEFS];
        let v = (p[0] + p[1] * x + p[2] * x * x) as i64;

        let config = self.configs[span_idx];
        let width = (config & 0xFF) as u32;
        let offset = config >> 8;

        let res_bit = (offset + j as i64 * i64::from(width)) as u64;
        let d = read_field(&self.residuals, res_bit, width);

        v.wrapping_add(d as i64) as u32
    }

    /// Decode elements `start..end` into `out[..end - start]`.
    ///
    /// Output is identical to element-wise [`get`](Self::get); the batched
    /// path only hoists the segment lookup per segment and the polynomial
    /// and config loads per span run.
    ///
    /// # Panics
    ///
    /// Panics if `out` is shorter than `end - start` or the range is not
    /// within `0..len()`.
    pub fn slice(&self, start: usize, end: usize, out: &mut [u32]) {
        assert!(start <= end && end <= self.len());
        assert!(out.len() >= end - start);

        let mut i = start;
        while i < end {
            let seg = i >> SEG_SHIFT;
            let spans_bitmap = self.bitmap[seg];
            let rank = self.rank[seg] as usize;
            let seg_end = ((seg + 1) << SEG_SHIFT).min(end);

            while i < seg_end {
                let j = i & SEG_MASK;

                let masked = spans_bitmap & MASKS[j / SPAN_UNIT];
                let span_idx = rank + masked.count_ones() as usize;

                // The span containing j ends right after the first marked
                // 16-block at or past j's block.
                let end_block = (spans_bitmap >> (j / SPAN_UNIT)).trailing_zeros() as usize
                    + j / SPAN_UNIT;
                let span_end = (seg << SEG_SHIFT) + (end_block + 1) * SPAN_UNIT;
                let run_end = span_end.min(seg_end);

                let k = span_idx * POLY_COEFS;
                let p = &self.polynomials[k..k + POLY_COEFS];
                let config = self.configs[span_idx];
                let width = (config & 0xFF) as u32;
                let offset = config >> 8;

                let mut res_bit = offset + j as i64 * i64::from(width);
                while i < run_end {
                    let x = (i & SEG_MASK) as f64;
                    let v = (p[0] + p[1] * x + p[2] * x * x) as i64;
                    let d = read_field(&self.residuals, res_bit as u64, width);
                    out[i - start] = v.wrapping_add(d as i64) as u32;
                    res_bit += i64::from(width);
                    i += 1;
                }
            }
        }
    }

    /// Total in-memory footprint in bytes: the struct plus its five arrays.
    pub fn mem_bytes(&self) -> usize {
        std::mem::size_of::<Self>()
            + self.rank.capacity() * 8
            + self.bitmap.capacity() * 8
            + self.polynomials.capacity() * 8
            + self.configs.capacity() * 8
            + self.residuals.capacity() * 8
    }

    /// Memory usage statistics.
    ///
    /// Keys:
    ///
    /// ```text
    /// n          total element count
    /// seg_cnt    segment count
    /// span_cnt   total span count
    /// spans/seg  average spans per segment
    /// elt_width  average residual bits per element (truncated)
    /// mem_elts   bytes spent on residual words
    /// mem_total  total byte footprint
    /// bits/elt   average total bits per element
    /// ```
    ///
    /// For an empty container every derived ratio reports 0.
    pub fn stat(&self) -> HashMap<&'static str, i32> {
        let seg_cnt = self.bitmap.len();
        let span_cnt = self.configs.len();
        let mem_total = self.mem_bytes();
        let mem_elts = self.residuals.len() * 8;

        let width_sum: i64 = self.configs.iter().map(|&c| c & 0xFF).sum();

        let mut st = HashMap::new();
        st.insert("n", self.n as i32);
        st.insert("seg_cnt", seg_cnt as i32);
        st.insert("span_cnt", span_cnt as i32);
        st.insert(
            "spans/seg",
            if seg_cnt == 0 {
                0
            } else {
                ((span_cnt * 1000) / (seg_cnt * 1000 + 1)) as i32
            },
        );
        st.insert("elt_width", (width_sum / span_cnt.max(1) as i64) as i32);
        st.insert("mem_elts", mem_elts as i32);
        st.insert("mem_total", mem_total as i32);
        st.insert(
            "bits/elt",
            if self.n == 0 {
                0
            } else {
                (mem_total * 8 / self.n as usize) as i32
            },
        );
        st
    }

    /// Per-segment cumulative span counts (the persisted `rank` array).
    pub fn rank(&self) -> &[u64] {
        &self.rank
    }

    /// Per-segment span-end bitmaps.
    pub fn bitmap(&self) -> &[u64] {
        &self.bitmap
    }

    /// Flat polynomial coefficients, three per span.
    pub fn polynomials(&self) -> &[f64] {
        &self.polynomials
    }

    /// Per-span packed (offset, width) configuration words.
    pub fn configs(&self) -> &[i64] {
        &self.configs
    }

    /// Packed residual words, including the trailing guard word.
    pub fn residuals(&self) -> &[u64] {
        &self.residuals
    }
}
