//! Build-time spans and greedy boundary optimization.
//!
//! A segment starts life as a row of 16-element candidate spans, one
//! [`QuadFit`] each. A parallel list holds, for every adjacent pair, the
//! span that *would* result from merging them. The optimizer repeatedly
//! commits the adjacent merge with the largest strictly-positive memory
//! saving, patching the two neighboring merge candidates, and stops when no
//! merge pays for itself.
//!
//! Merging accumulators is O(1); recomputing the merged span's residual
//! range is O(length), which bounds the whole pass at O(S²) per segment for
//! S ≤ 64 candidates — fine for a one-time build.

use crate::fit::{eval2, QuadFit};
use crate::{POLY_COEFS, SPAN_UNIT};

/// A contiguous sample range `[s, e)` of a segment, its fitted polynomial,
/// and the storage cost of keeping it as its own span.
///
/// Spans exist only during construction; the container keeps none of them.
#[derive(Debug, Clone)]
pub(crate) struct Span {
    pub fit: QuadFit,
    /// Solved polynomial, before the residual shift.
    pub orig_poly: [f64; POLY_COEFS],
    /// `orig_poly` with the residual minimum folded into the constant term,
    /// so stored residuals are non-negative.
    pub poly: [f64; POLY_COEFS],
    /// Residual bit width, a power of two in {0,1,2,4,8,16,32}.
    pub width: u32,
    /// Estimated storage in bits: model words plus residuals.
    pub mem: usize,
    pub s: usize,
    pub e: usize,
}

impl Span {
    fn new(xs: &[f64], ys: &[f64], fit: QuadFit, s: usize, e: usize) -> Self {
        let mut sp = Span {
            fit,
            orig_poly: [0.0; POLY_COEFS],
            poly: [0.0; POLY_COEFS],
            width: 0,
            mem: 0,
            s,
            e,
        };
        sp.refit(xs, ys);
        sp
    }

    /// Re-solve the polynomial and recompute shift, width, and cost over
    /// `[s, e)`. O(e - s).
    fn refit(&mut self, xs: &[f64], ys: &[f64]) {
        self.orig_poly = self.fit.solve();

        let (max, min) = residual_range(&self.orig_poly, &xs[self.s..self.e], &ys[self.s..self.e]);
        let margin = (max - min).ceil() as u64;

        self.poly = self.orig_poly;
        self.poly[0] += min;

        self.width = margin_width(margin).min(32);
        self.mem = mem_cost(self.width, self.e - self.s);
    }

    /// Absorb `other`, which must be the immediately following span.
    fn absorb(&mut self, other: &Span, xs: &[f64], ys: &[f64]) {
        self.fit.merge(&other.fit);
        self.e = other.e;
        self.refit(xs, ys);
    }
}

/// Max and min of `ys[i] - p(xs[i])` over a sample window.
fn residual_range(poly: &[f64; POLY_COEFS], xs: &[f64], ys: &[f64]) -> (f64, f64) {
    let mut max = 0.0f64;
    let mut min = 0.0f64;
    for (&x, &y) in xs.iter().zip(ys.iter()) {
        let diff = y - eval2(poly, x);
        if diff > max {
            max = diff;
        }
        if diff < min {
            min = diff;
        }
    }
    (max, min)
}

/// Bits needed to store `margin`, rounded up to the next power of two.
///
/// Power-of-two widths keep aligned residual reads inside one 64-bit word;
/// the caller caps the result at 32.
pub(crate) fn margin_width(margin: u64) -> u32 {
    if margin == 0 {
        return 0;
    }
    let bits = 64 - margin.leading_zeros();
    if bits == 1 {
        return 1;
    }
    1 << (32 - (bits - 1).leading_zeros())
}

/// Storage estimate in bits: three coefficient words plus the config word,
/// plus `width` bits per element.
fn mem_cost(width: u32, len: usize) -> usize {
    64 * (POLY_COEFS + 1) + width as usize * len
}

/// Partition one segment's samples into spans minimizing estimated memory.
///
/// Candidates start at [`SPAN_UNIT`] elements (the final one may be shorter
/// in the final segment). The scan for the best merge starts at pair index
/// 1, so the leading 16 elements keep a dedicated span; ties go to the
/// first maximum. Both conventions are part of the observable output and
/// must not be "fixed".
pub(crate) fn build_spans(xs: &[f64], ys: &[f64]) -> Vec<Span> {
    let n = xs.len();

    let mut spans: Vec<Span> = Vec::with_capacity(n.div_ceil(SPAN_UNIT));
    let mut s = 0;
    while s < n {
        let e = (s + SPAN_UNIT).min(n);
        let fit = QuadFit::with_int_range(s, e, &ys[s..e]);
        spans.push(Span::new(xs, ys, fit, s, e));
        s = e;
    }

    if spans.len() < 2 {
        return spans;
    }

    // merged[i] is what spans[i] and spans[i+1] would become as one span.
    let mut merged: Vec<Span> = (0..spans.len() - 1)
        .map(|i| {
            let mut m = spans[i].clone();
            m.absorb(&spans[i + 1], xs, ys);
            m
        })
        .collect();

    loop {
        let mut best_saved: i64 = -1;
        let mut best = 0usize;
        for i in 1..merged.len() {
            let saved = spans[i].mem as i64 + spans[i + 1].mem as i64 - merged[i].mem as i64;
            if best_saved < saved {
                best = i;
                best_saved = saved;
            }
        }

        if best_saved <= 0 {
            // Even the best merge does not reduce memory.
            return spans;
        }

        // Commit: spans[best] and spans[best+1] collapse into merged[best].
        //
        //   spans:   a   b   c   d        a   bc   d
        //   merged:   ab  bc  cd    ->     abc  bcd
        if best > 0 {
            let right = spans[best + 1].clone();
            merged[best - 1].absorb(&right, xs, ys);
        }
        if best < merged.len() - 1 {
            // bcd = b's fit plus the already-merged cd.
            let mut nb = spans[best].clone();
            let cd = merged[best + 1].clone();
            nb.absorb(&cd, xs, ys);
            merged[best + 1] = nb;
        }
        spans[best] = merged[best].clone();
        spans.remove(best + 1);
        merged.remove(best);
    }
}
