//! # Trend-Compressed Integer Arrays
//!
//! *Gzip-class space for sorted data, with ten-nanosecond random access.*
//!
//! ## Intuition First
//!
//! Picture a list of a million sorted integers as a staircase climbing from
//! left to right. Storing every step as a full 32-bit value ignores the one
//! thing we know about the staircase: it climbs at a roughly steady rate.
//!
//! Instead, draw a smooth curve through the steps and write down only how far
//! each step deviates from the curve. For a sorted array of a million numbers
//! in a million-value range, the deviations fit in about 5 bits each — and
//! unlike a general-purpose compressor, reading element `i` never touches
//! elements `0..i`.
//!
//! ## The Problem
//!
//! General compression and random access pull in opposite directions:
//! - **Block compressors** (gzip, zstd): excellent ratios, but reading one
//!   element decompresses a whole block.
//! - **Plain arrays**: $O(1)$ access, zero compression.
//! - **Succinct structures** (Elias-Fano and friends): both, but they require
//!   the input to be strictly monotone.
//!
//! `TrendVec` only asks for a *trend*. The input may contain duplicates and
//! local disorder; anything with a piecewise-smooth drift compresses well,
//! and pathological data still round-trips exactly (it just stays at 32 bits
//! per element).
//!
//! ## Historical Context
//!
//! ```text
//! 1974  Elias       Static monotone sequences at near-optimal space
//! 1998  Goldstein   Frame-of-reference: per-block base + fixed-width deltas
//! 2010  Lemire      SIMD bit-packing for integer blocks (FastPFOR line)
//! 2014  Boffa       Piecewise approximation of posting lists
//! 2020  Ferragina   PGM-index: learned piecewise models over sorted keys
//! ```
//!
//! This crate sits in the piecewise-model family: partition the array, fit a
//! tiny model per piece, store per-element corrections at a fixed bit width.
//!
//! ## Mathematical Formulation
//!
//! The array is cut into *segments* of 1024 elements; each segment into
//! *spans* of $16k$ elements. A span fits $y = \beta_0 + \beta_1 x +
//! \beta_2 x^2$ by ordinary least squares and stores, for each element, the
//! residual
//!
//! $$ r_i = (y_i - \lfloor p(i) \rfloor) \bmod 2^{32} $$
//!
//! at a fixed width $w \in \{0,1,2,4,8,16,32\}$. Decoding computes
//! $\lfloor p(i) \rfloor + r_i \bmod 2^{32}$, which recovers $y_i$ exactly
//! no matter how loose the fit is, as long as $w$ covers the observed
//! residual spread.
//!
//! Span boundaries are chosen greedily: adjacent spans merge while the merge
//! strictly reduces total memory, using the fact that two least-squares fits
//! combine in $O(1)$ by adding their normal-equation accumulators.
//!
//! ## Complexity Analysis
//!
//! - **Access**: $O(1)$ — one popcount, three multiply-adds, one shift/mask.
//! - **Build**: $O(n \cdot S)$ with $S \le 64$ spans per segment; one-time.
//! - **Space**: 32 bytes of model per span plus $w$ bits per element.
//!
//! ## What Could Go Wrong
//!
//! 1. **Trendless data**: residual widths degrade to 32 bits. Decoding stays
//!    exact; only the ratio suffers.
//! 2. **Loose fits**: the constant term may drift arbitrarily — modular
//!    residual arithmetic absorbs it. Only the residual *spread* matters.
//!
//! ## Implementation Notes
//!
//! This crate provides:
//! - **[`TrendVec`]**: the compressed, immutable u32 container.
//! - **[`ByteRecords`]**: variable-length byte records indexed by a
//!   `TrendVec` of offsets.
//!
//! ## References
//!
//! - Ferragina, P., & Vinciguerra, G. (2020). "The PGM-index: a fully-dynamic
//!   compressed learned index."
//! - Lemire, D., & Boytsov, L. (2015). "Decoding billions of integers per
//!   second through vectorization."

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod bits;
pub mod byte_records;
pub mod error;
pub mod fit;
mod segment;
mod span;
pub mod trend_vec;

pub use byte_records::ByteRecords;
pub use error::Error;
pub use trend_vec::TrendVec;

/// Elements per segment. A segment owns one bitmap word and one rank entry.
pub(crate) const SEG_SIZE: usize = 1024;

/// log2(SEG_SIZE), for index arithmetic on the read path.
pub(crate) const SEG_SHIFT: usize = 10;

/// SEG_SIZE - 1, masks an index down to its in-segment position.
pub(crate) const SEG_MASK: usize = SEG_SIZE - 1;

/// Smallest span length. Candidate spans start at this size and only grow by
/// merging, so every span covers a multiple of 16 elements (except the tail
/// of the final segment).
pub(crate) const SPAN_UNIT: usize = 16;

/// Coefficient count of a degree-2 polynomial.
pub(crate) const POLY_COEFS: usize = 3;
