//! Variable-length byte records indexed by a compressed offset array.
//!
//! Records are concatenated into one payload buffer; a [`TrendVec`] stores
//! the n+1 record boundaries (every record's start plus the end of the
//! last). Record offsets are monotone by construction, the best case for
//! the trend compressor, so the index typically costs a few bits per
//! record.

use crate::error::{Error, Result};
use crate::TrendVec;

/// An immutable array of variable-length byte records.
///
/// ```
/// use trendvec::ByteRecords;
///
/// let recs = ByteRecords::new(&["foo", "bar", "baz"]).unwrap();
/// assert_eq!(recs.get(1), b"bar");
/// ```
pub struct ByteRecords {
    positions: TrendVec,
    records: Vec<u8>,
}

impl std::fmt::Debug for ByteRecords {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ByteRecords")
            .field("n", &self.len())
            .field("payload_bytes", &self.records.len())
            .finish()
    }
}

impl ByteRecords {
    /// Pack `records` into a payload buffer plus a compressed offset index.
    ///
    /// # Errors
    ///
    /// - [`Error::TooManyRecords`] if the record count exceeds `2^31 - 1`.
    /// - [`Error::PayloadTooLarge`] if the records total more than
    ///   `2^32 - 1` bytes.
    pub fn new<T: AsRef<[u8]>>(records: &[T]) -> Result<Self> {
        let n = records.len();
        let total: u64 = records.iter().map(|r| r.as_ref().len() as u64).sum();
        check_limits(n, total)?;

        let mut packed = Vec::with_capacity(total as usize);
        let mut pos = Vec::with_capacity(n + 1);

        for rec in records {
            pos.push(packed.len() as u32);
            packed.extend_from_slice(rec.as_ref());
        }
        pos.push(packed.len() as u32);

        Ok(ByteRecords {
            positions: TrendVec::new(&pos),
            records: packed,
        })
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.positions.len() - 1
    }

    /// True if the store holds no records.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Return the `i`-th record as a slice of the payload buffer.
    ///
    /// Both boundary offsets decode through one batched lookup, so a record
    /// read costs about two element decodes.
    pub fn get(&self, i: usize) -> &[u8] {
        let mut bounds = [0u32; 2];
        self.positions.slice(i, i + 2, &mut bounds);
        &self.records[bounds[0] as usize..bounds[1] as usize]
    }

    /// The compressed offset index.
    pub fn positions(&self) -> &TrendVec {
        &self.positions
    }

    /// The concatenated payload buffer.
    pub fn records(&self) -> &[u8] {
        &self.records
    }
}

fn check_limits(n: usize, total: u64) -> Result<()> {
    if n > i32::MAX as usize {
        return Err(Error::TooManyRecords(n));
    }
    if total > u64::from(u32::MAX) {
        return Err(Error::PayloadTooLarge(total));
    }
    Ok(())
}
