/// Fixed-shape workspace for one encoding stripe: p + 2 columns of words,
/// one per disk. Columns 0..p-1 hold data, column p the row parity, column
/// p+1 the diagonal parity.
///
/// Each column is stored with p words even though only p-1 are payload: row
/// p-1 is a spare that stays zero, which the reconstruction index arithmetic
/// relies on whenever a diagonal wraps through the imaginary bottom row.
#[derive(Clone, Debug)]
pub struct Stripe {
    p: usize,
    cols: Vec<Vec<u64>>,
}

impl Stripe {
    pub fn new(p: usize) -> Self {
        Self { p, cols: vec![vec![0u64; p]; p + 2] }
    }

    pub fn p(&self) -> usize {
        self.p
    }

    /// Payload rows per column.
    pub fn rows(&self) -> usize {
        self.p - 1
    }

    /// Payload words of column `d`.
    pub fn col(&self, d: usize) -> &[u64] {
        &self.cols[d][..self.p - 1]
    }

    /// Mutable payload words of column `d`; the spare row is not exposed.
    pub fn col_mut(&mut self, d: usize) -> &mut [u64] {
        let rows = self.p - 1;
        &mut self.cols[d][..rows]
    }

    pub fn zero_col(&mut self, d: usize) {
        self.cols[d].fill(0);
    }

    /// Full p-word column, spare row included.
    pub(crate) fn raw(&self, d: usize) -> &[u64] {
        &self.cols[d]
    }
}
