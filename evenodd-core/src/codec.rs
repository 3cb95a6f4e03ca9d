use anyhow::{bail, Result};

use crate::layout::validate_p;
use crate::stripe::Stripe;

/// The EVENODD transform over one stripe.
///
/// Every operation is word-wise XOR; diagonal indices are taken mod p. The
/// diagonal parity is stored un-adjusted relative to the textbook code: the
/// value of the wrapping diagonal (the adjuster) is folded into every cell
/// of column p+1 at encode time, which yields bit-identical disks and keeps
/// recovery free of a separate syndrome pass.
pub struct EvenOdd {
    p: usize,
}

impl EvenOdd {
    pub fn new(p: usize) -> Result<Self> {
        validate_p(p)?;
        Ok(Self { p })
    }

    pub fn p(&self) -> usize {
        self.p
    }

    /// Fill the two parity columns from data columns 0..p-1.
    pub fn encode(&self, stripe: &mut Stripe) -> Result<()> {
        self.check(stripe)?;
        let p = self.p;
        let row = self.row_parity(stripe);
        stripe.col_mut(p).copy_from_slice(&row[..p - 1]);
        self.fill_diag_parity(stripe);
        Ok(())
    }

    /// Recompute up to two missing columns in place.
    ///
    /// `missing` holds ascending column indices in 0..p+2; the matching
    /// columns of the stripe must already be zeroed.
    pub fn reconstruct(&self, stripe: &mut Stripe, missing: &[usize]) -> Result<()> {
        self.check(stripe)?;
        let p = self.p;
        match *missing {
            [] => Ok(()),
            [i] if i < p + 2 => {
                self.reconstruct_one(stripe, i);
                Ok(())
            }
            [i, j] if i < j && j < p + 2 => {
                self.reconstruct_two(stripe, i, j);
                Ok(())
            }
            _ => bail!("missing set must hold at most two ascending column indices"),
        }
    }

    fn check(&self, stripe: &Stripe) -> Result<()> {
        if stripe.p() != self.p {
            bail!("stripe built for p={} fed to codec with p={}", stripe.p(), self.p);
        }
        Ok(())
    }

    fn reconstruct_one(&self, stripe: &mut Stripe, i: usize) {
        let p = self.p;
        if i == p {
            let row = self.row_parity(stripe);
            stripe.col_mut(p).copy_from_slice(&row[..p - 1]);
        } else if i == p + 1 {
            self.fill_diag_parity(stripe);
        } else {
            let col = self.xor_with_row_parity(stripe, i);
            stripe.col_mut(i).copy_from_slice(&col[..p - 1]);
        }
    }

    fn reconstruct_two(&self, stripe: &mut Stripe, i: usize, j: usize) {
        let p = self.p;
        if i == p && j == p + 1 {
            // Both parities lost: plain re-encode from the intact data.
            self.reconstruct_one(stripe, p);
            self.fill_diag_parity(stripe);
        } else if i < p && j == p {
            // The diagonal parity pins column i; row parity is then re-derived.
            // s[k] is the XOR of the lost cell on diagonal k with the adjuster.
            let mut s = self.diagonal(stripe);
            for (l, w) in stripe.col(p + 1).iter().enumerate() {
                s[l] ^= *w;
            }
            let t = s[(i + p - 1) % p];
            let mut col = vec![0u64; p - 1];
            for (k, c) in col.iter_mut().enumerate() {
                *c = s[(i + k) % p] ^ t;
            }
            stripe.col_mut(i).copy_from_slice(&col);
            self.reconstruct_one(stripe, p);
        } else if i < p && j == p + 1 {
            // Row parity survives, so column i falls out directly.
            let col = self.xor_with_row_parity(stripe, i);
            stripe.col_mut(i).copy_from_slice(&col[..p - 1]);
            self.fill_diag_parity(stripe);
        } else {
            self.reconstruct_two_data(stripe, i, j);
        }
    }

    /// Both lost columns carry data: solve the coupled row/diagonal system.
    fn reconstruct_two_data(&self, stripe: &mut Stripe, i: usize, j: usize) {
        let p = self.p;

        // s0[k] is the XOR of the two lost cells in row k.
        let mut s0 = self.row_parity(stripe);
        for (l, w) in stripe.col(p).iter().enumerate() {
            s0[l] ^= *w;
        }

        // The diagonal parity column hides the adjuster in every cell, so
        // XOR-ing both parity columns over all rows leaves exactly that
        // adjuster; folding it back makes the diagonal syndromes exact.
        let balance = {
            let cp = stripe.col(p);
            let cq = stripe.col(p + 1);
            cp.iter().zip(cq).fold(0u64, |acc, (a, b)| acc ^ a ^ b)
        };

        // s1[k] is the XOR of the two lost cells on diagonal k.
        let mut s1 = self.diagonal(stripe);
        for l in 0..p - 1 {
            s1[l] ^= balance ^ stripe.col(p + 1)[l];
        }
        s1[p - 1] ^= balance;

        // Walk the recovery chain. Each step resolves one cell of column j
        // from its diagonal, then the same row of column i from row parity;
        // (j - i) is a unit mod p, so the chain meets every row once and
        // terminates on the spare row.
        let ij = (i + p - j) % p;
        let ji = (j + p - i) % p;
        let mut ci = vec![0u64; p];
        let mut cj = vec![0u64; p];
        let mut s = (ij + p - 1) % p;
        loop {
            cj[s] = s1[(j + s) % p] ^ ci[(s + p - ij) % p];
            ci[s] = s0[s] ^ cj[s];
            s = (s + p - ji) % p;
            if s == p - 1 {
                break;
            }
        }
        stripe.col_mut(i).copy_from_slice(&ci[..p - 1]);
        stripe.col_mut(j).copy_from_slice(&cj[..p - 1]);
    }

    /// Row-wise XOR of the data columns. Lost columns contribute zeros.
    fn row_parity(&self, stripe: &Stripe) -> Vec<u64> {
        let p = self.p;
        let mut out = vec![0u64; p];
        for d in 0..p {
            let col = stripe.raw(d);
            for r in 0..p - 1 {
                out[r] ^= col[r];
            }
        }
        out
    }

    /// Row-wise XOR of columns {0..=p} \ {skip}; with `skip` a zeroed data
    /// column this recovers it from the row parity.
    fn xor_with_row_parity(&self, stripe: &Stripe, skip: usize) -> Vec<u64> {
        let p = self.p;
        let mut out = vec![0u64; p];
        for d in 0..=p {
            if d == skip {
                continue;
            }
            let col = stripe.raw(d);
            for r in 0..p - 1 {
                out[r] ^= col[r];
            }
        }
        out
    }

    /// Un-adjusted diagonal vector of the data columns: diag[k] is the XOR
    /// along anti-diagonal k mod p, diag[p-1] the wrapping diagonal (the
    /// adjuster). Lost columns contribute zeros.
    fn diagonal(&self, stripe: &Stripe) -> Vec<u64> {
        let p = self.p;
        let mut b = vec![0u64; 2 * p - 1];
        for d in 0..p {
            let col = stripe.raw(d);
            for r in 0..p - 1 {
                b[d + r] ^= col[r];
            }
        }
        let mut diag = vec![0u64; p];
        for k in 0..p - 1 {
            diag[k] = b[k] ^ b[k + p];
        }
        diag[p - 1] = b[p - 1];
        diag
    }

    fn fill_diag_parity(&self, stripe: &mut Stripe) {
        let p = self.p;
        let diag = self.diagonal(stripe);
        let adj = diag[p - 1];
        let out = stripe.col_mut(p + 1);
        for (k, w) in out.iter_mut().enumerate() {
            *w = diag[k] ^ adj;
        }
    }
}
