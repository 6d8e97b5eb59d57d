//! Halton low-discrepancy sequence with an explicit continuation cursor.
//!
//! Element `i` in dimension `j` is the radical inverse of `i` in the `j`-th
//! prime base. Element 0 is the origin of the unit cube.

/// Resumable Halton sequence; each roadmap owns its own cursor.
#[derive(Clone, Debug)]
pub struct HaltonSequence {
    bases: Vec<u64>,
    next_index: u64,
}

impl HaltonSequence {
    pub fn new(dimension: usize) -> Self {
        Self {
            bases: first_primes(dimension),
            next_index: 0,
        }
    }

    pub fn dimension(&self) -> usize {
        self.bases.len()
    }

    /// Index of the next element to be drawn.
    pub fn cursor(&self) -> u64 {
        self.next_index
    }

    /// Draw the next `count` points, advancing the cursor.
    pub fn next_batch(&mut self, count: usize) -> Vec<Vec<f64>> {
        let start = self.next_index;
        self.next_index += count as u64;
        (start..self.next_index).map(|i| self.element(i)).collect()
    }

    pub fn element(&self, index: u64) -> Vec<f64> {
        self.bases
            .iter()
            .map(|&b| radical_inverse(index, b))
            .collect()
    }
}

fn radical_inverse(mut i: u64, base: u64) -> f64 {
    let inv = 1.0 / base as f64;
    let mut f = inv;
    let mut r = 0.0;
    while i > 0 {
        r += (i % base) as f64 * f;
        i /= base;
        f *= inv;
    }
    r
}

fn first_primes(n: usize) -> Vec<u64> {
    let mut primes: Vec<u64> = Vec::with_capacity(n);
    let mut k = 2u64;
    while primes.len() < n {
        if primes.iter().take_while(|&&p| p * p <= k).all(|&p| k % p != 0) {
            primes.push(k);
        }
        k += 1;
    }
    primes
}
