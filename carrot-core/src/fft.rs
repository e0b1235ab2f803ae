/// Fixed-size radix-2 FFT used to convolve two real sequences.
///
/// The plan (twiddle factors and bit-reversal permutation) is built once for a
/// power-of-two size and is read-only afterwards, so a single instance can be
/// shared across threads and prediction calls.
use std::f64::consts::PI;

use crate::error::{CarrotError, Result};

pub struct FftConv {
    /// Transform length, a power of two.
    n: usize,
    /// cos(2πi/n) for i in 0..n/2.
    wr: Vec<f64>,
    /// sin(2πi/n) for i in 0..n/2.
    wi: Vec<f64>,
    /// Bit-reversal permutation of 0..n.
    rev: Vec<usize>,
}

impl FftConv {
    /// Build a plan whose length is the smallest power of two (at least 2) that is `>= min_size`.
    pub fn new(min_size: usize) -> Self {
        let mut k = 1;
        while (1usize << k) < min_size {
            k += 1;
        }
        let n = 1usize << k;

        let ang = 2.0 * PI / n as f64;
        let (wr, wi): (Vec<f64>, Vec<f64>) = (0..n / 2)
            .map(|i| {
                let theta = i as f64 * ang;
                (theta.cos(), theta.sin())
            })
            .unzip();

        let mut rev = vec![0usize; n];
        for i in 1..n {
            rev[i] = (rev[i >> 1] >> 1) | ((i & 1) << (k - 1));
        }

        FftConv { n, wr, wi, rev }
    }

    /// Largest convolution result length this plan supports.
    pub fn capacity(&self) -> usize {
        self.n
    }

    fn reverse(&self, a: &mut [f64]) {
        for i in 1..self.n {
            let j = self.rev[i];
            if i < j {
                a.swap(i, j);
            }
        }
    }

    /// In-place forward transform of the complex buffer `ar + i*ai`.
    fn transform(&self, ar: &mut [f64], ai: &mut [f64]) {
        self.reverse(ar);
        self.reverse(ai);

        let mut len = 2;
        while len <= self.n {
            let half = len >> 1;
            let diff = self.n / len;
            for start in (0..self.n).step_by(len) {
                let mut pw = 0;
                for j in start..start + half {
                    let k = j + half;
                    let vr = ar[k] * self.wr[pw] - ai[k] * self.wi[pw];
                    let vi = ar[k] * self.wi[pw] + ai[k] * self.wr[pw];
                    ar[k] = ar[j] - vr;
                    ai[k] = ai[j] - vi;
                    ar[j] += vr;
                    ai[j] += vi;
                    pw += diff;
                }
            }
            len <<= 1;
        }
    }

    /// Linear convolution of two real sequences.
    ///
    /// `a` goes into the real part and `b` into the imaginary part of a single
    /// complex buffer, so one forward and one more forward transform (read back
    /// in reversed order) are enough. Returns an empty vector if either input
    /// is empty.
    pub fn convolve(&self, a: &[f64], b: &[f64]) -> Result<Vec<f64>> {
        if a.is_empty() || b.is_empty() {
            return Ok(Vec::new());
        }

        let n = self.n;
        let result_len = a.len() + b.len() - 1;
        if result_len > n {
            return Err(CarrotError::CapacityExceeded {
                a_len: a.len(),
                b_len: b.len(),
                result_len,
                capacity: n,
            });
        }

        let mut cr = vec![0.0; n];
        let mut ci = vec![0.0; n];
        cr[..a.len()].copy_from_slice(a);
        ci[..b.len()].copy_from_slice(b);

        self.transform(&mut cr, &mut ci);

        // Z[k] + conj(Z[n-k]) = 2A[k] and -i(Z[k] - conj(Z[n-k])) = 2B[k],
        // so their product is 4 * A[k] * B[k].
        cr[0] = 4.0 * cr[0] * ci[0];
        ci[0] = 0.0;
        let (mut i, mut j) = (1, n - 1);
        while i <= j {
            let ar = cr[i] + cr[j];
            let ai = ci[i] - ci[j];
            let br = ci[j] + ci[i];
            let bi = cr[j] - cr[i];
            cr[i] = ar * br - ai * bi;
            ci[i] = ar * bi + ai * br;
            cr[j] = cr[i];
            ci[j] = -ci[i];
            i += 1;
            j -= 1;
        }

        self.transform(&mut cr, &mut ci);

        // A second forward transform yields n * c[-m mod n].
        let scale = 4.0 * n as f64;
        let mut res = vec![0.0; n];
        res[0] = cr[0] / scale;
        let (mut i, mut j) = (1, n - 1);
        while i <= j {
            res[i] = cr[j] / scale;
            res[j] = cr[i] / scale;
            i += 1;
            j -= 1;
        }
        res.truncate(result_len);
        Ok(res)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;

    fn naive_convolve(a: &[f64], b: &[f64]) -> Vec<f64> {
        let mut res = vec![0.0; a.len() + b.len() - 1];
        for (i, x) in a.iter().enumerate() {
            for (j, y) in b.iter().enumerate() {
                res[i + j] += x * y;
            }
        }
        res
    }

    fn assert_close(actual: &[f64], expected: &[f64]) {
        assert_eq!(actual.len(), expected.len());
        for (k, (x, y)) in actual.iter().zip(expected).enumerate() {
            let tolerance = 1e-6 * y.abs().max(1.0);
            assert!((x - y).abs() <= tolerance, "index {k}: got {x}, expected {y}");
        }
    }

    #[test]
    fn test_plan_rounds_up_to_power_of_two() {
        assert_eq!(FftConv::new(1).capacity(), 2);
        assert_eq!(FftConv::new(2).capacity(), 2);
        assert_eq!(FftConv::new(5).capacity(), 8);
        assert_eq!(FftConv::new(19500).capacity(), 32768);
    }

    #[test]
    fn test_small_known_convolution() {
        let fft = FftConv::new(8);
        let res = fft.convolve(&[1.0, 2.0, 3.0], &[0.0, 1.0, 0.5]).unwrap();
        assert_close(&res, &[0.0, 1.0, 2.5, 4.0, 1.5]);
    }

    #[test]
    fn test_random_matches_naive() {
        let fft = FftConv::new(128);
        let mut rng = rand::rng();
        for _ in 0..50 {
            let a_len = rng.random_range(1..=64);
            let b_len = rng.random_range(1..=64);
            let a: Vec<f64> = (0..a_len).map(|_| rng.random_range(-10.0..10.0)).collect();
            let b: Vec<f64> = (0..b_len).map(|_| rng.random_range(-10.0..10.0)).collect();
            assert_close(&fft.convolve(&a, &b).unwrap(), &naive_convolve(&a, &b));
        }
    }

    #[test]
    fn test_exact_fit_is_allowed() {
        let fft = FftConv::new(8);
        let a = [1.0; 4];
        let b = [1.0; 5];
        let res = fft.convolve(&a, &b).unwrap();
        assert_close(&res, &naive_convolve(&a, &b));
    }

    #[test]
    fn test_capacity_exceeded() {
        let fft = FftConv::new(8);
        let err = fft.convolve(&[1.0; 5], &[1.0; 5]).unwrap_err();
        assert_eq!(
            err,
            CarrotError::CapacityExceeded { a_len: 5, b_len: 5, result_len: 9, capacity: 8 }
        );
    }

    #[test]
    fn test_empty_input() {
        let fft = FftConv::new(8);
        assert!(fft.convolve(&[], &[1.0]).unwrap().is_empty());
        assert!(fft.convolve(&[1.0], &[]).unwrap().is_empty());
    }
}
