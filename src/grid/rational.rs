//! Rational approximation by continued fractions
//!
//! Used to "justify" a tuned interval: snap an arbitrary frequency ratio to
//! the simplest nearby just ratio.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Default number of continued fraction terms
pub const MAX_TERMS: usize = 20;

/// A ratio of two integers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Fraction {
    /// Numerator
    pub numerator: i64,
    /// Denominator, positive
    pub denominator: i64,
}

impl Fraction {
    /// `numerator / denominator`, taken as given
    pub const fn new(numerator: i64, denominator: i64) -> Self {
        Self {
            numerator,
            denominator,
        }
    }

    /// Value as `f64`
    pub fn to_f64(self) -> f64 {
        self.numerator as f64 / self.denominator as f64
    }

    /// Value as `f32`
    pub fn to_f32(self) -> f32 {
        self.to_f64() as f32
    }
}

impl Default for Fraction {
    fn default() -> Self {
        Self::new(0, 1)
    }
}

impl fmt::Display for Fraction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.numerator, self.denominator)
    }
}

/// Continued fraction expansion of `x`, at most `max_terms` terms.
///
/// Stops early once the remainder is an exact integer. Non-finite input has
/// no expansion.
pub fn continued_fraction(x: f64, max_terms: usize) -> Vec<i64> {
    let mut cf = Vec::new();
    if !x.is_finite() {
        return cf;
    }

    let mut x = x;
    while cf.len() < max_terms {
        let a = x.floor();
        cf.push(a as i64);
        let remainder = x - a;
        if remainder == 0.0 {
            break;
        }
        x = 1.0 / remainder;
        if !x.is_finite() {
            break;
        }
    }
    cf
}

/// Successive convergents of a continued fraction.
///
/// Uses `p_k = a_k p_{k-1} + p_{k-2}` (same for `q`) seeded with `(1,0)` and
/// `(0,1)`. The sequence ends early if a convergent would overflow.
pub fn convergents(cf: &[i64]) -> Vec<Fraction> {
    let mut convs = Vec::with_capacity(cf.len());
    let (mut p_prev, mut q_prev) = (0i64, 1i64);
    let (mut p, mut q) = (1i64, 0i64);

    for &a in cf {
        let next = a
            .checked_mul(p)
            .and_then(|ap| ap.checked_add(p_prev))
            .zip(a.checked_mul(q).and_then(|aq| aq.checked_add(q_prev)));
        let Some((p_next, q_next)) = next else {
            break;
        };
        convs.push(Fraction::new(p_next, q_next));
        (p_prev, q_prev) = (p, q);
        (p, q) = (p_next, q_next);
    }
    convs
}

/// The lowest-denominator convergent of `x` within `1/n` of it.
///
/// Falls back to the last convergent computed when none is close enough,
/// and to `0/1` when `x` has no expansion at all.
pub fn closest_rational(x: f64, n: f64) -> Fraction {
    let convs = convergents(&continued_fraction(x, MAX_TERMS));
    let tolerance = 1.0 / n;

    convs
        .iter()
        .copied()
        .find(|frac| (x - frac.to_f64()).abs() <= tolerance)
        .or_else(|| convs.last().copied())
        .unwrap_or_default()
}

/// Display label for a ratio: its closest rational plus the remaining error
/// in cents when that exceeds a tenth of a cent, e.g. `3/2+2.0ct`.
pub fn ratio_label(ratio: f32, n: f64) -> String {
    let approx = closest_rational(ratio as f64, n);
    let error_cents = 1200.0 * (ratio as f64 / approx.to_f64()).log2();
    if error_cents.abs() > 0.1 {
        format!("{}{:+.1}ct", approx, error_cents)
    } else {
        approx.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_continued_fraction_of_exact_rationals() {
        assert_eq!(continued_fraction(1.5, MAX_TERMS), vec![1, 2]);
        assert_eq!(continued_fraction(2.0, MAX_TERMS), vec![2]);
        assert_eq!(continued_fraction(1.25, MAX_TERMS), vec![1, 4]);
        assert_eq!(continued_fraction(0.5, MAX_TERMS), vec![0, 2]);
    }

    #[test]
    fn test_continued_fraction_respects_term_budget() {
        let cf = continued_fraction(std::f64::consts::SQRT_2, 5);
        assert_eq!(cf, vec![1, 2, 2, 2, 2]);
        assert!(continued_fraction(f64::NAN, MAX_TERMS).is_empty());
    }

    #[test]
    fn test_convergents() {
        let convs = convergents(&[1, 2, 2, 2]);
        assert_eq!(
            convs,
            vec![
                Fraction::new(1, 1),
                Fraction::new(3, 2),
                Fraction::new(7, 5),
                Fraction::new(17, 12),
            ]
        );
    }

    #[test]
    fn test_closest_rational() {
        assert_eq!(closest_rational(1.5, 10.0), Fraction::new(3, 2));
        assert_eq!(closest_rational(1.25, 35.0), Fraction::new(5, 4));

        // 12-TET fifth snaps to 3/2 with a 7-note scale bound
        let fifth = 2f64.powf(7.0 / 12.0);
        assert_eq!(closest_rational(fifth, 35.0), Fraction::new(3, 2));

        // 12-TET major third is too far from 5/4 for a tight bound
        let third = 2f64.powf(4.0 / 12.0);
        assert_eq!(closest_rational(third, 35.0), Fraction::new(5, 4));
        assert_ne!(closest_rational(third, 1000.0), Fraction::new(5, 4));
    }

    #[test]
    fn test_closest_rational_degrades_gracefully() {
        assert_eq!(closest_rational(f64::INFINITY, 10.0), Fraction::new(0, 1));

        // an impossible tolerance still returns a convergent
        let pi = closest_rational(std::f64::consts::PI, f64::INFINITY);
        assert!((pi.to_f64() - std::f64::consts::PI).abs() < 1e-9);
    }

    #[test]
    fn test_ratio_label() {
        assert_eq!(ratio_label(1.5, 35.0), "3/2");
        assert_eq!(ratio_label(2f32.powf(7.0 / 12.0), 35.0), "3/2-2.0ct");
        assert_eq!(ratio_label(2f32.powf(4.0 / 12.0), 35.0), "5/4+13.7ct");
    }
}
