//! Numerical inversion of a continuous CDF.
//!
//! Safeguarded Newton iteration: a bracket `[lo, hi]` with `F(lo) <= u <= F(hi)`
//! is maintained and every Newton step that leaves it is replaced by
//! bisection, so convergence never depends on the starting point.

/// Residual `|F(x) - u|` accepted as converged, relative to `u`.
const CDF_TOLERANCE: f64 = 1e-14;

const MAX_ITERATIONS: usize = 200;

/// Doublings allowed while searching for a bracket on an unbounded side.
const MAX_EXPANSIONS: usize = 2048;

/// Returns `x` with `cdf(x) ≈ u` for `u` strictly inside `(0, 1)`.
///
/// `guess` seeds the iteration and centres the bracket search on unbounded
/// supports; `step` is the initial bracket half-width there.
pub(crate) fn invert_cdf<C, P>(
    u: f64,
    support: (f64, f64),
    guess: f64,
    step: f64,
    cdf: C,
    pdf: P,
) -> f64
where
    C: Fn(f64) -> f64,
    P: Fn(f64) -> f64,
{
    let (mut lo, mut hi) = bracket(u, support, guess, step, &cdf);

    let mut x = if guess > lo && guess < hi {
        guess
    } else {
        midpoint(lo, hi)
    };

    let tolerance = CDF_TOLERANCE * u;

    for _ in 0..MAX_ITERATIONS {
        let residual = cdf(x) - u;
        if residual.abs() <= tolerance {
            return x;
        }
        if residual < 0.0 {
            lo = x;
        } else {
            hi = x;
        }

        let width_floor = f64::EPSILON * lo.abs().max(hi.abs()).max(f64::MIN_POSITIVE);
        if hi - lo <= width_floor {
            return midpoint(lo, hi);
        }

        let density = pdf(x);
        let newton = x - residual / density;
        if density > 0.0 && newton > lo && newton < hi {
            if (newton - x).abs() <= 2.0 * f64::EPSILON * x.abs() {
                return newton;
            }
            x = newton;
        } else {
            x = midpoint(lo, hi);
        }
    }

    x
}

fn bracket<C>(u: f64, support: (f64, f64), guess: f64, step: f64, cdf: &C) -> (f64, f64)
where
    C: Fn(f64) -> f64,
{
    let (a, b) = support;
    let centre = if guess.is_finite() { guess } else { 0.0 };
    let step = if step.is_finite() && step > 0.0 { step } else { 1.0 };

    let lo = if a.is_finite() {
        a
    } else {
        let mut width = step;
        let mut lo = centre - width;
        for _ in 0..MAX_EXPANSIONS {
            if cdf(lo) <= u {
                break;
            }
            width *= 2.0;
            lo = centre - width;
        }
        lo
    };

    let hi = if b.is_finite() {
        b
    } else {
        let mut width = step;
        let mut hi = centre.max(lo) + width;
        for _ in 0..MAX_EXPANSIONS {
            if cdf(hi) >= u {
                break;
            }
            width *= 2.0;
            hi = centre.max(lo) + width;
        }
        hi
    };

    (lo, hi)
}

#[inline]
fn midpoint(lo: f64, hi: f64) -> f64 {
    lo + 0.5 * (hi - lo)
}
