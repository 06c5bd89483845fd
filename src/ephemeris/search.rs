//! Root and maximum finding over time.
//!
//! Every search steps a fixed number of times and then refines, so all of
//! them terminate.

use chrono::{DateTime, Duration, Utc};

use crate::errors::AppResult;

/// Golden ratio conjugate
const INV_PHI: f64 = 0.618_033_988_749_895;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchDirection {
    Next,
    Previous,
}

/// Which way the function passes through zero, in forward time
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slope {
    Rising,
    Falling,
}

fn offset(t: DateTime<Utc>, seconds: f64) -> DateTime<Utc> {
    t + Duration::milliseconds((seconds * 1000.0).round() as i64)
}

fn span_seconds(lo: DateTime<Utc>, hi: DateTime<Utc>) -> f64 {
    (hi - lo).num_milliseconds() as f64 / 1000.0
}

/// Narrow a sign change of `f` between `lo` and `hi` down to `tolerance`.
/// Returns the end of the final bracket, where `f` has the sign it had at
/// `hi`.
pub fn bisect<F>(
    mut f: F,
    mut lo: DateTime<Utc>,
    mut hi: DateTime<Utc>,
    tolerance: Duration,
) -> AppResult<DateTime<Utc>>
where
    F: FnMut(DateTime<Utc>) -> AppResult<f64>,
{
    let lo_positive = f(lo)? > 0.0;
    while hi - lo > tolerance {
        let mid = offset(lo, span_seconds(lo, hi) / 2.0);
        if (f(mid)? > 0.0) == lo_positive {
            lo = mid;
        } else {
            hi = mid;
        }
    }
    Ok(hi)
}

/// Settings for a stepped zero-crossing scan
#[derive(Debug, Clone, Copy)]
pub struct CrossingScan {
    pub step: Duration,
    pub steps: usize,
    pub tolerance: Duration,
    /// Largest believable change of `f` over one step. Bigger jumps are
    /// wrap-arounds of an angle, not crossings.
    pub max_jump: Option<f64>,
}

impl CrossingScan {
    /// Instant where `f` crosses zero with the given slope. For
    /// `Next` this is the first such instant after `from`; for `Previous` the
    /// last one at or before `from`. `None` when the scan window holds none.
    pub fn find<F>(
        &self,
        mut f: F,
        from: DateTime<Utc>,
        slope: Slope,
        direction: SearchDirection,
    ) -> AppResult<Option<DateTime<Utc>>>
    where
        F: FnMut(DateTime<Utc>) -> AppResult<f64>,
    {
        let sign = match direction {
            SearchDirection::Next => 1,
            SearchDirection::Previous => -1,
        };
        let mut t0 = from;
        let mut f0 = f(t0)?;
        for _ in 0..self.steps {
            let t1 = t0 + self.step * sign;
            let f1 = f(t1)?;
            // order the bracket forward in time
            let (early, f_early, late, f_late) = match direction {
                SearchDirection::Next => (t0, f0, t1, f1),
                SearchDirection::Previous => (t1, f1, t0, f0),
            };
            let crosses = match slope {
                // a zero at `from` belongs to Previous, never to Next
                Slope::Rising => f_early < 0.0 && f_late >= 0.0,
                Slope::Falling => f_early > 0.0 && f_late <= 0.0,
            };
            let plausible = self
                .max_jump
                .map_or(true, |max| (f_late - f_early).abs() < max);
            if crosses && plausible {
                return bisect(&mut f, early, late, self.tolerance).map(Some);
            }
            t0 = t1;
            f0 = f1;
        }
        Ok(None)
    }
}

/// Golden-section search for the maximum of a unimodal `f` on `[lo, hi]`
pub fn maximize<F>(
    mut f: F,
    lo: DateTime<Utc>,
    hi: DateTime<Utc>,
    tolerance: Duration,
) -> AppResult<(DateTime<Utc>, f64)>
where
    F: FnMut(DateTime<Utc>) -> AppResult<f64>,
{
    let tol = tolerance.num_milliseconds() as f64 / 1000.0;
    let (mut a, mut b) = (0.0, span_seconds(lo, hi));
    let mut c = b - INV_PHI * (b - a);
    let mut d = a + INV_PHI * (b - a);
    let mut fc = f(offset(lo, c))?;
    let mut fd = f(offset(lo, d))?;
    while b - a > tol {
        if fc > fd {
            b = d;
            d = c;
            fd = fc;
            c = b - INV_PHI * (b - a);
            fc = f(offset(lo, c))?;
        } else {
            a = c;
            c = d;
            fc = fd;
            d = a + INV_PHI * (b - a);
            fd = f(offset(lo, d))?;
        }
    }
    let t = offset(lo, (a + b) / 2.0);
    Ok((t, f(t)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
    }

    fn hours(t: DateTime<Utc>) -> f64 {
        span_seconds(t0(), t) / 3600.0
    }

    #[test]
    fn test_bisect_finds_root() {
        // f = hours - 5.25
        let root = bisect(
            |t| Ok(hours(t) - 5.25),
            t0(),
            t0() + Duration::hours(10),
            Duration::seconds(1),
        )
        .unwrap();
        assert!((hours(root) - 5.25).abs() < 1.0 / 3600.0);
        assert!(hours(root) >= 5.25);
    }

    #[test]
    fn test_scan_next_and_previous() {
        // sine with a 24 h period: rises through zero at 0h, 24h, ...
        let f = |t: DateTime<Utc>| Ok((hours(t) / 24.0 * std::f64::consts::TAU).sin());
        let scan = CrossingScan {
            step: Duration::minutes(10),
            steps: 6 * 48,
            tolerance: Duration::seconds(1),
            max_jump: None,
        };
        let from = t0() + Duration::hours(3);
        let next = scan.find(f, from, Slope::Rising, SearchDirection::Next).unwrap().unwrap();
        assert!((hours(next) - 24.0).abs() < 0.001);
        let prev = scan
            .find(f, from, Slope::Rising, SearchDirection::Previous)
            .unwrap()
            .unwrap();
        assert!(hours(prev).abs() < 0.001);
        let set = scan.find(f, from, Slope::Falling, SearchDirection::Next).unwrap().unwrap();
        assert!((hours(set) - 12.0).abs() < 0.001);
    }

    #[test]
    fn test_crossing_exactly_at_start() {
        let f = |t: DateTime<Utc>| Ok((hours(t) / 24.0 * std::f64::consts::TAU).sin());
        let scan = CrossingScan {
            step: Duration::minutes(10),
            steps: 6 * 48,
            tolerance: Duration::seconds(1),
            max_jump: None,
        };
        let prev = scan
            .find(f, t0(), Slope::Rising, SearchDirection::Previous)
            .unwrap()
            .unwrap();
        assert_eq!(prev, t0());
        let next = scan.find(f, t0(), Slope::Rising, SearchDirection::Next).unwrap().unwrap();
        assert!((hours(next) - 24.0).abs() < 0.001);
    }

    #[test]
    fn test_scan_reports_none_when_no_crossing() {
        let scan = CrossingScan {
            step: Duration::minutes(10),
            steps: 100,
            tolerance: Duration::seconds(1),
            max_jump: None,
        };
        let found = scan
            .find(|_| Ok(1.0), t0(), Slope::Rising, SearchDirection::Next)
            .unwrap();
        assert!(found.is_none());
    }

    #[test]
    fn test_scan_ignores_wraparound() {
        // decreasing angle wrapping from -180 to +180 looks like a rise
        let f = |t: DateTime<Utc>| {
            let x = -10.0 * hours(t) - 175.0;
            Ok((x + 180.0).rem_euclid(360.0) - 180.0)
        };
        let mut scan = CrossingScan {
            step: Duration::hours(1),
            steps: 10,
            tolerance: Duration::seconds(1),
            max_jump: None,
        };
        let naive = scan.find(f, t0(), Slope::Rising, SearchDirection::Next).unwrap();
        assert!(naive.is_some());

        scan.max_jump = Some(90.0);
        let guarded = scan.find(f, t0(), Slope::Rising, SearchDirection::Next).unwrap();
        assert!(guarded.is_none());
    }

    #[test]
    fn test_maximize_parabola() {
        let (t, v) = maximize(
            |t| Ok(-(hours(t) - 2.5).powi(2) + 4.0),
            t0(),
            t0() + Duration::hours(6),
            Duration::seconds(1),
        )
        .unwrap();
        assert!((hours(t) - 2.5).abs() < 1.0 / 3600.0);
        assert!((v - 4.0).abs() < 1e-6);
    }
}
