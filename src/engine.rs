//! Charging simulation engine for Galvani
//!
//! Pure per-tick energy computation against a tapering charge curve, plus
//! the sample-based power estimator used to fill telemetry gaps. The engine
//! holds no state of its own; the coordinator owns the session and hands
//! values in.

use std::time::Instant;

/// Result of advancing the simulation by one tick
#[derive(Debug, Clone, Copy)]
pub struct TickOutcome {
    /// Capacity after the tick, clamped to the battery maximum
    pub new_capacity_kwh: f64,

    /// Energy actually delivered this tick (post-clamp delta)
    pub delivered_kwh: f64,

    /// Power applied during the tick
    pub power_kw: f64,

    /// State of charge after the tick, percent
    pub new_soc: f64,

    /// Whether the pre-tick SOC had already reached the target
    pub target_reached: bool,
}

/// Effective power cap: the weaker of vehicle and charger limits
pub fn power_cap(charger_power_kw: f64, vehicle_max_power_kw: Option<f64>) -> f64 {
    match vehicle_max_power_kw {
        Some(v) => charger_power_kw.max(0.0).min(v.max(0.0)),
        None => charger_power_kw.max(0.0),
    }
}

/// Tapering factor applied to the power cap at a given SOC
pub fn taper_factor(soc: f64) -> f64 {
    if soc >= 95.0 {
        0.2
    } else if soc >= 90.0 {
        0.4
    } else if soc >= 80.0 {
        // Linear taper from 1.0 at 80% down to 0.7 at 90%
        1.0 - ((soc - 80.0) / 10.0) * 0.3
    } else {
        1.0
    }
}

/// Advance the simulation by one tick.
///
/// The target-reached flag compares the *pre-tick* SOC against the target,
/// so the tick that crosses the threshold still delivers its energy and the
/// following tick reports the crossing.
pub fn simulate_tick(
    charger_power_kw: f64,
    vehicle_max_power_kw: Option<f64>,
    current_capacity_kwh: f64,
    max_capacity_kwh: f64,
    target_soc: f64,
    tick_seconds: f64,
) -> TickOutcome {
    let cap = power_cap(charger_power_kw, vehicle_max_power_kw);
    let soc = (current_capacity_kwh / max_capacity_kwh) * 100.0;
    let power_kw = cap * taper_factor(soc);

    let kwh_consumed = power_kw * (tick_seconds / 3600.0);
    let new_capacity_kwh = max_capacity_kwh.min(current_capacity_kwh + kwh_consumed);
    let delivered_kwh = new_capacity_kwh - current_capacity_kwh;
    let new_soc = (new_capacity_kwh / max_capacity_kwh) * 100.0;

    TickOutcome {
        new_capacity_kwh,
        delivered_kwh,
        power_kw,
        new_soc,
        target_reached: soc >= target_soc,
    }
}

/// Round a value to two decimals for the reporting boundary
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Power estimator for SOC-sample telemetry.
///
/// Derives power from the rate of session-energy change between samples and
/// holds the last positive estimate over short gaps so telemetry does not
/// flicker to zero on network jitter.
#[derive(Debug, Clone)]
pub struct PowerEstimator {
    last_sample_at: Option<Instant>,
    last_energy_kwh: f64,
    last_power_kw: Option<f64>,
    last_power_at: Option<Instant>,
    hold_seconds: f64,
}

impl PowerEstimator {
    /// Create a new estimator with the given hold window
    pub fn new(hold_seconds: f64) -> Self {
        Self {
            last_sample_at: None,
            last_energy_kwh: 0.0,
            last_power_kw: None,
            last_power_at: None,
            hold_seconds,
        }
    }

    /// Drop the accumulated trace (e.g. when new session specs arrive)
    pub fn reset(&mut self) {
        self.last_sample_at = None;
        self.last_energy_kwh = 0.0;
        self.last_power_kw = None;
        self.last_power_at = None;
    }

    /// Feed one session-energy sample and return the power estimate, if any.
    ///
    /// An estimate is accepted only for sample gaps in (0.2 s, 5 s) with a
    /// non-negative energy delta, clamped to `[0, power_cap_kw]`. Otherwise
    /// the last positive estimate is returned while it is younger than the
    /// hold window.
    pub fn observe(&mut self, energy_kwh: f64, now: Instant, power_cap_kw: f64) -> Option<f64> {
        let mut power_kw: Option<f64> = None;

        if let Some(last_at) = self.last_sample_at {
            let dt = now.duration_since(last_at).as_secs_f64();
            let de = energy_kwh - self.last_energy_kwh;

            if dt > 0.2 && dt < 5.0 && de >= 0.0 {
                let estimate = (de * 3600.0 / dt).clamp(0.0, power_cap_kw.max(0.0));
                power_kw = Some(estimate);

                if estimate > 0.0 {
                    self.last_power_kw = Some(estimate);
                    self.last_power_at = Some(now);
                }
            }
        }

        if power_kw.unwrap_or(0.0) == 0.0
            && let (Some(held), Some(held_at)) = (self.last_power_kw, self.last_power_at)
        {
            if held > 0.0 && now.duration_since(held_at).as_secs_f64() <= self.hold_seconds {
                power_kw = Some(held);
            } else {
                self.last_power_kw = None;
            }
        }

        self.last_sample_at = Some(now);
        self.last_energy_kwh = energy_kwh;
        power_kw
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn taper_boundaries_match_curve() {
        assert!((taper_factor(50.0) - 1.0).abs() < 1e-12);
        assert!((taper_factor(79.99) - 1.0).abs() < 1e-12);
        assert!((taper_factor(80.0) - 1.0).abs() < 1e-12);
        // 85% -> 1 - (5/10)*0.3 = 0.85
        assert!((taper_factor(85.0) - 0.85).abs() < 1e-12);
        assert!((taper_factor(90.0) - 0.4).abs() < 1e-12);
        assert!((taper_factor(95.0) - 0.2).abs() < 1e-12);
        assert!((taper_factor(100.0) - 0.2).abs() < 1e-12);
    }

    #[test]
    fn mid_taper_power_example() {
        // 50 kW cap at 85% SOC tapers to 42.5 kW
        let out = simulate_tick(50.0, None, 170.0, 200.0, 100.0, 1.0);
        assert!((out.power_kw - 42.5).abs() < 1e-9);
    }

    #[test]
    fn power_cap_uses_weaker_limit() {
        assert!((power_cap(50.0, Some(11.0)) - 11.0).abs() < f64::EPSILON);
        assert!((power_cap(7.4, Some(150.0)) - 7.4).abs() < f64::EPSILON);
        assert!((power_cap(22.0, None) - 22.0).abs() < f64::EPSILON);
    }

    #[test]
    fn capacity_clamped_at_maximum() {
        // One 1 s tick at 50 kW would add ~13.9 Wh; battery has 5 Wh left
        let out = simulate_tick(50.0, None, 99.995, 100.0, 100.0, 1.0);
        assert!((out.new_capacity_kwh - 100.0).abs() < 1e-12);
        assert!((out.delivered_kwh - 0.005).abs() < 1e-9);
    }

    #[test]
    fn delivered_energy_is_post_clamp_delta() {
        let out = simulate_tick(50.0, None, 100.0, 200.0, 100.0, 1.0);
        let expected = 50.0 / 3600.0;
        assert!((out.delivered_kwh - expected).abs() < 1e-12);
        assert!(!out.target_reached);
    }

    #[test]
    fn target_reached_uses_pre_tick_soc() {
        // Pre-tick SOC exactly at target: energy still delivered, flag set
        let out = simulate_tick(50.0, None, 160.0, 200.0, 80.0, 1.0);
        assert!(out.target_reached);
        assert!(out.delivered_kwh > 0.0);

        // Just below target: no flag yet
        let out = simulate_tick(50.0, None, 159.99, 200.0, 80.0, 1.0);
        assert!(!out.target_reached);
    }

    #[test]
    fn round2_reporting() {
        assert!((round2(42.4999) - 42.5).abs() < 1e-12);
        assert!((round2(0.005) - 0.01).abs() < 1e-12);
    }

    #[test]
    fn estimator_accepts_plausible_samples() {
        let mut est = PowerEstimator::new(3.0);
        let t0 = Instant::now();
        assert!(est.observe(0.0, t0, 50.0).is_none());

        // 10 Wh in 1 s -> 36 kW
        let t1 = t0 + Duration::from_secs(1);
        let p = est.observe(0.010, t1, 50.0).unwrap();
        assert!((p - 36.0).abs() < 1e-9);
    }

    #[test]
    fn estimator_clamps_to_cap() {
        let mut est = PowerEstimator::new(3.0);
        let t0 = Instant::now();
        est.observe(0.0, t0, 11.0);
        let p = est.observe(0.020, t0 + Duration::from_secs(1), 11.0).unwrap();
        assert!((p - 11.0).abs() < 1e-9);
    }

    #[test]
    fn estimator_rejects_out_of_window_gaps() {
        let mut est = PowerEstimator::new(3.0);
        let t0 = Instant::now();
        est.observe(0.0, t0, 50.0);
        // 6 s gap is outside the (0.2, 5) window and nothing is held yet
        assert!(est.observe(0.010, t0 + Duration::from_secs(6), 50.0).is_none());
    }

    #[test]
    fn estimator_holds_last_positive_estimate() {
        let mut est = PowerEstimator::new(3.0);
        let t0 = Instant::now();
        est.observe(0.0, t0, 50.0);
        let t1 = t0 + Duration::from_secs(1);
        let p = est.observe(0.010, t1, 50.0).unwrap();
        assert!(p > 0.0);

        // No energy progress: estimate is 0 but the hold window bridges it
        let t2 = t1 + Duration::from_secs(2);
        let held = est.observe(0.010, t2, 50.0).unwrap();
        assert!((held - p).abs() < 1e-9);

        // Past the hold window the held value is discarded and the fresh
        // zero estimate is reported as-is
        let t3 = t2 + Duration::from_secs(4);
        let p = est.observe(0.010, t3, 50.0).unwrap();
        assert!(p.abs() < 1e-12);
    }
}
