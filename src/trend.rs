//! Carry-forward estimates for days between the last stored record and today.
//!
//! Estimated rows are computed on read and never persisted. Activity values
//! drift a little each day, chained so each estimate seeds the next, while
//! symptoms carry forward and hormone levels stay null.

use chrono::NaiveDate;
use rand::Rng;

use crate::models::{HealthRecord, RecordView};

pub const DEFAULT_STEPS: f64 = 5000.0;
pub const DEFAULT_STRESS_SCORE: f64 = 50.0;
pub const DEFAULT_SLEEP_MINUTES: f64 = 60.0;
pub const DEFAULT_HEART_RATE: f64 = 70.0;

/// Stress above this level recovers instead of wandering.
const STRESS_RECOVERY_THRESHOLD: f64 = 50.0;
const STRESS_RECOVERY_RATE: f64 = 0.95;

/// Lazy sequence of estimated days, one per missing date up to and including `today`.
pub struct Extrapolation<'a, R> {
    last: &'a HealthRecord,
    next_date: Option<NaiveDate>,
    today: NaiveDate,
    steps: f64,
    stress_score: f64,
    sleep_minutes: f64,
    heart_rate: f64,
    rng: R,
}

/// Starts extrapolating from `last`. Yields nothing when `last` is already today or later.
pub fn extrapolate<R: Rng>(last: &HealthRecord, today: NaiveDate, rng: R) -> Extrapolation<'_, R> {
    Extrapolation {
        last,
        next_date: last.date.succ_opt(),
        today,
        steps: last.daily_steps.unwrap_or(DEFAULT_STEPS),
        stress_score: last.stress_score.unwrap_or(DEFAULT_STRESS_SCORE),
        sleep_minutes: last.deep_sleep_minutes.unwrap_or(DEFAULT_SLEEP_MINUTES),
        heart_rate: last.avg_resting_heart_rate.unwrap_or(DEFAULT_HEART_RATE),
        rng,
    }
}

impl<R: Rng> Extrapolation<'_, R> {
    fn step(&mut self) {
        self.steps = (self.steps * self.rng.gen_range(0.9..=1.1)).trunc();

        if self.stress_score > STRESS_RECOVERY_THRESHOLD {
            self.stress_score *= STRESS_RECOVERY_RATE;
        } else {
            self.stress_score *= self.rng.gen_range(0.95..=1.05);
        }

        self.sleep_minutes *= self.rng.gen_range(0.9..=1.1);
    }
}

impl<R: Rng> Iterator for Extrapolation<'_, R> {
    type Item = RecordView;

    fn next(&mut self) -> Option<RecordView> {
        let date = self.next_date.filter(|d| *d <= self.today)?;
        self.next_date = date.succ_opt();
        self.step();

        let last = self.last;
        Some(RecordView {
            id: format!("est-{date}"),
            date,
            lh: None,
            estrogen: None,
            pdg: None,
            cramps: last.cramps,
            fatigue: last.fatigue,
            moodswing: last.moodswing,
            stress: last.stress,
            bloating: last.bloating,
            sleepissue: last.sleepissue,
            overall_score: last.overall_score,
            deep_sleep_minutes: Some(round1(self.sleep_minutes)),
            avg_resting_heart_rate: Some(self.heart_rate),
            stress_score: Some(round1(self.stress_score)),
            daily_steps: Some(self.steps),
            daily_note: None,
            sentiment_score: None,
            last_period_date: last.last_period_date,
            is_estimated: true,
            is_example: false,
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self
            .next_date
            .map(|d| (self.today - d).num_days() + 1)
            .unwrap_or(0)
            .max(0) as usize;
        (remaining, Some(remaining))
    }
}

fn round1(v: f64) -> f64 {
    (v * 10.0).round() / 10.0
}
