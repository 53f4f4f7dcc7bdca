// Copyright 2025 Fernando Borretti
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! The FSRS memory model: difficulty, stability, and retrievability, and
//! the interval implied by a stability.

use chrono::TimeDelta;

use crate::config::FsrsConfig;
use crate::types::card::Card;
use crate::types::card::CardParams;
use crate::types::card::CardStatus;
use crate::types::card::MemoryState;
use crate::types::rating::Rating;
use crate::types::timestamp::Timestamp;

/// Probability of recall, in (0, 1].
pub type Retrievability = f64;
/// Days until retrievability decays to the requested retention.
pub type Stability = f64;
/// How hard an item is to retain, in [1, 10].
pub type Difficulty = f64;

const MILLISECONDS_PER_DAY: f64 = 86_400_000.0;

#[derive(Clone, Debug, Default)]
pub struct Fsrs {
    config: FsrsConfig,
}

impl Fsrs {
    pub fn new(config: FsrsConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &FsrsConfig {
        &self.config
    }

    fn w(&self, index: usize) -> f64 {
        self.config.weights[index]
    }

    pub fn initial_difficulty(&self, rating: Rating) -> Difficulty {
        let g: f64 = rating.into();
        clamp_d(self.w(4) - f64::exp(self.w(5) * (g - 1.0)) + 1.0)
    }

    pub fn initial_stability(&self, rating: Rating) -> Stability {
        self.w((rating.grade() - 1) as usize)
    }

    /// Retrievability after `elapsed` has passed on a card of stability `s`.
    pub fn forgetting_curve(&self, elapsed: TimeDelta, s: Stability) -> Retrievability {
        let t = fractional_days(elapsed);
        (1.0 + self.config.factor * t / s).powf(self.config.decay)
    }

    pub fn next_difficulty(&self, d: Difficulty, rating: Rating) -> Difficulty {
        let g: f64 = rating.into();
        let delta = -self.w(6) * (g - 3.0);
        // Linear damping: steps shrink as difficulty approaches 10.
        let raw = d + delta * (10.0 - d) / 9.0;
        let w7 = self.w(7);
        clamp_d(w7 * self.initial_difficulty(Rating::Easy) + (1.0 - w7) * raw)
    }

    /// Stability update within the same day, used while learning or
    /// relearning.
    pub fn short_term_stability(&self, s: Stability, rating: Rating) -> Stability {
        let g: f64 = rating.into();
        s * f64::exp(self.w(17) * (g - 3.0 + self.w(18)))
    }

    /// Stability after a card in review is forgotten.
    pub fn forget_stability(&self, d: Difficulty, s: Stability, r: Retrievability) -> Stability {
        self.w(11)
            * d.powf(-self.w(12))
            * ((s + 1.0).powf(self.w(13)) - 1.0)
            * f64::exp(self.w(14) * (1.0 - r))
    }

    /// Stability after a card in review is recalled.
    pub fn recall_stability(
        &self,
        d: Difficulty,
        s: Stability,
        r: Retrievability,
        rating: Rating,
    ) -> Stability {
        let multiplier = match rating {
            Rating::Hard => self.w(15),
            Rating::Easy => self.w(16),
            _ => 1.0,
        };
        let t_d = 11.0 - d;
        let t_s = s.powf(-self.w(9));
        let t_r = f64::exp(self.w(10) * (1.0 - r)) - 1.0;
        s * (f64::exp(self.w(8)) * t_d * t_s * t_r * multiplier + 1.0)
    }

    /// Dispatches on the card's current status, and floors the result. A NaN
    /// is passed through so that `next_interval` can saturate it.
    pub fn next_stability(
        &self,
        state: &MemoryState,
        status: CardStatus,
        rating: Rating,
        r: Retrievability,
    ) -> Stability {
        let s = match status {
            CardStatus::New => panic!("a new card has no stability to update"),
            CardStatus::Learning | CardStatus::Relearning => {
                self.short_term_stability(state.stability, rating)
            }
            CardStatus::Review => match rating {
                Rating::Again => self.forget_stability(state.difficulty, state.stability, r),
                _ => self.recall_stability(state.difficulty, state.stability, r, rating),
            },
        };
        if s.is_nan() {
            s
        } else {
            s.max(self.config.minimal_stability)
        }
    }

    /// The memory state after reviewing `card` with `rating` at
    /// `review_time`.
    ///
    /// # Panics
    ///
    /// If the card's status and params disagree on whether it is new.
    pub fn updated_params(
        &self,
        card: &Card,
        rating: Rating,
        review_time: Timestamp,
    ) -> MemoryState {
        match (card.params(), card.status()) {
            (CardParams::New, CardStatus::New) => MemoryState {
                difficulty: self.initial_difficulty(rating),
                stability: self.initial_stability(rating),
                review_time,
            },
            (CardParams::Existing(state), status) if status != CardStatus::New => {
                let difficulty = self.next_difficulty(state.difficulty, rating);
                // Short-term re-tests have not reached their due time yet,
                // so the scheduled interval stands in for elapsed time.
                let elapsed = if status.is_short_term() {
                    card.interval()
                } else {
                    review_time - state.review_time
                };
                let r = self.forgetting_curve(elapsed, state.stability);
                let stability = self.next_stability(state, status, rating, r);
                MemoryState {
                    difficulty,
                    stability,
                    review_time,
                }
            }
            (params, status) => panic!(
                "card status '{}' is inconsistent with its params: {:?}",
                status, params
            ),
        }
    }

    /// The interval at which retrievability is expected to fall to the
    /// requested retention. Whole days, in [1, max_interval].
    pub fn next_interval(&self, state: &MemoryState) -> TimeDelta {
        let max = self.config.max_interval as f64;
        let raw = 9.0 * state.stability * (1.0 / self.config.request_retention - 1.0);
        if !raw.is_finite() {
            return self.config.max_interval_duration();
        }
        let days = raw.round().clamp(1.0, max);
        TimeDelta::days(days as i64)
    }

    /// Current retrievability of a reviewed card. `None` for new cards.
    pub fn retrievability(&self, card: &Card, now: Timestamp) -> Option<Retrievability> {
        card.memory_state()
            .map(|state| self.forgetting_curve(now - state.review_time, state.stability))
    }
}

fn clamp_d(d: Difficulty) -> Difficulty {
    d.clamp(1.0, 10.0)
}

fn fractional_days(elapsed: TimeDelta) -> f64 {
    elapsed.num_milliseconds() as f64 / MILLISECONDS_PER_DAY
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use chrono::Utc;

    use super::*;
    use crate::error::Fallible;

    fn approx_eq(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    fn t0() -> Timestamp {
        Timestamp::new(Utc.with_ymd_and_hms(2022, 11, 29, 12, 30, 0).unwrap())
    }

    fn state(difficulty: f64, stability: f64) -> MemoryState {
        MemoryState {
            difficulty,
            stability,
            review_time: t0(),
        }
    }

    #[test]
    fn test_initial_difficulty() {
        let fsrs = Fsrs::default();
        assert!(approx_eq(fsrs.initial_difficulty(Rating::Again), 7.1949));
        assert!(approx_eq(
            fsrs.initial_difficulty(Rating::Hard),
            6.488305268471453
        ));
        assert!(approx_eq(
            fsrs.initial_difficulty(Rating::Good),
            5.282434422319005
        ));
        assert!(approx_eq(
            fsrs.initial_difficulty(Rating::Easy),
            3.2245015893713678
        ));
    }

    #[test]
    fn test_initial_difficulty_is_clamped() {
        let mut config = FsrsConfig::default();
        config.weights[4] = 20.0;
        let fsrs = Fsrs::new(config.clone());
        assert_eq!(fsrs.initial_difficulty(Rating::Again), 10.0);
        config.weights[4] = -5.0;
        let fsrs = Fsrs::new(config);
        assert_eq!(fsrs.initial_difficulty(Rating::Easy), 1.0);
    }

    #[test]
    fn test_initial_stability() {
        let fsrs = Fsrs::default();
        assert_eq!(fsrs.initial_stability(Rating::Again), 0.40255);
        assert_eq!(fsrs.initial_stability(Rating::Hard), 1.18385);
        assert_eq!(fsrs.initial_stability(Rating::Good), 3.173);
        assert_eq!(fsrs.initial_stability(Rating::Easy), 15.69105);
    }

    #[test]
    fn test_forgetting_curve() {
        let fsrs = Fsrs::default();
        assert_eq!(fsrs.forgetting_curve(TimeDelta::zero(), 3.0), 1.0);
        // At t = S, retrievability equals the requested retention.
        assert!(approx_eq(fsrs.forgetting_curve(TimeDelta::days(3), 3.0), 0.9));
        let half_day = fsrs.forgetting_curve(TimeDelta::hours(12), 3.0);
        assert!(half_day < 1.0 && half_day > 0.9);
    }

    #[test]
    fn test_next_difficulty() {
        let fsrs = Fsrs::default();
        assert!(approx_eq(
            fsrs.next_difficulty(5.0, Rating::Again),
            6.607035107311108
        ));
        assert!(approx_eq(
            fsrs.next_difficulty(5.0, Rating::Hard),
            5.7994339073111085
        ));
        assert!(approx_eq(
            fsrs.next_difficulty(5.0, Rating::Good),
            4.991832707311108
        ));
        assert!(approx_eq(
            fsrs.next_difficulty(5.0, Rating::Easy),
            4.184231507311108
        ));
    }

    #[test]
    fn test_next_difficulty_bounds() {
        let fsrs = Fsrs::default();
        let mut d = fsrs.initial_difficulty(Rating::Again);
        for _ in 0..100 {
            d = fsrs.next_difficulty(d, Rating::Again);
            assert!((1.0..=10.0).contains(&d));
        }
        let mut d = fsrs.initial_difficulty(Rating::Easy);
        for _ in 0..100 {
            d = fsrs.next_difficulty(d, Rating::Easy);
            assert!((1.0..=10.0).contains(&d));
        }
        assert_eq!(fsrs.next_difficulty(1.0, Rating::Easy), 1.0);
    }

    #[test]
    fn test_short_term_stability() {
        let fsrs = Fsrs::default();
        assert!(approx_eq(
            fsrs.short_term_stability(3.173, Rating::Good),
            4.466858064362218
        ));
        assert!(approx_eq(
            fsrs.short_term_stability(3.173, Rating::Again),
            1.589763507266002
        ));
    }

    #[test]
    fn test_forget_stability() {
        let fsrs = Fsrs::default();
        let s = fsrs.forget_stability(5.0, 10.0, 0.9);
        assert!(approx_eq(s, 2.107696257677866));
        assert!(s < 10.0);
    }

    #[test]
    fn test_recall_stability() {
        let fsrs = Fsrs::default();
        let hard = fsrs.recall_stability(5.0, 10.0, 0.9, Rating::Hard);
        let good = fsrs.recall_stability(5.0, 10.0, 0.9, Rating::Good);
        let easy = fsrs.recall_stability(5.0, 10.0, 0.9, Rating::Easy);
        assert!(approx_eq(hard, 15.31391211425268));
        assert!(approx_eq(good, 32.954263992452184));
        assert!(approx_eq(easy, 78.62865848463353));
        assert!(10.0 < hard && hard < good && good < easy);
    }

    #[test]
    fn test_recall_at_full_retrievability_keeps_stability() {
        let fsrs = Fsrs::default();
        assert_eq!(fsrs.recall_stability(5.0, 10.0, 1.0, Rating::Good), 10.0);
    }

    #[test]
    fn test_next_stability_dispatch() {
        let fsrs = Fsrs::default();
        let st = state(5.0, 10.0);
        assert_eq!(
            fsrs.next_stability(&st, CardStatus::Learning, Rating::Good, 0.9),
            fsrs.short_term_stability(10.0, Rating::Good)
        );
        assert_eq!(
            fsrs.next_stability(&st, CardStatus::Relearning, Rating::Again, 0.9),
            fsrs.short_term_stability(10.0, Rating::Again)
        );
        assert_eq!(
            fsrs.next_stability(&st, CardStatus::Review, Rating::Again, 0.9),
            fsrs.forget_stability(5.0, 10.0, 0.9)
        );
        assert_eq!(
            fsrs.next_stability(&st, CardStatus::Review, Rating::Easy, 0.9),
            fsrs.recall_stability(5.0, 10.0, 0.9, Rating::Easy)
        );
    }

    #[test]
    fn test_next_stability_floor() {
        let fsrs = Fsrs::default();
        let st = state(10.0, 0.01);
        for rating in Rating::ALL {
            for status in [
                CardStatus::Learning,
                CardStatus::Review,
                CardStatus::Relearning,
            ] {
                assert!(fsrs.next_stability(&st, status, rating, 0.0) >= 0.01);
            }
        }
    }

    #[test]
    fn test_next_stability_keeps_nan() {
        let mut config = FsrsConfig::default();
        config.weights[8] = 800.0;
        config.validate().unwrap();
        let fsrs = Fsrs::new(config);
        // exp(800) overflows, and full retrievability multiplies it by zero.
        let s = fsrs.next_stability(&state(5.0, 10.0), CardStatus::Review, Rating::Good, 1.0);
        assert!(s.is_nan());
        assert_eq!(
            fsrs.next_interval(&state(5.0, s)),
            TimeDelta::days(355)
        );
    }

    #[test]
    #[should_panic]
    fn test_next_stability_of_new_card() {
        let fsrs = Fsrs::default();
        fsrs.next_stability(&state(5.0, 1.0), CardStatus::New, Rating::Good, 1.0);
    }

    #[test]
    fn test_updated_params_of_new_card() {
        let fsrs = Fsrs::default();
        let state = fsrs.updated_params(&Card::new(), Rating::Hard, t0());
        assert_eq!(state.difficulty, fsrs.initial_difficulty(Rating::Hard));
        assert_eq!(state.stability, fsrs.initial_stability(Rating::Hard));
        assert_eq!(state.review_time, t0());
    }

    #[test]
    fn test_updated_params_in_review_uses_elapsed_time() -> Fallible<()> {
        let fsrs = Fsrs::default();
        let card = Card::from_parts(
            CardParams::Existing(state(5.0, 10.0)),
            CardStatus::Review,
            TimeDelta::days(1),
            0,
            1,
        )?;
        let now = t0() + TimeDelta::days(10);
        let updated = fsrs.updated_params(&card, Rating::Good, now);
        assert!(approx_eq(updated.stability, 32.954263992452184));
        assert!(approx_eq(updated.difficulty, 4.991832707311108));
        assert_eq!(updated.review_time, now);
        Ok(())
    }

    #[test]
    fn test_updated_params_in_learning_ignores_elapsed_time() -> Fallible<()> {
        let fsrs = Fsrs::default();
        let card = Card::from_parts(
            CardParams::Existing(state(5.0, 3.173)),
            CardStatus::Learning,
            TimeDelta::minutes(10),
            0,
            1,
        )?;
        let soon = fsrs.updated_params(&card, Rating::Good, t0() + TimeDelta::minutes(10));
        let late = fsrs.updated_params(&card, Rating::Good, t0() + TimeDelta::days(30));
        assert_eq!(soon.stability, late.stability);
        assert!(approx_eq(soon.stability, 4.466858064362218));
        Ok(())
    }

    #[test]
    fn test_next_interval() {
        let fsrs = Fsrs::default();
        assert_eq!(fsrs.next_interval(&state(5.0, 3.173)), TimeDelta::days(3));
        assert_eq!(fsrs.next_interval(&state(5.0, 4.5)), TimeDelta::days(5));
        assert_eq!(fsrs.next_interval(&state(5.0, 14.2)), TimeDelta::days(14));
    }

    #[test]
    fn test_next_interval_bounds() {
        let fsrs = Fsrs::default();
        assert_eq!(fsrs.next_interval(&state(5.0, 0.01)), TimeDelta::days(1));
        assert_eq!(fsrs.next_interval(&state(5.0, 5000.0)), TimeDelta::days(355));
    }

    #[test]
    fn test_next_interval_non_finite() {
        let fsrs = Fsrs::default();
        assert_eq!(
            fsrs.next_interval(&state(5.0, f64::NAN)),
            TimeDelta::days(355)
        );
        assert_eq!(
            fsrs.next_interval(&state(5.0, f64::INFINITY)),
            TimeDelta::days(355)
        );
    }

    #[test]
    fn test_next_interval_honours_retention() {
        let mut config = FsrsConfig::default();
        config.request_retention = 0.8;
        let fsrs = Fsrs::new(config);
        // 9 * 10 * (1 / 0.8 - 1) = 22.5, rounded half up.
        assert_eq!(fsrs.next_interval(&state(5.0, 10.0)), TimeDelta::days(23));
    }

    #[test]
    fn test_retrievability() -> Fallible<()> {
        let fsrs = Fsrs::default();
        assert_eq!(fsrs.retrievability(&Card::new(), t0()), None);
        let card = Card::from_parts(
            CardParams::Existing(state(5.0, 3.0)),
            CardStatus::Review,
            TimeDelta::days(3),
            0,
            1,
        )?;
        let r = fsrs.retrievability(&card, t0() + TimeDelta::days(3));
        assert!(approx_eq(r.unwrap_or_default(), 0.9));
        Ok(())
    }
}
