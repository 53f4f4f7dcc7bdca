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

use std::fs::read_to_string;
use std::path::Path;

use chrono::TimeDelta;
use serde::Deserialize;

use crate::error::Fallible;
use crate::error::fail;
use crate::types::rating::Rating;

/// The reference FSRS-5 weights.
pub const DEFAULT_WEIGHTS: [f64; 19] = [
    0.40255, 1.18385, 3.173, 15.69105, 7.1949, 0.5345, 1.4604, 0.0046, 1.54575, 0.1192, 1.01925,
    1.9395, 0.11, 0.29605, 2.2698, 0.2315, 2.9898, 0.51655, 0.6621,
];

/// Parameters of the memory model and the scheduler. Every field can be
/// overridden from a TOML document; missing fields take their defaults.
#[derive(Clone, PartialEq, Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FsrsConfig {
    /// The weight vector. The first four are the initial stabilities.
    pub weights: [f64; 19],
    /// Forgetting curve shape constant.
    pub factor: f64,
    /// Forgetting curve exponent.
    pub decay: f64,
    /// The desired recall probability at the due date.
    pub request_retention: f64,
    /// The longest interval the scheduler will produce, in days.
    pub max_interval: u32,
    /// Floor for stability after every update.
    pub minimal_stability: f64,
    /// Minutes until the first re-test of a new card, by rating.
    pub learning_steps: [u32; 4],
    /// Minutes until the re-test of a card that was just forgotten.
    pub relearning_step: u32,
}

impl Default for FsrsConfig {
    fn default() -> Self {
        Self {
            weights: DEFAULT_WEIGHTS,
            factor: 19.0 / 81.0,
            decay: -0.5,
            request_retention: 0.9,
            max_interval: 355,
            minimal_stability: 0.01,
            learning_steps: [1, 5, 10, 15],
            relearning_step: 5,
        }
    }
}

impl FsrsConfig {
    /// Parse and validate a configuration from TOML source.
    pub fn from_toml(source: &str) -> Fallible<Self> {
        let config: FsrsConfig = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse, and validate a configuration file.
    pub fn load(path: &Path) -> Fallible<Self> {
        log::debug!("Loading scheduler configuration from {}", path.display());
        let source = read_to_string(path)?;
        Self::from_toml(&source)
    }

    pub fn validate(&self) -> Fallible<()> {
        if let Some(index) = self.weights.iter().position(|w| !w.is_finite()) {
            return fail(format!("weight {index} is not a finite number."));
        }
        if !self.factor.is_finite() || self.factor <= 0.0 {
            return fail("factor must be positive.");
        }
        if !self.decay.is_finite() || self.decay >= 0.0 {
            return fail("decay must be negative.");
        }
        if !(self.request_retention > 0.0 && self.request_retention < 1.0) {
            return fail("request_retention must be between 0 and 1, exclusive.");
        }
        if self.max_interval < 1 {
            return fail("max_interval must be at least one day.");
        }
        if !(self.minimal_stability > 0.0) {
            return fail("minimal_stability must be positive.");
        }
        if self.learning_steps.contains(&0) || self.relearning_step == 0 {
            return fail("learning steps must be at least one minute.");
        }
        Ok(())
    }

    pub fn max_interval_duration(&self) -> TimeDelta {
        TimeDelta::days(self.max_interval as i64)
    }

    /// The short-term interval for a new card entering learning.
    pub fn learning_step(&self, rating: Rating) -> TimeDelta {
        let minutes = self.learning_steps[(rating.grade() - 1) as usize];
        TimeDelta::minutes(minutes as i64)
    }

    /// The short-term interval after a failed recall of a reviewed card.
    pub fn relearning_step_duration(&self) -> TimeDelta {
        TimeDelta::minutes(self.relearning_step as i64)
    }
}
