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

use std::fmt::Display;
use std::fmt::Formatter;

use chrono::TimeDelta;

use crate::error::ErrorReport;
use crate::error::Fallible;
use crate::error::fail;
use crate::fsrs::Difficulty;
use crate::fsrs::Stability;
use crate::types::timestamp::Timestamp;

/// Where a card is in the review state machine.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum CardStatus {
    /// Never reviewed. Only ever the status of a fresh card.
    New,
    /// First short-term re-tests after the initial review.
    Learning,
    /// Long-term regime: intervals grow with stability.
    Review,
    /// Short-term re-tests after a lapse.
    Relearning,
}

impl CardStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CardStatus::New => "new",
            CardStatus::Learning => "learning",
            CardStatus::Review => "review",
            CardStatus::Relearning => "relearning",
        }
    }

    /// Whether the card is in one of the short-term re-test loops.
    pub fn is_short_term(&self) -> bool {
        matches!(self, CardStatus::Learning | CardStatus::Relearning)
    }
}

impl TryFrom<String> for CardStatus {
    type Error = ErrorReport;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.as_str() {
            "new" => Ok(CardStatus::New),
            "learning" => Ok(CardStatus::Learning),
            "review" => Ok(CardStatus::Review),
            "relearning" => Ok(CardStatus::Relearning),
            _ => fail(format!("Invalid card status: {}", value)),
        }
    }
}

impl Display for CardStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The memory parameters of a card.
#[derive(Clone, Copy, PartialEq, Debug)]
pub enum CardParams {
    /// The card is new, and has never been reviewed.
    New,
    /// The card has been reviewed at least once.
    Existing(MemoryState),
}

#[derive(Clone, Copy, PartialEq, Debug)]
pub struct MemoryState {
    /// How hard the item is to retain, in [1, 10].
    pub difficulty: Difficulty,
    /// Days until recall probability decays to the requested retention.
    pub stability: Stability,
    /// When the card was last reviewed.
    pub review_time: Timestamp,
}

/// One item's memory state plus bookkeeping counters.
///
/// The fields are private so that a card whose status is `New` always has
/// `New` params and vice versa. Cards are only built by [`Card::new`], by
/// the scheduler, or by [`Card::from_parts`], which checks the invariant.
#[derive(Clone, PartialEq, Debug)]
pub struct Card {
    params: CardParams,
    status: CardStatus,
    interval: TimeDelta,
    lapses: u32,
    repeats: u32,
}

impl Card {
    /// A card that has never been reviewed.
    pub fn new() -> Self {
        Self {
            params: CardParams::New,
            status: CardStatus::New,
            interval: TimeDelta::zero(),
            lapses: 0,
            repeats: 0,
        }
    }

    /// Rebuild a card from persisted fields.
    pub fn from_parts(
        params: CardParams,
        status: CardStatus,
        interval: TimeDelta,
        lapses: u32,
        repeats: u32,
    ) -> Fallible<Self> {
        let params_new = matches!(params, CardParams::New);
        let status_new = status == CardStatus::New;
        if params_new != status_new {
            return fail(format!(
                "card with status '{}' has inconsistent memory parameters",
                status
            ));
        }
        Ok(Self {
            params,
            status,
            interval,
            lapses,
            repeats,
        })
    }

    pub(crate) fn reviewed(
        state: MemoryState,
        status: CardStatus,
        interval: TimeDelta,
        lapses: u32,
        repeats: u32,
    ) -> Self {
        assert!(
            status != CardStatus::New,
            "a reviewed card cannot return to the new status"
        );
        Self {
            params: CardParams::Existing(state),
            status,
            interval,
            lapses,
            repeats,
        }
    }

    pub fn params(&self) -> &CardParams {
        &self.params
    }

    pub fn status(&self) -> CardStatus {
        self.status
    }

    /// The wait chosen by the most recent scheduling decision.
    pub fn interval(&self) -> TimeDelta {
        self.interval
    }

    /// Transitions into relearning.
    pub fn lapses(&self) -> u32 {
        self.lapses
    }

    /// Successful reviews since the last lapse.
    pub fn repeats(&self) -> u32 {
        self.repeats
    }

    pub fn memory_state(&self) -> Option<&MemoryState> {
        match &self.params {
            CardParams::New => None,
            CardParams::Existing(state) => Some(state),
        }
    }

    /// When the card is next due. New cards have no due date.
    pub fn due(&self) -> Option<Timestamp> {
        self.memory_state()
            .map(|state| state.review_time + self.interval)
    }
}

impl Default for Card {
    fn default() -> Self {
        Self::new()
    }
}
