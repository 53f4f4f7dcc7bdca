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

use chrono::TimeDelta;

use crate::config::FsrsConfig;
use crate::fsrs::Fsrs;
use crate::types::card::Card;
use crate::types::card::CardStatus;
use crate::types::card::MemoryState;
use crate::types::rating::Rating;
use crate::types::timestamp::Timestamp;

/// The outcome of each possible rating, all computed from the same card
/// and instant. The caller keeps the one matching the learner's answer.
#[derive(Clone, PartialEq, Debug)]
pub struct SchedulingInfo {
    pub again: Card,
    pub hard: Card,
    pub good: Card,
    pub easy: Card,
}

impl SchedulingInfo {
    pub fn get(&self, rating: Rating) -> &Card {
        match rating {
            Rating::Again => &self.again,
            Rating::Hard => &self.hard,
            Rating::Good => &self.good,
            Rating::Easy => &self.easy,
        }
    }

    pub fn into_card(self, rating: Rating) -> Card {
        match rating {
            Rating::Again => self.again,
            Rating::Hard => self.hard,
            Rating::Good => self.good,
            Rating::Easy => self.easy,
        }
    }

    /// The branches in grade order.
    pub fn iter(&self) -> impl Iterator<Item = (Rating, &Card)> {
        Rating::ALL.into_iter().map(move |rating| (rating, self.get(rating)))
    }
}

/// The status a card moves to when reviewed with `rating`.
pub fn next_status(status: CardStatus, rating: Rating) -> CardStatus {
    match (status, rating) {
        (CardStatus::New, _) => CardStatus::Learning,
        (CardStatus::Learning, Rating::Again) => CardStatus::Learning,
        (CardStatus::Review, Rating::Again) => CardStatus::Relearning,
        (CardStatus::Relearning, Rating::Again) => CardStatus::Relearning,
        (_, _) => CardStatus::Review,
    }
}

/// A card that has never been reviewed.
pub fn new_card() -> Card {
    Card::new()
}

#[derive(Clone, Debug, Default)]
pub struct Scheduler {
    fsrs: Fsrs,
}

impl Scheduler {
    pub fn new(config: FsrsConfig) -> Self {
        Self {
            fsrs: Fsrs::new(config),
        }
    }

    pub fn fsrs(&self) -> &Fsrs {
        &self.fsrs
    }

    /// Compute the next card for every possible rating.
    pub fn schedule(&self, card: &Card, now: Timestamp) -> SchedulingInfo {
        let info = SchedulingInfo {
            again: self.branch(card, Rating::Again, now),
            hard: self.branch(card, Rating::Hard, now),
            good: self.branch(card, Rating::Good, now),
            easy: self.branch(card, Rating::Easy, now),
        };
        log::debug!(
            "Scheduled {} card: again={}m hard={}m good={}m easy={}m",
            card.status(),
            info.again.interval().num_minutes(),
            info.hard.interval().num_minutes(),
            info.good.interval().num_minutes(),
            info.easy.interval().num_minutes(),
        );
        info
    }

    /// Review a card with a known rating.
    pub fn review(&self, card: &Card, rating: Rating, now: Timestamp) -> Card {
        self.schedule(card, now).into_card(rating)
    }

    fn branch(&self, card: &Card, rating: Rating, now: Timestamp) -> Card {
        let state = self.fsrs.updated_params(card, rating, now);
        let status = next_status(card.status(), rating);
        let interval = self.interval(card.status(), status, rating, &state);
        let repeats = match rating {
            Rating::Again => card.repeats(),
            _ => card.repeats() + 1,
        };
        let lapses = if status == CardStatus::Relearning && card.status() != CardStatus::Relearning
        {
            card.lapses() + 1
        } else {
            card.lapses()
        };
        Card::reviewed(state, status, interval, lapses, repeats)
    }

    fn interval(
        &self,
        from: CardStatus,
        to: CardStatus,
        rating: Rating,
        state: &MemoryState,
    ) -> TimeDelta {
        let config = self.fsrs.config();
        match (from, to) {
            (CardStatus::New, _) => config.learning_step(rating),
            (_, CardStatus::Learning | CardStatus::Relearning) => {
                config.relearning_step_duration()
            }
            _ => self.fsrs.next_interval(state),
        }
    }
}
