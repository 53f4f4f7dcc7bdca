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

//! kioku-core: the scheduling engine of the kioku spaced repetition
//! system.
//!
//! Given a card's memory state and the current instant, the scheduler
//! computes the card that would result from each of the four possible
//! ratings, so the caller can show the learner every outcome before they
//! answer. Everything here is a pure function of its arguments; the card
//! store is an interface for the caller to implement.

pub mod config;
pub mod error;
pub mod fsrs;
pub mod scheduler;
pub mod store;
pub mod types;

pub use config::FsrsConfig;
pub use error::{ErrorReport, Fallible, fail};
pub use fsrs::Fsrs;
pub use scheduler::{Scheduler, SchedulingInfo, new_card, next_status};
pub use store::{CardStore, MemoryCardStore};
pub use types::card::{Card, CardParams, CardStatus, MemoryState};
pub use types::card_key::CardKey;
pub use types::rating::Rating;
pub use types::timestamp::Timestamp;
