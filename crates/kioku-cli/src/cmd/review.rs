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

use kioku_core::Card;
use kioku_core::CardKey;
use kioku_core::Rating;

use crate::cmd::Context;
use crate::error::Fallible;
use crate::error::fail;

/// Apply a rating to an item and save the result. The read and the write
/// happen in one transaction.
pub fn review_card(ctx: &Context, item: &str, mode: &str, rating: Rating) -> Fallible<Card> {
    let key = CardKey::new(item, mode);
    ctx.db.update(&key, |current| {
        let card = match current {
            Some(card) => card,
            None => {
                log::debug!("First review of {item} ({mode}).");
                Card::new()
            }
        };
        if let Some(state) = card.memory_state() {
            if ctx.now < state.review_time {
                return fail("review time is earlier than the last review.");
            }
        }
        Ok(ctx.scheduler.review(&card, rating, ctx.now))
    })
}
