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
use kioku_core::CardStore;
use serde::Serialize;

use crate::cmd::Context;
use crate::cmd::OutputFormat;
use crate::cmd::format_interval;
use crate::error::Fallible;

#[derive(Serialize, PartialEq, Debug)]
#[serde(rename_all = "camelCase")]
pub struct Outcome {
    rating: &'static str,
    status: &'static str,
    interval: String,
    due: String,
}

/// Compute what each rating would do to an item, without saving anything.
pub fn preview_card(ctx: &Context, item: &str, mode: &str) -> Fallible<Vec<Outcome>> {
    let key = CardKey::new(item, mode);
    let card = ctx.db.get(&key)?.unwrap_or_else(Card::new);
    let info = ctx.scheduler.schedule(&card, ctx.now);
    let outcomes = info
        .iter()
        .map(|(rating, next)| Outcome {
            rating: rating.as_str(),
            status: next.status().as_str(),
            interval: format_interval(next.interval()),
            due: next.due().map(|due| due.to_rfc3339()).unwrap_or_default(),
        })
        .collect();
    Ok(outcomes)
}

pub fn render_outcomes(outcomes: &[Outcome], format: OutputFormat) -> Fallible<String> {
    match format {
        OutputFormat::Text => {
            let lines: Vec<String> = outcomes
                .iter()
                .map(|o| {
                    format!(
                        "{:<6} {:<11} {:>5}  due {}",
                        o.rating, o.status, o.interval, o.due
                    )
                })
                .collect();
            Ok(lines.join("\n"))
        }
        OutputFormat::Json => Ok(serde_json::to_string_pretty(outcomes)?),
    }
}
