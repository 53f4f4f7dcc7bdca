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

use kioku_core::CardKey;
use kioku_core::CardStore;
use serde::Serialize;

use crate::cmd::Context;
use crate::cmd::OutputFormat;
use crate::cmd::format_interval;
use crate::error::Fallible;

#[derive(Serialize, PartialEq, Debug)]
#[serde(rename_all = "camelCase")]
pub struct CardReport {
    key: CardKey,
    status: &'static str,
    difficulty: Option<f64>,
    stability: Option<f64>,
    interval: String,
    lapses: u32,
    repeats: u32,
    due: Option<String>,
    retrievability: Option<f64>,
}

/// Describe the stored state of an item. Returns `None` if it has never
/// been reviewed.
pub fn show_card(ctx: &Context, item: &str, mode: &str) -> Fallible<Option<CardReport>> {
    let key = CardKey::new(item, mode);
    let Some(card) = ctx.db.get(&key)? else {
        return Ok(None);
    };
    let state = card.memory_state();
    Ok(Some(CardReport {
        key,
        status: card.status().as_str(),
        difficulty: state.map(|s| s.difficulty),
        stability: state.map(|s| s.stability),
        interval: format_interval(card.interval()),
        lapses: card.lapses(),
        repeats: card.repeats(),
        due: card.due().map(|due| due.to_rfc3339()),
        retrievability: ctx.scheduler.fsrs().retrievability(&card, ctx.now),
    }))
}

pub fn render_report(report: &CardReport, format: OutputFormat) -> Fallible<String> {
    match format {
        OutputFormat::Text => {
            let mut lines = vec![
                format!("key:            {}", report.key),
                format!("status:         {}", report.status),
            ];
            if let (Some(d), Some(s)) = (report.difficulty, report.stability) {
                lines.push(format!("difficulty:     {d:.4}"));
                lines.push(format!("stability:      {s:.4}"));
            }
            lines.push(format!("interval:       {}", report.interval));
            lines.push(format!("lapses:         {}", report.lapses));
            lines.push(format!("repeats:        {}", report.repeats));
            if let Some(due) = &report.due {
                lines.push(format!("due:            {due}"));
            }
            if let Some(r) = report.retrievability {
                lines.push(format!("retrievability: {:.1}%", r * 100.0));
            }
            Ok(lines.join("\n"))
        }
        OutputFormat::Json => Ok(serde_json::to_string_pretty(report)?),
    }
}
