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

use std::path::PathBuf;

use clap::Parser;
use clap::Subcommand;
use kioku_core::Rating;

use crate::cmd::Context;
use crate::cmd::OutputFormat;
use crate::cmd::format_interval;
use crate::cmd::preview::preview_card;
use crate::cmd::preview::render_outcomes;
use crate::cmd::review::review_card;
use crate::cmd::show::render_report;
use crate::cmd::show::show_card;
use crate::error::Fallible;

#[derive(Parser)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Path to the card database.
    #[arg(long, global = true, default_value = "kioku.db")]
    db: PathBuf,
    /// Path to a TOML file with scheduler parameters.
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Schedule at this RFC 3339 instant instead of now.
    #[arg(long, global = true)]
    at: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Show what each rating would do, without saving anything.
    Preview {
        /// The item identifier.
        item: String,
        /// The practice mode.
        #[arg(long, default_value = "default")]
        mode: String,
        /// Output format.
        #[arg(long, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
    /// Rate an item and save the result.
    Review {
        /// The item identifier.
        item: String,
        /// again, hard, good, or easy (or 1 to 4).
        rating: Rating,
        /// The practice mode.
        #[arg(long, default_value = "default")]
        mode: String,
    },
    /// Show the stored state of an item.
    Show {
        /// The item identifier.
        item: String,
        /// The practice mode.
        #[arg(long, default_value = "default")]
        mode: String,
        /// Output format.
        #[arg(long, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
}

pub fn entrypoint() -> Fallible<()> {
    let cli: Cli = Cli::parse();
    let ctx = Context::new(&cli.db, cli.config.as_deref(), cli.at.as_deref())?;
    match cli.command {
        Command::Preview { item, mode, format } => {
            let outcomes = preview_card(&ctx, &item, &mode)?;
            println!("{}", render_outcomes(&outcomes, format)?);
        }
        Command::Review { item, rating, mode } => {
            let card = review_card(&ctx, &item, &mode, rating)?;
            let due = card.due().map(|due| due.to_rfc3339()).unwrap_or_default();
            println!(
                "{rating}: {}, next review in {} (due {due})",
                card.status(),
                format_interval(card.interval())
            );
        }
        Command::Show { item, mode, format } => match show_card(&ctx, &item, &mode)? {
            Some(report) => println!("{}", render_report(&report, format)?),
            None => println!("{item} ({mode}) has never been reviewed."),
        },
    }
    Ok(())
}
