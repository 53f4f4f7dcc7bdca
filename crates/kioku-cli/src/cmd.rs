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

pub mod preview;
pub mod review;
pub mod show;

use std::fmt::Display;
use std::fmt::Formatter;
use std::path::Path;

use chrono::TimeDelta;
use clap::ValueEnum;
use kioku_core::FsrsConfig;
use kioku_core::Scheduler;
use kioku_core::Timestamp;

use crate::db::Database;
use crate::error::ErrorReport;
use crate::error::Fallible;

#[derive(ValueEnum, Clone, Copy, PartialEq, Debug)]
pub enum OutputFormat {
    /// Human-readable output.
    Text,
    /// JSON output.
    Json,
}

impl Display for OutputFormat {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}

/// What every command needs: the card store, the scheduler, and the
/// instant to schedule at.
pub struct Context {
    pub db: Database,
    pub scheduler: Scheduler,
    pub now: Timestamp,
}

impl Context {
    pub fn new(db_path: &Path, config_path: Option<&Path>, at: Option<&str>) -> Fallible<Self> {
        let config = match config_path {
            Some(path) => FsrsConfig::load(path)?,
            None => FsrsConfig::default(),
        };
        let db_path: &str = db_path
            .to_str()
            .ok_or_else(|| ErrorReport::new("invalid path"))?;
        let db = Database::new(db_path)?;
        let now = match at {
            Some(at) => Timestamp::parse_rfc3339(at)?,
            None => Timestamp::now(),
        };
        Ok(Self {
            db,
            scheduler: Scheduler::new(config),
            now,
        })
    }
}

/// Render an interval in its largest whole unit.
pub fn format_interval(interval: TimeDelta) -> String {
    if interval.num_days() > 0 {
        format!("{}d", interval.num_days())
    } else if interval.num_hours() > 0 {
        format!("{}h", interval.num_hours())
    } else {
        format!("{}m", interval.num_minutes())
    }
}
