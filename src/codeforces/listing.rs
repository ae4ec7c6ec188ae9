use std::fmt;
use std::time::Duration;

use anyhow::{anyhow, Context as _};
use chrono::{Local, TimeZone as _};
use getset::{CopyGetters, Getters};
use serde::{Deserialize, Serialize};

use cfick_util::console::{sty_c, sty_dim, sty_g, sty_r, sty_y};
use cfick_util::service::Session;

use crate::Result;

static CONTEST_LIST_PATH: &str = "/api/contest.list";

#[derive(Serialize, Deserialize, Debug, Copy, Clone, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Phase {
    Before,
    Coding,
    PendingSystemTest,
    SystemTest,
    Finished,
}

/// One contest from the public contest list.
#[derive(Serialize, Deserialize, Getters, CopyGetters, Debug, Clone, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub struct ContestEntry {
    #[get_copy = "pub"]
    id: u64,
    #[get = "pub"]
    name: String,
    #[get_copy = "pub"]
    phase: Phase,
    /// Seconds since the start; negative before the contest starts.
    #[serde(default)]
    #[get_copy = "pub"]
    relative_time_seconds: i64,
    #[serde(default)]
    #[get_copy = "pub"]
    start_time_seconds: i64,
    #[get_copy = "pub"]
    duration_seconds: u64,
}

impl ContestEntry {
    pub fn is_finished(&self) -> bool {
        self.phase == Phase::Finished
    }

    fn until_start(&self) -> String {
        let secs = self.relative_time_seconds;
        let dur = humantime::format_duration(Duration::from_secs(secs.unsigned_abs()));
        if secs <= 0 {
            format!("in {}", dur)
        } else {
            format!("started {} ago", dur)
        }
    }

    fn start_time(&self) -> String {
        match Local.timestamp_opt(self.start_time_seconds, 0).single() {
            Some(start) => start.format("%Y-%m-%d %H:%M:%S").to_string(),
            None => "unknown time".to_owned(),
        }
    }

    fn duration(&self) -> String {
        humantime::format_duration(Duration::from_secs(self.duration_seconds)).to_string()
    }

    /// Two lines: id and name, then timing.
    pub fn describe(&self, colored: bool) -> String {
        let (until, start, dur) = (self.until_start(), self.start_time(), self.duration());
        if colored {
            format!(
                "{} : {}\n {} {} {}",
                sty_r(self.id),
                sty_y(&self.name),
                sty_c(until),
                sty_g(format!("at {}", start)),
                sty_dim(format!("lasts {}", dur)),
            )
        } else {
            format!(
                "{} : {}\n {} at {} lasts {}",
                self.id, self.name, until, start, dur
            )
        }
    }
}

impl fmt::Display for ContestEntry {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.describe(false))
    }
}

#[derive(Deserialize, Debug)]
struct ApiResponse<T> {
    status: String,
    #[serde(default)]
    comment: Option<String>,
    result: Option<T>,
}

fn parse_contest_list(text: &str) -> Result<Vec<ContestEntry>> {
    let res: ApiResponse<Vec<ContestEntry>> =
        serde_json::from_str(text).context("Could not parse contest list as json")?;
    match res.result {
        Some(result) if res.status == "OK" => Ok(result),
        _ => Err(anyhow!(
            "Contest list api returned {} : {}",
            res.status,
            res.comment.unwrap_or_default()
        )),
    }
}

/// Fetches every contest the site knows about, finished ones included.
pub async fn fetch_contest_listing(session: &Session) -> Result<Vec<ContestEntry>> {
    let text = session.get_text(session.url(CONTEST_LIST_PATH)?).await?;
    parse_contest_list(&text)
}
