use std::fmt;

use serde::Serialize;
use structopt::StructOpt;

use crate::cmd::Outcome;
use crate::codeforces::{fetch_contest_listing, ContestEntry};
use crate::config::Config;
use crate::Result;

#[derive(StructOpt, Debug, Clone, PartialEq, Eq, Hash)]
#[structopt(rename_all = "kebab")]
pub struct ListOpt {
    /// Prints without colors
    #[structopt(long)]
    no_color: bool,
}

impl ListOpt {
    pub async fn run(&self, conf: &Config) -> Result<ListOutcome> {
        let session = conf.build_session()?;
        let mut contests = fetch_contest_listing(&session)
            .await?
            .into_iter()
            .filter(|contest| !contest.is_finished())
            .collect::<Vec<_>>();
        contests.sort_by_key(|contest| contest.start_time_seconds());
        Ok(ListOutcome {
            contests,
            colored: !self.no_color,
        })
    }
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq, Hash)]
pub struct ListOutcome {
    contests: Vec<ContestEntry>,
    #[serde(skip)]
    colored: bool,
}

impl fmt::Display for ListOutcome {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.contests.is_empty() {
            return f.write_str("No upcoming contests");
        }
        for (i, contest) in self.contests.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            f.write_str(&contest.describe(self.colored))?;
        }
        Ok(())
    }
}

impl Outcome for ListOutcome {
    fn is_error(&self) -> bool {
        false
    }
}
