use std::fmt;

use anyhow::anyhow;
use serde::Serialize;
use structopt::StructOpt;

use cfick_util::console::Console;
use cfick_util::model::{latest_contest, ContestId};

use crate::cmd::Outcome;
use crate::config::Config;
use crate::tmux::TmuxLayout;
use crate::Result;

#[derive(StructOpt, Debug, Clone, PartialEq, Eq, Hash)]
#[structopt(rename_all = "kebab")]
pub struct TmuxOpt {
    /// Contest id. Defaults to the most recently modified contest directory
    #[structopt(name = "contest")]
    contest_id: Option<ContestId>,
}

impl TmuxOpt {
    pub async fn run(&self, conf: &Config, cnsl: &mut Console) -> Result<TmuxOutcome> {
        let contest_id = match &self.contest_id {
            Some(contest_id) => contest_id.clone(),
            None => latest_contest(conf.base_dir())?.ok_or_else(|| {
                anyhow!(
                    "Could not find any contest directory in {}. Fetch a contest first.",
                    conf.base_dir()
                )
            })?,
        };

        let layout = TmuxLayout::plan(conf, &contest_id)?;
        let created = layout.apply().await?;
        if !created {
            cnsl.warn(&format!(
                "Found existing tmux session {}",
                layout.session_name()
            ))?;
        }
        Ok(TmuxOutcome {
            session_name: layout.session_name().clone(),
            windows: layout.windows().len(),
            created,
        })
    }
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq, Hash)]
pub struct TmuxOutcome {
    session_name: String,
    windows: usize,
    created: bool,
}

impl fmt::Display for TmuxOutcome {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.created {
            write!(
                f,
                "Created tmux session {} with {} window(s). Attach with `tmux attach -t {}`",
                self.session_name, self.windows, self.session_name
            )
        } else {
            write!(
                f,
                "Left existing tmux session {} as it is. Attach with `tmux attach -t {}`",
                self.session_name, self.session_name
            )
        }
    }
}

impl Outcome for TmuxOutcome {
    fn is_error(&self) -> bool {
        false
    }
}
