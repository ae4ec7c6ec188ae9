use std::fmt;

use serde::Serialize;
use structopt::StructOpt;

use crate::cmd::Outcome;
use crate::config::Config;

#[derive(StructOpt, Debug, Clone, PartialEq, Eq, Hash)]
#[structopt(rename_all = "kebab")]
pub struct ShowOpt {}

impl ShowOpt {
    pub fn run(&self, conf: Config) -> ShowOutcome {
        ShowOutcome(conf)
    }
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct ShowOutcome(Config);

impl fmt::Display for ShowOutcome {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl Outcome for ShowOutcome {
    fn is_error(&self) -> bool {
        false
    }
}
