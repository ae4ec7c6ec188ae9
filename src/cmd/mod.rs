use std::{fmt, io};

use anyhow::{anyhow, Context as _};
use serde::Serialize;
use structopt::StructOpt;

use cfick_util::abs_path::AbsPathBuf;
use cfick_util::console::Console;
use cfick_util::model::{ContestId, ProblemId, Target};

use crate::config::Config;
use crate::{OutputFormat, Result};

mod fetch;
mod init;
mod list;
mod login;
mod logout;
mod show;
mod submit;
mod test;
mod tmux;

pub use fetch::{FetchOpt, FetchOutcome};
pub use init::{InitOpt, InitOutcome};
pub use list::{ListOpt, ListOutcome};
pub use login::{LoginOpt, LoginOutcome};
pub use logout::{LogoutOpt, LogoutOutcome};
pub use show::{ShowOpt, ShowOutcome};
pub use submit::{SubmitOpt, SubmitOutcome};
pub use test::{TestOpt, TestOutcome};
pub use tmux::{TmuxOpt, TmuxOutcome};

pub trait Outcome: OutcomeSerialize {
    fn is_error(&self) -> bool;
}

pub trait OutcomeSerialize: fmt::Display + fmt::Debug {
    fn write_json(&self, writer: &mut dyn io::Write) -> Result<()>;

    fn write_yaml(&self, writer: &mut dyn io::Write) -> Result<()>;

    fn print(&self, stdout: &mut dyn io::Write, format: OutputFormat) -> Result<()> {
        match format {
            OutputFormat::Default => writeln!(stdout, "{}", self)?,
            OutputFormat::Debug => writeln!(stdout, "{:?}", self)?,
            OutputFormat::Json => {
                self.write_json(stdout)?;
                writeln!(stdout)?;
            }
            OutputFormat::Yaml => self.write_yaml(stdout)?,
        }
        Ok(())
    }
}

impl<T: Serialize + fmt::Display + fmt::Debug> OutcomeSerialize for T {
    fn write_json(&self, writer: &mut dyn io::Write) -> Result<()> {
        serde_json::to_writer_pretty(writer, self).context("Could not print outcome as json")
    }

    fn write_yaml(&self, writer: &mut dyn io::Write) -> Result<()> {
        serde_yaml::to_writer(writer, self).context("Could not print outcome as yaml")
    }
}

#[derive(StructOpt, Debug, Clone, PartialEq, Eq, Hash)]
#[structopt(rename_all = "kebab")]
pub enum Cmd {
    /// Creates config file
    Init(InitOpt),
    /// Shows current config
    Show(ShowOpt),
    /// Logs in to Codeforces
    Login(LoginOpt),
    /// Logs out by removing the cookie file
    Logout(LogoutOpt),
    /// Lists contests that are not finished yet
    #[structopt(alias = "ls")]
    List(ListOpt),
    /// Fetches statements, images and samples of a contest or a problem
    #[structopt(alias = "do")]
    Fetch(FetchOpt),
    /// Submits source code
    #[structopt(alias = "sub")]
    Submit(SubmitOpt),
    /// Tests source code with sample inputs and outputs
    Test(TestOpt),
    /// Opens a tmux session with one window per problem
    Tmux(TmuxOpt),
}

impl Cmd {
    pub async fn run(
        &self,
        base_dir: Option<AbsPathBuf>,
        cnsl: &mut Console,
    ) -> Result<Box<dyn Outcome>> {
        // init is the only command that runs without a config file
        if let Self::Init(opt) = self {
            return Ok(Box::new(opt.run(cnsl)?));
        }

        let conf = Config::load(base_dir, cnsl).context("Could not load config")?;
        let outcome: Box<dyn Outcome> = match self {
            Self::Init(_) => unreachable!(),
            Self::Show(opt) => Box::new(opt.run(conf)),
            Self::Login(opt) => Box::new(opt.run(&conf, cnsl).await?),
            Self::Logout(opt) => Box::new(opt.run(&conf, cnsl)?),
            Self::List(opt) => Box::new(opt.run(&conf).await?),
            Self::Fetch(opt) => Box::new(opt.run(&conf, cnsl).await?),
            Self::Submit(opt) => Box::new(opt.run(&conf, cnsl).await?),
            Self::Test(opt) => Box::new(opt.run(&conf, cnsl).await?),
            Self::Tmux(opt) => Box::new(opt.run(&conf, cnsl).await?),
        };
        Ok(outcome)
    }
}

/// Contest and problem for commands that take them as optional arguments.
///
/// Missing ids are inferred from the current directory.
fn resolve_target(
    contest_id: &Option<ContestId>,
    problem_id: &Option<ProblemId>,
) -> Result<(ContestId, Option<ProblemId>)> {
    if let Some(contest_id) = contest_id {
        return Ok((contest_id.clone(), problem_id.clone()));
    }
    let cwd = AbsPathBuf::cwd()?;
    resolve_target_in(&cwd, problem_id)
}

fn resolve_target_in(
    dir: &AbsPathBuf,
    problem_id: &Option<ProblemId>,
) -> Result<(ContestId, Option<ProblemId>)> {
    let target = Target::from_path(dir.as_ref());
    let contest_id = target.contest_id().cloned().with_context(|| {
        format!(
            "Could not infer contest from current directory {}. Specify contest id.",
            dir
        )
    })?;
    let problem_id = problem_id
        .clone()
        .or_else(|| target.problem_id().cloned());
    Ok((contest_id, problem_id))
}

/// Like `resolve_target` but a problem is required.
fn resolve_problem(
    contest_id: &Option<ContestId>,
    problem_id: &Option<ProblemId>,
) -> Result<(ContestId, ProblemId)> {
    let (contest_id, problem_id) = resolve_target(contest_id, problem_id)?;
    let problem_id = problem_id.ok_or_else(|| {
        anyhow!(
            "Could not infer problem of contest {} from current directory. Specify problem id.",
            contest_id
        )
    })?;
    Ok((contest_id, problem_id))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_target_in() -> anyhow::Result<()> {
        let dir = AbsPathBuf::try_new("/home/cf/741/B1")?;
        assert_eq!(
            resolve_target_in(&dir, &None)?,
            ("741".into(), Some("B1".into()))
        );
        assert_eq!(
            resolve_target_in(&dir, &Some("c".into()))?,
            ("741".into(), Some("C".into()))
        );

        let dir = AbsPathBuf::try_new("/home/cf/741")?;
        assert_eq!(resolve_target_in(&dir, &None)?, ("741".into(), None));

        let dir = AbsPathBuf::try_new("/home/cf")?;
        assert!(resolve_target_in(&dir, &None).is_err());
        Ok(())
    }

    #[test]
    fn test_explicit_target_skips_inference() -> anyhow::Result<()> {
        let target = resolve_problem(&Some("741".into()), &Some("a".into()))?;
        assert_eq!(target, ("741".into(), "A".into()));
        Ok(())
    }
}
