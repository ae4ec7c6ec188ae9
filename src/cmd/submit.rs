use std::fmt;
use std::path::PathBuf;

use anyhow::anyhow;
use serde::Serialize;
use structopt::StructOpt;

use cfick_util::abs_path::AbsPathBuf;
use cfick_util::console::Console;
use cfick_util::model::{ContestId, LangId, ProblemId};

use crate::cmd::{resolve_problem, Outcome};
use crate::codeforces::CodeforcesActor;
use crate::config::Config;
use crate::Result;

#[derive(StructOpt, Debug, Clone, PartialEq, Eq, Hash)]
#[structopt(rename_all = "kebab")]
pub struct SubmitOpt {
    /// Contest id. Inferred from the current directory if omitted
    #[structopt(name = "contest")]
    contest_id: Option<ContestId>,
    /// Problem index. Inferred from the current directory if omitted
    #[structopt(name = "problem")]
    problem_id: Option<ProblemId>,
    /// Source file to submit. Defaults to the configured source path of the problem
    #[structopt(long, short)]
    file: Option<PathBuf>,
    /// Language id. Defaults to `lang_id` in config, then to the file extension
    #[structopt(long, short)]
    lang: Option<LangId>,
}

impl SubmitOpt {
    pub async fn run(&self, conf: &Config, cnsl: &mut Console) -> Result<SubmitOutcome> {
        let (contest_id, problem_id) = resolve_problem(&self.contest_id, &self.problem_id)?;
        let file = match &self.file {
            Some(file) => AbsPathBuf::cwd()?.join(file),
            None => conf.source_abs_path(&contest_id, &problem_id)?,
        };
        if !file.is_file() {
            return Err(anyhow!("Could not find source file : {}", file));
        }
        if !cnsl.confirm(
            &format!("Submit {} to {}/{} ?", file, contest_id, problem_id),
            true,
        )? {
            return Err(anyhow!("Canceled"));
        }

        let session = conf.build_session()?;
        let lang = self.lang.as_deref().or_else(|| conf.lang_id());
        let lang_id = CodeforcesActor::new(&session, conf.session().cookies_path())
            .submit(&file, &contest_id, &problem_id, lang)
            .await?;

        Ok(SubmitOutcome {
            contest_id,
            problem_id,
            lang_id,
            file,
        })
    }
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq, Hash)]
pub struct SubmitOutcome {
    contest_id: ContestId,
    problem_id: ProblemId,
    lang_id: LangId,
    file: AbsPathBuf,
}

impl fmt::Display for SubmitOutcome {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "Successfully submitted {} to {}/{} (language id {})",
            self.file, self.contest_id, self.problem_id, self.lang_id
        )
    }
}

impl Outcome for SubmitOutcome {
    fn is_error(&self) -> bool {
        false
    }
}
