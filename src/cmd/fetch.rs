use std::fmt;

use serde::Serialize;
use structopt::StructOpt;

use cfick_util::console::Console;
use cfick_util::model::{ContestId, ProblemId};

use crate::cmd::{resolve_target, Outcome};
use crate::codeforces::Downloader;
use crate::config::Config;
use crate::Result;

#[derive(StructOpt, Debug, Clone, PartialEq, Eq, Hash)]
#[structopt(rename_all = "kebab")]
pub struct FetchOpt {
    /// Contest id. Inferred from the current directory if omitted
    #[structopt(name = "contest")]
    contest_id: Option<ContestId>,
    /// If specified, fetches only one problem
    #[structopt(name = "problem")]
    problem_id: Option<ProblemId>,
}

impl FetchOpt {
    pub async fn run(&self, conf: &Config, cnsl: &mut Console) -> Result<FetchOutcome> {
        let (contest_id, problem_id) = resolve_target(&self.contest_id, &self.problem_id)?;

        let session = conf.build_session()?;
        let downloader = Downloader::new(conf, &session)?;
        let problems = match problem_id {
            Some(problem_id) => {
                downloader
                    .download_problem(&contest_id, &problem_id, cnsl)
                    .await?;
                vec![problem_id]
            }
            None => downloader
                .download_contest(&contest_id, cnsl)
                .await?
                .into_result()?
                .saved()
                .clone(),
        };

        Ok(FetchOutcome {
            contest_id,
            problems,
        })
    }
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq, Hash)]
pub struct FetchOutcome {
    contest_id: ContestId,
    problems: Vec<ProblemId>,
}

impl fmt::Display for FetchOutcome {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let ids = self
            .problems
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>();
        write!(
            f,
            "Successfully fetched {} problem(s) of contest {} : {}",
            ids.len(),
            self.contest_id,
            ids.join(", ")
        )
    }
}

impl Outcome for FetchOutcome {
    fn is_error(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use tempfile::tempdir;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use cfick_util::abs_path::AbsPathBuf;
    use cfick_util::console::ConsoleConfig;

    #[tokio::test]
    async fn run_single_problem() -> anyhow::Result<()> {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/contest/741/problem/B"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"<div class="problem-statement"><p>Sum</p>
<div class="input"><pre>1 2<br></pre></div><div class="output"><pre>3<br></pre></div></div>"#,
            ))
            .expect(1)
            .mount(&server)
            .await;

        let test_dir = tempdir()?;
        let base_dir = AbsPathBuf::try_new(test_dir.path())?;
        let conf = Config::for_test(base_dir.clone(), &server.uri());
        let opt = FetchOpt {
            contest_id: Some("741".into()),
            problem_id: Some("b".into()),
        };
        let mut cnsl = Console::buf(ConsoleConfig::default());
        let outcome = opt.run(&conf, &mut cnsl).await?;
        assert_eq!(
            outcome.to_string(),
            "Successfully fetched 1 problem(s) of contest 741 : B"
        );

        let problem_dir = base_dir.join("741").join("B");
        assert_eq!(problem_dir.join("0.in").read_bytes()?, b"1 2\n");
        assert_eq!(problem_dir.join("0.out").read_bytes()?, b"3\n");
        assert!(problem_dir.join("main.cpp").is_file());
        assert!(problem_dir.join("statement").join("index.html").is_file());

        let output = cnsl.take_output()?;
        assert!(output.contains("Saving 741/B/0.in ... saved"), "{}", output);
        Ok(())
    }
}
