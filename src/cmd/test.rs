use std::fmt;
use std::io::Write as _;

use anyhow::{anyhow, Context as _};
use serde::Serialize;
use structopt::StructOpt;

use cfick_util::abs_path::AbsPathBuf;
use cfick_util::console::Console;
use cfick_util::model::{ContestId, ProblemId, Sample};

use crate::cmd::{resolve_problem, Outcome};
use crate::config::Config;
use crate::judge::{Judge, StatusKind, TotalStatus};
use crate::Result;

#[derive(StructOpt, Debug, Clone, PartialEq, Eq, Hash)]
#[structopt(rename_all = "kebab")]
pub struct TestOpt {
    /// Contest id. Inferred from the current directory if omitted
    #[structopt(name = "contest")]
    contest_id: Option<ContestId>,
    /// Problem index. Inferred from the current directory if omitted
    #[structopt(name = "problem")]
    problem_id: Option<ProblemId>,
    /// Compiles even if the binary is newer than the source
    #[structopt(long, short)]
    force_compile: bool,
}

impl TestOpt {
    pub async fn run(&self, conf: &Config, cnsl: &mut Console) -> Result<TestOutcome> {
        let (contest_id, problem_id) = resolve_problem(&self.contest_id, &self.problem_id)?;
        test_problem(conf, &contest_id, &problem_id, self.force_compile, cnsl).await
    }
}

async fn test_problem(
    conf: &Config,
    contest_id: &ContestId,
    problem_id: &ProblemId,
    force_compile: bool,
    cnsl: &mut Console,
) -> Result<TestOutcome> {
    let source = conf.source_abs_path(contest_id, problem_id)?;
    let binary = conf.binary_abs_path(contest_id, problem_id)?;
    if force_compile || needs_compile(&source, &binary) {
        compile(conf, contest_id, problem_id, cnsl).await?;
    }

    let samples = Sample::load_all(&conf.problem_dir(contest_id, problem_id))?;
    if samples.is_empty() {
        return Err(anyhow!(
            "Could not find any samples of {}/{}. Fetch the problem first.",
            contest_id,
            problem_id
        ));
    }

    let mut statuses = Vec::with_capacity(samples.len());
    for sample in &samples {
        let command = conf.exec_run(contest_id, problem_id)?;
        let status = Judge::new(sample, conf.test_timeout()).test(command).await;
        status.describe(cnsl)?;
        statuses.push(status);
    }

    Ok(TestOutcome {
        contest_id: contest_id.clone(),
        problem_id: problem_id.clone(),
        total: TotalStatus::new(statuses),
    })
}

/// True when the binary is missing or older than the source.
fn needs_compile(source: &AbsPathBuf, binary: &AbsPathBuf) -> bool {
    match (source.modified(), binary.modified()) {
        (Some(source), Some(binary)) => source > binary,
        _ => true,
    }
}

async fn compile(
    conf: &Config,
    contest_id: &ContestId,
    problem_id: &ProblemId,
    cnsl: &mut Console,
) -> Result<()> {
    writeln!(
        cnsl,
        "Compiling : {}",
        conf.compile_command_line(contest_id, problem_id)?
    )?;
    let output = conf
        .exec_compile(contest_id, problem_id)?
        .output()
        .await
        .context("Could not run compile command")?;
    cnsl.write_all(&output.stdout)?;
    cnsl.write_all(&output.stderr)?;
    if !output.status.success() {
        return Err(anyhow!("Compile failed ({})", output.status));
    }
    Ok(())
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq, Hash)]
pub struct TestOutcome {
    contest_id: ContestId,
    problem_id: ProblemId,
    total: TotalStatus,
}

impl fmt::Display for TestOutcome {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        self.total.fmt(f)
    }
}

impl Outcome for TestOutcome {
    fn is_error(&self) -> bool {
        self.total.kind() != StatusKind::Ac
    }
}

#[cfg(all(test, unix))]
mod tests {
    use std::io::Write as _;

    use tempfile::tempdir;

    use super::*;
    use cfick_util::console::ConsoleConfig;

    fn write(path: &AbsPathBuf, content: &str) -> anyhow::Result<()> {
        path.save(|mut file| Ok(file.write_all(content.as_bytes())?), true)?;
        Ok(())
    }

    #[tokio::test]
    async fn test_with_shell_script() -> anyhow::Result<()> {
        let test_dir = tempdir()?;
        let base_dir = AbsPathBuf::try_new(test_dir.path())?;
        let conf = Config::for_test_with_commands(
            base_dir.clone(),
            "cp main.sh a.out && chmod +x a.out",
            "./a.out",
        );
        let (contest_id, problem_id) = (ContestId::from("741"), ProblemId::from("A"));
        let dir = conf.problem_dir(&contest_id, &problem_id);
        write(&dir.join("main.sh"), "#!/bin/sh\nread a b\necho $((a + b))\n")?;
        write(&dir.join("0.in"), "1 2\n")?;
        write(&dir.join("0.out"), "3\n")?;
        write(&dir.join("1.in"), "2 2\n")?;
        write(&dir.join("1.out"), "5\n")?;

        let mut cnsl = Console::buf(ConsoleConfig::default());
        let outcome = test_problem(&conf, &contest_id, &problem_id, false, &mut cnsl).await?;
        assert_eq!(outcome.total.kind(), StatusKind::Wa);
        assert!(outcome.is_error());
        assert!(dir.join("a.out").is_file());

        let output = cnsl.take_output()?;
        assert!(output.starts_with("Compiling : cp main.sh a.out"), "{}", output);
        Ok(())
    }

    #[test]
    fn test_needs_compile() -> anyhow::Result<()> {
        let test_dir = tempdir()?;
        let dir = AbsPathBuf::try_new(test_dir.path())?;
        let (source, binary) = (dir.join("main.cpp"), dir.join("a.out"));
        write(&source, "")?;
        assert!(needs_compile(&source, &binary));
        std::thread::sleep(std::time::Duration::from_millis(50));
        write(&binary, "")?;
        assert!(!needs_compile(&source, &binary));
        Ok(())
    }
}
