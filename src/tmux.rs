use std::process::Stdio;

use anyhow::{anyhow, Context as _};
use getset::Getters;
use serde::Serialize;
use tokio::process::Command;

use cfick_util::abs_path::AbsPathBuf;
use cfick_util::model::{ContestId, ProblemId};

use crate::config::Config;
use crate::Result;

static TMUX: &str = "tmux";

/// One window per problem: editor on the left, shell on the right.
#[derive(Serialize, Getters, Debug, Clone, PartialEq, Eq, Hash)]
#[get = "pub"]
pub struct TmuxWindow {
    name: String,
    dir: AbsPathBuf,
    editor_cmd: String,
    compile_cmd: String,
}

#[derive(Serialize, Getters, Debug, Clone, PartialEq, Eq, Hash)]
#[get = "pub"]
pub struct TmuxLayout {
    session_name: String,
    contest_dir: AbsPathBuf,
    windows: Vec<TmuxWindow>,
}

impl TmuxLayout {
    /// Lays out every problem directory already fetched for the contest.
    pub fn plan(conf: &Config, contest_id: &ContestId) -> Result<Self> {
        let contest_dir = conf.contest_dir(contest_id);
        if !contest_dir.is_dir() {
            return Err(anyhow!(
                "Could not find contest directory {}. Fetch the contest first.",
                contest_dir
            ));
        }

        let mut windows = Vec::new();
        for dir in contest_dir.sub_dirs()? {
            let name = match dir.file_name() {
                Some(name) => name.to_owned(),
                None => continue,
            };
            let problem_id = ProblemId::from(name.as_str());
            let source = conf.source_abs_path(contest_id, &problem_id)?;
            let source_name = source.strip_prefix(&dir).display().to_string();
            windows.push(TmuxWindow {
                editor_cmd: format!("{} {}", conf.editor(), source_name),
                compile_cmd: conf.compile_command_line(contest_id, &problem_id)?,
                name,
                dir,
            });
        }

        Ok(Self {
            session_name: format!("cf-{}", contest_id),
            contest_dir,
            windows,
        })
    }

    /// Arguments of each tmux invocation that builds the layout.
    pub fn commands(&self) -> Vec<Vec<String>> {
        let session = self.session_name.as_str();
        let contest_dir = self.contest_dir.to_string();
        let mut commands = vec![args(&[
            "new-session",
            "-d",
            "-s",
            session,
            "-c",
            contest_dir.as_str(),
        ])];
        for window in &self.windows {
            let dir = window.dir.to_string();
            let target = format!("{}:{}", session, window.name);
            let (left, right) = (format!("{}.{{left}}", target), format!("{}.{{right}}", target));
            commands.push(args(&[
                "new-window",
                "-d",
                "-t",
                format!("{}:", session).as_str(),
                "-n",
                window.name.as_str(),
                "-c",
                dir.as_str(),
            ]));
            commands.push(args(&[
                "split-window",
                "-d",
                "-h",
                "-t",
                target.as_str(),
                "-c",
                dir.as_str(),
            ]));
            commands.push(args(&[
                "send-keys",
                "-t",
                left.as_str(),
                window.editor_cmd.as_str(),
                "Enter",
            ]));
            // typed but left for the user to run
            commands.push(args(&[
                "send-keys",
                "-t",
                right.as_str(),
                window.compile_cmd.as_str(),
            ]));
        }
        commands
    }

    pub async fn has_session(&self) -> Result<bool> {
        let status = Command::new(TMUX)
            .arg("has-session")
            .arg("-t")
            .arg(format!("={}", self.session_name))
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await
            .context("Could not run tmux")?;
        Ok(status.success())
    }

    /// Creates the session. Returns false without touching anything when a
    /// session with the same name already exists.
    pub async fn apply(&self) -> Result<bool> {
        if self.has_session().await? {
            return Ok(false);
        }
        for args in self.commands() {
            tracing::debug!("{} {}", TMUX, args.join(" "));
            let output = Command::new(TMUX)
                .args(&args)
                .output()
                .await
                .context("Could not run tmux")?;
            if !output.status.success() {
                return Err(anyhow!(
                    "tmux {} failed : {}",
                    args.first().map(String::as_str).unwrap_or_default(),
                    String::from_utf8_lossy(&output.stderr).trim_end()
                ));
            }
        }
        Ok(true)
    }
}

fn args(args: &[&str]) -> Vec<String> {
    args.iter().map(|s| (*s).to_owned()).collect()
}

#[cfg(test)]
mod tests {
    use tempfile::tempdir;

    use super::*;

    #[test]
    fn test_plan_and_commands() -> anyhow::Result<()> {
        let test_dir = tempdir()?;
        let base_dir = AbsPathBuf::try_new(test_dir.path())?;
        let conf = Config::default_in_dir(base_dir.clone());
        base_dir.join("741").join("B").create_dir_all()?;
        base_dir.join("741").join("A").create_dir_all()?;

        let layout = TmuxLayout::plan(&conf, &"741".into())?;
        assert_eq!(layout.session_name(), "cf-741");
        let names = layout
            .windows()
            .iter()
            .map(|w| w.name().as_str())
            .collect::<Vec<_>>();
        assert_eq!(names, vec!["A", "B"]);
        assert_eq!(layout.windows()[0].editor_cmd(), "vim main.cpp");

        let commands = layout.commands();
        assert_eq!(commands.len(), 1 + 4 * 2);
        assert_eq!(commands[0][0], "new-session");
        assert_eq!(commands[0][3], "cf-741");
        let compile = &commands[4];
        assert_eq!(compile[0], "send-keys");
        assert_eq!(compile[2], "cf-741:A.{right}");
        assert_eq!(
            compile.last().map(String::as_str),
            Some("g++ -std=gnu++17 -O2 -o a.out main.cpp")
        );
        Ok(())
    }

    #[test]
    fn test_plan_without_contest_dir() -> anyhow::Result<()> {
        let test_dir = tempdir()?;
        let conf = Config::default_in_dir(AbsPathBuf::try_new(test_dir.path())?);
        assert!(TmuxLayout::plan(&conf, &"741".into()).is_err());
        Ok(())
    }
}
