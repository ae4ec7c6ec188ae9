use std::fmt;
use std::sync::Mutex;

use anyhow::{anyhow, Context as _};
use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};
use tera::Tera;
use tokio::process::Command;

use cfick_util::model::{ContestId, ProblemId};

use crate::Result;

lazy_static! {
    static ref RENDERER: Mutex<Tera> = Mutex::new(Tera::default());
}

pub trait Expand<'a> {
    type Context: Serialize + 'a;

    fn get_template(&self) -> &str;

    fn expand(&self, context: &Self::Context) -> Result<String> {
        let template = self.get_template();
        let template_name = template;

        let ctx =
            tera::Context::from_serialize(context).context("Could not create template context")?;

        let mut renderer = RENDERER
            .lock()
            .map_err(|_| anyhow!("Template renderer is poisoned"))?;
        if let Err(err) = renderer.get_template(template_name) {
            if let tera::ErrorKind::TemplateNotFound(_) = err.kind {
                // first use of this template
                renderer
                    .add_raw_template(template_name, template)
                    .context("Could not parse template")?;
            } else {
                return Err(err).context("Could not expand template");
            }
        };
        renderer.render(template_name, &ctx).with_context(|| {
            format!(
                "Could not expand template with context\n    template: {}\n    context: {}",
                template,
                serde_json::to_string(context).unwrap_or_default()
            )
        })
    }
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq, Hash)]
pub struct CmdContext<'a> {
    command: &'a str,
}

impl<'a> CmdContext<'a> {
    pub fn new(command: &'a str) -> Self {
        Self { command }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Hash)]
pub struct CmdTempl(String);

impl<'a> Expand<'a> for CmdTempl {
    type Context = CmdContext<'a>;

    fn get_template(&self) -> &str {
        &self.0
    }
}

impl<T: Into<String>> From<T> for CmdTempl {
    fn from(s: T) -> Self {
        Self(s.into())
    }
}

impl fmt::Display for CmdTempl {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Variables available in source templates and compile/run commands.
#[derive(Serialize, Debug, Clone, PartialEq, Eq, Hash)]
pub struct TargetContext<'a> {
    contest: &'a ContestId,
    problem: &'a ProblemId,
}

impl<'a> TargetContext<'a> {
    pub fn new(contest: &'a ContestId, problem: &'a ProblemId) -> Self {
        Self { contest, problem }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Hash)]
pub struct TargetTempl(String);

impl TargetTempl {
    pub fn expand_with(&self, contest: &ContestId, problem: &ProblemId) -> Result<String> {
        self.expand(&TargetContext::new(contest, problem))
    }
}

impl<'a> Expand<'a> for TargetTempl {
    type Context = TargetContext<'a>;

    fn get_template(&self) -> &str {
        &self.0
    }
}

impl<T: Into<String>> From<T> for TargetTempl {
    fn from(s: T) -> Self {
        Self(s.into())
    }
}

impl fmt::Display for TargetTempl {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct TemplArray<T>(Vec<T>);

impl<'a, T: Expand<'a>> TemplArray<T> {
    pub fn expand_all(&self, context: &<T as Expand<'a>>::Context) -> Result<Vec<String>> {
        self.0.iter().map(|c| c.expand(context)).collect()
    }
}

impl<I, S, T> From<I> for TemplArray<T>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
    T: From<String>,
{
    fn from(value: I) -> Self {
        let arr = value
            .into_iter()
            .map(|s| s.as_ref().to_string().into())
            .collect();
        TemplArray(arr)
    }
}

impl<T: fmt::Display> fmt::Display for TemplArray<T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        self.0
            .iter()
            .enumerate()
            .try_for_each(|(i, c)| write!(f, "{}{}", if i == 0 { "" } else { " " }, c))
    }
}

pub type Shell = TemplArray<CmdTempl>;

impl Shell {
    pub fn exec(&self, cmd: &str) -> Result<Command> {
        let cmd_context = CmdContext::new(cmd);
        let cmd_expanded = self
            .expand_all(&cmd_context)
            .context("Could not expand shell template")?;
        let (program, args) = cmd_expanded
            .split_first()
            .context("Shell command must not be empty")?;
        let mut command = Command::new(program);
        command.args(args).kill_on_drop(true);
        Ok(command)
    }

    pub fn exec_templ<'a, T: Expand<'a>>(
        &self,
        templ: &T,
        context: &<T as Expand<'a>>::Context,
    ) -> Result<Command> {
        let cmd = templ
            .expand(context)
            .context("Could not expand command template")?;
        self.exec(&cmd)
    }
}

impl Default for Shell {
    fn default() -> Self {
        (&["/bin/sh", "-c", "{{ command }}"]).into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expand_target_templ() -> anyhow::Result<()> {
        let templ = TargetTempl::from("// {{ contest }}{{ problem }}\n");
        let actual = templ.expand_with(&"741".into(), &"b1".into())?;
        assert_eq!(actual, "// 741B1\n");
        Ok(())
    }

    #[test]
    fn expand_default_shell() -> anyhow::Result<()> {
        let shell = Shell::default();
        let actual = shell.expand_all(&CmdContext::new("g++ main.cpp"))?;
        assert_eq!(actual, vec!["/bin/sh", "-c", "g++ main.cpp"]);
        Ok(())
    }

    #[test]
    fn expand_shell_failure() {
        let shell = Shell::from(&["/bin/sh", "-c", "{{ some_undefined_variable }}"]);
        assert!(shell.expand_all(&CmdContext::new("echo hello")).is_err());
    }

    #[test]
    fn empty_shell_is_error() {
        let shell = Shell::from(Vec::<String>::new());
        assert!(shell.exec("echo hello").is_err());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn exec_default_shell() -> anyhow::Result<()> {
        let output = Shell::default().exec("echo hello")?.output().await?;
        assert!(output.status.success());
        assert_eq!(String::from_utf8(output.stdout)?, "hello\n");
        Ok(())
    }
}
