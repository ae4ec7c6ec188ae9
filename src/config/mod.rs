use std::fmt;
use std::io::Write;
use std::time::Duration;

use anyhow::{anyhow, Context as _};
use getset::Getters;
use lazy_static::lazy_static;
use reqwest::Url;
use semver::{Version, VersionReq};
use serde::{Deserialize, Serialize};
use tokio::process::Command;

use cfick_util::abs_path::AbsPathBuf;
use cfick_util::console::Console;
use cfick_util::model::{ContestId, LangIdRef, ProblemId};
use cfick_util::service::Session;

mod session_config;
mod template;

use crate::codeforces::DEFAULT_STATEMENT_TEMPLATE;
use crate::Result;
pub use session_config::SessionConfig;
use template::{Shell, TargetContext, TargetTempl};

lazy_static! {
    static ref VERSION: Version = Version::parse(env!("CARGO_PKG_VERSION"))
        .unwrap_or_else(|_| Version::new(0, 0, 0));
}

/// Loaded `cfick.yaml` together with the work dir it was found in.
#[derive(Serialize, Getters, Debug, Clone, PartialEq, Eq, Hash)]
pub struct Config {
    #[get = "pub"]
    base_dir: AbsPathBuf,
    body: ConfigBody,
}

impl Config {
    /// Loads the config in `base_dir`, or searches upward from the current
    /// directory when no base dir is given.
    pub fn load(base_dir: Option<AbsPathBuf>, cnsl: &mut Console) -> Result<Self> {
        let base_dir = match base_dir {
            Some(base_dir) => base_dir,
            None => ConfigBody::search(cnsl)?,
        };
        let body = ConfigBody::load(&base_dir, cnsl)?;
        Ok(Self { base_dir, body })
    }

    pub fn default_in_dir(base_dir: AbsPathBuf) -> Self {
        Self {
            base_dir,
            body: ConfigBody::default(),
        }
    }

    pub fn session(&self) -> &SessionConfig {
        &self.body.session
    }

    pub fn base_url(&self) -> Result<Url> {
        Url::parse(&self.body.base_url)
            .with_context(|| format!("Could not parse base_url : {}", self.body.base_url))
    }

    /// Builds an http session with cookies loaded from the cookie file.
    pub fn build_session(&self) -> Result<Session> {
        let session = Session::new(self.base_url()?, self.session().timeout())?;
        session.load(self.session().cookies_path());
        Ok(session)
    }

    pub fn lang_id(&self) -> Option<LangIdRef<'_>> {
        self.body.lang_id.as_deref()
    }

    pub fn editor(&self) -> &str {
        &self.body.editor
    }

    pub fn test_timeout(&self) -> Duration {
        self.body.test_timeout
    }

    /// Reads the statement template, falling back to the built-in one.
    pub fn load_statement_template(&self) -> Result<String> {
        let path = match &self.body.template_path {
            Some(path) => self.base_dir.join_expand(path)?,
            None => return Ok(DEFAULT_STATEMENT_TEMPLATE.to_owned()),
        };
        let bytes = path
            .read_bytes()
            .context("Could not read statement template")?;
        Ok(String::from_utf8(bytes)?)
    }

    pub fn contest_dir(&self, contest_id: &ContestId) -> AbsPathBuf {
        self.base_dir.join(contest_id.as_ref())
    }

    pub fn problem_dir(&self, contest_id: &ContestId, problem_id: &ProblemId) -> AbsPathBuf {
        self.contest_dir(contest_id).join(problem_id.to_string())
    }

    pub fn source_abs_path(
        &self,
        contest_id: &ContestId,
        problem_id: &ProblemId,
    ) -> Result<AbsPathBuf> {
        self.problem_dir(contest_id, problem_id)
            .join_expand(&self.body.source_path)
    }

    pub fn binary_abs_path(
        &self,
        contest_id: &ContestId,
        problem_id: &ProblemId,
    ) -> Result<AbsPathBuf> {
        self.problem_dir(contest_id, problem_id)
            .join_expand(&self.body.binary_path)
    }

    /// Writes the starter source unless the source file already exists.
    pub fn expand_and_save_source(
        &self,
        contest_id: &ContestId,
        problem_id: &ProblemId,
        cnsl: &mut dyn Write,
    ) -> Result<Option<bool>> {
        let template = match &self.body.source_template {
            Some(template) => template,
            None => return Ok(None),
        };
        let source = template.expand_with(contest_id, problem_id)?;
        self.source_abs_path(contest_id, problem_id)?.save_pretty(
            |mut file| Ok(file.write_all(source.as_bytes())?),
            false,
            Some(&self.base_dir),
            cnsl,
        )
    }

    pub fn compile_command_line(
        &self,
        contest_id: &ContestId,
        problem_id: &ProblemId,
    ) -> Result<String> {
        self.body.compile.expand_with(contest_id, problem_id)
    }

    pub fn exec_compile(&self, contest_id: &ContestId, problem_id: &ProblemId) -> Result<Command> {
        self.exec_templ(&self.body.compile, contest_id, problem_id)
    }

    pub fn exec_run(&self, contest_id: &ContestId, problem_id: &ProblemId) -> Result<Command> {
        self.exec_templ(&self.body.run, contest_id, problem_id)
    }

    fn exec_templ(
        &self,
        templ: &TargetTempl,
        contest_id: &ContestId,
        problem_id: &ProblemId,
    ) -> Result<Command> {
        let context = TargetContext::new(contest_id, problem_id);
        let mut command = self.body.shell.exec_templ(templ, &context)?;
        command.current_dir(self.problem_dir(contest_id, problem_id));
        Ok(command)
    }
}

impl fmt::Display for Config {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let yaml_str = serde_yaml::to_string(self).map_err(|_| fmt::Error)?;
        write!(f, "{}", yaml_str)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Hash)]
pub struct ConfigBody {
    #[serde(with = "string_serde")]
    version: Version,
    #[serde(default = "ConfigBody::default_base_url")]
    base_url: String,
    #[serde(default)]
    template_path: Option<String>,
    #[serde(default)]
    session: SessionConfig,
    #[serde(default)]
    lang_id: Option<String>,
    #[serde(default = "ConfigBody::default_source_path")]
    source_path: String,
    #[serde(default = "ConfigBody::default_source_template")]
    source_template: Option<TargetTempl>,
    #[serde(default)]
    shell: Shell,
    #[serde(default = "ConfigBody::default_compile")]
    compile: TargetTempl,
    #[serde(default = "ConfigBody::default_run")]
    run: TargetTempl,
    #[serde(default = "ConfigBody::default_binary_path")]
    binary_path: String,
    #[serde(
        default = "ConfigBody::default_test_timeout",
        with = "humantime_serde"
    )]
    test_timeout: Duration,
    #[serde(default = "ConfigBody::default_editor")]
    editor: String,
}

impl ConfigBody {
    pub const FILE_NAME: &'static str = "cfick.yaml";

    const DEFAULT_SOURCE_TEMPLATE: &'static str = r#"// {{ contest }}{{ problem }}
#include <bits/stdc++.h>
using namespace std;

int main() {
    return 0;
}
"#;

    pub fn generate_to(writer: &mut dyn Write) -> Result<()> {
        writeln!(
            writer,
            include_str!("../../resources/cfick.yaml.txt"),
            version = &*VERSION,
            cookies_path = SessionConfig::default().cookies_path(),
        )
        .context("Could not write config")
    }

    fn default_base_url() -> String {
        "https://codeforces.com".into()
    }

    fn default_source_path() -> String {
        "main.cpp".into()
    }

    fn default_source_template() -> Option<TargetTempl> {
        Some(Self::DEFAULT_SOURCE_TEMPLATE.into())
    }

    fn default_compile() -> TargetTempl {
        "g++ -std=gnu++17 -O2 -o a.out main.cpp".into()
    }

    fn default_run() -> TargetTempl {
        "./a.out".into()
    }

    fn default_binary_path() -> String {
        "a.out".into()
    }

    fn default_test_timeout() -> Duration {
        Duration::from_secs(2)
    }

    fn default_editor() -> String {
        "vim".into()
    }

    fn search(cnsl: &mut Console) -> Result<AbsPathBuf> {
        let cwd = AbsPathBuf::cwd()?;
        let base_dir = cwd.search_dir_contains(Self::FILE_NAME).with_context(|| {
            format!(
                "Could not find config file ({}) in {} or any of the parent directories. \
                 Create config file first by `cfick init` command.",
                Self::FILE_NAME,
                cwd
            )
        })?;
        writeln!(cnsl, "Found config file in base_dir: {}", base_dir)?;
        Ok(base_dir)
    }

    fn load(base_dir: &AbsPathBuf, cnsl: &mut Console) -> Result<Self> {
        let body: Self = base_dir.join(Self::FILE_NAME).load_pretty(
            |file| serde_yaml::from_reader(file).context("Could not read config file as yaml"),
            Some(base_dir),
            cnsl,
        )?;
        body.validate()?;
        Ok(body)
    }

    fn validate(&self) -> Result<()> {
        let version_req = VersionReq::parse(&self.version.to_string())
            .context("Could not parse version requirement")?;
        if !version_req.matches(&VERSION) {
            return Err(anyhow!(
                r#"Found mismatched version in config file.
    config version: {}
    cfick version : {}
Fix the config file so that it is compatible with the current version of cfick."#,
                self.version,
                &*VERSION
            ));
        }
        Url::parse(&self.base_url).context("Found invalid base_url in config file")?;
        Ok(())
    }
}

impl Default for ConfigBody {
    fn default() -> Self {
        Self {
            version: VERSION.clone(),
            base_url: Self::default_base_url(),
            template_path: None,
            session: SessionConfig::default(),
            lang_id: None,
            source_path: Self::default_source_path(),
            source_template: Self::default_source_template(),
            shell: Shell::default(),
            compile: Self::default_compile(),
            run: Self::default_run(),
            binary_path: Self::default_binary_path(),
            test_timeout: Self::default_test_timeout(),
            editor: Self::default_editor(),
        }
    }
}

mod string_serde {
    use std::fmt::Display;
    use std::str::FromStr;

    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<T, S>(value: &T, serializer: S) -> Result<S::Ok, S::Error>
    where
        T: Display,
        S: Serializer,
    {
        serializer.collect_str(value)
    }

    pub fn deserialize<'de, T, D>(deserializer: D) -> Result<T, D::Error>
    where
        T: FromStr,
        T::Err: Display,
        D: Deserializer<'de>,
    {
        String::deserialize(deserializer)?
            .parse()
            .map_err(de::Error::custom)
    }
}

#[cfg(test)]
impl Config {
    /// Config rooted at `base_dir` that talks to `base_url` and keeps cookies
    /// inside `base_dir`.
    pub fn for_test(base_dir: AbsPathBuf, base_url: &str) -> Self {
        let body = ConfigBody {
            base_url: base_url.to_owned(),
            session: SessionConfig::default_in_dir(&base_dir),
            ..ConfigBody::default()
        };
        Self { base_dir, body }
    }

    pub fn for_test_with_commands(base_dir: AbsPathBuf, compile: &str, run: &str) -> Self {
        let mut conf = Self::for_test(base_dir, "http://localhost");
        conf.body.compile = compile.into();
        conf.body.run = run.into();
        conf
    }
}
