use std::fmt;
use std::path::PathBuf;

use anyhow::{anyhow, Context as _};
use serde::Serialize;
use structopt::StructOpt;

use cfick_util::abs_path::AbsPathBuf;
use cfick_util::console::Console;

use crate::cmd::Outcome;
use crate::config::ConfigBody;
use crate::Result;

#[derive(StructOpt, Debug, Clone, PartialEq, Eq, Hash)]
#[structopt(rename_all = "kebab")]
pub struct InitOpt {
    /// Directory to create the config file in. Defaults to the current directory
    dir: Option<PathBuf>,
    /// Overwrites the existing config file
    #[structopt(long, short = "w")]
    overwrite: bool,
}

impl InitOpt {
    pub fn run(&self, cnsl: &mut Console) -> Result<InitOutcome> {
        let cwd = AbsPathBuf::cwd()?;
        let base_dir = match &self.dir {
            Some(path) => cwd.join(path),
            None => cwd.clone(),
        };
        if !base_dir.is_dir() {
            return Err(anyhow!("Could not find directory : {}", base_dir));
        }

        let config_path = base_dir.join(ConfigBody::FILE_NAME);
        let saved = config_path.save_pretty(
            |mut file| ConfigBody::generate_to(&mut file).context("Could not save config"),
            self.overwrite,
            Some(&cwd),
            cnsl,
        )?;
        if saved.is_none() {
            return Err(anyhow!(
                "Config file already exists : {}. Use --overwrite to replace it.",
                config_path
            ));
        }

        Ok(InitOutcome { config_path })
    }
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq, Hash)]
pub struct InitOutcome {
    config_path: AbsPathBuf,
}

impl fmt::Display for InitOutcome {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Saved config file : {}", self.config_path)
    }
}

impl Outcome for InitOutcome {
    fn is_error(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use tempfile::tempdir;

    use super::*;
    use cfick_util::console::ConsoleConfig;

    #[test]
    fn run_twice() -> anyhow::Result<()> {
        let test_dir = tempdir()?;
        let mut opt = InitOpt {
            dir: Some(test_dir.path().to_owned()),
            overwrite: false,
        };

        let cnsl = &mut Console::buf(ConsoleConfig::default());
        let outcome = opt.run(cnsl)?;
        assert!(outcome.config_path.is_file());
        assert!(opt.run(cnsl).is_err());

        opt.overwrite = true;
        opt.run(cnsl)?;
        Ok(())
    }
}
