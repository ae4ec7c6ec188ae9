use std::fmt;

use serde::Serialize;
use structopt::StructOpt;

use cfick_util::console::Console;

use crate::cmd::Outcome;
use crate::config::Config;
use crate::Result;

#[derive(StructOpt, Debug, Clone, PartialEq, Eq, Hash)]
#[structopt(rename_all = "kebab")]
pub struct LogoutOpt {}

impl LogoutOpt {
    pub fn run(&self, conf: &Config, cnsl: &mut Console) -> Result<LogoutOutcome> {
        let cookies_path = conf.session().cookies_path();
        let removed = cookies_path.remove_file_pretty(Some(conf.base_dir()), cnsl)?;
        Ok(LogoutOutcome { removed })
    }
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq, Hash)]
pub struct LogoutOutcome {
    removed: bool,
}

impl fmt::Display for LogoutOutcome {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.removed {
            f.write_str("Successfully logged out")
        } else {
            f.write_str("Not logged in")
        }
    }
}

impl Outcome for LogoutOutcome {
    fn is_error(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write as _;

    use tempfile::tempdir;

    use super::*;
    use cfick_util::abs_path::AbsPathBuf;
    use cfick_util::console::ConsoleConfig;

    #[test]
    fn run_removes_cookie_file() -> anyhow::Result<()> {
        let test_dir = tempdir()?;
        let conf = Config::for_test(AbsPathBuf::try_new(test_dir.path())?, "http://localhost");
        let cookies_path = conf.session().cookies_path();
        cookies_path.save(|mut file| Ok(file.write_all(b"[]")?), true)?;

        let cnsl = &mut Console::buf(ConsoleConfig::default());
        let outcome = LogoutOpt {}.run(&conf, cnsl)?;
        assert!(outcome.removed);
        assert!(!cookies_path.is_file());

        let outcome = LogoutOpt {}.run(&conf, cnsl)?;
        assert!(!outcome.removed);
        Ok(())
    }
}
