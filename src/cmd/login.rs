use std::fmt;

use serde::Serialize;
use structopt::StructOpt;

use cfick_util::console::Console;

use crate::cmd::Outcome;
use crate::codeforces::CodeforcesActor;
use crate::config::Config;
use crate::Result;

static USERNAME_ENV: &str = "CFICK_USERNAME";
static PASSWORD_ENV: &str = "CFICK_PASSWORD";

#[derive(StructOpt, Debug, Clone, PartialEq, Eq, Hash)]
#[structopt(rename_all = "kebab")]
pub struct LoginOpt {}

impl LoginOpt {
    pub async fn run(&self, conf: &Config, cnsl: &mut Console) -> Result<LoginOutcome> {
        let user = cnsl.get_env_or_prompt_and_read(USERNAME_ENV, "username: ", false)?;
        let pass = cnsl.get_env_or_prompt_and_read(PASSWORD_ENV, "password: ", true)?;

        let session = conf.build_session()?;
        CodeforcesActor::new(&session, conf.session().cookies_path())
            .login(&user, &pass)
            .await?;

        Ok(LoginOutcome { username: user })
    }
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq, Hash)]
pub struct LoginOutcome {
    username: String,
}

impl fmt::Display for LoginOutcome {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Successfully logged in as {}", self.username)
    }
}

impl Outcome for LoginOutcome {
    fn is_error(&self) -> bool {
        false
    }
}
