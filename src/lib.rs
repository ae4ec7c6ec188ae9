#![warn(clippy::all)]

use std::io::{self, Write as _};
use std::path::PathBuf;

use anyhow::{anyhow, Context as _};
use serde::{Deserialize, Serialize};
use structopt::StructOpt;
use strum::{EnumString, EnumVariantNames, IntoStaticStr, VariantNames as _};
use tracing_subscriber::EnvFilter;

use cfick_util::abs_path::AbsPathBuf;
use cfick_util::console::{Console, ConsoleConfig};

mod cmd;
pub mod codeforces;
pub mod config;
pub mod judge;
pub mod tmux;

pub use cmd::Cmd;
use cmd::{Outcome as _, OutcomeSerialize as _};
pub use config::Config;

pub type Error = anyhow::Error;
pub type Result<T> = anyhow::Result<T>;

static DEFAULT_LOG_FILTER: &str = "cfick=info,cfick_util=info";
static DEBUG_LOG_FILTER: &str = "cfick=debug,cfick_util=debug";

#[derive(
    Serialize,
    Deserialize,
    EnumString,
    EnumVariantNames,
    IntoStaticStr,
    Debug,
    Copy,
    Clone,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum OutputFormat {
    Default,
    Debug,
    Json,
    Yaml,
}

#[derive(StructOpt, Debug, Clone, PartialEq, Eq, Hash)]
#[structopt(about, rename_all = "kebab")]
pub struct Opt {
    #[structopt(flatten)]
    global_opt: GlobalOpt,
    #[structopt(subcommand)]
    cmd: Cmd,
}

#[derive(StructOpt, Debug, Clone, PartialEq, Eq, Hash)]
#[structopt(rename_all = "kebab")]
pub struct GlobalOpt {
    /// Work directory with cfick.yaml. Searched upward from the current directory if omitted
    #[structopt(long, global = true, env = "CFICK_BASE_DIR")]
    base_dir: Option<PathBuf>,
    /// Format of the outcome printed to stdout
    #[structopt(
        long,
        short,
        global = true,
        default_value = OutputFormat::Default.into(),
        possible_values = &OutputFormat::VARIANTS,
    )]
    output: OutputFormat,
    /// Prints debug logs
    #[structopt(long, global = true)]
    debug: bool,
    /// Assumes yes to every confirmation
    #[structopt(long, short = "y", global = true)]
    assume_yes: bool,
}

impl Opt {
    pub fn run(&self) -> Result<()> {
        let cnsl = &mut Console::term(ConsoleConfig {
            assume_yes: self.global_opt.assume_yes,
        });
        self.run_with(cnsl, &mut io::stdout())
    }

    pub fn run_with(&self, cnsl: &mut Console, stdout: &mut dyn io::Write) -> Result<()> {
        let base_dir = match &self.global_opt.base_dir {
            Some(path) => Some(AbsPathBuf::cwd()?.join(path)),
            None => None,
        };

        // scraper documents are not Send, so everything stays on one thread
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .context("Could not start async runtime")?;
        let outcome = rt.block_on(self.cmd.run(base_dir, cnsl))?;

        cnsl.flush()?;
        outcome.print(stdout, self.global_opt.output)?;
        if outcome.is_error() {
            return Err(anyhow!("Command finished with failures"));
        }
        Ok(())
    }

    pub fn init_tracing(&self) {
        let default_filter = if self.global_opt.debug {
            DEBUG_LOG_FILTER
        } else {
            DEFAULT_LOG_FILTER
        };
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(default_filter));
        // a second init only happens in tests and is harmless
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_writer(io::stderr)
            .try_init();
    }
}
