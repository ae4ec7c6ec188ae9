use std::env;
use std::io::{self, BufRead as _, Write};
use std::time::Duration;

use anyhow::Context as _;
use console::Term;
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};

const PB_TICK_INTERVAL: Duration = Duration::from_millis(80);
const PB_TEMPL_COUNT: &str =
    "{spinner:.green} {prefix} [{elapsed_precise}] [{wide_bar:.cyan/blue}] {pos}/{len} {msg}";
const PB_PROGRESS_CHARS: &str = "#>-";
const PB_REFRESH_RATE: u8 = 20;

#[derive(Debug)]
enum Inner {
    Term(Term),
    Buf {
        input: io::BufReader<io::Cursor<String>>,
        output: Vec<u8>,
    },
    Sink(io::Sink),
}

/// Config for console.
#[derive(Debug, Default, Clone, PartialEq, Eq, Hash)]
pub struct ConsoleConfig {
    /// If true, assumes yes and skips any confirmation.
    pub assume_yes: bool,
}

/// User facing output of a command.
///
/// `Term` writes to stderr so that the outcome on stdout stays machine readable.
/// `Buf` captures everything and is what tests use.
#[derive(Debug)]
pub struct Console {
    inner: Inner,
    conf: ConsoleConfig,
}

impl Console {
    pub fn term(conf: ConsoleConfig) -> Self {
        Self {
            inner: Inner::Term(Term::stderr()),
            conf,
        }
    }

    pub fn buf(conf: ConsoleConfig) -> Self {
        Self {
            inner: Inner::Buf {
                input: io::BufReader::new(io::Cursor::new(String::new())),
                output: Vec::new(),
            },
            conf,
        }
    }

    pub fn sink(conf: ConsoleConfig) -> Self {
        Self {
            inner: Inner::Sink(io::sink()),
            conf,
        }
    }

    /// Queues lines to be read by later prompts of a `Buf` console.
    pub fn write_input(&mut self, s: &str) {
        if let Inner::Buf { ref mut input, .. } = self.inner {
            input.get_mut().get_mut().push_str(s)
        }
    }

    pub fn take_buf(self) -> Option<Vec<u8>> {
        match self.inner {
            Inner::Buf { output: buf, .. } => Some(buf),
            _ => None,
        }
    }

    pub fn take_output(self) -> crate::Result<String> {
        self.take_buf()
            .context("Could not take buf from console")
            .and_then(|buf| Ok(String::from_utf8(buf)?))
    }

    #[inline]
    fn as_mut_write(&mut self) -> &mut dyn Write {
        match self.inner {
            Inner::Term(ref mut w) => w,
            Inner::Buf {
                output: ref mut w, ..
            } => w,
            Inner::Sink(ref mut w) => w,
        }
    }

    pub fn warn(&mut self, message: &str) -> io::Result<()> {
        writeln!(self, "{} {}", sty_y("WARN:"), message)
    }

    pub fn confirm(&mut self, message: &str, default: bool) -> io::Result<bool> {
        if self.conf.assume_yes {
            return Ok(true);
        }

        let prompt = format!("{} ({}) ", message, if default { "Y/n" } else { "y/N" });
        let input = self.prompt_and_read(&prompt, false)?;
        match input.to_lowercase().as_str() {
            "y" | "yes" => Ok(true),
            "n" | "no" => Ok(false),
            _ => Ok(default),
        }
    }

    pub fn get_env_or_prompt_and_read(
        &mut self,
        env_name: &str,
        prompt: &str,
        is_password: bool,
    ) -> io::Result<String> {
        if let Ok(val) = env::var(env_name) {
            writeln!(
                self,
                "{}{:16} (read from env {})",
                prompt,
                if is_password { "********" } else { &val },
                env_name
            )?;
            return Ok(val);
        };
        self.prompt_and_read(prompt, is_password)
    }

    fn read_user(&mut self, is_password: bool) -> io::Result<String> {
        match self.inner {
            Inner::Term(ref term) => {
                if is_password {
                    term.read_secure_line()
                } else {
                    term.read_line()
                }
            }
            Inner::Buf { ref mut input, .. } => {
                let mut buf = String::new();
                input.read_line(&mut buf)?;
                Ok(buf.trim_end_matches(&['\r', '\n'][..]).to_owned())
            }
            Inner::Sink(_) => Ok(String::new()),
        }
    }

    fn prompt_and_read(&mut self, prompt: &str, is_password: bool) -> io::Result<String> {
        write!(self, "{}", prompt)?;
        self.flush()?;
        self.read_user(is_password)
    }

    /// Progress bar counting finished items, drawn only on a terminal.
    pub fn build_pb_count(&self, len: u64, prefix: &str) -> ProgressBar {
        let pb = ProgressBar::with_draw_target(Some(len), self.to_pb_target());
        let style = ProgressStyle::default_bar()
            .template(PB_TEMPL_COUNT)
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars(PB_PROGRESS_CHARS);
        pb.set_style(style);
        pb.set_prefix(prefix.to_owned());
        pb.enable_steady_tick(PB_TICK_INTERVAL);
        pb
    }

    fn to_pb_target(&self) -> ProgressDrawTarget {
        match &self.inner {
            Inner::Term(term) => ProgressDrawTarget::term(term.clone(), PB_REFRESH_RATE),
            _ => ProgressDrawTarget::hidden(),
        }
    }
}

impl Write for Console {
    #[inline]
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.as_mut_write().write(buf)
    }

    #[inline]
    fn flush(&mut self) -> io::Result<()> {
        self.as_mut_write().flush()
    }
}

macro_rules! def_color {
    ($name:ident, $name_upper:ident, $style:expr) => {
        ::lazy_static::lazy_static! {
            static ref $name_upper: ::console::Style = {
                use ::console::Style;
                $style
            };
        }

        pub fn $name<D>(val: D) -> ::console::StyledObject<D> {
            $name_upper.apply_to(val)
        }
    };
}

pub use color_defs::*;

mod color_defs {
    def_color!(sty_r, STY_R, Style::new().red());
    def_color!(sty_g, STY_G, Style::new().green());
    def_color!(sty_y, STY_Y, Style::new().yellow());
    def_color!(sty_c, STY_C, Style::new().cyan());
    def_color!(sty_dim, STY_DIM, Style::new().dim());
    def_color!(sty_bold, STY_BOLD, Style::new().bold());
    def_color!(sty_r_rev, STY_R_REV, Style::new().bold().reverse().red());
    def_color!(sty_g_rev, STY_G_REV, Style::new().bold().reverse().green());
    def_color!(sty_y_rev, STY_Y_REV, Style::new().bold().reverse().yellow());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_warn() -> anyhow::Result<()> {
        console::set_colors_enabled(false);
        let mut cnsl = Console::buf(ConsoleConfig::default());
        cnsl.warn("Could not download 741/C")?;
        assert_eq!(cnsl.take_output()?, "WARN: Could not download 741/C\n");
        Ok(())
    }

    #[test]
    fn test_confirm() -> anyhow::Result<()> {
        let tests = &[
            (true, "", false, true),
            (false, "y\n", false, true),
            (false, "Yes\n", false, true),
            (false, "n\n", true, false),
            (false, "NO\n", true, false),
            (false, "maybe\n", true, true),
            (false, "maybe\n", false, false),
            (false, "", true, true),
        ];
        for (assume_yes, input, default, expected) in tests {
            let conf = ConsoleConfig {
                assume_yes: *assume_yes,
            };
            let mut cnsl = Console::buf(conf);
            cnsl.write_input(input);
            assert_eq!(cnsl.confirm("Overwrite?", *default)?, *expected);
        }
        Ok(())
    }

    #[test]
    fn test_get_env_or_prompt_and_read() -> anyhow::Result<()> {
        let env_name = if cfg!(windows) { "APPDATA" } else { "HOME" };
        let env_val = env::var(env_name)?;

        let mut cnsl = Console::buf(ConsoleConfig::default());
        assert_eq!(
            cnsl.get_env_or_prompt_and_read(env_name, "handle > ", false)?,
            env_val
        );

        let mut cnsl = Console::buf(ConsoleConfig::default());
        cnsl.write_input("tourist\n");
        assert_eq!(
            cnsl.get_env_or_prompt_and_read("CFICK_TEST_UNKNOWN_VAR", "handle > ", false)?,
            "tourist"
        );
        assert_eq!(cnsl.take_output()?, "handle > ");

        let mut cnsl = Console::sink(ConsoleConfig::default());
        assert_eq!(
            cnsl.get_env_or_prompt_and_read("CFICK_TEST_UNKNOWN_VAR", "password > ", true)?,
            ""
        );
        Ok(())
    }

    #[test]
    fn test_pb_hidden_for_buf() {
        let cnsl = Console::buf(ConsoleConfig::default());
        let pb = cnsl.build_pb_count(2, "741");
        pb.inc(2);
        assert_eq!(pb.position(), 2);
        pb.finish_and_clear();
    }
}
