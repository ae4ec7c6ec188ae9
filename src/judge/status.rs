use std::cmp::max;
use std::fmt;
use std::io::Write;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use strum::IntoStaticStr;

use cfick_util::console::{sty_g_rev, sty_r_rev, sty_y_rev};

use crate::judge::diff::TextDiff;
use crate::{Error, Result};

/// Verdict kinds ordered from best to worst.
#[derive(
    Serialize,
    Deserialize,
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
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE")]
pub enum StatusKind {
    Ac,
    Wa,
    Tle,
    Re,
}

impl StatusKind {
    pub fn styled(self) -> String {
        let s: &'static str = self.into();
        let s = format!(" {:3} ", s);
        match self {
            Self::Ac => sty_g_rev(s).to_string(),
            Self::Wa | Self::Re => sty_r_rev(s).to_string(),
            Self::Tle => sty_y_rev(s).to_string(),
        }
    }
}

impl fmt::Display for StatusKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.into())
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Hash)]
#[serde(rename_all = "UPPERCASE", tag = "kind")]
enum StatusInner {
    Ac { diff: TextDiff },
    Wa { diff: TextDiff },
    Tle,
    Re { reason: String },
}

impl StatusInner {
    fn describe(&self, cnsl: &mut dyn Write) -> Result<()> {
        match self {
            Self::Ac { .. } => {}
            Self::Wa { diff } => write!(cnsl, "{}", diff)?,
            Self::Tle => {}
            Self::Re { reason } => writeln!(cnsl, "{}", reason)?,
        }
        Ok(())
    }

    fn to_kind(&self) -> StatusKind {
        match self {
            Self::Ac { .. } => StatusKind::Ac,
            Self::Wa { .. } => StatusKind::Wa,
            Self::Tle => StatusKind::Tle,
            Self::Re { .. } => StatusKind::Re,
        }
    }
}

/// Verdict of one sample.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Hash)]
pub struct Status {
    sample_name: String,
    #[serde(with = "humantime_serde")]
    elapsed: Duration,
    #[serde(flatten)]
    inner: StatusInner,
}

impl Status {
    /// AC or WA depending on the diff.
    pub fn judged(sample_name: String, elapsed: Duration, diff: TextDiff) -> Self {
        let inner = if diff.is_any() {
            StatusInner::Wa { diff }
        } else {
            StatusInner::Ac { diff }
        };
        Self {
            sample_name,
            elapsed,
            inner,
        }
    }

    pub fn tle(sample_name: String, elapsed: Duration) -> Self {
        Self {
            sample_name,
            elapsed,
            inner: StatusInner::Tle,
        }
    }

    pub fn re(sample_name: String, elapsed: Duration, err: Error) -> Self {
        Self {
            sample_name,
            elapsed,
            inner: StatusInner::Re {
                reason: format!("{:#}", err),
            },
        }
    }

    pub fn sample_name(&self) -> &str {
        &self.sample_name
    }

    pub fn kind(&self) -> StatusKind {
        self.inner.to_kind()
    }

    /// Prints the colored verdict line followed by the diff or error, if any.
    pub fn describe(&self, cnsl: &mut dyn Write) -> Result<()> {
        writeln!(
            cnsl,
            "{} {} ({}ms)",
            self.kind().styled(),
            self.sample_name,
            self.elapsed.as_millis()
        )?;
        self.inner.describe(cnsl)
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{} {} ({}ms)",
            self.kind(),
            self.sample_name,
            self.elapsed.as_millis()
        )
    }
}

#[derive(Serialize, Deserialize, Default, Debug, Clone, PartialEq, Eq, Hash)]
struct StatusCount {
    ac: usize,
    wa: usize,
    tle: usize,
    re: usize,
}

impl StatusCount {
    fn add(&mut self, kind: StatusKind) -> &mut Self {
        match kind {
            StatusKind::Ac => self.ac += 1,
            StatusKind::Wa => self.wa += 1,
            StatusKind::Tle => self.tle += 1,
            StatusKind::Re => self.re += 1,
        }
        self
    }

    fn total(&self) -> usize {
        self.ac + self.wa + self.tle + self.re
    }
}

/// Worst verdict over all samples, with counts.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Hash)]
pub struct TotalStatus {
    kind: StatusKind,
    count: StatusCount,
    statuses: Vec<Status>,
}

impl TotalStatus {
    pub fn new(statuses: Vec<Status>) -> Self {
        let (kind, count) = statuses.iter().fold(
            (StatusKind::Ac, StatusCount::default()),
            |(kind, mut count), status| {
                count.add(status.kind());
                (max(kind, status.kind()), count)
            },
        );

        Self {
            kind,
            count,
            statuses,
        }
    }

    pub fn kind(&self) -> StatusKind {
        self.kind
    }

    pub fn statuses(&self) -> &[Status] {
        &self.statuses
    }
}

impl fmt::Display for TotalStatus {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{:3} (AC: {:>2}/{t:>2}, WA: {:>2}/{t:>2}, TLE: {:>2}/{t:>2}, RE: {:>2}/{t:>2})",
            Into::<&'static str>::into(self.kind),
            self.count.ac,
            self.count.wa,
            self.count.tle,
            self.count.re,
            t = self.count.total()
        )
    }
}

#[cfg(test)]
mod tests {
    use anyhow::anyhow;

    use super::*;

    #[test]
    fn test_total_status() {
        let ms = Duration::from_millis(10);
        let statuses = vec![
            Status::judged("0".into(), ms, TextDiff::new("1\n".into(), "1\n".into())),
            Status::judged("1".into(), ms, TextDiff::new("1\n".into(), "2\n".into())),
            Status::tle("2".into(), ms),
        ];
        let total = TotalStatus::new(statuses);
        assert_eq!(total.kind(), StatusKind::Tle);
        assert_eq!(
            total.to_string(),
            "TLE (AC:  1/ 3, WA:  1/ 3, TLE:  1/ 3, RE:  0/ 3)"
        );
    }

    #[test]
    fn test_empty_total_is_ac() {
        assert_eq!(TotalStatus::new(Vec::new()).kind(), StatusKind::Ac);
    }

    #[test]
    fn test_status_display() {
        let status = Status::re("3".into(), Duration::from_millis(5), anyhow!("exit status: 1"));
        assert_eq!(status.kind(), StatusKind::Re);
        assert_eq!(status.to_string(), "RE 3 (5ms)");
    }
}
