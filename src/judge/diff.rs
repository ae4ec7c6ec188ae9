use std::cmp::max;
use std::fmt;

use getset::CopyGetters;
use itertools::{EitherOrBoth, Itertools as _};
use serde::{Deserialize, Serialize};

use cfick_util::console::{sty_dim, sty_r};

/// Expected and actual output, compared line by line.
///
/// Trailing whitespace on each line and trailing blank lines are ignored.
#[derive(Serialize, Deserialize, CopyGetters, Debug, Clone, PartialEq, Eq, Hash)]
pub struct TextDiff {
    #[get_copy = "pub"]
    l_len: usize,
    #[get_copy = "pub"]
    r_len: usize,
    #[get_copy = "pub"]
    is_any: bool,
    left: String,
    right: String,
}

impl TextDiff {
    pub fn new(left: String, right: String) -> Self {
        let (l_len, r_len, is_any) =
            Self::lines(&left, &right).fold((0, 0, false), |(l_len, r_len, is_any), (l, r)| {
                (
                    max(l_len, l.len()),
                    max(r_len, r.len()),
                    is_any || !Self::line_matches(l, r),
                )
            });

        Self {
            l_len,
            r_len,
            is_any,
            left,
            right,
        }
    }

    fn line_matches(l: &str, r: &str) -> bool {
        l.trim_end() == r.trim_end()
    }

    fn lines<'a>(left: &'a str, right: &'a str) -> impl Iterator<Item = (&'a str, &'a str)> {
        let (l_iter, r_iter) = (left.lines(), right.lines());
        l_iter.zip_longest(r_iter).map(|pair| match pair {
            EitherOrBoth::Both(l, r) => (l, r),
            EitherOrBoth::Left(l) => (l, ""),
            EitherOrBoth::Right(r) => ("", r),
        })
    }

    fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        Self::lines(&self.left, &self.right)
    }
}

impl fmt::Display for TextDiff {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let l_len = max(self.l_len, "expected".len());
        writeln!(
            f,
            "{}",
            sty_dim(format!("{:l_len$} | {}", "expected", "actual", l_len = l_len))
        )?;
        for (l, r) in self.iter() {
            let line = format!("{:l_len$} | {}", l, r, l_len = l_len);
            if Self::line_matches(l, r) {
                writeln!(f, "{}", line)?;
            } else {
                writeln!(f, "{}", sty_r(line))?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trailing_whitespace_is_ignored() {
        let diff = TextDiff::new("1 2\n3\n".into(), "1 2  \n3\n\n".into());
        assert!(!diff.is_any());
        assert_eq!(diff.l_len(), 3);
        assert_eq!(diff.r_len(), 5);
    }

    #[test]
    fn test_mismatch() {
        let diff = TextDiff::new("YES\n".into(), "NO\nYES\n".into());
        assert!(diff.is_any());
    }

    #[test]
    fn test_display_side_by_side() {
        console::set_colors_enabled(false);
        let diff = TextDiff::new("6\n".into(), "7\n".into());
        assert_eq!(diff.to_string(), "expected | actual\n6        | 7\n");
    }
}
