use std::fmt;
use std::str::FromStr;

use anyhow::anyhow;
use serde::{Deserialize, Serialize};

use crate::{regex, Error};

/// Numeric contest id, e.g. `741`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ContestId(String);

impl ContestId {
    pub fn is_valid(id: &str) -> bool {
        regex!(r"^\d+$").is_match(id)
    }
}

impl<T: Into<String>> From<T> for ContestId {
    fn from(id: T) -> Self {
        Self(id.into())
    }
}

impl FromStr for ContestId {
    type Err = Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        if !Self::is_valid(s) {
            return Err(anyhow!("Contest id must be a number : {}", s));
        }
        Ok(Self::from(s))
    }
}

impl AsRef<str> for ContestId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContestId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.0)
    }
}
