use std::time::Duration;

use getset::{CopyGetters, Getters};
use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};

use cfick_util::abs_path::AbsPathBuf;
use cfick_util::DATA_LOCAL_DIR;

static COOKIES_FILE_NAME: &str = "cookies.json";

lazy_static! {
    static ref COOKIES_PATH: AbsPathBuf = DATA_LOCAL_DIR.join(COOKIES_FILE_NAME);
}

#[derive(Serialize, Deserialize, Getters, CopyGetters, Debug, Clone, PartialEq, Eq, Hash)]
#[serde(default)]
pub struct SessionConfig {
    #[serde(with = "humantime_serde")]
    #[get_copy = "pub"]
    timeout: Duration,
    #[get = "pub"]
    cookies_path: AbsPathBuf,
}

impl SessionConfig {
    #[cfg(test)]
    pub fn default_in_dir(dir: &AbsPathBuf) -> Self {
        Self {
            cookies_path: dir.join(COOKIES_FILE_NAME),
            ..Self::default()
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            cookies_path: COOKIES_PATH.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserialize_partial() -> anyhow::Result<()> {
        let conf: SessionConfig = serde_yaml::from_str("timeout: 5s")?;
        assert_eq!(conf.timeout(), Duration::from_secs(5));
        assert_eq!(conf.cookies_path(), &*COOKIES_PATH);
        Ok(())
    }
}
