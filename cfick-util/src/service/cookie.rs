use std::convert::TryFrom as _;
use std::fs::File;
use std::io::{BufReader, Seek as _, SeekFrom};

use anyhow::{anyhow, Context as _};
use cookie::Cookie as RawCookie;
use cookie_store::CookieStore;
use fs2::FileExt as _;
use reqwest::header::{HeaderValue, COOKIE, SET_COOKIE};
use reqwest::{Request, Response};

use crate::abs_path::AbsPathBuf;
use crate::{CfError, Error, Result};

/// Cookie file held under an exclusive lock until dropped.
pub struct CookieStorage {
    file: File,
}

impl CookieStorage {
    /// Opens an existing cookie file. A missing file is an error.
    pub fn open(path: &AbsPathBuf) -> Result<Self> {
        if !path.is_file() {
            return Err(anyhow!("Cookie file does not exist : {}", path));
        }
        Self::open_or_create(path)
    }

    pub fn open_or_create(path: &AbsPathBuf) -> Result<Self> {
        let file = path
            .create_dir_all_and_open(true, true)
            .map_err(|err| CfError::io(path, err))
            .context("Could not open cookies file")?;
        file.try_lock_exclusive()
            .context("Could not lock cookies file")?;
        Ok(Self { file })
    }

    pub fn load(&mut self) -> Result<CookieStore> {
        self.file.seek(SeekFrom::Start(0))?;
        CookieStore::load_json(BufReader::new(&self.file)).map_err(Error::msg)
    }

    pub fn save(&mut self, store: &CookieStore) -> Result<()> {
        self.file.seek(SeekFrom::Start(0))?;
        self.file.set_len(0)?;
        store
            .save_incl_expired_and_nonpersistent_json(&mut self.file)
            .map_err(Error::msg)
    }
}

impl Drop for CookieStorage {
    fn drop(&mut self) {
        if let Err(err) = self.file.unlock() {
            tracing::warn!("Could not unlock cookies file : {}", err);
        }
    }
}

/// Adds the cookies `store` holds for the request url as `Cookie` headers.
pub(crate) fn load_into(store: &CookieStore, request: &mut Request) -> Result<()> {
    let cookies = store
        .get_request_values(request.url())
        .map(|(name, value)| format!("{}={}", name, value))
        .collect::<Vec<_>>();
    for cookie in cookies {
        request
            .headers_mut()
            .append(COOKIE, HeaderValue::try_from(cookie)?);
    }
    Ok(())
}

/// Stores every parsable `Set-Cookie` header of `response`.
pub(crate) fn store_from(store: &mut CookieStore, response: &Response) {
    let cookies = response
        .headers()
        .get_all(SET_COOKIE)
        .iter()
        .filter_map(|val| val.to_str().ok())
        .filter_map(|cookie_str| RawCookie::parse(cookie_str.to_owned()).ok());
    store.store_response_cookies(cookies, response.url());
}
