use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use anyhow::{anyhow, Context as _};
use cookie_store::CookieStore;
use reqwest::multipart::Form;
use reqwest::redirect::Policy;
use reqwest::{Client, Method, Request, Response, StatusCode, Url};
use serde::Serialize;

use crate::abs_path::AbsPathBuf;
use crate::service::cookie::{load_into, store_from};
use crate::service::{CookieStorage, ResponseExt as _};
use crate::Result;

const USER_AGENT: &str = concat!("cfick/", env!("CARGO_PKG_VERSION"));
const MAX_REDIRECTS: usize = 10;

/// HTTP client sharing one in-memory cookie store across all requests.
///
/// Redirects are followed by hand so that cookies set on intermediate
/// responses are kept too.
pub struct Session {
    client: Client,
    base_url: Url,
    cookies: Mutex<CookieStore>,
}

impl Session {
    pub fn new(base_url: Url, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .redirect(Policy::none())
            .build()
            .context("Could not build http client")?;
        Ok(Self {
            client,
            base_url,
            cookies: Mutex::new(CookieStore::default()),
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Replaces the cookie store with the one saved at `path`.
    ///
    /// A missing or broken file leaves the session anonymous.
    pub fn load(&self, path: &AbsPathBuf) {
        match CookieStorage::open(path).and_then(|mut storage| storage.load()) {
            Ok(store) => *self.lock_cookies() = store,
            Err(err) => tracing::debug!("Starting without cookies ({}) : {:#}", path, err),
        }
    }

    pub fn save(&self, path: &AbsPathBuf) -> Result<()> {
        let mut storage = CookieStorage::open_or_create(path)?;
        let store = self.lock_cookies();
        storage
            .save(&store)
            .with_context(|| format!("Could not save cookies to {}", path))
    }

    /// Resolves `path` against the base url. Absolute urls are kept as they are.
    pub fn url(&self, path: &str) -> Result<Url> {
        self.base_url
            .join(path)
            .with_context(|| format!("Could not build url from {}", path))
    }

    pub async fn get(&self, url: Url) -> Result<Response> {
        let request = self.client.get(url).build()?;
        self.execute(request).await
    }

    /// GET that treats any non-success status as an error and returns the body.
    pub async fn get_text(&self, url: Url) -> Result<String> {
        let res = self.get(url.clone()).await?.error_for_status()?;
        res.text()
            .await
            .with_context(|| format!("Could not read body of {}", url))
    }

    pub async fn get_bytes(&self, url: Url) -> Result<Vec<u8>> {
        let res = self.get(url.clone()).await?.error_for_status()?;
        let bytes = res
            .bytes()
            .await
            .with_context(|| format!("Could not read body of {}", url))?;
        Ok(bytes.to_vec())
    }

    pub async fn post_form<T: Serialize + ?Sized>(&self, url: Url, form: &T) -> Result<Response> {
        let request = self.client.post(url).form(form).build()?;
        self.execute(request).await
    }

    pub async fn post_multipart(&self, url: Url, form: Form) -> Result<Response> {
        let request = self.client.post(url).multipart(form).build()?;
        self.execute(request).await
    }

    async fn execute(&self, mut request: Request) -> Result<Response> {
        for _ in 0..=MAX_REDIRECTS {
            load_into(&self.lock_cookies(), &mut request)?;
            let method = request.method().clone();
            let url = request.url().clone();
            let res = self
                .client
                .execute(request)
                .await
                .with_context(|| format!("Could not send request to {}", url))?;
            tracing::info!("{:7} {} ... {}", method.as_str(), url, res.status());
            store_from(&mut self.lock_cookies(), &res);

            let next_method = match res.status() {
                StatusCode::MOVED_PERMANENTLY | StatusCode::FOUND | StatusCode::SEE_OTHER => {
                    Method::GET
                }
                _ => return Ok(res),
            };
            let next_url = res.location_url(&url)?;
            request = self.client.request(next_method, next_url).build()?;
        }
        Err(anyhow!("Too many redirects (more than {})", MAX_REDIRECTS))
    }

    fn lock_cookies(&self) -> MutexGuard<CookieStore> {
        // poisoned only if a request panicked while storing cookies
        self.cookies
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
