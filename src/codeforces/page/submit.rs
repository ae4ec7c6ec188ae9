use anyhow::anyhow;
use scraper::{ElementRef, Html};

use cfick_util::model::ContestId;
use cfick_util::service::scrape::{ExtractCsrfToken, Scrape};
use cfick_util::service::Session;

use crate::codeforces::page::EnterPage;
use crate::Result;

/// Submission form of a contest. Only reachable when logged in.
pub struct SubmitPage {
    content: Html,
}

impl SubmitPage {
    pub fn path(contest_id: &ContestId) -> String {
        format!("/contest/{}/submit", contest_id)
    }

    pub async fn fetch(session: &Session, contest_id: &ContestId) -> Result<Self> {
        let res = session
            .get(session.url(&Self::path(contest_id))?)
            .await?
            .error_for_status()?;
        if res.url().path().starts_with(EnterPage::PATH) {
            return Err(anyhow!(
                "Not logged in. Log in first by `cfick login` command."
            ));
        }
        let text = res.text().await?;
        Ok(Self {
            content: Html::parse_document(&text),
        })
    }
}

impl Scrape for SubmitPage {
    fn elem(&self) -> ElementRef {
        self.content.root_element()
    }
}

impl ExtractCsrfToken for SubmitPage {}
