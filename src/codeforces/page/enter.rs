use scraper::{ElementRef, Html};

use cfick_util::service::scrape::{ExtractCsrfToken, Scrape};
use cfick_util::service::Session;

use crate::Result;

/// Login form.
pub struct EnterPage {
    content: Html,
}

impl EnterPage {
    pub const PATH: &'static str = "/enter";

    pub async fn fetch(session: &Session) -> Result<Self> {
        let text = session.get_text(session.url(Self::PATH)?).await?;
        Ok(Self {
            content: Html::parse_document(&text),
        })
    }
}

impl Scrape for EnterPage {
    fn elem(&self) -> ElementRef {
        self.content.root_element()
    }
}

impl ExtractCsrfToken for EnterPage {}
