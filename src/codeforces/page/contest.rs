use scraper::{ElementRef, Html};

use cfick_util::model::{ContestId, ProblemId};
use cfick_util::service::scrape::Scrape;
use cfick_util::service::Session;
use cfick_util::{select, CfError};

use crate::Result;

/// Contest dashboard listing its problems.
pub struct ContestPage {
    content: Html,
}

impl ContestPage {
    pub fn path(contest_id: &ContestId) -> String {
        format!("/contest/{}", contest_id)
    }

    pub async fn fetch_text(session: &Session, contest_id: &ContestId) -> Result<String> {
        session
            .get_text(session.url(&Self::path(contest_id))?)
            .await
    }

    pub fn parse(text: &str) -> Self {
        Self {
            content: Html::parse_document(text),
        }
    }

    /// Problem indices from the `td.id` cells, in document order.
    pub fn extract_problem_ids(&self) -> Result<Vec<ProblemId>> {
        let ids = self
            .elem()
            .select(select!("td.id"))
            .map(|cell| {
                let text = cell
                    .find_first(select!("a"))
                    .map(|a| a.inner_text())
                    .unwrap_or_else(|| cell.inner_text());
                ProblemId::from(text.trim())
            })
            .collect::<Vec<_>>();
        if ids.is_empty() {
            return Err(CfError::parse("no problems on contest page").into());
        }
        Ok(ids)
    }
}

impl Scrape for ContestPage {
    fn elem(&self) -> ElementRef {
        self.content.root_element()
    }
}
