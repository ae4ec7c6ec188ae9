use scraper::{ElementRef, Html};

use cfick_util::select;
use cfick_util::service::scrape::Scrape;

mod contest;
mod enter;
mod problem;
mod submit;

pub use contest::ContestPage;
pub use enter::EnterPage;
pub use problem::{fetch_image, fetch_problem_page};
pub use submit::SubmitPage;

/// Forms on the site report rejected input in `span.error`.
pub trait ExtractFormError: Scrape {
    fn extract_form_error(&self) -> Option<String> {
        self.elem()
            .select(select!("span.error"))
            .map(|elem| elem.inner_text().trim().to_owned())
            .find(|text| !text.is_empty())
    }
}

/// Page returned in response to a form post.
pub struct FormResultPage(Html);

impl FormResultPage {
    pub fn parse(text: &str) -> Self {
        Self(Html::parse_document(text))
    }
}

impl Scrape for FormResultPage {
    fn elem(&self) -> ElementRef {
        self.0.root_element()
    }
}

impl ExtractFormError for FormResultPage {}
