use cfick_util::model::{ContestId, ProblemId};
use cfick_util::service::Session;

use crate::Result;

pub fn problem_path(contest_id: &ContestId, problem_id: &ProblemId) -> String {
    format!("/contest/{}/problem/{}", contest_id, problem_id)
}

pub async fn fetch_problem_page(
    session: &Session,
    contest_id: &ContestId,
    problem_id: &ProblemId,
) -> Result<String> {
    session
        .get_text(session.url(&problem_path(contest_id, problem_id))?)
        .await
}

/// Downloads an image. `src` may be absolute or relative to the site.
pub async fn fetch_image(session: &Session, src: &str) -> Result<Vec<u8>> {
    session.get_bytes(session.url(src)?).await
}
