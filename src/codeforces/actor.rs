use anyhow::Context as _;
use maplit::hashmap;
use reqwest::multipart::{Form, Part};
use reqwest::{Response, StatusCode};

use cfick_util::abs_path::AbsPathBuf;
use cfick_util::model::{resolve_lang_id, ContestId, LangId, LangIdRef, ProblemId};
use cfick_util::service::scrape::ExtractCsrfToken as _;
use cfick_util::service::Session;
use cfick_util::CfError;

use crate::codeforces::page::{EnterPage, ExtractFormError as _, FormResultPage, SubmitPage};
use crate::Result;

/// Performs the state-changing form posts of the site.
///
/// Cookies are written back to `cookies_path` only after a post succeeds.
pub struct CodeforcesActor<'a> {
    session: &'a Session,
    cookies_path: &'a AbsPathBuf,
}

impl<'a> CodeforcesActor<'a> {
    pub fn new(session: &'a Session, cookies_path: &'a AbsPathBuf) -> Self {
        Self {
            session,
            cookies_path,
        }
    }

    pub async fn login(&self, user: &str, pass: &str) -> Result<()> {
        let enter_page = EnterPage::fetch(self.session).await?;
        let payload = hashmap!(
            "csrf_token" => enter_page.extract_csrf_token()?,
            "action" => "enter".to_owned(),
            "handle" => user.to_owned(),
            "password" => pass.to_owned(),
            "remember" => "on".to_owned(),
        );
        let res = self
            .session
            .post_form(self.session.url(EnterPage::PATH)?, &payload)
            .await?;

        if let Some((status, reason)) = rejection(res).await? {
            return Err(CfError::Auth { status, reason }.into());
        }
        tracing::debug!("Logged in as {}", user);
        self.session.save(self.cookies_path)
    }

    /// Submits `file` and returns the language id it was submitted as.
    pub async fn submit(
        &self,
        file: &AbsPathBuf,
        contest_id: &ContestId,
        problem_id: &ProblemId,
        lang_id: Option<LangIdRef<'_>>,
    ) -> Result<LangId> {
        let lang_id = resolve_lang_id(file.as_ref(), lang_id)?;
        let source = file
            .read_bytes()
            .context("Could not read source file")?;

        let submit_page = SubmitPage::fetch(self.session, contest_id).await?;
        let file_name = file.file_name().unwrap_or("source").to_owned();
        let source_part = Part::bytes(source).file_name(file_name);
        let form = Form::new()
            .text("csrf_token", submit_page.extract_csrf_token()?)
            .text("action", "submitSolutionFormSubmitted")
            .text("submittedProblemIndex", problem_id.to_string())
            .text("programTypeId", lang_id.clone())
            .part("source", source_part);
        let res = self
            .session
            .post_multipart(self.session.url(&SubmitPage::path(contest_id))?, form)
            .await?;

        if let Some((status, reason)) = rejection(res).await? {
            return Err(CfError::Submission { status, reason }.into());
        }
        tracing::debug!("Submitted {} to {}/{}", file, contest_id, problem_id);
        self.session.save(self.cookies_path)?;
        Ok(lang_id)
    }
}

/// Why the site turned a form post down, if it did.
async fn rejection(res: Response) -> Result<Option<(StatusCode, String)>> {
    let status = res.status();
    if !status.is_success() {
        let reason = status.canonical_reason().unwrap_or("unknown status").to_owned();
        return Ok(Some((status, reason)));
    }
    let text = res.text().await?;
    Ok(FormResultPage::parse(&text)
        .extract_form_error()
        .map(|reason| (status, reason)))
}

#[cfg(test)]
mod tests {
    use std::io::Write as _;
    use std::time::Duration;

    use reqwest::Url;
    use tempfile::tempdir;
    use wiremock::matchers::{body_string_contains, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use cfick_util::assert_matches;

    const ENTER_PAGE: &str = r#"<form method="post" action="/enter">
<input type="hidden" name="csrf_token" value="0123abcd"/>
<input name="handle"/><input type="password" name="password"/>
</form>"#;

    async fn mount_enter(server: &MockServer, post: ResponseTemplate) {
        Mock::given(method("GET"))
            .and(path("/enter"))
            .respond_with(ResponseTemplate::new(200).set_body_string(ENTER_PAGE))
            .mount(server)
            .await;
        Mock::given(method("POST"))
            .and(path("/enter"))
            .and(body_string_contains("csrf_token=0123abcd"))
            .and(body_string_contains("handle=tourist"))
            .respond_with(post)
            .expect(1)
            .mount(server)
            .await;
    }

    fn new_session(server: &MockServer) -> anyhow::Result<Session> {
        Session::new(Url::parse(&server.uri())?, Duration::from_secs(5))
    }

    #[tokio::test]
    async fn test_login_saves_cookies() -> anyhow::Result<()> {
        let server = MockServer::start().await;
        mount_enter(
            &server,
            ResponseTemplate::new(302)
                .insert_header("Set-Cookie", "JSESSIONID=abc; Path=/")
                .insert_header("Location", "/profile"),
        )
        .await;
        Mock::given(method("GET"))
            .and(path("/profile"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<p>tourist</p>"))
            .mount(&server)
            .await;

        let test_dir = tempdir()?;
        let cookies_path = AbsPathBuf::try_new(test_dir.path())?.join("cookies.json");
        let session = new_session(&server)?;
        CodeforcesActor::new(&session, &cookies_path)
            .login("tourist", "pass")
            .await?;
        assert!(cookies_path.is_file());
        let saved = String::from_utf8(cookies_path.read_bytes()?)?;
        assert!(saved.contains("JSESSIONID"), "{}", saved);
        Ok(())
    }

    #[tokio::test]
    async fn test_login_rejected_status() -> anyhow::Result<()> {
        let server = MockServer::start().await;
        mount_enter(&server, ResponseTemplate::new(403)).await;

        let test_dir = tempdir()?;
        let cookies_path = AbsPathBuf::try_new(test_dir.path())?.join("cookies.json");
        let session = new_session(&server)?;
        let err = CodeforcesActor::new(&session, &cookies_path)
            .login("tourist", "pass")
            .await
            .unwrap_err();
        assert_matches!(
            err.downcast_ref::<CfError>() => Some(CfError::Auth { status, .. }) if *status == StatusCode::FORBIDDEN
        );
        assert!(!cookies_path.is_file());
        Ok(())
    }

    #[tokio::test]
    async fn test_login_rejected_form() -> anyhow::Result<()> {
        let server = MockServer::start().await;
        mount_enter(
            &server,
            ResponseTemplate::new(200).set_body_string(
                r#"<span class="error for__password">Invalid handle/email or password</span>"#,
            ),
        )
        .await;

        let test_dir = tempdir()?;
        let cookies_path = AbsPathBuf::try_new(test_dir.path())?.join("cookies.json");
        let session = new_session(&server)?;
        let err = CodeforcesActor::new(&session, &cookies_path)
            .login("tourist", "wrong")
            .await
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Login failed (200 OK) : Invalid handle/email or password"
        );
        assert!(!cookies_path.is_file());
        Ok(())
    }

    #[tokio::test]
    async fn test_submit() -> anyhow::Result<()> {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/contest/741/submit"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"<form><input type="hidden" name="csrf_token" value="fresh"/></form>"#,
            ))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/contest/741/submit"))
            .and(body_string_contains("fresh"))
            .and(body_string_contains("submitSolutionFormSubmitted"))
            .and(body_string_contains("int main"))
            .respond_with(ResponseTemplate::new(302).insert_header("Location", "/contest/741/my"))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/contest/741/my"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<p>In queue</p>"))
            .mount(&server)
            .await;

        let test_dir = tempdir()?;
        let dir = AbsPathBuf::try_new(test_dir.path())?;
        let cookies_path = dir.join("cookies.json");
        let source_path = dir.join("main.cpp");
        source_path.save(|mut file| Ok(file.write_all(b"int main() {}")?), true)?;

        let session = new_session(&server)?;
        let lang_id = CodeforcesActor::new(&session, &cookies_path)
            .submit(&source_path, &"741".into(), &"a".into(), None)
            .await?;
        assert_eq!(lang_id, "42");
        assert!(cookies_path.is_file());
        Ok(())
    }

    #[tokio::test]
    async fn test_submit_unsupported_language() -> anyhow::Result<()> {
        let server = MockServer::start().await;
        let test_dir = tempdir()?;
        let dir = AbsPathBuf::try_new(test_dir.path())?;
        let source_path = dir.join("main.kt");
        source_path.save(|_| Ok(()), true)?;

        let session = new_session(&server)?;
        let err = CodeforcesActor::new(&session, &dir.join("cookies.json"))
            .submit(&source_path, &"741".into(), &"A".into(), None)
            .await
            .unwrap_err();
        assert_matches!(err.downcast_ref::<CfError>() => Some(CfError::UnsupportedLanguage(_)));
        Ok(())
    }

    #[tokio::test]
    async fn test_submit_requires_login() -> anyhow::Result<()> {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/contest/741/submit"))
            .respond_with(
                ResponseTemplate::new(302)
                    .insert_header("Location", "/enter?back=%2Fcontest%2F741%2Fsubmit"),
            )
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/enter"))
            .respond_with(ResponseTemplate::new(200).set_body_string(ENTER_PAGE))
            .mount(&server)
            .await;

        let test_dir = tempdir()?;
        let dir = AbsPathBuf::try_new(test_dir.path())?;
        let source_path = dir.join("main.py");
        source_path.save(|_| Ok(()), true)?;

        let session = new_session(&server)?;
        let err = CodeforcesActor::new(&session, &dir.join("cookies.json"))
            .submit(&source_path, &"741".into(), &"A".into(), None)
            .await
            .unwrap_err();
        assert!(err.to_string().starts_with("Not logged in"));
        Ok(())
    }
}
