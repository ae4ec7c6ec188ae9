use std::fmt;
use std::io::Write;

use anyhow::{anyhow, Context as _};
use futures::future::join_all;
use getset::Getters;
use serde::Serialize;
use tokio::sync::OnceCell;

use cfick_util::abs_path::AbsPathBuf;
use cfick_util::console::Console;
use cfick_util::model::{ContestId, ProblemId, Samples};
use cfick_util::service::Session;

use crate::codeforces::page::{fetch_image, fetch_problem_page, ContestPage};
use crate::codeforces::samples::extract_samples;
use crate::codeforces::statement::{extract_statement, wrap, RawStatement};
use crate::config::Config;
use crate::Result;

/// Extracted statement and the document it is displayed in.
#[derive(Serialize, Getters, Debug, Clone, PartialEq, Eq, Hash)]
#[get = "pub"]
pub struct Statement {
    raw: RawStatement,
    wrapped: String,
}

#[derive(Serialize, Getters, Debug, Clone, PartialEq, Eq, Hash)]
#[get = "pub"]
pub struct Image {
    local: String,
    #[serde(skip)]
    bytes: Vec<u8>,
}

/// A problem whose parts are fetched and extracted at most once.
pub struct Problem<'a> {
    session: &'a Session,
    template: &'a str,
    contest_id: ContestId,
    problem_id: ProblemId,
    page: OnceCell<String>,
    statement: OnceCell<Statement>,
    images: OnceCell<Vec<Image>>,
    samples: OnceCell<Samples>,
}

impl<'a> Problem<'a> {
    pub fn new(
        session: &'a Session,
        template: &'a str,
        contest_id: ContestId,
        problem_id: ProblemId,
    ) -> Self {
        Self {
            session,
            template,
            contest_id,
            problem_id,
            page: OnceCell::new(),
            statement: OnceCell::new(),
            images: OnceCell::new(),
            samples: OnceCell::new(),
        }
    }

    pub fn contest_id(&self) -> &ContestId {
        &self.contest_id
    }

    pub fn problem_id(&self) -> &ProblemId {
        &self.problem_id
    }

    pub async fn page(&self) -> Result<&str> {
        let page = self
            .page
            .get_or_try_init(|| fetch_problem_page(self.session, &self.contest_id, &self.problem_id))
            .await?;
        Ok(page.as_str())
    }

    pub async fn statement(&self) -> Result<&Statement> {
        self.statement.get_or_try_init(|| self.load_statement()).await
    }

    pub async fn images(&self) -> Result<&[Image]> {
        let images = self.images.get_or_try_init(|| self.load_images()).await?;
        Ok(images.as_slice())
    }

    pub async fn samples(&self) -> Result<&Samples> {
        self.samples.get_or_try_init(|| self.load_samples()).await
    }

    /// Statement, then its images concurrently, then samples from the same page.
    pub async fn download(&self) -> Result<()> {
        self.statement().await?;
        self.images().await?;
        self.samples().await?;
        tracing::debug!("Downloaded {}/{}", self.contest_id, self.problem_id);
        Ok(())
    }

    async fn load_statement(&self) -> Result<Statement> {
        let raw = extract_statement(self.page().await?)?;
        let wrapped = wrap(raw.fragment(), self.template)?;
        Ok(Statement { raw, wrapped })
    }

    async fn load_images(&self) -> Result<Vec<Image>> {
        let statement = self.statement().await?;
        let fetches = statement.raw().images().iter().map(|image| async move {
            let bytes = fetch_image(self.session, image.src())
                .await
                .with_context(|| format!("Could not download image {}", image.src()))?;
            Ok(Image {
                local: image.local().clone(),
                bytes,
            })
        });
        join_all(fetches).await.into_iter().collect()
    }

    async fn load_samples(&self) -> Result<Samples> {
        extract_samples(self.page().await?)
    }

    /// Writes everything downloaded so far under `dir`.
    pub fn save(
        &self,
        dir: &AbsPathBuf,
        base_dir: Option<&AbsPathBuf>,
        cnsl: &mut dyn Write,
    ) -> Result<()> {
        let statement = self
            .statement
            .get()
            .context("Statement is not downloaded yet")?;
        let statement_dir = dir.join("statement");
        statement_dir
            .join("index.html")
            .write_pretty(statement.wrapped().as_bytes(), base_dir, cnsl)?;
        for image in self.images.get().map(Vec::as_slice).unwrap_or_default() {
            statement_dir
                .join(image.local())
                .write_pretty(image.bytes(), base_dir, cnsl)?;
        }
        if let Some(samples) = self.samples.get() {
            samples.save(dir, base_dir, cnsl)?;
        }
        Ok(())
    }
}

/// A contest whose page and problem list are fetched at most once.
pub struct Contest<'a> {
    session: &'a Session,
    template: &'a str,
    contest_id: ContestId,
    page: OnceCell<String>,
    problems: OnceCell<Vec<Problem<'a>>>,
}

impl<'a> Contest<'a> {
    pub fn new(session: &'a Session, template: &'a str, contest_id: ContestId) -> Self {
        Self {
            session,
            template,
            contest_id,
            page: OnceCell::new(),
            problems: OnceCell::new(),
        }
    }

    pub fn contest_id(&self) -> &ContestId {
        &self.contest_id
    }

    pub async fn page(&self) -> Result<&str> {
        let page = self
            .page
            .get_or_try_init(|| ContestPage::fetch_text(self.session, &self.contest_id))
            .await?;
        Ok(page.as_str())
    }

    pub async fn problems(&self) -> Result<&[Problem<'a>]> {
        let problems = self
            .problems
            .get_or_try_init(|| self.load_problems())
            .await?;
        Ok(problems.as_slice())
    }

    async fn load_problems(&self) -> Result<Vec<Problem<'a>>> {
        let problem_ids = ContestPage::parse(self.page().await?).extract_problem_ids()?;
        let problems = problem_ids
            .into_iter()
            .map(|problem_id| {
                Problem::new(
                    self.session,
                    self.template,
                    self.contest_id.clone(),
                    problem_id,
                )
            })
            .collect();
        Ok(problems)
    }
}

/// What happened to each problem of a contest download.
#[derive(Serialize, Getters, Debug, Clone, PartialEq, Eq, Hash)]
#[get = "pub"]
pub struct DownloadReport {
    contest_id: ContestId,
    saved: Vec<ProblemId>,
    failed: Vec<(ProblemId, String)>,
}

impl DownloadReport {
    /// Turns any failed problem into an error.
    pub fn into_result(self) -> Result<Self> {
        if self.failed.is_empty() {
            return Ok(self);
        }
        let ids = self
            .failed
            .iter()
            .map(|(id, _)| id.to_string())
            .collect::<Vec<_>>();
        Err(anyhow!(
            "Could not download {} problem(s) of contest {} : {}",
            ids.len(),
            self.contest_id,
            ids.join(", ")
        ))
    }
}

impl fmt::Display for DownloadReport {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Saved {} problem(s) of contest {}", self.saved.len(), self.contest_id)?;
        for (id, reason) in &self.failed {
            write!(f, "\n  {} : {}", id, reason)?;
        }
        Ok(())
    }
}

/// Downloads problems and writes them into the work dir.
pub struct Downloader<'a> {
    conf: &'a Config,
    session: &'a Session,
    template: String,
}

impl<'a> Downloader<'a> {
    pub fn new(conf: &'a Config, session: &'a Session) -> Result<Self> {
        let template = conf.load_statement_template()?;
        Ok(Self {
            conf,
            session,
            template,
        })
    }

    /// Downloads every problem of a contest concurrently.
    ///
    /// A failing problem is reported in the result and does not stop the others.
    pub async fn download_contest(
        &self,
        contest_id: &ContestId,
        cnsl: &mut Console,
    ) -> Result<DownloadReport> {
        let contest = Contest::new(self.session, &self.template, contest_id.clone());
        let problems = contest
            .problems()
            .await
            .with_context(|| format!("Could not list problems of contest {}", contest_id))?;

        let pb = cnsl.build_pb_count(problems.len() as u64, contest_id.as_ref());
        let results = join_all(problems.iter().map(|problem| {
            let pb = &pb;
            async move {
                let result = problem.download().await;
                pb.inc(1);
                result
            }
        }))
        .await;
        pb.finish_and_clear();

        let mut report = DownloadReport {
            contest_id: contest_id.clone(),
            saved: Vec::new(),
            failed: Vec::new(),
        };
        for (problem, result) in problems.iter().zip(results) {
            let result = result.and_then(|_| self.save(problem, cnsl));
            match result {
                Ok(()) => report.saved.push(problem.problem_id().clone()),
                Err(err) => {
                    cnsl.warn(&format!(
                        "Could not download problem {} : {:#}",
                        problem.problem_id(),
                        err
                    ))?;
                    report
                        .failed
                        .push((problem.problem_id().clone(), format!("{:#}", err)));
                }
            }
        }
        Ok(report)
    }

    pub async fn download_problem(
        &self,
        contest_id: &ContestId,
        problem_id: &ProblemId,
        cnsl: &mut Console,
    ) -> Result<()> {
        let problem = Problem::new(
            self.session,
            &self.template,
            contest_id.clone(),
            problem_id.clone(),
        );
        problem
            .download()
            .await
            .with_context(|| format!("Could not download problem {}/{}", contest_id, problem_id))?;
        self.save(&problem, cnsl)
    }

    fn save(&self, problem: &Problem, cnsl: &mut Console) -> Result<()> {
        let (contest_id, problem_id) = (problem.contest_id(), problem.problem_id());
        let base_dir = self.conf.base_dir();
        let dir = self.conf.problem_dir(contest_id, problem_id);
        problem.save(&dir, Some(base_dir), cnsl)?;
        self.conf
            .expand_and_save_source(contest_id, problem_id, cnsl)?;
        Ok(())
    }
}
