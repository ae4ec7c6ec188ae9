//! Scraping and form posting against the contest site.

mod actor;
mod download;
mod listing;
mod page;
mod samples;
mod statement;

pub use actor::CodeforcesActor;
pub use download::{Contest, DownloadReport, Downloader, Image, Problem, Statement};
pub use listing::{fetch_contest_listing, ContestEntry, Phase};
pub use samples::extract_samples;
pub use statement::{extract_statement, wrap, ImageRef, RawStatement, DEFAULT_STATEMENT_TEMPLATE};
