use std::path::Path;

use crate::abs_path::AbsPathBuf;
use crate::model::{ContestId, ProblemId};
use crate::{regex, Result};

/// What a working directory refers to, judged by the shape of its path.
///
/// `.../741` is a contest and `.../741/A` is one of its problems.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Target {
    Contest(ContestId),
    Problem(ContestId, ProblemId),
    None,
}

impl Target {
    pub fn from_path(path: &Path) -> Self {
        let name = match path.file_name().and_then(|name| name.to_str()) {
            Some(name) => name,
            None => return Self::None,
        };
        if ContestId::is_valid(name) {
            return Self::Contest(name.into());
        }
        let parent = path
            .parent()
            .and_then(|parent| parent.file_name())
            .and_then(|name| name.to_str());
        match parent {
            Some(parent) if ContestId::is_valid(parent) && is_problem_index(name) => {
                Self::Problem(parent.into(), name.into())
            }
            _ => Self::None,
        }
    }

    pub fn contest_id(&self) -> Option<&ContestId> {
        match self {
            Self::Contest(contest_id) | Self::Problem(contest_id, _) => Some(contest_id),
            Self::None => None,
        }
    }

    pub fn problem_id(&self) -> Option<&ProblemId> {
        match self {
            Self::Problem(_, problem_id) => Some(problem_id),
            _ => None,
        }
    }
}

fn is_problem_index(name: &str) -> bool {
    regex!(r"^[A-Za-z][0-9]*$").is_match(name)
}

/// Finds the most recently modified contest directory directly under `base_dir`.
pub fn latest_contest(base_dir: &AbsPathBuf) -> Result<Option<ContestId>> {
    let latest = base_dir
        .sub_dirs()?
        .into_iter()
        .filter(|dir| dir.file_name().map_or(false, ContestId::is_valid))
        .max_by_key(|dir| dir.modified());
    Ok(latest.and_then(|dir| dir.file_name().map(ContestId::from)))
}
