use std::path::Path;

use crate::{CfError, Result};

pub type LangId = String;

pub type LangIdRef<'a> = &'a str;

/// Submission language ids by source file extension.
static LANG_IDS: &[(&str, &str)] = &[
    ("cpp", "42"),
    ("cc", "42"),
    ("cxx", "42"),
    ("c", "43"),
    ("py", "31"),
    ("java", "36"),
    ("go", "32"),
    ("rs", "75"),
];

pub fn infer_lang_id(ext: &str) -> Result<LangId> {
    LANG_IDS
        .iter()
        .find(|(e, _)| *e == ext)
        .map(|(_, id)| (*id).to_owned())
        .ok_or_else(|| CfError::UnsupportedLanguage(ext.to_owned()).into())
}

/// Picks the language for `path`: the explicit id if any, else by extension.
pub fn resolve_lang_id(path: &Path, explicit: Option<LangIdRef<'_>>) -> Result<LangId> {
    if let Some(id) = explicit {
        return Ok(id.to_owned());
    }
    let ext = path
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or_default();
    infer_lang_id(ext)
}
