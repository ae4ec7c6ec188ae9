use scraper::{ElementRef, Html};

use cfick_util::model::Samples;
use cfick_util::select;
use cfick_util::service::scrape::Scrape as _;

use crate::Result;

/// Collects example inputs and outputs from the statement of a problem page.
///
/// Inputs and outputs are read independently, so their counts may differ.
pub fn extract_samples(page: &str) -> Result<Samples> {
    let html = Html::parse_document(page);
    let root = html.root_element();
    let statement = root.find_first_or_err(select!(".problem-statement"), "problem statement")?;

    let inputs = statement
        .select(select!(".input"))
        .map(block_text)
        .collect::<Result<Vec<_>>>()?;
    let outputs = statement
        .select(select!(".output"))
        .map(block_text)
        .collect::<Result<Vec<_>>>()?;
    Ok(Samples::new(inputs, outputs))
}

fn block_text(block: ElementRef) -> Result<String> {
    let pre = block.find_first_or_err(select!("pre"), "pre in sample block")?;
    Ok(pre.text_with_breaks())
}
