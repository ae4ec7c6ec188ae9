use getset::Getters;
use scraper::node::Node;
use scraper::{ElementRef, Html};
use serde::Serialize;

use cfick_util::service::scrape::Scrape as _;
use cfick_util::{select, CfError};

use crate::Result;

/// Statement document used when no `template_path` is configured.
pub const DEFAULT_STATEMENT_TEMPLATE: &str = r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8">
<style>
body { max-width: 50em; margin: 2em auto; font-family: sans-serif; line-height: 1.5; }
.header .title { font-size: 150%; font-weight: bold; }
.section-title { font-weight: bold; margin-top: 1em; }
.sample-test .input, .sample-test .output { border: 1px solid #888; margin: 0.5em 0; }
.sample-test .title { background: #eee; padding: 0 0.5em; }
pre { margin: 0; padding: 0.5em; }
img { max-width: 100%; }
</style>
<script type="text/x-mathjax-config">
MathJax.Hub.Config({ tex2jax: { inlineMath: [["$$$", "$$$"]], displayMath: [["$$$$$$", "$$$$$$"]] } });
</script>
<script src="https://cdnjs.cloudflare.com/ajax/libs/mathjax/2.7.9/MathJax.js?config=TeX-AMS_HTML"></script>
</head>
<body>
<div class="template-replace"></div>
</body>
</html>
"#;

/// Image referenced by a statement, renamed to a file next to `index.html`.
#[derive(Serialize, Getters, Debug, Clone, PartialEq, Eq, Hash)]
#[get = "pub"]
pub struct ImageRef {
    local: String,
    src: String,
}

/// `.problem-statement` fragment with image sources already rewritten.
#[derive(Serialize, Getters, Debug, Clone, PartialEq, Eq, Hash)]
#[get = "pub"]
pub struct RawStatement {
    fragment: String,
    images: Vec<ImageRef>,
}

/// Cuts the statement out of a problem page.
///
/// The i-th `img` with a non-empty `src` becomes `{i}.png`, in document order.
pub fn extract_statement(page: &str) -> Result<RawStatement> {
    let mut html = Html::parse_document(page);
    let root = html.root_element();
    let statement = root.find_first_or_err(select!(".problem-statement"), "problem statement")?;
    let statement_id = statement.id();
    let imgs = statement
        .select(select!("img"))
        .filter_map(|img| match img.value().attr("src") {
            Some(src) if !src.is_empty() => Some((img.id(), src.to_owned())),
            _ => None,
        })
        .collect::<Vec<_>>();

    let mut images = Vec::with_capacity(imgs.len());
    for (i, (img_id, src)) in imgs.into_iter().enumerate() {
        let local = format!("{}.png", i);
        if let Some(mut node) = html.tree.get_mut(img_id) {
            if let Node::Element(elem) = node.value() {
                for (name, value) in elem.attrs.iter_mut() {
                    if &*name.local == "src" {
                        *value = local.as_str().into();
                    }
                }
            }
        }
        images.push(ImageRef { local, src });
    }

    let fragment = html
        .tree
        .get(statement_id)
        .and_then(ElementRef::wrap)
        .map(|elem| elem.html())
        .ok_or_else(|| CfError::parse("problem statement"))?;
    Ok(RawStatement { fragment, images })
}

/// Puts `fragment` in place of the template's `.template-replace` element.
pub fn wrap(fragment: &str, template: &str) -> Result<String> {
    let document = Html::parse_document(template);
    let placeholder = document
        .root_element()
        .find_first(select!(".template-replace"))
        .ok_or_else(|| CfError::Template("no element with class template-replace".into()))?
        .html();
    Ok(document.html().replacen(&placeholder, fragment, 1))
}

#[cfg(test)]
mod tests {
    use cfick_util::assert_matches;

    use super::*;

    const PAGE: &str = r#"<html><body>
<div class="problem-statement">
  <div class="header"><div class="title">A. Sum</div></div>
  <p>Look at <img src="/predownloaded/aa/first.png"> and <img alt="broken"> <img src=""></p>
  <p><img class="tex-graphics" src="https://espresso.codeforces.com/second.png"></p>
</div>
<img src="/outside.png">
</body></html>"#;

    #[test]
    fn test_extract_statement_images() -> anyhow::Result<()> {
        let statement = extract_statement(PAGE)?;
        assert_eq!(
            statement.images(),
            &vec![
                ImageRef {
                    local: "0.png".into(),
                    src: "/predownloaded/aa/first.png".into()
                },
                ImageRef {
                    local: "1.png".into(),
                    src: "https://espresso.codeforces.com/second.png".into()
                },
            ]
        );

        let fragment = Html::parse_fragment(statement.fragment());
        let srcs = fragment
            .select(select!("img"))
            .filter_map(|img| img.value().attr("src"))
            .collect::<Vec<_>>();
        assert_eq!(srcs, vec!["0.png", "", "1.png"]);
        assert!(statement.fragment().starts_with("<div class=\"problem-statement\">"));
        assert!(!statement.fragment().contains("outside.png"));
        Ok(())
    }

    #[test]
    fn test_extract_statement_skips_empty_src() -> anyhow::Result<()> {
        let page = r#"<div class="problem-statement"><img src=""><img src="/a.png"></div>"#;
        let statement = extract_statement(page)?;
        assert_eq!(
            statement.images(),
            &vec![ImageRef {
                local: "0.png".into(),
                src: "/a.png".into()
            }]
        );
        Ok(())
    }

    #[test]
    fn test_extract_statement_is_stable() -> anyhow::Result<()> {
        assert_eq!(extract_statement(PAGE)?, extract_statement(PAGE)?);
        Ok(())
    }

    #[test]
    fn test_extract_statement_missing() {
        let err = extract_statement("<html><body><p>Not found</p></body></html>").unwrap_err();
        assert_matches!(err.downcast_ref::<CfError>() => Some(CfError::Parse(_)));
    }

    #[test]
    fn test_wrap() -> anyhow::Result<()> {
        let fragment = r#"<div class="problem-statement"><p>1 &lt; n</p></div>"#;
        let wrapped = wrap(fragment, DEFAULT_STATEMENT_TEMPLATE)?;
        assert!(wrapped.contains(fragment));
        assert!(!wrapped.contains("template-replace"));
        assert!(wrapped.contains("MathJax"));
        Ok(())
    }

    #[test]
    fn test_wrap_without_placeholder() {
        let err = wrap("<p>x</p>", "<html><body><div></div></body></html>").unwrap_err();
        assert_matches!(err.downcast_ref::<CfError>() => Some(CfError::Template(_)));
    }
}
