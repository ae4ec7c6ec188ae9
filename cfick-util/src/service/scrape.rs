use scraper::node::Node;
use scraper::{ElementRef, Selector};

use crate::{select, CfError, Result};

pub trait Scrape {
    fn elem(&self) -> ElementRef;

    fn find_first(&self, selector: &Selector) -> Option<ElementRef> {
        self.elem().select(selector).next()
    }

    /// Like `find_first` but a missing element is a `CfError::Parse` naming `what`.
    fn find_first_or_err(&self, selector: &Selector, what: &str) -> Result<ElementRef> {
        self.find_first(selector)
            .ok_or_else(|| CfError::parse(format!("could not find {}", what)).into())
    }

    fn inner_text(&self) -> String {
        self.elem().text().fold(String::new(), |mut ret, s| {
            ret.push_str(s);
            ret
        })
    }

    /// Text content where each `<br>` becomes a newline and each `div` is
    /// followed by one.
    fn text_with_breaks(&self) -> String {
        let mut ret = String::new();
        push_text_with_breaks(self.elem(), &mut ret);
        ret
    }
}

fn push_text_with_breaks(elem: ElementRef, ret: &mut String) {
    for child in elem.children() {
        match child.value() {
            Node::Text(text) => ret.push_str(text),
            Node::Element(e) if e.name() == "br" => ret.push('\n'),
            Node::Element(e) => {
                if let Some(child_elem) = ElementRef::wrap(child) {
                    push_text_with_breaks(child_elem, ret);
                }
                if e.name() == "div" {
                    ret.push('\n');
                }
            }
            _ => {}
        }
    }
}

impl Scrape for ElementRef<'_> {
    fn elem(&self) -> ElementRef {
        *self
    }
}

pub trait ExtractCsrfToken: Scrape {
    fn extract_csrf_token(&self) -> Result<String> {
        let token = self
            .find_first(select!("[name=\"csrf_token\"]"))
            .and_then(|elem| elem.value().attr("value"))
            .unwrap_or_default();
        if token.is_empty() {
            tracing::trace!("Page without csrf token :\n{}", self.elem().html());
            return Err(CfError::parse("could not find csrf token").into());
        }
        Ok(token.to_owned())
    }
}

impl ExtractCsrfToken for ElementRef<'_> {}

#[cfg(test)]
mod tests {
    use scraper::Html;

    use super::*;
    use crate::assert_matches;

    #[test]
    fn test_text_with_breaks() {
        let tests = &[
            ("<pre>1 2<br>3 4<br></pre>", "1 2\n3 4\n"),
            ("<pre>1 2\n3 4\n</pre>", "1 2\n3 4\n"),
            (
                "<pre><div class=\"test-example-line\">3</div><div>1 2</div></pre>",
                "3\n1 2\n",
            ),
            ("<pre><span>a<br>b</span></pre>", "a\nb"),
        ];
        for (html, expected) in tests {
            let html = Html::parse_fragment(html);
            let root = html.root_element();
            let pre = root.find_first(select!("pre")).unwrap();
            assert_eq!(&pre.text_with_breaks(), expected);
        }
    }

    #[test]
    fn test_extract_csrf_token() -> anyhow::Result<()> {
        let html = Html::parse_document(
            r#"<form><input type="hidden" name="csrf_token" value="0123abcd"/></form>"#,
        );
        assert_eq!(html.root_element().extract_csrf_token()?, "0123abcd");

        for page in &[
            r#"<form><input name="handle"/></form>"#,
            r#"<form><input name="csrf_token" value=""/></form>"#,
        ] {
            let html = Html::parse_document(page);
            let err = html.root_element().extract_csrf_token().unwrap_err();
            assert_matches!(err.downcast_ref::<CfError>() => Some(CfError::Parse(_)));
        }
        Ok(())
    }

    #[test]
    fn test_find_first_or_err() {
        let html = Html::parse_document("<div class=\"input\"></div>");
        let root = html.root_element();
        assert!(root.find_first_or_err(select!(".input"), "input").is_ok());
        let err = root.find_first_or_err(select!("pre"), "pre").unwrap_err();
        assert_eq!(err.to_string(), "Could not parse page : could not find pre");
    }
}
