//! HTML documentation to markdown-like text.
//!
//! Only the signals endpoint extraction relies on are kept: inline code as
//! back-tick spans, preformatted blocks as fences, links with their targets,
//! headings and list items. Everything else collapses to plain text.

use scraper::{ElementRef, Html, Node};

const DROPPED: &[&str] = &[
    "script", "style", "noscript", "template", "svg", "head", "iframe",
];

const BLOCKS: &[&str] = &[
    "p",
    "div",
    "section",
    "article",
    "main",
    "header",
    "footer",
    "nav",
    "aside",
    "ul",
    "ol",
    "table",
    "thead",
    "tbody",
    "tr",
    "blockquote",
    "dl",
    "dt",
    "dd",
    "br",
    "hr",
    "body",
];

/// Convert an HTML document to markdown.
pub fn html_to_markdown(html: &str) -> String {
    let document = Html::parse_document(html);
    let mut out = String::new();
    render_children(document.root_element(), &mut out);
    tidy(&out)
}

fn render_children(element: ElementRef<'_>, out: &mut String) {
    for child in element.children() {
        match child.value() {
            Node::Text(text) => push_text(out, text),
            Node::Element(_) => {
                if let Some(child) = ElementRef::wrap(child) {
                    render_element(child, out);
                }
            }
            _ => {}
        }
    }
}

fn render_element(element: ElementRef<'_>, out: &mut String) {
    let name = element.value().name();
    if DROPPED.contains(&name) {
        return;
    }

    match name {
        "pre" => {
            let code: String = element.text().collect();
            push_fence(out, &code);
        }
        "code" => {
            let code: String = element.text().collect();
            if code.contains('\n') {
                push_fence(out, &code);
            } else if !code.trim().is_empty() {
                out.push('`');
                out.push_str(code.trim());
                out.push('`');
            }
        }
        "a" => {
            let text = inline(element);
            match element.value().attr("href") {
                Some(href) if !href.is_empty() && !href.starts_with('#') => {
                    out.push_str(&format!("[{text}]({href})"));
                }
                _ => out.push_str(&text),
            }
        }
        "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => {
            let level = name[1..].parse::<usize>().unwrap_or(1);
            out.push_str("\n\n");
            out.push_str(&"#".repeat(level));
            out.push(' ');
            out.push_str(&inline(element));
            out.push_str("\n\n");
        }
        "li" => {
            out.push_str("\n- ");
            out.push_str(&inline(element));
            out.push('\n');
        }
        "td" | "th" => {
            render_children(element, out);
            out.push_str(" | ");
        }
        _ if BLOCKS.contains(&name) => {
            out.push('\n');
            render_children(element, out);
            out.push('\n');
        }
        _ => render_children(element, out),
    }
}

/// Render children on a single line.
fn inline(element: ElementRef<'_>) -> String {
    let mut buf = String::new();
    render_children(element, &mut buf);
    collapse_whitespace(&buf)
}

fn push_text(out: &mut String, text: &str) {
    if text.trim().is_empty() {
        if !text.is_empty() && !out.ends_with([' ', '\n']) {
            out.push(' ');
        }
        return;
    }
    if text.starts_with(char::is_whitespace) && !out.ends_with([' ', '\n']) {
        out.push(' ');
    }
    out.push_str(&collapse_whitespace(text));
    if text.ends_with(char::is_whitespace) {
        out.push(' ');
    }
}

fn push_fence(out: &mut String, code: &str) {
    out.push_str("\n\n```\n");
    out.push_str(code.trim_matches('\n'));
    out.push_str("\n```\n\n");
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Trim trailing spaces and collapse runs of blank lines.
fn tidy(raw: &str) -> String {
    let mut out = String::new();
    let mut blank_run = 0;
    let mut in_fence = false;

    for line in raw.lines() {
        let line = if in_fence { line.trim_end() } else { line.trim() };
        if line.starts_with("```") {
            in_fence = !in_fence;
        }
        if line.is_empty() {
            blank_run += 1;
            if blank_run > 1 {
                continue;
            }
        } else {
            blank_run = 0;
        }
        out.push_str(line);
        out.push('\n');
    }

    out.trim().to_string()
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_code_links_and_headings() {
        let html = r#"<html><head><title>Docs</title><style>p{}</style></head><body>
            <h1>Chuck Norris API</h1>
            <p>Retrieve a random joke with <code>GET /jokes/random</code>.</p>
            <p>See <a href="https://api.chucknorris.io/jokes/categories">categories</a>.</p>
            <script>var endpoint = "/secret";</script>
        </body></html>"#;
        let md = html_to_markdown(html);

        assert!(md.contains("# Chuck Norris API"));
        assert!(md.contains("`GET /jokes/random`"));
        assert!(md.contains("[categories](https://api.chucknorris.io/jokes/categories)"));
        assert!(!md.contains("/secret"));
        assert!(!md.contains("Docs"));
    }

    #[test]
    fn test_pre_becomes_fence() {
        let html = "<pre><code>curl https://swapi.dev/api/people/\n</code></pre>";
        let md = html_to_markdown(html);
        assert_eq!(md, "```\ncurl https://swapi.dev/api/people/\n```");
    }

    #[test]
    fn test_list_items() {
        let html = "<ul><li>  <code>/people</code> all people</li><li>/planets</li></ul>";
        let md = html_to_markdown(html);
        assert!(md.contains("- `/people` all people"));
        assert!(md.contains("- /planets"));
    }

    #[test]
    fn test_fragment_links_keep_text_only() {
        let md = html_to_markdown(r##"<p><a href="#top">Back to top</a></p>"##);
        assert_eq!(md, "Back to top");
    }
}
