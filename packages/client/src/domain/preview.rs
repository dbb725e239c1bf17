//! Static preview: inline a project's stylesheets and scripts into one HTML document.

use std::sync::LazyLock;

use regex::{Captures, Regex};

use super::room::FileMap;

const NO_HTML_PLACEHOLDER: &str = r#"<div style="color:white; padding:20px;">No HTML file found</div>"#;

static LINK_TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"<link[^>]+href=["']([^"']+)["'][^>]*>"#).expect("link pattern is valid")
});

static SCRIPT_TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"<script[^>]+src=["']([^"']+)["'][^>]*></script>"#)
        .expect("script pattern is valid")
});

/// Pick the document to render: the open file if it is HTML, then `index.html`,
/// then the first HTML path.
fn entry_document<'a>(files: &'a FileMap, open_file: Option<&'a str>) -> Option<&'a str> {
    if let Some(open) = open_file.filter(|name| name.ends_with(".html"))
        && files.contains_key(open)
    {
        return Some(open);
    }
    if files.contains_key("index.html") {
        return Some("index.html");
    }
    files
        .keys()
        .find(|name| name.ends_with(".html"))
        .map(String::as_str)
}

fn inline(html: &str, pattern: &Regex, files: &FileMap, wrap: fn(&str) -> String) -> String {
    pattern
        .replace_all(html, |caps: &Captures| {
            let path = caps[1].trim_start_matches("./");
            match files.get(path) {
                Some(record) => wrap(&record.value),
                None => caps[0].to_string(),
            }
        })
        .into_owned()
}

/// Render the preview document for the current file set.
///
/// Local `<link href>` and `<script src>` references are replaced with the referenced
/// file's content; unknown references are left untouched.
pub fn render_preview(files: &FileMap, open_file: Option<&str>) -> String {
    if files.is_empty() {
        return String::new();
    }
    let Some(entry) = entry_document(files, open_file) else {
        return NO_HTML_PLACEHOLDER.to_string();
    };
    let Some(record) = files.get(entry) else {
        return NO_HTML_PLACEHOLDER.to_string();
    };

    let html = inline(&record.value, &LINK_TAG, files, |css| {
        format!("<style>{}</style>", css)
    });
    inline(&html, &SCRIPT_TAG, files, |js| format!("<script>{}</script>", js))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::room::{FileKind, FileRecord};

    fn files(entries: &[(&str, &str)]) -> FileMap {
        entries
            .iter()
            .map(|(name, value)| {
                (
                    name.to_string(),
                    FileRecord::new(*name, FileKind::File, *value),
                )
            })
            .collect()
    }

    #[test]
    fn test_stylesheet_link_is_inlined() {
        // テスト項目: <link href="./style.css"> が style.css の内容の <style> に置き換わる
        // given (前提条件):
        let files = files(&[
            ("index.html", r#"<link href="./style.css">"#),
            ("style.css", "body{color:red}"),
        ]);

        // when (操作):
        let doc = render_preview(&files, None);

        // then (期待する結果):
        assert!(doc.contains("<style>body{color:red}</style>"));
        assert!(!doc.contains("<link"));
    }

    #[test]
    fn test_script_src_is_inlined() {
        // テスト項目: <script src="app.js"></script> がスクリプト本体に置き換わる
        // given (前提条件):
        let files = files(&[
            ("index.html", r#"<body><script src="app.js"></script></body>"#),
            ("app.js", "console.log(1)"),
        ]);

        // when (操作):
        let doc = render_preview(&files, None);

        // then (期待する結果):
        assert_eq!(doc, "<body><script>console.log(1)</script></body>");
    }

    #[test]
    fn test_unknown_reference_is_left_untouched() {
        // テスト項目: 存在しないファイルへの参照はそのまま残る
        // given (前提条件):
        let html = r#"<link rel="stylesheet" href="https://cdn.example/x.css">"#;
        let files = files(&[("index.html", html)]);

        // when (操作):
        let doc = render_preview(&files, None);

        // then (期待する結果):
        assert_eq!(doc, html);
    }

    #[test]
    fn test_open_html_file_takes_priority() {
        // テスト項目: 開いているファイルが HTML ならそれが index.html より優先される
        // given (前提条件):
        let files = files(&[("index.html", "index"), ("about.html", "about")]);

        // when (操作):
        let doc = render_preview(&files, Some("about.html"));

        // then (期待する結果):
        assert_eq!(doc, "about");
    }

    #[test]
    fn test_falls_back_to_first_html_file() {
        // テスト項目: index.html がなければ最初の HTML ファイルが使われる
        // given (前提条件):
        let files = files(&[("pages/b.html", "b"), ("pages/a.html", "a"), ("x.js", "")]);

        // when (操作):
        let doc = render_preview(&files, Some("x.js"));

        // then (期待する結果):
        assert_eq!(doc, "a");
    }

    #[test]
    fn test_placeholder_without_html() {
        // テスト項目: HTML ファイルがない場合はプレースホルダー、ファイルが空なら空文字
        // given (前提条件):
        let only_js = files(&[("x.js", "")]);

        // when (操作) / then (期待する結果):
        assert!(render_preview(&only_js, None).contains("No HTML file found"));
        assert_eq!(render_preview(&FileMap::new(), None), "");
    }
}
