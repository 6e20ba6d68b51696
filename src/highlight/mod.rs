//! Syntax highlighting of snippets into standalone HTML pages.
//!
//! Rendering happens whenever a snippet is written, and the result is stored next to the
//! source. Reads never re-render.

use lazy_static::lazy_static;
use std::fmt::Write as _;
use syntect::easy::HighlightLines;
use syntect::highlighting::{Theme, ThemeSet};
use syntect::html::{
    start_highlighted_html_snippet, styled_line_to_highlighted_html, IncludeBackground,
};
use syntect::parsing::{SyntaxReference, SyntaxSet};
use syntect::util::LinesWithEndings;

/// Language used when a snippet does not name one.
pub const DEFAULT_LANGUAGE: &str = "python";
/// Style used when a snippet does not name one.
pub const DEFAULT_STYLE: &str = "friendly";

/// Style names accepted by the API, and the bundled theme each one renders with.
pub const STYLES: &[(&str, &str)] = &[
    ("friendly", "InspiredGitHub"),
    ("default", "InspiredGitHub"),
    ("github", "InspiredGitHub"),
    ("monokai", "base16-eighties.dark"),
    ("mocha", "base16-mocha.dark"),
    ("ocean", "base16-ocean.dark"),
    ("ocean-light", "base16-ocean.light"),
    ("solarized-dark", "Solarized (dark)"),
    ("solarized-light", "Solarized (light)"),
];

/// Language tokens that resolve to plain text.
const PLAIN_TEXT_TOKENS: &[&str] = &["text", "plain", "txt"];

lazy_static! {
    static ref SYNTAX_SET: SyntaxSet = SyntaxSet::load_defaults_newlines();
    static ref THEME_SET: ThemeSet = ThemeSet::load_defaults();
}

/// Look up the syntax for a language token such as `python`, `rs` or `Rust`.
fn find_syntax(language: &str) -> Option<&'static SyntaxReference> {
    if PLAIN_TEXT_TOKENS.contains(&language.to_lowercase().as_str()) {
        return Some(SYNTAX_SET.find_syntax_plain_text());
    }
    SYNTAX_SET.find_syntax_by_token(language)
}

/// Look up the theme for a style name.
fn find_theme(style: &str) -> Option<&'static Theme> {
    STYLES
        .iter()
        .find(|&&(name, _)| name == style)
        .and_then(|&(_, theme)| THEME_SET.themes.get(theme))
}

/// Whether `language` names a syntax the highlighter knows.
#[must_use]
pub fn is_language(language: &str) -> bool {
    !language.is_empty() && find_syntax(language).is_some()
}

/// Whether `style` names an accepted highlighting style.
#[must_use]
pub fn is_style(style: &str) -> bool {
    find_theme(style).is_some()
}

/// Render `code` as a complete HTML document.
///
/// The page carries `title` both as the document title and as a heading, and a
/// right-aligned line-number gutter when `linenos` is set. Unknown languages fall
/// back to plain text.
///
/// # Errors
/// Errors if `style` is unknown or the highlighter fails on the input.
pub fn render(
    code: &str,
    language: &str,
    style: &str,
    linenos: bool,
    title: &str,
) -> anyhow::Result<String> {
    let syntax = find_syntax(language).unwrap_or_else(|| SYNTAX_SET.find_syntax_plain_text());
    let theme =
        find_theme(style).ok_or_else(|| anyhow::anyhow!("Unknown highlighting style '{style}'"))?;

    let (mut body, _background) = start_highlighted_html_snippet(theme);
    let mut highlighter = HighlightLines::new(syntax, theme);
    let line_count = LinesWithEndings::from(code).count();
    let gutter_width = line_count.to_string().len();
    for (index, line) in LinesWithEndings::from(code).enumerate() {
        let ranges = highlighter.highlight_line(line, &SYNTAX_SET)?;
        if linenos {
            write!(
                body,
                "<span class=\"lineno\">{:>width$} </span>",
                index + 1,
                width = gutter_width
            )?;
        }
        body.push_str(&styled_line_to_highlighted_html(
            &ranges[..],
            IncludeBackground::No,
        )?);
    }
    body.push_str("</pre>\n");

    let title = html_escape::encode_text(title);
    let mut page = String::from("<!DOCTYPE html>\n<html>\n<head>\n");
    writeln!(page, "  <title>{title}</title>")?;
    page.push_str("  <meta http-equiv=\"content-type\" content=\"text/html; charset=utf-8\">\n");
    page.push_str("  <style>.lineno { color: #999; user-select: none; }</style>\n");
    page.push_str("</head>\n<body>\n");
    writeln!(page, "<h2>{title}</h2>")?;
    page.push_str(&body);
    page.push_str("</body>\n</html>\n");
    Ok(page)
}
