//! Fence extraction from model responses.
//!
//! Generative output is unreliable input: the parser validates what it gets
//! instead of trusting the prompt contract. Markup is mandatory; styling and
//! script degrade to empty strings when their fences are missing, since a
//! site without styles or script is still deployable.

use std::sync::LazyLock;

use regex::Regex;

use siteforge_types::error::ParseError;
use siteforge_types::site::SiteBundle;

/// Fence label for the markup block. Shared with the prompt builder so the
/// output contract cannot drift between the two sides.
pub const MARKUP_FENCE: &str = "html";
/// Fence label for the styling block.
pub const STYLING_FENCE: &str = "css";
/// Fence label for the script block.
pub const SCRIPT_FENCE: &str = "javascript";

static MARKUP_TO_STYLING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)```html(.*?)```css").unwrap());
static MARKUP_TO_CLOSE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)```html(.*?)```").unwrap());
static STYLING_TO_SCRIPT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)```css(.*?)```javascript").unwrap());
static STYLING_TO_CLOSE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)```css(.*?)```").unwrap());
static SCRIPT_TO_CLOSE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)```javascript(.*?)```").unwrap());

/// Extract the three labelled fences from a raw model response.
///
/// Each segment is the text strictly between its opening fence and the next
/// fence marker (first match wins, case-insensitive, dot matches newline),
/// trimmed of surrounding whitespace. Parsing is pure: the same input always
/// yields the same bundle.
pub fn parse_site_response(response: &str) -> Result<SiteBundle, ParseError> {
    let markup = capture(&MARKUP_TO_STYLING, response)
        .or_else(|| capture(&MARKUP_TO_CLOSE, response))
        .ok_or(ParseError::MissingMarkup)?;

    let styling = capture(&STYLING_TO_SCRIPT, response)
        .or_else(|| capture(&STYLING_TO_CLOSE, response))
        .unwrap_or_default();

    let script = capture(&SCRIPT_TO_CLOSE, response).unwrap_or_default();

    Ok(SiteBundle {
        markup,
        styling,
        script,
    })
}

fn capture(pattern: &Regex, haystack: &str) -> Option<String> {
    pattern
        .captures(haystack)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    const WELL_FORMED: &str = "```html\n<h1>Hi</h1>\n```css\nh1 { color: red; }\n```javascript\nconsole.log('hi');\n```";

    #[test]
    fn test_well_formed_response() {
        let bundle = parse_site_response(WELL_FORMED).unwrap();

        assert_eq!(bundle.markup, "<h1>Hi</h1>");
        assert_eq!(bundle.styling, "h1 { color: red; }");
        assert_eq!(bundle.script, "console.log('hi');");
    }

    #[test]
    fn test_case_insensitive_fences() {
        let response = "```HTML\n<p>x</p>\n```CSS\np {}\n```JavaScript\nlet a;\n```";
        let bundle = parse_site_response(response).unwrap();

        assert_eq!(bundle.markup, "<p>x</p>");
        assert_eq!(bundle.styling, "p {}");
        assert_eq!(bundle.script, "let a;");
    }

    #[test]
    fn test_missing_markup_is_hard_failure() {
        let response = "Sure! Here is some css:\n```css\nbody {}\n```";
        assert_eq!(parse_site_response(response), Err(ParseError::MissingMarkup));

        assert_eq!(parse_site_response(""), Err(ParseError::MissingMarkup));
        assert_eq!(
            parse_site_response("no fences at all"),
            Err(ParseError::MissingMarkup)
        );
    }

    #[test]
    fn test_missing_styling_and_script_degrade_to_empty() {
        let response = "```html\n<main>only markup</main>\n```";
        let bundle = parse_site_response(response).unwrap();

        assert_eq!(bundle.markup, "<main>only markup</main>");
        assert_eq!(bundle.styling, "");
        assert_eq!(bundle.script, "");
    }

    #[test]
    fn test_missing_script_only() {
        let response = "```html\n<p>a</p>\n```css\np { margin: 0; }\n```";
        let bundle = parse_site_response(response).unwrap();

        assert_eq!(bundle.markup, "<p>a</p>");
        assert_eq!(bundle.styling, "p { margin: 0; }");
        assert_eq!(bundle.script, "");
    }

    #[test]
    fn test_surrounding_prose_is_ignored() {
        let response = format!("Of course, happy to help!\n\n{WELL_FORMED}\n\nLet me know!");
        let bundle = parse_site_response(&response).unwrap();

        assert_eq!(bundle.markup, "<h1>Hi</h1>");
    }

    #[test]
    fn test_parsing_is_idempotent() {
        let first = parse_site_response(WELL_FORMED).unwrap();
        let second = parse_site_response(WELL_FORMED).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_multiline_segments_preserved() {
        let response = "```html\n<div>\n  <p>line one</p>\n  <p>line two</p>\n</div>\n```css\n\n```javascript\n```";
        let bundle = parse_site_response(response).unwrap();

        assert!(bundle.markup.contains("line one"));
        assert!(bundle.markup.contains("line two"));
        assert_eq!(bundle.styling, "");
    }
}
