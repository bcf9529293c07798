//! Prompt template for website generation.
//!
//! The rendered prompt carries an explicit output-format contract: exactly
//! three fenced code blocks, labelled with the same fence constants the
//! response parser matches on. Any drift between this template and the
//! parser breaks the turn downstream, which is why the labels are shared
//! constants rather than inline literals.

use crate::parser::{MARKUP_FENCE, SCRIPT_FENCE, STYLING_FENCE};

/// Render the fixed instruction template around the user's free text.
///
/// `context` is the project's carried-forward summary from earlier turns,
/// when one exists. The user text is embedded verbatim -- inside an active
/// project, raw text is the generation prompt.
pub fn build_site_prompt(user_text: &str, context: Option<&str>) -> String {
    let context_block = match context {
        Some(summary) => format!("\nEarlier context for this project:\n{summary}\n"),
        None => String::new(),
    };

    format!(
        "You are an expert web developer.\n\
         Build a simple but complete static website from the following requirements:\n\
         {user_text}\n\
         {context_block}\
         Instructions:\n\
         - Create a single-page responsive website.\n\
         - Use only HTML, CSS, and minimal JavaScript if needed.\n\
         - Structure the page with a header, main, and footer.\n\
         - Use placeholder text and images where details are missing.\n\
         - Write all code inline, one block per language.\n\
         - Do not include explanations, only the final code.\n\
         Return exactly three fenced code blocks, in this order and with these labels,\n\
         and nothing else:\n\
         ```{MARKUP_FENCE}\n\
         <!-- markup -->\n\
         ```{STYLING_FENCE}\n\
         /* styles */\n\
         ```{SCRIPT_FENCE}\n\
         // script\n\
         ```\n"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_site_response;

    #[test]
    fn test_embeds_user_text_verbatim() {
        let prompt = build_site_prompt("A bakery site with a cake gallery", None);
        assert!(prompt.contains("A bakery site with a cake gallery"));
    }

    #[test]
    fn test_mandates_all_three_fences() {
        let prompt = build_site_prompt("anything", None);
        assert!(prompt.contains("```html"));
        assert!(prompt.contains("```css"));
        assert!(prompt.contains("```javascript"));
    }

    #[test]
    fn test_context_included_when_present() {
        let prompt = build_site_prompt("add a contact form", Some("a bakery landing page"));
        assert!(prompt.contains("a bakery landing page"));

        let prompt = build_site_prompt("add a contact form", None);
        assert!(!prompt.contains("Earlier context"));
    }

    #[test]
    fn test_contract_example_is_parsable() {
        // The template's own example block must satisfy the parser, otherwise
        // the two sides of the contract have drifted apart.
        let prompt = build_site_prompt("x", None);
        let example_start = prompt.find("```html").unwrap();
        let bundle = parse_site_response(&prompt[example_start..]).unwrap();
        assert_eq!(bundle.markup, "<!-- markup -->");
    }
}
