//! The two HTML documents the relay serves.

/// Spinner-to-checkmark page with the deep-link redirect back into the app
pub const SUCCESS_PAGE: &str = include_str!("../../static/success.html");

const ERROR_TEMPLATE: &str = include_str!("../../static/error.html");

/// Render the error page with the caught error's message. The message is
/// escaped before interpolation so a provider-supplied body can't inject
/// markup into the page.
pub fn error_page(message: &str) -> String {
    ERROR_TEMPLATE.replace("{message}", &escape_html(message))
}

fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
