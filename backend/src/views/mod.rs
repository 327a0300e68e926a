//! Server-rendered HTML
//!
//! Every page shares [`layout`]; page bodies live in the submodules.
//! All user- or upstream-supplied text goes through [`escape_html`].

use std::fmt::Write;

pub mod apps;
pub mod pages;

pub use apps::render_apps;
pub use pages::{render_contact, render_home, render_photography, render_terminal, render_timeline, ContactView};

/// Navigation entries as `(active_page, href, label)`
const NAV: &[(&str, &str, &str)] = &[
    ("home", "/", "Home"),
    ("apps", "/app", "Apps"),
    ("timeline", "/timeline", "Timeline"),
    ("photography", "/photography", "Photography"),
    ("terminal", "/terminal", "Terminal"),
    ("contact", "/contact", "Contact"),
];

/// Page metadata consumed by [`layout`]
#[derive(Debug, Clone)]
pub struct Page<'a> {
    pub title: &'a str,
    pub description: Option<&'a str>,
    /// Key into the navigation bar, highlights the current entry
    pub active_page: &'a str,
    /// Extra `<script>` sources appended after the body
    pub scripts: &'a [&'a str],
}

impl<'a> Page<'a> {
    pub fn new(title: &'a str, active_page: &'a str) -> Self {
        Self {
            title,
            description: None,
            active_page,
            scripts: &[],
        }
    }

    pub fn with_description(mut self, description: &'a str) -> Self {
        self.description = Some(description);
        self
    }

    pub fn with_scripts(mut self, scripts: &'a [&'a str]) -> Self {
        self.scripts = scripts;
        self
    }
}

/// Escape text for use in HTML element content and quoted attributes
pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}

/// Wrap `body` in the site chrome
pub fn layout(site_name: &str, page: &Page<'_>, body: &str) -> String {
    let mut nav = String::new();
    for (key, href, label) in NAV {
        let class = if *key == page.active_page { " class=\"active\"" } else { "" };
        let _ = write!(nav, "<li><a href=\"{href}\"{class}>{label}</a></li>");
    }

    let description = page
        .description
        .map(|d| format!("<meta name=\"description\" content=\"{}\">", escape_html(d)))
        .unwrap_or_default();

    let scripts: String = page
        .scripts
        .iter()
        .map(|src| format!("<script src=\"{}\" defer></script>", escape_html(src)))
        .collect();

    format!(
        "<!DOCTYPE html>\n\
         <html lang=\"en\">\n\
         <head>\n\
         <meta charset=\"utf-8\">\n\
         <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n\
         <title>{title} | {site}</title>\n\
         {description}\n\
         <link rel=\"stylesheet\" href=\"/static/css/style.css\">\n\
         <link rel=\"icon\" href=\"/favicon.ico\">\n\
         </head>\n\
         <body>\n\
         <header><a class=\"brand\" href=\"/\">{site}</a><nav><ul>{nav}</ul></nav></header>\n\
         <main>\n{body}\n</main>\n\
         <footer><p>&copy; {site}</p></footer>\n\
         {scripts}\n\
         </body>\n\
         </html>\n",
        title = escape_html(page.title),
        site = escape_html(site_name),
    )
}

/// Standalone error page, rendered without application state
pub fn error_page(status: u16, reason: &str, message: &str, request_id: &str) -> String {
    format!(
        "<!DOCTYPE html>\n\
         <html lang=\"en\">\n\
         <head>\n\
         <meta charset=\"utf-8\">\n\
         <title>{status} {reason}</title>\n\
         <link rel=\"stylesheet\" href=\"/static/css/style.css\">\n\
         </head>\n\
         <body class=\"error-page\">\n\
         <main>\n\
         <h1>{status}</h1>\n\
         <h2>{reason}</h2>\n\
         <p>{message}</p>\n\
         <p><a href=\"/\">Back to home</a></p>\n\
         <p class=\"request-id\">Request ID: {request_id}</p>\n\
         </main>\n\
         </body>\n\
         </html>\n",
        reason = escape_html(reason),
        message = escape_html(message),
        request_id = escape_html(request_id),
    )
}
