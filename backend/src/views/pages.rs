//! Static content pages and the contact form

use std::fmt::Write;

use crate::models::ContactForm;

use super::{escape_html, layout, Page};

/// Milestones shown on the timeline page as `(period, title, detail)`
const TIMELINE: &[(&str, &str, &str)] = &[
    ("Now", "Software Engineer", "Building backend services and developer tooling."),
    ("Earlier", "Open Source", "Maintaining small libraries and tools on GitHub."),
    ("Start", "Computer Science", "Studied computer science and started writing code for the web."),
];

pub fn render_home(site_name: &str) -> String {
    let body = "<section class=\"hero\">\n\
                <h1>Hi, I'm Tony</h1>\n\
                <p>Software engineer. I build web backends, tinker with infrastructure and take photos.</p>\n\
                <p class=\"links\">\
                <a href=\"/app\">See my apps</a> \
                <a href=\"/terminal\">Open the terminal</a> \
                <a href=\"/contact\">Get in touch</a>\
                </p>\n\
                </section>";

    layout(site_name, &Page::new("Tony", "home"), body)
}

pub fn render_timeline(site_name: &str) -> String {
    let mut body = String::from("<section class=\"timeline\">\n<h1>Timeline</h1>\n<ol>\n");
    for (period, title, detail) in TIMELINE {
        let _ = write!(
            body,
            "<li><span class=\"period\">{period}</span><h2>{title}</h2><p>{detail}</p></li>\n"
        );
    }
    body.push_str("</ol>\n</section>");

    layout(site_name, &Page::new("Timeline", "timeline"), &body)
}

pub fn render_terminal(site_name: &str) -> String {
    let body = "<section class=\"terminal-fullpage\">\n\
                <div class=\"terminal-body-fullpage\">\n\
                <div id=\"terminal-output-fullpage\"></div>\n\
                <div class=\"terminal-input-line\">\
                <span class=\"terminal-prompt\">tony@tonybenoy.com:~$</span>\
                <input id=\"terminal-input-fullpage\" type=\"text\" autocomplete=\"off\" spellcheck=\"false\">\
                </div>\n\
                </div>\n\
                </section>";

    let page = Page::new("Terminal", "terminal").with_scripts(&["/static/js/terminal.js"]);
    layout(site_name, &page, body)
}

pub fn render_photography(site_name: &str, instagram_username: &str) -> String {
    let username = escape_html(instagram_username);
    let body = format!(
        "<section class=\"photography\">\n\
         <h1>Photography</h1>\n\
         <p>Travel experiences, life moments and the occasional artistic capture.</p>\n\
         <p><a href=\"https://www.instagram.com/{username}/\" rel=\"noopener\">Follow @{username} on Instagram</a></p>\n\
         </section>"
    );

    let page = Page::new("Tony Benoy Photography - Travel & Life Moments", "photography")
        .with_description(
            "Discover Tony Benoy's photography collection featuring travel experiences, \
             life moments, and artistic captures.",
        );
    layout(site_name, &page, &body)
}

/// State of the contact page
#[derive(Debug, Default)]
pub struct ContactView<'a> {
    /// Previously submitted values, echoed back after a failed submission
    pub form: Option<&'a ContactForm>,
    pub errors: &'a [String],
    pub sent: bool,
}

pub fn render_contact(site_name: &str, view: &ContactView<'_>) -> String {
    let mut body = String::from("<section class=\"contact\">\n<h1>Contact Me</h1>\n");

    if view.sent {
        body.push_str("<p class=\"notice success\">Thanks! Your message has been sent.</p>\n");
    }

    if !view.errors.is_empty() {
        body.push_str("<ul class=\"notice errors\">\n");
        for error in view.errors {
            let _ = writeln!(body, "<li>{}</li>", escape_html(error));
        }
        body.push_str("</ul>\n");
    }

    let empty = ContactForm::default();
    let form = view.form.unwrap_or(&empty);
    let _ = write!(
        body,
        "<form method=\"post\" action=\"/contact\">\n\
         <label>Name <input type=\"text\" name=\"name\" value=\"{name}\" required maxlength=\"100\"></label>\n\
         <label>Email <input type=\"email\" name=\"email\" value=\"{email}\" required maxlength=\"254\"></label>\n\
         <label>Subject <input type=\"text\" name=\"subject\" value=\"{subject}\" required maxlength=\"200\"></label>\n\
         <label>Message <textarea name=\"message\" required maxlength=\"5000\">{message}</textarea></label>\n\
         <button type=\"submit\">Send</button>\n\
         </form>\n\
         </section>",
        name = escape_html(&form.name),
        email = escape_html(&form.email),
        subject = escape_html(&form.subject),
        message = escape_html(&form.message),
    );

    layout(site_name, &Page::new("Contact Me", "contact"), &body)
}
