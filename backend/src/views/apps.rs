use std::fmt::Write;

use crate::models::RepositoryRecord;

use super::{escape_html, layout, Page};

/// Render the repository showcase
pub fn render_apps(site_name: &str, repos: &[RepositoryRecord]) -> String {
    let mut body = String::new();
    let _ = write!(
        body,
        "<section class=\"apps\">\n<h1>My Apps</h1>\n<p class=\"repo-count\">Showing {} repositories</p>\n",
        repos.len()
    );

    if repos.is_empty() {
        body.push_str("<p class=\"empty\">No public repositories to show yet.</p>\n");
    } else {
        body.push_str("<div class=\"repo-grid\">\n");
        for repo in repos {
            render_card(&mut body, repo);
        }
        body.push_str("</div>\n");
    }
    body.push_str("</section>");

    layout(site_name, &Page::new("My Apps", "apps"), &body)
}

fn render_card(out: &mut String, repo: &RepositoryRecord) {
    let description = repo
        .description
        .as_deref()
        .filter(|d| !d.is_empty())
        .unwrap_or("No description provided");

    let _ = write!(
        out,
        "<article class=\"repo-card\">\n\
         <h2><a href=\"{html_url}\" rel=\"noopener\">{name}</a></h2>\n\
         <p class=\"description\">{description}</p>\n\
         <ul class=\"repo-meta\">\
         <li class=\"language\">{language}</li>\
         <li class=\"stars\">&#9733; {stars}</li>\
         <li class=\"forks\">Forks: {forks}</li>\
         </ul>\n\
         <code class=\"clone-url\">{clone_url}</code>\n\
         </article>\n",
        html_url = escape_html(&repo.html_url),
        name = escape_html(&repo.name),
        description = escape_html(description),
        language = escape_html(&repo.language),
        stars = repo.stargazers_count,
        forks = repo.forks,
        clone_url = escape_html(&repo.clone_url),
    );
}
