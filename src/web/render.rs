//! Server-side HTML for the form and listing pages.

use crate::store::{Category, StoredLink};
use std::fmt::Write as _;

const STYLE: &str = "body{font-family:sans-serif;max-width:48rem;margin:2rem auto;padding:0 1rem}\
label{display:block;margin-top:.75rem}input,select{width:100%;padding:.3rem}\
table{border-collapse:collapse;width:100%}td,th{border-bottom:1px solid #ddd;padding:.3rem;text-align:left}\
.ok{color:#155724}.err{color:#721c24}img.icon{width:16px;height:16px}";

/// Outcome banner shown above the form after a submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Success(String),
    Failure(String),
}

/// Escape text for use in element content and quoted attribute values.
pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            c => out.push(c),
        }
    }
    out
}

fn page(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
         <title>{}</title>\n<style>{}</style>\n</head>\n<body>\n{}\n</body>\n</html>\n",
        escape_html(title),
        STYLE,
        body
    )
}

/// The add-link form with a category dropdown.
pub fn form_page(categories: &[Category], notice: Option<&Notice>) -> String {
    let mut body = String::from("<h1>Add a link</h1>\n");

    match notice {
        Some(Notice::Success(msg)) => {
            let _ = writeln!(body, "<p class=\"ok\">{}</p>", escape_html(msg));
        }
        Some(Notice::Failure(msg)) => {
            let _ = writeln!(body, "<p class=\"err\">{}</p>", escape_html(msg));
        }
        None => {}
    }

    body.push_str(
        "<form method=\"post\" action=\"/\">\n\
         <label>Description <input name=\"description\" required></label>\n\
         <label>URL <input name=\"url\" type=\"url\" required></label>\n\
         <label>Category <select name=\"type_id\">\n<option value=\"\">(none)</option>\n",
    );
    for category in categories {
        let _ = writeln!(
            body,
            "<option value=\"{}\">{}</option>",
            category.id,
            escape_html(&category.name)
        );
    }
    body.push_str(
        "</select></label>\n\
         <label>Icon <input name=\"icon\"></label>\n\
         <p><button type=\"submit\">Add</button> <a href=\"/view\">View links</a></p>\n\
         </form>",
    );

    page("Add a link", &body)
}

/// Table of stored links, newest first.
pub fn links_page(links: &[StoredLink], categories: &[Category]) -> String {
    let mut body = String::from("<h1>Links</h1>\n<p><a href=\"/\">Add a link</a></p>\n");

    if links.is_empty() {
        body.push_str("<p>No links yet.</p>");
        return page("Links", &body);
    }

    body.push_str("<table>\n<tr><th></th><th>Description</th><th>Category</th><th>Added</th></tr>\n");
    for link in links {
        let category = link
            .type_id
            .and_then(|id| categories.iter().find(|c| c.id == id))
            .map(|c| escape_html(&c.name))
            .unwrap_or_default();
        let icon = if link.icon.is_empty() {
            String::new()
        } else {
            format!(
                "<img class=\"icon\" src=\"{}\" alt=\"\">",
                escape_html(&link.icon)
            )
        };
        let _ = writeln!(
            body,
            "<tr><td>{}</td><td><a href=\"{}\">{}</a></td><td>{}</td><td>{}</td></tr>",
            icon,
            escape_html(&link.url),
            escape_html(&link.description),
            category,
            escape_html(&link.date)
        );
    }
    body.push_str("</table>");

    page("Links", &body)
}
