//! Plain-text rendering of the site sections for the terminal.

use std::io::IsTerminal;

use crate::app::{App, LinkView};
use crate::filter::{categories, category_label};

pub fn highlight_marker() -> (&'static str, &'static str) {
    if std::io::stdout().is_terminal() {
        ("\x1b[1;33m", "\x1b[0m")
    } else {
        ("[", "]")
    }
}

pub fn navigation(app: &App) -> String {
    app.navigation()
        .iter()
        .map(|nav| {
            let marker = if nav.active { '*' } else { ' ' };
            format!("{} {} ({})", marker, nav.item.name, nav.icon)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn category_bar(app: &App) -> String {
    let config = app.config();
    categories(&config.links)
        .iter()
        .map(|category| {
            let label = category_label(category, &config.category_names);
            if category == app.filter().active_category() {
                format!("[{}]", label)
            } else {
                label.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join("  ")
}

pub fn links(views: &[LinkView]) -> String {
    if views.is_empty() {
        return "No links found\nTry a different search term or category".to_string();
    }
    let mut out = String::new();
    for view in views {
        let icon = view.icon.as_deref().unwrap_or("-");
        out.push_str(&format!("{:<16} {}  {}\n", icon, view.display, view.url));
    }
    out.trim_end().to_string()
}

/// Body of a section, or `None` for an unknown id.
pub fn section(app: &App, id: &str) -> Option<String> {
    let config = app.config();
    let mut out = String::new();
    match id {
        "linksSection" => {
            out.push_str(&category_bar(app));
            out.push_str("\n\n");
            out.push_str(&links(&app.visible_links(highlight_marker())));
        }
        "portfolioSection" => {
            for item in &config.portfolio {
                out.push_str(&format!("{}\n  {}\n", item.title, item.description));
                out.push_str(&format!("  Live Demo: {}\n", item.live_url));
                out.push_str(&format!("  Details:   {}\n", item.details_url));
            }
        }
        "experienceSection" => {
            for exp in &config.experience {
                out.push_str(&format!("{}  {} @ {}\n", exp.date, exp.title, exp.company));
                for duty in &exp.duties {
                    out.push_str(&format!("  - {}\n", duty));
                }
            }
        }
        "projectsSection" => {
            for project in &config.projects {
                let tags: Vec<&str> = project.tags.iter().map(|t| t.name.as_str()).collect();
                out.push_str(&format!("{} [{}]\n", project.title, tags.join(", ")));
                out.push_str(&format!("  {}\n", project.description));
                out.push_str(&format!("  View Source: {}\n", project.source_url));
                out.push_str(&format!("  Live Demo:   {}\n", project.live_url));
            }
        }
        "contactSection" => {
            out.push_str("Get In Touch\n");
            out.push_str("Have a question or want to work together? Send me a message!\n\n");
            let contact = app.contact();
            if contact.is_submit_enabled() {
                out.push_str("[ Send Message ]  (folio send)\n");
            } else {
                out.push_str("[ Sending... ]\n");
            }
            if let Some(status) = contact.status() {
                out.push_str(&status.text);
            }
        }
        _ => return None,
    }
    Some(out.trim_end().to_string())
}
