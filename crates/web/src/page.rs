//! HTML rendering of the lookup page.

use enslookup_core::view::{IdentityKind, Link, RecordRow};
use enslookup_core::{LookupForm, ProfileView, View};
use enslookup_types::LookupMode;
use std::fmt::Write;

/// Seconds between reloads while lookups are outstanding.
pub const REFRESH_SECS: u32 = 1;

const STYLE: &str = r#"
        body {
            font-family: Arial, sans-serif;
            max-width: 800px;
            margin: 50px auto;
            padding: 20px;
            background: #f5f5f5;
        }
        .app-container {
            background: white;
            padding: 30px;
            border-radius: 8px;
            box-shadow: 0 2px 4px rgba(0,0,0,0.1);
        }
        h1 {
            color: #333;
            border-bottom: 3px solid #5298ff;
            padding-bottom: 10px;
        }
        .input-group { display: flex; gap: 8px; margin-bottom: 12px; }
        .text-input { flex: 1; padding: 8px; }
        .loading { color: #666; margin-top: 20px; }
        .error { color: #b00020; margin-top: 20px; }
        .avatar { width: 96px; height: 96px; border-radius: 50%; }
        .detail-row { margin: 8px 0; }
        .label { font-weight: bold; margin-right: 8px; }
        .address { font-family: monospace; }
        .no-records { color: #666; font-style: italic; }
"#;

/// Escape text for use in element content and quoted attributes.
pub fn escape(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Full page: the form with its draft, then the result block.
///
/// `refresh` makes the browser poll until the session settles.
pub fn render_page(form: &LookupForm, view: &View, refresh: bool) -> String {
    let mut html = String::new();
    html.push_str("<!DOCTYPE html>\n<html>\n<head>\n    <meta charset=\"utf-8\">\n");
    if refresh {
        let _ = writeln!(
            html,
            "    <meta http-equiv=\"refresh\" content=\"{REFRESH_SECS}\">"
        );
    }
    let _ = write!(
        html,
        "    <title>ENS Domain Lookup</title>\n    <style>{STYLE}    </style>\n</head>\n<body>\n"
    );
    html.push_str("<div class=\"app-container\">\n    <h1>ENS Domain Lookup</h1>\n");
    html.push_str(
        "    <p class=\"description\">Look up Ethereum Name Service (ENS) domains and view their associated records.</p>\n",
    );
    render_form(&mut html, form);
    render_result(&mut html, view);
    html.push_str("</div>\n</body>\n</html>\n");
    html
}

fn render_form(html: &mut String, form: &LookupForm) {
    html.push_str("    <form method=\"post\" action=\"/lookup\" class=\"search-form\">\n");
    html.push_str("        <div class=\"input-group\">\n");
    html.push_str("            <select name=\"mode\" class=\"select-input\">\n");
    for mode in LookupMode::ALL {
        let selected = if mode == form.mode() { " selected" } else { "" };
        let _ = writeln!(
            html,
            "                <option value=\"{}\"{selected}>{}</option>",
            mode.as_str(),
            mode.label()
        );
    }
    html.push_str("            </select>\n");
    let _ = writeln!(
        html,
        "            <input type=\"text\" name=\"value\" value=\"{}\" placeholder=\"{}\" class=\"text-input\">",
        escape(form.input()),
        escape(form.placeholder())
    );
    html.push_str("        </div>\n");
    html.push_str("        <button type=\"submit\" class=\"search-button\">Lookup</button>\n");
    html.push_str("    </form>\n");
}

fn render_result(html: &mut String, view: &View) {
    match view {
        View::Empty => {}
        View::Loading => html.push_str("    <div class=\"loading\">Loading...</div>\n"),
        View::Error { message } => {
            let _ = writeln!(html, "    <div class=\"error\">Error: {}</div>", escape(message));
        }
        View::Profile(profile) => render_profile(html, profile),
    }
}

fn render_profile(html: &mut String, profile: &ProfileView) {
    html.push_str("    <div class=\"results-container\">\n        <h2>ENS Profile</h2>\n");
    if let Some(avatar) = &profile.avatar {
        let _ = writeln!(
            html,
            "        <div class=\"avatar-container\"><img src=\"{}\" alt=\"ENS Avatar\" class=\"avatar\"></div>",
            escape(avatar)
        );
    }

    html.push_str("        <div class=\"profile-details\">\n");
    for row in &profile.identity {
        let class = match row.kind {
            IdentityKind::Address => "value address",
            IdentityKind::Name => "value",
        };
        let _ = writeln!(
            html,
            "            <div class=\"detail-row\"><span class=\"label\">{}:</span><span class=\"{class}\">{}</span></div>",
            row.kind.label(),
            escape(&row.value)
        );
    }

    html.push_str("            <h3>Text Records</h3>\n");
    for record in &profile.records {
        render_record(html, record);
    }
    if let Some(placeholder) = profile.records_placeholder() {
        let _ = writeln!(html, "            <div class=\"no-records\">{placeholder}</div>");
    }
    html.push_str("        </div>\n    </div>\n");
}

fn render_record(html: &mut String, record: &RecordRow) {
    let value = match &record.link {
        Some(link) => anchor(link),
        None => escape(&record.value),
    };
    let _ = writeln!(
        html,
        "            <div class=\"detail-row\"><span class=\"label\">{}:</span><span class=\"value\">{value}</span></div>",
        record.label
    );
}

fn anchor(link: &Link) -> String {
    let target = if link.href.starts_with("mailto:") {
        ""
    } else {
        " target=\"_blank\" rel=\"noopener noreferrer\""
    };
    format!(
        "<a href=\"{}\"{target}>{}</a>",
        escape(&link.href),
        escape(&link.text)
    )
}
