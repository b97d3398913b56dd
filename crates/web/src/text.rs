//! Plain-text rendering for the `lookup` subcommand.

use enslookup_core::View;
use std::fmt::Write;

pub fn render_text(view: &View) -> String {
    let mut out = String::new();
    match view {
        View::Empty => out.push_str("Nothing to look up\n"),
        View::Loading => out.push_str("Loading...\n"),
        View::Error { message } => {
            let _ = writeln!(out, "Error: {message}");
        }
        View::Profile(profile) => {
            let mut rows: Vec<(&str, &str)> = Vec::new();
            if let Some(avatar) = &profile.avatar {
                rows.push(("Avatar", avatar.as_str()));
            }
            for row in &profile.identity {
                rows.push((row.kind.label(), row.value.as_str()));
            }
            for record in &profile.records {
                let shown = record
                    .link
                    .as_ref()
                    .map_or(record.value.as_str(), |link| link.text.as_str());
                rows.push((record.label, shown));
            }

            let width = rows.iter().map(|(label, _)| label.len()).max().unwrap_or(0) + 1;
            for (label, value) in rows {
                let _ = writeln!(out, "{:<width$} {value}", format!("{label}:"));
            }
            if let Some(placeholder) = profile.records_placeholder() {
                out.push_str(placeholder);
                out.push('\n');
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use enslookup_core::view::{IdentityKind, IdentityRow, Link, RecordRow};
    use enslookup_core::ProfileView;
    use enslookup_types::TextKey;

    #[test]
    fn aligns_profile_rows() {
        let view = View::Profile(ProfileView {
            avatar: None,
            identity: vec![IdentityRow {
                kind: IdentityKind::Name,
                value: "nick.eth".into(),
            }],
            records: vec![RecordRow {
                key: TextKey::Twitter,
                label: "Twitter",
                value: "nicksdjohnson".into(),
                link: Some(Link {
                    href: "https://twitter.com/nicksdjohnson".into(),
                    text: "@nicksdjohnson".into(),
                }),
            }],
        });

        assert_eq!(
            render_text(&view),
            "Name:    nick.eth\nTwitter: @nicksdjohnson\n"
        );
    }

    #[test]
    fn empty_profile_prints_placeholder() {
        let view = View::Profile(ProfileView {
            avatar: None,
            identity: vec![IdentityRow {
                kind: IdentityKind::Address,
                value: "0xabc".into(),
            }],
            records: Vec::new(),
        });
        assert_eq!(render_text(&view), "Address: 0xabc\nNo text records found\n");
    }

    #[test]
    fn error_is_prefixed() {
        let view = View::Error {
            message: "boom".into(),
        };
        assert_eq!(render_text(&view), "Error: boom\n");
    }
}
