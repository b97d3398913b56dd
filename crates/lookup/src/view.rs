//! Result renderer: a pure mapping from lookup state to what is displayed.

use crate::session::ResolutionSnapshot;
use enslookup_types::{LookupMode, TextKey};
use serde::Serialize;

/// Shown when a failure carries no message of its own.
pub const GENERIC_ERROR_MESSAGE: &str = "Failed to resolve ENS name or address";
/// Shown in place of an empty record list.
pub const NO_RECORDS_MESSAGE: &str = "No text records found";

/// The mutually exclusive display branches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum View {
    /// Nothing submitted yet, or an empty submission.
    Empty,
    Loading,
    Error { message: String },
    Profile(ProfileView),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProfileView {
    pub avatar: Option<String>,
    /// Name and address rows, the submitted identity first.
    pub identity: Vec<IdentityRow>,
    pub records: Vec<RecordRow>,
}

impl ProfileView {
    /// Message to show instead of the record list, if any.
    pub fn records_placeholder(&self) -> Option<&'static str> {
        self.records.is_empty().then_some(NO_RECORDS_MESSAGE)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum IdentityKind {
    Name,
    Address,
}

impl IdentityKind {
    pub fn label(&self) -> &'static str {
        match self {
            IdentityKind::Name => "Name",
            IdentityKind::Address => "Address",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IdentityRow {
    pub kind: IdentityKind,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Link {
    pub href: String,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecordRow {
    pub key: TextKey,
    pub label: &'static str,
    pub value: String,
    pub link: Option<Link>,
}

impl RecordRow {
    fn new(key: TextKey, value: &str) -> Self {
        let link = match key {
            TextKey::Twitter => Some(Link {
                href: format!("https://twitter.com/{value}"),
                text: format!("@{value}"),
            }),
            // other schemes (javascript:, data:) stay plain text
            TextKey::Url if is_web_url(value) => Some(Link {
                href: value.to_string(),
                text: value.to_string(),
            }),
            TextKey::Url => None,
            TextKey::Email => Some(Link {
                href: format!("mailto:{value}"),
                text: value.to_string(),
            }),
            TextKey::Description | TextKey::Discord => None,
        };
        Self {
            key,
            label: key.label(),
            value: value.to_string(),
            link,
        }
    }
}

fn is_web_url(value: &str) -> bool {
    let lower = value.trim_start().to_ascii_lowercase();
    lower.starts_with("https://") || lower.starts_with("http://")
}

/// Map a snapshot to its view.
///
/// Loading wins over everything, then a primary failure; auxiliary
/// failures render like absent values.
pub fn render(snapshot: &ResolutionSnapshot) -> View {
    let Some(query) = snapshot.query.as_ref().filter(|q| !q.is_empty()) else {
        return View::Empty;
    };

    if snapshot.is_loading() {
        return View::Loading;
    }

    if let Some(message) = snapshot.error() {
        let message = if message.trim().is_empty() {
            GENERIC_ERROR_MESSAGE.to_string()
        } else {
            message.to_string()
        };
        return View::Error { message };
    }

    let identity = match query.mode {
        // the submitted text; the normalized form is only used to resolve
        LookupMode::Name => {
            let mut rows = vec![IdentityRow {
                kind: IdentityKind::Name,
                value: query.value.clone(),
            }];
            if let Some(address) = snapshot.address.value() {
                rows.push(IdentityRow {
                    kind: IdentityKind::Address,
                    value: address.to_string(),
                });
            }
            rows
        }
        LookupMode::Address => {
            let mut rows = vec![IdentityRow {
                kind: IdentityKind::Address,
                value: query.value.clone(),
            }];
            if let Some(name) = snapshot.name.value() {
                rows.push(IdentityRow {
                    kind: IdentityKind::Name,
                    value: name.to_string(),
                });
            }
            rows
        }
    };

    let records = TextKey::ALL
        .into_iter()
        .filter_map(|key| snapshot.text(key).map(|value| RecordRow::new(key, value)))
        .collect();

    View::Profile(ProfileView {
        avatar: snapshot.avatar.value().cloned(),
        identity,
        records,
    })
}
