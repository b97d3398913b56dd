use serde::{Deserialize, Serialize};
use std::fmt;

/// Text record key holding an avatar URI.
pub const AVATAR_KEY: &str = "avatar";

/// Text records displayed on a profile, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextKey {
    Description,
    Twitter,
    Discord,
    Url,
    Email,
}

impl TextKey {
    pub const ALL: [TextKey; 5] = [
        TextKey::Description,
        TextKey::Twitter,
        TextKey::Discord,
        TextKey::Url,
        TextKey::Email,
    ];

    /// The on-chain record key.
    pub fn key(&self) -> &'static str {
        match self {
            TextKey::Description => "description",
            TextKey::Twitter => "com.twitter",
            TextKey::Discord => "com.discord",
            TextKey::Url => "url",
            TextKey::Email => "email",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            TextKey::Description => "Description",
            TextKey::Twitter => "Twitter",
            TextKey::Discord => "Discord",
            TextKey::Url => "Website",
            TextKey::Email => "Email",
        }
    }
}

impl fmt::Display for TextKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}
