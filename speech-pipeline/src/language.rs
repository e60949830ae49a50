use std::fmt;

use serde::{Deserialize, Serialize};

/// The fixed set of languages the pipeline will translate into and
/// synthesize speech for. Codes follow the tags the external services
/// exchange; anything outside this set is rejected before a single
/// external call is made.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LanguageCode {
    #[serde(rename = "en")]
    English,
    #[serde(rename = "es")]
    Spanish,
    #[serde(rename = "fr")]
    French,
    #[serde(rename = "de")]
    German,
    #[serde(rename = "it")]
    Italian,
    #[serde(rename = "pt")]
    Portuguese,
    #[serde(rename = "zh-CN")]
    ChineseSimplified,
    #[serde(rename = "zh-TW")]
    ChineseTraditional,
    #[serde(rename = "ja")]
    Japanese,
    #[serde(rename = "ko")]
    Korean,
    #[serde(rename = "hi")]
    Hindi,
    #[serde(rename = "ar")]
    Arabic,
    #[serde(rename = "ru")]
    Russian,
    #[serde(rename = "nl")]
    Dutch,
    #[serde(rename = "pl")]
    Polish,
    #[serde(rename = "tr")]
    Turkish,
}

impl LanguageCode {
    pub const ALL: [LanguageCode; 16] = [
        LanguageCode::English,
        LanguageCode::Spanish,
        LanguageCode::French,
        LanguageCode::German,
        LanguageCode::Italian,
        LanguageCode::Portuguese,
        LanguageCode::ChineseSimplified,
        LanguageCode::ChineseTraditional,
        LanguageCode::Japanese,
        LanguageCode::Korean,
        LanguageCode::Hindi,
        LanguageCode::Arabic,
        LanguageCode::Russian,
        LanguageCode::Dutch,
        LanguageCode::Polish,
        LanguageCode::Turkish,
    ];

    /// Wire code exchanged with external services.
    pub fn as_code(self) -> &'static str {
        match self {
            LanguageCode::English => "en",
            LanguageCode::Spanish => "es",
            LanguageCode::French => "fr",
            LanguageCode::German => "de",
            LanguageCode::Italian => "it",
            LanguageCode::Portuguese => "pt",
            LanguageCode::ChineseSimplified => "zh-CN",
            LanguageCode::ChineseTraditional => "zh-TW",
            LanguageCode::Japanese => "ja",
            LanguageCode::Korean => "ko",
            LanguageCode::Hindi => "hi",
            LanguageCode::Arabic => "ar",
            LanguageCode::Russian => "ru",
            LanguageCode::Dutch => "nl",
            LanguageCode::Polish => "pl",
            LanguageCode::Turkish => "tr",
        }
    }

    pub fn english_name(self) -> &'static str {
        match self {
            LanguageCode::English => "English",
            LanguageCode::Spanish => "Spanish",
            LanguageCode::French => "French",
            LanguageCode::German => "German",
            LanguageCode::Italian => "Italian",
            LanguageCode::Portuguese => "Portuguese",
            LanguageCode::ChineseSimplified => "Chinese (Simplified)",
            LanguageCode::ChineseTraditional => "Chinese (Traditional)",
            LanguageCode::Japanese => "Japanese",
            LanguageCode::Korean => "Korean",
            LanguageCode::Hindi => "Hindi",
            LanguageCode::Arabic => "Arabic",
            LanguageCode::Russian => "Russian",
            LanguageCode::Dutch => "Dutch",
            LanguageCode::Polish => "Polish",
            LanguageCode::Turkish => "Turkish",
        }
    }

    /// Parse a caller-supplied code. Case-insensitive; only exact codes
    /// from the supported set are accepted.
    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|lang| lang.as_code().eq_ignore_ascii_case(code))
    }

    /// Match a language tag reported by an external service, which may
    /// be a code ("es"), a regional tag ("es-MX"), or a spelled-out
    /// name ("spanish", as whisper's verbose output reports).
    pub fn matches_tag(self, tag: &str) -> bool {
        let tag = tag.trim();
        if tag.eq_ignore_ascii_case(self.as_code()) || tag.eq_ignore_ascii_case(self.english_name())
        {
            return true;
        }
        let primary = tag.split(['-', '_']).next().unwrap_or(tag);
        let own_primary = self.as_code().split('-').next().unwrap_or(self.as_code());
        primary.eq_ignore_ascii_case(own_primary)
    }

    /// Best-effort mapping from a service-reported tag back into the
    /// supported set.
    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|lang| lang.matches_tag(tag))
    }
}

impl fmt::Display for LanguageCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_supported_codes() {
        assert_eq!(LanguageCode::from_code("es"), Some(LanguageCode::Spanish));
        assert_eq!(LanguageCode::from_code("ES"), Some(LanguageCode::Spanish));
        assert_eq!(
            LanguageCode::from_code("zh-cn"),
            Some(LanguageCode::ChineseSimplified)
        );
    }

    #[test]
    fn rejects_unknown_codes() {
        assert_eq!(LanguageCode::from_code("xx"), None);
        assert_eq!(LanguageCode::from_code(""), None);
        assert_eq!(LanguageCode::from_code("bn"), None);
    }

    #[test]
    fn matches_service_tags() {
        assert!(LanguageCode::Spanish.matches_tag("es"));
        assert!(LanguageCode::Spanish.matches_tag("spanish"));
        assert!(LanguageCode::Spanish.matches_tag("es-MX"));
        assert!(!LanguageCode::Spanish.matches_tag("en"));
    }

    #[test]
    fn serde_uses_wire_codes() {
        let json = serde_json::to_string(&LanguageCode::ChineseSimplified).unwrap();
        assert_eq!(json, "\"zh-CN\"");
        let back: LanguageCode = serde_json::from_str(&json).unwrap();
        assert_eq!(back, LanguageCode::ChineseSimplified);
    }
}
