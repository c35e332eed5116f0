//! Language packs and locale detection.
//!
//! Every supported language ships a fixed, compiled-in table of strings keyed by
//! the identifiers in [`keys`]. There is no fallback between packs: a key a pack
//! does not define is simply not applied.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Text keys used by the page markup.
pub mod keys {
    pub const TITLE: &str = "title";
    pub const DESCRIPTION: &str = "description";
    pub const HEADLINE_1: &str = "headline1";
    pub const HEADLINE_2: &str = "headline2";
    pub const SUBHEADLINE: &str = "subheadline";
    pub const CTA_BUTTON: &str = "cta_button";
    pub const CHIP_ANXIETY: &str = "chip_anxiety";
    pub const CHIP_STRESS: &str = "chip_stress";
    pub const CHIP_MINDFULNESS: &str = "chip_mindfulness";
    pub const PLACEHOLDER_INPUT: &str = "placeholder_input";
    pub const WELCOME_MESSAGE: &str = "welcome_message";
}

/// Supported display languages.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    /// English (base language).
    #[default]
    En,
    /// French.
    Fr,
    /// Arabic, rendered right-to-left.
    Ar,
}

/// Document text direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextDirection {
    Ltr,
    Rtl,
}

impl TextDirection {
    /// Value for the HTML `dir` attribute.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Ltr => "ltr",
            Self::Rtl => "rtl",
        }
    }
}

impl Language {
    /// Every supported language, in selector order.
    pub const ALL: [Language; 3] = [Language::En, Language::Fr, Language::Ar];

    /// BCP 47 primary language subtag.
    pub fn code(self) -> &'static str {
        match self {
            Self::En => "en",
            Self::Fr => "fr",
            Self::Ar => "ar",
        }
    }

    /// Name shown in the language selector.
    pub fn native_name(self) -> &'static str {
        match self {
            Self::En => "English",
            Self::Fr => "Français",
            Self::Ar => "العربية",
        }
    }

    pub fn direction(self) -> TextDirection {
        match self {
            Self::Ar => TextDirection::Rtl,
            Self::En | Self::Fr => TextDirection::Ltr,
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|lang| lang.code().eq_ignore_ascii_case(code.trim()))
    }

    /// The strings for this language.
    pub fn pack(self) -> &'static LanguagePack {
        match self {
            Self::En => &EN,
            Self::Fr => &FR,
            Self::Ar => &AR,
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Error returned when parsing an unsupported language code.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unsupported language code: {0}")]
pub struct UnsupportedLanguage(pub String);

impl FromStr for Language {
    type Err = UnsupportedLanguage;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_code(s).ok_or_else(|| UnsupportedLanguage(s.to_string()))
    }
}

/// Pick a supported language from a runtime locale such as `fr-CA` or `ar_EG`.
///
/// Only the primary subtag is considered. Anything unrecognised, including a
/// missing locale, yields the base language.
pub fn detect_language(locale: Option<&str>) -> Language {
    locale
        .and_then(|tag| tag.split(['-', '_']).next())
        .and_then(Language::from_code)
        .unwrap_or_default()
}

/// Pick a supported language from an HTTP `Accept-Language` header value.
///
/// Entries are tried in the order given; quality weights are ignored.
pub fn detect_from_accept_language(header: Option<&str>) -> Language {
    header
        .into_iter()
        .flat_map(|value| value.split(','))
        .map(|entry| entry.split(';').next().unwrap_or_default().trim())
        .filter_map(|tag| tag.split(['-', '_']).next().and_then(Language::from_code))
        .next()
        .unwrap_or_default()
}

/// Immutable key to string table for one language.
#[derive(Debug)]
pub struct LanguagePack {
    language: Language,
    entries: &'static [(&'static str, &'static str)],
}

impl LanguagePack {
    pub fn language(&self) -> Language {
        self.language
    }

    /// Look up a key. Unknown keys return `None`.
    pub fn get(&self, key: &str) -> Option<&'static str> {
        self.entries
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| *v)
    }

    /// Resolve a suggestion query: the translated text if the key is known,
    /// otherwise the query itself.
    pub fn resolve_query<'a>(&self, query: &'a str) -> &'a str {
        self.get(query).unwrap_or(query)
    }

    pub fn welcome_message(&self) -> &'static str {
        self.get(keys::WELCOME_MESSAGE).unwrap_or_default()
    }

    pub fn entries(&self) -> impl Iterator<Item = (&'static str, &'static str)> + '_ {
        self.entries.iter().copied()
    }
}

static EN: LanguagePack = LanguagePack {
    language: Language::En,
    entries: &[
        (keys::TITLE, "Mind-Soothe | Your Space to Reflect"),
        (
            keys::DESCRIPTION,
            "An AI companion for mental well-being. A safe space to explore your thoughts and feelings, with gentle guidance and support.",
        ),
        (keys::HEADLINE_1, "A quiet place"),
        (keys::HEADLINE_2, "for your thoughts."),
        (
            keys::SUBHEADLINE,
            "An empathetic AI assistant designed to listen, support, and help you navigate your feelings. Start a conversation whenever you need.",
        ),
        (keys::CTA_BUTTON, "Begin Session"),
        (keys::CHIP_ANXIETY, "Coping with anxiety"),
        (keys::CHIP_STRESS, "Managing stress"),
        (keys::CHIP_MINDFULNESS, "What is mindfulness?"),
        (keys::PLACEHOLDER_INPUT, "How are you feeling today?"),
        (
            keys::WELCOME_MESSAGE,
            "Hello. I'm Mind-Soothe, your AI companion for reflection. Feel free to share what's on your mind. I'm here to listen without judgment.",
        ),
    ],
};

static FR: LanguagePack = LanguagePack {
    language: Language::Fr,
    entries: &[
        (keys::TITLE, "Mind-Soothe | Votre Espace pour Réfléchir"),
        (
            keys::DESCRIPTION,
            "Un compagnon IA pour le bien-être mental. Un espace sûr pour explorer vos pensées et sentiments, avec un soutien et des conseils bienveillants.",
        ),
        (keys::HEADLINE_1, "Un lieu apaisant"),
        (keys::HEADLINE_2, "pour vos pensées."),
        (
            keys::SUBHEADLINE,
            "Un assistant IA empathique conçu pour écouter, soutenir et vous aider à naviguer vos émotions. Commencez la conversation quand vous en avez besoin.",
        ),
        (keys::CTA_BUTTON, "Commencer la Session"),
        (keys::CHIP_ANXIETY, "Gérer l'anxiété"),
        (keys::CHIP_STRESS, "Faire face au stress"),
        (keys::CHIP_MINDFULNESS, "Qu'est-ce que la pleine conscience ?"),
        (keys::PLACEHOLDER_INPUT, "Comment vous sentez-vous aujourd'hui ?"),
        (
            keys::WELCOME_MESSAGE,
            "Bonjour. Je suis Mind-Soothe, votre compagnon IA pour la réflexion. N'hésitez pas à partager ce qui vous préoccupe. Je suis là pour écouter sans jugement.",
        ),
    ],
};

static AR: LanguagePack = LanguagePack {
    language: Language::Ar,
    entries: &[
        (keys::TITLE, "Mind-Soothe | مساحتك للتفكير"),
        (
            keys::DESCRIPTION,
            "رفيق ذكاء اصطناعي للصحة النفسية. مساحة آمنة لاستكشاف أفكارك ومشاعرك، مع توجيه ودعم لطيف.",
        ),
        (keys::HEADLINE_1, "مكان هادئ"),
        (keys::HEADLINE_2, "لأفكارك."),
        (
            keys::SUBHEADLINE,
            "مساعد ذكاء اصطناعي متعاطف مصمم للاستماع والدعم ومساعدتك في التعامل مع مشاعرك. ابدأ المحادثة متى احتجت.",
        ),
        (keys::CTA_BUTTON, "ابدأ الجلسة"),
        (keys::CHIP_ANXIETY, "التعامل مع القلق"),
        (keys::CHIP_STRESS, "إدارة التوتر"),
        (keys::CHIP_MINDFULNESS, "ما هو الوعي التام؟"),
        (keys::PLACEHOLDER_INPUT, "كيف تشعر اليوم؟"),
        (
            keys::WELCOME_MESSAGE,
            "مرحباً. أنا Mind-Soothe، رفيقك الذكي للتفكير. لا تتردد في مشاركة ما يدور في ذهنك. أنا هنا للاستماع دون أي حكم.",
        ),
    ],
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_language_primary_subtag() {
        assert_eq!(detect_language(Some("fr-CA")), Language::Fr);
        assert_eq!(detect_language(Some("ar")), Language::Ar);
        assert_eq!(detect_language(Some("AR_eg")), Language::Ar);
        assert_eq!(detect_language(Some("de-DE")), Language::En);
        assert_eq!(detect_language(Some("")), Language::En);
        assert_eq!(detect_language(None), Language::En);
    }

    #[test]
    fn test_detect_from_accept_language() {
        assert_eq!(
            detect_from_accept_language(Some("de-DE,fr;q=0.8,en;q=0.5")),
            Language::Fr
        );
        assert_eq!(detect_from_accept_language(Some("*")), Language::En);
        assert_eq!(detect_from_accept_language(None), Language::En);
    }

    #[test]
    fn test_only_arabic_is_rtl() {
        for lang in Language::ALL {
            let expected = if lang == Language::Ar {
                TextDirection::Rtl
            } else {
                TextDirection::Ltr
            };
            assert_eq!(lang.direction(), expected, "{lang}");
        }
    }

    #[test]
    fn test_packs_define_the_same_keys() {
        let english: Vec<_> = Language::En.pack().entries().map(|(k, _)| k).collect();
        for lang in Language::ALL {
            let pack = lang.pack();
            assert_eq!(pack.language(), lang);
            for key in &english {
                assert!(pack.get(key).is_some(), "{lang} is missing {key}");
            }
        }
    }

    #[test]
    fn test_resolve_query_falls_back_to_literal() {
        let pack = Language::Fr.pack();
        assert_eq!(pack.resolve_query(keys::CHIP_STRESS), "Faire face au stress");
        assert_eq!(pack.resolve_query("tell me a joke"), "tell me a joke");
    }

    #[test]
    fn test_language_parse() {
        assert_eq!("fr".parse::<Language>(), Ok(Language::Fr));
        assert!("xx".parse::<Language>().is_err());
        assert_eq!(serde_json::to_string(&Language::Ar).unwrap(), "\"ar\"");
    }
}
