//! Internationalization (i18n) module
//!
//! Picks the UI language from the system locale. Supports English and
//! Chinese Simplified; translations live in `locales/app.yml`.
//! Note: Log messages remain in English for consistency.

/// Supported languages
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Language {
    English,
    ChineseSimplified,
}

impl Language {
    /// rust-i18n locale code
    pub fn code(self) -> &'static str {
        match self {
            Language::English => "en",
            Language::ChineseSimplified => "zh-CN",
        }
    }

    /// Map a BCP 47 tag (`zh-Hans-CN`, `en-US`, `zh_CN.UTF-8`) to a language
    pub fn from_tag(tag: &str) -> Self {
        let tag = tag.to_lowercase();
        if tag.starts_with("zh") || tag.contains("hans") {
            Language::ChineseSimplified
        } else {
            Language::English
        }
    }
}

/// Detect the system language, falling back to the usual environment variables
pub fn detect_language() -> Language {
    if let Some(tag) = sys_locale::get_locale() {
        return Language::from_tag(&tag);
    }

    std::env::var("LC_ALL")
        .or_else(|_| std::env::var("LC_MESSAGES"))
        .or_else(|_| std::env::var("LANG"))
        .map(|tag| Language::from_tag(&tag))
        .unwrap_or(Language::English)
}

/// Set the rust-i18n locale from the system language
pub fn init_locale() {
    let language = detect_language();
    rust_i18n::set_locale(language.code());
}
