use std::collections::HashMap;
use std::sync::LazyLock;

/// Alias table mapping 2-letter codes, 3-letter codes, English names
/// and locale-qualified forms (`pt-br`) onto ISO-639-1 codes.
static LANG_ALIASES: LazyLock<HashMap<&'static str, &'static str>> = LazyLock::new(|| {
    HashMap::from([
        ("es", "es"),
        ("spa", "es"),
        ("spanish", "es"),
        ("es-es", "es"),
        ("en", "en"),
        ("eng", "en"),
        ("english", "en"),
        ("en-us", "en"),
        ("en-gb", "en"),
        ("pt", "pt"),
        ("por", "pt"),
        ("portuguese", "pt"),
        ("pt-br", "pt"),
        ("pt-pt", "pt"),
        ("fr", "fr"),
        ("fra", "fr"),
        ("french", "fr"),
        ("it", "it"),
        ("ita", "it"),
        ("italian", "it"),
        ("de", "de"),
        ("deu", "de"),
        ("german", "de"),
        ("ca", "ca"),
        ("cat", "ca"),
        ("catalan", "ca"),
        ("zh", "zh"),
        ("zho", "zh"),
        ("chinese", "zh"),
        ("zh-cn", "zh"),
        ("ja", "ja"),
        ("jpn", "ja"),
        ("japanese", "ja"),
        ("ko", "ko"),
        ("kor", "ko"),
        ("korean", "ko"),
        ("ar", "ar"),
        ("ara", "ar"),
        ("arabic", "ar"),
        ("ru", "ru"),
        ("rus", "ru"),
        ("russian", "ru"),
    ])
});

/// Normalize a language code or name to a recognized two-letter code.
/// Unrecognized input falls back to `default`, never passes through
/// raw.
pub fn normalize_language(code_or_name: &str, default: &str) -> String {
    let s = code_or_name.trim().to_lowercase().replace('_', "-");
    if s.is_empty() {
        return default.to_string();
    }
    if let Some(code) = LANG_ALIASES.get(s.as_str()) {
        return (*code).to_string();
    }
    if let Some((prefix, _)) = s.split_once('-') {
        if let Some(code) = LANG_ALIASES.get(prefix) {
            return (*code).to_string();
        }
    }
    let prefix: String = s.chars().take(2).collect();
    if let Some(code) = LANG_ALIASES.get(prefix.as_str()) {
        return (*code).to_string();
    }
    default.to_string()
}

/// Declared language on an incoming job: auto-detect or an explicit
/// code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LanguageHint {
    Auto,
    Code(String),
}

impl LanguageHint {
    /// Parse user input, coercing anything invalid to a safe value.
    pub fn parse(raw: &str, default: &str) -> Self {
        let s = raw.trim().to_lowercase();
        match s.as_str() {
            "" | "auto" | "autodetect" | "automatic" => LanguageHint::Auto,
            other => LanguageHint::Code(normalize_language(other, default)),
        }
    }

    pub fn is_auto(&self) -> bool {
        matches!(self, LanguageHint::Auto)
    }

    /// String form as stored on the job record.
    pub fn as_str(&self) -> &str {
        match self {
            LanguageHint::Auto => "auto",
            LanguageHint::Code(code) => code,
        }
    }

    /// Explicit code to forward to the transcription API, if any.
    pub fn explicit_code(&self) -> Option<&str> {
        match self {
            LanguageHint::Auto => None,
            LanguageHint::Code(code) => Some(code),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_three_letter_and_name_forms() {
        assert_eq!(normalize_language("spa", "en"), "es");
        assert_eq!(normalize_language("Portuguese", "en"), "pt");
        assert_eq!(normalize_language("ENG", "es"), "en");
    }

    #[test]
    fn strips_locale_qualifiers() {
        assert_eq!(normalize_language("pt-BR", "en"), "pt");
        assert_eq!(normalize_language("en_US", "es"), "en");
        assert_eq!(normalize_language("zh-TW", "en"), "zh");
    }

    #[test]
    fn unknown_codes_fall_back_to_default() {
        assert_eq!(normalize_language("xx", "en"), "en");
        assert_eq!(normalize_language("klingon", "es"), "es");
        assert_eq!(normalize_language("", "en"), "en");
    }

    #[test]
    fn multibyte_input_coerces_instead_of_panicking() {
        assert_eq!(normalize_language("日本語", "en"), "en");
        assert_eq!(normalize_language("中文", "en"), "en");
        assert_eq!(normalize_language("ñ", "en"), "en");
        // Two-char prefixes still work when they are a known code.
        assert_eq!(normalize_language("esperanto-ish", "en"), "es");
    }

    #[test]
    fn auto_variants_parse_as_auto() {
        assert_eq!(LanguageHint::parse("auto", "en"), LanguageHint::Auto);
        assert_eq!(LanguageHint::parse("  ", "en"), LanguageHint::Auto);
        assert_eq!(LanguageHint::parse("autodetect", "en"), LanguageHint::Auto);
    }

    #[test]
    fn invalid_hints_are_coerced_not_stored_raw() {
        let hint = LanguageHint::parse("not-a-language", "en");
        assert_eq!(hint, LanguageHint::Code("en".to_string()));
        let hint = LanguageHint::parse("日本語", "en");
        assert_eq!(hint, LanguageHint::Code("en".to_string()));
    }
}
