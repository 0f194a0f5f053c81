// Translation catalogue for user-facing notices

use std::fmt;
use std::str::FromStr;

/// Translation keys looked up by the runtime
pub mod keys {
    pub const PLAN_LIMIT: &str = "errors.planLimit";
    pub const FORBIDDEN: &str = "errors.forbidden";
    pub const NOT_FOUND: &str = "errors.notFound";
    pub const TOO_MANY_REQUESTS: &str = "errors.tooManyRequests";
    pub const SERVER_ERROR: &str = "errors.serverError";
    pub const GENERIC: &str = "errors.generic";
    pub const CLOSE: &str = "common.close";
    pub const INVALID_CREDENTIALS: &str = "auth.login.invalidCredentials";
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Language {
    #[default]
    Tr,
    En,
}

impl Language {
    pub fn code(&self) -> &'static str {
        match self {
            Language::Tr => "tr",
            Language::En => "en",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Language {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "tr" | "tr-tr" => Ok(Language::Tr),
            "en" | "en-us" | "en-gb" => Ok(Language::En),
            other => Err(format!("unsupported language '{}'", other)),
        }
    }
}

const TR: &[(&str, &str)] = &[
    (keys::PLAN_LIMIT, "Plan limitinize ulaştınız. Devam etmek için planınızı yükseltin."),
    (keys::FORBIDDEN, "Bu işlem için yetkiniz yok."),
    (keys::NOT_FOUND, "İstenen kaynak bulunamadı."),
    (keys::TOO_MANY_REQUESTS, "Çok fazla istek gönderildi. Lütfen biraz bekleyin."),
    (keys::SERVER_ERROR, "Sunucu hatası oluştu. Lütfen daha sonra tekrar deneyin."),
    (keys::GENERIC, "Bir hata oluştu."),
    (keys::CLOSE, "Kapat"),
    (keys::INVALID_CREDENTIALS, "E-posta veya şifre hatalı."),
];

const EN: &[(&str, &str)] = &[
    (keys::PLAN_LIMIT, "You have reached your plan limit. Upgrade to continue."),
    (keys::FORBIDDEN, "You do not have permission to do that."),
    (keys::NOT_FOUND, "The requested resource was not found."),
    (keys::TOO_MANY_REQUESTS, "Too many requests. Please slow down."),
    (keys::SERVER_ERROR, "A server error occurred. Please try again later."),
    (keys::GENERIC, "Something went wrong."),
    (keys::CLOSE, "Close"),
    (keys::INVALID_CREDENTIALS, "Invalid email or password."),
];

#[derive(Debug, Clone, Copy, Default)]
pub struct Translator {
    language: Language,
}

impl Translator {
    pub fn new(language: Language) -> Self {
        Self { language }
    }

    /// Parse a configured language code, falling back to Turkish
    pub fn from_code(code: &str) -> Self {
        let language = code.parse().unwrap_or_else(|e| {
            tracing::warn!("{}, using {}", e, Language::default());
            Language::default()
        });
        Self::new(language)
    }

    pub fn language(&self) -> Language {
        self.language
    }

    pub fn lookup(&self, key: &str) -> Option<&'static str> {
        let table = match self.language {
            Language::Tr => TR,
            Language::En => EN,
        };
        table.iter().find(|(k, _)| *k == key).map(|(_, v)| *v)
    }

    /// Translated text, or the key itself when the catalogue has no entry
    pub fn instant(&self, key: &str) -> String {
        self.lookup(key)
            .map(str::to_string)
            .unwrap_or_else(|| key.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalogues_cover_the_same_keys() {
        assert_eq!(TR.len(), EN.len());
        for (key, _) in TR {
            assert!(EN.iter().any(|(k, _)| k == key), "missing en entry for {}", key);
        }
    }

    #[test]
    fn test_missing_key_falls_back_to_key() {
        let tr = Translator::default();
        assert_eq!(tr.language(), Language::Tr);
        assert_eq!(tr.instant(keys::CLOSE), "Kapat");
        assert_eq!(tr.instant("errors.unknown"), "errors.unknown");
        assert!(tr.lookup("errors.unknown").is_none());
    }

    #[test]
    fn test_from_code() {
        assert_eq!(Translator::from_code("EN").language(), Language::En);
        assert_eq!(Translator::from_code("de").language(), Language::Tr);
    }
}
