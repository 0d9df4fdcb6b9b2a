//! # Reply Catalogue
//!
//! Fixed texts the bot sends back to a chat, per configured language.
//!
//! - **Version**: 1.0.0
//! - **Since**: 1.0.0
//!
//! ## Changelog
//! - 1.0.0: Initial release

/// Language of the bot's fixed replies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Language {
    #[default]
    Russian,
    English,
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Language::Russian => write!(f, "ru"),
            Language::English => write!(f, "en"),
        }
    }
}

impl std::str::FromStr for Language {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "ru" | "russian" => Ok(Language::Russian),
            "en" | "english" => Ok(Language::English),
            _ => Err(anyhow::anyhow!("Invalid bot language: {}", s)),
        }
    }
}

/// Fixed reply texts for one language
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Replies {
    /// Answer to `/start`
    pub welcome: &'static str,
    /// Reminder stored
    pub created: &'static str,
    /// Message does not have the `dd.MM.yyyy HH:mm <text>` shape
    pub format_error: &'static str,
    /// Shape matched but the date or time does not exist
    pub invalid_date: &'static str,
    /// Store rejected the reminder
    pub save_failed: &'static str,
}

const RUSSIAN: Replies = Replies {
    welcome: "Привет! Напиши, что тебе необходимо напомнить?",
    created: "Напоминание успешно создано!",
    format_error: "Неверный формат сообщения. Пожалуйста, используйте формат: dd.MM.yyyy HH:mm Напоминание",
    invalid_date: "Произошла ошибка при создании напоминания. Проверьте формат сообщения.",
    save_failed: "Не удалось сохранить напоминание. Попробуйте ещё раз позже.",
};

const ENGLISH: Replies = Replies {
    welcome: "Hi! What should I remind you about?",
    created: "Reminder created!",
    format_error: "Invalid message format. Please use: dd.MM.yyyy HH:mm Reminder",
    invalid_date: "Could not create the reminder. Check the date and time.",
    save_failed: "Could not save the reminder. Please try again later.",
};

impl Replies {
    pub fn for_language(language: Language) -> &'static Replies {
        match language {
            Language::Russian => &RUSSIAN,
            Language::English => &ENGLISH,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_language_parse() {
        assert_eq!("ru".parse::<Language>().unwrap(), Language::Russian);
        assert_eq!("EN".parse::<Language>().unwrap(), Language::English);
        assert_eq!(" english ".parse::<Language>().unwrap(), Language::English);
        assert!("de".parse::<Language>().is_err());
    }

    #[test]
    fn test_language_display_round_trips() {
        for lang in [Language::Russian, Language::English] {
            assert_eq!(lang.to_string().parse::<Language>().unwrap(), lang);
        }
    }

    #[test]
    fn test_format_error_mentions_expected_shape() {
        for lang in [Language::Russian, Language::English] {
            assert!(Replies::for_language(lang)
                .format_error
                .contains("dd.MM.yyyy HH:mm"));
        }
    }
}
