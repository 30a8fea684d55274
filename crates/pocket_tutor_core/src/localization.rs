//! crates/pocket_tutor_core/src/localization.rs
//!
//! Multilingual notification templates. Every template carries the three
//! locales the marketplace ships with and renders into a `LocalizedText`
//! after substituting `{name}`-style placeholders.

use crate::domain::LocalizedText;

pub const ARABIC: &str = "ar";
pub const ENGLISH: &str = "en";
pub const URDU: &str = "ur";

/// The locales every notification is rendered in.
pub const SUPPORTED_LANGUAGES: [&str; 3] = [ARABIC, ENGLISH, URDU];

/// Display name used when the referenced user record is missing.
pub const UNKNOWN_STUDENT_NAME: &str = "طالب";
pub const UNKNOWN_USER_NAME: &str = "مستخدم";

#[derive(Debug, Clone, Copy)]
pub struct Template {
    pub ar: &'static str,
    pub en: &'static str,
    pub ur: &'static str,
}

impl Template {
    /// Renders every locale, replacing `{key}` with its value.
    pub fn render(&self, vars: &[(&str, &str)]) -> LocalizedText {
        [(ARABIC, self.ar), (ENGLISH, self.en), (URDU, self.ur)]
            .into_iter()
            .map(|(lang, text)| (lang.to_string(), interpolate(text, vars)))
            .collect()
    }
}

fn interpolate(template: &str, vars: &[(&str, &str)]) -> String {
    vars.iter().fold(template.to_string(), |acc, (key, value)| {
        acc.replace(&format!("{{{}}}", key), value)
    })
}

pub const BOOKING_TITLE: Template = Template {
    ar: "حجز جلسة جديدة",
    en: "New Session Booking",
    ur: "نیا سیشن بکنگ",
};

/// Placeholders: `{name}` (student).
pub const BOOKING_MESSAGE: Template = Template {
    ar: "طالب جديد {name} حجز جلسة معك",
    en: "New student {name} booked a session with you",
    ur: "نیا طالب {name} نے آپ کے ساتھ سیشن بک کیا",
};

pub const RATING_TITLE: Template = Template {
    ar: "تقييم جديد",
    en: "New Rating",
    ur: "نئی درجہ بندی",
};

/// Placeholders: `{score}`, `{name}` (student).
pub const RATING_MESSAGE: Template = Template {
    ar: "حصلت على تقييم {score} نجوم من {name}",
    en: "You received {score} stars rating from {name}",
    ur: "آپ کو {name} سے {score} ستارے کی درجه بندی ملی",
};

pub const MESSAGE_TITLE: Template = Template {
    ar: "رسالة جديدة",
    en: "New Message",
    ur: "نیا پیغام",
};

/// Placeholders: `{name}` (sender).
pub const MESSAGE_BODY: Template = Template {
    ar: "رسالة جديدة من {name}",
    en: "New message from {name}",
    ur: "{name} سے نیا پیغام",
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_all_three_locales() {
        let text = BOOKING_TITLE.render(&[]);
        assert_eq!(text.len(), 3);
        for lang in SUPPORTED_LANGUAGES {
            assert!(text.contains_key(lang));
        }
    }

    #[test]
    fn substitutes_every_placeholder() {
        let text = RATING_MESSAGE.render(&[("score", "5"), ("name", "Sara")]);
        assert_eq!(text[ENGLISH], "You received 5 stars rating from Sara");
        assert!(text[ARABIC].contains('5'));
        assert!(text[URDU].contains("Sara"));
        assert!(text.values().all(|v| !v.contains('{')));
    }
}
