//! Locale-aware number formatting for user-facing status messages.

const BYTES_PER_MEBIBYTE: f64 = 1024.0 * 1024.0;

/// Language codes whose decimal separator is a comma.
const COMMA_DECIMAL_LANGUAGES: &[&str] = &[
    "bg", "ca", "cs", "da", "de", "el", "es", "et", "fi", "fr", "hr", "hu", "id", "is", "it",
    "lt", "lv", "nb", "nl", "nn", "no", "pl", "pt", "ro", "ru", "sk", "sl", "sr", "sv", "tr",
    "uk", "vi",
];

/// The subset of locale data needed to render decimal numbers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NumberLocale {
    decimal_separator: char,
}

impl NumberLocale {
    pub const ENGLISH: Self = Self {
        decimal_separator: '.',
    };

    pub const GERMAN: Self = Self {
        decimal_separator: ',',
    };

    /// Parse a POSIX or BCP 47 locale tag such as `de_DE.UTF-8` or `fr-CA`.
    ///
    /// Unrecognized tags fall back to [`NumberLocale::ENGLISH`].
    pub fn from_tag(tag: &str) -> Self {
        let language = tag
            .split(['_', '-', '.', '@'])
            .next()
            .unwrap_or_default()
            .to_ascii_lowercase();
        if COMMA_DECIMAL_LANGUAGES.contains(&language.as_str()) {
            Self::GERMAN
        } else {
            Self::ENGLISH
        }
    }

    /// Detect the locale from `LC_ALL`, `LC_NUMERIC` and `LANG`, in that order.
    pub fn from_env() -> Self {
        ["LC_ALL", "LC_NUMERIC", "LANG"]
            .iter()
            .filter_map(|var| std::env::var(var).ok())
            .find(|value| !value.is_empty())
            .map(|tag| Self::from_tag(&tag))
            .unwrap_or(Self::ENGLISH)
    }

    pub fn decimal_separator(&self) -> char {
        self.decimal_separator
    }

    /// Format `value` with exactly two fraction digits.
    pub fn format_decimal(&self, value: f64) -> String {
        let rendered = format!("{value:.2}");
        if self.decimal_separator == '.' {
            rendered
        } else {
            rendered.replace('.', &self.decimal_separator.to_string())
        }
    }
}

impl Default for NumberLocale {
    fn default() -> Self {
        Self::ENGLISH
    }
}

/// Render a byte count as mebibytes with two decimals, e.g. `0.08 MB`.
pub fn format_megabytes(bytes: u64, locale: &NumberLocale) -> String {
    format!(
        "{} MB",
        locale.format_decimal(bytes as f64 / BYTES_PER_MEBIBYTE)
    )
}
