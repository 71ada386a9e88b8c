//! Per-locale UI strings with English fallback.

/// Keys for strings the library itself produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Text {
    /// Appended to names of categories imported under the `rename` policy.
    ImportedSuffix,
    /// Placeholder when no name can be resolved.
    Unknown,
}

const FALLBACK_LOCALE: &str = "en";

fn table(locale: &str, key: Text) -> Option<&'static str> {
    let text = match (locale, key) {
        ("de", Text::ImportedSuffix) => "(Importiert)",
        ("de", Text::Unknown) => "Unbekannt",
        ("en", Text::ImportedSuffix) => "(Imported)",
        ("en", Text::Unknown) => "Unknown",
        ("fr", Text::ImportedSuffix) => "(Importé)",
        ("fr", Text::Unknown) => "Inconnu",
        ("es", Text::ImportedSuffix) => "(Importado)",
        ("es", Text::Unknown) => "Desconocido",
        _ => return None,
    };
    Some(text)
}

/// Look up `key` for `locale`.
///
/// `de-AT` falls back to `de`, anything unknown falls back to English.
pub fn text(locale: &str, key: Text) -> &'static str {
    let locale = locale.trim().to_lowercase().replace('_', "-");
    let language = locale.split('-').next().unwrap_or_default();

    table(&locale, key)
        .or_else(|| table(language, key))
        .or_else(|| table(FALLBACK_LOCALE, key))
        .unwrap_or_default()
}
