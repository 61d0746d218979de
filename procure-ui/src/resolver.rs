//! CPV description resolver
//!
//! Turns a raw code from a prediction into display text using a dictionary
//! snapshot. Total: every input yields a string.
//!
//! Lookup order:
//! 1. Empty dictionary (not loaded, or failed to load) → placeholder
//! 2. Exact key
//! 3. For an 8-character code without a check digit, `code-0` through
//!    `code-9`, first hit wins
//! 4. Language chain `lang` → `en` → `pl`, skipping empty texts
//! 5. Garbled preferred text is replaced by the English text when it differs
//! 6. No entry → placeholder in `lang`

use crate::resources::Lang;
use crate::stores::dictionary::{CpvDictionary, DescriptionRecord};
use procure_common::api::CPV_CODE_LEN;

/// Characters left behind by a UTF-8 text decoded with the wrong charset
const GARBLE_MARKERS: [char; 2] = ['\u{FFFD}', 'Ã'];

/// Resolve `code` to a description in `lang`
///
/// `lang` is a dictionary language key; unknown keys fall through the
/// language chain and get the default-language placeholder.
pub fn resolve(code: &str, lang: &str, dictionary: &CpvDictionary) -> String {
    if dictionary.is_empty() {
        return placeholder(lang);
    }

    match find_record(code, dictionary) {
        Some(record) => preferred_text(record, lang),
        None => placeholder(lang),
    }
}

/// [`resolve`] for a known interface language
pub fn resolve_for(code: &str, lang: Lang, dictionary: &CpvDictionary) -> String {
    resolve(code, lang.code(), dictionary)
}

fn placeholder(lang: &str) -> String {
    Lang::from_code(lang)
        .unwrap_or_default()
        .description_pending()
        .to_string()
}

fn find_record<'a>(code: &str, dictionary: &'a CpvDictionary) -> Option<&'a DescriptionRecord> {
    if let Some(record) = dictionary.get(code) {
        return Some(record);
    }
    if !is_bare_code(code) {
        return None;
    }
    (0..=9).find_map(|digit| dictionary.get(&format!("{}-{}", code, digit)))
}

/// Code as emitted by the model: eight characters, no check digit suffix
fn is_bare_code(code: &str) -> bool {
    !code.contains('-') && code.chars().count() == CPV_CODE_LEN
}

fn preferred_text(record: &DescriptionRecord, lang: &str) -> String {
    let text = |key: &str| {
        record
            .get(key)
            .map(String::as_str)
            .filter(|s| !s.is_empty())
    };

    let preferred = text(lang)
        .or_else(|| text("en"))
        .or_else(|| text("pl"))
        .unwrap_or("");

    if looks_garbled(preferred) {
        if let Some(english) = text("en") {
            if english != preferred {
                return english.to_string();
            }
        }
    }

    preferred.to_string()
}

fn looks_garbled(text: &str) -> bool {
    text.contains(&GARBLE_MARKERS[..])
}
