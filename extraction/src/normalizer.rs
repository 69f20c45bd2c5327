// Text Normalizer
// Pure text -> text cleanup applied before any pattern matching: HTML
// entities, Cyrillic look-alike substitutions that break ticker and
// direction matching, and whitespace collapse. No I/O, never fails.

use std::collections::HashMap;

use lazy_static::lazy_static;

lazy_static! {
    /// HTML entities that survive chat exports and scrapes
    static ref HTML_ENTITIES: Vec<(&'static str, &'static str)> = vec![
        ("&amp;", "&"),
        ("&lt;", "<"),
        ("&gt;", ">"),
        ("&quot;", "\""),
        ("&#39;", "'"),
        ("&apos;", "'"),
        ("&nbsp;", " "),
    ];

    /// Cyrillic characters that render identically to Latin ones. OCR and
    /// machine translation regularly swap these inside tickers ("ВТС") and
    /// direction words ("LОNG").
    static ref HOMOGLYPHS: HashMap<char, char> = {
        let mut m = HashMap::new();
        m.insert('А', 'A');
        m.insert('В', 'B');
        m.insert('Е', 'E');
        m.insert('К', 'K');
        m.insert('М', 'M');
        m.insert('Н', 'H');
        m.insert('О', 'O');
        m.insert('Р', 'P');
        m.insert('С', 'C');
        m.insert('Т', 'T');
        m.insert('У', 'Y');
        m.insert('Х', 'X');
        m.insert('а', 'a');
        m.insert('е', 'e');
        m.insert('о', 'o');
        m.insert('р', 'p');
        m.insert('с', 'c');
        m.insert('у', 'y');
        m.insert('х', 'x');
        m
    };
}

/// Normalize one message. Empty input comes back unchanged.
pub fn normalize_text(text: &str) -> String {
    if text.trim().is_empty() {
        return text.to_string();
    }

    let mut cleaned = text.to_string();
    for (entity, replacement) in HTML_ENTITIES.iter() {
        if cleaned.contains(entity) {
            cleaned = cleaned.replace(entity, replacement);
        }
    }

    let demangled: Vec<String> = cleaned
        .split_whitespace()
        .map(demangle_token)
        .collect();

    demangled.join(" ")
}

/// Replace Cyrillic look-alikes inside a token, but only when the token is
/// plausibly a mangled Latin word: it mixes scripts, or every character has
/// a Latin look-alike. Genuine Russian words (СТОП, ЛОНГ) pass through so
/// the Russian label patterns still see them.
fn demangle_token(token: &str) -> String {
    let has_ascii = token.chars().any(|c| c.is_ascii_alphanumeric());
    let all_mappable = token
        .chars()
        .filter(|c| c.is_alphabetic())
        .all(|c| c.is_ascii() || HOMOGLYPHS.contains_key(&c));

    if has_ascii || all_mappable {
        token
            .chars()
            .map(|c| *HOMOGLYPHS.get(&c).unwrap_or(&c))
            .collect()
    } else {
        token.to_string()
    }
}
