//! URL-safe slug derivation for term names

use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Slug used when a name has no alphanumeric content at all
const FALLBACK_SLUG: &str = "term";

/// Derive a URL-safe slug from a display name
///
/// Accents are stripped by decomposing the name and dropping combining
/// marks. Letters that have no decomposition (`ı`, `ß`, `ø`, ...) are folded
/// through a small table. Every run of other characters becomes one `-`.
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_dash = false;

    for c in name.nfkd().filter(|c| !is_combining_mark(*c)) {
        if fold_letter(c).is_none() && !c.is_alphanumeric() {
            pending_dash = true;
            continue;
        }

        if pending_dash && !slug.is_empty() {
            slug.push('-');
        }
        pending_dash = false;

        match fold_letter(c) {
            Some(s) => slug.push_str(s),
            None => slug.extend(c.to_lowercase()),
        }
    }

    if slug.is_empty() {
        FALLBACK_SLUG.to_string()
    } else {
        slug
    }
}

fn fold_letter(c: char) -> Option<&'static str> {
    let folded = match c {
        'ı' => "i",
        'ß' => "ss",
        'æ' | 'Æ' => "ae",
        'ø' | 'Ø' => "o",
        'ł' | 'Ł' => "l",
        'đ' | 'Đ' => "d",
        'œ' | 'Œ' => "oe",
        'þ' | 'Þ' => "th",
        _ => return None,
    };
    Some(folded)
}
