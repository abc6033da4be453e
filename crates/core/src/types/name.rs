//! Customer name handling: greeting name and roster ordering.

use std::cmp::Ordering;

/// Name used when a record has a blank full name.
const FALLBACK_FIRST_NAME: &str = "cliente";

/// First whitespace-separated token of `full_name`, capitalized.
///
/// `"MARIA da silva"` becomes `"Maria"`. Blank names fall back to `"cliente"`.
#[must_use]
pub fn first_name(full_name: &str) -> String {
    let Some(token) = full_name.split_whitespace().next() else {
        return FALLBACK_FIRST_NAME.to_owned();
    };

    let mut chars = token.chars();
    chars.next().map_or_else(String::new, |head| {
        head.to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect()
    })
}

/// Compare two names the way a `pt-BR` collator orders them.
///
/// Letters are compared ignoring accents and case first; accents break ties
/// next (unaccented first) and case last (lowercase first), so `"ana"`,
/// `"Ana"`, `"Ána"` and `"Bruno"` sort in that order.
#[must_use]
pub fn compare_names(a: &str, b: &str) -> Ordering {
    let (a_primary, a_accents, a_case) = collation_key(a);
    let (b_primary, b_accents, b_case) = collation_key(b);

    a_primary
        .cmp(&b_primary)
        .then_with(|| a_accents.cmp(&b_accents))
        .then_with(|| a_case.cmp(&b_case))
}

type CollationKey = (Vec<char>, Vec<bool>, Vec<bool>);

fn collation_key(name: &str) -> CollationKey {
    let mut primary = Vec::with_capacity(name.len());
    let mut accents = Vec::with_capacity(name.len());
    let mut case = Vec::with_capacity(name.len());

    for c in name.trim().chars() {
        let upper = c.is_uppercase();
        for lower in c.to_lowercase() {
            let (base, accented) = fold_accent(lower);
            primary.push(base);
            accents.push(accented);
            case.push(upper);
        }
    }

    (primary, accents, case)
}

/// Strip the diacritic from a lowercase Latin letter.
const fn fold_accent(c: char) -> (char, bool) {
    let base = match c {
        'à' | 'á' | 'â' | 'ã' | 'ä' | 'å' => 'a',
        'ç' => 'c',
        'è' | 'é' | 'ê' | 'ë' => 'e',
        'ì' | 'í' | 'î' | 'ï' => 'i',
        'ñ' => 'n',
        'ò' | 'ó' | 'ô' | 'õ' | 'ö' => 'o',
        'ù' | 'ú' | 'û' | 'ü' => 'u',
        'ý' | 'ÿ' => 'y',
        _ => return (c, false),
    };
    (base, true)
}
