use std::sync::LazyLock;

use icu_normalizer::{ComposingNormalizerBorrowed, DecomposingNormalizerBorrowed};

/// Sequences a Remington typist builds from two keystrokes that Unicode
/// keeps distinct from the single precomposed letter. Left side is the
/// keystroke sequence, right side the canonical form.
pub const VOWEL_COMPOSITIONS: &[(&str, &str)] = &[
    ("\u{0905}\u{093E}", "\u{0906}"), // अ + ा → आ
    ("\u{0905}\u{094B}", "\u{0913}"), // अ + ो → ओ
    ("\u{0905}\u{094C}", "\u{0914}"), // अ + ौ → औ
    ("\u{0906}\u{0947}", "\u{0913}"), // आ + े → ओ
    ("\u{0906}\u{0948}", "\u{0914}"), // आ + ै → औ
    ("\u{090F}\u{0947}", "\u{0910}"), // ए + े → ऐ
    ("\u{0909}\u{0942}", "\u{090A}"), // उ + ू → ऊ
    ("\u{0905}\u{0945}", "\u{0972}"), // अ + ॅ → ॲ
    ("\u{0906}\u{0945}", "\u{0911}"), // आ + ॅ → ऑ
    ("\u{093E}\u{0947}", "\u{094B}"), // ा + े → ो
    ("\u{093E}\u{0948}", "\u{094C}"), // ा + ै → ौ
];

/// Inverse of [`VOWEL_COMPOSITIONS`], fully expanded to keystroke order.
const VOWEL_EXPANSIONS: &[(char, &str)] = &[
    ('\u{0906}', "\u{0905}\u{093E}"),
    ('\u{0913}', "\u{0905}\u{093E}\u{0947}"),
    ('\u{0914}', "\u{0905}\u{093E}\u{0948}"),
    ('\u{0910}', "\u{090F}\u{0947}"),
    ('\u{090A}', "\u{0909}\u{0942}"),
    ('\u{0972}', "\u{0905}\u{0945}"),
    ('\u{0911}', "\u{0905}\u{093E}\u{0945}"),
    ('\u{094B}', "\u{093E}\u{0947}"),
    ('\u{094C}', "\u{093E}\u{0948}"),
];

pub const ANUSVARA: char = '\u{0902}';
pub const CHANDRABINDU: char = '\u{0901}';

/// True for a lone anusvara or chandrabindu.
pub fn is_nasal_mark(text: &str) -> bool {
    let mut chars = text.chars();
    matches!((chars.next(), chars.next()), (Some(ANUSVARA | CHANDRABINDU), None))
}

/// Dependent vowel signs a nasalisation mark may be typed in front of.
const MATRAS: &[char] = &[
    '\u{093E}', '\u{093F}', '\u{0940}', '\u{0941}', '\u{0942}', '\u{0943}', '\u{0944}',
    '\u{0945}', '\u{0946}', '\u{0947}', '\u{0948}', '\u{0949}', '\u{094A}', '\u{094B}',
    '\u{094C}',
];

/// Full ordered rule table: vowel compositions, nasal mark reordering
/// (mark + matra → matra + mark) and doubled-mark collapsing.
static EQUIVALENCES: LazyLock<Vec<(String, String)>> = LazyLock::new(|| {
    let mut rules: Vec<(String, String)> = VOWEL_COMPOSITIONS
        .iter()
        .map(|&(from, to)| (from.to_string(), to.to_string()))
        .collect();
    for mark in [ANUSVARA, CHANDRABINDU] {
        for &matra in MATRAS {
            rules.push((format!("{mark}{matra}"), format!("{matra}{mark}")));
        }
        rules.push((format!("{mark}{mark}"), mark.to_string()));
    }
    rules
});

pub fn equivalences() -> &'static [(String, String)] {
    &EQUIVALENCES
}

fn nfc(text: &str) -> String {
    String::from(ComposingNormalizerBorrowed::new_nfc().normalize(text))
}

fn nfd(text: &str) -> String {
    String::from(DecomposingNormalizerBorrowed::new_nfd().normalize(text))
}

fn apply_equivalences(text: &str) -> String {
    let mut out = text.to_string();
    loop {
        let mut changed = false;
        for (from, to) in EQUIVALENCES.iter() {
            if out.contains(from.as_str()) {
                out = out.replace(from.as_str(), to);
                changed = true;
            }
        }
        if !changed {
            return out;
        }
    }
}

/// Canonical comparison form: NFC, then the equivalence table, repeated
/// until nothing changes. Idempotent.
pub fn normalize(text: &str) -> String {
    let mut current = nfc(text);
    loop {
        let next = nfc(&apply_equivalences(&current));
        if next == current {
            return current;
        }
        current = next;
    }
}

/// Keystroke-order form: composite vowels spelled out the way they are
/// typed, then NFD. `normalize(&expand(s)) == normalize(s)`.
pub fn expand(text: &str) -> String {
    let mut out = String::with_capacity(text.len() * 2);
    for ch in normalize(text).chars() {
        match VOWEL_EXPANSIONS.iter().find(|(c, _)| *c == ch) {
            Some((_, expansion)) => out.push_str(expansion),
            None => out.push(ch),
        }
    }
    nfd(&out)
}
