//! core/sanitize.rs
//! Turn a rendered filename into something every filesystem accepts.

use unicode_normalization::{UnicodeNormalization, is_nfc};

/// Forbidden character -> substitute.
const FORBIDDEN: [(char, &str); 9] = [
    ('\\', " backslash "),
    ('/', " slash "),
    (':', " "),
    ('*', "_"),
    ('?', " "),
    ('"', "'"),
    ('<', "["),
    ('>', "]"),
    ('|', "_"),
];

/// Sanitize a filename stem (no extension).
///
/// 1. replace forbidden characters (see `FORBIDDEN`)
/// 2. collapse runs of spaces into one
/// 3. compose to NFC, so `ウ` + `゙` becomes `ヴ`
///
/// Idempotent: the steps repeat until nothing changes, so composition can
/// never leave a forbidden character or double space behind.
pub fn sanitize(text: &str) -> String {
    let mut current = pass(text);
    loop {
        let next = pass(&current);
        if next == current {
            return current;
        }
        current = next;
    }
}

fn pass(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match FORBIDDEN.iter().find(|(bad, _)| *bad == c) {
            Some((_, sub)) => out.push_str(sub),
            None => out.push(c),
        }
    }

    let out = collapse_spaces(&out);

    if is_nfc(&out) {
        out
    } else {
        out.nfc().collect()
    }
}

fn collapse_spaces(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut prev_space = false;
    for c in text.chars() {
        if c == ' ' {
            if !prev_space {
                out.push(c);
            }
            prev_space = true;
        } else {
            out.push(c);
            prev_space = false;
        }
    }
    out
}
