//! Passenger record locator generation.

use rand::Rng;

const LETTERS: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ";
const LETTERS_AND_DIGITS: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Generate a six-character record locator: one uppercase letter followed by
/// five characters drawn from A-Z0-9.
///
/// The generator does not check for collisions with existing locators; the
/// persistence layer's uniqueness constraint is the arbiter, and a violation
/// aborts the enclosing booking transaction.
pub fn generate() -> String {
    let mut rng = rand::thread_rng();
    let mut pnr = String::with_capacity(6);
    pnr.push(LETTERS[rng.gen_range(0..LETTERS.len())] as char);
    for _ in 0..5 {
        pnr.push(LETTERS_AND_DIGITS[rng.gen_range(0..LETTERS_AND_DIGITS.len())] as char);
    }
    pnr
}

/// Check a candidate against the `[A-Z][A-Z0-9]{5}` locator format.
pub fn is_valid(pnr: &str) -> bool {
    let mut chars = pnr.chars();
    match chars.next() {
        Some(first) if first.is_ascii_uppercase() => {}
        _ => return false,
    }
    let rest: Vec<char> = chars.collect();
    rest.len() == 5
        && rest
            .iter()
            .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit())
}
