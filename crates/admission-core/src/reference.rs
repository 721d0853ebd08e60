//! Reference numbers: the public, human-shareable handle for an application.
//!
//! A reference is [`LENGTH`] characters drawn uniformly from `A-Z0-9`, which
//! gives roughly 3.7e15 possibilities. Stores still enforce uniqueness and
//! regenerate on collision.

use rand_core::{OsRng, RngCore};

pub const LENGTH: usize = 10;

const ALPHABET: &[u8; 36] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Largest multiple of the alphabet size that fits in a byte; bytes at or
/// above it are rejected to keep the draw uniform.
const ACCEPT_BELOW: u8 = (256 / ALPHABET.len() * ALPHABET.len()) as u8;

/// Generate a fresh uppercase reference number.
pub fn generate() -> String {
  let mut out = String::with_capacity(LENGTH);
  let mut buf = [0u8; 16];
  while out.len() < LENGTH {
    OsRng.fill_bytes(&mut buf);
    for &b in &buf {
      if b < ACCEPT_BELOW {
        out.push(ALPHABET[(b as usize) % ALPHABET.len()] as char);
        if out.len() == LENGTH {
          break;
        }
      }
    }
  }
  out
}

/// Normalise user input to the stored form: trimmed and uppercase.
pub fn normalize(reference: &str) -> String {
  reference.trim().to_ascii_uppercase()
}

/// Whether `reference` has the stored form: [`LENGTH`] characters of
/// `A-Z0-9`.
pub fn is_valid(reference: &str) -> bool {
  reference.len() == LENGTH
    && reference
      .bytes()
      .all(|b| b.is_ascii_uppercase() || b.is_ascii_digit())
}

#[cfg(test)]
mod tests {
  use std::collections::HashSet;

  use super::*;

  #[test]
  fn generated_references_are_uppercase_alphanumeric() {
    for _ in 0..200 {
      let r = generate();
      assert_eq!(r.len(), LENGTH);
      assert!(
        r.bytes().all(|b| b.is_ascii_uppercase() || b.is_ascii_digit()),
        "{r}"
      );
      assert_eq!(normalize(&r), r);
      assert!(is_valid(&r));
    }
  }

  #[test]
  fn generated_references_do_not_repeat() {
    let refs: HashSet<String> = (0..10_000).map(|_| generate()).collect();
    assert_eq!(refs.len(), 10_000);
  }

  #[test]
  fn normalize_uppercases_and_trims() {
    assert_eq!(normalize("  abcde12345\n"), "ABCDE12345");
  }

  #[test]
  fn only_stored_form_is_valid() {
    assert!(is_valid("K3Q9ZP2M1A"));
    assert!(!is_valid("k3q9zp2m1a"));
    assert!(!is_valid("K3Q9ZP2M1"));
    assert!(!is_valid("../1"));
    assert!(!is_valid("K3Q9/P2M1A"));
    assert!(!is_valid(""));
  }
}
