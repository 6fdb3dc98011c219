// Copyright 2025 Fernando Borretti
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::fmt::Display;
use std::fmt::Formatter;

use serde::Deserialize;
use serde::Serialize;

/// Prefix of every identifier.
const TAG: &str = "card-";

/// Separates the question from the answer in the hashed string.
const SEPARATOR: char = '|';

const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// A content-addressed card identifier, e.g. `card-ix49bp`.
///
/// Identifiers are persisted in the mastery record, so the derivation in
/// [`identify`] must never change: the same question and answer text always
/// map to the same identifier. Distinct cards may collide; the hash is 32
/// bits wide.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CardId(String);

impl CardId {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[cfg(test)]
    pub fn from_raw(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl Display for CardId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Derive the identifier of a card from its question and answer.
///
/// The text `question|answer` is walked as UTF-16 code units, folding each
/// into `h = h * 31 + unit` with 32-bit signed wraparound. The absolute
/// value of the result is written in lowercase base 36 after the `card-`
/// tag.
pub fn identify(question: &str, answer: &str) -> CardId {
    let mut hash: i32 = 0;
    let units = question
        .encode_utf16()
        .chain(std::iter::once(SEPARATOR as u16))
        .chain(answer.encode_utf16());
    for unit in units {
        hash = hash.wrapping_mul(31).wrapping_add(i32::from(unit));
    }
    CardId(format!("{TAG}{}", to_base36(hash.unsigned_abs())))
}

fn to_base36(mut n: u32) -> String {
    if n == 0 {
        return "0".to_string();
    }
    let mut digits: Vec<u8> = Vec::new();
    while n > 0 {
        digits.push(DIGITS[(n % 36) as usize]);
        n /= 36;
    }
    digits.reverse();
    digits.into_iter().map(char::from).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_vectors() {
        assert_eq!(identify("a", "b").as_str(), "card-22yv");
        assert_eq!(identify("", "").as_str(), "card-3g");
        assert_eq!(
            identify("What is the capital of France?", "Paris").as_str(),
            "card-ix49bp"
        );
        assert_eq!(
            identify("This planet is known as the Red Planet", "Mars").as_str(),
            "card-musxx6"
        );
    }

    #[test]
    fn test_non_bmp_text_hashes_utf16_units() {
        assert_eq!(identify("Café 😀", "• bullet").as_str(), "card-llsjbu");
    }

    #[test]
    fn test_deterministic() {
        let a = identify("Who wrote Hamlet?", "Shakespeare");
        let b = identify("Who wrote Hamlet?", "Shakespeare");
        assert_eq!(a, b);
    }

    #[test]
    fn test_answer_matters() {
        let a = identify("Who wrote Hamlet?", "Shakespeare");
        let b = identify("Who wrote Hamlet?", "Marlowe");
        assert_ne!(a, b);
    }

    #[test]
    fn test_base36() {
        assert_eq!(to_base36(0), "0");
        assert_eq!(to_base36(35), "z");
        assert_eq!(to_base36(36), "10");
        assert_eq!(to_base36(2147483648), "zik0zk");
    }

    #[test]
    fn test_serializes_as_plain_string() -> Result<(), serde_json::Error> {
        let id = identify("a", "b");
        assert_eq!(serde_json::to_string(&id)?, "\"card-22yv\"");
        let back: CardId = serde_json::from_str("\"card-22yv\"")?;
        assert_eq!(back, id);
        Ok(())
    }
}
