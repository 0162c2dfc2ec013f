use serde::Serialize;
use std::fmt;
use std::str::FromStr;

use crate::error::ScanError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum IsbnKind {
    #[serde(rename = "ISBN-10")]
    Isbn10,
    #[serde(rename = "ISBN-13")]
    Isbn13,
}

impl IsbnKind {
    pub fn from_len(len: usize) -> Option<IsbnKind> {
        match len {
            10 => Some(IsbnKind::Isbn10),
            13 => Some(IsbnKind::Isbn13),
            _ => None,
        }
    }
}

impl fmt::Display for IsbnKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IsbnKind::Isbn10 => write!(f, "ISBN-10"),
            IsbnKind::Isbn13 => write!(f, "ISBN-13"),
        }
    }
}

/// A checksum-validated ISBN in compact form.
///
/// Only constructed through [`Identifier::validate`] (or `FromStr`), so a
/// value of this type always carries a correct check character. Equality
/// ignores `raw_span`: two matches of the same number in different layouts
/// are the same identifier.
#[derive(Debug, Clone, Serialize)]
pub struct Identifier {
    digits: String,
    kind: IsbnKind,
    /// Text the identifier was matched from, kept for diagnostics only.
    #[serde(skip)]
    raw_span: String,
}

impl Identifier {
    /// Normalize `raw` and validate it as an ISBN-10 or ISBN-13.
    ///
    /// Registrant prefixes are not checked here; that is a scanner policy.
    pub fn validate(raw: &str) -> Option<Identifier> {
        let digits = normalize(raw);
        let kind = IsbnKind::from_len(digits.len())?;

        if is_repeated_digit(&digits) {
            return None;
        }

        let valid = match kind {
            IsbnKind::Isbn10 => is_valid_isbn10(&digits),
            IsbnKind::Isbn13 => is_valid_isbn13(&digits),
        };
        if !valid {
            return None;
        }

        Some(Identifier {
            digits,
            kind,
            raw_span: raw.to_string(),
        })
    }

    pub(crate) fn with_raw_span(mut self, span: &str) -> Self {
        self.raw_span = span.to_string();
        self
    }

    pub fn digits(&self) -> &str {
        &self.digits
    }

    pub fn kind(&self) -> IsbnKind {
        self.kind
    }

    pub fn raw_span(&self) -> &str {
        &self.raw_span
    }

    /// The three-digit EAN prefix of an ISBN-13 (`978`, `979`, ...).
    pub fn prefix(&self) -> Option<&str> {
        match self.kind {
            IsbnKind::Isbn13 => Some(&self.digits[..3]),
            IsbnKind::Isbn10 => None,
        }
    }
}

impl PartialEq for Identifier {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind && self.digits == other.digits
    }
}

impl Eq for Identifier {}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.digits)
    }
}

impl FromStr for Identifier {
    type Err = ScanError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Identifier::validate(s).ok_or_else(|| ScanError::InvalidIsbn(s.trim().to_string()))
    }
}

/// Drop everything but digits and `X`, upper-casing the latter.
pub fn normalize(raw: &str) -> String {
    raw.chars()
        .filter_map(|c| match c {
            '0'..='9' => Some(c),
            'x' | 'X' => Some('X'),
            _ => None,
        })
        .collect()
}

/// ISBN-10: `sum((10 - i) * d_i) % 11 == 0`, with a trailing `X` worth 10.
pub fn is_valid_isbn10(digits: &str) -> bool {
    let bytes = digits.as_bytes();
    if bytes.len() != 10 {
        return false;
    }

    let mut sum = 0u32;
    for (i, &b) in bytes.iter().enumerate() {
        let value = match b {
            b'0'..=b'9' => u32::from(b - b'0'),
            b'X' if i == 9 => 10,
            _ => return false,
        };
        sum += value * (10 - i as u32);
    }

    sum % 11 == 0
}

/// ISBN-13: weights 1,3,1,3,... over the first twelve digits; the
/// thirteenth must equal `(10 - sum % 10) % 10`.
pub fn is_valid_isbn13(digits: &str) -> bool {
    let bytes = digits.as_bytes();
    if bytes.len() != 13 || !bytes.iter().all(u8::is_ascii_digit) {
        return false;
    }

    let sum: u32 = bytes[..12]
        .iter()
        .enumerate()
        .map(|(i, &b)| {
            let value = u32::from(b - b'0');
            if i % 2 == 0 {
                value
            } else {
                value * 3
            }
        })
        .sum();

    let check = (10 - sum % 10) % 10;
    u32::from(bytes[12] - b'0') == check
}

// Filler such as 0000000000 happens to pass both checksums.
fn is_repeated_digit(digits: &str) -> bool {
    let mut chars = digits.chars();
    match chars.next() {
        Some(first) => chars.all(|c| c == first),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_strips_separators() {
        assert_eq!(normalize("978-0-13-468599-1"), "9780134685991");
        assert_eq!(normalize("0-8044-2957-x"), "080442957X");
        assert_eq!(normalize("ISBN 0 306 40615 2"), "0306406152");
    }

    #[test]
    fn test_isbn10_checksum() {
        assert!(is_valid_isbn10("0306406152"));
        assert!(is_valid_isbn10("080442957X"));
        assert!(is_valid_isbn10("0198526636"));
        assert!(!is_valid_isbn10("0306406153"));
        assert!(!is_valid_isbn10("03064061X2"));
        assert!(!is_valid_isbn10("030640615"));
    }

    #[test]
    fn test_isbn13_checksum() {
        assert!(is_valid_isbn13("9780134685991"));
        assert!(is_valid_isbn13("9780321125217"));
        assert!(!is_valid_isbn13("9780134685992"));
        assert!(!is_valid_isbn13("978013468599X"));
    }

    #[test]
    fn test_single_digit_corruption_rejected() {
        for valid in ["0306406152", "9780134685991"] {
            for pos in 0..valid.len() {
                let original = valid.as_bytes()[pos];
                for replacement in b'0'..=b'9' {
                    if replacement == original {
                        continue;
                    }
                    let mut corrupted = valid.as_bytes().to_vec();
                    corrupted[pos] = replacement;
                    let corrupted = String::from_utf8(corrupted).unwrap();
                    assert!(
                        Identifier::validate(&corrupted).is_none(),
                        "{corrupted} should be rejected"
                    );
                }
            }
        }
    }

    #[test]
    fn test_validate_sets_kind_and_keeps_raw_span() {
        let id = Identifier::validate("0-8044-2957-x").unwrap();
        assert_eq!(id.kind(), IsbnKind::Isbn10);
        assert_eq!(id.digits(), "080442957X");
        assert_eq!(id.raw_span(), "0-8044-2957-x");
        assert_eq!(id.prefix(), None);

        let id = Identifier::validate("978-0-13-468599-1").unwrap();
        assert_eq!(id.kind(), IsbnKind::Isbn13);
        assert_eq!(id.prefix(), Some("978"));
    }

    #[test]
    fn test_repeated_digits_rejected() {
        assert!(Identifier::validate("0000000000").is_none());
        assert!(Identifier::validate("0000000000000").is_none());
    }

    #[test]
    fn test_equality_ignores_layout() {
        let a = Identifier::validate("978-0-13-468599-1").unwrap();
        let b = Identifier::validate("9780134685991").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_from_str() {
        let id: Identifier = "0-306-40615-2".parse().unwrap();
        assert_eq!(id.to_string(), "0306406152");
        assert!("12345".parse::<Identifier>().is_err());
    }

    #[test]
    fn test_serialize_skips_raw_span() {
        let id = Identifier::validate("ISBN 978-0-13-468599-1").unwrap();
        let json = serde_json::to_value(&id).unwrap();
        assert_eq!(json["digits"], "9780134685991");
        assert_eq!(json["kind"], "ISBN-13");
        assert!(json.get("raw_span").is_none());
    }
}
