//! Base-62 short codes for recipe ids.

const ALPHABET: &[u8; 62] = b"0123456789abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ShortCodeError {
    #[error("empty short code")]
    Empty,
    #[error("invalid character {0:?} in short code")]
    InvalidChar(char),
    #[error("short code out of range")]
    Overflow,
}

/// Encode a non-negative id as base-62.
pub fn encode(mut id: u64) -> String {
    if id == 0 {
        return "0".to_owned();
    }
    let mut buf = Vec::new();
    while id > 0 {
        buf.push(ALPHABET[(id % 62) as usize]);
        id /= 62;
    }
    buf.reverse();
    // ALPHABET is ASCII.
    buf.into_iter().map(char::from).collect()
}

pub fn decode(code: &str) -> Result<u64, ShortCodeError> {
    if code.is_empty() {
        return Err(ShortCodeError::Empty);
    }
    code.chars().try_fold(0u64, |acc, c| {
        let digit = match c {
            '0'..='9' => c as u64 - '0' as u64,
            'a'..='z' => c as u64 - 'a' as u64 + 10,
            'A'..='Z' => c as u64 - 'A' as u64 + 36,
            _ => return Err(ShortCodeError::InvalidChar(c)),
        };
        acc.checked_mul(62)
            .and_then(|v| v.checked_add(digit))
            .ok_or(ShortCodeError::Overflow)
    })
}
