//! Short code generation

use std::iter;

/// 短码字符集
const ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";

/// 默认短码长度
pub const DEFAULT_CODE_LENGTH: usize = 6;

pub trait Shortener: Send + Sync {
    /// Returns a code for `long_url`. Codes are not checked for collisions.
    fn shorten(&self, long_url: &str) -> String;
}

/// Random alphanumeric codes; the input URL does not influence the result.
#[derive(Debug, Clone, Copy)]
pub struct RandomShortener {
    length: usize,
}

impl RandomShortener {
    pub fn new() -> Self {
        Self::with_length(DEFAULT_CODE_LENGTH)
    }

    pub fn with_length(length: usize) -> Self {
        Self {
            length: length.max(1),
        }
    }
}

impl Default for RandomShortener {
    fn default() -> Self {
        Self::new()
    }
}

impl Shortener for RandomShortener {
    fn shorten(&self, _long_url: &str) -> String {
        iter::repeat_with(|| ALPHABET[rand::random_range(0..ALPHABET.len())] as char)
            .take(self.length)
            .collect()
    }
}
