//! Content hashing for generated class names
//!
//! FNV-1a over the canonical serialization, rendered as a short base-36
//! identifier suitable for use inside a CSS class name.

/// Hash helper for stylesheet identifiers
#[derive(Debug, Clone)]
pub struct NameHasher {
    state: u64,
}

impl Default for NameHasher {
    fn default() -> Self {
        Self::new()
    }
}

impl NameHasher {
    /// Create new hasher
    pub fn new() -> Self {
        Self { state: 0xcbf29ce484222325 } // FNV offset basis
    }

    /// Add bytes to hash
    pub fn write(&mut self, bytes: &[u8]) {
        for byte in bytes {
            self.state ^= *byte as u64;
            self.state = self.state.wrapping_mul(0x100000001b3); // FNV prime
        }
    }

    /// Add a string followed by a terminator so that `("ab", "c")` and
    /// `("a", "bc")` hash differently
    pub fn write_str(&mut self, s: &str) {
        self.write(s.as_bytes());
        self.write(&[0xff]);
    }

    /// Add u64 to hash
    pub fn write_u64(&mut self, value: u64) {
        self.write(&value.to_le_bytes());
    }

    /// Finish and get hash
    pub fn finish(&self) -> u64 {
        self.state
    }

    /// Finish and render the hash as a short identifier
    pub fn finish_short(&self) -> String {
        let folded = (self.state ^ (self.state >> 32)) as u32;
        to_base36(folded as u64)
    }
}

fn to_base36(mut value: u64) -> String {
    const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

    if value == 0 {
        return "0".to_string();
    }

    let mut buf = Vec::with_capacity(13);
    while value > 0 {
        buf.push(DIGITS[(value % 36) as usize]);
        value /= 36;
    }
    buf.reverse();
    // Only ASCII digits were pushed
    String::from_utf8(buf).unwrap_or_default()
}
