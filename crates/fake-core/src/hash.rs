use xxhash_rust::xxh64::xxh64;

const BASE62_CHARS: &[u8] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz";

/// Encode a u64 value as a base62 string (11 chars, zero-padded).
fn base62_encode(mut value: u64) -> String {
    let mut result = Vec::with_capacity(11);
    while value > 0 {
        let idx = (value % 62) as usize;
        result.push(BASE62_CHARS[idx] as char);
        value /= 62;
    }
    while result.len() < 11 {
        result.push('0');
    }
    result.iter().rev().collect()
}

/// Content digest of a byte buffer: base62(xxhash64(bytes)).
pub fn content_hash(bytes: &[u8]) -> String {
    base62_encode(xxh64(bytes, 0))
}

/// Digest of an ordered list of parts.
///
/// Parts are NUL-separated so that `["ab", "c"]` and `["a", "bc"]` differ.
pub fn digest_parts<I, S>(parts: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut input = String::new();
    for part in parts {
        input.push_str(part.as_ref());
        input.push('\0');
    }
    content_hash(input.as_bytes())
}
