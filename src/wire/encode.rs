/// Low-level helpers for encoding `ra_svn` wire tokens without heap allocations.
///
/// This module is internal and is intentionally not part of the public API.
pub(crate) struct WireEncoder<'a> {
    out: &'a mut Vec<u8>,
}

impl<'a> WireEncoder<'a> {
    pub(crate) fn new(out: &'a mut Vec<u8>) -> Self {
        Self { out }
    }

    pub(crate) fn word(&mut self, word: &str) {
        self.out.extend_from_slice(word.as_bytes());
        self.out.push(b' ');
    }

    pub(crate) fn number(&mut self, n: i64) {
        encode_decimal_i64(n, self.out);
        self.out.push(b' ');
    }

    pub(crate) fn string_bytes(&mut self, bytes: &[u8]) {
        encode_decimal_u64(bytes.len() as u64, self.out);
        self.out.push(b':');
        self.out.extend_from_slice(bytes);
        self.out.push(b' ');
    }

    pub(crate) fn list_start(&mut self) {
        self.out.extend_from_slice(b"( ");
    }

    pub(crate) fn list_end(&mut self) {
        self.out.extend_from_slice(b") ");
    }
}

pub(crate) fn encode_decimal_i64(n: i64, out: &mut Vec<u8>) {
    if n < 0 {
        out.push(b'-');
        encode_decimal_u64(n.unsigned_abs(), out);
    } else {
        encode_decimal_u64(n as u64, out);
    }
}

pub(crate) fn encode_decimal_u64(mut n: u64, out: &mut Vec<u8>) {
    if n == 0 {
        out.push(b'0');
        return;
    }
    let mut buf = [0u8; 20];
    let mut i = buf.len();
    while n > 0 {
        let digit = (n % 10) as u8;
        n /= 10;
        i -= 1;
        buf[i] = b'0' + digit;
    }
    out.extend_from_slice(&buf[i..]);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decimal_encoding_covers_boundaries() {
        for (n, expected) in [
            (0i64, &b"0"[..]),
            (9, b"9"),
            (10, b"10"),
            (i64::MAX, b"9223372036854775807"),
            (-1, b"-1"),
            (i64::MIN, b"-9223372036854775808"),
        ] {
            let mut out = Vec::new();
            encode_decimal_i64(n, &mut out);
            assert_eq!(out, expected, "encoding {n}");
        }
    }
}
