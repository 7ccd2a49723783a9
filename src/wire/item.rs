use std::fmt::{Display, Formatter};

use super::encode::WireEncoder;

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Debug, PartialEq, Eq)]
/// A raw `ra_svn` wire protocol item.
///
/// This is the tagged-value tree produced by [`crate::Decoder`] and consumed
/// by the serializer and the command classifier. The enum is closed and
/// exhaustively matched everywhere, so there is no such thing as an
/// unrecognized item shape at runtime.
pub enum SvnItem {
    /// A protocol word token, e.g. a command name.
    Word(String),
    /// A protocol number token. The wire encodes ASCII digits; decoding is
    /// checked 64-bit arithmetic, never a silent wrap.
    Number(i64),
    /// A protocol string token (raw bytes; may not be valid UTF-8).
    String(Vec<u8>),
    /// A protocol list token. Nesting depth is unbounded in the grammar and
    /// bounded by [`crate::DecoderLimits`] in the decoder.
    List(Vec<SvnItem>),
}

impl SvnItem {
    /// Returns this item as a word, if it is a word.
    pub fn as_word(&self) -> Option<&str> {
        match self {
            SvnItem::Word(s) => Some(s),
            _ => None,
        }
    }

    /// Returns this item as an `i64`, if it is a number.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            SvnItem::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Returns this item as raw bytes, if it is a `string`.
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            SvnItem::String(bytes) => Some(bytes),
            _ => None,
        }
    }

    /// Returns this item's children, if it is a `list`.
    pub fn as_list(&self) -> Option<&[SvnItem]> {
        match self {
            SvnItem::List(items) => Some(items),
            _ => None,
        }
    }
}

impl Display for SvnItem {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            SvnItem::Word(w) => write!(f, "{w}"),
            SvnItem::Number(n) => write!(f, "{n}"),
            SvnItem::String(s) => write!(f, "<{} bytes>", s.len()),
            SvnItem::List(items) => write!(f, "({} items)", items.len()),
        }
    }
}

/// Appends the canonical wire encoding of `item` to `out`.
pub fn encode_item(item: &SvnItem, out: &mut Vec<u8>) {
    let mut enc = WireEncoder::new(out);
    encode_item_with(&mut enc, item);
}

/// Serializes a sequence of items into canonical wire bytes.
///
/// Canonical means the grammar's mandated single-space separators are used
/// regardless of any spacing in the input this tree was decoded from. The
/// encoding is total over [`SvnItem`]: every variant has exactly one wire
/// form.
pub fn serialize(items: &[SvnItem]) -> Vec<u8> {
    let mut out = Vec::new();
    for item in items {
        encode_item(item, &mut out);
    }
    out
}

fn encode_item_with(enc: &mut WireEncoder<'_>, item: &SvnItem) {
    match item {
        SvnItem::Word(w) => enc.word(w),
        SvnItem::Number(n) => enc.number(*n),
        SvnItem::String(s) => enc.string_bytes(s),
        SvnItem::List(items) => {
            enc.list_start();
            for item in items {
                encode_item_with(enc, item);
            }
            enc.list_end();
        }
    }
}
