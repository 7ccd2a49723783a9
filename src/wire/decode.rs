use tracing::trace;

use crate::error::GateError;

use super::SvnItem;

const DEFAULT_MAX_MESSAGE_BYTES: usize = 128 * 1024 * 1024;
const DEFAULT_MAX_DEPTH: usize = 64;

/// Per-connection budgets enforced by [`Decoder`].
///
/// The wire grammar itself puts no bound on string lengths or list nesting,
/// so an adversarial peer could otherwise make the decoder buffer without
/// limit (an unterminated string prefix, an endless run of `( `). Exceeding
/// either budget fails the connection with
/// [`GateError::ResourceExceeded`](crate::GateError::ResourceExceeded).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DecoderLimits {
    /// Maximum bytes held for the message currently being decoded, counting
    /// both consumed bytes (the raw capture) and unconsumed buffered bytes.
    pub max_message_bytes: usize,
    /// Maximum list nesting depth.
    pub max_depth: usize,
}

impl Default for DecoderLimits {
    fn default() -> Self {
        Self {
            max_message_bytes: DEFAULT_MAX_MESSAGE_BYTES,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Debug, PartialEq, Eq)]
/// One fully-closed top-level list together with the exact bytes it was
/// decoded from. Whitespace arriving between messages belongs to no message
/// and is not part of any capture.
///
/// A proxy forwarding a permitted command must send `raw` verbatim upstream,
/// never a re-serialization of `structure`, so that classification can never
/// alter the bytes the real server sees.
pub struct Message {
    /// The decoded structure. Always [`SvnItem::List`].
    pub structure: SvnItem,
    /// The wire bytes this message was decoded from.
    pub raw: Vec<u8>,
}

impl Message {
    /// Returns the leading command word, if the message starts with one.
    pub fn command(&self) -> Option<&str> {
        self.structure.as_list()?.first()?.as_word()
    }
}

/// A single wire token matched at the front of the buffer.
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum Token {
    Word(String),
    Number(i64),
    /// A `N:` string length prefix. Carries `N + 1`: the payload plus the
    /// mandatory separator byte that follows it on the wire.
    StringPrefix(usize),
    ListOpen,
    ListClose,
}

/// Tries to match one token at the start of `buf`.
///
/// Returns `Ok(Some((token, consumed)))` on a match, `Ok(None)` when the
/// buffer may still grow into a valid token ("wait for more bytes"), and
/// `Err` when no continuation of `buf` can ever become valid. The caller must
/// strip leading whitespace first; every token here is self-delimited by the
/// single whitespace byte that follows it.
///
/// This is the pure five-way dispatch of the decoder state machine, kept
/// separate from the buffer-owning [`Decoder`] so it can be tested without
/// I/O chunking.
pub(crate) fn match_token(buf: &[u8]) -> Result<Option<(Token, usize)>, GateError> {
    let Some(&first) = buf.first() else {
        return Ok(None);
    };
    match first {
        b'(' => match buf.get(1) {
            None => Ok(None),
            Some(b) if b.is_ascii_whitespace() => Ok(Some((Token::ListOpen, 2))),
            Some(b) => Err(GateError::Syntax(format!(
                "expected whitespace after '(', got 0x{b:02x}"
            ))),
        },
        b')' => match buf.get(1) {
            None => Ok(None),
            Some(b) if b.is_ascii_whitespace() => Ok(Some((Token::ListClose, 2))),
            Some(b) => Err(GateError::Syntax(format!(
                "expected whitespace after ')', got 0x{b:02x}"
            ))),
        },
        b'0'..=b'9' => {
            let mut end = 1;
            while end < buf.len() && buf[end].is_ascii_digit() {
                end += 1;
            }
            let Some(&delim) = buf.get(end) else {
                return Ok(None);
            };
            if delim == b':' {
                let len = parse_decimal_usize(&buf[..end])?;
                let expected = len
                    .checked_add(1)
                    .ok_or_else(|| GateError::Syntax("string length out of range".into()))?;
                Ok(Some((Token::StringPrefix(expected), end + 1)))
            } else if delim.is_ascii_whitespace() {
                let n = parse_decimal_i64(&buf[..end], false)?;
                Ok(Some((Token::Number(n), end + 1)))
            } else {
                Err(GateError::Syntax(format!(
                    "invalid byte 0x{delim:02x} after digits"
                )))
            }
        }
        b'-' => {
            let mut end = 1;
            while end < buf.len() && buf[end].is_ascii_digit() {
                end += 1;
            }
            if end == 1 {
                return match buf.get(1) {
                    None => Ok(None),
                    Some(b) => Err(GateError::Syntax(format!(
                        "expected digit after '-', got 0x{b:02x}"
                    ))),
                };
            }
            let Some(&delim) = buf.get(end) else {
                return Ok(None);
            };
            // A length prefix is unsigned, so `-N:` is never a string.
            if !delim.is_ascii_whitespace() {
                return Err(GateError::Syntax(format!(
                    "invalid byte 0x{delim:02x} after digits"
                )));
            }
            let n = parse_decimal_i64(&buf[1..end], true)?;
            Ok(Some((Token::Number(n), end + 1)))
        }
        b'A'..=b'Z' | b'a'..=b'z' => {
            let mut end = 1;
            while end < buf.len() && (buf[end].is_ascii_alphanumeric() || buf[end] == b'-') {
                end += 1;
            }
            let Some(&delim) = buf.get(end) else {
                return Ok(None);
            };
            if !delim.is_ascii_whitespace() {
                return Err(GateError::Syntax(format!(
                    "invalid byte 0x{delim:02x} in word token"
                )));
            }
            let word = std::str::from_utf8(&buf[..end])
                .map_err(|_| GateError::InternalDecoder("word token is not ASCII".into()))?;
            Ok(Some((Token::Word(word.to_string()), end + 1)))
        }
        b => Err(GateError::Syntax(format!(
            "invalid leading byte 0x{b:02x}"
        ))),
    }
}

/// Accumulates toward the sign so `i64::MIN` parses without overflow.
fn parse_decimal_i64(digits: &[u8], negative: bool) -> Result<i64, GateError> {
    let mut n = 0i64;
    for &b in digits {
        let digit = (b - b'0') as i64;
        n = n
            .checked_mul(10)
            .and_then(|v| {
                if negative {
                    v.checked_sub(digit)
                } else {
                    v.checked_add(digit)
                }
            })
            .ok_or_else(|| GateError::Syntax("number out of range".into()))?;
    }
    Ok(n)
}

fn parse_decimal_usize(digits: &[u8]) -> Result<usize, GateError> {
    let mut n = 0usize;
    for &b in digits {
        n = n
            .checked_mul(10)
            .and_then(|v| v.checked_add((b - b'0') as usize))
            .ok_or_else(|| GateError::Syntax("string length out of range".into()))?;
    }
    Ok(n)
}

#[derive(Debug)]
enum DecodeState {
    /// Dispatching on the next token at the buffer front.
    AwaitItem,
    /// Accumulating the payload of a length-prefixed string. `expected`
    /// counts down and includes the trailing separator byte.
    AwaitBytes { expected: usize, pending: Vec<u8> },
}

/// A stateful incremental `ra_svn` wire decoder.
///
/// One decoder exists per connection. [`Decoder::feed`] appends whatever
/// bytes the socket produced, consumes every token that is complete, and
/// returns the top-level [`Message`]s finished during the call, in order. A
/// token split across reads stays buffered; nothing blocks and no I/O
/// happens here.
///
/// Lists are tracked with an explicit stack of owned item buffers rather
/// than call-stack recursion, since input arrives incrementally and a
/// recursive parse could not be suspended between `feed` calls.
///
/// Methods are not reentrant; drive one decoder from one task.
#[derive(Debug)]
pub struct Decoder {
    buf: Vec<u8>,
    pos: usize,
    stack: Vec<Vec<SvnItem>>,
    current: Vec<SvnItem>,
    state: DecodeState,
    raw: Vec<u8>,
    limits: DecoderLimits,
}

impl Default for Decoder {
    fn default() -> Self {
        Self::new()
    }
}

impl Decoder {
    /// Creates a decoder with [`DecoderLimits::default`].
    pub fn new() -> Self {
        Self::with_limits(DecoderLimits::default())
    }

    /// Creates a decoder with explicit budgets.
    pub fn with_limits(limits: DecoderLimits) -> Self {
        Self {
            buf: Vec::new(),
            pos: 0,
            stack: Vec::new(),
            current: Vec::new(),
            state: DecodeState::AwaitItem,
            raw: Vec::new(),
            limits,
        }
    }

    /// Appends `bytes` and returns every message completed by them.
    ///
    /// Errors are connection-fatal; the decoder must be discarded afterwards.
    pub fn feed(&mut self, bytes: &[u8]) -> Result<Vec<Message>, GateError> {
        self.buf.extend_from_slice(bytes);

        let mut out = Vec::new();
        loop {
            match &mut self.state {
                DecodeState::AwaitBytes { expected, pending } => {
                    let available = self.buf.len() - self.pos;
                    if available == 0 {
                        break;
                    }
                    let take = available.min(*expected);
                    let chunk = &self.buf[self.pos..self.pos + take];
                    pending.extend_from_slice(chunk);
                    self.raw.extend_from_slice(chunk);
                    self.pos += take;
                    *expected -= take;
                    if *expected > 0 {
                        break;
                    }
                    let mut payload = std::mem::take(pending);
                    let separator = payload.pop().ok_or_else(|| {
                        GateError::InternalDecoder("string accumulator empty".into())
                    })?;
                    if !separator.is_ascii_whitespace() {
                        return Err(GateError::Syntax(
                            "expected whitespace after string".into(),
                        ));
                    }
                    self.current.push(SvnItem::String(payload));
                    self.state = DecodeState::AwaitItem;
                }
                DecodeState::AwaitItem => {
                    // Whitespace between messages (stack empty) is discarded
                    // rather than captured, so an idle peer sending bare
                    // newlines never accrues toward the message byte budget.
                    let in_message = !self.stack.is_empty();
                    while self.pos < self.buf.len() && self.buf[self.pos].is_ascii_whitespace() {
                        if in_message {
                            self.raw.push(self.buf[self.pos]);
                        }
                        self.pos += 1;
                    }
                    let Some((token, consumed)) = match_token(&self.buf[self.pos..])? else {
                        break;
                    };
                    self.raw
                        .extend_from_slice(&self.buf[self.pos..self.pos + consumed]);
                    self.pos += consumed;
                    match token {
                        Token::Word(word) => self.current.push(SvnItem::Word(word)),
                        Token::Number(n) => self.current.push(SvnItem::Number(n)),
                        Token::StringPrefix(expected) => {
                            if expected > self.limits.max_message_bytes {
                                return Err(GateError::ResourceExceeded {
                                    resource: "message size",
                                    limit: self.limits.max_message_bytes,
                                });
                            }
                            self.state = DecodeState::AwaitBytes {
                                expected,
                                pending: Vec::new(),
                            };
                        }
                        Token::ListOpen => {
                            if self.stack.len() >= self.limits.max_depth {
                                return Err(GateError::ResourceExceeded {
                                    resource: "list nesting",
                                    limit: self.limits.max_depth,
                                });
                            }
                            self.stack.push(std::mem::take(&mut self.current));
                        }
                        Token::ListClose => {
                            let Some(parent) = self.stack.pop() else {
                                return Err(GateError::Syntax("unbalanced list close".into()));
                            };
                            let closed = std::mem::replace(&mut self.current, parent);
                            if self.stack.is_empty() {
                                let raw = std::mem::take(&mut self.raw);
                                trace!(
                                    bytes = raw.len(),
                                    items = closed.len(),
                                    "decoded top-level message"
                                );
                                out.push(Message {
                                    structure: SvnItem::List(closed),
                                    raw,
                                });
                            } else {
                                self.current.push(SvnItem::List(closed));
                            }
                        }
                    }
                }
            }
        }

        // Budget covers only what the decoder retains across calls: the raw
        // capture of the in-flight message plus any unconsumed partial token.
        let held = self.raw.len() + (self.buf.len() - self.pos);
        if held > self.limits.max_message_bytes {
            return Err(GateError::ResourceExceeded {
                resource: "message size",
                limit: self.limits.max_message_bytes,
            });
        }

        if self.pos > 0 {
            let len = self.buf.len();
            self.buf.copy_within(self.pos..len, 0);
            self.buf.truncate(len - self.pos);
            self.pos = 0;
        }
        Ok(out)
    }
}
