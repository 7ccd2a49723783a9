mod decode;
mod encode;
mod item;

pub use decode::{Decoder, DecoderLimits, Message};
pub use item::{SvnItem, encode_item, serialize};
