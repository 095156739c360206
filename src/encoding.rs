use std::fmt;

/// The character encoding of a delimited stream.
///
/// Readers decode bytes into characters before tokenizing them, and writers
/// encode each line before it reaches the stream. Input that is invalid in
/// the chosen encoding, and characters the encoding cannot represent, are
/// reported as errors rather than replaced.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Encoding {
    /// UTF-8. This is the default.
    Utf8,
    /// 7-bit ASCII. Bytes and characters above `0x7F` are rejected.
    Ascii,
    /// ISO-8859-1, where every byte is the code point of the same value.
    Latin1,
}

impl Default for Encoding {
    fn default() -> Encoding {
        Encoding::Utf8
    }
}

impl fmt::Display for Encoding {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Encoding::Utf8 => write!(f, "UTF-8"),
            Encoding::Ascii => write!(f, "ASCII"),
            Encoding::Latin1 => write!(f, "ISO-8859-1"),
        }
    }
}

/// The result of decoding the first character of a byte slice.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum Decoded {
    /// A character, and the number of bytes it occupied.
    Char(char, usize),
    /// The slice ends in the middle of a character.
    Incomplete,
    /// The slice does not start with a valid character. The invalid sequence
    /// is `len` bytes long.
    Invalid { byte: u8, len: usize },
}

impl Encoding {
    /// Decode the character at the start of `bytes`, which must not be
    /// empty.
    pub(crate) fn decode(self, bytes: &[u8]) -> Decoded {
        debug_assert!(!bytes.is_empty());
        let b = bytes[0];
        match self {
            Encoding::Ascii if b <= 0x7F => Decoded::Char(b as char, 1),
            Encoding::Ascii => Decoded::Invalid { byte: b, len: 1 },
            Encoding::Latin1 => Decoded::Char(b as char, 1),
            Encoding::Utf8 => match bstr::decode_utf8(bytes) {
                (Some(ch), len) => Decoded::Char(ch, len),
                // A valid prefix running to the end of the slice can still
                // be completed by the bytes that follow.
                (None, len) if len == bytes.len() && len < utf8_len(b) => {
                    Decoded::Incomplete
                }
                (None, len) => Decoded::Invalid { byte: b, len: len.max(1) },
            },
        }
    }

    /// Append the encoded form of `s` to `out`.
    ///
    /// On failure, returns the first character that cannot be encoded and
    /// leaves `out` unchanged.
    pub(crate) fn encode(self, s: &str, out: &mut Vec<u8>) -> Result<(), char> {
        match self {
            Encoding::Utf8 => out.extend_from_slice(s.as_bytes()),
            Encoding::Ascii => {
                if let Some(ch) = s.chars().find(|c| !c.is_ascii()) {
                    return Err(ch);
                }
                out.extend_from_slice(s.as_bytes());
            }
            Encoding::Latin1 => {
                if let Some(ch) = s.chars().find(|&c| c as u32 > 0xFF) {
                    return Err(ch);
                }
                out.extend(s.chars().map(|c| c as u8));
            }
        }
        Ok(())
    }
}

/// The length of the UTF-8 sequence announced by a leading byte, or `1` if
/// the byte cannot start a sequence.
fn utf8_len(b: u8) -> usize {
    if b <= 0x7F {
        1
    } else if b & 0b1110_0000 == 0b1100_0000 {
        2
    } else if b & 0b1111_0000 == 0b1110_0000 {
        3
    } else if b & 0b1111_1000 == 0b1111_0000 {
        4
    } else {
        1
    }
}
