//! Formatters which can read and write object files to disk.
//!
//! The [`ObjFileFormat`] trait describes an implementation of reading/writing object files to disk.
//! This module provides two implementations of the trait:
//! - [`TextFormat`]: The `.hack` text format, one instruction per line written as 16 binary digits
//! - [`BinaryFormat`]: A raw binary representation, two big-endian bytes per instruction
//!
//! Neither format carries debug symbols, so deserialized object files never have a symbol table.

use std::fmt::Write;

use super::ObjectFile;

/// A trait defining object file formats.
pub trait ObjFileFormat {
    /// Representation of the serialized format.
    ///
    /// For binary formats, `[u8]` should be used.
    /// For text-based formats,`str` should be used.
    type Stream: ToOwned + ?Sized;
    /// Serializes into the stream format.
    fn serialize(o: &ObjectFile) -> <Self::Stream as ToOwned>::Owned;
    /// Deserializes from the stream format, returning `None`
    /// if an error occurred during deserialization.
    fn deserialize(i: &Self::Stream) -> Option<ObjectFile>;
}

/// A binary format of object file data.
///
/// Each word is written as 2 bytes, most significant byte first.
/// There is no header.
pub struct BinaryFormat;

impl ObjFileFormat for BinaryFormat {
    type Stream = [u8];

    fn serialize(o: &ObjectFile) -> <Self::Stream as ToOwned>::Owned {
        o.words().iter()
            .flat_map(|&w| u16::to_be_bytes(w))
            .collect()
    }

    fn deserialize(bytes: &Self::Stream) -> Option<ObjectFile> {
        if bytes.len() % 2 != 0 { return None; }

        let words = bytes.chunks_exact(2)
            .map(|c| u16::from_be_bytes([c[0], c[1]]))
            .collect();

        Some(ObjectFile::from_words(words))
    }
}

/// The `.hack` text format of object file data.
///
/// Each word is written on its own line as exactly 16 `0`/`1` characters,
/// most significant bit first. Every line (including the last) ends with a newline.
///
/// # Example
/// ```
/// use hack_ensemble::parse::parse_ast;
/// use hack_ensemble::asm::assemble;
/// use hack_ensemble::asm::encoding::{ObjFileFormat, TextFormat};
///
/// let obj = assemble(parse_ast("@2\nD=D+1\n0;JMP").unwrap()).unwrap();
/// assert_eq!(TextFormat::serialize(&obj), "\
///     0000000000000010\n\
///     1110011111010000\n\
///     1110101010000111\n\
/// ");
/// ```
pub struct TextFormat;

const WORD_BITS: usize = 16;

impl ObjFileFormat for TextFormat {
    type Stream = str;

    fn serialize(o: &ObjectFile) -> <Self::Stream as ToOwned>::Owned {
        fn _ser(o: &ObjectFile) -> Result<String, std::fmt::Error> {
            let mut buf = String::with_capacity(o.len() * (WORD_BITS + 1));
            for w in o.words() {
                writeln!(buf, "{w:016b}")?;
            }
            Ok(buf)
        }

        _ser(o).unwrap_or_default()
    }

    fn deserialize(string: &Self::Stream) -> Option<ObjectFile> {
        let words = string.lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(|line| match line.len() == WORD_BITS && line.bytes().all(|b| matches!(b, b'0' | b'1')) {
                true  => u16::from_str_radix(line, 2).ok(),
                false => None,
            })
            .collect::<Option<_>>()?;

        Some(ObjectFile::from_words(words))
    }
}

#[cfg(test)]
mod tests {
    use crate::asm::{assemble, assemble_debug, ObjectFile};
    use crate::parse::parse_ast;

    use super::{BinaryFormat, ObjFileFormat, TextFormat};

    const SRC: &str = "
        @R0
        D=M
        @END
        D;JLE
        @counter
        M=D
        (END)
        @END
        0;JMP
    ";

    #[test]
    fn test_text_format() {
        let obj = assemble(parse_ast(SRC).unwrap()).unwrap();
        let text = TextFormat::serialize(&obj);

        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines.len(), obj.len());
        assert!(lines.iter().all(|l| l.len() == 16 && l.chars().all(|c| c == '0' || c == '1')));
        assert!(text.ends_with('\n'));
        assert_eq!(lines[4], "0000000000010000");

        assert_eq!(TextFormat::deserialize(&text), Some(obj));
    }

    #[test]
    fn test_text_format_empty() {
        let obj = assemble(parse_ast("// nothing here\n").unwrap()).unwrap();
        assert_eq!(TextFormat::serialize(&obj), "");
        assert_eq!(TextFormat::deserialize(""), Some(ObjectFile::empty()));
    }

    #[test]
    fn test_text_format_invalid() {
        // blank lines are skipped
        let obj = TextFormat::deserialize("\n0000000000000001\n\n1111111111111111\n");
        assert_eq!(obj.as_ref().map(ObjectFile::words), Some(&[1, 0xFFFF][..]));

        assert_eq!(TextFormat::deserialize("000000000000001\n"), None);
        assert_eq!(TextFormat::deserialize("00000000000000010\n"), None);
        assert_eq!(TextFormat::deserialize("000000000000000x\n"), None);
        assert_eq!(TextFormat::deserialize("+000000000000001\n"), None);
    }

    #[test]
    fn test_binary_format() {
        let obj = assemble(parse_ast(SRC).unwrap()).unwrap();
        let bytes = BinaryFormat::serialize(&obj);

        assert_eq!(bytes.len(), 2 * obj.len());
        // @counter
        assert_eq!(bytes[8..10], [0x00, 0x10]);
        // D;JLE
        assert_eq!(bytes[6..8], [0b1110_0011, 0b0000_0110]);

        assert_eq!(BinaryFormat::deserialize(&bytes), Some(obj));
        assert_eq!(BinaryFormat::deserialize(&bytes[1..]), None);
    }

    #[test]
    fn test_formats_drop_debug_symbols() {
        let obj = assemble_debug(parse_ast(SRC).unwrap(), SRC).unwrap();
        assert!(obj.symbol_table().is_some());

        let de = TextFormat::deserialize(&TextFormat::serialize(&obj)).unwrap();
        assert!(de.symbol_table().is_none());
        assert_eq!(de.words(), obj.words());

        let de = BinaryFormat::deserialize(&BinaryFormat::serialize(&obj)).unwrap();
        assert!(de.symbol_table().is_none());
    }
}
