//! Splitting script content into statement blocks.
//!
//! Content is cut at every `;` byte, with no knowledge of SQL syntax. A `;` inside a string
//! literal, a comment, or a procedural body (e.g. `CREATE FUNCTION ... $$ ... $$`) therefore
//! splits that statement in two, and the database will reject the halves. Scripts relying on
//! such constructs are not supported.

use std::fmt;
use std::str::Utf8Error;

pub const STATEMENT_TERMINATOR: u8 = b';';

/// A contiguous slice of a script submitted to the database as one command.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct StatementBlock<'a> {
    ordinal: usize,
    text: &'a [u8],
}

impl<'a> StatementBlock<'a> {
    /// Returns the 1-based position of this block within its script.
    #[inline]
    pub fn ordinal(&self) -> usize {
        self.ordinal
    }

    #[inline]
    pub fn as_bytes(&self) -> &'a [u8] {
        self.text
    }

    #[inline]
    pub fn to_str(&self) -> Result<&'a str, Utf8Error> {
        std::str::from_utf8(self.text)
    }

    /// Returns the block text for diagnostics, replacing invalid UTF-8 sequences.
    pub fn to_string_lossy(&self) -> String {
        String::from_utf8_lossy(self.text).into_owned()
    }
}

impl fmt::Debug for StatementBlock<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StatementBlock")
            .field("ordinal", &self.ordinal)
            .field("text", &String::from_utf8_lossy(self.text))
            .finish()
    }
}

/// Splits `content` into statement blocks, in file order.
///
/// Every partition is kept verbatim, including empty and whitespace-only ones and the partition
/// after the last `;`. Content without any `;` yields a single block holding all of it.
pub fn split_blocks(content: &[u8]) -> impl Iterator<Item = StatementBlock<'_>> {
    content
        .split(|b| *b == STATEMENT_TERMINATOR)
        .enumerate()
        .map(|(index, text)| StatementBlock {
            ordinal: index + 1,
            text,
        })
}
