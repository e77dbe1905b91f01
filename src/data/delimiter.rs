use std::fmt;

// ---------------------------------------------------------------------------
// Delimiter detection for delimited text (uploads and pasted data)
// ---------------------------------------------------------------------------

/// Field separator of a delimited text payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delimiter {
    Comma,
    Tab,
    Space,
}

impl Delimiter {
    /// Byte handed to the CSV reader.
    pub fn as_byte(self) -> u8 {
        match self {
            Delimiter::Comma => b',',
            Delimiter::Tab => b'\t',
            Delimiter::Space => b' ',
        }
    }
}

impl fmt::Display for Delimiter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Delimiter::Comma => write!(f, "comma"),
            Delimiter::Tab => write!(f, "tab"),
            Delimiter::Space => write!(f, "space"),
        }
    }
}

/// Guess the delimiter from raw character counts over the whole text.
///
/// Comma wins only when it strictly outnumbers both tabs and spaces, tab wins
/// when it strictly outnumbers spaces, and space is the fallback. Counting
/// ignores quoting and line structure, so free-text columns or thousands
/// separators can tip the result.
pub fn detect_delimiter(text: &str) -> Delimiter {
    let (mut commas, mut tabs, mut spaces) = (0usize, 0usize, 0usize);
    for c in text.chars() {
        match c {
            ',' => commas += 1,
            '\t' => tabs += 1,
            ' ' => spaces += 1,
            _ => {}
        }
    }

    if commas > tabs && commas > spaces {
        Delimiter::Comma
    } else if tabs > spaces {
        Delimiter::Tab
    } else {
        Delimiter::Space
    }
}
