use std::fmt;
use std::iter::FromIterator;
use std::ops;

/// A position in delimited data.
///
/// A position is used to report errors and to tell where a record started.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct Position {
    byte: u64,
    line: u64,
    record: u64,
}

impl Default for Position {
    fn default() -> Position {
        Position::new()
    }
}

impl Position {
    /// Returns a new position initialized to the start value.
    pub fn new() -> Position {
        Position { byte: 0, line: 1, record: 0 }
    }

    /// The byte offset, starting at `0`, of this position.
    pub fn byte(&self) -> u64 {
        self.byte
    }

    /// The line number, starting at `1`, of this position.
    ///
    /// Lines are counted by occurrences of `\n`, including those inside
    /// quoted fields.
    pub fn line(&self) -> u64 {
        self.line
    }

    /// The record index, starting at `0`, of this position.
    pub fn record(&self) -> u64 {
        self.record
    }

    /// Set the byte offset of this position.
    pub fn set_byte(&mut self, byte: u64) -> &mut Position {
        self.byte = byte;
        self
    }

    /// Set the line number of this position.
    pub fn set_line(&mut self, line: u64) -> &mut Position {
        assert!(line > 0);
        self.line = line;
        self
    }

    /// Set the record index of this position.
    pub fn set_record(&mut self, record: u64) -> &mut Position {
        self.record = record;
        self
    }
}

/// A single record: an ordered sequence of string fields.
///
/// All fields are stored contiguously in one `String`, along with the end
/// offset of every field, so a record costs two allocations no matter how
/// many fields it has.
///
/// Two records are equal when their fields are equal. The position a record
/// was read from does not take part in comparisons.
#[derive(Clone, Default)]
pub struct Record {
    /// All fields in this record, stored contiguously.
    fields: String,
    /// The ending offset of each field.
    ends: Vec<usize>,
    /// Where this record started, if it was read from a stream.
    pos: Option<Position>,
}

impl Record {
    /// Create a new empty `Record`.
    pub fn new() -> Record {
        Record::default()
    }

    /// Create a new empty `Record` with room for `buffer` bytes of field
    /// data and `fields` fields.
    pub fn with_capacity(buffer: usize, fields: usize) -> Record {
        Record {
            fields: String::with_capacity(buffer),
            ends: Vec::with_capacity(fields),
            pos: None,
        }
    }

    /// Return the field at index `i`.
    ///
    /// If no field at index `i` exists, then this returns `None`.
    pub fn get(&self, i: usize) -> Option<&str> {
        let end = *self.ends.get(i)?;
        let start = if i == 0 { 0 } else { self.ends[i - 1] };
        Some(&self.fields[start..end])
    }

    /// Returns true if and only if this record has no fields.
    pub fn is_empty(&self) -> bool {
        self.ends.is_empty()
    }

    /// Returns the number of fields in this record.
    pub fn len(&self) -> usize {
        self.ends.len()
    }

    /// Returns the contents of all fields joined without delimiters.
    pub fn as_str(&self) -> &str {
        &self.fields
    }

    /// Add a new field to the end of this record.
    pub fn push_field(&mut self, field: &str) {
        self.fields.push_str(field);
        self.end_field();
    }

    /// Clear this record so that it has zero fields.
    pub fn clear(&mut self) {
        self.fields.clear();
        self.ends.clear();
        self.pos = None;
    }

    /// The position at which this record started, if it was read from a
    /// stream.
    pub fn position(&self) -> Option<&Position> {
        self.pos.as_ref()
    }

    /// Set the position of this record.
    pub fn set_position(&mut self, pos: Option<Position>) {
        self.pos = pos;
    }

    /// Returns an iterator over all fields in this record.
    pub fn iter(&self) -> RecordIter<'_> {
        RecordIter { rec: self, i: 0 }
    }

    /// Copy the fields of this record into a vector of owned strings.
    pub fn to_vec(&self) -> Vec<String> {
        self.iter().map(|f| f.to_string()).collect()
    }

    /// Append a character to the field currently being built.
    pub(crate) fn push_char(&mut self, c: char) {
        self.fields.push(c);
    }

    /// End the field currently being built.
    pub(crate) fn end_field(&mut self) {
        self.ends.push(self.fields.len());
    }
}

impl PartialEq for Record {
    fn eq(&self, other: &Record) -> bool {
        self.fields == other.fields && self.ends == other.ends
    }
}

impl Eq for Record {}

impl<T: AsRef<str>> PartialEq<[T]> for Record {
    fn eq(&self, other: &[T]) -> bool {
        self.len() == other.len()
            && self.iter().zip(other).all(|(a, b)| a == b.as_ref())
    }
}

impl<'a, T: AsRef<str>> PartialEq<&'a [T]> for Record {
    fn eq(&self, other: &&'a [T]) -> bool {
        self == *other
    }
}

impl<T: AsRef<str>> PartialEq<Vec<T>> for Record {
    fn eq(&self, other: &Vec<T>) -> bool {
        self == other.as_slice()
    }
}

impl fmt::Debug for Record {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Record(")?;
        f.debug_list().entries(self.iter()).finish()?;
        write!(f, ")")
    }
}

impl ops::Index<usize> for Record {
    type Output = str;

    fn index(&self, i: usize) -> &str {
        match self.get(i) {
            Some(field) => field,
            None => panic!(
                "index out of bounds: record has {} fields but the index \
                 is {}",
                self.len(),
                i
            ),
        }
    }
}

impl<T: AsRef<str>> From<Vec<T>> for Record {
    fn from(fields: Vec<T>) -> Record {
        Record::from_iter(fields)
    }
}

impl<'a, T: AsRef<str>> From<&'a [T]> for Record {
    fn from(fields: &'a [T]) -> Record {
        Record::from_iter(fields)
    }
}

impl<T: AsRef<str>> FromIterator<T> for Record {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Record {
        let mut record = Record::new();
        record.extend(iter);
        record
    }
}

impl<T: AsRef<str>> Extend<T> for Record {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for field in iter {
            self.push_field(field.as_ref());
        }
    }
}

impl<'a> IntoIterator for &'a Record {
    type IntoIter = RecordIter<'a>;
    type Item = &'a str;

    fn into_iter(self) -> RecordIter<'a> {
        self.iter()
    }
}

/// An iterator over the fields in a record.
#[derive(Clone, Debug)]
pub struct RecordIter<'a> {
    rec: &'a Record,
    i: usize,
}

impl<'a> Iterator for RecordIter<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<&'a str> {
        let field = self.rec.get(self.i)?;
        self.i += 1;
        Some(field)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.rec.len() - self.i;
        (n, Some(n))
    }
}

impl<'a> ExactSizeIterator for RecordIter<'a> {}
