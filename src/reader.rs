use std::io::{self, BufRead};

use delimited_core::{Action, DelimitedOptions, State, Tokenizer};
use log::{debug, trace, warn};

use crate::encoding::{Decoded, Encoding};
use crate::error::{Error, Result};
use crate::record::{Position, Record};
use crate::stream::{ensure_readable, Stream};

/// Builds a delimited reader with various configuration knobs.
///
/// This builder can be used to tweak the field delimiter, quoting rules,
/// encoding and buffer size. Once a `CsvReader` is built, its options can
/// still be replaced with `CsvReader::set_options`.
#[derive(Debug)]
pub struct ReaderBuilder {
    opts: DelimitedOptions,
    encoding: Encoding,
    capacity: usize,
}

impl Default for ReaderBuilder {
    fn default() -> ReaderBuilder {
        ReaderBuilder {
            opts: DelimitedOptions::default(),
            encoding: Encoding::default(),
            capacity: 8 * (1 << 10),
        }
    }
}

impl ReaderBuilder {
    /// Create a new builder for configuring delimited parsing.
    ///
    /// To convert a builder into a reader, call `from_stream`.
    ///
    /// # Example
    ///
    /// ```
    /// use std::error::Error;
    /// use delimited::{DelimitedOptions, ReaderBuilder};
    ///
    /// # fn main() { example().unwrap(); }
    /// fn example() -> Result<(), Box<dyn Error>> {
    ///     let data = "city;country\nBoston;United States\n";
    ///     let mut rdr = ReaderBuilder::new()
    ///         .options(DelimitedOptions::new(';')?)
    ///         .from_stream(data.as_bytes())?;
    ///
    ///     let rec = rdr.read_record()?.unwrap();
    ///     assert_eq!(rec, vec!["city", "country"]);
    ///     let rec = rdr.read_record()?.unwrap();
    ///     assert_eq!(rec, vec!["Boston", "United States"]);
    ///     assert!(rdr.read_record()?.is_none());
    ///     Ok(())
    /// }
    /// ```
    pub fn new() -> ReaderBuilder {
        ReaderBuilder::default()
    }

    /// Build a reader from this configuration that reads from `stream`.
    ///
    /// This fails with `Error::StreamCapability` if the stream cannot be
    /// read. Nothing is read from the stream here.
    pub fn from_stream<R: io::Read + Stream>(
        &self,
        stream: R,
    ) -> Result<CsvReader<R>> {
        CsvReader::build(self, stream)
    }

    /// Set the delimiter, quoting and escaping rules.
    pub fn options(&mut self, opts: DelimitedOptions) -> &mut ReaderBuilder {
        self.opts = opts;
        self
    }

    /// Set the encoding used to decode the stream.
    ///
    /// The default is UTF-8.
    pub fn encoding(&mut self, encoding: Encoding) -> &mut ReaderBuilder {
        self.encoding = encoding;
        self
    }

    /// Set the capacity (in bytes) of the buffer used in the reader.
    pub fn buffer_capacity(&mut self, capacity: usize) -> &mut ReaderBuilder {
        self.capacity = capacity;
        self
    }
}

/// A delimited reader.
///
/// The reader decodes characters from its stream and tokenizes them into
/// records, one record per call to `read_record`. Quoted fields may contain
/// the delimiter and line terminators. Records may be terminated by `\r`,
/// `\n` or `\r\n`.
///
/// The reader owns its stream. The stream is closed exactly once: by
/// `close`, or when the reader is dropped.
///
/// # Example
///
/// ```
/// use delimited::CsvReader;
///
/// # fn main() { example().unwrap(); }
/// fn example() -> delimited::Result<()> {
///     let data = "\"a\r\nb\",c\r\nd,,e\r\n";
///     let mut rdr = CsvReader::new(data.as_bytes())?;
///     let records = rdr.read_all().collect::<delimited::Result<Vec<_>>>()?;
///     assert_eq!(records[0], vec!["a\r\nb", "c"]);
///     assert_eq!(records[1], vec!["d", "", "e"]);
///     Ok(())
/// }
/// ```
#[derive(Debug)]
pub struct CsvReader<R: Stream> {
    /// `None` once the reader has been closed.
    rdr: Option<io::BufReader<R>>,
    tok: Tokenizer,
    encoding: Encoding,
    /// Bytes of a character split across two buffer fills.
    pending: [u8; 4],
    pending_len: usize,
    /// Bytes consumed from the stream.
    byte: u64,
    /// Records started so far.
    record: u64,
    done: bool,
}

impl<R: io::Read + Stream> CsvReader<R> {
    /// Create a reader for UTF-8 data with default options.
    ///
    /// This fails with `Error::StreamCapability` if the stream cannot be
    /// read. Nothing is read from the stream here.
    pub fn new(stream: R) -> Result<CsvReader<R>> {
        ReaderBuilder::new().from_stream(stream)
    }

    /// Create a reader using the given encoding and default options.
    pub fn with_encoding(stream: R, encoding: Encoding) -> Result<CsvReader<R>> {
        ReaderBuilder::new().encoding(encoding).from_stream(stream)
    }

    fn build(builder: &ReaderBuilder, stream: R) -> Result<CsvReader<R>> {
        ensure_readable(&stream)?;
        debug!(
            "opening reader (delimiter {:?}, quote {:?}, {})",
            builder.opts.delimiter(),
            builder.opts.quote(),
            builder.encoding
        );
        Ok(CsvReader {
            rdr: Some(io::BufReader::with_capacity(
                builder.capacity.max(1),
                stream,
            )),
            tok: Tokenizer::new(builder.opts),
            encoding: builder.encoding,
            pending: [0; 4],
            pending_len: 0,
            byte: 0,
            record: 0,
            done: false,
        })
    }

    /// Read the next record.
    ///
    /// Returns `None` once the input is exhausted. An empty line is a record
    /// with a single empty field.
    ///
    /// # Errors
    ///
    /// Malformed quoting is reported as `Error::Malformed`, carrying the
    /// fields read so far (including the partial field). Reading may
    /// continue after such an error: the next record starts just after the
    /// character that caused it.
    ///
    /// Input that is invalid for the encoding is reported as `Error::Decode`.
    /// The rest of the offending record is discarded first, so after such an
    /// error the reader is positioned at the start of the next record.
    pub fn read_record(&mut self) -> Result<Option<Record>> {
        if self.rdr.is_none() {
            return Err(Error::Closed);
        }
        if self.done {
            return Ok(None);
        }
        let mut record = Record::new();
        let mut start = self.position();
        loop {
            let at_record_end = self.tok.state() == State::RecordEnd;
            let offset = self.byte;
            let c = match self.next_char() {
                Ok(c) => c,
                Err(err) => {
                    if let Error::Decode { .. } = err {
                        self.skip_record()?;
                    }
                    return Err(err);
                }
            };
            match self.tok.feed(c) {
                Ok(Action::Consumed) if at_record_end => {
                    // The `\n` of a `\r\n` pair that ended the last record.
                    start = self.position();
                }
                Ok(Action::Consumed) => {}
                Ok(Action::Append(c)) => record.push_char(c),
                Ok(Action::EndField) => record.end_field(),
                Ok(Action::EndRecord) => {
                    record.end_field();
                    record.set_position(Some(start));
                    self.record += 1;
                    trace!("read record {}: {:?}", self.record - 1, record);
                    return Ok(Some(record));
                }
                Ok(Action::End) => {
                    self.done = true;
                    return Ok(None);
                }
                Err(kind) => {
                    // Errors only occur inside a quoted field.
                    record.end_field();
                    let mut pos = start.clone();
                    pos.set_byte(offset).set_line(self.tok.line());
                    record.set_position(Some(start));
                    self.record += 1;
                    return Err(Error::Malformed { kind, pos, partial: record });
                }
            }
        }
    }

    /// Discard input up to and including the terminator of the current
    /// record. Further decoding errors in that input are ignored.
    fn skip_record(&mut self) -> Result<()> {
        loop {
            let c = match self.next_char() {
                Ok(c) => c,
                Err(Error::Decode { .. }) => continue,
                Err(err) => return Err(err),
            };
            let action = self.tok.feed(c);
            if c.is_none() {
                self.done = true;
                break;
            }
            if let Ok(Action::EndRecord) = action {
                break;
            }
        }
        self.record += 1;
        Ok(())
    }

    /// Returns a borrowed iterator over all remaining records.
    ///
    /// The iterator ends at the end of the input, or after yielding the
    /// first error.
    pub fn read_all(&mut self) -> Records<'_, R> {
        Records { rdr: self, failed: false }
    }

    /// Returns an owned iterator over all remaining records.
    pub fn into_records(self) -> IntoRecords<R> {
        IntoRecords { rdr: self, failed: false }
    }

    /// Returns the next character of the input, or `None` at its end.
    fn next_char(&mut self) -> Result<Option<char>> {
        let encoding = self.encoding;
        let rdr = match self.rdr {
            Some(ref mut rdr) => rdr,
            None => return Err(Error::Closed),
        };
        loop {
            let buf = rdr.fill_buf()?;
            if self.pending_len > 0 {
                let n = self.pending_len;
                let start = self.byte - n as u64;
                if buf.is_empty() {
                    self.pending_len = 0;
                    let byte = self.pending[0];
                    return Err(decode_error(encoding, byte, start, &self.tok));
                }
                self.pending[n] = buf[0];
                match encoding.decode(&self.pending[..n + 1]) {
                    Decoded::Char(c, _) => {
                        rdr.consume(1);
                        self.byte += 1;
                        self.pending_len = 0;
                        return Ok(Some(c));
                    }
                    Decoded::Incomplete => {
                        rdr.consume(1);
                        self.byte += 1;
                        self.pending_len = n + 1;
                        continue;
                    }
                    Decoded::Invalid { byte, .. } => {
                        // The byte that broke the sequence is left to start
                        // the next character.
                        self.pending_len = 0;
                        return Err(decode_error(encoding, byte, start, &self.tok));
                    }
                }
            }
            if buf.is_empty() {
                return Ok(None);
            }
            match encoding.decode(buf) {
                Decoded::Char(c, len) => {
                    rdr.consume(len);
                    self.byte += len as u64;
                    return Ok(Some(c));
                }
                Decoded::Incomplete => {
                    let len = buf.len();
                    self.pending[..len].copy_from_slice(buf);
                    self.pending_len = len;
                    rdr.consume(len);
                    self.byte += len as u64;
                }
                Decoded::Invalid { byte, len } => {
                    let start = self.byte;
                    rdr.consume(len);
                    self.byte += len as u64;
                    return Err(decode_error(encoding, byte, start, &self.tok));
                }
            }
        }
    }
}

impl<R: Stream> CsvReader<R> {
    /// The options currently used to tokenize records.
    pub fn options(&self) -> &DelimitedOptions {
        self.tok.options()
    }

    /// Replace the options. They apply from the next character read.
    pub fn set_options(&mut self, opts: DelimitedOptions) {
        self.tok.set_options(opts);
    }

    /// The encoding used to decode the stream.
    pub fn encoding(&self) -> Encoding {
        self.encoding
    }

    /// The position of the next record.
    pub fn position(&self) -> Position {
        let mut pos = Position::new();
        pos.set_byte(self.byte).set_line(self.tok.line()).set_record(self.record);
        pos
    }

    /// Returns true if the reader has reached the end of the input.
    pub fn is_done(&self) -> bool {
        self.done
    }

    /// Returns true if the stream has been closed.
    pub fn is_closed(&self) -> bool {
        self.rdr.is_none()
    }

    /// Close the underlying stream.
    ///
    /// The stream is closed the first time this is called. Later calls do
    /// nothing and return `Ok(())`. Reading after closing fails with
    /// `Error::Closed`.
    pub fn close(&mut self) -> Result<()> {
        let rdr = match self.rdr.take() {
            Some(rdr) => rdr,
            None => return Ok(()),
        };
        debug!("closing reader after {} records", self.record);
        rdr.into_inner().close()?;
        Ok(())
    }
}

impl<R: Stream> Drop for CsvReader<R> {
    fn drop(&mut self) {
        if let Err(err) = self.close() {
            warn!("failed to close reader stream: {}", err);
        }
    }
}

fn decode_error(
    encoding: Encoding,
    byte: u8,
    offset: u64,
    tok: &Tokenizer,
) -> Error {
    let mut pos = Position::new();
    pos.set_byte(offset).set_line(tok.line());
    Error::Decode { encoding, byte, pos }
}

/// A borrowed iterator over the records of a reader.
///
/// Created by `CsvReader::read_all`.
#[derive(Debug)]
pub struct Records<'r, R: Stream> {
    rdr: &'r mut CsvReader<R>,
    failed: bool,
}

impl<'r, R: io::Read + Stream> Records<'r, R> {
    /// Return a reference to the underlying reader.
    pub fn reader(&self) -> &CsvReader<R> {
        self.rdr
    }
}

impl<'r, R: io::Read + Stream> Iterator for Records<'r, R> {
    type Item = Result<Record>;

    fn next(&mut self) -> Option<Result<Record>> {
        if self.failed {
            return None;
        }
        match self.rdr.read_record() {
            Ok(Some(rec)) => Some(Ok(rec)),
            Ok(None) => None,
            Err(err) => {
                self.failed = true;
                Some(Err(err))
            }
        }
    }
}

/// An owned iterator over the records of a reader.
///
/// Created by `CsvReader::into_records`.
#[derive(Debug)]
pub struct IntoRecords<R: Stream> {
    rdr: CsvReader<R>,
    failed: bool,
}

impl<R: io::Read + Stream> IntoRecords<R> {
    /// Return a reference to the underlying reader.
    pub fn reader(&self) -> &CsvReader<R> {
        &self.rdr
    }

    /// Drop this iterator and return the underlying reader.
    pub fn into_reader(self) -> CsvReader<R> {
        self.rdr
    }
}

impl<R: io::Read + Stream> Iterator for IntoRecords<R> {
    type Item = Result<Record>;

    fn next(&mut self) -> Option<Result<Record>> {
        if self.failed {
            return None;
        }
        match self.rdr.read_record() {
            Ok(Some(rec)) => Some(Ok(rec)),
            Ok(None) => None,
            Err(err) => {
                self.failed = true;
                Some(Err(err))
            }
        }
    }
}
