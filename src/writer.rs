use std::io::{self, Write};

use delimited_core::{DelimitedOptions, QuoteStyle, Quoter};
use log::{debug, trace, warn};

use crate::encoding::Encoding;
use crate::error::{Error, Result};
use crate::stream::{ensure_writable, Stream};

/// Builds a delimited writer with various configuration knobs.
///
/// This builder can be used to tweak the field delimiter, quoting rules,
/// encoding and buffer size. Once a `CsvWriter` is built, its options can
/// still be replaced with `CsvWriter::set_options`.
#[derive(Debug)]
pub struct WriterBuilder {
    opts: DelimitedOptions,
    encoding: Encoding,
    style: QuoteStyle,
    capacity: usize,
}

impl Default for WriterBuilder {
    fn default() -> WriterBuilder {
        WriterBuilder {
            opts: DelimitedOptions::default(),
            encoding: Encoding::default(),
            style: QuoteStyle::default(),
            capacity: 8 * (1 << 10),
        }
    }
}

impl WriterBuilder {
    /// Create a new builder for configuring delimited writing.
    ///
    /// To convert a builder into a writer, call `from_stream`.
    ///
    /// # Example
    ///
    /// ```
    /// use std::error::Error;
    /// use delimited::{QuoteStyle, WriterBuilder};
    ///
    /// # fn main() { example().unwrap(); }
    /// fn example() -> Result<(), Box<dyn Error>> {
    ///     let mut wtr = WriterBuilder::new()
    ///         .quote_style(QuoteStyle::Always)
    ///         .from_stream(vec![])?;
    ///     wtr.write_line(&["a", "b"])?;
    ///
    ///     let data = String::from_utf8(wtr.into_inner()?)?;
    ///     assert_eq!(data, "\"a\",\"b\"\r\n");
    ///     Ok(())
    /// }
    /// ```
    pub fn new() -> WriterBuilder {
        WriterBuilder::default()
    }

    /// Build a writer from this configuration that writes to `stream`.
    ///
    /// This fails with `Error::StreamCapability` if the stream cannot be
    /// written. Nothing is written to the stream here.
    pub fn from_stream<W: io::Write + Stream>(
        &self,
        stream: W,
    ) -> Result<CsvWriter<W>> {
        CsvWriter::build(self, stream)
    }

    /// Set the delimiter, quoting and escaping rules.
    pub fn options(&mut self, opts: DelimitedOptions) -> &mut WriterBuilder {
        self.opts = opts;
        self
    }

    /// Set the encoding used to encode each line.
    ///
    /// The default is UTF-8.
    pub fn encoding(&mut self, encoding: Encoding) -> &mut WriterBuilder {
        self.encoding = encoding;
        self
    }

    /// Set the quoting style to use when writing fields.
    ///
    /// By default, this is set to `QuoteStyle::Necessary`, which quotes a
    /// field only if it contains the delimiter, the quote or a line
    /// terminator.
    pub fn quote_style(&mut self, style: QuoteStyle) -> &mut WriterBuilder {
        self.style = style;
        self
    }

    /// Set the capacity (in bytes) of the internal buffer used in the writer.
    pub fn buffer_capacity(&mut self, capacity: usize) -> &mut WriterBuilder {
        self.capacity = capacity;
        self
    }
}

/// A delimited writer.
///
/// Each call to `write_line` writes one record terminated by `\r\n`. Fields
/// are quoted as the writer's `QuoteStyle` demands, and quotes inside quoted
/// fields are escaped so that a `CsvReader` with the same options reads the
/// fields back unchanged.
///
/// Output is buffered. The buffer is flushed by `flush`, `close`,
/// `into_inner`, or when the writer is dropped. Errors that occur while
/// flushing on drop are logged and otherwise ignored, so callers that care
/// should call `close` (or `flush`) explicitly.
///
/// # Example
///
/// ```
/// use delimited::CsvWriter;
///
/// # fn main() { example().unwrap(); }
/// fn example() -> delimited::Result<()> {
///     let mut out = vec![];
///     {
///         let mut wtr = CsvWriter::new(&mut out)?;
///         wtr.write_line(&["Hello", "World"])?;
///         wtr.write_line(&["a,b", "say \"hi\""])?;
///         wtr.close()?;
///     }
///     assert_eq!(out, b"Hello,World\r\n\"a,b\",\"say \"\"hi\"\"\"\r\n");
///     Ok(())
/// }
/// ```
#[derive(Debug)]
pub struct CsvWriter<W: io::Write + Stream> {
    /// `None` once the writer has been closed or unwrapped.
    wtr: Option<io::BufWriter<W>>,
    quoter: Quoter,
    encoding: Encoding,
    /// Scratch space for the line being built.
    line: String,
    bytes: Vec<u8>,
    records: u64,
}

impl<W: io::Write + Stream> CsvWriter<W> {
    /// Create a writer for UTF-8 output with default options.
    ///
    /// This fails with `Error::StreamCapability` if the stream cannot be
    /// written. Nothing is written to the stream here.
    pub fn new(stream: W) -> Result<CsvWriter<W>> {
        WriterBuilder::new().from_stream(stream)
    }

    /// Create a writer using the given encoding and default options.
    pub fn with_encoding(stream: W, encoding: Encoding) -> Result<CsvWriter<W>> {
        WriterBuilder::new().encoding(encoding).from_stream(stream)
    }

    fn build(builder: &WriterBuilder, stream: W) -> Result<CsvWriter<W>> {
        ensure_writable(&stream)?;
        debug!(
            "opening writer (delimiter {:?}, quote {:?}, {}, {:?})",
            builder.opts.delimiter(),
            builder.opts.quote(),
            builder.encoding,
            builder.style
        );
        Ok(CsvWriter {
            wtr: Some(io::BufWriter::with_capacity(builder.capacity, stream)),
            quoter: Quoter::with_style(builder.opts, builder.style),
            encoding: builder.encoding,
            line: String::new(),
            bytes: vec![],
            records: 0,
        })
    }

    /// Write a single record.
    ///
    /// Fields are joined with the delimiter and the line is terminated with
    /// `\r\n`. Writing an empty sequence of fields writes a bare `\r\n`,
    /// which reads back as a record with one empty field.
    ///
    /// The whole line is checked before any of it is written: if a field
    /// requires quotes under `QuoteStyle::Never`, or contains a character
    /// the encoding cannot represent, nothing is written and an error is
    /// returned.
    pub fn write_line<I, T>(&mut self, fields: I) -> Result<()>
    where
        I: IntoIterator<Item = T>,
        T: AsRef<str>,
    {
        if self.wtr.is_none() {
            return Err(Error::Closed);
        }
        self.line.clear();
        let delimiter = self.quoter.options().delimiter();
        for (i, field) in fields.into_iter().enumerate() {
            let field = field.as_ref();
            if i > 0 {
                self.line.push(delimiter);
            }
            let quote = self.quoter.should_quote(field).map_err(|_| {
                Error::QuoteRequired { field: field.to_string() }
            })?;
            if quote {
                self.line.extend(self.quoter.quoted(field));
            } else {
                self.line.push_str(field);
            }
        }
        self.line.push_str("\r\n");

        self.bytes.clear();
        let encoding = self.encoding;
        encoding
            .encode(&self.line, &mut self.bytes)
            .map_err(|ch| Error::Encode { encoding, ch })?;
        match self.wtr {
            Some(ref mut wtr) => wtr.write_all(&self.bytes)?,
            None => return Err(Error::Closed),
        }
        trace!("wrote record {}: {:?}", self.records, self.line);
        self.records += 1;
        Ok(())
    }

    /// Flush the contents of the internal buffer to the underlying stream.
    ///
    /// If there was a problem writing to the stream, then an error is
    /// returned.
    pub fn flush(&mut self) -> Result<()> {
        match self.wtr {
            Some(ref mut wtr) => Ok(wtr.flush()?),
            None => Err(Error::Closed),
        }
    }

    /// Flush and close the underlying stream.
    ///
    /// The stream is closed the first time this is called, even if
    /// flushing fails. Later calls do nothing and return `Ok(())`. Writing
    /// after closing fails with `Error::Closed`.
    pub fn close(&mut self) -> Result<()> {
        let mut wtr = match self.wtr.take() {
            Some(wtr) => wtr,
            None => return Ok(()),
        };
        debug!("closing writer after {} records", self.records);
        let flushed = wtr.flush();
        let (mut stream, _) = wtr.into_parts();
        let closed = stream.close();
        flushed?;
        closed?;
        Ok(())
    }

    /// Flush the internal buffer and return the underlying stream without
    /// closing it.
    pub fn into_inner(mut self) -> Result<W> {
        let mut wtr = self.wtr.take().ok_or(Error::Closed)?;
        wtr.flush()?;
        let (stream, _) = wtr.into_parts();
        Ok(stream)
    }

    /// Returns a reference to the underlying stream, or `None` if the
    /// writer has been closed.
    pub fn get_ref(&self) -> Option<&W> {
        self.wtr.as_ref().map(|wtr| wtr.get_ref())
    }

    /// The options currently used to write fields.
    pub fn options(&self) -> &DelimitedOptions {
        self.quoter.options()
    }

    /// Replace the options. They apply to every line written afterwards.
    pub fn set_options(&mut self, opts: DelimitedOptions) {
        self.quoter.set_options(opts);
    }

    /// The quote style currently used to write fields.
    pub fn quote_style(&self) -> QuoteStyle {
        self.quoter.style()
    }

    /// Replace the quote style.
    pub fn set_quote_style(&mut self, style: QuoteStyle) {
        self.quoter.set_style(style);
    }

    /// The encoding used to encode each line.
    pub fn encoding(&self) -> Encoding {
        self.encoding
    }

    /// Returns true if the stream has been closed.
    pub fn is_closed(&self) -> bool {
        self.wtr.is_none()
    }
}

impl<W: io::Write + Stream> Drop for CsvWriter<W> {
    fn drop(&mut self) {
        if let Err(err) = self.close() {
            warn!("failed to close writer stream: {}", err);
        }
    }
}
