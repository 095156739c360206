/*!
The `delimited` crate reads and writes delimited text (CSV, TSV and other
single-character-delimited formats) over byte streams.

# Overview

A [`CsvReader`](struct.CsvReader.html) decodes its stream and splits it into
[`Record`](struct.Record.html)s. A [`CsvWriter`](struct.CsvWriter.html) does
the reverse, quoting fields where needed and terminating every line with
`\r\n`. Both are configured with
[`DelimitedOptions`](struct.DelimitedOptions.html), which name the delimiter,
the quote character and how quotes are escaped.

Reading and writing are inverses: any sequence of fields written by a
`CsvWriter` is read back unchanged by a `CsvReader` using the same options.

Readers and writers work over any [`Stream`](trait.Stream.html): a byte
stream that can say whether it can be read or written, and that can be
closed. The capability is checked when a reader or writer is built, before
any I/O. The stream is closed exactly once, by an explicit `close` or when
the reader or writer is dropped.

# Example

```
use delimited::{CsvReader, CsvWriter};

# fn main() { example().unwrap(); }
fn example() -> delimited::Result<()> {
    let mut out = vec![];
    {
        let mut wtr = CsvWriter::new(&mut out)?;
        wtr.write_line(&["name", "quote"])?;
        wtr.write_line(&["Ada", "say \"hi\", then\nleave"])?;
    }

    let mut rdr = CsvReader::new(out.as_slice())?;
    let header = rdr.read_record()?.unwrap();
    assert_eq!(header, vec!["name", "quote"]);
    let row = rdr.read_record()?.unwrap();
    assert_eq!(row, vec!["Ada", "say \"hi\", then\nleave"]);
    assert!(rdr.read_record()?.is_none());
    Ok(())
}
```

# Configuration

Options can be built in code with
[`DelimitedOptions::builder`](struct.DelimitedOptions.html#method.builder),
or, with the `serde` feature (enabled by default), loaded from any format
`serde` supports. Loaded options are validated just like built ones.

# Logging

This crate logs through the [`log`](https://docs.rs/log) facade. Readers and
writers log at `debug` level when they are opened and closed, and at
`trace` level for every record. It never installs a logger.
*/

#![deny(missing_docs)]

pub use delimited_core::{
    ConfigError, DelimitedOptions, OptionsBuilder, QuoteStyle, TokenError,
};

pub use crate::encoding::Encoding;
pub use crate::error::{Direction, Error, Result};
pub use crate::reader::{CsvReader, IntoRecords, ReaderBuilder, Records};
pub use crate::record::{Position, Record, RecordIter};
pub use crate::stream::{
    ensure_readable, ensure_writable, FileStream, ReadOnly, Stream, WriteOnly,
};
pub use crate::writer::{CsvWriter, WriterBuilder};

mod encoding;
mod error;
mod reader;
mod record;
mod stream;
mod writer;
