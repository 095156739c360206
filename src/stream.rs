use std::fs;
use std::io;
use std::net;
use std::path::Path;

use crate::error::{Direction, Error, Result};

/// A byte stream that can report what it supports and can be closed.
///
/// Readers require `io::Read + Stream` and writers require
/// `io::Write + Stream`. Both ask the stream once, at construction, whether
/// it can be read or written, and refuse to be built otherwise. Both close
/// the stream exactly once, either through an explicit `close` or when they
/// are dropped.
///
/// Implementations are provided for the standard library's in-memory
/// buffers, TCP streams and standard streams. Files are used through
/// [`FileStream`], which remembers the mode a file was opened in. Any other
/// reader or writer can be used through [`ReadOnly`] or [`WriteOnly`].
pub trait Stream {
    /// Returns true if this stream can be read.
    fn can_read(&self) -> bool;

    /// Returns true if this stream can be written.
    fn can_write(&self) -> bool;

    /// Release the stream.
    ///
    /// This is called exactly once by the reader or writer that owns the
    /// stream. The default does nothing.
    fn close(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Fail with `Error::StreamCapability` unless `stream` can be read.
pub fn ensure_readable<S: Stream + ?Sized>(stream: &S) -> Result<()> {
    if stream.can_read() {
        Ok(())
    } else {
        Err(Error::StreamCapability { direction: Direction::Read })
    }
}

/// Fail with `Error::StreamCapability` unless `stream` can be written.
pub fn ensure_writable<S: Stream + ?Sized>(stream: &S) -> Result<()> {
    if stream.can_write() {
        Ok(())
    } else {
        Err(Error::StreamCapability { direction: Direction::Write })
    }
}

impl Stream for Vec<u8> {
    fn can_read(&self) -> bool {
        false
    }

    fn can_write(&self) -> bool {
        true
    }
}

impl<'a> Stream for &'a [u8] {
    fn can_read(&self) -> bool {
        true
    }

    fn can_write(&self) -> bool {
        false
    }
}

impl Stream for io::Cursor<Vec<u8>> {
    fn can_read(&self) -> bool {
        true
    }

    fn can_write(&self) -> bool {
        true
    }
}

impl<'a> Stream for io::Cursor<&'a [u8]> {
    fn can_read(&self) -> bool {
        true
    }

    fn can_write(&self) -> bool {
        false
    }
}

impl Stream for net::TcpStream {
    fn can_read(&self) -> bool {
        true
    }

    fn can_write(&self) -> bool {
        true
    }

    fn close(&mut self) -> io::Result<()> {
        match self.shutdown(net::Shutdown::Both) {
            // The peer may have hung up first.
            Err(ref err) if err.kind() == io::ErrorKind::NotConnected => Ok(()),
            res => res,
        }
    }
}

impl Stream for io::Stdin {
    fn can_read(&self) -> bool {
        true
    }

    fn can_write(&self) -> bool {
        false
    }
}

impl Stream for io::Stdout {
    fn can_read(&self) -> bool {
        false
    }

    fn can_write(&self) -> bool {
        true
    }

    fn close(&mut self) -> io::Result<()> {
        io::Write::flush(self)
    }
}

impl Stream for io::Stderr {
    fn can_read(&self) -> bool {
        false
    }

    fn can_write(&self) -> bool {
        true
    }

    fn close(&mut self) -> io::Result<()> {
        io::Write::flush(self)
    }
}

impl<S: Stream + ?Sized> Stream for Box<S> {
    fn can_read(&self) -> bool {
        (**self).can_read()
    }

    fn can_write(&self) -> bool {
        (**self).can_write()
    }

    fn close(&mut self) -> io::Result<()> {
        (**self).close()
    }
}

impl<'a, S: Stream + ?Sized> Stream for &'a mut S {
    fn can_read(&self) -> bool {
        (**self).can_read()
    }

    fn can_write(&self) -> bool {
        (**self).can_write()
    }

    fn close(&mut self) -> io::Result<()> {
        (**self).close()
    }
}

/// A file that knows whether it was opened for reading, writing or both.
///
/// A plain `fs::File` cannot tell how it was opened, so it is not a
/// `Stream` itself.
///
/// # Example
///
/// ```
/// use delimited::{CsvReader, CsvWriter, FileStream};
///
/// # fn main() { example().unwrap(); }
/// fn example() -> delimited::Result<()> {
///     let path = std::env::temp_dir().join("delimited-doc-file-stream.csv");
///     let mut wtr = CsvWriter::new(FileStream::create(&path)?)?;
///     wtr.write_line(&["a", "b"])?;
///     wtr.close()?;
///
///     // A file opened for reading cannot back a writer.
///     assert!(CsvWriter::new(FileStream::open(&path)?).is_err());
///
///     let mut rdr = CsvReader::new(FileStream::open(&path)?)?;
///     assert_eq!(rdr.read_record()?.unwrap(), vec!["a", "b"]);
///     rdr.close()?;
///     std::fs::remove_file(&path)?;
///     Ok(())
/// }
/// ```
#[derive(Debug)]
pub struct FileStream {
    file: fs::File,
    read: bool,
    write: bool,
}

impl FileStream {
    /// Open an existing file for reading only.
    pub fn open<P: AsRef<Path>>(path: P) -> io::Result<FileStream> {
        FileStream::with_mode(path, true, false, |o| o)
    }

    /// Create a file for writing only, truncating it if it exists.
    pub fn create<P: AsRef<Path>>(path: P) -> io::Result<FileStream> {
        FileStream::with_mode(path, false, true, |o| {
            o.create(true).truncate(true)
        })
    }

    /// Open a file for writing only, appending to it. The file is created if
    /// it does not exist.
    pub fn append<P: AsRef<Path>>(path: P) -> io::Result<FileStream> {
        FileStream::with_mode(path, false, true, |o| {
            o.create(true).append(true)
        })
    }

    /// Open an existing file for both reading and writing.
    pub fn open_read_write<P: AsRef<Path>>(path: P) -> io::Result<FileStream> {
        FileStream::with_mode(path, true, true, |o| o)
    }

    fn with_mode<P, F>(
        path: P,
        read: bool,
        write: bool,
        extra: F,
    ) -> io::Result<FileStream>
    where
        P: AsRef<Path>,
        F: FnOnce(&mut fs::OpenOptions) -> &mut fs::OpenOptions,
    {
        let mut opts = fs::OpenOptions::new();
        opts.read(read).write(write);
        let file = extra(&mut opts).open(path)?;
        Ok(FileStream { file, read, write })
    }

    /// Return a reference to the underlying file.
    pub fn get_ref(&self) -> &fs::File {
        &self.file
    }

    /// Unwrap the underlying file.
    pub fn into_inner(self) -> fs::File {
        self.file
    }
}

impl io::Read for FileStream {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        io::Read::read(&mut self.file, buf)
    }
}

impl io::Write for FileStream {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        io::Write::write(&mut self.file, buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        io::Write::flush(&mut self.file)
    }
}

impl Stream for FileStream {
    fn can_read(&self) -> bool {
        self.read
    }

    fn can_write(&self) -> bool {
        self.write
    }

    fn close(&mut self) -> io::Result<()> {
        if self.write {
            self.file.sync_all()?;
        }
        Ok(())
    }
}

/// Adapts any `io::Read` into a readable, non-writable `Stream`.
///
/// Closing a `ReadOnly` does nothing; the inner reader is released when it
/// is dropped.
#[derive(Debug)]
pub struct ReadOnly<R>(pub R);

impl<R> ReadOnly<R> {
    /// Unwrap the inner reader.
    pub fn into_inner(self) -> R {
        self.0
    }
}

impl<R: io::Read> io::Read for ReadOnly<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.0.read(buf)
    }
}

impl<R> Stream for ReadOnly<R> {
    fn can_read(&self) -> bool {
        true
    }

    fn can_write(&self) -> bool {
        false
    }
}

/// Adapts any `io::Write` into a writable, non-readable `Stream`.
///
/// Closing a `WriteOnly` flushes the inner writer.
#[derive(Debug)]
pub struct WriteOnly<W>(pub W);

impl<W> WriteOnly<W> {
    /// Unwrap the inner writer.
    pub fn into_inner(self) -> W {
        self.0
    }
}

impl<W: io::Write> io::Write for WriteOnly<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.0.flush()
    }
}

impl<W: io::Write> Stream for WriteOnly<W> {
    fn can_read(&self) -> bool {
        false
    }

    fn can_write(&self) -> bool {
        true
    }

    fn close(&mut self) -> io::Result<()> {
        self.0.flush()
    }
}
