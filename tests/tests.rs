mod common;

use std::io::{self, ErrorKind};

use common::{MockSink, MockSource};
use delimited::{
    ConfigError, CsvReader, CsvWriter, DelimitedOptions, Direction, Encoding,
    Error, FileStream, QuoteStyle, ReadOnly, ReaderBuilder, WriteOnly,
    WriterBuilder,
};

fn readable_source() -> MockSource {
    let mut source = MockSource::new();
    source.expect_can_read().return_const(true);
    source
}

fn writable_sink() -> MockSink {
    let mut sink = MockSink::new();
    sink.expect_can_write().return_const(true);
    sink
}

fn read_all(data: &[u8], opts: DelimitedOptions) -> Vec<Vec<String>> {
    let mut rdr = ReaderBuilder::new().options(opts).from_stream(data).unwrap();
    rdr.read_all().map(|r| r.unwrap().to_vec()).collect()
}

fn write_all(lines: &[Vec<&str>], opts: DelimitedOptions) -> Vec<u8> {
    let mut wtr = WriterBuilder::new().options(opts).from_stream(vec![]).unwrap();
    for line in lines {
        wtr.write_line(line).unwrap();
    }
    wtr.into_inner().unwrap()
}

#[test]
fn reader_rejects_unreadable_stream_without_io() {
    let mut source = MockSource::new();
    source.expect_can_read().times(1).return_const(false);
    source.expect_read().never();
    source.expect_close().never();

    match CsvReader::new(source) {
        Err(Error::StreamCapability { direction }) => {
            assert_eq!(direction, Direction::Read)
        }
        res => panic!("unexpected result: {:?}", res.map(|_| ())),
    }
}

#[test]
fn reader_with_encoding_rejects_unreadable_stream() {
    let mut source = MockSource::new();
    source.expect_can_read().return_const(false);
    source.expect_read().never();
    source.expect_close().never();

    let res = CsvReader::with_encoding(source, Encoding::Ascii);
    assert!(matches!(res, Err(Error::StreamCapability { .. })));
}

#[test]
fn writer_rejects_unwritable_stream_without_io() {
    let mut sink = MockSink::new();
    sink.expect_can_write().times(1).return_const(false);
    sink.expect_write().never();
    sink.expect_flush().never();
    sink.expect_close().never();

    match CsvWriter::new(sink) {
        Err(Error::StreamCapability { direction }) => {
            assert_eq!(direction, Direction::Write)
        }
        res => panic!("unexpected result: {:?}", res.map(|_| ())),
    }
}

#[test]
fn writer_with_encoding_rejects_unwritable_stream() {
    let mut sink = MockSink::new();
    sink.expect_can_write().return_const(false);
    sink.expect_write().never();
    sink.expect_close().never();

    let res = CsvWriter::with_encoding(sink, Encoding::Ascii);
    assert!(matches!(res, Err(Error::StreamCapability { .. })));
}

#[test]
fn reader_closes_stream_on_drop() {
    let mut source = readable_source();
    source.expect_read().never();
    source.expect_close().times(1).returning(|| Ok(()));

    let rdr = CsvReader::new(source).unwrap();
    drop(rdr);
}

#[test]
fn reader_closes_stream_once() {
    let mut source = readable_source();
    source.expect_read().never();
    source.expect_close().times(1).returning(|| Ok(()));

    let mut rdr = CsvReader::new(source).unwrap();
    rdr.close().unwrap();
    rdr.close().unwrap();
    assert!(matches!(rdr.read_record(), Err(Error::Closed)));
}

#[test]
fn writer_closes_stream_on_drop() {
    let mut sink = writable_sink();
    sink.expect_write().never();
    sink.expect_flush().returning(|| Ok(()));
    sink.expect_close().times(1).returning(|| Ok(()));

    let wtr = CsvWriter::new(sink).unwrap();
    drop(wtr);
}

#[test]
fn writer_closes_stream_once() {
    let mut sink = writable_sink();
    sink.expect_write().never();
    sink.expect_flush().returning(|| Ok(()));
    sink.expect_close().times(1).returning(|| Ok(()));

    let mut wtr = CsvWriter::new(sink).unwrap();
    wtr.close().unwrap();
    wtr.close().unwrap();
    assert!(matches!(wtr.write_line(&["a"]), Err(Error::Closed)));
}

#[test]
fn writer_writes_whole_line_at_once() {
    let mut sink = writable_sink();
    sink.expect_write()
        .times(1)
        .withf(|buf| buf == b"Hello,World\r\n")
        .returning(|buf| Ok(buf.len()));
    sink.expect_flush().returning(|| Ok(()));
    sink.expect_close().times(1).returning(|| Ok(()));

    let mut wtr = WriterBuilder::new().buffer_capacity(0).from_stream(sink).unwrap();
    wtr.write_line(&["Hello", "World"]).unwrap();
    wtr.close().unwrap();
}

#[test]
fn writer_close_still_closes_when_flush_fails() {
    let mut sink = writable_sink();
    sink.expect_write()
        .returning(|_| Err(io::Error::from(ErrorKind::PermissionDenied)));
    sink.expect_flush().returning(|| Ok(()));
    sink.expect_close().times(1).returning(|| Ok(()));

    let mut wtr = CsvWriter::new(sink).unwrap();
    wtr.write_line(&["a"]).unwrap();
    let err = wtr.close().unwrap_err();
    assert!(err.is_io_error());
    assert!(wtr.close().is_ok());
}

#[test]
fn close_error_is_reported() {
    let mut source = readable_source();
    source
        .expect_close()
        .times(1)
        .returning(|| Err(io::Error::new(ErrorKind::Other, "cannot close")));

    let mut rdr = CsvReader::new(source).unwrap();
    let err = rdr.close().unwrap_err();
    assert_eq!(err.to_string(), "cannot close");
}

#[test]
fn read_errors_pass_through() {
    let mut source = readable_source();
    source
        .expect_read()
        .returning(|_| Err(io::Error::new(ErrorKind::Other, "disk on fire")));
    source.expect_close().returning(|| Ok(()));

    let mut rdr = CsvReader::new(source).unwrap();
    match rdr.read_record() {
        Err(Error::Io(err)) => assert_eq!(err.to_string(), "disk on fire"),
        res => panic!("unexpected result: {:?}", res),
    }
}

#[test]
fn reader_options_setter_getter() {
    let opts = DelimitedOptions::new('.').unwrap();
    let mut rdr = CsvReader::new(io::Cursor::new(Vec::<u8>::new())).unwrap();
    rdr.set_options(opts);
    assert_eq!(rdr.options(), &opts);
}

#[test]
fn writer_options_setter_getter() {
    let opts = DelimitedOptions::new('.').unwrap();
    let mut wtr = CsvWriter::new(io::Cursor::new(Vec::<u8>::new())).unwrap();
    wtr.set_options(opts);
    assert_eq!(wtr.options(), &opts);
}

#[test]
fn write_line_scenarios() {
    let opts = DelimitedOptions::default();
    assert_eq!(write_all(&[vec!["Hello", "World"]], opts), b"Hello,World\r\n");
    assert_eq!(write_all(&[vec!["a,b", "c"]], opts), b"\"a,b\",c\r\n");
    assert_eq!(
        write_all(&[vec!["say \"hi\""]], opts),
        b"\"say \"\"hi\"\"\"\r\n"
    );
}

#[test]
fn read_scenarios() {
    let opts = DelimitedOptions::default();
    assert_eq!(read_all(b"\"a\r\nb\",c\r\n", opts), vec![vec!["a\r\nb", "c"]]);
    assert_eq!(read_all(b"a,,b\r\n", opts), vec![vec!["a", "", "b"]]);

    let mut rdr = CsvReader::new(&b"\"unterminated"[..]).unwrap();
    match rdr.read_record() {
        Err(Error::Malformed { kind, .. }) => {
            assert_eq!(kind, delimited::TokenError::UnterminatedQuote)
        }
        res => panic!("unexpected result: {:?}", res),
    }
}

#[test]
fn round_trip() {
    let lines = vec![
        vec!["plain", "", "with,comma"],
        vec!["\"quoted\"", "line\nbreak", "cr\ronly"],
        vec![""],
        vec!["☃", "tab\there", "trailing space "],
    ];
    for opts in vec![
        DelimitedOptions::default(),
        DelimitedOptions::tsv(),
        DelimitedOptions::ascii(),
        DelimitedOptions::with_quote(';', '\'').unwrap(),
        DelimitedOptions::builder()
            .double_quote(false)
            .escape(Some('\\'))
            .build()
            .unwrap(),
    ] {
        let data = write_all(&lines, opts);
        assert_eq!(read_all(&data, opts), lines, "options: {:?}", opts);
    }
}

#[test]
fn round_trip_latin1() {
    let mut wtr = CsvWriter::with_encoding(vec![], Encoding::Latin1).unwrap();
    wtr.write_line(&["naïve", "café, bar"]).unwrap();
    let data = wtr.into_inner().unwrap();
    assert_eq!(data, b"na\xEFve,\"caf\xE9, bar\"\r\n");

    let mut rdr = CsvReader::with_encoding(data.as_slice(), Encoding::Latin1).unwrap();
    let rec = rdr.read_record().unwrap().unwrap();
    assert_eq!(rec, vec!["naïve", "café, bar"]);
}

#[test]
fn adapters_wrap_plain_io() {
    let mut wtr = CsvWriter::new(WriteOnly(vec![])).unwrap();
    wtr.write_line(&["x", "y"]).unwrap();
    let data = wtr.into_inner().unwrap().into_inner();

    let mut rdr = CsvReader::new(ReadOnly(io::Cursor::new(data))).unwrap();
    assert_eq!(rdr.read_record().unwrap().unwrap(), vec!["x", "y"]);
}

#[test]
fn file_round_trip() {
    let path = std::env::temp_dir()
        .join(format!("delimited-test-{}.csv", std::process::id()));
    {
        let mut wtr = CsvWriter::new(FileStream::create(&path).unwrap()).unwrap();
        wtr.write_line(&["a", "b\nc"]).unwrap();
        wtr.close().unwrap();
    }
    {
        let mut wtr = CsvWriter::new(FileStream::append(&path).unwrap()).unwrap();
        wtr.write_line(&["d"]).unwrap();
    }
    let rdr = CsvReader::new(FileStream::open(&path).unwrap()).unwrap();
    let recs: Vec<_> = rdr.into_records().map(|r| r.unwrap()).collect();
    assert_eq!(recs.len(), 2);
    assert_eq!(recs[0], vec!["a", "b\nc"]);
    assert_eq!(recs[1], vec!["d"]);
    std::fs::remove_file(&path).unwrap();
}

#[test]
fn file_mode_is_checked_before_io() {
    let path = std::env::temp_dir()
        .join(format!("delimited-mode-{}.csv", std::process::id()));
    std::fs::write(&path, "x,y\r\n").unwrap();

    match CsvWriter::new(FileStream::open(&path).unwrap()) {
        Err(Error::StreamCapability { direction }) => {
            assert_eq!(direction, Direction::Write)
        }
        res => panic!("unexpected result: {:?}", res.map(|_| ())),
    }
    match CsvReader::new(FileStream::append(&path).unwrap()) {
        Err(Error::StreamCapability { direction }) => {
            assert_eq!(direction, Direction::Read)
        }
        res => panic!("unexpected result: {:?}", res.map(|_| ())),
    }
    assert_eq!(std::fs::read(&path).unwrap(), b"x,y\r\n");

    let mut rdr = CsvReader::new(FileStream::open_read_write(&path).unwrap())
        .unwrap();
    assert_eq!(rdr.read_record().unwrap().unwrap(), vec!["x", "y"]);
    rdr.close().unwrap();
    std::fs::remove_file(&path).unwrap();
}

#[test]
fn options_from_json() {
    let opts: DelimitedOptions =
        serde_json::from_str(r#"{"delimiter": ";", "quote": "'"}"#).unwrap();
    assert_eq!(opts, DelimitedOptions::with_quote(';', '\'').unwrap());

    let opts: DelimitedOptions = serde_json::from_str("{}").unwrap();
    assert_eq!(opts, DelimitedOptions::default());

    let json = serde_json::to_string(&DelimitedOptions::tsv()).unwrap();
    let back: DelimitedOptions = serde_json::from_str(&json).unwrap();
    assert_eq!(back, DelimitedOptions::tsv());
}

#[test]
fn invalid_options_from_json() {
    let err = serde_json::from_str::<DelimitedOptions>(r#"{"delimiter": "\""}"#)
        .unwrap_err();
    assert!(
        err.to_string().contains(&ConfigError::DelimiterIsQuote { ch: '"' }.to_string()),
        "{}",
        err
    );

    let res =
        serde_json::from_str::<DelimitedOptions>(r#"{"double_quote": false}"#);
    assert!(res.is_err());
}

#[test]
fn encoding_and_style_from_json() {
    let enc: Encoding = serde_json::from_str(r#""latin1""#).unwrap();
    assert_eq!(enc, Encoding::Latin1);
    let style: QuoteStyle = serde_json::from_str(r#""Always""#).unwrap();
    assert_eq!(style, QuoteStyle::Always);
}
