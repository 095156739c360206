#![no_main]
use libfuzzer_sys::fuzz_target;

use delimited::{CsvReader, CsvWriter};

fuzz_target!(|data: &[u8]| {
    let rdr = match CsvReader::new(data) {
        Ok(rdr) => rdr,
        Err(_) => return,
    };
    let records: Vec<_> = rdr.into_records().filter_map(|r| r.ok()).collect();

    let mut out = vec![];
    {
        let mut wtr = CsvWriter::new(&mut out).unwrap();
        for rec in &records {
            wtr.write_line(rec).unwrap();
        }
        wtr.close().unwrap();
    }

    let again: Vec<_> = CsvReader::new(out.as_slice())
        .unwrap()
        .into_records()
        .map(|r| r.unwrap())
        .collect();
    assert_eq!(records, again);
});
