//! Mock streams that record how readers and writers use them.
use mockall::mock;

use std::io::{self, Read, Write};

use delimited::Stream;

mock! {
    pub Source {}
    impl Read for Source {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize>;
    }
    impl Stream for Source {
        fn can_read(&self) -> bool;
        fn can_write(&self) -> bool;
        fn close(&mut self) -> io::Result<()>;
    }
}

mock! {
    pub Sink {}
    impl Write for Sink {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize>;
        fn flush(&mut self) -> io::Result<()>;
    }
    impl Stream for Sink {
        fn can_read(&self) -> bool;
        fn can_write(&self) -> bool;
        fn close(&mut self) -> io::Result<()>;
    }
}
