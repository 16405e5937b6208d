//! Record streams
//! ---
//! Byte sinks and sources for sequences of `Writable` records.  Each record is framed by
//! its var-int byte length, so a reader can tell a clean end of stream (EOF exactly on a
//! record boundary) from a truncated one.  Streams may optionally be wrapped in the snappy
//! frame format.
//!
//! `SpillFile` keeps a stream of records on local disk for as long as the handle lives,
//! which is handy when partial counts no longer fit in memory.

use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

use snap::read::FrameDecoder;
use snap::write::FrameEncoder;
use uuid::Uuid;

use crate::codec::{read_exact_vec, read_len, write_len, Writable};
use crate::error::Result;

/// Block compression applied to a record stream
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Compression {
    /// Records are written as-is
    None,

    /// Records are wrapped in the snappy frame format
    Snappy
}

/// Options shared by record writers and readers.  Both ends of a stream must agree on
/// the compression.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordOptions {
    /// Compression of the whole stream
    pub compression: Compression,

    /// Capacity of the I/O buffer in bytes
    pub buffer_capacity: usize
}

impl Default for RecordOptions {
    fn default() -> Self {
        RecordOptions {
            compression: Compression::None,
            buffer_capacity: 64 * 1024
        }
    }
}

impl RecordOptions {
    /// Returns the same options with a different compression
    pub fn with_compression(mut self, compression: Compression) -> Self {
        self.compression = compression;
        self
    }
}

enum Sink<W: Write> {
    Plain(BufWriter<W>),
    Snappy(FrameEncoder<BufWriter<W>>)
}

impl <W: Write> Write for Sink<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            Sink::Plain(w) => w.write(buf),
            Sink::Snappy(w) => w.write(buf)
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            Sink::Plain(w) => w.flush(),
            Sink::Snappy(w) => w.flush()
        }
    }
}

/// Writes length-framed records to a byte sink.
/// ```rust
///   use tally::record::{RecordWriter, RecordReader, RecordOptions};
///
///   let mut buf = Vec::new();
///   {
///       let mut writer = RecordWriter::new(&mut buf, RecordOptions::default());
///       writer.write(&"one".to_owned()).unwrap();
///       writer.write(&"two".to_owned()).unwrap();
///       assert_eq!(writer.finish().unwrap(), 2);
///   }
///   let records: Vec<String> = RecordReader::new(&buf[..], RecordOptions::default())
///       .collect::<Result<_, _>>()
///       .unwrap();
///   assert_eq!(records, vec!["one".to_owned(), "two".to_owned()]);
/// ```
pub struct RecordWriter<W: Write> {
    sink: Sink<W>,
    scratch: Vec<u8>,
    written: usize
}

impl <W: Write> RecordWriter<W> {

    /// Creates a new writer over the sink
    pub fn new(out: W, options: RecordOptions) -> Self {
        let bw = BufWriter::with_capacity(options.buffer_capacity, out);
        let sink = match options.compression {
            Compression::None => Sink::Plain(bw),
            Compression::Snappy => Sink::Snappy(FrameEncoder::new(bw))
        };
        RecordWriter {
            sink: sink,
            scratch: Vec::new(),
            written: 0
        }
    }

    /// Appends a single record
    pub fn write<T: Writable>(&mut self, record: &T) -> Result<()> {
        self.scratch.clear();
        record.write_to(&mut self.scratch)?;
        write_len(&mut self.sink, self.scratch.len())?;
        self.sink.write_all(&self.scratch)?;
        self.written += 1;
        trace!("Wrote record {} ({} bytes)", self.written, self.scratch.len());
        Ok(())
    }

    /// Appends every record from the iterator
    pub fn write_all<'a, T: 'a + Writable, I: IntoIterator<Item = &'a T>>(&mut self, records: I) -> Result<()> {
        for r in records {
            self.write(r)?;
        }
        Ok(())
    }

    /// Number of records written so far
    pub fn written(&self) -> usize {
        self.written
    }

    /// Flushes every buffered byte to the sink, returning the number of records written
    pub fn finish(mut self) -> Result<usize> {
        self.sink.flush()?;
        debug!("Finished record stream with {} records", self.written);
        Ok(self.written)
    }
}

enum Source<R: Read> {
    Plain(BufReader<R>),
    Snappy(BufReader<FrameDecoder<R>>)
}

impl <R: Read> Read for Source<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self {
            Source::Plain(r) => r.read(buf),
            Source::Snappy(r) => r.read(buf)
        }
    }
}

/// Reads length-framed records from a byte source.  Iteration stops cleanly at the end of
/// the stream; a stream cut in the middle of a record yields `Error::Truncated` once and
/// then stops.
pub struct RecordReader<R: Read, T> {
    source: Source<R>,
    read: usize,
    failed: bool,
    pd: PhantomData<T>
}

impl <R: Read, T: Writable> RecordReader<R, T> {

    /// Creates a new reader over the source
    pub fn new(input: R, options: RecordOptions) -> Self {
        let source = match options.compression {
            Compression::None => Source::Plain(BufReader::with_capacity(options.buffer_capacity, input)),
            Compression::Snappy => Source::Snappy(
                BufReader::with_capacity(options.buffer_capacity, FrameDecoder::new(input)))
        };
        RecordReader {
            source: source,
            read: 0,
            failed: false,
            pd: PhantomData
        }
    }

    /// Number of records read so far
    pub fn records_read(&self) -> usize {
        self.read
    }

    fn next_record(&mut self) -> Result<Option<T>> {
        let mut first = [0u8; 1];
        loop {
            match self.source.read(&mut first) {
                Ok(0) => return Ok(None),
                Ok(_) => break,
                Err(ref e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into())
            }
        }

        let len = {
            let mut framed = (&first[..]).chain(&mut self.source);
            read_len(&mut framed)?
        };
        let body = read_exact_vec(&mut self.source, len)?;
        let record = T::from_bytes(&body)?;
        self.read += 1;
        Ok(Some(record))
    }
}

impl <R: Read, T: Writable> Iterator for RecordReader<R, T> {
    type Item = Result<T>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        match self.next_record() {
            Ok(Some(record)) => Some(Ok(record)),
            Ok(None) => None,
            Err(e) => {
                debug!("Record stream failed after {} records: {}", self.read, e);
                self.failed = true;
                Some(Err(e))
            }
        }
    }
}

/// A record file on local disk that is deleted when the handle is dropped.
pub struct SpillFile<T> {
    path: PathBuf,
    records: usize,
    options: RecordOptions,
    pd: PhantomData<T>
}

impl <T: Writable> SpillFile<T> {

    /// Writes the records into a freshly named file inside `dir`, creating the directory if
    /// needed.
    pub fn create<'a, P, I>(dir: P, records: I, options: RecordOptions) -> Result<Self>
    where
        T: 'a,
        P: AsRef<Path>,
        I: IntoIterator<Item = &'a T>
    {
        fs::create_dir_all(dir.as_ref())?;
        let path = dir.as_ref().join(format!("tally-{}", Uuid::new_v4()));
        // Dropping the handle on a failed write removes the partial file
        let mut spill = SpillFile {
            path: path,
            records: 0,
            options: options,
            pd: PhantomData
        };
        let fd = File::create(&spill.path)?;
        let mut writer = RecordWriter::new(fd, options);
        writer.write_all(records)?;
        spill.records = writer.finish()?;
        debug!("Spilled {} records to {:?}", spill.records, spill.path);
        Ok(spill)
    }

    /// Location of the file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of records in the file
    pub fn len(&self) -> usize {
        self.records
    }

    /// True if no records were spilled
    pub fn is_empty(&self) -> bool {
        self.records == 0
    }

    /// Opens a new reader over the records
    pub fn reader(&self) -> Result<RecordReader<File, T>> {
        let fd = File::open(&self.path)?;
        Ok(RecordReader::new(fd, self.options))
    }

    /// Reads every record back into memory
    pub fn read_all(&self) -> Result<Vec<T>> {
        self.reader()?.collect()
    }
}

impl <T> Drop for SpillFile<T> {
    fn drop(&mut self) {
        if let Err(e) = fs::remove_file(&self.path) {
            if e.kind() != io::ErrorKind::NotFound {
                debug!("Error deleting {:?}: {}", self.path, e);
            }
        }
    }
}

#[cfg(test)]
mod record_test {
    use super::*;
    use crate::error::Error;
    use crate::pair::PairOfStringInt;
    use std::env::temp_dir;

    fn sample() -> Vec<PairOfStringInt> {
        vec![
            PairOfStringInt::new("alpha".into(), 1),
            PairOfStringInt::new("βeta".into(), -2),
            PairOfStringInt::new("".into(), 300)
        ]
    }

    fn round_trip(options: RecordOptions) {
        let records = sample();
        let mut buf = Vec::new();
        {
            let mut writer = RecordWriter::new(&mut buf, options);
            writer.write_all(&records).unwrap();
            assert_eq!(writer.finish().unwrap(), 3);
        }
        let back: Vec<PairOfStringInt> = RecordReader::new(&buf[..], options)
            .collect::<Result<_>>()
            .unwrap();
        assert_eq!(back, records);
    }

    #[test]
    fn test_plain_round_trip() {
        round_trip(RecordOptions::default());
    }

    #[test]
    fn test_snappy_round_trip() {
        round_trip(RecordOptions::default().with_compression(Compression::Snappy));
    }

    #[test]
    fn test_empty_stream() {
        let buf: Vec<u8> = Vec::new();
        let mut reader: RecordReader<_, i32> = RecordReader::new(&buf[..], RecordOptions::default());
        assert!(reader.next().is_none());
        assert_eq!(reader.records_read(), 0);
    }

    #[test]
    fn test_truncated_stream() {
        let mut buf = Vec::new();
        {
            let mut writer = RecordWriter::new(&mut buf, RecordOptions::default());
            writer.write(&42i64).unwrap();
            writer.write(&43i64).unwrap();
            writer.finish().unwrap();
        }
        let cut = &buf[..buf.len() - 3];
        let mut reader: RecordReader<_, i64> = RecordReader::new(cut, RecordOptions::default());
        assert_eq!(reader.next().unwrap().unwrap(), 42);
        assert!(reader.next().unwrap().unwrap_err().is_truncated());
        assert!(reader.next().is_none());
    }

    #[test]
    fn test_record_with_trailing_bytes() {
        // Frame claims 5 bytes but an i32 only consumes 4
        let buf = vec![5u8, 0, 0, 0, 1, 9];
        let mut reader: RecordReader<_, i32> = RecordReader::new(&buf[..], RecordOptions::default());
        match reader.next() {
            Some(Err(Error::Malformed(_))) => (),
            _ => panic!("expected malformed record")
        }
    }

    #[test]
    fn test_spill_file_cleanup() {
        let dir = temp_dir().join("tally-record-test");
        let records = sample();
        let path = {
            let spill = SpillFile::create(&dir, &records, RecordOptions::default()).unwrap();
            assert_eq!(spill.len(), 3);
            assert!(spill.path().exists());
            assert_eq!(spill.read_all().unwrap(), records);
            // Readable more than once
            assert_eq!(spill.reader().unwrap().count(), 3);
            spill.path().to_path_buf()
        };
        assert!(!path.exists());
    }
}
