//! A length-prefixed byte string stream, used as the default encoding of intermediate files.
//!
//! # WriteLog
//!
//! WriteLog is a persistent data structure designed to be written to disk
//! that is a sequence of bytestrings.
//! It can be read back in relatively efficiently and yields the same byte
//! strings; on disk, it is represented as entries prefixed by 4 byte
//! big-endian length prefixes:
//!
//! ```text
//! llllbbbbbbllllbbllllbbbbbbbbb...
//! ```
//!
//! Where l is a length byte and b are bytes of a bytestring. Entries can contain any byte,
//! including newlines, quotes and NULs; an empty entry is just a zero length prefix.
//!
//! A record is stored as two consecutive entries, key first (see `formats::util`).

use std::fs;
use std::io::{self, BufWriter, Read, Write};
use std::path::Path;

fn encode_u32(val: u32) -> [u8; 4] {
    val.to_be_bytes()
}

fn decode_u32(buf: [u8; 4]) -> u32 {
    u32::from_be_bytes(buf)
}

pub struct WriteLogWriter<W: Write> {
    dest: W,

    current_length: u64,
    entries_written: u64,
}

impl<W: Write> WriteLogWriter<W> {
    /// Return a new WriteLog that writes to dest
    pub fn new(dest: W) -> WriteLogWriter<W> {
        WriteLogWriter {
            dest,
            current_length: 0,
            entries_written: 0,
        }
    }

    /// Appends one entry. Fails with InvalidInput if the entry doesn't fit a 4 byte length prefix.
    pub fn write_entry(&mut self, buf: &[u8]) -> io::Result<()> {
        let len = u32::try_from(buf.len()).map_err(|_| {
            io::Error::new(io::ErrorKind::InvalidInput,
                           format!("entry of {} bytes is too long for a WriteLog", buf.len()))
        })?;
        self.dest.write_all(&encode_u32(len))?;
        self.dest.write_all(buf)?;
        self.current_length += 4 + buf.len() as u64;
        self.entries_written += 1;
        Ok(())
    }

    /// Return how many (bytes,entries) have been written.
    pub fn stats(&self) -> (u64, u64) {
        (self.current_length, self.entries_written)
    }

    pub fn flush(&mut self) -> io::Result<()> {
        self.dest.flush()
    }

    pub fn get_ref(&self) -> &W {
        &self.dest
    }

    pub fn into_inner(self) -> W {
        self.dest
    }
}

impl WriteLogWriter<BufWriter<fs::File>> {
    /// Opens a WriteLog for writing. Truncates a file if append == false.
    pub fn new_to_file<P: AsRef<Path>>(file: P,
                                       append: bool,
                                       buffer: usize)
                                       -> io::Result<WriteLogWriter<BufWriter<fs::File>>> {
        fs::OpenOptions::new()
            .create(true)
            .write(true)
            .append(append)
            .truncate(!append)
            .open(file)
            .map(move |f| WriteLogWriter::new(BufWriter::with_capacity(buffer, f)))
    }
}

/// A Reader for WriteLog files. (more information on WriteLog files is to
/// be found above at WriteLogWriter).
pub struct WriteLogReader<R: Read> {
    src: R,
    entries_read: u64,
    bytes_read: u64,
}

impl<R: Read> WriteLogReader<R> {
    pub fn new(src: R) -> WriteLogReader<R> {
        WriteLogReader {
            src,
            entries_read: 0,
            bytes_read: 0,
        }
    }

    /// Return how many (entries,bytes) have been read.
    pub fn stats(&self) -> (u64, u64) {
        (self.entries_read, self.bytes_read)
    }

    /// Fills buf completely. Returns false if the source was already at EOF, and
    /// InvalidData if it ended after some but not all bytes.
    fn read_bytes(&mut self, buf: &mut [u8]) -> io::Result<bool> {
        let mut off = 0;
        while off < buf.len() {
            match self.src.read(&mut buf[off..]) {
                Ok(0) => {
                    if off == 0 {
                        return Ok(false);
                    }
                    return Err(io::Error::new(io::ErrorKind::InvalidData,
                                              "WriteLog entry is truncated"));
                }
                Ok(s) => off += s,
                Err(ref e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        }
        self.bytes_read += off as u64;
        Ok(true)
    }

    /// Reads the next entry. Returns None at a clean end of the stream.
    pub fn read_entry(&mut self) -> io::Result<Option<Vec<u8>>> {
        let mut lengthbuf = [0; 4];

        if !self.read_bytes(&mut lengthbuf)? {
            return Ok(None);
        }

        // The prefix may be garbage; only allocate what the source actually delivers.
        let length = u64::from(decode_u32(lengthbuf));
        let mut buffer = Vec::new();
        let n = (&mut self.src).take(length).read_to_end(&mut buffer)? as u64;

        if n < length {
            return Err(io::Error::new(io::ErrorKind::InvalidData,
                                      "WriteLog entry is missing its payload"));
        }
        self.bytes_read += n;
        self.entries_read += 1;
        Ok(Some(buffer))
    }
}

impl WriteLogReader<io::BufReader<fs::File>> {
    pub fn new_from_file<P: AsRef<Path>>(file: P) -> io::Result<WriteLogReader<io::BufReader<fs::File>>> {
        fs::OpenOptions::new()
            .read(true)
            .open(file)
            .map(move |f| WriteLogReader::new(io::BufReader::new(f)))
    }
}

#[cfg(test)]
mod test {
    use super::{decode_u32, encode_u32};
    use super::{WriteLogReader, WriteLogWriter};
    use std::io;

    #[test]
    fn test_u32_encoder() {
        let testvals = [0, 1, 2, 31, 199, 100000, 111111, 3000000, 4100000000];

        for val in testvals.iter() {
            assert_eq!(decode_u32(encode_u32(*val)), *val);
        }
        assert_eq!(encode_u32(258), [0, 0, 1, 2]);
    }

    #[test]
    fn test_write() {
        let mut w = WriteLogWriter::new(Vec::new());

        w.write_entry(b"abc").unwrap();
        w.write_entry(b"def").unwrap();

        assert_eq!(w.stats(), (2 * (4 + 3), 2));
        assert_eq!(&w.into_inner()[0..7], &[0, 0, 0, 3, b'a', b'b', b'c']);
    }

    #[test]
    fn test_write_read_file() {
        let dir = tempfile::tempdir().unwrap();
        let filename = dir.path().join("writelog_test.wlg");
        {
            let mut w = WriteLogWriter::new_to_file(&filename, false, 1024).unwrap();
            w.write_entry(b"abc").unwrap();
            w.write_entry(b"").unwrap();
            w.write_entry(b"line\nbreak \"quoted\"").unwrap();
            w.flush().unwrap();
        }
        let mut r = WriteLogReader::new_from_file(&filename).unwrap();
        assert_eq!(r.read_entry().unwrap(), Some(b"abc".to_vec()));
        assert_eq!(r.read_entry().unwrap(), Some(Vec::new()));
        assert_eq!(r.read_entry().unwrap(), Some(b"line\nbreak \"quoted\"".to_vec()));
        assert_eq!(r.read_entry().unwrap(), None);
        assert_eq!(r.stats().0, 3);
    }

    #[test]
    fn test_truncate_on_open() {
        let dir = tempfile::tempdir().unwrap();
        let filename = dir.path().join("trunc.wlg");
        for payload in [&b"a much longer first payload"[..], &b"short"[..]].iter() {
            let mut w = WriteLogWriter::new_to_file(&filename, false, 16).unwrap();
            w.write_entry(payload).unwrap();
            w.flush().unwrap();
        }
        let mut r = WriteLogReader::new_from_file(&filename).unwrap();
        assert_eq!(r.read_entry().unwrap(), Some(b"short".to_vec()));
        assert_eq!(r.read_entry().unwrap(), None);
    }

    #[test]
    fn test_truncated_entry() {
        let mut w = WriteLogWriter::new(Vec::new());
        w.write_entry(b"abcdef").unwrap();
        let mut bytes = w.into_inner();
        bytes.truncate(7);

        let mut r = WriteLogReader::new(io::Cursor::new(bytes));
        let e = r.read_entry().unwrap_err();
        assert_eq!(e.kind(), io::ErrorKind::InvalidData);

        let mut r = WriteLogReader::new(io::Cursor::new(vec![0, 0]));
        assert_eq!(r.read_entry().unwrap_err().kind(), io::ErrorKind::InvalidData);
    }

    #[test]
    fn test_corrupt_length_prefix() {
        let mut r = WriteLogReader::new(io::Cursor::new(vec![0xff, 0xff, 0xff, 0xff, b'a', b'b', b'c']));
        assert_eq!(r.read_entry().unwrap_err().kind(), io::ErrorKind::InvalidData);
        assert_eq!(r.stats().0, 0);
    }
}
