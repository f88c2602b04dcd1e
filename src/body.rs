use std::{
    fmt,
    io::{self, Read, Seek, SeekFrom},
};

/// Seek origin passed through to a [`BodySeeker`].
///
/// The value is opaque to the retry engine: whatever the caller configured is
/// forwarded verbatim. Only [`Seekable`] interprets it, mapping the three
/// conventional origins onto [`SeekFrom`].
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub struct Whence(pub i32);

impl Whence {
    pub const START: Whence = Whence(0);
    pub const CURRENT: Whence = Whence(1);
    pub const END: Whence = Whence(2);
}

/// Position a seekable body is rewound to before a retried attempt.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct SeekParams {
    pub offset: i64,
    pub whence: Whence,
}

impl SeekParams {
    pub const fn new(offset: i64, whence: Whence) -> Self {
        Self { offset, whence }
    }

    /// Start of the body.
    pub const fn start() -> Self {
        Self::new(0, Whence::START)
    }
}

/// Optional seek capability of a streaming body.
pub trait BodySeeker {
    fn seek(&mut self, offset: i64, whence: Whence) -> io::Result<u64>;
}

/// Streaming request body.
///
/// A reader that can be repositioned exposes it through [`BodyReader::seeker`];
/// readers that cannot are retried from wherever the previous attempt left them.
pub trait BodyReader: Read + Send {
    fn seeker(&mut self) -> Option<&mut dyn BodySeeker> {
        None
    }
}

/// Adapts any `Read + Seek` value into a seekable [`BodyReader`].
#[derive(Debug)]
pub struct Seekable<R>(pub R);

impl<R: Read> Read for Seekable<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.0.read(buf)
    }
}

impl<R: Seek> BodySeeker for Seekable<R> {
    fn seek(&mut self, offset: i64, whence: Whence) -> io::Result<u64> {
        let from = match whence {
            Whence::START => {
                let offset = u64::try_from(offset).map_err(|_| {
                    io::Error::new(
                        io::ErrorKind::InvalidInput,
                        format!("negative offset {offset} from start"),
                    )
                })?;
                SeekFrom::Start(offset)
            }
            Whence::CURRENT => SeekFrom::Current(offset),
            Whence::END => SeekFrom::End(offset),
            Whence(other) => {
                return Err(io::Error::new(
                    io::ErrorKind::InvalidInput,
                    format!("unsupported whence {other}"),
                ))
            }
        };
        self.0.seek(from)
    }
}

impl<R: Read + Seek + Send> BodyReader for Seekable<R> {
    fn seeker(&mut self) -> Option<&mut dyn BodySeeker> {
        Some(self)
    }
}

/// Adapts a plain `Read` value into a non-seekable [`BodyReader`].
#[derive(Debug)]
pub struct Streamed<R>(pub R);

impl<R: Read> Read for Streamed<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.0.read(buf)
    }
}

impl<R: Read + Send> BodyReader for Streamed<R> {}

/// Request payload.
#[derive(Default)]
pub enum Body {
    #[default]
    Empty,
    /// In-memory payload, replayed unchanged on every attempt.
    Bytes(Vec<u8>),
    /// Streaming payload, consumed by each attempt.
    Reader(Box<dyn BodyReader>),
}

impl Body {
    pub fn bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self::Bytes(bytes.into())
    }

    /// Streaming body that can be rewound between attempts.
    pub fn seekable<R>(reader: R) -> Self
    where
        R: Read + Seek + Send + 'static,
    {
        Self::Reader(Box::new(Seekable(reader)))
    }

    /// Streaming body that cannot be rewound.
    pub fn reader<R>(reader: R) -> Self
    where
        R: Read + Send + 'static,
    {
        Self::Reader(Box::new(Streamed(reader)))
    }

    /// Wraps a custom [`BodyReader`].
    pub fn from_reader<R: BodyReader + 'static>(reader: R) -> Self {
        Self::Reader(Box::new(reader))
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Self::Empty => true,
            Self::Bytes(bytes) => bytes.is_empty(),
            Self::Reader(_) => false,
        }
    }

    /// Returns the seek capability of a streaming body, if it has one.
    pub fn seeker(&mut self) -> Option<&mut dyn BodySeeker> {
        match self {
            Self::Reader(reader) => reader.seeker(),
            _ => None,
        }
    }

    /// Reads the payload for one attempt.
    ///
    /// Streaming bodies are read from their current position to the end.
    pub fn to_vec(&mut self) -> io::Result<Vec<u8>> {
        match self {
            Self::Empty => Ok(Vec::new()),
            Self::Bytes(bytes) => Ok(bytes.clone()),
            Self::Reader(reader) => {
                let mut buf = Vec::new();
                reader.read_to_end(&mut buf)?;
                Ok(buf)
            }
        }
    }
}

impl fmt::Debug for Body {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => f.write_str("Empty"),
            Self::Bytes(bytes) => f.debug_tuple("Bytes").field(&bytes.len()).finish(),
            Self::Reader(_) => f.write_str("Reader(..)"),
        }
    }
}

impl From<Vec<u8>> for Body {
    fn from(bytes: Vec<u8>) -> Self {
        Self::Bytes(bytes)
    }
}

impl From<String> for Body {
    fn from(text: String) -> Self {
        Self::Bytes(text.into_bytes())
    }
}

impl From<&'static str> for Body {
    fn from(text: &'static str) -> Self {
        Self::Bytes(text.as_bytes().to_vec())
    }
}

#[cfg(test)]
mod tests {
    use std::io::{Cursor, Read};

    use super::{Body, SeekParams, Whence};

    #[test]
    fn seekable_body_rewinds_to_start() {
        let mut body = Body::seekable(Cursor::new(b"payload".to_vec()));
        assert_eq!(body.to_vec().expect("first read"), b"payload");
        assert!(body.to_vec().expect("drained read").is_empty());

        let params = SeekParams::start();
        body.seeker()
            .expect("cursor is seekable")
            .seek(params.offset, params.whence)
            .expect("seek must succeed");
        assert_eq!(body.to_vec().expect("replayed read"), b"payload");
    }

    #[test]
    fn seekable_body_supports_relative_origins() {
        let mut body = Body::seekable(Cursor::new(b"0123456789".to_vec()));
        let seeker = body.seeker().expect("cursor is seekable");
        assert_eq!(seeker.seek(-3, Whence::END).expect("seek from end"), 7);
        assert_eq!(seeker.seek(-2, Whence::CURRENT).expect("seek back"), 5);
        assert_eq!(body.to_vec().expect("tail"), b"56789");
    }

    #[test]
    fn unknown_whence_is_rejected_by_std_adapter() {
        let mut body = Body::seekable(Cursor::new(Vec::new()));
        let err = body
            .seeker()
            .expect("cursor is seekable")
            .seek(13, Whence(37))
            .expect_err("whence 37 has no std mapping");
        assert_eq!(err.kind(), std::io::ErrorKind::InvalidInput);
    }

    #[test]
    fn plain_reader_has_no_seeker() {
        let mut body = Body::reader(Cursor::new(b"abc".to_vec()).take(2));
        assert!(body.seeker().is_none());
        assert_eq!(body.to_vec().expect("read"), b"ab");
    }

    #[test]
    fn bytes_body_replays_unchanged() {
        let mut body = Body::from("hello");
        assert!(body.seeker().is_none());
        assert_eq!(body.to_vec().expect("first"), b"hello");
        assert_eq!(body.to_vec().expect("second"), b"hello");
    }
}
