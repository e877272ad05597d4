//! Response body types
//!
//! Small responses are buffered, track files are streamed from disk.

use futures_util::TryStreamExt;
use http_body_util::combinators::BoxBody;
use http_body_util::{BodyExt, Full, StreamBody};
use hyper::body::{Bytes, Frame};
use tokio::io::AsyncRead;
use tokio_util::io::ReaderStream;

/// Body of every response the server sends
pub type ResponseBody = BoxBody<Bytes, std::io::Error>;

/// Buffered body
pub fn full(data: impl Into<Bytes>) -> ResponseBody {
    Full::new(data.into())
        .map_err(|never| match never {})
        .boxed()
}

pub fn empty() -> ResponseBody {
    full(Bytes::new())
}

/// Body streamed chunk by chunk from a reader, e.g. a file or a `take()` of one
pub fn stream<R>(reader: R) -> ResponseBody
where
    R: AsyncRead + Send + Sync + 'static,
{
    StreamBody::new(ReaderStream::new(reader).map_ok(Frame::data)).boxed()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::AsyncReadExt;

    #[tokio::test]
    async fn test_full_body_collects() {
        let bytes = full("hello").collect().await.unwrap().to_bytes();
        assert_eq!(bytes, "hello");
        assert!(empty().collect().await.unwrap().to_bytes().is_empty());
    }

    #[tokio::test]
    async fn test_stream_body_reads_limited_reader() {
        let data: &'static [u8] = b"0123456789";
        let bytes = stream(data.take(4)).collect().await.unwrap().to_bytes();
        assert_eq!(bytes, "0123");
    }
}
