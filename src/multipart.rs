use std::convert::Infallible;
use std::future::Future;

use bytes::Bytes;
use futures_util::future;
use futures_util::stream::{BoxStream, Stream, StreamExt, TryStreamExt};
#[cfg(feature = "tokio-io")]
use tokio::io::AsyncRead;
#[cfg(feature = "tokio-io")]
use tokio_util::io::ReaderStream;

use crate::buffer::ByteBuffer;
use crate::constants;
use crate::error::BoxError;
use crate::helpers;
use crate::part::{Part, PendingPart};
use crate::state::StreamingStage;

/// A streaming decoder for `multipart/form-data` formatted data.
///
/// This consumes a [`Stream`](futures_util::stream::Stream) of byte chunks
/// plus the boundary token, and hands each completed [`Part`] to an async
/// callback, in stream order. Only the unconsumed tail of the stream and the
/// part currently being read are held in memory, so a decode is bounded by
/// the largest single part, never the whole message.
///
/// The decode never reads further bytes while a part callback is pending,
/// and never yields two parts concurrently.
///
/// # Examples
///
/// ```
/// use bytes::Bytes;
/// use formpart::MultipartReader;
/// use futures_util::stream::once;
/// use std::convert::Infallible;
///
/// # async fn run() {
/// let data = "--X-BOUNDARY\r\nContent-Disposition: form-data; name=\"my_text_field\"\r\n\r\nabcd\r\n--X-BOUNDARY--\r\n";
/// let stream = once(async move { Result::<Bytes, Infallible>::Ok(Bytes::from(data)) });
///
/// MultipartReader::new(stream, "X-BOUNDARY")
///     .for_each_part(|part| {
///         println!("part {:?}: {:?}", part.name(), part.text());
///         async { Ok::<_, Infallible>(()) }
///     })
///     .await
///     .unwrap();
/// # }
/// # tokio::runtime::Runtime::new().unwrap().block_on(run());
/// ```
pub struct MultipartReader<'r> {
    stream: BoxStream<'r, crate::Result<Bytes>>,
    buffer: ByteBuffer,
    divider: Bytes,
    closer: Bytes,
    stage: StreamingStage,
    pending: Option<PendingPart>,
    next_part_idx: usize,
}

impl<'r> MultipartReader<'r> {
    /// Constructs a new `MultipartReader` from a [`Bytes`] chunk stream and
    /// the boundary token (without the leading `--`; see
    /// [`parse_boundary`](crate::parse_boundary)).
    pub fn new<S, O, E, B>(stream: S, boundary: B) -> MultipartReader<'r>
    where
        S: Stream<Item = Result<O, E>> + Send + 'r,
        O: Into<Bytes> + 'r,
        E: Into<Box<dyn std::error::Error + Send + Sync>> + 'r,
        B: AsRef<str>,
    {
        let stream = stream
            .map_ok(|b| b.into())
            .map_err(|err| crate::Error::StreamReadFailed(err.into()))
            .boxed();

        let divider = format!("{}{}{}", constants::CRLF, constants::BOUNDARY_EXT, boundary.as_ref());
        let closer = format!("{}{}", divider, constants::BOUNDARY_EXT);

        // The divider pattern starts with a CRLF, but the first boundary
        // line of a message is not preceded by one. Seeding the buffer keeps
        // the first boundary recognizable by the same search.
        let mut buffer = ByteBuffer::new();
        buffer.append(constants::CRLF.as_bytes());

        MultipartReader {
            stream,
            buffer,
            divider: Bytes::from(divider),
            closer: Bytes::from(closer),
            stage: StreamingStage::FindingFirstBoundary,
            pending: None,
            next_part_idx: 0,
        }
    }

    /// Constructs a new `MultipartReader` from an
    /// [`AsyncRead`](tokio::io::AsyncRead) reader and the boundary token.
    ///
    /// # Optional
    ///
    /// This requires the optional `tokio-io` feature to be enabled.
    #[cfg(feature = "tokio-io")]
    #[cfg_attr(nightly, doc(cfg(feature = "tokio-io")))]
    pub fn with_reader<R, B>(reader: R, boundary: B) -> MultipartReader<'r>
    where
        R: AsyncRead + Send + 'r,
        B: AsRef<str>,
    {
        let stream = ReaderStream::new(reader);
        MultipartReader::new(stream, boundary)
    }

    /// Runs the decode to completion, invoking `on_part` once per completed
    /// part, strictly in stream order.
    ///
    /// The handler's future is awaited before any further bytes are read,
    /// so a slow consumer backpressures the decode. An error returned from
    /// the handler aborts the decode immediately and surfaces as
    /// [`Error::PartHandlerFailed`](crate::Error::PartHandlerFailed).
    pub async fn for_each_part<F, Fut, E>(mut self, mut on_part: F) -> crate::Result<()>
    where
        F: FnMut(Part) -> Fut,
        Fut: Future<Output = Result<(), E>>,
        E: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        loop {
            match self.stage {
                StreamingStage::FindingFirstBoundary => self.find_first_boundary().await?,
                StreamingStage::ReadingBoundary => {
                    if let Some(part) = self.read_boundary()? {
                        dispatch(&mut on_part, part).await?;
                    }
                }
                StreamingStage::ReadingTransportPadding => self.read_transport_padding().await?,
                StreamingStage::ReadingFieldHeaders => self.read_field_headers().await?,
                StreamingStage::ReadingFieldData => self.read_field_data().await?,
                StreamingStage::ReadingCloser => {
                    if let Some(part) = self.read_closer()? {
                        dispatch(&mut on_part, part).await?;
                    }
                }
                StreamingStage::DrainingEpilogue => {
                    // Anything after the closer is ignorable by definition.
                    while self.stream.try_next().await?.is_some() {}
                    return Ok(());
                }
            }
        }
    }

    /// Collects every part into a `Vec`, in stream order.
    pub async fn into_parts(self) -> crate::Result<Vec<Part>> {
        let mut parts = Vec::new();

        self.for_each_part(|part| {
            parts.push(part);
            future::ok::<_, Infallible>(())
        })
        .await?;

        Ok(parts)
    }

    /// Discard bytes until the first divider shows up. Content before it is
    /// preamble, which the format defines as ignorable.
    async fn find_first_boundary(&mut self) -> crate::Result<()> {
        match self.buffer.index_of(&self.divider, 0) {
            Some(pos) => {
                drop(self.buffer.pull(pos));
                self.stage = self.classify_boundary().await?;
            }
            None => {
                drop(self.take_boundary_free_bytes());

                if !self.fill_buffer().await? {
                    return Err(crate::Error::IncompleteStream);
                }
            }
        }

        Ok(())
    }

    /// Consume the divider at the buffer front. The part it terminates
    /// completes here, one delimiter late: a part's end is only known once
    /// the next boundary is found.
    fn read_boundary(&mut self) -> crate::Result<Option<Part>> {
        let divider = self.buffer.pull(self.divider.len());
        if divider != self.divider {
            return Err(crate::Error::BoundaryMismatch);
        }

        let finished = self.finish_pending()?;

        self.pending = Some(PendingPart::new());
        self.stage = StreamingStage::ReadingTransportPadding;

        Ok(finished)
    }

    /// The rest of a boundary line, up to its CRLF, may only hold spaces.
    async fn read_transport_padding(&mut self) -> crate::Result<()> {
        match self.buffer.index_of(constants::CRLF.as_bytes(), 0) {
            Some(pos) => {
                let padding = self.buffer.pull(pos);
                if let Some(byte) = padding.iter().copied().find(|&byte| byte != b' ') {
                    return Err(crate::Error::InvalidTransportPadding { byte });
                }

                drop(self.buffer.pull(constants::CRLF.len()));
                self.stage = StreamingStage::ReadingFieldHeaders;
            }
            None => {
                if !self.fill_buffer().await? {
                    return Err(crate::Error::IncompleteStream);
                }
            }
        }

        Ok(())
    }

    /// Consume the header block once its terminating blank line is buffered,
    /// and capture the metadata of the part being read.
    async fn read_field_headers(&mut self) -> crate::Result<()> {
        let pos = match self.buffer.index_of(constants::CRLF_CRLF.as_bytes(), 0) {
            Some(pos) => pos,
            None => {
                return if self.fill_buffer().await? {
                    Ok(())
                } else {
                    Err(crate::Error::IncompleteStream)
                };
            }
        };

        // httparse wants the blank line that terminates the block.
        let header_bytes = self.buffer.pull(pos + constants::CRLF_CRLF.len());

        let mut headers = [httparse::EMPTY_HEADER; constants::MAX_HEADERS];

        let headers = match httparse::parse_headers(&header_bytes, &mut headers) {
            Ok(httparse::Status::Complete((_, raw_headers))) => {
                helpers::convert_raw_headers_to_header_map(raw_headers)?
            }
            Ok(httparse::Status::Partial) => return Err(crate::Error::IncompleteHeaders),
            Err(err) => return Err(crate::Error::ReadHeaderFailed(err)),
        };

        match self.pending.as_mut() {
            Some(pending) => pending.apply_headers(headers),
            None => return Err(crate::Error::InconsistentState),
        }

        self.stage = StreamingStage::ReadingFieldData;

        Ok(())
    }

    /// Accumulate body bytes until the part's terminating boundary is found.
    async fn read_field_data(&mut self) -> crate::Result<()> {
        match self.buffer.index_of(&self.divider, 0) {
            Some(pos) => {
                let body = self.buffer.pull(pos);
                match self.pending.as_mut() {
                    Some(pending) => pending.append_body(&body),
                    None => return Err(crate::Error::InconsistentState),
                }

                self.stage = self.classify_boundary().await?;
            }
            None => {
                let body = self.take_boundary_free_bytes();
                match self.pending.as_mut() {
                    Some(pending) => pending.append_body(&body),
                    None => return Err(crate::Error::InconsistentState),
                }

                if !self.fill_buffer().await? {
                    return Err(crate::Error::IncompleteStream);
                }
            }
        }

        Ok(())
    }

    /// Consume the closer and complete the final part.
    fn read_closer(&mut self) -> crate::Result<Option<Part>> {
        let closer = self.buffer.pull(self.closer.len());
        if closer != self.closer {
            return Err(crate::Error::BoundaryMismatch);
        }

        let finished = self.finish_pending()?;

        self.stage = StreamingStage::DrainingEpilogue;

        Ok(finished)
    }

    /// Decide whether the divider at the buffer front is a plain divider or
    /// the closer. The divider is a strict prefix of the closer, so the
    /// deciding `--` may still be in flight; keep reading until enough bytes
    /// are buffered to tell the two apart, or the stream ends.
    async fn classify_boundary(&mut self) -> crate::Result<StreamingStage> {
        while self.buffer.len() < self.closer.len() {
            if !self.fill_buffer().await? {
                break;
            }
        }

        if self.buffer.starts_with(&self.closer) {
            Ok(StreamingStage::ReadingCloser)
        } else {
            Ok(StreamingStage::ReadingBoundary)
        }
    }

    /// Removes the buffered bytes that can no longer open a divider. The
    /// last buffered CR could be the start of a divider split across chunk
    /// reads, so everything from it onward stays put.
    fn take_boundary_free_bytes(&mut self) -> Bytes {
        if self.buffer.is_empty() {
            return Bytes::new();
        }

        match self.buffer.rfind_byte(b'\r') {
            Some(pos) => self.buffer.pull(pos),
            None => self.buffer.pull(self.buffer.len()),
        }
    }

    fn finish_pending(&mut self) -> crate::Result<Option<Part>> {
        match self.pending.take() {
            Some(pending) => {
                let part = pending.finish(self.next_part_idx)?;
                self.next_part_idx += 1;
                Ok(Some(part))
            }
            None => Ok(None),
        }
    }

    /// Appends the next upstream chunk to the buffer. Returns `false` once
    /// the stream is exhausted.
    async fn fill_buffer(&mut self) -> crate::Result<bool> {
        match self.stream.try_next().await? {
            Some(chunk) => {
                self.buffer.append(&chunk);
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

async fn dispatch<F, Fut, E>(on_part: &mut F, part: Part) -> crate::Result<()>
where
    F: FnMut(Part) -> Fut,
    Fut: Future<Output = Result<(), E>>,
    E: Into<BoxError>,
{
    #[cfg(feature = "log")]
    log::trace!("part {} complete (name: {:?})", part.index(), part.name());

    on_part(part).await.map_err(|err| crate::Error::PartHandlerFailed(err.into()))
}
