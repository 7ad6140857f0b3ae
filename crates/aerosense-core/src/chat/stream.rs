//! `Stream` adapter from response body chunks to assistant updates.

use std::collections::VecDeque;
use std::pin::Pin;
use std::task::{Context, Poll};

use bytes::Bytes;
use futures_util::Stream;
use futures_util::stream::BoxStream;

use super::assembler::{AssistantUpdate, StreamAssembler};
use super::error::{ChatError, ChatResult};

/// Boxed stream of reply updates for one chat turn.
pub type UpdateStream = BoxStream<'static, ChatResult<AssistantUpdate>>;

/// Drives a [`StreamAssembler`] from a byte stream.
///
/// Ends after the completion sentinel without polling the body further, or
/// after the body ends and the leftover buffer has been flushed. A body error
/// is yielded once as a transport failure, then the stream ends.
pub struct AssistantStream<S> {
    inner: S,
    assembler: StreamAssembler,
    pending: VecDeque<AssistantUpdate>,
    terminated: bool,
}

impl<S> AssistantStream<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            assembler: StreamAssembler::new(),
            pending: VecDeque::new(),
            terminated: false,
        }
    }

    /// Reply text assembled so far.
    pub fn text(&self) -> &str {
        self.assembler.text()
    }
}

impl<S, E> Stream for AssistantStream<S>
where
    S: Stream<Item = std::result::Result<Bytes, E>> + Unpin,
    E: std::error::Error + Send + Sync + 'static,
{
    type Item = ChatResult<AssistantUpdate>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = &mut *self;

        loop {
            if let Some(update) = this.pending.pop_front() {
                return Poll::Ready(Some(Ok(update)));
            }
            if this.terminated {
                return Poll::Ready(None);
            }

            match Pin::new(&mut this.inner).poll_next(cx) {
                Poll::Ready(Some(Ok(chunk))) => {
                    this.pending.extend(this.assembler.push(&chunk));
                    if this.assembler.saw_done() {
                        tracing::debug!("chat stream reached completion sentinel");
                        this.terminated = true;
                    }
                }
                Poll::Ready(Some(Err(e))) => {
                    this.terminated = true;
                    return Poll::Ready(Some(Err(ChatError::transport(format!(
                        "Chat stream interrupted: {e}"
                    )))));
                }
                Poll::Ready(None) => {
                    this.pending.extend(this.assembler.finish());
                    this.terminated = true;
                }
                Poll::Pending => return Poll::Pending,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io;

    use futures_util::{StreamExt, stream};

    use super::*;
    use crate::chat::ChatErrorKind;

    fn chunks(parts: &[&str]) -> Vec<io::Result<Bytes>> {
        parts
            .iter()
            .map(|p| Ok(Bytes::copy_from_slice(p.as_bytes())))
            .collect()
    }

    #[tokio::test]
    async fn test_yields_updates_in_order() {
        let body = chunks(&[
            "data: {\"choices\":[{\"delta\":{\"content\":\"Hel\"}}]}\n",
            "data: {\"choices\":[{\"delta\":{\"content\":\"lo\"}}]}\ndata: [DONE]\n",
        ]);
        let updates: Vec<_> = AssistantStream::new(stream::iter(body)).collect().await;

        let texts: Vec<String> = updates.into_iter().map(|u| u.unwrap().text).collect();
        assert_eq!(texts, vec!["Hel", "Hello"]);
    }

    #[tokio::test]
    async fn test_stops_polling_after_sentinel() {
        let mut body = chunks(&["data: [DONE]\n"]);
        body.push(Err(io::Error::other("must not be read")));

        let updates: Vec<_> = AssistantStream::new(stream::iter(body)).collect().await;
        assert!(updates.is_empty());
    }

    #[tokio::test]
    async fn test_flushes_last_line_at_end_of_body() {
        let body = chunks(&["data: {\"choices\":[{\"delta\":{\"content\":\"tail\"}}]}"]);
        let mut stream = AssistantStream::new(stream::iter(body));

        let update = stream.next().await.unwrap().unwrap();
        assert_eq!(update.text, "tail");
        assert!(stream.next().await.is_none());
        assert_eq!(stream.text(), "tail");
    }

    #[tokio::test]
    async fn test_body_error_is_transport_failure() {
        let mut body = chunks(&["data: {\"choices\":[{\"delta\":{\"content\":\"par\"}}]}\n"]);
        body.push(Err(io::Error::new(io::ErrorKind::ConnectionReset, "reset")));
        body.extend(chunks(&["data: {\"choices\":[{\"delta\":{\"content\":\"tial\"}}]}\n"]));

        let mut stream = AssistantStream::new(stream::iter(body));
        assert_eq!(stream.next().await.unwrap().unwrap().text, "par");

        let err = stream.next().await.unwrap().unwrap_err();
        assert_eq!(err.kind, ChatErrorKind::Transport);
        assert!(err.message.contains("reset"));

        assert!(stream.next().await.is_none());
        assert_eq!(stream.text(), "par");
    }
}
