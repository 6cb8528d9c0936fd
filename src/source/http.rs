//! NDJSON-over-HTTP stream source implementation.
//!
//! This module shows how to implement the [`StreamSource`] trait for a
//! concrete transport.  The article service exposes one server-streaming
//! endpoint: a GET against `{endpoint}/articles/stream` whose body stays
//! open and carries one JSON [`ListResponse`] per line until the server
//! closes the connection.
//!
//! ## For contributors
//!
//! Line handling rules, in order:
//!
//! * blank line — keepalive, skipped silently;
//! * well-formed `ListResponse` — one `Batch` event (possibly empty);
//! * anything else — one `Status` event describing the parse failure, then
//!   the stream continues.  Malformed frames are a transport anomaly, never
//!   a fault surfaced to the rest of the client.

use std::io::{BufRead, BufReader, Lines, Read};

use anyhow::Result;

use super::{ListResponse, StreamEvent, StreamStatus};

/// An NDJSON stream source backed by the article service's HTTP endpoint.
pub struct HttpSource {
    /// Base endpoint of the service (e.g. `http://localhost:8080`).
    pub endpoint: String,
    /// A human-readable label shown in the status bar.
    pub label: String,
}

impl HttpSource {
    /// Create a new HTTP stream source.
    ///
    /// # Arguments
    ///
    /// * `endpoint` — base URL of the article service; the streaming path
    ///   `/articles/stream` is appended.
    /// * `label` — short name displayed in the TUI for this source.
    pub fn new(endpoint: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            label: label.into(),
        }
    }

    fn stream_url(&self) -> String {
        format!("{}/articles/stream", self.endpoint.trim_end_matches('/'))
    }

    /// Decode one NDJSON line into a stream event.
    ///
    /// This is a pure function (no I/O) so that tests can exercise the
    /// decoding rules without a live server.  Returns `None` for blank
    /// keepalive lines.
    pub fn decode_line(line: &str) -> Option<StreamEvent> {
        let line = line.trim();
        if line.is_empty() {
            return None;
        }
        match serde_json::from_str::<ListResponse>(line) {
            Ok(resp) => Some(StreamEvent::Batch(resp.articles)),
            Err(e) => Some(StreamEvent::Status(StreamStatus {
                code: 0,
                detail: format!("skipped malformed frame: {e}"),
            })),
        }
    }
}

impl super::StreamSource for HttpSource {
    fn name(&self) -> &str {
        &self.label
    }

    fn open(&self) -> Result<Box<dyn Iterator<Item = StreamEvent> + Send>> {
        // The default blocking client times out after 30 s, which would cut
        // a long-lived stream short.
        let client = reqwest::blocking::Client::builder().timeout(None).build()?;
        let resp = client.get(self.stream_url()).send()?;

        let connect_status = StreamStatus {
            code: resp.status().as_u16(),
            detail: format!("connected to {}", self.stream_url()),
        };

        Ok(Box::new(EventIter {
            connect_status: Some(connect_status),
            lines: BufReader::new(resp).lines(),
        }))
    }
}

/// Blocking iterator over the events of one open HTTP stream.
///
/// Yields the connect status first, then one event per NDJSON line.  Ends
/// (returns `None`) when the body closes or the connection drops; the
/// subscription layer turns that into the terminal event.
struct EventIter<R: Read> {
    connect_status: Option<StreamStatus>,
    lines: Lines<BufReader<R>>,
}

impl<R: Read> Iterator for EventIter<R> {
    type Item = StreamEvent;

    fn next(&mut self) -> Option<StreamEvent> {
        if let Some(status) = self.connect_status.take() {
            return Some(StreamEvent::Status(status));
        }
        loop {
            match self.lines.next() {
                // A read error means the transport is gone; stop iterating
                // rather than distinguishing it from a clean close.
                None | Some(Err(_)) => return None,
                Some(Ok(line)) => {
                    if let Some(ev) = HttpSource::decode_line(&line) {
                        return Some(ev);
                    }
                    // Blank keepalive line; keep reading.
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_line_parses_batch() {
        let ev = HttpSource::decode_line(
            r#"{"articles":[{"id":1,"title":"A"},{"id":2,"title":"B"}]}"#,
        )
        .unwrap();
        match ev {
            StreamEvent::Batch(items) => {
                assert_eq!(items.len(), 2);
                assert_eq!(items[0].id, 1);
                assert_eq!(items[1].title, "B");
            }
            other => panic!("expected batch, got {other:?}"),
        }
    }

    #[test]
    fn decode_line_accepts_empty_batch() {
        let ev = HttpSource::decode_line(r#"{"articles":[]}"#).unwrap();
        assert_eq!(ev, StreamEvent::Batch(vec![]));
    }

    #[test]
    fn decode_line_skips_blank_keepalive() {
        assert!(HttpSource::decode_line("").is_none());
        assert!(HttpSource::decode_line("   ").is_none());
    }

    #[test]
    fn decode_line_turns_garbage_into_status() {
        let ev = HttpSource::decode_line("not json at all").unwrap();
        match ev {
            StreamEvent::Status(s) => assert!(s.detail.contains("malformed")),
            other => panic!("expected status, got {other:?}"),
        }
    }

    #[test]
    fn event_iter_yields_connect_status_first() {
        let body = "{\"articles\":[{\"id\":1,\"title\":\"A\"}]}\n\n{\"articles\":[]}\n";
        let mut iter = EventIter {
            connect_status: Some(StreamStatus {
                code: 200,
                detail: "connected".into(),
            }),
            lines: BufReader::new(body.as_bytes()).lines(),
        };

        assert!(matches!(iter.next(), Some(StreamEvent::Status(s)) if s.code == 200));
        assert!(matches!(iter.next(), Some(StreamEvent::Batch(b)) if b.len() == 1));
        // Blank keepalive line was skipped, next frame is the empty batch.
        assert!(matches!(iter.next(), Some(StreamEvent::Batch(b)) if b.is_empty()));
        assert!(iter.next().is_none());
    }

    #[test]
    fn stream_url_handles_trailing_slash() {
        let src = HttpSource::new("http://localhost:8080/", "feed");
        assert_eq!(src.stream_url(), "http://localhost:8080/articles/stream");
    }

    #[test]
    fn name_returns_label() {
        let src = HttpSource::new("http://example.com", "My Service");
        use crate::source::StreamSource;
        assert_eq!(src.name(), "My Service");
    }
}
