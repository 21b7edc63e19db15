use bytes::BytesMut;
use std::sync::Arc;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite};

use crate::http::parser::{ParseError, parse_http_request};
use crate::http::request::Request;
use crate::http::response::Response;
use crate::http::writer::ResponseWriter;
use crate::server::gateway::Gateway;

const READ_CHUNK: usize = 4096;

pub struct Connection<S> {
    stream: S,
    buffer: BytesMut,
    gateway: Arc<Gateway>,
    state: ConnectionState,
}

pub enum ConnectionState {
    Reading,
    Processing(Request),
    Writing(ResponseWriter, bool), // bool = keep_alive?
    Closed,
}

impl<S> Connection<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    pub fn new(stream: S, gateway: Arc<Gateway>) -> Self {
        Self {
            stream,
            buffer: BytesMut::with_capacity(READ_CHUNK),
            gateway,
            state: ConnectionState::Reading,
        }
    }

    pub async fn run(&mut self) -> anyhow::Result<()> {
        loop {
            let state = std::mem::replace(&mut self.state, ConnectionState::Closed);
            self.state = match state {
                ConnectionState::Reading => match self.read_request().await {
                    Ok(Some(req)) => ConnectionState::Processing(req),
                    Ok(None) => ConnectionState::Closed,
                    Err(e) => {
                        // Answer once, then drop the connection
                        tracing::debug!(error = ?e, "Rejecting malformed request");
                        let response = match e {
                            ParseError::BodyTooLarge => Response::payload_too_large(),
                            _ => Response::bad_request(),
                        };
                        let writer = ResponseWriter::new(&response);
                        ConnectionState::Writing(writer, false)
                    }
                },

                ConnectionState::Processing(req) => {
                    let response = self.gateway.respond(&req).await;
                    ConnectionState::Writing(ResponseWriter::new(&response), req.keep_alive())
                }

                ConnectionState::Writing(mut writer, keep_alive) => {
                    writer.write_to_stream(&mut self.stream).await?;
                    if keep_alive {
                        ConnectionState::Reading
                    } else {
                        ConnectionState::Closed
                    }
                }

                ConnectionState::Closed => break,
            };
        }

        Ok(())
    }

    /// Read until a complete request is buffered.
    ///
    /// `Ok(None)` means the client closed the connection.
    pub async fn read_request(&mut self) -> Result<Option<Request>, ParseError> {
        loop {
            match parse_http_request(&self.buffer) {
                Ok((request, consumed)) => {
                    let _ = self.buffer.split_to(consumed);
                    return Ok(Some(request));
                }
                Err(ParseError::Incomplete) => {}
                Err(e) => return Err(e),
            }

            self.buffer.reserve(READ_CHUNK);
            let n = match self.stream.read_buf(&mut self.buffer).await {
                Ok(n) => n,
                Err(e) => {
                    tracing::debug!(error = %e, "Read error");
                    return Ok(None);
                }
            };

            if n == 0 {
                return Ok(None);
            }
        }
    }
}
