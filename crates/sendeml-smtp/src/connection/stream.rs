//! Low-level SMTP stream handling.

use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tokio::time::timeout;

use crate::error::{Error, Result};

/// Byte stream an SMTP session can run over.
pub trait Transport: AsyncRead + AsyncWrite + Unpin + Send {}

impl<T: AsyncRead + AsyncWrite + Unpin + Send> Transport for T {}

/// Buffered SMTP stream with a bounded read time.
#[derive(Debug)]
pub struct SmtpStream<T = TcpStream> {
    inner: BufReader<T>,
    read_timeout: Duration,
}

impl<T: Transport> SmtpStream<T> {
    /// Wraps a connected transport.
    pub fn new(stream: T, read_timeout: Duration) -> Self {
        Self {
            inner: BufReader::new(stream),
            read_timeout,
        }
    }

    /// Reads one line, stripped of surrounding white space and CRLF.
    ///
    /// Bytes that are not UTF-8 are replaced rather than rejected.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Timeout`] if no full line arrives in time and
    /// [`Error::ConnectionClosed`] at end of stream.
    pub async fn read_line(&mut self) -> Result<String> {
        let mut buf = Vec::new();
        let n = timeout(self.read_timeout, self.inner.read_until(b'\n', &mut buf))
            .await
            .map_err(|_| Error::Timeout(self.read_timeout))??;
        if n == 0 {
            return Err(Error::ConnectionClosed);
        }
        Ok(String::from_utf8_lossy(&buf).trim().to_string())
    }

    /// Writes data to the stream and flushes it.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    pub async fn write_all(&mut self, data: &[u8]) -> Result<()> {
        let writer = self.inner.get_mut();
        writer.write_all(data).await?;
        writer.flush().await?;
        Ok(())
    }

    /// Returns the underlying transport.
    pub fn into_inner(self) -> T {
        self.inner.into_inner()
    }
}

/// Connects to an SMTP server over plain TCP.
///
/// # Errors
///
/// Returns [`Error::Connect`] if the connection fails or takes longer than
/// `connect_timeout`.
pub async fn connect(
    hostname: &str,
    port: u16,
    connect_timeout: Duration,
    read_timeout: Duration,
) -> Result<SmtpStream> {
    let addr = format!("{hostname}:{port}");
    let stream = match timeout(connect_timeout, TcpStream::connect(&addr)).await {
        Ok(Ok(stream)) => stream,
        Ok(Err(source)) => return Err(Error::Connect { addr, source }),
        Err(_) => {
            return Err(Error::Connect {
                addr,
                source: std::io::ErrorKind::TimedOut.into(),
            });
        }
    };
    Ok(SmtpStream::new(stream, read_timeout))
}
