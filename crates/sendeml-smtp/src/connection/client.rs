//! Type-state SMTP client.

use std::future::Future;
use std::marker::PhantomData;

use tokio::net::TcpStream;
use tracing::info;

use super::{SessionConfig, SmtpStream, Transport, stream};
use crate::command::Command;
use crate::error::{Error, Result};
use crate::parser::{is_last_reply_line, reply_code};
use crate::types::{Address, Reply};

/// Type-state marker for a connection whose greeting has been read.
#[derive(Debug)]
pub struct Connected;

/// Type-state marker for a session that accepted EHLO and has no open transaction.
#[derive(Debug)]
pub struct Ready;

/// Type-state marker for mail transaction started.
#[derive(Debug)]
pub struct MailTransaction;

/// Type-state marker for recipient added.
#[derive(Debug)]
pub struct RecipientAdded;

/// Type-state marker for data mode.
#[derive(Debug)]
pub struct Data;

/// Sends one command and waits for its final reply.
///
/// A negative final reply is an error, so callers only ever see positive
/// replies.
pub trait CommandSender {
    /// Writes `cmd` and reads until a final reply line arrives.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Rejected`] for a negative reply, or a connection error.
    fn send_command(&mut self, cmd: &Command) -> impl Future<Output = Result<Reply>> + Send;
}

/// SMTP client with type-state pattern.
#[derive(Debug)]
pub struct Client<State, T = TcpStream> {
    stream: SmtpStream<T>,
    config: SessionConfig,
    prefix: String,
    _state: PhantomData<State>,
}

impl<S, T> Client<S, T> {
    /// Returns the session configuration.
    #[must_use]
    pub const fn config(&self) -> &SessionConfig {
        &self.config
    }

    fn transition<N>(self) -> Client<N, T> {
        Client {
            stream: self.stream,
            config: self.config,
            prefix: self.prefix,
            _state: PhantomData,
        }
    }
}

impl Client<Connected> {
    /// Opens a TCP connection and reads the server greeting.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection fails or the greeting is negative.
    pub async fn connect(hostname: &str, port: u16, config: SessionConfig) -> Result<Self> {
        let stream = stream::connect(
            hostname,
            port,
            config.connect_timeout,
            config.read_timeout,
        )
        .await?;
        Self::from_stream(stream, config).await
    }
}

impl<T: Transport> Client<Connected, T> {
    /// Creates a client from a stream and reads the server greeting.
    ///
    /// # Errors
    ///
    /// Returns an error if reading the greeting fails or if the server returns an error.
    pub async fn from_stream(stream: SmtpStream<T>, config: SessionConfig) -> Result<Self> {
        let prefix = config.trace_prefix();
        let mut client = Self {
            stream,
            config,
            prefix,
            _state: PhantomData,
        };
        client.read_reply().await?;
        Ok(client)
    }

    /// Sends EHLO with the configured client hostname.
    ///
    /// # Errors
    ///
    /// Returns an error if the EHLO command fails.
    pub async fn ehlo(mut self) -> Result<Client<Ready, T>> {
        let cmd = Command::Ehlo {
            hostname: self.config.client_hostname.clone(),
        };
        self.send_command(&cmd).await?;
        Ok(self.transition())
    }
}

impl<T: Transport> Client<Ready, T> {
    /// Starts a mail transaction.
    ///
    /// # Errors
    ///
    /// Returns an error if the MAIL FROM command fails.
    pub async fn mail_from(mut self, from: Address) -> Result<Client<MailTransaction, T>> {
        self.send_command(&Command::MailFrom { from }).await?;
        Ok(self.transition())
    }

    /// Sends RSET so the next transaction starts from a clean state.
    ///
    /// # Errors
    ///
    /// Returns an error if the RSET command fails.
    pub async fn reset(mut self) -> Result<Self> {
        self.send_command(&Command::Rset).await?;
        Ok(self)
    }

    /// Runs one complete transaction: MAIL FROM, every RCPT TO in order,
    /// DATA, the message and the end-of-data marker.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoRecipients`] before anything is sent if `to` is
    /// empty, otherwise the first failing command's error.
    pub async fn send_mail(self, from: &Address, to: &[Address], message: &[u8]) -> Result<Self> {
        let Some((first, rest)) = to.split_first() else {
            return Err(Error::NoRecipients);
        };

        let mut client = self.mail_from(from.clone()).await?.rcpt_to(first.clone()).await?;
        for addr in rest {
            client = client.rcpt_to(addr.clone()).await?;
        }
        client.data().await?.send_message(message).await
    }
}

impl<T: Transport> Client<MailTransaction, T> {
    /// Adds a recipient to the transaction.
    ///
    /// # Errors
    ///
    /// Returns an error if the RCPT TO command fails.
    pub async fn rcpt_to(mut self, to: Address) -> Result<Client<RecipientAdded, T>> {
        self.send_command(&Command::RcptTo { to }).await?;
        Ok(self.transition())
    }

    /// Resets the transaction.
    ///
    /// # Errors
    ///
    /// Returns an error if the RSET command fails.
    pub async fn reset(mut self) -> Result<Client<Ready, T>> {
        self.send_command(&Command::Rset).await?;
        Ok(self.transition())
    }
}

impl<T: Transport> Client<RecipientAdded, T> {
    /// Adds another recipient to the transaction.
    ///
    /// # Errors
    ///
    /// Returns an error if the RCPT TO command fails.
    pub async fn rcpt_to(mut self, to: Address) -> Result<Self> {
        self.send_command(&Command::RcptTo { to }).await?;
        Ok(self)
    }

    /// Begins sending message data.
    ///
    /// # Errors
    ///
    /// Returns an error if the DATA command fails.
    pub async fn data(mut self) -> Result<Client<Data, T>> {
        self.send_command(&Command::Data).await?;
        Ok(self.transition())
    }

    /// Resets the transaction.
    ///
    /// # Errors
    ///
    /// Returns an error if the RSET command fails.
    pub async fn reset(mut self) -> Result<Client<Ready, T>> {
        self.send_command(&Command::Rset).await?;
        Ok(self.transition())
    }
}

impl<T: Transport> Client<Data, T> {
    /// Sends the message content and completes the transaction.
    ///
    /// The bytes go out untouched: no line ending normalization and no
    /// dot-stuffing. The end-of-data marker always starts with its own CRLF.
    ///
    /// # Errors
    ///
    /// Returns an error if sending the message fails or server rejects it.
    pub async fn send_message(mut self, message: &[u8]) -> Result<Client<Ready, T>> {
        self.stream.write_all(message).await?;
        self.send_command(&Command::EndOfData).await?;
        Ok(self.transition())
    }
}

impl<S: Send, T: Transport> Client<S, T> {
    async fn read_reply(&mut self) -> Result<Reply> {
        let mut lines = Vec::new();
        loop {
            let line = self.stream.read_line().await?;
            info!("{}recv: {line}", self.prefix);

            let code = reply_code(&line).filter(|_| is_last_reply_line(&line));
            lines.push(line);

            if let Some(code) = code {
                let reply = Reply::new(code, lines);
                if !reply.is_positive() {
                    return Err(Error::rejected(code, reply.last_line()));
                }
                return Ok(reply);
            }
        }
    }

    /// Sends QUIT and closes the connection (available in any state).
    ///
    /// # Errors
    ///
    /// Returns an error if the QUIT command fails.
    pub async fn quit(mut self) -> Result<()> {
        self.send_command(&Command::Quit).await?;
        Ok(())
    }
}

impl<S: Send, T: Transport> CommandSender for Client<S, T> {
    async fn send_command(&mut self, cmd: &Command) -> Result<Reply> {
        info!("{}send: {cmd}", self.prefix);
        self.stream.write_all(&cmd.serialize()).await?;
        self.read_reply().await
    }
}
