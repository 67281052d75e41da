//! Batch driver.
//!
//! Sends the message files named by one [`Settings`] document, either in a
//! single SMTP session or, in parallel mode, one session per file.

use std::borrow::Cow;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use sendeml_mime::replace_mail;
use sendeml_smtp::connection::Transport;
use sendeml_smtp::{Address, Client, Connected, Ready, SessionConfig};
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};

use crate::error::{Error, Result};
use crate::settings::Settings;

/// Validated envelope addresses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Envelope {
    /// Sender.
    pub from: Address,
    /// Recipients, in order; never empty.
    pub to: Vec<Address>,
}

impl Envelope {
    /// Checks the addresses named in `settings`.
    ///
    /// # Errors
    ///
    /// Returns an error if an address is malformed or there are no recipients.
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let from = Address::new(settings.from_address.as_str())?;
        let to = settings
            .to_addresses
            .iter()
            .map(|addr| Address::new(addr.as_str()))
            .collect::<sendeml_smtp::Result<Vec<_>>>()?;

        if to.is_empty() {
            return Err(sendeml_smtp::Error::NoRecipients.into());
        }
        Ok(Self { from, to })
    }
}

/// What happened to each message file of a batch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchReport {
    /// Files accepted by the server.
    pub sent: Vec<PathBuf>,
    /// Files that do not exist.
    pub skipped: Vec<PathBuf>,
    /// Files that could not be read or rewritten, or whose session failed.
    pub failed: Vec<PathBuf>,
}

impl BatchReport {
    /// Returns true if every file was sent.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.skipped.is_empty() && self.failed.is_empty()
    }

    fn merge(&mut self, other: Self) {
        self.sent.extend(other.sent);
        self.skipped.extend(other.skipped);
        self.failed.extend(other.failed);
    }
}

/// Reads a message file and applies the header rewrite policy.
///
/// # Errors
///
/// Returns [`Error::ReadMessage`] or [`Error::InvalidMessage`], both naming the file.
pub async fn prepare_message(
    path: &Path,
    update_date: bool,
    update_message_id: bool,
) -> Result<Vec<u8>> {
    let buf = tokio::fs::read(path)
        .await
        .map_err(|source| Error::ReadMessage {
            path: path.to_path_buf(),
            source,
        })?;

    let rewritten = match replace_mail(&buf, update_date, update_message_id) {
        Ok(Cow::Owned(message)) => Some(message),
        Ok(Cow::Borrowed(_)) => None,
        Err(source) => {
            return Err(Error::InvalidMessage {
                path: path.to_path_buf(),
                source,
            });
        }
    };
    Ok(rewritten.unwrap_or(buf))
}

/// Runs one SMTP session over an already greeted connection.
///
/// Sends EHLO, then each existing file in order with RSET between messages,
/// then QUIT. Missing and unreadable files are reported and skipped; every
/// message is prepared before its transaction starts, so a bad file never
/// leaves a transaction open.
///
/// # Errors
///
/// Returns the first SMTP or connection error; the session is abandoned
/// without QUIT.
pub async fn run_session<T: Transport>(
    client: Client<Connected, T>,
    settings: &Settings,
    envelope: &Envelope,
    files: &[String],
) -> Result<BatchReport> {
    let prefix = client.config().trace_prefix();
    let mut client = client.ehlo().await?;
    let mut report = BatchReport::default();

    for file in files {
        let path = Path::new(file);
        if !tokio::fs::try_exists(path).await.unwrap_or(false) {
            warn!("{prefix}{file}: EML file does not exist");
            report.skipped.push(path.to_path_buf());
            continue;
        }

        let message =
            match prepare_message(path, settings.update_date, settings.update_message_id).await {
                Ok(message) => message,
                Err(e) => {
                    error!("{prefix}{e}");
                    report.failed.push(path.to_path_buf());
                    continue;
                }
            };

        if !report.sent.is_empty() {
            info!("{prefix}---");
            client = client.reset().await?;
        }

        client = send_one(client, envelope, path, &message, &prefix).await?;
        report.sent.push(path.to_path_buf());
    }

    client.quit().await?;
    Ok(report)
}

async fn send_one<T: Transport>(
    client: Client<Ready, T>,
    envelope: &Envelope,
    path: &Path,
    message: &[u8],
    prefix: &str,
) -> Result<Client<Ready, T>> {
    let Some((first, rest)) = envelope.to.split_first() else {
        return Err(sendeml_smtp::Error::NoRecipients.into());
    };

    let mut transaction = client
        .mail_from(envelope.from.clone())
        .await?
        .rcpt_to(first.clone())
        .await?;
    for addr in rest {
        transaction = transaction.rcpt_to(addr.clone()).await?;
    }
    let data = transaction.data().await?;

    let shown = std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf());
    info!("{prefix}send: {}", shown.display());
    Ok(data.send_message(message).await?)
}

/// Connects to the configured server and sends `files` in one session.
///
/// # Errors
///
/// Returns an error if the connection or any SMTP command fails.
pub async fn send_messages(
    settings: &Settings,
    envelope: &Envelope,
    files: &[String],
    config: SessionConfig,
) -> Result<BatchReport> {
    debug!(
        "Connecting to {}:{} for {} file(s)",
        settings.smtp_host,
        settings.smtp_port,
        files.len()
    );
    let client = Client::connect(&settings.smtp_host, settings.smtp_port, config).await?;
    run_session(client, settings, envelope, files).await
}

/// Sends every file listed in `settings`.
///
/// With `useParallel` and more than one file, each file gets its own
/// connection on its own task; a failing task only marks its own file as
/// failed. Otherwise all files share one session.
///
/// # Errors
///
/// Returns an error if the envelope is invalid, or in sequential mode if
/// the session fails.
pub async fn send_batch(settings: &Settings, config: &SessionConfig) -> Result<BatchReport> {
    let envelope = Envelope::from_settings(settings)?;

    if settings.use_parallel && settings.eml_files.len() > 1 {
        Ok(send_parallel(settings, envelope, config).await)
    } else {
        send_messages(settings, &envelope, &settings.eml_files, config.clone()).await
    }
}

async fn send_parallel(
    settings: &Settings,
    envelope: Envelope,
    config: &SessionConfig,
) -> BatchReport {
    let settings = Arc::new(settings.clone());
    let envelope = Arc::new(envelope);
    let mut tasks = JoinSet::new();

    for (index, file) in settings.eml_files.iter().enumerate() {
        let settings = Arc::clone(&settings);
        let envelope = Arc::clone(&envelope);
        let config = config.for_worker(index + 1);
        let file = file.clone();

        tasks.spawn(async move {
            let result =
                send_messages(&settings, &envelope, std::slice::from_ref(&file), config).await;
            (file, result)
        });
    }

    let mut report = BatchReport::default();
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok((_, Ok(part))) => report.merge(part),
            Ok((file, Err(e))) => {
                error!("{file}: {e}");
                report.failed.push(PathBuf::from(file));
            }
            Err(e) => error!("Worker task failed: {e}"),
        }
    }
    report
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::time::Duration;

    use sendeml_smtp::connection::SmtpStream;
    use tempfile::TempDir;
    use tokio_test::io::{Builder, Mock};

    use super::*;

    const GOOD: &[u8] = b"Subject: test\r\nFrom: a001@ah62.example.jp\r\n\r\nbody\r\n";
    const NO_BLANK_LINE: &[u8] = b"Subject: test\r\nbody\r\n";

    fn settings(files: Vec<String>, update: bool) -> Settings {
        Settings {
            smtp_host: "127.0.0.1".to_string(),
            smtp_port: 25,
            from_address: "a001@ah62.example.jp".to_string(),
            to_addresses: vec![
                "a002@ah62.example.jp".to_string(),
                "a003@ah62.example.jp".to_string(),
            ],
            eml_files: files,
            update_date: update,
            update_message_id: update,
            use_parallel: false,
        }
    }

    fn write_file(dir: &TempDir, name: &str, content: &[u8]) -> String {
        let path = dir.path().join(name);
        std::fs::write(&path, content).unwrap();
        path.to_string_lossy().into_owned()
    }

    fn missing_file(dir: &TempDir, name: &str) -> String {
        dir.path().join(name).to_string_lossy().into_owned()
    }

    async fn greeted(mock: Mock) -> Client<Connected, Mock> {
        let stream = SmtpStream::new(mock, Duration::from_secs(1));
        Client::from_stream(stream, SessionConfig::default())
            .await
            .unwrap()
    }

    fn transaction(builder: &mut Builder, message: &[u8]) {
        builder
            .write(b"MAIL FROM:<a001@ah62.example.jp>\r\n")
            .read(b"250 OK\r\n")
            .write(b"RCPT TO:<a002@ah62.example.jp>\r\n")
            .read(b"250 OK\r\n")
            .write(b"RCPT TO:<a003@ah62.example.jp>\r\n")
            .read(b"250 OK\r\n")
            .write(b"DATA\r\n")
            .read(b"354 Start mail input\r\n")
            .write(message)
            .write(b"\r\n.\r\n")
            .read(b"250 Queued\r\n");
    }

    fn opening() -> Builder {
        let mut builder = Builder::new();
        builder
            .read(b"220 ready\r\n")
            .write(b"EHLO localhost\r\n")
            .read(b"250 OK\r\n");
        builder
    }

    fn closing(builder: &mut Builder) {
        builder.write(b"QUIT\r\n").read(b"221 Bye\r\n");
    }

    #[tokio::test]
    async fn test_missing_middle_file() {
        let dir = tempfile::tempdir().unwrap();
        let files = vec![
            write_file(&dir, "test1.eml", GOOD),
            missing_file(&dir, "test2.eml"),
            write_file(&dir, "test3.eml", GOOD),
        ];
        let settings = settings(files.clone(), false);
        let envelope = Envelope::from_settings(&settings).unwrap();

        let mut builder = opening();
        transaction(&mut builder, GOOD);
        builder.write(b"RSET\r\n").read(b"250 Reset\r\n");
        transaction(&mut builder, GOOD);
        closing(&mut builder);

        let client = greeted(builder.build()).await;
        let report = run_session(client, &settings, &envelope, &files)
            .await
            .unwrap();

        assert_eq!(
            report.sent,
            vec![PathBuf::from(&files[0]), PathBuf::from(&files[2])]
        );
        assert_eq!(report.skipped, vec![PathBuf::from(&files[1])]);
        assert!(report.failed.is_empty());
        assert!(!report.is_complete());
    }

    #[tokio::test]
    async fn test_invalid_message_is_skipped_before_mail_from() {
        let dir = tempfile::tempdir().unwrap();
        let files = vec![
            write_file(&dir, "bad.eml", NO_BLANK_LINE),
            write_file(&dir, "good.eml", GOOD),
        ];
        let settings = settings(files.clone(), true);
        let envelope = Envelope::from_settings(&settings).unwrap();

        // No Date or Message-ID field, so the rewrite leaves the bytes as they are.
        let mut builder = opening();
        transaction(&mut builder, GOOD);
        closing(&mut builder);

        let client = greeted(builder.build()).await;
        let report = run_session(client, &settings, &envelope, &files)
            .await
            .unwrap();

        assert_eq!(report.sent, vec![PathBuf::from(&files[1])]);
        assert_eq!(report.failed, vec![PathBuf::from(&files[0])]);
    }

    #[tokio::test]
    async fn test_no_files_still_quits() {
        let settings = settings(Vec::new(), false);
        let envelope = Envelope::from_settings(&settings).unwrap();

        let mut builder = opening();
        closing(&mut builder);

        let client = greeted(builder.build()).await;
        let report = run_session(client, &settings, &envelope, &[]).await.unwrap();
        assert_eq!(report, BatchReport::default());
        assert!(report.is_complete());
    }

    #[tokio::test]
    async fn test_rejection_aborts_without_quit() {
        let dir = tempfile::tempdir().unwrap();
        let files = vec![
            write_file(&dir, "test1.eml", GOOD),
            write_file(&dir, "test2.eml", GOOD),
        ];
        let settings = settings(files.clone(), false);
        let envelope = Envelope::from_settings(&settings).unwrap();

        let mut builder = opening();
        builder
            .write(b"MAIL FROM:<a001@ah62.example.jp>\r\n")
            .read(b"250 OK\r\n")
            .write(b"RCPT TO:<a002@ah62.example.jp>\r\n")
            .read(b"550 No such user\r\n");

        let client = greeted(builder.build()).await;
        let err = run_session(client, &settings, &envelope, &files)
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Smtp(sendeml_smtp::Error::Rejected { .. })));
        assert_eq!(err.to_string(), "550 No such user");
    }

    #[tokio::test]
    async fn test_prepare_message_rewrites_date() {
        let dir = tempfile::tempdir().unwrap();
        let original: &[u8] =
            b"Subject: test\r\nDate: Sun, 26 Jul 2020 22:01:37 +0900\r\n\r\nbody\r\n";
        let path = write_file(&dir, "dated.eml", original);

        let untouched = prepare_message(Path::new(&path), false, false)
            .await
            .unwrap();
        assert_eq!(untouched, original);

        let rewritten = prepare_message(Path::new(&path), true, false)
            .await
            .unwrap();
        assert_ne!(rewritten, original);
        assert!(rewritten.starts_with(b"Subject: test\r\nDate: "));
        assert!(rewritten.ends_with(b"\r\n\r\nbody\r\n"));
    }

    #[tokio::test]
    async fn test_prepare_message_errors_name_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(&dir, "bad.eml", NO_BLANK_LINE);

        let err = prepare_message(Path::new(&path), true, true)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidMessage { .. }));
        assert!(err.to_string().starts_with(&path));

        let err = prepare_message(&dir.path().join("gone.eml"), false, false)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::ReadMessage { .. }));
    }

    #[test]
    fn test_envelope_validation() {
        let mut invalid = settings(Vec::new(), false);
        invalid.from_address = "a001@ah62.example.jp>\r\nRSET".to_string();
        assert!(matches!(
            Envelope::from_settings(&invalid),
            Err(Error::Smtp(sendeml_smtp::Error::InvalidAddress(_)))
        ));

        let mut empty = settings(Vec::new(), false);
        empty.to_addresses.clear();
        assert!(matches!(
            Envelope::from_settings(&empty),
            Err(Error::Smtp(sendeml_smtp::Error::NoRecipients))
        ));
    }

    #[test]
    fn test_report_merge() {
        let mut report = BatchReport {
            sent: vec![PathBuf::from("a.eml")],
            ..BatchReport::default()
        };
        report.merge(BatchReport {
            sent: vec![PathBuf::from("b.eml")],
            skipped: vec![PathBuf::from("c.eml")],
            failed: Vec::new(),
        });
        assert_eq!(report.sent.len(), 2);
        assert_eq!(report.skipped, vec![PathBuf::from("c.eml")]);
    }
}
