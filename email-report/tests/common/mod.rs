#![allow(dead_code)]

// Re-export commonly used test types and utilities
pub use email_report::sender::{MailConfig, MailError, MailTransport, ReportSender, SmtpMailer};
pub use email_report::template::ReportStats;

use async_trait::async_trait;
use lettre::Message;
use std::sync::{Arc, Mutex};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};

/// Test configuration constants
pub const TEST_SENDER: &str = "brief@example.com";
pub const TEST_RECIPIENT: &str = "reader@example.com";

pub fn test_mail_config() -> MailConfig {
    MailConfig {
        smtp_host: "localhost".to_string(),
        smtp_port: 3025,
        sender_email: TEST_SENDER.to_string(),
        sender_password: "testpass".to_string(),
        recipient_email: TEST_RECIPIENT.to_string(),
        timeout_seconds: 5,
    }
}

pub fn sample_stats() -> ReportStats {
    ReportStats {
        article_count: 10,
        successful_feeds: 2,
        total_feeds: 3,
    }
}

/// Keeps every delivered message in memory.
#[derive(Default)]
pub struct RecordingTransport {
    pub delivered: Mutex<Vec<Message>>,
}

#[async_trait]
impl MailTransport for RecordingTransport {
    async fn deliver(&self, message: Message) -> Result<(), MailError> {
        self.delivered.lock().unwrap().push(message);
        Ok(())
    }
}

/// Fails every delivery the way the configured relay would.
pub enum RejectingTransport {
    BadCredentials,
    ConnectionDropped,
}

#[async_trait]
impl MailTransport for RejectingTransport {
    async fn deliver(&self, _message: Message) -> Result<(), MailError> {
        match self {
            RejectingTransport::BadCredentials => Err(MailError::Authentication(
                "535 5.7.8 Username and Password not accepted".to_string(),
            )),
            RejectingTransport::ConnectionDropped => {
                Err(MailError::Transport("connection closed by remote host".to_string()))
            }
        }
    }
}

/// Scripted SMTP relay on a random local port, plain text only. AUTH and
/// MAIL FROM answer with the configured replies; everything else succeeds.
pub struct FakeSmtpServer {
    pub port: u16,
    commands: Arc<Mutex<Vec<String>>>,
}

impl FakeSmtpServer {
    pub async fn start(auth_reply: &'static str, mail_from_reply: &'static str) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind smtp server");
        let port = listener.local_addr().expect("local addr").port();
        let commands = Arc::new(Mutex::new(Vec::new()));

        let seen = commands.clone();
        tokio::spawn(async move {
            while let Ok((stream, _)) = listener.accept().await {
                let seen = seen.clone();
                tokio::spawn(async move {
                    let _ = serve_session(stream, seen, auth_reply, mail_from_reply).await;
                });
            }
        });

        Self { port, commands }
    }

    pub fn config(&self) -> MailConfig {
        MailConfig {
            smtp_host: "127.0.0.1".to_string(),
            smtp_port: self.port,
            ..test_mail_config()
        }
    }

    /// Command verbs received so far, upper-cased.
    pub fn commands(&self) -> Vec<String> {
        self.commands.lock().unwrap().clone()
    }
}

async fn serve_session(
    stream: TcpStream,
    commands: Arc<Mutex<Vec<String>>>,
    auth_reply: &'static str,
    mail_from_reply: &'static str,
) -> std::io::Result<()> {
    let (read, mut write) = stream.into_split();
    let mut lines = BufReader::new(read).lines();
    write.write_all(b"220 fake.local ESMTP ready\r\n").await?;

    let mut in_data = false;
    while let Some(line) = lines.next_line().await? {
        if in_data {
            if line == "." {
                in_data = false;
                write.write_all(b"250 2.0.0 Queued\r\n").await?;
            }
            continue;
        }

        let verb = line.split_whitespace().next().unwrap_or("").to_ascii_uppercase();
        commands.lock().unwrap().push(verb.clone());

        let reply = match verb.as_str() {
            "EHLO" => "250-fake.local\r\n250 AUTH PLAIN LOGIN",
            "HELO" | "RSET" | "NOOP" | "RCPT" => "250 OK",
            "AUTH" => auth_reply,
            "MAIL" => mail_from_reply,
            "DATA" => {
                in_data = true;
                "354 End data with <CR><LF>.<CR><LF>"
            }
            "QUIT" => {
                write.write_all(b"221 Bye\r\n").await?;
                break;
            }
            _ => "502 5.5.2 Command not recognized",
        };
        write.write_all(format!("{}\r\n", reply).as_bytes()).await?;
    }
    Ok(())
}

pub fn plain_message() -> Message {
    Message::builder()
        .from(TEST_SENDER.parse().unwrap())
        .to(TEST_RECIPIENT.parse().unwrap())
        .subject("Market brief")
        .body("Stocks rose.".to_string())
        .unwrap()
}
