pub mod markdown;
pub mod sender;
pub mod template;

pub use markdown::{escape_html, markdown_to_html, strip_tags};
pub use sender::{MailConfig, MailError, MailTransport, ReportSender, SmtpMailer};
pub use template::{render_report, ReportStats};
