pub mod imap_client;
pub mod normalize;

pub use imap_client::{ImapClient, Mailbox, MailboxSession};
pub use normalize::normalize;
