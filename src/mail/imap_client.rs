use std::io::{Read, Write};

use native_tls::TlsConnector;

use crate::domain::email::{MailboxCredentials, MessageId, RawMessage};
use crate::error::{ConnectionError, ConnectionStage};

/// How many of the most recent messages are pulled per connection.
pub const DEFAULT_WINDOW: usize = 5;

/// The handful of IMAP verbs the fetcher needs from an authenticated session.
pub trait MailboxSession {
    fn select_folder(&mut self, folder: &str) -> Result<(), ConnectionError>;
    fn search_all(&mut self) -> Result<Vec<MessageId>, ConnectionError>;
    fn fetch_message(&mut self, id: MessageId) -> Result<RawMessage, ConnectionError>;
    fn logout(&mut self) -> Result<(), ConnectionError>;
}

/// Something that can turn credentials into the recent raw messages of a mailbox.
pub trait Mailbox {
    fn fetch_recent(&self, creds: &MailboxCredentials)
    -> Result<Vec<RawMessage>, ConnectionError>;
}

impl<T: Read + Write> MailboxSession for imap::Session<T> {
    fn select_folder(&mut self, folder: &str) -> Result<(), ConnectionError> {
        let mailbox = self
            .select(folder)
            .map_err(|e| ConnectionError::new(ConnectionStage::Select, e))?;
        log::debug!("{} has {} messages", folder, mailbox.exists);
        Ok(())
    }

    fn search_all(&mut self) -> Result<Vec<MessageId>, ConnectionError> {
        let ids = self
            .search("ALL")
            .map_err(|e| ConnectionError::new(ConnectionStage::Search, e))?;
        Ok(ids.into_iter().collect())
    }

    fn fetch_message(&mut self, id: MessageId) -> Result<RawMessage, ConnectionError> {
        // PEEK so reading the inbox does not flag everything as \Seen
        let fetches = self
            .fetch(id.to_string(), "BODY.PEEK[]")
            .map_err(|e| ConnectionError::new(ConnectionStage::Fetch, e))?;
        let f = fetches.iter().next().ok_or_else(|| {
            ConnectionError::new(ConnectionStage::Fetch, format!("message {id} not found"))
        })?;
        let bytes = f.body().ok_or_else(|| {
            ConnectionError::new(
                ConnectionStage::Fetch,
                format!("server returned no body for message {id}"),
            )
        })?;
        Ok(RawMessage {
            id,
            bytes: bytes.to_vec(),
        })
    }

    fn logout(&mut self) -> Result<(), ConnectionError> {
        imap::Session::logout(self).map_err(|e| ConnectionError::new(ConnectionStage::Connect, e))
    }
}

/// Last `min(n, len)` ids in ascending sequence order.
pub fn select_window(mut ids: Vec<MessageId>, n: usize) -> Vec<MessageId> {
    ids.sort_unstable(); // SEARCH returns a set, order is not guaranteed
    ids.dedup();
    let start = ids.len().saturating_sub(n);
    ids.split_off(start)
}

/// Select `folder`, search everything and fetch the newest `n` messages one by one.
pub fn fetch_recent<S: MailboxSession + ?Sized>(
    session: &mut S,
    folder: &str,
    n: usize,
) -> Result<Vec<RawMessage>, ConnectionError> {
    session.select_folder(folder)?;
    let all = session.search_all()?;
    let total = all.len();
    let window = select_window(all, n);
    log::info!("fetching {} of {} messages from {}", window.len(), total, folder);

    let mut out = Vec::with_capacity(window.len());
    for id in window {
        let raw = session.fetch_message(id)?;
        log::debug!("message {}: {} bytes", id, raw.bytes.len());
        out.push(raw);
    }
    Ok(out)
}

/// Logs the wrapped session out when dropped, whatever path got us there.
struct LoggedIn<S: MailboxSession> {
    session: S,
}

impl<S: MailboxSession> Drop for LoggedIn<S> {
    fn drop(&mut self) {
        if let Err(e) = self.session.logout() {
            log::debug!("logout failed: {e}");
        }
    }
}

/// Run `f` against an authenticated session, then release it.
pub fn with_session<S, R>(
    session: S,
    f: impl FnOnce(&mut S) -> Result<R, ConnectionError>,
) -> Result<R, ConnectionError>
where
    S: MailboxSession,
{
    let mut guard = LoggedIn { session };
    f(&mut guard.session)
}

pub struct ImapClient {
    pub server: String,
    pub port: u16,
    pub folder: String,
    pub window: usize,
}

impl ImapClient {
    pub fn new(server: impl Into<String>, port: u16) -> Self {
        Self {
            server: server.into(),
            port,
            folder: "INBOX".to_string(),
            window: DEFAULT_WINDOW,
        }
    }

    pub fn with_folder(mut self, folder: impl Into<String>) -> Self {
        self.folder = folder.into();
        self
    }

    pub fn with_window(mut self, window: usize) -> Self {
        self.window = window;
        self
    }

    fn connect_and_login(
        &self,
        creds: &MailboxCredentials,
    ) -> Result<imap::Session<native_tls::TlsStream<std::net::TcpStream>>, ConnectionError> {
        let tls = TlsConnector::builder()
            .build()
            .map_err(|e| ConnectionError::new(ConnectionStage::Connect, e))?;

        log::info!("connecting to {}:{}", self.server, self.port);
        let client = imap::connect(
            (self.server.as_str(), self.port),
            self.server.as_str(),
            &tls,
        )
        .map_err(|e| ConnectionError::new(ConnectionStage::Connect, e))?;

        client
            .login(&creds.address, &creds.secret)
            .map_err(|(e, _client)| ConnectionError::new(ConnectionStage::Login, e))
    }
}

impl Mailbox for ImapClient {
    fn fetch_recent(
        &self,
        creds: &MailboxCredentials,
    ) -> Result<Vec<RawMessage>, ConnectionError> {
        let session = self.connect_and_login(creds)?;
        log::info!("authenticated to {}", self.server);
        with_session(session, |s| fetch_recent(s, &self.folder, self.window))
    }
}
