//! Note data service

use std::time::Duration;

use reqwest::{Client, RequestBuilder, Url};
use serde::de::DeserializeOwned;
use tracing::{debug, error};

use notes_common::{
    Acknowledgement, ClientConfig, MessageLog, NewNote, Note, NoteCollection, NoteId, NoteRef,
};

use crate::error::{ClientError, ClientResult};

/// Client for the notes collection.
///
/// Every operation resolves to a value: on failure the error is traced, an
/// `"<operation> failed: <error>"` entry is appended to the message log and
/// the operation's fallback is returned instead.
#[derive(Debug, Clone)]
pub struct NoteService {
    http: Client,
    notes_url: String,
    messages: MessageLog,
}

impl NoteService {
    /// Create a new service for the collection at `config.base_url`
    pub fn new(config: &ClientConfig, messages: MessageLog) -> ClientResult<Self> {
        let notes_url = config.base_url.trim().trim_end_matches('/').to_string();
        Url::parse(&notes_url).map_err(|e| ClientError::InvalidUrl {
            url: config.base_url.clone(),
            reason: e.to_string(),
        })?;

        let mut builder = Client::builder().user_agent(config.user_agent.clone());
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }

        Ok(Self {
            http: builder.build()?,
            notes_url,
            messages,
        })
    }

    /// URL of the notes collection
    pub fn notes_url(&self) -> &str {
        &self.notes_url
    }

    /// Message log this service writes to
    pub fn messages(&self) -> &MessageLog {
        &self.messages
    }

    /// GET all notes
    pub async fn list(&self) -> Vec<Note> {
        let request = self.http.get(&self.notes_url);
        match self.fetch::<NoteCollection>(request).await {
            Ok(collection) => {
                self.log("fetched notes");
                collection.into()
            }
            Err(e) => self.handle_error("getNotes", Vec::new())(e),
        }
    }

    /// GET a note through the id filter. `None` when no note has that id.
    pub async fn get_lenient(&self, id: NoteId) -> Option<Note> {
        let request = self.http.get(format!("{}/?id={}", self.notes_url, id));
        match self.fetch::<Vec<Note>>(request).await {
            Ok(notes) => {
                // the filter yields zero or one element
                let note = notes.into_iter().next();
                let outcome = if note.is_some() { "fetched" } else { "did not find" };
                self.log(format!("{outcome} note id={id}"));
                note
            }
            Err(e) => self.handle_error(format!("getNote id={id}"), None)(e),
        }
    }

    /// GET a note by id. A missing note is a failure like any other.
    pub async fn get(&self, id: NoteId) -> Option<Note> {
        let request = self.http.get(format!("{}/{}", self.notes_url, id));
        self.fetch::<Note>(request)
            .await
            .map(|note| {
                self.log(format!("fetched note id={id}"));
                Some(note)
            })
            .unwrap_or_else(self.handle_error(format!("getNote id={id}"), None))
    }

    /// POST a new note. Returns the note with its server-assigned id.
    pub async fn create(&self, note: &NewNote) -> Option<Note> {
        let request = self.http.post(&self.notes_url).json(note);
        self.fetch::<Note>(request)
            .await
            .map(|created| {
                self.log(format!("added note w/ id={}", created.id));
                Some(created)
            })
            .unwrap_or_else(self.handle_error("addNote", None))
    }

    /// PUT the full note. The response body is not interpreted.
    pub async fn update(&self, note: &Note) -> Option<Acknowledgement> {
        let request = self
            .http
            .put(format!("{}/{}", self.notes_url, note.id))
            .json(note);
        self.acknowledge(request)
            .await
            .map(|ack| {
                self.log(format!("updated note id={}", note.id));
                Some(ack)
            })
            .unwrap_or_else(self.handle_error("updateNote", None))
    }

    /// DELETE a note given its id or the note itself
    pub async fn delete<'a>(&self, target: impl Into<NoteRef<'a>>) -> Option<Acknowledgement> {
        let id = target.into().id();
        let request = self
            .http
            .delete(format!("{}/{}", self.notes_url, id))
            .header(reqwest::header::CONTENT_TYPE, "application/json");
        self.acknowledge(request)
            .await
            .map(|ack| {
                self.log(format!("deleted note id={id}"));
                Some(ack)
            })
            .unwrap_or_else(self.handle_error("deleteNote", None))
    }

    /// GET notes whose name contains `term`, ignoring case.
    /// A blank term matches nothing and sends no request.
    pub async fn search(&self, term: &str) -> Vec<Note> {
        let term = term.trim();
        if term.is_empty() {
            return Vec::new();
        }

        let request = self
            .http
            .get(format!("{}/search/name", self.notes_url))
            .query(&[("contains", term)]);
        match self.fetch::<NoteCollection>(request).await {
            Ok(collection) => {
                let notes = collection.into_notes();
                if notes.is_empty() {
                    self.log(format!("no notes matching \"{term}\""));
                } else {
                    self.log(format!("found notes matching \"{term}\""));
                }
                notes
            }
            Err(e) => self.handle_error("searchNotes", Vec::new())(e),
        }
    }

    async fn fetch<T: DeserializeOwned>(&self, request: RequestBuilder) -> ClientResult<T> {
        let response = request.send().await?.error_for_status()?;
        debug!(status = %response.status(), url = %response.url(), "response received");
        let body = response.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }

    async fn acknowledge(&self, request: RequestBuilder) -> ClientResult<Acknowledgement> {
        let response = request.send().await?.error_for_status()?;
        debug!(status = %response.status(), url = %response.url(), "response received");
        Ok(Acknowledgement {
            status: response.status().as_u16(),
        })
    }

    /// Build the failure handler for `operation`: trace the raw error, record
    /// it in the message log and resolve with `result`.
    fn handle_error<'a, T: 'a>(
        &'a self,
        operation: impl Into<String>,
        result: T,
    ) -> impl FnOnce(ClientError) -> T + 'a {
        let operation = operation.into();
        move |e| {
            error!(operation = %operation, error = ?e, "note service operation failed");
            self.log(format!("{operation} failed: {e}"));
            result
        }
    }

    fn log(&self, message: impl AsRef<str>) {
        self.messages.add(format!("NoteService: {}", message.as_ref()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> NoteService {
        NoteService::new(&ClientConfig::default(), MessageLog::new()).unwrap()
    }

    #[test]
    fn test_trailing_slash_is_trimmed() {
        let config = ClientConfig::with_base_url("http://localhost:8080/notes/");
        let service = NoteService::new(&config, MessageLog::new()).unwrap();
        assert_eq!(service.notes_url(), "http://localhost:8080/notes");
    }

    #[test]
    fn test_invalid_base_url() {
        let config = ClientConfig::with_base_url("not a url");
        let result = NoteService::new(&config, MessageLog::new());
        assert!(matches!(result, Err(ClientError::InvalidUrl { .. })));
    }

    #[test]
    fn test_handle_error_returns_fallback_and_logs() {
        let service = service();
        let error = ClientError::Decode(serde_json::from_str::<Note>("{").unwrap_err());

        let fallback = service.handle_error("getNotes", vec![Note::new(1, "kept")])(error);

        assert_eq!(fallback, vec![Note::new(1, "kept")]);
        let messages = service.messages().messages();
        assert_eq!(messages.len(), 1);
        assert!(messages[0].starts_with("NoteService: getNotes failed: Malformed response"));
    }

    #[tokio::test]
    async fn test_blank_search_sends_nothing() {
        let service = service();
        assert!(service.search("   ").await.is_empty());
        assert!(service.messages().is_empty());
    }
}
