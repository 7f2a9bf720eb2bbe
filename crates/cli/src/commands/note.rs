//! Note Commands

use anyhow::{bail, Result};
use clap::Subcommand;
use serde::Serialize;
use tracing::debug;

use notes_client::NoteService;
use notes_common::{top_notes, NewNote, Note, NoteId};

use crate::output::{print_item, print_list, print_success, print_warning, OutputFormat, TableDisplay};

#[derive(Subcommand)]
pub enum NoteCommands {
    /// Show the top notes
    Dashboard,

    /// List all notes
    List,

    /// Show note details (fails on a missing id)
    Get {
        /// Note ID
        id: NoteId,
    },

    /// Look a note up through the id filter
    Find {
        /// Note ID
        id: NoteId,
    },

    /// Add a note
    Add {
        /// Note name
        name: String,
    },

    /// Rename a note
    Rename {
        /// Note ID
        id: NoteId,

        /// New name
        name: String,
    },

    /// Delete a note
    Delete {
        /// Note ID
        id: NoteId,
    },

    /// Search notes by name
    Search {
        /// Text the name must contain
        term: String,
    },
}

/// Note display wrapper for serialization
#[derive(Serialize)]
pub struct NoteDisplay {
    pub id: NoteId,
    pub name: String,
}

impl From<Note> for NoteDisplay {
    fn from(note: Note) -> Self {
        Self {
            id: note.id,
            name: note.name,
        }
    }
}

impl TableDisplay for NoteDisplay {
    fn headers() -> Vec<&'static str> {
        vec!["ID", "Name"]
    }

    fn row(&self) -> Vec<String> {
        vec![self.id.to_string(), self.name.clone()]
    }
}

fn displays(notes: impl IntoIterator<Item = Note>) -> Vec<NoteDisplay> {
    notes.into_iter().map(NoteDisplay::from).collect()
}

pub async fn execute(cmd: NoteCommands, service: &NoteService, format: OutputFormat) -> Result<()> {
    debug!(collection = service.notes_url(), "running note command");
    match cmd {
        NoteCommands::Dashboard => {
            let notes = service.list().await;
            print_list(&displays(top_notes(&notes).to_vec()), format);
        }

        NoteCommands::List => {
            let notes = service.list().await;
            print_list(&displays(notes), format);
        }

        NoteCommands::Get { id } => match service.get(id).await {
            Some(note) => print_item(&NoteDisplay::from(note), format),
            None => bail!("note {} could not be fetched", id),
        },

        NoteCommands::Find { id } => match service.get_lenient(id).await {
            Some(note) => print_item(&NoteDisplay::from(note), format),
            None => print_warning(&format!("No note with id {}", id)),
        },

        NoteCommands::Add { name } => {
            let name = name.trim();
            if name.is_empty() {
                bail!("note name must not be blank");
            }
            match service.create(&NewNote::new(name)).await {
                Some(note) => {
                    print_success(&format!("Note '{}' added with id {}", note.name, note.id));
                    print_item(&NoteDisplay::from(note), format);
                }
                None => bail!("note '{}' was not added", name),
            }
        }

        NoteCommands::Rename { id, name } => {
            let name = name.trim();
            if name.is_empty() {
                bail!("note name must not be blank");
            }
            if service.update(&Note::new(id, name)).await.is_none() {
                bail!("note {} was not updated", id);
            }
            print_success(&format!("Note {} renamed to '{}'", id, name));
        }

        NoteCommands::Delete { id } => {
            if service.delete(id).await.is_none() {
                bail!("note {} was not deleted", id);
            }
            print_success(&format!("Note {} deleted", id));
        }

        NoteCommands::Search { term } => {
            let notes = service.search(&term).await;
            print_list(&displays(notes), format);
        }
    }

    Ok(())
}
