//! Note commands against an in-process notes server

use notes_cli::commands::config::{self, ConfigCommands};
use notes_cli::commands::note::{execute, NoteCommands};
use notes_cli::output::OutputFormat;
use notes_client::NoteService;
use notes_common::{ClientConfig, MessageLog, Note};
use notes_server::LocalServer;

async fn setup() -> (LocalServer, NoteService) {
    let server = LocalServer::start_seeded().await.unwrap();
    let config = ClientConfig::with_base_url(server.notes_url());
    let service = NoteService::new(&config, MessageLog::new()).unwrap();
    (server, service)
}

#[tokio::test]
async fn test_add_rename_delete() {
    let (_server, service) = setup().await;

    execute(NoteCommands::Add { name: "  Alice ".into() }, &service, OutputFormat::Plain)
        .await
        .unwrap();
    assert!(service.list().await.contains(&Note::new(21, "Alice")));

    execute(
        NoteCommands::Rename { id: 21, name: "Alicia".into() },
        &service,
        OutputFormat::Plain,
    )
    .await
    .unwrap();
    assert_eq!(service.get(21).await, Some(Note::new(21, "Alicia")));

    execute(NoteCommands::Delete { id: 21 }, &service, OutputFormat::Plain)
        .await
        .unwrap();
    assert_eq!(service.list().await.len(), 10);
}

#[tokio::test]
async fn test_blank_name_is_refused_locally() {
    let (_server, service) = setup().await;

    let result = execute(NoteCommands::Add { name: "   ".into() }, &service, OutputFormat::Json).await;
    assert!(result.is_err());
    assert!(service.messages().is_empty());
}

#[tokio::test]
async fn test_missing_note_fails_get_but_not_find() {
    let (_server, service) = setup().await;

    assert!(execute(NoteCommands::Get { id: 99 }, &service, OutputFormat::Json).await.is_err());
    assert!(execute(NoteCommands::Find { id: 99 }, &service, OutputFormat::Json).await.is_ok());
    assert!(execute(NoteCommands::Delete { id: 99 }, &service, OutputFormat::Json).await.is_err());
}

#[tokio::test]
async fn test_read_views_render() {
    let (_server, service) = setup().await;

    for cmd in [
        NoteCommands::Dashboard,
        NoteCommands::List,
        NoteCommands::Search { term: "Ma".into() },
        NoteCommands::Get { id: 15 },
    ] {
        execute(cmd, &service, OutputFormat::Yaml).await.unwrap();
    }
    assert_eq!(service.messages().len(), 4);
}

#[test]
fn test_config_init_refuses_overwrite() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    let config = ClientConfig::with_base_url("http://127.0.0.1:9000/notes");

    config::execute(ConfigCommands::Init { force: false }, &config, &path).unwrap();
    assert_eq!(ClientConfig::load(&path).unwrap(), config);

    assert!(config::execute(ConfigCommands::Init { force: false }, &config, &path).is_err());
    config::execute(ConfigCommands::Init { force: true }, &config, &path).unwrap();
}
