//! Terminal Host Integration Tests
//!
//! End-to-end runs of the contacts CLI wiring over a temporary data
//! directory: startup, tab selection, search, import through a content
//! reference and export to a JSON-lines file.

use std::collections::HashSet;
use std::path::Path;

use contacts_cli::commands::CommandDispatcher;
use contacts_cli::{AppConfig, Cli, CliError, Commands, ContactsApp};
use contacts_core::{
    DataAccess, ExportDestination, ExportOutcome, ExportRequest, Permission, PipelineError,
    TabKind,
};
use contacts_harness::{sample_contacts, PHONE_SOURCE, WORK_SOURCE};
use contacts_runtime::{ExportStatus, ImportStatus};

// ----------------------------------------------------------------------------
// Test Configuration
// ----------------------------------------------------------------------------

fn test_config(data_dir: &Path) -> AppConfig {
    let mut config = AppConfig::default();
    config.storage.data_dir = Some(data_dir.to_path_buf());
    config.import.auto_confirm = true;
    config.import.temp_dir = Some(data_dir.join("scratch"));
    config
}

fn cli(command: Commands) -> Cli {
    Cli {
        command,
        verbose: false,
        config: None,
        data_dir: None,
    }
}

fn seed_contacts(data_dir: &Path) {
    let json = serde_json::to_vec(&sample_contacts()).unwrap();
    std::fs::write(data_dir.join("contacts.json"), json).unwrap();
}

fn json_lines(contacts: &[contacts_core::Contact]) -> String {
    contacts
        .iter()
        .map(|contact| serde_json::to_string(contact).unwrap() + "\n")
        .collect()
}

// ----------------------------------------------------------------------------
// Browsing
// ----------------------------------------------------------------------------

#[tokio::test]
async fn test_startup_renders_sorted_contacts() {
    let dir = tempfile::tempdir().unwrap();
    seed_contacts(dir.path());
    let config = test_config(dir.path());

    let mut app = ContactsApp::new(&config, dir.path().to_path_buf(), None).unwrap();
    assert!(app.start().await);

    assert_eq!(
        app.current_lines().await,
        vec![
            "(AL) Ada Lovelace",
            "(AT) Alan Turing",
            "(ED) Edsger Dijkstra",
            "(GH) Grace Hopper",
        ]
    );
    app.stop().await;
}

#[tokio::test]
async fn test_selected_tab_survives_restart() {
    let dir = tempfile::tempdir().unwrap();
    seed_contacts(dir.path());
    let config = test_config(dir.path());

    let mut app = ContactsApp::new(&config, dir.path().to_path_buf(), None).unwrap();
    assert!(app.start().await);
    assert!(app.controller().select_tab(1).await);
    app.stop().await;

    let mut app = ContactsApp::new(&config, dir.path().to_path_buf(), None).unwrap();
    assert!(app.start().await);
    assert_eq!(app.controller().current_tab().await, Some(TabKind::Favorites));
    assert_eq!(app.current_lines().await.len(), 2);
    app.stop().await;
}

#[tokio::test]
async fn test_search_filters_current_tab() {
    let dir = tempfile::tempdir().unwrap();
    seed_contacts(dir.path());
    let config = test_config(dir.path());

    let mut app = ContactsApp::new(&config, dir.path().to_path_buf(), None).unwrap();
    assert!(app.start().await);
    app.controller().open_search().await;
    app.controller().search_query_changed("grace").await;

    assert_eq!(app.current_lines().await, vec!["(GH) Grace Hopper"]);
    app.stop().await;
}

#[tokio::test]
async fn test_denied_contacts_permission_stops_startup() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = test_config(dir.path());
    config.permissions.granted = vec![Permission::ReadStorage];

    let mut app = ContactsApp::new(&config, dir.path().to_path_buf(), None).unwrap();
    assert!(!app.start().await);
    app.stop().await;
}

// ----------------------------------------------------------------------------
// Import and export
// ----------------------------------------------------------------------------

#[tokio::test]
async fn test_content_reference_import_lands_in_store() {
    let dir = tempfile::tempdir().unwrap();
    let provider = dir.path().join("content/downloads");
    std::fs::create_dir_all(&provider).unwrap();
    std::fs::write(provider.join("backup"), json_lines(&sample_contacts())).unwrap();
    let config = test_config(dir.path());

    let mut app = ContactsApp::new(&config, dir.path().to_path_buf(), None).unwrap();
    assert!(app.start().await);
    let status = app
        .controller()
        .import_from("content://downloads/backup")
        .await
        .unwrap();

    assert_eq!(status, ImportStatus::Imported);
    assert_eq!(app.store().load_contacts().await.unwrap().len(), 4);
    assert_eq!(app.current_lines().await.len(), 4);
    app.stop().await;
}

#[tokio::test]
async fn test_launch_locator_is_imported_after_attach() {
    let dir = tempfile::tempdir().unwrap();
    let backup = dir.path().join("backup.vcf");
    std::fs::write(&backup, json_lines(&sample_contacts()[..2])).unwrap();
    let config = test_config(dir.path());

    let locator = backup.to_string_lossy().into_owned();
    let mut app = ContactsApp::new(&config, dir.path().to_path_buf(), Some(locator)).unwrap();
    assert!(app.start().await);

    assert_eq!(app.store().load_contacts().await.unwrap().len(), 2);
    app.stop().await;
}

#[tokio::test]
async fn test_unsupported_locator_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(dir.path());

    let mut app = ContactsApp::new(&config, dir.path().to_path_buf(), None).unwrap();
    assert!(app.start().await);
    let result = app
        .controller()
        .import_from("https://example.com/contacts.vcf")
        .await;

    assert!(matches!(result, Err(PipelineError::UnsupportedFormat { .. })));
    app.stop().await;
}

#[tokio::test]
async fn test_export_writes_json_lines() {
    let dir = tempfile::tempdir().unwrap();
    seed_contacts(dir.path());
    let config = test_config(dir.path());
    let output = dir.path().join("out/work.vcf");
    std::fs::create_dir_all(output.parent().unwrap()).unwrap();

    let mut app = ContactsApp::new(&config, dir.path().to_path_buf(), None).unwrap();
    assert!(app.start().await);
    let status = app
        .controller()
        .export_to(ExportRequest {
            destination: ExportDestination::new(&output),
            excluded_sources: HashSet::from([PHONE_SOURCE.to_string()]),
        })
        .await
        .unwrap();
    app.stop().await;

    assert_eq!(status, ExportStatus::Written(ExportOutcome::AllSucceeded));
    let written = std::fs::read_to_string(&output).unwrap();
    let (contacts, invalid) = contacts_cli::interchange::parse_contacts(&written);
    assert_eq!(invalid, 0);
    let names: Vec<String> = contacts.iter().map(|c| c.display_name(false)).collect();
    assert_eq!(names, vec!["Edsger Dijkstra", "Grace Hopper"]);
}

#[tokio::test]
async fn test_export_without_write_storage_is_silent() {
    let dir = tempfile::tempdir().unwrap();
    seed_contacts(dir.path());
    let mut config = test_config(dir.path());
    config.permissions.granted = vec![Permission::ReadContacts];
    let output = dir.path().join("denied.vcf");

    let mut app = ContactsApp::new(&config, dir.path().to_path_buf(), None).unwrap();
    assert!(app.start().await);
    let result = app
        .controller()
        .export_to(ExportRequest {
            destination: ExportDestination::new(&output),
            excluded_sources: HashSet::new(),
        })
        .await;
    app.stop().await;

    assert!(matches!(
        result,
        Err(PipelineError::PermissionDenied {
            permission: Permission::WriteStorage
        })
    ));
    assert!(!output.exists());

    // The command itself ends normally
    let cli = cli(Commands::Export {
        output: output.clone(),
        exclude: Vec::new(),
    });
    assert!(CommandDispatcher::execute(cli, config).await.is_ok());
    assert!(!output.exists());
}

#[tokio::test]
async fn test_notified_failures_only_set_the_exit_status() {
    let dir = tempfile::tempdir().unwrap();
    seed_contacts(dir.path());
    let config = test_config(dir.path());

    let import = cli(Commands::Import {
        locator: "https://example.com/contacts.vcf".to_string(),
    });
    let result = CommandDispatcher::execute(import, config.clone()).await;
    assert!(matches!(
        result,
        Err(CliError::Reported(PipelineError::UnsupportedFormat { .. }))
    ));

    let export = cli(Commands::Export {
        output: dir.path().join("nothing.vcf"),
        exclude: vec![PHONE_SOURCE.to_string(), WORK_SOURCE.to_string()],
    });
    let result = CommandDispatcher::execute(export, config).await;
    match result {
        Err(e) => {
            assert!(e.is_reported());
            assert!(matches!(e, CliError::Reported(PipelineError::NoEntries)));
        }
        Ok(()) => panic!("export of nothing succeeded"),
    }
}
