//! Integration tests for the import pipeline
//!
//! Each locator kind is routed through the controller and checked for the
//! collaborators it touches, the notice it produces and the reload it
//! triggers.

mod common;

use common::{started, TestEnv};
use contacts_core::{ConfigSnapshot, Notice, Permission, PipelineError};
use contacts_harness::{MockConfirmer, MockPermissionGate, MockPicker, MockTempFiles, PickerMode};
use contacts_runtime::ImportStatus;
use std::path::PathBuf;
use tokio_test::{assert_err, assert_ok};

const VCARD: &str = "BEGIN:VCARD\nVERSION:3.0\nFN:Barbara Liskov\nEND:VCARD\n";

fn vcard_file(dir: &tempfile::TempDir) -> PathBuf {
    let path = dir.path().join("backup.vcf");
    std::fs::write(&path, VCARD).unwrap();
    path
}

// ----------------------------------------------------------------------------
// Locator Routing
// ----------------------------------------------------------------------------

#[tokio::test]
async fn test_local_path_is_used_directly() {
    let env = TestEnv::new(ConfigSnapshot::default());
    let (controller, views) = started(&env).await;
    let dir = tempfile::tempdir().unwrap();
    let path = vcard_file(&dir);

    let status = assert_ok!(controller.import_from(path.to_str().unwrap()).await);

    assert_eq!(status, ImportStatus::Imported);
    assert_eq!(env.confirmer.prompted_paths(), vec![path]);
    assert_eq!(env.temp_files.allocation_count(), 0);
    assert_eq!(env.resolver.open_count(), 0);
    // Initial load plus the post-import reload of every tab
    assert_eq!(env.data.load_count(), 2);
    assert!(views.iter().all(|view| view.refresh_count() == 2));
    assert!(env.notifier.notices().is_empty());
}

#[tokio::test]
async fn test_file_url_is_used_directly() {
    let env = TestEnv::new(ConfigSnapshot::default());
    let (controller, _) = started(&env).await;
    let dir = tempfile::tempdir().unwrap();
    let path = vcard_file(&dir);
    let locator = format!("file://{}", path.display());

    assert_eq!(
        assert_ok!(controller.import_from(&locator).await),
        ImportStatus::Imported
    );
    assert_eq!(env.confirmer.prompted_paths(), vec![path]);
    assert_eq!(env.temp_files.allocation_count(), 0);
}

#[tokio::test]
async fn test_content_reference_is_copied_to_temp_file() {
    let env = TestEnv::new(ConfigSnapshot::default());
    env.resolver.insert("content://downloads/document/7", VCARD);
    let (controller, _) = started(&env).await;

    let status = assert_ok!(
        controller
            .import_from("content://downloads/document/7")
            .await
    );

    assert_eq!(status, ImportStatus::Imported);
    assert_eq!(env.temp_files.allocation_count(), 1);
    assert_eq!(env.resolver.open_count(), 1);
    assert_eq!(env.confirmer.prompted_contents(), vec![VCARD.as_bytes().to_vec()]);
    assert!(env.confirmer.prompted_paths()[0].ends_with("import-0.vcf"));
    assert_eq!(env.data.load_count(), 2);
}

#[tokio::test]
async fn test_missing_temp_file_is_resource_unavailable() {
    let mut env = TestEnv::new(ConfigSnapshot::default());
    env.temp_files = MockTempFiles::exhausted();
    env.resolver.insert("content://downloads/document/7", VCARD);
    let (controller, _) = started(&env).await;

    let err = assert_err!(
        controller
            .import_from("content://downloads/document/7")
            .await
    );

    assert!(matches!(err, PipelineError::ResourceUnavailable { .. }));
    assert_eq!(env.notifier.notices(), vec![Notice::UnknownError]);
    assert!(env.confirmer.prompted_paths().is_empty());
    assert_eq!(env.data.load_count(), 1);
}

#[tokio::test]
async fn test_unreadable_content_is_generic_failure() {
    let env = TestEnv::new(ConfigSnapshot::default());
    env.resolver.insert_broken("content://downloads/document/9");
    let (controller, _) = started(&env).await;

    let err = assert_err!(
        controller
            .import_from("content://downloads/document/9")
            .await
    );

    assert!(matches!(err, PipelineError::GenericIoFailure { .. }));
    assert!(matches!(env.notifier.notices().as_slice(), [Notice::Error(_)]));
    assert!(env.confirmer.prompted_paths().is_empty());
}

#[tokio::test]
async fn test_unknown_scheme_is_rejected_without_side_effects() {
    let env = TestEnv::new(ConfigSnapshot::default());
    let (controller, _) = started(&env).await;

    let err = assert_err!(
        controller
            .import_from("https://example.com/contacts.vcf")
            .await
    );

    match err {
        PipelineError::UnsupportedFormat { scheme } => assert_eq!(scheme, "https"),
        other => panic!("expected unsupported format, got {:?}", other),
    }
    assert_eq!(env.notifier.notices(), vec![Notice::InvalidFileFormat]);
    assert_eq!(env.temp_files.allocation_count(), 0);
    assert_eq!(env.resolver.open_count(), 0);
    assert!(env.confirmer.prompted_paths().is_empty());
    assert_eq!(env.data.load_count(), 1);
}

#[tokio::test]
async fn test_declined_import_does_not_reload() {
    let mut env = TestEnv::new(ConfigSnapshot::default());
    env.confirmer = MockConfirmer::declining();
    let (controller, views) = started(&env).await;
    let dir = tempfile::tempdir().unwrap();
    let path = vcard_file(&dir);

    let status = assert_ok!(controller.import_from(path.to_str().unwrap()).await);

    assert_eq!(status, ImportStatus::Declined);
    assert_eq!(env.data.load_count(), 1);
    assert!(views.iter().all(|view| view.refresh_count() == 1));
    assert!(env.notifier.notices().is_empty());
}

#[tokio::test]
async fn test_launch_locator_is_imported_after_attach() {
    let env = TestEnv::new(ConfigSnapshot::default());
    env.resolver.insert("content://mail/attachment/3", VCARD);
    let mut controller = env
        .builder()
        .launch_locator("content://mail/attachment/3")
        .build();
    controller.on_create().await;
    assert!(env.confirmer.prompted_paths().is_empty());

    let views = contacts_harness::recording_views(contacts_core::TabMask::ALL);
    controller
        .attach_views(&contacts_harness::as_contact_views(&views))
        .await;

    assert_eq!(env.confirmer.prompted_paths().len(), 1);
    assert_eq!(env.data.load_count(), 2);
}

// ----------------------------------------------------------------------------
// Interactive Import
// ----------------------------------------------------------------------------

#[tokio::test]
async fn test_picker_import_resolves_picked_reference() {
    let env = TestEnv::new(ConfigSnapshot::default()).with_picker(MockPicker::new(
        PickerMode::Provide,
        Some("content://downloads/document/11"),
    ));
    env.resolver.insert("content://downloads/document/11", VCARD);
    let (controller, _) = started(&env).await;

    let status = assert_ok!(controller.import_interactive().await);

    assert_eq!(status, ImportStatus::Imported);
    assert_eq!(env.picker.pick_count(), 1);
    assert_eq!(env.dialogs.import_prompt_count(), 0);
    assert_eq!(env.temp_files.allocation_count(), 1);
}

#[tokio::test]
async fn test_missing_picker_is_feature_unavailable() {
    let env =
        TestEnv::new(ConfigSnapshot::default()).with_picker(MockPicker::new(PickerMode::NoHandler, None));
    let (controller, _) = started(&env).await;

    let err = assert_err!(controller.import_interactive().await);

    assert!(matches!(err, PipelineError::FeatureUnavailable { .. }));
    assert_eq!(env.notifier.notices(), vec![Notice::SystemServiceDisabled]);
}

#[tokio::test]
async fn test_cancelled_picker_is_silent() {
    let env =
        TestEnv::new(ConfigSnapshot::default()).with_picker(MockPicker::new(PickerMode::Cancel, None));
    let (controller, _) = started(&env).await;

    assert_eq!(
        assert_ok!(controller.import_interactive().await),
        ImportStatus::Cancelled
    );
    assert!(env.notifier.notices().is_empty());
    assert!(env.confirmer.prompted_paths().is_empty());
}

#[tokio::test]
async fn test_legacy_import_requires_read_storage() {
    let mut env = TestEnv::new(ConfigSnapshot::default());
    env.permissions = MockPermissionGate::denying(&[Permission::ReadStorage]);
    let (controller, _) = started(&env).await;

    let err = assert_err!(controller.import_interactive().await);

    assert!(matches!(
        err,
        PipelineError::PermissionDenied {
            permission: Permission::ReadStorage
        }
    ));
    assert!(env.notifier.notices().is_empty());
    assert_eq!(env.dialogs.import_prompt_count(), 0);
}

#[tokio::test]
async fn test_legacy_import_uses_chosen_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = vcard_file(&dir);
    let mut env = TestEnv::new(ConfigSnapshot::default());
    env.dialogs = contacts_harness::MockDialogs::new(Some(path.clone()), None);
    let (controller, _) = started(&env).await;

    assert_eq!(
        assert_ok!(controller.import_interactive().await),
        ImportStatus::Imported
    );
    assert_eq!(env.confirmer.prompted_paths(), vec![path]);
    assert_eq!(env.picker.pick_count(), 0);
}
