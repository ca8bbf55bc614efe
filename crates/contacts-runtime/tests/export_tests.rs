//! Integration tests for the export pipeline
//!
//! Checks sink acquisition on both platform paths, the single close of every
//! acquired sink, the empty-set short circuit and the outcome-to-notice
//! mapping.

mod common;

use common::{started, TestEnv};
use contacts_core::{
    ConfigSnapshot, ExportChoice, ExportDestination, ExportOutcome, ExportRequest, Notice,
    Permission, PipelineError,
};
use contacts_harness::{
    MockDialogs, MockPermissionGate, MockPicker, MockWriter, PickerMode, PHONE_SOURCE, WORK_SOURCE,
};
use contacts_runtime::ExportStatus;
use std::collections::HashSet;
use std::path::PathBuf;
use tokio_test::{assert_err, assert_ok};

fn request(path: impl Into<PathBuf>, excluded: &[&str]) -> ExportRequest {
    ExportRequest {
        destination: ExportDestination::new(path),
        excluded_sources: excluded.iter().map(|s| s.to_string()).collect(),
    }
}

fn picker_env() -> TestEnv {
    TestEnv::new(ConfigSnapshot::default()).with_picker(MockPicker::new(PickerMode::Provide, None))
}

// ----------------------------------------------------------------------------
// Document Picker Path
// ----------------------------------------------------------------------------

#[tokio::test]
async fn test_picker_export_writes_and_closes_once() {
    let env = picker_env();
    let (controller, _) = started(&env).await;

    let status = assert_ok!(
        controller
            .export_to(request("/exports/friends.vcf", &[]))
            .await
    );

    assert_eq!(status, ExportStatus::Written(ExportOutcome::AllSucceeded));
    assert_eq!(env.picker.created_names(), vec!["friends.vcf".to_string()]);
    let log = env.picker.sink_log();
    assert_eq!(log.close_count(), 1);
    assert_eq!(
        log.contents(),
        "Ada Lovelace\nAlan Turing\nGrace Hopper\nEdsger Dijkstra\n"
    );
    assert_eq!(env.notifier.notices(), vec![Notice::ExportSucceeded]);
}

#[tokio::test]
async fn test_missing_picker_is_feature_unavailable() {
    let env =
        TestEnv::new(ConfigSnapshot::default()).with_picker(MockPicker::new(PickerMode::NoHandler, None));
    let (controller, _) = started(&env).await;

    let err = assert_err!(controller.export_to(request("out.vcf", &[])).await);

    assert!(matches!(err, PipelineError::FeatureUnavailable { .. }));
    assert_eq!(env.notifier.notices(), vec![Notice::SystemServiceDisabled]);
    assert_eq!(env.writer.call_count(), 0);
    assert_eq!(env.data.export_load_count(), 0);
}

#[tokio::test]
async fn test_cancelled_picker_is_silent() {
    let env =
        TestEnv::new(ConfigSnapshot::default()).with_picker(MockPicker::new(PickerMode::Cancel, None));
    let (controller, _) = started(&env).await;

    let status = assert_ok!(controller.export_to(request("out.vcf", &[])).await);

    assert_eq!(status, ExportStatus::Cancelled);
    assert!(env.notifier.notices().is_empty());
    assert_eq!(env.writer.call_count(), 0);
}

// ----------------------------------------------------------------------------
// Outcomes
// ----------------------------------------------------------------------------

#[tokio::test]
async fn test_empty_contact_set_is_no_entries() {
    let env = picker_env();
    let (controller, _) = started(&env).await;

    let err = assert_err!(
        controller
            .export_to(request("out.vcf", &[PHONE_SOURCE, WORK_SOURCE]))
            .await
    );

    assert!(matches!(err, PipelineError::NoEntries));
    assert_eq!(env.writer.call_count(), 0);
    assert_eq!(env.picker.sink_log().close_count(), 1);
    assert_eq!(env.notifier.notices(), vec![Notice::NoEntriesForExport]);
}

#[tokio::test]
async fn test_excluded_sources_are_not_written() {
    let env = picker_env();
    let (controller, _) = started(&env).await;

    assert_ok!(
        controller
            .export_to(request("out.vcf", &[WORK_SOURCE]))
            .await
    );

    assert_eq!(env.writer.written_ids(), vec![1, 2]);
}

#[tokio::test]
async fn test_partial_outcome_maps_to_partial_notice() {
    let mut env = picker_env();
    env.writer = MockWriter::new(ExportOutcome::PartiallySucceeded);
    let (controller, _) = started(&env).await;

    let status = assert_ok!(controller.export_to(request("out.vcf", &[])).await);

    assert_eq!(status, ExportStatus::Written(ExportOutcome::PartiallySucceeded));
    assert_eq!(env.notifier.notices(), vec![Notice::ExportPartiallyFailed]);
    assert_eq!(env.picker.sink_log().close_count(), 1);
}

#[tokio::test]
async fn test_failed_outcome_maps_to_failure_notice() {
    let mut env = picker_env();
    env.writer = MockWriter::new(ExportOutcome::Failed);
    let (controller, _) = started(&env).await;

    let status = assert_ok!(controller.export_to(request("out.vcf", &[])).await);

    assert_eq!(status, ExportStatus::Written(ExportOutcome::Failed));
    assert_eq!(env.notifier.notices(), vec![Notice::ExportFailed]);
    assert_eq!(env.picker.sink_log().close_count(), 1);
}

#[tokio::test]
async fn test_load_failure_still_closes_sink() {
    let env = picker_env();
    let (controller, _) = started(&env).await;
    env.data.fail_loads("store offline");

    let err = assert_err!(controller.export_to(request("out.vcf", &[])).await);

    assert!(matches!(err, PipelineError::GenericIoFailure { .. }));
    assert_eq!(env.picker.sink_log().close_count(), 1);
    assert_eq!(env.writer.call_count(), 0);
    assert_eq!(env.notifier.notices().len(), 1);
}

// ----------------------------------------------------------------------------
// Legacy Path
// ----------------------------------------------------------------------------

#[tokio::test]
async fn test_denied_write_storage_aborts_silently() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("contacts.vcf");
    let mut env = TestEnv::new(ConfigSnapshot::default());
    env.permissions = MockPermissionGate::denying(&[Permission::WriteStorage]);
    let (controller, _) = started(&env).await;

    let err = assert_err!(controller.export_to(request(&path, &[])).await);

    assert!(matches!(
        err,
        PipelineError::PermissionDenied {
            permission: Permission::WriteStorage
        }
    ));
    assert!(env.notifier.notices().is_empty());
    assert_eq!(env.writer.call_count(), 0);
    assert!(!path.exists());
}

#[tokio::test]
async fn test_legacy_export_writes_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("contacts.vcf");
    let env = TestEnv::new(ConfigSnapshot::default());
    let (controller, _) = started(&env).await;

    let status = assert_ok!(controller.export_to(request(&path, &[PHONE_SOURCE])).await);

    assert_eq!(status, ExportStatus::Written(ExportOutcome::AllSucceeded));
    assert_eq!(
        std::fs::read_to_string(&path).unwrap(),
        "Grace Hopper\nEdsger Dijkstra\n"
    );
    assert_eq!(env.notifier.notices(), vec![Notice::ExportSucceeded]);
    assert!(env.permissions.requests().contains(&Permission::WriteStorage));
}

#[tokio::test]
async fn test_unwritable_destination_is_generic_failure() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("missing").join("contacts.vcf");
    let env = TestEnv::new(ConfigSnapshot::default());
    let (controller, _) = started(&env).await;

    let err = assert_err!(controller.export_to(request(&path, &[])).await);

    assert!(matches!(err, PipelineError::GenericIoFailure { .. }));
    assert_eq!(env.writer.call_count(), 0);
}

// ----------------------------------------------------------------------------
// Interactive Export
// ----------------------------------------------------------------------------

#[tokio::test]
async fn test_interactive_export_remembers_folder() {
    let dir = tempfile::tempdir().unwrap();
    let destination = dir.path().join("contacts.vcf");
    let mut env = TestEnv::new(ConfigSnapshot::default());
    env.dialogs = MockDialogs::new(
        None,
        Some(ExportChoice {
            destination: destination.clone(),
            excluded_sources: HashSet::new(),
        }),
    );
    env.settings.set_last_export(Some(PathBuf::from("/previous")));
    let (controller, _) = started(&env).await;

    let status = assert_ok!(controller.export_interactive().await);

    assert_eq!(status, ExportStatus::Written(ExportOutcome::AllSucceeded));
    assert_eq!(
        env.dialogs.export_seeds(),
        vec![(Some(PathBuf::from("/previous")), false)]
    );
    assert_eq!(
        contacts_core::SettingsStore::last_export_path(env.settings.as_ref()),
        Some(dir.path().to_path_buf())
    );
    assert!(destination.exists());
}

#[tokio::test]
async fn test_dismissed_export_dialog_does_nothing() {
    let env = TestEnv::new(ConfigSnapshot::default());
    let (controller, _) = started(&env).await;

    let status = assert_ok!(controller.export_interactive().await);

    assert_eq!(status, ExportStatus::Cancelled);
    assert_eq!(env.dialogs.export_seeds(), vec![(None, false)]);
    assert!(env.notifier.notices().is_empty());
    assert_eq!(env.data.export_load_count(), 0);
}
