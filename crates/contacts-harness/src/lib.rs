//! Contacts Harness
//!
//! Shared fixtures for the contacts browser crates and, behind the `testing`
//! feature, recording mocks for every collaborator contract in
//! `contacts-core`.

pub mod fixtures;

#[cfg(feature = "testing")]
pub mod mock_data;
#[cfg(feature = "testing")]
pub mod mock_platform;
#[cfg(feature = "testing")]
pub mod mock_transfer;
#[cfg(feature = "testing")]
pub mod mock_views;

pub use fixtures::*;

#[cfg(feature = "testing")]
pub use mock_data::MockDataAccess;
#[cfg(feature = "testing")]
pub use mock_platform::{MockPermissionGate, MockProcess, MockSettings, RecordingNotifier};
#[cfg(feature = "testing")]
pub use mock_transfer::{
    MockConfirmer, MockDialogs, MockPicker, MockResolver, MockTempFiles, MockWriter, PickerMode,
    RecordingSink, SinkLog,
};
#[cfg(feature = "testing")]
pub use mock_views::{as_contact_views, recording_views, RecordingView, ViewEvent};

#[cfg(feature = "testing")]
pub(crate) fn lock<T>(mutex: &std::sync::Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
}
