//! Resume State-Change Detector
//!
//! Compares the snapshot captured at the last pause with the live settings and
//! decides what a resume must do: restart the process, notify views about the
//! fields that changed and reload, or nothing.

use crate::config::ConfigSnapshot;
use crate::types::{FontSize, TabMask};
use crate::views::ViewRegistry;
use smallvec::SmallVec;
use tracing::debug;

// ----------------------------------------------------------------------------
// Decision Types
// ----------------------------------------------------------------------------

/// A setting the running views can absorb without a restart
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingChange {
    Thumbnails(bool),
    NameOrder { start_with_surname: bool },
    FontSize(FontSize),
}

impl SettingChange {
    /// Tabs whose loaded data depends on this setting
    pub fn reload_mask(&self) -> TabMask {
        match self {
            SettingChange::NameOrder { .. } => TabMask::CONTACTS | TabMask::FAVORITES,
            SettingChange::Thumbnails(_) | SettingChange::FontSize(_) => TabMask::EMPTY,
        }
    }

    /// Notify the affected live views; returns how many were notified
    pub fn apply_to(&self, registry: &ViewRegistry) -> usize {
        let mut notified = 0;
        for view in registry.live_views() {
            match *self {
                SettingChange::Thumbnails(show) => view.show_thumbnails_changed(show),
                SettingChange::NameOrder { start_with_surname } => {
                    if !view.tab().renders_display_names() {
                        continue;
                    }
                    view.name_order_changed(start_with_surname);
                }
                SettingChange::FontSize(size) => view.font_size_changed(size),
            }
            notified += 1;
        }
        notified
    }
}

/// Work a non-restarting resume performs
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ResumePlan {
    /// Changed fields, in evaluation order
    pub changes: SmallVec<[SettingChange; 3]>,
    /// Tabs to reload once the views have been notified
    pub reload: Option<TabMask>,
}

/// Terminal action of one resume evaluation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResumeAction {
    /// Terminate the process; nothing else in this resume runs
    Restart { reset_last_used_tab: bool },
    PartialRefresh(ResumePlan),
    NoOp,
}

impl ResumeAction {
    pub fn is_restart(&self) -> bool {
        matches!(self, ResumeAction::Restart { .. })
    }
}

/// Lifecycle facts the detector needs besides the two snapshots
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ResumeContext {
    /// The startup permission chain has finished
    pub permissions_handled: bool,
    /// This is the resume that directly follows creation
    pub first_resume: bool,
}

// ----------------------------------------------------------------------------
// Detector
// ----------------------------------------------------------------------------

/// Stateless evaluator of resume transitions
pub struct StateChangeDetector;

impl StateChangeDetector {
    /// Evaluate `live` against `stored`, field by field
    pub fn evaluate(
        stored: &ConfigSnapshot,
        live: &ConfigSnapshot,
        context: ResumeContext,
    ) -> ResumeAction {
        if stored.show_phone_numbers != live.show_phone_numbers {
            debug!("Phone number visibility changed, restart required");
            return ResumeAction::Restart {
                reset_last_used_tab: false,
            };
        }

        if stored.show_tabs != live.show_tabs {
            debug!(
                "Shown tabs changed from {:?} to {:?}, restart required",
                stored.show_tabs, live.show_tabs
            );
            return ResumeAction::Restart {
                reset_last_used_tab: true,
            };
        }

        let mut plan = ResumePlan::default();
        if stored.show_thumbnails != live.show_thumbnails {
            plan.changes.push(SettingChange::Thumbnails(live.show_thumbnails));
        }
        if stored.start_name_with_surname != live.start_name_with_surname {
            plan.changes.push(SettingChange::NameOrder {
                start_with_surname: live.start_name_with_surname,
            });
        }
        if stored.font_size != live.font_size {
            plan.changes.push(SettingChange::FontSize(live.font_size));
        }

        plan.reload = if context.permissions_handled && !context.first_resume {
            Some(TabMask::ALL)
        } else {
            let targeted = plan
                .changes
                .iter()
                .fold(TabMask::EMPTY, |mask, change| mask | change.reload_mask());
            let targeted = TabMask::from_bits_truncate(targeted.bits() & live.show_tabs.bits());
            (!targeted.is_empty()).then_some(targeted)
        };

        if plan.changes.is_empty() && plan.reload.is_none() {
            ResumeAction::NoOp
        } else {
            ResumeAction::PartialRefresh(plan)
        }
    }
}
