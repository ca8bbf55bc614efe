//! Configuration Snapshot
//!
//! An immutable copy of the settings that shape view composition. The
//! controller captures one on every pause and compares it by value against the
//! live settings on every resume.

use crate::types::{DefaultTab, FontSize, TabKind, TabMask};
use serde::{Deserialize, Serialize};

// ----------------------------------------------------------------------------
// Config Snapshot
// ----------------------------------------------------------------------------

/// Value copy of the observable display settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfigSnapshot {
    pub show_thumbnails: bool,
    pub show_phone_numbers: bool,
    pub start_name_with_surname: bool,
    pub show_tabs: TabMask,
    pub font_size: FontSize,
    pub default_tab: DefaultTab,
    pub last_used_tab_index: usize,
}

impl Default for ConfigSnapshot {
    fn default() -> Self {
        Self {
            show_thumbnails: true,
            show_phone_numbers: false,
            start_name_with_surname: false,
            show_tabs: TabMask::ALL,
            font_size: FontSize::default(),
            default_tab: DefaultTab::default(),
            last_used_tab_index: 0,
        }
    }
}

impl ConfigSnapshot {
    /// View-pager position selected when views are first attached
    pub fn default_tab_index(&self) -> usize {
        match self.default_tab {
            DefaultTab::LastUsed => self.last_used_tab_index,
            DefaultTab::Contacts => 0,
            DefaultTab::Favorites => usize::from(self.show_tabs.contains(TabKind::Contacts)),
            DefaultTab::Groups => self.show_tabs.position_of(TabKind::Groups).unwrap_or(0),
        }
    }

    pub fn with_tabs(mut self, show_tabs: TabMask) -> Self {
        self.show_tabs = show_tabs;
        self
    }
}
