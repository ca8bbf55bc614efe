//! Core Types for the Contacts Browser
//!
//! Tab kinds, the display mask that selects and orders them, and the contact
//! record shape the views and pipelines pass around.

use core::fmt;
use core::ops::{BitOr, BitOrAssign};
use core::str::FromStr;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::sync::Arc;

// ----------------------------------------------------------------------------
// Tab Kinds
// ----------------------------------------------------------------------------

/// One of the views a browser window can show
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TabKind {
    Contacts,
    Favorites,
    Groups,
}

impl TabKind {
    /// Every tab kind in view-pager order
    pub const ALL: [TabKind; 3] = [TabKind::Contacts, TabKind::Favorites, TabKind::Groups];

    /// Bit this tab occupies in a [`TabMask`]
    pub const fn bit(self) -> u32 {
        match self {
            TabKind::Contacts => 1,
            TabKind::Favorites => 1 << 1,
            TabKind::Groups => 1 << 3,
        }
    }

    /// Slot of this tab in a fixed-size arena
    pub const fn slot(self) -> usize {
        match self {
            TabKind::Contacts => 0,
            TabKind::Favorites => 1,
            TabKind::Groups => 2,
        }
    }

    /// Whether the view for this tab renders formatted contact names
    pub const fn renders_display_names(self) -> bool {
        matches!(self, TabKind::Contacts | TabKind::Favorites)
    }
}

impl fmt::Display for TabKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TabKind::Contacts => write!(f, "contacts"),
            TabKind::Favorites => write!(f, "favorites"),
            TabKind::Groups => write!(f, "groups"),
        }
    }
}

impl FromStr for TabKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "contacts" => Ok(TabKind::Contacts),
            "favorites" => Ok(TabKind::Favorites),
            "groups" => Ok(TabKind::Groups),
            other => Err(format!("unknown tab '{}'", other)),
        }
    }
}

// ----------------------------------------------------------------------------
// Tab Mask
// ----------------------------------------------------------------------------

/// Bitset over [`TabKind`]; the order of set bits is the view-pager order
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TabMask(u32);

impl TabMask {
    pub const EMPTY: TabMask = TabMask(0);
    pub const CONTACTS: TabMask = TabMask(TabKind::Contacts.bit());
    pub const FAVORITES: TabMask = TabMask(TabKind::Favorites.bit());
    pub const GROUPS: TabMask = TabMask(TabKind::Groups.bit());
    pub const ALL: TabMask =
        TabMask(TabKind::Contacts.bit() | TabKind::Favorites.bit() | TabKind::Groups.bit());

    /// Build a mask from raw bits, dropping bits that name no tab
    pub const fn from_bits_truncate(bits: u32) -> Self {
        TabMask(bits & Self::ALL.0)
    }

    pub const fn bits(self) -> u32 {
        self.0
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub const fn contains(self, tab: TabKind) -> bool {
        self.0 & tab.bit() != 0
    }

    pub const fn union(self, other: TabMask) -> TabMask {
        TabMask(self.0 | other.0)
    }

    pub fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    /// Selected tabs in view-pager order
    pub fn tabs(self) -> SmallVec<[TabKind; 3]> {
        TabKind::ALL
            .iter()
            .copied()
            .filter(|tab| self.contains(*tab))
            .collect()
    }

    /// View-pager position of `tab`, if it is selected
    pub fn position_of(self, tab: TabKind) -> Option<usize> {
        self.tabs().iter().position(|t| *t == tab)
    }

    /// Tab shown at view-pager position `index`
    pub fn tab_at(self, index: usize) -> Option<TabKind> {
        self.tabs().get(index).copied()
    }
}

impl From<TabKind> for TabMask {
    fn from(tab: TabKind) -> Self {
        TabMask(tab.bit())
    }
}

impl BitOr for TabMask {
    type Output = TabMask;

    fn bitor(self, rhs: TabMask) -> TabMask {
        self.union(rhs)
    }
}

impl BitOrAssign for TabMask {
    fn bitor_assign(&mut self, rhs: TabMask) {
        self.0 |= rhs.0;
    }
}

impl fmt::Debug for TabMask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TabMask(")?;
        let tabs = self.tabs();
        if tabs.is_empty() {
            write!(f, "empty")?;
        }
        for (i, tab) in tabs.iter().enumerate() {
            if i > 0 {
                write!(f, "|")?;
            }
            write!(f, "{}", tab)?;
        }
        write!(f, ")")
    }
}

impl FromStr for TabMask {
    type Err = String;

    /// Parses `all` or a comma-separated list of tab names
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("all") {
            return Ok(TabMask::ALL);
        }
        s.split(',')
            .filter(|part| !part.trim().is_empty())
            .try_fold(TabMask::EMPTY, |mask, part| {
                Ok(mask | TabMask::from(part.trim().parse::<TabKind>()?))
            })
    }
}

// ----------------------------------------------------------------------------
// Display Settings
// ----------------------------------------------------------------------------

/// Text size used by every view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FontSize {
    Small,
    #[default]
    Medium,
    Large,
    ExtraLarge,
}

/// Which tab is selected when views are first attached
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DefaultTab {
    #[default]
    LastUsed,
    Contacts,
    Favorites,
    Groups,
}

// ----------------------------------------------------------------------------
// Contacts
// ----------------------------------------------------------------------------

/// Identifier of an account or storage a contact belongs to
pub type SourceId = String;

/// A contact as seen by the coordination layer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    pub id: u64,
    pub first_name: String,
    pub surname: String,
    /// Account or storage the record lives in
    pub source: SourceId,
    #[serde(default)]
    pub starred: bool,
    #[serde(default)]
    pub groups: Vec<String>,
    #[serde(default)]
    pub phone_numbers: Vec<String>,
}

impl Contact {
    pub fn new(id: u64, first_name: impl Into<String>, surname: impl Into<String>) -> Self {
        Self {
            id,
            first_name: first_name.into(),
            surname: surname.into(),
            source: SourceId::new(),
            starred: false,
            groups: Vec::new(),
            phone_numbers: Vec::new(),
        }
    }

    pub fn with_source(mut self, source: impl Into<SourceId>) -> Self {
        self.source = source.into();
        self
    }

    pub fn starred(mut self) -> Self {
        self.starred = true;
        self
    }

    /// Name formatted according to the sort-name convention
    pub fn display_name(&self, start_with_surname: bool) -> String {
        let (first, second) = if start_with_surname {
            (&self.surname, &self.first_name)
        } else {
            (&self.first_name, &self.surname)
        };
        match (first.is_empty(), second.is_empty()) {
            (true, _) => second.clone(),
            (_, true) => first.clone(),
            _ => format!("{} {}", first, second),
        }
    }
}

/// A full contact list as produced by one load
pub type ContactList = Vec<Contact>;

/// One load's dataset, shared by every view that receives it
pub type SharedContacts = Arc<ContactList>;
