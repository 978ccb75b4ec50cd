//! Core type definitions for the converter
//!
//! These types map directly to Safari's content blocker JSON schema and
//! are shared by the compiler, the matcher and the CLI.

use serde::ser::{SerializeSeq, Serializer};
use serde::Serialize;

// =============================================================================
// Action Types (matches action.type)
// =============================================================================

/// Action to take when a trigger matches.
///
/// The first three variants are understood by Safari natively. The rest only
/// appear in the advanced blocking payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ActionType {
    /// Cancel the request
    Block,
    /// Hide elements matching `selector`
    CssDisplayNone,
    /// Cancel every previously triggered action (exception rules)
    IgnorePreviousRules,
    /// Extended CSS, applied by the advanced blocking engine
    CssExtended,
    /// Raw CSS injection
    CssInject,
    /// Script injection
    Script,
    /// Scriptlet injection
    Scriptlet,
}

impl ActionType {
    /// Schema name of the action.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Block => "block",
            Self::CssDisplayNone => "css-display-none",
            Self::IgnorePreviousRules => "ignore-previous-rules",
            Self::CssExtended => "css-extended",
            Self::CssInject => "css-inject",
            Self::Script => "script",
            Self::Scriptlet => "scriptlet",
        }
    }

    /// Whether the action can only be carried by the advanced blocking payload.
    pub const fn is_advanced(self) -> bool {
        matches!(
            self,
            Self::CssExtended | Self::CssInject | Self::Script | Self::Scriptlet
        )
    }
}

// =============================================================================
// Resource Types (trigger.resource-type)
// =============================================================================

bitflags::bitflags! {
    /// Safari resource type set.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ResourceTypes: u16 {
        const DOCUMENT = 1 << 0;
        const IMAGE = 1 << 1;
        const STYLE_SHEET = 1 << 2;
        const SCRIPT = 1 << 3;
        const FONT = 1 << 4;
        /// Catch-all used by Safari before `fetch`/`websocket`/`other` existed
        const RAW = 1 << 5;
        const MEDIA = 1 << 7;
        const POPUP = 1 << 8;
        const PING = 1 << 9;
        const FETCH = 1 << 10;
        const WEBSOCKET = 1 << 11;
        const OTHER = 1 << 12;

        /// Every request type a filter without type options applies to.
        /// Popups are opt-in in filter syntax and `raw` is only produced
        /// by the version filter.
        const ALL_REQUESTS = Self::DOCUMENT.bits()
            | Self::IMAGE.bits()
            | Self::STYLE_SHEET.bits()
            | Self::SCRIPT.bits()
            | Self::FONT.bits()
            | Self::MEDIA.bits()
            | Self::PING.bits()
            | Self::FETCH.bits()
            | Self::WEBSOCKET.bits()
            | Self::OTHER.bits();
    }
}

const RESOURCE_TYPE_NAMES: [(ResourceTypes, &str); 12] = [
    (ResourceTypes::DOCUMENT, "document"),
    (ResourceTypes::IMAGE, "image"),
    (ResourceTypes::STYLE_SHEET, "style-sheet"),
    (ResourceTypes::SCRIPT, "script"),
    (ResourceTypes::FONT, "font"),
    (ResourceTypes::RAW, "raw"),
    (ResourceTypes::MEDIA, "media"),
    (ResourceTypes::POPUP, "popup"),
    (ResourceTypes::PING, "ping"),
    (ResourceTypes::FETCH, "fetch"),
    (ResourceTypes::WEBSOCKET, "websocket"),
    (ResourceTypes::OTHER, "other"),
];

impl ResourceTypes {
    /// Schema names of the set members, in schema order.
    pub fn names(self) -> impl Iterator<Item = &'static str> {
        RESOURCE_TYPE_NAMES
            .iter()
            .filter(move |(flag, _)| self.contains(*flag))
            .map(|(_, name)| *name)
    }

    /// Parse a single schema name.
    pub fn from_schema_name(name: &str) -> Option<Self> {
        RESOURCE_TYPE_NAMES
            .iter()
            .find(|(_, n)| *n == name)
            .map(|(flag, _)| *flag)
    }
}

impl Serialize for ResourceTypes {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(None)?;
        for name in self.names() {
            seq.serialize_element(name)?;
        }
        seq.end()
    }
}

// =============================================================================
// Load Types (trigger.load-type)
// =============================================================================

bitflags::bitflags! {
    /// First-party / third-party restriction.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct LoadTypes: u8 {
        const FIRST_PARTY = 1 << 0;
        const THIRD_PARTY = 1 << 1;
        const ALL = Self::FIRST_PARTY.bits() | Self::THIRD_PARTY.bits();
    }
}

impl LoadTypes {
    pub fn names(self) -> impl Iterator<Item = &'static str> {
        [
            (Self::FIRST_PARTY, "first-party"),
            (Self::THIRD_PARTY, "third-party"),
        ]
        .into_iter()
        .filter(move |(flag, _)| self.contains(*flag))
        .map(|(_, name)| name)
    }
}

impl Serialize for LoadTypes {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(None)?;
        for name in self.names() {
            seq.serialize_element(name)?;
        }
        seq.end()
    }
}
