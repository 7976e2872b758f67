//! Domain model types for Cardpicker.
//!
//! This module defines the card data returned by the catalog:
//! - [`CardRecord`] - A single card as decoded from the catalog
//! - [`CatalogPage`] - One page of catalog results
//! - [`CardClass`], [`CardType`], [`Rarity`] - Closed enumerations with numeric wire ids
//! - [`CardSet`] - Numeric set identifier with display names for known sets
//!
//! Numeric ids the enumerations do not know are preserved in an `Unknown`
//! variant rather than rejected, so a new class or rarity on the catalog
//! side never breaks decoding.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Declares an enumeration that travels as a number on the wire.
macro_rules! wire_enum {
    (
        $(#[$meta:meta])*
        $name:ident {
            $($variant:ident = $id:literal => $label:literal,)+
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(from = "i64", into = "i64")]
        pub enum $name {
            $($variant,)+
            /// A numeric id this crate has no name for.
            Unknown(i64),
        }

        impl $name {
            /// The numeric id used by the catalog.
            pub fn id(self) -> i64 {
                match self {
                    $(Self::$variant => $id,)+
                    Self::Unknown(id) => id,
                }
            }

            /// Human-readable name.
            pub fn name(self) -> &'static str {
                match self {
                    $(Self::$variant => $label,)+
                    Self::Unknown(0) => "invalid",
                    Self::Unknown(_) => "unknown",
                }
            }
        }

        impl From<i64> for $name {
            fn from(id: i64) -> Self {
                match id {
                    $($id => Self::$variant,)+
                    other => Self::Unknown(other),
                }
            }
        }

        impl From<$name> for i64 {
            fn from(value: $name) -> Self {
                value.id()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.name())
            }
        }
    };
}

wire_enum! {
    /// Hero class a card belongs to.
    CardClass {
        DeathKnight = 1 => "deathknight",
        Druid = 2 => "druid",
        Hunter = 3 => "hunter",
        Mage = 4 => "mage",
        Paladin = 5 => "paladin",
        Priest = 6 => "priest",
        Rogue = 7 => "rogue",
        Shaman = 8 => "shaman",
        Warlock = 9 => "warlock",
        Warrior = 10 => "warrior",
        Dream = 11 => "dream",
        Neutral = 12 => "neutral",
        Whizbang = 13 => "whizbang",
        DemonHunter = 14 => "demonhunter",
    }
}

wire_enum! {
    /// Kind of card (minion, spell, ...).
    CardType {
        Game = 1 => "game",
        Player = 2 => "player",
        Hero = 3 => "hero",
        Minion = 4 => "minion",
        Spell = 5 => "spell",
        Enchantment = 6 => "enchantment",
        Weapon = 7 => "weapon",
        Item = 8 => "item",
        Token = 9 => "token",
        HeroPower = 10 => "hero power",
    }
}

wire_enum! {
    /// Card rarity.
    Rarity {
        Common = 1 => "common",
        Free = 2 => "free",
        Rare = 3 => "rare",
        Epic = 4 => "epic",
        Legendary = 5 => "legendary",
    }
}

/// Card set (expansion) identifier.
///
/// The catalog adds sets regularly, so this stays an open numeric id with a
/// lookup table for display names instead of a closed enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CardSet(pub i64);

const KNOWN_SETS: &[(i64, &str)] = &[
    (2, "Basic"),
    (3, "Classic"),
    (4, "Hall of Fame"),
    (12, "Curse of Naxxramas"),
    (13, "Goblins vs Gnomes"),
    (14, "Blackrock Mountain"),
    (15, "The Grand Tournament"),
    (20, "The League of Explorers"),
    (21, "Whispers of the Old Gods"),
    (23, "One Night in Karazhan"),
    (25, "Mean Streets of Gadgetzan"),
    (27, "Journey to Un'Goro"),
    (1001, "Knights of the Frozen Throne"),
    (1004, "Kobolds & Catacombs"),
    (1125, "The Witchwood"),
    (1127, "The Boomsday Project"),
    (1129, "Rastakhan's Rumble"),
    (1130, "Rise of Shadows"),
    (1158, "Saviours of Uldum"),
    (1347, "Descent of Dragons"),
    (1414, "Ashes of Outland"),
    (1443, "Scholomance Academy"),
    (1453, "Battlegrounds"),
    (1463, "Demon Hunter Initiate"),
    (1466, "Madness at the Darkmoon Faire"),
    (1525, "Forged in the Barrens"),
    (1559, "Wailing Caverns"),
    (1578, "United in Stormwind"),
    (1586, "Mercenaries"),
    (1626, "Fractured in Alterac Valley"),
    (1635, "Legacy"),
    (1637, "Core"),
    (1646, "Vanilla"),
    (1658, "Voyage to the Sunken City"),
    (1691, "Murder at Castle Nathria"),
    (1776, "March of the Lich King"),
    (1809, "Festival of Legends"),
    (1858, "TITANS"),
    (1869, "Path of Arthas"),
    (1892, "Showdown in the Badlands"),
    (1898, "Caverns of Time"),
    (1904, "Tutorial"),
];

impl CardSet {
    /// The numeric id used by the catalog.
    pub fn id(self) -> i64 {
        self.0
    }

    /// Display name, if this set is one of the known expansions.
    pub fn name(self) -> Option<&'static str> {
        KNOWN_SETS
            .iter()
            .find(|(id, _)| *id == self.0)
            .map(|(_, name)| *name)
    }
}

impl fmt::Display for CardSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => f.write_str(name),
            None => write!(f, "set {}", self.0),
        }
    }
}

/// A single card as returned by the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardRecord {
    /// Catalog-unique identifier.
    pub id: i64,

    #[serde(rename = "classId")]
    pub class: CardClass,

    #[serde(rename = "cardTypeId")]
    pub card_type: CardType,

    #[serde(rename = "cardSetId")]
    pub card_set: CardSet,

    #[serde(rename = "rarityId")]
    pub rarity: Rarity,

    pub mana_cost: i64,

    pub name: String,

    /// Rules text; may contain catalog markup.
    #[serde(default)]
    pub text: String,

    /// URL of the rendered card image.
    #[serde(default)]
    pub image: String,
}

/// One page of catalog results.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogPage {
    pub cards: Vec<CardRecord>,

    /// Total number of pages the server reports for this query.
    pub page_count: u32,
}
