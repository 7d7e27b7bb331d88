use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Enumerations
// ---------------------------------------------------------------------------

/// The card frame: which of the three families a card belongs to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum CardType {
    #[default]
    Monster,
    Spell,
    Trap,
}

impl CardType {
    pub fn as_str(&self) -> &'static str {
        match self {
            CardType::Monster => "Monster",
            CardType::Spell => "Spell",
            CardType::Trap => "Trap",
        }
    }

    /// Parse a card frame name, ignoring case.
    pub fn parse(value: &str) -> Option<Self> {
        [CardType::Monster, CardType::Spell, CardType::Trap]
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(value.trim()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Attribute {
    Light,
    Dark,
    Water,
    Fire,
    Earth,
    Wind,
    Divine,
}

impl Attribute {
    pub const ALL: [Attribute; 7] = [
        Attribute::Light,
        Attribute::Dark,
        Attribute::Water,
        Attribute::Fire,
        Attribute::Earth,
        Attribute::Wind,
        Attribute::Divine,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Attribute::Light => "LIGHT",
            Attribute::Dark => "DARK",
            Attribute::Water => "WATER",
            Attribute::Fire => "FIRE",
            Attribute::Earth => "EARTH",
            Attribute::Wind => "WIND",
            Attribute::Divine => "DIVINE",
        }
    }

    /// Parse a stored attribute, ignoring case. Unknown values yield `None`.
    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|a| a.as_str().eq_ignore_ascii_case(value.trim()))
    }
}

/// Structural monster kind, derived once from the stored subtype.
///
/// Rule and sort logic branch on this instead of re-inspecting subtype
/// strings. Pendulum is orthogonal (an Xyz can also be a Pendulum) and is
/// tracked separately on [`MonsterCard::pendulum`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MonsterKind {
    /// Any monster that lives in the main deck and has a level.
    #[default]
    Main,
    Fusion,
    Synchro,
    Xyz,
    Link,
}

impl MonsterKind {
    pub fn from_subtype(subtype: Option<&str>) -> Self {
        let Some(subtype) = subtype.map(str::trim) else {
            return MonsterKind::Main;
        };
        [
            ("fusion", MonsterKind::Fusion),
            ("synchro", MonsterKind::Synchro),
            ("xyz", MonsterKind::Xyz),
            ("link", MonsterKind::Link),
        ]
        .into_iter()
        .find(|(name, _)| subtype.eq_ignore_ascii_case(name))
        .map_or(MonsterKind::Main, |(_, kind)| kind)
    }

    /// Fusion, Synchro, Xyz and Link monsters belong to the extra deck.
    pub fn is_extra(&self) -> bool {
        !matches!(self, MonsterKind::Main)
    }

    /// Whether the level/rank/link value of this kind is a level.
    pub fn has_level(&self) -> bool {
        !matches!(self, MonsterKind::Xyz | MonsterKind::Link)
    }
}

// ---------------------------------------------------------------------------
// CardRecord
// ---------------------------------------------------------------------------

fn default_quantity() -> u32 {
    1
}

/// The flat row shape cards are stored and transferred in.
///
/// Every field except the identity is optional because the backing table is
/// shared by all card families. [`Card`] is built from this once at ingestion.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CardRecord {
    pub id: String,
    #[serde(default)]
    pub user_id: String,
    pub name: String,
    pub image_url: Option<String>,
    #[serde(default)]
    pub card_type: CardType,
    pub monster_type: Option<String>,
    pub attribute: Option<String>,
    pub level_rank_link: Option<u32>,
    pub link_rating: Option<u32>,
    pub pendulum_scale: Option<u32>,
    pub atk: Option<i32>,
    pub def: Option<i32>,
    pub description: Option<String>,
    pub rarity: Option<String>,
    pub set_name: Option<String>,
    pub set_code: Option<String>,
    #[serde(default = "default_quantity")]
    pub quantity: u32,
    pub card_icon: Option<String>,
    pub subtype: Option<String>,
    pub classification: Option<String>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

// ---------------------------------------------------------------------------
// Card
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct MonsterCard {
    pub monster_type: Option<String>,
    pub attribute: Option<Attribute>,
    /// The attribute exactly as stored, kept even when it does not parse.
    pub attribute_label: Option<String>,
    pub level_rank_link: Option<u32>,
    pub link_rating: Option<u32>,
    pub pendulum_scale: Option<u32>,
    pub atk: Option<i32>,
    pub def: Option<i32>,
    pub subtype: Option<String>,
    pub classification: Option<String>,
    pub kind: MonsterKind,
    pub pendulum: bool,
}

impl MonsterCard {
    /// Level, for monsters that have one.
    pub fn level(&self) -> Option<u32> {
        if self.kind.has_level() {
            self.level_rank_link
        } else {
            None
        }
    }

    /// Rank, for Xyz monsters.
    pub fn rank(&self) -> Option<u32> {
        match self.kind {
            MonsterKind::Xyz => self.level_rank_link,
            _ => None,
        }
    }

    /// Link rating, for Link monsters.
    pub fn link(&self) -> Option<u32> {
        match self.kind {
            MonsterKind::Link => self.link_rating.or(self.level_rank_link),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SpellTrapCard {
    /// Icon such as "Quick-Play", "Field" or "Counter".
    pub icon: Option<String>,
    pub subtype: Option<String>,
    pub classification: Option<String>,
}

/// Per-family card data. Only monsters carry stats.
#[derive(Debug, Clone, PartialEq)]
pub enum CardKind {
    Monster(MonsterCard),
    Spell(SpellTrapCard),
    Trap(SpellTrapCard),
}

/// A card in a user's collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "CardRecord", into = "CardRecord")]
pub struct Card {
    pub id: String,
    pub user_id: String,
    pub name: String,
    pub image_url: Option<String>,
    pub kind: CardKind,
    pub description: Option<String>,
    pub rarity: Option<String>,
    pub set_name: Option<String>,
    pub set_code: Option<String>,
    /// Owned copies; caps how many may be placed in a deck.
    pub quantity: u32,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

impl Card {
    pub fn card_type(&self) -> CardType {
        match self.kind {
            CardKind::Monster(_) => CardType::Monster,
            CardKind::Spell(_) => CardType::Spell,
            CardKind::Trap(_) => CardType::Trap,
        }
    }

    pub fn is_monster(&self) -> bool {
        matches!(self.kind, CardKind::Monster(_))
    }

    pub fn monster(&self) -> Option<&MonsterCard> {
        match &self.kind {
            CardKind::Monster(m) => Some(m),
            _ => None,
        }
    }

    pub fn spell_trap(&self) -> Option<&SpellTrapCard> {
        match &self.kind {
            CardKind::Spell(st) | CardKind::Trap(st) => Some(st),
            CardKind::Monster(_) => None,
        }
    }

    pub fn monster_kind(&self) -> Option<MonsterKind> {
        self.monster().map(|m| m.kind)
    }

    /// True for Fusion, Synchro, Xyz and Link monsters.
    pub fn is_extra_deck(&self) -> bool {
        self.monster_kind().is_some_and(|k| k.is_extra())
    }

    pub fn is_pendulum(&self) -> bool {
        self.monster().is_some_and(|m| m.pendulum)
    }

    pub fn subtype(&self) -> Option<&str> {
        match &self.kind {
            CardKind::Monster(m) => m.subtype.as_deref(),
            CardKind::Spell(st) | CardKind::Trap(st) => st.subtype.as_deref(),
        }
    }

    pub fn classification(&self) -> Option<&str> {
        match &self.kind {
            CardKind::Monster(m) => m.classification.as_deref(),
            CardKind::Spell(st) | CardKind::Trap(st) => st.classification.as_deref(),
        }
    }

    pub fn icon(&self) -> Option<&str> {
        self.spell_trap().and_then(|st| st.icon.as_deref())
    }

    pub fn attribute(&self) -> Option<Attribute> {
        self.monster().and_then(|m| m.attribute)
    }

    pub fn atk(&self) -> Option<i32> {
        self.monster().and_then(|m| m.atk)
    }

    pub fn def(&self) -> Option<i32> {
        self.monster().and_then(|m| m.def)
    }

    /// Build a card from its flat storage row.
    pub fn from_record(record: CardRecord) -> Self {
        Self::from(record)
    }

    /// Flatten back to the storage row.
    pub fn to_record(&self) -> CardRecord {
        CardRecord::from(self.clone())
    }
}

impl From<CardRecord> for Card {
    fn from(r: CardRecord) -> Self {
        let kind = match r.card_type {
            CardType::Monster => {
                let pendulum = [r.monster_type.as_deref(), r.subtype.as_deref()]
                    .into_iter()
                    .flatten()
                    .any(|s| s.to_lowercase().contains("pendulum"));
                CardKind::Monster(MonsterCard {
                    kind: MonsterKind::from_subtype(r.subtype.as_deref()),
                    pendulum,
                    attribute: r.attribute.as_deref().and_then(Attribute::parse),
                    attribute_label: r.attribute,
                    monster_type: r.monster_type,
                    level_rank_link: r.level_rank_link,
                    link_rating: r.link_rating,
                    pendulum_scale: r.pendulum_scale,
                    atk: r.atk,
                    def: r.def,
                    subtype: r.subtype,
                    classification: r.classification,
                })
            }
            CardType::Spell => CardKind::Spell(SpellTrapCard {
                icon: r.card_icon,
                subtype: r.subtype,
                classification: r.classification,
            }),
            CardType::Trap => CardKind::Trap(SpellTrapCard {
                icon: r.card_icon,
                subtype: r.subtype,
                classification: r.classification,
            }),
        };
        Card {
            id: r.id,
            user_id: r.user_id,
            name: r.name,
            image_url: r.image_url,
            kind,
            description: r.description,
            rarity: r.rarity,
            set_name: r.set_name,
            set_code: r.set_code,
            quantity: r.quantity,
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}

impl From<Card> for CardRecord {
    fn from(c: Card) -> Self {
        let card_type = c.card_type();
        let mut record = CardRecord {
            id: c.id,
            user_id: c.user_id,
            name: c.name,
            image_url: c.image_url,
            card_type,
            description: c.description,
            rarity: c.rarity,
            set_name: c.set_name,
            set_code: c.set_code,
            quantity: c.quantity,
            created_at: c.created_at,
            updated_at: c.updated_at,
            ..Default::default()
        };
        match c.kind {
            CardKind::Monster(m) => {
                record.monster_type = m.monster_type;
                record.attribute = m
                    .attribute_label
                    .or_else(|| m.attribute.map(|a| a.as_str().to_string()));
                record.level_rank_link = m.level_rank_link;
                record.link_rating = m.link_rating;
                record.pendulum_scale = m.pendulum_scale;
                record.atk = m.atk;
                record.def = m.def;
                record.subtype = m.subtype;
                record.classification = m.classification;
            }
            CardKind::Spell(st) | CardKind::Trap(st) => {
                record.card_icon = st.icon;
                record.subtype = st.subtype;
                record.classification = st.classification;
            }
        }
        record
    }
}
