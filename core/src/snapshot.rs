use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::*;

/// Number of independent save slots.
pub const SLOT_COUNT: usize = 10;

/// Everything needed to resume a session. Field names follow the stored JSON layout.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub balance: Coins,
    pub bet_amount: Coins,
    pub mine_count: TileCount,
    pub game_state: GamePhase,
    pub grid: Grid,
    pub revealed_safe_tiles: TileCount,
    pub is_lost: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveSlot {
    #[serde(flatten)]
    pub state: SessionSnapshot,
    #[serde(with = "time::serde::rfc3339")]
    pub last_saved: OffsetDateTime,
}

impl SaveSlot {
    pub fn new(state: SessionSnapshot, last_saved: OffsetDateTime) -> Self {
        Self { state, last_saved }
    }

    pub fn stamped_now(state: SessionSnapshot) -> Self {
        Self::new(state, OffsetDateTime::now_utc())
    }
}

/// The full set of slots, stored as a JSON array where empty slots are `null`.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(transparent)]
pub struct SlotTable {
    slots: Vec<Option<SaveSlot>>,
}

impl Default for SlotTable {
    fn default() -> Self {
        Self {
            slots: vec![None; SLOT_COUNT],
        }
    }
}

impl SlotTable {
    pub fn decode(json: &str) -> core::result::Result<Self, StoreError> {
        let slots: Vec<Option<SaveSlot>> = serde_json::from_str(json)?;
        if slots.len() != SLOT_COUNT {
            return Err(StoreError::SlotCount(slots.len()));
        }
        Ok(Self { slots })
    }

    /// Like [`SlotTable::decode`], but any problem yields the empty table.
    pub fn decode_or_default(json: &str) -> Self {
        Self::decode(json).unwrap_or_else(|err| {
            log::warn!("Discarding stored save slots: {}", err);
            Self::default()
        })
    }

    pub fn encode(&self) -> core::result::Result<String, StoreError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn get(&self, index: usize) -> Option<&SaveSlot> {
        self.slots.get(index).and_then(Option::as_ref)
    }

    pub fn iter(&self) -> impl Iterator<Item = Option<&SaveSlot>> {
        self.slots.iter().map(Option::as_ref)
    }

    pub fn occupied(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_some()).count()
    }

    /// Replaces slot `index`. Returns `false` for an index outside the table.
    pub fn set(&mut self, index: usize, slot: Option<SaveSlot>) -> bool {
        match self.slots.get_mut(index) {
            Some(entry) => {
                *entry = slot;
                true
            }
            None => false,
        }
    }
}
