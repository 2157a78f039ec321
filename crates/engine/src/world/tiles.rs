use std::collections::HashMap;
use std::fmt;
use std::io::Read;
use std::ops::{BitOr, BitOrAssign, BitXor, BitXorAssign};

use super::asset::{read_exact_or_truncated, read_full, AssetError};

pub const DEFAULT_SPRITE_REF: u16 = 0x4500;
const TILE_ID_SPACE: usize = u16::MAX as usize + 1;
const RECORD_HEADER_BYTES: usize = 7;

#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct TileFlags(u16);

impl TileFlags {
    pub const NONE: Self = Self(0);
    pub const PASSABLE_BY_ACTOR: Self = Self(1 << 0);
    pub const NOT_STAIR: Self = Self(1 << 1);
    pub const NOT_VINE: Self = Self(1 << 2);
    pub const NOT_WATER: Self = Self(1 << 3);
    pub const HAS_CUSTOM_UPDATE: Self = Self(1 << 4);
    pub const HAS_CUSTOM_DRAW: Self = Self(1 << 5);
    pub const HAS_CUSTOM_TOUCH: Self = Self(1 << 6);
    pub const DEFAULT: Self = Self(Self::NOT_STAIR.0 | Self::NOT_VINE.0 | Self::NOT_WATER.0);

    const NAMED: [(Self, &'static str); 7] = [
        (Self::PASSABLE_BY_ACTOR, "PASSABLE_BY_ACTOR"),
        (Self::NOT_STAIR, "NOT_STAIR"),
        (Self::NOT_VINE, "NOT_VINE"),
        (Self::NOT_WATER, "NOT_WATER"),
        (Self::HAS_CUSTOM_UPDATE, "HAS_CUSTOM_UPDATE"),
        (Self::HAS_CUSTOM_DRAW, "HAS_CUSTOM_DRAW"),
        (Self::HAS_CUSTOM_TOUCH, "HAS_CUSTOM_TOUCH"),
    ];

    pub const fn from_bits(bits: u16) -> Self {
        Self(bits)
    }

    pub const fn bits(self) -> u16 {
        self.0
    }

    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl BitOr for TileFlags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for TileFlags {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl BitXor for TileFlags {
    type Output = Self;

    fn bitxor(self, rhs: Self) -> Self {
        Self(self.0 ^ rhs.0)
    }
}

impl BitXorAssign for TileFlags {
    fn bitxor_assign(&mut self, rhs: Self) {
        self.0 ^= rhs.0;
    }
}

impl fmt::Debug for TileFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return write!(f, "TileFlags(NONE)");
        }
        let mut names = Self::NAMED
            .iter()
            .filter(|(flag, _)| self.contains(*flag))
            .map(|(_, name)| (*name).to_string())
            .collect::<Vec<_>>();
        let known = Self::NAMED
            .iter()
            .fold(0u16, |acc, (flag, _)| acc | flag.bits());
        let unknown = self.0 & !known;
        if unknown != 0 {
            names.push(format!("{unknown:#06x}"));
        }
        write!(f, "TileFlags({})", names.join(" | "))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileRecord {
    pub tile_id: u16,
    pub sprite_ref: u16,
    pub flags_to_xor: TileFlags,
    pub name: String,
}

pub fn parse_tile_records<R: Read>(mut reader: R) -> Result<Vec<TileRecord>, AssetError> {
    let mut records = Vec::new();
    loop {
        let mut header = [0u8; RECORD_HEADER_BYTES];
        let filled = read_full(&mut reader, &mut header)?;
        if filled == 0 {
            break;
        }
        if filled < RECORD_HEADER_BYTES {
            return Err(AssetError::Truncated {
                expected_bytes: RECORD_HEADER_BYTES,
                actual_bytes: filled,
            });
        }

        let name_len = header[6] as usize;
        let mut name = vec![0u8; name_len];
        read_exact_or_truncated(&mut reader, &mut name)?;

        records.push(TileRecord {
            tile_id: u16::from_le_bytes([header[0], header[1]]),
            sprite_ref: u16::from_le_bytes([header[2], header[3]]),
            flags_to_xor: TileFlags::from_bits(u16::from_le_bytes([header[4], header[5]])),
            name: String::from_utf8_lossy(&name).into_owned(),
        });
    }
    Ok(records)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct TileProps {
    sprite_ref: u16,
    flags: TileFlags,
}

const DEFAULT_PROPS: TileProps = TileProps {
    sprite_ref: DEFAULT_SPRITE_REF,
    flags: TileFlags::DEFAULT,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileInfo<'a> {
    pub sprite_ref: u16,
    pub flags: TileFlags,
    pub name: &'a str,
}

#[derive(Debug, Clone)]
pub struct TilePropertyTable {
    props: Vec<TileProps>,
    names: HashMap<u16, String>,
}

impl Default for TilePropertyTable {
    fn default() -> Self {
        Self {
            props: vec![DEFAULT_PROPS; TILE_ID_SPACE],
            names: HashMap::new(),
        }
    }
}

impl TilePropertyTable {
    pub fn from_records(records: &[TileRecord]) -> Self {
        let mut table = Self::default();
        for record in records {
            table.merge(record);
        }
        table
    }

    /// Merges a record onto the current entry: the sprite and name are replaced,
    /// the flags are XORed so a record can clear a default bit.
    pub fn merge(&mut self, record: &TileRecord) {
        let Some(props) = self.props.get_mut(record.tile_id as usize) else {
            return;
        };
        props.sprite_ref = record.sprite_ref;
        props.flags ^= record.flags_to_xor;
        self.names.insert(record.tile_id, record.name.clone());
    }

    pub fn flags(&self, tile_id: u16) -> TileFlags {
        self.props
            .get(tile_id as usize)
            .map_or(TileFlags::DEFAULT, |props| props.flags)
    }

    pub fn sprite_ref(&self, tile_id: u16) -> u16 {
        self.props
            .get(tile_id as usize)
            .map_or(DEFAULT_SPRITE_REF, |props| props.sprite_ref)
    }

    pub fn name(&self, tile_id: u16) -> &str {
        self.names.get(&tile_id).map_or("", String::as_str)
    }

    pub fn info(&self, tile_id: u16) -> TileInfo<'_> {
        TileInfo {
            sprite_ref: self.sprite_ref(tile_id),
            flags: self.flags(tile_id),
            name: self.name(tile_id),
        }
    }

    pub fn is_passable(&self, tile_id: u16) -> bool {
        self.flags(tile_id).contains(TileFlags::PASSABLE_BY_ACTOR)
    }
}

#[cfg(test)]
pub(crate) fn encode_record(record: &TileRecord) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(RECORD_HEADER_BYTES + record.name.len());
    bytes.extend_from_slice(&record.tile_id.to_le_bytes());
    bytes.extend_from_slice(&record.sprite_ref.to_le_bytes());
    bytes.extend_from_slice(&record.flags_to_xor.bits().to_le_bytes());
    bytes.push(record.name.len() as u8);
    bytes.extend_from_slice(record.name.as_bytes());
    bytes
}
