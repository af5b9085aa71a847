//! Per-cell data and the packed `details` bitfield.
//!
//! Layout of `details` (u16):
//! - bits 15-12: biome id
//! - bits 11-8: cosmetic variant, meaning depends on the biome (0 = none)
//! - bits 7-0: reserved, always zero

use serde::{Deserialize, Serialize};

use crate::coords::CellCoordinate;

const BIOME_SHIFT: u16 = 12;
const COSMETIC_SHIFT: u16 = 8;
const NIBBLE: u16 = 0x0F;
const RESERVED_MASK: u16 = 0x00FF;

/// Terrain category of a cell. Discriminants are the wire ids.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Biome {
    Grass = 0,
    Forest = 1,
    Water = 2,
    Beach = 3,
    Mountain = 4,
}

impl Biome {
    pub const ALL: [Biome; 5] = [
        Biome::Grass,
        Biome::Forest,
        Biome::Water,
        Biome::Beach,
        Biome::Mountain,
    ];

    pub fn id(self) -> u8 {
        self as u8
    }

    pub fn from_id(id: u8) -> Option<Self> {
        match id {
            0 => Some(Biome::Grass),
            1 => Some(Biome::Forest),
            2 => Some(Biome::Water),
            3 => Some(Biome::Beach),
            4 => Some(Biome::Mountain),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Biome::Grass => "Grass",
            Biome::Forest => "Forest",
            Biome::Water => "Water",
            Biome::Beach => "Beach",
            Biome::Mountain => "Mountain",
        }
    }
}

/// Cosmetic values for [`Biome::Grass`].
pub mod grass {
    pub const TALL_GRASS: u8 = 1;
}

/// Packed biome + cosmetic bitfield.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u16", into = "u16")]
pub struct CellDetails(u16);

impl TryFrom<u16> for CellDetails {
    type Error = String;

    fn try_from(raw: u16) -> Result<Self, Self::Error> {
        Self::from_raw(raw).ok_or_else(|| format!("invalid cell details {:#06x}", raw))
    }
}

impl From<CellDetails> for u16 {
    fn from(details: CellDetails) -> u16 {
        details.0
    }
}

impl CellDetails {
    /// Pack a biome and a cosmetic variant. Only the low 4 bits of `cosmetic` are kept.
    pub fn new(biome: Biome, cosmetic: u8) -> Self {
        let cosmetic = cosmetic as u16 & NIBBLE;
        Self(((biome.id() as u16) << BIOME_SHIFT) | (cosmetic << COSMETIC_SHIFT))
    }

    /// Accept a raw value only if its biome id is defined and reserved bits are clear.
    pub fn from_raw(raw: u16) -> Option<Self> {
        if raw & RESERVED_MASK != 0 {
            return None;
        }
        Biome::from_id((raw >> BIOME_SHIFT) as u8)?;
        Some(Self(raw))
    }

    pub fn raw(self) -> u16 {
        self.0
    }

    pub fn biome(self) -> Biome {
        // Construction guarantees a valid id.
        Biome::from_id((self.0 >> BIOME_SHIFT) as u8).unwrap_or(Biome::Grass)
    }

    pub fn cosmetic(self) -> u8 {
        ((self.0 >> COSMETIC_SHIFT) & NIBBLE) as u8
    }
}

/// A single hex cell as stored and transferred.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HexCell {
    /// Column
    pub q: i32,
    /// Row
    pub r: i32,
    pub details: CellDetails,
}

impl HexCell {
    pub fn new(coord: CellCoordinate, details: CellDetails) -> Self {
        Self {
            q: coord.q,
            r: coord.r,
            details,
        }
    }

    pub fn coord(&self) -> CellCoordinate {
        CellCoordinate::new(self.q, self.r)
    }

    pub fn biome(&self) -> Biome {
        self.details.biome()
    }

    pub fn cosmetic(&self) -> u8 {
        self.details.cosmetic()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pack_layout() {
        assert_eq!(CellDetails::new(Biome::Grass, 0).raw(), 0x0000);
        assert_eq!(CellDetails::new(Biome::Grass, grass::TALL_GRASS).raw(), 0x0100);
        assert_eq!(CellDetails::new(Biome::Mountain, 0).raw(), 0x4000);
        assert_eq!(CellDetails::new(Biome::Beach, 0xF).raw(), 0x3F00);
    }

    #[test]
    fn test_unpack_every_biome() {
        for biome in Biome::ALL {
            for cosmetic in 0..16u8 {
                let details = CellDetails::new(biome, cosmetic);
                assert_eq!(details.biome(), biome);
                assert_eq!(details.cosmetic(), cosmetic);
                assert_eq!(details.raw() & RESERVED_MASK, 0);
            }
        }
    }

    #[test]
    fn test_from_raw_rejects_invalid() {
        assert_eq!(CellDetails::from_raw(0x2000).map(|d| d.biome()), Some(Biome::Water));
        // Undefined biome id
        assert!(CellDetails::from_raw(0x5000).is_none());
        assert!(CellDetails::from_raw(0xF000).is_none());
        // Reserved bits set
        assert!(CellDetails::from_raw(0x0001).is_none());
        assert!(CellDetails::from_raw(0x1080).is_none());
    }

    #[test]
    fn test_cosmetic_is_masked() {
        let details = CellDetails::new(Biome::Forest, 0x1F);
        assert_eq!(details.biome(), Biome::Forest);
        assert_eq!(details.cosmetic(), 0xF);
    }

    #[test]
    fn test_serde_validates_raw_value() {
        let details: CellDetails = serde_json::from_str("4352").unwrap();
        assert_eq!(details, CellDetails::new(Biome::Forest, 1));
        assert_eq!(serde_json::to_string(&details).unwrap(), "4352");
        assert!(serde_json::from_str::<CellDetails>("20480").is_err());
    }

    #[test]
    fn test_biome_ids_round_trip() {
        for biome in Biome::ALL {
            assert_eq!(Biome::from_id(biome.id()), Some(biome));
        }
        assert_eq!(Biome::from_id(5), None);
    }
}
