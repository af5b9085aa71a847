//! Binary map encoding.
//!
//! Wire format, all integers little-endian:
//!
//! ```text
//! u16 width | u16 height | u16 details * (width * height)
//! ```
//!
//! The header is exactly 4 bytes. Records follow in canonical index order, so a
//! cell's coordinate is recovered from its position in the stream.

use crate::artifact::MapArtifact;
use crate::cell::{CellDetails, HexCell};
use crate::coords::{from_index, GridDimensions};
use crate::error::CodecError;

/// Size of the dimension header in bytes.
pub const HEADER_LEN: usize = 4;

/// Size of one cell record in bytes.
pub const RECORD_LEN: usize = 2;

/// MIME type of an encoded map.
pub const CONTENT_TYPE: &str = "application/octet-stream";

/// Cells and dimensions recovered from a buffer. The seed is not on the wire.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DecodedMap {
    pub dimensions: GridDimensions,
    pub cells: Vec<HexCell>,
}

impl DecodedMap {
    /// Attach a seed to rebuild a full artifact.
    pub fn into_artifact(self, seed: impl Into<String>) -> MapArtifact {
        MapArtifact::from_canonical(self.dimensions, seed.into(), self.cells)
    }
}

/// Total encoded size for a map of the given dimensions.
pub fn encoded_len(dimensions: GridDimensions) -> usize {
    HEADER_LEN + RECORD_LEN * dimensions.cell_count()
}

/// Encode an artifact's cells.
///
/// Every constructor of [`MapArtifact`] bounds both dimensions by the 16-bit header
/// limit, so the casts cannot truncate.
pub fn encode(artifact: &MapArtifact) -> Vec<u8> {
    let dims = artifact.dimensions();

    let mut buf = Vec::with_capacity(encoded_len(dims));
    buf.extend_from_slice(&(dims.width as u16).to_le_bytes());
    buf.extend_from_slice(&(dims.height as u16).to_le_bytes());
    for cell in artifact.cells() {
        buf.extend_from_slice(&cell.details.raw().to_le_bytes());
    }
    buf
}

/// Decode a buffer produced by [`encode`].
///
/// Any length disagreement with the header, a zero dimension, or a record with an
/// undefined biome or reserved bits set is rejected; nothing is truncated or padded.
pub fn decode(bytes: &[u8]) -> Result<DecodedMap, CodecError> {
    if bytes.len() < HEADER_LEN {
        return Err(CodecError::TruncatedHeader {
            len: bytes.len(),
            header: HEADER_LEN,
        });
    }
    let width = u16::from_le_bytes([bytes[0], bytes[1]]);
    let height = u16::from_le_bytes([bytes[2], bytes[3]]);
    if width == 0 || height == 0 {
        return Err(CodecError::ZeroDimension { width, height });
    }

    let dimensions = GridDimensions::new(width as u32, height as u32);
    let payload = &bytes[HEADER_LEN..];
    let expected = RECORD_LEN * dimensions.cell_count();
    if payload.len() != expected {
        return Err(CodecError::LengthMismatch {
            expected,
            actual: payload.len(),
        });
    }

    let cells = payload
        .chunks_exact(RECORD_LEN)
        .enumerate()
        .map(|(index, record)| {
            let raw = u16::from_le_bytes([record[0], record[1]]);
            let details = CellDetails::from_raw(raw)
                .ok_or(CodecError::InvalidDetails { index, details: raw })?;
            Ok(HexCell::new(from_index(index as u32, dimensions.width), details))
        })
        .collect::<Result<Vec<_>, CodecError>>()?;

    Ok(DecodedMap { dimensions, cells })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell::{grass, Biome};

    fn sample_artifact(width: u32, height: u32) -> MapArtifact {
        let dims = GridDimensions::new(width, height);
        let cells = dims
            .coords()
            .enumerate()
            .map(|(i, coord)| {
                let biome = Biome::ALL[i % Biome::ALL.len()];
                let cosmetic = if biome == Biome::Grass { grass::TALL_GRASS } else { 0 };
                HexCell::new(coord, CellDetails::new(biome, cosmetic))
            })
            .collect();
        MapArtifact::new(dims, "codec", cells).unwrap()
    }

    #[test]
    fn test_wire_layout() {
        let artifact = sample_artifact(2, 1);
        let bytes = encode(&artifact);
        // width 2, height 1, grass+tall (0x0100), forest (0x1000)
        assert_eq!(bytes, vec![2, 0, 1, 0, 0x00, 0x01, 0x00, 0x10]);
    }

    #[test]
    fn test_round_trip() {
        for &(w, h) in &[(1, 1), (4, 3), (9, 2), (1, 17)] {
            let artifact = sample_artifact(w, h);
            let bytes = encode(&artifact);
            assert_eq!(bytes.len(), encoded_len(artifact.dimensions()));

            let decoded = decode(&bytes).unwrap();
            assert_eq!(decoded.dimensions, artifact.dimensions());
            assert_eq!(decoded.cells, artifact.cells());
            assert_eq!(decoded.into_artifact("codec"), artifact);
        }
    }

    #[test]
    fn test_one_byte_short_is_corrupt() {
        let bytes = encode(&sample_artifact(4, 3));
        assert_eq!(bytes.len(), 28);
        let err = decode(&bytes[..27]).unwrap_err();
        assert_eq!(err, CodecError::LengthMismatch { expected: 24, actual: 23 });
    }

    #[test]
    fn test_missing_whole_record_is_corrupt() {
        let bytes = encode(&sample_artifact(4, 3));
        assert!(matches!(
            decode(&bytes[..26]),
            Err(CodecError::LengthMismatch { expected: 24, actual: 22 })
        ));
    }

    #[test]
    fn test_trailing_bytes_are_corrupt() {
        let mut bytes = encode(&sample_artifact(4, 3));
        bytes.extend_from_slice(&[0, 0]);
        assert!(matches!(decode(&bytes), Err(CodecError::LengthMismatch { .. })));
    }

    #[test]
    fn test_short_header() {
        assert_eq!(
            decode(&[4, 0, 3]).unwrap_err(),
            CodecError::TruncatedHeader { len: 3, header: HEADER_LEN }
        );
        assert!(decode(&[]).is_err());
    }

    #[test]
    fn test_zero_dimension_header() {
        assert_eq!(
            decode(&[0, 0, 3, 0]).unwrap_err(),
            CodecError::ZeroDimension { width: 0, height: 3 }
        );
    }

    #[test]
    fn test_invalid_record() {
        let mut bytes = encode(&sample_artifact(2, 2));
        // Cell 2: biome id 7
        bytes[HEADER_LEN + 4] = 0x00;
        bytes[HEADER_LEN + 5] = 0x70;
        assert_eq!(
            decode(&bytes).unwrap_err(),
            CodecError::InvalidDetails { index: 2, details: 0x7000 }
        );

        let mut bytes = encode(&sample_artifact(2, 2));
        bytes[HEADER_LEN] = 0x01; // reserved low byte
        assert!(matches!(decode(&bytes), Err(CodecError::InvalidDetails { index: 0, .. })));
    }
}
