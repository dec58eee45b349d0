/// Block position that cannot be represented by a 16-bit offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("block #{position} of the aggregation does not fit into a 16-bit offset")]
pub struct OffsetOverflow {
    pub position: usize,
}

/// Packs the 1-based positions of the blocks flagged in `unpacked` as consecutive
/// big-endian `u16`s.
pub fn pack_offsets(unpacked: &[bool]) -> Result<Vec<u8>, OffsetOverflow> {
    let mut packed = Vec::with_capacity(unpacked.iter().filter(|flag| **flag).count() * 2);
    for (idx, _) in unpacked.iter().enumerate().filter(|(_, flag)| **flag) {
        let position = idx + 1;
        let offset = u16::try_from(position).map_err(|_| OffsetOverflow { position })?;
        packed.extend_from_slice(&offset.to_be_bytes());
    }
    Ok(packed)
}
