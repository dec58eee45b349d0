use std::fmt;

use zkagg_types::hex::{self, HexError};

use crate::CollectedFields;

const HASH_LEN: usize = 32;

#[derive(Debug, Clone, thiserror::Error)]
pub enum ValidationError {
    #[error("`{field}` = `{value}`: {source}")]
    MalformedHex {
        field: String,
        value: String,
        #[source]
        source: HexError,
    },
    #[error(
        "parent aggregation last block timestamp {parent_timestamp} is after \
         the final timestamp {final_timestamp}"
    )]
    TimestampsOutOfOrder {
        parent_timestamp: u64,
        final_timestamp: u64,
    },
}

/// Every check that failed on a set of collected fields.
#[derive(Debug, Clone)]
pub struct ValidationErrors(Vec<ValidationError>);

impl ValidationErrors {
    pub fn errors(&self) -> &[ValidationError] {
        &self.0
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, err) in self.0.iter().enumerate() {
            if idx > 0 {
                formatter.write_str("; ")?;
            }
            write!(formatter, "{err}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

#[derive(Default)]
struct Checks(Vec<ValidationError>);

impl Checks {
    fn hex(&mut self, field: impl Into<String>, value: &str, expected_len: Option<usize>) {
        if let Err(source) = hex::validate(value, expected_len) {
            self.0.push(ValidationError::MalformedHex {
                field: field.into(),
                value: value.to_owned(),
                source,
            });
        }
    }
}

/// Runs every consistency check on `fields` and reports all failures at once.
pub fn validate<P>(fields: &CollectedFields<P>) -> Result<(), ValidationErrors> {
    let mut checks = Checks::default();

    checks.hex("finalShnarf", &fields.final_shnarf, Some(HASH_LEN));
    checks.hex(
        "parentStateRootHash",
        &fields.parent_state_root_hash,
        Some(HASH_LEN),
    );
    checks.hex(
        "parentAggregationLastL1RollingHash",
        &fields.last_finalized_l1_rolling_hash,
        Some(HASH_LEN),
    );
    checks.hex("l1RollingHash", &fields.l1_rolling_hash, Some(HASH_LEN));
    checks.hex(
        "l2MessagingBlocksOffsets",
        &fields.l2_messaging_blocks_offsets,
        None,
    );
    if fields.parent_aggregation_last_block_timestamp > fields.final_timestamp {
        checks.0.push(ValidationError::TimestampsOutOfOrder {
            parent_timestamp: fields.parent_aggregation_last_block_timestamp,
            final_timestamp: fields.final_timestamp,
        });
    }
    checks.hex("dataParentHash", &fields.data_parent_hash, Some(HASH_LEN));
    for (idx, root) in fields.l2_msg_root_hashes.iter().enumerate() {
        checks.hex(format!("l2MerkleRoots[{idx}]"), root, Some(HASH_LEN));
    }
    for (idx, data_hash) in fields.data_hashes.iter().enumerate() {
        checks.hex(format!("dataHashes[{idx}]"), data_hash, Some(HASH_LEN));
    }

    if checks.0.is_empty() {
        Ok(())
    } else {
        Err(ValidationErrors(checks.0))
    }
}
