//! Sealing traces into a block: data file, bloom shards, metadata.
//!
//! This is the fixture-and-tooling surface, not an ingest path; it takes
//! fully assembled traces and writes the sealed artifacts in one shot.

use std::time::{SystemTime, UNIX_EPOCH};

use rayon::prelude::*;
use spandb_result::{Error, Result};
use spandb_storage::BlockWriter;
use spandb_types::meta::ENCODING_VBLOCK;
use spandb_types::{BlockMeta, Trace, TraceId, bloom_name};

use crate::bloom::build_shards;
use crate::columnar::{
    BlockData, ByteColumn, DATA_BLOB, META_BLOB, RowGroupData, TRACE_COLUMN, TRACE_ID_COLUMN,
};

/// Knobs for sealing a block.
#[derive(Debug, Clone)]
pub struct BlockConfig {
    /// Rows per row group in the data file.
    pub row_group_rows: usize,
    pub bloom_shard_count: u32,
}

impl Default for BlockConfig {
    fn default() -> Self {
        BlockConfig {
            row_group_rows: 10_000,
            bloom_shard_count: 2,
        }
    }
}

/// Accumulates traces and seals them into a block.
pub struct BlockBuilder {
    config: BlockConfig,
    traces: Vec<Trace>,
}

impl Default for BlockBuilder {
    fn default() -> Self {
        Self::new(BlockConfig::default())
    }
}

impl BlockBuilder {
    pub fn new(config: BlockConfig) -> BlockBuilder {
        BlockBuilder {
            config,
            traces: Vec::new(),
        }
    }

    pub fn push(&mut self, trace: Trace) {
        self.traces.push(trace);
    }

    pub fn len(&self) -> usize {
        self.traces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.traces.is_empty()
    }

    /// Sort, partition into row groups, and write the sealed artifacts.
    ///
    /// Row-group encoding fans out across threads; writes happen once every
    /// group is encoded.
    pub fn seal<W: BlockWriter>(
        self,
        block_id: &str,
        tenant_id: &str,
        writer: &W,
    ) -> Result<BlockMeta> {
        let BlockBuilder { config, mut traces } = self;
        if traces.is_empty() {
            return Err(Error::InvalidArgument("cannot seal an empty block".into()));
        }

        traces.sort_by(|a, b| a.trace_id.cmp(&b.trace_id));

        let rows_per_group = config.row_group_rows.max(1);
        let row_groups: Vec<RowGroupData> = traces
            .par_chunks(rows_per_group)
            .map(|chunk| {
                let mut ids = ByteColumn::new();
                let mut payloads = ByteColumn::new();
                for trace in chunk {
                    ids.push(trace.trace_id.as_bytes());
                    payloads.push(&bitcode::encode(trace));
                }
                RowGroupData {
                    columns: vec![ids, payloads],
                }
            })
            .collect();

        let data = BlockData {
            schema: vec![TRACE_ID_COLUMN.to_string(), TRACE_COLUMN.to_string()],
            row_groups,
        };
        let data_bytes = bitcode::encode(&data);

        let ids: Vec<TraceId> = traces.iter().map(|t| t.trace_id.clone()).collect();
        let shards = build_shards(&ids, config.bloom_shard_count);
        for (shard, bloom) in shards.iter().enumerate() {
            writer.write(&bloom_name(shard as u32), block_id, tenant_id, bloom.to_bytes())?;
        }

        let meta = BlockMeta {
            block_id: block_id.to_string(),
            tenant_id: tenant_id.to_string(),
            size: data_bytes.len() as u64,
            min_id: ids[0].clone(),
            max_id: ids[ids.len() - 1].clone(),
            bloom_shard_count: shards.len() as u32,
            row_group_count: data.row_groups.len() as u32,
            total_traces: traces.len() as u64,
            created_at_unix_nanos: SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_nanos() as u64)
                .unwrap_or(0),
            encoding: ENCODING_VBLOCK.to_string(),
        };

        writer.write(DATA_BLOB, block_id, tenant_id, data_bytes)?;
        writer.write(META_BLOB, block_id, tenant_id, meta.to_bytes())?;
        Ok(meta)
    }
}
