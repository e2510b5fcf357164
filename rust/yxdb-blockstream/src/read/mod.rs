//! Blockstream read module: the block-level byte stream and the record
//! assembler layered on top of it.

pub mod record_assembler;
pub mod record_stream;

/// Default capacity of the compressed and decompressed block buffers.
pub const DEFAULT_BLOCK_CAPACITY: usize = 262_144;

/// Length-prefix bit marking a block stored without compression.
pub const VERBATIM_BLOCK_FLAG: u32 = 0x8000_0000;
