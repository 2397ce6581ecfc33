// crates/bloom_core/src/consts.rs

pub const FNV32_OFFSET_BASIS: u32 = 2_166_136_261;
pub const FNV32_PRIME: u32 = 16_777_619;

pub const FNV64_OFFSET_BASIS: u64 = 14_695_981_039_346_656_037;
pub const FNV64_PRIME: u64 = 1_099_511_628_211;

pub const BITS_PER_BYTE: u64 = 8;

const _: () = { assert!(FNV32_OFFSET_BASIS == 0x811c_9dc5); };
const _: () = { assert!(FNV64_OFFSET_BASIS == 0xcbf2_9ce4_8422_2325); };
