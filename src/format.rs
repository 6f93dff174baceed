//! Layout constants of the PAC container. All integers are little-endian and all strings are
//! fixed-capacity arrays of 16-bit code units.

/// Size of the container header.
pub const HEADER_LEN: usize = 2124;
/// Size of a partition table record. Every record stores this value in its first field.
pub const PARTITION_RECORD_LEN: usize = 2580;

/// Header magic value which enables the CRC1 check.
pub const PAC_MAGIC: u32 = 0xfffa_fffa;

/// Container versions this tool knows how to read.
pub const SUPPORTED_VERSIONS: &[&str] = &["BP_R1.0.0", "BP_R2.0.1"];

/// Byte offsets and unit capacities of the header fields.
pub mod header {
    pub const VERSION: usize = 0;
    pub const VERSION_UNITS: usize = 22;
    pub const HI_SIZE: usize = 44;
    pub const LO_SIZE: usize = 48;
    pub const PRODUCT_NAME: usize = 52;
    pub const PRODUCT_NAME_UNITS: usize = 256;
    pub const FIRMWARE_NAME: usize = 564;
    pub const FIRMWARE_NAME_UNITS: usize = 256;
    pub const PARTITION_COUNT: usize = 1076;
    pub const TABLE_OFFSET: usize = 1080;
    pub const MODE: usize = 1084;
    pub const FLASH_TYPE: usize = 1088;
    pub const NAND_STRATEGY: usize = 1092;
    pub const IS_NV_BACKUP: usize = 1096;
    pub const NAND_PAGE_TYPE: usize = 1100;
    pub const PRODUCT_ALIAS: usize = 1104;
    pub const PRODUCT_ALIAS_UNITS: usize = 100;
    pub const OMA_DM_PRODUCT_FLAG: usize = 1304;
    pub const IS_OMA_DM: usize = 1308;
    pub const IS_PRELOAD: usize = 1312;
    pub const MAGIC: usize = 2116;
    pub const CRC1: usize = 2120;
    pub const CRC2: usize = 2122;
}

/// Byte offsets and unit capacities of the partition record fields.
pub mod record {
    pub const LENGTH: usize = 0;
    pub const PARTITION_ID: usize = 4;
    pub const PARTITION_ID_UNITS: usize = 256;
    pub const FILE_NAME: usize = 516;
    pub const FILE_NAME_UNITS: usize = 256;
    pub const HI_SIZE: usize = 1532;
    pub const HI_DATA_OFFSET: usize = 1536;
    pub const LO_SIZE: usize = 1540;
    pub const FILE_FLAG: usize = 1544;
    pub const CHECK_FLAG: usize = 1548;
    pub const LO_DATA_OFFSET: usize = 1552;
    pub const CAN_OMIT_FLAG: usize = 1556;
    pub const ADDR_NUM: usize = 1560;
    pub const ADDRS: usize = 1564;
    pub const ADDRS_COUNT: usize = 5;
}

/// Joins the high and low words of a split 64-bit field.
#[inline]
pub fn join_u64(hi: u32, lo: u32) -> u64 {
    (u64::from(hi) << 32) | u64::from(lo)
}

/// Splits a 64-bit value into its high and low words.
pub fn split_u64(value: u64) -> (u32, u32) {
    ((value >> 32) as u32, value as u32)
}
