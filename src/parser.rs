//! Provides [`ContainerHeader`] and [`PartitionDescriptor`] along with the functions that read them
//! from a PAC container through a [`PacReader`].

/// Provides [`ParseError`] that describes errors which may occur while parsing the container header
/// and the partition table.
pub mod error {
    use crate::{reader::ReadError, wstr::NarrowString};
    use thiserror::Error;

    /// An error which may occur when parsing the PAC header or partition table.
    #[derive(Error, Debug)]
    pub enum ParseError {
        /// Returned when the container is shorter than a PAC header.
        #[error("file is too small to be a PAC file ({0} bytes)")]
        TooSmall(u64),
        /// Returned when the size declared in the header differs from the actual file size.
        #[error(
            "size mismatch: header declares {declared} bytes but the file has {actual}, PAC may \
            be damaged"
        )]
        SizeMismatch { declared: u64, actual: u64 },
        /// Returned when the version string is not one of the supported versions.
        #[error("unsupported PAC version {0:?}")]
        UnsupportedVersion(NarrowString),
        /// Returned when a partition record reports a length other than the expected one.
        #[error("unknown partition header format found (record {index} has length {length})")]
        CorruptRecord { index: u32, length: u32 },
        /// Returned when the header or a partition record couldn't be read completely.
        #[error("{0}")]
        Read(#[from] ReadError),
    }
}

use crate::{
    format::{self, *},
    reader::PacReader,
    wstr::{self, NarrowString},
};
pub use error::ParseError;
use std::io::{Read, Seek};

/// Reads a 32-bit little-endian integer at `offset`.
///
/// # Panics
/// Will panic if the slice is too short, callers only pass fixed-size records.
#[inline(always)]
fn u32_at(bytes: &[u8], offset: usize) -> u32 {
    let bytes: [u8; 4] = bytes[offset..offset + 4].try_into().unwrap();
    u32::from_le_bytes(bytes)
}

#[inline(always)]
fn u16_at(bytes: &[u8], offset: usize) -> u16 {
    let bytes: [u8; 2] = bytes[offset..offset + 2].try_into().unwrap();
    u16::from_le_bytes(bytes)
}

#[inline(always)]
fn wstr_at(bytes: &[u8], offset: usize, units: usize) -> NarrowString {
    wstr::decode(&bytes[offset..offset + units * 2], units)
}

/// The validated PAC container header.
#[derive(Clone, Debug)]
pub struct ContainerHeader {
    pub version: NarrowString,
    /// Size of the whole container, joined from the high and low words.
    pub size: u64,
    pub product_name: NarrowString,
    pub firmware_name: NarrowString,
    pub partition_count: u32,
    pub table_offset: u32,
    pub mode: u32,
    pub flash_type: u32,
    pub nand_strategy: u32,
    pub is_nv_backup: u32,
    pub nand_page_type: u32,
    pub product_alias: NarrowString,
    pub oma_dm_product_flag: u32,
    pub is_oma_dm: u32,
    pub is_preload: u32,
    pub magic: u32,
    pub crc1: u16,
    pub crc2: u16,
}

impl ContainerHeader {
    /// Parses and validates the header of a container which is `container_len` bytes long.
    ///
    /// # Errors
    /// Returns [`ParseError::TooSmall`] when either the container or `bytes` is shorter than
    /// [`HEADER_LEN`], [`ParseError::SizeMismatch`] when the declared size differs from
    /// `container_len` and [`ParseError::UnsupportedVersion`] for unknown versions.
    pub fn parse(bytes: &[u8], container_len: u64) -> Result<Self, ParseError> {
        if container_len < HEADER_LEN as u64 || bytes.len() < HEADER_LEN {
            return Err(ParseError::TooSmall(container_len));
        }

        use format::header as h;

        let size = join_u64(u32_at(bytes, h::HI_SIZE), u32_at(bytes, h::LO_SIZE));
        if size != container_len {
            return Err(ParseError::SizeMismatch {
                declared: size,
                actual: container_len,
            });
        }

        let version = wstr_at(bytes, h::VERSION, h::VERSION_UNITS);
        if !SUPPORTED_VERSIONS.iter().any(|v| version == *v) {
            return Err(ParseError::UnsupportedVersion(version));
        }

        let header = Self {
            version,
            size,
            product_name: wstr_at(bytes, h::PRODUCT_NAME, h::PRODUCT_NAME_UNITS),
            firmware_name: wstr_at(bytes, h::FIRMWARE_NAME, h::FIRMWARE_NAME_UNITS),
            partition_count: u32_at(bytes, h::PARTITION_COUNT),
            table_offset: u32_at(bytes, h::TABLE_OFFSET),
            mode: u32_at(bytes, h::MODE),
            flash_type: u32_at(bytes, h::FLASH_TYPE),
            nand_strategy: u32_at(bytes, h::NAND_STRATEGY),
            is_nv_backup: u32_at(bytes, h::IS_NV_BACKUP),
            nand_page_type: u32_at(bytes, h::NAND_PAGE_TYPE),
            product_alias: wstr_at(bytes, h::PRODUCT_ALIAS, h::PRODUCT_ALIAS_UNITS),
            oma_dm_product_flag: u32_at(bytes, h::OMA_DM_PRODUCT_FLAG),
            is_oma_dm: u32_at(bytes, h::IS_OMA_DM),
            is_preload: u32_at(bytes, h::IS_PRELOAD),
            magic: u32_at(bytes, h::MAGIC),
            crc1: u16_at(bytes, h::CRC1),
            crc2: u16_at(bytes, h::CRC2),
        };

        debug!(
            "PAC version is {}, size is {:#x}, {} partitions at {:#x}.",
            header.version, header.size, header.partition_count, header.table_offset
        );

        Ok(header)
    }
}

/// A single entry of the partition table.
#[derive(Clone, Debug)]
pub struct PartitionDescriptor {
    /// Length of the record as reported by the record itself.
    pub record_len: u32,
    pub partition_id: NarrowString,
    pub file_name: NarrowString,
    /// Payload size, joined from the high and low words.
    pub size: u64,
    /// Absolute payload offset, joined from the high and low words.
    pub data_offset: u64,
    pub file_flag: u32,
    pub check_flag: u32,
    pub can_omit_flag: u32,
    pub addr_num: u32,
    pub addrs: [u32; format::record::ADDRS_COUNT],
}

impl PartitionDescriptor {
    /// Parses the record with the given table index.
    ///
    /// # Errors
    /// Returns [`ParseError::CorruptRecord`] if the record's length field is not
    /// [`PARTITION_RECORD_LEN`].
    pub fn parse(bytes: &[u8; PARTITION_RECORD_LEN], index: u32) -> Result<Self, ParseError> {
        use format::record as r;

        let record_len = u32_at(bytes, r::LENGTH);
        if record_len as usize != PARTITION_RECORD_LEN {
            return Err(ParseError::CorruptRecord {
                index,
                length: record_len,
            });
        }

        let mut addrs = [0u32; r::ADDRS_COUNT];
        for (i, addr) in addrs.iter_mut().enumerate() {
            *addr = u32_at(bytes, r::ADDRS + i * 4);
        }

        Ok(Self {
            record_len,
            partition_id: wstr_at(bytes, r::PARTITION_ID, r::PARTITION_ID_UNITS),
            file_name: wstr_at(bytes, r::FILE_NAME, r::FILE_NAME_UNITS),
            size: join_u64(u32_at(bytes, r::HI_SIZE), u32_at(bytes, r::LO_SIZE)),
            data_offset: join_u64(
                u32_at(bytes, r::HI_DATA_OFFSET),
                u32_at(bytes, r::LO_DATA_OFFSET),
            ),
            file_flag: u32_at(bytes, r::FILE_FLAG),
            check_flag: u32_at(bytes, r::CHECK_FLAG),
            can_omit_flag: u32_at(bytes, r::CAN_OMIT_FLAG),
            addr_num: u32_at(bytes, r::ADDR_NUM),
            addrs,
        })
    }
}

/// Reads and validates the header at the start of the container.
pub fn read_header<R: Read + Seek>(
    reader: &mut PacReader<R>,
) -> Result<ContainerHeader, ParseError> {
    if reader.len() < HEADER_LEN as u64 {
        return Err(ParseError::TooSmall(reader.len()));
    }

    reader.seek(0)?;
    let bytes = reader.read_vec(HEADER_LEN)?;
    ContainerHeader::parse(&bytes, reader.len())
}

/// Reads the whole partition table described by `header`, record after record.
///
/// The table is read completely before anything is returned, so a corrupt record anywhere in the
/// table fails the whole call.
pub fn read_partitions<R: Read + Seek>(
    reader: &mut PacReader<R>,
    header: &ContainerHeader,
) -> Result<Vec<PartitionDescriptor>, ParseError> {
    reader.seek(u64::from(header.table_offset))?;

    // The count comes from the file, don't trust it for the allocation.
    let max_records = reader.len() / PARTITION_RECORD_LEN as u64;
    let capacity = u64::from(header.partition_count).min(max_records) as usize;
    let mut partitions = Vec::with_capacity(capacity);

    let mut record = [0u8; PARTITION_RECORD_LEN];
    for index in 0..header.partition_count {
        reader.read_exact(&mut record)?;
        let partition = PartitionDescriptor::parse(&record, index)?;

        trace!(
            "Partition {}: id {}, file {}, size {:#x}, offset {:#x}.",
            index,
            partition.partition_id,
            partition.file_name,
            partition.size,
            partition.data_offset
        );

        partitions.push(partition);
    }

    debug!("Parsed {} partition records.", partitions.len());

    Ok(partitions)
}
