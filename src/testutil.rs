//! Helpers that lay out PAC containers in memory for tests.

use crate::{
    crc16,
    format::{self, *},
};

pub fn put_u32(buf: &mut [u8], offset: usize, value: u32) {
    buf[offset..offset + 4].copy_from_slice(&value.to_le_bytes());
}

pub fn put_u16(buf: &mut [u8], offset: usize, value: u16) {
    buf[offset..offset + 2].copy_from_slice(&value.to_le_bytes());
}

/// Writes `s` as 16-bit units, zero-filling the rest of the field.
pub fn put_wstr(buf: &mut [u8], offset: usize, s: &str, units: usize) {
    let field = &mut buf[offset..offset + units * 2];
    field.fill(0);
    for (unit, c) in field.chunks_exact_mut(2).zip(s.bytes()) {
        unit.copy_from_slice(&u16::from(c).to_le_bytes());
    }
}

pub struct TestPartition {
    pub id: &'static str,
    pub file_name: &'static str,
    pub data: Vec<u8>,
}

impl TestPartition {
    pub fn new(id: &'static str, file_name: &'static str, data: Vec<u8>) -> Self {
        Self {
            id,
            file_name,
            data,
        }
    }
}

/// A container description. The partition table follows the header directly and payloads follow
/// the table in order. Empty partitions get a zero data offset.
pub struct TestPac {
    pub version: &'static str,
    pub magic: u32,
    pub partitions: Vec<TestPartition>,
}

impl TestPac {
    pub fn new(partitions: Vec<TestPartition>) -> Self {
        Self {
            version: "BP_R1.0.0",
            magic: PAC_MAGIC,
            partitions,
        }
    }

    pub fn build(&self) -> Vec<u8> {
        let table_len = self.partitions.len() * PARTITION_RECORD_LEN;
        let mut data_offset = (HEADER_LEN + table_len) as u64;
        let total_len = data_offset as usize
            + self.partitions.iter().map(|p| p.data.len()).sum::<usize>();

        let mut buf = vec![0u8; total_len];

        {
            use format::header as h;

            let (hi, lo) = split_u64(total_len as u64);
            put_wstr(&mut buf, h::VERSION, self.version, h::VERSION_UNITS);
            put_u32(&mut buf, h::HI_SIZE, hi);
            put_u32(&mut buf, h::LO_SIZE, lo);
            put_wstr(&mut buf, h::PRODUCT_NAME, "test_product", h::PRODUCT_NAME_UNITS);
            put_wstr(&mut buf, h::FIRMWARE_NAME, "test_firmware", h::FIRMWARE_NAME_UNITS);
            put_u32(&mut buf, h::PARTITION_COUNT, self.partitions.len() as u32);
            put_u32(&mut buf, h::TABLE_OFFSET, HEADER_LEN as u32);
            put_u32(&mut buf, h::FLASH_TYPE, 1);
            put_wstr(&mut buf, h::PRODUCT_ALIAS, "alias", h::PRODUCT_ALIAS_UNITS);
            put_u32(&mut buf, h::MAGIC, self.magic);
        }

        for (i, partition) in self.partitions.iter().enumerate() {
            use format::record as r;

            let base = HEADER_LEN + i * PARTITION_RECORD_LEN;
            let record = &mut buf[base..base + PARTITION_RECORD_LEN];
            let size = partition.data.len() as u64;
            let offset = if size == 0 { 0 } else { data_offset };
            let (hi_size, lo_size) = split_u64(size);
            let (hi_offset, lo_offset) = split_u64(offset);

            put_u32(record, r::LENGTH, PARTITION_RECORD_LEN as u32);
            put_wstr(record, r::PARTITION_ID, partition.id, r::PARTITION_ID_UNITS);
            put_wstr(record, r::FILE_NAME, partition.file_name, r::FILE_NAME_UNITS);
            put_u32(record, r::HI_SIZE, hi_size);
            put_u32(record, r::LO_SIZE, lo_size);
            put_u32(record, r::HI_DATA_OFFSET, hi_offset);
            put_u32(record, r::LO_DATA_OFFSET, lo_offset);
            put_u32(record, r::FILE_FLAG, u32::from(size != 0));
            put_u32(record, r::CHECK_FLAG, 1);

            let start = data_offset as usize;
            buf[start..start + partition.data.len()].copy_from_slice(&partition.data);
            data_offset += size;
        }

        let crc1 = crc16::update(0, &buf[..format::header::CRC1]);
        put_u16(&mut buf, format::header::CRC1, crc1);
        let crc2 = crc16::update(0, &buf[HEADER_LEN..]);
        put_u16(&mut buf, format::header::CRC2, crc2);

        buf
    }
}
