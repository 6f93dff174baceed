//! A TOML description of a parsed container, written next to the extracted partitions.

use crate::parser::{ContainerHeader, PartitionDescriptor};
use serde::Serialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Serialize)]
pub struct PartitionDesc {
    pub id: String,
    pub file_name: String,
    pub size: u64,
    pub data_offset: u64,
    pub file_flag: u32,
    pub check_flag: u32,
    pub can_omit_flag: u32,
    pub addr_num: u32,
    pub addrs: Vec<u32>,
    /// Path of the extracted file, absent for empty partitions.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
pub struct Manifest {
    pub version: String,
    pub size: u64,
    pub product_name: String,
    pub firmware_name: String,
    pub product_alias: String,
    pub mode: u32,
    pub flash_type: u32,
    pub nand_strategy: u32,
    pub is_nv_backup: u32,
    pub nand_page_type: u32,
    pub oma_dm_product_flag: u32,
    pub is_oma_dm: u32,
    pub is_preload: u32,
    pub magic: u32,
    pub crc1: u16,
    pub crc2: u16,
    pub partitions: Vec<PartitionDesc>,
}

impl Manifest {
    /// Builds a manifest. `written` holds the extracted paths in table order, one per non-empty
    /// partition, as returned by [`extract_all`](crate::extract::extract_all).
    pub fn with_header(
        header: &ContainerHeader,
        partitions: &[PartitionDescriptor],
        written: &[PathBuf],
        out_dir: &Path,
    ) -> Manifest {
        let mut written = written.iter();
        let partitions = partitions
            .iter()
            .map(|p| {
                let path = if p.size != 0 { written.next() } else { None };

                PartitionDesc {
                    id: p.partition_id.to_string(),
                    file_name: p.file_name.to_string(),
                    size: p.size,
                    data_offset: p.data_offset,
                    file_flag: p.file_flag,
                    check_flag: p.check_flag,
                    can_omit_flag: p.can_omit_flag,
                    addr_num: p.addr_num,
                    addrs: p.addrs.to_vec(),
                    path: path.map(|path| path.strip_prefix(out_dir).unwrap_or(path).to_path_buf()),
                }
            })
            .collect();

        Manifest {
            version: header.version.to_string(),
            size: header.size,
            product_name: header.product_name.to_string(),
            firmware_name: header.firmware_name.to_string(),
            product_alias: header.product_alias.to_string(),
            mode: header.mode,
            flash_type: header.flash_type,
            nand_strategy: header.nand_strategy,
            is_nv_backup: header.is_nv_backup,
            nand_page_type: header.nand_page_type,
            oma_dm_product_flag: header.oma_dm_product_flag,
            is_oma_dm: header.is_oma_dm,
            is_preload: header.is_preload,
            magic: header.magic,
            crc1: header.crc1,
            crc2: header.crc2,
            partitions,
        }
    }

    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string(self)
    }
}
