#[macro_use]
extern crate log;

mod crc16;
mod error;
mod extract;
mod format;
mod manifest;
mod parser;
mod progress;
mod reader;
#[cfg(test)]
mod testutil;
mod util;
mod verify;
mod wstr;

use clap::{arg, command, value_parser};
use error::RunError;
use log::LevelFilter;
use manifest::Manifest;
use parser::{ContainerHeader, PartitionDescriptor};
use progress::{Console, Progress};
use reader::PacReader;
use simple_logger::SimpleLogger;
use std::{
    fs::File,
    io::{BufReader, Read, Seek},
    path::{Path, PathBuf},
    process,
};
use verify::VerifyError;

const MANIFEST_NAME: &str = "manifest.toml";

fn print_split(name: &str, value: u64) {
    let (hi, lo) = format::split_u64(value);
    if hi != 0 {
        println!("Hi{:<12}= {}", name, hi);
        println!("Lo{:<12}= {}", name, lo);
    }
    println!("{:<14}= {}", name, value);
}

fn do_print_header(header: &ContainerHeader) {
    println!("{:<14}= {}", "Version", header.version);
    print_split("Size", header.size);
    println!("{:<14}= {}", "PrdName", header.product_name);
    println!("{:<14}= {}", "FirmwareName", header.firmware_name);
    println!("{:<14}= {}", "FileCount", header.partition_count);
    println!("{:<14}= {}", "FileOffset", header.table_offset);
    println!("{:<14}= {}", "Mode", header.mode);
    println!("{:<14}= {}", "FlashType", header.flash_type);
    println!("{:<14}= {}", "NandStrategy", header.nand_strategy);
    println!("{:<14}= {}", "IsNvBackup", header.is_nv_backup);
    println!("{:<14}= {}", "NandPageType", header.nand_page_type);
    println!("{:<14}= {}", "PrdAlias", header.product_alias);
    println!("{:<14}= {}", "OmaDmPrdFlag", header.oma_dm_product_flag);
    println!("{:<14}= {}", "IsOmaDM", header.is_oma_dm);
    println!("{:<14}= {}", "IsPreload", header.is_preload);
    println!("{:<14}= {:#x}", "Magic", header.magic);
    println!("{:<14}= {}", "CRC1", header.crc1);
    println!("{:<14}= {}", "CRC2", header.crc2);
    println!();
}

fn do_print_partition(partition: &PartitionDescriptor) {
    println!("{:<14}= {}", "Size", partition.record_len);
    println!("{:<14}= {}", "FileID", partition.partition_id);
    println!("{:<14}= {}", "FileName", partition.file_name);
    print_split("FileSize", partition.size);
    println!("{:<14}= {}", "FileFlag", partition.file_flag);
    println!("{:<14}= {}", "CheckFlag", partition.check_flag);
    print_split("DataOffset", partition.data_offset);
    println!("{:<14}= {}", "CanOmitFlag", partition.can_omit_flag);
    println!();
}

struct Options<'a> {
    in_file: &'a Path,
    out_dir: PathBuf,
    debug: bool,
    check_crc: bool,
    manifest: bool,
}

fn run<'a>(opts: &Options<'a>) -> Result<(), RunError<'a>> {
    let file = File::open(opts.in_file).map_err(|e| RunError::Open(opts.in_file, e))?;
    let mut reader =
        PacReader::new(BufReader::new(file)).map_err(|e| RunError::Open(opts.in_file, e))?;

    info!("Loaded file at path {}.", opts.in_file.display());

    unpack(&mut reader, opts, &mut Console)
}

/// Parses the container, verifies it if requested and extracts every partition.
///
/// Nothing is written to the output directory until the header, the checksums and the whole
/// partition table have been validated.
fn unpack<'a, R: Read + Seek>(
    reader: &mut PacReader<R>,
    opts: &Options<'a>,
    progress: &mut dyn Progress,
) -> Result<(), RunError<'a>> {
    let header = parser::read_header(reader).map_err(|e| RunError::Parse(opts.in_file, e))?;
    if opts.debug {
        do_print_header(&header);
    }

    if opts.check_crc {
        println!("Checking CRC...");
        let result = verify::verify(reader, &header, progress);
        println!();

        if let Err(VerifyError::Mismatch {
            which,
            stored,
            computed,
        }) = &result
        {
            if opts.debug {
                println!("Computed {} = {}, {} in PAC = {}", which, computed, which, stored);
            }
        }
        result?;
    }

    let partitions = parser::read_partitions(reader, &header)
        .map_err(|e| RunError::Parse(opts.in_file, e))?;
    if opts.debug {
        partitions.iter().for_each(do_print_partition);
    }

    util::ensure_dir(&opts.out_dir)?;

    println!("\nExtracting to {}\n", opts.out_dir.display());
    let written = extract::extract_all(reader, &partitions, &opts.out_dir, progress)?;

    if opts.manifest {
        let manifest = Manifest::with_header(&header, &partitions, &written, &opts.out_dir);
        let path = opts.out_dir.join(MANIFEST_NAME);
        util::save_file("manifest", path, manifest.to_toml()?.as_bytes())?;
    }

    println!("\nDone...");

    Ok(())
}

fn main() {
    let matches = command!()
        .arg(arg!(debug: -d --debug).help(
            "Prints all fields of the PAC header and of every partition record, and the computed \
                    checksums on a CRC mismatch.",
        ))
        .arg(arg!(check_crc: -c --check_crc).help(
            "Computes and verifies the CRC16 checksums of the header and the payload before \
                    extracting.",
        ))
        .arg(
            arg!(out_dir: -o --out_dir <DIR>)
                .value_parser(value_parser!(PathBuf))
                .help(
                    "Path to the directory where the partitions will be written. It is created \
                    if it does not exist. The default is the current working directory.",
                ),
        )
        .arg(arg!(manifest: -m --manifest).help(
            "Writes a manifest.toml describing the PAC header and partitions into the output \
                    directory.",
        ))
        .arg(
            arg!(log_level: -l --log_level <LEVEL>)
                .default_value("WARN")
                .help(
                    "Configures the log level for the tool. Available log levels are: NONE \
                    (disables logging entirely), TRACE, DEBUG, INFO, WARN and ERROR.",
                ),
        )
        .arg(
            arg!(in_file: <PAC_FILE>)
                .value_parser(value_parser!(PathBuf))
                .help("Path to the PAC file to be unpacked."),
        )
        .get_matches();

    let log_level: String = matches.get_one::<String>("log_level").unwrap().to_string();
    let log_level = match log_level.as_str() {
        "NONE" | "none" => LevelFilter::Off,
        "TRACE" | "trace" => LevelFilter::Trace,
        "DEBUG" | "debug" => LevelFilter::Debug,
        "INFO" | "info" => LevelFilter::Info,
        "WARN" | "warn" => LevelFilter::Warn,
        "ERROR" | "error" => LevelFilter::Error,
        _ => LevelFilter::Warn,
    };

    SimpleLogger::new().with_level(log_level).init().unwrap();

    let in_file: PathBuf = matches.get_one::<PathBuf>("in_file").unwrap().clone();
    let opts = Options {
        in_file: &in_file,
        out_dir: matches
            .get_one::<PathBuf>("out_dir")
            .cloned()
            .unwrap_or_else(|| PathBuf::from(".")),
        debug: matches.get_flag("debug"),
        check_crc: matches.get_flag("check_crc"),
        manifest: matches.get_flag("manifest"),
    };

    if let Err(e) = run(&opts) {
        error!("{}", e);
        process::exit(1);
    }
}
