//! CRC16 verification of the container header and payload.

use crate::{
    crc16::Crc16,
    format::{self, HEADER_LEN, PAC_MAGIC},
    parser::ContainerHeader,
    progress::{self, Progress},
    reader::{PacReader, ReadError},
};
use std::{
    fmt,
    io::{Read, Seek},
};
use thiserror::Error;

/// Size of the chunks the payload is checksummed in.
pub const CRC_CHUNK_LEN: usize = 64 * 1024;

/// Identifies one of the two checksums stored in the header.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum CrcKind {
    /// Covers the header up to the checksum fields.
    Crc1,
    /// Covers everything after the header.
    Crc2,
}

impl fmt::Display for CrcKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(match self {
            CrcKind::Crc1 => "CRC1",
            CrcKind::Crc2 => "CRC2",
        })
    }
}

/// An error which may occur while verifying checksums.
#[derive(Error, Debug)]
pub enum VerifyError {
    /// Returned when a computed checksum differs from the one stored in the header.
    #[error("CRC check failed for {which}")]
    Mismatch {
        which: CrcKind,
        stored: u16,
        computed: u16,
    },
    /// Returned when the checksummed range couldn't be read.
    #[error("{0}")]
    Read(#[from] ReadError),
}

/// Verifies the checksums stored in `header`.
///
/// CRC1 is only checked for containers carrying [`PAC_MAGIC`], CRC2 is always checked.
pub fn verify<R: Read + Seek>(
    reader: &mut PacReader<R>,
    header: &ContainerHeader,
    progress: &mut dyn Progress,
) -> Result<(), VerifyError> {
    if header.magic == PAC_MAGIC {
        info!("Checking CRC part 1.");
        check(CrcKind::Crc1, header.crc1, crc1(reader)?)?;
    } else {
        debug!("Magic is {:#x}, skipping CRC part 1.", header.magic);
    }

    info!("Checking CRC part 2.");
    check(CrcKind::Crc2, header.crc2, crc2(reader, header.size, progress)?)
}

fn check(which: CrcKind, stored: u16, computed: u16) -> Result<(), VerifyError> {
    if stored == computed {
        debug!("{} is {:#06x}.", which, computed);
        Ok(())
    } else {
        Err(VerifyError::Mismatch {
            which,
            stored,
            computed,
        })
    }
}

/// Computes the checksum of the header without its trailing checksum fields.
pub fn crc1<R: Read + Seek>(reader: &mut PacReader<R>) -> Result<u16, ReadError> {
    reader.seek(0)?;
    let bytes = reader.read_vec(format::header::CRC1)?;

    let mut crc = Crc16::new();
    crc.update(&bytes);
    Ok(crc.value())
}

/// Computes the checksum of everything between the header and `size`.
pub fn crc2<R: Read + Seek>(
    reader: &mut PacReader<R>,
    size: u64,
    progress: &mut dyn Progress,
) -> Result<u16, ReadError> {
    reader.seek(HEADER_LEN as u64)?;

    let total = size.saturating_sub(HEADER_LEN as u64);
    let mut left = total;
    let mut crc = Crc16::new();
    let mut buf = vec![0u8; CRC_CHUNK_LEN];

    while left > 0 {
        let len = left.min(CRC_CHUNK_LEN as u64) as usize;
        let chunk = &mut buf[..len];
        reader.read_exact(chunk)?;
        crc.update(chunk);
        left -= len as u64;
        progress.update(progress::percent(left, total));
    }

    Ok(crc.value())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        crc16,
        parser::read_header,
        progress::Silent,
        testutil::{put_u16, put_u32, TestPac, TestPartition},
    };
    use std::io::Cursor;

    fn sample() -> TestPac {
        TestPac::new(vec![
            TestPartition::new("FDL", "fdl1.bin", (0..200_000u32).map(|i| i as u8).collect()),
            TestPartition::new("NV", "nv.bin", vec![0x5a; 3]),
        ])
    }

    fn run(bytes: Vec<u8>) -> Result<(), VerifyError> {
        let mut reader = PacReader::new(Cursor::new(bytes)).unwrap();
        let header = read_header(&mut reader).unwrap();
        verify(&mut reader, &header, &mut Silent)
    }

    #[test]
    fn valid_container_passes() {
        run(sample().build()).unwrap();
    }

    #[test]
    fn payload_corruption_fails_crc2() {
        let mut bytes = sample().build();
        let last = bytes.len() - 1;
        bytes[last] ^= 0xff;

        match run(bytes.clone()) {
            Err(VerifyError::Mismatch {
                which: CrcKind::Crc2,
                stored,
                computed,
            }) => {
                assert_ne!(stored, computed);
                assert_eq!(computed, crc16::update(0, &bytes[HEADER_LEN..]));
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn header_corruption_fails_crc1() {
        let mut bytes = sample().build();
        put_u32(&mut bytes, format::header::MODE, 7);
        assert!(matches!(
            run(bytes),
            Err(VerifyError::Mismatch {
                which: CrcKind::Crc1,
                ..
            })
        ));
    }

    #[test]
    fn crc1_skipped_without_magic() {
        let mut pac = sample();
        pac.magic = 0;
        let mut bytes = pac.build();
        put_u16(&mut bytes, format::header::CRC1, 0xdead);
        run(bytes).unwrap();
    }

    #[test]
    fn crc2_checked_without_magic() {
        let mut pac = sample();
        pac.magic = 0x1234_5678;
        let mut bytes = pac.build();
        put_u16(&mut bytes, format::header::CRC2, 0xbeef);
        assert!(matches!(
            run(bytes),
            Err(VerifyError::Mismatch {
                which: CrcKind::Crc2,
                stored: 0xbeef,
                ..
            })
        ));
    }

    #[test]
    fn crc2_reports_progress() {
        let bytes = sample().build();
        let total = bytes.len() - HEADER_LEN;
        let mut reader = PacReader::new(Cursor::new(bytes)).unwrap();

        let mut seen = Vec::new();
        crc2(&mut reader, total as u64 + HEADER_LEN as u64, &mut |p: u8| seen.push(p)).unwrap();

        assert_eq!(seen.len(), (total + CRC_CHUNK_LEN - 1) / CRC_CHUNK_LEN);
        assert!(seen.windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(seen.last(), Some(&100));
    }
}
