// Copyright 2024 Kevin Ludwig
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! FAT Walker (§4.3): interprets the 16-bit entries of the File
//! Allocation Table and turns a byte offset into a file into the
//! cluster that covers it.

use fat16_ds::{BlockDevice, Stream};
use fat16_err::{Error, IoError, Result};
use zerocopy::little_endian::U16;
use zerocopy::IntoBytes;

use crate::bpb::VolumeGeometry;

const FAT_ENTRY_SIZE: u64 = 2;

/// Classification of a raw 16-bit FAT entry (§3 "FAT Entry").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FatEntry {
    Unused,
    Next(u32),
    Reserved,
    Bad,
    EndOfChain,
}

pub fn classify(raw: u16) -> FatEntry {
    match raw {
        0x0000 => FatEntry::Unused,
        0x0002..=0xFFEF => FatEntry::Next(raw as u32),
        0xFFF0..=0xFFF6 => FatEntry::Reserved,
        0xFFF7 => FatEntry::Bad,
        0xFFF8..=0xFFFF => FatEntry::EndOfChain,
        // 0x0001 is not a legal cluster number or sentinel; treat it the
        // same as the other non-data values.
        _ => FatEntry::Reserved,
    }
}

/// Read the raw 16-bit FAT entry for `cluster`.
pub fn next_entry<D: BlockDevice>(
    stream: &mut Stream<D>,
    geometry: &VolumeGeometry,
    cluster: u32,
) -> Result<u16> {
    let offset =
        geometry.sector_to_byte(geometry.first_fat_sector()) + cluster as u64 * FAT_ENTRY_SIZE;
    stream.seek(offset)?;
    let mut raw = U16::new(0);
    stream.read(raw.as_mut_bytes())?;
    Ok(raw.get())
}

/// Follow the chain starting at `start_cluster` until `byte_offset` is
/// covered, returning the cluster that contains it. Any non-data entry
/// (end-of-chain, bad, unused, or reserved) encountered before then is
/// an error: a well-formed file's chain must be long enough to cover
/// every byte up to its declared size.
pub fn cluster_for_offset<D: BlockDevice>(
    stream: &mut Stream<D>,
    geometry: &VolumeGeometry,
    start_cluster: u32,
    byte_offset: u64,
) -> Result<u32> {
    let steps = byte_offset / geometry.cluster_size_bytes() as u64;
    let mut current = start_cluster;
    for _ in 0..steps {
        let raw = next_entry(stream, geometry, current)?;
        match classify(raw) {
            FatEntry::Next(next) => current = next,
            FatEntry::EndOfChain | FatEntry::Bad | FatEntry::Unused | FatEntry::Reserved => {
                return Err(Error::Io(IoError::ReadOutOfRange));
            }
        }
    }
    Ok(current)
}
