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

//! Directory Loader (§4.5): materializes a directory's entry array in
//! memory, counting valid entries before allocating.

use std::mem::MaybeUninit;

use fat16_ds::{BlockDevice, Stream};
use fat16_err::Result;
use zerocopy::{FromBytes, IntoBytes};

use crate::bpb::VolumeGeometry;
use crate::cluster;
use crate::entry::{DirEntry, NAME_DELETED, NAME_END};

pub const DIR_ENTRY_SIZE: usize = 32;

/// A directory materialized in memory (§3 "FAT Directory"). `items`
/// holds every entry in on-disk order, `total_valid` of them actually
/// in use — `items[total_valid..]` may still contain deleted entries
/// that happened to sit before the terminating `0x00`.
#[derive(Debug, Clone)]
pub struct FatDirectory {
    pub items: Vec<DirEntry>,
    pub total_valid: usize,
    pub first_sector: u32,
    pub end_sector: u32,
}

impl FatDirectory {
    pub fn valid_entries(&self) -> &[DirEntry] {
        &self.items[..self.total_valid]
    }
}

fn read_one_entry<D: BlockDevice>(stream: &mut Stream<D>) -> Result<DirEntry> {
    let mut entry: DirEntry = unsafe { MaybeUninit::uninit().assume_init() };
    stream.read(entry.as_mut_bytes())?;
    Ok(entry)
}

/// Count valid entries in a directory whose entries are laid out as a
/// flat, contiguous run of sectors starting at `start_sector` — true of
/// the FAT16 root directory, which is not a cluster chain at all.
pub fn count_valid_entries_linear<D: BlockDevice>(
    stream: &mut Stream<D>,
    geometry: &VolumeGeometry,
    start_sector: u32,
) -> Result<u32> {
    stream.seek(geometry.sector_to_byte(start_sector))?;
    let mut total = 0u32;
    loop {
        let entry = read_one_entry(stream)?;
        if entry.dir_name[0] == NAME_END {
            break;
        }
        if entry.dir_name[0] == NAME_DELETED {
            continue;
        }
        total += 1;
    }
    Ok(total)
}

/// Count valid entries in a directory that lives in a cluster chain.
/// Unlike a linear sector scan, this walks cluster boundaries through
/// the FAT Walker — the observed source instead treats the whole
/// directory as one flat stream read, which silently reads garbage past
/// the first cluster for any subdirectory spanning more than one
/// cluster (§9). A conformant re-implementation walks the chain.
pub fn count_valid_entries_chain<D: BlockDevice>(
    data_stream: &mut Stream<D>,
    fat_stream: &mut Stream<D>,
    geometry: &VolumeGeometry,
    start_cluster: u32,
) -> Result<u32> {
    let mut total = 0u32;
    let mut offset = 0u64;
    loop {
        let mut raw = [0u8; DIR_ENTRY_SIZE];
        cluster::read(data_stream, fat_stream, geometry, start_cluster, offset, &mut raw)?;
        if raw[0] == NAME_END {
            break;
        }
        if raw[0] != NAME_DELETED {
            total += 1;
        }
        offset += DIR_ENTRY_SIZE as u64;
    }
    Ok(total)
}

fn parse_entries(raw: &[u8]) -> Vec<DirEntry> {
    raw.chunks_exact(DIR_ENTRY_SIZE)
        .map(|chunk| {
            DirEntry::read_from_bytes(chunk)
                .expect("chunks_exact(32) always yields one packed DirEntry")
        })
        .collect()
}

/// Load the fixed-location, fixed-size root directory.
pub fn load_root<D: BlockDevice>(
    stream: &mut Stream<D>,
    geometry: &VolumeGeometry,
) -> Result<FatDirectory> {
    let total_valid = count_valid_entries_linear(stream, geometry, geometry.first_root_dir_sector)?;

    stream.seek(geometry.sector_to_byte(geometry.first_root_dir_sector))?;
    let mut raw = vec![0u8; geometry.root_dir_size_bytes() as usize];
    stream.read(&mut raw)?;

    Ok(FatDirectory {
        items: parse_entries(&raw),
        total_valid: total_valid as usize,
        first_sector: geometry.first_root_dir_sector,
        end_sector: geometry.first_root_dir_sector + geometry.root_dir_sector_span,
    })
}

/// Load a subdirectory reached through `entry`. `entry` must carry the
/// subdirectory attribute; anything else is `Error::InvalidArg`.
pub fn load_subdirectory<D: BlockDevice>(
    data_stream: &mut Stream<D>,
    fat_stream: &mut Stream<D>,
    geometry: &VolumeGeometry,
    entry: &DirEntry,
) -> Result<FatDirectory> {
    if !entry.is_subdirectory() {
        return Err(fat16_err::Error::InvalidArg);
    }

    let start_cluster = entry.first_cluster();
    let total_valid =
        count_valid_entries_chain(data_stream, fat_stream, geometry, start_cluster)?;

    let mut raw = vec![0u8; total_valid as usize * DIR_ENTRY_SIZE];
    cluster::read(data_stream, fat_stream, geometry, start_cluster, 0, &mut raw)?;

    let first_sector = geometry.cluster_to_sector(start_cluster);
    Ok(FatDirectory {
        items: parse_entries(&raw),
        total_valid: total_valid as usize,
        first_sector,
        end_sector: first_sector + geometry.sectors_per_cluster,
    })
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use fat16_ds_mem::MemoryBlockDevice;

    use super::*;

    fn geometry() -> VolumeGeometry {
        VolumeGeometry {
            bytes_per_sector: 512,
            sectors_per_cluster: 1,
            reserved_sectors: 1,
            fat_copies: 1,
            sectors_per_fat: 1,
            root_dir_entries: 16,
            first_root_dir_sector: 2,
            root_dir_sector_span: 1,
            first_data_sector: 3,
        }
    }

    fn write_entry(image: &mut [u8], offset: usize, name: &[u8; 8], ext: &[u8; 3], attr: u8) {
        image[offset..offset + 8].copy_from_slice(name);
        image[offset + 8..offset + 11].copy_from_slice(ext);
        image[offset + 11] = attr;
    }

    #[test]
    fn root_directory_stops_at_terminator_and_skips_deleted() {
        let geometry = geometry();
        let mut image = vec![0u8; 512 * 4];
        let base = geometry.sector_to_byte(geometry.first_root_dir_sector) as usize;
        write_entry(&mut image, base, b"DELETED ", b"   ", 0);
        image[base] = NAME_DELETED;
        write_entry(&mut image, base + 32, b"HELLO   ", b"TXT", 0x20);
        image[base + 64] = NAME_END;
        // a live-looking entry placed after the terminator must be invisible
        write_entry(&mut image, base + 96, b"GHOST   ", b"TXT", 0x20);

        let device = MemoryBlockDevice::new(512, image);
        let mut stream = Stream::new(Rc::new(device));
        let dir = load_root(&mut stream, &geometry).unwrap();

        assert_eq!(dir.total_valid, 1);
        assert_eq!(&dir.valid_entries()[0].dir_name, b"HELLO   ");
    }
}
