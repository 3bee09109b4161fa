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

//! BPB Parser (§4.1, §4.2): the boot sector's on-disk layout and the
//! arithmetic that derives volume geometry from it.

use fat16_err::{Error, Result};
use log::error;
use zerocopy::{little_endian::U16, FromBytes, Immutable, IntoBytes, KnownLayout};

pub const FAT16_EXTENDED_SIGNATURE: u8 = 0x29;

/// The leading portion of the boot sector this driver actually reads:
/// the jump instruction and OEM name are skipped over by callers, and
/// everything past the extended signature (volume ID, label, boot code,
/// the 0x55AA trailer) is irrelevant to a read-only driver.
#[repr(C, packed)]
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, KnownLayout, Immutable)]
pub struct BootSector {
    pub bs_jmp_boot: [u8; 3],
    pub bs_oem_name: [u8; 8],
    pub bpb_bytes_per_sector: U16,
    pub bpb_sectors_per_cluster: u8,
    pub bpb_reserved_sectors: U16,
    pub bpb_fat_copies: u8,
    pub bpb_root_dir_entries: U16,
    pub bpb_total_sectors16: U16,
    pub bpb_media: u8,
    pub bpb_sectors_per_fat: U16,
    pub bpb_sectors_per_track: U16,
    pub bpb_heads: U16,
    pub bpb_hidden_sectors: zerocopy::little_endian::U32,
    pub bpb_total_sectors32: zerocopy::little_endian::U32,
    pub bs_drive_number: u8,
    pub bs_reserved1: u8,
    pub bs_extended_signature: u8,
}

pub const DIR_ENTRY_SIZE: u32 = 32;

/// Volume geometry, immutable once `probe` succeeds (§3 "Volume Geometry").
#[derive(Debug, Clone, Copy)]
pub struct VolumeGeometry {
    pub bytes_per_sector: u32,
    pub sectors_per_cluster: u32,
    pub reserved_sectors: u32,
    pub fat_copies: u32,
    pub sectors_per_fat: u32,
    pub root_dir_entries: u32,
    pub first_root_dir_sector: u32,
    pub root_dir_sector_span: u32,
    pub first_data_sector: u32,
}

impl VolumeGeometry {
    /// Validate the boot sector and derive geometry. Any inconsistency
    /// here means this volume is not one our driver should mount, so it
    /// is reported as `NotOurFs` rather than `Io` — that lets a VFS fall
    /// through to the next registered driver (§7).
    pub fn from_boot_sector(boot: &BootSector) -> Result<Self> {
        let bytes_per_sector = boot.bpb_bytes_per_sector.get() as u32;
        let sectors_per_cluster = boot.bpb_sectors_per_cluster as u32;
        let reserved_sectors = boot.bpb_reserved_sectors.get() as u32;
        let fat_copies = boot.bpb_fat_copies as u32;
        let sectors_per_fat = boot.bpb_sectors_per_fat.get() as u32;
        let root_dir_entries = boot.bpb_root_dir_entries.get() as u32;

        if bytes_per_sector == 0 {
            error!("Bytes per sector shall be non-zero");
            return Err(Error::NotOurFs);
        }
        if sectors_per_cluster == 0 {
            error!("Sectors per cluster shall be non-zero");
            return Err(Error::NotOurFs);
        }
        if reserved_sectors == 0 {
            error!("Reserved sectors shall be non-zero");
            return Err(Error::NotOurFs);
        }
        if fat_copies == 0 {
            error!("FAT copies shall be non-zero");
            return Err(Error::NotOurFs);
        }
        if root_dir_entries == 0 {
            error!("Root directory entries shall be non-zero");
            return Err(Error::NotOurFs);
        }
        if boot.bs_extended_signature != FAT16_EXTENDED_SIGNATURE {
            error!(
                "Extended boot signature (0x{:02X}) is not the FAT16 signature",
                boot.bs_extended_signature
            );
            return Err(Error::NotOurFs);
        }

        let first_root_dir_sector = reserved_sectors + fat_copies * sectors_per_fat;
        let root_dir_size = root_dir_entries * DIR_ENTRY_SIZE;
        let root_dir_sector_span = root_dir_size.div_ceil(bytes_per_sector);
        let first_data_sector = first_root_dir_sector + root_dir_sector_span;

        Ok(Self {
            bytes_per_sector,
            sectors_per_cluster,
            reserved_sectors,
            fat_copies,
            sectors_per_fat,
            root_dir_entries,
            first_root_dir_sector,
            root_dir_sector_span,
            first_data_sector,
        })
    }

    pub fn sector_to_byte(&self, sector: u32) -> u64 {
        sector as u64 * self.bytes_per_sector as u64
    }

    /// First sector of the data region occupied by cluster `cluster`
    /// (clusters start at 2, per §3).
    pub fn cluster_to_sector(&self, cluster: u32) -> u32 {
        self.first_data_sector + (cluster - 2) * self.sectors_per_cluster
    }

    pub fn first_fat_sector(&self) -> u32 {
        self.reserved_sectors
    }

    pub fn cluster_size_bytes(&self) -> u32 {
        self.sectors_per_cluster * self.bytes_per_sector
    }

    pub fn root_dir_size_bytes(&self) -> u32 {
        self.root_dir_entries * DIR_ENTRY_SIZE
    }
}
