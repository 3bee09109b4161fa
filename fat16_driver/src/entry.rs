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

//! The 32-byte on-disk directory entry (§3 "Directory Entry") and the
//! in-memory `FatItem` a resolved path component turns into.

use zerocopy::little_endian::{U16, U32};
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};

use crate::dir::FatDirectory;

pub const ATTR_READ_ONLY: u8 = 0x01;
pub const ATTR_HIDDEN: u8 = 0x02;
pub const ATTR_SYSTEM: u8 = 0x04;
pub const ATTR_VOLUME_LABEL: u8 = 0x08;
pub const ATTR_SUBDIRECTORY: u8 = 0x10;
pub const ATTR_ARCHIVE: u8 = 0x20;

pub const NAME_DELETED: u8 = 0xE5;
pub const NAME_END: u8 = 0x00;

#[repr(C, packed)]
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, KnownLayout, Immutable)]
pub struct DirEntry {
    pub dir_name: [u8; 8],
    pub dir_ext: [u8; 3],
    pub dir_attr: u8,
    pub dir_ntres: u8,
    pub dir_crttimetenth: u8,
    pub dir_crttime: U16,
    pub dir_crtdate: U16,
    pub dir_lstaccdate: U16,
    pub dir_fstclushi: U16,
    pub dir_wrttime: U16,
    pub dir_wrtdate: U16,
    pub dir_fstcluslo: U16,
    pub dir_filesize: U32,
}

impl DirEntry {
    pub fn is_subdirectory(&self) -> bool {
        self.dir_attr & ATTR_SUBDIRECTORY != 0
    }

    /// First cluster of this entry's chain. FAT16 never sets the high
    /// word (§9: "For FAT16, the high word is always 0"); this driver
    /// targets FAT16 strictly and reads the low word only, unlike the
    /// observed source's unshifted `(high | low)`, which is harmless
    /// only because the high word is always zero on this format.
    pub fn first_cluster(&self) -> u32 {
        self.dir_fstcluslo.get() as u32
    }

    pub fn file_size(&self) -> u32 {
        self.dir_filesize.get()
    }
}

/// A resolved path component: either an owned copy of a file's entry,
/// or a fully loaded directory (§3 "FAT Item"). Dropping either variant
/// releases everything it owns — a loaded directory's entry buffer in
/// particular, which is how the resolver avoids leaking intermediate
/// directories while it descends (§9).
#[derive(Debug, Clone)]
pub enum FatItem {
    File(DirEntry),
    Directory(FatDirectory),
}

impl FatItem {
    pub fn as_directory(&self) -> Option<&FatDirectory> {
        match self {
            FatItem::Directory(dir) => Some(dir),
            FatItem::File(_) => None,
        }
    }

    pub fn as_file(&self) -> Option<&DirEntry> {
        match self {
            FatItem::File(entry) => Some(entry),
            FatItem::Directory(_) => None,
        }
    }
}
