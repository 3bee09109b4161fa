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

//! Block-device and stream collaborators (§6 of the driver specification).
//!
//! `BlockDevice` is the sector-addressable raw-disk contract; `Stream`
//! is the seekable byte cursor built on top of it. The driver never
//! issues sub-sector reads directly — all fine-grained access goes
//! through a `Stream`, which assembles whole sectors and slices out
//! the bytes the caller asked for.

use std::rc::Rc;

use fat16_err::{Error, IoError, Result};
use log::error;

pub trait BlockDevice {
    /// Size of one sector in bytes. Constant for the lifetime of the device.
    fn sector_size(&self) -> u32;

    /// Read `count` sectors starting at logical block address `lba` into `buf`.
    /// `buf` must be exactly `count * sector_size()` bytes.
    fn read_sectors(&self, lba: u64, count: u32, buf: &mut [u8]) -> Result<()>;
}

/// A seekable byte cursor over one [`BlockDevice`]. Each role (cluster
/// data, FAT, directory) holds its own `Stream` so that walking the FAT
/// never disturbs the seek position of a concurrent cluster read. `Stream`
/// holds a reference-counted handle to the device rather than a borrow so
/// that a mounted disk can own several streams over the same device
/// without fighting the borrow checker — the single-threaded model in
/// which this driver runs (no two streams are ever touched concurrently)
/// makes `Rc` the right tool over `Arc`.
pub struct Stream<D: BlockDevice + ?Sized> {
    device: Rc<D>,
    position: u64,
}

impl<D: BlockDevice + ?Sized> Stream<D> {
    pub fn new(device: Rc<D>) -> Self {
        Self { device, position: 0 }
    }

    pub fn seek(&mut self, byte_offset: u64) -> Result<()> {
        self.position = byte_offset;
        Ok(())
    }

    /// Read `dst.len()` bytes from the current position, advancing it.
    pub fn read(&mut self, dst: &mut [u8]) -> Result<()> {
        if dst.is_empty() {
            return Ok(());
        }

        let sector_size = self.device.sector_size() as u64;
        let first_sector = self.position / sector_size;
        let intra = (self.position - first_sector * sector_size) as usize;
        let last_byte = self.position + dst.len() as u64;
        let sector_count = last_byte.div_ceil(sector_size) - first_sector;
        let Ok(sector_count) = u32::try_from(sector_count) else {
            error!("Stream read of {} bytes spans too many sectors", dst.len());
            return Err(Error::Io(IoError::ReadOutOfRange));
        };

        let mut scratch = vec![0u8; (sector_count as u64 * sector_size) as usize];
        self.device.read_sectors(first_sector, sector_count, &mut scratch)?;
        dst.copy_from_slice(&scratch[intra..intra + dst.len()]);
        self.position += dst.len() as u64;
        Ok(())
    }
}
