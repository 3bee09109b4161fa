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

//! A `Vec<u8>`-backed block device, playing the role the teacher's
//! file-backed data-storage crate plays, but for an image held entirely
//! in memory — the driver's test corpus builds FAT16 images on the fly
//! rather than opening fixture files.

use std::cell::RefCell;

use fat16_ds::BlockDevice;
use fat16_err::{Error, IoError, Result};

pub struct MemoryBlockDevice {
    sector_size: u32,
    image: RefCell<Vec<u8>>,
}

impl MemoryBlockDevice {
    pub fn new(sector_size: u32, image: Vec<u8>) -> Self {
        Self {
            sector_size,
            image: RefCell::new(image),
        }
    }

    pub fn sector_count(&self) -> u64 {
        self.image.borrow().len() as u64 / self.sector_size as u64
    }
}

impl BlockDevice for MemoryBlockDevice {
    fn sector_size(&self) -> u32 {
        self.sector_size
    }

    fn read_sectors(&self, lba: u64, count: u32, buf: &mut [u8]) -> Result<()> {
        let start = lba * self.sector_size as u64;
        let len = count as u64 * self.sector_size as u64;
        let image = self.image.borrow();
        let Some(end) = start.checked_add(len) else {
            return Err(Error::Io(IoError::ReadOutOfRange));
        };
        if end > image.len() as u64 || buf.len() as u64 != len {
            return Err(Error::Io(IoError::ReadOutOfRange));
        }
        buf.copy_from_slice(&image[start as usize..end as usize]);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_back_written_image() {
        let mut image = vec![0u8; 1024];
        image[512] = 0xAB;
        let device = MemoryBlockDevice::new(512, image);

        let mut buf = [0u8; 512];
        device.read_sectors(1, 1, &mut buf).unwrap();
        assert_eq!(buf[0], 0xAB);
    }

    #[test]
    fn rejects_out_of_range_read() {
        let device = MemoryBlockDevice::new(512, vec![0u8; 512]);
        let mut buf = [0u8; 512];
        assert!(device.read_sectors(1, 1, &mut buf).is_err());
    }
}
