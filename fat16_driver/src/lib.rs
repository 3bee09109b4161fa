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

//! Driver Facade (§4.8): wires the BPB parser, FAT walker, cluster
//! reader, directory loader, name matcher and path resolver together
//! behind the generic [`FileSystemDriver`] capability table.

pub mod bpb;
pub mod cluster;
pub mod dir;
pub mod entry;
pub mod fat;
pub mod name;
pub mod resolve;

use std::mem::MaybeUninit;

use fat16_ds::{BlockDevice, Stream};
use fat16_err::{Error, IoError, Result};
use fat16_fs::{Disk, FileDescriptor, FileSystemDriver, Mode, PathPart};
use zerocopy::IntoBytes;

use bpb::{BootSector, VolumeGeometry};
use dir::{load_root, FatDirectory};
use entry::FatItem;

/// State a mounted volume keeps around for the lifetime of the mount.
/// Each role gets its own [`Stream`] so that walking the FAT chain for
/// one open file never disturbs the cursor another role is mid-read on
/// (§5 — this driver assumes a single-threaded caller, but even within
/// one thread, interleaving a directory scan with a FAT walk must not
/// corrupt either cursor).
pub struct FatPrivateState<D: BlockDevice> {
    pub geometry: VolumeGeometry,
    pub root_directory: FatDirectory,
    pub stream_cluster: Stream<D>,
    pub stream_fat: Stream<D>,
    pub stream_directory: Stream<D>,
}

/// The FAT16 driver itself. It carries no state of its own — everything
/// per-volume lives in `Disk::fs_private` — so one instance can probe
/// and mount any number of disks.
#[derive(Debug, Default, Clone, Copy)]
pub struct Fat16Driver;

impl<D: BlockDevice> FileSystemDriver<D> for Fat16Driver {
    type Private = FatPrivateState<D>;
    type Item = FatItem;

    const NAME: &'static str = "FAT16";

    fn probe(&self, disk: &mut Disk<D, Self::Private>) -> Result<()> {
        let mut boot_sector: BootSector = unsafe { MaybeUninit::uninit().assume_init() };
        let mut probe_stream = Stream::new(disk.device.clone());
        probe_stream.read(boot_sector.as_mut_bytes())?;

        let geometry = VolumeGeometry::from_boot_sector(&boot_sector)?;

        let mut stream_directory = Stream::new(disk.device.clone());
        let root_directory = load_root(&mut stream_directory, &geometry)?;

        disk.fs_private = Some(FatPrivateState {
            geometry,
            root_directory,
            stream_cluster: Stream::new(disk.device.clone()),
            stream_fat: Stream::new(disk.device.clone()),
            stream_directory,
        });
        Ok(())
    }

    fn open(
        &self,
        disk: &mut Disk<D, Self::Private>,
        path: &PathPart,
        mode: Mode,
    ) -> Result<FileDescriptor<Self::Item>> {
        if mode != Mode::Read {
            return Err(Error::ReadOnlyFs);
        }

        let private = disk.fs_private.as_mut().ok_or(Error::InvalidArg)?;
        let item = resolve::resolve(
            &mut private.stream_cluster,
            &mut private.stream_fat,
            &private.geometry,
            &private.root_directory,
            path,
        )?;
        let item = item.ok_or(Error::Io(IoError::ReadOutOfRange))?;

        Ok(FileDescriptor { item, position: 0 })
    }
}

/// Read `dst.len()` bytes from `descriptor`'s current position, through
/// the Cluster Reader, and advance the descriptor's position. Returns
/// `Error::InvalidArg` if the descriptor names a directory rather than
/// a file.
pub fn read_file<D: BlockDevice>(
    disk: &mut Disk<D, FatPrivateState<D>>,
    descriptor: &mut FileDescriptor<FatItem>,
    dst: &mut [u8],
) -> Result<()> {
    let entry = *descriptor.item.as_file().ok_or(Error::InvalidArg)?;
    let private = disk.fs_private.as_mut().ok_or(Error::InvalidArg)?;

    cluster::read(
        &mut private.stream_cluster,
        &mut private.stream_fat,
        &private.geometry,
        entry.first_cluster(),
        descriptor.position,
        dst,
    )?;
    descriptor.position += dst.len() as u64;
    Ok(())
}
