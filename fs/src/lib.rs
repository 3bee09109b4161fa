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

//! Generic filesystem-driver interface. A driver mounts on a [`Disk`],
//! keeps whatever private state it needs in `Disk::fs_private`, and is
//! reached through `FileSystemDriver`'s capability set.

pub use fat16_err::*;

use std::rc::Rc;

use fat16_ds::BlockDevice;

/// Open mode requested by a caller. This driver family is read-only
/// end to end, so anything but `Read` is rejected with `Error::ReadOnlyFs`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Read,
    Write,
    ReadWrite,
}

/// One component of a parsed absolute path, e.g. `DIR` or `FILE.BIN`.
///
/// The real path tokenizer is an external collaborator the driver never
/// sees directly; this is the linked-list shape it hands the driver.
/// `parse` is a minimal stand-in for that collaborator, kept here only
/// so a driver can be exercised without separators leaking into it.
#[derive(Debug, Clone)]
pub struct PathPart {
    pub name: String,
    pub next: Option<Box<PathPart>>,
}

impl PathPart {
    pub fn parse(path: &str) -> Option<Box<PathPart>> {
        let mut head: Option<Box<PathPart>> = None;
        for name in path.split('/').filter(|s| !s.is_empty()).rev() {
            head = Some(Box::new(PathPart {
                name: name.to_string(),
                next: head,
            }));
        }
        head
    }

    pub fn iter(&self) -> PathPartIter<'_> {
        PathPartIter { next: Some(self) }
    }
}

pub struct PathPartIter<'a> {
    next: Option<&'a PathPart>,
}

impl<'a> Iterator for PathPartIter<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next.take()?;
        self.next = current.next.as_deref();
        Some(current.name.as_str())
    }
}

/// A disk bound to at most one mounted driver's private state. Generic
/// over the block device so the same shape serves a real device and the
/// in-memory test device alike.
pub struct Disk<D: BlockDevice, P> {
    pub device: Rc<D>,
    pub sector_size: u32,
    pub fs_private: Option<P>,
}

impl<D: BlockDevice, P> Disk<D, P> {
    pub fn new(device: D) -> Self {
        let sector_size = device.sector_size();
        Self {
            device: Rc::new(device),
            sector_size,
            fs_private: None,
        }
    }
}

/// A file handle returned by `FileSystemDriver::open`.
pub struct FileDescriptor<I> {
    pub item: I,
    pub position: u64,
}

/// The capability set a filesystem driver registers under a name
/// (the "filesystem capability table" a VFS dispatches through).
pub trait FileSystemDriver<D: BlockDevice> {
    type Private;
    type Item;

    const NAME: &'static str;

    fn probe(&self, disk: &mut Disk<D, Self::Private>) -> Result<()>;

    /// `&mut Disk` because resolving a path walks the per-role streams
    /// held in `disk.fs_private`, and a `Stream` is a cursor: reading
    /// through it is a mutation (§5 — these cursors are not meant to be
    /// touched concurrently, which this signature enforces statically).
    fn open(
        &self,
        disk: &mut Disk<D, Self::Private>,
        path: &PathPart,
        mode: Mode,
    ) -> Result<FileDescriptor<Self::Item>>;
}
