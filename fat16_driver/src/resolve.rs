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

//! Path Resolver (§4.7): walks a parsed path from the root, descending
//! into subdirectories, producing a terminal `FatItem`.

use fat16_ds::{BlockDevice, Stream};
use fat16_err::Result;
use fat16_fs::PathPart;

use crate::bpb::VolumeGeometry;
use crate::dir::{load_subdirectory, FatDirectory};
use crate::entry::FatItem;
use crate::name::matches;

/// Find the first entry in `dir` whose canonical name matches `name`.
/// A file match is returned as an owned copy of its entry; a directory
/// match triggers a fresh `load_subdirectory`, so the returned item owns
/// its own entry buffer independent of `dir`.
pub fn find_in_directory<D: BlockDevice>(
    data_stream: &mut Stream<D>,
    fat_stream: &mut Stream<D>,
    geometry: &VolumeGeometry,
    dir: &FatDirectory,
    name: &str,
) -> Result<Option<FatItem>> {
    for candidate in dir.valid_entries() {
        if !matches(candidate, name) {
            continue;
        }
        return Ok(Some(if candidate.is_subdirectory() {
            FatItem::Directory(load_subdirectory(
                data_stream,
                fat_stream,
                geometry,
                candidate,
            )?)
        } else {
            FatItem::File(*candidate)
        }));
    }
    Ok(None)
}

/// Resolve `path` starting from `root`, returning the terminal item or
/// `None` if any component along the way is missing. Each intermediate
/// directory `FatItem` is simply dropped once its child has been
/// retrieved — it is not reference-counted, so descending never leaks
/// the parent (§9 "Ownership of resolver intermediates").
pub fn resolve<D: BlockDevice>(
    data_stream: &mut Stream<D>,
    fat_stream: &mut Stream<D>,
    geometry: &VolumeGeometry,
    root: &FatDirectory,
    path: &PathPart,
) -> Result<Option<FatItem>> {
    let mut components = path.iter();
    let Some(first) = components.next() else {
        return Ok(None);
    };

    let Some(mut current) = find_in_directory(data_stream, fat_stream, geometry, root, first)?
    else {
        return Ok(None);
    };

    for component in components {
        let Some(dir) = current.as_directory() else {
            return Ok(None);
        };
        let Some(next) = find_in_directory(data_stream, fat_stream, geometry, dir, component)?
        else {
            return Ok(None);
        };
        current = next;
    }

    Ok(Some(current))
}
