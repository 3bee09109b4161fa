//! End-to-end scenarios (§8): build a synthetic FAT16 image in memory,
//! mount it through `Fat16Driver`, and exercise `probe`/`open`.

use fat16_ds_mem::MemoryBlockDevice;
use fat16_err::{Error, IoError};
use fat16_fs::{Disk, FileSystemDriver, Mode, PathPart};

use fat16::entry::ATTR_SUBDIRECTORY;
use fat16::Fat16Driver;

const BYTES_PER_SECTOR: u16 = 512;
const SECTORS_PER_CLUSTER: u8 = 4;
const RESERVED_SECTORS: u16 = 1;
const FAT_COPIES: u8 = 2;
const SECTORS_PER_FAT: u16 = 32;
const ROOT_DIR_ENTRIES: u16 = 512;

const FIRST_ROOT_DIR_SECTOR: u32 = 65; // 1 + 2*32
const FIRST_DATA_SECTOR: u32 = 97; // 65 + ceil(512*32/512)

fn write_boot_sector(image: &mut [u8], extended_signature: u8) {
    image[0..3].copy_from_slice(&[0xEB, 0x3C, 0x90]);
    image[3..11].copy_from_slice(b"MSDOS5.0");
    image[11..13].copy_from_slice(&BYTES_PER_SECTOR.to_le_bytes());
    image[13] = SECTORS_PER_CLUSTER;
    image[14..16].copy_from_slice(&RESERVED_SECTORS.to_le_bytes());
    image[16] = FAT_COPIES;
    image[17..19].copy_from_slice(&ROOT_DIR_ENTRIES.to_le_bytes());
    image[19..21].copy_from_slice(&0u16.to_le_bytes());
    image[21] = 0xF8;
    image[22..24].copy_from_slice(&SECTORS_PER_FAT.to_le_bytes());
    image[24..26].copy_from_slice(&0u16.to_le_bytes());
    image[26..28].copy_from_slice(&0u16.to_le_bytes());
    image[28..32].copy_from_slice(&0u32.to_le_bytes());
    image[32..36].copy_from_slice(&0u32.to_le_bytes());
    image[36] = 0x80;
    image[37] = 0;
    image[38] = extended_signature;
}

fn write_dir_entry(
    image: &mut [u8],
    base: usize,
    name: &[u8; 8],
    ext: &[u8; 3],
    attr: u8,
    first_cluster: u16,
    file_size: u32,
) {
    image[base..base + 8].copy_from_slice(name);
    image[base + 8..base + 11].copy_from_slice(ext);
    image[base + 11] = attr;
    image[base + 26..base + 28].copy_from_slice(&first_cluster.to_le_bytes());
    image[base + 28..base + 32].copy_from_slice(&file_size.to_le_bytes());
}

fn set_fat_entry(image: &mut [u8], cluster: u32, value: u16) {
    let offset = RESERVED_SECTORS as usize * BYTES_PER_SECTOR as usize + cluster as usize * 2;
    image[offset..offset + 2].copy_from_slice(&value.to_le_bytes());
}

fn root_dir_base() -> usize {
    FIRST_ROOT_DIR_SECTOR as usize * BYTES_PER_SECTOR as usize
}

fn cluster_base(cluster: u32) -> usize {
    (FIRST_DATA_SECTOR + (cluster - 2) * SECTORS_PER_CLUSTER as u32) as usize
        * BYTES_PER_SECTOR as usize
}

fn blank_image(sectors: usize) -> Vec<u8> {
    vec![0u8; sectors * BYTES_PER_SECTOR as usize]
}

#[test]
fn s1_probes_a_valid_image() {
    let mut image = blank_image(105);
    write_boot_sector(&mut image, 0x29);

    let device = MemoryBlockDevice::new(BYTES_PER_SECTOR as u32, image);
    let mut disk = Disk::new(device);

    Fat16Driver.probe(&mut disk).unwrap();

    let private = disk.fs_private.as_ref().unwrap();
    assert_eq!(private.geometry.first_root_dir_sector, FIRST_ROOT_DIR_SECTOR);
    assert_eq!(
        private.geometry.first_root_dir_sector + private.geometry.root_dir_sector_span,
        FIRST_DATA_SECTOR
    );
}

#[test]
fn s2_rejects_non_fat_image() {
    let mut image = blank_image(105);
    write_boot_sector(&mut image, 0x00);

    let device = MemoryBlockDevice::new(BYTES_PER_SECTOR as u32, image);
    let mut disk = Disk::new(device);

    let result = Fat16Driver.probe(&mut disk);
    assert!(matches!(result, Err(Error::NotOurFs)));
    assert!(disk.fs_private.is_none());
}

fn image_with_hello_txt() -> Vec<u8> {
    let mut image = blank_image(105);
    write_boot_sector(&mut image, 0x29);
    write_dir_entry(
        &mut image,
        root_dir_base(),
        b"HELLO   ",
        b"TXT",
        0x20,
        2,
        2048,
    );
    set_fat_entry(&mut image, 2, 0xFFFF);
    image
}

#[test]
fn s3_opens_a_file_read_only() {
    let device = MemoryBlockDevice::new(BYTES_PER_SECTOR as u32, image_with_hello_txt());
    let mut disk = Disk::new(device);
    Fat16Driver.probe(&mut disk).unwrap();

    let path = PathPart::parse("HELLO.TXT").unwrap();
    let descriptor = Fat16Driver.open(&mut disk, &path, Mode::Read).unwrap();

    assert_eq!(descriptor.position, 0);
    let entry = descriptor.item.as_file().unwrap();
    assert_eq!(entry.file_size(), 2048);
}

#[test]
fn s4_rejects_write_open() {
    let device = MemoryBlockDevice::new(BYTES_PER_SECTOR as u32, image_with_hello_txt());
    let mut disk = Disk::new(device);
    Fat16Driver.probe(&mut disk).unwrap();

    let path = PathPart::parse("HELLO.TXT").unwrap();
    let result = Fat16Driver.open(&mut disk, &path, Mode::Write);
    assert!(matches!(result, Err(Error::ReadOnlyFs)));
}

#[test]
fn s5_missing_path_is_an_io_error() {
    let device = MemoryBlockDevice::new(BYTES_PER_SECTOR as u32, image_with_hello_txt());
    let mut disk = Disk::new(device);
    Fat16Driver.probe(&mut disk).unwrap();

    let path = PathPart::parse("NOPE.TXT").unwrap();
    let result = Fat16Driver.open(&mut disk, &path, Mode::Read);
    assert!(matches!(result, Err(Error::Io(IoError::ReadOutOfRange))));
}

#[test]
fn s6_resolves_a_nested_path_and_drops_the_intermediate_directory() {
    let mut image = blank_image(120);
    write_boot_sector(&mut image, 0x29);
    write_dir_entry(
        &mut image,
        root_dir_base(),
        b"DIR     ",
        b"   ",
        ATTR_SUBDIRECTORY,
        2,
        0,
    );
    set_fat_entry(&mut image, 2, 0xFFFF);

    write_dir_entry(
        &mut image,
        cluster_base(2),
        b"FILE    ",
        b"BIN",
        0x20,
        3,
        10,
    );
    set_fat_entry(&mut image, 3, 0xFFFF);

    let device = MemoryBlockDevice::new(BYTES_PER_SECTOR as u32, image);
    let mut disk = Disk::new(device);
    Fat16Driver.probe(&mut disk).unwrap();

    let path = PathPart::parse("DIR/FILE.BIN").unwrap();
    let descriptor = Fat16Driver.open(&mut disk, &path, Mode::Read).unwrap();

    let entry = descriptor.item.as_file().unwrap();
    assert_eq!(entry.file_size(), 10);
}
