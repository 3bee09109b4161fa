//! Error kinds shared by the FAT16 data-storage and filesystem crates.

#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// Any block-device or stream failure, including a malformed FAT
    /// entry encountered during cluster-chain traversal.
    #[error("IO: {0}")]
    Io(IoError),
    /// Allocation failure in any component.
    #[error("out of memory")]
    NoMemory,
    /// A request that does not make sense for the target, e.g. loading
    /// a directory from an entry that is not a subdirectory.
    #[error("invalid argument")]
    InvalidArg,
    /// A write, or a read-write open, against a read-only filesystem.
    #[error("read-only filesystem")]
    ReadOnlyFs,
    /// The volume does not carry this driver's signature.
    #[error("not our filesystem")]
    NotOurFs,
}

#[derive(thiserror::Error, Debug)]
pub enum IoError {
    #[error("seek past end of device")]
    SeekOutOfRange,
    #[error("read past end of device")]
    ReadOutOfRange,
    #[error("transport error")]
    Transport,
}

pub type Result<T> = core::result::Result<T, Error>;
