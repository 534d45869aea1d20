//! Error types and numeric return codes.

use cutcell_octree::OctreeError;
use cutcell_polygon::PolygonError;
use thiserror::Error;

/// Errors that can occur while computing or exchanging cut information.
#[derive(Error, Debug)]
pub enum CutError {
    /// Group selection is unusable: unknown or duplicate path, or a
    /// boundary id the output encoding cannot hold.
    #[error("invalid polygon group list: {0}")]
    InvalidGroupList(String),

    /// The polygon index has not been loaded.
    #[error("polygon index is not initialized")]
    PolygonIndexNotInitialized,

    /// The octree has no root cells.
    #[error("octree is not initialized")]
    TreeNotInitialized,

    /// The requested index range is not contained in an array or grid.
    #[error("{array}: requested range exceeds addressable range: {detail}")]
    SizeExceeded {
        /// Which array or grid failed the check.
        array: &'static str,
        /// Requested and available ranges.
        detail: String,
    },

    /// A single `(i, j, k)` access outside the array extent.
    #[error("index {index:?} outside {start:?}..={end:?}")]
    IndexOutOfRange {
        /// Requested index.
        index: [i32; 3],
        /// First valid index.
        start: [i32; 3],
        /// Last valid index.
        end: [i32; 3],
    },

    /// Bad argument to a constructor or accessor.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Invalid settings.
    #[error("invalid settings: {0}")]
    InvalidSettings(String),

    /// Malformed interchange file.
    #[error("parse error at line {line}: {message}")]
    Parse {
        /// 1-based line number.
        line: usize,
        /// What went wrong.
        message: String,
    },

    /// I/O failure while reading or writing interchange files.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Polygon index failure.
    #[error(transparent)]
    Polygon(#[from] PolygonError),

    /// Octree failure.
    #[error(transparent)]
    Octree(#[from] OctreeError),
}

/// Result type for cut operations.
pub type Result<T> = std::result::Result<T, CutError>;

/// Numeric status reported by the top-level calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum ReturnCode {
    /// Completed normally.
    Success = 0,
    /// Bad group list or boundary id mapping.
    BadGroupList = 1,
    /// Polygon index not initialized.
    BadPolygonIndex = 2,
    /// Octree not initialized.
    BadTree = 3,
    /// Requested range exceeds an array.
    SizeExceed = 4,
    /// Anything else.
    OtherError = 10,
}

impl ReturnCode {
    /// Code for a driver result.
    pub fn from_result<T>(result: &Result<T>) -> Self {
        match result {
            Ok(_) => ReturnCode::Success,
            Err(e) => e.code(),
        }
    }

    /// Integer value of the code.
    pub fn as_i32(self) -> i32 {
        self as i32
    }
}

impl CutError {
    /// Return code classifying this error.
    pub fn code(&self) -> ReturnCode {
        match self {
            CutError::InvalidGroupList(_) => ReturnCode::BadGroupList,
            CutError::Polygon(PolygonError::UnknownGroup(_)) => ReturnCode::BadGroupList,
            CutError::PolygonIndexNotInitialized => ReturnCode::BadPolygonIndex,
            CutError::Polygon(PolygonError::NotLoaded) => ReturnCode::BadPolygonIndex,
            CutError::TreeNotInitialized => ReturnCode::BadTree,
            CutError::SizeExceeded { .. } => ReturnCode::SizeExceed,
            _ => ReturnCode::OtherError,
        }
    }
}
