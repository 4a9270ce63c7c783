//! Page index newtype for safe conversion between usize and i32.
//!
//! mupdf takes i32 page indices while lopdf numbers pages from 1; this
//! wrapper centralizes both conversions.

use std::fmt;

use crate::error::Error;

/// A validated page index, 0-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PageIndex(i32);

impl PageIndex {
    /// Get the underlying i32 value for mupdf.
    #[must_use]
    pub const fn as_i32(self) -> i32 {
        self.0
    }

    /// Get the 1-indexed page number for lopdf's page APIs.
    #[must_use]
    pub const fn as_lopdf_page_number(self) -> u32 {
        // PageIndex is always non-negative and adding 1 won't overflow for
        // any realistic page count.
        (self.0 + 1).cast_unsigned()
    }

    /// Validate a 0-based page number against the document's page count.
    pub fn try_from_page_num(page_num: usize, total_pages: usize) -> Result<Self, Error> {
        if page_num >= total_pages {
            return Err(Error::PdfInvalidPage {
                page: page_num,
                total: total_pages,
            });
        }

        let index = i32::try_from(page_num).map_err(|_| Error::PdfInvalidPage {
            page: page_num,
            total: total_pages,
        })?;

        Ok(Self(index))
    }
}

impl From<PageIndex> for i32 {
    fn from(index: PageIndex) -> Self {
        index.0
    }
}

impl fmt::Display for PageIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_try_from_page_num_valid() {
        let idx = PageIndex::try_from_page_num(5, 10).unwrap();
        assert_eq!(idx.as_i32(), 5);
        assert_eq!(idx.as_lopdf_page_number(), 6);
    }

    #[test]
    fn test_try_from_page_num_out_of_range() {
        let result = PageIndex::try_from_page_num(10, 5);
        assert!(result.is_err());
    }

    #[test]
    fn test_display() {
        let idx = PageIndex::try_from_page_num(7, 8).unwrap();
        assert_eq!(format!("{idx}"), "7");
    }
}
