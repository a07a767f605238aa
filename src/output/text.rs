//! Plain-text report: one path per line, groups separated by a blank line.
//!
//! ```text
//! /data/a.bin
//! /data/copy/a.bin
//!
//! /data/x.txt
//! /data/y.txt
//! /data/z.txt
//! ```
//!
//! Groups are written as the traversal yields them, so nothing is buffered
//! beyond the writer itself.

use std::io::{self, Write};

use crate::duplicates::DuplicateGroup;

/// Streaming plain-text writer.
#[derive(Debug)]
pub struct TextOutput<W: Write> {
    writer: W,
    groups_written: usize,
}

impl<W: Write> TextOutput<W> {
    /// Wrap a writer (e.g., a locked, buffered stdout).
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            groups_written: 0,
        }
    }

    /// Write one group.
    ///
    /// # Errors
    ///
    /// Returns any error from the underlying writer.
    pub fn write_group(&mut self, group: &DuplicateGroup<'_>) -> io::Result<()> {
        if self.groups_written > 0 {
            writeln!(self.writer)?;
        }
        for path in group.paths {
            writeln!(self.writer, "{}", path.display())?;
        }
        self.groups_written += 1;
        Ok(())
    }

    /// Write every group of a traversal, then flush.
    ///
    /// # Errors
    ///
    /// Returns any error from the underlying writer.
    pub fn write_all<'a, I>(&mut self, groups: I) -> io::Result<()>
    where
        I: IntoIterator<Item = DuplicateGroup<'a>>,
    {
        for group in groups {
            self.write_group(&group)?;
        }
        self.writer.flush()
    }

    /// Number of groups written so far.
    #[must_use]
    pub fn groups_written(&self) -> usize {
        self.groups_written
    }

    /// Recover the writer.
    pub fn into_inner(self) -> W {
        self.writer
    }
}
