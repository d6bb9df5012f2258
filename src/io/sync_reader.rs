//! Synchronous CSV reader with iterator interface
//!
//! Provides a streaming iterator over account or transfer rows from a CSV
//! file. Delegates CSV format concerns to the csv_format module.
//!
//! ```no_run
//! use ledger_transfer_engine::io::{SyncReader, TransferRow};
//! use std::path::Path;
//!
//! let reader = SyncReader::<TransferRow>::new(Path::new("transfers.csv")).unwrap();
//! for result in reader {
//!     match result {
//!         Ok(row) => println!("{} -> {}: {}", row.from, row.to, row.amount),
//!         Err(e) => eprintln!("Error: {}", e),
//!     }
//! }
//! ```
//!
//! # Error Handling
//!
//! - Fatal errors (file not found) are returned from `new()`
//! - Individual row errors are yielded as Err variants, prefixed with their line
//!   number, and iteration continues with the next row

use crate::io::csv_format::CsvRow;
use csv::{ReaderBuilder, Trim};
use std::fs::File;
use std::marker::PhantomData;
use std::path::Path;

/// Synchronous CSV reader yielding rows of type `T`
#[derive(Debug)]
pub struct SyncReader<T> {
    reader: csv::Reader<File>,
    line_num: usize,
    _row: PhantomData<T>,
}

impl<T: CsvRow> SyncReader<T> {
    /// Create a new SyncReader from a file path
    ///
    /// The CSV reader trims whitespace from all fields and expects a header row.
    ///
    /// # Returns
    ///
    /// * `Ok(SyncReader)` if file opened successfully
    /// * `Err(String)` if file could not be opened
    pub fn new(path: &Path) -> Result<Self, String> {
        let file = File::open(path)
            .map_err(|e| format!("Failed to open file '{}': {}", path.display(), e))?;

        let reader = ReaderBuilder::new()
            .trim(Trim::All)
            .buffer_capacity(8 * 1024)
            .from_reader(file);

        Ok(Self {
            reader,
            line_num: 0,
            _row: PhantomData,
        })
    }
}

impl<T: CsvRow> Iterator for SyncReader<T> {
    type Item = Result<T, String>;

    fn next(&mut self) -> Option<Self::Item> {
        let mut deserializer = self.reader.deserialize::<T::Raw>();
        let result = deserializer.next()?;

        // Line 1 is the header
        self.line_num += 1;
        let line = self.line_num + 1;

        Some(match result {
            Ok(raw) => T::from_raw(raw).map_err(|e| format!("Line {}: {}", line, e)),
            Err(e) => Err(format!("Line {}: CSV parse error: {}", line, e)),
        })
    }
}
