//! Sequential access to the rows of a CSV file with a header line.

use super::ImportError;
use csv::{ReaderBuilder, StringRecord, StringRecordsIntoIter, Trim};
use serde::de::DeserializeOwned;
use std::io::Read;

/// Yields the rows of a CSV file one at a time, deserialized by column name.
/// Columns not named by the row type are ignored.
pub struct RowSource<R: Read> {
    records: StringRecordsIntoIter<R>,
    headers: StringRecord,
}

impl<R: Read> RowSource<R> {
    /// Comma separated, whitespace around fields trimmed.
    pub fn new(reader: R) -> Result<Self, ImportError> {
        Self::with_builder(ReaderBuilder::new().trim(Trim::All), reader)
    }

    /// Like `new` but lines starting with `comment` are skipped.
    pub fn with_comments(reader: R, comment: u8) -> Result<Self, ImportError> {
        Self::with_builder(ReaderBuilder::new().trim(Trim::All).comment(Some(comment)), reader)
    }

    fn with_builder(builder: &mut ReaderBuilder, reader: R) -> Result<Self, ImportError> {
        let mut reader = builder.from_reader(reader);
        let headers = reader.headers()?.clone();
        Ok(RowSource {
            records: reader.into_records(),
            headers,
        })
    }

    /// The next row together with its line number, `None` at the end of the input.
    pub fn next_row<T: DeserializeOwned>(&mut self) -> Result<Option<(T, u64)>, ImportError> {
        match self.records.next() {
            None => Ok(None),
            Some(record) => {
                let record = record?;
                let line = record.position().map_or(0, |pos| pos.line());
                let row = record.deserialize(Some(&self.headers))?;
                Ok(Some((row, line)))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Row {
        b: i32,
        a: String,
    }

    #[test]
    fn rows_by_column_name() {
        let mut rows = RowSource::new("a, b ,c\nx, 1,ignored\ny,2,ignored\n".as_bytes()).unwrap();
        assert_eq!(rows.next_row::<Row>().unwrap(), Some((Row { b: 1, a: "x".to_string() }, 2)));
        assert_eq!(rows.next_row::<Row>().unwrap(), Some((Row { b: 2, a: "y".to_string() }, 3)));
        assert_eq!(rows.next_row::<Row>().unwrap(), None);
    }

    #[test]
    fn comment_lines_are_skipped() {
        let mut rows = RowSource::with_comments("a,b\n# nothing here\nx,1\n".as_bytes(), b'#').unwrap();
        assert_eq!(rows.next_row::<Row>().unwrap().map(|(row, _)| row), Some(Row { b: 1, a: "x".to_string() }));
        assert_eq!(rows.next_row::<Row>().unwrap(), None);
    }

    #[test]
    fn missing_column_is_an_error() {
        let mut rows = RowSource::new("a,c\nx,1\n".as_bytes()).unwrap();
        assert!(matches!(rows.next_row::<Row>(), Err(ImportError::Csv(_))));
    }
}
