//! Loads the right-hand "B" table of a `JOIN` clause into memory and resolves
//! per-row lookups according to the join mode.

use std::io::BufRead;
use std::path::Path;

use rbql_core::JoinMode;
use rbql_helpers::IndexMap;

use crate::error::RuntimeError;

#[derive(Debug)]
pub struct JoinIndex {
    data: IndexMap<String, Vec<String>>,
    fields_max_len: usize,
    mode: JoinMode,
}

impl JoinIndex {
    /// Loads the B table from `path`, decoded byte-for-byte as Latin-1 (the
    /// reference implementation's default encoding), which never fails on
    /// arbitrary bytes. Hosts that need UTF-8 or another encoding should
    /// decode the file themselves and call [`JoinIndex::from_reader`].
    pub fn load(path: &Path, delim: char, b_field_index: usize, mode: JoinMode) -> Result<Self, RuntimeError> {
        if !path.is_file() {
            return Err(RuntimeError::TableBNotAccessible(path.display().to_string()));
        }
        let raw = std::fs::read(path)?;
        let decoded: String = raw.iter().map(|&b| b as char).collect();
        Self::from_reader(std::io::Cursor::new(decoded.into_bytes()), delim, b_field_index, mode)
    }

    pub fn from_reader(reader: impl BufRead, delim: char, b_field_index: usize, mode: JoinMode) -> Result<Self, RuntimeError> {
        let mut data: IndexMap<String, Vec<String>> = IndexMap::default();
        let mut fields_max_len = 0usize;
        for (line_number, line) in reader.lines().enumerate() {
            let line_number = line_number as u64 + 1;
            let mut line = line?;
            while line.ends_with('\n') || line.ends_with('\r') {
                line.pop();
            }
            let bfields: Vec<String> = line.split(delim).map(str::to_string).collect();
            fields_max_len = fields_max_len.max(bfields.len());
            let key = bfields
                .get(b_field_index)
                .ok_or(RuntimeError::BadFieldB { index: b_field_index, line: line_number })?
                .clone();
            if data.contains_key(&key) {
                return Err(RuntimeError::JoinColumnNotUnique);
            }
            data.insert(key, bfields);
        }
        log::debug!("Loaded join table: {} row(s), {:?} mode", data.len(), mode);
        Ok(Self { data, fields_max_len, mode })
    }

    /// Resolves `key` against the loaded table. `Ok(None)` means the row
    /// should be dropped (an unmatched `INNER JOIN` key).
    pub fn lookup(&self, key: &str) -> Result<Option<Vec<Option<String>>>, RuntimeError> {
        match self.mode {
            JoinMode::Inner => Ok(self.data.get(key).map(|row| row.iter().cloned().map(Some).collect())),
            JoinMode::Left => Ok(Some(match self.data.get(key) {
                Some(row) => row.iter().cloned().map(Some).collect(),
                None => vec![None; self.fields_max_len],
            })),
            JoinMode::StrictLeft => match self.data.get(key) {
                Some(row) => Ok(Some(row.iter().cloned().map(Some).collect())),
                None => Err(RuntimeError::StrictLeftJoinKeyNotFound(key.to_string())),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    fn write_table(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn inner_join_drops_unmatched_keys() {
        let file = write_table("k1,x\nk2,y\n");
        let index = JoinIndex::load(file.path(), ',', 0, JoinMode::Inner).unwrap();
        assert_eq!(index.lookup("k1").unwrap(), Some(vec![Some("k1".into()), Some("x".into())]));
        assert_eq!(index.lookup("missing").unwrap(), None);
    }

    #[test]
    fn left_join_fills_with_none() {
        let file = write_table("k1,x\n");
        let index = JoinIndex::load(file.path(), ',', 0, JoinMode::Left).unwrap();
        assert_eq!(index.lookup("missing").unwrap(), Some(vec![None, None]));
    }

    #[test]
    fn strict_left_join_errors_on_missing_key() {
        let file = write_table("k1,x\n");
        let index = JoinIndex::load(file.path(), ',', 0, JoinMode::StrictLeft).unwrap();
        assert!(matches!(index.lookup("missing"), Err(RuntimeError::StrictLeftJoinKeyNotFound(_))));
    }

    #[test]
    fn rejects_duplicate_join_keys() {
        let file = write_table("k1,x\nk1,y\n");
        let err = JoinIndex::load(file.path(), ',', 0, JoinMode::Inner).unwrap_err();
        assert!(matches!(err, RuntimeError::JoinColumnNotUnique));
    }

    #[test]
    fn missing_table_file_is_reported() {
        let err = JoinIndex::load(Path::new("/no/such/table.csv"), ',', 0, JoinMode::Inner).unwrap_err();
        assert!(matches!(err, RuntimeError::TableBNotAccessible(_)));
    }
}
