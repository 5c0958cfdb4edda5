//! Contact Sheet
//!
//! Loads a CSV contact list and tracks which rows are included in the next
//! send. Every row starts included; the user toggles rows off (or back on)
//! before the phone numbers of the included rows are extracted.

use crate::error::{WaError, WaResult};
use std::collections::HashSet;
use std::io::Read;
use std::path::Path;
use std::str::FromStr;
use tracing::{debug, info, warn};

/// A loaded contact list with per-row inclusion flags
#[derive(Debug, Clone)]
pub struct ContactSheet {
    columns: Vec<String>,
    rows: Vec<Vec<String>>,
    included: Vec<bool>,
}

impl ContactSheet {
    /// Parse CSV with a header row
    pub fn from_reader<R: Read>(reader: R) -> WaResult<Self> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(csv::Trim::Headers)
            .from_reader(reader);

        let columns: Vec<String> = csv_reader.headers()?.iter().map(str::to_string).collect();
        if columns.is_empty() || columns.iter().all(|c| c.is_empty()) {
            return Err(WaError::Validation(
                "CSV file has no header row".to_string(),
            ));
        }

        let mut seen = HashSet::new();
        for column in &columns {
            if !seen.insert(column.as_str()) {
                return Err(WaError::Validation(format!(
                    "CSV file has duplicate column '{}'",
                    column
                )));
            }
        }

        let mut rows = Vec::new();
        for record in csv_reader.records() {
            let record = record?;
            let mut row: Vec<String> = record.iter().map(str::to_string).collect();
            row.resize(columns.len(), String::new());
            rows.push(row);
        }

        let included = vec![true; rows.len()];
        info!(
            "📋 Loaded {} contacts with {} columns",
            rows.len(),
            columns.len()
        );

        Ok(Self {
            columns,
            rows,
            included,
        })
    }

    pub fn from_path(path: &Path) -> WaResult<Self> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    /// Column names available as phone number source
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Cell value, if the row and column exist
    pub fn value(&self, row: usize, column: &str) -> Option<&str> {
        let idx = self.column_index(column)?;
        self.rows.get(row).map(|r| r[idx].as_str())
    }

    pub fn is_included(&self, row: usize) -> bool {
        self.included.get(row).copied().unwrap_or(false)
    }

    pub fn set_included(&mut self, row: usize, included: bool) -> WaResult<()> {
        let len = self.rows.len();
        let flag = self
            .included
            .get_mut(row)
            .ok_or_else(|| WaError::Validation(format!("Row {} out of range (1-{})", row + 1, len)))?;
        *flag = included;
        Ok(())
    }

    pub fn toggle(&mut self, row: usize) -> WaResult<bool> {
        let next = !self.is_included(row);
        self.set_included(row, next)?;
        Ok(next)
    }

    pub fn set_all(&mut self, included: bool) {
        self.included.iter_mut().for_each(|f| *f = included);
    }

    /// Apply a row selection; a row list includes exactly those rows
    pub fn apply_selection(&mut self, selection: &Selection) -> WaResult<()> {
        match selection {
            Selection::All => self.set_all(true),
            Selection::None => self.set_all(false),
            Selection::Rows(ranges) => {
                self.check_ranges(ranges)?;
                self.set_all(false);
                for &(start, end) in ranges {
                    self.included[start..=end].iter_mut().for_each(|f| *f = true);
                }
            }
        }
        Ok(())
    }

    /// Exclude the given rows, leaving the others untouched
    pub fn exclude(&mut self, selection: &Selection) -> WaResult<()> {
        match selection {
            Selection::All => self.set_all(false),
            Selection::None => {}
            Selection::Rows(ranges) => {
                self.check_ranges(ranges)?;
                for &(start, end) in ranges {
                    self.included[start..=end].iter_mut().for_each(|f| *f = false);
                }
            }
        }
        Ok(())
    }

    fn check_ranges(&self, ranges: &[(usize, usize)]) -> WaResult<()> {
        if let Some(&(_, bad)) = ranges.iter().find(|&&(_, end)| end >= self.rows.len()) {
            return Err(WaError::Validation(format!(
                "Row {} out of range (1-{})",
                bad.saturating_add(1),
                self.rows.len()
            )));
        }
        Ok(())
    }

    pub fn selected_count(&self) -> usize {
        self.included.iter().filter(|&&f| f).count()
    }

    /// Phone numbers of the included rows, in row order
    pub fn selected_phone_numbers(&self, column: &str) -> WaResult<Vec<String>> {
        let idx = self.column_index(column).ok_or_else(|| {
            WaError::Validation(format!("Column '{}' not found in contact list", column))
        })?;

        let mut numbers = Vec::with_capacity(self.selected_count());
        for (row, cells) in self.rows.iter().enumerate() {
            if !self.included[row] {
                continue;
            }
            let phone = cells[idx].trim();
            if phone.is_empty() {
                warn!("⚠️ Row {} has no value in '{}', skipping", row + 1, column);
                continue;
            }
            numbers.push(phone.to_string());
        }

        debug!("Selected {} recipients from '{}'", numbers.len(), column);
        Ok(numbers)
    }

    fn column_index(&self, column: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == column)
    }
}

/// Row selection parsed from user input: `all`, `none` or `1,3-5` (1-based)
#[derive(Debug, Clone, PartialEq)]
pub enum Selection {
    All,
    None,
    /// 0-based inclusive row ranges, checked against the sheet when applied
    Rows(Vec<(usize, usize)>),
}

impl FromStr for Selection {
    type Err = WaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        match s.to_lowercase().as_str() {
            "all" | "*" => return Ok(Selection::All),
            "none" | "" => return Ok(Selection::None),
            _ => {}
        }

        let bad = |part: &str| WaError::Validation(format!("Invalid row selection '{}'", part));
        let parse_row = |part: &str| -> WaResult<usize> {
            match part.trim().parse::<usize>() {
                Ok(n) if n > 0 => Ok(n - 1),
                _ => Err(bad(part)),
            }
        };

        let mut ranges = Vec::new();
        for part in s.split(',').map(str::trim).filter(|p| !p.is_empty()) {
            if let Some((start, end)) = part.split_once('-') {
                let (start, end) = (parse_row(start)?, parse_row(end)?);
                if start > end {
                    return Err(bad(part));
                }
                ranges.push((start, end));
            } else {
                let row = parse_row(part)?;
                ranges.push((row, row));
            }
        }
        ranges.sort_unstable();
        ranges.dedup();
        Ok(Selection::Rows(ranges))
    }
}
