use std::{fmt, fs::File, io::Read, path::Path};

use csv::{ReaderBuilder, Trim};

use crate::{error::LoadError, utils::format_float};

/// Highest possible sum of the three subject marks.
pub const MAX_TOTAL_MARKS: f64 = 300.0;

/// Overall status cutoff, applied to `Percentage`.
pub const STATUS_PASS_PERCENTAGE: f64 = 36.0;

pub const TOTAL_COLUMN: &str = "Total Marks";
pub const PERCENTAGE_COLUMN: &str = "Percentage";
pub const STATUS_COLUMN: &str = "Status";

const DERIVED_COLUMNS: [&str; 3] = [TOTAL_COLUMN, PERCENTAGE_COLUMN, STATUS_COLUMN];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Subject {
    Physics,
    Chemistry,
    Maths,
}

impl Subject {
    /// Chart order.
    pub const ALL: [Subject; 3] = [Subject::Physics, Subject::Chemistry, Subject::Maths];

    pub fn index(self) -> usize {
        match self {
            Subject::Physics => 0,
            Subject::Chemistry => 1,
            Subject::Maths => 2,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Subject::Physics => "Physics",
            Subject::Chemistry => "Chemistry",
            Subject::Maths => "Maths",
        }
    }

    pub fn column(self) -> &'static str {
        match self {
            Subject::Physics => "Physics Marks",
            Subject::Chemistry => "Chemistry Marks",
            Subject::Maths => "Maths Marks",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Passed,
    Failed,
}

impl Status {
    pub fn from_percentage(percentage: f64) -> Status {
        if percentage >= STATUS_PASS_PERCENTAGE {
            Status::Passed
        } else {
            Status::Failed
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Status::Passed => "Passed",
            Status::Failed => "Failed",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One student: the original cells plus the derived columns.
#[derive(Debug, Clone, PartialEq)]
pub struct StudentRow {
    cells: Vec<String>,
    marks: [f64; 3],
    pub total: f64,
    pub percentage: f64,
    pub status: Status,
}

impl StudentRow {
    fn new(cells: Vec<String>, marks: [f64; 3]) -> StudentRow {
        let total = marks[0] + marks[1] + marks[2];
        let percentage = total / MAX_TOTAL_MARKS * 100.0;

        StudentRow {
            cells,
            marks,
            total,
            percentage,
            status: Status::from_percentage(percentage),
        }
    }

    pub fn mark(&self, subject: Subject) -> f64 {
        self.marks[subject.index()]
    }

    /// Display text of column `index`, counted the same way as `StudentTable::columns`.
    pub fn cell(&self, index: usize) -> String {
        match index.checked_sub(self.cells.len()) {
            None => self.cells[index].clone(),
            Some(0) => format_float(self.total),
            Some(1) => format_float(self.percentage),
            Some(2) => self.status.to_string(),
            Some(_) => String::new(),
        }
    }
}

/// The augmented table. Built once per upload and never mutated afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct StudentTable {
    headers: Vec<String>,
    rows: Vec<StudentRow>,
}

impl StudentTable {
    pub fn load(path: &Path) -> Result<StudentTable, LoadError> {
        let file = File::open(path)?;
        StudentTable::from_reader(file)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<StudentTable, LoadError> {
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .trim(Trim::All)
            .from_reader(reader);

        let header_record = reader.headers()?.clone();

        let mut subject_columns = [0usize; 3];
        for subject in Subject::ALL {
            subject_columns[subject.index()] = header_record
                .iter()
                .position(|h| h == subject.column())
                .ok_or(LoadError::MissingColumn(subject.column()))?;
        }

        // Columns that collide with a derived one are replaced by it.
        let kept: Vec<usize> = header_record
            .iter()
            .enumerate()
            .filter(|(_, h)| !DERIVED_COLUMNS.iter().any(|d| d == h))
            .map(|(i, _)| i)
            .collect();

        let headers = kept
            .iter()
            .map(|&i| header_record[i].to_string())
            .collect();

        let mut rows = vec![];
        for (i, record) in reader.records().enumerate() {
            let record = record?;

            let mut marks = [0.0; 3];
            for subject in Subject::ALL {
                let raw = record.get(subject_columns[subject.index()]).unwrap_or("");
                marks[subject.index()] = parse_mark(raw).ok_or_else(|| LoadError::InvalidMark {
                    row: i + 1,
                    column: subject.column(),
                    value: raw.to_string(),
                })?;
            }

            let cells = kept
                .iter()
                .map(|&c| record.get(c).unwrap_or("").to_string())
                .collect();

            rows.push(StudentRow::new(cells, marks));
        }

        Ok(StudentTable { headers, rows })
    }

    /// Original columns in file order, followed by the derived ones.
    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.headers
            .iter()
            .map(String::as_str)
            .chain(DERIVED_COLUMNS)
    }

    pub fn column_count(&self) -> usize {
        self.headers.len() + DERIVED_COLUMNS.len()
    }

    pub fn rows(&self) -> &[StudentRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

fn parse_mark(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(csv: &str) -> StudentTable {
        StudentTable::from_reader(csv.as_bytes()).unwrap()
    }

    #[test]
    fn derives_total_percentage_and_status() {
        let t = table(
            "Name,Physics Marks,Chemistry Marks,Maths Marks\n\
             Asha,40,40,40\n\
             Ben,20,20,20\n",
        );

        let totals: Vec<f64> = t.rows().iter().map(|r| r.total).collect();
        let percentages: Vec<f64> = t.rows().iter().map(|r| r.percentage).collect();
        let statuses: Vec<Status> = t.rows().iter().map(|r| r.status).collect();

        assert_eq!(totals, vec![120.0, 60.0]);
        assert_eq!(percentages, vec![40.0, 20.0]);
        assert_eq!(statuses, vec![Status::Passed, Status::Failed]);
    }

    #[test]
    fn row_invariants_hold_for_fractional_marks() {
        let t = table(
            "Physics Marks,Chemistry Marks,Maths Marks\n\
             35.5,36.25,36\n\
             0,0,0\n\
             100,100,100\n",
        );

        for row in t.rows() {
            let sum = row.mark(Subject::Physics) + row.mark(Subject::Chemistry) + row.mark(Subject::Maths);
            assert_eq!(row.total, sum);
            assert_eq!(row.percentage, row.total / 300.0 * 100.0);
            assert_eq!(row.status == Status::Passed, row.percentage >= 36.0);
        }
    }

    #[test]
    fn status_boundary_is_inclusive() {
        assert_eq!(Status::from_percentage(36.0), Status::Passed);
        assert_eq!(Status::from_percentage(35.999), Status::Failed);
    }

    #[test]
    fn columns_keep_file_order_and_append_derived() {
        let t = table("Maths Marks,Name,Physics Marks,Chemistry Marks\n50,Cy,60,70\n");

        let columns: Vec<&str> = t.columns().collect();
        assert_eq!(
            columns,
            vec![
                "Maths Marks",
                "Name",
                "Physics Marks",
                "Chemistry Marks",
                "Total Marks",
                "Percentage",
                "Status"
            ]
        );
        assert_eq!(t.column_count(), 7);

        let row = &t.rows()[0];
        let cells: Vec<String> = (0..t.column_count()).map(|i| row.cell(i)).collect();
        assert_eq!(cells, vec!["50", "Cy", "60", "70", "180.0", "60.0", "Passed"]);
    }

    #[test]
    fn existing_derived_columns_are_replaced() {
        let t = table("Physics Marks,Chemistry Marks,Maths Marks,Status\n10,10,10,Passed\n");

        let columns: Vec<&str> = t.columns().collect();
        assert_eq!(columns.iter().filter(|c| **c == "Status").count(), 1);
        assert_eq!(t.rows()[0].cell(5), "Failed");
    }

    #[test]
    fn header_only_file_is_an_empty_table() {
        let t = table("Physics Marks,Chemistry Marks,Maths Marks\n");
        assert!(t.is_empty());
        assert_eq!(t.len(), 0);
    }

    #[test]
    fn missing_subject_column_is_reported() {
        let err = StudentTable::from_reader("Physics Marks,Maths Marks\n1,2\n".as_bytes()).unwrap_err();
        assert!(matches!(err, LoadError::MissingColumn("Chemistry Marks")));
    }

    #[test]
    fn non_numeric_mark_names_the_row() {
        let err = StudentTable::from_reader(
            "Physics Marks,Chemistry Marks,Maths Marks\n1,2,3\n4,abc,6\n".as_bytes(),
        )
        .unwrap_err();

        match err {
            LoadError::InvalidMark { row, column, value } => {
                assert_eq!(row, 2);
                assert_eq!(column, "Chemistry Marks");
                assert_eq!(value, "abc");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn ragged_rows_are_a_csv_error() {
        let err = StudentTable::from_reader(
            "Physics Marks,Chemistry Marks,Maths Marks\n1,2\n".as_bytes(),
        )
        .unwrap_err();
        assert!(matches!(err, LoadError::Csv(_)));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = StudentTable::load(Path::new("/definitely/not/here.csv")).unwrap_err();
        assert!(matches!(err, LoadError::Io(_)));
    }
}
