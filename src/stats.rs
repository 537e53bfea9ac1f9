use crate::table::{Status, StudentTable, Subject};

/// Per-subject cutoff, applied to raw marks. Shares its value with
/// `STATUS_PASS_PERCENTAGE` but not its meaning.
pub const SUBJECT_PASS_MARK: f64 = 36.0;

/// Aggregates behind the charts. Recomputed on every entry to the graph screen.
#[derive(Debug, Clone, PartialEq)]
pub struct MarkStats {
    pub total_students: usize,
    pub num_passed: usize,
    passed_by_subject: [usize; 3],
    average_by_subject: Option<[f64; 3]>,
}

impl MarkStats {
    pub fn compute(table: &StudentTable) -> MarkStats {
        let mut num_passed = 0;
        let mut passed_by_subject = [0usize; 3];
        let mut sums = [0.0f64; 3];

        for row in table.rows() {
            if row.status == Status::Passed {
                num_passed += 1;
            }

            for subject in Subject::ALL {
                let mark = row.mark(subject);
                if mark >= SUBJECT_PASS_MARK {
                    passed_by_subject[subject.index()] += 1;
                }
                sums[subject.index()] += mark;
            }
        }

        let total_students = table.len();

        // The mean of no rows is left undefined rather than NaN.
        let average_by_subject = if total_students == 0 {
            None
        } else {
            let n = total_students as f64;
            Some([sums[0] / n, sums[1] / n, sums[2] / n])
        };

        MarkStats {
            total_students,
            num_passed,
            passed_by_subject,
            average_by_subject,
        }
    }

    pub fn num_failed(&self) -> usize {
        self.total_students - self.num_passed
    }

    pub fn passed_in(&self, subject: Subject) -> usize {
        self.passed_by_subject[subject.index()]
    }

    pub fn average_in(&self, subject: Subject) -> Option<f64> {
        self.average_by_subject.map(|averages| averages[subject.index()])
    }
}
