use crate::student::Student;

/// The query shapes the record store has to support beyond key lookups.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StudentFilter {
    /// Exact match on `course`.
    Course(String),
    /// Exact match on `year_level`.
    YearLevel(i32),
    /// Exact match on `section`.
    Section(String),
    /// Case-insensitive substring match on first name, last name or email.
    Text(String),
}

impl StudentFilter {
    /// Evaluates the filter against a single record.
    ///
    /// Stores that push the predicate down to an engine must produce the same
    /// result set as this function.
    pub fn matches(&self, student: &Student) -> bool {
        match self {
            StudentFilter::Course(course) => student.course == *course,
            StudentFilter::YearLevel(level) => student.year_level == *level,
            StudentFilter::Section(section) => student.section == *section,
            StudentFilter::Text(query) => {
                let needle = query.to_lowercase();
                [&student.first_name, &student.last_name, &student.email]
                    .iter()
                    .any(|field| field.to_lowercase().contains(&needle))
            }
        }
    }
}
