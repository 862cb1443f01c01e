//! Repository implementations, one per table (plus [`Reports`] for cross-table views).

pub mod classes;
pub mod grades;
pub mod lessons;
pub mod reports;
pub mod repository;
pub mod students;
pub mod teachers;

pub use classes::Classes;
pub use grades::Grades;
pub use lessons::Lessons;
pub use reports::Reports;
pub use repository::Repository;
pub use students::Students;
pub use teachers::Teachers;
