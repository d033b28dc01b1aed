//! Records owned by the fragment sites
//!
//! Field names match the shared dataset and the site wire format.

use serde::{Deserialize, Serialize};

pub type StudentId = i64;
pub type FacultyId = i64;
pub type CourseId = i64;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Student {
    pub s_id: StudentId,
    pub name: String,
    pub department: String,
    pub year: i64,
}

/// Replicated on every site
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Faculty {
    pub f_id: FacultyId,
    pub name: String,
    pub department: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Course {
    pub c_id: CourseId,
    pub f_id: FacultyId,
    pub name: String,
    pub credits: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EnrollmentStatus {
    #[serde(rename = "DONE")]
    Done,
    #[serde(rename = "NOT DONE")]
    NotDone,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Enrollment {
    /// Assigned by the importing site; absent in the shared dataset
    #[serde(default)]
    pub e_id: i64,
    pub s_id: StudentId,
    pub c_id: CourseId,
    pub date: String,
    pub status: EnrollmentStatus,
}

/// Answer to `/course_enrollments`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnrollmentCount {
    pub enrollment_count: u64,
}

/// Row of `/course_enrollment_details`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnrollmentDetail {
    pub student_id: StudentId,
    pub student_name: String,
    pub date: String,
    pub course_name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enrollment_status_wire_names() {
        let e: Enrollment = serde_json::from_str(
            r#"{"s_id": 4, "c_id": 10, "date": "2024-01-15", "status": "NOT DONE"}"#,
        )
        .unwrap();
        assert_eq!(e.status, EnrollmentStatus::NotDone);
        assert_eq!(e.e_id, 0);
        assert_eq!(
            serde_json::to_value(EnrollmentStatus::Done).unwrap(),
            serde_json::json!("DONE")
        );
    }
}
