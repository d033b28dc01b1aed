//! Bootstrap import
//!
//! Loads the shared dataset and keeps the rows a partition owns: students by
//! year, courses by credits, enrollments by status. Faculty of the supported
//! department is copied to every site.

use crate::common::model::{Course, Enrollment, Faculty, Student};
use crate::common::partition::{Partition, SUPPORTED_DEPARTMENT};
use crate::site::store::FragmentStore;
use crate::{Error, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// The full, unpartitioned dataset
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Dataset {
    pub students: Vec<Student>,
    pub faculty: Vec<Faculty>,
    pub courses: Vec<Course>,
    pub enrollments: Vec<Enrollment>,
}

impl Dataset {
    /// Read `students.json`, `faculty.json`, `courses.json` and `enrollments.json`.
    pub fn load_dir(dir: &Path) -> Result<Self> {
        Ok(Self {
            students: read_json(&dir.join("students.json"))?,
            faculty: read_json(&dir.join("faculty.json"))?,
            courses: read_json(&dir.join("courses.json"))?,
            enrollments: read_json(&dir.join("enrollments.json"))?,
        })
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    let raw = std::fs::read(path).map_err(|e| {
        Error::InvalidConfig(format!("cannot read {}: {}", path.display(), e))
    })?;
    serde_json::from_slice(&raw).map_err(|e| {
        Error::InvalidConfig(format!("cannot parse {}: {}", path.display(), e))
    })
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ImportReport {
    pub students: usize,
    pub faculty: usize,
    pub courses: usize,
    pub enrollments: usize,
}

/// Build the fragment store for `partition` from the full dataset.
pub fn import(dataset: &Dataset, partition: Partition) -> (FragmentStore, ImportReport) {
    let mut store = FragmentStore::new(partition);
    let mut report = ImportReport::default();

    let student_dept: HashMap<i64, &str> = dataset
        .students
        .iter()
        .map(|s| (s.s_id, s.department.as_str()))
        .collect();
    let faculty_dept: HashMap<i64, &str> = dataset
        .faculty
        .iter()
        .map(|f| (f.f_id, f.department.as_str()))
        .collect();

    for student in &dataset.students {
        if student.department == SUPPORTED_DEPARTMENT
            && partition.owns_student(student)
            && store.insert_student(student.clone())
        {
            report.students += 1;
        }
    }

    for faculty in &dataset.faculty {
        if faculty.department == SUPPORTED_DEPARTMENT && store.insert_faculty(faculty.clone()) {
            report.faculty += 1;
        }
    }

    for course in &dataset.courses {
        let taught_here = faculty_dept.get(&course.f_id) == Some(&SUPPORTED_DEPARTMENT);
        if taught_here && partition.owns_course(course) && store.insert_course(course.clone()) {
            report.courses += 1;
        }
    }

    let status = partition.enrollment_status();
    let mut next_id = 1;
    for enrollment in &dataset.enrollments {
        let in_department = student_dept.get(&enrollment.s_id) == Some(&SUPPORTED_DEPARTMENT);
        if !in_department || enrollment.status != status {
            continue;
        }
        let row = Enrollment {
            e_id: next_id,
            ..enrollment.clone()
        };
        next_id += 1;
        if store.insert_enrollment(row) {
            report.enrollments += 1;
        }
    }

    tracing::info!(
        %partition,
        students = report.students,
        faculty = report.faculty,
        courses = report.courses,
        enrollments = report.enrollments,
        "Imported fragment"
    );

    (store, report)
}
