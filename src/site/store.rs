//! In-memory fragment store
//!
//! Holds one site's slice of the dataset and answers the four site queries
//! over local rows only, the way inner joins over the local tables would.

use crate::common::model::{
    Course, CourseId, Enrollment, EnrollmentCount, EnrollmentDetail, Faculty, FacultyId, Student,
    StudentId,
};
use crate::common::partition::{Partition, SUPPORTED_DEPARTMENT};
use std::collections::{BTreeMap, BTreeSet, HashSet};

#[derive(Debug, Clone)]
pub struct FragmentStore {
    partition: Partition,
    students: BTreeMap<StudentId, Student>,
    faculty: BTreeMap<FacultyId, Faculty>,
    courses: BTreeMap<CourseId, Course>,
    enrollments: Vec<Enrollment>,
    enrolled_pairs: HashSet<(StudentId, CourseId)>,
}

impl FragmentStore {
    pub fn new(partition: Partition) -> Self {
        Self {
            partition,
            students: BTreeMap::new(),
            faculty: BTreeMap::new(),
            courses: BTreeMap::new(),
            enrollments: Vec::new(),
            enrolled_pairs: HashSet::new(),
        }
    }

    pub fn partition(&self) -> Partition {
        self.partition
    }

    // Inserts ignore duplicates and return whether the row was stored.

    pub fn insert_student(&mut self, student: Student) -> bool {
        if self.students.contains_key(&student.s_id) {
            return false;
        }
        self.students.insert(student.s_id, student);
        true
    }

    pub fn insert_faculty(&mut self, faculty: Faculty) -> bool {
        if self.faculty.contains_key(&faculty.f_id) {
            return false;
        }
        self.faculty.insert(faculty.f_id, faculty);
        true
    }

    pub fn insert_course(&mut self, course: Course) -> bool {
        if self.courses.contains_key(&course.c_id) {
            return false;
        }
        self.courses.insert(course.c_id, course);
        true
    }

    /// One enrollment per (student, course) pair
    pub fn insert_enrollment(&mut self, enrollment: Enrollment) -> bool {
        if !self
            .enrolled_pairs
            .insert((enrollment.s_id, enrollment.c_id))
        {
            return false;
        }
        self.enrollments.push(enrollment);
        true
    }

    pub fn student_count(&self) -> usize {
        self.students.len()
    }

    pub fn faculty_count(&self) -> usize {
        self.faculty.len()
    }

    pub fn course_count(&self) -> usize {
        self.courses.len()
    }

    pub fn enrollment_count(&self) -> usize {
        self.enrollments.len()
    }

    /// Local course owned by this fragment and taught in the supported department
    fn owned_course(&self, course_id: CourseId) -> Option<&Course> {
        self.courses.get(&course_id).filter(|c| {
            self.partition.owns_course(c)
                && self
                    .faculty
                    .get(&c.f_id)
                    .is_some_and(|f| f.department == SUPPORTED_DEPARTMENT)
        })
    }

    /// Distinct students enrolled in a course of this fragment
    pub fn course_enrollments(&self, course_id: CourseId) -> EnrollmentCount {
        if self.owned_course(course_id).is_none() {
            return EnrollmentCount {
                enrollment_count: 0,
            };
        }
        let students: BTreeSet<StudentId> = self
            .enrollments
            .iter()
            .filter(|e| e.c_id == course_id)
            .map(|e| e.s_id)
            .collect();
        EnrollmentCount {
            enrollment_count: students.len() as u64,
        }
    }

    /// Local enrollments of a course carrying this fragment's status
    pub fn course_enrollment_details(&self, course_id: CourseId) -> Vec<EnrollmentDetail> {
        let Some(course) = self.courses.get(&course_id) else {
            return Vec::new();
        };
        let status = self.partition.enrollment_status();
        self.enrollments
            .iter()
            .filter(|e| e.c_id == course_id && e.status == status)
            .filter_map(|e| {
                self.students.get(&e.s_id).map(|s| EnrollmentDetail {
                    student_id: s.s_id,
                    student_name: s.name.clone(),
                    date: e.date.clone(),
                    course_name: course.name.clone(),
                })
            })
            .collect()
    }

    /// Replicated faculty of the supported department
    pub fn cs_faculty(&self) -> Vec<Faculty> {
        self.faculty
            .values()
            .filter(|f| f.department == SUPPORTED_DEPARTMENT)
            .cloned()
            .collect()
    }

    /// Students of this fragment enrolled in any local course taught by `faculty_id`
    pub fn faculty_students(&self, faculty_id: FacultyId) -> Vec<Student> {
        match self.faculty.get(&faculty_id) {
            Some(f) if f.department == SUPPORTED_DEPARTMENT => {}
            _ => return Vec::new(),
        }
        let taught: HashSet<CourseId> = self
            .courses
            .values()
            .filter(|c| c.f_id == faculty_id)
            .map(|c| c.c_id)
            .collect();
        let ids: BTreeSet<StudentId> = self
            .enrollments
            .iter()
            .filter(|e| taught.contains(&e.c_id))
            .map(|e| e.s_id)
            .collect();
        ids.iter()
            .filter_map(|id| self.students.get(id))
            .filter(|s| s.department == SUPPORTED_DEPARTMENT && self.partition.owns_student(s))
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::model::EnrollmentStatus;

    fn student(s_id: i64, year: i64) -> Student {
        Student {
            s_id,
            name: format!("student-{}", s_id),
            department: "CS".into(),
            year,
        }
    }

    fn enrollment(s_id: i64, c_id: i64, status: EnrollmentStatus) -> Enrollment {
        Enrollment {
            e_id: 0,
            s_id,
            c_id,
            date: "2024-02-01".into(),
            status,
        }
    }

    fn advanced_store() -> FragmentStore {
        let mut store = FragmentStore::new(Partition::Advanced);
        store.insert_faculty(Faculty {
            f_id: 7,
            name: "Hopper".into(),
            department: "CS".into(),
        });
        store.insert_course(Course {
            c_id: 10,
            f_id: 7,
            name: "Compilers".into(),
            credits: 3,
        });
        store.insert_student(student(1, 3));
        store.insert_student(student(2, 4));
        store.insert_enrollment(enrollment(1, 10, EnrollmentStatus::Done));
        store.insert_enrollment(enrollment(2, 10, EnrollmentStatus::Done));
        // Student 5 is not stored here, so the details join drops this row
        store.insert_enrollment(enrollment(5, 10, EnrollmentStatus::Done));
        store
    }

    #[test]
    fn test_course_enrollments_counts_distinct_students() {
        let mut store = advanced_store();
        assert!(!store.insert_enrollment(enrollment(1, 10, EnrollmentStatus::Done)));
        assert_eq!(store.course_enrollments(10).enrollment_count, 3);
        assert_eq!(store.course_enrollments(99).enrollment_count, 0);
    }

    #[test]
    fn test_course_enrollments_ignores_courses_of_other_fragment() {
        let mut store = advanced_store();
        store.insert_course(Course {
            c_id: 11,
            f_id: 7,
            name: "Intro".into(),
            credits: 1,
        });
        store.insert_enrollment(enrollment(1, 11, EnrollmentStatus::Done));
        assert_eq!(store.course_enrollments(11).enrollment_count, 0);
    }

    #[test]
    fn test_details_join_local_students() {
        let details = advanced_store().course_enrollment_details(10);
        assert_eq!(details.len(), 2);
        assert_eq!(details[0].student_id, 1);
        assert_eq!(details[0].course_name, "Compilers");
        assert_eq!(details[1].student_name, "student-2");
    }

    #[test]
    fn test_faculty_students_filters_by_year() {
        let mut store = advanced_store();
        store.insert_student(student(3, 1));
        store.insert_enrollment(enrollment(3, 10, EnrollmentStatus::Done));

        let ids: Vec<i64> = store.faculty_students(7).iter().map(|s| s.s_id).collect();
        assert_eq!(ids, vec![1, 2]);
        assert!(store.faculty_students(8).is_empty());
    }

    #[test]
    fn test_cs_faculty_only() {
        let mut store = advanced_store();
        store.insert_faculty(Faculty {
            f_id: 9,
            name: "Noether".into(),
            department: "MATH".into(),
        });
        let faculty = store.cs_faculty();
        assert_eq!(faculty.len(), 1);
        assert_eq!(faculty[0].f_id, 7);
    }
}
