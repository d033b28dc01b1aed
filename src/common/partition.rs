//! Horizontal partitioning policy
//!
//! The same predicates decide where a record lands at import time and which
//! site the coordinator asks for it. Students split by year, courses by
//! credit count and enrollments by status; faculty is replicated.

use crate::common::model::{Course, EnrollmentStatus, Student};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The only department the fragmented database holds
pub const SUPPORTED_DEPARTMENT: &str = "CS";

/// Courses with more credits than this are "advanced" and live on Site-A
pub const ADVANCED_CREDITS_THRESHOLD: i64 = 2;

/// Students past this year are "senior" and live on Site-A
pub const SENIOR_YEAR_THRESHOLD: i64 = 2;

/// Identity of a fragment site as seen by the coordinator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SiteId {
    /// Senior students, advanced courses, completed enrollments
    SiteA,
    /// Junior students, basic courses, pending enrollments
    SiteB,
}

impl SiteId {
    pub const ALL: [SiteId; 2] = [SiteId::SiteA, SiteId::SiteB];

    pub fn as_str(&self) -> &'static str {
        match self {
            SiteId::SiteA => "site-a",
            SiteId::SiteB => "site-b",
        }
    }

    pub fn partition(&self) -> Partition {
        match self {
            SiteId::SiteA => Partition::Advanced,
            SiteId::SiteB => Partition::Basic,
        }
    }
}

impl fmt::Display for SiteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The slice of data a fragment site owns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Partition {
    Advanced,
    Basic,
}

impl Partition {
    /// Fragment holding courses with the given credit count.
    /// Unset credits (0) fall into the basic fragment.
    pub fn for_credits(credits: i64) -> Self {
        if credits > ADVANCED_CREDITS_THRESHOLD {
            Partition::Advanced
        } else {
            Partition::Basic
        }
    }

    pub fn for_year(year: i64) -> Self {
        if year > SENIOR_YEAR_THRESHOLD {
            Partition::Advanced
        } else {
            Partition::Basic
        }
    }

    pub fn site(&self) -> SiteId {
        match self {
            Partition::Advanced => SiteId::SiteA,
            Partition::Basic => SiteId::SiteB,
        }
    }

    pub fn owns_student(&self, student: &Student) -> bool {
        Partition::for_year(student.year) == *self
    }

    pub fn owns_course(&self, course: &Course) -> bool {
        Partition::for_credits(course.credits) == *self
    }

    /// Enrollment status this fragment stores
    pub fn enrollment_status(&self) -> EnrollmentStatus {
        match self {
            Partition::Advanced => EnrollmentStatus::Done,
            Partition::Basic => EnrollmentStatus::NotDone,
        }
    }
}

impl fmt::Display for Partition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Partition::Advanced => f.write_str("advanced"),
            Partition::Basic => f.write_str("basic"),
        }
    }
}

impl FromStr for Partition {
    type Err = crate::Error;

    fn from_str(s: &str) -> crate::Result<Self> {
        match s.to_lowercase().as_str() {
            "advanced" | "senior" | "a" | "site-a" => Ok(Partition::Advanced),
            "basic" | "junior" | "b" | "site-b" => Ok(Partition::Basic),
            other => Err(crate::Error::InvalidConfig(format!(
                "unknown partition: {}",
                other
            ))),
        }
    }
}
