//! Query classification
//!
//! Maps an inbound query to a [`RoutingPlan`] without touching the network.
//! Course counts are routed with the same credit predicate the sites were
//! loaded with, so a course is always looked up where it was imported.

use crate::common::model::{CourseId, FacultyId};
use crate::common::partition::{Partition, SiteId};
use crate::Error;
use serde::Deserialize;
use std::fmt;
use std::str::FromStr;

/// The four queries the coordinator understands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueryType {
    CourseEnrollments,
    CourseEnrollmentDetails,
    FacultyMembers,
    FacultyStudents,
}

impl QueryType {
    pub const ALL: [QueryType; 4] = [
        QueryType::CourseEnrollments,
        QueryType::CourseEnrollmentDetails,
        QueryType::FacultyMembers,
        QueryType::FacultyStudents,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            QueryType::CourseEnrollments => "course_enrollments",
            QueryType::CourseEnrollmentDetails => "course_enrollment_details",
            QueryType::FacultyMembers => "faculty_members",
            QueryType::FacultyStudents => "faculty_students",
        }
    }
}

impl fmt::Display for QueryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for QueryType {
    type Err = Error;

    fn from_str(s: &str) -> crate::Result<Self> {
        QueryType::ALL
            .into_iter()
            .find(|q| q.as_str() == s)
            .ok_or_else(|| Error::InvalidQueryType(Some(s.to_string())))
    }
}

/// Inbound query-string parameters
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryRequest {
    pub department: Option<String>,
    pub query_type: Option<String>,
    pub course_id: Option<String>,
    pub faculty_id: Option<String>,
    pub credits: Option<String>,
    /// Accepted but not used for routing
    pub year: Option<String>,
}

impl QueryRequest {
    /// Credit count used for course routing. Absent or empty counts as 0;
    /// anything that is not an integer is rejected.
    pub fn credits(&self) -> Result<i64, Rejection> {
        match self.credits.as_deref().map(str::trim) {
            None | Some("") => Ok(0),
            Some(raw) => raw
                .parse()
                .map_err(|_| Rejection::InvalidParameter("credits", raw.to_string())),
        }
    }
}

/// A request against one fragment site's query surface
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SiteQuery {
    CourseEnrollments { course_id: CourseId },
    CourseEnrollmentDetails { course_id: CourseId },
    CsFaculty,
    FacultyStudents { faculty_id: FacultyId },
}

impl SiteQuery {
    pub fn path(&self) -> &'static str {
        match self {
            SiteQuery::CourseEnrollments { .. } => "/course_enrollments",
            SiteQuery::CourseEnrollmentDetails { .. } => "/course_enrollment_details",
            SiteQuery::CsFaculty => "/cs_faculty",
            SiteQuery::FacultyStudents { .. } => "/faculty_students",
        }
    }

    pub fn params(&self) -> Vec<(&'static str, String)> {
        match self {
            SiteQuery::CourseEnrollments { course_id }
            | SiteQuery::CourseEnrollmentDetails { course_id } => {
                vec![("courseId", course_id.to_string())]
            }
            SiteQuery::CsFaculty => vec![],
            SiteQuery::FacultyStudents { faculty_id } => {
                vec![("facultyId", faculty_id.to_string())]
            }
        }
    }
}

/// Why a query was refused before routing
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    UnsupportedDepartment(Option<String>),
    InvalidQueryType(Option<String>),
    MissingParameter(&'static str),
    InvalidParameter(&'static str, String),
}

impl Rejection {
    pub fn into_error(self, supported: &str) -> Error {
        match self {
            Rejection::UnsupportedDepartment(requested) => Error::UnsupportedDepartment {
                supported: supported.to_string(),
                requested,
            },
            Rejection::InvalidQueryType(q) => Error::InvalidQueryType(q),
            Rejection::MissingParameter(name) => Error::MissingParameter(name),
            Rejection::InvalidParameter(name, value) => Error::InvalidParameter { name, value },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoutingPlan {
    Reject(Rejection),
    /// One site answers; its body is returned unchanged
    Single { site: SiteId, query: SiteQuery },
    /// Both sites answer; rows are concatenated Site-A first
    ScatterGather { query: SiteQuery },
}

/// Site used for replicated faculty lookups
pub const REPLICA_SITE: SiteId = SiteId::SiteA;

#[derive(Debug, Clone)]
pub struct Classifier {
    department: String,
}

impl Classifier {
    pub fn new(department: impl Into<String>) -> Self {
        Self {
            department: department.into(),
        }
    }

    pub fn department(&self) -> &str {
        &self.department
    }

    pub fn classify(&self, request: &QueryRequest) -> RoutingPlan {
        self.plan(request).unwrap_or_else(RoutingPlan::Reject)
    }

    fn plan(&self, request: &QueryRequest) -> Result<RoutingPlan, Rejection> {
        let query_type = match request.query_type.as_deref().map(QueryType::from_str) {
            Some(Ok(q)) => q,
            _ => return Err(Rejection::InvalidQueryType(request.query_type.clone())),
        };

        if request.department.as_deref() != Some(self.department.as_str()) {
            return Err(Rejection::UnsupportedDepartment(request.department.clone()));
        }

        let plan = match query_type {
            QueryType::CourseEnrollments => {
                let course_id = required_id(&request.course_id, "courseId")?;
                RoutingPlan::Single {
                    site: Partition::for_credits(request.credits()?).site(),
                    query: SiteQuery::CourseEnrollments { course_id },
                }
            }
            QueryType::CourseEnrollmentDetails => RoutingPlan::ScatterGather {
                query: SiteQuery::CourseEnrollmentDetails {
                    course_id: required_id(&request.course_id, "courseId")?,
                },
            },
            QueryType::FacultyMembers => RoutingPlan::Single {
                site: REPLICA_SITE,
                query: SiteQuery::CsFaculty,
            },
            QueryType::FacultyStudents => RoutingPlan::ScatterGather {
                query: SiteQuery::FacultyStudents {
                    faculty_id: required_id(&request.faculty_id, "facultyId")?,
                },
            },
        };
        Ok(plan)
    }
}

/// Identifier the sites can parse; checked here so a bad id never reaches them
fn required_id(value: &Option<String>, name: &'static str) -> Result<i64, Rejection> {
    match value.as_deref().map(str::trim) {
        Some(v) if !v.is_empty() => v
            .parse()
            .map_err(|_| Rejection::InvalidParameter(name, v.to_string())),
        _ => Err(Rejection::MissingParameter(name)),
    }
}
