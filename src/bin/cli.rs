//! CLI for querying a minifrag coordinator

use clap::{Parser, Subcommand, ValueEnum};
use minifrag::coordinator::QueryType;
use minifrag::common::SUPPORTED_DEPARTMENT;

#[derive(Parser)]
#[command(name = "minifrag")]
#[command(about = "minifrag distributed records query CLI")]
#[command(version)]
struct Cli {
    /// Coordinator URL
    #[arg(long, global = true, default_value = "http://localhost:3000")]
    coordinator: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum Kind {
    CourseEnrollments,
    CourseEnrollmentDetails,
    FacultyMembers,
    FacultyStudents,
}

impl From<Kind> for QueryType {
    fn from(kind: Kind) -> Self {
        match kind {
            Kind::CourseEnrollments => QueryType::CourseEnrollments,
            Kind::CourseEnrollmentDetails => QueryType::CourseEnrollmentDetails,
            Kind::FacultyMembers => QueryType::FacultyMembers,
            Kind::FacultyStudents => QueryType::FacultyStudents,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Run a query through the coordinator and print the JSON answer
    Query {
        kind: Kind,

        #[arg(long, default_value = SUPPORTED_DEPARTMENT)]
        department: String,

        #[arg(long)]
        course_id: Option<String>,

        #[arg(long)]
        faculty_id: Option<String>,

        /// Course credits, used to pick the fragment for course counts
        #[arg(long)]
        credits: Option<i64>,

        #[arg(long)]
        year: Option<i64>,
    },

    /// Check that the coordinator is alive
    Health,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();
    let base = cli.coordinator.trim_end_matches('/');

    match cli.command {
        Commands::Query {
            kind,
            department,
            course_id,
            faculty_id,
            credits,
            year,
        } => {
            let mut params: Vec<(&str, String)> = vec![
                ("department", department),
                ("queryType", QueryType::from(kind).as_str().to_string()),
            ];
            if let Some(course_id) = course_id {
                params.push(("courseId", course_id));
            }
            if let Some(faculty_id) = faculty_id {
                params.push(("facultyId", faculty_id));
            }
            if let Some(credits) = credits {
                params.push(("credits", credits.to_string()));
            }
            if let Some(year) = year {
                params.push(("year", year.to_string()));
            }

            let resp = client.get(format!("{}/", base)).query(&params).send().await?;
            let status = resp.status();
            let body: serde_json::Value = resp.json().await?;
            println!("{}", serde_json::to_string_pretty(&body)?);
            if !status.is_success() {
                anyhow::bail!("query failed with HTTP {}", status.as_u16());
            }
        }
        Commands::Health => {
            let resp = client.get(format!("{}/health/live", base)).send().await?;
            let status = resp.status();
            println!("{}", resp.text().await?);
            if !status.is_success() {
                anyhow::bail!("coordinator unhealthy: HTTP {}", status.as_u16());
            }
        }
    }

    Ok(())
}
