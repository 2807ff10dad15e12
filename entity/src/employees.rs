use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Backend table holding employee rows.
pub const TABLE: &str = "employees";

/// Primary key column, used for every id-scoped filter.
pub const PRIMARY_KEY: &str = "employee_id";

/// Projection for the list endpoint: name, job and the joined job title.
pub const LIST_COLUMNS: &str = "job_id, first_name, last_name, jobs: job_id (job_title)";

pub const ALL_COLUMNS: &str = "*";

/// A full row of the `employees` table.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Model {
    pub employee_id: i64,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone_number: String,
    pub hire_date: NaiveDate,
    pub job_id: i64,
    pub salary: f64,
    pub manager_id: Option<i64>,
    pub department_id: i64,
}

/// Row shape returned by the list projection.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub job_id: i64,
    pub first_name: String,
    pub last_name: String,
    pub jobs: Option<JobTitle>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobTitle {
    pub job_title: String,
}
