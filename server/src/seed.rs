use std::path::Path;

use anyhow::{Context, Result};
use axum::http::HeaderValue;
use entity::{Employee, employees::TABLE};
use platform_db::Connect;
use tracing::info;

const DEMO_EMPLOYEES: &str = include_str!("../fixtures/employees.json");

/// Employees from `file`, or the bundled demo set.
pub fn load(file: Option<&Path>) -> Result<Vec<Employee>> {
    match file {
        Some(path) => {
            let raw = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            serde_json::from_str(&raw)
                .with_context(|| format!("{} is not a list of employees", path.display()))
        }
        None => serde_json::from_str(DEMO_EMPLOYEES).context("bundled demo employees are invalid"),
    }
}

/// Insert each employee through the backend, one call per row, stopping at
/// the first failure. Returns how many rows were written.
pub async fn run(
    connector: &dyn Connect,
    file: Option<&Path>,
    authorization: Option<&str>,
) -> Result<usize> {
    let employees = load(file)?;
    let authorization = authorization
        .map(HeaderValue::from_str)
        .transpose()
        .context("invalid authorization value")?;
    let store = connector.connect(authorization.as_ref())?;

    for employee in &employees {
        let payload = serde_json::to_value(employee)?;
        store
            .insert(TABLE, &payload)
            .await
            .with_context(|| format!("failed to insert employee {}", employee.employee_id))?;
        info!(employee_id = employee.employee_id, "seeded employee");
    }
    Ok(employees.len())
}
