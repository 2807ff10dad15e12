use axum::http::Method;

const EMPLOYEE_PREFIX: &str = "/employees/";

/// Where a request goes: answered in place, or handed to the backend.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Route {
    Preflight,
    Backend(Operation),
}

/// The backend call a request maps to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Operation {
    List,
    Fetch(String),
    Create,
    Update(String),
    Delete(String),
}

impl Route {
    /// Ordered match: id-bearing combinations first, then bare methods,
    /// then the list fallback for everything else.
    pub fn resolve(method: &Method, path: &str) -> Self {
        if method == Method::OPTIONS {
            return Route::Preflight;
        }
        let operation = match (method, employee_id(path)) {
            (&Method::GET, Some(id)) => Operation::Fetch(id.to_string()),
            (&Method::PUT, Some(id)) => Operation::Update(id.to_string()),
            (&Method::DELETE, Some(id)) => Operation::Delete(id.to_string()),
            (&Method::POST, _) => Operation::Create,
            _ => Operation::List,
        };
        Route::Backend(operation)
    }
}

/// Methods whose body is parsed before dispatch, whatever route they hit.
pub fn reads_body(method: &Method) -> bool {
    method == Method::POST || method == Method::PUT
}

/// The `:id` of `/employees/:id`: exactly one non-empty segment.
pub fn employee_id(path: &str) -> Option<&str> {
    let id = path.strip_prefix(EMPLOYEE_PREFIX)?;
    (!id.is_empty() && !id.contains('/')).then_some(id)
}
