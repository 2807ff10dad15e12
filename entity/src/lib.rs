//! Record types for the `employees` table and its `jobs` join.

pub mod employees;

pub use employees::{JobTitle, Model as Employee, Summary as EmployeeSummary};
