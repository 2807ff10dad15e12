//! One backend call per operation; results go back untouched.

use axum::{
    Json,
    response::{IntoResponse, Response},
};
use entity::employees::{ALL_COLUMNS, LIST_COLUMNS, PRIMARY_KEY, TABLE};
use platform_api::ApiResult;
use platform_db::{Filter, RowStore};
use serde_json::{Map, Value, json};

pub async fn list_employees(store: &dyn RowStore) -> ApiResult<Response> {
    let employees = store.select(TABLE, LIST_COLUMNS, None).await?;
    Ok(Json(json!({ "employees": employees })).into_response())
}

/// The row comes back inside an array, as the backend returns it.
pub async fn get_employee(store: &dyn RowStore, id: &str) -> ApiResult<Response> {
    let filter = Filter::eq(PRIMARY_KEY, id);
    let employee = store.select(TABLE, ALL_COLUMNS, Some(&filter)).await?;
    Ok(Json(json!({ "employee": employee })).into_response())
}

/// Echoes the submitted payload, not the stored row.
pub async fn create_employee(store: &dyn RowStore, payload: Option<Value>) -> ApiResult<Response> {
    store
        .insert(TABLE, payload.as_ref().unwrap_or(&Value::Null))
        .await?;
    Ok(Json(echo(payload)).into_response())
}

pub async fn update_employee(
    store: &dyn RowStore,
    id: &str,
    payload: Option<Value>,
) -> ApiResult<Response> {
    let filter = Filter::eq(PRIMARY_KEY, id);
    store
        .update(TABLE, payload.as_ref().unwrap_or(&Value::Null), &filter)
        .await?;
    Ok(Json(echo(payload)).into_response())
}

pub async fn delete_employee(store: &dyn RowStore, id: &str) -> ApiResult<Response> {
    store.delete(TABLE, &Filter::eq(PRIMARY_KEY, id)).await?;
    Ok(Json(json!({})).into_response())
}

/// `{"employee": payload}`, or `{}` when the request carried no payload.
fn echo(payload: Option<Value>) -> Value {
    let mut body = Map::new();
    if let Some(employee) = payload {
        body.insert("employee".to_string(), employee);
    }
    Value::Object(body)
}
