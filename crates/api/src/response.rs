//! `{ "data": ... }` envelope shared by every story endpoint.

use axum::Json;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct DataResponse<T: Serialize> {
    pub data: T,
}

/// JSON body of a successful handler.
pub type DataJson<T> = Json<DataResponse<T>>;

/// Wrap `data` in the envelope.
pub fn data<T: Serialize>(data: T) -> DataJson<T> {
    Json(DataResponse { data })
}
