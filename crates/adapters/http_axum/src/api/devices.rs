//! JSON REST handlers for devices.

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::response::{IntoResponse, Response};
use serde_json::Value;

use homectl_app::ports::{DependentController, DeviceRegistry, EventPublisher, VendorAdapter};
use homectl_domain::device::Device;
use homectl_domain::error::ValidationError;

use super::Data;
use crate::error::ApiError;
use crate::state::AppState;

/// Possible responses from the list endpoint.
pub enum ListResponse {
    Ok(Json<Data<Vec<Device>>>),
}

impl IntoResponse for ListResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Ok(json) => json.into_response(),
        }
    }
}

/// Possible responses from the get and update endpoints.
pub enum DeviceResponse {
    Ok(Json<Data<Device>>),
}

impl IntoResponse for DeviceResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Ok(json) => json.into_response(),
        }
    }
}

/// `GET /devices`
pub async fn list<V, R, C, P>(State(state): State<AppState<V, R, C, P>>) -> ListResponse
where
    V: VendorAdapter + Send + Sync + 'static,
    R: DeviceRegistry + Send + Sync + 'static,
    C: DependentController + Send + Sync + 'static,
    P: EventPublisher + Send + Sync + 'static,
{
    let devices = state.device_service.list_devices();
    ListResponse::Ok(Json(Data::new(devices)))
}

/// `GET /device/{id}`
pub async fn get<V, R, C, P>(
    State(state): State<AppState<V, R, C, P>>,
    Path(id): Path<String>,
) -> Result<DeviceResponse, ApiError>
where
    V: VendorAdapter + Send + Sync + 'static,
    R: DeviceRegistry + Send + Sync + 'static,
    C: DependentController + Send + Sync + 'static,
    P: EventPublisher + Send + Sync + 'static,
{
    let device = state.device_service.get_device(&id)?;
    Ok(DeviceResponse::Ok(Json(Data::new(device))))
}

/// `PATCH /device/{id}`
///
/// The body is a partial property map, e.g. `{"power": true, "brightness": 120}`.
/// Bodies that are not JSON objects are answered with 422.
pub async fn update<V, R, C, P>(
    State(state): State<AppState<V, R, C, P>>,
    Path(id): Path<String>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<DeviceResponse, ApiError>
where
    V: VendorAdapter + Send + Sync + 'static,
    R: DeviceRegistry + Send + Sync + 'static,
    C: DependentController + Send + Sync + 'static,
    P: EventPublisher + Send + Sync + 'static,
{
    let Json(body) = body?;
    let Value::Object(input) = body else {
        return Err(ValidationError::InvalidType {
            property: "body".to_string(),
            expected: "object",
            value: body,
        }
        .into());
    };
    let device = state.device_service.update_device(&id, input).await?;
    Ok(DeviceResponse::Ok(Json(Data::new(device))))
}
