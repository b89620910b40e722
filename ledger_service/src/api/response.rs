use serde::Serialize;
use utoipa::ToSchema;

// Sobre uniforme de las respuestas exitosas de la API.
#[derive(Debug, Serialize, ToSchema)]
pub struct ApiResponse<T> {
    pub status: &'static str,
    #[schema(value_type = Object)] // El T genérico se documenta como Object
    pub data: T,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            status: "success",
            data,
        }
    }
}
