use utoipa::OpenApi;
use utoipa::ToSchema;

#[derive(ToSchema)]
pub struct HealthResponse { pub status: String }

#[derive(ToSchema)]
pub struct LoginRequest { pub email: String, pub password: String }

#[derive(ToSchema)]
pub struct RegisterRequest {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    /// At least 6 characters.
    pub password: String,
    /// Comma-separated ids (`"1,2"`) or an array of ids.
    pub domains_id: String,
    pub access_right: String,
}

/// Multipart create form.
#[derive(ToSchema)]
pub struct DomainForm {
    pub name: String,
    pub meta_title: String,
    pub meta_desc: Option<String>,
    pub meta_keyword: Option<String>,
    /// Comma-separated module keys, e.g. `blog,gallery`.
    pub modul: Option<String>,
    pub status: Option<String>,
    #[schema(value_type = Option<String>, format = Binary)]
    pub logo: Option<Vec<u8>>,
    #[schema(value_type = Option<String>, format = Binary)]
    pub meta_ico: Option<Vec<u8>>,
}

#[derive(ToSchema)]
pub struct StatusItem {
    #[schema(value_type = i32)]
    pub id: String,
    pub status: String,
}

/// `aksi` selects `updateAll` (the other fields) or `updateStatus` (`data`).
#[derive(ToSchema)]
pub struct DomainUpdateRequest {
    pub aksi: String,
    #[schema(value_type = Option<i32>)]
    pub id: Option<String>,
    pub name: Option<String>,
    pub meta_title: Option<String>,
    pub meta_desc: Option<String>,
    pub meta_keyword: Option<String>,
    pub logo: Option<String>,
    pub meta_ico: Option<String>,
    pub modul: Option<String>,
    pub status: Option<String>,
    pub data: Option<Vec<StatusItem>>,
}

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::health,
        crate::routes::auth::login,
        crate::routes::auth::logout,
        crate::routes::auth::register,
        crate::routes::domain::post,
        crate::routes::domain::update,
        crate::routes::domain::list,
        crate::routes::domain::get,
        crate::routes::dashboard::dashboard,
    ),
    components(
        schemas(
            HealthResponse,
            LoginRequest,
            RegisterRequest,
            DomainForm,
            StatusItem,
            DomainUpdateRequest,
        )
    ),
    tags(
        (name = "health"),
        (name = "auth"),
        (name = "domain"),
        (name = "dashboard")
    )
)]
pub struct ApiDoc;
