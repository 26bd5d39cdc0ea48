//! Account routes: registration, login, current user, profile creation.

use std::sync::Arc;

use axum::{
    extract::{
        DefaultBodyLimit, Extension, Form, Multipart,
        multipart::{MultipartError, MultipartRejection},
        rejection::{FormRejection, JsonRejection},
    },
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};

use crate::app::{dto, errors};
use crate::app::services::{AppServices, ProfileUpload};
use crate::context::AuthContext;

/// Upper bound for a profile-creation request body.
pub const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

pub fn public_router() -> Router {
    Router::new()
        .route("/create-user", post(create_user))
        .route("/token", post(login))
}

pub fn protected_router() -> Router {
    Router::new()
        .route("/me", get(me))
        .route(
            "/create-profile",
            post(create_profile).layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES)),
        )
}

/// POST /auth/create-user - Register and receive a token
pub async fn create_user(
    Extension(services): Extension<Arc<AppServices>>,
    body: Result<Json<dto::CreateUserRequest>, JsonRejection>,
) -> axum::response::Response {
    let Json(body) = match body {
        Ok(body) => body,
        Err(rejection) => return bad_json(rejection),
    };

    match services
        .register(&body.email, &body.password, body.full_name)
        .await
    {
        Ok((_user, token)) => (StatusCode::CREATED, Json(token)).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

/// POST /auth/token - Exchange username (email) + password for a token
pub async fn login(
    Extension(services): Extension<Arc<AppServices>>,
    form: Result<Form<dto::LoginForm>, FormRejection>,
) -> axum::response::Response {
    // An unreadable form carries no credentials.
    let Form(form) = match form {
        Ok(form) => form,
        Err(rejection) => {
            tracing::debug!("login rejected: {}", rejection.body_text());
            return errors::unauthorized(errors::INCORRECT_CREDENTIALS);
        }
    };
    let username = form.username.filter(|u| !u.trim().is_empty());
    let (Some(username), Some(password)) = (username, form.password) else {
        tracing::debug!("login rejected: missing username or password");
        return errors::unauthorized(errors::INCORRECT_CREDENTIALS);
    };

    match services.login(&username, &password).await {
        Ok((user, token)) => Json(dto::LoginResponse::new(token, &user)).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

/// GET /auth/me - The authenticated user
pub async fn me(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(auth): Extension<AuthContext>,
) -> axum::response::Response {
    match services.current_user(auth.user_id()).await {
        Ok(user) => Json(dto::DataEnvelope {
            data: dto::UserSummary::from(&user),
        })
        .into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

/// POST /auth/create-profile - Multipart: address, phone_number, profile_picture
pub async fn create_profile(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(auth): Extension<AuthContext>,
    multipart: Result<Multipart, MultipartRejection>,
) -> axum::response::Response {
    let user = match services.current_user(auth.user_id()).await {
        Ok(u) => u,
        Err(e) => return errors::service_error_to_response(e),
    };

    let mut multipart = match multipart {
        Ok(multipart) => multipart,
        Err(rejection) => {
            return errors::json_error(rejection.status(), "invalid_multipart", rejection.body_text());
        }
    };

    let upload = match read_profile_form(&mut multipart).await {
        Ok(u) => u,
        Err(res) => return res,
    };

    match services.create_profile(&user, upload).await {
        Ok(created) => Json(dto::DataEnvelope {
            data: dto::ProfileData::new(&created.profile, created.picture_url),
        })
        .into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

async fn read_profile_form(
    multipart: &mut Multipart,
) -> Result<ProfileUpload, axum::response::Response> {
    let mut address = None;
    let mut phone_number = None;
    let mut picture: Option<(Option<String>, Vec<u8>)> = None;

    while let Some(field) = multipart.next_field().await.map_err(bad_multipart)? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "address" => address = Some(field.text().await.map_err(bad_multipart)?),
            "phone_number" => phone_number = Some(field.text().await.map_err(bad_multipart)?),
            "profile_picture" => {
                let filename = field.file_name().map(str::to_string);
                let bytes = field.bytes().await.map_err(bad_multipart)?;
                picture = Some((filename, bytes.to_vec()));
            }
            // unknown fields are skipped
            _ => {}
        }
    }

    let address = address.ok_or_else(|| missing_field("address"))?;
    let phone_number = phone_number.ok_or_else(|| missing_field("phone_number"))?;
    let (filename, bytes) = picture.ok_or_else(|| missing_field("profile_picture"))?;
    let filename = filename
        .filter(|f| !f.is_empty())
        .ok_or_else(|| missing_field("profile_picture"))?;

    Ok(ProfileUpload {
        address,
        phone_number,
        filename,
        bytes,
    })
}

fn missing_field(name: &str) -> axum::response::Response {
    errors::json_error(
        StatusCode::UNPROCESSABLE_ENTITY,
        "validation_error",
        format!("field required: {name}"),
    )
}

fn bad_json(rejection: JsonRejection) -> axum::response::Response {
    let code = if rejection.status() == StatusCode::UNPROCESSABLE_ENTITY {
        "validation_error"
    } else {
        "invalid_json"
    };
    errors::json_error(rejection.status(), code, rejection.body_text())
}

fn bad_multipart(err: MultipartError) -> axum::response::Response {
    errors::json_error(err.status(), "invalid_multipart", err.body_text())
}
