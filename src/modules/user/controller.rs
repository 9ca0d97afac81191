use std::sync::Arc;

use tracing::info;

use crate::auth::AuthVerifier;
use crate::context::RequestContext;
use crate::controller::{Controller, created, ok};
use crate::handler::with_state;
use crate::http_error::{ApiError, HttpError};
use crate::method::Method;
use crate::middleware::{RequireAuthentication, UploadFile, ValidateBody};
use crate::modules::AppState;
use crate::response::Response;
use crate::route::Route;
use crate::status::Status;

use super::dto::{
    CreateUserDto, LoggedUserRdo, LoginUserDto, UploadAvatarRdo, UserRdo, create_user_shape,
    login_user_shape,
};

const NAME: &str = "UserController";

pub fn controller(state: &AppState) -> Controller {
    let auth: Arc<dyn AuthVerifier> = state.auth.clone();

    let mut c = Controller::new(NAME);
    c.add_route(
        Route::new(Method::Post, "/register", with_state(state.clone(), register))
            .with(ValidateBody::new(create_user_shape())),
    )
    .add_route(
        Route::new(Method::Post, "/login", with_state(state.clone(), login))
            .with(ValidateBody::new(login_user_shape())),
    )
    .add_route(
        Route::new(Method::Get, "/login", with_state(state.clone(), check_authenticated))
            .with(RequireAuthentication::new(Arc::clone(&auth))),
    )
    .add_route(
        Route::new(Method::Post, "/avatar", with_state(state.clone(), upload_avatar))
            .with(RequireAuthentication::new(Arc::clone(&auth)))
            .with(UploadFile::new(Arc::clone(&state.files), state.upload_directory.to_path_buf(), "avatar")),
    );
    c
}

async fn register(state: AppState, ctx: RequestContext) -> Result<Response, ApiError> {
    let dto: CreateUserDto = ctx.body_as()?;
    let email = dto.email.clone();

    match state.users.create(dto, &state.salt).await? {
        Some(user) => Ok(created(&UserRdo::from(user))),
        None => Err(ApiError::conflict(format!("User with email «{email}» exists."))),
    }
}

async fn login(state: AppState, ctx: RequestContext) -> Result<Response, ApiError> {
    let dto: LoginUserDto = ctx.body_as()?;

    let user = state.users.find_by_email(&dto.email).await?
        .filter(|user| user.verify_password(&dto.password, &state.salt))
        .ok_or_else(|| ApiError::unauthorized("Incorrect email or password"))?;

    let token = state.auth.issue(&user.principal())?;
    info!(user_id = %user.id, "user logged in");
    Ok(ok(&LoggedUserRdo { user: UserRdo::from(user), token }))
}

async fn check_authenticated(state: AppState, ctx: RequestContext) -> Result<Response, ApiError> {
    let principal = ctx.require_principal()?;
    let user = state.users.find_by_email(&principal.email).await?
        .ok_or_else(|| HttpError::from_component(Status::Unauthorized, "Unauthorized", NAME))?;
    Ok(ok(&UserRdo::from(user)))
}

async fn upload_avatar(state: AppState, ctx: RequestContext) -> Result<Response, ApiError> {
    let principal = ctx.require_principal()?;
    let file = ctx.file().ok_or_else(|| ApiError::upload_failure("No file uploaded"))?;
    let filepath = file.path.display().to_string();

    state.users.update_avatar(&principal.id, filepath.clone()).await?
        .ok_or_else(|| HttpError::from_component(Status::Unauthorized, "Unauthorized", NAME))?;
    Ok(created(&UploadAvatarRdo { filepath }))
}
