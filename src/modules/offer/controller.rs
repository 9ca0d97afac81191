use std::sync::Arc;

use tracing::{info, warn};

use crate::auth::{AuthVerifier, Principal};
use crate::context::RequestContext;
use crate::controller::{Controller, created, no_content, ok};
use crate::handler::with_state;
use crate::http_error::{ApiError, FieldViolation, HttpError};
use crate::method::Method;
use crate::middleware::{
    DocumentLookup, RequireAuthentication, ResourceExists, UploadFile, ValidateBody,
    ValidateIdentifier,
};
use crate::modules::AppState;
use crate::response::Response;
use crate::route::Route;
use crate::status::Status;
use crate::upload::StoredFile;

use super::dto::{CreateOfferDto, OfferRdo, UpdateOfferDto, UploadImageRdo, create_offer_shape, update_offer_shape};
use super::entity::{CITY_NAMES, City, Offer};
use super::service::OfferLookup;

pub const OFFER: &str = "Offer";
pub const DEFAULT_OFFER_COUNT: usize = 60;
pub const PREMIUM_OFFER_COUNT: usize = 3;

const NAME: &str = "OfferController";

pub fn controller(state: &AppState) -> Controller {
    let auth: Arc<dyn AuthVerifier> = state.auth.clone();
    let lookup: Arc<dyn DocumentLookup> = Arc::new(OfferLookup(Arc::clone(&state.offers)));

    let authenticated = || RequireAuthentication::new(Arc::clone(&auth));
    let offer_id = || ValidateIdentifier::new("offerId");
    let offer_exists = || ResourceExists::new(Arc::clone(&lookup), OFFER, "offerId");

    let mut c = Controller::new(NAME);
    c.add_route(Route::new(Method::Get, "/", with_state(state.clone(), index)))
        .add_route(
            Route::new(Method::Post, "/", with_state(state.clone(), create))
                .with(authenticated())
                .with(ValidateBody::new(create_offer_shape())),
        )
        .add_route(
            Route::new(Method::Get, "/{offerId}", with_state(state.clone(), show))
                .with(offer_id())
                .with(offer_exists()),
        )
        .add_route(
            Route::new(Method::Patch, "/{offerId}", with_state(state.clone(), update))
                .with(authenticated())
                .with(ValidateBody::new(update_offer_shape()))
                .with(offer_id())
                .with(offer_exists()),
        )
        .add_route(
            Route::new(Method::Delete, "/{offerId}", with_state(state.clone(), delete))
                .with(authenticated())
                .with(offer_id())
                .with(offer_exists()),
        )
        .add_route(
            Route::new(Method::Post, "/{offerId}/image", with_state(state.clone(), upload_image))
                .with(authenticated())
                .with(offer_id())
                .with(UploadFile::new(Arc::clone(&state.files), state.upload_directory.to_path_buf(), "image")),
        )
        .add_route(Route::new(Method::Get, "/premium/{city}", with_state(state.clone(), premium)))
        .add_route(
            Route::new(Method::Get, "/favorite", with_state(state.clone(), favorites))
                .with(authenticated()),
        )
        .add_route(
            Route::new(Method::Post, "/favorite/{offerId}", with_state(state.clone(), add_favorite))
                .with(authenticated())
                .with(offer_id())
                .with(offer_exists()),
        )
        .add_route(
            Route::new(Method::Delete, "/favorite/{offerId}", with_state(state.clone(), remove_favorite))
                .with(authenticated())
                .with(offer_id())
                .with(offer_exists()),
        );
    c
}

// ── Handlers ──────────────────────────────────────────────────────────────────

async fn index(state: AppState, ctx: RequestContext) -> Result<Response, ApiError> {
    let limit = parse_limit(ctx.query("limit"))?;
    let offers = state.offers.find(limit).await?;
    let rdos: Vec<OfferRdo> = offers.into_iter().map(|o| OfferRdo::new(o, false)).collect();
    Ok(ok(&rdos))
}

async fn create(state: AppState, ctx: RequestContext) -> Result<Response, ApiError> {
    let principal = ctx.require_principal()?;
    let dto: CreateOfferDto = ctx.body_as()?;
    let offer = state.offers.create(&principal.id, dto).await?;
    Ok(created(&OfferRdo::new(offer, false)))
}

async fn show(_state: AppState, ctx: RequestContext) -> Result<Response, ApiError> {
    let offer = resolved(&ctx)?;
    Ok(ok(&OfferRdo::new(Offer::clone(&offer), false)))
}

async fn update(state: AppState, ctx: RequestContext) -> Result<Response, ApiError> {
    let principal = ctx.require_principal()?;
    let offer = resolved(&ctx)?;
    ensure_owner(&offer, principal)?;

    let dto: UpdateOfferDto = ctx.body_as()?;
    let updated = state.offers.update_by_id(&offer.id, dto).await?
        .ok_or_else(|| ApiError::not_found(OFFER, offer.id.clone()))?;
    let is_favorite = state.offers.is_favorite(&updated.id, &principal.id).await?;
    Ok(ok(&OfferRdo::new(updated, is_favorite)))
}

async fn delete(state: AppState, ctx: RequestContext) -> Result<Response, ApiError> {
    let principal = ctx.require_principal()?;
    let offer = resolved(&ctx)?;
    ensure_owner(&offer, principal)?;

    state.offers.delete_by_id(&offer.id).await?;
    let comments = state.comments.delete_by_offer_id(&offer.id).await?;
    info!(offer_id = %offer.id, comments, "offer deleted");
    Ok(no_content())
}

async fn upload_image(state: AppState, ctx: RequestContext) -> Result<Response, ApiError> {
    let principal = ctx.require_principal()?;
    let file = ctx.file().ok_or_else(|| ApiError::upload_failure("No file uploaded"))?;
    let id = ctx.param("offerId").unwrap_or_default();

    let offer = match state.offers.find_by_id(id).await? {
        Some(offer) if offer.is_owned_by(&principal.id) => offer,
        Some(_) => {
            discard(file).await;
            return Err(not_found_for_owner());
        }
        None => {
            discard(file).await;
            return Err(ApiError::not_found(OFFER, id));
        }
    };

    let update = UpdateOfferDto { preview_image: Some(file.filename.clone()), ..Default::default() };
    state.offers.update_by_id(&offer.id, update).await?;
    Ok(created(&UploadImageRdo { preview_image: file.filename.clone() }))
}

async fn premium(state: AppState, ctx: RequestContext) -> Result<Response, ApiError> {
    let city: City = ctx.param("city").unwrap_or_default().parse().map_err(|()| {
        ApiError::Validation(vec![FieldViolation::new(
            "city",
            format!("city must be one of: {}", CITY_NAMES.join(", ")),
        )])
    })?;

    let offers = state.offers.find_premium_by_city(city, PREMIUM_OFFER_COUNT).await?;
    let rdos: Vec<OfferRdo> = offers.into_iter().map(|o| OfferRdo::new(o, false)).collect();
    Ok(ok(&rdos))
}

async fn favorites(state: AppState, ctx: RequestContext) -> Result<Response, ApiError> {
    let principal = ctx.require_principal()?;
    let offers = state.offers.find_favorites(&principal.id).await?;
    let rdos: Vec<OfferRdo> = offers.into_iter().map(|o| OfferRdo::new(o, true)).collect();
    Ok(ok(&rdos))
}

async fn add_favorite(state: AppState, ctx: RequestContext) -> Result<Response, ApiError> {
    let principal = ctx.require_principal()?;
    let offer = resolved(&ctx)?;
    state.offers.add_favorite(&offer.id, &principal.id).await?;
    Ok(ok(&OfferRdo::new(Offer::clone(&offer), true)))
}

async fn remove_favorite(state: AppState, ctx: RequestContext) -> Result<Response, ApiError> {
    let principal = ctx.require_principal()?;
    let offer = resolved(&ctx)?;
    state.offers.remove_favorite(&offer.id, &principal.id).await?;
    Ok(ok(&OfferRdo::new(Offer::clone(&offer), false)))
}

// ── Helpers ───────────────────────────────────────────────────────────────────

/// The offer `ResourceExists` put in the context.
pub(crate) fn resolved(ctx: &RequestContext) -> Result<Arc<Offer>, ApiError> {
    ctx.document::<Offer>(OFFER)
        .ok_or_else(|| ApiError::Unknown(anyhow::anyhow!("route has no resolved {OFFER}")))
}

/// Another user's offer reads as missing.
fn ensure_owner(offer: &Offer, principal: &Principal) -> Result<(), ApiError> {
    if offer.is_owned_by(&principal.id) {
        Ok(())
    } else {
        Err(not_found_for_owner())
    }
}

fn not_found_for_owner() -> ApiError {
    HttpError::from_component(Status::NotFound, "Offer not found", NAME).into()
}

fn parse_limit(raw: Option<&str>) -> Result<usize, ApiError> {
    match raw {
        None => Ok(DEFAULT_OFFER_COUNT),
        Some(s) => s.trim().parse::<usize>().ok().filter(|n| *n > 0).ok_or_else(|| {
            ApiError::Validation(vec![FieldViolation::new("limit", "limit must be a positive integer")])
        }),
    }
}

async fn discard(file: &StoredFile) {
    if let Err(e) = tokio::fs::remove_file(&file.path).await {
        warn!(path = %file.path.display(), "failed to discard upload: {e}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn limit_defaults_and_rejects_garbage() {
        assert_eq!(parse_limit(None).unwrap(), DEFAULT_OFFER_COUNT);
        assert_eq!(parse_limit(Some("5")).unwrap(), 5);
        assert!(matches!(parse_limit(Some("0")), Err(ApiError::Validation(_))));
        assert!(matches!(parse_limit(Some("many")), Err(ApiError::Validation(_))));
    }

    #[test]
    fn ownership_mismatch_is_reported_as_not_found() {
        let err = not_found_for_owner();
        assert_eq!(err.status(), Status::NotFound);
        assert_eq!(err.to_string(), "Offer not found");
    }
}
