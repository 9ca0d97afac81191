use std::sync::Arc;

use tracing::warn;

use crate::auth::AuthVerifier;
use crate::context::RequestContext;
use crate::controller::{Controller, created, ok};
use crate::handler::with_state;
use crate::http_error::ApiError;
use crate::method::Method;
use crate::middleware::{DocumentLookup, RequireAuthentication, ResourceExists, ValidateBody, ValidateIdentifier};
use crate::modules::AppState;
use crate::modules::offer::{OFFER, OfferLookup, resolved_offer};
use crate::modules::user::UserRdo;
use crate::response::Response;
use crate::route::Route;

use super::{CommentRdo, CreateCommentDto, create_comment_shape};

pub const DEFAULT_COMMENT_COUNT: usize = 50;

pub fn controller(state: &AppState) -> Controller {
    let auth: Arc<dyn AuthVerifier> = state.auth.clone();
    let lookup: Arc<dyn DocumentLookup> = Arc::new(OfferLookup(Arc::clone(&state.offers)));

    let mut c = Controller::new("CommentController");
    c.add_route(
        Route::new(Method::Get, "/{offerId}", with_state(state.clone(), index))
            .with(ValidateIdentifier::new("offerId"))
            .with(ResourceExists::new(Arc::clone(&lookup), OFFER, "offerId")),
    )
    .add_route(
        Route::new(Method::Post, "/{offerId}", with_state(state.clone(), create))
            .with(RequireAuthentication::new(auth))
            .with(ValidateIdentifier::new("offerId"))
            .with(ResourceExists::new(lookup, OFFER, "offerId"))
            .with(ValidateBody::new(create_comment_shape())),
    );
    c
}

async fn index(state: AppState, ctx: RequestContext) -> Result<Response, ApiError> {
    let offer = resolved_offer(&ctx)?;
    let comments = state.comments.find_by_offer_id(&offer.id, DEFAULT_COMMENT_COUNT).await?;

    let mut rdos = Vec::with_capacity(comments.len());
    for comment in comments {
        let author = state.users.find_by_id(&comment.author_id).await?.map(UserRdo::from);
        rdos.push(CommentRdo::new(comment, author));
    }
    Ok(ok(&rdos))
}

async fn create(state: AppState, ctx: RequestContext) -> Result<Response, ApiError> {
    let principal = ctx.require_principal()?;
    let offer = resolved_offer(&ctx)?;
    let dto: CreateCommentDto = ctx.body_as()?;
    let rating = dto.rating;

    let comment = state.comments.create(&offer.id, &principal.id, dto).await?;
    if state.offers.register_comment(&offer.id, rating).await?.is_none() {
        // The offer was deleted after ResourceExists resolved it.
        let dropped = state.comments.delete_by_offer_id(&offer.id).await?;
        warn!(offer_id = %offer.id, dropped, "offer vanished while commenting");
        return Err(ApiError::not_found(OFFER, offer.id.as_str()));
    }

    let author = state.users.find_by_id(&principal.id).await?.map(UserRdo::from);
    Ok(created(&CommentRdo::new(comment, author)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::Principal;
    use crate::config::Config;
    use crate::middleware::Document;
    use crate::modules::offer::CreateOfferDto;

    fn state() -> AppState {
        let config = Config::from_lookup(|key| match key {
            "SALT" => Some("pepper".into()),
            "JWT_SECRET" => Some("secret".into()),
            _ => None,
        })
        .unwrap();
        AppState::in_memory(&config)
    }

    fn offer_dto() -> CreateOfferDto {
        serde_json::from_value(serde_json::json!({
            "title": "Quiet room near the park",
            "description": "Clean, quiet and close to public transport.",
            "city": "Paris",
            "previewImage": "preview.jpg",
            "images": ["1.jpg", "2.jpg", "3.jpg", "4.jpg", "5.jpg", "6.jpg"],
            "isPremium": false,
            "rating": 4.0,
            "type": "room",
            "bedrooms": 1,
            "maxAdults": 2,
            "price": 100,
            "goods": ["Washer"],
            "location": { "latitude": 48.85, "longitude": 2.35 }
        }))
        .unwrap()
    }

    #[tokio::test]
    async fn comment_on_an_offer_deleted_mid_request_is_not_kept() {
        let state = state();
        let author = Principal { id: "6650f1c2a1b2c3d4e5f60718".into(), email: "a@b.co".into(), name: "A".into() };
        let offer = state.offers.create(&author.id, offer_dto()).await.unwrap();

        // Resolved by ResourceExists, then removed before the handler runs.
        let mut ctx = RequestContext::new(Method::Post, format!("/comments/{}", offer.id))
            .with_body(r#"{"text":"Lovely place","rating":5}"#);
        ctx.set_principal(author);
        ctx.insert_document(OFFER, Document::new(offer.clone()));
        state.offers.delete_by_id(&offer.id).await.unwrap();

        match create(state.clone(), ctx).await {
            Err(ApiError::NotFound { id, .. }) => assert_eq!(id, offer.id),
            other => panic!("unexpected {:?}", other.map(|r| r.status_code())),
        }
        assert!(state.comments.find_by_offer_id(&offer.id, 50).await.unwrap().is_empty());
    }
}
