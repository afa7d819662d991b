//! JWT authentication middleware
//!
//! Three principal kinds share one token format: administrators, shop
//! owners, and customers. The middleware verifies the Bearer token and
//! inserts a [`Principal`] extension for handlers.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use shared::error::AppError;
use shared::types::Id;

use crate::state::AppState;

/// JWT claims
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Subject id: shop id for owners, user id for customers, "admin" for admins
    pub sub: String,
    /// Principal kind: "admin" | "owner" | "customer"
    pub role: String,
    /// Tenant scope (owners and customers)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shop_id: Option<String>,
    /// Expiration (Unix timestamp seconds)
    pub exp: usize,
    /// Issued at (Unix timestamp seconds)
    pub iat: usize,
}

/// Authenticated caller identity extracted from the JWT
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Principal {
    Admin,
    ShopOwner { shop_id: Id },
    Customer { user_id: Id, shop_id: Id },
}

impl Principal {
    /// Tenant scope, if any.
    pub fn shop_id(&self) -> Option<Id> {
        match self {
            Principal::Admin => None,
            Principal::ShopOwner { shop_id } => Some(*shop_id),
            Principal::Customer { shop_id, .. } => Some(*shop_id),
        }
    }

    /// Verify the caller may operate on `shop_id`. Admins may touch any
    /// shop; owners and customers only their own.
    pub fn require_shop(&self, shop_id: Id) -> Result<(), AppError> {
        match self.shop_id() {
            None => Ok(()),
            Some(own) if own == shop_id => Ok(()),
            // Cross-tenant access reads as absence, not as denial
            Some(_) => Err(AppError::not_found("Shop")),
        }
    }

    /// Admins only.
    pub fn require_admin(&self) -> Result<(), AppError> {
        if matches!(self, Principal::Admin) {
            Ok(())
        } else {
            Err(AppError::new(shared::error::ErrorCode::AdminRequired))
        }
    }

    /// Owners (of this shop) and admins; customers are rejected.
    pub fn require_owner(&self, shop_id: Id) -> Result<(), AppError> {
        match self {
            Principal::Admin => Ok(()),
            Principal::ShopOwner { shop_id: own } if *own == shop_id => Ok(()),
            Principal::ShopOwner { .. } => Err(AppError::not_found("Shop")),
            Principal::Customer { .. } => {
                Err(AppError::permission_denied("Shop owner required"))
            }
        }
    }
}

/// Create a JWT for a principal.
pub fn create_token(
    principal: &Principal,
    secret: &str,
    expiration_hours: i64,
) -> Result<String, jsonwebtoken::errors::Error> {
    let now = chrono::Utc::now();
    let (sub, role, shop_id) = match principal {
        Principal::Admin => ("admin".to_string(), "admin", None),
        Principal::ShopOwner { shop_id } => {
            (shop_id.to_string(), "owner", Some(shop_id.to_string()))
        }
        Principal::Customer { user_id, shop_id } => {
            (user_id.to_string(), "customer", Some(shop_id.to_string()))
        }
    };
    let claims = Claims {
        sub,
        role: role.to_string(),
        shop_id,
        exp: (now + chrono::Duration::hours(expiration_hours)).timestamp() as usize,
        iat: now.timestamp() as usize,
    };

    jsonwebtoken::encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
}

/// Rebuild a principal from verified claims.
fn principal_from_claims(claims: &Claims) -> Result<Principal, AppError> {
    match claims.role.as_str() {
        "admin" => Ok(Principal::Admin),
        "owner" => {
            let shop_id = parse_claim_id(claims.shop_id.as_deref())?;
            Ok(Principal::ShopOwner { shop_id })
        }
        "customer" => {
            let user_id = parse_claim_id(Some(&claims.sub))?;
            let shop_id = parse_claim_id(claims.shop_id.as_deref())?;
            Ok(Principal::Customer { user_id, shop_id })
        }
        other => Err(AppError::invalid_token(format!("Unknown role: {other}"))),
    }
}

fn parse_claim_id(value: Option<&str>) -> Result<Id, AppError> {
    value
        .ok_or_else(|| AppError::invalid_token("Missing id claim"))?
        .parse()
        .map_err(|_| AppError::invalid_token("Malformed id claim"))
}

/// Middleware that extracts and verifies the JWT from the Authorization header
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, Response> {
    let auth_header = request
        .headers()
        .get("Authorization")
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| AppError::not_authenticated().into_response())?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or_else(|| AppError::invalid_token("Invalid Authorization format").into_response())?;

    let validation = Validation::default();
    let token_data = jsonwebtoken::decode::<Claims>(
        token,
        &DecodingKey::from_secret(state.jwt_secret.as_bytes()),
        &validation,
    )
    .map_err(|e| {
        tracing::debug!("JWT validation failed: {e}");
        match e.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => {
                AppError::token_expired().into_response()
            }
            _ => AppError::invalid_token("Invalid token").into_response(),
        }
    })?;

    let principal =
        principal_from_claims(&token_data.claims).map_err(|e| e.into_response())?;

    request.extensions_mut().insert(principal);

    Ok(next.run(request).await)
}
