use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::models::user::StaffRole;
use crate::AppState;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub exp: usize,
    pub role: Option<String>,
}

/// Authenticated staff member, inserted as a request extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor {
    pub id: Uuid,
    pub role: StaffRole,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    View,
    ManageJobs,
    Evaluate,
    SetStatus,
    Schedule,
    RecordResult,
    Finalize,
    Delete,
}

pub fn can_perform(role: StaffRole, op: Operation) -> bool {
    use Operation::*;
    match role {
        StaffRole::SuperAdmin => true,
        StaffRole::Hr => op != Evaluate,
        StaffRole::Md => matches!(op, View | Finalize | RecordResult),
        StaffRole::Evaluator => matches!(op, View | Evaluate | RecordResult),
    }
}

impl Actor {
    pub fn authorize(&self, op: Operation) -> Result<()> {
        if can_perform(self.role, op) {
            Ok(())
        } else {
            tracing::warn!(actor = %self.id, role = self.role.as_str(), ?op, "operation forbidden");
            Err(Error::Forbidden(format!(
                "Role {} may not perform {:?}",
                self.role.as_str(),
                op
            )))
        }
    }
}

pub fn decode_actor(token: &str, secret: &str) -> Result<Actor> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = true;
    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map_err(|_| Error::Unauthorized("invalid_token".into()))?;

    let id = Uuid::parse_str(&data.claims.sub)
        .map_err(|_| Error::Unauthorized("token subject is not a staff id".into()))?;
    let role = data
        .claims
        .role
        .as_deref()
        .ok_or_else(|| Error::Forbidden("token carries no role".into()))?
        .parse::<StaffRole>()
        .map_err(Error::Forbidden)?;
    Ok(Actor { id, role })
}

fn bearer_token(req: &Request) -> Result<&str> {
    let header = req
        .headers()
        .get(axum::http::header::AUTHORIZATION)
        .ok_or_else(|| Error::Unauthorized("missing_authorization".into()))?;
    let value = header
        .to_str()
        .map_err(|_| Error::Unauthorized("bad_authorization".into()))?;
    value
        .strip_prefix("Bearer ")
        .ok_or_else(|| Error::Unauthorized("unsupported_scheme".into()))
}

pub async fn require_staff(State(state): State<AppState>, mut req: Request, next: Next) -> Response {
    let actor = match bearer_token(&req).and_then(|token| decode_actor(token, &state.jwt_secret)) {
        Ok(actor) => actor,
        Err(err) => return err.into_response(),
    };
    req.extensions_mut().insert(actor);
    next.run(req).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{encode, EncodingKey, Header};

    fn token(sub: &str, role: Option<&str>, secret: &str) -> String {
        let claims = Claims {
            sub: sub.to_string(),
            exp: (chrono::Utc::now().timestamp() + 3600) as usize,
            role: role.map(str::to_string),
        };
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    #[test]
    fn policy_matrix() {
        assert!(can_perform(StaffRole::SuperAdmin, Operation::Evaluate));
        assert!(can_perform(StaffRole::Hr, Operation::Delete));
        assert!(can_perform(StaffRole::Hr, Operation::SetStatus));
        assert!(!can_perform(StaffRole::Hr, Operation::Evaluate));
        assert!(can_perform(StaffRole::Md, Operation::Finalize));
        assert!(!can_perform(StaffRole::Md, Operation::SetStatus));
        assert!(!can_perform(StaffRole::Md, Operation::Schedule));
        assert!(can_perform(StaffRole::Evaluator, Operation::Evaluate));
        assert!(can_perform(StaffRole::Evaluator, Operation::RecordResult));
        assert!(!can_perform(StaffRole::Evaluator, Operation::Delete));
    }

    #[test]
    fn decodes_valid_token() {
        let id = Uuid::new_v4();
        let actor = decode_actor(&token(&id.to_string(), Some("hr"), "s3cret"), "s3cret").unwrap();
        assert_eq!(actor, Actor { id, role: StaffRole::Hr });
    }

    #[test]
    fn wrong_secret_is_unauthorized() {
        let err = decode_actor(&token(&Uuid::new_v4().to_string(), Some("hr"), "a"), "b")
            .unwrap_err();
        assert_eq!(err.kind(), "unauthorized");
    }

    #[test]
    fn unknown_role_is_forbidden() {
        let err = decode_actor(
            &token(&Uuid::new_v4().to_string(), Some("intern"), "s3cret"),
            "s3cret",
        )
        .unwrap_err();
        assert_eq!(err.kind(), "forbidden");
    }
}
