use actix_web::{Error, FromRequest, HttpRequest, HttpResponse, dev::Payload};
use futures::future::{Ready, ready};
use serde::{Deserialize, Serialize};

use crate::utils::jwt;

/// Principal immuable extrait du JWT, passé aux handlers protégés.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthUser {
    pub username: String,
    pub role: String,
}

fn unauthorized(message: &str) -> Error {
    let response = HttpResponse::Unauthorized().json(serde_json::json!({
        "error": message
    }));
    actix_web::error::InternalError::from_response("", response).into()
}

fn forbidden(message: &str) -> Error {
    let response = HttpResponse::Forbidden().json(serde_json::json!({
        "error": message
    }));
    actix_web::error::InternalError::from_response("", response).into()
}

fn extract_auth_user(req: &HttpRequest) -> Result<AuthUser, Error> {
    let auth_header = req
        .headers()
        .get("Authorization")
        .ok_or_else(|| unauthorized("Missing Authorization header"))?;

    let auth_str = auth_header
        .to_str()
        .map_err(|_| unauthorized("Invalid Authorization header"))?;

    let token = auth_str
        .strip_prefix("Bearer ")
        .ok_or_else(|| unauthorized("Invalid Authorization format (expected: Bearer <token>)"))?;

    let claims = jwt::verify_token(token).map_err(|e| unauthorized(&e))?;

    Ok(AuthUser {
        username: claims.sub,
        role: claims.role,
    })
}

impl FromRequest for AuthUser {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(extract_auth_user(req))
    }
}

/// Extracteur des routes /api/admin : exige le rôle ADMIN (403 sinon).
#[derive(Debug, Clone)]
pub struct AdminUser(pub AuthUser);

impl FromRequest for AdminUser {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(extract_auth_user(req).and_then(|user| {
            if user.role == "ADMIN" {
                Ok(AdminUser(user))
            } else {
                Err(forbidden("Accès réservé aux administrateurs"))
            }
        }))
    }
}

/// Extracteur des routes /api/etudiant : exige le rôle ETUDIANT (403 sinon).
#[derive(Debug, Clone)]
pub struct EtudiantUser(pub AuthUser);

impl FromRequest for EtudiantUser {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(extract_auth_user(req).and_then(|user| {
            if user.role == "ETUDIANT" {
                Ok(EtudiantUser(user))
            } else {
                Err(forbidden("Accès réservé aux étudiants"))
            }
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test::TestRequest;

    #[actix_web::test]
    async fn test_missing_header_rejected() {
        let req = TestRequest::default().to_http_request();
        assert!(extract_auth_user(&req).is_err());
    }

    #[actix_web::test]
    async fn test_bad_scheme_rejected() {
        let req = TestRequest::default()
            .insert_header(("Authorization", "Basic abc"))
            .to_http_request();
        assert!(extract_auth_user(&req).is_err());
    }

    #[actix_web::test]
    async fn test_valid_token_accepted() {
        let token = jwt::generate_token("admin", "ADMIN").unwrap();
        let req = TestRequest::default()
            .insert_header(("Authorization", format!("Bearer {}", token)))
            .to_http_request();
        let user = extract_auth_user(&req).unwrap();
        assert_eq!(user.username, "admin");
        assert_eq!(user.role, "ADMIN");
    }

    #[actix_web::test]
    async fn test_role_gate() {
        let token = jwt::generate_token("sara@x.com", "ETUDIANT").unwrap();
        let req = TestRequest::default()
            .insert_header(("Authorization", format!("Bearer {}", token)))
            .to_http_request();
        let mut payload = Payload::None;
        assert!(
            AdminUser::from_request(&req, &mut payload)
                .into_inner()
                .is_err()
        );
        assert!(
            EtudiantUser::from_request(&req, &mut payload)
                .into_inner()
                .is_ok()
        );
    }
}
