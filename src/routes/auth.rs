use actix_web::{HttpResponse, post, web};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};

use crate::error::ServiceError;
use crate::models::dto::{LoginRequest, LoginResponse};
use crate::models::{admin, etudiant};
use crate::utils::{jwt, password};

/// POST /api/auth/login - Connexion (PUBLIC)
///
/// L'annuaire admin est interrogé en premier, puis l'annuaire étudiant.
/// Le même message d'erreur couvre utilisateur inconnu et mot de passe faux.
#[post("/login")]
pub async fn login(
    body: web::Json<LoginRequest>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, ServiceError> {
    let credentials = body.into_inner();

    if let Some(admin) = admin::Entity::find()
        .filter(admin::Column::NomUtilisateur.eq(&credentials.username))
        .one(db.get_ref())
        .await?
    {
        return issue_token(&credentials.password, &admin.mot_de_passe, &admin.nom_utilisateur, admin.role.as_str());
    }

    if let Some(etudiant) = etudiant::Entity::find()
        .filter(etudiant::Column::NomUtilisateur.eq(&credentials.username))
        .one(db.get_ref())
        .await?
    {
        return issue_token(
            &credentials.password,
            &etudiant.mot_de_passe,
            &etudiant.nom_utilisateur,
            etudiant.role.as_str(),
        );
    }

    Err(ServiceError::Unauthorized(
        "Nom d'utilisateur ou mot de passe invalide".to_string(),
    ))
}

fn issue_token(
    raw_password: &str,
    stored_hash: &str,
    username: &str,
    role: &str,
) -> Result<HttpResponse, ServiceError> {
    let valid =
        password::verify_password(raw_password, stored_hash).map_err(ServiceError::Internal)?;
    if !valid {
        return Err(ServiceError::Unauthorized(
            "Nom d'utilisateur ou mot de passe invalide".to_string(),
        ));
    }

    let token = jwt::generate_token(username, role).map_err(ServiceError::Internal)?;
    tracing::info!("User {} logged in with role {}", username, role);

    Ok(HttpResponse::Ok().json(LoginResponse {
        token,
        role: role.to_string(),
    }))
}

pub fn auth_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(web::scope("/auth").service(login));
}
