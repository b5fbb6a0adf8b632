// Espace étudiant : l'étudiant est toujours résolu depuis le JWT
// (nom d'utilisateur = email), jamais depuis le corps de la requête.
use actix_web::{HttpResponse, get, post, web};
use sea_orm::DatabaseConnection;
use serde::Deserialize;
use validator::Validate;

use crate::error::ServiceError;
use crate::middleware::EtudiantUser;
use crate::models::dto::EtudiantResponse;
use crate::models::enums::{TypeDocument, TypeInscription, TypePaiement};
use crate::models::etudiant;
use crate::services::demande_service::DemandeService;
use crate::services::etudiant_service::EtudiantService;
use crate::services::inscription_service::InscriptionService;
use crate::services::note_service::NoteService;
use crate::services::paiement_service::PaiementService;
use crate::services::reclamation_service::ReclamationService;
use rust_decimal::Decimal;

// Corps des soumissions étudiantes : pas de triplet d'identité ici.
#[derive(Deserialize)]
pub struct MyDemandeRequest {
    pub type_document: TypeDocument,
}

#[derive(Deserialize, Validate)]
pub struct MyInscriptionRequest {
    pub type_inscription: TypeInscription,
    #[validate(length(min = 1))]
    pub annee_universitaire: String,
}

#[derive(Deserialize)]
pub struct MyPaiementRequest {
    pub type_paiement: TypePaiement,
    pub montant: Decimal,
}

#[derive(Deserialize, Validate)]
pub struct MyReclamationRequest {
    #[validate(length(min = 1))]
    pub sujet: String,
    #[validate(length(min = 1))]
    pub message: String,
}

async fn resolve_etudiant(
    db: &DatabaseConnection,
    user: &EtudiantUser,
) -> Result<etudiant::Model, ServiceError> {
    EtudiantService::find_by_email(db, &user.0.username).await
}

/// GET /api/etudiant/profile - Profil de l'étudiant connecté
#[get("/profile")]
pub async fn get_profile(
    user: EtudiantUser,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, ServiceError> {
    let etudiant = resolve_etudiant(db.get_ref(), &user).await?;
    Ok(HttpResponse::Ok().json(EtudiantResponse::from(&etudiant)))
}

#[get("/notes")]
pub async fn get_my_notes(
    user: EtudiantUser,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, ServiceError> {
    let etudiant = resolve_etudiant(db.get_ref(), &user).await?;
    let notes = NoteService::get_notes_by_etudiant(db.get_ref(), etudiant.id).await?;
    Ok(HttpResponse::Ok().json(notes))
}

#[get("/demandes")]
pub async fn get_my_demandes(
    user: EtudiantUser,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, ServiceError> {
    let etudiant = resolve_etudiant(db.get_ref(), &user).await?;
    let demandes = DemandeService::get_demandes_by_etudiant(db.get_ref(), etudiant.id).await?;
    Ok(HttpResponse::Ok().json(demandes))
}

#[post("/demandes")]
pub async fn create_my_demande(
    user: EtudiantUser,
    body: web::Json<MyDemandeRequest>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, ServiceError> {
    let etudiant = resolve_etudiant(db.get_ref(), &user).await?;
    let demande =
        DemandeService::create_for_etudiant(db.get_ref(), &etudiant, body.type_document).await?;
    Ok(HttpResponse::Created().json(demande))
}

#[get("/inscriptions")]
pub async fn get_my_inscriptions(
    user: EtudiantUser,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, ServiceError> {
    let etudiant = resolve_etudiant(db.get_ref(), &user).await?;
    let inscriptions =
        InscriptionService::get_inscriptions_by_etudiant(db.get_ref(), etudiant.id).await?;
    Ok(HttpResponse::Ok().json(inscriptions))
}

#[post("/inscriptions")]
pub async fn create_my_inscription(
    user: EtudiantUser,
    body: web::Json<MyInscriptionRequest>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, ServiceError> {
    body.validate()
        .map_err(|e| ServiceError::Validation(e.to_string()))?;
    let etudiant = resolve_etudiant(db.get_ref(), &user).await?;

    let request = crate::models::dto::InscriptionRequest {
        etudiant_id: etudiant.id,
        type_inscription: body.type_inscription,
        annee_universitaire: body.into_inner().annee_universitaire,
    };
    let inscription = InscriptionService::create_inscription(db.get_ref(), request).await?;
    Ok(HttpResponse::Created().json(inscription))
}

#[get("/paiements")]
pub async fn get_my_paiements(
    user: EtudiantUser,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, ServiceError> {
    let etudiant = resolve_etudiant(db.get_ref(), &user).await?;
    let paiements = PaiementService::get_paiements_by_etudiant(db.get_ref(), etudiant.id).await?;
    Ok(HttpResponse::Ok().json(paiements))
}

#[post("/paiements")]
pub async fn create_my_paiement(
    user: EtudiantUser,
    body: web::Json<MyPaiementRequest>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, ServiceError> {
    let etudiant = resolve_etudiant(db.get_ref(), &user).await?;
    let paiement = PaiementService::create_for_etudiant(
        db.get_ref(),
        &etudiant,
        body.type_paiement,
        body.montant,
    )
    .await?;
    Ok(HttpResponse::Created().json(paiement))
}

#[get("/reclamations")]
pub async fn get_my_reclamations(
    user: EtudiantUser,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, ServiceError> {
    let etudiant = resolve_etudiant(db.get_ref(), &user).await?;
    let reclamations =
        ReclamationService::get_reclamations_by_etudiant(db.get_ref(), etudiant.id).await?;
    Ok(HttpResponse::Ok().json(reclamations))
}

#[post("/reclamations")]
pub async fn create_my_reclamation(
    user: EtudiantUser,
    body: web::Json<MyReclamationRequest>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, ServiceError> {
    body.validate()
        .map_err(|e| ServiceError::Validation(e.to_string()))?;
    let etudiant = resolve_etudiant(db.get_ref(), &user).await?;

    let request = body.into_inner();
    let reclamation = ReclamationService::create_for_etudiant(
        db.get_ref(),
        &etudiant,
        request.sujet,
        request.message,
    )
    .await?;
    Ok(HttpResponse::Created().json(reclamation))
}

pub fn etudiant_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/etudiant")
            .service(get_profile)
            .service(get_my_notes)
            .service(get_my_demandes)
            .service(create_my_demande)
            .service(get_my_inscriptions)
            .service(create_my_inscription)
            .service(get_my_paiements)
            .service(create_my_paiement)
            .service(get_my_reclamations)
            .service(create_my_reclamation),
    );
}
