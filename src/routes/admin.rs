// Surface d'administration : tout passe par l'extracteur AdminUser,
// le nom d'utilisateur du JWT identifie l'admin décideur.
use actix_web::{HttpResponse, delete, get, post, put, web};
use sea_orm::DatabaseConnection;
use validator::Validate;

use crate::error::ServiceError;
use crate::middleware::AdminUser;
use crate::models::dto::{
    AdminRequest, DemandeRequest, EtudiantRequest, InscriptionRequest, NoteRequest,
    PaiementRequest, ReclamationRequest, TreatReclamationRequest,
};
use crate::services::admin_service::AdminService;
use crate::services::demande_service::DemandeService;
use crate::services::document_service::{DocumentService, pdf_filename};
use crate::services::etudiant_service::EtudiantService;
use crate::services::inscription_service::InscriptionService;
use crate::services::note_service::NoteService;
use crate::services::paiement_service::PaiementService;
use crate::services::reclamation_service::ReclamationService;
use crate::services::statistique_service::StatistiqueService;

fn check<T: Validate>(body: &T) -> Result<(), ServiceError> {
    body.validate()
        .map_err(|e| ServiceError::Validation(e.to_string()))
}

// ---------------------------------------------------------------------------
// Demandes
// ---------------------------------------------------------------------------

#[get("/demandes")]
pub async fn get_all_demandes(
    _admin: AdminUser,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, ServiceError> {
    let demandes = DemandeService::get_all_demandes(db.get_ref()).await?;
    Ok(HttpResponse::Ok().json(demandes))
}

#[get("/demandes/{id}")]
pub async fn get_demande(
    _admin: AdminUser,
    path: web::Path<i32>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, ServiceError> {
    let demande = DemandeService::get_demande_by_id(db.get_ref(), path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(demande))
}

#[post("/demandes")]
pub async fn create_demande(
    _admin: AdminUser,
    body: web::Json<DemandeRequest>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, ServiceError> {
    check(&*body)?;
    let demande = DemandeService::create_demande(db.get_ref(), body.into_inner()).await?;
    Ok(HttpResponse::Created().json(demande))
}

#[put("/demandes/{id}/approve")]
pub async fn approve_demande(
    admin: AdminUser,
    path: web::Path<i32>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, ServiceError> {
    let demande =
        DemandeService::approve_demande(db.get_ref(), path.into_inner(), &admin.0.username).await?;
    Ok(HttpResponse::Ok().json(demande))
}

#[put("/demandes/{id}/reject")]
pub async fn reject_demande(
    admin: AdminUser,
    path: web::Path<i32>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, ServiceError> {
    let demande =
        DemandeService::reject_demande(db.get_ref(), path.into_inner(), &admin.0.username).await?;
    Ok(HttpResponse::Ok().json(demande))
}

/// GET /api/admin/demandes/{id}/pdf - Document PDF de la demande,
/// servi en pièce jointe.
#[get("/demandes/{id}/pdf")]
pub async fn download_demande_pdf(
    _admin: AdminUser,
    path: web::Path<i32>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, ServiceError> {
    let demande = DemandeService::find_by_id(db.get_ref(), path.into_inner()).await?;
    let etudiant = EtudiantService::find_by_id(db.get_ref(), demande.etudiant_id).await?;

    let bytes =
        DocumentService::generate_document(db.get_ref(), demande.type_document, etudiant.id)
            .await?;
    let filename = pdf_filename(demande.type_document, &etudiant.nom);

    Ok(HttpResponse::Ok()
        .content_type("application/pdf")
        .insert_header((
            "Content-Disposition",
            format!("attachment; filename=\"{}\"", filename),
        ))
        .body(bytes))
}

// ---------------------------------------------------------------------------
// Etudiants
// ---------------------------------------------------------------------------

#[get("/etudiants")]
pub async fn get_all_etudiants(
    _admin: AdminUser,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, ServiceError> {
    let etudiants = EtudiantService::get_all_etudiants(db.get_ref()).await?;
    Ok(HttpResponse::Ok().json(etudiants))
}

#[get("/etudiants/{id}")]
pub async fn get_etudiant(
    _admin: AdminUser,
    path: web::Path<i32>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, ServiceError> {
    let etudiant = EtudiantService::get_etudiant_by_id(db.get_ref(), path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(etudiant))
}

#[post("/etudiants")]
pub async fn create_etudiant(
    _admin: AdminUser,
    body: web::Json<EtudiantRequest>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, ServiceError> {
    check(&*body)?;
    let etudiant = EtudiantService::create_etudiant(db.get_ref(), body.into_inner()).await?;
    Ok(HttpResponse::Created().json(etudiant))
}

#[put("/etudiants/{id}")]
pub async fn update_etudiant(
    _admin: AdminUser,
    path: web::Path<i32>,
    body: web::Json<EtudiantRequest>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, ServiceError> {
    check(&*body)?;
    let etudiant =
        EtudiantService::update_etudiant(db.get_ref(), path.into_inner(), body.into_inner())
            .await?;
    Ok(HttpResponse::Ok().json(etudiant))
}

#[delete("/etudiants/{id}")]
pub async fn delete_etudiant(
    _admin: AdminUser,
    path: web::Path<i32>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, ServiceError> {
    EtudiantService::delete_etudiant(db.get_ref(), path.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}

#[get("/etudiants/{id}/notes")]
pub async fn get_notes_etudiant(
    _admin: AdminUser,
    path: web::Path<i32>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, ServiceError> {
    let notes = NoteService::get_notes_by_etudiant(db.get_ref(), path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(notes))
}

// ---------------------------------------------------------------------------
// Notes
// ---------------------------------------------------------------------------

#[post("/notes")]
pub async fn add_note(
    _admin: AdminUser,
    body: web::Json<NoteRequest>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, ServiceError> {
    check(&*body)?;
    let note = NoteService::add_note(db.get_ref(), body.into_inner()).await?;
    Ok(HttpResponse::Created().json(note))
}

#[put("/notes/{id}")]
pub async fn update_note(
    _admin: AdminUser,
    path: web::Path<i32>,
    body: web::Json<NoteRequest>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, ServiceError> {
    check(&*body)?;
    let note = NoteService::update_note(db.get_ref(), path.into_inner(), body.into_inner()).await?;
    Ok(HttpResponse::Ok().json(note))
}

#[delete("/notes/{id}")]
pub async fn delete_note(
    _admin: AdminUser,
    path: web::Path<i32>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, ServiceError> {
    NoteService::delete_note(db.get_ref(), path.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}

// ---------------------------------------------------------------------------
// Inscriptions
// ---------------------------------------------------------------------------

#[get("/inscriptions")]
pub async fn get_all_inscriptions(
    _admin: AdminUser,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, ServiceError> {
    let inscriptions = InscriptionService::get_all_inscriptions(db.get_ref()).await?;
    Ok(HttpResponse::Ok().json(inscriptions))
}

#[get("/inscriptions/{id}")]
pub async fn get_inscription(
    _admin: AdminUser,
    path: web::Path<i32>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, ServiceError> {
    let inscription =
        InscriptionService::get_inscription_by_id(db.get_ref(), path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(inscription))
}

#[post("/inscriptions")]
pub async fn create_inscription(
    _admin: AdminUser,
    body: web::Json<InscriptionRequest>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, ServiceError> {
    check(&*body)?;
    let inscription =
        InscriptionService::create_inscription(db.get_ref(), body.into_inner()).await?;
    Ok(HttpResponse::Created().json(inscription))
}

#[put("/inscriptions/{id}/confirm")]
pub async fn confirm_inscription(
    admin: AdminUser,
    path: web::Path<i32>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, ServiceError> {
    let inscription =
        InscriptionService::confirm_inscription(db.get_ref(), path.into_inner(), &admin.0.username)
            .await?;
    Ok(HttpResponse::Ok().json(inscription))
}

#[put("/inscriptions/{id}/cancel")]
pub async fn cancel_inscription(
    admin: AdminUser,
    path: web::Path<i32>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, ServiceError> {
    let inscription =
        InscriptionService::cancel_inscription(db.get_ref(), path.into_inner(), &admin.0.username)
            .await?;
    Ok(HttpResponse::Ok().json(inscription))
}

// ---------------------------------------------------------------------------
// Paiements
// ---------------------------------------------------------------------------

#[get("/paiements")]
pub async fn get_all_paiements(
    _admin: AdminUser,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, ServiceError> {
    let paiements = PaiementService::get_all_paiements(db.get_ref()).await?;
    Ok(HttpResponse::Ok().json(paiements))
}

#[get("/paiements/{id}")]
pub async fn get_paiement(
    _admin: AdminUser,
    path: web::Path<i32>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, ServiceError> {
    let paiement = PaiementService::get_paiement_by_id(db.get_ref(), path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(paiement))
}

#[post("/paiements")]
pub async fn create_paiement(
    _admin: AdminUser,
    body: web::Json<PaiementRequest>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, ServiceError> {
    check(&*body)?;
    let paiement = PaiementService::create_paiement(db.get_ref(), body.into_inner()).await?;
    Ok(HttpResponse::Created().json(paiement))
}

#[put("/paiements/{id}/pay")]
pub async fn pay_paiement(
    admin: AdminUser,
    path: web::Path<i32>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, ServiceError> {
    let paiement =
        PaiementService::pay_paiement(db.get_ref(), path.into_inner(), &admin.0.username).await?;
    Ok(HttpResponse::Ok().json(paiement))
}

#[put("/paiements/{id}/cancel")]
pub async fn cancel_paiement(
    admin: AdminUser,
    path: web::Path<i32>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, ServiceError> {
    let paiement =
        PaiementService::cancel_paiement(db.get_ref(), path.into_inner(), &admin.0.username)
            .await?;
    Ok(HttpResponse::Ok().json(paiement))
}

// ---------------------------------------------------------------------------
// Reclamations
// ---------------------------------------------------------------------------

#[get("/reclamations")]
pub async fn get_all_reclamations(
    _admin: AdminUser,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, ServiceError> {
    let reclamations = ReclamationService::get_all_reclamations(db.get_ref()).await?;
    Ok(HttpResponse::Ok().json(reclamations))
}

#[get("/reclamations/{id}")]
pub async fn get_reclamation(
    _admin: AdminUser,
    path: web::Path<i32>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, ServiceError> {
    let reclamation =
        ReclamationService::get_reclamation_by_id(db.get_ref(), path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(reclamation))
}

#[post("/reclamations")]
pub async fn create_reclamation(
    _admin: AdminUser,
    body: web::Json<ReclamationRequest>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, ServiceError> {
    check(&*body)?;
    let reclamation =
        ReclamationService::create_reclamation(db.get_ref(), body.into_inner()).await?;
    Ok(HttpResponse::Created().json(reclamation))
}

#[put("/reclamations/{id}/treat")]
pub async fn treat_reclamation(
    admin: AdminUser,
    path: web::Path<i32>,
    body: web::Json<TreatReclamationRequest>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, ServiceError> {
    check(&*body)?;
    let reclamation = ReclamationService::treat_reclamation(
        db.get_ref(),
        path.into_inner(),
        &admin.0.username,
        body.into_inner().reponse,
    )
    .await?;
    Ok(HttpResponse::Ok().json(reclamation))
}

// ---------------------------------------------------------------------------
// Admins
// ---------------------------------------------------------------------------

#[get("/admins")]
pub async fn get_all_admins(
    _admin: AdminUser,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, ServiceError> {
    let admins = AdminService::get_all_admins(db.get_ref()).await?;
    Ok(HttpResponse::Ok().json(admins))
}

#[get("/admins/{id}")]
pub async fn get_admin(
    _admin: AdminUser,
    path: web::Path<i32>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, ServiceError> {
    let admin = AdminService::get_admin_by_id(db.get_ref(), path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(admin))
}

#[post("/admins")]
pub async fn create_admin(
    _admin: AdminUser,
    body: web::Json<AdminRequest>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, ServiceError> {
    check(&*body)?;
    let admin = AdminService::create_admin(db.get_ref(), body.into_inner()).await?;
    Ok(HttpResponse::Created().json(admin))
}

#[put("/admins/{id}")]
pub async fn update_admin(
    _admin: AdminUser,
    path: web::Path<i32>,
    body: web::Json<AdminRequest>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, ServiceError> {
    check(&*body)?;
    let admin =
        AdminService::update_admin(db.get_ref(), path.into_inner(), body.into_inner()).await?;
    Ok(HttpResponse::Ok().json(admin))
}

#[delete("/admins/{id}")]
pub async fn delete_admin(
    _admin: AdminUser,
    path: web::Path<i32>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, ServiceError> {
    AdminService::delete_admin(db.get_ref(), path.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}

// ---------------------------------------------------------------------------
// Statistiques
// ---------------------------------------------------------------------------

#[get("/statistiques")]
pub async fn get_statistiques(
    _admin: AdminUser,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, ServiceError> {
    let stats = StatistiqueService::get_statistiques(db.get_ref()).await?;
    Ok(HttpResponse::Ok().json(stats))
}

pub fn admin_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/admin")
            .service(get_all_demandes)
            .service(create_demande)
            // routes fixes avant les routes paramétrées du même préfixe
            .service(download_demande_pdf)
            .service(approve_demande)
            .service(reject_demande)
            .service(get_demande)
            .service(get_all_etudiants)
            .service(create_etudiant)
            .service(get_notes_etudiant)
            .service(update_etudiant)
            .service(delete_etudiant)
            .service(get_etudiant)
            .service(add_note)
            .service(update_note)
            .service(delete_note)
            .service(get_all_inscriptions)
            .service(create_inscription)
            .service(confirm_inscription)
            .service(cancel_inscription)
            .service(get_inscription)
            .service(get_all_paiements)
            .service(create_paiement)
            .service(pay_paiement)
            .service(cancel_paiement)
            .service(get_paiement)
            .service(get_all_reclamations)
            .service(create_reclamation)
            .service(treat_reclamation)
            .service(get_reclamation)
            .service(get_all_admins)
            .service(create_admin)
            .service(update_admin)
            .service(delete_admin)
            .service(get_admin)
            .service(get_statistiques),
    );
}
