// DTOs des requêtes et des réponses de l'API
use rust_decimal::Decimal;
use sea_orm::prelude::DateTime;
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::enums::{
    Role, StatusDemande, StatusInscription, StatusPaiement, StatusReclamation, TypeDocument,
    TypeInscription, TypePaiement,
};
use super::{admin, demande, etudiant, inscription, note, paiement, reclamation};

/// Les dates sont exposées au format dd-MM-yyyy, comme le frontend les attend.
pub fn format_date(date: &DateTime) -> String {
    date.format("%d-%m-%Y").to_string()
}

fn format_date_opt(date: &Option<DateTime>) -> Option<String> {
    date.as_ref().map(format_date)
}

// ---------------------------------------------------------------------------
// Authentification
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub role: String,
}

// ---------------------------------------------------------------------------
// Etudiant
// ---------------------------------------------------------------------------

#[derive(Deserialize, Validate)]
pub struct EtudiantRequest {
    #[validate(length(min = 1))]
    pub nom: String,
    #[validate(length(min = 1))]
    pub prenom: String,
    #[validate(email)]
    pub email: String,
    pub code_apogee: i32,
    #[validate(length(min = 1))]
    pub cin: String,
    pub filiere: String,
    pub niveau: String,
    pub annee_universitaire: String,
}

#[derive(Serialize)]
pub struct EtudiantResponse {
    pub id: i32,
    pub nom: String,
    pub prenom: String,
    pub email: String,
    pub code_apogee: i32,
    pub cin: String,
    pub filiere: String,
    pub niveau: String,
    pub annee_universitaire: String,
}

impl From<&etudiant::Model> for EtudiantResponse {
    fn from(e: &etudiant::Model) -> Self {
        EtudiantResponse {
            id: e.id,
            nom: e.nom.clone(),
            prenom: e.prenom.clone(),
            email: e.email.clone(),
            code_apogee: e.code_apogee,
            cin: e.cin.clone(),
            filiere: e.filiere.clone(),
            niveau: e.niveau.clone(),
            annee_universitaire: e.annee_universitaire.clone(),
        }
    }
}

/// Sous-ensemble embarqué dans les réponses des workflows.
#[derive(Serialize)]
pub struct EtudiantBasic {
    pub id: i32,
    pub nom: String,
    pub prenom: String,
    pub email: String,
    pub code_apogee: i32,
    pub cin: String,
}

impl From<&etudiant::Model> for EtudiantBasic {
    fn from(e: &etudiant::Model) -> Self {
        EtudiantBasic {
            id: e.id,
            nom: e.nom.clone(),
            prenom: e.prenom.clone(),
            email: e.email.clone(),
            code_apogee: e.code_apogee,
            cin: e.cin.clone(),
        }
    }
}

// ---------------------------------------------------------------------------
// Admin
// ---------------------------------------------------------------------------

#[derive(Deserialize, Validate)]
pub struct AdminRequest {
    #[validate(length(min = 1))]
    pub nom: String,
    #[validate(length(min = 1))]
    pub prenom: String,
    #[validate(length(min = 1))]
    pub cin: String,
    #[validate(length(min = 1))]
    pub nom_utilisateur: String,
    #[validate(length(min = 4))]
    pub mot_de_passe: String,
}

#[derive(Serialize)]
pub struct AdminResponse {
    pub id: i32,
    pub nom_utilisateur: String,
    pub role: Role,
    pub nom: String,
    pub prenom: String,
    pub cin: String,
}

impl From<&admin::Model> for AdminResponse {
    fn from(a: &admin::Model) -> Self {
        AdminResponse {
            id: a.id,
            nom_utilisateur: a.nom_utilisateur.clone(),
            role: a.role,
            nom: a.nom.clone(),
            prenom: a.prenom.clone(),
            cin: a.cin.clone(),
        }
    }
}

#[derive(Serialize)]
pub struct AdminBasic {
    pub id: i32,
    pub nom: String,
    pub prenom: String,
}

impl From<&admin::Model> for AdminBasic {
    fn from(a: &admin::Model) -> Self {
        AdminBasic {
            id: a.id,
            nom: a.nom.clone(),
            prenom: a.prenom.clone(),
        }
    }
}

// ---------------------------------------------------------------------------
// Note
// ---------------------------------------------------------------------------

#[derive(Deserialize, Validate)]
pub struct NoteRequest {
    pub etudiant_id: i32,
    #[validate(length(min = 1))]
    pub module: String,
    pub valeur: Decimal,
}

#[derive(Serialize)]
pub struct NoteResponse {
    pub id: i32,
    pub module: String,
    pub valeur: Decimal,
    pub etudiant_id: i32,
}

impl From<&note::Model> for NoteResponse {
    fn from(n: &note::Model) -> Self {
        NoteResponse {
            id: n.id,
            module: n.module.clone(),
            valeur: n.valeur,
            etudiant_id: n.etudiant_id,
        }
    }
}

// ---------------------------------------------------------------------------
// Demande
// ---------------------------------------------------------------------------

#[derive(Deserialize, Validate)]
pub struct DemandeRequest {
    #[validate(email)]
    pub email: String,
    pub code_apogee: i32,
    #[validate(length(min = 1))]
    pub cin: String,
    pub type_document: TypeDocument,
}

#[derive(Serialize)]
pub struct DemandeResponse {
    pub id: i32,
    pub type_document: TypeDocument,
    pub status: StatusDemande,
    pub date_creation: String,
    pub date_traitement: Option<String>,
    pub etudiant: EtudiantBasic,
    pub admin: Option<AdminBasic>,
}

impl DemandeResponse {
    pub fn new(
        d: &demande::Model,
        etudiant: &etudiant::Model,
        admin: Option<&admin::Model>,
    ) -> Self {
        DemandeResponse {
            id: d.id,
            type_document: d.type_document,
            status: d.status,
            date_creation: format_date(&d.date_creation),
            date_traitement: format_date_opt(&d.date_traitement),
            etudiant: etudiant.into(),
            admin: admin.map(Into::into),
        }
    }
}

// ---------------------------------------------------------------------------
// Inscription
// ---------------------------------------------------------------------------

#[derive(Deserialize, Validate)]
pub struct InscriptionRequest {
    pub etudiant_id: i32,
    pub type_inscription: TypeInscription,
    #[validate(length(min = 1))]
    pub annee_universitaire: String,
}

#[derive(Serialize)]
pub struct InscriptionResponse {
    pub id: i32,
    pub type_inscription: TypeInscription,
    pub status: StatusInscription,
    pub annee_universitaire: String,
    pub date_creation: String,
    pub date_confirmation: Option<String>,
    pub etudiant: EtudiantBasic,
    pub admin: Option<AdminBasic>,
}

impl InscriptionResponse {
    pub fn new(
        i: &inscription::Model,
        etudiant: &etudiant::Model,
        admin: Option<&admin::Model>,
    ) -> Self {
        InscriptionResponse {
            id: i.id,
            type_inscription: i.type_inscription,
            status: i.status,
            annee_universitaire: i.annee_universitaire.clone(),
            date_creation: format_date(&i.date_creation),
            date_confirmation: format_date_opt(&i.date_confirmation),
            etudiant: etudiant.into(),
            admin: admin.map(Into::into),
        }
    }
}

// ---------------------------------------------------------------------------
// Paiement
// ---------------------------------------------------------------------------

#[derive(Deserialize, Validate)]
pub struct PaiementRequest {
    #[validate(email)]
    pub email: String,
    pub code_apogee: i32,
    #[validate(length(min = 1))]
    pub cin: String,
    pub type_paiement: TypePaiement,
    pub montant: Decimal,
}

#[derive(Serialize)]
pub struct PaiementResponse {
    pub id: i32,
    pub type_paiement: TypePaiement,
    pub status: StatusPaiement,
    pub montant: Decimal,
    pub date_creation: String,
    pub date_paiement: Option<String>,
    pub etudiant: EtudiantBasic,
    pub admin: Option<AdminBasic>,
}

impl PaiementResponse {
    pub fn new(
        p: &paiement::Model,
        etudiant: &etudiant::Model,
        admin: Option<&admin::Model>,
    ) -> Self {
        PaiementResponse {
            id: p.id,
            type_paiement: p.type_paiement,
            status: p.status,
            montant: p.montant,
            date_creation: format_date(&p.date_creation),
            date_paiement: format_date_opt(&p.date_paiement),
            etudiant: etudiant.into(),
            admin: admin.map(Into::into),
        }
    }
}

// ---------------------------------------------------------------------------
// Reclamation
// ---------------------------------------------------------------------------

#[derive(Deserialize, Validate)]
pub struct ReclamationRequest {
    #[validate(email)]
    pub email: String,
    pub code_apogee: i32,
    #[validate(length(min = 1))]
    pub cin: String,
    #[validate(length(min = 1))]
    pub sujet: String,
    #[validate(length(min = 1))]
    pub message: String,
}

#[derive(Deserialize, Validate)]
pub struct TreatReclamationRequest {
    #[validate(length(min = 1))]
    pub reponse: String,
}

#[derive(Serialize)]
pub struct ReclamationResponse {
    pub id: i32,
    pub sujet: String,
    pub message: String,
    pub status: StatusReclamation,
    pub date_creation: String,
    pub date_traitement: Option<String>,
    pub reponse: Option<String>,
    pub etudiant: EtudiantBasic,
    pub admin: Option<AdminBasic>,
}

impl ReclamationResponse {
    pub fn new(
        r: &reclamation::Model,
        etudiant: &etudiant::Model,
        admin: Option<&admin::Model>,
    ) -> Self {
        ReclamationResponse {
            id: r.id,
            sujet: r.sujet.clone(),
            message: r.message.clone(),
            status: r.status,
            date_creation: format_date(&r.date_creation),
            date_traitement: format_date_opt(&r.date_traitement),
            reponse: r.reponse.clone(),
            etudiant: etudiant.into(),
            admin: admin.map(Into::into),
        }
    }
}

// ---------------------------------------------------------------------------
// Statistiques
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct CompteurParStatus {
    pub status: String,
    pub total: u64,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct CompteurMensuel<T: Serialize> {
    pub mois: u32,
    #[serde(rename = "type")]
    pub kind: T,
    pub total: u64,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct CompteurJournalier {
    pub jour: String,
    pub total: u64,
}

#[derive(Serialize)]
pub struct StatistiquesDemandes {
    pub par_status: Vec<CompteurParStatus>,
    pub temps_moyen_traitement_jours: Option<f64>,
}

#[derive(Serialize)]
pub struct StatistiquesInscriptions {
    pub par_status: Vec<CompteurParStatus>,
    pub temps_moyen_traitement_jours: Option<f64>,
    pub par_mois: Vec<CompteurMensuel<TypeInscription>>,
}

#[derive(Serialize)]
pub struct StatistiquesPaiements {
    pub par_status: Vec<CompteurParStatus>,
    pub temps_moyen_traitement_jours: Option<f64>,
    pub par_mois: Vec<CompteurMensuel<TypePaiement>>,
}

#[derive(Serialize)]
pub struct StatistiquesReclamations {
    pub par_status: Vec<CompteurParStatus>,
    pub temps_moyen_traitement_jours: Option<f64>,
    pub par_jour_semaine: Vec<CompteurJournalier>,
    pub taux_satisfaction: Option<f64>,
}

#[derive(Serialize)]
pub struct StatistiquesResponse {
    pub demandes: StatistiquesDemandes,
    pub inscriptions: StatistiquesInscriptions,
    pub paiements: StatistiquesPaiements,
    pub reclamations: StatistiquesReclamations,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_format_date() {
        let d = NaiveDate::from_ymd_opt(2025, 3, 7)
            .unwrap()
            .and_hms_opt(14, 30, 0)
            .unwrap();
        assert_eq!(format_date(&d), "07-03-2025");
    }

    #[test]
    fn test_etudiant_request_rejects_bad_email() {
        let req = EtudiantRequest {
            nom: "El Amrani".into(),
            prenom: "Sara".into(),
            email: "not-an-email".into(),
            code_apogee: 123,
            cin: "C1".into(),
            filiere: "GI".into(),
            niveau: "S3".into(),
            annee_universitaire: "2024/2025".into(),
        };
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_treat_reclamation_requires_reponse() {
        let req = TreatReclamationRequest { reponse: "".into() };
        assert!(req.validate().is_err());
    }
}
