use chrono::Utc;
use sea_orm::*;
use std::collections::HashMap;

use crate::error::ServiceError;
use crate::models::dto::{DemandeRequest, DemandeResponse};
use crate::models::enums::{StatusDemande, TypeDocument};
use crate::models::{admin, demande, etudiant};
use crate::services::admin_service::AdminService;
use crate::services::etudiant_service::EtudiantService;

pub struct DemandeService;

impl DemandeService {
    /// Création par triplet d'identité (flux admin, ou soumission où
    /// l'étudiant n'est pas encore résolu).
    pub async fn create_demande(
        db: &DatabaseConnection,
        request: DemandeRequest,
    ) -> Result<DemandeResponse, ServiceError> {
        let etudiant =
            EtudiantService::find_by_identity(db, &request.email, request.code_apogee, &request.cin)
                .await?;
        Self::create_for_etudiant(db, &etudiant, request.type_document).await
    }

    /// Noyau de création : garde anti-doublon puis insertion EN_ATTENTE.
    /// Seules les demandes ont cette garde, asymétrie assumée du métier.
    pub async fn create_for_etudiant(
        db: &DatabaseConnection,
        etudiant: &etudiant::Model,
        type_document: TypeDocument,
    ) -> Result<DemandeResponse, ServiceError> {
        let pending = demande::Entity::find()
            .filter(demande::Column::EtudiantId.eq(etudiant.id))
            .filter(demande::Column::Status.eq(StatusDemande::EnAttente))
            .filter(demande::Column::TypeDocument.eq(type_document))
            .one(db)
            .await?;

        if pending.is_some() {
            return Err(ServiceError::Conflict(
                "Une demande en attente existe déjà pour cet étudiant.".to_string(),
            ));
        }

        let new_demande = demande::ActiveModel {
            type_document: Set(type_document),
            status: Set(StatusDemande::EnAttente),
            date_creation: Set(Utc::now().naive_utc()),
            etudiant_id: Set(etudiant.id),
            ..Default::default()
        };

        let demande = new_demande.insert(db).await?;
        tracing::info!("Demande created successfully with ID: {}", demande.id);

        Ok(DemandeResponse::new(&demande, etudiant, None))
    }

    pub async fn get_all_demandes(
        db: &DatabaseConnection,
    ) -> Result<Vec<DemandeResponse>, ServiceError> {
        let rows = demande::Entity::find()
            .find_also_related(etudiant::Entity)
            .all(db)
            .await?;

        let admins: HashMap<i32, admin::Model> = admin::Entity::find()
            .all(db)
            .await?
            .into_iter()
            .map(|a| (a.id, a))
            .collect();

        let mut responses = Vec::with_capacity(rows.len());
        for (demande, etudiant) in &rows {
            if let Some(etudiant) = etudiant {
                let admin = demande.admin_id.and_then(|id| admins.get(&id));
                responses.push(DemandeResponse::new(demande, etudiant, admin));
            }
        }
        Ok(responses)
    }

    pub async fn get_demande_by_id(
        db: &DatabaseConnection,
        id: i32,
    ) -> Result<DemandeResponse, ServiceError> {
        let demande = Self::find_by_id(db, id).await?;
        Self::to_response(db, &demande).await
    }

    pub async fn get_demandes_by_etudiant(
        db: &DatabaseConnection,
        etudiant_id: i32,
    ) -> Result<Vec<DemandeResponse>, ServiceError> {
        let etudiant = EtudiantService::find_by_id(db, etudiant_id).await?;

        let demandes = demande::Entity::find()
            .filter(demande::Column::EtudiantId.eq(etudiant_id))
            .all(db)
            .await?;

        let admins: HashMap<i32, admin::Model> = admin::Entity::find()
            .all(db)
            .await?
            .into_iter()
            .map(|a| (a.id, a))
            .collect();

        Ok(demandes
            .iter()
            .map(|d| {
                let admin = d.admin_id.and_then(|id| admins.get(&id));
                DemandeResponse::new(d, &etudiant, admin)
            })
            .collect())
    }

    pub async fn approve_demande(
        db: &DatabaseConnection,
        id: i32,
        admin_username: &str,
    ) -> Result<DemandeResponse, ServiceError> {
        Self::decide(db, id, admin_username, StatusDemande::Approuvee).await
    }

    pub async fn reject_demande(
        db: &DatabaseConnection,
        id: i32,
        admin_username: &str,
    ) -> Result<DemandeResponse, ServiceError> {
        Self::decide(db, id, admin_username, StatusDemande::Refusee).await
    }

    /// Transition de décision : statut, date de traitement et admin décideur
    /// sont posés dans la même écriture. Une ré-application sur une demande
    /// déjà décidée écrase silencieusement (voulu, voir DESIGN.md).
    async fn decide(
        db: &DatabaseConnection,
        id: i32,
        admin_username: &str,
        status: StatusDemande,
    ) -> Result<DemandeResponse, ServiceError> {
        let demande = Self::find_by_id(db, id).await?;
        let admin = AdminService::find_by_username(db, admin_username).await?;

        let mut active: demande::ActiveModel = demande.into();
        active.status = Set(status);
        active.date_traitement = Set(Some(Utc::now().naive_utc()));
        active.admin_id = Set(Some(admin.id));

        let updated = active.update(db).await?;
        tracing::info!("Demande with ID: {} updated to {:?}.", id, status);

        let etudiant = EtudiantService::find_by_id(db, updated.etudiant_id).await?;
        Ok(DemandeResponse::new(&updated, &etudiant, Some(&admin)))
    }

    pub async fn find_by_id(
        db: &DatabaseConnection,
        id: i32,
    ) -> Result<demande::Model, ServiceError> {
        demande::Entity::find_by_id(id)
            .one(db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Demande non trouvée avec l'ID: {}", id)))
    }

    async fn to_response(
        db: &DatabaseConnection,
        demande: &demande::Model,
    ) -> Result<DemandeResponse, ServiceError> {
        let etudiant = EtudiantService::find_by_id(db, demande.etudiant_id).await?;
        let admin = match demande.admin_id {
            Some(admin_id) => admin::Entity::find_by_id(admin_id).one(db).await?,
            None => None,
        };
        Ok(DemandeResponse::new(demande, &etudiant, admin.as_ref()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::enums::Role;
    use chrono::NaiveDate;

    fn etudiant_fixture() -> etudiant::Model {
        etudiant::Model {
            id: 1,
            nom: "El Amrani".into(),
            prenom: "Sara".into(),
            email: "a@x.com".into(),
            code_apogee: 123,
            cin: "C1".into(),
            filiere: "GI".into(),
            niveau: "S3".into(),
            annee_universitaire: "2024/2025".into(),
            nom_utilisateur: "a@x.com".into(),
            mot_de_passe: "hash".into(),
            role: Role::Etudiant,
        }
    }

    fn admin_fixture() -> admin::Model {
        admin::Model {
            id: 7,
            nom: "Admin".into(),
            prenom: "System".into(),
            cin: "ADMIN001".into(),
            nom_utilisateur: "admin".into(),
            mot_de_passe: "hash".into(),
            role: Role::Admin,
        }
    }

    fn demande_fixture(status: StatusDemande) -> demande::Model {
        demande::Model {
            id: 10,
            type_document: TypeDocument::AttestationScolarite,
            status,
            date_creation: NaiveDate::from_ymd_opt(2025, 1, 15)
                .unwrap()
                .and_hms_opt(9, 0, 0)
                .unwrap(),
            date_traitement: None,
            etudiant_id: 1,
            admin_id: None,
        }
    }

    #[tokio::test]
    async fn test_create_rejects_duplicate_pending() {
        // La garde trouve une demande EN_ATTENTE du même type
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![demande_fixture(StatusDemande::EnAttente)]])
            .into_connection();

        let result = DemandeService::create_for_etudiant(
            &db,
            &etudiant_fixture(),
            TypeDocument::AttestationScolarite,
        )
        .await;

        assert!(matches!(result, Err(ServiceError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_create_starts_pending() {
        let saved = demande_fixture(StatusDemande::EnAttente);
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            // garde anti-doublon : rien en attente
            .append_query_results([Vec::<demande::Model>::new()])
            // insertion
            .append_query_results([vec![saved.clone()]])
            .append_query_results([vec![saved]])
            .append_exec_results([MockExecResult {
                last_insert_id: 10,
                rows_affected: 1,
            }])
            .into_connection();

        let response = DemandeService::create_for_etudiant(
            &db,
            &etudiant_fixture(),
            TypeDocument::AttestationScolarite,
        )
        .await
        .unwrap();

        assert_eq!(response.status, StatusDemande::EnAttente);
        assert_eq!(response.etudiant.id, 1);
        assert!(response.admin.is_none());
        assert!(response.date_traitement.is_none());
    }

    #[tokio::test]
    async fn test_create_with_unknown_identity_is_not_found() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<etudiant::Model>::new()])
            .into_connection();

        let request = DemandeRequest {
            email: "a@x.com".into(),
            code_apogee: 123,
            cin: "C1".into(),
            type_document: TypeDocument::AttestationScolarite,
        };

        let result = DemandeService::create_demande(&db, request).await;
        assert!(matches!(result, Err(ServiceError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_approve_sets_status_date_and_admin() {
        let mut decided = demande_fixture(StatusDemande::Approuvee);
        decided.date_traitement = Some(
            NaiveDate::from_ymd_opt(2025, 1, 20)
                .unwrap()
                .and_hms_opt(10, 0, 0)
                .unwrap(),
        );
        decided.admin_id = Some(7);

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![demande_fixture(StatusDemande::EnAttente)]])
            .append_query_results([vec![admin_fixture()]])
            .append_query_results([vec![decided]])
            .append_query_results([vec![etudiant_fixture()]])
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 1,
            }])
            .into_connection();

        let response = DemandeService::approve_demande(&db, 10, "admin").await.unwrap();

        assert_eq!(response.status, StatusDemande::Approuvee);
        assert!(response.date_traitement.is_some());
        assert_eq!(response.admin.as_ref().unwrap().id, 7);
    }

    #[tokio::test]
    async fn test_decide_with_missing_admin_is_not_found() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![demande_fixture(StatusDemande::EnAttente)]])
            .append_query_results([Vec::<admin::Model>::new()])
            .into_connection();

        let result = DemandeService::reject_demande(&db, 10, "ghost").await;
        assert!(matches!(result, Err(ServiceError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_get_by_id_missing_is_not_found() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<demande::Model>::new()])
            .into_connection();

        let result = DemandeService::get_demande_by_id(&db, 999).await;
        assert!(matches!(result, Err(ServiceError::NotFound(_))));
    }
}
