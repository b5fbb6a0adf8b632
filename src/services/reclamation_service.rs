use chrono::Utc;
use sea_orm::*;
use std::collections::HashMap;

use crate::error::ServiceError;
use crate::models::dto::{ReclamationRequest, ReclamationResponse};
use crate::models::enums::StatusReclamation;
use crate::models::{admin, etudiant, reclamation};
use crate::services::admin_service::AdminService;
use crate::services::etudiant_service::EtudiantService;

pub struct ReclamationService;

impl ReclamationService {
    pub async fn create_reclamation(
        db: &DatabaseConnection,
        request: ReclamationRequest,
    ) -> Result<ReclamationResponse, ServiceError> {
        let etudiant =
            EtudiantService::find_by_identity(db, &request.email, request.code_apogee, &request.cin)
                .await?;
        Self::create_for_etudiant(db, &etudiant, request.sujet, request.message).await
    }

    pub async fn create_for_etudiant(
        db: &DatabaseConnection,
        etudiant: &etudiant::Model,
        sujet: String,
        message: String,
    ) -> Result<ReclamationResponse, ServiceError> {
        let new_reclamation = reclamation::ActiveModel {
            sujet: Set(sujet),
            message: Set(message),
            status: Set(StatusReclamation::EnAttente),
            date_creation: Set(Utc::now().naive_utc()),
            etudiant_id: Set(etudiant.id),
            ..Default::default()
        };

        let reclamation = new_reclamation.insert(db).await?;
        tracing::info!("Reclamation created successfully with ID: {}", reclamation.id);

        Ok(ReclamationResponse::new(&reclamation, etudiant, None))
    }

    pub async fn get_all_reclamations(
        db: &DatabaseConnection,
    ) -> Result<Vec<ReclamationResponse>, ServiceError> {
        let rows = reclamation::Entity::find()
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
        for (reclamation, etudiant) in &rows {
            if let Some(etudiant) = etudiant {
                let admin = reclamation.admin_id.and_then(|id| admins.get(&id));
                responses.push(ReclamationResponse::new(reclamation, etudiant, admin));
            }
        }
        Ok(responses)
    }

    pub async fn get_reclamation_by_id(
        db: &DatabaseConnection,
        id: i32,
    ) -> Result<ReclamationResponse, ServiceError> {
        let reclamation = Self::find_by_id(db, id).await?;

        let etudiant = EtudiantService::find_by_id(db, reclamation.etudiant_id).await?;
        let admin = match reclamation.admin_id {
            Some(admin_id) => admin::Entity::find_by_id(admin_id).one(db).await?,
            None => None,
        };
        Ok(ReclamationResponse::new(&reclamation, &etudiant, admin.as_ref()))
    }

    pub async fn get_reclamations_by_etudiant(
        db: &DatabaseConnection,
        etudiant_id: i32,
    ) -> Result<Vec<ReclamationResponse>, ServiceError> {
        let etudiant = EtudiantService::find_by_id(db, etudiant_id).await?;

        let reclamations = reclamation::Entity::find()
            .filter(reclamation::Column::EtudiantId.eq(etudiant_id))
            .all(db)
            .await?;

        let admins: HashMap<i32, admin::Model> = admin::Entity::find()
            .all(db)
            .await?
            .into_iter()
            .map(|a| (a.id, a))
            .collect();

        Ok(reclamations
            .iter()
            .map(|r| {
                let admin = r.admin_id.and_then(|id| admins.get(&id));
                ReclamationResponse::new(r, &etudiant, admin)
            })
            .collect())
    }

    /// Traite la réclamation : réponse, statut TRAITEE, date de traitement
    /// et admin décideur posés ensemble.
    pub async fn treat_reclamation(
        db: &DatabaseConnection,
        id: i32,
        admin_username: &str,
        reponse: String,
    ) -> Result<ReclamationResponse, ServiceError> {
        let reclamation = Self::find_by_id(db, id).await?;
        let admin = AdminService::find_by_username(db, admin_username).await?;

        let mut active: reclamation::ActiveModel = reclamation.into();
        active.reponse = Set(Some(reponse));
        active.status = Set(StatusReclamation::Traitee);
        active.date_traitement = Set(Some(Utc::now().naive_utc()));
        active.admin_id = Set(Some(admin.id));

        let updated = active.update(db).await?;
        tracing::info!("Reclamation with ID: {} processed successfully.", id);

        let etudiant = EtudiantService::find_by_id(db, updated.etudiant_id).await?;
        Ok(ReclamationResponse::new(&updated, &etudiant, Some(&admin)))
    }

    async fn find_by_id(
        db: &DatabaseConnection,
        id: i32,
    ) -> Result<reclamation::Model, ServiceError> {
        reclamation::Entity::find_by_id(id)
            .one(db)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Réclamation non trouvée avec l'id {}", id))
            })
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

    fn reclamation_fixture(status: StatusReclamation) -> reclamation::Model {
        reclamation::Model {
            id: 40,
            sujet: "Absence de note".into(),
            message: "Ma note d'Analyse n'apparaît pas.".into(),
            status,
            date_creation: NaiveDate::from_ymd_opt(2025, 4, 1)
                .unwrap()
                .and_hms_opt(8, 0, 0)
                .unwrap(),
            date_traitement: None,
            reponse: None,
            etudiant_id: 1,
            admin_id: None,
        }
    }

    #[tokio::test]
    async fn test_create_starts_en_attente() {
        let saved = reclamation_fixture(StatusReclamation::EnAttente);
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![saved.clone()]])
            .append_query_results([vec![saved]])
            .append_exec_results([MockExecResult {
                last_insert_id: 40,
                rows_affected: 1,
            }])
            .into_connection();

        let response = ReclamationService::create_for_etudiant(
            &db,
            &etudiant_fixture(),
            "Absence de note".into(),
            "Ma note d'Analyse n'apparaît pas.".into(),
        )
        .await
        .unwrap();

        assert_eq!(response.status, StatusReclamation::EnAttente);
        assert!(response.reponse.is_none());
    }

    #[tokio::test]
    async fn test_treat_sets_reponse_status_date_and_admin() {
        let mut treated = reclamation_fixture(StatusReclamation::Traitee);
        treated.reponse = Some("La note a été ajoutée.".into());
        treated.date_traitement = Some(
            NaiveDate::from_ymd_opt(2025, 4, 2)
                .unwrap()
                .and_hms_opt(10, 0, 0)
                .unwrap(),
        );
        treated.admin_id = Some(7);

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![reclamation_fixture(StatusReclamation::EnAttente)]])
            .append_query_results([vec![admin_fixture()]])
            .append_query_results([vec![treated]])
            .append_query_results([vec![etudiant_fixture()]])
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 1,
            }])
            .into_connection();

        let response =
            ReclamationService::treat_reclamation(&db, 40, "admin", "La note a été ajoutée.".into())
                .await
                .unwrap();

        assert_eq!(response.status, StatusReclamation::Traitee);
        assert_eq!(response.reponse.as_deref(), Some("La note a été ajoutée."));
        assert!(response.date_traitement.is_some());
        assert_eq!(response.admin.as_ref().unwrap().id, 7);
    }

    #[tokio::test]
    async fn test_treat_missing_reclamation_is_not_found() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<reclamation::Model>::new()])
            .into_connection();

        let result = ReclamationService::treat_reclamation(&db, 404, "admin", "r".into()).await;
        assert!(matches!(result, Err(ServiceError::NotFound(_))));
    }
}
