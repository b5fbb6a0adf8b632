use chrono::Utc;
use sea_orm::*;
use std::collections::HashMap;

use crate::error::ServiceError;
use crate::models::dto::{InscriptionRequest, InscriptionResponse};
use crate::models::enums::StatusInscription;
use crate::models::{admin, etudiant, inscription};
use crate::services::admin_service::AdminService;
use crate::services::etudiant_service::EtudiantService;

pub struct InscriptionService;

impl InscriptionService {
    /// Contrairement aux autres workflows, l'inscription résout l'étudiant
    /// par son identifiant et non par le triplet d'identité.
    pub async fn create_inscription(
        db: &DatabaseConnection,
        request: InscriptionRequest,
    ) -> Result<InscriptionResponse, ServiceError> {
        let etudiant = EtudiantService::find_by_id(db, request.etudiant_id).await?;

        let new_inscription = inscription::ActiveModel {
            type_inscription: Set(request.type_inscription),
            status: Set(StatusInscription::Enregistre),
            annee_universitaire: Set(request.annee_universitaire),
            date_creation: Set(Utc::now().naive_utc()),
            etudiant_id: Set(etudiant.id),
            ..Default::default()
        };

        let inscription = new_inscription.insert(db).await?;
        tracing::info!("Inscription created successfully with ID: {}", inscription.id);

        Ok(InscriptionResponse::new(&inscription, &etudiant, None))
    }

    pub async fn get_all_inscriptions(
        db: &DatabaseConnection,
    ) -> Result<Vec<InscriptionResponse>, ServiceError> {
        let rows = inscription::Entity::find()
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
        for (inscription, etudiant) in &rows {
            if let Some(etudiant) = etudiant {
                let admin = inscription.admin_id.and_then(|id| admins.get(&id));
                responses.push(InscriptionResponse::new(inscription, etudiant, admin));
            }
        }
        Ok(responses)
    }

    pub async fn get_inscription_by_id(
        db: &DatabaseConnection,
        id: i32,
    ) -> Result<InscriptionResponse, ServiceError> {
        let inscription = Self::find_by_id(db, id).await?;

        let etudiant = EtudiantService::find_by_id(db, inscription.etudiant_id).await?;
        let admin = match inscription.admin_id {
            Some(admin_id) => admin::Entity::find_by_id(admin_id).one(db).await?,
            None => None,
        };
        Ok(InscriptionResponse::new(&inscription, &etudiant, admin.as_ref()))
    }

    pub async fn get_inscriptions_by_etudiant(
        db: &DatabaseConnection,
        etudiant_id: i32,
    ) -> Result<Vec<InscriptionResponse>, ServiceError> {
        let etudiant = EtudiantService::find_by_id(db, etudiant_id).await?;

        let inscriptions = inscription::Entity::find()
            .filter(inscription::Column::EtudiantId.eq(etudiant_id))
            .all(db)
            .await?;

        let admins: HashMap<i32, admin::Model> = admin::Entity::find()
            .all(db)
            .await?
            .into_iter()
            .map(|a| (a.id, a))
            .collect();

        Ok(inscriptions
            .iter()
            .map(|i| {
                let admin = i.admin_id.and_then(|id| admins.get(&id));
                InscriptionResponse::new(i, &etudiant, admin)
            })
            .collect())
    }

    pub async fn confirm_inscription(
        db: &DatabaseConnection,
        id: i32,
        admin_username: &str,
    ) -> Result<InscriptionResponse, ServiceError> {
        Self::decide(db, id, admin_username, StatusInscription::Confirme).await
    }

    pub async fn cancel_inscription(
        db: &DatabaseConnection,
        id: i32,
        admin_username: &str,
    ) -> Result<InscriptionResponse, ServiceError> {
        Self::decide(db, id, admin_username, StatusInscription::Annule).await
    }

    async fn decide(
        db: &DatabaseConnection,
        id: i32,
        admin_username: &str,
        status: StatusInscription,
    ) -> Result<InscriptionResponse, ServiceError> {
        let inscription = Self::find_by_id(db, id).await?;
        let admin = AdminService::find_by_username(db, admin_username).await?;

        let mut active: inscription::ActiveModel = inscription.into();
        active.status = Set(status);
        active.date_confirmation = Set(Some(Utc::now().naive_utc()));
        active.admin_id = Set(Some(admin.id));

        let updated = active.update(db).await?;
        tracing::info!("Inscription with ID: {} updated to {:?}.", id, status);

        let etudiant = EtudiantService::find_by_id(db, updated.etudiant_id).await?;
        Ok(InscriptionResponse::new(&updated, &etudiant, Some(&admin)))
    }

    async fn find_by_id(
        db: &DatabaseConnection,
        id: i32,
    ) -> Result<inscription::Model, ServiceError> {
        inscription::Entity::find_by_id(id)
            .one(db)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Inscription non trouvée avec l'ID: {}", id))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::enums::{Role, TypeInscription};
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

    fn inscription_fixture(status: StatusInscription) -> inscription::Model {
        inscription::Model {
            id: 20,
            type_inscription: TypeInscription::Reinsc,
            status,
            annee_universitaire: "2024/2025".into(),
            date_creation: NaiveDate::from_ymd_opt(2025, 2, 1)
                .unwrap()
                .and_hms_opt(8, 0, 0)
                .unwrap(),
            date_confirmation: None,
            etudiant_id: 1,
            admin_id: None,
        }
    }

    #[tokio::test]
    async fn test_create_with_unknown_student_is_not_found() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<etudiant::Model>::new()])
            .into_connection();

        let request = InscriptionRequest {
            etudiant_id: 99,
            type_inscription: TypeInscription::Master,
            annee_universitaire: "2024/2025".into(),
        };

        let result = InscriptionService::create_inscription(&db, request).await;
        assert!(matches!(result, Err(ServiceError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_create_starts_enregistre() {
        let saved = inscription_fixture(StatusInscription::Enregistre);
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![etudiant_fixture()]])
            .append_query_results([vec![saved.clone()]])
            .append_query_results([vec![saved]])
            .append_exec_results([MockExecResult {
                last_insert_id: 20,
                rows_affected: 1,
            }])
            .into_connection();

        let request = InscriptionRequest {
            etudiant_id: 1,
            type_inscription: TypeInscription::Reinsc,
            annee_universitaire: "2024/2025".into(),
        };

        let response = InscriptionService::create_inscription(&db, request).await.unwrap();
        assert_eq!(response.status, StatusInscription::Enregistre);
        assert!(response.date_confirmation.is_none());
    }

    #[tokio::test]
    async fn test_confirm_sets_status_date_and_admin() {
        let mut decided = inscription_fixture(StatusInscription::Confirme);
        decided.date_confirmation = Some(
            NaiveDate::from_ymd_opt(2025, 2, 3)
                .unwrap()
                .and_hms_opt(11, 0, 0)
                .unwrap(),
        );
        decided.admin_id = Some(7);

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![inscription_fixture(StatusInscription::Enregistre)]])
            .append_query_results([vec![admin_fixture()]])
            .append_query_results([vec![decided]])
            .append_query_results([vec![etudiant_fixture()]])
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 1,
            }])
            .into_connection();

        let response = InscriptionService::confirm_inscription(&db, 20, "admin")
            .await
            .unwrap();

        assert_eq!(response.status, StatusInscription::Confirme);
        assert!(response.date_confirmation.is_some());
        assert_eq!(response.admin.as_ref().unwrap().id, 7);
    }
}
