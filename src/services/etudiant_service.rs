use sea_orm::*;

use crate::error::ServiceError;
use crate::models::dto::{EtudiantRequest, EtudiantResponse};
use crate::models::enums::Role;
use crate::models::{demande, etudiant, inscription, note, paiement, reclamation};
use crate::utils::password;

/// Mot de passe initial des comptes étudiants créés par l'administration.
/// Aucun flux de réinitialisation forcée n'existe : c'est une dette connue,
/// documentée dans DESIGN.md.
const DEFAULT_STUDENT_PASSWORD: &str = "password";

pub struct EtudiantService;

impl EtudiantService {
    /// Résolution par le triplet d'identité (email, code Apogée, CIN),
    /// utilisé par les créations de demandes/paiements/réclamations.
    pub async fn find_by_identity(
        db: &DatabaseConnection,
        email: &str,
        code_apogee: i32,
        cin: &str,
    ) -> Result<etudiant::Model, ServiceError> {
        etudiant::Entity::find()
            .filter(etudiant::Column::Email.eq(email))
            .filter(etudiant::Column::CodeApogee.eq(code_apogee))
            .filter(etudiant::Column::Cin.eq(cin))
            .one(db)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(
                    "Étudiant non trouvé avec les informations fournies.".to_string(),
                )
            })
    }

    pub async fn find_by_email(
        db: &DatabaseConnection,
        email: &str,
    ) -> Result<etudiant::Model, ServiceError> {
        etudiant::Entity::find()
            .filter(etudiant::Column::Email.eq(email))
            .one(db)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Etudiant not found with email: {}", email))
            })
    }

    pub async fn find_by_id(
        db: &DatabaseConnection,
        id: i32,
    ) -> Result<etudiant::Model, ServiceError> {
        etudiant::Entity::find_by_id(id)
            .one(db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Etudiant not found with ID: {}", id)))
    }

    /// Crée le profil et synthétise les colonnes d'identité :
    /// nom_utilisateur = email, mot de passe par défaut hashé, rôle ETUDIANT.
    pub async fn create_etudiant(
        db: &DatabaseConnection,
        request: EtudiantRequest,
    ) -> Result<EtudiantResponse, ServiceError> {
        let mot_de_passe = password::hash_password(DEFAULT_STUDENT_PASSWORD)
            .map_err(ServiceError::Internal)?;

        let new_etudiant = etudiant::ActiveModel {
            nom: Set(request.nom),
            prenom: Set(request.prenom),
            email: Set(request.email.clone()),
            code_apogee: Set(request.code_apogee),
            cin: Set(request.cin),
            filiere: Set(request.filiere),
            niveau: Set(request.niveau),
            annee_universitaire: Set(request.annee_universitaire),
            nom_utilisateur: Set(request.email),
            mot_de_passe: Set(mot_de_passe),
            role: Set(Role::Etudiant),
            ..Default::default()
        };

        let etudiant = new_etudiant.insert(db).await?;
        tracing::info!("Etudiant created with ID: {}", etudiant.id);

        Ok(EtudiantResponse::from(&etudiant))
    }

    pub async fn get_all_etudiants(
        db: &DatabaseConnection,
    ) -> Result<Vec<EtudiantResponse>, ServiceError> {
        let etudiants = etudiant::Entity::find().all(db).await?;
        Ok(etudiants.iter().map(EtudiantResponse::from).collect())
    }

    pub async fn get_etudiant_by_id(
        db: &DatabaseConnection,
        id: i32,
    ) -> Result<EtudiantResponse, ServiceError> {
        let etudiant = Self::find_by_id(db, id).await?;
        Ok(EtudiantResponse::from(&etudiant))
    }

    /// Met à jour le profil. Le prénom, le nom d'utilisateur et le mot de
    /// passe ne sont volontairement pas touchés.
    pub async fn update_etudiant(
        db: &DatabaseConnection,
        id: i32,
        request: EtudiantRequest,
    ) -> Result<EtudiantResponse, ServiceError> {
        let etudiant = Self::find_by_id(db, id).await?;

        let mut active: etudiant::ActiveModel = etudiant.into();
        active.nom = Set(request.nom);
        active.email = Set(request.email);
        active.code_apogee = Set(request.code_apogee);
        active.cin = Set(request.cin);
        active.filiere = Set(request.filiere);
        active.niveau = Set(request.niveau);
        active.annee_universitaire = Set(request.annee_universitaire);

        let updated = active.update(db).await?;
        tracing::info!("Etudiant updated with ID: {}", id);

        Ok(EtudiantResponse::from(&updated))
    }

    /// Suppression définitive. Les lignes dépendantes (notes et les quatre
    /// workflows) sont retirées dans la même transaction avant l'étudiant,
    /// pour que la cascade soit un contrat explicite et non un effet de bord.
    pub async fn delete_etudiant(db: &DatabaseConnection, id: i32) -> Result<(), ServiceError> {
        let etudiant = Self::find_by_id(db, id).await?;

        let txn = db.begin().await?;

        note::Entity::delete_many()
            .filter(note::Column::EtudiantId.eq(id))
            .exec(&txn)
            .await?;
        demande::Entity::delete_many()
            .filter(demande::Column::EtudiantId.eq(id))
            .exec(&txn)
            .await?;
        inscription::Entity::delete_many()
            .filter(inscription::Column::EtudiantId.eq(id))
            .exec(&txn)
            .await?;
        paiement::Entity::delete_many()
            .filter(paiement::Column::EtudiantId.eq(id))
            .exec(&txn)
            .await?;
        reclamation::Entity::delete_many()
            .filter(reclamation::Column::EtudiantId.eq(id))
            .exec(&txn)
            .await?;
        etudiant.delete(&txn).await?;

        txn.commit().await?;
        tracing::info!("Etudiant deleted with ID: {}", id);

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

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

    #[tokio::test]
    async fn test_find_by_identity_not_found() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<etudiant::Model>::new()])
            .into_connection();

        let result = EtudiantService::find_by_identity(&db, "a@x.com", 123, "C1").await;
        assert!(matches!(result, Err(ServiceError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_find_by_identity_found() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![etudiant_fixture()]])
            .into_connection();

        let etudiant = EtudiantService::find_by_identity(&db, "a@x.com", 123, "C1")
            .await
            .unwrap();
        assert_eq!(etudiant.id, 1);
        assert_eq!(etudiant.cin, "C1");
    }

    #[tokio::test]
    async fn test_delete_cascades_before_student() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![etudiant_fixture()]])
            .append_exec_results(vec![
                MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 2,
                };
                6
            ])
            .into_connection();

        EtudiantService::delete_etudiant(&db, 1).await.unwrap();

        // 1 SELECT + 6 DELETE dans la transaction
        let log = db.into_transaction_log();
        assert!(!log.is_empty());
    }

    #[tokio::test]
    async fn test_delete_missing_student_is_not_found() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<etudiant::Model>::new()])
            .into_connection();

        let result = EtudiantService::delete_etudiant(&db, 99).await;
        assert!(matches!(result, Err(ServiceError::NotFound(_))));
    }
}
