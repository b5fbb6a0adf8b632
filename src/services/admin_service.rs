use sea_orm::*;

use crate::error::ServiceError;
use crate::models::admin;
use crate::models::dto::{AdminRequest, AdminResponse};
use crate::models::enums::Role;
use crate::utils::password;

pub struct AdminService;

impl AdminService {
    /// Résout l'admin authentifié par son nom d'utilisateur. Une
    /// incohérence entre "authentifié" et "présent dans l'annuaire"
    /// est remontée comme NotFound, jamais ignorée.
    pub async fn find_by_username(
        db: &DatabaseConnection,
        username: &str,
    ) -> Result<admin::Model, ServiceError> {
        admin::Entity::find()
            .filter(admin::Column::NomUtilisateur.eq(username))
            .one(db)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Admin not found with username: {}", username))
            })
    }

    /// Le rôle est forcé à ADMIN quelle que soit la requête.
    pub async fn create_admin(
        db: &DatabaseConnection,
        request: AdminRequest,
    ) -> Result<AdminResponse, ServiceError> {
        let mot_de_passe =
            password::hash_password(&request.mot_de_passe).map_err(ServiceError::Internal)?;

        let new_admin = admin::ActiveModel {
            nom: Set(request.nom),
            prenom: Set(request.prenom),
            cin: Set(request.cin),
            nom_utilisateur: Set(request.nom_utilisateur),
            mot_de_passe: Set(mot_de_passe),
            role: Set(Role::Admin),
            ..Default::default()
        };

        let admin = new_admin.insert(db).await?;
        tracing::info!("Admin created with ID: {}", admin.id);

        Ok(AdminResponse::from(&admin))
    }

    pub async fn get_all_admins(db: &DatabaseConnection) -> Result<Vec<AdminResponse>, ServiceError> {
        let admins = admin::Entity::find().all(db).await?;
        Ok(admins.iter().map(AdminResponse::from).collect())
    }

    pub async fn get_admin_by_id(
        db: &DatabaseConnection,
        id: i32,
    ) -> Result<AdminResponse, ServiceError> {
        let admin = admin::Entity::find_by_id(id)
            .one(db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Admin not found with id: {}", id)))?;
        Ok(AdminResponse::from(&admin))
    }

    pub async fn update_admin(
        db: &DatabaseConnection,
        id: i32,
        request: AdminRequest,
    ) -> Result<AdminResponse, ServiceError> {
        let admin = admin::Entity::find_by_id(id)
            .one(db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Admin not found with id: {}", id)))?;

        let mot_de_passe =
            password::hash_password(&request.mot_de_passe).map_err(ServiceError::Internal)?;

        let mut active: admin::ActiveModel = admin.into();
        active.nom = Set(request.nom);
        active.prenom = Set(request.prenom);
        active.cin = Set(request.cin);
        active.nom_utilisateur = Set(request.nom_utilisateur);
        active.mot_de_passe = Set(mot_de_passe);

        let updated = active.update(db).await?;
        tracing::info!("Admin updated with ID: {}", id);

        Ok(AdminResponse::from(&updated))
    }

    /// Compte administrateur par défaut, créé au démarrage s'il n'existe
    /// pas encore. Idempotent : un second démarrage ne fait rien.
    pub async fn seed_default_admin(db: &DatabaseConnection) -> Result<(), ServiceError> {
        let existing = admin::Entity::find()
            .filter(admin::Column::NomUtilisateur.eq("admin"))
            .one(db)
            .await?;

        if existing.is_some() {
            return Ok(());
        }

        let mot_de_passe = password::hash_password("admin").map_err(ServiceError::Internal)?;
        let default_admin = admin::ActiveModel {
            nom: Set("Admin".to_string()),
            prenom: Set("System".to_string()),
            cin: Set("ADMIN001".to_string()),
            nom_utilisateur: Set("admin".to_string()),
            mot_de_passe: Set(mot_de_passe),
            role: Set(Role::Admin),
            ..Default::default()
        };
        let admin = default_admin.insert(db).await?;
        tracing::info!("Default admin account created with ID: {}", admin.id);
        Ok(())
    }

    pub async fn delete_admin(db: &DatabaseConnection, id: i32) -> Result<(), ServiceError> {
        let admin = admin::Entity::find_by_id(id)
            .one(db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Admin not found with id: {}", id)))?;

        admin.delete(db).await?;
        tracing::info!("Admin deleted with ID: {}", id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

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

    #[tokio::test]
    async fn test_find_by_username_found() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![admin_fixture()]])
            .into_connection();

        let admin = AdminService::find_by_username(&db, "admin").await.unwrap();
        assert_eq!(admin.id, 7);
        assert_eq!(admin.role, Role::Admin);
    }

    #[tokio::test]
    async fn test_find_by_username_missing_is_not_found() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<admin::Model>::new()])
            .into_connection();

        let result = AdminService::find_by_username(&db, "ghost").await;
        assert!(matches!(result, Err(ServiceError::NotFound(_))));
    }
}
