use chrono::Utc;
use sea_orm::*;
use std::collections::HashMap;

use crate::error::ServiceError;
use crate::models::dto::{PaiementRequest, PaiementResponse};
use crate::models::enums::{StatusPaiement, TypePaiement};
use crate::models::{admin, etudiant, paiement};
use crate::services::admin_service::AdminService;
use crate::services::etudiant_service::EtudiantService;
use rust_decimal::Decimal;

pub struct PaiementService;

impl PaiementService {
    pub async fn create_paiement(
        db: &DatabaseConnection,
        request: PaiementRequest,
    ) -> Result<PaiementResponse, ServiceError> {
        let etudiant =
            EtudiantService::find_by_identity(db, &request.email, request.code_apogee, &request.cin)
                .await?;
        Self::create_for_etudiant(db, &etudiant, request.type_paiement, request.montant).await
    }

    pub async fn create_for_etudiant(
        db: &DatabaseConnection,
        etudiant: &etudiant::Model,
        type_paiement: TypePaiement,
        montant: Decimal,
    ) -> Result<PaiementResponse, ServiceError> {
        let new_paiement = paiement::ActiveModel {
            type_paiement: Set(type_paiement),
            status: Set(StatusPaiement::NonPaye),
            montant: Set(montant),
            date_creation: Set(Utc::now().naive_utc()),
            etudiant_id: Set(etudiant.id),
            ..Default::default()
        };

        let paiement = new_paiement.insert(db).await?;
        tracing::info!("Paiement created successfully with ID: {}", paiement.id);

        Ok(PaiementResponse::new(&paiement, etudiant, None))
    }

    pub async fn get_all_paiements(
        db: &DatabaseConnection,
    ) -> Result<Vec<PaiementResponse>, ServiceError> {
        let rows = paiement::Entity::find()
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
        for (paiement, etudiant) in &rows {
            if let Some(etudiant) = etudiant {
                let admin = paiement.admin_id.and_then(|id| admins.get(&id));
                responses.push(PaiementResponse::new(paiement, etudiant, admin));
            }
        }
        Ok(responses)
    }

    pub async fn get_paiement_by_id(
        db: &DatabaseConnection,
        id: i32,
    ) -> Result<PaiementResponse, ServiceError> {
        let paiement = Self::find_by_id(db, id).await?;

        let etudiant = EtudiantService::find_by_id(db, paiement.etudiant_id).await?;
        let admin = match paiement.admin_id {
            Some(admin_id) => admin::Entity::find_by_id(admin_id).one(db).await?,
            None => None,
        };
        Ok(PaiementResponse::new(&paiement, &etudiant, admin.as_ref()))
    }

    pub async fn get_paiements_by_etudiant(
        db: &DatabaseConnection,
        etudiant_id: i32,
    ) -> Result<Vec<PaiementResponse>, ServiceError> {
        let etudiant = EtudiantService::find_by_id(db, etudiant_id).await?;

        let paiements = paiement::Entity::find()
            .filter(paiement::Column::EtudiantId.eq(etudiant_id))
            .all(db)
            .await?;

        let admins: HashMap<i32, admin::Model> = admin::Entity::find()
            .all(db)
            .await?
            .into_iter()
            .map(|a| (a.id, a))
            .collect();

        Ok(paiements
            .iter()
            .map(|p| {
                let admin = p.admin_id.and_then(|id| admins.get(&id));
                PaiementResponse::new(p, &etudiant, admin)
            })
            .collect())
    }

    pub async fn pay_paiement(
        db: &DatabaseConnection,
        id: i32,
        admin_username: &str,
    ) -> Result<PaiementResponse, ServiceError> {
        let paiement = Self::find_by_id(db, id).await?;
        let admin = AdminService::find_by_username(db, admin_username).await?;

        let mut active: paiement::ActiveModel = paiement.into();
        active.status = Set(StatusPaiement::Paye);
        active.date_paiement = Set(Some(Utc::now().naive_utc()));
        active.admin_id = Set(Some(admin.id));

        let updated = active.update(db).await?;
        tracing::info!("Paiement with ID: {} updated to PAYE.", id);

        let etudiant = EtudiantService::find_by_id(db, updated.etudiant_id).await?;
        Ok(PaiementResponse::new(&updated, &etudiant, Some(&admin)))
    }

    /// Transition inverse : le retour à NON_PAYE efface la date de paiement
    /// au lieu d'en poser une.
    pub async fn cancel_paiement(
        db: &DatabaseConnection,
        id: i32,
        admin_username: &str,
    ) -> Result<PaiementResponse, ServiceError> {
        let paiement = Self::find_by_id(db, id).await?;
        let admin = AdminService::find_by_username(db, admin_username).await?;

        let mut active: paiement::ActiveModel = paiement.into();
        active.status = Set(StatusPaiement::NonPaye);
        active.date_paiement = Set(None);
        active.admin_id = Set(Some(admin.id));

        let updated = active.update(db).await?;
        tracing::info!("Paiement with ID: {} updated to NON_PAYE.", id);

        let etudiant = EtudiantService::find_by_id(db, updated.etudiant_id).await?;
        Ok(PaiementResponse::new(&updated, &etudiant, Some(&admin)))
    }

    async fn find_by_id(
        db: &DatabaseConnection,
        id: i32,
    ) -> Result<paiement::Model, ServiceError> {
        paiement::Entity::find_by_id(id)
            .one(db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Paiement non trouvé avec l'ID: {}", id)))
    }
}
