use sea_orm::*;

use crate::error::ServiceError;
use crate::models::dto::{NoteRequest, NoteResponse};
use crate::models::note;
use crate::services::etudiant_service::EtudiantService;

pub struct NoteService;

impl NoteService {
    pub async fn add_note(
        db: &DatabaseConnection,
        request: NoteRequest,
    ) -> Result<NoteResponse, ServiceError> {
        let etudiant = EtudiantService::find_by_id(db, request.etudiant_id).await?;

        let new_note = note::ActiveModel {
            module: Set(request.module),
            valeur: Set(request.valeur),
            etudiant_id: Set(etudiant.id),
            ..Default::default()
        };

        let note = new_note.insert(db).await?;
        tracing::info!("Note added for etudiant ID: {}", note.etudiant_id);

        Ok(NoteResponse::from(&note))
    }

    pub async fn get_notes_by_etudiant(
        db: &DatabaseConnection,
        etudiant_id: i32,
    ) -> Result<Vec<NoteResponse>, ServiceError> {
        let notes = note::Entity::find()
            .filter(note::Column::EtudiantId.eq(etudiant_id))
            .all(db)
            .await?;
        Ok(notes.iter().map(NoteResponse::from).collect())
    }

    pub async fn update_note(
        db: &DatabaseConnection,
        id: i32,
        request: NoteRequest,
    ) -> Result<NoteResponse, ServiceError> {
        let note = note::Entity::find_by_id(id)
            .one(db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Note not found with ID: {}", id)))?;

        let mut active: note::ActiveModel = note.into();
        active.module = Set(request.module);
        active.valeur = Set(request.valeur);

        let updated = active.update(db).await?;
        tracing::info!("Note updated with ID: {}", id);

        Ok(NoteResponse::from(&updated))
    }

    pub async fn delete_note(db: &DatabaseConnection, id: i32) -> Result<(), ServiceError> {
        let note = note::Entity::find_by_id(id)
            .one(db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Note not found with ID: {}", id)))?;

        note.delete(db).await?;
        tracing::info!("Note deleted with ID: {}", id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_add_note_requires_existing_student() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<crate::models::etudiant::Model>::new()])
            .into_connection();

        let request = NoteRequest {
            etudiant_id: 42,
            module: "Analyse".into(),
            valeur: rust_decimal::Decimal::new(155, 1),
        };

        let result = NoteService::add_note(&db, request).await;
        assert!(matches!(result, Err(ServiceError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_delete_missing_note_is_not_found() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<note::Model>::new()])
            .into_connection();

        let result = NoteService::delete_note(&db, 3).await;
        assert!(matches!(result, Err(ServiceError::NotFound(_))));
    }
}
