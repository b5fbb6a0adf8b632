// Génération des documents PDF (attestation de scolarité, relevé de notes).
// genpdf a besoin de vraies polices sur disque pour ses métriques.
use genpdf::Element;
use sea_orm::DatabaseConnection;
use std::time::Duration;

use crate::error::ServiceError;
use crate::models::dto::NoteResponse;
use crate::models::enums::TypeDocument;
use crate::models::etudiant;
use crate::services::etudiant_service::EtudiantService;
use crate::services::note_service::NoteService;

/// Le rendu tourne sur le pool bloquant ; au-delà de ce délai l'appelant
/// reçoit une erreur dédiée plutôt que d'attendre indéfiniment.
const GENERATION_TIMEOUT: Duration = Duration::from_secs(15);

pub struct DocumentService;

impl DocumentService {
    pub async fn generate_document(
        db: &DatabaseConnection,
        type_document: TypeDocument,
        etudiant_id: i32,
    ) -> Result<Vec<u8>, ServiceError> {
        match type_document {
            TypeDocument::AttestationScolarite => Self::generate_attestation(db, etudiant_id).await,
            TypeDocument::ReleveNotes => Self::generate_releve_de_notes(db, etudiant_id).await,
        }
    }

    pub async fn generate_attestation(
        db: &DatabaseConnection,
        etudiant_id: i32,
    ) -> Result<Vec<u8>, ServiceError> {
        let etudiant = EtudiantService::find_by_id(db, etudiant_id).await?;
        Self::render_with_timeout(move || render_attestation(&etudiant)).await
    }

    pub async fn generate_releve_de_notes(
        db: &DatabaseConnection,
        etudiant_id: i32,
    ) -> Result<Vec<u8>, ServiceError> {
        let etudiant = EtudiantService::find_by_id(db, etudiant_id).await?;
        let notes = NoteService::get_notes_by_etudiant(db, etudiant_id).await?;
        Self::render_with_timeout(move || render_releve_de_notes(&etudiant, &notes)).await
    }

    async fn render_with_timeout<F>(render: F) -> Result<Vec<u8>, ServiceError>
    where
        F: FnOnce() -> Result<Vec<u8>, String> + Send + 'static,
    {
        let handle = tokio::task::spawn_blocking(render);
        match tokio::time::timeout(GENERATION_TIMEOUT, handle).await {
            Err(_) => Err(ServiceError::DocumentTimeout),
            Ok(Err(join_err)) => Err(ServiceError::DocumentGeneration(join_err.to_string())),
            Ok(Ok(Err(e))) => Err(ServiceError::DocumentGeneration(e)),
            Ok(Ok(Ok(bytes))) => Ok(bytes),
        }
    }
}

/// Nom de fichier de l'en-tête Content-Disposition.
pub fn pdf_filename(type_document: TypeDocument, nom: &str) -> String {
    match type_document {
        TypeDocument::AttestationScolarite => format!("Attestation_Scolarite_{}.pdf", nom),
        TypeDocument::ReleveNotes => format!("Releve_de_Notes_{}.pdf", nom),
    }
}

fn load_font_family() -> Result<genpdf::fonts::FontFamily<genpdf::fonts::FontData>, String> {
    let font_paths = [
        "/usr/share/fonts/truetype/liberation",
        "/usr/share/fonts/TTF",
        "/System/Library/Fonts/Supplemental",
        "/Library/Fonts",
    ];

    font_paths
        .iter()
        .find(|p| std::path::Path::new(p).exists())
        .and_then(|path| {
            ["LiberationSans", "DejaVuSans", "Arial"]
                .iter()
                .find_map(|name| genpdf::fonts::from_files(*path, name, None).ok())
        })
        .ok_or_else(|| "No suitable fonts found. Install: apt install fonts-liberation".to_string())
}

fn new_document(title: &str) -> Result<genpdf::Document, String> {
    let font_family = load_font_family()?;
    let mut doc = genpdf::Document::new(font_family);
    doc.set_title(title);

    let mut decorator = genpdf::SimplePageDecorator::new();
    decorator.set_margins(10);
    doc.set_page_decorator(decorator);

    let title_style = genpdf::style::Style::new().with_font_size(20);
    doc.push(genpdf::elements::Paragraph::new(title).styled(title_style));
    doc.push(genpdf::elements::Break::new(1.0));

    Ok(doc)
}

fn render_to_bytes(doc: genpdf::Document) -> Result<Vec<u8>, String> {
    let mut buffer = Vec::new();
    doc.render(&mut buffer).map_err(|e| e.to_string())?;
    Ok(buffer)
}

fn render_attestation(etudiant: &etudiant::Model) -> Result<Vec<u8>, String> {
    let mut doc = new_document("Attestation de Scolarité")?;

    doc.push(genpdf::elements::Paragraph::new(
        "Le service de scolarité atteste que l'étudiant(e) :",
    ));
    doc.push(genpdf::elements::Break::new(0.5));
    doc.push(genpdf::elements::Paragraph::new(format!(
        "{} {} - CIN {} - Code Apogée {}",
        etudiant.nom, etudiant.prenom, etudiant.cin, etudiant.code_apogee
    )));
    doc.push(genpdf::elements::Paragraph::new(format!(
        "est inscrit(e) en {} ({}) pour l'année universitaire {}.",
        etudiant.filiere, etudiant.niveau, etudiant.annee_universitaire
    )));
    doc.push(genpdf::elements::Break::new(0.5));

    let date = chrono::Utc::now().format("%d-%m-%Y").to_string();
    doc.push(genpdf::elements::Paragraph::new(format!("Fait le : {}", date)));

    render_to_bytes(doc)
}

fn render_releve_de_notes(
    etudiant: &etudiant::Model,
    notes: &[NoteResponse],
) -> Result<Vec<u8>, String> {
    let mut doc = new_document("Relevé de Notes")?;

    doc.push(genpdf::elements::Paragraph::new(format!(
        "{} {} - {} {} - {}",
        etudiant.nom,
        etudiant.prenom,
        etudiant.filiere,
        etudiant.niveau,
        etudiant.annee_universitaire
    )));
    doc.push(genpdf::elements::Break::new(0.5));

    if notes.is_empty() {
        doc.push(genpdf::elements::Paragraph::new(
            "Aucune note enregistrée pour cet étudiant.",
        ));
    } else {
        for note in notes {
            doc.push(genpdf::elements::Paragraph::new(format!(
                "{} : {}/20",
                note.module, note.valeur
            )));
        }
    }

    let date = chrono::Utc::now().format("%d-%m-%Y").to_string();
    doc.push(genpdf::elements::Break::new(0.5));
    doc.push(genpdf::elements::Paragraph::new(format!("Édité le : {}", date)));

    render_to_bytes(doc)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pdf_filename() {
        assert_eq!(
            pdf_filename(TypeDocument::AttestationScolarite, "El Amrani"),
            "Attestation_Scolarite_El Amrani.pdf"
        );
        assert_eq!(
            pdf_filename(TypeDocument::ReleveNotes, "El Amrani"),
            "Releve_de_Notes_El Amrani.pdf"
        );
    }

    #[tokio::test]
    async fn test_render_failure_maps_to_document_error() {
        let result =
            DocumentService::render_with_timeout(|| Err("template cassé".to_string())).await;
        match result {
            Err(ServiceError::DocumentGeneration(msg)) => assert_eq!(msg, "template cassé"),
            other => panic!("unexpected result: {:?}", other.map(|b| b.len())),
        }
    }

    #[tokio::test]
    async fn test_render_success_returns_bytes() {
        let result = DocumentService::render_with_timeout(|| Ok(vec![1, 2, 3])).await.unwrap();
        assert_eq!(result, vec![1, 2, 3]);
    }
}
