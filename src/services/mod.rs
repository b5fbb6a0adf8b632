pub mod admin_service;
pub mod demande_service;
pub mod document_service;
pub mod etudiant_service;
pub mod inscription_service;
pub mod note_service;
pub mod paiement_service;
pub mod reclamation_service;
pub mod statistique_service;
