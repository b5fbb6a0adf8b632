// Modèles de données : une table PostgreSQL par module SeaORM.
//
// L'héritage Utilisateur -> Admin/Etudiant du modèle métier est aplati en
// deux tables portant chacune les colonnes d'identité (nom_utilisateur,
// mot_de_passe, role).
//
// Modules:
//   - enums        : rôles, statuts et types des workflows (stockés en texte)
//   - etudiant     : profil étudiant, propriétaire de tous les workflows
//   - admin        : compte administrateur, acteur des décisions
//   - demande      : demande de document (attestation, relevé de notes)
//   - inscription  : inscription à une année universitaire
//   - paiement     : paiement de frais
//   - reclamation  : réclamation étudiante
//   - note         : note par module d'enseignement
//   - dto          : Data Transfer Objects des requêtes/réponses API

pub mod enums;
pub mod etudiant;
pub mod admin;
pub mod demande;
pub mod inscription;
pub mod paiement;
pub mod reclamation;
pub mod note;
pub mod dto;
