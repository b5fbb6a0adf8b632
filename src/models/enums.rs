use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    #[sea_orm(string_value = "ADMIN")]
    Admin,
    #[sea_orm(string_value = "ETUDIANT")]
    Etudiant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "ADMIN",
            Role::Etudiant => "ETUDIANT",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TypeDocument {
    #[sea_orm(string_value = "ATTESTATION_SCOLARITE")]
    AttestationScolarite,
    #[sea_orm(string_value = "RELEVE_NOTES")]
    ReleveNotes,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StatusDemande {
    #[sea_orm(string_value = "EN_ATTENTE")]
    EnAttente,
    #[sea_orm(string_value = "APPROUVEE")]
    Approuvee,
    #[sea_orm(string_value = "REFUSEE")]
    Refusee,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TypeInscription {
    #[sea_orm(string_value = "MASTER")]
    Master,
    #[sea_orm(string_value = "DOCTORAT")]
    Doctorat,
    #[sea_orm(string_value = "REINSC")]
    Reinsc,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StatusInscription {
    #[sea_orm(string_value = "ENREGISTRE")]
    Enregistre,
    #[sea_orm(string_value = "CONFIRME")]
    Confirme,
    #[sea_orm(string_value = "ANNULE")]
    Annule,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TypePaiement {
    #[sea_orm(string_value = "FRAIS_INSCRIPTION")]
    FraisInscription,
    #[sea_orm(string_value = "FRAIS_SCOLARITE")]
    FraisScolarite,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StatusPaiement {
    #[sea_orm(string_value = "NON_PAYE")]
    NonPaye,
    #[sea_orm(string_value = "PAYE")]
    Paye,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StatusReclamation {
    #[sea_orm(string_value = "EN_ATTENTE")]
    EnAttente,
    #[sea_orm(string_value = "TRAITEE")]
    Traitee,
}
