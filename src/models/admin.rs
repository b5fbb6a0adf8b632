use serde::{Serialize, Deserialize};
use sea_orm::entity::prelude::*;

use super::enums::Role;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "admin")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub nom: String,
    pub prenom: String,
    pub cin: String,
    // Colonnes d'identité partagées avec la table etudiant
    pub nom_utilisateur: String,
    #[serde(skip_serializing)]
    pub mot_de_passe: String,
    pub role: Role,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::demande::Entity")]
    Demande,

    #[sea_orm(has_many = "super::inscription::Entity")]
    Inscription,

    #[sea_orm(has_many = "super::paiement::Entity")]
    Paiement,

    #[sea_orm(has_many = "super::reclamation::Entity")]
    Reclamation,
}

impl Related<super::demande::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Demande.def()
    }
}

impl Related<super::inscription::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Inscription.def()
    }
}

impl Related<super::paiement::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Paiement.def()
    }
}

impl Related<super::reclamation::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Reclamation.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
