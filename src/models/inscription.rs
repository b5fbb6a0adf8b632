use serde::{Serialize, Deserialize};
use sea_orm::entity::prelude::*;

use super::enums::{StatusInscription, TypeInscription};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "inscription")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub type_inscription: TypeInscription,
    pub status: StatusInscription,
    pub annee_universitaire: String,
    pub date_creation: DateTime,
    pub date_confirmation: Option<DateTime>,
    pub etudiant_id: i32,
    pub admin_id: Option<i32>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::etudiant::Entity",
        from = "Column::EtudiantId",
        to = "super::etudiant::Column::Id"
    )]
    Etudiant,

    #[sea_orm(
        belongs_to = "super::admin::Entity",
        from = "Column::AdminId",
        to = "super::admin::Column::Id"
    )]
    Admin,
}

impl Related<super::etudiant::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Etudiant.def()
    }
}

impl Related<super::admin::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Admin.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
