use serde::{Serialize, Deserialize};
use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "note")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub module: String,
    pub valeur: Decimal,
    pub etudiant_id: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::etudiant::Entity",
        from = "Column::EtudiantId",
        to = "super::etudiant::Column::Id"
    )]
    Etudiant,
}

impl Related<super::etudiant::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Etudiant.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
