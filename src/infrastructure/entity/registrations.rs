use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "registrations")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub full_name: String,
    #[sea_orm(column_type = "String(StringLen::N(11))", unique)]
    pub national_id: String,
    #[sea_orm(column_type = "String(StringLen::N(32))")]
    pub employer: String,
    pub has_bonus: bool,
    #[sea_orm(column_type = "Text", nullable)]
    pub image_url: Option<String>,
    pub registered_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
