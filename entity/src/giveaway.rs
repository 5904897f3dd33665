use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "giveaway")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub message_id: String,
    pub channel_id: String,
    pub guild_id: String,
    #[sea_orm(column_type = "Text")]
    pub prize: String,
    pub winner_count: i32,
    pub end_time: DateTimeUtc,
    pub creator_id: String,
    pub active: bool,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::giveaway_entry::Entity")]
    GiveawayEntry,
}

impl Related<super::giveaway_entry::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::GiveawayEntry.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
