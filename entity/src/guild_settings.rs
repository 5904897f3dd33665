use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "guild_settings")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub guild_id: String,
    /// JSON array of role ids
    #[sea_orm(column_type = "Text")]
    pub ban_roles: String,
    pub auto_role_id: Option<String>,
    pub verify_channel_id: Option<String>,
    pub verify_role_id: Option<String>,
    pub anti_raid_enabled: bool,
    pub anti_raid_threshold: i32,
    pub anti_raid_timeframe_ms: i64,
    pub log_channel_id: Option<String>,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
