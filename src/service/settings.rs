//! Guild configuration: anti-raid, auto-role, verification, ban roles and the
//! log channel, plus the cards of the interactive `/settings` menu.

use serenity::all::{
    ChannelId, CreateActionRow, CreateEmbed, CreateSelectMenu, CreateSelectMenuKind,
    CreateSelectMenuOption, GuildId, RoleId,
};
use sea_orm::DatabaseConnection;

use crate::{
    config::Config,
    data::guild_settings::GuildSettingsRepository,
    error::AppError,
    model::guild_settings::{AntiRaidConfig, GuildSettings, UpdateGuildSettingsParam},
    service::embed::INFO_COLOR,
};

pub const SETTINGS_MENU_ID: &str = "settings_menu";
pub const BAN_ROLES_SELECT_ID: &str = "settings_ban_roles";
pub const LOG_CHANNEL_SELECT_ID: &str = "settings_log_channel";

/// Most ban roles a guild can configure through the menu.
pub const MAX_BAN_ROLES: u8 = 10;

const ENABLED_COLOR: u32 = 0x51cf66;
const DISABLED_COLOR: u32 = 0xff6b6b;

fn role_mention(id: u64) -> String {
    format!("<@&{}>", id)
}

fn channel_mention(id: u64) -> String {
    format!("<#{}>", id)
}

fn ban_roles_text(settings: Option<&GuildSettings>) -> String {
    match settings {
        Some(settings) if !settings.ban_roles.is_empty() => settings
            .ban_roles
            .iter()
            .map(|id| role_mention(*id))
            .collect::<Vec<_>>()
            .join(", "),
        _ => "None set".to_string(),
    }
}

fn optional_mention(id: Option<u64>, mention: fn(u64) -> String) -> String {
    id.map(mention).unwrap_or_else(|| "Not set".to_string())
}

/// Section of the `/settings` menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingsSection {
    BanRoles,
    AutoRole,
    Verification,
    AntiRaid,
    LogChannel,
}

impl SettingsSection {
    pub const ALL: [SettingsSection; 5] = [
        Self::BanRoles,
        Self::AutoRole,
        Self::Verification,
        Self::AntiRaid,
        Self::LogChannel,
    ];

    pub fn value(&self) -> &'static str {
        match self {
            Self::BanRoles => "ban_roles",
            Self::AutoRole => "auto_role",
            Self::Verification => "verification",
            Self::AntiRaid => "anti_raid",
            Self::LogChannel => "log_channel",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|section| section.value() == value)
    }

    fn option(&self) -> CreateSelectMenuOption {
        let (label, description, emoji) = match self {
            Self::BanRoles => ("Ban Roles", "Configure which roles can use ban commands", '🔨'),
            Self::AutoRole => ("Auto Role", "Set up automatic role assignment", '🎭'),
            Self::Verification => ("Verification", "Configure verification system", '✅'),
            Self::AntiRaid => ("Anti-Raid", "Configure anti-raid protection", '🛡'),
            Self::LogChannel => ("Log Channel", "Set the channel for bot logs", '📝'),
        };

        CreateSelectMenuOption::new(label, self.value())
            .description(description)
            .emoji(emoji)
    }
}

/// Overview card and section menu shown by `/settings`.
pub fn overview(settings: Option<&GuildSettings>) -> (CreateEmbed, CreateActionRow) {
    let anti_raid = AntiRaidConfig::resolve(settings);

    let card = CreateEmbed::new()
        .title("⚙️ Server Settings")
        .description("Configure your server settings using the dropdown menu below.")
        .color(INFO_COLOR)
        .field("🔨 Ban Roles", ban_roles_text(settings), true)
        .field(
            "🎭 Auto Role",
            optional_mention(settings.and_then(|s| s.auto_role_id), role_mention),
            true,
        )
        .field(
            "✅ Verify Channel",
            optional_mention(settings.and_then(|s| s.verify_channel_id), channel_mention),
            true,
        )
        .field(
            "🛡️ Anti-Raid",
            if anti_raid.enabled { "Enabled" } else { "Disabled" },
            true,
        )
        .field(
            "📝 Log Channel",
            optional_mention(settings.and_then(|s| s.log_channel_id), channel_mention),
            true,
        );

    let menu = CreateSelectMenu::new(
        SETTINGS_MENU_ID,
        CreateSelectMenuKind::String {
            options: SettingsSection::ALL.iter().map(|s| s.option()).collect(),
        },
    )
    .placeholder("Select a setting to configure...");

    (card, CreateActionRow::SelectMenu(menu))
}

/// Detail card for one section, with the select that edits it where one exists.
pub fn section_detail(
    section: SettingsSection,
    settings: Option<&GuildSettings>,
) -> (CreateEmbed, Vec<CreateActionRow>) {
    let card = CreateEmbed::new().color(INFO_COLOR);

    match section {
        SettingsSection::BanRoles => {
            let card = card
                .title("🔨 Ban Roles Configuration")
                .description("Members with any of these roles may use `/ban`.")
                .field("Current Ban Roles", ban_roles_text(settings), false);

            let defaults = settings
                .map(|s| s.ban_roles.iter().map(|id| RoleId::new(*id)).collect())
                .unwrap_or_default();
            let select = CreateSelectMenu::new(
                BAN_ROLES_SELECT_ID,
                CreateSelectMenuKind::Role {
                    default_roles: Some(defaults),
                },
            )
            .placeholder("Select ban roles...")
            .min_values(0)
            .max_values(MAX_BAN_ROLES);

            (card, vec![CreateActionRow::SelectMenu(select)])
        }
        SettingsSection::AutoRole => {
            let card = card
                .title("🎭 Auto Role Configuration")
                .description("Configure automatic role assignment for new members")
                .field(
                    "Current Auto Role",
                    optional_mention(settings.and_then(|s| s.auto_role_id), role_mention),
                    false,
                );
            (card, vec![])
        }
        SettingsSection::Verification => {
            let card = card.title("✅ Verification Configuration");
            let card = match settings.and_then(GuildSettings::verification) {
                Some((channel_id, role_id)) => card
                    .field("Verification Channel", channel_mention(channel_id), true)
                    .field("Verification Role", role_mention(role_id), true),
                None => card.field("Status", "Not configured", false),
            };
            (card, vec![])
        }
        SettingsSection::AntiRaid => {
            let anti_raid = AntiRaidConfig::resolve(settings);
            let card = card.title("🛡️ Anti-Raid Configuration");
            let card = if anti_raid.enabled {
                card.field("Status", "Enabled", true)
                    .field("Threshold", format!("{} actions", anti_raid.threshold), true)
                    .field(
                        "Timeframe",
                        format!("{} seconds", anti_raid.timeframe_ms / 1000),
                        true,
                    )
            } else {
                card.field("Status", "Disabled", true)
            };
            (card, vec![])
        }
        SettingsSection::LogChannel => {
            let card = card.title("📝 Log Channel Configuration").field(
                "Current Log Channel",
                optional_mention(settings.and_then(|s| s.log_channel_id), channel_mention),
                false,
            );

            let defaults = settings
                .and_then(|s| s.log_channel_id)
                .map(|id| vec![ChannelId::new(id)]);
            let select = CreateSelectMenu::new(
                LOG_CHANNEL_SELECT_ID,
                CreateSelectMenuKind::Channel {
                    channel_types: Some(vec![serenity::all::ChannelType::Text]),
                    default_channels: defaults,
                },
            )
            .placeholder("Select a log channel...")
            .min_values(0)
            .max_values(1);

            (card, vec![CreateActionRow::SelectMenu(select)])
        }
    }
}

/// `/antiraid status` card.
pub fn anti_raid_status(settings: Option<&GuildSettings>) -> CreateEmbed {
    let anti_raid = AntiRaidConfig::resolve(settings);
    let card = CreateEmbed::new().title("🛡️ Anti-Raid Status");

    if !anti_raid.enabled {
        return card
            .description("Anti-raid protection is **disabled**")
            .color(DISABLED_COLOR);
    }

    card.description("Anti-raid protection is **enabled**")
        .color(ENABLED_COLOR)
        .field("Threshold", format!("{} actions", anti_raid.threshold), true)
        .field(
            "Timeframe",
            format!("{} seconds", anti_raid.timeframe_ms / 1000),
            true,
        )
}

/// `/autorole status` card.
pub fn auto_role_status(settings: Option<&GuildSettings>) -> CreateEmbed {
    let card = CreateEmbed::new().title("🎭 Auto-Role Status");

    match settings.and_then(|s| s.auto_role_id) {
        Some(role_id) => card
            .description(format!("Auto-role is set to: {}", role_mention(role_id)))
            .color(ENABLED_COLOR),
        None => card
            .description("No auto-role is currently set")
            .color(DISABLED_COLOR),
    }
}

/// `/verify status` card.
pub fn verification_status(settings: Option<&GuildSettings>) -> CreateEmbed {
    let card = CreateEmbed::new().title("✅ Verification Status");

    match settings.and_then(GuildSettings::verification) {
        Some((channel_id, role_id)) => card
            .description("Verification system is active")
            .color(ENABLED_COLOR)
            .field("Channel", channel_mention(channel_id), true)
            .field("Role", role_mention(role_id), true),
        None => card
            .description("Verification system is not set up")
            .color(DISABLED_COLOR),
    }
}

pub struct SettingsService<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> SettingsService<'a> {
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn get(&self, guild_id: GuildId) -> Result<Option<GuildSettings>, AppError> {
        GuildSettingsRepository::new(self.db).get(guild_id.get()).await
    }

    async fn update(
        &self,
        guild_id: GuildId,
        param: UpdateGuildSettingsParam,
    ) -> Result<GuildSettings, AppError> {
        let settings = GuildSettingsRepository::new(self.db)
            .update(guild_id.get(), param)
            .await?;

        tracing::info!("Updated settings for guild {}", guild_id);

        Ok(settings)
    }

    /// Enables anti-raid protection.
    ///
    /// # Arguments
    /// - `timeframe_secs` - Window length in seconds; stored in milliseconds
    pub async fn enable_anti_raid(
        &self,
        guild_id: GuildId,
        threshold: u32,
        timeframe_secs: i64,
    ) -> Result<GuildSettings, AppError> {
        self.update(
            guild_id,
            UpdateGuildSettingsParam {
                anti_raid_enabled: Some(true),
                anti_raid_threshold: Some(threshold),
                anti_raid_timeframe_ms: Some(timeframe_secs * 1000),
                ..Default::default()
            },
        )
        .await
    }

    pub async fn disable_anti_raid(&self, guild_id: GuildId) -> Result<GuildSettings, AppError> {
        self.update(
            guild_id,
            UpdateGuildSettingsParam {
                anti_raid_enabled: Some(false),
                ..Default::default()
            },
        )
        .await
    }

    pub async fn set_auto_role(
        &self,
        guild_id: GuildId,
        role_id: Option<RoleId>,
    ) -> Result<GuildSettings, AppError> {
        self.update(
            guild_id,
            UpdateGuildSettingsParam {
                auto_role_id: Some(role_id.map(RoleId::get)),
                ..Default::default()
            },
        )
        .await
    }

    /// Sets or clears the verification channel and role together.
    pub async fn set_verification(
        &self,
        guild_id: GuildId,
        pair: Option<(ChannelId, RoleId)>,
    ) -> Result<GuildSettings, AppError> {
        self.update(
            guild_id,
            UpdateGuildSettingsParam::verification(
                pair.map(|(channel_id, role_id)| (channel_id.get(), role_id.get())),
            ),
        )
        .await
    }

    pub async fn set_ban_roles(
        &self,
        guild_id: GuildId,
        role_ids: &[RoleId],
    ) -> Result<GuildSettings, AppError> {
        self.update(
            guild_id,
            UpdateGuildSettingsParam {
                ban_roles: Some(role_ids.iter().map(|id| id.get()).collect()),
                ..Default::default()
            },
        )
        .await
    }

    pub async fn set_log_channel(
        &self,
        guild_id: GuildId,
        channel_id: Option<ChannelId>,
    ) -> Result<GuildSettings, AppError> {
        self.update(
            guild_id,
            UpdateGuildSettingsParam {
                log_channel_id: Some(channel_id.map(ChannelId::get)),
                ..Default::default()
            },
        )
        .await
    }

    /// Channel bot logs for the guild are posted to.
    ///
    /// The guild's configured log channel wins over the global logs channel.
    pub async fn log_channel(
        &self,
        guild_id: GuildId,
        config: &Config,
    ) -> Result<ChannelId, AppError> {
        let configured = self.get(guild_id).await?.and_then(|s| s.log_channel_id);

        Ok(ChannelId::new(configured.unwrap_or(config.logs_channel_id)))
    }
}

#[cfg(test)]
mod tests {
    use test_utils::{builder::TestBuilder, factory::guild_settings::GuildSettingsFactory};

    use super::*;

    #[test]
    fn section_values_round_trip() {
        for section in SettingsSection::ALL {
            assert_eq!(SettingsSection::parse(section.value()), Some(section));
        }
        assert_eq!(SettingsSection::parse("music"), None);
    }

    #[test]
    fn overview_reports_missing_settings() {
        let (card, _) = overview(None);
        let json = serde_json::to_value(&card).unwrap();
        let fields = json["fields"].as_array().unwrap();

        assert_eq!(fields[0]["value"], "None set");
        assert_eq!(fields[1]["value"], "Not set");
        assert_eq!(fields[3]["value"], "Disabled");
    }

    /// Tests enabling anti-raid protection.
    ///
    /// Verifies that the timeframe given in seconds is stored in milliseconds.
    ///
    /// Expected: enabled, threshold 5, 60000 ms
    #[tokio::test]
    async fn enabling_anti_raid_stores_milliseconds() -> Result<(), AppError> {
        let test = TestBuilder::new()
            .with_table(entity::prelude::GuildSettings)
            .build()
            .await
            .unwrap();
        let db = test.db.as_ref().unwrap();

        let settings = SettingsService::new(db)
            .enable_anti_raid(GuildId::new(7), 5, 60)
            .await?;

        assert!(settings.anti_raid_enabled);
        assert_eq!(settings.anti_raid_threshold, 5);
        assert_eq!(settings.anti_raid_timeframe_ms, 60_000);

        Ok(())
    }

    /// Tests the log channel fallback.
    ///
    /// Expected: configured channel when set, the global logs channel otherwise
    #[tokio::test]
    async fn log_channel_falls_back_to_global() -> Result<(), AppError> {
        let test = TestBuilder::new()
            .with_table(entity::prelude::GuildSettings)
            .build()
            .await
            .unwrap();
        let db = test.db.as_ref().unwrap();
        let config = Config::from_lookup(|key| match key {
            "DISCORD_TOKEN" => Some("token".to_string()),
            "LOGS_CHANNEL_ID" => Some("500".to_string()),
            "TICKETS_CHANNEL_ID" | "MODERATOR_ROLE_ID" | "ADMIN_ROLE_ID" | "OWNER_ROLE_ID"
            | "DEVELOPER_USER_ID" => Some("1".to_string()),
            _ => None,
        })?;

        GuildSettingsFactory::new(db, 1).build().await?;
        let service = SettingsService::new(db);
        service
            .set_log_channel(GuildId::new(1), Some(ChannelId::new(42)))
            .await?;

        assert_eq!(service.log_channel(GuildId::new(1), &config).await?, ChannelId::new(42));
        assert_eq!(service.log_channel(GuildId::new(2), &config).await?, ChannelId::new(500));

        Ok(())
    }
}
