use std::collections::HashMap;

use serenity::all::{Member, Permissions, Role, RoleId};

use crate::{config::Config, error::AppError};

/// Bot-level roles resolved from configured role ids or Discord permissions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Permission {
    /// Configured moderator role or `MODERATE_MEMBERS`.
    Moderator,
    /// Configured admin role or `ADMINISTRATOR`.
    Admin,
    /// Configured owner role or the developer account.
    Owner,
}

/// What the permission checks need to know about an invoking member.
#[derive(Debug, Clone, PartialEq)]
pub struct MemberAccess {
    pub user_id: u64,
    pub roles: Vec<RoleId>,
    /// Permissions resolved by Discord for the interaction's channel.
    pub permissions: Permissions,
}

impl MemberAccess {
    /// Builds access information from an interaction member.
    ///
    /// Interaction payloads carry resolved permissions; a member without them is
    /// treated as holding none.
    pub fn from_member(member: &Member) -> Self {
        Self {
            user_id: member.user.id.get(),
            roles: member.roles.clone(),
            permissions: member.permissions.unwrap_or_else(Permissions::empty),
        }
    }

    pub fn has_role(&self, role_id: u64) -> bool {
        self.roles.iter().any(|role| role.get() == role_id)
    }
}

/// Whether `held` satisfies at least one of `required`.
///
/// An empty requirement always passes and `ADMINISTRATOR` satisfies everything.
pub fn has_any_permission(held: Permissions, required: Permissions) -> bool {
    required.is_empty() || held.contains(Permissions::ADMINISTRATOR) || held.intersects(required)
}

pub fn is_moderator(config: &Config, access: &MemberAccess) -> bool {
    access.has_role(config.moderator_role_id)
        || access.permissions.contains(Permissions::MODERATE_MEMBERS)
}

pub fn is_admin(config: &Config, access: &MemberAccess) -> bool {
    access.has_role(config.admin_role_id)
        || access.permissions.contains(Permissions::ADMINISTRATOR)
}

pub fn is_owner(config: &Config, access: &MemberAccess) -> bool {
    access.has_role(config.owner_role_id) || access.user_id == config.developer_user_id
}

/// Position of the highest of `roles` in the guild hierarchy, `0` with no roles.
///
/// Role ids missing from `guild_roles` are ignored.
pub fn highest_role_position(roles: &[RoleId], guild_roles: &HashMap<RoleId, Role>) -> u16 {
    roles
        .iter()
        .filter_map(|id| guild_roles.get(id))
        .map(|role| role.position)
        .max()
        .unwrap_or(0)
}

/// Hierarchy facts about one side of a moderation action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HierarchyPosition {
    pub user_id: u64,
    pub top_role_position: u16,
}

/// Whether `actor` sits above `target` in the role hierarchy.
///
/// Refuses acting on oneself or the guild owner, and requires the actor's highest
/// role to sit strictly above the target's.
pub fn outranks(actor: HierarchyPosition, target: HierarchyPosition, guild_owner_id: u64) -> bool {
    if actor.user_id == target.user_id || target.user_id == guild_owner_id {
        return false;
    }

    actor.top_role_position > target.top_role_position
}

/// Whether `actor` may moderate `target`: outranks it and is a moderator.
pub fn can_moderate(
    config: &Config,
    access: &MemberAccess,
    actor: HierarchyPosition,
    target: HierarchyPosition,
    guild_owner_id: u64,
) -> bool {
    outranks(actor, target, guild_owner_id) && is_moderator(config, access)
}

/// Whether a member may ban: `BAN_MEMBERS` or one of the guild's configured ban roles.
pub fn may_ban(access: &MemberAccess, ban_roles: &[u64]) -> bool {
    has_any_permission(access.permissions, Permissions::BAN_MEMBERS)
        || ban_roles.iter().any(|role| access.has_role(*role))
}

/// Checks bot-level roles for a member inside a command handler.
pub struct PermissionGuard<'a> {
    config: &'a Config,
    access: &'a MemberAccess,
}

impl<'a> PermissionGuard<'a> {
    pub fn new(config: &'a Config, access: &'a MemberAccess) -> Self {
        Self { config, access }
    }

    /// Requires every listed permission.
    ///
    /// # Returns
    /// - `Ok(())` - Member holds all of them
    /// - `Err(AppError::PermissionDenied)` - Names the first one missing
    pub fn require(&self, permissions: &[Permission]) -> Result<(), AppError> {
        for permission in permissions {
            let (allowed, label) = match permission {
                Permission::Moderator => (is_moderator(self.config, self.access), "moderator"),
                Permission::Admin => (is_admin(self.config, self.access), "administrator"),
                Permission::Owner => (is_owner(self.config, self.access), "owner"),
            };

            if !allowed {
                return Err(AppError::PermissionDenied(format!(
                    "You need {} permissions to use this command.",
                    label
                )));
            }
        }

        Ok(())
    }
}
