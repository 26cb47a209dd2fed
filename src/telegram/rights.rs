//! The admin rights bundle granted to every promoted bot.

use grammers_tl_types as tl;

/// Capability flags granted with `channels.editAdmin`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[allow(clippy::struct_excessive_bools)]
pub struct AdminRights {
    pub change_info: bool,
    pub post_messages: bool,
    pub edit_messages: bool,
    pub delete_messages: bool,
    pub ban_users: bool,
    pub invite_users: bool,
    pub pin_messages: bool,
    pub add_admins: bool,
    pub manage_call: bool,
    pub other: bool,
}

impl AdminRights {
    /// The fixed bundle: every flag set.
    pub const BOT_ADMIN: Self = Self {
        change_info: true,
        post_messages: true,
        edit_messages: true,
        delete_messages: true,
        ban_users: true,
        invite_users: true,
        pin_messages: true,
        add_admins: true,
        manage_call: true,
        other: true,
    };

    /// Number of flags that are set.
    #[must_use]
    pub fn granted_count(&self) -> usize {
        [
            self.change_info,
            self.post_messages,
            self.edit_messages,
            self.delete_messages,
            self.ban_users,
            self.invite_users,
            self.pin_messages,
            self.add_admins,
            self.manage_call,
            self.other,
        ]
        .into_iter()
        .filter(|granted| *granted)
        .count()
    }

    pub(crate) fn to_tl(self) -> tl::enums::ChatAdminRights {
        tl::types::ChatAdminRights {
            change_info: self.change_info,
            post_messages: self.post_messages,
            edit_messages: self.edit_messages,
            delete_messages: self.delete_messages,
            ban_users: self.ban_users,
            invite_users: self.invite_users,
            pin_messages: self.pin_messages,
            add_admins: self.add_admins,
            anonymous: false,
            manage_call: self.manage_call,
            other: self.other,
            manage_topics: false,
            post_stories: false,
            edit_stories: false,
            delete_stories: false,
            manage_direct_messages: false,
        }
        .into()
    }
}
