//! Resolved channel and user entities.

use grammers_tl_types as tl;

/// A channel or supergroup the session can address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelEntity {
    /// Bare channel id.
    pub id: i64,
    pub access_hash: i64,
    pub title: String,
    /// `true` for broadcast channels, `false` for supergroups.
    pub broadcast: bool,
}

impl ChannelEntity {
    /// Human-readable kind, as printed before a run.
    #[must_use]
    pub fn kind_label(&self) -> &'static str {
        if self.broadcast { "Channel" } else { "Group" }
    }

    /// Builds an entity from a raw chat if it is the channel with `id`.
    pub(crate) fn from_chat(chat: &tl::enums::Chat, id: i64) -> Option<Self> {
        match chat {
            tl::enums::Chat::Channel(channel) if channel.id == id => Some(Self {
                id: channel.id,
                access_hash: channel.access_hash?,
                title: channel.title.clone(),
                broadcast: channel.broadcast,
            }),
            tl::enums::Chat::ChannelForbidden(channel) if channel.id == id => Some(Self {
                id: channel.id,
                access_hash: channel.access_hash,
                title: channel.title.clone(),
                broadcast: channel.broadcast,
            }),
            _ => None,
        }
    }

    pub(crate) fn to_input_channel(&self) -> tl::enums::InputChannel {
        tl::types::InputChannel {
            channel_id: self.id,
            access_hash: self.access_hash,
        }
        .into()
    }
}

/// A user (normally a bot) resolved by username.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserEntity {
    pub id: i64,
    pub access_hash: i64,
    pub username: Option<String>,
    pub is_bot: bool,
}

impl UserEntity {
    /// Builds an entity from a raw user; empty users and users without an
    /// access hash yield `None`.
    pub(crate) fn from_user(user: &tl::enums::User) -> Option<Self> {
        match user {
            tl::enums::User::User(user) => Some(Self {
                id: user.id,
                access_hash: user.access_hash?,
                username: user.username.clone(),
                is_bot: user.bot,
            }),
            _ => None,
        }
    }

    pub(crate) fn to_input_user(&self) -> tl::enums::InputUser {
        tl::types::InputUser {
            user_id: self.id,
            access_hash: self.access_hash,
        }
        .into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn channel(broadcast: bool) -> ChannelEntity {
        ChannelEntity {
            id: 3_232_165_605,
            access_hash: 77,
            title: "Test".to_owned(),
            broadcast,
        }
    }

    #[test]
    fn test_kind_label() {
        assert_eq!(channel(true).kind_label(), "Channel");
        assert_eq!(channel(false).kind_label(), "Group");
    }

    #[test]
    fn test_to_input_channel() {
        match channel(true).to_input_channel() {
            tl::enums::InputChannel::Channel(input) => {
                assert_eq!(input.channel_id, 3_232_165_605);
                assert_eq!(input.access_hash, 77);
            }
            other => panic!("unexpected input channel: {other:?}"),
        }
    }

    #[test]
    fn test_empty_raw_entities_are_skipped() {
        let chat = tl::enums::Chat::Empty(tl::types::ChatEmpty { id: 3_232_165_605 });
        assert_eq!(ChannelEntity::from_chat(&chat, 3_232_165_605), None);

        let user = tl::enums::User::Empty(tl::types::UserEmpty { id: 42 });
        assert_eq!(UserEntity::from_user(&user), None);
    }

    #[test]
    fn test_to_input_user() {
        let user = UserEntity {
            id: 42,
            access_hash: 99,
            username: Some("alpha_bot".to_owned()),
            is_bot: true,
        };
        match user.to_input_user() {
            tl::enums::InputUser::User(input) => {
                assert_eq!(input.user_id, 42);
                assert_eq!(input.access_hash, 99);
            }
            other => panic!("unexpected input user: {other:?}"),
        }
    }
}
