// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Conversion of Telegram updates into [`InboundEvent`]s.

use herald_core::{ConversationId, InboundEvent};
use teloxide::prelude::*;
use teloxide::types::ChatKind;

/// Checks whether the message is from a private (one-to-one) chat.
///
/// Group, supergroup, and channel messages return `false`.
pub fn is_private(msg: &Message) -> bool {
    matches!(msg.chat.kind, ChatKind::Private(_))
}

/// Converts a text message into an [`InboundEvent`].
///
/// Returns `None` for messages without text (stickers, photos, service
/// messages).
pub fn to_inbound_event(msg: &Message) -> Option<InboundEvent> {
    let text = msg.text()?;
    Some(InboundEvent {
        message_id: i64::from(msg.id.0),
        conversation: ConversationId(msg.chat.id.0),
        sender_id: msg.from.as_ref().and_then(|u| i64::try_from(u.id.0).ok()),
        text: Some(text.to_string()),
        is_private: is_private(msg),
        received_at: msg.date,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_private_message(user_id: u64, text: &str) -> Message {
        let json = serde_json::json!({
            "message_id": 7,
            "date": 1700000000i64,
            "chat": {
                "id": user_id as i64,
                "type": "private",
                "first_name": "Test",
            },
            "from": {
                "id": user_id,
                "is_bot": false,
                "first_name": "Test",
            },
            "text": text,
        });

        serde_json::from_value(json).expect("failed to deserialize mock message")
    }

    fn make_group_message(user_id: u64, text: &str) -> Message {
        let json = serde_json::json!({
            "message_id": 8,
            "date": 1700000000i64,
            "chat": {
                "id": -100123i64,
                "type": "supergroup",
                "title": "Test Group",
            },
            "from": {
                "id": user_id,
                "is_bot": false,
                "first_name": "Test",
            },
            "text": text,
        });

        serde_json::from_value(json).expect("failed to deserialize mock group message")
    }

    fn make_sticker_message() -> Message {
        let json = serde_json::json!({
            "message_id": 9,
            "date": 1700000000i64,
            "chat": {
                "id": 12345i64,
                "type": "private",
                "first_name": "Test",
            },
            "from": {
                "id": 12345u64,
                "is_bot": false,
                "first_name": "Test",
            },
            "sticker": {
                "file_id": "sticker-file",
                "file_unique_id": "sticker-unique",
                "type": "regular",
                "width": 512,
                "height": 512,
                "is_animated": false,
                "is_video": false,
            },
        });

        serde_json::from_value(json).expect("failed to deserialize mock sticker message")
    }

    #[test]
    fn private_text_message_maps_fields() {
        let msg = make_private_message(12345, "Hi there");
        let event = to_inbound_event(&msg).unwrap();
        assert_eq!(event.message_id, 7);
        assert_eq!(event.conversation, ConversationId(12345));
        assert_eq!(event.sender_id, Some(12345));
        assert_eq!(event.text.as_deref(), Some("Hi there"));
        assert!(event.is_private);
        assert_eq!(event.received_at.timestamp(), 1_700_000_000);
    }

    #[test]
    fn group_message_is_not_private() {
        let msg = make_group_message(12345, "price?");
        let event = to_inbound_event(&msg).unwrap();
        assert!(!event.is_private);
        assert_eq!(event.conversation, ConversationId(-100123));
    }

    #[test]
    fn messages_without_text_are_ignored() {
        assert!(to_inbound_event(&make_sticker_message()).is_none());
    }
}
