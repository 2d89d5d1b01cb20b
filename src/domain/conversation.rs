use std::{fmt, str::FromStr};

/// Kind of conversation for routing and display fallbacks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConversationKind {
    /// Two-party chat inside a course group.
    Private,
    /// Group-wide chat of a course group.
    Group,
    /// Reply thread of a support ticket.
    Ticket,
}

/// Identifies one scoped message stream on the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConversationRef {
    Private { group_id: i64, user_id: i64 },
    Group { group_id: i64 },
    Ticket { ticket_id: i64 },
}

impl ConversationRef {
    pub fn kind(&self) -> ConversationKind {
        match self {
            Self::Private { .. } => ConversationKind::Private,
            Self::Group { .. } => ConversationKind::Group,
            Self::Ticket { .. } => ConversationKind::Ticket,
        }
    }

    /// Ticket replies are text-only on the backend.
    pub fn supports_attachments(&self) -> bool {
        !matches!(self, Self::Ticket { .. })
    }
}

impl fmt::Display for ConversationRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Private { group_id, user_id } => write!(f, "private:{group_id}:{user_id}"),
            Self::Group { group_id } => write!(f, "group:{group_id}"),
            Self::Ticket { ticket_id } => write!(f, "ticket:{ticket_id}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid conversation reference `{input}`: expected private:<group>:<user>, group:<group> or ticket:<id>")]
pub struct ParseConversationRefError {
    input: String,
}

impl FromStr for ConversationRef {
    type Err = ParseConversationRefError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let invalid = || ParseConversationRefError {
            input: input.to_owned(),
        };
        let parts: Vec<&str> = input.trim().split(':').collect();
        let id = |raw: &str| raw.parse::<i64>().map_err(|_| invalid());

        match parts.as_slice() {
            ["private", group, user] => Ok(Self::Private {
                group_id: id(group)?,
                user_id: id(user)?,
            }),
            ["group", group] => Ok(Self::Group {
                group_id: id(group)?,
            }),
            ["ticket", ticket] => Ok(Self::Ticket {
                ticket_id: id(ticket)?,
            }),
            _ => Err(invalid()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_all_conversation_kinds() {
        assert_eq!(
            "private:3:17".parse::<ConversationRef>(),
            Ok(ConversationRef::Private {
                group_id: 3,
                user_id: 17
            })
        );
        assert_eq!(
            "group:3".parse::<ConversationRef>(),
            Ok(ConversationRef::Group { group_id: 3 })
        );
        assert_eq!(
            "ticket:99".parse::<ConversationRef>(),
            Ok(ConversationRef::Ticket { ticket_id: 99 })
        );
    }

    #[test]
    fn rejects_malformed_references() {
        for input in ["", "private:3", "group:x", "ticket:1:2", "dm:1"] {
            assert!(
                input.parse::<ConversationRef>().is_err(),
                "should reject {input:?}"
            );
        }
    }

    #[test]
    fn display_round_trips_through_parse() {
        let conversation = ConversationRef::Private {
            group_id: 5,
            user_id: 8,
        };

        assert_eq!(conversation.to_string().parse(), Ok(conversation));
    }

    #[test]
    fn only_tickets_reject_attachments() {
        assert!(ConversationRef::Group { group_id: 1 }.supports_attachments());
        assert!(!ConversationRef::Ticket { ticket_id: 1 }.supports_attachments());
    }
}
