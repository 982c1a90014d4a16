//! The question/answer transcript shown for the selected record.
//!
//! A [`Conversation`] is either empty or holds exactly one user message
//! followed by one robot message. [`Selection`] owns it and clears it
//! whenever the selected record changes.

pub const USER_AVATAR: &str = "\u{1F9D1}\u{200D}\u{1F4BB}";
pub const ROBOT_AVATAR: &str = "\u{1F916}";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Robot,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Robot => "robot",
        }
    }

    pub fn avatar(self) -> &'static str {
        match self {
            Role::User => USER_AVATAR,
            Role::Robot => ROBOT_AVATAR,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub role: Role,
    pub content: String,
    pub avatar: &'static str,
}

impl Message {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            avatar: role.avatar(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Conversation {
    messages: Vec<Message>,
}

impl Conversation {
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Insert the question/answer pair if no messages exist yet.
    /// Returns true if the conversation was populated by this call.
    pub fn populate_if_empty(&mut self, question: &str, answer: &str) -> bool {
        if !self.messages.is_empty() {
            return false;
        }
        self.messages.push(Message::new(Role::User, question));
        self.messages.push(Message::new(Role::Robot, answer));
        true
    }

    pub fn clear(&mut self) {
        self.messages.clear();
    }
}

/// Which record the conversation belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordKey {
    pub name: String,
    pub split: String,
    pub index: usize,
}

/// Per-session selection: the current record and its conversation.
#[derive(Debug, Clone, Default)]
pub struct Selection {
    current: Option<RecordKey>,
    conversation: Conversation,
}

impl Selection {
    /// Select a record. Clears the conversation if the selection changed.
    /// Returns true when a reset happened.
    pub fn select(&mut self, key: RecordKey) -> bool {
        if self.current.as_ref() == Some(&key) {
            return false;
        }
        self.current = Some(key);
        self.conversation.clear();
        true
    }

    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    pub fn conversation_mut(&mut self) -> &mut Conversation {
        &mut self.conversation
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(index: usize) -> RecordKey {
        RecordKey {
            name: "squad".into(),
            split: "train".into(),
            index,
        }
    }

    #[test]
    fn populates_once() {
        let mut c = Conversation::default();
        assert!(c.populate_if_empty("q", "a"));
        assert!(!c.populate_if_empty("q2", "a2"));
        assert_eq!(c.messages().len(), 2);
        assert_eq!(c.messages()[0], Message::new(Role::User, "q"));
        assert_eq!(c.messages()[1].role, Role::Robot);
        assert_eq!(c.messages()[1].avatar, ROBOT_AVATAR);
    }

    #[test]
    fn index_change_resets() {
        let mut s = Selection::default();
        assert!(s.select(key(0)));
        s.conversation_mut().populate_if_empty("q", "a");

        assert!(!s.select(key(0)));
        assert_eq!(s.conversation().messages().len(), 2);

        assert!(s.select(key(1)));
        assert!(s.conversation().is_empty());
        assert_eq!(s.current, Some(key(1)));
    }

    #[test]
    fn split_change_resets() {
        let mut s = Selection::default();
        s.select(key(3));
        s.conversation_mut().populate_if_empty("q", "a");
        let other = RecordKey {
            split: "validation".into(),
            ..key(3)
        };
        assert!(s.select(other));
        assert!(s.conversation().is_empty());
    }
}
