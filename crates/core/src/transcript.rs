/// Speaker of a transcript turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Model,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Turn {
    pub role: Role,
    pub text: String,
}

/// Conversation retained across translation requests.
///
/// Turns are only ever added in user/model pairs, so the sequence always
/// alternates and starts with a user turn.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Transcript {
    turns: Vec<Turn>,
}

impl Transcript {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// Number of completed user/model exchanges.
    #[must_use]
    pub fn exchanges(&self) -> usize {
        self.turns.len() / 2
    }

    pub fn push_exchange(&mut self, user: String, model: String) {
        self.turns.push(Turn { role: Role::User, text: user });
        self.turns.push(Turn { role: Role::Model, text: model });
    }
}
