/// Authentication state. At most one identity is active at a time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    identity: Option<String>,
}

impl Session {
    pub fn signed_in(identity: impl Into<String>) -> Self {
        Self {
            identity: Some(identity.into()),
        }
    }

    pub fn identity(&self) -> Option<&str> {
        self.identity.as_deref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.identity.is_some()
    }

    pub fn clear(&mut self) {
        self.identity = None;
    }
}
