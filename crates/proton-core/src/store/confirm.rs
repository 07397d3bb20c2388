//! Two-step confirmation for destructive store operations.

use serde::{Deserialize, Serialize};

use super::{RecordStore, StoreError, StoreResult};
use crate::models::ProtocolRecord;

/// Opaque single-use token returned by a removal request.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConfirmationToken(String);

impl ConfirmationToken {
    fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for ConfirmationToken {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Action waiting for confirmation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PendingAction {
    Remove { id: String },
    ClearAll,
}

/// Result of a confirmed action.
#[derive(Debug, Clone, PartialEq)]
pub enum Confirmed {
    Removed(ProtocolRecord),
    Cleared(usize),
}

impl RecordStore {
    /// Ask to remove a record. Nothing changes until the token is confirmed.
    pub fn request_removal(&mut self, id: &str) -> StoreResult<ConfirmationToken> {
        if !self.contains(id) {
            return Err(StoreError::NotFound(id.to_string()));
        }
        Ok(self.park(PendingAction::Remove { id: id.to_string() }))
    }

    /// Ask to erase every record.
    pub fn request_clear(&mut self) -> ConfirmationToken {
        self.park(PendingAction::ClearAll)
    }

    /// What a token would do, if it is still outstanding.
    pub fn pending_action(&self, token: &ConfirmationToken) -> Option<&PendingAction> {
        self.confirmations.get(token.as_str())
    }

    /// Carry out a requested action. Tokens are consumed even on failure.
    pub fn confirm(&mut self, token: &ConfirmationToken) -> StoreResult<Confirmed> {
        let action = self
            .confirmations
            .remove(token.as_str())
            .ok_or(StoreError::UnknownToken)?;

        match action {
            PendingAction::Remove { id } => self.remove(&id).map(Confirmed::Removed),
            PendingAction::ClearAll => Ok(Confirmed::Cleared(self.clear())),
        }
    }

    /// Drop a request without acting. Returns false for unknown tokens.
    pub fn discard(&mut self, token: &ConfirmationToken) -> bool {
        self.confirmations.remove(token.as_str()).is_some()
    }

    /// Park an action. An earlier request for the same action is superseded.
    fn park(&mut self, action: PendingAction) -> ConfirmationToken {
        self.confirmations.retain(|_, parked| *parked != action);
        let token = ConfirmationToken::generate();
        self.confirmations.insert(token.as_str().to_string(), action);
        token
    }
}
