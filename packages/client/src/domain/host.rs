//! Host privilege tracking.
//!
//! The relay decides who the host is; the client only mirrors the last
//! `update-host` it received and checks kick requests against it.

use thiserror::Error;

use super::value_object::SocketId;

/// Reasons a kick request is refused locally
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KickError {
    #[error("Only the host can remove participants")]
    NotHost,

    #[error("Removal was not confirmed")]
    NotConfirmed,

    #[error("The host cannot remove themselves")]
    SelfKick,
}

/// Explicit answer to "remove this participant?"
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Confirmation {
    Confirmed,
    Declined,
}

#[derive(Debug, Default)]
pub struct HostControl {
    host_id: Option<SocketId>,
}

impl HostControl {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adopt the relay's host assignment. Returns `true` when it changed.
    pub fn update(&mut self, host_id: SocketId) -> bool {
        if self.host_id.as_ref() == Some(&host_id) {
            return false;
        }
        self.host_id = Some(host_id);
        true
    }

    pub fn host_id(&self) -> Option<&SocketId> {
        self.host_id.as_ref()
    }

    pub fn is_host(&self, socket_id: &SocketId) -> bool {
        self.host_id.as_ref() == Some(socket_id)
    }

    /// Check that `local_id` may remove `target_id`.
    pub fn authorize_kick(
        &self,
        local_id: &SocketId,
        target_id: &SocketId,
        confirmation: Confirmation,
    ) -> Result<(), KickError> {
        if !self.is_host(local_id) {
            return Err(KickError::NotHost);
        }
        if local_id == target_id {
            return Err(KickError::SelfKick);
        }
        match confirmation {
            Confirmation::Confirmed => Ok(()),
            Confirmation::Declined => Err(KickError::NotConfirmed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_host_replaces_previous() {
        // テスト項目: update-host を受信するたびにホストが置き換わる
        // given (前提条件):
        let mut host = HostControl::new();
        assert!(host.update(SocketId::new("a")));

        // when (操作):
        let changed = host.update(SocketId::new("b"));

        // then (期待する結果):
        assert!(changed);
        assert!(host.is_host(&SocketId::new("b")));
        assert!(!host.is_host(&SocketId::new("a")));
        assert!(!host.update(SocketId::new("b")));
    }

    #[test]
    fn test_kick_requires_host() {
        // テスト項目: ホスト以外はキックできない
        // given (前提条件):
        let mut host = HostControl::new();
        host.update(SocketId::new("host"));

        // when (操作):
        let result = host.authorize_kick(
            &SocketId::new("me"),
            &SocketId::new("other"),
            Confirmation::Confirmed,
        );

        // then (期待する結果):
        assert_eq!(result, Err(KickError::NotHost));
    }

    #[test]
    fn test_kick_requires_confirmation() {
        // テスト項目: 確認なしのキックは拒否される
        // given (前提条件):
        let mut host = HostControl::new();
        host.update(SocketId::new("me"));

        // when (操作):
        let declined = host.authorize_kick(
            &SocketId::new("me"),
            &SocketId::new("other"),
            Confirmation::Declined,
        );
        let confirmed = host.authorize_kick(
            &SocketId::new("me"),
            &SocketId::new("other"),
            Confirmation::Confirmed,
        );

        // then (期待する結果):
        assert_eq!(declined, Err(KickError::NotConfirmed));
        assert_eq!(confirmed, Ok(()));
    }

    #[test]
    fn test_host_cannot_kick_self() {
        // テスト項目: ホストは自分自身をキックできない
        // given (前提条件):
        let mut host = HostControl::new();
        host.update(SocketId::new("me"));

        // when (操作):
        let result = host.authorize_kick(
            &SocketId::new("me"),
            &SocketId::new("me"),
            Confirmation::Confirmed,
        );

        // then (期待する結果):
        assert_eq!(result, Err(KickError::SelfKick));
    }

    #[test]
    fn test_no_host_before_first_update() {
        // テスト項目: 最初の update 前は誰もホストではない
        // given (前提条件):
        let host = HostControl::new();

        // when (操作) / then (期待する結果):
        assert!(host.host_id().is_none());
        assert!(!host.is_host(&SocketId::new("me")));
    }
}
