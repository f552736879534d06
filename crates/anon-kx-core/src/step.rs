// Copyright (c) 2026 Oleksandr Melnychenko, Ukraine
// Ecliptix Security — Anonymous DH Key Exchange
// Licensed under the MIT License

use crate::params::DhParamsProvider;
use crate::session::{Role, Session};
use crate::types::KxResult;

/// The four key-exchange operations, named after the message they handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StepKind {
    GenerateServer,
    ProcessServer,
    GenerateClient,
    ProcessClient,
}

impl StepKind {
    /// The role that runs this step.
    pub fn role(self) -> Role {
        match self {
            StepKind::GenerateServer | StepKind::ProcessClient => Role::Server,
            StepKind::ProcessServer | StepKind::GenerateClient => Role::Client,
        }
    }

    /// `true` for steps that produce a message to send.
    pub fn is_generate(self) -> bool {
        matches!(self, StepKind::GenerateServer | StepKind::GenerateClient)
    }
}

/// One per-role operation of a key-exchange mechanism.
///
/// Generate steps are called with an empty `incoming` slice and return the
/// message to send. Process steps consume `incoming` and return an empty
/// vector. On failure nothing is returned and the session is marked failed.
pub trait KeyExchangeStep {
    fn kind(&self) -> StepKind;

    fn run(
        &self,
        session: &mut Session,
        provider: &dyn DhParamsProvider,
        incoming: &[u8],
    ) -> KxResult<Vec<u8>>;
}

/// Settles a step's outcome on the session: a failure is logged and moves the
/// session to [`crate::session::KxPhase::Failed`], dropping every secret it holds.
pub fn finish_step<T>(session: &mut Session, kind: StepKind, result: KxResult<T>) -> KxResult<T> {
    match &result {
        Ok(_) => tracing::debug!(?kind, phase = ?session.phase(), "key-exchange step completed"),
        Err(error) => {
            tracing::warn!(?kind, phase = ?session.phase(), %error, "key-exchange step failed");
            session.fail();
        }
    }
    result
}
