// Copyright (c) 2026 Oleksandr Melnychenko, Ukraine
// Ecliptix Security — Anonymous DH Key Exchange
// Licensed under the MIT License

use anon_kx_core::params::DhParamsProvider;
use anon_kx_core::session::{AuthType, Role, Session};
use anon_kx_core::step::{finish_step, KeyExchangeStep, StepKind};
use anon_kx_core::types::{DecodeError, KxResult};

/// Name under which the mechanism is registered with the orchestrator.
pub const MECHANISM_NAME: &str = "ANON";

/// The four steps of the anonymous mechanism.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AnonKxStep {
    GenerateServer,
    ProcessServer,
    GenerateClient,
    ProcessClient,
}

impl AnonKxStep {
    pub fn from_kind(kind: StepKind) -> Self {
        match kind {
            StepKind::GenerateServer => AnonKxStep::GenerateServer,
            StepKind::ProcessServer => AnonKxStep::ProcessServer,
            StepKind::GenerateClient => AnonKxStep::GenerateClient,
            StepKind::ProcessClient => AnonKxStep::ProcessClient,
        }
    }

    /// The step that produces `role`'s outgoing message.
    pub fn outgoing(role: Role) -> Self {
        match role {
            Role::Server => AnonKxStep::GenerateServer,
            Role::Client => AnonKxStep::GenerateClient,
        }
    }

    /// The step that consumes the message `role` receives.
    pub fn incoming(role: Role) -> Self {
        match role {
            Role::Server => AnonKxStep::ProcessClient,
            Role::Client => AnonKxStep::ProcessServer,
        }
    }
}

impl KeyExchangeStep for AnonKxStep {
    fn kind(&self) -> StepKind {
        match self {
            AnonKxStep::GenerateServer => StepKind::GenerateServer,
            AnonKxStep::ProcessServer => StepKind::ProcessServer,
            AnonKxStep::GenerateClient => StepKind::GenerateClient,
            AnonKxStep::ProcessClient => StepKind::ProcessClient,
        }
    }

    fn run(
        &self,
        session: &mut Session,
        provider: &dyn DhParamsProvider,
        incoming: &[u8],
    ) -> KxResult<Vec<u8>> {
        tracing::trace!(step = ?self, incoming = incoming.len(), "running anonymous key-exchange step");
        let kind = self.kind();
        if kind.is_generate() && !incoming.is_empty() {
            let result: KxResult<Vec<u8>> = Err(DecodeError::TrailingBytes(incoming.len()).into());
            return finish_step(session, kind, result);
        }
        match self {
            AnonKxStep::GenerateServer => anon_kx_server::generate_server_kx(session, provider),
            AnonKxStep::ProcessServer => {
                anon_kx_client::process_server_kx(session, incoming).map(|()| Vec::new())
            }
            AnonKxStep::GenerateClient => anon_kx_client::generate_client_kx(session),
            AnonKxStep::ProcessClient => {
                anon_kx_server::process_client_kx(session, incoming).map(|()| Vec::new())
            }
        }
    }
}

/// Returns the step for `kind` if `auth_type` is the anonymous mechanism.
pub fn lookup(auth_type: AuthType, kind: StepKind) -> Option<&'static dyn KeyExchangeStep> {
    if auth_type != AuthType::Anon {
        return None;
    }
    let step: &'static dyn KeyExchangeStep = match kind {
        StepKind::GenerateServer => &AnonKxStep::GenerateServer,
        StepKind::ProcessServer => &AnonKxStep::ProcessServer,
        StepKind::GenerateClient => &AnonKxStep::GenerateClient,
        StepKind::ProcessClient => &AnonKxStep::ProcessClient,
    };
    Some(step)
}
