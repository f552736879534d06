use anon_kx::*;
use anon_kx_core::params::DhParameters;
use anon_kx_core::protocol;
use anon_kx_core::session::{get_dh_bits, AnonClientCredentials, AnonServerCredentials};
use anon_kx_core::types::{DecodeError, StateError};
use num_bigint::BigUint;

fn step(kind: StepKind) -> &'static dyn KeyExchangeStep {
    lookup(AuthType::Anon, kind).unwrap()
}

/// Runs the four steps through the dispatch table, in handshake order.
fn handshake(
    server: &mut Session,
    client: &mut Session,
    provider: &dyn DhParamsProvider,
) -> KxResult<()> {
    let server_kx = step(StepKind::GenerateServer).run(server, provider, &[])?;
    let reply = step(StepKind::ProcessServer).run(client, provider, &server_kx)?;
    assert!(reply.is_empty());
    let client_kx = step(StepKind::GenerateClient).run(client, provider, &[])?;
    let reply = step(StepKind::ProcessClient).run(server, provider, &client_kx)?;
    assert!(reply.is_empty());
    Ok(())
}

#[test]
fn full_exchange_over_each_standard_group() {
    for bits in FixedGroups::supported_bits() {
        let mut server = Session::new(Role::Server);
        server.set_server_credentials(AnonServerCredentials::new(bits).unwrap());
        let mut client = Session::new(Role::Client);

        handshake(&mut server, &mut client, &FixedGroups).unwrap();

        assert_eq!(server.phase(), KxPhase::Done);
        assert_eq!(client.phase(), KxPhase::Done);
        let server_secret = server.take_premaster_secret().unwrap();
        let client_secret = client.take_premaster_secret().unwrap();
        assert_eq!(server_secret.data(), client_secret.data());
        assert!(!server_secret.is_empty());
        assert_eq!(get_dh_bits(&server), Some(bits));
        assert_eq!(get_dh_bits(&client), Some(bits));
    }
}

#[test]
fn independent_handshakes_derive_different_secrets() {
    let mut secrets = Vec::new();
    for _ in 0..2 {
        let mut server = Session::new(Role::Server);
        let mut client = Session::new(Role::Client);
        handshake(&mut server, &mut client, &FixedGroups).unwrap();
        secrets.push(server.take_premaster_secret().unwrap());
    }
    assert_ne!(secrets[0].data(), secrets[1].data());
}

#[test]
fn toy_group_through_static_provider() {
    let provider =
        StaticGroup::new(DhParameters::new(BigUint::from(23u32), BigUint::from(5u32)).unwrap());
    let mut server = Session::new(Role::Server);
    let mut client = Session::new(Role::Client);
    client.set_client_credentials(AnonClientCredentials {
        min_prime_bits: 2,
        max_prime_bits: 64,
    });

    handshake(&mut server, &mut client, &provider).unwrap();
    assert_eq!(
        server.premaster_secret().unwrap().data(),
        client.premaster_secret().unwrap().data()
    );
    assert_eq!(get_dh_bits(&client), Some(5));
}

#[test]
fn role_lookup_matches_direction() {
    let mut server = Session::new(Role::Server);
    let mut client = Session::new(Role::Client);

    let server_kx = AnonKxStep::outgoing(Role::Server)
        .run(&mut server, &FixedGroups, &[])
        .unwrap();
    AnonKxStep::incoming(Role::Client)
        .run(&mut client, &FixedGroups, &server_kx)
        .unwrap();
    let client_kx = AnonKxStep::outgoing(Role::Client)
        .run(&mut client, &FixedGroups, &[])
        .unwrap();
    AnonKxStep::incoming(Role::Server)
        .run(&mut server, &FixedGroups, &client_kx)
        .unwrap();

    assert_eq!(
        server.premaster_secret().unwrap().data(),
        client.premaster_secret().unwrap().data()
    );
}

#[test]
fn generate_step_rejects_input() {
    let mut server = Session::new(Role::Server);
    let result = step(StepKind::GenerateServer).run(&mut server, &FixedGroups, &[0x00]);
    assert_eq!(result, Err(KxError::Decode(DecodeError::TrailingBytes(1))));
    assert_eq!(server.phase(), KxPhase::Failed);
}

#[test]
fn out_of_order_step_fails_session() {
    let mut server = Session::new(Role::Server);
    let result = step(StepKind::ProcessClient).run(&mut server, &FixedGroups, &[0x00, 0x01, 0x02]);
    assert_eq!(
        result,
        Err(KxError::State(StateError::OutOfOrder(KxPhase::Init)))
    );
    assert_eq!(result.unwrap_err().alert(), AlertDescription::InternalError);
    assert_eq!(server.phase(), KxPhase::Failed);
}

#[test]
fn tampered_server_value_is_illegal_parameter() {
    let mut server = Session::new(Role::Server);
    let mut client = Session::new(Role::Client);
    let server_kx = step(StepKind::GenerateServer)
        .run(&mut server, &FixedGroups, &[])
        .unwrap();

    let parsed = protocol::parse_server_kx(&server_kx).unwrap();
    let server_kx =
        protocol::write_server_kx(&parsed.prime, &parsed.generator, &BigUint::from(1u32)).unwrap();

    let err = step(StepKind::ProcessServer)
        .run(&mut client, &FixedGroups, &server_kx)
        .unwrap_err();
    assert_eq!(err.alert(), AlertDescription::IllegalParameter);
    assert!(err.is_peer_fault());
    assert_eq!(client.phase(), KxPhase::Failed);
}

#[test]
fn other_mechanisms_are_not_served() {
    for kind in [
        StepKind::GenerateServer,
        StepKind::ProcessServer,
        StepKind::GenerateClient,
        StepKind::ProcessClient,
    ] {
        assert!(lookup(AuthType::Anon, kind).is_some());
        assert!(lookup(AuthType::Certificate, kind).is_none());
        assert!(lookup(AuthType::Srp, kind).is_none());
    }
    assert_eq!(MECHANISM_NAME, "ANON");
}

#[test]
fn generated_group_completes_exchange() {
    let provider = GeneratedGroup::new();
    let mut server = Session::new(Role::Server);
    server.set_server_credentials(AnonServerCredentials::new(512).unwrap());
    let mut client = Session::new(Role::Client);

    handshake(&mut server, &mut client, &provider).unwrap();
    assert_eq!(get_dh_bits(&client), Some(512));
}

#[test]
fn steps_match_their_kind() {
    for kind in [
        StepKind::GenerateServer,
        StepKind::ProcessServer,
        StepKind::GenerateClient,
        StepKind::ProcessClient,
    ] {
        assert_eq!(AnonKxStep::from_kind(kind).kind(), kind);
        assert_eq!(step(kind).kind(), kind);
    }
}

#[test]
fn role_directions() {
    for role in [Role::Server, Role::Client] {
        let outgoing = AnonKxStep::outgoing(role).kind();
        let incoming = AnonKxStep::incoming(role).kind();
        assert_eq!(outgoing.role(), role);
        assert_eq!(incoming.role(), role);
        assert!(outgoing.is_generate());
        assert!(!incoming.is_generate());
    }
}
