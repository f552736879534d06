use anon_kx_client::*;
use anon_kx_core::crypto::EphemeralKeyPair;
use anon_kx_core::params::{DhParameters, DhParamsProvider, FixedGroups};
use anon_kx_core::protocol;
use anon_kx_core::session::*;
use anon_kx_core::types::*;
use num_bigint::BigUint;

const TOY_SERVER_KX: [u8; 9] = [0x00, 0x01, 0x17, 0x00, 0x01, 0x05, 0x00, 0x01, 0x08];

fn toy_client() -> Session {
    let mut session = Session::new(Role::Client);
    session.set_client_credentials(AnonClientCredentials {
        min_prime_bits: 2,
        max_prime_bits: MAX_DH_BITS,
    });
    session
}

fn fixed_exponent(y: u32) -> impl FnOnce(&DhParameters) -> KxResult<EphemeralKeyPair> {
    move |params| EphemeralKeyPair::from_private_exponent(params, BigUint::from(y))
}

fn server_kx(params: &DhParameters, public_value: &BigUint) -> Vec<u8> {
    protocol::write_server_kx(params.prime(), params.generator(), public_value).unwrap()
}

#[test]
fn exact_client_message_and_premaster() {
    let mut session = toy_client();
    process_server_kx(&mut session, &TOY_SERVER_KX).unwrap();
    assert_eq!(session.phase(), KxPhase::ParamsConsumed);
    assert_eq!(get_dh_bits(&session), Some(5));
    assert!(session.peer_contribution().is_some());

    let message = generate_client_kx_with_keypair(&mut session, fixed_exponent(15)).unwrap();
    assert_eq!(message, vec![0x00, 0x01, 0x13]);
    assert_eq!(session.phase(), KxPhase::Done);
    assert!(session.peer_contribution().is_none());
    assert_eq!(session.premaster_secret().unwrap().data(), &[0x02]);
}

#[test]
fn standard_group_is_accepted_with_default_window() {
    let params = FixedGroups.get_params(1536).unwrap();
    let mut session = Session::new(Role::Client);
    process_server_kx(&mut session, &server_kx(&params, &BigUint::from(4u32))).unwrap();
    assert_eq!(
        session.auth_info(),
        Some(&AuthInfo::Anon(AnonAuthInfo { dh_bits: 1536 }))
    );
}

#[test]
fn small_prime_is_insufficient() {
    let mut session = Session::new(Role::Client);
    assert_eq!(
        process_server_kx(&mut session, &TOY_SERVER_KX),
        Err(KxError::Unsupported(UnsupportedError::PrimeTooSmall {
            bits: 5,
            min: MIN_DH_BITS,
        }))
    );
    assert_eq!(session.phase(), KxPhase::Failed);
    assert!(session.auth_info().is_none());
}

#[test]
fn prime_above_window_is_rejected() {
    let params = FixedGroups.get_params(2048).unwrap();
    let mut session = Session::new(Role::Client);
    session.set_client_credentials(AnonClientCredentials {
        min_prime_bits: MIN_DH_BITS,
        max_prime_bits: 1024,
    });
    assert_eq!(
        process_server_kx(&mut session, &server_kx(&params, &BigUint::from(4u32))),
        Err(KxError::Unsupported(UnsupportedError::PrimeTooLarge {
            bits: 2048,
            max: 1024,
        }))
    );
}

#[test]
fn trivial_server_values_are_rejected() {
    let params = FixedGroups.get_params(1024).unwrap();
    let p_minus_one = params.prime() - BigUint::from(1u32);
    for value in [BigUint::from(0u32), BigUint::from(1u32), p_minus_one] {
        let mut session = Session::new(Role::Client);
        assert_eq!(
            process_server_kx(&mut session, &server_kx(&params, &value)),
            Err(KxError::Arithmetic(ArithmeticError::PublicValueOutOfRange))
        );
        assert!(session.peer_contribution().is_none());
    }
}

#[test]
fn degenerate_group_is_rejected() {
    // p = 24 is even.
    let message = [0x00, 0x01, 0x18, 0x00, 0x01, 0x05, 0x00, 0x01, 0x08];
    let mut session = toy_client();
    assert_eq!(
        process_server_kx(&mut session, &message),
        Err(KxError::Arithmetic(ArithmeticError::InvalidGroup))
    );
}

#[test]
fn malformed_server_messages() {
    let mut truncated = toy_client();
    assert_eq!(
        process_server_kx(&mut truncated, &TOY_SERVER_KX[..7]),
        Err(KxError::Decode(DecodeError::Truncated))
    );

    let mut trailing = toy_client();
    let mut message = TOY_SERVER_KX.to_vec();
    message.push(0x00);
    assert_eq!(
        process_server_kx(&mut trailing, &message),
        Err(KxError::Decode(DecodeError::TrailingBytes(1)))
    );
    assert_eq!(trailing.phase(), KxPhase::Failed);
}

#[test]
fn client_message_before_server_message_is_state_error() {
    let mut session = Session::new(Role::Client);
    assert_eq!(
        generate_client_kx(&mut session),
        Err(KxError::State(StateError::OutOfOrder(KxPhase::Init)))
    );
    assert_eq!(session.phase(), KxPhase::Failed);
}

#[test]
fn server_message_cannot_be_processed_twice() {
    let mut session = toy_client();
    process_server_kx(&mut session, &TOY_SERVER_KX).unwrap();
    assert_eq!(
        process_server_kx(&mut session, &TOY_SERVER_KX),
        Err(KxError::State(StateError::OutOfOrder(KxPhase::ParamsConsumed)))
    );
    assert!(session.peer_contribution().is_none());
}

#[test]
fn server_session_cannot_run_client_steps() {
    let mut session = Session::new(Role::Server);
    assert_eq!(
        process_server_kx(&mut session, &TOY_SERVER_KX),
        Err(KxError::State(StateError::WrongRole(Role::Server)))
    );
}

#[test]
fn keygen_failure_releases_contribution() {
    let mut session = toy_client();
    process_server_kx(&mut session, &TOY_SERVER_KX).unwrap();
    let result = generate_client_kx_with_keypair(&mut session, |_| {
        Err(ArithmeticError::KeyGeneration.into())
    });
    assert_eq!(result, Err(KxError::Arithmetic(ArithmeticError::KeyGeneration)));
    assert!(session.peer_contribution().is_none());
    assert!(session.premaster_secret().is_none());
}

#[test]
fn injected_contribution_is_validated() {
    let params = FixedGroups.get_params(1024).unwrap();
    let p_minus_one = params.prime() - BigUint::from(1u32);
    for value in [BigUint::from(0u32), BigUint::from(1u32), p_minus_one] {
        let mut session = Session::new(Role::Client);
        session
            .set_peer_contribution(ServerContribution {
                params: params.clone(),
                public_value: value,
            })
            .unwrap();
        assert_eq!(
            generate_client_kx(&mut session),
            Err(KxError::Arithmetic(ArithmeticError::PublicValueOutOfRange))
        );
        assert_eq!(session.phase(), KxPhase::Failed);
        assert!(session.premaster_secret().is_none());
    }
}

#[test]
fn injected_group_outside_window_is_rejected() {
    let mut session = Session::new(Role::Client);
    session
        .set_peer_contribution(ServerContribution {
            params: DhParameters::new(BigUint::from(23u32), BigUint::from(5u32)).unwrap(),
            public_value: BigUint::from(8u32),
        })
        .unwrap();
    assert_eq!(
        generate_client_kx(&mut session),
        Err(KxError::Unsupported(UnsupportedError::PrimeTooSmall {
            bits: 5,
            min: MIN_DH_BITS,
        }))
    );
    assert!(session.premaster_secret().is_none());
}
