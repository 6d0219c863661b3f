use semver::Version ;
use wasm_extension_host::{ Component, CompatibilityVerifier, Engine, ExtensionType, Incompatibility };
use crate::fixtures ;

fn verify( imports: &[&str] ) -> Result<(), Incompatibility> {
	let engine = Engine::default();
	let component = Component::new( &engine, fixtures::component_importing( imports )).expect( "Failed to compile component" );
	let manifest = fixtures::native_manifest( "acme.checked", ExtensionType::GenericPlugin );
	CompatibilityVerifier::new( fixtures::HOST_SDK ).verify_component( &engine, &component, &manifest )
}

#[test]
fn verify_accepts_same_major_older_minor() {
	assert_eq!( verify( &[ "host:sdk/runtime@2.0.0" ]), Ok(()) );
	assert_eq!( verify( &[ "host:sdk/runtime@2.1.0" ]), Ok(()) );
}

#[test]
fn verify_rejects_major_mismatch() {
	match verify( &[ "host:sdk/runtime@3.0.0" ]) {
		Err( Incompatibility::MajorMismatch { required, host }) => {
			assert_eq!( required, Version::new( 3, 0, 0 ));
			assert_eq!( host, fixtures::HOST_SDK );
		}
		value => panic!( "Expected MajorMismatch error, found: {:#?}", value ),
	}
	match verify( &[ "host:sdk/runtime@1.9.0" ]) {
		Err( Incompatibility::MajorMismatch { .. }) => {}
		value => panic!( "Expected MajorMismatch error, found: {:#?}", value ),
	}
}

#[test]
fn verify_rejects_newer_minor() {
	match verify( &[ "host:sdk/runtime@2.2.0" ]) {
		Err( Incompatibility::NewerSdk { required, .. }) => assert_eq!( required, Version::new( 2, 2, 0 )),
		value => panic!( "Expected NewerSdk error, found: {:#?}", value ),
	}
	match verify( &[ "host:sdk/runtime@2.1.1" ]) {
		Err( Incompatibility::NewerSdk { .. }) => {}
		value => panic!( "Expected NewerSdk error, found: {:#?}", value ),
	}
}

#[test]
fn verify_rejects_missing_sdk_reference() {
	assert_eq!( verify( &[] ), Err( Incompatibility::MissingSdkReference ));
	assert_eq!( verify( &[ "acme:tools/log@2.0.0" ]), Err( Incompatibility::MissingSdkReference ));
}

#[test]
fn verify_reduces_reason_to_verdict() {
	let verifier = CompatibilityVerifier::new( fixtures::HOST_SDK );
	let manifest = fixtures::native_manifest( "acme.checked", ExtensionType::GenericPlugin );
	assert!( verifier.verify([ "host:sdk/runtime@2.0.0" ], &manifest ));
	assert!( !verifier.verify([ "host:sdk/runtime@3.0.0" ], &manifest ));
}
