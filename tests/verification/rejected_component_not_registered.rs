use wasm_extension_host::{ ExtensionType, Incompatibility, LoadError };
use crate::fixtures ;

const FUTURE_PLUGIN: &str = r#"(component
	(import "host:sdk/runtime@3.0.0" (instance))
	(core module $m (func (export "noop")))
	(core instance $i (instantiate $m))
	(func $noop (canon lift (core func $i "noop")))
	(instance $plugin (export "on-application-started" (func $noop)))
	(export "host:sdk/generic-plugin@3.0.0" (instance $plugin))
)"#;

#[test]
fn incompatible_component_is_ledgered_not_registered() {

	let mut test = fixtures::host();
	let manifest = fixtures::plugin( &test.extensions_dir, "acme.future", ExtensionType::GenericPlugin, FUTURE_PLUGIN );

	match test.host.loader().load_extensions_for( &manifest ) {
		Err( LoadError::Incompatible( Incompatibility::MajorMismatch { .. })) => {}
		Err( err ) => panic!( "Expected Incompatible error, found: {:#?}", err ),
		Ok( loaded ) => panic!( "Expected Incompatible error, found {} instances", loaded.len() ),
	}

	assert!( !test.host.load_plugins_from( &[ manifest.clone() ]));
	assert!( test.host.registry().is_empty() );
	assert_eq!( test.host.failed_plugins().iter().collect::<Vec<_>>(), vec![ &manifest ]);

}

#[test]
fn third_party_component_importing_internals_is_rejected() {

	let mut test = fixtures::host();
	let wat = fixtures::component_importing( &[ "host:sdk/runtime@2.1.0", "host:internal/database@1.0.0" ]);
	let manifest = fixtures::plugin( &test.extensions_dir, "acme.sneaky", ExtensionType::GenericPlugin, &wat );

	assert!( !test.host.load_plugins_from( &[ manifest ]));
	assert_eq!( test.host.failed_plugins().names(), vec![ "acme.sneaky extension" ]);

}
