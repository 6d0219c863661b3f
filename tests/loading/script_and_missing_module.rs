use wasm_extension_host::ExtensionType ;
use crate::fixtures ;

#[test]
fn load_cycle_keeps_valid_script_and_ledgers_missing_module() {

	let mut test = fixtures::host();
	let valid = fixtures::script( &test.extensions_dir, "acme.valid", fixtures::RECORDING_SCRIPT );
	let broken = fixtures::write_extension(
		&test.extensions_dir,
		"acme.broken",
		&fixtures::descriptor( "acme.broken", ExtensionType::Script, "missing.js" ),
		"missing.js",
		None,
	);

	assert!( !test.host.load_scripts_from( &[ valid, broken.clone() ]));

	let scripts = test.host.scripts();
	assert_eq!( scripts.len(), 1 );
	assert_eq!( scripts[0].id, "acme.valid" );
	assert_eq!( test.host.failed_scripts().iter().collect::<Vec<_>>(), vec![ &broken ]);

}

#[test]
fn load_cycle_succeeds_when_every_manifest_loads() {

	let mut test = fixtures::host();
	let first = fixtures::script( &test.extensions_dir, "acme.first", fixtures::RECORDING_SCRIPT );
	let second = fixtures::script( &test.extensions_dir, "acme.second", fixtures::RECORDING_SCRIPT );
	let plugin = fixtures::plugin( &test.extensions_dir, "acme.plugin", ExtensionType::GenericPlugin, fixtures::GENERIC_PLUGIN );

	assert!( test.host.load_scripts_from( &[ first, second, plugin ]));
	assert_eq!(
		test.host.scripts().iter().map(| script | script.id.as_str() ).collect::<Vec<_>>(),
		vec![ "acme.first", "acme.second" ],
	);
	assert!( test.host.failed_scripts().is_empty() );
	assert!( test.host.registry().is_empty() );

}

#[test]
fn load_cycle_discovers_manifests_from_configured_roots() {

	let mut test = fixtures::host();
	fixtures::script( &test.extensions_dir, "acme.valid", fixtures::RECORDING_SCRIPT );
	fixtures::plugin( &test.extensions_dir, "acme.plugin", ExtensionType::GenericPlugin, fixtures::GENERIC_PLUGIN );

	assert!( test.host.load_scripts() );
	assert!( test.host.load_plugins() );
	assert_eq!( test.host.scripts().len(), 1 );
	assert!( test.host.registry().contains( "acme.plugin" ));

}
