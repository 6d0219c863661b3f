use wasm_extension_host::ExtensionType ;
use crate::fixtures ;

#[test]
fn module_may_contribute_several_categories() {

	let mut test = fixtures::host();
	let manifest = fixtures::plugin( &test.extensions_dir, "acme.multi", ExtensionType::GameLibrary, fixtures::MULTI_CONTRACT_PLUGIN );

	assert!( test.host.load_plugins_from( &[ manifest ]));

	let registry = test.host.registry();
	let mut ids = registry.ids().collect::<Vec<_>>();
	ids.sort_unstable();
	assert_eq!( ids, vec![ "acme.multi", "acme.multi/metadata-plugin" ]);
	assert_eq!( registry.get( "acme.multi" ).map(| loaded | loaded.kind ), Some( ExtensionType::GameLibrary ));
	assert_eq!(
		registry.get( "acme.multi/metadata-plugin" ).map(| loaded | loaded.kind ),
		Some( ExtensionType::MetadataProvider ),
	);
	// Typed views follow the manifest's declared type.
	assert_eq!( registry.library_extensions().count(), 2 );
	assert_eq!( registry.metadata_extensions().count(), 0 );

}
