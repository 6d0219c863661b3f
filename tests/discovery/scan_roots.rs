use wasm_extension_host::{ DescriptorError, ExtensionType, HostConfig, ManifestStore };
use crate::fixtures ;

#[test]
fn scan_finds_nested_descriptors_and_skips_broken_ones() {

	fixtures::init_tracing();
	let root = tempfile::tempdir().expect( "Failed to create temp dir" );
	let program = root.path().join( "Program" );
	fixtures::write_extension( &program, "Steam", &fixtures::descriptor( "acme.steam", ExtensionType::GameLibrary, "steam.wat" ), "steam.wat", None );
	fixtures::write_extension( &program.join( "nested" ), "Igdb", &fixtures::descriptor( "acme.igdb", ExtensionType::MetadataProvider, "igdb.wat" ), "igdb.wat", None );
	std::fs::create_dir_all( program.join( "Broken" )).expect( "Failed to create directory" );
	std::fs::write( program.join( "Broken" ).join( "extension.toml" ), "Id = [" ).expect( "Failed to write descriptor" );

	let store = ManifestStore::with_roots([ program.clone() ]);
	let ( manifests, errors ) = store.discover_with_errors();

	let mut ids = manifests.iter().map(| manifest | manifest.id() ).collect::<Vec<_>>();
	ids.sort_unstable();
	assert_eq!( ids, vec![ "acme.igdb", "acme.steam" ]);
	assert_eq!( errors.len(), 1 );
	match &errors[0] {
		DescriptorError::Toml { path, .. } => assert!( path.starts_with( program.join( "Broken" ))),
		value => panic!( "Expected Toml error, found: {:#?}", value ),
	}
	assert_eq!( store.discover_manifests().len(), 2 );

}

#[test]
fn scan_merges_user_and_external_roots_unless_portable() {

	let root = tempfile::tempdir().expect( "Failed to create temp dir" );
	let program = root.path().join( "Program" );
	let user = root.path().join( "User" );
	let external = root.path().join( "Dev" );
	fixtures::script( &program, "acme.program", "" );
	fixtures::script( &user, "acme.user", "" );
	fixtures::script( &external, "acme.dev", "" );

	let config = HostConfig::default()
		.with_program_extensions_dir( &program )
		.with_user_extensions_dir( &user )
		.with_external_dirs([ external.clone() ]);

	let ids = | config: &HostConfig | {
		let mut ids = ManifestStore::new( config ).discover_manifests().iter()
			.map(| manifest | manifest.id().to_string() )
			.collect::<Vec<_>>();
		ids.sort_unstable();
		ids
	};

	assert_eq!( ids( &config ), vec![ "acme.dev", "acme.program", "acme.user" ]);
	assert_eq!( ids( &config.clone().with_portable( true )), vec![ "acme.dev", "acme.program" ]);

}

#[test]
fn scan_ignores_missing_roots() {

	let root = tempfile::tempdir().expect( "Failed to create temp dir" );
	let store = ManifestStore::with_roots([ root.path().join( "absent" ) ]);
	let ( manifests, errors ) = store.discover_with_errors();
	assert!( manifests.is_empty() );
	assert!( errors.is_empty() );

}

#[test]
fn external_root_may_be_an_extension_directory_itself() {

	let root = tempfile::tempdir().expect( "Failed to create temp dir" );
	let manifest = fixtures::script( root.path(), "acme.sideloaded", "" );
	let store = ManifestStore::with_roots([ manifest.directory_path().to_path_buf() ]);
	assert_eq!( store.discover_manifests(), vec![ manifest ]);

}
