use wasm_extension_host::LoadError ;
use crate::fixtures ;

#[test]
fn script_throwing_during_evaluation_fails_to_load() {

	let mut test = fixtures::host();
	let manifest = fixtures::script( &test.extensions_dir, "acme.throws", "throw new Error( 'bad init' );" );

	match test.host.loader().load_script( &manifest ) {
		Err( LoadError::Script( message )) => assert!( message.contains( "bad init" ), "unexpected message: {message}" ),
		value => panic!( "Expected Script error, found: {:#?}", value.map(| _ | ()) ),
	}

	assert!( !test.host.load_scripts_from( &[ manifest ]));
	assert_eq!( test.host.failed_scripts().names(), vec![ "acme.throws extension" ]);

}

#[test]
fn script_with_syntax_error_fails_to_load() {

	let test = fixtures::host();
	let manifest = fixtures::script( &test.extensions_dir, "acme.syntax", "function ( {" );

	match test.host.loader().load_script( &manifest ) {
		Err( LoadError::Script( _ )) => {}
		value => panic!( "Expected Script error, found: {:#?}", value.map(| _ | ()) ),
	}

}
