use wasm_extension_host::{ ControllerEvent, ControllerEventKind, ExtensionType, GameId };
use crate::fixtures ;

#[test]
fn host_dispose_is_idempotent_and_exhaustive() {

	let mut test = fixtures::host();
	let script = fixtures::script( &test.extensions_dir, "acme.script", fixtures::RECORDING_SCRIPT );
	let throwing = fixtures::script( &test.extensions_dir, "acme.throwing", fixtures::THROWING_SCRIPT );
	let plugin = fixtures::plugin( &test.extensions_dir, "acme.plugin", ExtensionType::GenericPlugin, fixtures::GENERIC_PLUGIN );
	let trapping = fixtures::plugin( &test.extensions_dir, "acme.trapping", ExtensionType::GenericPlugin, fixtures::TRAPPING_PLUGIN );

	assert!( test.host.load_scripts_from( &[ throwing, script ]));
	assert!( test.host.load_plugins_from( &[ trapping, plugin ]));

	test.host.dispose();
	assert!( test.host.scripts().is_empty() );
	assert!( test.host.registry().is_empty() );
	assert_eq!( test.api.disposed(), 1 );
	assert_eq!( test.api.log(), vec![ "acme.script disposed" ]);

	test.host.dispose();
	assert_eq!( test.api.disposed(), 1 );
	assert_eq!( test.api.log(), vec![ "acme.script disposed" ]);

}

#[test]
fn host_dispose_unsubscribes_every_event_kind() {

	let mut test = fixtures::host();
	let script = fixtures::script( &test.extensions_dir, "acme.script", fixtures::RECORDING_SCRIPT );
	assert!( test.host.load_scripts_from( &[ script ]));

	test.host.dispose();

	for kind in ControllerEventKind::ALL {
		assert_eq!( test.events.subscriber_count( kind ), 0, "{kind:?} still subscribed" );
	}
	assert_eq!( test.events.emit( &ControllerEvent::Started( Some( GameId::from( "g1" )))), 0 );

}

#[test]
fn dropping_host_disposes_extensions() {

	let test = fixtures::host();
	let fixtures::TestHost { mut host, api, events, extensions_dir, root } = test ;
	let plugin = fixtures::plugin( &extensions_dir, "acme.plugin", ExtensionType::GenericPlugin, fixtures::GENERIC_PLUGIN );
	assert!( host.load_plugins_from( &[ plugin ]));

	drop( host );

	assert_eq!( api.disposed(), 1 );
	assert_eq!( events.subscriber_count( ControllerEventKind::Installed ), 0 );
	drop( root );

}
