use std::time::Duration ;
use wasm_extension_host::{ ControllerEvent, ControllerEventKind, GameId };
use crate::fixtures ;

#[test]
fn controller_events_reach_extensions() {

	let mut test = fixtures::host();
	let manifest = fixtures::script( &test.extensions_dir, "acme.recorder", fixtures::RECORDING_SCRIPT );
	assert!( test.host.load_scripts_from( &[ manifest ]));

	assert_eq!( test.events.emit( &ControllerEvent::Started( Some( GameId::from( "g2" )))), 1 );
	test.events.emit( &ControllerEvent::Stopped { game: Some( GameId::from( "g2" )), elapsed: Duration::from_secs( 3 ) });

	assert_eq!( test.api.log(), vec![ "started Portal", "stopped g2 after 3" ]);

}

#[test]
fn controller_event_without_game_is_dropped() {

	let mut test = fixtures::host();
	let manifest = fixtures::script( &test.extensions_dir, "acme.recorder", fixtures::RECORDING_SCRIPT );
	assert!( test.host.load_scripts_from( &[ manifest ]));

	test.events.emit( &ControllerEvent::Stopped { game: None, elapsed: Duration::from_secs( 3 ) });
	test.events.emit( &ControllerEvent::Started( None ));

	assert!( test.api.log().is_empty() );

}

#[test]
fn host_subscribes_once_per_event_kind() {

	let test = fixtures::host();
	for kind in ControllerEventKind::ALL {
		assert_eq!( test.events.subscriber_count( kind ), 1 );
	}

}
