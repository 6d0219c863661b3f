use std::cell::RefCell ;
use std::rc::Rc ;
use wasm_extension_host::{ EventDispatcher, Extensions, ExtensionType };
use crate::fixtures::{ self, Behaviour };

#[test]
fn scripts_are_notified_before_plugins_in_load_order() {

	let journal = Rc::new( RefCell::new( Vec::new() ));
	let mut extensions = Extensions::default();
	extensions.registry.register( fixtures::recorder( "plugin", ExtensionType::GameLibrary, Behaviour::Succeed, &journal ))
		.expect( "Failed to register extension" );
	for id in [ "script-b", "script-a", "script-c" ] {
		extensions.scripts.push( fixtures::recorder( id, ExtensionType::Script, Behaviour::Succeed, &journal ));
	}
	let dispatcher = EventDispatcher::new( Rc::new( RefCell::new( extensions )), Rc::new( fixtures::games() ));

	crate::assert_no_faults!( dispatcher.application_stopped() );

	assert_eq!( *journal.borrow(), vec![
		"script-b extension:on_application_stopped",
		"script-a extension:on_application_stopped",
		"script-c extension:on_application_stopped",
		"plugin extension:on_application_stopped",
	]);

}
