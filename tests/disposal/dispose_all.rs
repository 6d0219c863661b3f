use std::cell::RefCell ;
use std::rc::Rc ;
use wasm_extension_host::{ ExtensionRegistry, Extensions, ExtensionType };
use crate::fixtures::{ self, Behaviour };

#[test]
fn dispose_all_continues_past_faults() {

	fixtures::init_tracing();
	let journal = Rc::new( RefCell::new( Vec::new() ));
	let mut registry = ExtensionRegistry::new();
	for ( id, behaviour ) in [( "a", Behaviour::Succeed ), ( "b", Behaviour::Fail ), ( "c", Behaviour::Panic ), ( "d", Behaviour::Succeed )] {
		registry.register( fixtures::recorder( id, ExtensionType::MetadataProvider, behaviour, &journal ))
			.expect( "Failed to register extension" );
	}

	assert_eq!( registry.dispose_all(), 2 );
	assert!( registry.is_empty() );

	let mut disposed = journal.borrow().clone();
	disposed.sort_unstable();
	assert_eq!( disposed, vec![ "a extension:dispose", "b extension:dispose", "c extension:dispose", "d extension:dispose" ]);

}

#[test]
fn dispose_all_empties_scripts_and_registry() {

	let journal = Rc::new( RefCell::new( Vec::new() ));
	let mut extensions = Extensions::default();
	extensions.scripts.push( fixtures::recorder( "s1", ExtensionType::Script, Behaviour::Fail, &journal ));
	extensions.scripts.push( fixtures::recorder( "s2", ExtensionType::Script, Behaviour::Succeed, &journal ));
	extensions.registry.register( fixtures::recorder( "p1", ExtensionType::GameLibrary, Behaviour::Succeed, &journal ))
		.expect( "Failed to register extension" );

	assert_eq!( extensions.dispose_all(), 1 );
	assert!( extensions.scripts.is_empty() );
	assert!( extensions.registry.is_empty() );
	assert_eq!( journal.borrow().len(), 3 );

	// Nothing left to dispose a second time.
	assert_eq!( extensions.dispose_all(), 0 );
	assert_eq!( journal.borrow().len(), 3 );

}
