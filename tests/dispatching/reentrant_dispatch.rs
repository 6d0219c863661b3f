use std::cell::RefCell ;
use std::rc::Rc ;
use wasm_extension_host::{
	DispatchError, DispatchReport, EventDispatcher, Extension, Extensions, ExtensionType,
	HandlerError, LoadedExtension, Notification,
};
use crate::fixtures ;

/// Raises a nested notification from inside its handler.
struct Echo {
	dispatcher: Rc<RefCell<Option<EventDispatcher>>>,
	nested: Rc<RefCell<Vec<DispatchReport>>>,
}

impl Extension for Echo {
	fn notify( &mut self, _: &Notification<'_> ) -> Result<(), HandlerError> {
		if let Some( dispatcher ) = self.dispatcher.borrow().as_ref() {
			self.nested.borrow_mut().push( dispatcher.library_updated() );
		}
		Ok(())
	}
}

#[test]
fn nested_dispatch_is_rejected() {

	fixtures::init_tracing();
	let slot = Rc::new( RefCell::new( None ));
	let nested = Rc::new( RefCell::new( Vec::new() ));
	let echo = Echo { dispatcher: Rc::clone( &slot ), nested: Rc::clone( &nested ) };

	let mut extensions = Extensions::default();
	extensions.registry.register( LoadedExtension::new(
		"echo",
		fixtures::native_manifest( "echo", ExtensionType::GenericPlugin ),
		ExtensionType::GenericPlugin,
		Box::new( echo ),
	)).expect( "Failed to register extension" );
	let dispatcher = EventDispatcher::new( Rc::new( RefCell::new( extensions )), Rc::new( fixtures::games() ));
	*slot.borrow_mut() = Some( dispatcher.clone() );

	let report = dispatcher.application_started();
	crate::assert_no_faults!( report );

	let nested = nested.borrow();
	assert_eq!( nested.len(), 1 );
	assert_eq!( nested[0].rejected, Some( DispatchError::Reentrant( "on_library_updated" )));
	assert_eq!( nested[0].notified, 0 );

	// Break the cycle between the dispatcher and the extension it owns.
	slot.borrow_mut().take();

}
