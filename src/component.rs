//! Binary extensions: instantiated WebAssembly components.
//!
//! A component is instantiated once. Every exported instance named after one of the
//! plugin contract interfaces becomes its own [`ComponentExtension`], all of them
//! sharing the same store and instance.

use std::cell::RefCell ;
use std::rc::Rc ;
use wasmtime::Store ;
use wasmtime::component::{ Instance, Val };

use crate::extension::{ Extension, HandlerError, Notification };
use crate::host_api::ExtensionContext ;
use crate::manifest::ExtensionType ;
use crate::verifier::{ InterfaceName, SDK_PACKAGE };



/// Function a contract instance may export to release its resources.
pub const DISPOSE_FUNCTION: &str = "dispose" ;

/// Plugin contract interfaces and the category each one stands for.
pub const CONTRACTS: &[( &str, ExtensionType )] = &[
	( "library-plugin", ExtensionType::GameLibrary ),
	( "metadata-plugin", ExtensionType::MetadataProvider ),
	( "generic-plugin", ExtensionType::GenericPlugin ),
];

/// The category a component export implements, if it names a contract interface.
pub fn contract_of( export_name: &str ) -> Option<ExtensionType> {
	let parsed = InterfaceName::parse( export_name )?;
	if parsed.package != SDK_PACKAGE { return None }
	let interface = parsed.interface?;
	CONTRACTS.iter()
		.find(|( contract, _ )| *contract == interface )
		.map(|( _, kind )| *kind )
}

/// An instantiated component with its store.
pub struct ComponentInstance {
	pub(crate) store: Store<ExtensionContext>,
	pub(crate) instance: Instance,
}

impl ComponentInstance {
	pub(crate) fn new( store: Store<ExtensionContext>, instance: Instance ) -> Self { Self { store, instance }}
}

impl std::fmt::Debug for ComponentInstance {
	fn fmt( &self, f: &mut std::fmt::Formatter<'_> ) -> std::fmt::Result {
		f.debug_struct( "ComponentInstance" )
			.field( "data", self.store.data() )
			.finish_non_exhaustive()
	}
}

/// One contract implementation exported by a component.
#[derive( Debug )]
pub struct ComponentExtension {
	instance: Rc<RefCell<ComponentInstance>>,
	interface: String,
	kind: ExtensionType,
}

impl ComponentExtension {

	pub(crate) fn new( instance: Rc<RefCell<ComponentInstance>>, interface: String, kind: ExtensionType ) -> Self {
		Self { instance, interface, kind }
	}

	/// Full name of the exported contract instance.
	#[inline] pub fn interface( &self ) -> &str { &self.interface }
	/// The contract category this instance implements.
	#[inline] pub fn kind( &self ) -> ExtensionType { self.kind }

	/// Calls `function_name` on the contract instance. Functions the component does
	/// not export are skipped.
	fn call( &mut self, function_name: &str, args: &[Val] ) -> Result<(), HandlerError> {

		let mut guard = self.instance.try_borrow_mut().map_err(| _ | HandlerError::LockRejected )?;
		let ComponentInstance { store, instance } = &mut *guard ;

		let interface_index = instance
			.get_export_index( &mut *store, None, &self.interface )
			.ok_or_else(|| HandlerError::Custom( format!( "Invalid Interface Path: {}", self.interface )))?;
		let Some( func_index ) = instance.get_export_index( &mut *store, Some( &interface_index ), function_name ) else {
			return Ok(())
		};
		let Some( func ) = instance.get_func( &mut *store, func_index ) else { return Ok(()) };

		func.call( &mut *store, args, &mut [] ).map_err( HandlerError::RuntimeException )?;
		let _ = func.post_return( &mut *store );
		Ok(())

	}

}

fn game_ids( ids: &[crate::game::GameId] ) -> Val {
	Val::List( ids.iter().map(| id | Val::String( id.0.clone() )).collect())
}

impl Extension for ComponentExtension {

	fn notify( &mut self, notification: &Notification<'_> ) -> Result<(), HandlerError> {
		let args = match notification {
			Notification::GameStopped { game, elapsed } => vec![ Val::String( game.id.0.clone() ), Val::U64( elapsed.as_secs() )],
			Notification::GameSelected( change ) => vec![ game_ids( &change.old ), game_ids( &change.new )],
			other => match other.game() {
				Some( game ) => vec![ Val::String( game.id.0.clone() )],
				None => Vec::with_capacity( 0 ),
			},
		};
		self.call( notification.export_name(), &args )
	}

	fn dispose( &mut self ) -> Result<(), HandlerError> {
		self.call( DISPOSE_FUNCTION, &[] )
	}

}

#[cfg( test )]
mod tests {

	use super::*;

	#[test]
	fn recognises_contract_exports() {
		assert_eq!( contract_of( "host:sdk/library-plugin@2.0.0" ), Some( ExtensionType::GameLibrary ));
		assert_eq!( contract_of( "host:sdk/generic-plugin" ), Some( ExtensionType::GenericPlugin ));
		assert_eq!( contract_of( "host:sdk/runtime@2.0.0" ), None );
		assert_eq!( contract_of( "acme:sdk/library-plugin@2.0.0" ), None );
		assert_eq!( contract_of( "library-plugin" ), None );
	}

}
