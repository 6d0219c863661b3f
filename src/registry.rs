//! The catalog of live binary extensions.

use std::collections::HashMap ;

use crate::dispatcher::invoke_isolated ;
use crate::extension::Extension ;
use crate::loader::LoadError ;
use crate::manifest::{ ExtensionManifest, ExtensionType };



/// One live extension instance and the manifest it came from.
pub struct LoadedExtension {
	/// Registry key; the manifest id, qualified for secondary contracts.
	pub id: String,
	pub manifest: ExtensionManifest,
	/// Contract category the instance was created for.
	pub kind: ExtensionType,
	pub instance: Box<dyn Extension>,
}

impl LoadedExtension {
	pub fn new( id: impl Into<String>, manifest: ExtensionManifest, kind: ExtensionType, instance: Box<dyn Extension> ) -> Self {
		Self { id: id.into(), manifest, kind, instance }
	}

	/// Disposes the instance under fault isolation.
	pub(crate) fn dispose_isolated( &mut self ) -> bool {
		let Self { manifest, instance, .. } = self ;
		invoke_isolated( manifest.name(), "dispose", || instance.dispose() ).is_ok()
	}
}

impl std::fmt::Debug for LoadedExtension {
	fn fmt( &self, f: &mut std::fmt::Formatter<'_> ) -> std::fmt::Result {
		f.debug_struct( "LoadedExtension" )
			.field( "id", &self.id )
			.field( "manifest", &self.manifest )
			.field( "kind", &self.kind )
			.finish_non_exhaustive()
	}
}

/// Live extensions keyed by id. Ids are unique; the first registration wins.
#[derive( Debug, Default )]
pub struct ExtensionRegistry {
	extensions: HashMap<String, LoadedExtension>,
}

impl ExtensionRegistry {

	pub fn new() -> Self { Self::default() }

	/// Adds an extension under its id.
	///
	/// # Errors
	/// Returns [`LoadError::DuplicateIdentity`] if the id is taken. The registered
	/// extension is kept; the rejected one is handed back for the caller to dispose.
	pub fn register( &mut self, extension: LoadedExtension ) -> Result<(), ( LoadError, LoadedExtension )> {
		match self.extensions.contains_key( &extension.id ) {
			true => {
				tracing::warn!( extension = %extension.manifest, id = %extension.id, "Extension id already registered" );
				Err(( LoadError::DuplicateIdentity( extension.id.clone() ), extension ))
			}
			false => {
				self.extensions.insert( extension.id.clone(), extension );
				Ok(())
			}
		}
	}

	pub fn get( &self, id: &str ) -> Option<&LoadedExtension> { self.extensions.get( id ) }
	pub fn get_mut( &mut self, id: &str ) -> Option<&mut LoadedExtension> { self.extensions.get_mut( id ) }
	pub fn contains( &self, id: &str ) -> bool { self.extensions.contains_key( id ) }
	pub fn len( &self ) -> usize { self.extensions.len() }
	pub fn is_empty( &self ) -> bool { self.extensions.is_empty() }
	pub fn ids( &self ) -> impl Iterator<Item = &str> { self.extensions.keys().map( String::as_str ) }

	/// Whether any live instance was loaded from a manifest declaring `manifest_id`.
	pub fn provides( &self, manifest_id: &str ) -> bool {
		self.extensions.values().any(| extension | extension.manifest.id() == manifest_id )
	}

	/// Extensions whose manifest declares `kind`.
	pub fn of_type( &self, kind: ExtensionType ) -> impl Iterator<Item = ( &str, &LoadedExtension )> {
		self.extensions.iter()
			.filter( move |( _, extension )| extension.manifest.kind() == kind )
			.map(|( id, extension )| ( id.as_str(), extension ))
	}

	pub fn library_extensions( &self ) -> impl Iterator<Item = ( &str, &LoadedExtension )> { self.of_type( ExtensionType::GameLibrary ) }
	pub fn metadata_extensions( &self ) -> impl Iterator<Item = ( &str, &LoadedExtension )> { self.of_type( ExtensionType::MetadataProvider ) }
	pub fn generic_extensions( &self ) -> impl Iterator<Item = ( &str, &LoadedExtension )> { self.of_type( ExtensionType::GenericPlugin ) }

	pub fn iter_mut( &mut self ) -> impl Iterator<Item = &mut LoadedExtension> { self.extensions.values_mut() }

	/// Disposes and drops every extension. Faults are logged and do not stop the rest.
	/// Returns the number of faulted disposals.
	pub fn dispose_all( &mut self ) -> usize {
		self.extensions.drain()
			.map(|( _, mut extension )| extension.dispose_isolated() )
			.filter(| disposed | !disposed )
			.count()
	}

}

#[cfg( test )]
mod tests {

	use std::path::Path ;
	use crate::extension::{ HandlerError, Notification };
	use super::*;

	struct Inert ;
	impl Extension for Inert {
		fn notify( &mut self, _: &Notification<'_> ) -> Result<(), HandlerError> { Ok(()) }
	}

	fn loaded( id: &str, kind: &str ) -> LoadedExtension {
		let text = format!( "Id = \"{id}\"\nName = \"{id}\"\nType = \"{kind}\"\nModule = \"m.wasm\"\n" );
		let manifest = ExtensionManifest::parse( &text, &Path::new( "/ext" ).join( id ).join( "extension.toml" ))
			.expect( "valid descriptor" );
		let kind = manifest.kind();
		LoadedExtension::new( id, manifest, kind, Box::new( Inert ))
	}

	#[test]
	fn typed_views_filter_by_manifest_type() {
		let mut registry = ExtensionRegistry::new();
		registry.register( loaded( "a", "GameLibrary" )).expect( "unique id" );
		registry.register( loaded( "b", "MetadataProvider" )).expect( "unique id" );
		registry.register( loaded( "c", "GameLibrary" )).expect( "unique id" );

		let mut libraries = registry.library_extensions().map(|( id, _ )| id ).collect::<Vec<_>>();
		libraries.sort_unstable();
		assert_eq!( libraries, vec![ "a", "c" ]);
		assert_eq!( registry.metadata_extensions().count(), 1 );
		assert_eq!( registry.generic_extensions().count(), 0 );
	}

	#[test]
	fn duplicate_registration_keeps_first() {
		let mut registry = ExtensionRegistry::new();
		registry.register( loaded( "a", "GameLibrary" )).expect( "unique id" );
		match registry.register( loaded( "a", "GenericPlugin" )) {
			Err(( LoadError::DuplicateIdentity( id ), _ )) => assert_eq!( id, "a" ),
			value => panic!( "Expected DuplicateIdentity error, found: {:#?}", value ),
		}
		assert_eq!( registry.len(), 1 );
		assert_eq!( registry.get( "a" ).map(| extension | extension.kind ), Some( ExtensionType::GameLibrary ));
	}

}
