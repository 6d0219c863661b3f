//! Turns one manifest into live extension instances.
//!
//! Scripts get a runtime of their own. Components are verified, instantiated once and
//! then split into one instance per exported contract interface, so a single module
//! may contribute zero, one or several extensions, possibly of different categories.

use std::cell::RefCell ;
use std::panic::AssertUnwindSafe ;
use std::path::PathBuf ;
use std::rc::Rc ;
use thiserror::Error ;
use wasmtime::{ Engine, Store };
use wasmtime::component::{ Component, Linker };

use crate::component::{ contract_of, ComponentExtension, ComponentInstance };
use crate::host_api::{ ExtensionContext, HostApi, LocalizationLoader };
use crate::manifest::{ ExtensionManifest, ExtensionType };
use crate::registry::LoadedExtension ;
use crate::script::ScriptExtension ;
use crate::utils::panic_message ;
use crate::verifier::{ CompatibilityVerifier, Incompatibility };



/// Reasons a manifest fails to load.
#[derive( Error, Debug )]
pub enum LoadError {
	#[error( "Descriptor '{}' declares no Id", .0.display() )] MissingIdentity( PathBuf ),
	#[error( "Module '{}' does not exist", .0.display() )] ModuleNotFound( PathBuf ),
	#[error( "Incompatible module: {0}" )] Incompatible( #[from] Incompatibility ),
	#[error( "Component error: {0}" )] Component( wasmtime::Error ),
	#[error( "Script error: {0}" )] Script( String ),
	#[error( "IO error at '{}': {source}", .path.display() )] Io { path: PathBuf, source: std::io::Error },
	#[error( "Panicked while loading: {0}" )] Panicked( String ),
	#[error( "Extension id '{0}' is already registered" )] DuplicateIdentity( String ),
}

/// Characters that cannot appear in a directory name on some platform.
const UNSAFE_CHARACTERS: &[char] = &[ '<', '>', ':', '"', '/', '\\', '|', '?', '*' ];

/// Makes an extension id usable as a directory name.
pub fn sanitize_dir_name( id: &str ) -> String {
	let sanitized = id.chars()
		.map(| c | match c.is_control() || UNSAFE_CHARACTERS.contains( &c ) {
			true => '_',
			false => c,
		})
		.collect::<String>();
	match sanitized.trim_matches( '.' ).is_empty() {
		true => "_".to_string(),
		false => sanitized,
	}
}

/// Runs a load step, converting a panic into [`LoadError::Panicked`].
pub(crate) fn load_isolated<T>( load: impl FnOnce() -> Result<T, LoadError> ) -> Result<T, LoadError> {
	std::panic::catch_unwind( AssertUnwindSafe( load ))
		.unwrap_or_else(| payload | Err( LoadError::Panicked( panic_message( &*payload ))))
}

/// Loads modules of both kinds on behalf of the host.
pub struct ModuleLoader {
	engine: Engine,
	linker: Linker<ExtensionContext>,
	verifier: CompatibilityVerifier,
	host_api: Rc<dyn HostApi>,
	localization: Rc<dyn LocalizationLoader>,
	data_root: PathBuf,
}

impl std::fmt::Debug for ModuleLoader {
	fn fmt( &self, f: &mut std::fmt::Formatter<'_> ) -> std::fmt::Result {
		f.debug_struct( "ModuleLoader" )
			.field( "verifier", &self.verifier )
			.field( "data_root", &self.data_root )
			.finish_non_exhaustive()
	}
}

impl ModuleLoader {

	/// Creates a loader whose linker holds the host API's exports.
	///
	/// # Errors
	/// Returns an error if the host API fails to link.
	pub fn new(
		engine: Engine,
		verifier: CompatibilityVerifier,
		host_api: Rc<dyn HostApi>,
		localization: Rc<dyn LocalizationLoader>,
		data_root: impl Into<PathBuf>,
	) -> Result<Self, wasmtime::Error> {
		let mut linker = Linker::new( &engine );
		host_api.link( &mut linker )?;
		Ok( Self { engine, linker, verifier, host_api, localization, data_root: data_root.into() })
	}

	#[inline] pub fn engine( &self ) -> &Engine { &self.engine }
	#[inline] pub fn verifier( &self ) -> &CompatibilityVerifier { &self.verifier }

	/// Private data directory of the extension described by `manifest`.
	pub fn data_path( &self, manifest: &ExtensionManifest ) -> PathBuf {
		self.data_root.join( sanitize_dir_name( manifest.id() ))
	}

	fn entry_point( manifest: &ExtensionManifest ) -> Result<PathBuf, LoadError> {
		if !manifest.has_identity() {
			return Err( LoadError::MissingIdentity( manifest.description_path().to_path_buf() ));
		}
		let module_path = manifest.module_path();
		match module_path.is_file() {
			true => Ok( module_path ),
			false => Err( LoadError::ModuleNotFound( module_path )),
		}
	}

	/// Loads every extension instance `manifest` provides.
	///
	/// # Errors
	/// Returns a [`LoadError`] if the manifest has no id, its module is missing, fails
	/// verification or cannot be instantiated.
	pub fn load_extensions_for( &self, manifest: &ExtensionManifest ) -> Result<Vec<LoadedExtension>, LoadError> {
		if manifest.kind().is_script() {
			let script = self.load_script( manifest )?;
			return Ok( vec![ LoadedExtension::new( manifest.id(), manifest.clone(), ExtensionType::Script, Box::new( script ))]);
		}

		let module_path = Self::entry_point( manifest )?;
		let component = Component::from_file( &self.engine, &module_path ).map_err( LoadError::Component )?;
		self.verifier.verify_component( &self.engine, &component, manifest )?;

		let context = ExtensionContext::new( manifest.id(), manifest.directory_path(), self.data_path( manifest ));
		let mut store = Store::new( &self.engine, context );
		let instance = self.linker.instantiate( &mut store, &component ).map_err( LoadError::Component )?;

		let contracts = component.component_type()
			.exports( &self.engine )
			.filter_map(|( name, _ )| contract_of( name ).map(| kind | ( name.to_string(), kind )))
			.collect::<Vec<_>>();
		if contracts.is_empty() {
			tracing::info!( extension = %manifest, "Module exports no extension contract" );
		}

		let shared = Rc::new( RefCell::new( ComponentInstance::new( store, instance )));
		Ok( contracts.into_iter()
			.map(|( interface, kind )| {
				let id = instance_id( manifest, &interface, kind );
				let extension = ComponentExtension::new( Rc::clone( &shared ), interface, kind );
				LoadedExtension::new( id, manifest.clone(), kind, Box::new( extension ))
			})
			.collect())
	}

	/// Loads a script extension.
	///
	/// # Errors
	/// Returns a [`LoadError`] if the manifest has no id, the script is missing, its
	/// data directory cannot be created or evaluating it throws.
	pub fn load_script( &self, manifest: &ExtensionManifest ) -> Result<ScriptExtension, LoadError> {
		let module_path = Self::entry_point( manifest )?;
		let source = std::fs::read_to_string( &module_path )
			.map_err(| source | LoadError::Io { path: module_path.clone(), source })?;

		let data_path = self.data_path( manifest );
		std::fs::create_dir_all( &data_path )
			.map_err(| source | LoadError::Io { path: data_path.clone(), source })?;

		let script = ScriptExtension::new( manifest, &source, &*self.host_api, &data_path ).map_err( LoadError::Script )?;
		if let Err( err ) = self.localization.load_extension_localization( manifest ) {
			tracing::warn!( extension = %manifest, error = %err, "Failed to load extension localization" );
		}
		Ok( script )
	}

}

/// Registry key of one contract instance. The contract matching the manifest's own
/// type takes the manifest id; any other contract is qualified with its interface.
fn instance_id( manifest: &ExtensionManifest, interface: &str, kind: ExtensionType ) -> String {
	match kind == manifest.kind() {
		true => manifest.id().to_string(),
		false => {
			let contract = interface.split_once( '/' ).map_or( interface, |( _, rest )| rest );
			let contract = contract.split_once( '@' ).map_or( contract, |( name, _ )| name );
			format!( "{}/{}", manifest.id(), contract )
		}
	}
}

#[cfg( test )]
mod tests {

	use std::path::Path ;
	use super::*;

	#[test]
	fn sanitizes_unsafe_characters() {
		assert_eq!( sanitize_dir_name( "acme.steam-library" ), "acme.steam-library" );
		assert_eq!( sanitize_dir_name( "a/b\\c:d*e?f\"g<h>i|j" ), "a_b_c_d_e_f_g_h_i_j" );
		assert_eq!( sanitize_dir_name( "tab\there" ), "tab_here" );
		assert_eq!( sanitize_dir_name( ".." ), "_" );
	}

	#[test]
	fn secondary_contracts_get_qualified_ids() {
		let text = "Id = \"acme.multi\"\nName = \"Multi\"\nType = \"GameLibrary\"\nModule = \"m.wasm\"\n" ;
		let manifest = ExtensionManifest::parse( text, Path::new( "/ext/multi/extension.toml" )).expect( "valid descriptor" );
		assert_eq!( instance_id( &manifest, "host:sdk/library-plugin@2.0.0", ExtensionType::GameLibrary ), "acme.multi" );
		assert_eq!( instance_id( &manifest, "host:sdk/metadata-plugin@2.0.0", ExtensionType::MetadataProvider ), "acme.multi/metadata-plugin" );
	}

	#[test]
	fn panics_become_load_errors() {
		match load_isolated::<()>(|| panic!( "boom" )) {
			Err( LoadError::Panicked( message )) => assert_eq!( message, "boom" ),
			value => panic!( "Expected Panicked error, found: {:#?}", value ),
		}
	}

}
