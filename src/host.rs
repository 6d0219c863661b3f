//! The extension host: owns the loaded extensions and drives load cycles.
//!
//! A load cycle disposes the previous generation of its kind, resets its own failure
//! ledger and then loads every eligible manifest independently. A failing manifest
//! lands in the ledger; the cycle always runs to completion.

use std::cell::{ Ref, RefCell };
use std::rc::Rc ;
use std::time::Instant ;
use wasmtime::Engine ;

use crate::config::HostConfig ;
use crate::dispatcher::{ EventDispatcher, Extensions };
use crate::events::{ ControllerEventKind, EventSource, Subscription };
use crate::game::GameDatabase ;
use crate::host_api::{ HostApi, LocalizationLoader };
use crate::ledger::FailureLedger ;
use crate::loader::{ load_isolated, LoadError, ModuleLoader };
use crate::manifest::{ ExtensionManifest, ExtensionType };
use crate::manifest_store::ManifestStore ;
use crate::registry::{ ExtensionRegistry, LoadedExtension };
use crate::verifier::{ is_builtin, CompatibilityVerifier };



/// Loads, owns and notifies extensions on behalf of the application.
pub struct ExtensionHost {
	config: HostConfig,
	loader: ModuleLoader,
	extensions: Rc<RefCell<Extensions>>,
	dispatcher: EventDispatcher,
	failed_scripts: FailureLedger,
	failed_plugins: FailureLedger,
	subscriptions: Vec<Subscription>,
}

impl std::fmt::Debug for ExtensionHost {
	fn fmt( &self, f: &mut std::fmt::Formatter<'_> ) -> std::fmt::Result {
		f.debug_struct( "ExtensionHost" )
			.field( "config", &self.config )
			.field( "loader", &self.loader )
			.field( "failed_scripts", &self.failed_scripts )
			.field( "failed_plugins", &self.failed_plugins )
			.finish_non_exhaustive()
	}
}

impl ExtensionHost {

	/// Creates a host with no extensions loaded and subscribes it to every
	/// controller event.
	///
	/// # Errors
	/// Returns an error if the host API fails to link.
	pub fn new(
		config: HostConfig,
		host_api: Rc<dyn HostApi>,
		database: Rc<dyn GameDatabase>,
		events: &EventSource,
		localization: Rc<dyn LocalizationLoader>,
	) -> Result<Self, wasmtime::Error> {

		let verifier = CompatibilityVerifier::new( config.sdk_version.clone() );
		let loader = ModuleLoader::new( Engine::default(), verifier, host_api, localization, config.extension_data_dir.clone() )?;
		let extensions = Rc::new( RefCell::new( Extensions::default() ));
		let dispatcher = EventDispatcher::new( Rc::clone( &extensions ), database );

		let subscriptions = ControllerEventKind::ALL.into_iter()
			.map(| kind | {
				let dispatcher = dispatcher.clone();
				events.subscribe( kind, move | event | { dispatcher.handle( event ); })
			})
			.collect();

		Ok( Self {
			config,
			loader,
			extensions,
			dispatcher,
			failed_scripts: FailureLedger::new(),
			failed_plugins: FailureLedger::new(),
			subscriptions,
		})

	}

	#[inline] pub fn config( &self ) -> &HostConfig { &self.config }
	#[inline] pub fn loader( &self ) -> &ModuleLoader { &self.loader }

	/// Notification entry point for events not raised by the controller.
	#[inline] pub fn dispatcher( &self ) -> &EventDispatcher { &self.dispatcher }

	/// Scripts that failed to load in the last script cycle.
	#[inline] pub fn failed_scripts( &self ) -> &FailureLedger { &self.failed_scripts }
	/// Binary extensions that failed to load in the last plugin cycle.
	#[inline] pub fn failed_plugins( &self ) -> &FailureLedger { &self.failed_plugins }

	/// Live script extensions in load order.
	pub fn scripts( &self ) -> Ref<'_, [LoadedExtension]> {
		Ref::map( self.extensions.borrow(), | extensions | extensions.scripts.as_slice() )
	}

	/// Live binary extensions.
	pub fn registry( &self ) -> Ref<'_, ExtensionRegistry> {
		Ref::map( self.extensions.borrow(), | extensions | &extensions.registry )
	}

	/// Scans the configured roots for descriptors.
	pub fn discover( &self ) -> Vec<ExtensionManifest> {
		ManifestStore::new( &self.config ).discover_manifests()
	}

	/// Runs a script cycle over the configured roots.
	pub fn load_scripts( &mut self ) -> bool {
		let manifests = self.discover();
		self.load_scripts_from( &manifests )
	}

	/// Runs a plugin cycle over the configured roots.
	pub fn load_plugins( &mut self ) -> bool {
		let manifests = self.discover();
		self.load_plugins_from( &manifests )
	}

	/// Replaces the live scripts with those loaded from `manifests`. Manifests of other
	/// types are ignored. Returns whether every attempted manifest loaded.
	pub fn load_scripts_from( &mut self, manifests: &[ExtensionManifest] ) -> bool {

		let cycle = Instant::now();
		let Ok( mut extensions ) = self.extensions.try_borrow_mut() else {
			tracing::error!( "Cannot reload scripts while a notification is being dispatched" );
			return false
		};
		self.failed_scripts.reset();
		extensions.scripts.drain( .. ).for_each(| mut script | { script.dispose_isolated(); });

		let mut success = true ;
		for manifest in manifests.iter().filter(| manifest | manifest.kind().is_script() ) {
			if !should_load( &self.config, manifest ) { continue }
			if extensions.scripts.iter().any(| script | script.id == manifest.id() ) {
				let error = LoadError::DuplicateIdentity( manifest.id().to_string() );
				tracing::warn!( extension = %manifest, error = %error, "Skipping duplicate script extension" );
				continue
			}

			let started = Instant::now();
			match load_isolated(|| self.loader.load_script( manifest )) {
				Ok( script ) => {
					tracing::debug!( extension = %manifest, elapsed = ?started.elapsed(), "Loaded script extension" );
					extensions.scripts.push( LoadedExtension::new( manifest.id(), manifest.clone(), ExtensionType::Script, Box::new( script )));
				}
				Err( err ) => {
					tracing::error!( extension = %manifest, error = %err, "Failed to load script extension" );
					self.failed_scripts.push( manifest.clone() );
					success = false ;
				}
			}
		}

		tracing::info!( loaded = extensions.scripts.len(), failed = self.failed_scripts.len(), elapsed = ?cycle.elapsed(), "Script extensions loaded" );
		success

	}

	/// Replaces the live binary extensions with those loaded from `manifests`. Script
	/// manifests are ignored. Returns whether every attempted manifest loaded.
	pub fn load_plugins_from( &mut self, manifests: &[ExtensionManifest] ) -> bool {

		let cycle = Instant::now();
		let Ok( mut extensions ) = self.extensions.try_borrow_mut() else {
			tracing::error!( "Cannot reload plugins while a notification is being dispatched" );
			return false
		};
		self.failed_plugins.reset();
		extensions.registry.dispose_all();

		let mut success = true ;
		for manifest in manifests.iter().filter(| manifest | !manifest.kind().is_script() ) {
			if !should_load( &self.config, manifest ) { continue }

			let started = Instant::now();
			match load_isolated(|| self.loader.load_extensions_for( manifest )) {
				Ok( mut loaded ) if extensions.registry.provides( manifest.id() ) => {
					let error = LoadError::DuplicateIdentity( manifest.id().to_string() );
					tracing::warn!( extension = %manifest, error = %error, "Discarding duplicate extension module" );
					loaded.iter_mut().for_each(| extension | { extension.dispose_isolated(); });
				}
				Ok( loaded ) => {
					tracing::debug!( extension = %manifest, instances = loaded.len(), elapsed = ?started.elapsed(), "Loaded extension module" );
					for extension in loaded {
						if let Err(( _, mut rejected )) = extensions.registry.register( extension ) {
							rejected.dispose_isolated();
						}
					}
				}
				Err( err ) => {
					tracing::error!( extension = %manifest, error = %err, "Failed to load extension module" );
					self.failed_plugins.push( manifest.clone() );
					success = false ;
				}
			}
		}

		tracing::info!( loaded = extensions.registry.len(), failed = self.failed_plugins.len(), elapsed = ?cycle.elapsed(), "Binary extensions loaded" );
		success

	}

	/// Unsubscribes from the controller and disposes every extension. Safe to call
	/// more than once.
	pub fn dispose( &mut self ) {
		self.subscriptions.clear();
		match self.extensions.try_borrow_mut() {
			Ok( mut extensions ) => {
				let faults = extensions.dispose_all();
				if faults > 0 { tracing::warn!( faults, "Some extensions failed to dispose" ); }
			}
			Err( _ ) => tracing::error!( "Cannot dispose extensions while a notification is being dispatched" ),
		}
	}

}

impl Drop for ExtensionHost {
	fn drop( &mut self ) { self.dispose(); }
}

/// Disabled extensions, and anything but built-ins in safe mode, are skipped
/// without counting as failures.
fn should_load( config: &HostConfig, manifest: &ExtensionManifest ) -> bool {
	if config.is_disabled( manifest.id() ) {
		tracing::debug!( extension = %manifest, "Skipping disabled extension" );
		return false
	}
	if config.builtins_only && !is_builtin( manifest ) {
		tracing::debug!( extension = %manifest, "Skipping non built-in extension in safe mode" );
		return false
	}
	true
}

#[cfg( test )]
mod tests {

	use std::collections::HashMap ;
	use std::path::Path ;
	use rquickjs::{ Ctx, Value };
	use wasmtime::component::Linker ;
	use crate::game::{ Game, GameId };
	use crate::host_api::{ ExtensionContext, NoLocalization };
	use crate::manifest::MANIFEST_FILE ;
	use super::*;

	struct NoApi ;
	impl HostApi for NoApi {
		fn link( &self, _: &mut Linker<ExtensionContext> ) -> Result<(), wasmtime::Error> { Ok(()) }
		fn script_binding<'js>( &self, ctx: &Ctx<'js> ) -> rquickjs::Result<Value<'js>> { Ok( Value::new_undefined( ctx.clone() )) }
	}

	fn missing( root: &Path, id: &str, kind: ExtensionType ) -> ExtensionManifest {
		let text = format!( "Id = \"{id}\"\nName = \"{id}\"\nType = \"{kind}\"\nModule = \"absent\"\n" );
		ExtensionManifest::parse( &text, &root.join( id ).join( MANIFEST_FILE )).expect( "valid descriptor" )
	}

	#[test]
	fn rejected_reload_keeps_previous_ledger() {

		let root = tempfile::tempdir().expect( "Failed to create temp dir" );
		let config = HostConfig::default()
			.with_program_extensions_dir( root.path() )
			.with_portable( true )
			.with_extension_data_dir( root.path().join( "data" ));
		let events = EventSource::new();
		let mut host = ExtensionHost::new(
			config,
			Rc::new( NoApi ),
			Rc::new( HashMap::<GameId, Game>::new() ),
			&events,
			Rc::new( NoLocalization ),
		).expect( "Failed to create host" );

		assert!( !host.load_scripts_from( &[ missing( root.path(), "acme.script", ExtensionType::Script )]));
		assert!( !host.load_plugins_from( &[ missing( root.path(), "acme.plugin", ExtensionType::GenericPlugin )]));

		let extensions = Rc::clone( &host.extensions );
		let dispatching = extensions.borrow();
		assert!( !host.load_scripts_from( &[] ));
		assert!( !host.load_plugins_from( &[] ));
		drop( dispatching );

		assert_eq!( host.failed_scripts().len(), 1 );
		assert_eq!( host.failed_plugins().len(), 1 );

	}

}
