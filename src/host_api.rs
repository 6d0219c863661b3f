//! The seams through which the host hands its capabilities to extensions.

use std::path::{ Path, PathBuf };
use rquickjs::{ Ctx, Value };
use wasmtime::component::{ Linker, ResourceTable };

use crate::manifest::ExtensionManifest ;



/// Data stored inside every component's wasmtime `Store`.
///
/// Host functions linked by a [`HostApi`] receive it through the store, which is how
/// they tell the calling extension apart from the others.
#[derive( Debug )]
pub struct ExtensionContext {
	extension_id: String,
	install_path: PathBuf,
	data_path: PathBuf,
	resource_table: ResourceTable,
}

impl ExtensionContext {

	pub fn new( extension_id: impl Into<String>, install_path: impl Into<PathBuf>, data_path: impl Into<PathBuf> ) -> Self {
		Self {
			extension_id: extension_id.into(),
			install_path: install_path.into(),
			data_path: data_path.into(),
			resource_table: ResourceTable::new(),
		}
	}

	#[inline] pub fn extension_id( &self ) -> &str { &self.extension_id }
	#[inline] pub fn install_path( &self ) -> &Path { &self.install_path }
	#[inline] pub fn data_path( &self ) -> &Path { &self.data_path }

	/// Table tracking component model resources owned by this extension.
	pub fn resource_table( &mut self ) -> &mut ResourceTable { &mut self.resource_table }

}

/// The host's public API surface.
///
/// The core never looks inside it. It is asked once per component to populate the
/// linker with its exports, and once per script to produce the value bound to the
/// `HostApi` global. One instance is shared by every extension and outlives them all.
pub trait HostApi {

	/// Adds the host's exports to a component linker.
	///
	/// # Errors
	/// Returns an error if a definition clashes with one already in the linker.
	fn link( &self, linker: &mut Linker<ExtensionContext> ) -> Result<(), wasmtime::Error> ;

	/// Builds the value scripts see as `HostApi`.
	///
	/// # Errors
	/// Returns an error if the value cannot be created in `ctx`.
	fn script_binding<'js>( &self, ctx: &Ctx<'js> ) -> rquickjs::Result<Value<'js>> ;

}

/// Loads localization resources bundled with an extension.
pub trait LocalizationLoader {

	/// Called once per loaded script extension with its install directory.
	///
	/// # Errors
	/// Failures are logged by the loader and never fail the extension.
	fn load_extension_localization( &self, manifest: &ExtensionManifest ) -> Result<(), std::io::Error> ;

}

/// A [`LocalizationLoader`] for hosts without localization support.
#[derive( Debug, Default, Clone, Copy )]
pub struct NoLocalization ;

impl LocalizationLoader for NoLocalization {
	fn load_extension_localization( &self, _: &ExtensionManifest ) -> Result<(), std::io::Error> { Ok(()) }
}
