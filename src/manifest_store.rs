//! Discovery of extension descriptors on disk.
//!
//! Roots are scanned recursively for [`MANIFEST_FILE`] in a fixed order: the program
//! root, the user root (unless running portable), then any external directories. The
//! order carries no ranking and duplicate ids are left for the loader to reject.

use std::path::{ Path, PathBuf };
use itertools::Itertools ;
use pipe_trait::Pipe ;
use walkdir::WalkDir ;

use crate::config::HostConfig ;
use crate::manifest::{ DescriptorError, ExtensionManifest, MANIFEST_FILE };
use crate::utils::PartialSuccess ;



/// Scans a set of root directories for extension descriptors.
#[derive( Debug, Clone, Default )]
pub struct ManifestStore {
	roots: Vec<PathBuf>,
}

impl ManifestStore {

	/// A store over the roots named in `config`.
	pub fn new( config: &HostConfig ) -> Self {
		std::iter::once( config.program_extensions_dir.clone() )
			.chain( config.user_extensions_root().map( Path::to_path_buf ))
			.chain( config.external_dirs.iter().cloned() )
			.pipe( Self::with_roots )
	}

	pub fn with_roots( roots: impl IntoIterator<Item = PathBuf> ) -> Self {
		Self { roots: roots.into_iter().collect() }
	}

	#[inline] pub fn roots( &self ) -> &[PathBuf] { &self.roots }

	/// Parses every descriptor found, keeping the per-file errors.
	pub fn discover_with_errors( &self ) -> PartialSuccess<Vec<ExtensionManifest>, DescriptorError> {
		self.roots.iter()
			.filter(| root | match root.is_dir() {
				true => true,
				false => {
					tracing::debug!( root = %root.display(), "Extension root does not exist" );
					false
				}
			})
			.flat_map(| root | WalkDir::new( root ).sort_by_file_name().into_iter() )
			.filter_map(| entry | entry
				.inspect_err(| err | tracing::debug!( error = %err, "Cannot read extension directory entry" ))
				.ok()
			)
			.filter(| entry | entry.file_type().is_file() && entry.file_name() == MANIFEST_FILE )
			.map(| entry | ExtensionManifest::from_file( entry.path() ))
			.partition_result::<Vec<_>, Vec<_>, _, _>()
	}

	/// Parses every descriptor found. Unreadable descriptors are logged and skipped.
	pub fn discover_manifests( &self ) -> Vec<ExtensionManifest> {
		let ( manifests, errors ) = self.discover_with_errors();
		errors.iter().for_each(| err | tracing::warn!( error = %err, "Skipping extension descriptor" ));
		tracing::debug!( found = manifests.len(), skipped = errors.len(), "Extension descriptors discovered" );
		manifests
	}

}
