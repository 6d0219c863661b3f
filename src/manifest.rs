//! Extension descriptor types.
//!
//! Every extension directory carries one [`MANIFEST_FILE`] declaring the extension's
//! identity, its [`ExtensionType`] and the entry point of its loadable module. The
//! descriptor is parsed once per scan and never mutated afterwards.

use std::path::{ Path, PathBuf };
use serde::{ Deserialize, Serialize };
use thiserror::Error ;



/// File name every extension descriptor is stored under.
pub const MANIFEST_FILE: &str = "extension.toml" ;

/// The category an extension declares in its descriptor.
///
/// `Script` extensions are interpreted; every other variant names the contract a
/// compiled component is expected to implement.
#[derive( Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize )]
pub enum ExtensionType {
	Script,
	GameLibrary,
	MetadataProvider,
	GenericPlugin,
}

impl ExtensionType {
	/// Whether the extension is loaded by the script runtime.
	#[inline] pub fn is_script( self ) -> bool { self == Self::Script }
}

impl std::fmt::Display for ExtensionType {
	fn fmt( &self, f: &mut std::fmt::Formatter ) -> std::fmt::Result { write!( f, "{:?}", self )}
}

/// A named link published by an extension author.
#[derive( Debug, Clone, PartialEq, Eq, Serialize, Deserialize )]
#[serde( rename_all = "PascalCase" )]
pub struct ManifestLink {
	pub name: String,
	pub url: String,
}

/// Errors raised while reading a single descriptor file.
#[derive( Error, Debug )]
pub enum DescriptorError {
	#[error( "Cannot read descriptor '{}': {source}", .path.display() )]
	Io { path: PathBuf, source: std::io::Error },
	#[error( "Invalid descriptor '{}': {source}", .path.display() )]
	Toml { path: PathBuf, source: toml::de::Error },
}

/// The on-disk layout of a descriptor.
#[derive( Deserialize )]
#[serde( rename_all = "PascalCase" )]
struct RawManifest {
	#[serde( default )] id: String,
	name: String,
	#[serde( default )] version: String,
	#[serde( rename = "Type" )] kind: ExtensionType,
	module: PathBuf,
	#[serde( default )] author: Option<String>,
	#[serde( default )] icon: Option<String>,
	#[serde( default )] links: Vec<ManifestLink>,
}

/// A parsed extension descriptor together with its location on disk.
///
/// An empty `id` is representable on purpose: descriptors lacking an identity are
/// rejected by the loader, not by the parser, so they can still be reported.
#[derive( Debug, Clone, PartialEq, Eq )]
pub struct ExtensionManifest {
	id: String,
	name: String,
	version: String,
	kind: ExtensionType,
	module: PathBuf,
	author: Option<String>,
	icon: Option<String>,
	links: Vec<ManifestLink>,
	directory_path: PathBuf,
	description_path: PathBuf,
}

impl ExtensionManifest {

	/// Reads and parses the descriptor at `path`.
	///
	/// # Errors
	/// Returns [`DescriptorError`] if the file cannot be read or is not a valid descriptor.
	pub fn from_file( path: &Path ) -> Result<Self, DescriptorError> {
		let text = std::fs::read_to_string( path )
			.map_err(| source | DescriptorError::Io { path: path.to_path_buf(), source })?;
		Self::parse( &text, path )
	}

	/// Parses descriptor text as if it had been read from `description_path`.
	///
	/// # Errors
	/// Returns [`DescriptorError::Toml`] if the text is not a valid descriptor.
	pub fn parse( text: &str, description_path: &Path ) -> Result<Self, DescriptorError> {
		let raw: RawManifest = toml::from_str( text )
			.map_err(| source | DescriptorError::Toml { path: description_path.to_path_buf(), source })?;
		let directory_path = description_path.parent()
			.map_or_else( PathBuf::new, Path::to_path_buf );
		Ok( Self {
			id: raw.id.trim().to_string(),
			name: raw.name,
			version: raw.version,
			kind: raw.kind,
			module: raw.module,
			author: raw.author,
			icon: raw.icon,
			links: raw.links,
			directory_path,
			description_path: description_path.to_path_buf(),
		})
	}

	/// Globally unique extension identifier; empty if the descriptor declared none.
	#[inline] pub fn id( &self ) -> &str { &self.id }
	/// Whether the descriptor declares an identity.
	#[inline] pub fn has_identity( &self ) -> bool { !self.id.is_empty() }
	#[inline] pub fn name( &self ) -> &str { &self.name }
	#[inline] pub fn version( &self ) -> &str { &self.version }
	#[inline] pub fn kind( &self ) -> ExtensionType { self.kind }
	/// Entry point as declared, relative to [`Self::directory_path`].
	#[inline] pub fn module( &self ) -> &Path { &self.module }
	#[inline] pub fn author( &self ) -> Option<&str> { self.author.as_deref() }
	#[inline] pub fn icon( &self ) -> Option<&str> { self.icon.as_deref() }
	#[inline] pub fn links( &self ) -> &[ManifestLink] { &self.links }
	/// Directory the descriptor was found in.
	#[inline] pub fn directory_path( &self ) -> &Path { &self.directory_path }
	/// Location of the descriptor file itself.
	#[inline] pub fn description_path( &self ) -> &Path { &self.description_path }

	/// Final component of [`Self::directory_path`].
	pub fn directory_name( &self ) -> &str {
		self.directory_path.file_name()
			.and_then(| name | name.to_str())
			.unwrap_or_default()
	}

	/// Absolute location of the entry point.
	pub fn module_path( &self ) -> PathBuf { self.directory_path.join( &self.module ) }

}

impl std::fmt::Display for ExtensionManifest {
	fn fmt( &self, f: &mut std::fmt::Formatter ) -> std::fmt::Result {
		match self.has_identity() {
			true => write!( f, "{} ({})", self.name, self.id ),
			false => write!( f, "{} (no id)", self.name ),
		}
	}
}

#[cfg( test )]
mod tests {

	use super::*;

	const LIBRARY: &str = r#"
		Id = "acme.steam-library"
		Name = "Steam"
		Version = "1.2.0"
		Type = "GameLibrary"
		Module = "steam.wasm"
		Author = "Acme"

		[[Links]]
		Name = "Source"
		Url = "https://example.com/steam"
	"#;

	#[test]
	fn parses_descriptor_and_derives_location() {
		let path = Path::new( "/ext/SteamLibrary" ).join( MANIFEST_FILE );
		let manifest = ExtensionManifest::parse( LIBRARY, &path ).expect( "valid descriptor" );

		assert_eq!( manifest.id(), "acme.steam-library" );
		assert_eq!( manifest.kind(), ExtensionType::GameLibrary );
		assert_eq!( manifest.directory_name(), "SteamLibrary" );
		assert_eq!( manifest.module_path(), Path::new( "/ext/SteamLibrary/steam.wasm" ));
		assert_eq!( manifest.description_path(), path.as_path() );
		assert_eq!( manifest.author(), Some( "Acme" ));
		assert_eq!( manifest.links().len(), 1 );
	}

	#[test]
	fn missing_id_parses_as_empty_identity() {
		let text = "Name = \"Nameless\"\nType = \"Script\"\nModule = \"main.js\"\n" ;
		let manifest = ExtensionManifest::parse( text, Path::new( "/ext/x/extension.toml" )).expect( "valid descriptor" );
		assert!( !manifest.has_identity() );
		assert!( manifest.kind().is_script() );
	}

	#[test]
	fn whitespace_id_is_no_identity() {
		let text = "Id = \"   \"\nName = \"Blank\"\nType = \"GenericPlugin\"\nModule = \"a.wasm\"\n" ;
		let manifest = ExtensionManifest::parse( text, Path::new( "/ext/x/extension.toml" )).expect( "valid descriptor" );
		assert!( !manifest.has_identity() );
	}

	#[test]
	fn unknown_type_is_descriptor_error() {
		let text = "Id = \"a\"\nName = \"A\"\nType = \"Theme\"\nModule = \"a.wasm\"\n" ;
		match ExtensionManifest::parse( text, Path::new( "/ext/a/extension.toml" )) {
			Err( DescriptorError::Toml { path, .. }) => assert!( path.ends_with( "extension.toml" )),
			other => panic!( "Expected Toml error, found: {:?}", other ),
		}
	}

}
