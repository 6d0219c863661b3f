//! Host configuration.
//!
//! Everything the host needs to know about its surroundings: where extensions are
//! installed, where their private data lives, which of them are switched off and which
//! SDK version the host implements. Every field has a default so a partial (or absent)
//! configuration file is valid.

use std::path::{ Path, PathBuf };
use semver::Version ;
use serde::Deserialize ;
use thiserror::Error ;



/// Application directory name used to derive the default locations.
pub const APP_DIR: &str = "ExtensionHost" ;

/// The version of the public SDK this host implements.
pub const SDK_VERSION: Version = Version::new( 2, 1, 0 );

/// Errors raised while loading a configuration file.
#[derive( Error, Debug )]
pub enum ConfigError {
	#[error( "Cannot read config '{}': {source}", .path.display() )]
	Io { path: PathBuf, source: std::io::Error },
	#[error( "Invalid config '{}': {source}", .path.display() )]
	Toml { path: PathBuf, source: toml::de::Error },
}

/// Locations and policies for one host instance.
#[derive( Debug, Clone, PartialEq, Eq, Deserialize )]
#[serde( default, rename_all = "kebab-case" )]
pub struct HostConfig {
	/// Extensions shipped with the application.
	pub program_extensions_dir: PathBuf,
	/// Extensions installed by the user; ignored in portable mode.
	pub user_extensions_dir: PathBuf,
	/// When set, nothing is read from the user data location.
	pub portable: bool,
	/// Root under which every extension gets its private data directory.
	pub extension_data_dir: PathBuf,
	/// Additional directories scanned for side-loaded extensions.
	pub external_dirs: Vec<PathBuf>,
	/// Safe mode: only built-in extensions are loaded.
	pub builtins_only: bool,
	/// Ids of extensions the user switched off.
	pub disabled: Vec<String>,
	pub sdk_version: Version,
}

impl Default for HostConfig {
	fn default() -> Self {
		let program_root = std::env::current_exe().ok()
			.and_then(| exe | exe.parent().map( Path::to_path_buf ))
			.unwrap_or_default();
		let user_root = dirs::data_dir().unwrap_or_default().join( APP_DIR );
		Self {
			program_extensions_dir: program_root.join( "Extensions" ),
			user_extensions_dir: user_root.join( "Extensions" ),
			portable: false,
			extension_data_dir: user_root.join( "ExtensionsData" ),
			external_dirs: Vec::with_capacity( 0 ),
			builtins_only: false,
			disabled: Vec::with_capacity( 0 ),
			sdk_version: SDK_VERSION,
		}
	}
}

impl HostConfig {

	/// Reads a TOML configuration file; missing keys fall back to their defaults.
	///
	/// # Errors
	/// Returns [`ConfigError`] if the file cannot be read or parsed.
	pub fn load( path: &Path ) -> Result<Self, ConfigError> {
		let text = std::fs::read_to_string( path )
			.map_err(| source | ConfigError::Io { path: path.to_path_buf(), source })?;
		toml::from_str( &text ).map_err(| source | ConfigError::Toml { path: path.to_path_buf(), source })
	}

	/// The user extensions root, unless running portable.
	pub fn user_extensions_root( &self ) -> Option<&Path> {
		match self.portable {
			true => None,
			false => Some( &self.user_extensions_dir ),
		}
	}

	/// Whether the extension with `id` was switched off.
	pub fn is_disabled( &self, id: &str ) -> bool {
		self.disabled.iter().any(| disabled | disabled == id )
	}

	pub fn with_program_extensions_dir( mut self, dir: impl Into<PathBuf> ) -> Self {
		self.program_extensions_dir = dir.into();
		self
	}

	pub fn with_user_extensions_dir( mut self, dir: impl Into<PathBuf> ) -> Self {
		self.user_extensions_dir = dir.into();
		self
	}

	pub fn with_portable( mut self, portable: bool ) -> Self {
		self.portable = portable ;
		self
	}

	pub fn with_extension_data_dir( mut self, dir: impl Into<PathBuf> ) -> Self {
		self.extension_data_dir = dir.into();
		self
	}

	pub fn with_external_dirs( mut self, dirs: impl IntoIterator<Item = PathBuf> ) -> Self {
		self.external_dirs = dirs.into_iter().collect();
		self
	}

	/// Restricts loading to built-in extensions.
	pub fn with_builtins_only( mut self, builtins_only: bool ) -> Self {
		self.builtins_only = builtins_only ;
		self
	}

	pub fn with_disabled( mut self, ids: impl IntoIterator<Item = String> ) -> Self {
		self.disabled = ids.into_iter().collect();
		self
	}

	/// Overrides the SDK version the host claims to implement.
	pub fn with_sdk_version( mut self, version: Version ) -> Self {
		self.sdk_version = version ;
		self
	}

}

#[cfg( test )]
mod tests {

	use super::*;

	#[test]
	fn partial_file_keeps_defaults() {
		let config: HostConfig = toml::from_str( r#"
			portable = true
			disabled = [ "acme.broken" ]
			sdk-version = "2.4.0"
		"# ).expect( "valid config" );

		assert!( config.portable );
		assert!( config.user_extensions_root().is_none() );
		assert!( config.is_disabled( "acme.broken" ));
		assert!( !config.is_disabled( "acme.working" ));
		assert_eq!( config.sdk_version, Version::new( 2, 4, 0 ));
		assert_eq!( config.extension_data_dir, HostConfig::default().extension_data_dir );
	}

	#[test]
	fn builder_overrides_fields() {
		let config = HostConfig::default()
			.with_program_extensions_dir( "/opt/host/Extensions" )
			.with_builtins_only( true );
		assert_eq!( config.program_extensions_dir, PathBuf::from( "/opt/host/Extensions" ));
		assert!( config.builtins_only );
		assert_eq!( config.user_extensions_root(), Some( config.user_extensions_dir.as_path() ));
	}

	#[test]
	fn unknown_sdk_version_format_is_error() {
		let result = toml::from_str::<HostConfig>( "sdk-version = \"two\"" );
		assert!( result.is_err() );
	}

}
