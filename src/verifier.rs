//! Compatibility checks run on a component before it is instantiated.
//!
//! A component's imports are its declared references. Two rules apply:
//!
//! - Importing anything from the host's internal packages is reserved for built-in
//! 	extensions.
//! - At least one import must come from the public SDK package with a version, and
//! 	the highest such version must share the host's major and not exceed the host's
//! 	version.

use semver::Version ;
use thiserror::Error ;
use wasmtime::Engine ;
use wasmtime::component::Component ;

use crate::manifest::ExtensionManifest ;



/// Package holding the public SDK interfaces.
pub const SDK_PACKAGE: &str = "host:sdk" ;

/// Packages implementing the host itself.
pub const INTERNAL_PACKAGES: &[&str] = &[ "host:internal", "host:core" ];

/// Ids (or directory names) of extensions shipped with the host.
pub const BUILTIN_EXTENSIONS: &[&str] = &[
	"host.library.steam",
	"host.library.local",
	"host.metadata.igdb",
	"host.generic.updater",
];

/// Whether `id` is the id of an extension shipped with the host. Only the id grants
/// access to the internal packages.
pub fn is_builtin_id( id: &str ) -> bool {
	BUILTIN_EXTENSIONS.contains( &id )
}

/// Whether the manifest looks like a built-in extension by id or by directory name.
/// Used for the safe-mode filter only.
pub fn is_builtin( manifest: &ExtensionManifest ) -> bool {
	is_builtin_id( manifest.id() ) || BUILTIN_EXTENSIONS.contains( &manifest.directory_name() )
}

/// A parsed component import or export name: `namespace:package/interface@version`.
#[derive( Debug, Clone, PartialEq, Eq )]
pub struct InterfaceName<'a> {
	pub package: &'a str,
	pub interface: Option<&'a str>,
	pub version: Option<&'a str>,
}

impl<'a> InterfaceName<'a> {

	/// Splits a name into its parts. Plain (package-less) names yield `None`.
	pub fn parse( name: &'a str ) -> Option<Self> {
		let ( path, version ) = match name.split_once( '@' ) {
			Some(( path, version )) => ( path, Some( version )),
			None => ( name, None ),
		};
		if !path.contains( ':' ) { return None }
		let ( package, interface ) = match path.split_once( '/' ) {
			Some(( package, interface )) => ( package, Some( interface )),
			None => ( path, None ),
		};
		Some( Self { package, interface, version })
	}

}

/// Reasons a component is rejected.
#[derive( Error, Debug, Clone, PartialEq, Eq )]
pub enum Incompatibility {
	#[error( "References internal host package '{0}'" )] InternalReference( String ),
	#[error( "Does not reference a versioned '{}' interface", SDK_PACKAGE )] MissingSdkReference,
	#[error( "Requires SDK {required}, host major version is {host}" )] MajorMismatch { required: Version, host: Version },
	#[error( "Requires SDK {required}, host only provides {host}" )] NewerSdk { required: Version, host: Version },
}

/// Checks components against the SDK version the host implements.
#[derive( Debug, Clone )]
pub struct CompatibilityVerifier {
	sdk_version: Version,
}

impl CompatibilityVerifier {

	pub fn new( sdk_version: Version ) -> Self { Self { sdk_version }}

	#[inline] pub fn sdk_version( &self ) -> &Version { &self.sdk_version }

	/// Checks a set of import names on behalf of `manifest`.
	///
	/// # Errors
	/// Returns the first [`Incompatibility`] found.
	pub fn check<'a>(
		&self,
		imports: impl IntoIterator<Item = &'a str>,
		manifest: &ExtensionManifest,
	) -> Result<(), Incompatibility> {

		let builtin = is_builtin_id( manifest.id() );
		let mut required: Option<Version> = None ;

		for name in imports {
			let Some( parsed ) = InterfaceName::parse( name ) else { continue };
			if !builtin && INTERNAL_PACKAGES.contains( &parsed.package ) {
				return Err( Incompatibility::InternalReference( name.to_string() ));
			}
			if parsed.package != SDK_PACKAGE { continue }
			let Some( version ) = parsed.version.and_then(| version | Version::parse( version ).ok() ) else { continue };
			if required.as_ref().is_none_or(| current | version > *current ) { required = Some( version ); }
		}

		let required = required.ok_or( Incompatibility::MissingSdkReference )?;
		if required.major != self.sdk_version.major {
			return Err( Incompatibility::MajorMismatch { required, host: self.sdk_version.clone() });
		}
		if required > self.sdk_version {
			return Err( Incompatibility::NewerSdk { required, host: self.sdk_version.clone() });
		}
		Ok(())

	}

	/// Like [`Self::check`], logging the reason and reducing it to a verdict.
	pub fn verify<'a>( &self, imports: impl IntoIterator<Item = &'a str>, manifest: &ExtensionManifest ) -> bool {
		match self.check( imports, manifest ) {
			Ok(()) => true,
			Err( reason ) => {
				tracing::warn!( extension = %manifest, reason = %reason, "Incompatible extension module" );
				false
			}
		}
	}

	/// Checks the imports of a compiled component.
	///
	/// # Errors
	/// Returns the first [`Incompatibility`] found.
	pub fn verify_component(
		&self,
		engine: &Engine,
		component: &Component,
		manifest: &ExtensionManifest,
	) -> Result<(), Incompatibility> {
		let component_type = component.component_type();
		let result = self.check( component_type.imports( engine ).map(|( name, _ )| name ), manifest );
		if let Err( reason ) = &result {
			tracing::warn!( extension = %manifest, reason = %reason, "Incompatible extension module" );
		}
		result
	}

}

#[cfg( test )]
mod tests {

	use std::path::Path ;
	use super::*;

	fn manifest( id: &str ) -> ExtensionManifest {
		let text = format!( "Id = \"{id}\"\nName = \"Test\"\nType = \"GenericPlugin\"\nModule = \"m.wasm\"\n" );
		ExtensionManifest::parse( &text, &Path::new( "/ext" ).join( id ).join( "extension.toml" ))
			.expect( "valid descriptor" )
	}

	#[test]
	fn parses_interface_names() {
		assert_eq!( InterfaceName::parse( "host:sdk/runtime@2.0.0" ), Some( InterfaceName {
			package: "host:sdk", interface: Some( "runtime" ), version: Some( "2.0.0" ),
		}));
		assert_eq!( InterfaceName::parse( "host:sdk" ).map(| name | name.interface ), Some( None ));
		assert_eq!( InterfaceName::parse( "plain-function" ), None );
	}

	#[test]
	fn highest_sdk_import_decides() {
		let verifier = CompatibilityVerifier::new( Version::new( 2, 1, 0 ));
		let imports = [ "host:sdk/runtime@2.0.0", "host:sdk/library@2.2.0" ];
		match verifier.check( imports, &manifest( "acme.a" )) {
			Err( Incompatibility::NewerSdk { required, .. }) => assert_eq!( required, Version::new( 2, 2, 0 )),
			value => panic!( "Expected NewerSdk error, found: {:#?}", value ),
		}
	}

	#[test]
	fn unversioned_sdk_import_does_not_count() {
		let verifier = CompatibilityVerifier::new( Version::new( 2, 1, 0 ));
		assert_eq!(
			verifier.check([ "host:sdk/runtime" ], &manifest( "acme.a" )),
			Err( Incompatibility::MissingSdkReference ),
		);
	}

	#[test]
	fn builtin_matched_by_directory_name() {
		let text = "Id = \"renamed\"\nName = \"Steam\"\nType = \"GameLibrary\"\nModule = \"m.wasm\"\n" ;
		let manifest = ExtensionManifest::parse( text, Path::new( "/ext/host.library.steam/extension.toml" ))
			.expect( "valid descriptor" );
		assert!( is_builtin( &manifest ));
		assert!( !is_builtin_id( manifest.id() ));
	}

	#[test]
	fn builtin_directory_does_not_unlock_internal_packages() {
		let verifier = CompatibilityVerifier::new( Version::new( 2, 1, 0 ));
		let text = "Id = \"evil.thirdparty\"\nName = \"Evil\"\nType = \"GameLibrary\"\nModule = \"m.wasm\"\n" ;
		let manifest = ExtensionManifest::parse( text, Path::new( "/user/Extensions/host.library.steam/extension.toml" ))
			.expect( "valid descriptor" );
		assert_eq!(
			verifier.check([ "host:sdk/runtime@2.1.0", "host:internal/database@1.0.0" ], &manifest ),
			Err( Incompatibility::InternalReference( "host:internal/database@1.0.0".to_string() )),
		);
	}

}
