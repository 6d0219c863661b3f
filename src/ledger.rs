use crate::manifest::ExtensionManifest ;



/// Manifests whose load failed during the current load cycle, in failure order.
///
/// Only the manifest is kept; the reason is in the log.
#[derive( Debug, Default, Clone )]
pub struct FailureLedger( Vec<ExtensionManifest> );

impl FailureLedger {

	pub fn new() -> Self { Self::default() }

	pub fn push( &mut self, manifest: ExtensionManifest ) { self.0.push( manifest ); }

	/// Starts a new cycle.
	pub fn reset( &mut self ) { self.0.clear(); }

	pub fn iter( &self ) -> std::slice::Iter<'_, ExtensionManifest> { self.0.iter() }
	pub fn len( &self ) -> usize { self.0.len() }
	pub fn is_empty( &self ) -> bool { self.0.is_empty() }

	/// Display names of the failed extensions, for presenting to the user.
	pub fn names( &self ) -> Vec<&str> { self.0.iter().map( ExtensionManifest::name ).collect() }

}

impl<'a> IntoIterator for &'a FailureLedger {
	type Item = &'a ExtensionManifest ;
	type IntoIter = std::slice::Iter<'a, ExtensionManifest> ;
	fn into_iter( self ) -> Self::IntoIter { self.0.iter() }
}
