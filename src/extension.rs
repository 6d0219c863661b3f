//! The contract every live extension instance fulfils, whatever runtime it lives in.

use std::time::Duration ;
use thiserror::Error ;

use crate::game::{ Game, SelectionChange };



/// A lifecycle notification delivered to extensions.
///
/// Game notifications carry the record already resolved through the
/// [`GameDatabase`]( crate::GameDatabase ).
#[derive( Debug, Clone, Copy )]
pub enum Notification<'a> {
	GameInstalled( &'a Game ),
	GameStarting( &'a Game ),
	GameStarted( &'a Game ),
	GameStopped { game: &'a Game, elapsed: Duration },
	GameUninstalled( &'a Game ),
	GameSelected( &'a SelectionChange ),
	ApplicationStarted,
	ApplicationStopped,
	LibraryUpdated,
}

impl Notification<'_> {

	/// Name used in logs and fault reports.
	pub fn method( &self ) -> &'static str { match self {
		Self::GameInstalled( _ ) => "on_game_installed",
		Self::GameStarting( _ ) => "on_game_starting",
		Self::GameStarted( _ ) => "on_game_started",
		Self::GameStopped { .. } => "on_game_stopped",
		Self::GameUninstalled( _ ) => "on_game_uninstalled",
		Self::GameSelected( _ ) => "on_game_selected",
		Self::ApplicationStarted => "on_application_started",
		Self::ApplicationStopped => "on_application_stopped",
		Self::LibraryUpdated => "on_library_updated",
	}}

	/// Name of the function a component exports for this notification.
	pub fn export_name( &self ) -> &'static str { match self {
		Self::GameInstalled( _ ) => "on-game-installed",
		Self::GameStarting( _ ) => "on-game-starting",
		Self::GameStarted( _ ) => "on-game-started",
		Self::GameStopped { .. } => "on-game-stopped",
		Self::GameUninstalled( _ ) => "on-game-uninstalled",
		Self::GameSelected( _ ) => "on-game-selected",
		Self::ApplicationStarted => "on-application-started",
		Self::ApplicationStopped => "on-application-stopped",
		Self::LibraryUpdated => "on-library-updated",
	}}

	/// Name of the global function a script defines for this notification.
	pub fn script_function( &self ) -> &'static str { match self {
		Self::GameInstalled( _ ) => "onGameInstalled",
		Self::GameStarting( _ ) => "onGameStarting",
		Self::GameStarted( _ ) => "onGameStarted",
		Self::GameStopped { .. } => "onGameStopped",
		Self::GameUninstalled( _ ) => "onGameUninstalled",
		Self::GameSelected( _ ) => "onGameSelected",
		Self::ApplicationStarted => "onApplicationStarted",
		Self::ApplicationStopped => "onApplicationStopped",
		Self::LibraryUpdated => "onLibraryUpdated",
	}}

	/// The game the notification is about, if any.
	pub fn game( &self ) -> Option<&Game> { match self {
		Self::GameInstalled( game )
		| Self::GameStarting( game )
		| Self::GameStarted( game )
		| Self::GameStopped { game, .. }
		| Self::GameUninstalled( game ) => Some( game ),
		Self::GameSelected( _ )
		| Self::ApplicationStarted
		| Self::ApplicationStopped
		| Self::LibraryUpdated => None,
	}}

}

/// A fault raised by an extension while handling a call.
#[derive( Error, Debug )]
pub enum HandlerError {
	/// The component trapped or its signature did not match the call.
	#[error( "Runtime Exception: {0}" )] RuntimeException( wasmtime::Error ),
	/// The script threw.
	#[error( "Script Exception: {0}" )] ScriptException( String ),
	/// The extension panicked inside the host.
	#[error( "Panicked: {0}" )] Panicked( String ),
	/// The extension's state was already borrowed by an outer call.
	#[error( "Lock Rejected" )] LockRejected,
	#[error( "{0}" )] Custom( String ),
}

/// A live extension instance.
///
/// Implemented by [`ComponentExtension`]( crate::ComponentExtension ) and
/// [`ScriptExtension`]( crate::ScriptExtension ); hosts may register their own
/// native implementations as well.
pub trait Extension {

	/// Delivers one notification. A missing handler is not an error.
	///
	/// # Errors
	/// Returns a [`HandlerError`] if the handler faulted.
	fn notify( &mut self, notification: &Notification<'_> ) -> Result<(), HandlerError> ;

	/// Releases the instance's resources. Called exactly once, before the instance is dropped.
	///
	/// # Errors
	/// Returns a [`HandlerError`] if the extension's own cleanup faulted.
	fn dispose( &mut self ) -> Result<(), HandlerError> { Ok(()) }

}
