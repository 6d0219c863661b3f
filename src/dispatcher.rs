//! Fan-out of lifecycle notifications to every live extension.
//!
//! Scripts are notified first, in load order, then binary extensions in registry
//! order. Every handler runs through [`invoke_isolated`], so a handler that fails or
//! panics is logged and skipped while the rest still run. Nothing is propagated to
//! the caller; the returned [`DispatchReport`] only describes what was logged.

use std::cell::RefCell ;
use std::panic::AssertUnwindSafe ;
use std::rc::Rc ;
use std::time::Duration ;
use thiserror::Error ;

use crate::events::ControllerEvent ;
use crate::extension::{ HandlerError, Notification };
use crate::game::{ Game, GameDatabase, GameId, SelectionChange };
use crate::registry::{ ExtensionRegistry, LoadedExtension };
use crate::utils::panic_message ;



/// Everything the dispatcher notifies.
#[derive( Debug, Default )]
pub struct Extensions {
	/// Script extensions in load order.
	pub scripts: Vec<LoadedExtension>,
	pub registry: ExtensionRegistry,
}

impl Extensions {

	/// Disposes scripts and binary extensions, leaving both empty.
	/// Returns the number of faulted disposals.
	pub fn dispose_all( &mut self ) -> usize {
		let script_faults = self.scripts.drain( .. )
			.map(| mut script | script.dispose_isolated() )
			.filter(| disposed | !disposed )
			.count();
		script_faults + self.registry.dispose_all()
	}

}

/// A handler that faulted during dispatch.
#[derive( Debug )]
pub struct HandlerFault {
	/// Name of the faulting extension.
	pub extension: String,
	pub method: &'static str,
	pub error: HandlerError,
}

/// Reasons a notification reached nobody.
#[derive( Error, Debug, Clone, PartialEq, Eq )]
pub enum DispatchError {
	#[error( "{0}: event carries no game" )] MissingGame( &'static str ),
	#[error( "{method}: game '{id}' is not in the database" )] UnknownGame { method: &'static str, id: GameId },
	#[error( "{0}: dispatched while another dispatch was running" )] Reentrant( &'static str ),
}

/// What happened during one dispatch.
#[derive( Debug, Default )]
pub struct DispatchReport {
	/// Number of extensions the notification was delivered to, faulted or not.
	pub notified: usize,
	pub faults: Vec<HandlerFault>,
	/// Set when the notification was dropped before reaching any extension.
	pub rejected: Option<DispatchError>,
}

impl DispatchReport {

	fn rejected( error: DispatchError ) -> Self {
		Self { notified: 0, faults: Vec::with_capacity( 0 ), rejected: Some( error )}
	}

	/// Whether every extension handled the notification without fault.
	pub fn is_clean( &self ) -> bool { self.faults.is_empty() && self.rejected.is_none() }

}

/// Runs one extension call, turning both an `Err` and a panic into a logged
/// [`HandlerFault`].
pub(crate) fn invoke_isolated(
	extension: &str,
	method: &'static str,
	call: impl FnOnce() -> Result<(), HandlerError>,
) -> Result<(), HandlerFault> {
	std::panic::catch_unwind( AssertUnwindSafe( call ))
		.unwrap_or_else(| payload | Err( HandlerError::Panicked( panic_message( &*payload ))))
		.map_err(| error | {
			tracing::warn!( extension, method, error = %error, "Extension handler failed" );
			HandlerFault { extension: extension.to_string(), method, error }
		})
}

/// Notifies live extensions of lifecycle events.
///
/// Cloning yields another handle to the same extensions.
#[derive( Clone )]
pub struct EventDispatcher {
	extensions: Rc<RefCell<Extensions>>,
	database: Rc<dyn GameDatabase>,
}

impl std::fmt::Debug for EventDispatcher {
	fn fmt( &self, f: &mut std::fmt::Formatter<'_> ) -> std::fmt::Result {
		f.debug_struct( "EventDispatcher" ).finish_non_exhaustive()
	}
}

impl EventDispatcher {

	pub fn new( extensions: Rc<RefCell<Extensions>>, database: Rc<dyn GameDatabase> ) -> Self {
		Self { extensions, database }
	}

	pub fn game_installed( &self, game: Option<&GameId> ) -> DispatchReport {
		self.with_game( game, "on_game_installed", | game | self.dispatch( &Notification::GameInstalled( game )))
	}

	pub fn game_starting( &self, game: Option<&GameId> ) -> DispatchReport {
		self.with_game( game, "on_game_starting", | game | self.dispatch( &Notification::GameStarting( game )))
	}

	pub fn game_started( &self, game: Option<&GameId> ) -> DispatchReport {
		self.with_game( game, "on_game_started", | game | self.dispatch( &Notification::GameStarted( game )))
	}

	pub fn game_stopped( &self, game: Option<&GameId>, elapsed: Duration ) -> DispatchReport {
		self.with_game( game, "on_game_stopped", | game | self.dispatch( &Notification::GameStopped { game, elapsed }))
	}

	pub fn game_uninstalled( &self, game: Option<&GameId> ) -> DispatchReport {
		self.with_game( game, "on_game_uninstalled", | game | self.dispatch( &Notification::GameUninstalled( game )))
	}

	/// Selection changes come straight from the caller, not from the event source.
	pub fn game_selected( &self, old: &[GameId], new: &[GameId] ) -> DispatchReport {
		let change = SelectionChange { old: old.to_vec(), new: new.to_vec() };
		self.dispatch( &Notification::GameSelected( &change ))
	}

	pub fn application_started( &self ) -> DispatchReport { self.dispatch( &Notification::ApplicationStarted ) }
	pub fn application_stopped( &self ) -> DispatchReport { self.dispatch( &Notification::ApplicationStopped ) }
	pub fn library_updated( &self ) -> DispatchReport { self.dispatch( &Notification::LibraryUpdated ) }

	/// Routes a controller event to the matching notification.
	pub fn handle( &self, event: &ControllerEvent ) -> DispatchReport { match event {
		ControllerEvent::Installed( game ) => self.game_installed( game.as_ref() ),
		ControllerEvent::Starting( game ) => self.game_starting( game.as_ref() ),
		ControllerEvent::Started( game ) => self.game_started( game.as_ref() ),
		ControllerEvent::Stopped { game, elapsed } => self.game_stopped( game.as_ref(), *elapsed ),
		ControllerEvent::Uninstalled( game ) => self.game_uninstalled( game.as_ref() ),
	}}

	/// Resolves the game through the database, or drops the event with one logged error.
	fn with_game(
		&self,
		id: Option<&GameId>,
		method: &'static str,
		dispatch: impl FnOnce( &Game ) -> DispatchReport,
	) -> DispatchReport {
		let resolved = id
			.ok_or( DispatchError::MissingGame( method ))
			.and_then(| id | self.database.game( id ).ok_or_else(|| DispatchError::UnknownGame { method, id: id.clone() }));
		match resolved {
			Ok( game ) => dispatch( &game ),
			Err( error ) => {
				tracing::error!( method, error = %error, "Dropped lifecycle notification" );
				DispatchReport::rejected( error )
			}
		}
	}

	fn dispatch( &self, notification: &Notification<'_> ) -> DispatchReport {

		let method = notification.method();
		let Ok( mut extensions ) = self.extensions.try_borrow_mut() else {
			let error = DispatchError::Reentrant( method );
			tracing::error!( method, error = %error, "Dropped lifecycle notification" );
			return DispatchReport::rejected( error );
		};

		let Extensions { scripts, registry } = &mut *extensions ;
		let mut notified = 0 ;
		let faults = scripts.iter_mut()
			.chain( registry.iter_mut() )
			.inspect(| _ | notified += 1 )
			.filter_map(| LoadedExtension { manifest, instance, .. } | {
				invoke_isolated( manifest.name(), method, || instance.notify( notification )).err()
			})
			.collect::<Vec<_>>();

		tracing::trace!( method, notified, faults = faults.len(), "Lifecycle notification dispatched" );
		DispatchReport { notified, faults, rejected: None }

	}

}

#[cfg( test )]
mod tests {

	use super::*;

	#[test]
	fn isolates_errors_and_panics() {
		assert!( invoke_isolated( "ok", "m", || Ok(()) ).is_ok() );
		match invoke_isolated( "err", "m", || Err( HandlerError::Custom( "nope".into() ))) {
			Err( HandlerFault { extension, error: HandlerError::Custom( message ), .. }) => {
				assert_eq!( extension, "err" );
				assert_eq!( message, "nope" );
			}
			value => panic!( "Expected Custom fault, found: {:#?}", value ),
		}
		match invoke_isolated( "panic", "m", || panic!( "boom" )) {
			Err( HandlerFault { error: HandlerError::Panicked( message ), .. }) => assert_eq!( message, "boom" ),
			value => panic!( "Expected Panicked fault, found: {:#?}", value ),
		}
	}

}
