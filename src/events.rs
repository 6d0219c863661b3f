//! The channel through which the game controller publishes lifecycle events.
//!
//! Handlers are registered per event kind and stay registered for as long as the
//! returned [`Subscription`] lives. Dropping it removes exactly that handler from
//! exactly that kind.

use std::cell::RefCell ;
use std::collections::HashMap ;
use std::rc::{ Rc, Weak };
use std::time::Duration ;

use crate::game::GameId ;



#[derive( Debug, Clone, Copy, PartialEq, Eq, Hash )]
pub enum ControllerEventKind {
	Installed,
	Starting,
	Started,
	Stopped,
	Uninstalled,
}

impl ControllerEventKind {
	pub const ALL: [Self; 5] = [ Self::Installed, Self::Starting, Self::Started, Self::Stopped, Self::Uninstalled ];
}

/// A lifecycle event raised by the controller. The game may be missing when the
/// controller could not identify it.
#[derive( Debug, Clone, PartialEq, Eq )]
pub enum ControllerEvent {
	Installed( Option<GameId> ),
	Starting( Option<GameId> ),
	Started( Option<GameId> ),
	Stopped { game: Option<GameId>, elapsed: Duration },
	Uninstalled( Option<GameId> ),
}

impl ControllerEvent {

	pub fn kind( &self ) -> ControllerEventKind { match self {
		Self::Installed( _ ) => ControllerEventKind::Installed,
		Self::Starting( _ ) => ControllerEventKind::Starting,
		Self::Started( _ ) => ControllerEventKind::Started,
		Self::Stopped { .. } => ControllerEventKind::Stopped,
		Self::Uninstalled( _ ) => ControllerEventKind::Uninstalled,
	}}

	pub fn game( &self ) -> Option<&GameId> { match self {
		Self::Installed( game )
		| Self::Starting( game )
		| Self::Started( game )
		| Self::Stopped { game, .. }
		| Self::Uninstalled( game ) => game.as_ref(),
	}}

}

type Handler = Rc<dyn Fn( &ControllerEvent )>;

#[derive( Default )]
struct Handlers {
	next_id: u64,
	by_kind: HashMap<ControllerEventKind, Vec<( u64, Handler )>>,
}

/// Publishes controller events to subscribed handlers.
///
/// Cloning yields another handle to the same source.
#[derive( Clone, Default )]
pub struct EventSource {
	handlers: Rc<RefCell<Handlers>>,
}

impl std::fmt::Debug for EventSource {
	fn fmt( &self, f: &mut std::fmt::Formatter<'_> ) -> std::fmt::Result {
		f.debug_struct( "EventSource" )
			.field( "subscribers", &self.handlers.borrow().by_kind.values().map( Vec::len ).sum::<usize>() )
			.finish()
	}
}

impl EventSource {

	pub fn new() -> Self { Self::default() }

	/// Registers `handler` for events of `kind`.
	#[must_use = "the handler is removed as soon as the subscription is dropped"]
	pub fn subscribe( &self, kind: ControllerEventKind, handler: impl Fn( &ControllerEvent ) + 'static ) -> Subscription {
		let mut handlers = self.handlers.borrow_mut();
		let id = handlers.next_id ;
		handlers.next_id += 1 ;
		handlers.by_kind.entry( kind ).or_default().push(( id, Rc::new( handler )));
		Subscription { handlers: Rc::downgrade( &self.handlers ), kind, id }
	}

	/// Delivers `event` to every handler subscribed to its kind and returns how many
	/// were called. Handlers may subscribe or unsubscribe while being called; such
	/// changes apply from the next event on.
	pub fn emit( &self, event: &ControllerEvent ) -> usize {
		let snapshot = self.handlers.borrow().by_kind.get( &event.kind() )
			.map(| handlers | handlers.iter().map(|( _, handler )| Rc::clone( handler )).collect::<Vec<_>>() )
			.unwrap_or_default();
		snapshot.iter().for_each(| handler | handler( event ));
		snapshot.len()
	}

	pub fn subscriber_count( &self, kind: ControllerEventKind ) -> usize {
		self.handlers.borrow().by_kind.get( &kind ).map_or( 0, Vec::len )
	}

}

/// Keeps one handler registered. Dropping it unsubscribes the handler.
#[derive( Debug )]
pub struct Subscription {
	handlers: Weak<RefCell<Handlers>>,
	kind: ControllerEventKind,
	id: u64,
}

impl Subscription {
	#[inline] pub fn kind( &self ) -> ControllerEventKind { self.kind }
}

impl Drop for Subscription {
	fn drop( &mut self ) {
		let Some( handlers ) = self.handlers.upgrade() else { return };
		let Ok( mut handlers ) = handlers.try_borrow_mut() else { return };
		if let Some( registered ) = handlers.by_kind.get_mut( &self.kind ) {
			registered.retain(|( id, _ )| *id != self.id );
		}
	}
}

#[cfg( test )]
mod tests {

	use std::cell::Cell ;
	use super::*;

	#[test]
	fn dropping_subscription_removes_only_its_handler() {
		let source = EventSource::new();
		let calls = Rc::new( Cell::new( 0 ));

		let counter = Rc::clone( &calls );
		let started = source.subscribe( ControllerEventKind::Started, move | _ | counter.set( counter.get() + 1 ));
		let stopped = source.subscribe( ControllerEventKind::Stopped, | _ | {});
		let other_started = source.subscribe( ControllerEventKind::Started, | _ | {});

		assert_eq!( source.emit( &ControllerEvent::Started( Some( "g".into() ))), 2 );
		drop( started );
		assert_eq!( source.subscriber_count( ControllerEventKind::Started ), 1 );
		assert_eq!( source.subscriber_count( ControllerEventKind::Stopped ), 1 );
		assert_eq!( source.emit( &ControllerEvent::Started( None )), 1 );
		assert_eq!( calls.get(), 1 );

		drop(( stopped, other_started ));
		assert_eq!( source.subscriber_count( ControllerEventKind::Started ), 0 );
		assert_eq!( source.subscriber_count( ControllerEventKind::Stopped ), 0 );
	}

	#[test]
	fn subscription_outliving_source_is_harmless() {
		let source = EventSource::new();
		let subscription = source.subscribe( ControllerEventKind::Installed, | _ | {});
		drop( source );
		drop( subscription );
	}

}
