//! The workload the host manages and the lookup seam used to resolve it.

use std::collections::HashMap ;
use serde::Serialize ;



/// Identity of a game record.
#[derive( Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize )]
#[serde( transparent )]
pub struct GameId( pub String );

impl From<&str> for GameId {
	fn from( id: &str ) -> Self { Self( id.to_string() ) }
}

impl std::fmt::Display for GameId {
	fn fmt( &self, f: &mut std::fmt::Formatter ) -> std::fmt::Result { f.write_str( &self.0 ) }
}

/// The authoritative record handed to extensions.
#[derive( Debug, Clone, PartialEq, Eq, Serialize )]
#[serde( rename_all = "camelCase" )]
pub struct Game {
	pub id: GameId,
	pub name: String,
	pub is_installed: bool,
	pub install_directory: Option<String>,
}

impl Game {
	pub fn new( id: impl Into<String>, name: impl Into<String> ) -> Self {
		Self { id: GameId( id.into() ), name: name.into(), is_installed: false, install_directory: None }
	}
}

/// Old and new game selection, as supplied by the caller.
#[derive( Debug, Clone, Default, PartialEq, Eq, Serialize )]
pub struct SelectionChange {
	pub old: Vec<GameId>,
	pub new: Vec<GameId>,
}

/// Read access to the game database.
///
/// Events coming from the controller only carry a [`GameId`]; the dispatcher resolves
/// it through this trait before notifying anyone.
pub trait GameDatabase {
	fn game( &self, id: &GameId ) -> Option<Game> ;
}

impl GameDatabase for HashMap<GameId, Game> {
	fn game( &self, id: &GameId ) -> Option<Game> { self.get( id ).cloned() }
}
