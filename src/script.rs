//! Script extensions: JavaScript evaluated in a QuickJS runtime of their own.
//!
//! Each script sees four globals injected by the host before its source runs:
//! `HostApi`, `CurrentExtensionInstallPath`, `CurrentExtensionDataPath` and
//! `CurrentExtensionId`. Handlers are optional global functions named after the
//! notification, e.g. `onGameStarted( game )`.

use std::path::Path ;
use rquickjs::{ Context, Ctx, Function, Runtime, Value };

use crate::extension::{ Extension, HandlerError, Notification };
use crate::host_api::HostApi ;
use crate::manifest::ExtensionManifest ;



/// Global function a script may define to release its resources.
pub const DISPOSE_FUNCTION: &str = "dispose" ;

/// A loaded script with its runtime.
pub struct ScriptExtension {
	name: String,
	// Declared before `runtime` so the context is released first.
	context: Context,
	#[allow( dead_code )]
	runtime: Runtime,
}

impl std::fmt::Debug for ScriptExtension {
	fn fmt( &self, f: &mut std::fmt::Formatter<'_> ) -> std::fmt::Result {
		f.debug_struct( "ScriptExtension" )
			.field( "name", &self.name )
			.finish_non_exhaustive()
	}
}

/// Renders a pending JavaScript exception, or the error itself if there is none.
fn describe( ctx: &Ctx<'_>, error: rquickjs::Error ) -> String {
	match error {
		rquickjs::Error::Exception => {
			let thrown = ctx.catch();
			match thrown.as_exception() {
				Some( exception ) => exception.message().unwrap_or_else(|| "Unknown exception".to_string() ),
				None => ctx.json_stringify( thrown.clone() ).ok().flatten()
					.and_then(| text | text.to_string().ok() )
					.unwrap_or_else(|| "Unknown exception".to_string() ),
			}
		}
		other => other.to_string(),
	}
}

impl ScriptExtension {

	/// Creates the runtime, injects the host globals and evaluates `source`.
	///
	/// # Errors
	/// Returns a description of the failure if the runtime cannot be created or the
	/// script throws while being evaluated.
	pub fn new(
		manifest: &ExtensionManifest,
		source: &str,
		host_api: &dyn HostApi,
		data_path: &Path,
	) -> Result<Self, String> {

		let runtime = Runtime::new().map_err(| err | err.to_string() )?;
		let context = Context::full( &runtime ).map_err(| err | err.to_string() )?;

		context.with(| ctx | {
			let inject = || -> rquickjs::Result<()> {
				let globals = ctx.globals();
				globals.set( "HostApi", host_api.script_binding( &ctx )? )?;
				globals.set( "CurrentExtensionInstallPath", manifest.directory_path().to_string_lossy().into_owned() )?;
				globals.set( "CurrentExtensionDataPath", data_path.to_string_lossy().into_owned() )?;
				globals.set( "CurrentExtensionId", manifest.id() )?;
				ctx.eval::<(), _>( source )
			};
			inject().map_err(| err | describe( &ctx, err ))
		})?;

		Ok( Self { name: manifest.name().to_string(), context, runtime })

	}

	#[inline] pub fn name( &self ) -> &str { &self.name }

	/// Reads a global the script defined, converted through JSON.
	pub fn global( &self, name: &str ) -> Option<serde_json::Value> {
		self.context.with(| ctx | {
			let value: Value = ctx.globals().get( name ).ok()?;
			if value.is_undefined() { return None }
			let text = ctx.json_stringify( value ).ok()??.to_string().ok()?;
			serde_json::from_str( &text ).ok()
		})
	}

	/// Calls the global function `function_name` with JSON encoded arguments.
	/// Missing functions are skipped.
	fn call( &self, function_name: &str, args: &[serde_json::Value] ) -> Result<(), HandlerError> {
		self.context.with(| ctx | {
			let invoke = || -> rquickjs::Result<()> {
				let Some( function ) = ctx.globals().get::<_, Option<Function>>( function_name )? else { return Ok(()) };
				let args = args.iter()
					.map(| arg | ctx.json_parse( arg.to_string() ))
					.collect::<rquickjs::Result<Vec<Value>>>()?;
				let _: Value = match args.as_slice() {
					[] => function.call(())?,
					[ first ] => function.call(( first.clone(), ))?,
					[ first, second, .. ] => function.call(( first.clone(), second.clone() ))?,
				};
				Ok(())
			};
			invoke().map_err(| err | HandlerError::ScriptException( describe( &ctx, err )))
		})
	}

}

impl Extension for ScriptExtension {

	fn notify( &mut self, notification: &Notification<'_> ) -> Result<(), HandlerError> {
		let args = match notification {
			Notification::GameStopped { game, elapsed } => vec![ serde_json::json!( game ), serde_json::json!( elapsed.as_secs() )],
			Notification::GameSelected( change ) => vec![ serde_json::json!( change.old ), serde_json::json!( change.new )],
			other => other.game().map(| game | serde_json::json!( game )).into_iter().collect(),
		};
		self.call( notification.script_function(), &args )
	}

	fn dispose( &mut self ) -> Result<(), HandlerError> {
		self.call( DISPOSE_FUNCTION, &[] )
	}

}
