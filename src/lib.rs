//! An extension host for a game library manager.
//!
//! The host discovers third-party extensions on disk, checks them against the SDK
//! version it implements, loads them and keeps them notified of lifecycle events.
//! Extension code is treated as untrusted and possibly broken: a failure in one
//! extension, whether while loading, handling a notification or being disposed,
//! never reaches another extension or the host.
//!
//! # Extension kinds
//!
//! - **Script** extensions are JavaScript files run by an embedded QuickJS runtime,
//! 	one runtime per extension. See [`ScriptExtension`].
//!
//! - **Binary** extensions are WebAssembly components run by wasmtime. A component's
//! 	imports are what it depends on and are checked by the [`CompatibilityVerifier`];
//! 	each export named after a plugin contract interface (`host:sdk/library-plugin`,
//! 	`host:sdk/metadata-plugin`, `host:sdk/generic-plugin`) becomes one
//! 	[`ComponentExtension`].
//!
//! # Core Concepts
//!
//! - [`ExtensionManifest`]: the `extension.toml` descriptor every extension directory
//! 	carries, found by the [`ManifestStore`].
//!
//! - [`ModuleLoader`]: turns one manifest into zero or more [`LoadedExtension`]s.
//!
//! - [`ExtensionRegistry`]: live binary extensions keyed by a unique id.
//!
//! - [`EventDispatcher`]: one method per lifecycle event, each handler run in isolation.
//!
//! - [`FailureLedger`]: the manifests that failed to load in the last cycle.
//!
//! - [`ExtensionHost`]: the façade tying all of the above to a [`HostConfig`], a
//! 	[`HostApi`], a [`GameDatabase`] and the controller's [`EventSource`].
//!
//! # Re-exports
//!
//! `Engine`, `Linker`, `Component` and `Val` are re-exported from `wasmtime` for
//! implementing [`HostApi::link`].

mod component ;
mod config ;
mod dispatcher ;
mod events ;
mod extension ;
mod game ;
mod host ;
mod host_api ;
mod ledger ;
mod loader ;
mod manifest ;
mod manifest_store ;
mod registry ;
mod script ;
mod utils ;
mod verifier ;

#[doc( no_inline )]
pub use wasmtime::Engine ;
#[doc( no_inline )]
pub use wasmtime::component::{ Component, Linker, Val };

pub use component::{ ComponentExtension, CONTRACTS };
pub use config::{ HostConfig, ConfigError, SDK_VERSION };
pub use dispatcher::{ EventDispatcher, Extensions, DispatchReport, DispatchError, HandlerFault };
pub use events::{ ControllerEvent, ControllerEventKind, EventSource, Subscription };
pub use extension::{ Extension, Notification, HandlerError };
pub use game::{ Game, GameId, GameDatabase, SelectionChange };
pub use host::ExtensionHost ;
pub use host_api::{ HostApi, ExtensionContext, LocalizationLoader, NoLocalization };
pub use ledger::FailureLedger ;
pub use loader::{ ModuleLoader, LoadError, sanitize_dir_name };
pub use manifest::{ ExtensionManifest, ExtensionType, ManifestLink, DescriptorError, MANIFEST_FILE };
pub use manifest_store::ManifestStore ;
pub use registry::{ ExtensionRegistry, LoadedExtension };
pub use script::ScriptExtension ;
pub use utils::PartialSuccess ;
pub use verifier::{ CompatibilityVerifier, Incompatibility, InterfaceName, is_builtin, is_builtin_id, BUILTIN_EXTENSIONS, INTERNAL_PACKAGES, SDK_PACKAGE };
