//! Type alias for operations that succeed even when some of their parts fail.

/// The result of an operation where failed parts were skipped rather than aborting it.
/// The `Vec<E>` holds the errors of the skipped parts.
pub type PartialSuccess<T, E> = ( T, Vec<E> );
