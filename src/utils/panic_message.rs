use std::any::Any ;

/// Extracts the message from a caught panic payload.
pub(crate) fn panic_message( payload: &( dyn Any + Send )) -> String {
	payload.downcast_ref::<&str>().map(| message | ( *message ).to_string() )
		.or_else(|| payload.downcast_ref::<String>().cloned() )
		.unwrap_or_else(|| "Unknown panic".to_string() )
}

#[cfg( test )]
mod tests {

	use super::*;

	#[test]
	fn reads_str_and_string_payloads() {
		let payload = std::panic::catch_unwind(|| panic!( "static" )).expect_err( "panicked" );
		assert_eq!( panic_message( &*payload ), "static" );
		let payload = std::panic::catch_unwind(|| panic!( "formatted {}", 42 )).expect_err( "panicked" );
		assert_eq!( panic_message( &*payload ), "formatted 42" );
	}

}
