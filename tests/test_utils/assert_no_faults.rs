#[macro_export]
macro_rules! assert_no_faults {
	( $report:expr ) => {
		if !$report.is_clean() { panic!( "Dispatch faulted: {:#?}", $report ) }
	};
}
