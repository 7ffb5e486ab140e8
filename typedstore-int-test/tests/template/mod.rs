mod builder_test;
mod round_trip_test;
