pub mod reference_reader;
pub mod schedule_reader;
pub mod schedule_writer;
