pub mod smtlib_printer;
pub mod smtlib_process;
pub mod smtlib_values;
pub mod z3_backend;
