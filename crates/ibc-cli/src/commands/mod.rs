pub(crate) mod dump_smt;
pub(crate) mod helpers;
pub(crate) mod search;
pub(crate) mod verify;
