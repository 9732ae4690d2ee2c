pub(crate) mod catalog;
pub(crate) mod controller;
pub(crate) mod definition;
