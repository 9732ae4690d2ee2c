pub(crate) mod distribution;
pub(crate) mod generator;
pub(crate) mod kind;
