pub(crate) mod converter;
pub(crate) mod options;
