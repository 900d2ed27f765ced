pub(crate) mod metadata;
pub(crate) mod model;
