pub(crate) mod assemble;
pub(crate) mod fingerprint;
pub(crate) mod runtime;
pub(crate) mod serialize;
