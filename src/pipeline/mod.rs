pub(crate) mod assemble;
pub(crate) mod convert;
pub(crate) mod pool;
pub(crate) mod slots;
