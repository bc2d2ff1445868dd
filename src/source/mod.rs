pub(crate) mod enumerate;
